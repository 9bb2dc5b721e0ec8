//! BIP32 分层确定性私钥派生

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::ecc::{Scalar, multiply_by_g};
use crate::error::SearchError;

type HmacSha512 = Hmac<Sha512>;

/// 硬化派生标志位
pub const HARDENED: u32 = 0x8000_0000;

/// 派生路径，如 `m/44'/0'/0'/0/0`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    pub fn indexes(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for DerivationPath {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split('/');
        match parts.next() {
            Some("m") | Some("M") => {}
            _ => {
                return Err(SearchError::Invalid(format!(
                    "derivation path '{s}' must start with m"
                )));
            }
        }

        let mut indexes = Vec::new();
        for part in parts {
            let (digits, hardened) = match part.strip_suffix(['\'', 'h', 'H']) {
                Some(d) => (d, true),
                None => (part, false),
            };
            let index: u32 = digits.parse().map_err(|_| {
                SearchError::Invalid(format!("invalid index '{part}' in derivation path"))
            })?;
            if index >= HARDENED {
                return Err(SearchError::Invalid(format!(
                    "index '{part}' in derivation path is too large"
                )));
            }
            indexes.push(if hardened { index | HARDENED } else { index });
        }
        Ok(Self(indexes))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for &i in &self.0 {
            if i & HARDENED != 0 {
                write!(f, "/{}'", i & !HARDENED)?;
            } else {
                write!(f, "/{i}")?;
            }
        }
        Ok(())
    }
}

/// 对多段拼接的消息计算 HMAC-SHA512
fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Option<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key).ok()?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Some(out)
}

/// 扩展私钥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedKey {
    pub key: Scalar,
    pub chain_code: [u8; 32],
}

impl ExtendedKey {
    /// 由种子生成主密钥 (`HMAC-SHA512("Bitcoin seed", seed)`)
    pub fn master(seed: &[u8]) -> Option<Self> {
        let i = hmac_sha512(b"Bitcoin seed", &[seed])?;
        Self::from_hmac(&i, None)
    }

    fn from_hmac(i: &[u8; 64], parent: Option<&Scalar>) -> Option<Self> {
        let il: &[u8; 32] = i[..32].try_into().ok()?;
        let tweak = Scalar::from_bytes(il)?;
        let key = match parent {
            Some(parent) => tweak.add(parent),
            None => tweak,
        };
        if key.is_zero() {
            return None;
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Some(Self { key, chain_code })
    }

    /// 派生子私钥；`IL ≥ n` 或结果为零时返回 `None`
    pub fn derive_child(&self, index: u32) -> Option<Self> {
        let index_bytes = index.to_be_bytes();
        let i = if index & HARDENED != 0 {
            let key = self.key.to_bytes();
            hmac_sha512(&self.chain_code, &[&[0u8][..], &key[..], &index_bytes[..]])?
        } else {
            let public = multiply_by_g(&self.key).to_affine().to_compressed();
            hmac_sha512(&self.chain_code, &[&public[..], &index_bytes[..]])?
        };
        Self::from_hmac(&i, Some(&self.key))
    }

    pub fn derive_path(&self, path: &DerivationPath) -> Option<Self> {
        path.indexes()
            .iter()
            .try_fold(*self, |key, &index| key.derive_child(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path() {
        let path: DerivationPath = "m/44'/0'/0'/0/5".parse().unwrap();
        assert_eq!(
            path.indexes(),
            &[44 | HARDENED, HARDENED, HARDENED, 0, 5]
        );
        assert_eq!(path.to_string(), "m/44'/0'/0'/0/5");
        let alt: DerivationPath = "m/0h/1".parse().unwrap();
        assert_eq!(alt.indexes(), &[HARDENED, 1]);
        assert!("44'/0".parse::<DerivationPath>().is_err());
        assert!("m/x".parse::<DerivationPath>().is_err());
        assert!("m/2147483648".parse::<DerivationPath>().is_err());
        assert!("m".parse::<DerivationPath>().unwrap().indexes().is_empty());
    }

    #[test]
    fn test_bip32_vector_1() {
        // BIP32 测试向量 1: 种子 000102...0f, 路径 m/0'/1
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let master = ExtendedKey::master(&seed).unwrap();
        assert_eq!(
            hex::encode(master.key.to_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(master.chain_code),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );

        let child = master.derive_path(&"m/0'/1".parse().unwrap()).unwrap();
        assert_eq!(
            hex::encode(child.key.to_bytes()),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
    }
}
