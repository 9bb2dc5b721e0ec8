//! Base58 字母表与 Base58Check 载荷解析
//!
//! 这里只处理构建阶段和比较器初始化时的一次性解码，热循环里的 Base58 校验走
//! `search_space::base58` 中的权重表。

use crate::ecc::Scalar;
use crate::error::SearchError;

pub const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub const BASE16_ALPHABET: &[u8; 16] = b"0123456789abcdef";

/// WIF 版本字节
pub const WIF_VERSION: u8 = 0x80;
/// 压缩公钥标志
pub const COMPRESSED_FLAG: u8 = 0x01;
/// P2PKH 地址版本
pub const P2PKH_VERSION: u8 = 0x00;
/// P2SH 地址版本
pub const P2SH_VERSION: u8 = 0x05;
/// Tron 地址版本
pub const TRON_VERSION: u8 = 0x41;

static BASE58_INDEX: [i8; 128] = build_index(BASE58_ALPHABET);

const fn build_index<const N: usize>(alphabet: &[u8; N]) -> [i8; 128] {
    let mut table = [-1i8; 128];
    let mut i = 0;
    while i < N {
        table[alphabet[i] as usize] = i as i8;
        i += 1;
    }
    table
}

/// Base58 字符在字母表中的位置
#[inline]
pub fn base58_index(c: char) -> Option<u32> {
    let code = c as u32;
    if code >= 128 {
        return None;
    }
    let idx = BASE58_INDEX[code as usize];
    (idx >= 0).then_some(idx as u32)
}

/// 十六进制字符的值 (大小写不敏感)
#[inline]
pub fn base16_value(c: char) -> Option<u32> {
    c.to_digit(16)
}

/// 解码 Base58Check 字符串，返回去掉 4 字节校验和的载荷
pub fn decode_check(input: &str) -> Result<Vec<u8>, SearchError> {
    bs58::decode(input)
        .with_check(None)
        .into_vec()
        .map_err(|e| match e {
            bs58::decode::Error::InvalidChecksum { .. } => SearchError::InvalidChecksum,
            bs58::decode::Error::InvalidCharacter { character, index } => {
                SearchError::InvalidChar {
                    ch: character,
                    index,
                }
            }
            other => SearchError::Invalid(other.to_string()),
        })
}

/// 给载荷加上校验和后编码为 Base58Check
pub fn encode_check(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// 解码后的 WIF 私钥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WifKey {
    pub key: Scalar,
    pub compressed: bool,
}

/// 解析 WIF (0x80 ‖ key ‖ [0x01])
pub fn decode_wif(input: &str) -> Result<WifKey, SearchError> {
    let payload = decode_check(input.trim())?;
    let compressed = match payload.len() {
        33 => false,
        34 if payload[33] == COMPRESSED_FLAG => true,
        34 => return Err(SearchError::Invalid("invalid compressed flag".into())),
        n => return Err(SearchError::InvalidLength(format!("{n} byte WIF payload"))),
    };
    if payload[0] != WIF_VERSION {
        return Err(SearchError::Invalid("invalid WIF version byte".into()));
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&payload[1..33]);
    let key = Scalar::from_private_key(&key)
        .ok_or_else(|| SearchError::Invalid("private key is out of range".into()))?;
    Ok(WifKey { key, compressed })
}

/// 把私钥编码为 WIF
pub fn encode_wif(key: &Scalar, compressed: bool) -> String {
    let mut payload = Vec::with_capacity(34);
    payload.push(WIF_VERSION);
    payload.extend_from_slice(&key.to_bytes());
    if compressed {
        payload.push(COMPRESSED_FLAG);
    }
    encode_check(&payload)
}

/// 解析 Base58Check 地址，返回 (版本字节, 20 字节哈希)
pub fn decode_address(input: &str) -> Result<(u8, [u8; 20]), SearchError> {
    let payload = decode_check(input.trim())?;
    if payload.len() != 21 {
        return Err(SearchError::InvalidLength(format!(
            "{} byte address payload",
            payload.len()
        )));
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok((payload[0], hash))
}

/// 版本字节 + 20 字节哈希编码为地址
pub fn encode_address(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = [0u8; 21];
    payload[0] = version;
    payload[1..].copy_from_slice(hash);
    encode_check(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_index() {
        assert_eq!(base58_index('1'), Some(0));
        assert_eq!(base58_index('z'), Some(57));
        assert_eq!(base58_index('0'), None);
        assert_eq!(base58_index('O'), None);
        assert_eq!(base58_index('I'), None);
        assert_eq!(base58_index('l'), None);
        assert_eq!(base58_index('é'), None);
        for (i, &c) in BASE58_ALPHABET.iter().enumerate() {
            assert_eq!(base58_index(c as char), Some(i as u32));
        }
    }

    #[test]
    fn test_wif_roundtrip() {
        let wif = "L28Peud5cQcijrtMthAdUS8FynpM8PKZtnoUZb1VAio9WxKoebHt";
        let decoded = decode_wif(wif).unwrap();
        assert!(decoded.compressed);
        assert_eq!(encode_wif(&decoded.key, true), wif);
    }

    #[test]
    fn test_wif_bad_checksum() {
        let wif = "L28Peud5cQcijrtMthAdUS8FynpM8PKZtnoUZb1VAio9WxKoeaHt";
        assert_eq!(decode_wif(wif), Err(SearchError::InvalidChecksum));
    }

    #[test]
    fn test_address_roundtrip() {
        let addr = "142viJrTYHA4TzryiEiuQkYk4Ay5TfpzqW";
        let (version, hash) = decode_address(addr).unwrap();
        assert_eq!(version, P2PKH_VERSION);
        assert_eq!(encode_address(version, &hash), addr);
    }
}
