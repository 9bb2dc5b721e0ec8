//! Bitcoin Core 钱包密码搜索空间
//!
//! 目标是钱包 `mkey` 记录的值:
//! `0x30 ‖ 加密主密钥[48] ‖ 0x08 ‖ salt[8] ‖ method u32le ‖ iterations u32le [‖ 0x00]`。
//! 密钥派生为 `D = SHA512(password ‖ salt)` 再迭代 `iterations - 1` 次 SHA512，
//! AES-256 密钥取 `D[0..32]`。只需解密最后一个密文块并检查 PKCS#7 填充即可判断密码是否正确。

use aes::Aes256;
use aes::cipher::{BlockDecrypt, KeyInit};
use byteorder::{ByteOrder, LittleEndian};

use crate::driver::Recovery;
use crate::error::SearchError;
use crate::hashing::{Sha512, sha512};
use crate::permutation::PermutationCursor;

use super::{SearchSpace, Slots, check_missing_symbol, single_char};

const ENCRYPTED_LEN: usize = 48;
const SALT_LEN: usize = 8;
const BLOB_LEN: usize = 1 + ENCRYPTED_LEN + 1 + SALT_LEN + 4 + 4;
/// 32 字节主密钥加密后最后一块全是填充
const PADDING_BLOCK: [u8; 16] = [0x10; 16];

/// 默认候选: 可打印 ASCII
const PRINTABLE: std::ops::RangeInclusive<u32> = 0x20..=0x7e;

/// 解析后的 `mkey` 记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterKeyBlob {
    pub encrypted_key: [u8; ENCRYPTED_LEN],
    pub salt: [u8; SALT_LEN],
    pub method: u32,
    pub iterations: u32,
}

impl MasterKeyBlob {
    pub fn parse_hex(hex_str: &str) -> Result<Self, SearchError> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| SearchError::InvalidTarget(format!("invalid hex: {e}")))?;
        let trailing_ok = bytes.len() == BLOB_LEN || (bytes.len() == BLOB_LEN + 1 && bytes[BLOB_LEN] == 0);
        if !trailing_ok {
            return Err(SearchError::InvalidTarget(format!(
                "wallet master key record must be {BLOB_LEN} or {} bytes, found {}",
                BLOB_LEN + 1,
                bytes.len()
            )));
        }
        if bytes[0] != ENCRYPTED_LEN as u8 || bytes[1 + ENCRYPTED_LEN] != SALT_LEN as u8 {
            return Err(SearchError::InvalidTarget(
                "unexpected field sizes in wallet master key record".into(),
            ));
        }

        let mut encrypted_key = [0u8; ENCRYPTED_LEN];
        encrypted_key.copy_from_slice(&bytes[1..1 + ENCRYPTED_LEN]);
        let salt_start = 2 + ENCRYPTED_LEN;
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[salt_start..salt_start + SALT_LEN]);
        let method = LittleEndian::read_u32(&bytes[salt_start + SALT_LEN..]);
        let iterations = LittleEndian::read_u32(&bytes[salt_start + SALT_LEN + 4..]);

        if method != 0 {
            return Err(SearchError::Unsupported(format!(
                "key derivation method {method}"
            )));
        }
        if iterations == 0 {
            return Err(SearchError::InvalidTarget("iteration count is zero".into()));
        }
        Ok(Self {
            encrypted_key,
            salt,
            method,
            iterations,
        })
    }

    /// 用给定密码解密最后一块并检查填充
    pub fn is_password(&self, password: &[u8], hasher: &mut Sha512) -> bool {
        hasher.reset();
        hasher.update(password);
        hasher.update(&self.salt);
        let mut digest = hasher.finalize_reset();
        for _ in 1..self.iterations {
            digest = sha512::hash_64(&digest);
        }

        let Ok(cipher) = Aes256::new_from_slice(&digest[..32]) else {
            return false;
        };
        let mut block = aes::Block::clone_from_slice(&self.encrypted_key[32..48]);
        cipher.decrypt_block(&mut block);
        block
            .iter()
            .zip(&self.encrypted_key[16..32])
            .zip(&PADDING_BLOCK)
            .all(|((b, prev), pad)| b ^ prev == *pad)
    }
}

#[derive(Debug, Clone)]
enum Part {
    Fixed(String),
    Missing(usize),
}

#[derive(Debug, Clone)]
pub struct CorePassSpace {
    slots: Slots,
    parts: Vec<Part>,
    blob: MasterKeyBlob,
}

/// 工作线程的密码缓冲区与哈希状态
#[derive(Debug, Clone)]
pub struct CorePassState {
    password: Vec<u8>,
    hasher: Sha512,
}

impl CorePassSpace {
    pub fn process(pattern: &str, missing_symbol: char, blob_hex: &str) -> Result<Self, SearchError> {
        check_missing_symbol(missing_symbol, |_| false)?;
        if pattern.is_empty() {
            return Err(SearchError::EmptyInput);
        }
        let blob = MasterKeyBlob::parse_hex(blob_hex)?;

        let mut parts = Vec::new();
        let mut missing_indexes = Vec::new();
        let mut fixed = String::new();
        for (index, ch) in pattern.chars().enumerate() {
            if ch == missing_symbol {
                if !fixed.is_empty() {
                    parts.push(Part::Fixed(std::mem::take(&mut fixed)));
                }
                parts.push(Part::Missing(missing_indexes.len()));
                missing_indexes.push(index);
            } else {
                fixed.push(ch);
            }
        }
        if !fixed.is_empty() {
            parts.push(Part::Fixed(fixed));
        }

        let defaults = vec![PRINTABLE.collect::<Vec<u32>>(); missing_indexes.len()];
        Ok(Self {
            slots: Slots::new(pattern, missing_symbol, missing_indexes, defaults)?,
            parts,
            blob,
        })
    }

    pub fn blob(&self) -> &MasterKeyBlob {
        &self.blob
    }

    fn write_password(&self, cursor: &PermutationCursor<'_>, out: &mut Vec<u8>) {
        out.clear();
        let mut utf8 = [0u8; 4];
        for part in &self.parts {
            match part {
                Part::Fixed(text) => out.extend_from_slice(text.as_bytes()),
                Part::Missing(slot) => {
                    if let Some(c) = char::from_u32(cursor.current_value(*slot)) {
                        out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                    }
                }
            }
        }
    }
}

impl SearchSpace for CorePassSpace {
    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn parse_symbol(&self, text: &str) -> Result<u32, SearchError> {
        single_char(text).map(|c| c as u32)
    }

    fn symbol_text(&self, symbol: u32) -> String {
        char::from_u32(symbol).map(String::from).unwrap_or_default()
    }
}

impl Recovery for CorePassSpace {
    type State = CorePassState;

    fn requires_comparer(&self) -> bool {
        false
    }

    fn has_comparer(&self) -> bool {
        false
    }

    fn new_state(&self) -> Self::State {
        CorePassState {
            password: Vec::with_capacity(64),
            hasher: Sha512::new(),
        }
    }

    fn check(&self, state: &mut Self::State, cursor: &PermutationCursor<'_>) -> bool {
        self.write_password(cursor, &mut state.password);
        self.blob.is_password(&state.password, &mut state.hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 密码 "Tr0ub4dor&3"，salt 0102030405060708，10 轮
    const BLOB: &str = "304d45f718944658e5daff1405a6a5a4e1cfd3c2f002ef1b8c7f7c604d6a86719cd5cc1d6cbf91b27ca536791bd7bf316b080102030405060708000000000a00000000";

    #[test]
    fn test_parse_blob() {
        let blob = MasterKeyBlob::parse_hex(BLOB).unwrap();
        assert_eq!(blob.iterations, 10);
        assert_eq!(blob.method, 0);
        assert_eq!(hex::encode(blob.salt), "0102030405060708");
        // 不带结尾 0x00 也可以
        assert!(MasterKeyBlob::parse_hex(&BLOB[..BLOB.len() - 2]).is_ok());
        assert!(MasterKeyBlob::parse_hex(&BLOB[2..]).is_err());
    }

    #[test]
    fn test_unsupported_method() {
        let mut bytes = hex::decode(BLOB).unwrap();
        bytes[58] = 1;
        assert!(matches!(
            MasterKeyBlob::parse_hex(&hex::encode(bytes)),
            Err(SearchError::Unsupported(_))
        ));
    }

    #[test]
    fn test_password_check() {
        let blob = MasterKeyBlob::parse_hex(BLOB).unwrap();
        let mut hasher = Sha512::new();
        assert!(blob.is_password(b"Tr0ub4dor&3", &mut hasher));
        assert!(!blob.is_password(b"Tr0ub4dor&4", &mut hasher));
        assert!(blob.is_password(b"Tr0ub4dor&3", &mut hasher));
    }

    #[test]
    fn test_recovers_missing_char() {
        let space = CorePassSpace::process("Tr0ub4dor&*", '*', BLOB).unwrap();
        assert_eq!(space.slots().total(), num_bigint::BigUint::from(95u32));

        let set = space.slots().permutations();
        let mut cursor = set.cursor();
        let mut state = space.new_state();
        let mut found = Vec::new();
        loop {
            if space.check(&mut state, &cursor) {
                found.push(space.complete(&cursor));
            }
            if !cursor.increment() {
                break;
            }
        }
        assert_eq!(found, vec!["Tr0ub4dor&3".to_string()]);
    }
}
