//! Casascius 迷你私钥搜索空间
//!
//! 迷你私钥是以 `S` 开头的 22、26 或 30 个 Base58 字符，只有当
//! `SHA256(key ‖ '?')` 的第一个字节为零时才是合法的，私钥本身是 `SHA256(key)`。

use crate::comparer::Comparer;
use crate::driver::Recovery;
use crate::ecc::Scalar;
use crate::encoding::{self, BASE58_ALPHABET};
use crate::error::SearchError;
use crate::hashing::sha256;
use crate::permutation::PermutationCursor;

use super::{SearchSpace, Slots, check_missing_symbol, single_char};

pub const ALLOWED_LENGTHS: [usize; 3] = [22, 26, 30];
const MAX_LEN: usize = 30;

#[derive(Debug, Clone)]
pub struct MiniKeySpace {
    slots: Slots,
    /// 已知字符 (缺失位置为 0)，末尾额外留一个 '?'
    template: [u8; MAX_LEN + 1],
    len: usize,
    comparer: Option<Comparer>,
}

impl MiniKeySpace {
    pub fn process(input: &str, missing_symbol: char) -> Result<Self, SearchError> {
        check_missing_symbol(missing_symbol, |c| encoding::base58_index(c).is_some())?;
        if input.trim().is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let chars: Vec<char> = input.chars().collect();
        if !ALLOWED_LENGTHS.contains(&chars.len()) {
            return Err(SearchError::InvalidLength(format!(
                "a mini private key must be 22, 26 or 30 characters, found {}",
                chars.len()
            )));
        }
        if chars[0] != 'S' {
            return Err(SearchError::Invalid(
                "a mini private key must start with S".into(),
            ));
        }

        let mut template = [0u8; MAX_LEN + 1];
        let mut missing_indexes = Vec::new();
        for (index, &ch) in chars.iter().enumerate() {
            if ch == missing_symbol {
                missing_indexes.push(index);
            } else if encoding::base58_index(ch).is_some() {
                template[index] = ch as u8;
            } else {
                return Err(SearchError::InvalidChar { ch, index });
            }
        }
        template[chars.len()] = b'?';

        let defaults = vec![
            BASE58_ALPHABET.iter().map(|&c| c as u32).collect::<Vec<_>>();
            missing_indexes.len()
        ];
        Ok(Self {
            slots: Slots::new(input, missing_symbol, missing_indexes, defaults)?,
            template,
            len: chars.len(),
            comparer: None,
        })
    }

    pub fn with_comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = Some(comparer);
        self
    }

    #[inline]
    fn fill(&self, cursor: &PermutationCursor<'_>) -> [u8; MAX_LEN + 1] {
        let mut buf = self.template;
        for (slot, &pos) in self.slots.missing_indexes().iter().enumerate() {
            buf[pos] = cursor.current_value(slot) as u8;
        }
        buf
    }

    /// `SHA256(key ‖ '?')[0] == 0`
    #[inline]
    pub fn is_valid(buf: &[u8], len: usize) -> bool {
        let digest = match len {
            22 => buf[..23].try_into().map(sha256::hash_23),
            26 => buf[..27].try_into().map(sha256::hash_27),
            _ => buf[..31].try_into().map(sha256::hash_31),
        };
        digest.is_ok_and(|d| d[0] == 0)
    }

    /// 迷你私钥对应的 32 字节私钥
    #[inline]
    pub fn private_key(buf: &[u8], len: usize) -> Option<[u8; 32]> {
        match len {
            22 => buf[..22].try_into().map(sha256::hash_22).ok(),
            26 => buf[..26].try_into().map(sha256::hash_26).ok(),
            _ => buf[..30].try_into().map(sha256::hash_30).ok(),
        }
    }
}

impl SearchSpace for MiniKeySpace {
    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn parse_symbol(&self, text: &str) -> Result<u32, SearchError> {
        let c = single_char(text)?;
        match encoding::base58_index(c) {
            Some(_) => Ok(c as u32),
            None => Err(SearchError::InvalidChar { ch: c, index: 0 }),
        }
    }

    fn symbol_text(&self, symbol: u32) -> String {
        char::from_u32(symbol).map(String::from).unwrap_or_default()
    }
}

impl Recovery for MiniKeySpace {
    type State = Option<Comparer>;

    fn has_comparer(&self) -> bool {
        self.comparer.is_some()
    }

    fn new_state(&self) -> Self::State {
        self.comparer.clone()
    }

    fn check(&self, comparer: &mut Self::State, cursor: &PermutationCursor<'_>) -> bool {
        let buf = self.fill(cursor);
        if !Self::is_valid(&buf, self.len) {
            return false;
        }
        let Some(comparer) = comparer.as_ref() else {
            return false;
        };
        Self::private_key(&buf, self.len)
            .and_then(|k| Scalar::from_private_key(&k))
            .is_some_and(|k| comparer.compare(&k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompareType;

    const MINI: &str = "S6c56bnXQiBjk9mqSYE7ykVQ7NzrRy";

    #[test]
    fn test_known_mini_key() {
        let mut buf = [0u8; MAX_LEN + 1];
        buf[..30].copy_from_slice(MINI.as_bytes());
        buf[30] = b'?';
        assert!(MiniKeySpace::is_valid(&buf, 30));
        assert_eq!(
            hex::encode(MiniKeySpace::private_key(&buf, 30).unwrap()),
            "4c7a9640c72dc2099f23715d0c8a0d8a35f8906e3cab61dd3f78b67bf887c9ab"
        );
    }

    #[test]
    fn test_process_validation() {
        assert!(matches!(
            MiniKeySpace::process("S6c56bnXQ", '*'),
            Err(SearchError::InvalidLength(_))
        ));
        let wrong_start = MINI.replacen('S', "T", 1);
        assert!(matches!(
            MiniKeySpace::process(&wrong_start, '*'),
            Err(SearchError::Invalid(_))
        ));
        let bad_char = MINI.replacen('6', "0", 1);
        assert_eq!(
            MiniKeySpace::process(&bad_char, '*').unwrap_err(),
            SearchError::InvalidChar { ch: '0', index: 1 }
        );
    }

    #[test]
    fn test_recovers_two_missing_chars() {
        let input = format!("{}*{}*{}", &MINI[..5], &MINI[6..20], &MINI[21..]);
        let comparer =
            Comparer::new(CompareType::AddrUnComp, "1CciesT23BNionJeXrbxmjc7ywfiyM4oLW").unwrap();
        let space = MiniKeySpace::process(&input, '*').unwrap().with_comparer(comparer);

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
        assert_eq!(found, vec![MINI.to_string()]);
    }
}
