//! Base16 (64 位十六进制) 私钥搜索空间

use crate::comparer::Comparer;
use crate::driver::Recovery;
use crate::ecc::Scalar;
use crate::encoding::{self, BASE16_ALPHABET};
use crate::error::SearchError;
use crate::permutation::PermutationCursor;

use super::{SearchSpace, Slots, check_missing_symbol, single_char};

pub const KEY_HEX_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct Base16Space {
    slots: Slots,
    /// 已知半字节组成的私钥，缺失位置为 0
    template: [u8; 32],
    comparer: Option<Comparer>,
}

impl Base16Space {
    pub fn process(input: &str, missing_symbol: char) -> Result<Self, SearchError> {
        check_missing_symbol(missing_symbol, |c| encoding::base16_value(c).is_some())?;
        if input.trim().is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let chars: Vec<char> = input.chars().collect();
        if chars.len() != KEY_HEX_LEN {
            return Err(SearchError::InvalidLength(format!(
                "a hexadecimal private key must be {KEY_HEX_LEN} characters, found {}",
                chars.len()
            )));
        }

        let mut template = [0u8; 32];
        let mut missing_indexes = Vec::new();
        for (index, &ch) in chars.iter().enumerate() {
            if ch == missing_symbol {
                missing_indexes.push(index);
                continue;
            }
            let nibble = encoding::base16_value(ch).ok_or(SearchError::InvalidChar { ch, index })?;
            let shift = if index % 2 == 0 { 4 } else { 0 };
            template[index / 2] |= (nibble as u8) << shift;
        }

        let defaults = vec![(0..16).collect::<Vec<u32>>(); missing_indexes.len()];
        Ok(Self {
            slots: Slots::new(input, missing_symbol, missing_indexes, defaults)?,
            template,
            comparer: None,
        })
    }

    pub fn with_comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = Some(comparer);
        self
    }

    #[inline]
    fn fill(&self, cursor: &PermutationCursor<'_>) -> [u8; 32] {
        let mut key = self.template;
        for (slot, &pos) in self.slots.missing_indexes().iter().enumerate() {
            let nibble = cursor.current_value(slot) as u8;
            key[pos / 2] |= if pos % 2 == 0 { nibble << 4 } else { nibble };
        }
        key
    }
}

impl SearchSpace for Base16Space {
    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn parse_symbol(&self, text: &str) -> Result<u32, SearchError> {
        let c = single_char(text)?;
        encoding::base16_value(c).ok_or(SearchError::InvalidChar { ch: c, index: 0 })
    }

    fn symbol_text(&self, symbol: u32) -> String {
        (BASE16_ALPHABET[symbol as usize] as char).to_string()
    }
}

impl Recovery for Base16Space {
    type State = Option<Comparer>;

    fn has_comparer(&self) -> bool {
        self.comparer.is_some()
    }

    fn new_state(&self) -> Self::State {
        self.comparer.clone()
    }

    fn check(&self, comparer: &mut Self::State, cursor: &PermutationCursor<'_>) -> bool {
        let Some(comparer) = comparer.as_ref() else {
            return false;
        };
        Scalar::from_private_key(&self.fill(cursor)).is_some_and(|k| comparer.compare(&k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompareType;

    const KEY: &str = "4c7a9640c72dc2099f23715d0c8a0d8a35f8906e3cab61dd3f78b67bf887c9ab";

    #[test]
    fn test_process_validation() {
        assert!(matches!(
            Base16Space::process(&KEY[..63], '*'),
            Err(SearchError::InvalidLength(_))
        ));
        assert_eq!(
            Base16Space::process(KEY, 'a').unwrap_err(),
            SearchError::InvalidMissingSymbol('a')
        );
        let bad = KEY.replacen('c', "g", 1);
        assert_eq!(
            Base16Space::process(&bad, '*').unwrap_err(),
            SearchError::InvalidChar { ch: 'g', index: 1 }
        );
    }

    #[test]
    fn test_recovers_missing_nibbles() {
        let input = format!("{}**{}", &KEY[..10], &KEY[12..]);
        let comparer =
            Comparer::new(CompareType::AddrComp, "1PZuicD1ACRfBuKEgp2XaJhVvnwpeETDyn").unwrap();
        let space = Base16Space::process(&input, '*').unwrap().with_comparer(comparer);
        assert_eq!(space.slots().total(), num_bigint::BigUint::from(256u32));

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
        assert_eq!(found, vec![KEY.to_string()]);
    }
}
