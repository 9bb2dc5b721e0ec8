//! 各种编码的搜索空间
//!
//! 每种编码负责校验输入、定位缺失位置、为每个位置给出默认候选列表，并预计算
//! 热循环需要的加速数据。所有空间共享 [`Slots`] 保存缺失位置和候选值，
//! 通过 [`SearchSpace`] 对外提供 `set_values` 和结果还原。

pub mod armory;
pub mod base16;
pub mod base58;
pub mod core_pass;
pub mod mini_key;
pub mod mnemonic;

use num_bigint::BigUint;

use crate::error::SearchError;
use crate::permutation::{PermutationCursor, PermutationSet};

pub use armory::ArmorySpace;
pub use base16::Base16Space;
pub use base58::{Base58Kind, Base58Space, shifted_mult_pow58};
pub use core_pass::CorePassSpace;
pub use mini_key::MiniKeySpace;
pub use mnemonic::MnemonicSpace;

/// 缺失位置与候选值
///
/// 始终满足 `miss_count() == missing_indexes().len() == candidates().len()`。
#[derive(Debug, Clone)]
pub struct Slots {
    input: String,
    missing_symbol: char,
    missing_indexes: Vec<usize>,
    candidates: Vec<Vec<u32>>,
    permutations: PermutationSet,
}

impl Slots {
    /// `defaults` 是每个缺失位置的默认候选列表，与 `missing_indexes` 一一对应
    pub fn new(
        input: &str,
        missing_symbol: char,
        missing_indexes: Vec<usize>,
        defaults: Vec<Vec<u32>>,
    ) -> Result<Self, SearchError> {
        debug_assert_eq!(missing_indexes.len(), defaults.len());
        let permutations = PermutationSet::new(&defaults)?;
        Ok(Self {
            input: input.to_string(),
            missing_symbol,
            missing_indexes,
            candidates: defaults,
            permutations,
        })
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn missing_symbol(&self) -> char {
        self.missing_symbol
    }

    pub fn miss_count(&self) -> usize {
        self.missing_indexes.len()
    }

    /// 缺失位置在输入中的下标 (从左到右)
    pub fn missing_indexes(&self) -> &[usize] {
        &self.missing_indexes
    }

    pub fn candidates(&self) -> &[Vec<u32>] {
        &self.candidates
    }

    pub fn permutations(&self) -> &PermutationSet {
        &self.permutations
    }

    /// 搜索空间大小
    pub fn total(&self) -> BigUint {
        self.permutations.total()
    }

    /// `index` 处缺失位置的序号
    pub fn slot_of(&self, index: usize) -> Option<usize> {
        self.missing_indexes.binary_search(&index).ok()
    }

    /// 替换所有位置的候选列表
    pub fn set_candidates(&mut self, lists: Vec<Vec<u32>>) -> Result<(), SearchError> {
        if lists.len() != self.missing_indexes.len() {
            return Err(SearchError::Invalid(format!(
                "expected {} lists of possible values, got {}",
                self.missing_indexes.len(),
                lists.len()
            )));
        }
        self.permutations = PermutationSet::new(&lists)?;
        self.candidates = lists;
        Ok(())
    }
}

/// 校验缺失符号: 不能是空白，也不能属于编码字母表
pub fn check_missing_symbol(
    symbol: char,
    in_alphabet: impl Fn(char) -> bool,
) -> Result<(), SearchError> {
    if symbol.is_whitespace() || in_alphabet(symbol) {
        Err(SearchError::InvalidMissingSymbol(symbol))
    } else {
        Ok(())
    }
}

/// 一种编码的搜索空间
pub trait SearchSpace {
    fn slots(&self) -> &Slots;

    fn slots_mut(&mut self) -> &mut Slots;

    /// 把用户给出的一个候选值 (字符或单词) 转成内部符号
    fn parse_symbol(&self, text: &str) -> Result<u32, SearchError>;

    /// 内部符号还原为文本
    fn symbol_text(&self, symbol: u32) -> String;

    /// 为每个缺失位置设置候选列表
    fn set_values(&mut self, lists: &[Vec<String>]) -> Result<(), SearchError> {
        let parsed = lists
            .iter()
            .map(|list| {
                list.iter()
                    .map(|text| self.parse_symbol(text.trim()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.slots_mut().set_candidates(parsed)
    }

    /// 用游标当前组合填补缺失位置后的完整输入
    fn complete(&self, cursor: &PermutationCursor<'_>) -> String {
        let slots = self.slots();
        let mut values = cursor.current_values();
        slots
            .input()
            .chars()
            .map(|c| {
                if c == slots.missing_symbol() {
                    values
                        .next()
                        .map(|v| self.symbol_text(v))
                        .unwrap_or_else(|| c.to_string())
                } else {
                    c.to_string()
                }
            })
            .collect()
    }
}

/// 单字符候选值的解析
pub(crate) fn single_char(text: &str) -> Result<char, SearchError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(SearchError::Invalid(format!(
            "'{text}' is not a single character"
        ))),
    }
}
