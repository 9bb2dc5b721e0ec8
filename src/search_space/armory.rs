//! Armory 纸钱包备份搜索空间
//!
//! 备份由 2 行 (根私钥) 或 4 行 (根私钥 + 链码) 组成，每行 9 组、每组 4 个
//! Easy16 字符，合计 16 字节数据加 2 字节校验 (`SHA256d(data)[0..2]`)。
//! 缺失的是单个字符，每个位置 16 个候选。每行先单独做校验和过滤，
//! 只有全部通过的组合才会做链式私钥派生。

use hmac::{Hmac, Mac};

use crate::comparer::Comparer;
use crate::driver::Recovery;
use crate::ecc::{Scalar, multiply_by_g};
use crate::error::SearchError;
use crate::hashing::sha256;
use crate::permutation::PermutationCursor;

use super::{SearchSpace, Slots, check_missing_symbol, single_char};

pub const EASY16_ALPHABET: &[u8; 16] = b"asdfghjkwertuion";
const GROUPS_PER_LINE: usize = 9;
const GROUP_LEN: usize = 4;
const NIBBLES_PER_LINE: usize = GROUPS_PER_LINE * GROUP_LEN;
const LINE_BYTES: usize = NIBBLES_PER_LINE / 2;
const MAX_LINES: usize = 4;
const CHAIN_CODE_MESSAGE: &[u8] = b"Derive Chaincode from Root Key";

pub fn easy16_value(c: char) -> Option<u32> {
    EASY16_ALPHABET
        .iter()
        .position(|&a| a as char == c)
        .map(|i| i as u32)
}

/// 行数据的 2 字节校验
#[inline]
fn line_checksum_valid(line: &[u8; LINE_BYTES]) -> bool {
    let mut data = [0u8; 16];
    data.copy_from_slice(&line[..16]);
    sha256::double_hash_16(&data)[..2] == line[16..]
}

/// 只有根私钥时的链码: `HMAC-SHA256(SHA256d(root), "Derive Chaincode from Root Key")`
pub fn derive_chain_code(root: &[u8; 32]) -> Option<[u8; 32]> {
    let mut mac = Hmac::<sha2::Sha256>::new_from_slice(&sha256::double_hash_32(root)).ok()?;
    mac.update(CHAIN_CODE_MESSAGE);
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&mac.finalize().into_bytes());
    Some(chain_code)
}

/// 第 `index` 个地址的私钥，从根私钥链式计算 `index + 1` 步
pub fn derive_key(root: &[u8; 32], chain_code: &[u8; 32], index: u32) -> Option<Scalar> {
    let mut key = Scalar::from_private_key(root)?;
    for _ in 0..=index {
        let public = multiply_by_g(&key).to_affine().to_uncompressed();
        let mut multiplier = sha256::double_hash_65(&public);
        for (m, c) in multiplier.iter_mut().zip(chain_code) {
            *m ^= c;
        }
        key = key.mul(&Scalar::from_bytes_reduced(&multiplier));
        if key.is_zero() {
            return None;
        }
    }
    Some(key)
}

#[derive(Debug, Clone)]
pub struct ArmorySpace {
    slots: Slots,
    /// 每行 16 字节数据 + 2 字节校验，缺失半字节为 0
    template: [[u8; LINE_BYTES]; MAX_LINES],
    line_count: usize,
    /// 每个缺失位置的 (行号, 行内半字节序号)
    positions: Vec<(usize, usize)>,
    /// 含缺失字符、需要在热循环中校验的行
    lines_to_check: Vec<usize>,
    index: u32,
    comparer: Option<Comparer>,
}

impl ArmorySpace {
    pub fn process(input: &str, missing_symbol: char) -> Result<Self, SearchError> {
        check_missing_symbol(missing_symbol, |c| easy16_value(c).is_some())?;
        if input.trim().is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let lines: Vec<&str> = input
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() != 2 && lines.len() != MAX_LINES {
            return Err(SearchError::InvalidLength(format!(
                "an Armory backup must have 2 or 4 lines, found {}",
                lines.len()
            )));
        }
        for (i, line) in lines.iter().enumerate() {
            let groups: Vec<&str> = line.split_whitespace().collect();
            if groups.len() != GROUPS_PER_LINE
                || groups.iter().any(|g| g.chars().count() != GROUP_LEN)
            {
                return Err(SearchError::InvalidLength(format!(
                    "line {} must have 9 groups of 4 characters",
                    i + 1
                )));
            }
        }

        let mut template = [[0u8; LINE_BYTES]; MAX_LINES];
        let mut positions = Vec::new();
        let mut missing_indexes = Vec::new();
        let mut nibble = 0usize;
        for (index, ch) in input.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let (line, pos) = (nibble / NIBBLES_PER_LINE, nibble % NIBBLES_PER_LINE);
            nibble += 1;
            if ch == missing_symbol {
                missing_indexes.push(index);
                positions.push((line, pos));
                continue;
            }
            let value = easy16_value(ch).ok_or(SearchError::InvalidChar { ch, index })? as u8;
            template[line][pos / 2] |= if pos % 2 == 0 { value << 4 } else { value };
        }

        let mut lines_to_check: Vec<usize> = positions.iter().map(|&(line, _)| line).collect();
        lines_to_check.dedup();
        for line in 0..lines.len() {
            if !lines_to_check.contains(&line) && !line_checksum_valid(&template[line]) {
                return Err(SearchError::InvalidChecksum);
            }
        }

        let defaults = vec![(0..16).collect::<Vec<u32>>(); missing_indexes.len()];
        Ok(Self {
            slots: Slots::new(input, missing_symbol, missing_indexes, defaults)?,
            template,
            line_count: lines.len(),
            positions,
            lines_to_check,
            index: 0,
            comparer: None,
        })
    }

    pub fn with_comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = Some(comparer);
        self
    }

    /// 要比较的地址序号 (从 0 开始)
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn has_chain_code(&self) -> bool {
        self.line_count == MAX_LINES
    }

    #[inline]
    fn fill(&self, cursor: &PermutationCursor<'_>) -> [[u8; LINE_BYTES]; MAX_LINES] {
        let mut lines = self.template;
        for (slot, &(line, pos)) in self.positions.iter().enumerate() {
            let value = cursor.current_value(slot) as u8;
            lines[line][pos / 2] |= if pos % 2 == 0 { value << 4 } else { value };
        }
        lines
    }

    fn key_from_lines(&self, lines: &[[u8; LINE_BYTES]; MAX_LINES]) -> Option<Scalar> {
        let mut root = [0u8; 32];
        root[..16].copy_from_slice(&lines[0][..16]);
        root[16..].copy_from_slice(&lines[1][..16]);
        let chain_code = if self.has_chain_code() {
            let mut cc = [0u8; 32];
            cc[..16].copy_from_slice(&lines[2][..16]);
            cc[16..].copy_from_slice(&lines[3][..16]);
            cc
        } else {
            derive_chain_code(&root)?
        };
        derive_key(&root, &chain_code, self.index)
    }
}

impl SearchSpace for ArmorySpace {
    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn parse_symbol(&self, text: &str) -> Result<u32, SearchError> {
        let c = single_char(text)?;
        easy16_value(c).ok_or(SearchError::InvalidChar { ch: c, index: 0 })
    }

    fn symbol_text(&self, symbol: u32) -> String {
        (EASY16_ALPHABET[symbol as usize] as char).to_string()
    }
}

impl Recovery for ArmorySpace {
    type State = Option<Comparer>;

    fn has_comparer(&self) -> bool {
        self.comparer.is_some()
    }

    fn new_state(&self) -> Self::State {
        self.comparer.clone()
    }

    fn check(&self, comparer: &mut Self::State, cursor: &PermutationCursor<'_>) -> bool {
        let lines = self.fill(cursor);
        if !self
            .lines_to_check
            .iter()
            .all(|&line| line_checksum_valid(&lines[line]))
        {
            return false;
        }
        let Some(comparer) = comparer.as_ref() else {
            return false;
        };
        self.key_from_lines(&lines)
            .is_some_and(|key| comparer.compare(&key))
    }
}
