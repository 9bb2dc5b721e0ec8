//! Base58 (WIF 私钥 / Base58Check 地址) 搜索空间
//!
//! Base58 字符串的数值是 `Σ index(c_p) · 58^(len-1-p)`。构建时为每个符号和每个
//! 58 的幂预计算它对数值的贡献，并左移 `shift` 位，使载荷恰好占满若干个 32 位字
//! 的最高位。热循环里只需把已知字符的基值与各缺失位置的表项按字相加、进位归一，
//! 再取出字节做一次双 SHA-256，不需要逐个候选做完整的 Base58 解码。

use crate::comparer::Comparer;
use crate::driver::Recovery;
use crate::ecc::Scalar;
use crate::encoding::{
    self, BASE58_ALPHABET, COMPRESSED_FLAG, P2PKH_VERSION, P2SH_VERSION, WIF_VERSION,
};
use crate::error::SearchError;
use crate::hashing::sha256;
use crate::permutation::PermutationCursor;

use super::{SearchSpace, Slots, check_missing_symbol, single_char};

/// 工作缓冲区能容纳的最多 32 位字数
const MAX_WORDS: usize = 10;

const WIF_UNCOMPRESSED_LEN: usize = 51;
const WIF_COMPRESSED_LEN: usize = 52;
const ADDRESS_MIN_LEN: usize = 26;
const ADDRESS_MAX_LEN: usize = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base58Kind {
    /// WIF 私钥
    PrivateKey,
    /// P2PKH / P2SH 地址
    Address,
}

/// 载荷字节数、32 位字数与左移位数，满足 `word_len * 32 == payload_len * 8 + shift`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    payload_len: usize,
    word_len: usize,
    shift: u32,
}

const WIF_COMPRESSED: Layout = Layout {
    payload_len: 38,
    word_len: 10,
    shift: 16,
};

const WIF_UNCOMPRESSED: Layout = Layout {
    payload_len: 37,
    word_len: 10,
    shift: 24,
};

const ADDRESS: Layout = Layout {
    payload_len: 25,
    word_len: 7,
    shift: 24,
};

/// `58^j · i << shift` 的 32 位字分解 (大端字序)
///
/// 结果按 `(j * 58 + i) * word_len + k` 压平。最高字不截断，溢出部分留在高 32 位，
/// 用于检测超出载荷长度的数值。
pub fn shifted_mult_pow58(max_pow: usize, word_len: usize, shift: u32) -> Vec<u64> {
    let mut table = vec![0u64; max_pow * 58 * word_len];
    // 58^j << shift，小端 32 位字，多留一个字给最高字的溢出
    let mut power = vec![0u64; word_len + 1];
    let start = 1u128 << shift;
    power[0] = start as u64 & 0xffff_ffff;
    if word_len > 1 {
        power[1] = (start >> 32) as u64;
    }

    for j in 0..max_pow {
        for i in 0..58u64 {
            let base = (j * 58 + i as usize) * word_len;
            let mut carry = 0u64;
            for (k, &limb) in power.iter().enumerate().take(word_len) {
                let v = limb * i + carry;
                carry = v >> 32;
                let out = &mut table[base + word_len - 1 - k];
                if k == word_len - 1 {
                    *out = v;
                } else {
                    *out = v & 0xffff_ffff;
                }
            }
        }

        let mut carry = 0u64;
        for limb in power.iter_mut() {
            let v = *limb * 58 + carry;
            *limb = v & 0xffff_ffff;
            carry = v >> 32;
        }
        // 最高字以上的部分已不会用到
        let top = word_len - 1;
        power[top] += power[word_len] << 32;
        power[word_len] = 0;
    }
    table
}

#[derive(Debug, Clone)]
pub struct Base58Space {
    slots: Slots,
    kind: Base58Kind,
    layout: Layout,
    /// 已知字符贡献之和
    base: [u64; MAX_WORDS],
    /// 每个缺失位置对应的 58 的幂在表中的起始下标
    slot_offsets: Vec<usize>,
    table: Vec<u64>,
    comparer: Option<Comparer>,
}

impl Base58Space {
    pub fn process(input: &str, missing_symbol: char, kind: Base58Kind) -> Result<Self, SearchError> {
        check_missing_symbol(missing_symbol, |c| encoding::base58_index(c).is_some())?;
        if input.trim().is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let chars: Vec<char> = input.chars().collect();
        let mut missing_indexes = Vec::new();
        let mut known = Vec::with_capacity(chars.len());
        for (index, &ch) in chars.iter().enumerate() {
            if ch == missing_symbol {
                missing_indexes.push(index);
                known.push(None);
            } else {
                match encoding::base58_index(ch) {
                    Some(v) => known.push(Some(v)),
                    None => return Err(SearchError::InvalidChar { ch, index }),
                }
            }
        }

        let layout = match kind {
            Base58Kind::PrivateKey => Self::wif_layout(&chars)?,
            Base58Kind::Address => Self::address_layout(&chars)?,
        };

        let table = shifted_mult_pow58(chars.len(), layout.word_len, layout.shift);
        let wl = layout.word_len;
        let mut base = [0u64; MAX_WORDS];
        for (pos, sym) in known.iter().enumerate() {
            if let Some(sym) = sym {
                let pow = chars.len() - 1 - pos;
                let start = (pow * 58 + *sym as usize) * wl;
                for (acc, w) in base[..wl].iter_mut().zip(&table[start..start + wl]) {
                    *acc += w;
                }
            }
        }
        let slot_offsets = missing_indexes
            .iter()
            .map(|&pos| (chars.len() - 1 - pos) * 58 * wl)
            .collect();

        let defaults = vec![(0..58).collect::<Vec<u32>>(); missing_indexes.len()];
        Ok(Self {
            slots: Slots::new(input, missing_symbol, missing_indexes, defaults)?,
            kind,
            layout,
            base,
            slot_offsets,
            table,
            comparer: None,
        })
    }

    fn wif_layout(chars: &[char]) -> Result<Layout, SearchError> {
        let (layout, firsts): (Layout, &[char]) = match chars.len() {
            WIF_UNCOMPRESSED_LEN => (WIF_UNCOMPRESSED, &['5']),
            WIF_COMPRESSED_LEN => (WIF_COMPRESSED, &['K', 'L']),
            n => {
                return Err(SearchError::InvalidLength(format!(
                    "a WIF private key must be {WIF_UNCOMPRESSED_LEN} or {WIF_COMPRESSED_LEN} characters, found {n}"
                )));
            }
        };
        let first = chars[0];
        if encoding::base58_index(first).is_some() && !firsts.contains(&first) {
            return Err(SearchError::Invalid(format!(
                "a {}-character WIF must start with {}",
                chars.len(),
                firsts.iter().map(char::to_string).collect::<Vec<_>>().join(" or ")
            )));
        }
        Ok(layout)
    }

    fn address_layout(chars: &[char]) -> Result<Layout, SearchError> {
        if !(ADDRESS_MIN_LEN..=ADDRESS_MAX_LEN).contains(&chars.len()) {
            return Err(SearchError::InvalidLength(format!(
                "an address must be between {ADDRESS_MIN_LEN} and {ADDRESS_MAX_LEN} characters, found {}",
                chars.len()
            )));
        }
        let first = chars[0];
        if encoding::base58_index(first).is_some() && first != '1' && first != '3' {
            return Err(SearchError::Invalid(
                "only P2PKH (1...) and P2SH (3...) addresses are supported".into(),
            ));
        }
        Ok(ADDRESS)
    }

    /// 私钥搜索可以额外指定比较器，否则以第一个校验和通过的私钥为结果
    pub fn with_comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = Some(comparer);
        self
    }

    pub fn kind(&self) -> Base58Kind {
        self.kind
    }

    pub fn is_compressed(&self) -> bool {
        self.layout == WIF_COMPRESSED
    }

    /// 没有缺失字符时直接校验结构和校验和
    pub fn process_no_missing(&self) -> Result<(), SearchError> {
        if self.slots.miss_count() != 0 {
            return Err(SearchError::Invalid(
                "the input still has missing characters".into(),
            ));
        }
        let input = self.slots.input();
        match self.kind {
            Base58Kind::PrivateKey => {
                let wif = encoding::decode_wif(input)?;
                if wif.compressed != self.is_compressed() {
                    return Err(SearchError::Invalid("invalid compressed flag".into()));
                }
            }
            Base58Kind::Address => {
                let (version, _) = encoding::decode_address(input)?;
                if version != P2PKH_VERSION && version != P2SH_VERSION {
                    return Err(SearchError::Invalid(format!(
                        "invalid address version byte 0x{version:02x}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// 当前组合对应的载荷字节，数值超出载荷长度时返回 `None`
    #[inline]
    fn evaluate(&self, cursor: &PermutationCursor<'_>, out: &mut [u8; MAX_WORDS * 4]) -> bool {
        let wl = self.layout.word_len;
        let mut acc = self.base;
        for (slot, &offset) in self.slot_offsets.iter().enumerate() {
            let start = offset + cursor.current_value(slot) as usize * wl;
            for (a, w) in acc[..wl].iter_mut().zip(&self.table[start..start + wl]) {
                *a += w;
            }
        }
        for k in (1..wl).rev() {
            acc[k - 1] += acc[k] >> 32;
            acc[k] &= 0xffff_ffff;
        }
        if acc[0] >> 32 != 0 {
            return false;
        }
        for (chunk, word) in out.chunks_exact_mut(4).zip(&acc[..wl]) {
            chunk.copy_from_slice(&(*word as u32).to_be_bytes());
        }
        true
    }

    #[inline]
    fn checksum_matches(&self, payload: &[u8]) -> bool {
        let split = self.layout.payload_len - 4;
        let (data, checksum) = payload[..self.layout.payload_len].split_at(split);
        let hash = match split {
            34 => data.try_into().map(sha256::double_hash_34),
            33 => data.try_into().map(sha256::double_hash_33),
            _ => data.try_into().map(sha256::double_hash_21),
        };
        hash.is_ok_and(|h| h[..4] == *checksum)
    }

    /// 地址的前导 `1` 个数必须等于载荷的前导零字节数
    fn leading_ones_match(&self, cursor: &PermutationCursor<'_>, payload: &[u8]) -> bool {
        let zeros = payload[..self.layout.payload_len]
            .iter()
            .take_while(|&&b| b == 0)
            .count();
        let ones = self
            .slots
            .input()
            .chars()
            .enumerate()
            .map(|(pos, c)| match self.slots.slot_of(pos) {
                Some(slot) => BASE58_ALPHABET[cursor.current_value(slot) as usize] as char,
                None => c,
            })
            .take_while(|&c| c == '1')
            .count();
        zeros == ones
    }
}

impl SearchSpace for Base58Space {
    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn parse_symbol(&self, text: &str) -> Result<u32, SearchError> {
        let c = single_char(text)?;
        encoding::base58_index(c).ok_or(SearchError::InvalidChar { ch: c, index: 0 })
    }

    fn symbol_text(&self, symbol: u32) -> String {
        (BASE58_ALPHABET[symbol as usize] as char).to_string()
    }
}

impl Recovery for Base58Space {
    type State = Option<Comparer>;

    fn requires_comparer(&self) -> bool {
        false
    }

    fn has_comparer(&self) -> bool {
        self.comparer.is_some()
    }

    fn new_state(&self) -> Self::State {
        self.comparer.clone()
    }

    fn check(&self, comparer: &mut Self::State, cursor: &PermutationCursor<'_>) -> bool {
        let mut payload = [0u8; MAX_WORDS * 4];
        if !self.evaluate(cursor, &mut payload) || !self.checksum_matches(&payload) {
            return false;
        }

        match self.kind {
            Base58Kind::PrivateKey => {
                if payload[0] != WIF_VERSION {
                    return false;
                }
                if self.is_compressed() && payload[33] != COMPRESSED_FLAG {
                    return false;
                }
                let mut key = [0u8; 32];
                key.copy_from_slice(&payload[1..33]);
                let Some(key) = Scalar::from_private_key(&key) else {
                    return false;
                };
                comparer.as_ref().is_none_or(|c| c.compare(&key))
            }
            Base58Kind::Address => {
                (payload[0] == P2PKH_VERSION || payload[0] == P2SH_VERSION)
                    && self.leading_ones_match(cursor, &payload)
            }
        }
    }
}
