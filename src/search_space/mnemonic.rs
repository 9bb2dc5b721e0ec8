//! BIP39 / Electrum 助记词搜索空间
//!
//! 缺失的是整个单词，候选值是单词在词表中的下标。BIP39 先用熵的 SHA-256 校验和
//! 过滤 (每个组合只需一次定长哈希)，Electrum 先用种子版本前缀过滤，通过后才做
//! 2048 轮 PBKDF2 和 BIP32 派生。
//!
//! 进入 PBKDF2 的助记词和密码都要先规范化: BIP39 用 NFKD，单词以半角空格连接；
//! Electrum 另外转小写、去掉组合附加符号，并删除两个 CJK 字符之间的空白。
//! 显示给用户的结果仍使用词表原文和语言自己的分隔符。

use hmac::{Hmac, Mac};
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

use crate::bip32::{DerivationPath, ExtendedKey};
use crate::comparer::Comparer;
use crate::config::{DEFAULT_BIP39_PATH, ElectrumSeedType, MnemonicType, WordListLanguage};
use crate::driver::Recovery;
use crate::error::SearchError;
use crate::ecc::Scalar;
use crate::hashing::sha256;
use crate::permutation::PermutationCursor;

use super::{SearchSpace, Slots};

pub const ALLOWED_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];
const WORD_LIST_LEN: u32 = 2048;
const PBKDF2_ROUNDS: u32 = 2048;

/// Electrum 视为 CJK 的码位区间
const CJK_INTERVALS: &[(u32, u32)] = &[
    (0x1100, 0x11FF),
    (0x2E80, 0x2FDF),
    (0x2FF0, 0x31FF),
    (0x3200, 0x4DBF),
    (0x4E00, 0x9FFF),
    (0xA000, 0xA4CF),
    (0xA960, 0xA97F),
    (0xAC00, 0xD7FF),
    (0xF900, 0xFAFF),
    (0xFE30, 0xFE4F),
    (0xFF00, 0xFFEF),
    (0x1B000, 0x1B0FF),
    (0x20000, 0x2FA1F),
];

fn is_cjk(c: char) -> bool {
    let c = c as u32;
    CJK_INTERVALS.iter().any(|&(lo, hi)| lo <= c && c <= hi)
}

/// 按 CJK 规则把单词连接成一句: 两个 CJK 字符之间不加空格
fn join_words<'a>(words: impl Iterator<Item = &'a str>, out: &mut String) {
    let mut prev_cjk = false;
    for (i, word) in words.enumerate() {
        if i > 0 && !(prev_cjk && word.chars().next().is_some_and(is_cjk)) {
            out.push(' ');
        }
        out.push_str(word);
        prev_cjk = word.chars().last().is_some_and(is_cjk);
    }
}

/// 按任意空白切分后用单个半角空格连接
fn join_words_plain(text: &str, out: &mut String) {
    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(word);
    }
}

/// BIP39 规范化 (NFKD)
pub fn normalize_bip39(text: &str) -> String {
    text.nfkd().collect()
}

/// Electrum 规范化: NFKD、小写、去掉组合附加符号、合并空白、删除 CJK 字符间的空白
pub fn normalize_electrum(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .flat_map(char::to_lowercase)
        .filter(|&c| canonical_combining_class(c) == 0)
        .collect();
    let mut out = String::with_capacity(folded.len());
    join_words(folded.split_whitespace(), &mut out);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MnemonicOptions {
    pub mnemonic_type: MnemonicType,
    pub language: WordListLanguage,
    pub passphrase: String,
    /// 为空时使用对应类型的默认路径
    pub path: Option<String>,
    pub electrum_type: ElectrumSeedType,
}

impl Default for MnemonicOptions {
    fn default() -> Self {
        Self {
            mnemonic_type: MnemonicType::Bip39,
            language: WordListLanguage::English,
            passphrase: String::new(),
            path: None,
            electrum_type: ElectrumSeedType::Standard,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MnemonicSpace {
    slots: Slots,
    options: MnemonicOptions,
    word_list: &'static [&'static str; 2048],
    /// 规范化后的词表，用来拼出进入 PBKDF2 的句子
    seed_words: Vec<String>,
    /// 每个位置的单词下标，缺失位置为 `None`
    words: Vec<Option<u16>>,
    path: DerivationPath,
    salt: Vec<u8>,
    /// Electrum 种子版本前缀的半字节
    version_prefix: Vec<u8>,
    comparer: Option<Comparer>,
}

/// 工作线程的可复用缓冲区
#[derive(Debug, Clone)]
pub struct MnemonicState {
    comparer: Option<Comparer>,
    phrase: String,
}

impl MnemonicSpace {
    pub fn process(
        input: &str,
        missing_symbol: char,
        options: MnemonicOptions,
    ) -> Result<Self, SearchError> {
        let language = options.language.to_bip39();
        let word_list = language.word_list();
        let symbol = missing_symbol.to_string();
        if missing_symbol.is_whitespace() || language.find_word(&symbol).is_some() {
            return Err(SearchError::InvalidMissingSymbol(missing_symbol));
        }
        if input.trim().is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let tokens: Vec<&str> = input.split_whitespace().collect();
        if !ALLOWED_WORD_COUNTS.contains(&tokens.len()) {
            return Err(SearchError::InvalidLength(format!(
                "a mnemonic must have 12, 15, 18, 21 or 24 words, found {}",
                tokens.len()
            )));
        }

        let mut words = Vec::with_capacity(tokens.len());
        let mut missing_indexes = Vec::new();
        for (index, token) in tokens.iter().enumerate() {
            if *token == symbol {
                missing_indexes.push(index);
                words.push(None);
            } else {
                let idx = language.find_word(token).ok_or_else(|| {
                    SearchError::Invalid(format!(
                        "word '{token}' at index {index} is not in the word list"
                    ))
                })?;
                words.push(Some(idx));
            }
        }

        let (default_path, version_prefix) = match options.mnemonic_type {
            MnemonicType::Bip39 => (DEFAULT_BIP39_PATH, Vec::new()),
            MnemonicType::Electrum => {
                let prefix = options
                    .electrum_type
                    .prefix()
                    .chars()
                    .filter_map(|c| c.to_digit(16).map(|d| d as u8))
                    .collect();
                (options.electrum_type.default_path(), prefix)
            }
        };
        let path: DerivationPath = options
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(default_path)
            .parse()?;
        let (seed_words, salt) = match options.mnemonic_type {
            MnemonicType::Bip39 => (
                word_list.iter().map(|w| normalize_bip39(w)).collect(),
                format!("mnemonic{}", normalize_bip39(&options.passphrase)),
            ),
            MnemonicType::Electrum => (
                word_list.iter().map(|w| normalize_electrum(w)).collect(),
                format!("electrum{}", normalize_electrum(&options.passphrase)),
            ),
        };

        let defaults = vec![(0..WORD_LIST_LEN).collect::<Vec<u32>>(); missing_indexes.len()];
        Ok(Self {
            slots: Slots::new(input, missing_symbol, missing_indexes, defaults)?,
            options,
            word_list,
            seed_words,
            words,
            path,
            salt: salt.into_bytes(),
            version_prefix,
            comparer: None,
        })
    }

    pub fn with_comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = Some(comparer);
        self
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    #[inline]
    fn word_at(&self, cursor: &PermutationCursor<'_>, slot_iter: &mut usize, pos: usize) -> u16 {
        match self.words[pos] {
            Some(w) => w,
            None => {
                let w = cursor.current_value(*slot_iter) as u16;
                *slot_iter += 1;
                w
            }
        }
    }

    /// BIP39 熵校验和
    pub fn checksum_valid(&self, cursor: &PermutationCursor<'_>) -> bool {
        let n = self.words.len();
        let mut packed = [0u8; 33];
        let mut acc = 0u32;
        let mut bits = 0u32;
        let mut out = 0usize;
        let mut slot = 0usize;
        for pos in 0..n {
            acc = (acc << 11) | self.word_at(cursor, &mut slot, pos) as u32;
            bits += 11;
            while bits >= 8 {
                bits -= 8;
                packed[out] = (acc >> bits) as u8;
                out += 1;
            }
            acc &= (1 << bits) - 1;
        }
        if bits > 0 {
            packed[out] = (acc << (8 - bits)) as u8;
        }

        let entropy_len = n * 4 / 3;
        let checksum_bits = n / 3;
        let hash = match entropy_len {
            16 => packed[..16].try_into().map(sha256::hash_16),
            20 => packed[..20].try_into().map(sha256::hash_20),
            24 => packed[..24].try_into().map(sha256::hash_24),
            28 => packed[..28].try_into().map(sha256::hash_28),
            _ => packed[..32].try_into().map(sha256::hash_32),
        };
        let Ok(hash) = hash else {
            return false;
        };
        let shift = 8 - checksum_bits;
        hash[0] >> shift == packed[entropy_len] >> shift
    }

    fn write_phrase(&self, cursor: &PermutationCursor<'_>, phrase: &mut String) {
        phrase.clear();
        let separator = self.options.language.separator();
        let mut slot = 0usize;
        for pos in 0..self.words.len() {
            if pos > 0 {
                phrase.push_str(separator);
            }
            let w = self.word_at(cursor, &mut slot, pos);
            phrase.push_str(self.word_list[w as usize]);
        }
    }

    /// 拼出规范化后的句子，即 PBKDF2 的口令
    fn write_seed_phrase(&self, cursor: &PermutationCursor<'_>, phrase: &mut String) {
        phrase.clear();
        let mut slot = 0usize;
        let words = (0..self.words.len()).map(|pos| {
            self.seed_words[self.word_at(cursor, &mut slot, pos) as usize].as_str()
        });
        match self.options.mnemonic_type {
            MnemonicType::Bip39 => {
                for (i, word) in words.enumerate() {
                    if i > 0 {
                        phrase.push(' ');
                    }
                    phrase.push_str(word);
                }
            }
            MnemonicType::Electrum => join_words(words, phrase),
        }
    }

    /// 按助记词类型规范化任意一句助记词
    pub fn normalize(&self, phrase: &str) -> String {
        match self.options.mnemonic_type {
            MnemonicType::Bip39 => {
                let mut out = String::with_capacity(phrase.len());
                join_words_plain(&normalize_bip39(phrase), &mut out);
                out
            }
            MnemonicType::Electrum => normalize_electrum(phrase),
        }
    }

    /// Electrum 种子版本前缀，`phrase` 必须已经规范化
    fn version_matches(&self, phrase: &str) -> bool {
        let Ok(mut mac) = Hmac::<Sha512>::new_from_slice(b"Seed version") else {
            return false;
        };
        mac.update(phrase.as_bytes());
        let hash = mac.finalize().into_bytes();
        self.version_prefix.iter().enumerate().all(|(i, &nibble)| {
            let byte = hash[i / 2];
            let actual = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            actual == nibble
        })
    }

    /// 由完整助记词派生路径上的私钥，助记词先按类型规范化
    pub fn derive_key(&self, phrase: &str) -> Option<Scalar> {
        self.derive_normalized(&self.normalize(phrase))
    }

    fn derive_normalized(&self, phrase: &str) -> Option<Scalar> {
        let mut seed = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha512>(phrase.as_bytes(), &self.salt, PBKDF2_ROUNDS, &mut seed);
        let master = ExtendedKey::master(&seed)?;
        Some(master.derive_path(&self.path)?.key)
    }
}

impl SearchSpace for MnemonicSpace {
    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn parse_symbol(&self, text: &str) -> Result<u32, SearchError> {
        self.options
            .language
            .to_bip39()
            .find_word(text)
            .map(u32::from)
            .ok_or_else(|| SearchError::Invalid(format!("word '{text}' is not in the word list")))
    }

    fn symbol_text(&self, symbol: u32) -> String {
        self.word_list[symbol as usize].to_string()
    }

    fn complete(&self, cursor: &PermutationCursor<'_>) -> String {
        let mut phrase = String::new();
        self.write_phrase(cursor, &mut phrase);
        phrase
    }
}

impl Recovery for MnemonicSpace {
    type State = MnemonicState;

    fn has_comparer(&self) -> bool {
        self.comparer.is_some()
    }

    fn new_state(&self) -> Self::State {
        MnemonicState {
            comparer: self.comparer.clone(),
            phrase: String::with_capacity(24 * 9),
        }
    }

    fn check(&self, state: &mut Self::State, cursor: &PermutationCursor<'_>) -> bool {
        if self.options.mnemonic_type == MnemonicType::Bip39 && !self.checksum_valid(cursor) {
            return false;
        }
        self.write_seed_phrase(cursor, &mut state.phrase);
        if self.options.mnemonic_type == MnemonicType::Electrum
            && !self.version_matches(&state.phrase)
        {
            return false;
        }
        let Some(comparer) = state.comparer.as_ref() else {
            return false;
        };
        self.derive_normalized(&state.phrase)
            .is_some_and(|key| comparer.compare(&key))
    }
}
