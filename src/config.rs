//! 搜索配置与各类选择器
//!
//! 选择器都实现 `FromStr`，命令行和外部调用方用同一套名字。

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SearchError;

/// 输入的编码类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Base58 WIF 私钥
    Wif,
    /// Base58Check 地址 (P2PKH / P2SH)
    Address,
    /// 64 位十六进制私钥
    Base16,
    /// BIP39 / Electrum 助记词
    Mnemonic,
    /// Casascius 迷你私钥
    MiniKey,
    /// Bitcoin Core 钱包密码
    CorePass,
    /// Armory 纸钱包备份
    Armory,
}

impl FromStr for InputKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wif" | "base58" | "base58-key" => Ok(Self::Wif),
            "address" | "base58-address" => Ok(Self::Address),
            "base16" | "hex" => Ok(Self::Base16),
            "mnemonic" => Ok(Self::Mnemonic),
            "minikey" | "mini-key" => Ok(Self::MiniKey),
            "core-pass" | "corepass" => Ok(Self::CorePass),
            "armory" => Ok(Self::Armory),
            other => Err(SearchError::Unsupported(format!("input kind '{other}'"))),
        }
    }
}

/// 比较器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareType {
    /// 压缩公钥的 P2PKH 地址
    AddrComp,
    /// 未压缩公钥的 P2PKH 地址
    AddrUnComp,
    /// 压缩或未压缩任一 P2PKH 地址
    AddrBoth,
    /// P2SH-P2WPKH 嵌套隔离见证地址
    AddrNested,
    /// 公钥 (十六进制)
    Pubkey,
    /// 私钥 (WIF 或十六进制)
    PrivateKey,
    /// Tron 地址
    Tron,
}

impl CompareType {
    pub const ALL: [CompareType; 7] = [
        Self::AddrComp,
        Self::AddrUnComp,
        Self::AddrBoth,
        Self::AddrNested,
        Self::Pubkey,
        Self::PrivateKey,
        Self::Tron,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AddrComp => "addr-comp",
            Self::AddrUnComp => "addr-uncomp",
            Self::AddrBoth => "addr-both",
            Self::AddrNested => "addr-nested",
            Self::Pubkey => "pubkey",
            Self::PrivateKey => "privkey",
            Self::Tron => "tron",
        }
    }
}

impl fmt::Display for CompareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompareType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SearchError::Unsupported(format!("compare type '{s}'")))
    }
}

/// 助记词词表语言
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordListLanguage {
    English,
    ChineseSimplified,
    ChineseTraditional,
    Czech,
    French,
    Italian,
    Japanese,
    Korean,
    Spanish,
}

impl WordListLanguage {
    pub fn to_bip39(self) -> bip39::Language {
        match self {
            Self::English => bip39::Language::English,
            Self::ChineseSimplified => bip39::Language::SimplifiedChinese,
            Self::ChineseTraditional => bip39::Language::TraditionalChinese,
            Self::Czech => bip39::Language::Czech,
            Self::French => bip39::Language::French,
            Self::Italian => bip39::Language::Italian,
            Self::Japanese => bip39::Language::Japanese,
            Self::Korean => bip39::Language::Korean,
            Self::Spanish => bip39::Language::Spanish,
        }
    }

    /// 日语助记词用全角空格连接
    pub fn separator(self) -> &'static str {
        match self {
            Self::Japanese => "\u{3000}",
            _ => " ",
        }
    }
}

impl FromStr for WordListLanguage {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" => Ok(Self::English),
            "chinese-simplified" | "chinesesimplified" => Ok(Self::ChineseSimplified),
            "chinese-traditional" | "chinesetraditional" => Ok(Self::ChineseTraditional),
            "czech" => Ok(Self::Czech),
            "french" => Ok(Self::French),
            "italian" => Ok(Self::Italian),
            "japanese" => Ok(Self::Japanese),
            "korean" => Ok(Self::Korean),
            "spanish" => Ok(Self::Spanish),
            other => Err(SearchError::Unsupported(format!("word list '{other}'"))),
        }
    }
}

/// 助记词标准
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicType {
    Bip39,
    Electrum,
}

impl FromStr for MnemonicType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bip39" => Ok(Self::Bip39),
            "electrum" => Ok(Self::Electrum),
            other => Err(SearchError::Unsupported(format!("mnemonic type '{other}'"))),
        }
    }
}

/// Electrum 种子版本，决定 `HMAC-SHA512("Seed version", phrase)` 的十六进制前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectrumSeedType {
    Standard,
    SegWit,
    TwoFa,
    TwoFaSegWit,
}

impl ElectrumSeedType {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Standard => "01",
            Self::SegWit => "100",
            Self::TwoFa => "101",
            Self::TwoFaSegWit => "102",
        }
    }

    /// 该类型钱包第一个接收地址的默认派生路径
    pub fn default_path(self) -> &'static str {
        match self {
            Self::Standard | Self::TwoFa => "m/0/0",
            Self::SegWit | Self::TwoFaSegWit => "m/0'/0/0",
        }
    }
}

impl FromStr for ElectrumSeedType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "segwit" => Ok(Self::SegWit),
            "2fa" => Ok(Self::TwoFa),
            "2fa-segwit" => Ok(Self::TwoFaSegWit),
            "old" => Err(SearchError::Unsupported(
                "electrum seed type 'old' (pre-2.0 word list is not available)".into(),
            )),
            other => Err(SearchError::Unsupported(format!(
                "electrum seed type '{other}'"
            ))),
        }
    }
}

/// BIP39 默认派生路径 (BIP44 第一个接收地址)
pub const DEFAULT_BIP39_PATH: &str = "m/44'/0'/0'/0/0";

/// 搜索驱动的运行参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// 工作线程数，限制在 `[1, 逻辑核心数]`
    pub core_count: usize,
    /// 工作线程每隔多少次迭代检查一次停止/暂停标志并汇报进度
    pub check_interval: u64,
    /// 主线程汇报进度的周期
    pub poll_interval: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            core_count: num_cpus::get(),
            check_interval: 2048, // 每2048次迭代检查一次，降低原子写入频率
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl SearchSettings {
    /// 限制到可用范围内的线程数
    pub fn clamped_core_count(&self) -> usize {
        self.core_count.clamp(1, num_cpus::get().max(1))
    }
}
