//! 比特币私钥恢复系统
//!
//! 输入是一段缺了若干字符 (或单词) 的秘密: WIF 私钥、地址、十六进制私钥、
//! 助记词、迷你私钥、Core 钱包密码或 Armory 纸钱包备份。本库枚举缺失位置的
//! 所有候选组合，用校验和过滤，再与已知事实 (地址、公钥等) 比较，多线程并行搜索。

pub mod api;
pub mod bip32;
pub mod comparer;
pub mod config;
pub mod driver;
pub mod ecc;
pub mod encoding;
pub mod error;
pub mod hashing;
pub mod permutation;
pub mod search_space;

pub use api::{RecoveryRequest, RecoveryResponse, apply_candidates, parse_candidates, recover, recover_with};
pub use comparer::Comparer;
pub use config::{
    CompareType, ElectrumSeedType, InputKind, MnemonicType, SearchSettings, WordListLanguage,
};
pub use driver::{MatchResult, Recovery, SearchControl, SearchReport, SearchState};
pub use error::SearchError;
pub use permutation::{PermutationCursor, PermutationSet};
pub use search_space::mnemonic::MnemonicOptions;
pub use search_space::{
    ArmorySpace, Base16Space, Base58Kind, Base58Space, CorePassSpace, MiniKeySpace, MnemonicSpace,
    SearchSpace, Slots,
};
