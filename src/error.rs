//! 搜索空间构建阶段的错误

use thiserror::Error;

/// 构建搜索空间或比较器时的校验失败
///
/// 热循环中的失败 (标量溢出、校验和不符、点不在曲线上) 只是普通的“不匹配”，不会出现在这里。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("missing character '{0}' is not accepted (it is part of the alphabet or whitespace)")]
    InvalidMissingSymbol(char),

    #[error("input can not be null or empty")]
    EmptyInput,

    #[error("invalid character '{ch}' found at index {index}")]
    InvalidChar { ch: char, index: usize },

    #[error("invalid input length: {0}")]
    InvalidLength(String),

    #[error("invalid checksum")]
    InvalidChecksum,

    #[error("unsupported {0}")]
    Unsupported(String),

    #[error("there must be at least 2 possible values for the {0} missing item")]
    TooFewCandidates(String),

    #[error("invalid compare input: {0}")]
    InvalidTarget(String),

    #[error("a comparer is required for this kind of search")]
    MissingComparer,

    #[error("the search control is already driving another search")]
    ControlBusy,

    #[error("{0}")]
    Invalid(String),
}

/// 英文序数词: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st ...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
