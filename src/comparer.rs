//! 候选私钥与已知事实的比较
//!
//! 每种比较器只做到达目标表示所需的最少派生: 私钥比较不做任何派生，公钥比较做
//! 一次标量乘法，地址比较再加一到两次哈希。比较器是纯值类型，`Clone` 即深拷贝，
//! 每个工作线程持有自己的副本。

use sha3::{Digest, Keccak256};

use crate::config::CompareType;
use crate::ecc::{AffinePoint, Scalar, multiply_by_g};
use crate::encoding::{self, P2PKH_VERSION, P2SH_VERSION, TRON_VERSION};
use crate::error::SearchError;
use crate::hashing::{hash160_22, hash160_33, hash160_65};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparer {
    CompressedAddress([u8; 20]),
    UncompressedAddress([u8; 20]),
    EitherAddress([u8; 20]),
    /// P2SH-P2WPKH 脚本哈希
    NestedSegwit([u8; 20]),
    PubKey(AffinePoint),
    PrivateKey(Scalar),
    /// Keccak-256(未压缩公钥去掉 0x04) 的后 20 字节
    Tron([u8; 20]),
}

impl Comparer {
    /// 解析目标描述并构造比较器
    pub fn new(kind: CompareType, target: &str) -> Result<Self, SearchError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(SearchError::InvalidTarget("compare input is empty".into()));
        }
        match kind {
            CompareType::AddrComp => Ok(Self::CompressedAddress(p2pkh_hash(target)?)),
            CompareType::AddrUnComp => Ok(Self::UncompressedAddress(p2pkh_hash(target)?)),
            CompareType::AddrBoth => Ok(Self::EitherAddress(p2pkh_hash(target)?)),
            CompareType::AddrNested => {
                let (version, hash) = encoding::decode_address(target).map_err(target_error)?;
                if version != P2SH_VERSION {
                    return Err(SearchError::InvalidTarget(
                        "nested SegWit addresses must start with 3".into(),
                    ));
                }
                Ok(Self::NestedSegwit(hash))
            }
            CompareType::Pubkey => {
                let bytes = hex::decode(target)
                    .map_err(|e| SearchError::InvalidTarget(format!("invalid hex: {e}")))?;
                AffinePoint::parse(&bytes)
                    .map(Self::PubKey)
                    .ok_or_else(|| SearchError::InvalidTarget("invalid public key".into()))
            }
            CompareType::PrivateKey => parse_private_key(target).map(Self::PrivateKey),
            CompareType::Tron => {
                let payload = encoding::decode_check(target).map_err(target_error)?;
                if payload.len() != 21 || payload[0] != TRON_VERSION {
                    return Err(SearchError::InvalidTarget("invalid Tron address".into()));
                }
                let mut hash = [0u8; 20];
                hash.copy_from_slice(&payload[1..]);
                Ok(Self::Tron(hash))
            }
        }
    }

    /// 用新的目标重新初始化，类型不变；解析失败时保持原状并返回 `false`
    pub fn init(&mut self, target: &str) -> bool {
        match Self::new(self.kind(), target) {
            Ok(parsed) => {
                *self = parsed;
                true
            }
            Err(_) => false,
        }
    }

    pub fn kind(&self) -> CompareType {
        match self {
            Self::CompressedAddress(_) => CompareType::AddrComp,
            Self::UncompressedAddress(_) => CompareType::AddrUnComp,
            Self::EitherAddress(_) => CompareType::AddrBoth,
            Self::NestedSegwit(_) => CompareType::AddrNested,
            Self::PubKey(_) => CompareType::Pubkey,
            Self::PrivateKey(_) => CompareType::PrivateKey,
            Self::Tron(_) => CompareType::Tron,
        }
    }

    /// 候选私钥是否符合目标，零标量永远不匹配
    #[inline]
    pub fn compare(&self, key: &Scalar) -> bool {
        if key.is_zero() {
            return false;
        }
        if let Self::PrivateKey(expected) = self {
            return key == expected;
        }
        let point = multiply_by_g(key).to_affine();
        self.compare_point(&point)
    }

    /// 公钥是否符合目标 (私钥比较器无法只凭公钥判断，返回 `false`)
    #[inline]
    pub fn compare_point(&self, point: &AffinePoint) -> bool {
        if point.infinity {
            return false;
        }
        match self {
            Self::CompressedAddress(hash) => hash160_33(&point.to_compressed()) == *hash,
            Self::UncompressedAddress(hash) => hash160_65(&point.to_uncompressed()) == *hash,
            Self::EitherAddress(hash) => {
                hash160_33(&point.to_compressed()) == *hash
                    || hash160_65(&point.to_uncompressed()) == *hash
            }
            Self::NestedSegwit(hash) => {
                let mut script = [0u8; 22];
                script[1] = 0x14;
                script[2..].copy_from_slice(&hash160_33(&point.to_compressed()));
                hash160_22(&script) == *hash
            }
            Self::PubKey(expected) => point == expected,
            Self::PrivateKey(_) => false,
            Self::Tron(hash) => tron_hash(point) == *hash,
        }
    }
}

fn target_error(e: SearchError) -> SearchError {
    SearchError::InvalidTarget(e.to_string())
}

fn p2pkh_hash(target: &str) -> Result<[u8; 20], SearchError> {
    let (version, hash) = encoding::decode_address(target).map_err(target_error)?;
    if version != P2PKH_VERSION {
        return Err(SearchError::InvalidTarget(
            "P2PKH addresses must start with 1".into(),
        ));
    }
    Ok(hash)
}

/// WIF 或 64 位十六进制
fn parse_private_key(target: &str) -> Result<Scalar, SearchError> {
    if target.len() == 64 && target.chars().all(|c| c.is_ascii_hexdigit()) {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(target, &mut bytes)
            .map_err(|e| SearchError::InvalidTarget(e.to_string()))?;
        return Scalar::from_private_key(&bytes)
            .ok_or_else(|| SearchError::InvalidTarget("private key is out of range".into()));
    }
    encoding::decode_wif(target)
        .map(|wif| wif.key)
        .map_err(target_error)
}

fn tron_hash(point: &AffinePoint) -> [u8; 20] {
    let uncompressed = point.to_uncompressed();
    let digest = Keccak256::digest(&uncompressed[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    out
}

/// Tron 地址 (Base58Check, 版本 0x41)
pub fn tron_address(point: &AffinePoint) -> String {
    let mut payload = [0u8; 21];
    payload[0] = TRON_VERSION;
    payload[1..].copy_from_slice(&tron_hash(point));
    encoding::encode_check(&payload)
}
