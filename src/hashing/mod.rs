//! 哈希原语
//!
//! SHA-256、SHA-512、RIPEMD-160 以及 HASH160 = RIPEMD160(SHA256(x))。
//! 每个算法都有通用流式版本和按输入长度单态化的特化版本，两者输出逐位一致。
//! 哈希状态不在线程间共享，每个工作线程持有自己的实例。
//! HMAC 与 PBKDF2 直接使用 `hmac` / `pbkdf2` crate。

pub mod ripemd160;
pub mod sha256;
pub mod sha512;

pub use ripemd160::Ripemd160;
pub use sha256::Sha256;
pub use sha512::Sha512;

/// 任意长度输入的 HASH160
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160::hash_32(&sha256::digest(data))
}

/// 固定长度 HASH160
#[inline]
pub fn hash160_fixed<const L: usize>(data: &[u8; L]) -> [u8; 20] {
    ripemd160::hash_32(&sha256::digest_fixed::<L>(data))
}

/// 压缩公钥的 HASH160
#[inline]
pub fn hash160_33(data: &[u8; 33]) -> [u8; 20] {
    hash160_fixed::<33>(data)
}

/// 未压缩公钥的 HASH160
#[inline]
pub fn hash160_65(data: &[u8; 65]) -> [u8; 20] {
    hash160_fixed::<65>(data)
}

/// P2SH-P2WPKH 赎回脚本 (`0x00 0x14 <hash160>`) 的 HASH160
#[inline]
pub fn hash160_22(data: &[u8; 22]) -> [u8; 20] {
    hash160_fixed::<22>(data)
}
