//! 手写哈希原语与 sha2 / ripemd crate 的一致性测试

mod common;

use rand::{Rng, RngCore};
use ripemd::Ripemd160;
use rust_keyrecover::hashing::{self, ripemd160, sha256, sha512};
use sha2::{Digest, Sha256, Sha512};

fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试: 任意长度 (覆盖 0..300 字节的所有填充边界) 的 SHA-256
    #[test]
    fn test_sha256_all_lengths() {
        for len in 0..300 {
            let data = random_bytes(len);
            assert_eq!(sha256::digest(&data)[..], Sha256::digest(&data)[..], "len {len}");
            assert_eq!(
                sha256::double_digest(&data)[..],
                Sha256::digest(Sha256::digest(&data))[..],
                "len {len}"
            );
        }
    }

    /// 测试: 特化长度的单次和双重哈希
    #[test]
    fn test_sha256_specialized_lengths() {
        macro_rules! check {
            ($($single:ident, $double:ident => $len:literal;)*) => {$(
                for _ in 0..8 {
                    let data: [u8; $len] = rand::thread_rng().r#gen();
                    assert_eq!(sha256::$single(&data)[..], Sha256::digest(data)[..]);
                    assert_eq!(
                        sha256::$double(&data)[..],
                        Sha256::digest(Sha256::digest(data))[..]
                    );
                }
            )*};
        }
        check! {
            hash_16, double_hash_16 => 16;
            hash_20, double_hash_20 => 20;
            hash_21, double_hash_21 => 21;
            hash_22, double_hash_22 => 22;
            hash_23, double_hash_23 => 23;
            hash_24, double_hash_24 => 24;
            hash_26, double_hash_26 => 26;
            hash_27, double_hash_27 => 27;
            hash_28, double_hash_28 => 28;
            hash_30, double_hash_30 => 30;
            hash_31, double_hash_31 => 31;
            hash_32, double_hash_32 => 32;
        }
        for _ in 0..8 {
            let mut data = [0u8; 65];
            rand::thread_rng().fill_bytes(&mut data);
            assert_eq!(sha256::hash_65(&data)[..], Sha256::digest(data)[..]);
            let mut data = [0u8; 33];
            rand::thread_rng().fill_bytes(&mut data);
            assert_eq!(sha256::hash_33(&data)[..], Sha256::digest(data)[..]);
            let mut data = [0u8; 34];
            rand::thread_rng().fill_bytes(&mut data);
            assert_eq!(
                sha256::double_hash_34(&data)[..],
                Sha256::digest(Sha256::digest(data))[..]
            );
        }
    }

    #[test]
    fn test_sha512_matches_reference() {
        for len in [0usize, 1, 63, 64, 111, 112, 127, 128, 129, 255, 256, 1000] {
            let data = random_bytes(len);
            assert_eq!(sha512::digest(&data)[..], Sha512::digest(&data)[..], "len {len}");
        }
        let mut block = [0u8; 64];
        rand::thread_rng().fill_bytes(&mut block);
        assert_eq!(sha512::hash_64(&block)[..], Sha512::digest(block)[..]);
    }

    #[test]
    fn test_ripemd160_and_hash160() {
        for len in [0usize, 1, 20, 32, 55, 56, 64, 65, 200] {
            let data = random_bytes(len);
            assert_eq!(ripemd160::digest(&data)[..], Ripemd160::digest(&data)[..]);
            assert_eq!(hashing::hash160(&data), common::reference_hash160(&data));
        }
        let mut pubkey = [0u8; 33];
        rand::thread_rng().fill_bytes(&mut pubkey);
        assert_eq!(hashing::hash160_33(&pubkey), common::reference_hash160(&pubkey));
    }
}
