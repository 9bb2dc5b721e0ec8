//! 测试公共模块
//!
//! 用第三方库 (secp256k1、sha2、ripemd、bs58、bip39、bip32) 计算参考结果，
//! 与本库的手写实现交叉验证。

#![allow(dead_code)]

use bip32::{DerivationPath, XPrv};
use rand::RngCore;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

/// 随机生成一个合法私钥
pub fn random_private_key() -> [u8; 32] {
    let mut rng = rand::thread_rng();
    loop {
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        if SecretKey::from_slice(&key).is_ok() {
            return key;
        }
    }
}

/// 私钥对应的序列化公钥
pub fn reference_public_key(private_key: &[u8; 32], compressed: bool) -> Vec<u8> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(private_key).expect("无效的私钥");
    let public_key = PublicKey::from_secret_key(&secp, &secret_key);
    if compressed {
        public_key.serialize().to_vec()
    } else {
        public_key.serialize_uncompressed().to_vec()
    }
}

pub fn reference_hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let mut out = [0u8; 20];
    out.copy_from_slice(&Ripemd160::digest(sha));
    out
}

/// P2PKH 地址
pub fn reference_address(private_key: &[u8; 32], compressed: bool) -> String {
    let hash = reference_hash160(&reference_public_key(private_key, compressed));
    let mut payload = vec![0x00];
    payload.extend_from_slice(&hash);
    bs58::encode(payload).with_check().into_string()
}

/// P2SH-P2WPKH 地址
pub fn reference_nested_address(private_key: &[u8; 32]) -> String {
    let mut script = vec![0x00, 0x14];
    script.extend_from_slice(&reference_hash160(&reference_public_key(private_key, true)));
    let mut payload = vec![0x05];
    payload.extend_from_slice(&reference_hash160(&script));
    bs58::encode(payload).with_check().into_string()
}

/// WIF 私钥
pub fn reference_wif(private_key: &[u8; 32], compressed: bool) -> String {
    let mut payload = vec![0x80];
    payload.extend_from_slice(private_key);
    if compressed {
        payload.push(0x01);
    }
    bs58::encode(payload).with_check().into_string()
}

/// 从种子按路径派生私钥 (使用 bip32 crate)
pub fn reference_derive(seed: &[u8], path: &str) -> anyhow::Result<[u8; 32]> {
    let path: DerivationPath = path
        .parse()
        .map_err(|e| anyhow::anyhow!("解析派生路径失败: {}", e))?;
    let xprv = XPrv::derive_from_path(seed, &path)
        .map_err(|e| anyhow::anyhow!("派生失败: {}", e))?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&xprv.private_key().to_bytes());
    Ok(key)
}

/// BIP39 助记词派生私钥
pub fn reference_bip39_key(phrase: &str, passphrase: &str, path: &str) -> anyhow::Result<[u8; 32]> {
    let mnemonic = bip39::Mnemonic::parse_in(bip39::Language::English, phrase)
        .map_err(|e| anyhow::anyhow!("解析助记词失败: {}", e))?;
    reference_derive(&mnemonic.to_seed(passphrase), path)
}
