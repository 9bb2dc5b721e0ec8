//! secp256k1 椭圆曲线运算测试
//! 验证手写实现与 Rust secp256k1 crate 的一致性

mod common;

use rust_keyrecover::ecc::{
    AffinePoint, JacobianPoint, Scalar, Signature, derive_public_key, multiply_by_g,
    recover_public_keys, scalar_multiply,
};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试: 随机私钥的压缩与未压缩公钥
    #[test]
    fn test_public_keys_match_reference() {
        for _ in 0..32 {
            let key = common::random_private_key();
            assert_eq!(
                derive_public_key(&key, true).unwrap(),
                common::reference_public_key(&key, true)
            );
            assert_eq!(
                derive_public_key(&key, false).unwrap(),
                common::reference_public_key(&key, false)
            );
        }
    }

    /// 测试: 任意点的标量乘法与点加
    #[test]
    fn test_point_arithmetic_matches_reference() {
        let secp = Secp256k1::new();
        for _ in 0..8 {
            let a = common::random_private_key();
            let b = common::random_private_key();

            let point_a = AffinePoint::parse(&common::reference_public_key(&a, false)).unwrap();
            let tweak = Scalar::from_bytes(&b).unwrap();
            let ours = scalar_multiply(&tweak, &point_a).to_affine();

            let reference = PublicKey::from_slice(&common::reference_public_key(&a, true))
                .unwrap()
                .mul_tweak(&secp, &secp256k1::Scalar::from_be_bytes(b).unwrap())
                .unwrap();
            assert_eq!(ours.to_compressed(), reference.serialize());

            let point_b = AffinePoint::parse(&common::reference_public_key(&b, true)).unwrap();
            let sum = JacobianPoint::from(point_a).add_affine(&point_b).to_affine();
            let reference_sum = PublicKey::from_slice(&common::reference_public_key(&a, true))
                .unwrap()
                .combine(&PublicKey::from_slice(&common::reference_public_key(&b, true)).unwrap())
                .unwrap();
            assert_eq!(sum.to_uncompressed(), reference_sum.serialize_uncompressed());
        }
    }

    #[test]
    fn test_scalar_arithmetic_matches_group_law() {
        let a = Scalar::from_bytes(&common::random_private_key()).unwrap();
        let b = Scalar::from_bytes(&common::random_private_key()).unwrap();
        let sum = multiply_by_g(&a.add(&b)).to_affine();
        let added = multiply_by_g(&a).add(&multiply_by_g(&b)).to_affine();
        assert_eq!(sum, added);

        let product = multiply_by_g(&a.mul(&b)).to_affine();
        let nested = scalar_multiply(&b, &multiply_by_g(&a).to_affine()).to_affine();
        assert_eq!(product, nested);

        let inverse = a.invert().unwrap();
        assert_eq!(a.mul(&inverse), Scalar::ONE);
    }

    /// 测试: 从签名恢复的候选公钥中包含签名者
    #[test]
    fn test_recovery_contains_signer() {
        let secp = Secp256k1::new();
        for i in 0..8u8 {
            let key = common::random_private_key();
            let secret_key = SecretKey::from_slice(&key).unwrap();
            let hash = [i.wrapping_mul(37).wrapping_add(1); 32];
            let message = Message::from_digest_slice(&hash).unwrap();
            let signature = secp.sign_ecdsa_recoverable(&message, &secret_key);
            let (_, compact) = signature.serialize_compact();
            let signer = AffinePoint::parse(&common::reference_public_key(&key, false)).unwrap();

            let sig = Signature::from_compact(&compact).unwrap();
            let candidates = recover_public_keys(&sig, &hash);
            assert!(candidates.contains(&signer));

            let der = signature.to_standard().serialize_der();
            let from_der = Signature::from_der(&der).unwrap();
            assert_eq!(from_der, sig);
        }
    }
}
