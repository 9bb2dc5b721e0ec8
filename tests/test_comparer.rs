//! 比较器测试: 每种目标类型与参考实现派生出的目标一致

mod common;

use rust_keyrecover::config::CompareType;
use rust_keyrecover::ecc::Scalar;
use rust_keyrecover::{Comparer, SearchError};
use sha3::{Digest, Keccak256};

fn tron_address(private_key: &[u8; 32]) -> String {
    let uncompressed = common::reference_public_key(private_key, false);
    let hash = Keccak256::digest(&uncompressed[1..]);
    let mut payload = vec![0x41];
    payload.extend_from_slice(&hash[12..]);
    bs58::encode(payload).with_check().into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试: 所有比较类型都能识别正确的私钥并拒绝错误的私钥
    #[test]
    fn test_every_kind_matches_reference_targets() {
        let key = common::random_private_key();
        let other = common::random_private_key();
        let scalar = Scalar::from_private_key(&key).unwrap();
        let wrong = Scalar::from_private_key(&other).unwrap();

        let targets = [
            (CompareType::AddrComp, common::reference_address(&key, true)),
            (CompareType::AddrUnComp, common::reference_address(&key, false)),
            (CompareType::AddrBoth, common::reference_address(&key, true)),
            (CompareType::AddrBoth, common::reference_address(&key, false)),
            (CompareType::AddrNested, common::reference_nested_address(&key)),
            (CompareType::Pubkey, hex::encode(common::reference_public_key(&key, true))),
            (CompareType::Pubkey, hex::encode(common::reference_public_key(&key, false))),
            (CompareType::PrivateKey, hex::encode(key)),
            (CompareType::PrivateKey, common::reference_wif(&key, true)),
            (CompareType::Tron, tron_address(&key)),
        ];
        for (kind, target) in targets {
            let comparer = Comparer::new(kind, &target).unwrap();
            assert_eq!(comparer.kind(), kind);
            assert!(comparer.compare(&scalar), "{kind} {target}");
            assert!(!comparer.compare(&wrong), "{kind} {target}");
        }
    }

    /// 测试: 压缩地址比较器不接受同一私钥的未压缩地址
    #[test]
    fn test_compression_is_distinguished() {
        let key = common::random_private_key();
        let scalar = Scalar::from_private_key(&key).unwrap();
        let comparer = Comparer::new(CompareType::AddrComp, &common::reference_address(&key, false));
        // 地址本身合法，只是对应未压缩公钥
        assert!(!comparer.unwrap().compare(&scalar));
    }

    /// 测试: 克隆出的比较器相互独立
    #[test]
    fn test_clones_are_independent() {
        let a = common::random_private_key();
        let b = common::random_private_key();
        let original = Comparer::new(CompareType::AddrComp, &common::reference_address(&a, true)).unwrap();

        let mut copy = original.clone();
        assert!(copy.init(&common::reference_address(&b, true)));
        assert_ne!(copy, original);

        assert!(original.compare(&Scalar::from_private_key(&a).unwrap()));
        assert!(copy.compare(&Scalar::from_private_key(&b).unwrap()));
        assert!(!copy.compare(&Scalar::from_private_key(&a).unwrap()));
    }

    #[test]
    fn test_invalid_targets_are_rejected() {
        let key = common::random_private_key();
        let p2pkh = common::reference_address(&key, true);
        let nested = common::reference_nested_address(&key);

        assert!(matches!(
            Comparer::new(CompareType::AddrNested, &p2pkh),
            Err(SearchError::InvalidTarget(_))
        ));
        assert!(matches!(
            Comparer::new(CompareType::AddrComp, &nested),
            Err(SearchError::InvalidTarget(_))
        ));
        assert!(Comparer::new(CompareType::Pubkey, "02abcd").is_err());
        assert!(Comparer::new(CompareType::Tron, &p2pkh).is_err());
        assert!(Comparer::new(CompareType::PrivateKey, &"0".repeat(64)).is_err());
    }
}
