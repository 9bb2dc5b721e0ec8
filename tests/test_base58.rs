//! Base58 (WIF / 地址) 恢复端到端测试

mod common;

use num_bigint::BigUint;
use rust_keyrecover::config::{CompareType, SearchSettings};
use rust_keyrecover::driver::{self, MatchResult, SearchControl};
use rust_keyrecover::{Base58Kind, Base58Space, Comparer, SearchSpace};

const WIF: &str = "L28Peud5cQcijrtMthAdUS8FynpM8PKZtnoUZb1VAio9WxKoebHt";
const ADDRESS: &str = "142viJrTYHA4TzryiEiuQkYk4Ay5TfpzqW";

fn blank(input: &str, indexes: &[usize]) -> String {
    input
        .chars()
        .enumerate()
        .map(|(i, c)| if indexes.contains(&i) { '*' } else { c })
        .collect()
}

fn settings() -> SearchSettings {
    SearchSettings {
        core_count: 4,
        check_interval: 64,
        ..SearchSettings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试: 只靠校验和恢复 WIF 中的一个字符
    #[test]
    fn test_wif_single_missing_checksum_only() {
        let space = Base58Space::process(&blank(WIF, &[49]), '*', Base58Kind::PrivateKey).unwrap();
        assert_eq!(space.slots().total(), BigUint::from(58u32));

        let report = driver::run(&space, &settings(), &SearchControl::new(), |_, _, _| {}).unwrap();
        assert_eq!(report.result, MatchResult::Found(WIF.to_string()));
        assert!(report.checked <= 58);
    }

    /// 测试: 缺失 WIF 字符并以压缩地址为目标
    #[test]
    fn test_wif_with_compressed_address_target() {
        let comparer = Comparer::new(CompareType::AddrComp, ADDRESS).unwrap();
        let space = Base58Space::process(
            "L28Peud5cQcijrtMthAdUS8FynpM8PKZtnoUZb1VAio9WxKoe*Ht",
            '*',
            Base58Kind::PrivateKey,
        )
        .unwrap()
        .with_comparer(comparer);
        assert!(space.slots().total() <= BigUint::from(58u32));

        let report = driver::run(&space, &settings(), &SearchControl::new(), |_, _, _| {}).unwrap();
        assert_eq!(report.result, MatchResult::Found(WIF.to_string()));
    }

    /// 测试: 随机私钥的未压缩 WIF 缺两个字符，用地址确认
    #[test]
    fn test_uncompressed_wif_with_address() {
        let key = common::random_private_key();
        let wif = common::reference_wif(&key, false);
        let address = common::reference_address(&key, false);

        let comparer = Comparer::new(CompareType::AddrUnComp, &address).unwrap();
        let space = Base58Space::process(&blank(&wif, &[20, 40]), '*', Base58Kind::PrivateKey)
            .unwrap()
            .with_comparer(comparer);
        assert!(!space.is_compressed());

        let report = driver::run(&space, &settings(), &SearchControl::new(), |_, _, _| {}).unwrap();
        assert_eq!(report.result, MatchResult::Found(wif));
    }

    /// 测试: 地址缺一个字符
    #[test]
    fn test_address_single_missing() {
        let space = Base58Space::process(&blank(ADDRESS, &[10]), '*', Base58Kind::Address).unwrap();
        let report = driver::run(&space, &settings(), &SearchControl::new(), |_, _, _| {}).unwrap();
        assert_eq!(report.result, MatchResult::Found(ADDRESS.to_string()));
    }

    /// 测试: 限定候选值后只搜索给定字符
    #[test]
    fn test_restricted_candidates() {
        let mut space = Base58Space::process(&blank(WIF, &[10, 49]), '*', Base58Kind::PrivateKey).unwrap();
        space
            .set_values(&[
                vec!["c".into(), "d".into(), "e".into()],
                vec!["a".into(), "b".into()],
            ])
            .unwrap();
        assert_eq!(space.slots().total(), BigUint::from(6u32));

        let report = driver::run(&space, &settings(), &SearchControl::new(), |_, _, _| {}).unwrap();
        assert_eq!(report.result, MatchResult::Found(WIF.to_string()));

        // 不在候选中的正确字符找不到
        space
            .set_values(&[vec!["d".into(), "e".into()], vec!["a".into(), "b".into()]])
            .unwrap();
        let report = driver::run(&space, &settings(), &SearchControl::new(), |_, _, _| {}).unwrap();
        assert_eq!(report.result, MatchResult::NotFound);
        assert_eq!(report.checked, 4);
    }
}
