//! 通过 `recover` 接口的端到端恢复测试

mod common;

use std::time::Duration;

use rust_keyrecover::config::{CompareType, InputKind};
use rust_keyrecover::{RecoveryRequest, SearchControl, SearchError, SearchState, recover, recover_with};

/// 密码 "Tr0ub4dor&3"，salt 0102030405060708，10 轮
const CORE_BLOB: &str = "304d45f718944658e5daff1405a6a5a4e1cfd3c2f002ef1b8c7f7c604d6a86719cd5cc1d6cbf91b27ca536791bd7bf316b080102030405060708000000000a00000000";

const MINI_KEY: &str = "S6c56bnXQiBjk9mqSYE7ykVQ7NzrRy";

const ARMORY_ROOT: [&str; 2] = [
    "sssd sfsg shsj sksw sesr stsu siso snda gagd",
    "dsdd dfdg dhdj dkdw dedr dtdu dido dnfa orow",
];

fn request(kind: InputKind, input: &str) -> RecoveryRequest {
    let mut request = RecoveryRequest::new(kind, input);
    request.core_count = 2;
    request.poll_interval = Duration::from_millis(20);
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_wallet_password() {
        let mut req = request(InputKind::CorePass, "Tr0ub4*or&3");
        req.compare_input = Some(CORE_BLOB.to_string());
        req.candidates = vec![(0, vec!["b".into(), "c".into(), "d".into()])];
        let response = recover(&req).unwrap();
        assert!(response.found);
        assert_eq!(response.result.as_deref(), Some("Tr0ub4dor&3"));
        assert_eq!(response.total, num_bigint::BigUint::from(3u32));
    }

    #[test]
    fn test_core_wallet_requires_blob() {
        let req = request(InputKind::CorePass, "Tr0ub4*or&3");
        assert!(recover(&req).is_err());
    }

    #[test]
    fn test_mini_key() {
        let input = format!("{}*{}", &MINI_KEY[..12], &MINI_KEY[13..]);
        let req = request(InputKind::MiniKey, &input)
            .with_comparer(CompareType::AddrComp, "1PZuicD1ACRfBuKEgp2XaJhVvnwpeETDyn");
        let response = recover(&req).unwrap();
        assert_eq!(response.result.as_deref(), Some(MINI_KEY));
    }

    #[test]
    fn test_armory_second_address() {
        let input = format!(
            "{}\n{}",
            ARMORY_ROOT[0].replacen("shsj", "sh*j", 1),
            ARMORY_ROOT[1]
        );
        let mut req = request(InputKind::Armory, &input)
            .with_comparer(CompareType::AddrComp, "1JJSRHM3k17oC4KeZg6rwhqUxQ5YhhzVdd");
        req.armory_index = 1;
        let response = recover(&req).unwrap();
        assert_eq!(
            response.result,
            Some(format!("{}\n{}", ARMORY_ROOT[0], ARMORY_ROOT[1]))
        );
    }

    #[test]
    fn test_nested_segwit_from_hex_key() {
        let key = common::random_private_key();
        let hex_key = hex::encode(key);
        let input = format!("{}**", &hex_key[..62]);
        let req = request(InputKind::Base16, &input)
            .with_comparer(CompareType::AddrNested, common::reference_nested_address(&key));
        let response = recover(&req).unwrap();
        assert!(response.found);
        assert_eq!(response.result, Some(hex_key));
        assert!(response.total_checked <= 256);
    }

    #[test]
    fn test_timeout_stops_search() {
        let key = common::random_private_key();
        let unrelated = common::random_private_key();
        let mut input = hex::encode(key);
        input.replace_range(10..16, "******");
        let mut req = request(InputKind::Base16, &input)
            .with_comparer(CompareType::AddrComp, common::reference_address(&unrelated, true));
        req.timeout = Some(Duration::from_millis(200));
        let response = recover(&req).unwrap();
        assert!(!response.found);
        assert!(response.timed_out);
        assert!(!response.cancelled);
    }

    /// 测试: 同一个控制句柄先完成一次搜索，第二次搜索仍能超时停止
    #[test]
    fn test_control_reused_after_finished_search() {
        let control = SearchControl::new();
        let key = common::random_private_key();
        let hex_key = hex::encode(key);
        let first = request(InputKind::Base16, &format!("{}**", &hex_key[..62]))
            .with_comparer(CompareType::AddrComp, common::reference_address(&key, true));
        let response = recover_with(&first, &control, |_, _, _| {}).unwrap();
        assert!(response.found);
        assert_eq!(control.state(), SearchState::FinishedSuccess);

        let unrelated = common::random_private_key();
        let mut input = hex::encode(common::random_private_key());
        input.replace_range(0..6, "******");
        let mut second = request(InputKind::Base16, &input)
            .with_comparer(CompareType::AddrComp, common::reference_address(&unrelated, true));
        second.timeout = Some(Duration::from_millis(50));
        let response = recover_with(&second, &control, |_, _, _| {}).unwrap();
        assert!(response.timed_out);
        assert!(!response.found);
        assert!(response.total_checked < 1 << 24);
        assert_eq!(control.state(), SearchState::Stopped);
    }

    #[test]
    fn test_errors_surface_as_search_errors() {
        let err = recover(&request(InputKind::MiniKey, "S6c5")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SearchError>(),
            Some(SearchError::InvalidLength(_))
        ));

        let mut req = request(InputKind::Base16, &format!("{}*", "a".repeat(63)));
        req.compare_type = Some(CompareType::AddrComp);
        assert!(recover(&req).is_err());
    }
}
