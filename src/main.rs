//! 比特币私钥恢复系统 - 主程序
//!
//! 使用方式:
//!   cargo run -- --kind wif --input 'L28Peud5cQcijrtMthAdUS8FynpM8PKZtnoUZ*1VAio9WxKoebHt'
//!   cargo run -- --kind base16 --input '4c7a...c9a*' --compare-type addr-comp --compare-input 1PZu...
//!   cargo run -- --kind mnemonic --input '* slide night ...' --compare-type addr-comp --compare-input 1...

use clap::Parser;
use log::info;
use std::time::{Duration, Instant};

use rust_keyrecover::{
    CompareType, ElectrumSeedType, InputKind, MnemonicOptions, MnemonicType, RecoveryRequest,
    SearchControl, WordListLanguage, parse_candidates, recover_with,
};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "keyrecover")]
#[command(about = "比特币私钥恢复系统")]
#[command(version = "0.1.0")]
struct Args {
    /// 输入类型: wif / address / base16 / mnemonic / minikey / core-pass / armory
    #[arg(long)]
    kind: InputKind,

    /// 带缺失标记的输入 (Armory 备份的多行用换行分隔)
    #[arg(long)]
    input: String,

    /// 缺失字符的标记
    #[arg(long, default_value = "*")]
    missing: char,

    /// 比较类型: addr-comp / addr-uncomp / addr-both / addr-nested / pubkey / privkey / tron
    #[arg(long)]
    compare_type: Option<CompareType>,

    /// 比较目标 (地址、公钥、私钥，或 Core 钱包 mkey 记录的十六进制)
    #[arg(long)]
    compare_input: Option<String>,

    /// 工作线程数 (默认使用全部逻辑核心)
    #[arg(short, long)]
    threads: Option<usize>,

    /// 助记词派生路径 (默认 BIP44 第一个地址或 Electrum 默认路径)
    #[arg(long)]
    path: Option<String>,

    /// 助记词密码
    #[arg(long, default_value = "")]
    passphrase: String,

    /// 助记词词表语言
    #[arg(long, default_value = "english")]
    word_list: WordListLanguage,

    /// 助记词标准: bip39 / electrum
    #[arg(long, default_value = "bip39")]
    mnemonic_type: MnemonicType,

    /// Electrum 种子类型: standard / segwit / 2fa / 2fa-segwit
    #[arg(long, default_value = "standard")]
    electrum_type: ElectrumSeedType,

    /// Armory 地址序号
    #[arg(long, default_value = "0")]
    armory_index: u32,

    /// 覆盖某个缺失位置的候选值，格式 slot=a,b,c (可重复)
    #[arg(long)]
    candidates: Vec<String>,

    /// 轮询间隔 (毫秒)
    #[arg(long, default_value = "250")]
    poll_interval: u64,

    /// 超时时间 (秒，0表示无超时)
    #[arg(long, default_value = "0")]
    timeout: u64,
}

/// 由命令行参数构造恢复请求
fn build_request(args: &Args) -> anyhow::Result<RecoveryRequest> {
    let mut request = RecoveryRequest::new(args.kind, args.input.replace("\\n", "\n"));
    request.missing_symbol = args.missing;
    request.compare_type = args.compare_type;
    request.compare_input = args.compare_input.clone();
    request.candidates = args
        .candidates
        .iter()
        .map(|c| parse_candidates(c))
        .collect::<anyhow::Result<_>>()?;
    request.mnemonic = MnemonicOptions {
        mnemonic_type: args.mnemonic_type,
        language: args.word_list,
        passphrase: args.passphrase.clone(),
        path: args.path.clone(),
        electrum_type: args.electrum_type,
    };
    request.armory_index = args.armory_index;
    if let Some(threads) = args.threads {
        request.core_count = threads;
    }
    request.poll_interval = Duration::from_millis(args.poll_interval);
    request.timeout = if args.timeout == 0 {
        None
    } else {
        Some(Duration::from_secs(args.timeout))
    };
    Ok(request)
}

/// 主函数
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("启动比特币私钥恢复系统");
    info!("参数: {:?}", args);

    let request = build_request(&args)?;
    let control = SearchControl::new();
    let mut last_report = Instant::now();
    let response = recover_with(&request, &control, |checked, total, elapsed| {
        if last_report.elapsed() >= Duration::from_secs(5) {
            last_report = Instant::now();
            info!(
                "已检查 {} / {} ({:.0} 个/秒)",
                checked,
                total,
                checked as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );
        }
    })?;

    println!();
    println!("========================================");

    if response.found {
        println!("✓ 找到缺失的内容!");
        println!("========================================");
        println!("结果: {}", response.result.unwrap_or_default());
    } else if response.timed_out {
        println!("✗ 搜索超时 ({} 秒) - 强制终止", args.timeout);
    } else if response.cancelled {
        println!("✗ 搜索已取消");
    } else {
        println!("✗ 未找到符合条件的组合");
    }

    println!("搜索空间: {}", response.total);
    println!("搜索时间: {:.2} 秒", response.elapsed.as_secs_f64());
    println!(
        "检查组合数: {} | 平均速度: {:.0} 个/秒",
        response.total_checked, response.speed
    );
    println!("========================================");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("keyrecover").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_args() {
        let args = parse(&[
            "--kind",
            "base16",
            "--input",
            "4c7a*",
            "--compare-type",
            "addr-comp",
            "--compare-input",
            "1PZuicD1ACRfBuKEgp2XaJhVvnwpeETDyn",
            "--candidates",
            "0=a,b",
            "--threads",
            "2",
        ]);
        assert_eq!(args.kind, InputKind::Base16);
        assert_eq!(args.compare_type, Some(CompareType::AddrComp));

        let request = build_request(&args).unwrap();
        assert_eq!(request.core_count, 2);
        assert_eq!(request.candidates, vec![(0, vec!["a".to_string(), "b".to_string()])]);
        assert!(request.timeout.is_none());
        assert_eq!(request.mnemonic.mnemonic_type, MnemonicType::Bip39);
    }

    #[test]
    fn test_rejects_unknown_selectors() {
        let base = ["--kind", "mnemonic", "--input", "x"];
        let with = |extra: &[&str]| {
            Args::try_parse_from(
                std::iter::once("keyrecover")
                    .chain(base.iter().copied())
                    .chain(extra.iter().copied()),
            )
        };
        assert!(with(&["--word-list", "klingon"]).is_err());
        assert!(with(&["--electrum-type", "old"]).is_err());
        assert!(with(&["--compare-type", "addr-p2tr"]).is_err());
        assert!(with(&["--word-list", "japanese"]).is_ok());
    }

    #[test]
    fn test_bad_candidates_are_reported() {
        let args = parse(&["--kind", "wif", "--input", "5H*", "--candidates", "nope"]);
        let err = build_request(&args).unwrap_err();
        assert!(err.to_string().contains("slot=a,b,c"));
    }

    #[test]
    fn test_timeout_and_newlines() {
        let args = parse(&["--kind", "armory", "--input", "a\\nb", "--timeout", "3"]);
        let request = build_request(&args).unwrap();
        assert_eq!(request.input, "a\nb");
        assert_eq!(request.timeout, Some(Duration::from_secs(3)));
    }
}
