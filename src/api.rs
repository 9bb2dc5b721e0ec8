//! 对外提供的 Rust 调用接口

use std::time::Duration;

use anyhow::{Context, bail};
use log::{debug, info};
use num_bigint::BigUint;

use crate::comparer::Comparer;
use crate::config::{CompareType, InputKind, SearchSettings};
use crate::driver::{self, MatchResult, Recovery, SearchControl};
use crate::error::SearchError;
use crate::search_space::mnemonic::MnemonicOptions;
use crate::search_space::{
    ArmorySpace, Base16Space, Base58Kind, Base58Space, CorePassSpace, MiniKeySpace, MnemonicSpace,
    SearchSpace,
};

#[derive(Debug, Clone)]
pub struct RecoveryRequest {
    pub kind: InputKind,
    pub input: String,
    pub missing_symbol: char,
    pub compare_type: Option<CompareType>,
    /// 比较目标；Core 钱包密码搜索时是 `mkey` 记录的十六进制
    pub compare_input: Option<String>,
    /// 覆盖默认候选值: (缺失位置序号, 候选文本)
    pub candidates: Vec<(usize, Vec<String>)>,
    pub mnemonic: MnemonicOptions,
    /// Armory 地址序号
    pub armory_index: u32,
    pub core_count: usize,
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
}

impl RecoveryRequest {
    pub fn new(kind: InputKind, input: impl Into<String>) -> Self {
        let settings = SearchSettings::default();
        Self {
            kind,
            input: input.into(),
            missing_symbol: '*',
            compare_type: None,
            compare_input: None,
            candidates: Vec::new(),
            mnemonic: MnemonicOptions::default(),
            armory_index: 0,
            core_count: settings.core_count,
            poll_interval: settings.poll_interval,
            timeout: None,
        }
    }

    pub fn with_comparer(mut self, kind: CompareType, target: impl Into<String>) -> Self {
        self.compare_type = Some(kind);
        self.compare_input = Some(target.into());
        self
    }

    fn settings(&self) -> SearchSettings {
        SearchSettings {
            core_count: self.core_count,
            poll_interval: self.poll_interval,
            ..SearchSettings::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecoveryResponse {
    pub found: bool,
    pub timed_out: bool,
    pub cancelled: bool,
    /// 补全后的输入
    pub result: Option<String>,
    pub total: BigUint,
    pub total_checked: u64,
    pub elapsed: Duration,
    pub speed: f64,
}

impl RecoveryResponse {
    /// 输入本身已经完整且有效
    fn complete_input(input: &str) -> Self {
        Self {
            found: true,
            timed_out: false,
            cancelled: false,
            result: Some(input.to_string()),
            total: BigUint::from(1u32),
            total_checked: 1,
            elapsed: Duration::ZERO,
            speed: 0.0,
        }
    }
}

/// 解析 `slot=a,b,c` 形式的候选值
pub fn parse_candidates(text: &str) -> anyhow::Result<(usize, Vec<String>)> {
    let (slot, values) = text
        .split_once('=')
        .with_context(|| format!("candidate list '{text}' must look like slot=a,b,c"))?;
    let slot: usize = slot
        .trim()
        .parse()
        .with_context(|| format!("invalid slot number in '{text}'"))?;
    let values: Vec<String> = values.split(',').map(str::to_string).collect();
    Ok((slot, values))
}

/// 用调用方给出的候选值覆盖对应位置，其余位置保持默认
pub fn apply_candidates<S: SearchSpace>(
    space: &mut S,
    overrides: &[(usize, Vec<String>)],
) -> Result<(), SearchError> {
    if overrides.is_empty() {
        return Ok(());
    }
    let mut lists = space.slots().candidates().to_vec();
    for (slot, values) in overrides {
        if *slot >= lists.len() {
            return Err(SearchError::Invalid(format!(
                "slot {slot} does not exist, the input has {} missing items",
                lists.len()
            )));
        }
        lists[*slot] = values
            .iter()
            .map(|text| space.parse_symbol(text.trim()))
            .collect::<Result<_, _>>()?;
    }
    space.slots_mut().set_candidates(lists)
}

fn build_comparer(request: &RecoveryRequest) -> anyhow::Result<Option<Comparer>> {
    let Some(kind) = request.compare_type else {
        return Ok(None);
    };
    match request.kind {
        // 地址只靠自身校验和恢复
        InputKind::Address => {
            return Err(SearchError::Invalid(
                "a compare type can not be used when recovering an address".into(),
            )
            .into());
        }
        // 钱包密码用 compare input 中的主密钥记录验证
        InputKind::CorePass => {
            return Err(SearchError::Invalid(
                "a compare type can not be used with a wallet password, \
                 pass the master key record as compare input only"
                    .into(),
            )
            .into());
        }
        _ => {}
    }
    let target = request
        .compare_input
        .as_deref()
        .context("a compare type was given without a compare input")?;
    Ok(Some(Comparer::new(kind, target)?))
}

/// 运行一次恢复，超时由 `request.timeout` 控制
pub fn recover(request: &RecoveryRequest) -> anyhow::Result<RecoveryResponse> {
    recover_with(request, &SearchControl::new(), |_, _, _| {})
}

/// 与 [`recover`] 相同，但由调用方持有控制句柄并接收进度回调
pub fn recover_with<F>(
    request: &RecoveryRequest,
    control: &SearchControl,
    progress: F,
) -> anyhow::Result<RecoveryResponse>
where
    F: FnMut(u64, &BigUint, Duration),
{
    if request.core_count == 0 {
        bail!("threads must be greater than 0");
    }

    let comparer = build_comparer(request)?;
    let input = request.input.as_str();
    let symbol = request.missing_symbol;
    info!(
        "recovering {:?} input with {} comparer",
        request.kind,
        request
            .compare_type
            .map_or_else(|| "no".to_string(), |c| c.to_string())
    );

    match request.kind {
        InputKind::Wif | InputKind::Address => {
            let kind = if request.kind == InputKind::Wif {
                Base58Kind::PrivateKey
            } else {
                Base58Kind::Address
            };
            let mut space = Base58Space::process(input, symbol, kind)?;
            if let Some(comparer) = comparer {
                space = space.with_comparer(comparer);
            }
            if space.slots().miss_count() == 0 && !space.has_comparer() {
                space.process_no_missing()?;
                return Ok(RecoveryResponse::complete_input(input));
            }
            execute(space, request, control, progress)
        }
        InputKind::Base16 => {
            let mut space = Base16Space::process(input, symbol)?;
            if let Some(comparer) = comparer {
                space = space.with_comparer(comparer);
            }
            execute(space, request, control, progress)
        }
        InputKind::Mnemonic => {
            let mut space = MnemonicSpace::process(input, symbol, request.mnemonic.clone())?;
            if let Some(comparer) = comparer {
                space = space.with_comparer(comparer);
            }
            execute(space, request, control, progress)
        }
        InputKind::MiniKey => {
            let mut space = MiniKeySpace::process(input, symbol)?;
            if let Some(comparer) = comparer {
                space = space.with_comparer(comparer);
            }
            execute(space, request, control, progress)
        }
        InputKind::CorePass => {
            let blob = request
                .compare_input
                .as_deref()
                .context("the wallet master key record is required as compare input")?;
            let space = CorePassSpace::process(input, symbol, blob)?;
            execute(space, request, control, progress)
        }
        InputKind::Armory => {
            let mut space =
                ArmorySpace::process(input, symbol)?.with_index(request.armory_index);
            if let Some(comparer) = comparer {
                space = space.with_comparer(comparer);
            }
            execute(space, request, control, progress)
        }
    }
}

fn execute<R, F>(
    mut space: R,
    request: &RecoveryRequest,
    control: &SearchControl,
    mut progress: F,
) -> anyhow::Result<RecoveryResponse>
where
    R: Recovery,
    F: FnMut(u64, &BigUint, Duration),
{
    apply_candidates(&mut space, &request.candidates)?;
    debug!(
        "missing indexes {:?}, search space {}",
        space.slots().missing_indexes(),
        space.slots().total()
    );

    let mut timed_out = false;
    let report = driver::run(&space, &request.settings(), control, |checked, total, elapsed| {
        if request.timeout.is_some_and(|timeout| elapsed >= timeout) && control.stop() {
            timed_out = true;
        }
        progress(checked, total, elapsed);
    })?;

    let speed = if report.elapsed.as_secs_f64() > 0.0 {
        report.checked as f64 / report.elapsed.as_secs_f64()
    } else {
        0.0
    };
    let (found, result) = match report.result {
        MatchResult::Found(text) => (true, Some(text)),
        _ => (false, None),
    };
    let cancelled = !found && control.state() == driver::SearchState::Stopped;
    Ok(RecoveryResponse {
        found,
        timed_out: !found && timed_out,
        cancelled: cancelled && !timed_out,
        result,
        total: report.total,
        total_checked: report.checked,
        elapsed: report.elapsed,
        speed,
    })
}
