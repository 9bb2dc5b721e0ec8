//! 多线程搜索驱动
//!
//! 驱动把整个搜索空间按组合序号切成连续的区间，每个工作线程持有自己的游标和
//! 状态 (比较器副本、哈希缓冲区)。线程之间只共享两个原子量: 进度计数和
//! [`SearchControl`] 中的状态字。工作线程每 `check_interval` 次迭代才读一次状态、
//! 写一次进度，热循环里没有锁。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::thread::{self, sleep};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use num_bigint::BigUint;

use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::permutation::{PermutationCursor, PermutationSet};
use crate::search_space::SearchSpace;

/// 暂停时工作线程的检查周期
const PAUSE_SLEEP: Duration = Duration::from_millis(10);

/// 一个可并行搜索的空间
pub trait Recovery: SearchSpace + Sync {
    /// 每个工作线程独占的可变状态
    type State: Send;

    /// 是否必须有比较器才能判断结果
    fn requires_comparer(&self) -> bool {
        true
    }

    fn has_comparer(&self) -> bool;

    fn new_state(&self) -> Self::State;

    /// 游标当前组合是否就是要找的结果
    fn check(&self, state: &mut Self::State, cursor: &PermutationCursor<'_>) -> bool;

    /// 找到结果时报告给调用方的文本
    fn describe(&self, cursor: &PermutationCursor<'_>) -> String {
        self.complete(cursor)
    }
}

/// 搜索的三种结局
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Found(String),
    NotFound,
    Cancelled,
}

/// 驱动状态
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Ready = 0,
    Working = 1,
    Paused = 2,
    Stopped = 3,
    FinishedSuccess = 4,
    FinishedFail = 5,
}

impl SearchState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Ready,
            1 => Self::Working,
            2 => Self::Paused,
            3 => Self::Stopped,
            4 => Self::FinishedSuccess,
            _ => Self::FinishedFail,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(
            self,
            Self::Stopped | Self::FinishedSuccess | Self::FinishedFail
        )
    }
}

/// 暂停/继续/停止开关，既是取消令牌也是状态机
#[derive(Debug)]
pub struct SearchControl {
    state: AtomicU8,
}

impl Default for SearchControl {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchControl {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(SearchState::Ready as u8),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn state(&self) -> SearchState {
        SearchState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: SearchState, to: SearchState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Working → Paused
    pub fn pause(&self) -> bool {
        self.transition(SearchState::Working, SearchState::Paused)
    }

    /// Paused → Working
    pub fn resume(&self) -> bool {
        self.transition(SearchState::Paused, SearchState::Working)
    }

    /// 任何未结束的状态 → Stopped
    pub fn stop(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if SearchState::from_u8(current).is_finished() {
                return false;
            }
            match self.state.compare_exchange(
                current,
                SearchState::Stopped as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// 已结束的控制句柄 (Stopped / FinishedSuccess / FinishedFail) → Ready
    pub fn reset(&self) -> bool {
        [
            SearchState::Stopped,
            SearchState::FinishedSuccess,
            SearchState::FinishedFail,
        ]
        .into_iter()
        .any(|from| self.transition(from, SearchState::Ready))
    }

    /// Ready → Working；上一次搜索正常结束的句柄可以直接复用
    fn start(&self) -> bool {
        [
            SearchState::Ready,
            SearchState::FinishedSuccess,
            SearchState::FinishedFail,
        ]
        .into_iter()
        .any(|from| self.transition(from, SearchState::Working))
    }

    fn finish(&self, success: bool) {
        let to = if success {
            SearchState::FinishedSuccess
        } else {
            SearchState::FinishedFail
        };
        // 已经被停止的搜索保持 Stopped
        let _ = self.transition(SearchState::Working, to) || self.transition(SearchState::Paused, to);
    }

    #[inline]
    fn is_stopped(&self) -> bool {
        self.state() == SearchState::Stopped
    }
}

/// 一次搜索的结果与统计
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub result: MatchResult,
    /// 实际检查过的组合数
    pub checked: u64,
    /// 搜索空间大小
    pub total: BigUint,
    pub elapsed: Duration,
}

/// 把 `total` 个组合尽量均分给 `workers` 个线程，返回每段的 (起点, 长度)
pub fn split_range(total: &BigUint, workers: usize) -> Vec<(BigUint, BigUint)> {
    if workers == 0 {
        return Vec::new();
    }

    let base = total / workers;
    let remainder = total % workers;
    let mut start = BigUint::default();
    (0..workers)
        .map(|i| {
            let len = if BigUint::from(i) < remainder {
                &base + 1u32
            } else {
                base.clone()
            };
            let part = (start.clone(), len.clone());
            start += len;
            part
        })
        .collect()
}

struct Shared<'c> {
    control: &'c SearchControl,
    found: AtomicBool,
    checked: AtomicU64,
    check_interval: u64,
}

fn worker<R: Recovery>(
    recovery: &R,
    set: &PermutationSet,
    start: &BigUint,
    len: &BigUint,
    shared: &Shared<'_>,
) -> Option<String> {
    let mut cursor = set.cursor_range(start, len);
    let mut state = recovery.new_state();
    let mut local = 0u64;

    loop {
        if recovery.check(&mut state, &cursor) {
            shared.checked.fetch_add(local + 1, Ordering::Relaxed);
            shared.found.store(true, Ordering::Release);
            return Some(recovery.describe(&cursor));
        }

        local += 1;
        if local >= shared.check_interval {
            shared.checked.fetch_add(local, Ordering::Relaxed);
            local = 0;
            if shared.found.load(Ordering::Acquire) || shared.control.is_stopped() {
                return None;
            }
            while shared.control.state() == SearchState::Paused {
                sleep(PAUSE_SLEEP);
            }
            if shared.control.is_stopped() {
                return None;
            }
        }

        if !cursor.increment() {
            break;
        }
    }

    shared.checked.fetch_add(local, Ordering::Relaxed);
    None
}

/// 运行搜索直到找到结果、遍历完毕或被停止
///
/// `progress` 由调用线程每隔 `poll_interval` 调用一次，参数为
/// (已检查数, 总数, 已用时间)；回调里可以调用 `control.stop()` 实现超时。
pub fn run<R, F>(
    recovery: &R,
    settings: &SearchSettings,
    control: &SearchControl,
    mut progress: F,
) -> Result<SearchReport, SearchError>
where
    R: Recovery,
    F: FnMut(u64, &BigUint, Duration),
{
    if recovery.requires_comparer() && !recovery.has_comparer() {
        return Err(SearchError::MissingComparer);
    }

    let slots = recovery.slots();
    let set = slots.permutations();
    let total = set.total();
    let start_time = Instant::now();

    if !control.start() {
        // 开始前就被停止: 不检查任何组合
        if control.is_stopped() {
            return Ok(SearchReport {
                result: MatchResult::Cancelled,
                checked: 0,
                total,
                elapsed: start_time.elapsed(),
            });
        }
        warn!("search control is busy (state {:?})", control.state());
        return Err(SearchError::ControlBusy);
    }

    // 没有缺失位置: 只有一个组合，不启动线程
    if slots.miss_count() == 0 {
        let cursor = set.cursor();
        let mut state = recovery.new_state();
        let result = if recovery.check(&mut state, &cursor) {
            MatchResult::Found(recovery.describe(&cursor))
        } else {
            MatchResult::NotFound
        };
        control.finish(matches!(result, MatchResult::Found(_)));
        return Ok(SearchReport {
            result,
            checked: 1,
            total,
            elapsed: start_time.elapsed(),
        });
    }

    let core_count = settings.clamped_core_count();
    if core_count != settings.core_count {
        warn!(
            "core count {} clamped to {}",
            settings.core_count, core_count
        );
    }
    let plan: Vec<(BigUint, BigUint)> = split_range(&total, core_count)
        .into_iter()
        .filter(|(_, len)| *len > BigUint::default())
        .collect();

    info!(
        "starting search: {} missing, {} combinations, {} workers",
        slots.miss_count(),
        total,
        plan.len()
    );
    for (i, (start, len)) in plan.iter().enumerate() {
        debug!("worker {i}: start {start}, length {len}");
    }

    let shared = Shared {
        control,
        found: AtomicBool::new(false),
        checked: AtomicU64::new(0),
        check_interval: settings.check_interval.max(1),
    };

    let found = thread::scope(|scope| {
        let handles: Vec<_> = plan
            .iter()
            .map(|(start, len)| {
                let shared = &shared;
                scope.spawn(move || worker(recovery, set, start, len, shared))
            })
            .collect();

        while !handles.iter().all(|h| h.is_finished()) {
            sleep(settings.poll_interval);
            progress(
                shared.checked.load(Ordering::Relaxed),
                &total,
                start_time.elapsed(),
            );
        }

        let mut found = None;
        for handle in handles {
            match handle.join() {
                Ok(Some(text)) => {
                    if found.is_none() {
                        found = Some(text);
                    }
                }
                Ok(None) => {}
                Err(_) => error!("search worker panicked"),
            }
        }
        found
    });

    let checked = shared.checked.load(Ordering::Relaxed);
    let elapsed = start_time.elapsed();
    progress(checked, &total, elapsed);

    let result = match found {
        Some(text) => MatchResult::Found(text),
        None if control.is_stopped() => MatchResult::Cancelled,
        None => MatchResult::NotFound,
    };
    control.finish(matches!(result, MatchResult::Found(_)));

    match &result {
        MatchResult::Found(_) => info!("search finished: found after {checked} checks"),
        MatchResult::NotFound => info!("search finished: no match in {checked} checks"),
        MatchResult::Cancelled => info!("search cancelled after {checked} checks"),
    }

    Ok(SearchReport {
        result,
        checked,
        total,
        elapsed,
    })
}
