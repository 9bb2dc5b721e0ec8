//! 缺失位置候选值的笛卡尔积遍历器
//!
//! [`PermutationSet`] 在构建时把每个缺失位置的候选列表压平成一段连续内存，
//! 搜索期间只读地被所有工作线程共享；每个线程持有自己的 [`PermutationCursor`]，
//! 游标只修改自身的计数器，`increment` 不分配内存也不加锁。

use num_bigint::BigUint;

use crate::error::{SearchError, ordinal};

/// 压平后的候选值集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationSet {
    /// 所有位置的候选值依次拼接 (按位置顺序)
    values: Vec<u32>,
    /// 每个位置的候选数
    counts: Vec<u32>,
    /// 每个位置在 `values` 中的起始偏移
    offsets: Vec<usize>,
    /// 迭代顺序: 第一个元素变化最快。候选最多的位置排在最内层
    iteration_order: Vec<usize>,
}

impl PermutationSet {
    /// 每个列表至少要有 2 个候选值，否则报告出错位置的序数
    pub fn new(lists: &[Vec<u32>]) -> Result<Self, SearchError> {
        let mut values = Vec::with_capacity(lists.iter().map(Vec::len).sum());
        let mut counts = Vec::with_capacity(lists.len());
        let mut offsets = Vec::with_capacity(lists.len());

        for (i, list) in lists.iter().enumerate() {
            if list.len() < 2 {
                return Err(SearchError::TooFewCandidates(ordinal(i + 1)));
            }
            let count = u32::try_from(list.len())
                .map_err(|_| SearchError::Invalid(format!("too many values for slot {}", i + 1)))?;
            offsets.push(values.len());
            counts.push(count);
            values.extend_from_slice(list);
        }

        let mut iteration_order: Vec<usize> = (0..counts.len()).collect();
        // 稳定排序，候选数相同的位置保持原有相对顺序
        iteration_order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

        Ok(Self {
            values,
            counts,
            offsets,
            iteration_order,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn iteration_order(&self) -> &[usize] {
        &self.iteration_order
    }

    /// 第 `slot` 个位置的候选列表
    pub fn slot_values(&self, slot: usize) -> &[u32] {
        let start = self.offsets[slot];
        &self.values[start..start + self.counts[slot] as usize]
    }

    /// 组合总数 (所有候选数之积)，没有缺失位置时为 1
    pub fn total(&self) -> BigUint {
        self.counts
            .iter()
            .fold(BigUint::from(1u32), |acc, &c| acc * c)
    }

    /// 覆盖整个空间的游标
    pub fn cursor(&self) -> PermutationCursor<'_> {
        PermutationCursor {
            set: self,
            digits: vec![0; self.counts.len()],
            remaining: u128::MAX,
        }
    }

    /// 从第 `start` 个组合开始、最多遍历 `len` 个组合的游标
    ///
    /// 组合序号按迭代顺序的混合进制计算。`len` 超出 u128 时视为不限长度。
    pub fn cursor_range(&self, start: &BigUint, len: &BigUint) -> PermutationCursor<'_> {
        let mut cursor = self.cursor();
        cursor.seek(start);
        cursor.remaining = saturating_u128(len);
        cursor
    }
}

/// 大于 u128::MAX 的值截断为 u128::MAX
pub fn saturating_u128(value: &BigUint) -> u128 {
    let digits: Vec<u64> = value.iter_u64_digits().collect();
    match digits.as_slice() {
        [] => 0,
        [lo] => *lo as u128,
        [lo, hi] => (*hi as u128) << 64 | *lo as u128,
        _ => u128::MAX,
    }
}

/// 单个线程独占的遍历游标
#[derive(Debug, Clone)]
pub struct PermutationCursor<'a> {
    set: &'a PermutationSet,
    /// 每个位置当前选中的候选下标 (按位置顺序)
    digits: Vec<u32>,
    /// 包括当前组合在内还剩多少个组合
    remaining: u128,
}

impl<'a> PermutationCursor<'a> {
    pub fn set(&self) -> &'a PermutationSet {
        self.set
    }

    /// 定位到第 `index` 个组合，超出总数时按总数取模
    pub fn seek(&mut self, index: &BigUint) {
        let mut rest = index.clone();
        for &slot in &self.set.iteration_order {
            let count = self.set.counts[slot];
            let digit = &rest % count;
            self.digits[slot] = digit.iter_u32_digits().next().unwrap_or(0);
            rest /= count;
        }
    }

    /// 前进到下一个组合
    ///
    /// 最外层位置回绕 (整个空间走完) 或分配的区间用尽时返回 `false`；
    /// 回绕后所有计数器归零，即回到初始状态。
    #[inline]
    pub fn increment(&mut self) -> bool {
        if self.remaining <= 1 {
            self.remaining = 0;
            return false;
        }
        self.remaining -= 1;

        for &slot in &self.set.iteration_order {
            let digit = &mut self.digits[slot];
            *digit += 1;
            if *digit < self.set.counts[slot] {
                return true;
            }
            *digit = 0;
        }
        false
    }

    /// 第 `slot` 个位置 (按位置顺序) 当前的候选值
    #[inline]
    pub fn current_value(&self, slot: usize) -> u32 {
        self.set.values[self.set.offsets[slot] + self.digits[slot] as usize]
    }

    /// 当前组合在各位置上的候选值
    pub fn current_values(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.digits.len()).map(|slot| self.current_value(slot))
    }

    /// 把当前组合逐个位置写入 `buf[offset..]`，每个候选值占一个字节，返回写入的字节数
    ///
    /// 只适用于候选值不超过 255 的空间。缓冲区放不下时不写入并返回 `None`。
    #[inline]
    pub fn write_current_to(&self, buf: &mut [u8], offset: usize) -> Option<usize> {
        let n = self.digits.len();
        let out = buf.get_mut(offset..offset.checked_add(n)?)?;
        for (slot, byte) in out.iter_mut().enumerate() {
            *byte = self.current_value(slot) as u8;
        }
        Some(n)
    }

    /// 当前组合的全局序号
    pub fn position(&self) -> BigUint {
        let mut index = BigUint::default();
        for &slot in self.set.iteration_order.iter().rev() {
            index = index * self.set.counts[slot] + self.digits[slot];
        }
        index
    }
}
