//! 256 位无符号整数的基础运算
//!
//! 采用 4 个 64 位小端序 limb。域元素和标量都建立在这里的函数之上。

use std::cmp::Ordering;

pub type Limbs = [u64; 4];

pub const ZERO: Limbs = [0; 4];

#[inline]
pub fn from_be_bytes(bytes: &[u8; 32]) -> Limbs {
    let mut out = [0u64; 4];
    for (i, limb) in out.iter_mut().enumerate() {
        let start = 32 - (i + 1) * 8;
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[start..start + 8]);
        *limb = u64::from_be_bytes(word);
    }
    out
}

#[inline]
pub fn to_be_bytes(limbs: &Limbs) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, limb) in limbs.iter().enumerate() {
        let start = 32 - (i + 1) * 8;
        out[start..start + 8].copy_from_slice(&limb.to_be_bytes());
    }
    out
}

#[inline]
pub fn is_zero(a: &Limbs) -> bool {
    (a[0] | a[1] | a[2] | a[3]) == 0
}

#[inline]
pub fn cmp(a: &Limbs, b: &Limbs) -> Ordering {
    for i in (0..4).rev() {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// 返回 (a + b mod 2^256, 是否进位)
#[inline]
pub fn add(a: &Limbs, b: &Limbs) -> (Limbs, bool) {
    let mut out = [0u64; 4];
    let mut carry = 0u128;
    for i in 0..4 {
        let sum = a[i] as u128 + b[i] as u128 + carry;
        out[i] = sum as u64;
        carry = sum >> 64;
    }
    (out, carry != 0)
}

/// 返回 (a - b mod 2^256, 是否借位)
#[inline]
pub fn sub(a: &Limbs, b: &Limbs) -> (Limbs, bool) {
    let mut out = [0u64; 4];
    let mut borrow = false;
    for i in 0..4 {
        let (d1, b1) = a[i].overflowing_sub(b[i]);
        let (d2, b2) = d1.overflowing_sub(borrow as u64);
        out[i] = d2;
        borrow = b1 || b2;
    }
    (out, borrow)
}

/// 512 位乘积
#[inline]
pub fn mul_wide(a: &Limbs, b: &Limbs) -> [u64; 8] {
    let mut out = [0u64; 8];
    for i in 0..4 {
        let mut carry = 0u128;
        for j in 0..4 {
            let t = a[i] as u128 * b[j] as u128 + out[i + j] as u128 + carry;
            out[i + j] = t as u64;
            carry = t >> 64;
        }
        out[i + 4] = carry as u64;
    }
    out
}

/// 把 512 位整数约简到 `[0, m)`，其中 `c = 2^256 - m`
///
/// 反复使用 `hi * 2^256 + lo ≡ hi * c + lo (mod m)` 折叠高位，直到高 256 位为零。
/// `c` 越短折叠越快: 对 secp256k1 的 p (c 为 33 位) 和 n (c 为 129 位) 最多三到四轮。
pub fn reduce_wide(mut x: [u64; 8], c: &Limbs, m: &Limbs) -> Limbs {
    loop {
        let hi = [x[4], x[5], x[6], x[7]];
        if is_zero(&hi) {
            break;
        }
        let mut folded = mul_wide(&hi, c);
        let mut carry = 0u128;
        for i in 0..8 {
            let lo = if i < 4 { x[i] as u128 } else { 0 };
            let sum = folded[i] as u128 + lo + carry;
            folded[i] = sum as u64;
            carry = sum >> 64;
        }
        x = folded;
    }

    let mut r = [x[0], x[1], x[2], x[3]];
    while cmp(&r, m) != Ordering::Less {
        r = sub(&r, m).0;
    }
    r
}

/// 第 `index` 位 (0 为最低位)
#[inline]
pub fn bit(a: &Limbs, index: usize) -> bool {
    (a[index / 64] >> (index % 64)) & 1 == 1
}

/// 最高有效位的位置加一，零返回 0
#[inline]
pub fn bit_len(a: &Limbs) -> usize {
    for i in (0..4).rev() {
        if a[i] != 0 {
            return i * 64 + 64 - a[i].leading_zeros() as usize;
        }
    }
    0
}
