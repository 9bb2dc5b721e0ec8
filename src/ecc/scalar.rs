//! 模 n 的标量 (私钥)

use super::u256::{self, Limbs};

/// 曲线阶 n
pub const N: Limbs = [
    0xBFD25E8CD0364141,
    0xBAAEDCE6AF48A03B,
    0xFFFFFFFFFFFFFFFE,
    0xFFFFFFFFFFFFFFFF,
];

/// 2^256 - n
const N_COMPLEMENT: Limbs = [0x402DA1732FC9BEBF, 0x4551231950B75FC4, 0x0000000000000001, 0];

const N_MINUS_2: Limbs = [
    0xBFD25E8CD036413F,
    0xBAAEDCE6AF48A03B,
    0xFFFFFFFFFFFFFFFE,
    0xFFFFFFFFFFFFFFFF,
];

/// 标量，内部值始终在 `[0, n)` 内
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scalar(pub(crate) Limbs);

impl Scalar {
    pub const ZERO: Self = Self([0; 4]);
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// 大端序解析并检测溢出: 值不小于 n 时返回 `None`
    #[inline]
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let limbs = u256::from_be_bytes(bytes);
        if u256::cmp(&limbs, &N).is_lt() {
            Some(Self(limbs))
        } else {
            None
        }
    }

    /// 大端序解析并约简到 `[0, n)` (签名中的消息哈希)
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let limbs = u256::from_be_bytes(bytes);
        if u256::cmp(&limbs, &N).is_lt() {
            Self(limbs)
        } else {
            Self(u256::sub(&limbs, &N).0)
        }
    }

    /// 可用作私钥: 非零且未溢出
    #[inline]
    pub fn from_private_key(bytes: &[u8; 32]) -> Option<Self> {
        Self::from_bytes(bytes).filter(|s| !s.is_zero())
    }

    pub fn from_u64(v: u64) -> Self {
        Self([v, 0, 0, 0])
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        u256::to_be_bytes(&self.0)
    }

    pub(crate) fn limbs(&self) -> &Limbs {
        &self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        u256::is_zero(&self.0)
    }

    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = u256::add(&self.0, &rhs.0);
        if carry || u256::cmp(&sum, &N).is_ge() {
            Self(u256::sub(&sum, &N).0)
        } else {
            Self(sum)
        }
    }

    pub fn neg(&self) -> Self {
        if self.is_zero() {
            *self
        } else {
            Self(u256::sub(&N, &self.0).0)
        }
    }

    pub fn mul(&self, rhs: &Self) -> Self {
        Self(u256::reduce_wide(
            u256::mul_wide(&self.0, &rhs.0),
            &N_COMPLEMENT,
            &N,
        ))
    }

    /// 乘法逆元，零没有逆元
    pub fn invert(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        let mut result = Self::ONE;
        for i in (0..u256::bit_len(&N_MINUS_2)).rev() {
            result = result.mul(&result);
            if u256::bit(&N_MINUS_2, i) {
                result = result.mul(self);
            }
        }
        Some(result)
    }

    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        u256::bit(&self.0, index)
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        u256::bit_len(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n_bytes() -> [u8; 32] {
        u256::to_be_bytes(&N)
    }

    #[test]
    fn test_overflow_detection() {
        assert!(Scalar::from_bytes(&n_bytes()).is_none());
        assert!(Scalar::from_bytes(&[0xff; 32]).is_none());

        let mut below = n_bytes();
        below[31] -= 1;
        assert!(Scalar::from_bytes(&below).is_some());
    }

    #[test]
    fn test_zero_is_not_a_private_key() {
        assert!(Scalar::from_bytes(&[0u8; 32]).is_some());
        assert!(Scalar::from_private_key(&[0u8; 32]).is_none());
    }

    #[test]
    fn test_reduced_parse() {
        let mut above = n_bytes();
        above[31] += 5;
        assert_eq!(Scalar::from_bytes_reduced(&above), Scalar::from_u64(5));
    }

    #[test]
    fn test_arithmetic() {
        let a = Scalar::from_u64(7);
        assert_eq!(a.add(&a.neg()), Scalar::ZERO);
        let inv = a.invert().unwrap();
        assert_eq!(a.mul(&inv), Scalar::ONE);

        let big = Scalar(u256::sub(&N, &[1, 0, 0, 0]).0);
        // (n-1)^2 = 1 mod n
        assert_eq!(big.mul(&big), Scalar::ONE);
    }
}
