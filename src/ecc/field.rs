//! secp256k1 基域 GF(p) 上的元素

use super::u256::{self, Limbs};

/// p = 2^256 - 2^32 - 977
pub const P: Limbs = [
    0xFFFFFFFEFFFFFC2F,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
];

/// 2^256 - p
const P_COMPLEMENT: Limbs = [0x00000001000003D1, 0, 0, 0];

/// p - 2，费马小定理求逆用
const P_MINUS_2: Limbs = [
    0xFFFFFFFEFFFFFC2D,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
];

/// (p + 1) / 4，p ≡ 3 (mod 4) 时的平方根指数
const P_PLUS_1_DIV_4: Limbs = [
    0xFFFFFFFFBFFFFF0C,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
    0x3FFFFFFFFFFFFFFF,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldElement(pub(crate) Limbs);

impl FieldElement {
    pub const ZERO: Self = Self([0; 4]);
    pub const ONE: Self = Self([1, 0, 0, 0]);
    /// 曲线方程 y^2 = x^3 + 7 中的 b
    pub const SEVEN: Self = Self([7, 0, 0, 0]);

    /// 大端序解析，值不小于 p 时返回 `None`
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let limbs = u256::from_be_bytes(bytes);
        if u256::cmp(&limbs, &P).is_lt() {
            Some(Self(limbs))
        } else {
            None
        }
    }

    /// 由已知小于 p 的 limb 构造
    pub const fn from_limbs_unchecked(limbs: Limbs) -> Self {
        Self(limbs)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        u256::to_be_bytes(&self.0)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        u256::is_zero(&self.0)
    }

    #[inline]
    pub fn is_odd(&self) -> bool {
        self.0[0] & 1 == 1
    }

    #[inline]
    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = u256::add(&self.0, &rhs.0);
        if carry || u256::cmp(&sum, &P).is_ge() {
            Self(u256::sub(&sum, &P).0)
        } else {
            Self(sum)
        }
    }

    #[inline]
    pub fn sub(&self, rhs: &Self) -> Self {
        let (diff, borrow) = u256::sub(&self.0, &rhs.0);
        if borrow {
            Self(u256::add(&diff, &P).0)
        } else {
            Self(diff)
        }
    }

    #[inline]
    pub fn neg(&self) -> Self {
        Self::ZERO.sub(self)
    }

    #[inline]
    pub fn double(&self) -> Self {
        self.add(self)
    }

    #[inline]
    pub fn mul(&self, rhs: &Self) -> Self {
        Self(u256::reduce_wide(
            u256::mul_wide(&self.0, &rhs.0),
            &P_COMPLEMENT,
            &P,
        ))
    }

    #[inline]
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// 小整数倍
    #[inline]
    pub fn mul_small(&self, k: u64) -> Self {
        self.mul(&Self([k, 0, 0, 0]))
    }

    fn pow(&self, exp: &Limbs) -> Self {
        let mut result = Self::ONE;
        for i in (0..u256::bit_len(exp)).rev() {
            result = result.square();
            if u256::bit(exp, i) {
                result = result.mul(self);
            }
        }
        result
    }

    /// 乘法逆元，零没有逆元
    pub fn invert(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self.pow(&P_MINUS_2))
        }
    }

    /// 平方根，非二次剩余返回 `None`
    pub fn sqrt(&self) -> Option<Self> {
        let root = self.pow(&P_PLUS_1_DIV_4);
        if root.square() == *self {
            Some(root)
        } else {
            None
        }
    }
}
