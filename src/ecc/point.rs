//! 仿射坐标与 Jacobian 坐标下的曲线点
//!
//! 仿射坐标用于序列化和比较，Jacobian 坐标用于反复的倍点/点加 (避免每步求逆)。

use super::field::FieldElement;

pub const GX: FieldElement = FieldElement::from_limbs_unchecked([
    0x59F2815B16F81798,
    0x029BFCDB2DCE28D9,
    0x55A06295CE870B07,
    0x79BE667EF9DCBBAC,
]);

pub const GY: FieldElement = FieldElement::from_limbs_unchecked([
    0x9C47D08FFB10D4B8,
    0xFD17B448A6855419,
    0x5DA4FBFC0E1108A8,
    0x483ADA7726A3C465,
]);

pub const COMPRESSED_LEN: usize = 33;
pub const UNCOMPRESSED_LEN: usize = 65;

/// 仿射点，`infinity` 为真时坐标无意义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AffinePoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub infinity: bool,
}

impl AffinePoint {
    pub const INFINITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: true,
    };

    /// 生成元 G
    pub const GENERATOR: Self = Self {
        x: GX,
        y: GY,
        infinity: false,
    };

    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        Self {
            x,
            y,
            infinity: false,
        }
    }

    pub fn is_on_curve(&self) -> bool {
        if self.infinity {
            return true;
        }
        let rhs = self.x.square().mul(&self.x).add(&FieldElement::SEVEN);
        self.y.square() == rhs
    }

    pub fn neg(&self) -> Self {
        if self.infinity {
            *self
        } else {
            Self::new(self.x, self.y.neg())
        }
    }

    /// 由 x 坐标和 y 的奇偶性还原点，x 不在曲线上时返回 `None`
    pub fn from_x(x: FieldElement, odd_y: bool) -> Option<Self> {
        let y2 = x.square().mul(&x).add(&FieldElement::SEVEN);
        let y = y2.sqrt()?;
        let y = if y.is_odd() == odd_y { y } else { y.neg() };
        Some(Self::new(x, y))
    }

    /// 解析 33 字节压缩或 65 字节未压缩公钥
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes.len() {
            COMPRESSED_LEN => {
                let odd_y = match bytes[0] {
                    0x02 => false,
                    0x03 => true,
                    _ => return None,
                };
                let x = FieldElement::from_bytes(bytes[1..33].try_into().ok()?)?;
                Self::from_x(x, odd_y)
            }
            UNCOMPRESSED_LEN => {
                if bytes[0] != 0x04 {
                    return None;
                }
                let x = FieldElement::from_bytes(bytes[1..33].try_into().ok()?)?;
                let y = FieldElement::from_bytes(bytes[33..65].try_into().ok()?)?;
                let point = Self::new(x, y);
                point.is_on_curve().then_some(point)
            }
            _ => None,
        }
    }

    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let mut out = [0u8; COMPRESSED_LEN];
        out[0] = if self.y.is_odd() { 0x03 } else { 0x02 };
        out[1..].copy_from_slice(&self.x.to_bytes());
        out
    }

    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out[33..].copy_from_slice(&self.y.to_bytes());
        out
    }
}

/// Jacobian 坐标点 (X, Y, Z) 对应仿射 (X/Z^2, Y/Z^3)，Z = 0 表示无穷远点
#[derive(Debug, Clone, Copy)]
pub struct JacobianPoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
}

impl From<AffinePoint> for JacobianPoint {
    fn from(p: AffinePoint) -> Self {
        if p.infinity {
            Self::INFINITY
        } else {
            Self {
                x: p.x,
                y: p.y,
                z: FieldElement::ONE,
            }
        }
    }
}

impl JacobianPoint {
    pub const INFINITY: Self = Self {
        x: FieldElement::ONE,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    #[inline]
    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    /// 倍点 (a = 0 的 dbl-2009-l 公式)
    pub fn double(&self) -> Self {
        if self.is_infinity() || self.y.is_zero() {
            return Self::INFINITY;
        }
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        let d = self.x.add(&b).square().sub(&a).sub(&c).double();
        let e = a.mul_small(3);
        let f = e.square();
        let x3 = f.sub(&d.double());
        let y3 = e.mul(&d.sub(&x3)).sub(&c.mul_small(8));
        let z3 = self.y.mul(&self.z).double();
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// 通用点加 (add-2007-bl)
    pub fn add(&self, other: &Self) -> Self {
        if self.is_infinity() {
            return *other;
        }
        if other.is_infinity() {
            return *self;
        }

        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x.mul(&z2z2);
        let u2 = other.x.mul(&z1z1);
        let s1 = self.y.mul(&other.z).mul(&z2z2);
        let s2 = other.y.mul(&self.z).mul(&z1z1);
        let h = u2.sub(&u1);
        let r = s2.sub(&s1).double();

        if h.is_zero() {
            return if r.is_zero() {
                self.double()
            } else {
                Self::INFINITY
            };
        }

        let i = h.double().square();
        let j = h.mul(&i);
        let v = u1.mul(&i);
        let x3 = r.square().sub(&j).sub(&v.double());
        let y3 = r.mul(&v.sub(&x3)).sub(&s1.mul(&j).double());
        let z3 = self.z.add(&other.z).square().sub(&z1z1).sub(&z2z2).mul(&h);
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// 与仿射点相加 (madd-2007-bl)，热循环里 G 的倍数表都是仿射点
    pub fn add_affine(&self, other: &AffinePoint) -> Self {
        if other.infinity {
            return *self;
        }
        if self.is_infinity() {
            return Self::from(*other);
        }

        let z1z1 = self.z.square();
        let u2 = other.x.mul(&z1z1);
        let s2 = other.y.mul(&self.z).mul(&z1z1);
        let h = u2.sub(&self.x);
        let r = s2.sub(&self.y).double();

        if h.is_zero() {
            return if r.is_zero() {
                self.double()
            } else {
                Self::INFINITY
            };
        }

        let hh = h.square();
        let i = hh.mul_small(4);
        let j = h.mul(&i);
        let v = self.x.mul(&i);
        let x3 = r.square().sub(&j).sub(&v.double());
        let y3 = r.mul(&v.sub(&x3)).sub(&self.y.mul(&j).double());
        let z3 = self.z.add(&h).square().sub(&z1z1).sub(&hh);
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.neg(),
            z: self.z,
        }
    }

    /// 转换为仿射坐标 (一次求逆)
    pub fn to_affine(&self) -> AffinePoint {
        match self.z.invert() {
            None => AffinePoint::INFINITY,
            Some(zinv) => {
                let zinv2 = zinv.square();
                let zinv3 = zinv2.mul(&zinv);
                AffinePoint::new(self.x.mul(&zinv2), self.y.mul(&zinv3))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_on_curve() {
        assert!(AffinePoint::GENERATOR.is_on_curve());
        assert!(!AffinePoint::new(GX, GX).is_on_curve());
    }

    #[test]
    fn test_double_equals_add_self() {
        let g = JacobianPoint::from(AffinePoint::GENERATOR);
        let d1 = g.double().to_affine();
        let d2 = g.add(&g).to_affine();
        let d3 = g.add_affine(&AffinePoint::GENERATOR).to_affine();
        assert_eq!(d1, d2);
        assert_eq!(d1, d3);
        assert!(d1.is_on_curve());
    }

    #[test]
    fn test_add_inverse_is_infinity() {
        let g = JacobianPoint::from(AffinePoint::GENERATOR);
        assert!(g.add(&g.neg()).is_infinity());
        assert!(g.add_affine(&AffinePoint::GENERATOR.neg()).is_infinity());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let g = AffinePoint::GENERATOR;
        assert_eq!(AffinePoint::parse(&g.to_compressed()), Some(g));
        assert_eq!(AffinePoint::parse(&g.to_uncompressed()), Some(g));
        assert_eq!(
            hex::encode(g.to_compressed()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_parse_rejects_bad_prefix() {
        let mut bytes = AffinePoint::GENERATOR.to_compressed();
        bytes[0] = 0x05;
        assert!(AffinePoint::parse(&bytes).is_none());
        assert!(AffinePoint::parse(&[0u8; 10]).is_none());
    }
}
