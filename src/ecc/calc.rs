//! 标量乘法、公钥派生与签名公钥恢复

use std::sync::OnceLock;

use super::field::FieldElement;
use super::point::{AffinePoint, JacobianPoint};
use super::scalar::{N, Scalar};
use super::u256;
use super::COFACTOR;

/// `2^i * G` (i = 0..256) 的仿射表，首次使用时构建，此后只读共享
static G_POWERS: OnceLock<Vec<AffinePoint>> = OnceLock::new();

fn g_powers() -> &'static [AffinePoint] {
    G_POWERS.get_or_init(|| {
        let mut table = Vec::with_capacity(256);
        let mut current = JacobianPoint::from(AffinePoint::GENERATOR);
        for _ in 0..256 {
            table.push(current.to_affine());
            current = current.double();
        }
        table
    })
}

/// 倍点-加法实现的 `k * point`，k 为零或点为无穷远时返回无穷远点
pub fn scalar_multiply(k: &Scalar, point: &AffinePoint) -> JacobianPoint {
    if k.is_zero() || point.infinity {
        return JacobianPoint::INFINITY;
    }
    let mut result = JacobianPoint::INFINITY;
    for i in (0..k.bit_len()).rev() {
        result = result.double();
        if k.bit(i) {
            result = result.add_affine(point);
        }
    }
    result
}

/// `k * G`，使用预计算的 2 的幂表，只做加法
pub fn multiply_by_g(k: &Scalar) -> JacobianPoint {
    let table = g_powers();
    let mut result = JacobianPoint::INFINITY;
    for (i, power) in table.iter().enumerate().take(k.bit_len()) {
        if k.bit(i) {
            result = result.add_affine(power);
        }
    }
    result
}

/// 私钥 (32 字节大端) 对应的仿射公钥，私钥为零或不小于 n 时返回 `None`
pub fn public_key_point(private_key: &[u8; 32]) -> Option<AffinePoint> {
    let k = Scalar::from_private_key(private_key)?;
    Some(multiply_by_g(&k).to_affine())
}

/// 派生序列化公钥 (33 字节压缩或 65 字节未压缩)
pub fn derive_public_key(private_key: &[u8; 32], compressed: bool) -> Option<Vec<u8>> {
    let point = public_key_point(private_key)?;
    Some(if compressed {
        point.to_compressed().to_vec()
    } else {
        point.to_uncompressed().to_vec()
    })
}

/// ECDSA 签名 (r, s)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: Scalar,
    pub s: Scalar,
}

impl Signature {
    /// r 与 s 都必须在 `[1, n)` 内
    pub fn new(r: Scalar, s: Scalar) -> Option<Self> {
        if r.is_zero() || s.is_zero() {
            None
        } else {
            Some(Self { r, s })
        }
    }

    /// 64 字节 `r ‖ s`
    pub fn from_compact(bytes: &[u8; 64]) -> Option<Self> {
        let r = Scalar::from_bytes(bytes[..32].try_into().ok()?)?;
        let s = Scalar::from_bytes(bytes[32..].try_into().ok()?)?;
        Self::new(r, s)
    }

    /// DER: `30 len 02 rlen r 02 slen s`
    pub fn from_der(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 8 || bytes[0] != 0x30 || bytes[1] as usize != bytes.len() - 2 {
            return None;
        }
        let (r, rest) = read_der_integer(&bytes[2..])?;
        let (s, rest) = read_der_integer(rest)?;
        if !rest.is_empty() {
            return None;
        }
        Self::new(r, s)
    }
}

fn read_der_integer(bytes: &[u8]) -> Option<(Scalar, &[u8])> {
    if bytes.len() < 2 || bytes[0] != 0x02 {
        return None;
    }
    let len = bytes[1] as usize;
    if len == 0 || len > 33 || bytes.len() < 2 + len {
        return None;
    }
    let mut value = &bytes[2..2 + len];
    while value.len() > 1 && value[0] == 0 {
        value = &value[1..];
    }
    if value.len() > 32 {
        return None;
    }
    let mut buf = [0u8; 32];
    buf[32 - value.len()..].copy_from_slice(value);
    Some((Scalar::from_bytes(&buf)?, &bytes[2 + len..]))
}

/// 由签名和消息哈希恢复所有候选公钥
///
/// 对 `j ∈ [0, COFACTOR]` 取 `x = r + j·n`，y 取两种奇偶性，
/// 计算 `Q = r⁻¹(s·R − e·G)` 并去重。
///
/// 注意: 返回前不会再用候选公钥验证签名 (SEC1 4.1.6 的 1.6.2 步)，
/// 结果中可能含有不能通过验证的点，调用方需要自行与已知事实比对。
pub fn recover_public_keys(signature: &Signature, message_hash: &[u8; 32]) -> Vec<AffinePoint> {
    let mut result: Vec<AffinePoint> = Vec::with_capacity(4);
    let Some(r_inv) = signature.r.invert() else {
        return result;
    };
    let e = Scalar::from_bytes_reduced(message_hash);
    let u1 = e.neg().mul(&r_inv);
    let u2 = signature.s.mul(&r_inv);
    let u1_g = multiply_by_g(&u1);

    for j in 0..=COFACTOR {
        let mut x_limbs = *signature.r.limbs();
        for _ in 0..j {
            let (sum, carry) = u256::add(&x_limbs, &N);
            if carry {
                return result;
            }
            x_limbs = sum;
        }
        let Some(x) = FieldElement::from_bytes(&u256::to_be_bytes(&x_limbs)) else {
            continue;
        };

        for odd_y in [false, true] {
            let Some(r_point) = AffinePoint::from_x(x, odd_y) else {
                continue;
            };
            let q = scalar_multiply(&u2, &r_point).add(&u1_g).to_affine();
            if !q.infinity && !result.contains(&q) {
                result.push(q);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_hex(s: &str) -> Scalar {
        let bytes: [u8; 32] = hex::decode(s).unwrap().try_into().unwrap();
        Scalar::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_multiply_by_g_matches_double_and_add() {
        for k in [1u64, 2, 3, 255, 0xdead_beef] {
            let k = Scalar::from_u64(k);
            let a = multiply_by_g(&k).to_affine();
            let b = scalar_multiply(&k, &AffinePoint::GENERATOR).to_affine();
            assert_eq!(a, b);
            assert!(a.is_on_curve());
        }
        assert_eq!(
            multiply_by_g(&Scalar::ONE).to_affine(),
            AffinePoint::GENERATOR
        );
    }

    #[test]
    fn test_order_edge_cases() {
        assert!(multiply_by_g(&Scalar::ZERO).is_infinity());
        let n_minus_1 = Scalar::ONE.neg();
        assert_eq!(
            multiply_by_g(&n_minus_1).to_affine(),
            AffinePoint::GENERATOR.neg()
        );
        assert!(
            multiply_by_g(&n_minus_1)
                .add_affine(&AffinePoint::GENERATOR)
                .is_infinity()
        );
    }

    #[test]
    fn test_derive_public_key_rejects_overflow() {
        let n = u256::to_be_bytes(&N);
        assert!(derive_public_key(&n, true).is_none());
        assert!(derive_public_key(&[0u8; 32], true).is_none());

        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(
            hex::encode(derive_public_key(&one, true).unwrap()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(derive_public_key(&one, false).unwrap().len(), 65);
    }

    #[test]
    fn test_recover_public_keys_contains_signer() {
        let d = scalar_hex("4c7a9640c72dc2099f23715d0c8a0d8a35f8906e3cab61dd3f78b67bf887c9ab");
        let k = scalar_hex("00000000000000000000000000000000000000000000000000000000075bcd15");
        let hash = [0x42u8; 32];
        let e = Scalar::from_bytes_reduced(&hash);

        let r_point = multiply_by_g(&k).to_affine();
        let r = Scalar::from_bytes_reduced(&r_point.x.to_bytes());
        let s = k.invert().unwrap().mul(&e.add(&r.mul(&d)));
        let sig = Signature::new(r, s).unwrap();

        let expected = multiply_by_g(&d).to_affine();
        let candidates = recover_public_keys(&sig, &hash);
        assert!(!candidates.is_empty());
        assert!(candidates.len() <= 4);
        assert!(candidates.contains(&expected));
    }

    #[test]
    fn test_signature_parsing() {
        let mut compact = [0u8; 64];
        compact[31] = 5;
        compact[63] = 9;
        let sig = Signature::from_compact(&compact).unwrap();
        assert_eq!(sig.r, Scalar::from_u64(5));
        assert_eq!(sig.s, Scalar::from_u64(9));

        let der = [0x30, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0x09];
        assert_eq!(Signature::from_der(&der), Some(sig));

        let padded = [0x30, 0x07, 0x02, 0x02, 0x00, 0x05, 0x02, 0x01, 0x09];
        assert_eq!(Signature::from_der(&padded), Some(sig));

        assert!(Signature::from_compact(&[0u8; 64]).is_none());
        assert!(Signature::from_der(&der[..7]).is_none());
    }
}
