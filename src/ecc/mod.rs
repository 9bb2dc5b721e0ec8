//! secp256k1 椭圆曲线
//!
//! 曲线 y^2 = x^3 + 7 定义在 GF(p) 上，生成元 G 的阶为 n，余因子为 1。
//! 所有类型都是 `Copy` 的定长值，热循环里不分配内存。

pub mod calc;
pub mod field;
pub mod point;
pub mod scalar;
pub mod u256;

pub use calc::{
    Signature, derive_public_key, multiply_by_g, public_key_point, recover_public_keys,
    scalar_multiply,
};
pub use field::FieldElement;
pub use point::{AffinePoint, JacobianPoint};
pub use scalar::Scalar;

/// 基域素数 p
pub const P: u256::Limbs = field::P;
/// 生成元阶 n
pub const N: u256::Limbs = scalar::N;
/// 生成元 G
pub const G: AffinePoint = AffinePoint::GENERATOR;
/// 余因子
pub const COFACTOR: u64 = 1;
