//! SHA-256 实现
//!
//! 提供两类入口:
//! - [`Sha256`]: 通用流式哈希，状态可复用 (`reset`)
//! - [`digest_fixed`] / [`double_digest_fixed`]: 输入长度在编译期已知的特化版本，
//!   填充字节和长度后缀在单态化时确定，热循环中没有分支和拷贝开销

use byteorder::{BigEndian, ByteOrder};

/// 初始哈希值
pub const IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

pub const BLOCK_LEN: usize = 64;
pub const DIGEST_LEN: usize = 32;

/// 压缩一个 64 字节数据块
#[inline]
pub fn compress(state: &mut [u32; 8], block: &[u8; BLOCK_LEN]) {
    let mut w = [0u32; 64];
    BigEndian::read_u32_into(block, &mut w[..16]);
    for i in 16..64 {
        let s0 = w[i - 15].rotate_right(7) ^ w[i - 15].rotate_right(18) ^ (w[i - 15] >> 3);
        let s1 = w[i - 2].rotate_right(17) ^ w[i - 2].rotate_right(19) ^ (w[i - 2] >> 10);
        w[i] = w[i - 16]
            .wrapping_add(s0)
            .wrapping_add(w[i - 7])
            .wrapping_add(s1);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for i in 0..64 {
        let s1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let ch = (e & f) ^ (!e & g);
        let t1 = h
            .wrapping_add(s1)
            .wrapping_add(ch)
            .wrapping_add(K[i])
            .wrapping_add(w[i]);
        let s0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let maj = (a & b) ^ (a & c) ^ (b & c);
        let t2 = s0.wrapping_add(maj);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
    state[5] = state[5].wrapping_add(f);
    state[6] = state[6].wrapping_add(g);
    state[7] = state[7].wrapping_add(h);
}

#[inline]
fn state_to_bytes(state: &[u32; 8]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    BigEndian::write_u32_into(state, &mut out);
    out
}

/// 流式 SHA-256
#[derive(Debug, Clone)]
pub struct Sha256 {
    state: [u32; 8],
    buffer: [u8; BLOCK_LEN],
    buffered: usize,
    total_len: u64,
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha256 {
    pub fn new() -> Self {
        Self {
            state: IV,
            buffer: [0u8; BLOCK_LEN],
            buffered: 0,
            total_len: 0,
        }
    }

    /// 重置为初始状态，供下一个候选复用
    pub fn reset(&mut self) {
        self.state = IV;
        self.buffered = 0;
        self.total_len = 0;
    }

    pub fn update(&mut self, mut data: &[u8]) {
        self.total_len += data.len() as u64;

        if self.buffered > 0 {
            let take = (BLOCK_LEN - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < BLOCK_LEN {
                return;
            }
            let block = self.buffer;
            compress(&mut self.state, &block);
            self.buffered = 0;
        }

        let mut chunks = data.chunks_exact(BLOCK_LEN);
        for chunk in &mut chunks {
            let mut block = [0u8; BLOCK_LEN];
            block.copy_from_slice(chunk);
            compress(&mut self.state, &block);
        }

        let rest = chunks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    pub fn finalize(mut self) -> [u8; DIGEST_LEN] {
        self.finalize_reset()
    }

    /// 输出摘要并重置状态
    pub fn finalize_reset(&mut self) -> [u8; DIGEST_LEN] {
        let bit_len = self.total_len.wrapping_mul(8);
        let mut block = [0u8; BLOCK_LEN];
        block[..self.buffered].copy_from_slice(&self.buffer[..self.buffered]);
        block[self.buffered] = 0x80;

        if self.buffered >= BLOCK_LEN - 8 {
            compress(&mut self.state, &block);
            block = [0u8; BLOCK_LEN];
        }
        block[BLOCK_LEN - 8..].copy_from_slice(&bit_len.to_be_bytes());
        compress(&mut self.state, &block);

        let out = state_to_bytes(&self.state);
        self.reset();
        out
    }
}

/// 一次性计算任意长度数据的 SHA-256
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize()
}

/// SHA256(SHA256(data))
pub fn double_digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    digest_fixed(&digest(data))
}

/// 固定长度 SHA-256
///
/// `L` 在编译期已知: 完整块数、尾块位置、`0x80` 标记和长度后缀都是常量，
/// 每个 `L` 单态化出一个独立的特化函数。
#[inline]
pub fn digest_fixed<const L: usize>(data: &[u8; L]) -> [u8; DIGEST_LEN] {
    let mut state = IV;
    let full_blocks = L / BLOCK_LEN;
    for i in 0..full_blocks {
        let mut block = [0u8; BLOCK_LEN];
        block.copy_from_slice(&data[i * BLOCK_LEN..(i + 1) * BLOCK_LEN]);
        compress(&mut state, &block);
    }

    let rem = L % BLOCK_LEN;
    let mut tail = [0u8; 2 * BLOCK_LEN];
    tail[..rem].copy_from_slice(&data[full_blocks * BLOCK_LEN..]);
    tail[rem] = 0x80;
    let tail_blocks = if rem < BLOCK_LEN - 8 { 1 } else { 2 };
    let end = tail_blocks * BLOCK_LEN;
    tail[end - 8..end].copy_from_slice(&((L as u64) * 8).to_be_bytes());

    for i in 0..tail_blocks {
        let mut block = [0u8; BLOCK_LEN];
        block.copy_from_slice(&tail[i * BLOCK_LEN..(i + 1) * BLOCK_LEN]);
        compress(&mut state, &block);
    }

    state_to_bytes(&state)
}

/// 固定长度 SHA256d
#[inline]
pub fn double_digest_fixed<const L: usize>(data: &[u8; L]) -> [u8; DIGEST_LEN] {
    digest_fixed::<DIGEST_LEN>(&digest_fixed::<L>(data))
}

macro_rules! fixed_length_variants {
    ($($single:ident, $double:ident => $len:literal;)*) => {
        $(
            #[doc = concat!("SHA-256，输入恰好 ", stringify!($len), " 字节")]
            #[inline]
            pub fn $single(data: &[u8; $len]) -> [u8; DIGEST_LEN] {
                digest_fixed::<$len>(data)
            }

            #[doc = concat!("SHA256d，输入恰好 ", stringify!($len), " 字节")]
            #[inline]
            pub fn $double(data: &[u8; $len]) -> [u8; DIGEST_LEN] {
                double_digest_fixed::<$len>(data)
            }
        )*

        /// 提供了命名特化版本的输入长度
        pub const SPECIALIZED_LENGTHS: &[usize] = &[$($len),*];
    };
}

fixed_length_variants! {
    hash_16, double_hash_16 => 16;
    hash_20, double_hash_20 => 20;
    hash_21, double_hash_21 => 21;
    hash_22, double_hash_22 => 22;
    hash_23, double_hash_23 => 23;
    hash_24, double_hash_24 => 24;
    hash_26, double_hash_26 => 26;
    hash_27, double_hash_27 => 27;
    hash_28, double_hash_28 => 28;
    hash_30, double_hash_30 => 30;
    hash_31, double_hash_31 => 31;
    hash_32, double_hash_32 => 32;
    hash_33, double_hash_33 => 33;
    hash_34, double_hash_34 => 34;
    hash_65, double_hash_65 => 65;
}
