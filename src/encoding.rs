//! Message encoding: bytes ↔ ternary coefficients.
//!
//! Bytes are read as a bit stream, most significant bit first, three bits
//! at a time. Each 3-bit value `v` becomes the coefficient pair
//! `(v / 3, v % 3)` with 2 written as -1. Nine pairs exist for eight
//! values, so the pair `(-1, -1)` never appears in a valid encoding.

use crate::poly::Poly;

fn trit(v: i32) -> i32 {
    if v == 2 {
        -1
    } else {
        v
    }
}

/// Number of coefficients used to encode `num_bytes` bytes.
pub fn trits_len(num_bytes: usize) -> usize {
    (num_bytes * 8 + 2) / 3 * 2
}

/// Encodes `data` into the low coefficients of a degree-`n` polynomial with
/// coefficients in {-1, 0, 1}. Remaining coefficients are zero.
pub fn bytes_to_trits(data: &[u8], n: usize) -> Poly {
    debug_assert!(trits_len(data.len()) <= n);
    let mut p = Poly::zero(n);
    let total_bits = data.len() * 8;
    let mut bit = 0;
    let mut i = 0;
    while bit < total_bits {
        let mut v = 0i32;
        for k in 0..3 {
            let pos = bit + k;
            let b = if pos < total_bits {
                (data[pos / 8] >> (7 - pos % 8)) & 1
            } else {
                0
            };
            v = (v << 1) | i32::from(b);
        }
        p.coeffs[i] = trit(v / 3);
        p.coeffs[i + 1] = trit(v % 3);
        bit += 3;
        i += 2;
    }
    p
}

/// Decodes `num_bytes` bytes from the low coefficients of `p`. Coefficients
/// are read mod 3. Returns `None` if an invalid pair is found.
pub fn trits_to_bytes(p: &Poly, num_bytes: usize) -> Option<Vec<u8>> {
    if trits_len(num_bytes) > p.n() {
        return None;
    }
    let mut data = vec![0u8; num_bytes];
    let total_bits = num_bytes * 8;
    let mut bit = 0;
    for pair in p.coeffs[..trits_len(num_bytes)].chunks_exact(2) {
        let v = 3 * pair[0].rem_euclid(3) + pair[1].rem_euclid(3);
        if v > 7 {
            return None;
        }
        for k in 0..3 {
            let pos = bit + k;
            if pos < total_bits && (v >> (2 - k)) & 1 == 1 {
                data[pos / 8] |= 1 << (7 - pos % 8);
            }
        }
        bit += 3;
    }
    Some(data)
}

/// Packs the low two bits of every coefficient, four coefficients per byte,
/// first coefficient in the top bits.
pub fn pack_mod4(p: &Poly) -> Vec<u8> {
    let mut out = vec![0u8; (p.n() + 3) / 4];
    for (i, &c) in p.coeffs.iter().enumerate() {
        out[i / 4] |= ((c & 3) as u8) << (6 - 2 * (i % 4));
    }
    out
}
