//! Bit packing for keys and ciphertexts.
//!
//! Values are written big-endian: most significant bit first, first value
//! first, with the final byte zero-padded. A ciphertext is `N` coefficients
//! at `log2(q)` bits each; private keys reuse the same packing for index
//! lists.

use crate::error::{NtruError, Result};
use crate::poly::Poly;

/// Bytes needed for `count` values of `bits` bits.
pub fn packed_len(count: usize, bits: u32) -> usize {
    (count * bits as usize + 7) / 8
}

/// Packs the low `bits` bits of every value.
pub fn pack_bits<I: IntoIterator<Item = u32>>(values: I, bits: u32, out: &mut Vec<u8>) {
    let mut acc: u64 = 0;
    let mut pending: u32 = 0;
    let mask = (1u64 << bits) - 1;
    for v in values {
        acc = (acc << bits) | (u64::from(v) & mask);
        pending += bits;
        while pending >= 8 {
            pending -= 8;
            out.push((acc >> pending) as u8);
        }
        acc &= (1u64 << pending) - 1;
    }
    if pending > 0 {
        out.push((acc << (8 - pending)) as u8);
    }
}

/// Reads `count` values of `bits` bits. The caller checks the length.
pub fn unpack_bits(data: &[u8], count: usize, bits: u32) -> Vec<u32> {
    let mut values = Vec::with_capacity(count);
    let mut acc: u64 = 0;
    let mut avail: u32 = 0;
    let mut bytes = data.iter();
    let mask = (1u64 << bits) - 1;
    while values.len() < count {
        while avail < bits {
            let b = bytes.next().copied().unwrap_or(0);
            acc = (acc << 8) | u64::from(b);
            avail += 8;
        }
        avail -= bits;
        values.push(((acc >> avail) & mask) as u32);
        acc &= (1u64 << avail) - 1;
    }
    values
}

/// Serializes a polynomial mod `q` (coefficients already in `[0, q)`).
pub fn pack_coeffs(p: &Poly, q: u16) -> Vec<u8> {
    let bits = q.trailing_zeros();
    let mut out = Vec::with_capacity(packed_len(p.n(), bits));
    pack_bits(p.coeffs.iter().map(|&c| c as u32), bits, &mut out);
    out
}

/// Deserializes a degree-`n` polynomial mod `q`.
pub fn unpack_coeffs(data: &[u8], n: usize, q: u16) -> Result<Poly> {
    let bits = q.trailing_zeros();
    let expected = packed_len(n, bits);
    if data.len() != expected {
        return Err(NtruError::SerializationFailure(format!(
            "expected {expected} bytes for {n} coefficients mod {q}, got {}",
            data.len()
        )));
    }
    let coeffs = unpack_bits(data, n, bits)
        .into_iter()
        .map(|c| c as i32)
        .collect();
    Ok(Poly::from_coeffs(coeffs))
}
