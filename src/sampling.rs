//! Ternary polynomial sampling and mask generation.
//!
//! Positions come from an index generator that reads `c`-bit candidates
//! from a byte stream and rejects those that would bias `value mod N`. The
//! sampler is a pure function of the weights and that stream: seeded with a
//! [`SeedStream`] it is fully reproducible.

use rand::RngCore;

use crate::error::{NtruError, Result};
use crate::params::EncParams;
use crate::poly::{Poly, ProdPoly, RingPoly, TernPoly};
use crate::stream::SeedStream;

const BUF_LEN: usize = 32;

/// Consecutive candidates [`IndexGenerator::next_index`] may reject, and per
/// ring position the consecutive repeats [`gen_tern`] may draw, before the
/// byte stream is treated as broken.
pub const MAX_INDEX_DRAWS: u32 = 64;

/// Index-generation function: an unbounded stream of positions in `[0, N)`.
pub struct IndexGenerator<'a, R: RngCore + ?Sized> {
    rng: &'a mut R,
    n: u16,
    c: u32,
    threshold: u32,
    bits: u64,
    avail: u32,
    buf: [u8; BUF_LEN],
    pos: usize,
}

impl<'a, R: RngCore + ?Sized> IndexGenerator<'a, R> {
    pub fn new(rng: &'a mut R, params: &EncParams) -> Self {
        let c = u32::from(params.c);
        let range = 1u32 << c;
        IndexGenerator {
            rng,
            n: params.n,
            c,
            threshold: range - range % u32::from(params.n),
            bits: 0,
            avail: 0,
            buf: [0u8; BUF_LEN],
            pos: BUF_LEN,
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.pos == BUF_LEN {
            self.rng.fill_bytes(&mut self.buf);
            self.pos = 0;
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        b
    }

    /// Next position in `[0, N)`. Fails if the stream only yields
    /// candidates that have to be rejected.
    pub fn next_index(&mut self) -> Result<u16> {
        for _ in 0..MAX_INDEX_DRAWS {
            while self.avail < self.c {
                self.bits = (self.bits << 8) | u64::from(self.next_byte());
                self.avail += 8;
            }
            self.avail -= self.c;
            let value = (self.bits >> self.avail) as u32 & ((1u32 << self.c) - 1);
            self.bits &= (1u64 << self.avail) - 1;
            if value < self.threshold {
                return Ok((value % u32::from(self.n)) as u16);
            }
        }
        Err(NtruError::GenerationExhausted {
            what: "an index candidate below the rejection threshold",
            attempts: MAX_INDEX_DRAWS,
        })
    }

    pub fn n(&self) -> u16 {
        self.n
    }
}

/// Samples a ternary polynomial with exactly `num_ones` coefficients equal to
/// 1 and `num_neg_ones` equal to -1.
pub fn gen_tern<R: RngCore + ?Sized>(
    igf: &mut IndexGenerator<'_, R>,
    num_ones: u16,
    num_neg_ones: u16,
) -> Result<TernPoly> {
    let n = igf.n();
    if u32::from(num_ones) + u32::from(num_neg_ones) > u32::from(n) {
        return Err(NtruError::InvalidParameter(format!(
            "{num_ones} + {num_neg_ones} nonzero coefficients do not fit in degree {n}"
        )));
    }

    let mut taken = vec![false; usize::from(n)];
    let budget = MAX_INDEX_DRAWS * u32::from(n);
    let mut draw = |count: u16| -> Result<Vec<u16>> {
        let mut indices = Vec::with_capacity(usize::from(count));
        let mut repeats = 0;
        while indices.len() < usize::from(count) {
            let i = igf.next_index()?;
            if taken[usize::from(i)] {
                repeats += 1;
                if repeats == budget {
                    return Err(NtruError::GenerationExhausted {
                        what: "distinct ternary indices",
                        attempts: budget,
                    });
                }
                continue;
            }
            taken[usize::from(i)] = true;
            indices.push(i);
            repeats = 0;
        }
        Ok(indices)
    };
    let ones = draw(num_ones)?;
    let neg_ones = draw(num_neg_ones)?;
    TernPoly::new(n, ones, neg_ones)
}

/// Samples a private-key-shaped polynomial: ternary with `df` ones and minus
/// ones, or product-form from `df1`, `df2`, `df3`.
pub fn gen_private_poly<R: RngCore + ?Sized>(
    params: &EncParams,
    igf: &mut IndexGenerator<'_, R>,
) -> Result<RingPoly> {
    if params.prod_flag {
        let f1 = gen_tern(igf, params.df1, params.df1)?;
        let f2 = gen_tern(igf, params.df2, params.df2)?;
        let f3 = gen_tern(igf, params.df3, params.df3)?;
        Ok(RingPoly::Product(ProdPoly { f1, f2, f3 }))
    } else {
        Ok(RingPoly::Ternary(gen_tern(igf, params.df, params.df)?))
    }
}

/// Mask generation: `n` trits in `{0, 1, 2}` expanded from `seed`.
///
/// Every stream byte below 243 = 3^5 yields five base-3 digits, least
/// significant first; larger bytes are skipped.
pub fn gen_mask(seed: &[u8], n: usize) -> Poly {
    let mut stream = SeedStream::new(seed);
    let mut mask = Vec::with_capacity(n + 4);
    let mut byte = [0u8; 1];
    while mask.len() < n {
        stream.fill_bytes(&mut byte);
        let mut o = byte[0];
        if o >= 243 {
            continue;
        }
        for _ in 0..5 {
            mask.push(i32::from(o % 3));
            o /= 3;
        }
    }
    mask.truncate(n);
    Poly::from_coeffs(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{EES401EP1, EES401EP2};
    use crate::stream::RepeatRng;
    use rand::rngs::OsRng;

    #[test]
    fn test_indices_in_range() {
        let mut stream = SeedStream::new(b"indices");
        let mut igf = IndexGenerator::new(&mut stream, &EES401EP1);
        for _ in 0..5000 {
            assert!(igf.next_index().unwrap() < 401);
        }
    }

    #[test]
    fn test_stuck_stream_exhausts_index_budget() {
        // All-ones bytes give the candidate 2^c - 1, which is always rejected.
        let mut rng = RepeatRng(0xFF);
        let mut igf = IndexGenerator::new(&mut rng, &EES401EP1);
        assert_eq!(
            igf.next_index(),
            Err(NtruError::GenerationExhausted {
                what: "an index candidate below the rejection threshold",
                attempts: MAX_INDEX_DRAWS,
            })
        );
    }

    #[test]
    fn test_repeating_stream_exhausts_tern_budget() {
        // All-zero bytes give index 0 forever.
        let mut rng = RepeatRng(0);
        let mut igf = IndexGenerator::new(&mut rng, &EES401EP1);
        assert!(matches!(
            gen_tern(&mut igf, 2, 2),
            Err(NtruError::GenerationExhausted {
                what: "distinct ternary indices",
                ..
            })
        ));
        let mut rng = RepeatRng(0);
        let mut igf = IndexGenerator::new(&mut rng, &EES401EP2);
        assert!(matches!(
            gen_private_poly(&EES401EP2, &mut igf),
            Err(NtruError::GenerationExhausted { .. })
        ));
    }

    #[test]
    fn test_gen_tern_weights() {
        let mut rng = OsRng;
        let mut igf = IndexGenerator::new(&mut rng, &EES401EP1);
        let t = gen_tern(&mut igf, 113, 112).unwrap();
        assert_eq!(t.ones().len(), 113);
        assert_eq!(t.neg_ones().len(), 112);
        let dense = t.to_dense();
        assert_eq!(dense.coeffs.iter().filter(|&&c| c == 1).count(), 113);
        assert_eq!(dense.coeffs.iter().filter(|&&c| c == -1).count(), 112);
    }

    #[test]
    fn test_gen_tern_full_ring() {
        let mut stream = SeedStream::new(b"everything");
        let mut igf = IndexGenerator::new(&mut stream, &EES401EP1);
        let t = gen_tern(&mut igf, 200, 201).unwrap();
        assert!(t.to_dense().coeffs.iter().all(|&c| c != 0));
    }

    #[test]
    fn test_gen_tern_rejects_overweight() {
        let mut stream = SeedStream::new(b"too many");
        let mut igf = IndexGenerator::new(&mut stream, &EES401EP1);
        assert!(matches!(
            gen_tern(&mut igf, 201, 201),
            Err(NtruError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_seeded_sampling_is_deterministic() {
        let sample = |seed: &[u8]| {
            let mut stream = SeedStream::new(seed);
            let mut igf = IndexGenerator::new(&mut stream, &EES401EP2);
            gen_private_poly(&EES401EP2, &mut igf).unwrap()
        };
        assert_eq!(sample(b"seed value"), sample(b"seed value"));
        assert_ne!(sample(b"seed value"), sample(b"other seed"));
    }

    #[test]
    fn test_product_form_shape() {
        let mut stream = SeedStream::new(b"product");
        let mut igf = IndexGenerator::new(&mut stream, &EES401EP2);
        match gen_private_poly(&EES401EP2, &mut igf).unwrap() {
            RingPoly::Product(p) => {
                assert_eq!(p.f1.ones().len(), 8);
                assert_eq!(p.f2.neg_ones().len(), 8);
                assert_eq!(p.f3.ones().len(), 6);
            }
            other => panic!("expected product form, got {other:?}"),
        }
    }

    #[test]
    fn test_mask() {
        let mask = gen_mask(b"mask seed", 401);
        assert_eq!(mask.n(), 401);
        assert!(mask.coeffs.iter().all(|&c| (0..3).contains(&c)));
        assert_eq!(mask, gen_mask(b"mask seed", 401));
        assert_ne!(mask, gen_mask(b"mask seeD", 401));
        // Roughly uniform.
        let counts = mask.trit_counts();
        assert!(counts.iter().all(|&c| c > 80), "{counts:?}");
    }
}
