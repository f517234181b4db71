//! Randomness sources.
//!
//! Every operation that needs randomness takes a `rand::RngCore +
//! rand::CryptoRng`. Two sources are used in practice:
//! - [`SeedStream`]: SHA-256 in counter mode over a caller-supplied seed.
//!   The same seed yields the same bytes on every platform, which makes
//!   key generation and encryption reproducible.
//! - [`rand::rngs::OsRng`]: the operating system's entropy pool.

use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

const BLOCK_LEN: usize = 32;

/// Deterministic byte stream: block `i` is `SHA-256(seed || i)` with `i` a
/// big-endian `u32`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SeedStream {
    seed: Vec<u8>,
    counter: u32,
    block: [u8; BLOCK_LEN],
    pos: usize,
}

impl SeedStream {
    pub fn new(seed: &[u8]) -> Self {
        SeedStream {
            seed: seed.to_vec(),
            counter: 0,
            block: [0u8; BLOCK_LEN],
            pos: BLOCK_LEN,
        }
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(&self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.block.copy_from_slice(&hasher.finalize());
        self.counter = self.counter.wrapping_add(1);
        self.pos = 0;
    }
}

impl RngCore for SeedStream {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut written = 0;
        while written < dest.len() {
            if self.pos == BLOCK_LEN {
                self.refill();
            }
            let take = (BLOCK_LEN - self.pos).min(dest.len() - written);
            dest[written..written + take].copy_from_slice(&self.block[self.pos..self.pos + take]);
            self.pos += take;
            written += take;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for SeedStream {}

/// A broken entropy source that repeats one byte forever.
#[cfg(test)]
pub(crate) struct RepeatRng(pub u8);

#[cfg(test)]
impl RngCore for RepeatRng {
    fn next_u32(&mut self) -> u32 {
        u32::from_le_bytes([self.0; 4])
    }

    fn next_u64(&mut self) -> u64 {
        u64::from_le_bytes([self.0; 8])
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(self.0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
impl CryptoRng for RepeatRng {}
