//! Encryption.
//!
//! The message buffer `b || len || m || 0…0` is turned into trits, masked
//! with trits derived from `R = r·h`, and added to `R`:
//!
//! ```text
//! r = IGF(oid || m || b || htrunc)
//! R = r·h mod q
//! e = R + (trits(M) + MGF(R mod 4) mod 3) mod q
//! ```
//!
//! `b` is the only fresh randomness. Decryption re-derives `r` from the
//! recovered `m` and `b` and checks that it reproduces `R`.

use rand::{CryptoRng, RngCore};
use tracing::trace;
use zeroize::Zeroizing;

use crate::encoding::{bytes_to_trits, pack_mod4};
use crate::error::{NtruError, Result};
use crate::keygen::PublicKey;
use crate::params::{EncParams, OID_LEN};
use crate::poly::{Poly, RingPoly};
use crate::sampling::{gen_mask, gen_private_poly, IndexGenerator};
use crate::serialize::pack_coeffs;
use crate::stream::SeedStream;

/// Budget for drawing a padding `b` whose masked message passes the `dm0`
/// check.
pub const MAX_ENCRYPT_ATTEMPTS: u32 = 64;

/// `e = r·h + m mod q`, the bare NTRU primitive.
pub fn encrypt_poly(m: &Poly, r: &RingPoly, h: &Poly, q: u16) -> Poly {
    r.mult(h, q).add_mod(m, q)
}

/// The first `pklen / 8` bytes of the packed public key.
pub(crate) fn htrunc(public: &PublicKey) -> Vec<u8> {
    let mut packed = public.packed_h();
    packed.truncate(usize::from(public.params().pklen) / 8);
    packed
}

/// Derives the blinding polynomial from `oid || m || b || htrunc`.
pub(crate) fn blinding_poly(
    params: &EncParams,
    msg: &[u8],
    b: &[u8],
    htrunc: &[u8],
) -> Result<RingPoly> {
    let mut sdata = Zeroizing::new(Vec::with_capacity(
        OID_LEN + msg.len() + b.len() + htrunc.len(),
    ));
    sdata.extend_from_slice(&params.oid);
    sdata.extend_from_slice(msg);
    sdata.extend_from_slice(b);
    sdata.extend_from_slice(htrunc);
    let mut stream = SeedStream::new(&sdata);
    let mut igf = IndexGenerator::new(&mut stream, params);
    gen_private_poly(params, &mut igf)
}

/// Whether each of -1, 0 and 1 occurs at least `dm0` times.
pub(crate) fn dm0_ok(m: &Poly, params: &EncParams) -> bool {
    m.trit_counts()
        .iter()
        .all(|&count| count >= usize::from(params.dm0))
}

fn message_buffer(params: &EncParams, b: &[u8], msg: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(Vec::with_capacity(params.encoded_len()));
    buf.extend_from_slice(b);
    buf.push(msg.len() as u8);
    buf.extend_from_slice(msg);
    buf.resize(params.encoded_len(), 0);
    buf
}

/// Encrypts `msg` for `public`, drawing the padding from `rng`.
///
/// Returns `enc_len()` bytes regardless of the message length.
pub fn encrypt<R: RngCore + CryptoRng + ?Sized>(
    msg: &[u8],
    public: &PublicKey,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let params = public.params();
    let max = params.max_msg_len();
    if msg.len() > max {
        return Err(NtruError::InvalidParameter(format!(
            "message of {} bytes exceeds the maximum of {max} for {}",
            msg.len(),
            params.name
        )));
    }

    let n = usize::from(params.n);
    let q = params.q;
    let htrunc = htrunc(public);
    let mut b = Zeroizing::new(vec![0u8; params.db_bytes()]);
    for attempt in 1..=MAX_ENCRYPT_ATTEMPTS {
        rng.fill_bytes(&mut b);
        let buffer = message_buffer(params, &b, msg);
        let r = blinding_poly(params, msg, &b, &htrunc)?;
        let big_r = r.mult(public.h(), q);
        let mask = gen_mask(&pack_mod4(&big_r), n);
        let mut m = Zeroizing::new(bytes_to_trits(&buffer, n).add(&mask));
        m.center_mod(3);
        if !dm0_ok(&m, params) {
            trace!(
                params = params.name,
                attempt,
                "masked message fails dm0, new padding"
            );
            continue;
        }
        let e = big_r.add_mod(&m, q);
        return Ok(pack_coeffs(&e, q));
    }
    Err(NtruError::GenerationExhausted {
        what: "a message encoding that meets dm0",
        attempts: MAX_ENCRYPT_ATTEMPTS,
    })
}

/// Encrypts `msg` with the padding expanded from `seed`. The same message,
/// key and seed always give the same ciphertext.
pub fn encrypt_det(msg: &[u8], public: &PublicKey, seed: &[u8]) -> Result<Vec<u8>> {
    encrypt(msg, public, &mut SeedStream::new(seed))
}
