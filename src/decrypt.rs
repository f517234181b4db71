//! Decryption.
//!
//! `f·e = 3·r·g + f·m (mod q)` with `f = 1 + 3t`. Once centered mod q the
//! right-hand side is a small integer polynomial, and reducing it mod 3
//! leaves the masked message. Everything after that undoes the encoding
//! and checks it was well-formed.

use tracing::debug;
use zeroize::Zeroizing;

use crate::encoding::{pack_mod4, trits_len, trits_to_bytes};
use crate::encrypt::{blinding_poly, dm0_ok, htrunc};
use crate::error::{NtruError, Result};
use crate::keygen::{KeyPair, PrivateKey};
use crate::params::P;
use crate::poly::Poly;
use crate::sampling::gen_mask;
use crate::serialize::unpack_coeffs;

/// Recovers the masked message trits from `e`, centered in {-1, 0, 1}.
pub fn decrypt_poly(e: &Poly, private: &PrivateKey) -> Poly {
    let q = private.params().q;
    let mut a = private.t().mult(e, q);
    a.mult_fac(i32::from(P));
    let mut a = a.add(e);
    a.center_mod(q);
    a.center_mod(P);
    a
}

fn integrity_failure(reason: &str) -> NtruError {
    debug!(reason, "rejecting ciphertext");
    NtruError::DecodeIntegrityFailure
}

/// Decrypts a ciphertext produced for `key_pair`'s public key.
pub fn decrypt(ct: &[u8], key_pair: &KeyPair) -> Result<Vec<u8>> {
    let public = key_pair.public();
    let params = public.params();
    if ct.len() != params.enc_len() {
        return Err(NtruError::InvalidParameter(format!(
            "ciphertext for {} must be {} bytes, got {}",
            params.name,
            params.enc_len(),
            ct.len()
        )));
    }
    let n = usize::from(params.n);
    let q = params.q;
    let e = unpack_coeffs(ct, n, q)?;

    let ci = Zeroizing::new(decrypt_poly(&e, key_pair.private()));
    if !dm0_ok(&ci, params) {
        return Err(integrity_failure("dm0"));
    }

    let big_r = e.sub_mod(&ci, q);
    let mask = gen_mask(&pack_mod4(&big_r), n);
    let mut m = Zeroizing::new(ci.sub(&mask));
    m.center_mod(P);
    let used = trits_len(params.encoded_len());
    if m.coeffs[used..].iter().any(|&c| c != 0) {
        return Err(integrity_failure("trailing trits"));
    }

    let buffer = Zeroizing::new(
        trits_to_bytes(&m, params.encoded_len()).ok_or_else(|| integrity_failure("trit pair"))?,
    );
    let (b, rest) = buffer.split_at(params.db_bytes());
    let len = usize::from(rest[0]);
    if len > params.max_msg_len() {
        return Err(integrity_failure("length"));
    }
    let (msg, padding) = rest[1..].split_at(len);
    if padding.iter().any(|&x| x != 0) {
        return Err(integrity_failure("padding"));
    }

    let r = blinding_poly(params, msg, b, &htrunc(public))?;
    if r.mult(public.h(), q) != big_r {
        return Err(integrity_failure("blinding polynomial"));
    }
    Ok(msg.to_vec())
}
