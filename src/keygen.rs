//! Key generation and key export/import.
//!
//! The private key is a sparse `t` (ternary or product-form); the
//! polynomial actually used for decryption is `f = 1 + 3t`, which is
//! invertible mod 3 by construction. The public key is `h = 3·g·f⁻¹ mod q`.

use rand::{CryptoRng, RngCore};
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::convolution::mult_tern;
use crate::error::{NtruError, Result};
use crate::inverse::{invert_mod_prime, invert_mod_q};
use crate::params::{EncParams, OID_LEN, P};
use crate::poly::{Poly, ProdPoly, RingPoly, TernPoly};
use crate::sampling::{gen_private_poly, gen_tern, IndexGenerator};
use crate::serialize::{pack_bits, pack_coeffs, unpack_bits, unpack_coeffs};
use crate::stream::SeedStream;

/// Resampling budget for each of `f` and `g`.
pub const MAX_KEYGEN_ATTEMPTS: u32 = 64;

/// Public key `h`, tagged with its parameter set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) params: EncParams,
    pub(crate) h: Poly,
}

impl PublicKey {
    pub fn params(&self) -> &EncParams {
        &self.params
    }

    /// Coefficients of `h`, in `[0, q)`.
    pub fn h(&self) -> &Poly {
        &self.h
    }

    /// `h` packed at `log2(q)` bits per coefficient.
    pub fn packed_h(&self) -> Vec<u8> {
        pack_coeffs(&self.h, self.params.q)
    }

    /// Serialize as `oid || packed h`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.params.pub_len());
        buf.extend_from_slice(&self.params.oid);
        buf.extend_from_slice(&self.packed_h());
        buf
    }

    /// Deserialize from bytes. The parameter set is taken from the OID.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let params = params_for(data, "public key")?;
        if data.len() != params.pub_len() {
            return Err(NtruError::SerializationFailure(format!(
                "public key for {} must be {} bytes, got {}",
                params.name,
                params.pub_len(),
                data.len()
            )));
        }
        let h = unpack_coeffs(&data[OID_LEN..], usize::from(params.n), params.q)?;
        Ok(PublicKey { params: *params, h })
    }
}

/// Private key `t`, tagged with its parameter set.
///
/// Zeroized on drop. Does not implement `Debug` so it cannot end up in
/// logs.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)]
    params: EncParams,
    t: RingPoly,
}

impl PrivateKey {
    pub fn params(&self) -> &EncParams {
        &self.params
    }

    /// The sparse polynomial `t`. Always the `Ternary` or `Product` variant.
    pub(crate) fn t(&self) -> &RingPoly {
        &self.t
    }

    /// `f = 1 + 3t` as a dense polynomial.
    pub fn f(&self) -> Zeroizing<Poly> {
        private_f(&self.t)
    }

    fn factors(&self) -> Vec<&TernPoly> {
        match &self.t {
            RingPoly::Ternary(t) => vec![t],
            RingPoly::Product(p) => vec![&p.f1, &p.f2, &p.f3],
            RingPoly::Dense(_) => Vec::new(),
        }
    }

    /// Serialize as `oid || indices`, where the indices are the +1 then -1
    /// positions of each ternary factor, packed at `ceil(log2 N)` bits.
    ///
    /// The returned buffer is zeroized on drop.
    #[must_use]
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.params.priv_len());
        buf.extend_from_slice(&self.params.oid);
        let indices = self
            .factors()
            .into_iter()
            .flat_map(|t| t.ones().iter().chain(t.neg_ones()))
            .map(|&i| u32::from(i));
        pack_bits(indices, self.params.index_bits(), &mut buf);
        Zeroizing::new(buf)
    }

    /// Deserialize from bytes. The parameter set is taken from the OID.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let params = params_for(data, "private key")?;
        if data.len() != params.priv_len() {
            return Err(NtruError::SerializationFailure(format!(
                "private key for {} must be {} bytes, got {}",
                params.name,
                params.priv_len(),
                data.len()
            )));
        }
        let indices = Zeroizing::new(unpack_bits(
            &data[OID_LEN..],
            params.private_index_count(),
            params.index_bits(),
        ));
        let mut rest: &[u32] = &indices;
        let t = if params.prod_flag {
            let f1 = read_tern(&mut rest, params.n, params.df1)?;
            let f2 = read_tern(&mut rest, params.n, params.df2)?;
            let f3 = read_tern(&mut rest, params.n, params.df3)?;
            RingPoly::Product(ProdPoly { f1, f2, f3 })
        } else {
            RingPoly::Ternary(read_tern(&mut rest, params.n, params.df)?)
        };
        Ok(PrivateKey { params: *params, t })
    }
}

fn read_tern(rest: &mut &[u32], n: u16, weight: u16) -> Result<TernPoly> {
    let w = usize::from(weight);
    let slice: &[u32] = *rest;
    let (ones, tail) = slice.split_at(w);
    let (neg_ones, tail) = tail.split_at(w);
    *rest = tail;
    let to_u16 = |s: &[u32]| s.iter().map(|&i| i as u16).collect::<Vec<_>>();
    TernPoly::new(n, to_u16(ones), to_u16(neg_ones))
        .map_err(|e| NtruError::SerializationFailure(e.to_string()))
}

fn params_for(data: &[u8], what: &str) -> Result<&'static EncParams> {
    let oid = data.get(..OID_LEN).ok_or_else(|| {
        NtruError::SerializationFailure(format!("{what} is shorter than its OID header"))
    })?;
    EncParams::from_oid(oid).ok_or_else(|| {
        NtruError::SerializationFailure(format!("{what} has unknown OID {oid:02x?}"))
    })
}

/// A public key and the private key it was generated with.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Pairs separately imported keys, checking that they belong together:
    /// `f·h = 3g` has every coefficient in {-3, 0, 3}.
    pub fn new(public: PublicKey, private: PrivateKey) -> Result<Self> {
        if public.params != private.params {
            return Err(NtruError::InvalidParameter(format!(
                "public key is {}, private key is {}",
                public.params.name, private.params.name
            )));
        }
        let q = public.params.q;
        let mut fh = private.t.mult(&public.h, q);
        fh.mult_fac(i32::from(P));
        let mut fh = fh.add(&public.h);
        fh.center_mod(q);
        if fh.coeffs.iter().any(|&c| !matches!(c, -3 | 0 | 3)) {
            return Err(NtruError::InvalidParameter(
                "public key does not belong to private key".into(),
            ));
        }
        Ok(KeyPair { public, private })
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn private(&self) -> &PrivateKey {
        &self.private
    }
}

fn private_f(t: &RingPoly) -> Zeroizing<Poly> {
    let mut f = Zeroizing::new(t.to_dense());
    f.mult_fac(i32::from(P));
    f.coeffs[0] += 1;
    f
}

/// Samples `t` until `f = 1 + 3t` is invertible mod q. Returns `t` and
/// `f⁻¹ mod q`.
fn gen_invertible_private<R: RngCore + ?Sized>(
    params: &EncParams,
    igf: &mut IndexGenerator<'_, R>,
) -> Result<(RingPoly, Zeroizing<Poly>)> {
    for attempt in 1..=MAX_KEYGEN_ATTEMPTS {
        let mut t = gen_private_poly(params, igf)?;
        if let Some(fq) = invert_mod_q(&private_f(&t), params.q) {
            return Ok((t, Zeroizing::new(fq)));
        }
        t.zeroize();
        debug!(
            params = params.name,
            attempt,
            "f not invertible mod q, resampling"
        );
    }
    Err(NtruError::GenerationExhausted {
        what: "an invertible private key",
        attempts: MAX_KEYGEN_ATTEMPTS,
    })
}

/// Samples `g` until it is invertible mod 2 and returns `h = 3·g·fq mod q`.
fn gen_public_poly<R: RngCore + ?Sized>(
    params: &EncParams,
    fq: &Poly,
    igf: &mut IndexGenerator<'_, R>,
) -> Result<Poly> {
    for attempt in 1..=MAX_KEYGEN_ATTEMPTS {
        let g = gen_tern(igf, params.dg, params.dg - 1)?;
        if invert_mod_prime(&g.to_dense(), 2).is_some() {
            let mut h = mult_tern(fq, &g, params.q);
            h.mult_fac(i32::from(P));
            h.reduce_mod(params.q);
            return Ok(h);
        }
        debug!(
            params = params.name,
            attempt,
            "g not invertible mod 2, resampling"
        );
    }
    Err(NtruError::GenerationExhausted {
        what: "an invertible g",
        attempts: MAX_KEYGEN_ATTEMPTS,
    })
}

/// Generates a key pair, drawing all randomness from `rng`.
pub fn generate_key_pair<R: RngCore + CryptoRng + ?Sized>(
    params: &EncParams,
    rng: &mut R,
) -> Result<KeyPair> {
    params.validate()?;
    let mut igf = IndexGenerator::new(rng, params);
    let (t, fq) = gen_invertible_private(params, &mut igf)?;
    let h = gen_public_poly(params, &fq, &mut igf)?;
    trace!(params = params.name, "generated key pair");
    Ok(KeyPair {
        public: PublicKey { params: *params, h },
        private: PrivateKey { params: *params, t },
    })
}

/// Generates a key pair deterministically from `seed`.
pub fn generate_key_pair_det(params: &EncParams, seed: &[u8]) -> Result<KeyPair> {
    generate_key_pair(params, &mut SeedStream::new(seed))
}

/// Generates another public key for an existing private key. Every public
/// key generated this way decrypts with the same private key.
pub fn generate_public_key<R: RngCore + CryptoRng + ?Sized>(
    private: &PrivateKey,
    rng: &mut R,
) -> Result<PublicKey> {
    let params = private.params();
    let fq = Zeroizing::new(invert_mod_q(&private.f(), params.q).ok_or_else(|| {
        NtruError::InvalidParameter("private key is not invertible mod q".into())
    })?);
    let mut igf = IndexGenerator::new(rng, params);
    let h = gen_public_poly(params, &fq, &mut igf)?;
    Ok(PublicKey { params: *params, h })
}
