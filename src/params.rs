//! Scheme parameters: the named NTRUEncrypt parameter sets and the lengths
//! derived from them.
//!
//! Every set uses `p = 3` and a power-of-two `q`. Sets with `prod_flag`
//! keep their private key in product form `f1·f2 + f3`.

use std::fmt;
use std::str::FromStr;

use crate::error::{NtruError, Result};

/// Small modulus. Fixed for every parameter set.
pub const P: u16 = 3;

/// Bytes of the OID header in front of exported keys.
pub const OID_LEN: usize = 3;

/// An NTRUEncrypt parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncParams {
    /// Catalog name, e.g. `EES401EP1`.
    pub name: &'static str,
    /// Ring degree.
    pub n: u16,
    /// Large modulus. Power of two.
    pub q: u16,
    /// Private keys and blinding polynomials are product-form.
    pub prod_flag: bool,
    /// Number of +1 (and of -1) coefficients of a ternary `t`.
    pub df: u16,
    /// Product-form weights of `f1`, `f2`, `f3`.
    pub df1: u16,
    pub df2: u16,
    pub df3: u16,
    /// `g` has `dg` ones and `dg - 1` minus ones.
    pub dg: u16,
    /// Minimum number of each trit value in a masked message.
    pub dm0: u16,
    /// Bits of random padding prepended to every message.
    pub db: u16,
    /// Bits consumed per candidate by the index generator.
    pub c: u8,
    /// Identifier written in front of exported keys.
    pub oid: [u8; 3],
    /// Bits of the packed public key mixed into the blinding seed.
    pub pklen: u16,
}

impl EncParams {
    /// Bits per coefficient mod `q`.
    pub fn log2_q(&self) -> u32 {
        self.q.trailing_zeros()
    }

    /// Bits needed to store an index in `[0, N)`.
    pub fn index_bits(&self) -> u32 {
        u16::BITS - (self.n - 1).leading_zeros()
    }

    /// Length of a serialized ciphertext in bytes.
    pub fn enc_len(&self) -> usize {
        (usize::from(self.n) * self.log2_q() as usize + 7) / 8
    }

    /// Length of an exported public key in bytes.
    pub fn pub_len(&self) -> usize {
        OID_LEN + self.enc_len()
    }

    /// Number of index entries stored for a private key.
    pub fn private_index_count(&self) -> usize {
        if self.prod_flag {
            2 * (usize::from(self.df1) + usize::from(self.df2) + usize::from(self.df3))
        } else {
            2 * usize::from(self.df)
        }
    }

    /// Length of an exported private key in bytes.
    pub fn priv_len(&self) -> usize {
        OID_LEN + (self.private_index_count() * self.index_bits() as usize + 7) / 8
    }

    /// Bytes in the encoded message buffer `b || len || m || padding`.
    ///
    /// Two trits carry three bits, so `floor(N/2) * 3` bits fit in `N`
    /// coefficients.
    pub fn encoded_len(&self) -> usize {
        usize::from(self.n / 2) * 3 / 8
    }

    /// Bytes of random padding `b`.
    pub fn db_bytes(&self) -> usize {
        usize::from(self.db) / 8
    }

    /// Maximum plaintext length in bytes.
    pub fn max_msg_len(&self) -> usize {
        self.encoded_len().saturating_sub(1 + self.db_bytes())
    }

    /// Checks the structural invariants every operation relies on.
    pub fn validate(&self) -> Result<()> {
        let n = usize::from(self.n);
        let fail = |what: &str| {
            Err(NtruError::InvalidParameter(format!(
                "{}: {}",
                self.name, what
            )))
        };
        if n < 2 {
            return fail("ring degree must be at least 2");
        }
        if !self.q.is_power_of_two() || self.q < 4 {
            return fail("q must be a power of two no smaller than 4");
        }
        let private_weight = if self.prod_flag {
            [self.df1, self.df2, self.df3]
                .iter()
                .map(|&d| 2 * usize::from(d))
                .max()
                .unwrap_or(0)
        } else {
            2 * usize::from(self.df)
        };
        if private_weight > n || 2 * usize::from(self.dg) > n + 1 || self.dg == 0 {
            return fail("polynomial weights do not fit in the ring");
        }
        if 3 * usize::from(self.dm0) > n {
            return fail("dm0 cannot be satisfied");
        }
        if self.c == 0 || self.c > 16 || (1u32 << self.c) < u32::from(self.n) {
            return fail("2^c must cover the ring degree");
        }
        if self.db % 8 != 0 || usize::from(self.pklen) / 8 > self.enc_len() {
            return fail("db and pklen must be whole bytes within the key");
        }
        if self.max_msg_len() == 0 || self.max_msg_len() > usize::from(u8::MAX) {
            return fail("message capacity must be between 1 and 255 bytes");
        }
        Ok(())
    }

    /// Looks up a catalog set by name.
    pub fn from_name(name: &str) -> Option<&'static EncParams> {
        ALL_PARAM_SETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a catalog set by OID.
    pub fn from_oid(oid: &[u8]) -> Option<&'static EncParams> {
        ALL_PARAM_SETS.iter().find(|p| p.oid[..] == *oid)
    }
}

impl fmt::Display for EncParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (N={}, q={})", self.name, self.n, self.q)
    }
}

impl FromStr for EncParams {
    type Err = NtruError;

    fn from_str(s: &str) -> Result<Self> {
        EncParams::from_name(s)
            .copied()
            .ok_or_else(|| NtruError::InvalidParameter(format!("unknown parameter set '{s}'")))
    }
}

const fn ternary(
    name: &'static str,
    n: u16,
    df: u16,
    dg: u16,
    dm0: u16,
    db: u16,
    c: u8,
    oid: [u8; 3],
) -> EncParams {
    EncParams {
        name,
        n,
        q: 2048,
        prod_flag: false,
        df,
        df1: 0,
        df2: 0,
        df3: 0,
        dg,
        dm0,
        db,
        c,
        oid,
        pklen: db,
    }
}

const fn product(
    name: &'static str,
    n: u16,
    (df1, df2, df3): (u16, u16, u16),
    dg: u16,
    dm0: u16,
    db: u16,
    c: u8,
    oid: [u8; 3],
) -> EncParams {
    EncParams {
        name,
        n,
        q: 2048,
        prod_flag: true,
        df: 0,
        df1,
        df2,
        df3,
        dg,
        dm0,
        db,
        c,
        oid,
        pklen: db,
    }
}

/// 112-bit security, optimized for key and message size.
pub const EES401EP1: EncParams = ternary("EES401EP1", 401, 113, 133, 113, 112, 11, [0, 2, 4]);
/// 128-bit security, optimized for key and message size.
pub const EES449EP1: EncParams = ternary("EES449EP1", 449, 134, 149, 134, 128, 9, [0, 3, 3]);
/// 192-bit security, optimized for key and message size.
pub const EES677EP1: EncParams = ternary("EES677EP1", 677, 157, 225, 157, 192, 11, [0, 5, 3]);
/// 256-bit security, optimized for key and message size.
pub const EES1087EP2: EncParams = ternary("EES1087EP2", 1087, 120, 362, 120, 256, 13, [0, 6, 3]);

/// 112-bit security, balancing speed and size.
pub const EES541EP1: EncParams = ternary("EES541EP1", 541, 49, 180, 49, 112, 12, [0, 2, 5]);
/// 128-bit security, balancing speed and size.
pub const EES613EP1: EncParams = ternary("EES613EP1", 613, 55, 204, 55, 128, 11, [0, 3, 4]);
/// 192-bit security, balancing speed and size.
pub const EES887EP1: EncParams = ternary("EES887EP1", 887, 81, 295, 81, 192, 10, [0, 5, 4]);
/// 256-bit security, balancing speed and size.
pub const EES1171EP1: EncParams = ternary("EES1171EP1", 1171, 106, 390, 106, 256, 12, [0, 6, 4]);

/// 112-bit security, optimized for speed.
pub const EES659EP1: EncParams = ternary("EES659EP1", 659, 38, 219, 38, 112, 11, [0, 2, 6]);
/// 128-bit security, optimized for speed.
pub const EES761EP1: EncParams = ternary("EES761EP1", 761, 42, 253, 42, 128, 12, [0, 3, 5]);
/// 192-bit security, optimized for speed.
pub const EES1087EP1: EncParams = ternary("EES1087EP1", 1087, 63, 362, 63, 192, 13, [0, 5, 5]);
/// 256-bit security, optimized for speed.
pub const EES1499EP1: EncParams = ternary("EES1499EP1", 1499, 79, 499, 79, 256, 13, [0, 6, 5]);

/// 112-bit security, product-form private key.
pub const EES401EP2: EncParams =
    product("EES401EP2", 401, (8, 8, 6), 133, 101, 112, 11, [0, 2, 16]);
/// 128-bit security, product-form private key.
pub const EES439EP1: EncParams = product("EES439EP1", 439, (9, 8, 5), 146, 112, 128, 9, [0, 3, 16]);
/// 192-bit security, product-form private key.
pub const EES593EP1: EncParams =
    product("EES593EP1", 593, (10, 10, 8), 197, 158, 192, 11, [0, 5, 16]);
/// 256-bit security, product-form private key.
pub const EES743EP1: EncParams =
    product("EES743EP1", 743, (11, 11, 15), 247, 204, 256, 13, [0, 6, 16]);

pub const DEFAULT_PARAMS_112_BITS: EncParams = EES401EP2;
pub const DEFAULT_PARAMS_128_BITS: EncParams = EES439EP1;
pub const DEFAULT_PARAMS_192_BITS: EncParams = EES593EP1;
pub const DEFAULT_PARAMS_256_BITS: EncParams = EES743EP1;

/// Every catalog set.
pub static ALL_PARAM_SETS: [EncParams; 16] = [
    EES401EP1, EES449EP1, EES677EP1, EES1087EP2, EES541EP1, EES613EP1, EES887EP1, EES1171EP1,
    EES659EP1, EES761EP1, EES1087EP1, EES1499EP1, EES401EP2, EES439EP1, EES593EP1, EES743EP1,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_valid() {
        for params in ALL_PARAM_SETS.iter() {
            params.validate().unwrap_or_else(|e| panic!("{e}"));
        }
    }

    #[test]
    fn test_oids_and_names_unique() {
        let oids: HashSet<_> = ALL_PARAM_SETS.iter().map(|p| p.oid).collect();
        let names: HashSet<_> = ALL_PARAM_SETS.iter().map(|p| p.name).collect();
        assert_eq!(oids.len(), ALL_PARAM_SETS.len());
        assert_eq!(names.len(), ALL_PARAM_SETS.len());
    }

    #[test]
    fn test_ees401ep1_lengths() {
        assert_eq!(EES401EP1.log2_q(), 11);
        assert_eq!(EES401EP1.enc_len(), 552);
        assert_eq!(EES401EP1.pub_len(), 555);
        assert_eq!(EES401EP1.max_msg_len(), 60);
        assert_eq!(EES401EP1.index_bits(), 9);
        assert_eq!(EES401EP1.priv_len(), 3 + (226 * 9 + 7) / 8);
    }

    #[test]
    fn test_encoding_fits_ring() {
        // Three bits per trit pair; the last chunk may be partial.
        for params in ALL_PARAM_SETS.iter() {
            let trits = (params.encoded_len() * 8 + 2) / 3 * 2;
            assert!(trits <= usize::from(params.n), "{} overflows", params.name);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(EncParams::from_name("ees743ep1"), Some(&EES743EP1));
        assert_eq!(EncParams::from_oid(&[0, 2, 4]), Some(&EES401EP1));
        assert!(EncParams::from_oid(&[9, 9, 9]).is_none());
        assert_eq!("EES1499EP1".parse::<EncParams>().unwrap(), EES1499EP1);
        assert!(matches!(
            "EES1EP1".parse::<EncParams>(),
            Err(NtruError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_sets() {
        let mut params = EES401EP1;
        params.q = 2000;
        assert!(params.validate().is_err());

        let mut params = EES401EP1;
        params.df = 201;
        assert!(params.validate().is_err());

        let mut params = EES401EP1;
        params.c = 8;
        assert!(params.validate().is_err());
    }
}
