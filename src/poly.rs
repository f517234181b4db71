//! Polynomial types in Z[x]/(x^N - 1).
//!
//! Three representations share the ring:
//! - [`Poly`]: dense, one `i32` per coefficient.
//! - [`TernPoly`]: sparse, the positions of the +1 and -1 coefficients.
//! - [`ProdPoly`]: `f1·f2 + f3` over three ternary factors, never expanded
//!   when multiplying.
//!
//! [`RingPoly`] tags one of the three and dispatches multiplication by
//! variant.

use std::fmt;

use zeroize::Zeroize;

use crate::convolution::{mult_dense, mult_prod, mult_tern};
use crate::error::{NtruError, Result};

/// A dense polynomial. `coeffs[i]` is the coefficient of `x^i`.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct Poly {
    pub coeffs: Vec<i32>,
}

impl Poly {
    pub fn zero(n: usize) -> Self {
        Poly { coeffs: vec![0; n] }
    }

    /// The constant polynomial 1.
    pub fn one(n: usize) -> Self {
        let mut p = Poly::zero(n);
        p.coeffs[0] = 1;
        p
    }

    pub fn from_coeffs(coeffs: Vec<i32>) -> Self {
        Poly { coeffs }
    }

    /// Ring degree.
    pub fn n(&self) -> usize {
        self.coeffs.len()
    }

    /// Coefficient-wise addition, unreduced.
    pub fn add(&self, other: &Poly) -> Poly {
        debug_assert_eq!(self.n(), other.n());
        let coeffs = self
            .coeffs
            .iter()
            .zip(&other.coeffs)
            .map(|(a, b)| a + b)
            .collect();
        Poly { coeffs }
    }

    /// Coefficient-wise subtraction, unreduced.
    pub fn sub(&self, other: &Poly) -> Poly {
        debug_assert_eq!(self.n(), other.n());
        let coeffs = self
            .coeffs
            .iter()
            .zip(&other.coeffs)
            .map(|(a, b)| a - b)
            .collect();
        Poly { coeffs }
    }

    /// Coefficient-wise addition, reduced into `[0, modulus)`.
    pub fn add_mod(&self, other: &Poly, modulus: u16) -> Poly {
        let mut sum = self.add(other);
        sum.reduce_mod(modulus);
        sum
    }

    /// Coefficient-wise subtraction, reduced into `[0, modulus)`.
    pub fn sub_mod(&self, other: &Poly, modulus: u16) -> Poly {
        let mut diff = self.sub(other);
        diff.reduce_mod(modulus);
        diff
    }

    /// Multiplies every coefficient by `factor`.
    pub fn mult_fac(&mut self, factor: i32) {
        for c in self.coeffs.iter_mut() {
            *c *= factor;
        }
    }

    /// Maps every coefficient into `[0, modulus)`.
    pub fn reduce_mod(&mut self, modulus: u16) {
        let m = i32::from(modulus);
        for c in self.coeffs.iter_mut() {
            *c = c.rem_euclid(m);
        }
    }

    /// Maps every coefficient into `(-modulus/2, modulus/2]`.
    pub fn center_mod(&mut self, modulus: u16) {
        let m = i32::from(modulus);
        let half = m / 2;
        for c in self.coeffs.iter_mut() {
            let r = c.rem_euclid(m);
            *c = if r > half { r - m } else { r };
        }
    }

    /// `self * other mod (x^N - 1, modulus)`.
    pub fn mult(&self, other: &Poly, modulus: u16) -> Poly {
        mult_dense(self, other, modulus)
    }

    /// Number of coefficients equal to each of -1, 0 and 1 (after reduction
    /// mod 3), in that order.
    pub fn trit_counts(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for c in &self.coeffs {
            match c.rem_euclid(3) {
                2 => counts[0] += 1,
                0 => counts[1] += 1,
                _ => counts[2] += 1,
            }
        }
        counts
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }
}

/// A ternary polynomial stored as the positions of its +1 and -1
/// coefficients.
///
/// `Debug` prints the degree and weights only. The positions are secret
/// whenever this is part of a private key or a blinding polynomial.
#[derive(Clone, PartialEq, Eq, Zeroize)]
pub struct TernPoly {
    n: u16,
    ones: Vec<u16>,
    neg_ones: Vec<u16>,
}

impl TernPoly {
    /// Builds a ternary polynomial, rejecting out-of-range or repeated
    /// positions.
    pub fn new(n: u16, ones: Vec<u16>, neg_ones: Vec<u16>) -> Result<Self> {
        let mut seen = vec![false; usize::from(n)];
        for &i in ones.iter().chain(&neg_ones) {
            let slot = seen.get_mut(usize::from(i)).ok_or_else(|| {
                NtruError::InvalidParameter(format!("index {i} outside ring of degree {n}"))
            })?;
            if *slot {
                return Err(NtruError::InvalidParameter(format!(
                    "index {i} used twice in ternary polynomial"
                )));
            }
            *slot = true;
        }
        Ok(TernPoly { n, ones, neg_ones })
    }

    pub fn n(&self) -> usize {
        usize::from(self.n)
    }

    /// Positions of the +1 coefficients.
    pub fn ones(&self) -> &[u16] {
        &self.ones
    }

    /// Positions of the -1 coefficients.
    pub fn neg_ones(&self) -> &[u16] {
        &self.neg_ones
    }

    pub fn to_dense(&self) -> Poly {
        let mut p = Poly::zero(self.n());
        for &i in &self.ones {
            p.coeffs[usize::from(i)] = 1;
        }
        for &i in &self.neg_ones {
            p.coeffs[usize::from(i)] = -1;
        }
        p
    }
}

impl fmt::Debug for TernPoly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TernPoly")
            .field("n", &self.n)
            .field("ones", &self.ones.len())
            .field("neg_ones", &self.neg_ones.len())
            .finish_non_exhaustive()
    }
}

/// A product-form polynomial `f1·f2 + f3`.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct ProdPoly {
    pub f1: TernPoly,
    pub f2: TernPoly,
    pub f3: TernPoly,
}

impl ProdPoly {
    pub fn n(&self) -> usize {
        self.f1.n()
    }

    /// Expands `f1·f2 + f3` over the integers.
    pub fn to_dense(&self) -> Poly {
        // Coefficients of f1·f2 stay below N, well inside i32.
        let f1 = self.f1.to_dense();
        let mut f = mult_tern(&f1, &self.f2, 0);
        for &i in self.f3.ones() {
            f.coeffs[usize::from(i)] += 1;
        }
        for &i in self.f3.neg_ones() {
            f.coeffs[usize::from(i)] -= 1;
        }
        f
    }
}

/// One ring element in any of the three representations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RingPoly {
    Dense(Poly),
    Ternary(TernPoly),
    Product(ProdPoly),
}

impl RingPoly {
    pub fn n(&self) -> usize {
        match self {
            RingPoly::Dense(p) => p.n(),
            RingPoly::Ternary(t) => t.n(),
            RingPoly::Product(p) => p.n(),
        }
    }

    /// `a * self mod (x^N - 1, modulus)`. A zero modulus skips the
    /// reduction.
    pub fn mult(&self, a: &Poly, modulus: u16) -> Poly {
        match self {
            RingPoly::Dense(b) => mult_dense(a, b, modulus),
            RingPoly::Ternary(t) => mult_tern(a, t, modulus),
            RingPoly::Product(p) => mult_prod(a, p, modulus),
        }
    }

    pub fn to_dense(&self) -> Poly {
        match self {
            RingPoly::Dense(p) => p.clone(),
            RingPoly::Ternary(t) => t.to_dense(),
            RingPoly::Product(p) => p.to_dense(),
        }
    }
}

impl Zeroize for RingPoly {
    fn zeroize(&mut self) {
        match self {
            RingPoly::Dense(p) => p.zeroize(),
            RingPoly::Ternary(t) => t.zeroize(),
            RingPoly::Product(p) => p.zeroize(),
        }
    }
}
