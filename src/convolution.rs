//! Cyclic convolution in Z[x]/(x^N - 1).
//!
//! `x^N = 1`, so the product term `a_i b_j` lands on index `(i + j) mod N`.
//! Sparse operands only touch the rows of their nonzero positions, which
//! makes ternary and product-form products cost `N × weight` instead of
//! `N²`.
//!
//! Every function takes the modulus to reduce into; `0` leaves the
//! coefficients unreduced.

use crate::poly::{Poly, ProdPoly, TernPoly};

#[inline(always)]
fn wrap(k: usize, n: usize) -> usize {
    if k >= n {
        k - n
    } else {
        k
    }
}

fn finish(acc: Vec<i64>, modulus: u16) -> Poly {
    let coeffs = if modulus == 0 {
        acc.into_iter().map(|c| c as i32).collect()
    } else {
        let m = i64::from(modulus);
        acc.into_iter().map(|c| c.rem_euclid(m) as i32).collect()
    };
    Poly::from_coeffs(coeffs)
}

/// Dense × dense.
pub fn mult_dense(a: &Poly, b: &Poly, modulus: u16) -> Poly {
    let n = a.n();
    debug_assert_eq!(n, b.n());
    let mut acc = vec![0i64; n];
    for (i, &ai) in a.coeffs.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        let ai = i64::from(ai);
        for (j, &bj) in b.coeffs.iter().enumerate() {
            acc[wrap(i + j, n)] += ai * i64::from(bj);
        }
    }
    finish(acc, modulus)
}

/// Dense × ternary.
pub fn mult_tern(a: &Poly, t: &TernPoly, modulus: u16) -> Poly {
    let n = a.n();
    debug_assert_eq!(n, t.n());
    let mut acc = vec![0i64; n];
    for &i in t.ones() {
        let i = usize::from(i);
        for (j, &aj) in a.coeffs.iter().enumerate() {
            acc[wrap(i + j, n)] += i64::from(aj);
        }
    }
    for &i in t.neg_ones() {
        let i = usize::from(i);
        for (j, &aj) in a.coeffs.iter().enumerate() {
            acc[wrap(i + j, n)] -= i64::from(aj);
        }
    }
    finish(acc, modulus)
}

/// Dense × product-form: `((a·f1)·f2) + a·f3`.
pub fn mult_prod(a: &Poly, p: &ProdPoly, modulus: u16) -> Poly {
    let a_f1 = mult_tern(a, &p.f1, modulus);
    let a_f1_f2 = mult_tern(&a_f1, &p.f2, modulus);
    let a_f3 = mult_tern(a, &p.f3, modulus);
    let mut c = a_f1_f2.add(&a_f3);
    if modulus != 0 {
        c.reduce_mod(modulus);
    }
    c
}
