//! Inversion in (Z/p)[x]/(x^N - 1) and (Z/q)[x]/(x^N - 1).
//!
//! Prime moduli use the almost-inverse algorithm (Silverman, NTRU tech
//! report #14). Power-of-two moduli invert mod 2 first and then Newton-lift:
//! if `a·b ≡ 1 (mod v)` then `a·b·(2 - a·b) ≡ 1 (mod v²)`.
//!
//! Not every polynomial has an inverse; `None` is an ordinary outcome that
//! callers handle by resampling.

use crate::convolution::mult_dense;
use crate::poly::Poly;

fn degree(coeffs: &[i32]) -> usize {
    coeffs.iter().rposition(|&c| c != 0).unwrap_or(0)
}

fn inv_mod_small(x: i32, p: i32) -> i32 {
    (1..p).find(|y| (x * y).rem_euclid(p) == 1).unwrap_or(0)
}

/// Inverse of `a` modulo a small prime `p` (2 or 3).
pub fn invert_mod_prime(a: &Poly, p: u16) -> Option<Poly> {
    let n = a.n();
    let pi = i32::from(p);

    // a·b ≡ x^k·f and a·c ≡ x^k·g hold throughout.
    let mut k = 0usize;
    let mut b = vec![0i32; n + 1];
    b[0] = 1;
    let mut c = vec![0i32; n + 1];
    let mut f = vec![0i32; n + 1];
    for (fi, &ai) in f.iter_mut().zip(&a.coeffs) {
        *fi = ai.rem_euclid(pi);
    }
    let mut g = vec![0i32; n + 1];
    g[0] = pi - 1;
    g[n] = 1;

    loop {
        while f[0] == 0 {
            if f.iter().all(|&x| x == 0) {
                return None;
            }
            // f /= x, c *= x. deg(c) + deg(f) <= N keeps c[n] clear here.
            f.rotate_left(1);
            c.rotate_right(1);
            k += 1;
        }
        if degree(&f) == 0 {
            break;
        }
        if degree(&f) < degree(&g) {
            std::mem::swap(&mut f, &mut g);
            std::mem::swap(&mut b, &mut c);
        }
        let u = (f[0] * inv_mod_small(g[0], pi)).rem_euclid(pi);
        for i in 0..=n {
            f[i] = (f[i] - u * g[i]).rem_euclid(pi);
            b[i] = (b[i] - u * c[i]).rem_euclid(pi);
        }
    }

    // x^N = 1
    b[0] = (b[0] + b[n]).rem_euclid(pi);
    let f0_inv = inv_mod_small(f[0], pi);
    let shift = k % n;
    let mut inv = Poly::zero(n);
    for (i, &bi) in b[..n].iter().enumerate() {
        let j = (i + n - shift) % n;
        inv.coeffs[j] = (bi * f0_inv).rem_euclid(pi);
    }

    if mult_dense(a, &inv, p) == Poly::one(n) {
        Some(inv)
    } else {
        None
    }
}

/// Inverse of `a` modulo a power of two `q`.
pub fn invert_mod_q(a: &Poly, q: u16) -> Option<Poly> {
    debug_assert!(q.is_power_of_two() && q >= 2);
    let mut b = invert_mod_prime(a, 2)?;
    let mut v: u32 = 2;
    while v < u32::from(q) {
        v = (v * v).min(u32::from(q));
        let modulus = v as u16;
        let mut correction = mult_dense(a, &b, modulus);
        correction.mult_fac(-1);
        correction.coeffs[0] += 2;
        correction.reduce_mod(modulus);
        b = mult_dense(&b, &correction, modulus);
    }
    Some(b)
}
