//! Exact rational scalars used by all geometry.
//!
//! The whole crate computes over arbitrary-precision rationals: Fourier–Motzkin
//! combinations and simplex pivots multiply coefficients together, so
//! fixed-width ratios would overflow long before a search finishes.

use num_bigint::BigInt;

/// Exact rational scalar.
pub type Rat = num_rational::BigRational;

/// Shorthand for `n / d` as a `Rat`.
#[inline]
pub fn rat(n: i64, d: i64) -> Rat {
    Rat::new(BigInt::from(n), BigInt::from(d))
}

/// Shorthand for the integer `n` as a `Rat`.
#[inline]
pub fn int(n: i64) -> Rat {
    Rat::from_integer(BigInt::from(n))
}

/// Nonnegative gcd of two integers (Euclid); `gcd(0, 0) = 0`.
pub fn gcd_big(a: &BigInt, b: &BigInt) -> BigInt {
    use num_traits::Zero;
    let mut a = if a.sign() == num_bigint::Sign::Minus { -a } else { a.clone() };
    let mut b = if b.sign() == num_bigint::Sign::Minus { -b } else { b.clone() };
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple of two positive integers.
pub fn lcm_big(a: &BigInt, b: &BigInt) -> BigInt {
    use num_traits::Zero;
    if a.is_zero() || b.is_zero() {
        return BigInt::from(0);
    }
    let g = gcd_big(a, b);
    (a / &g) * b
}
