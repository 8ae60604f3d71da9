// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Rational numbers are used for designating times on the score level, e.g. note lengths.
//! Durations like triplet eighths cannot be represented exactly in floating point,
//! and the schedule relies on exact comparisons of note boundaries.

use std::{cmp::Ordering, fmt, ops};

/// Underlying integral type for the rational numbers.
type Int = i64;

/// A rational number, always fully normalized.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Rational {
    /// The numerator of the fraction, carrying the sign.
    num: Int,
    /// The denominator of the fraction, always positive.
    denom: Int,
}

impl Rational {
    /// Create a new rational from a potentially unnormalized fraction.
    ///
    /// # Panic
    ///
    /// Panics if the denominator is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use tinyscore::rational::*;
    ///
    /// assert_eq!(Rational::new(10, 5), Rational::from_int(2));
    /// assert_eq!(Rational::new(-6, 8), Rational::new(3, -4));
    /// assert_eq!(Rational::new(0, -7), Rational::zero());
    /// ```
    pub fn new(num: Int, denom: Int) -> Rational {
        assert_ne!(denom, 0, "Denominator must not be zero");

        let sign = num.signum() * denom.signum();
        let div = gcd(num, denom).max(1);
        Rational {
            num: sign * num.abs() / div,
            denom: denom.abs() / div,
        }
    }

    pub fn from_int(int: Int) -> Rational {
        Rational { num: int, denom: 1 }
    }

    pub fn zero() -> Rational {
        Rational::from_int(0)
    }

    pub fn one() -> Rational {
        Rational::from_int(1)
    }

    /// The fraction `1 / n`, e.g. `Rational::nth(4)` is the length of a quarter note.
    pub fn nth(n: Int) -> Self {
        Rational::new(1, n)
    }

    pub fn is_zero(self) -> bool {
        self.num == 0
    }

    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    /// Round to the nearest integer, rounding halves away from zero.
    ///
    /// ```
    /// use tinyscore::rational::*;
    ///
    /// assert_eq!(Rational::new(7, 2).round(), 4);
    /// assert_eq!(Rational::new(10, 3).round(), 3);
    /// assert_eq!(Rational::new(-7, 2).round(), -4);
    /// ```
    pub fn round(self) -> Int {
        let twice = 2 * self.num.abs() + self.denom;
        self.num.signum() * (twice / (2 * self.denom))
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.denom)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// # Examples
///
/// ```
/// use tinyscore::rational::*;
///
/// assert_eq!(Rational::new(1, 2) + Rational::new(3, 4), Rational::new(5, 4));
/// assert_eq!(Rational::new(3, 4) + Rational::new(-5, 8), Rational::new(1, 8));
/// ```
impl ops::Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Self::Output {
        Rational::new(
            self.num * rhs.denom + self.denom * rhs.num,
            self.denom * rhs.denom,
        )
    }
}

impl ops::Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Self::Output {
        Rational::new(self.num * rhs.num, self.denom * rhs.denom)
    }
}

impl ops::Mul<Int> for Rational {
    type Output = Rational;

    fn mul(self, rhs: Int) -> Self::Output {
        Rational::new(self.num * rhs, self.denom)
    }
}

/// ```
/// use tinyscore::rational::*;
///
/// assert_eq!(Rational::new(3, 4) / 3, Rational::new(1, 4));
/// ```
impl ops::Div<Int> for Rational {
    type Output = Rational;

    fn div(self, rhs: Int) -> Self::Output {
        Rational::new(self.num, self.denom * rhs)
    }
}

impl ops::AddAssign for Rational {
    fn add_assign(&mut self, rhs: Rational) {
        *self = *self + rhs;
    }
}

impl ops::MulAssign for Rational {
    fn mul_assign(&mut self, rhs: Rational) {
        *self = *self * rhs;
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Rational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// ```
/// use tinyscore::rational::*;
///
/// assert!(Rational::new(3, 4) < Rational::new(3, 2));
/// assert!(Rational::new(-1, 2) < Rational::zero());
/// ```
impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // denominators are positive, so cross-multiplying preserves the order
        let l = self.num * other.denom;
        let r = other.num * self.denom;
        l.cmp(&r)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Rational::zero()
    }
}

/// Greatest common divisor of the absolute values, Euclid's algorithm.
fn gcd(a: Int, b: Int) -> Int {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dotted_lengths_add_up() {
        let quarter = Rational::nth(4);
        let dotted_half = Rational::nth(2) + quarter;
        assert_eq!(dotted_half, Rational::new(3, 4));
        assert_eq!(dotted_half * 4, Rational::from_int(3));
    }

    #[test]
    fn triplets_are_exact() {
        let triplet_eighth = Rational::nth(8) * Rational::new(2, 3);
        let mut total = Rational::zero();
        for _ in 0..3 {
            total += triplet_eighth;
        }
        assert_eq!(total, Rational::nth(4));
    }

    #[test]
    fn gcd_ignores_signs() {
        assert_eq!(gcd(20, 15), 5);
        assert_eq!(gcd(10, 0), 10);
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd(10, -10), 10);
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{}", Rational::new(6, 8)), "3/4");
        assert_eq!(format!("{:?}", Rational::from_int(5)), "5");
    }
}
