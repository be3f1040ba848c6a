//! Galois field arithmetic for 6-bit codewords and polynomials.

use std::fmt;
use std::ops::{Add, Deref, DerefMut, Div, Mul, Sub};

use collect_slice::CollectSlice;
use once_cell::sync::Lazy;

/// Number of nonzero codewords in GF(2<sup>6</sup>): 2<sup>6</sup> - 1.
pub const FIELD_SIZE: usize = 63;

/// Primitive polynomial characterizing the field, h(x) = x<sup>6</sup> + x +
/// 1, as given in the P25 specification. Only the low 6 coefficients are
/// stored; the x<sup>6</sup> term is implicit in the reduction step.
const PRIMITIVE: u8 = 0b000011;

/// Antilog and log tables for the field, derived from h(x).
struct Tables {
    /// Maps power i to the codeword α<sup>i</sup>.
    codewords: [u8; FIELD_SIZE],
    /// Maps a nonzero codeword to its power. Index 0 is never read.
    powers: [u8; 64],
}

static TABLES: Lazy<Tables> = Lazy::new(|| {
    let mut tables = Tables {
        codewords: [0; FIELD_SIZE],
        powers: [0; 64],
    };

    // Each codeword α^i represents the polynomial x^i mod h(x), so the next
    // power is a shift, reduced by h(x) when it overflows the field.
    let mut cur = 1;

    for pow in 0..FIELD_SIZE {
        tables.codewords[pow] = cur;
        tables.powers[cur as usize] = pow as u8;

        cur <<= 1;

        if cur >> 6 == 1 {
            cur = cur & 0b111111 ^ PRIMITIVE;
        }
    }

    tables
});

/// Codeword in the GF(2<sup>6</sup>) field.
#[derive(Copy, Clone)]
pub struct Codeword(u8);

impl Codeword {
    /// Construct a new `Codeword` from the given bit pattern. Panic if the
    /// pattern has more than 6 bits.
    pub fn new(bits: u8) -> Codeword {
        assert!(bits >> 6 == 0);
        Codeword(bits)
    }

    /// Construct the codeword α<sup>m</sup> ≡ α<sup>i</sup> (modulo the size
    /// of the field) for the given power i.
    pub fn for_power(power: usize) -> Codeword {
        Codeword::new(TABLES.codewords[power % FIELD_SIZE])
    }

    /// Retrieve the bit pattern of the codeword.
    pub fn bits(&self) -> u8 { self.0 }

    /// Check if the codeword is zero.
    pub fn zero(&self) -> bool { self.0 == 0 }

    /// Retrieve the power i of the current codeword α<sup>i</sup>, or `None`
    /// if the codeword is zero (which has no logarithm.)
    pub fn power(&self) -> Option<usize> {
        if self.zero() {
            None
        } else {
            Some(TABLES.powers[self.0 as usize] as usize)
        }
    }

    /// Find the multiplicative inverse 1/α<sup>i</sup> of the current
    /// codeword. Panic if the codeword is zero.
    pub fn invert(self) -> Codeword {
        match self.power() {
            Some(p) => Codeword::for_power(FIELD_SIZE - p),
            None => panic!("invert zero"),
        }
    }

    /// Compute (α<sup>i</sup>)<sup>p</sup> for the given power p.
    pub fn pow(&self, pow: usize) -> Codeword {
        match self.power() {
            Some(p) => Codeword::for_power(p * pow),
            None => Codeword::default(),
        }
    }
}

impl Default for Codeword {
    /// Construct the zero codeword.
    fn default() -> Self {
        Codeword::new(0)
    }
}

/// Galois addition is coefficient-wise XOR.
impl Add for Codeword {
    type Output = Codeword;

    fn add(self, rhs: Codeword) -> Self::Output {
        Codeword::new(self.0 ^ rhs.0)
    }
}

/// Subtraction is equivalent to addition in a characteristic-2 field.
impl Sub for Codeword {
    type Output = Codeword;

    fn sub(self, rhs: Codeword) -> Self::Output {
        self + rhs
    }
}

/// Galois multiplication adds powers.
impl Mul for Codeword {
    type Output = Codeword;

    fn mul(self, rhs: Codeword) -> Self::Output {
        match (self.power(), rhs.power()) {
            (Some(p), Some(q)) => Codeword::for_power(p + q),
            _ => Codeword::default(),
        }
    }
}

/// Galois division subtracts powers. Panic if the divisor is zero.
impl Div for Codeword {
    type Output = Codeword;

    fn div(self, rhs: Codeword) -> Self::Output {
        match (self.power(), rhs.power()) {
            // Offset by the field size to keep the power nonnegative.
            (Some(p), Some(q)) => Codeword::for_power(FIELD_SIZE + p - q),
            (None, Some(_)) => Codeword::default(),
            (_, None) => panic!("divide by zero"),
        }
    }
}

impl PartialEq for Codeword {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Codeword {}

/// Check equality of the codeword's bit pattern with raw bits.
impl PartialEq<u8> for Codeword {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl fmt::Debug for Codeword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.power() {
            Some(p) => write!(fmt, "Codeword::for_power({})", p),
            None => write!(fmt, "Codeword::default()"),
        }
    }
}

/// Coefficient storage for a bounded-degree Galois polynomial of a
/// particular code.
pub trait PolynomialCoefs: Default + Copy + Clone +
    Deref<Target = [Codeword]> + DerefMut
{
    /// The minimum Hamming distance, d, in (n, k, d).
    fn distance() -> usize;

    /// Maximum number of correctable errors: t = (d - 1) / 2.
    fn errors() -> usize {
        Self::distance() / 2
    }

    /// Number of syndromes: 2t.
    fn syndromes() -> usize { 2 * Self::errors() }

    /// Verify the implementer is well-formed.
    fn validate(&self) {
        // Distance must be odd.
        assert!(Self::distance() % 2 == 1);
        // Storage must at least hold a full syndrome polynomial.
        assert!(self.len() >= Self::syndromes());
    }
}

/// Create a coefficient storage buffer for the code of given distance. In
/// the first form, the buffer is large enough for the Berlekamp-Massey
/// decoding polynomials; in the second, it has the given size.
macro_rules! impl_polynomial_coefs {
    ($name:ident, $dist:expr) => {
        impl_polynomial_coefs!($name, $dist, $dist + 1);
    };
    ($name:ident, $dist:expr, $len:expr) => {
        #[derive(Copy, Clone)]
        struct $name([crate::coding::galois::Codeword; $len]);

        impl crate::coding::galois::PolynomialCoefs for $name {
            fn distance() -> usize { $dist }
        }

        impl Default for $name {
            fn default() -> Self {
                $name([crate::coding::galois::Codeword::default(); $len])
            }
        }

        impl std::ops::Deref for $name {
            type Target = [crate::coding::galois::Codeword];
            fn deref(&self) -> &Self::Target { &self.0[..] }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0[..] }
        }
    };
}

pub(crate) use impl_polynomial_coefs;

/// Polynomial with GF(2<sup>6</sup>) codewords as coefficients.
#[derive(Copy, Clone)]
pub struct Polynomial<P: PolynomialCoefs> {
    /// Coefficients of the polynomial.
    coefs: P,
    /// Index into `coefs` of the degree-0 coefficient. Coefficients at a
    /// lesser index are zero.
    start: usize,
}

impl<P: PolynomialCoefs> Polynomial<P> {
    /// Construct a new `Polynomial` from the given coefficients
    /// c<sub>0</sub>, ..., c<sub>k</sub>, where p(x) = c<sub>0</sub> +
    /// c<sub>1</sub>x + ··· + c<sub>k</sub>x<sup>k</sup>.
    pub fn new<T: Iterator<Item = Codeword>>(mut init: T) -> Self {
        let mut coefs = P::default();
        init.collect_slice_exhaust(&mut coefs[..]);

        Polynomial { coefs, start: 0 }
    }

    /// Construct the polynomial p(x) = x<sup>n</sup>.
    pub fn unit_power(n: usize) -> Self {
        let mut coefs = P::default();
        coefs[n] = Codeword::for_power(0);

        Polynomial { coefs, start: 0 }
    }

    /// Retrieve the degree-0 coefficient, c<sub>0</sub>.
    pub fn constant(&self) -> Codeword {
        self.coefs[self.start]
    }

    /// Compute deg(p(x)), returned as `Some(deg)` if the polynomial is
    /// nonzero or `None` if p(x) = 0. This is an O(n) operation.
    pub fn degree(&self) -> Option<usize> {
        for (deg, coef) in self.coefs.iter().enumerate().rev() {
            if !coef.zero() {
                return Some(deg - self.start);
            }
        }

        None
    }

    /// Divide the polynomial by x, shifting all coefficients to a lower
    /// degree. Panic if c<sub>0</sub> ≠ 0.
    pub fn shift(mut self) -> Polynomial<P> {
        assert!(self.constant().zero());

        self.coefs[self.start] = Codeword::default();
        self.start += 1;
        self
    }

    /// Retrieve the coefficient at the given absolute storage index, or zero
    /// if the index is out of bounds.
    fn get(&self, idx: usize) -> Codeword {
        match self.coefs.get(idx) {
            Some(&c) => c,
            None => Codeword::default(),
        }
    }

    /// Retrieve the coefficient c<sub>i</sub> of the x<sup>i</sup> term, or
    /// zero if i > deg(p(x)).
    pub fn coef(&self, i: usize) -> Codeword {
        self.get(self.start + i)
    }

    /// Evaluate p(x) at the given codeword, using Horner's method.
    pub fn eval(&self, x: Codeword) -> Codeword {
        self.iter().rev().fold(Codeword::default(), |s, &coef| s * x + coef)
    }

    /// Truncate the polynomial so that deg(p(x)) ≤ d, for the given d.
    pub fn truncate(mut self, deg: usize) -> Polynomial<P> {
        for i in self.start + deg + 1..self.coefs.len() {
            self.coefs[i] = Codeword::default();
        }

        self
    }

    /// Compute the formal derivative p'(x). Odd-power coefficients shift
    /// down a degree, and even-power coefficients cancel.
    pub fn deriv(mut self) -> Polynomial<P> {
        for i in self.start..self.coefs.len() {
            self.coefs[i] = if (i - self.start) % 2 == 0 {
                self.get(i + 1)
            } else {
                Codeword::default()
            };
        }

        self
    }
}

impl<P: PolynomialCoefs> Default for Polynomial<P> {
    /// Construct the zero polynomial, p(x) = 0.
    fn default() -> Self {
        Polynomial::new(std::iter::empty())
    }
}

/// Provides a slice of coefficients starting at the degree-0 term.
impl<P: PolynomialCoefs> Deref for Polynomial<P> {
    type Target = [Codeword];
    fn deref(&self) -> &Self::Target { &self.coefs[self.start..] }
}

impl<P: PolynomialCoefs> DerefMut for Polynomial<P> {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.coefs[self.start..] }
}

/// Add polynomials coefficient-wise.
impl<P: PolynomialCoefs> Add for Polynomial<P> {
    type Output = Polynomial<P>;

    fn add(mut self, rhs: Polynomial<P>) -> Self::Output {
        // Sum the coefficients and reset the degree-0 term back to index 0.
        // Since start >= 0 ⇒ start+i >= i, nothing gets overwritten.
        for i in 0..self.coefs.len() {
            self.coefs[i] = self.coef(i) + rhs.coef(i);
        }

        self.start = 0;
        self
    }
}

/// Scale the polynomial by a codeword.
impl<P: PolynomialCoefs> Mul<Codeword> for Polynomial<P> {
    type Output = Polynomial<P>;

    fn mul(mut self, rhs: Codeword) -> Self::Output {
        for coef in self.coefs.iter_mut() {
            *coef = *coef * rhs;
        }

        self
    }
}

/// Multiply polynomials, discarding any terms that overflow the coefficient
/// storage — effectively p(x)q(x) mod x<sup>n+1</sup>, where n is the
/// maximum degree the storage supports.
impl<P: PolynomialCoefs> Mul<Polynomial<P>> for Polynomial<P> {
    type Output = Polynomial<P>;

    fn mul(self, rhs: Polynomial<P>) -> Self::Output {
        let mut out = Polynomial::<P>::default();

        for (i, &coef) in self.iter().enumerate() {
            for (j, &mult) in rhs.iter().enumerate() {
                if let Some(c) = out.coefs.get_mut(i + j) {
                    *c = *c + coef * mult;
                }
            }
        }

        out
    }
}

impl<P: PolynomialCoefs> fmt::Debug for Polynomial<P> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Polynomial({:?})", &self.coefs[..])
    }
}
