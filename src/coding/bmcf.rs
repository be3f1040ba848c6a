//! Errata decoding for the Reed-Solomon codes using the Berlekamp-Massey,
//! Chien search, and Forney algorithms.
//!
//! The standard procedure has the following steps:
//!
//! 1. Generate the syndrome polynomial s(x) = s<sub>1</sub> +
//!    s<sub>2</sub>x + ··· + s<sub>2t</sub>x<sup>2t-1</sup>, where
//!    s<sub>i</sub> = r(α<sup>i</sup>) for the received word polynomial
//!    r(x).
//! 2. Derive the error locator polynomial Λ(x) from s(x), where deg(Λ) = e ≤
//!    t is the number of detected errors (Berlekamp-Massey.)
//! 3. Find the roots a<sub>i</sub><sup>-1</sup> of Λ(x); each inverted root
//!    gives an error location within the received word (Chien search.)
//! 4. Verify the number of roots equals deg(Λ), otherwise the word is
//!    unrecoverable.
//! 5. Evaluate the error pattern b<sub>i</sub> = Ω(a<sub>i</sub><sup>-1</sup>) /
//!    Λ'(a<sub>i</sub><sup>-1</sup>) at each location, where Ω(x) = Λ(x)s(x)
//!    mod x<sup>2t</sup> (Forney.)
//!
//! The caller then adds each pattern into the received symbol at its
//! location, which corrects it in a characteristic-2 field.

use std::cmp::min;
use std::iter::once;
use std::ops::Range;

use collect_slice::CollectSlice;

use crate::coding::galois::{Codeword, Polynomial, PolynomialCoefs, FIELD_SIZE};

/// Derives the error locator polynomial Λ(x) from the syndrome polynomial
/// s(x), using Hankerson et al's formulation of the Berlekamp-Massey
/// algorithm: Λ(x) = p<sub>2t</sub>(x).
struct ErrorLocator<P: PolynomialCoefs> {
    /// Saved p polynomial: p<sub>zi-1</sub>.
    p_saved: Polynomial<P>,
    /// Previous iteration's p polynomial: p<sub>i-1</sub>.
    p_cur: Polynomial<P>,
    /// Saved q polynomial: q<sub>zi-1</sub>.
    q_saved: Polynomial<P>,
    /// Previous iteration's q polynomial: q<sub>i-1</sub>.
    q_cur: Polynomial<P>,
    /// Degree-related term of the saved p polynomial: D<sub>zi-1</sub>.
    deg_saved: usize,
    /// Degree-related term of the previous p polynomial: D<sub>i-1</sub>.
    deg_cur: usize,
}

impl<P: PolynomialCoefs> ErrorLocator<P> {
    /// Construct a new `ErrorLocator` from the given syndrome polynomial.
    fn new(syn: Polynomial<P>) -> ErrorLocator<P> {
        ErrorLocator {
            // 1 + s(x).
            q_saved: Polynomial::new(
                once(Codeword::for_power(0))
                    .chain(syn.iter().take(P::syndromes()).cloned())
            ),
            q_cur: syn,
            // x^{2t+1}.
            p_saved: Polynomial::unit_power(P::syndromes() + 1),
            // x^{2t}.
            p_cur: Polynomial::unit_power(P::syndromes()),
            deg_saved: 0,
            deg_cur: 1,
        }
    }

    /// Construct the error locator polynomial Λ(x).
    fn build(mut self) -> Polynomial<P> {
        for _ in 0..P::syndromes() {
            self.step();
        }

        self.p_cur
    }

    /// Perform one iterative step, updating the state polynomials and
    /// degrees.
    fn step(&mut self) {
        let (save, q, p, d) = if self.q_cur.constant().zero() {
            self.reduce()
        } else {
            self.transform()
        };

        if save {
            self.q_saved = self.q_cur;
            self.p_saved = self.p_cur;
            self.deg_saved = self.deg_cur;
        }

        self.q_cur = q;
        self.p_cur = p;
        self.deg_cur = d;
    }

    /// Shift the polynomials down a degree since they have no degree-0 term.
    fn reduce(&mut self) -> (bool, Polynomial<P>, Polynomial<P>, usize) {
        (
            false,
            self.q_cur.shift(),
            self.p_cur.shift(),
            2 + self.deg_cur,
        )
    }

    /// Cancel out the degree-0 terms and shift the polynomials.
    fn transform(&mut self) -> (bool, Polynomial<P>, Polynomial<P>, usize) {
        let mult = self.q_cur.constant() / self.q_saved.constant();

        (
            self.deg_cur >= self.deg_saved,
            (self.q_cur + self.q_saved * mult).shift(),
            (self.p_cur + self.p_saved * mult).shift(),
            2 + min(self.deg_cur, self.deg_saved),
        )
    }
}

/// Finds the roots of an error locator polynomial Λ(x) by brute-force
/// evaluation of every codeword in the field, with the Chien search
/// optimization.
struct PolynomialRoots<P: PolynomialCoefs> {
    /// Coefficient terms A = [Λ<sub>0</sub>, ..., Λ<sub>e</sub>], maintained
    /// such that Λ(α<sup>i</sup>) = sum(A) for the current power i.
    terms: Polynomial<P>,
    /// Codeword powers yet to be evaluated.
    pow: Range<usize>,
}

impl<P: PolynomialCoefs> PolynomialRoots<P> {
    /// Construct a new `PolynomialRoots` from the given Λ(x).
    fn new(loc: Polynomial<P>) -> Self {
        PolynomialRoots {
            terms: loc,
            pow: 0..FIELD_SIZE,
        }
    }

    /// Update each term coefficient to its value at the next codeword power.
    fn update_terms(&mut self) {
        for (pow, term) in self.terms.iter_mut().enumerate() {
            *term = *term * Codeword::for_power(pow);
        }
    }

    /// Compute Λ(α<sup>i</sup>) for the current power i.
    fn eval(&self) -> Codeword {
        self.terms.iter().fold(Codeword::default(), |sum, &x| sum + x)
    }
}

/// Iterate over all roots α<sup>i</sup> of Λ(x).
impl<P: PolynomialCoefs> Iterator for PolynomialRoots<P> {
    type Item = Codeword;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pow = self.pow.next()?;

            let eval = self.eval();
            self.update_terms();

            if eval.zero() {
                return Some(Codeword::for_power(pow));
            }
        }
    }
}

/// Computes error locations and patterns from the roots of Λ(x), using the
/// Forney algorithm for the patterns.
struct ErrorDescriptions<P: PolynomialCoefs> {
    /// Derivative of the locator polynomial: Λ'(x).
    deriv: Polynomial<P>,
    /// Error evaluator polynomial: Ω(x) = Λ(x)s(x) mod x<sup>2t</sup>.
    vals: Polynomial<P>,
}

impl<P: PolynomialCoefs> ErrorDescriptions<P> {
    /// Create a new `ErrorDescriptions` from the given syndrome and locator
    /// polynomials.
    fn new(syn: Polynomial<P>, loc: Polynomial<P>) -> Self {
        ErrorDescriptions {
            deriv: loc.deriv(),
            vals: (loc * syn).truncate(P::syndromes() - 1),
        }
    }

    /// Compute the error location and pattern for the given root
    /// a<sub>i</sub><sup>-1</sup> of Λ(x).
    fn for_root(&self, root: Codeword) -> (usize, Codeword) {
        (
            // If Λ(α^i) = 0, the error location is m ≡ -i (modulo the
            // field.)
            root.invert().power().expect("zero root"),
            // Ω(α^i) / Λ'(α^i).
            self.vals.eval(root) / self.deriv.eval(root),
        )
    }
}

/// Decodes and iterates over detected codeword errors.
pub struct Errors<P: PolynomialCoefs> {
    /// Roots of the error locator polynomial. The `Polynomial` type is used
    /// only as a conveniently sized buffer here.
    roots: Polynomial<P>,
    /// Computes location and pattern for each root.
    descs: ErrorDescriptions<P>,
    /// Errors left to yield.
    pos: Range<usize>,
}

impl<P: PolynomialCoefs> Errors<P> {
    /// Create a new `Errors` decoder from the given syndrome polynomial.
    ///
    /// If decoding was successful, return `Some((nerr, errs))`, where `nerr`
    /// is the number of detected errors and `errs` iterates over them.
    /// Otherwise, return `None` to indicate an unrecoverable codeword.
    pub fn new(syn: Polynomial<P>) -> Option<(usize, Self)> {
        let loc = ErrorLocator::new(syn).build();
        let errors = loc.degree().expect("invalid error polynomial");

        // Buffer the roots before evaluating any, because if the number of
        // roots ends up unequal to deg(Λ), all of them are invalid, and
        // evaluating one can divide by zero.
        let mut roots = Polynomial::<P>::default();
        let nroots = PolynomialRoots::new(loc).collect_slice_exhaust(&mut roots[..]);

        if nroots != errors {
            return None;
        }

        Some((errors, Errors {
            roots,
            descs: ErrorDescriptions::new(syn, loc),
            pos: 0..errors,
        }))
    }
}

/// Iterate over detected errors, yielding the location and pattern of each.
impl<P: PolynomialCoefs> Iterator for Errors<P> {
    type Item = (usize, Codeword);

    fn next(&mut self) -> Option<Self::Item> {
        self.pos.next().map(|i| self.descs.for_root(self.roots[i]))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coding::galois::impl_polynomial_coefs;

    impl_polynomial_coefs!(TestCoefs, 9);
    type TestPolynomial = Polynomial<TestCoefs>;

    #[test]
    fn test_roots() {
        // p(x) = (1 + α^42 x)(1 + α^13 x)(1 + α^57 x).
        let p = TestPolynomial::new([
            Codeword::for_power(0),
            Codeword::for_power(42),
        ].iter().cloned()) * TestPolynomial::new([
            Codeword::for_power(0),
            Codeword::for_power(13),
        ].iter().cloned()) * TestPolynomial::new([
            Codeword::for_power(0),
            Codeword::for_power(57),
        ].iter().cloned());

        let mut roots = [Codeword::default(); 3];
        PolynomialRoots::new(p).collect_slice_checked(&mut roots[..]);

        assert!(roots.contains(&Codeword::for_power(42).invert()));
        assert!(roots.contains(&Codeword::for_power(13).invert()));
        assert!(roots.contains(&Codeword::for_power(57).invert()));

        // p(x) = 1 has no roots.
        let p = TestPolynomial::unit_power(0);
        assert!(PolynomialRoots::new(p).next().is_none());
    }

    #[test]
    fn test_no_errors() {
        // An all-zero syndrome polynomial decodes to zero errors.
        let syn = TestPolynomial::default();
        let (nerr, mut errs) = Errors::new(syn).expect("clean word");

        assert_eq!(nerr, 0);
        assert!(errs.next().is_none());
    }
}
