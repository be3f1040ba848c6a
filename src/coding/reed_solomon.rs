//! Encoding and decoding of the (24, 12, 13) short, (24, 16, 9) medium, and
//! (36, 20, 17) long Reed-Solomon codes used for link control and trunking
//! payloads.
//!
//! The codes use 6-bit symbols over GF(2<sup>6</sup>) and can correct up to
//! (n - k) / 2 symbol errors. Uncorrectable codewords are always reported —
//! this layer never hands back corrupted data claiming success.

use std::ops::{Deref, DerefMut};

use collect_slice::CollectSlice;

use crate::bits::{Hexbit, Hexbits, HexbitBytes};
use crate::coding::bmcf;
use crate::coding::galois::{Codeword, Polynomial, PolynomialCoefs};
use crate::error::{CodecError, Result};

/// Encoding and decoding of the (24, 12, 13) code.
pub mod short {
    use super::*;

    /// Bytes in a packed codeword: 24 hexbits.
    pub const CODEWORD_BYTES: usize = 18;
    /// Bytes in the packed data portion: 12 hexbits.
    pub const DATA_BYTES: usize = 9;

    /// Transpose of the G_LC generator matrix from the standard.
    const GEN: [[u8; 12]; 12] = [
        [0o62, 0o11, 0o03, 0o21, 0o30, 0o01, 0o61, 0o24, 0o72, 0o72, 0o73, 0o71],
        [0o44, 0o12, 0o01, 0o70, 0o22, 0o41, 0o76, 0o22, 0o42, 0o14, 0o65, 0o05],
        [0o03, 0o11, 0o05, 0o27, 0o03, 0o27, 0o21, 0o71, 0o05, 0o65, 0o36, 0o55],
        [0o25, 0o11, 0o75, 0o45, 0o75, 0o56, 0o55, 0o56, 0o20, 0o54, 0o61, 0o03],
        [0o14, 0o16, 0o14, 0o16, 0o15, 0o76, 0o76, 0o21, 0o43, 0o35, 0o42, 0o71],
        [0o16, 0o64, 0o06, 0o67, 0o15, 0o64, 0o01, 0o35, 0o47, 0o25, 0o22, 0o34],
        [0o27, 0o67, 0o20, 0o23, 0o33, 0o21, 0o63, 0o73, 0o33, 0o41, 0o17, 0o60],
        [0o03, 0o55, 0o44, 0o64, 0o15, 0o53, 0o35, 0o42, 0o56, 0o16, 0o04, 0o11],
        [0o53, 0o01, 0o66, 0o73, 0o51, 0o04, 0o30, 0o57, 0o01, 0o15, 0o44, 0o74],
        [0o04, 0o76, 0o06, 0o33, 0o03, 0o25, 0o13, 0o74, 0o16, 0o40, 0o20, 0o02],
        [0o36, 0o26, 0o70, 0o44, 0o53, 0o01, 0o64, 0o43, 0o13, 0o71, 0o25, 0o41],
        [0o47, 0o73, 0o66, 0o21, 0o50, 0o12, 0o70, 0o76, 0o76, 0o26, 0o05, 0o50],
    ];

    /// Calculate the 12 parity hexbits over the first 12 data hexbits in the
    /// given buffer, placing them at the end of the buffer.
    pub fn encode(buf: &mut [Hexbit; 24]) {
        let (data, parity) = buf.split_at_mut(12);
        super::encode(data, parity, GEN.iter().map(|r| &r[..]));
    }

    /// Try to decode the given 24-hexbit word to the nearest codeword,
    /// correcting up to 6 symbol errors.
    ///
    /// If decoding was successful, return `Some((data, err))`, where `data`
    /// is the 12 data hexbits and `err` is the number of corrected symbols.
    /// Otherwise, return `None` to indicate an unrecoverable error.
    pub fn decode(buf: &mut [Hexbit; 24]) -> Option<(&[Hexbit], usize)> {
        super::decode::<ShortCoefs>(buf).map(move |(poly, err)| {
            (super::extract_data(poly, &mut buf[..12]), err)
        })
    }

    /// Encode the given 9 data bytes into a packed 18-byte codeword.
    pub fn encode_bytes(data: &[u8]) -> Result<[u8; CODEWORD_BYTES]> {
        super::check_len(data, DATA_BYTES)?;

        let mut hexbits = [Hexbit::default(); 24];
        Hexbits::new(data.iter().cloned()).collect_slice_checked(&mut hexbits[..12]);

        encode(&mut hexbits);

        let mut out = [0; CODEWORD_BYTES];
        HexbitBytes::new(hexbits.iter().cloned()).collect_slice_checked(&mut out[..]);

        Ok(out)
    }

    /// Try to decode the given packed 18-byte codeword, returning the
    /// corrected 9 data bytes and the number of corrected symbols.
    pub fn decode_bytes(word: &[u8]) -> Result<([u8; DATA_BYTES], usize)> {
        super::check_len(word, CODEWORD_BYTES)?;

        let mut hexbits = [Hexbit::default(); 24];
        Hexbits::new(word.iter().cloned()).collect_slice_checked(&mut hexbits[..]);

        let (data, err) = decode(&mut hexbits).ok_or(CodecError::RsUncorrectable)?;

        let mut out = [0; DATA_BYTES];
        HexbitBytes::new(data.iter().cloned()).collect_slice_checked(&mut out[..]);

        Ok((out, err))
    }
}

/// Encoding and decoding of the (24, 16, 9) code.
pub mod medium {
    use super::*;

    /// Bytes in a packed codeword: 24 hexbits.
    pub const CODEWORD_BYTES: usize = 18;
    /// Bytes in the packed data portion: 16 hexbits.
    pub const DATA_BYTES: usize = 12;

    /// Transpose of the G_ES generator matrix from the standard.
    const GEN: [[u8; 16]; 8] = [
        [0o51, 0o57, 0o05, 0o73, 0o75, 0o20, 0o02, 0o24, 0o42, 0o32, 0o65, 0o64, 0o62, 0o55, 0o24, 0o67],
        [0o45, 0o25, 0o01, 0o07, 0o15, 0o32, 0o75, 0o74, 0o64, 0o32, 0o36, 0o06, 0o63, 0o43, 0o23, 0o75],
        [0o67, 0o63, 0o31, 0o47, 0o51, 0o14, 0o43, 0o15, 0o07, 0o55, 0o25, 0o54, 0o74, 0o34, 0o23, 0o45],
        [0o15, 0o73, 0o04, 0o14, 0o51, 0o42, 0o05, 0o72, 0o22, 0o41, 0o07, 0o32, 0o70, 0o71, 0o05, 0o60],
        [0o64, 0o71, 0o16, 0o41, 0o17, 0o75, 0o01, 0o24, 0o61, 0o57, 0o50, 0o76, 0o05, 0o57, 0o50, 0o57],
        [0o67, 0o22, 0o54, 0o77, 0o67, 0o42, 0o40, 0o26, 0o20, 0o66, 0o16, 0o46, 0o27, 0o76, 0o70, 0o24],
        [0o52, 0o40, 0o25, 0o47, 0o17, 0o70, 0o12, 0o74, 0o40, 0o21, 0o40, 0o14, 0o37, 0o50, 0o42, 0o06],
        [0o12, 0o15, 0o76, 0o11, 0o57, 0o54, 0o64, 0o61, 0o65, 0o77, 0o51, 0o36, 0o46, 0o64, 0o23, 0o26],
    ];

    /// Calculate the 8 parity hexbits over the first 16 data hexbits in the
    /// given buffer, placing them at the end of the buffer.
    pub fn encode(buf: &mut [Hexbit; 24]) {
        let (data, parity) = buf.split_at_mut(16);
        super::encode(data, parity, GEN.iter().map(|r| &r[..]));
    }

    /// Try to decode the given 24-hexbit word to the nearest codeword,
    /// correcting up to 4 symbol errors.
    ///
    /// If decoding was successful, return `Some((data, err))`, where `data`
    /// is the 16 data hexbits and `err` is the number of corrected symbols.
    /// Otherwise, return `None` to indicate an unrecoverable error.
    pub fn decode(buf: &mut [Hexbit; 24]) -> Option<(&[Hexbit], usize)> {
        super::decode::<MedCoefs>(buf).map(move |(poly, err)| {
            (super::extract_data(poly, &mut buf[..16]), err)
        })
    }

    /// Encode the given 12 data bytes into a packed 18-byte codeword.
    pub fn encode_bytes(data: &[u8]) -> Result<[u8; CODEWORD_BYTES]> {
        super::check_len(data, DATA_BYTES)?;

        let mut hexbits = [Hexbit::default(); 24];
        Hexbits::new(data.iter().cloned()).collect_slice_checked(&mut hexbits[..16]);

        encode(&mut hexbits);

        let mut out = [0; CODEWORD_BYTES];
        HexbitBytes::new(hexbits.iter().cloned()).collect_slice_checked(&mut out[..]);

        Ok(out)
    }

    /// Try to decode the given packed 18-byte codeword, returning the
    /// corrected 12 data bytes and the number of corrected symbols.
    pub fn decode_bytes(word: &[u8]) -> Result<([u8; DATA_BYTES], usize)> {
        super::check_len(word, CODEWORD_BYTES)?;

        let mut hexbits = [Hexbit::default(); 24];
        Hexbits::new(word.iter().cloned()).collect_slice_checked(&mut hexbits[..]);

        let (data, err) = decode(&mut hexbits).ok_or(CodecError::RsUncorrectable)?;

        let mut out = [0; DATA_BYTES];
        HexbitBytes::new(data.iter().cloned()).collect_slice_checked(&mut out[..]);

        Ok((out, err))
    }
}

/// Encoding and decoding of the (36, 20, 17) code.
pub mod long {
    use super::*;

    /// Bytes in a packed codeword: 36 hexbits.
    pub const CODEWORD_BYTES: usize = 27;
    /// Bytes in the packed data portion: 20 hexbits.
    pub const DATA_BYTES: usize = 15;

    /// Transpose of the P_HDR generator matrix from the standard.
    const GEN: [[u8; 20]; 16] = [
        [0o74, 0o04, 0o07, 0o26, 0o23, 0o24, 0o52, 0o55, 0o54, 0o74, 0o54, 0o51, 0o01, 0o11, 0o06, 0o34, 0o63, 0o71, 0o02, 0o34],
        [0o37, 0o17, 0o23, 0o05, 0o73, 0o51, 0o33, 0o62, 0o51, 0o41, 0o70, 0o07, 0o65, 0o70, 0o02, 0o31, 0o43, 0o21, 0o01, 0o35],
        [0o34, 0o50, 0o37, 0o07, 0o73, 0o25, 0o14, 0o56, 0o32, 0o30, 0o11, 0o72, 0o32, 0o05, 0o65, 0o01, 0o25, 0o70, 0o53, 0o02],
        [0o06, 0o24, 0o46, 0o63, 0o41, 0o23, 0o02, 0o25, 0o65, 0o41, 0o03, 0o30, 0o70, 0o10, 0o11, 0o15, 0o44, 0o44, 0o74, 0o23],
        [0o02, 0o11, 0o56, 0o63, 0o72, 0o22, 0o20, 0o73, 0o77, 0o43, 0o13, 0o65, 0o13, 0o65, 0o41, 0o44, 0o77, 0o56, 0o02, 0o21],
        [0o07, 0o05, 0o75, 0o27, 0o34, 0o41, 0o06, 0o60, 0o12, 0o22, 0o22, 0o54, 0o44, 0o24, 0o20, 0o64, 0o63, 0o04, 0o14, 0o27],
        [0o44, 0o30, 0o43, 0o63, 0o21, 0o74, 0o14, 0o15, 0o54, 0o51, 0o16, 0o06, 0o73, 0o15, 0o45, 0o16, 0o17, 0o30, 0o52, 0o22],
        [0o64, 0o57, 0o45, 0o40, 0o51, 0o66, 0o25, 0o30, 0o13, 0o06, 0o57, 0o21, 0o24, 0o77, 0o42, 0o24, 0o17, 0o74, 0o74, 0o33],
        [0o26, 0o33, 0o55, 0o06, 0o67, 0o74, 0o52, 0o13, 0o35, 0o64, 0o03, 0o36, 0o12, 0o22, 0o46, 0o52, 0o64, 0o04, 0o12, 0o64],
        [0o14, 0o03, 0o21, 0o04, 0o16, 0o65, 0o23, 0o17, 0o32, 0o33, 0o45, 0o63, 0o52, 0o24, 0o54, 0o16, 0o14, 0o23, 0o57, 0o42],
        [0o26, 0o02, 0o50, 0o40, 0o31, 0o70, 0o35, 0o20, 0o56, 0o03, 0o72, 0o50, 0o21, 0o24, 0o35, 0o06, 0o40, 0o71, 0o24, 0o05],
        [0o44, 0o02, 0o31, 0o45, 0o74, 0o36, 0o74, 0o02, 0o12, 0o47, 0o31, 0o61, 0o55, 0o74, 0o12, 0o62, 0o74, 0o70, 0o63, 0o73],
        [0o54, 0o15, 0o45, 0o47, 0o11, 0o67, 0o75, 0o70, 0o75, 0o27, 0o30, 0o64, 0o12, 0o07, 0o40, 0o20, 0o31, 0o63, 0o15, 0o51],
        [0o13, 0o16, 0o27, 0o30, 0o21, 0o45, 0o75, 0o55, 0o01, 0o12, 0o56, 0o52, 0o35, 0o44, 0o64, 0o13, 0o72, 0o45, 0o42, 0o46],
        [0o77, 0o25, 0o71, 0o75, 0o12, 0o64, 0o43, 0o14, 0o72, 0o55, 0o35, 0o01, 0o14, 0o07, 0o65, 0o55, 0o54, 0o56, 0o52, 0o73],
        [0o05, 0o26, 0o62, 0o07, 0o21, 0o01, 0o27, 0o47, 0o63, 0o47, 0o22, 0o60, 0o72, 0o46, 0o33, 0o57, 0o06, 0o43, 0o33, 0o60],
    ];

    /// Calculate the 16 parity hexbits over the first 20 data hexbits in the
    /// given buffer, placing them at the end of the buffer.
    pub fn encode(buf: &mut [Hexbit; 36]) {
        let (data, parity) = buf.split_at_mut(20);
        super::encode(data, parity, GEN.iter().map(|r| &r[..]));
    }

    /// Try to decode the given 36-hexbit word to the nearest codeword,
    /// correcting up to 8 symbol errors.
    ///
    /// If decoding was successful, return `Some((data, err))`, where `data`
    /// is the 20 data hexbits and `err` is the number of corrected symbols.
    /// Otherwise, return `None` to indicate an unrecoverable error.
    pub fn decode(buf: &mut [Hexbit; 36]) -> Option<(&[Hexbit], usize)> {
        super::decode::<LongCoefs>(buf).map(move |(poly, err)| {
            (super::extract_data(poly, &mut buf[..20]), err)
        })
    }

    /// Encode the given 15 data bytes into a packed 27-byte codeword.
    pub fn encode_bytes(data: &[u8]) -> Result<[u8; CODEWORD_BYTES]> {
        super::check_len(data, DATA_BYTES)?;

        let mut hexbits = [Hexbit::default(); 36];
        Hexbits::new(data.iter().cloned()).collect_slice_checked(&mut hexbits[..20]);

        encode(&mut hexbits);

        let mut out = [0; CODEWORD_BYTES];
        HexbitBytes::new(hexbits.iter().cloned()).collect_slice_checked(&mut out[..]);

        Ok(out)
    }

    /// Try to decode the given packed 27-byte codeword, returning the
    /// corrected 15 data bytes and the number of corrected symbols.
    pub fn decode_bytes(word: &[u8]) -> Result<([u8; DATA_BYTES], usize)> {
        super::check_len(word, CODEWORD_BYTES)?;

        let mut hexbits = [Hexbit::default(); 36];
        Hexbits::new(word.iter().cloned()).collect_slice_checked(&mut hexbits[..]);

        let (data, err) = decode(&mut hexbits).ok_or(CodecError::RsUncorrectable)?;

        let mut out = [0; DATA_BYTES];
        HexbitBytes::new(data.iter().cloned()).collect_slice_checked(&mut out[..]);

        Ok((out, err))
    }
}

/// Verify a packed buffer has exactly the expected length.
fn check_len(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() == expected {
        Ok(())
    } else {
        Err(CodecError::InvalidLength { expected, actual: buf.len() })
    }
}

/// Encode the given data with the given generator matrix, placing the
/// resulting parity symbols in the given destination.
fn encode<'g, G>(data: &[Hexbit], parity: &mut [Hexbit], gen: G)
    where G: Iterator<Item = &'g [u8]>
{
    gen.map(|row| {
        row.iter()
           .zip(data.iter())
           .fold(Codeword::default(), |s, (&col, &d)| {
               s + Codeword::new(d.bits()) * Codeword::new(col)
           }).bits()
    }).map(Hexbit::new).collect_slice_checked(parity);
}

/// Try to fix any errors in the given word.
///
/// On success, return `Some((poly, err))`, where `poly` is the corrected
/// word in polynomial form (with the last parity symbol as the degree-0
/// coefficient) and `err` is the number of corrected symbols. Otherwise,
/// return `None` to indicate an unrecoverable error.
fn decode<P: PolynomialCoefs>(word: &[Hexbit]) -> Option<(Polynomial<P>, usize)> {
    // The first transmitted data symbol maps to the highest-degree
    // coefficient.
    let mut poly = Polynomial::<P>::new(word.iter().rev().map(|&b| {
        Codeword::new(b.bits())
    }));

    let syn = syndromes(&poly);
    let (errors, descs) = bmcf::Errors::new(syn)?;

    let fixed = descs.fold(0, |count, (loc, pat)| {
        match poly.get_mut(loc) {
            Some(coef) => {
                *coef = *coef + pat;
                count + 1
            }
            // An error located in a virtual symbol beyond the codeword means
            // the word is unrecoverable.
            None => count,
        }
    });

    if fixed == errors {
        Some((poly, fixed))
    } else {
        None
    }
}

/// Calculate the syndrome polynomial s(x) for the given word.
fn syndromes<P: PolynomialCoefs>(word: &Polynomial<P>) -> Polynomial<P> {
    Polynomial::new((1..=P::syndromes()).map(|pow| {
        word.eval(Codeword::for_power(pow))
    }))
}

/// Extract the data symbols from the given word in polynomial form, writing
/// them to the given slice.
fn extract_data<P>(poly: Polynomial<P>, data: &mut [Hexbit]) -> &[Hexbit]
    where P: PolynomialCoefs
{
    poly.iter().rev().map(|coef| Hexbit::new(coef.bits())).collect_slice_fill(data);
    data
}

/// Polynomial coefficients for the short code.
#[derive(Copy, Clone, Default)]
struct ShortCoefs([Codeword; 24]);

impl PolynomialCoefs for ShortCoefs {
    fn distance() -> usize { 13 }
}

impl Deref for ShortCoefs {
    type Target = [Codeword];
    fn deref(&self) -> &Self::Target { &self.0[..] }
}

impl DerefMut for ShortCoefs {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0[..] }
}

/// Polynomial coefficients for the medium code.
#[derive(Copy, Clone, Default)]
struct MedCoefs([Codeword; 24]);

impl PolynomialCoefs for MedCoefs {
    fn distance() -> usize { 9 }
}

impl Deref for MedCoefs {
    type Target = [Codeword];
    fn deref(&self) -> &Self::Target { &self.0[..] }
}

impl DerefMut for MedCoefs {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0[..] }
}

/// Polynomial coefficients for the long code.
#[derive(Copy, Clone)]
struct LongCoefs([Codeword; 36]);

impl PolynomialCoefs for LongCoefs {
    fn distance() -> usize { 17 }
}

impl Default for LongCoefs {
    fn default() -> LongCoefs { LongCoefs([Codeword::default(); 36]) }
}

impl Deref for LongCoefs {
    type Target = [Codeword];
    fn deref(&self) -> &Self::Target { &self.0[..] }
}

impl DerefMut for LongCoefs {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0[..] }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Compute the product (x + α^1)(x + α^2)···(x + α^k) for the given k,
    /// which must equal the code's generator polynomial.
    fn generator<P: PolynomialCoefs>(roots: usize) -> Polynomial<P> {
        (1..=roots).fold(Polynomial::unit_power(0), |poly, pow| {
            poly * Polynomial::new([
                Codeword::for_power(pow),
                Codeword::for_power(0),
            ].iter().cloned())
        })
    }

    #[test]
    fn validate_coefs() {
        ShortCoefs::default().validate();
        MedCoefs::default().validate();
        LongCoefs::default().validate();
    }

    #[test]
    fn verify_short_gen() {
        let p = generator::<ShortCoefs>(8);

        assert_eq!(p.degree(), Some(8));
        assert_eq!(p.coef(0).bits(), 0o26);
        assert_eq!(p.coef(1).bits(), 0o06);
        assert_eq!(p.coef(2).bits(), 0o24);
        assert_eq!(p.coef(3).bits(), 0o57);
        assert_eq!(p.coef(4).bits(), 0o60);
        assert_eq!(p.coef(5).bits(), 0o45);
        assert_eq!(p.coef(6).bits(), 0o75);
        assert_eq!(p.coef(7).bits(), 0o67);
        assert_eq!(p.coef(8).bits(), 0o01);
    }

    #[test]
    fn verify_med_gen() {
        let p = generator::<MedCoefs>(12);

        assert_eq!(p.degree(), Some(12));
        assert_eq!(p.coef(0).bits(), 0o50);
        assert_eq!(p.coef(1).bits(), 0o41);
        assert_eq!(p.coef(2).bits(), 0o02);
        assert_eq!(p.coef(3).bits(), 0o74);
        assert_eq!(p.coef(4).bits(), 0o11);
        assert_eq!(p.coef(5).bits(), 0o60);
        assert_eq!(p.coef(6).bits(), 0o34);
        assert_eq!(p.coef(7).bits(), 0o71);
        assert_eq!(p.coef(8).bits(), 0o03);
        assert_eq!(p.coef(9).bits(), 0o55);
        assert_eq!(p.coef(10).bits(), 0o05);
        assert_eq!(p.coef(11).bits(), 0o71);
        assert_eq!(p.coef(12).bits(), 0o01);
    }

    #[test]
    fn verify_long_gen() {
        let p = generator::<LongCoefs>(16);

        assert_eq!(p.degree(), Some(16));
        assert_eq!(p.coef(0).bits(), 0o60);
        assert_eq!(p.coef(1).bits(), 0o73);
        assert_eq!(p.coef(2).bits(), 0o46);
        assert_eq!(p.coef(3).bits(), 0o51);
        assert_eq!(p.coef(4).bits(), 0o73);
        assert_eq!(p.coef(5).bits(), 0o05);
        assert_eq!(p.coef(6).bits(), 0o42);
        assert_eq!(p.coef(7).bits(), 0o64);
        assert_eq!(p.coef(8).bits(), 0o33);
        assert_eq!(p.coef(9).bits(), 0o22);
        assert_eq!(p.coef(10).bits(), 0o27);
        assert_eq!(p.coef(11).bits(), 0o21);
        assert_eq!(p.coef(12).bits(), 0o23);
        assert_eq!(p.coef(13).bits(), 0o02);
        assert_eq!(p.coef(14).bits(), 0o35);
        assert_eq!(p.coef(15).bits(), 0o34);
        assert_eq!(p.coef(16).bits(), 0o01);
    }

    #[test]
    fn test_decode_short() {
        let mut buf = [Hexbit::default(); 24];
        buf[0] = Hexbit::new(1);

        short::encode(&mut buf);

        // Corrupt 6 symbols, the full correction capability.
        buf[0] = Hexbit::new(0o00);
        buf[2] = Hexbit::new(0o60);
        buf[7] = Hexbit::new(0o42);
        buf[13] = Hexbit::new(0o14);
        buf[18] = Hexbit::new(0o56);
        buf[23] = Hexbit::new(0o72);

        let (data, err) = short::decode(&mut buf).expect("correctable word");

        assert_eq!(err, 6);
        assert_eq!(data[0].bits(), 1);
        assert!(data[1..].iter().all(|h| h.bits() == 0));
    }

    #[test]
    fn test_decode_med() {
        let mut buf = [Hexbit::default(); 24];
        buf[0] = Hexbit::new(1);

        medium::encode(&mut buf);

        buf[0] = Hexbit::new(0o00);
        buf[10] = Hexbit::new(0o60);
        buf[16] = Hexbit::new(0o42);
        buf[23] = Hexbit::new(0o14);

        let (data, err) = medium::decode(&mut buf).expect("correctable word");

        assert_eq!(err, 4);
        assert_eq!(data[0].bits(), 1);
        assert!(data[1..].iter().all(|h| h.bits() == 0));
    }

    #[test]
    fn test_decode_long() {
        let mut buf = [Hexbit::default(); 36];
        buf[0] = Hexbit::new(1);

        long::encode(&mut buf);

        buf[0] = Hexbit::new(0o00);
        buf[2] = Hexbit::new(0o43);
        buf[5] = Hexbit::new(0o21);
        buf[10] = Hexbit::new(0o11);
        buf[18] = Hexbit::new(0o67);
        buf[22] = Hexbit::new(0o04);
        buf[27] = Hexbit::new(0o12);
        buf[30] = Hexbit::new(0o32);

        let (data, err) = long::decode(&mut buf).expect("correctable word");

        assert_eq!(err, 8);
        assert_eq!(data[0].bits(), 1);
        assert!(data[1..].iter().all(|h| h.bits() == 0));
    }

    #[test]
    fn test_uncorrectable() {
        let mut buf = [Hexbit::default(); 24];
        buf[0] = Hexbit::new(1);

        short::encode(&mut buf);

        // Two symbols past the correction capability. Every corrupted
        // position is a data symbol with known contents, so all 8 patterns
        // are guaranteed to differ from the codeword.
        for (i, &sym) in [0o12, 0o34, 0o56, 0o01, 0o77, 0o22, 0o45, 0o66].iter().enumerate() {
            buf[i] = Hexbit::new(sym);
        }

        assert!(short::decode(&mut buf).is_none());
    }

    #[test]
    fn test_byte_round_trips() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x55];
        let mut word = short::encode_bytes(&data[..]).unwrap();

        // Flip some codeword bytes (2 hexbit errors per byte at worst.)
        word[0] ^= 0xFF;
        word[9] ^= 0x3C;
        word[17] ^= 0x81;

        let (out, err) = short::decode_bytes(&word[..]).unwrap();
        assert_eq!(out, data);
        assert!(err > 0);

        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x55, 0xAA, 0x0F, 0xF0];
        let word = medium::encode_bytes(&data[..]).unwrap();
        let (out, err) = medium::decode_bytes(&word[..]).unwrap();
        assert_eq!(out, data);
        assert_eq!(err, 0);

        let data = [
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0,
            0x55, 0xAA, 0x0F, 0xF0, 0x11, 0x22, 0x33,
        ];
        let mut word = long::encode_bytes(&data[..]).unwrap();
        word[26] ^= 0xFF;

        let (out, err) = long::decode_bytes(&word[..]).unwrap();
        assert_eq!(out, data);
        assert!(err > 0);
    }

    #[test]
    fn test_byte_length_checks() {
        assert_eq!(
            short::encode_bytes(&[0; 8][..]),
            Err(CodecError::InvalidLength { expected: 9, actual: 8 })
        );
        assert_eq!(
            short::decode_bytes(&[0; 17][..]),
            Err(CodecError::InvalidLength { expected: 18, actual: 17 })
        );
        assert_eq!(
            long::decode_bytes(&[0; 36][..]),
            Err(CodecError::InvalidLength { expected: 27, actual: 36 })
        );
    }
}
