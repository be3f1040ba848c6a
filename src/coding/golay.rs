//! Encoding and decoding of the (20, 8, 7) standard and (24, 12, 8)
//! extended Golay codes used for short fixed-size fields.
//!
//! Both codes are built on the same generator polynomial: the standard code
//! shortens the (23, 12, 7) perfect Golay code by 4 data bits, and each code
//! appends one overall parity bit. Decoding is table-driven: the syndrome of
//! the received word indexes a table of minimum-weight error patterns, and
//! the selected pattern is added back into the word.
//!
//! Unlike the Reed-Solomon layer, decoding here is best-effort and never
//! signals failure: a word corrupted beyond the correction capability passes
//! through with whatever error pattern its syndrome selects. Callers that
//! need a hard guarantee must rely on an outer checksum or RS code.

use once_cell::sync::Lazy;

use crate::bits::{get_bits, put_bits};
use crate::error::{CodecError, Result};

/// Generator polynomial g(x) shared by both codes, of degree 11.
const GEN: u32 = 0b1100_0111_0101;

/// Number of check bits produced by g(x), and so the number of distinct
/// syndromes is 2<sup>11</sup>.
const CHECKS: u32 = 11;

/// Syndrome → error pattern table for the 19-bit shortened codeword.
static STANDARD_PATTERNS: Lazy<[u32; 2048]> = Lazy::new(|| error_patterns(19));

/// Syndrome → error pattern table for the 23-bit codeword.
static EXTENDED_PATTERNS: Lazy<[u32; 2048]> = Lazy::new(|| error_patterns(23));

/// Compute the syndrome of the given word: the remainder after dividing it,
/// taken as a polynomial over GF(2), by the generator polynomial.
///
/// A zero syndrome means the word is a valid codeword.
pub fn syndrome(word: u32, bits: u32) -> u32 {
    debug_assert!(bits <= 23 && word >> bits == 0);

    let mut rem = word;

    for deg in (CHECKS..bits).rev() {
        if rem >> deg & 1 == 1 {
            rem ^= GEN << (deg - CHECKS);
        }
    }

    rem
}

/// Build the syndrome-indexed table of error patterns for a codeword of the
/// given length, covering all patterns of weight 3 or less. Lower-weight
/// patterns win collisions, and syndromes with no entry are uncorrectable.
fn error_patterns(bits: u32) -> [u32; 2048] {
    fn insert(table: &mut [u32; 2048], pattern: u32, bits: u32) {
        let syn = syndrome(pattern, bits) as usize;

        if table[syn] == 0 {
            table[syn] = pattern;
        }
    }

    let mut table = [0; 2048];

    for i in 0..bits {
        insert(&mut table, 1 << i, bits);
    }

    for i in 1..bits {
        for j in 0..i {
            insert(&mut table, 1 << i | 1 << j, bits);
        }
    }

    for i in 2..bits {
        for j in 1..i {
            for k in 0..j {
                insert(&mut table, 1 << i | 1 << j | 1 << k, bits);
            }
        }
    }

    table
}

/// Encoding and decoding of the (20, 8, 7) code.
pub mod standard {
    use super::*;

    /// Bytes in a packed codeword.
    pub const CODEWORD_BYTES: usize = 3;

    /// Encode the given 8 data bits to a 20-bit codeword, with the overall
    /// parity bit in the LSB position.
    pub fn encode(data: u8) -> u32 {
        let word = u32::from(data) << CHECKS;
        let cw = word | syndrome(word, 19);

        cw << 1 | cw.count_ones() & 1
    }

    /// Decode the given 20-bit word to the nearest codeword, correcting up
    /// to 3 errors, and return the 8 data bits.
    ///
    /// Decoding is best-effort: an uncorrectable word passes through
    /// uncorrected.
    pub fn decode(word: u32) -> u8 {
        debug_assert!(word >> 20 == 0);

        // The overall parity bit takes no part in correction.
        correct(word >> 1)
    }

    /// Pack the codeword for the given data bits into wire format:
    /// `[data(8)] [check bits across bytes 1-2]`.
    pub fn encode_bytes(data: u8) -> [u8; CODEWORD_BYTES] {
        let cw = encode(data);
        let check = cw >> 1 & 0x7FF;
        let parity = cw & 1;

        [
            data,
            (check >> 3) as u8,
            ((check & 0x7) << 5 | parity << 4) as u8,
        ]
    }

    /// Decode a wire-format codeword buffer, returning the corrected 8 data
    /// bits (best-effort, like [`decode`].)
    pub fn decode_bytes(data: &[u8]) -> Result<u8> {
        if data.len() < CODEWORD_BYTES {
            return Err(CodecError::InvalidLength {
                expected: CODEWORD_BYTES,
                actual: data.len(),
            });
        }

        let word = u32::from(data[0]) << 11
            | u32::from(data[1]) << 3
            | u32::from(data[2]) >> 5;

        Ok(correct(word))
    }

    /// Correct the given 19-bit received word and extract its data bits.
    fn correct(mut word: u32) -> u8 {
        let pattern = STANDARD_PATTERNS[syndrome(word, 19) as usize];

        if pattern != 0 {
            word ^= pattern;
        }

        (word >> CHECKS) as u8
    }
}

/// Encoding and decoding of the (24, 12, 8) code.
pub mod extended {
    use super::*;

    /// Encode the given 12 data bits to a 24-bit codeword, with the overall
    /// parity bit in the LSB position.
    pub fn encode(data: u16) -> u32 {
        assert!(data >> 12 == 0);

        let word = u32::from(data) << CHECKS;
        let cw = word | syndrome(word, 23);

        cw << 1 | cw.count_ones() & 1
    }

    /// Decode the given 24-bit word to the nearest codeword, correcting up
    /// to 3 errors, and return the 12 data bits.
    ///
    /// Decoding is best-effort: an uncorrectable word passes through with
    /// whatever error pattern its syndrome selects.
    pub fn decode(word: u32) -> u16 {
        debug_assert!(word >> 24 == 0);

        let mut cw = word >> 1;
        let pattern = EXTENDED_PATTERNS[syndrome(cw, 23) as usize];

        if pattern != 0 {
            cw ^= pattern;
        }

        (cw >> CHECKS) as u16
    }

    /// Encode the given payload buffer into twice-as-long FEC wire format,
    /// mapping each 12-bit group to a 24-bit codeword. The payload length
    /// must be a multiple of 3 bytes.
    pub fn encode_buf(data: &[u8], fec: &mut [u8]) -> Result<()> {
        check_bufs(data, fec)?;

        for i in 0..data.len() * 8 / 12 {
            let group = get_bits(data, i * 12, 12) as u16;
            put_bits(fec, i * 24, 24, encode(group));
        }

        Ok(())
    }

    /// Decode FEC wire format back into its payload buffer, correcting each
    /// 24-bit codeword best-effort.
    pub fn decode_buf(fec: &[u8], data: &mut [u8]) -> Result<()> {
        check_bufs(data, fec)?;

        for i in 0..data.len() * 8 / 12 {
            let group = decode(get_bits(fec, i * 24, 24));
            put_bits(data, i * 12, 12, u32::from(group));
        }

        Ok(())
    }

    fn check_bufs(data: &[u8], fec: &[u8]) -> Result<()> {
        assert!(data.len() % 3 == 0);

        if fec.len() < data.len() * 2 {
            return Err(CodecError::InvalidLength {
                expected: data.len() * 2,
                actual: fec.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_syndrome() {
        // Multiples of g(x) have zero syndrome.
        assert_eq!(syndrome(GEN, 19), 0);
        assert_eq!(syndrome(GEN << 5, 19), 0);
        assert_eq!(syndrome(GEN << 11, 23), 0);
        assert_eq!(syndrome(GEN ^ GEN << 7, 23), 0);

        // Words below the generator degree are their own syndrome.
        assert_eq!(syndrome(0x7FF, 23), 0x7FF);
        assert_eq!(syndrome(0b101, 19), 0b101);
    }

    #[test]
    fn test_standard_round_trip() {
        for data in 0..=255u8 {
            let cw = standard::encode(data);
            assert!(cw >> 20 == 0);
            assert_eq!(standard::decode(cw), data);
        }
    }

    #[test]
    fn test_standard_correction() {
        let cw = standard::encode(0b10100110);

        // All single, and a spread of double and triple, bit errors within
        // the 19 coded bits.
        for i in 1..20 {
            assert_eq!(standard::decode(cw ^ 1 << i), 0b10100110);

            for j in 1..i {
                assert_eq!(standard::decode(cw ^ 1 << i ^ 1 << j), 0b10100110);

                if j > 1 {
                    assert_eq!(standard::decode(cw ^ 1 << i ^ 1 << j ^ 2), 0b10100110);
                }
            }
        }

        // A flipped parity bit alone doesn't disturb the data.
        assert_eq!(standard::decode(cw ^ 1), 0b10100110);
    }

    #[test]
    fn test_standard_best_effort() {
        // Beyond 3 errors the decoder still yields a word without
        // signalling.
        let cw = standard::encode(0x55);
        standard::decode(cw ^ 0b1111 << 12);
        standard::decode(cw ^ 0b1011_0001_1000_0000_0000);
    }

    #[test]
    fn test_standard_bytes() {
        // Known checksums for the wire packing.
        assert_eq!(standard::encode_bytes(0), [0x00, 0x00, 0x00]);
        assert_eq!(standard::encode_bytes(1), [0x01, 0x8E, 0xB0]);
        assert_eq!(standard::encode_bytes(2), [0x02, 0x93, 0xE0]);

        for data in [0u8, 1, 2, 0x42, 0xA5, 0xFF] {
            let bytes = standard::encode_bytes(data);
            assert_eq!(standard::decode_bytes(&bytes[..]), Ok(data));

            // Single bit error in each byte.
            let mut corrupt = bytes;
            corrupt[0] ^= 0x10;
            assert_eq!(standard::decode_bytes(&corrupt[..]), Ok(data));

            let mut corrupt = bytes;
            corrupt[1] ^= 0x01;
            corrupt[2] ^= 0x80;
            assert_eq!(standard::decode_bytes(&corrupt[..]), Ok(data));
        }

        assert_eq!(
            standard::decode_bytes(&[0; 2][..]),
            Err(CodecError::InvalidLength { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_extended_checksums() {
        // Check word layouts against the published codewords.
        assert_eq!(extended::encode(0), 0);
        assert_eq!(extended::encode(0b111111), 0b111111_001100101110);
        assert_eq!(extended::encode(0b000111), 0b000111_101101000010);
        assert_eq!(extended::encode(0b111000), 0b111000_100001101100);
        assert_eq!(extended::encode(0b100001), 0b100001_111000100110);
        assert_eq!(extended::encode(0b101010), 0b101010_001000110101);
    }

    #[test]
    fn test_extended_round_trip() {
        for data in 0u16..1 << 12 {
            assert_eq!(extended::decode(extended::encode(data)), data);
        }
    }

    #[test]
    fn test_extended_correction() {
        let cw = extended::encode(0b1010_0110_0101);

        for i in 1..24 {
            assert_eq!(extended::decode(cw ^ 1 << i), 0b1010_0110_0101);

            for j in 1..i {
                assert_eq!(extended::decode(cw ^ 1 << i ^ 1 << j), 0b1010_0110_0101);

                if j > 1 {
                    assert_eq!(
                        extended::decode(cw ^ 1 << i ^ 1 << j ^ 2),
                        0b1010_0110_0101
                    );
                }
            }
        }
    }

    #[test]
    fn test_extended_buf() {
        let data = [
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC,
            0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44,
            0x55, 0x66, 0x77, 0x88, 0x99, 0xAA,
        ];

        let mut fec = [0u8; 36];
        extended::encode_buf(&data[..], &mut fec[..]).unwrap();

        // Pepper each codeword with a bit error.
        for (i, b) in fec.iter_mut().enumerate() {
            *b ^= 1 << (i % 8);
        }

        let mut out = [0u8; 18];
        extended::decode_buf(&fec[..], &mut out[..]).unwrap();

        assert_eq!(out, data);

        assert_eq!(
            extended::encode_buf(&data[..], &mut [0u8; 20][..]),
            Err(CodecError::InvalidLength { expected: 36, actual: 20 })
        );
    }
}
