//! The 12 and 16-bit CRCs that guard trunking and control-channel blocks.
//!
//! This implementation uses plain long division, taking advantage of the
//! short lengths involved to buffer the division in a single 64-bit word.

use std::marker::PhantomData;

/// 12-bit CRC calculator for control-channel blocks.
pub type Crc12 = Crc<Crc12Params>;

/// 16-bit CRC-CCITT calculator for trunking signalling blocks.
pub type Crc16 = Crc<Crc16Params>;

pub trait CrcParams {
    /// Generator polynomial, with the MSB as the coefficient of highest
    /// degree.
    fn gen() -> u64;

    /// Inversion polynomial applied to the final remainder.
    fn inv() -> u64;

    /// Amount to left-shift the message (multiply by x<sup>i</sup>) before
    /// the final division.
    fn shift() -> usize;

    /// Verify the parameters are well-formed.
    fn validate() {
        // Prevent division by zero.
        assert!(Self::gen() != 0);
        // The generator must be shiftable by up to a byte, since that's the
        // most bits fed in per division step.
        assert!(64 - Self::gen().leading_zeros() - 1 < 64 - 8);
    }
}

/// Params for the 12-bit CRC: x<sup>12</sup> + x<sup>11</sup> +
/// x<sup>3</sup> + x<sup>2</sup> + x + 1.
pub struct Crc12Params;

impl CrcParams for Crc12Params {
    fn gen() -> u64 { 0b1100000001111 }
    fn inv() -> u64 { 0xFFF }
    fn shift() -> usize { 12 }
}

/// Params for the 16-bit CRC: x<sup>16</sup> + x<sup>12</sup> +
/// x<sup>5</sup> + 1.
pub struct Crc16Params;

impl CrcParams for Crc16Params {
    fn gen() -> u64 { 0b10001000000100001 }
    fn inv() -> u64 { 0xFFFF }
    fn shift() -> usize { 16 }
}

/// CRC calculator using long division.
pub struct Crc<P: CrcParams> {
    params: PhantomData<P>,
    /// Current remainder word.
    word: u64,
}

impl<P: CrcParams> Crc<P> {
    /// Construct a new `Crc` with empty state.
    pub fn new() -> Crc<P> {
        Crc {
            params: PhantomData,
            word: 0,
        }
    }

    /// Feed in the given byte stream.
    pub fn feed_bytes<T: IntoIterator<Item = u8>>(mut self, bytes: T) -> Self {
        for byte in bytes {
            self.word = self.word << 8 | u64::from(byte);
            self.div();
        }

        self
    }

    /// Finish the calculation and return the resulting CRC in the low bits.
    pub fn finish(mut self) -> u64 {
        for _ in 0..P::shift() {
            self.word <<= 1;
            self.div();
        }

        self.word ^ P::inv()
    }

    /// Reduce the current word modulo the generator.
    fn div(&mut self) {
        while self.word != 0 {
            let diff = degree(self.word) as i32 - degree(P::gen()) as i32;

            // Division ends once the divisor outranks the dividend.
            if diff < 0 {
                break;
            }

            self.word ^= P::gen() << diff;
        }
    }
}

impl<P: CrcParams> Default for Crc<P> {
    fn default() -> Self {
        Crc::new()
    }
}

/// Calculate the degree of the polynomial represented by x, where x > 0.
fn degree(x: u64) -> u32 {
    64 - 1 - x.leading_zeros()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validate_params() {
        Crc12Params::validate();
        Crc16Params::validate();
    }

    #[test]
    fn test_known_values() {
        // An all-zero message divides evenly, leaving only the inversion.
        assert_eq!(Crc16::new().feed_bytes([0; 10].iter().cloned()).finish(), 0xFFFF);
        assert_eq!(Crc12::new().feed_bytes([0; 9].iter().cloned()).finish(), 0xFFF);

        // x^16 mod g(x) for the single byte 0x01.
        assert_eq!(Crc16::new().feed_bytes([0x01].iter().cloned()).finish(), 0x1021 ^ 0xFFFF);
        // x^12 mod g(x) likewise.
        assert_eq!(Crc12::new().feed_bytes([0x01].iter().cloned()).finish(), 0x80F ^ 0xFFF);
    }

    #[test]
    fn test_distinguishes_payloads() {
        let a = Crc16::new().feed_bytes([0xDE, 0xAD, 0xBE, 0xEF].iter().cloned()).finish();
        let b = Crc16::new().feed_bytes([0xDE, 0xAD, 0xBE, 0xEE].iter().cloned()).finish();
        let c = Crc16::new().feed_bytes([0xDE, 0xAD, 0xBF, 0xEF].iter().cloned()).finish();

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_check_constant() {
        // Appending a message's CRC yields a residue independent of the
        // message, which is how received blocks are verified.
        let residue = |msg: &[u8]| {
            let crc = Crc16::new().feed_bytes(msg.iter().cloned()).finish() as u16;

            Crc16::new()
                .feed_bytes(msg.iter().cloned())
                .feed_bytes(crc.to_be_bytes().iter().cloned())
                .finish()
        };

        assert_eq!(residue(&[1, 2, 3]), residue(&[0xFF; 8]));
        assert_eq!(residue(&[1, 2, 3]), residue(&[]));
    }
}
