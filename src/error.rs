//! Errors reported by the codec and frame layers.

use thiserror::Error;

/// Errors that may occur while decoding or encoding air-interface data.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum CodecError {
    /// A Reed-Solomon codeword contained more symbol errors than the code
    /// can correct. The enclosing frame must be discarded.
    #[error("reed-solomon codeword is uncorrectable")]
    RsUncorrectable,

    /// A checksummed block failed CRC verification after error correction.
    #[error("crc mismatch: computed {computed:#06x}, received {received:#06x}")]
    CrcMismatch {
        /// Checksum calculated over the received block.
        computed: u16,
        /// Checksum carried inside the received block.
        received: u16,
    },

    /// A buffer didn't match the standard-defined length for its codeword.
    #[error("invalid buffer length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Byte length the standard defines for this codeword.
        expected: usize,
        /// Byte length actually supplied.
        actual: usize,
    },

    /// The message is defined for one link direction only and has no
    /// transmit layout.
    #[error("message direction not supported for encoding")]
    UnsupportedDirection,
}

/// Standard result alias using [`CodecError`].
pub type Result<T> = std::result::Result<T, CodecError>;
