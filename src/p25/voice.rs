//! Voice header and crypto control codewords carried alongside voice
//! frames.

use crate::coding::reed_solomon;
use crate::error::Result;
use crate::p25::fields::TalkGroup;

/// Bytes in a coded voice header word.
pub const HEADER_CODEWORD_BYTES: usize = reed_solomon::long::CODEWORD_BYTES;
/// Bytes in a coded crypto control word.
pub const CRYPTO_CODEWORD_BYTES: usize = reed_solomon::medium::CODEWORD_BYTES;

/// Bytes in the message indicator (crypto initialization vector.)
pub const MESSAGE_INDICATOR_BYTES: usize = 9;

/// Encryption algorithm in use on a voice channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CryptoAlgorithm {
    Accordion,
    BatonEven,
    Firefly,
    Mayfly,
    Saville,
    BatonOdd,
    Unencrypted,
    Des,
    TripleDes,
    Aes,
}

impl CryptoAlgorithm {
    /// Try to parse an algorithm from the given byte.
    pub fn from_bits(bits: u8) -> Option<CryptoAlgorithm> {
        use self::CryptoAlgorithm::*;

        match bits {
            0x00 => Some(Accordion),
            0x01 => Some(BatonEven),
            0x02 => Some(Firefly),
            0x03 => Some(Mayfly),
            0x04 => Some(Saville),
            0x41 => Some(BatonOdd),
            0x80 => Some(Unencrypted),
            0x81 => Some(Des),
            0x83 => Some(TripleDes),
            0x84 => Some(Aes),
            _ => None,
        }
    }
}

/// Header word transmitted at the start of each voice message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoiceHeader {
    /// Message indicator seeding the crypto keystream.
    pub crypto_init: [u8; MESSAGE_INDICATOR_BYTES],
    /// Manufacturer ID of the message.
    pub mf_id: u8,
    /// Encryption algorithm ID in use.
    pub alg_id: u8,
    /// Encryption key ID in use.
    pub key_id: u16,
    /// Talkgroup of the voice message.
    pub talkgroup: TalkGroup,
}

impl VoiceHeader {
    /// Try to decode a voice header from the given 27-byte codeword,
    /// correcting up to 8 symbol errors.
    pub fn decode(word: &[u8]) -> Result<VoiceHeader> {
        let (data, _err) = reed_solomon::long::decode_bytes(word)?;

        let mut crypto_init = [0; MESSAGE_INDICATOR_BYTES];
        crypto_init.copy_from_slice(&data[..MESSAGE_INDICATOR_BYTES]);

        Ok(VoiceHeader {
            crypto_init,
            mf_id: data[9],
            alg_id: data[10],
            key_id: u16::from(data[11]) << 8 | u16::from(data[12]),
            talkgroup: TalkGroup::from_bits(u16::from(data[13]) << 8 | u16::from(data[14])),
        })
    }

    /// Encode the header into its 27-byte codeword.
    pub fn encode(&self) -> Result<[u8; HEADER_CODEWORD_BYTES]> {
        let mut data = [0; reed_solomon::long::DATA_BYTES];

        data[..MESSAGE_INDICATOR_BYTES].copy_from_slice(&self.crypto_init[..]);
        data[9] = self.mf_id;
        data[10] = self.alg_id;
        data[11] = (self.key_id >> 8) as u8;
        data[12] = self.key_id as u8;

        let tg = self.talkgroup.to_bits();
        data[13] = (tg >> 8) as u8;
        data[14] = tg as u8;

        reed_solomon::long::encode_bytes(&data[..])
    }

    /// Encryption algorithm in use, if the algorithm ID is recognized.
    pub fn crypto_alg(&self) -> Option<CryptoAlgorithm> {
        CryptoAlgorithm::from_bits(self.alg_id)
    }
}

/// Crypto control word refreshing the encryption state mid-message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CryptoControl {
    /// Message indicator seeding the crypto keystream.
    pub crypto_init: [u8; MESSAGE_INDICATOR_BYTES],
    /// Encryption algorithm ID in use.
    pub alg_id: u8,
    /// Encryption key ID in use.
    pub key_id: u16,
}

impl CryptoControl {
    /// Try to decode a crypto control word from the given 18-byte codeword,
    /// correcting up to 4 symbol errors.
    pub fn decode(word: &[u8]) -> Result<CryptoControl> {
        let (data, _err) = reed_solomon::medium::decode_bytes(word)?;

        let mut crypto_init = [0; MESSAGE_INDICATOR_BYTES];
        crypto_init.copy_from_slice(&data[..MESSAGE_INDICATOR_BYTES]);

        Ok(CryptoControl {
            crypto_init,
            alg_id: data[9],
            key_id: u16::from(data[10]) << 8 | u16::from(data[11]),
        })
    }

    /// Encode the word into its 18-byte codeword.
    pub fn encode(&self) -> Result<[u8; CRYPTO_CODEWORD_BYTES]> {
        let mut data = [0; reed_solomon::medium::DATA_BYTES];

        data[..MESSAGE_INDICATOR_BYTES].copy_from_slice(&self.crypto_init[..]);
        data[9] = self.alg_id;
        data[10] = (self.key_id >> 8) as u8;
        data[11] = self.key_id as u8;

        reed_solomon::medium::encode_bytes(&data[..])
    }

    /// Encryption algorithm in use, if the algorithm ID is recognized.
    pub fn crypto_alg(&self) -> Option<CryptoAlgorithm> {
        CryptoAlgorithm::from_bits(self.alg_id)
    }
}
