//! DFSI V.24 voice and control frames.
//!
//! These frames carry digitized voice and its control records between a
//! gateway and a V.24-attached RF station. They are plain byte layouts with
//! no block FEC of their own, except for the link-control fragment inside
//! full-rate voice frames, which is wrapped in a (20, 8, 7) Golay codeword.

use tracing::warn;

use crate::coding::golay;
use crate::error::{CodecError, Result};

/// Interface control word: DIU source.
pub const ICW_DIU: u8 = 0x00;
/// Interface control word: Quantar source.
pub const ICW_QUANTAR: u8 = 0x02;

/// RSSI fields hold no valid measurement.
pub const RSSI_INVALID: u8 = 0x00;
/// RSSI fields hold a valid measurement.
pub const RSSI_VALID: u8 = 0x1A;

/// Frame came from a DIU.
pub const SOURCE_DIU: u8 = 0x00;
/// Frame came from a Quantar station.
pub const SOURCE_QUANTAR: u8 = 0x02;

/// RT/RT mode enabled.
pub const RT_ENABLED: u8 = 0x02;
/// RT/RT mode disabled.
pub const RT_DISABLED: u8 = 0x04;

/// Beginning of a voice stream.
pub const START_FLAG: u8 = 0x0C;
/// End of a voice stream.
pub const STOP_FLAG: u8 = 0x25;

/// Voice stream type value.
pub const STREAM_TYPE_VOICE: u8 = 0x0B;

/// Type of a V.24 frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FrameType {
    /// Start or end of a voice stream.
    StartOfStream,
    /// First half of the voice header.
    VoiceHeader1,
    /// Second half of the voice header.
    VoiceHeader2,
    /// Full-rate voice frame 1-18 within the two half-messages.
    Voice(u8),
}

impl FrameType {
    /// Try to parse a frame type from the given byte.
    pub fn from_bits(bits: u8) -> Option<FrameType> {
        use self::FrameType::*;

        match bits {
            0x00 => Some(StartOfStream),
            0x60 => Some(VoiceHeader1),
            0x61 => Some(VoiceHeader2),
            0x62..=0x73 => Some(Voice(bits - 0x61)),
            _ => None,
        }
    }

    /// Reduce the frame type to its wire byte.
    pub fn to_bits(self) -> u8 {
        use self::FrameType::*;

        match self {
            StartOfStream => 0x00,
            VoiceHeader1 => 0x60,
            VoiceHeader2 => 0x61,
            Voice(n) => 0x61 + n,
        }
    }
}

/// Record marking the start or end of a voice stream.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StartOfStream {
    /// RT/RT mode flag.
    pub rt_mode: u8,
    /// Whether the stream is starting or stopping.
    pub start_stop: u8,
    /// Type of the stream.
    pub stream_type: u8,
}

impl StartOfStream {
    /// Bytes in a start-of-stream frame.
    pub const LENGTH: usize = 10;

    /// Try to decode a start-of-stream frame from the given bytes.
    pub fn decode(data: &[u8]) -> Result<StartOfStream> {
        check_len(data, Self::LENGTH)?;

        Ok(StartOfStream {
            rt_mode: data[1],
            start_stop: data[2],
            stream_type: data[3],
        })
    }

    /// Encode the frame into its wire bytes.
    pub fn encode(&self) -> [u8; Self::LENGTH] {
        let mut data = [0; Self::LENGTH];

        data[0] = FrameType::StartOfStream.to_bits();
        data[1] = self.rt_mode;
        data[2] = self.start_stop;
        data[3] = self.stream_type;

        data
    }
}

/// First half of the voice header, with the start-of-stream record and
/// signal quality fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoiceHeader1 {
    /// Start-of-stream record repeated from the beginning of the stream.
    pub start_of_stream: StartOfStream,
    /// Interface control word source.
    pub icw: u8,
    /// Received signal strength.
    pub rssi: u8,
    /// Whether the RSSI fields are valid.
    pub rssi_validity: u8,
    /// Second signal strength copy.
    pub n_rssi: u8,
    /// First fragment of the header codeword, including the trailing source
    /// and check bytes.
    pub header: [u8; 21],
    /// Station the frame came from.
    pub source: u8,
}

impl VoiceHeader1 {
    /// Bytes in the frame.
    pub const LENGTH: usize = 30;
    /// Bytes in the header codeword fragment.
    pub const HCW_LENGTH: usize = 21;

    /// Try to decode a first voice header frame from the given bytes.
    pub fn decode(data: &[u8]) -> Result<VoiceHeader1> {
        check_len(data, Self::LENGTH)?;

        // The embedded start-of-stream record spans bytes 1-4.
        let mut sos = [0; StartOfStream::LENGTH];
        sos[1..5].copy_from_slice(&data[1..5]);

        let mut header = [0; Self::HCW_LENGTH];
        header.copy_from_slice(&data[9..30]);

        Ok(VoiceHeader1 {
            start_of_stream: StartOfStream::decode(&sos[..])?,
            icw: data[5],
            rssi: data[6],
            rssi_validity: data[7],
            n_rssi: data[8],
            header,
            source: data[29],
        })
    }

    /// Encode the frame into its wire bytes.
    pub fn encode(&self) -> [u8; Self::LENGTH] {
        let mut data = [0; Self::LENGTH];

        data[0] = FrameType::VoiceHeader1.to_bits();
        data[1..5].copy_from_slice(&self.start_of_stream.encode()[1..5]);
        data[5] = self.icw;
        data[6] = self.rssi;
        data[7] = self.rssi_validity;
        data[8] = self.n_rssi;
        data[9..30].copy_from_slice(&self.header[..]);

        // The source flag occupies the final header byte.
        data[Self::LENGTH - 1] = self.source;

        data
    }
}

/// Second half of the voice header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoiceHeader2 {
    /// Second fragment of the header codeword.
    pub header: [u8; 20],
    /// Station the frame came from.
    pub source: u8,
}

impl VoiceHeader2 {
    /// Bytes in the frame.
    pub const LENGTH: usize = 22;
    /// Bytes in the header codeword fragment.
    pub const HCW_LENGTH: usize = 20;

    /// Try to decode a second voice header frame from the given bytes.
    pub fn decode(data: &[u8]) -> Result<VoiceHeader2> {
        check_len(data, Self::LENGTH)?;

        let mut header = [0; Self::HCW_LENGTH];
        header.copy_from_slice(&data[1..21]);

        Ok(VoiceHeader2 {
            header,
            source: data[21],
        })
    }

    /// Encode the frame into its wire bytes.
    pub fn encode(&self) -> [u8; Self::LENGTH] {
        let mut data = [0; Self::LENGTH];

        data[0] = FrameType::VoiceHeader2.to_bits();
        data[1..21].copy_from_slice(&self.header[..]);
        data[21] = self.source;

        data
    }
}

/// Link control fragment carried inside a voice frame, protected by a
/// Golay (20, 8, 7) codeword.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AdditionalData {
    /// The protected octet.
    pub octet: u8,
    /// Trailing reserved byte.
    pub reserved: u8,
}

/// A full-rate voice frame with its IMBE payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FullRateVoice {
    /// Which of the 18 voice frames this is.
    pub frame_type: FrameType,
    /// IMBE codeword payload.
    pub imbe: [u8; 11],
    /// Link control fragment, absent on the first two frames of each
    /// half-message.
    pub additional_data: Option<AdditionalData>,
    /// Station the frame came from.
    pub source: u8,
}

impl FullRateVoice {
    /// Bytes in a frame with no additional data.
    pub const SHORT_LENGTH: usize = 13;
    /// Bytes in a frame carrying additional data.
    pub const LENGTH: usize = 17;
    /// Bytes in the IMBE payload.
    pub const IMBE_LENGTH: usize = 11;

    /// Whether the given voice frame number carries additional data.
    ///
    /// The first two frames of each half-message follow the header records
    /// and carry none.
    pub fn has_additional_data(frame: u8) -> bool {
        !matches!(frame, 1 | 2 | 10 | 11)
    }

    /// Try to decode a full-rate voice frame from the given bytes.
    pub fn decode(data: &[u8]) -> Result<FullRateVoice> {
        let frame = match data.first().map(|&b| FrameType::from_bits(b)) {
            Some(Some(FrameType::Voice(n))) => n,
            _ => return Err(CodecError::InvalidLength {
                expected: Self::SHORT_LENGTH,
                actual: data.len(),
            }),
        };

        let (len, additional) = if Self::has_additional_data(frame) {
            check_len(data, Self::LENGTH)?;

            (Self::LENGTH, Some(AdditionalData {
                octet: golay::standard::decode_bytes(&data[12..15])?,
                reserved: data[15],
            }))
        } else {
            check_len(data, Self::SHORT_LENGTH)?;
            (Self::SHORT_LENGTH, None)
        };

        let mut imbe = [0; Self::IMBE_LENGTH];
        imbe.copy_from_slice(&data[1..12]);

        Ok(FullRateVoice {
            frame_type: FrameType::Voice(frame),
            imbe,
            additional_data: additional,
            source: data[len - 1],
        })
    }

    /// Encode the frame into its wire bytes, returning the filled length
    /// within the buffer.
    pub fn encode(&self) -> ([u8; Self::LENGTH], usize) {
        let mut data = [0; Self::LENGTH];

        data[0] = self.frame_type.to_bits();
        data[1..12].copy_from_slice(&self.imbe[..]);

        let len = match self.additional_data {
            Some(extra) => {
                data[12..15].copy_from_slice(&golay::standard::encode_bytes(extra.octet)[..]);
                data[15] = extra.reserved;
                Self::LENGTH
            }
            None => Self::SHORT_LENGTH,
        };

        data[len - 1] = self.source;

        (data, len)
    }
}

/// A decoded V.24 frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DfsiFrame {
    StartOfStream(StartOfStream),
    VoiceHeader1(VoiceHeader1),
    VoiceHeader2(VoiceHeader2),
    Voice(FullRateVoice),
}

impl DfsiFrame {
    /// Try to decode a V.24 frame from the given bytes, dispatching on the
    /// frame type byte. Unknown frame types decode to `Ok(None)`.
    pub fn decode(data: &[u8]) -> Result<Option<DfsiFrame>> {
        let first = match data.first() {
            Some(&b) => b,
            None => return Err(CodecError::InvalidLength { expected: 1, actual: 0 }),
        };

        let frame_type = match FrameType::from_bits(first) {
            Some(ft) => ft,
            None => {
                warn!(frame_type = first, "unknown DFSI frame type");
                return Ok(None);
            }
        };

        Ok(Some(match frame_type {
            FrameType::StartOfStream =>
                DfsiFrame::StartOfStream(StartOfStream::decode(data)?),
            FrameType::VoiceHeader1 =>
                DfsiFrame::VoiceHeader1(VoiceHeader1::decode(data)?),
            FrameType::VoiceHeader2 =>
                DfsiFrame::VoiceHeader2(VoiceHeader2::decode(data)?),
            FrameType::Voice(..) =>
                DfsiFrame::Voice(FullRateVoice::decode(data)?),
        }))
    }
}

/// Flow-control signalling (FSC) messages exchanged over the control
/// connection.
pub mod fsc {
    use super::*;

    /// Type of an FSC message.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub enum MessageType {
        Connect,
        Disconnect,
        Heartbeat,
        Ack,
    }

    impl MessageType {
        /// Try to parse a message type from the given byte.
        pub fn from_bits(bits: u8) -> Option<MessageType> {
            use self::MessageType::*;

            match bits {
                0x00 => Some(Connect),
                0x01 => Some(Disconnect),
                0x05 => Some(Heartbeat),
                0x06 => Some(Ack),
                _ => None,
            }
        }

        /// Reduce the message type to its wire byte.
        pub fn to_bits(self) -> u8 {
            use self::MessageType::*;

            match self {
                Connect => 0x00,
                Disconnect => 0x01,
                Heartbeat => 0x05,
                Ack => 0x06,
            }
        }
    }

    /// Common message header: `[messageId] [version] [correlationTag]`.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct FscMessage {
        /// Type of the message.
        pub message_id: MessageType,
        /// Message format version.
        pub version: u8,
        /// Tag correlating a response with its request.
        pub correlation_tag: u8,
    }

    impl FscMessage {
        /// Bytes in the message header.
        pub const LENGTH: usize = 3;

        /// Try to decode a message header from the given bytes. An unknown
        /// message type decodes to `Ok(None)`.
        pub fn decode(data: &[u8]) -> Result<Option<FscMessage>> {
            check_len(data, Self::LENGTH)?;

            let message_id = match MessageType::from_bits(data[0]) {
                Some(id) => id,
                None => {
                    warn!(message_id = data[0], "unknown FSC message type");
                    return Ok(None);
                }
            };

            Ok(Some(FscMessage {
                message_id,
                version: data[1],
                correlation_tag: data[2],
            }))
        }

        /// Encode the header into its wire bytes.
        pub fn encode(&self) -> [u8; Self::LENGTH] {
            [self.message_id.to_bits(), self.version, self.correlation_tag]
        }
    }

    /// Request to open a voice conveyance session.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct FscConnect {
        /// Common message header.
        pub header: FscMessage,
        /// Base RTP port for the voice conveyance channel.
        pub vc_base_port: u16,
        /// SSRC identifying the voice stream.
        pub vc_ssrc: u32,
        /// Requested heartbeat period in seconds.
        pub heartbeat_period: u8,
        /// Number of voice channels requested.
        pub num_channels: u8,
    }

    impl FscConnect {
        /// Bytes in a connect message.
        pub const LENGTH: usize = 11;

        /// Try to decode a connect message from the given bytes. The caller
        /// is expected to have already dispatched on the message type byte.
        pub fn decode(data: &[u8]) -> Result<FscConnect> {
            check_len(data, Self::LENGTH)?;
            debug_assert_eq!(data[0], MessageType::Connect.to_bits());

            Ok(FscConnect {
                header: FscMessage {
                    message_id: MessageType::Connect,
                    version: data[1],
                    correlation_tag: data[2],
                },
                vc_base_port: u16::from(data[3]) << 8 | u16::from(data[4]),
                vc_ssrc: u32::from(data[5]) << 24 | u32::from(data[6]) << 16
                    | u32::from(data[7]) << 8 | u32::from(data[8]),
                heartbeat_period: data[9],
                num_channels: data[10],
            })
        }

        /// Encode the message into its wire bytes.
        pub fn encode(&self) -> [u8; Self::LENGTH] {
            let mut data = [0; Self::LENGTH];

            data[..FscMessage::LENGTH].copy_from_slice(&self.header.encode()[..]);
            data[3] = (self.vc_base_port >> 8) as u8;
            data[4] = self.vc_base_port as u8;
            data[5] = (self.vc_ssrc >> 24) as u8;
            data[6] = (self.vc_ssrc >> 16) as u8;
            data[7] = (self.vc_ssrc >> 8) as u8;
            data[8] = self.vc_ssrc as u8;
            data[9] = self.heartbeat_period;
            data[10] = self.num_channels;

            data
        }
    }

    /// A decoded FSC message.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum FscFrame {
        Connect(FscConnect),
        Disconnect(FscMessage),
        Heartbeat(FscMessage),
        Ack(FscMessage),
    }

    impl FscFrame {
        /// Try to decode an FSC message from the given bytes, dispatching on
        /// the message type byte. Unknown message types decode to
        /// `Ok(None)`.
        pub fn decode(data: &[u8]) -> Result<Option<FscFrame>> {
            let header = match FscMessage::decode(data)? {
                Some(header) => header,
                None => return Ok(None),
            };

            Ok(Some(match header.message_id {
                MessageType::Connect => FscFrame::Connect(FscConnect::decode(data)?),
                MessageType::Disconnect => FscFrame::Disconnect(header),
                MessageType::Heartbeat => FscFrame::Heartbeat(header),
                MessageType::Ack => FscFrame::Ack(header),
            }))
        }
    }

    /// Response to a connect request.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct FscConnectResponse {
        /// Message format version.
        pub version: u8,
        /// Base RTP port accepted for the voice conveyance channel.
        pub vc_base_port: u16,
    }

    impl FscConnectResponse {
        /// Bytes in a connect response.
        pub const LENGTH: usize = 3;

        /// Try to decode a connect response from the given bytes.
        pub fn decode(data: &[u8]) -> Result<FscConnectResponse> {
            check_len(data, Self::LENGTH)?;

            Ok(FscConnectResponse {
                version: data[0],
                vc_base_port: u16::from(data[1]) << 8 | u16::from(data[2]),
            })
        }

        /// Encode the response into its wire bytes.
        pub fn encode(&self) -> [u8; Self::LENGTH] {
            [
                self.version,
                (self.vc_base_port >> 8) as u8,
                self.vc_base_port as u8,
            ]
        }
    }
}

/// Verify a frame buffer has at least the expected length.
fn check_len(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() >= expected {
        Ok(())
    } else {
        Err(CodecError::InvalidLength { expected, actual: buf.len() })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_type_bits() {
        for bits in 0..=255 {
            if let Some(ft) = FrameType::from_bits(bits) {
                assert_eq!(ft.to_bits(), bits);
            }
        }

        assert_eq!(FrameType::from_bits(0x62), Some(FrameType::Voice(1)));
        assert_eq!(FrameType::from_bits(0x6A), Some(FrameType::Voice(9)));
        assert_eq!(FrameType::from_bits(0x73), Some(FrameType::Voice(18)));
        assert_eq!(FrameType::from_bits(0x74), None);
    }

    #[test]
    fn test_start_of_stream_round_trip() {
        let frame = StartOfStream {
            rt_mode: RT_DISABLED,
            start_stop: START_FLAG,
            stream_type: STREAM_TYPE_VOICE,
        };

        let bytes = frame.encode();
        assert_eq!(bytes[0], 0x00);
        assert_eq!(StartOfStream::decode(&bytes[..]).unwrap(), frame);
    }

    #[test]
    fn test_voice_header1_round_trip() {
        let mut header = [0; VoiceHeader1::HCW_LENGTH];

        for (i, b) in header.iter_mut().enumerate() {
            *b = i as u8 ^ 0x33;
        }

        // The last header byte carries the source flag.
        header[VoiceHeader1::HCW_LENGTH - 1] = SOURCE_QUANTAR;

        let frame = VoiceHeader1 {
            start_of_stream: StartOfStream {
                rt_mode: RT_ENABLED,
                start_stop: START_FLAG,
                stream_type: STREAM_TYPE_VOICE,
            },
            icw: ICW_QUANTAR,
            rssi: 0x5F,
            rssi_validity: RSSI_VALID,
            n_rssi: 0x5E,
            header,
            source: SOURCE_QUANTAR,
        };

        let bytes = frame.encode();

        assert_eq!(bytes[0], 0x60);
        assert_eq!(bytes[29], SOURCE_QUANTAR);

        match DfsiFrame::decode(&bytes[..]).unwrap() {
            Some(DfsiFrame::VoiceHeader1(out)) => assert_eq!(out, frame),
            other => panic!("bad dispatch: {:?}", other),
        }
    }

    #[test]
    fn test_voice_header2_round_trip() {
        let frame = VoiceHeader2 {
            header: [0xA5; VoiceHeader2::HCW_LENGTH],
            source: SOURCE_DIU,
        };

        let bytes = frame.encode();

        match DfsiFrame::decode(&bytes[..]).unwrap() {
            Some(DfsiFrame::VoiceHeader2(out)) => assert_eq!(out, frame),
            other => panic!("bad dispatch: {:?}", other),
        }
    }

    #[test]
    fn test_full_rate_voice_round_trip() {
        // A frame carrying a protected link control octet.
        let frame = FullRateVoice {
            frame_type: FrameType::Voice(3),
            imbe: [0x11; FullRateVoice::IMBE_LENGTH],
            additional_data: Some(AdditionalData { octet: 0xC9, reserved: 0 }),
            source: SOURCE_DIU,
        };

        let (bytes, len) = frame.encode();
        assert_eq!(len, FullRateVoice::LENGTH);

        let out = FullRateVoice::decode(&bytes[..len]).unwrap();
        assert_eq!(out, frame);

        // A bit error inside the Golay codeword still recovers the octet.
        let mut corrupt = bytes;
        corrupt[13] ^= 0x08;
        let out = FullRateVoice::decode(&corrupt[..len]).unwrap();
        assert_eq!(out.additional_data, Some(AdditionalData { octet: 0xC9, reserved: 0 }));

        // The first frame of a half-message carries no additional data.
        let frame = FullRateVoice {
            frame_type: FrameType::Voice(10),
            imbe: [0x22; FullRateVoice::IMBE_LENGTH],
            additional_data: None,
            source: SOURCE_QUANTAR,
        };

        let (bytes, len) = frame.encode();
        assert_eq!(len, FullRateVoice::SHORT_LENGTH);
        assert_eq!(FullRateVoice::decode(&bytes[..len]).unwrap(), frame);
    }

    #[test]
    fn test_unknown_frame_type_dropped() {
        assert_eq!(DfsiFrame::decode(&[0xFF; 4][..]).unwrap(), None);
    }

    #[test]
    fn test_fsc_round_trips() {
        let connect = fsc::FscConnect {
            header: fsc::FscMessage {
                message_id: fsc::MessageType::Connect,
                version: 1,
                correlation_tag: 0x42,
            },
            vc_base_port: 25_000,
            vc_ssrc: 0xDEADBEEF,
            heartbeat_period: 5,
            num_channels: 1,
        };

        let bytes = connect.encode();
        assert_eq!(fsc::FscConnect::decode(&bytes[..]).unwrap(), connect);
        assert_eq!(
            fsc::FscFrame::decode(&bytes[..]).unwrap(),
            Some(fsc::FscFrame::Connect(connect))
        );

        let heartbeat = fsc::FscMessage {
            message_id: fsc::MessageType::Heartbeat,
            version: 1,
            correlation_tag: 0x43,
        };

        let bytes = heartbeat.encode();
        assert_eq!(fsc::FscMessage::decode(&bytes[..]).unwrap(), Some(heartbeat));

        let response = fsc::FscConnectResponse {
            version: 1,
            vc_base_port: 25_000,
        };

        let bytes = response.encode();
        assert_eq!(fsc::FscConnectResponse::decode(&bytes[..]).unwrap(), response);

        // Unknown message types are dropped.
        assert_eq!(fsc::FscMessage::decode(&[0x7F, 1, 2][..]).unwrap(), None);
    }
}
