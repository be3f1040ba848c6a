//! Terminator data unit link control (TDULC) messages.
//!
//! A TDULC carries a 9-byte link control word: an opcode byte (low 6 bits)
//! and a 64-bit payload value. On the wire the word is protected twice over:
//! the word plus Reed-Solomon (24, 12, 13) parity forms an 18-byte block,
//! and each 12-bit group of that block is wrapped in an extended Golay
//! codeword, giving a 36-byte coded block.

use tracing::warn;

use crate::bits;
use crate::coding::{golay, reed_solomon};
use crate::error::{CodecError, Result};
use crate::layout::frame_layout;
use crate::p25::fields::TalkGroup;

/// Bytes in the Reed-Solomon block: link control word plus parity.
pub const TDULC_BYTES: usize = 18;
/// Bytes in the Golay-coded wire block.
pub const TDULC_FEC_BYTES: usize = 36;

/// Bytes in the bare link control word.
const LC_BYTES: usize = 9;

/// Type of a link control payload.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinkControlOpcode {
    GroupVoiceUser,
    GroupVoiceUpdate,
    UnitVoiceUser,
    GroupVoiceUpdateExplicit,
    UnitCallRequest,
    PhoneVoiceUser,
    PhoneAlert,
    CallTermination,
    GroupAffiliationQuery,
    UnitRegistrationCommand,
    UnitAuthenticationCommand,
    UnitStatusRequest,
    UnitStatusUpdate,
    UnitShortMessage,
    UnitCallAlert,
    ExtendedFunction,
    ChannelParamsUpdate,
    ChannelParamsExplicit,
    SystemServiceBroadcast,
    AltControlChannel,
    AdjacentSite,
    RfssStatusBroadcast,
    NetworkStatusBroadcast,
    ProtectionParamBroadcast,
    AltControlChannelExplicit,
    AdjacentSiteExplicit,
    RfssStatusExplicit,
    NetworkStatusExplicit,
}

impl LinkControlOpcode {
    /// Try to parse an opcode from the given 6 bits.
    pub fn from_bits(bits: u8) -> Option<LinkControlOpcode> {
        use self::LinkControlOpcode::*;

        assert!(bits >> 6 == 0);

        match bits {
            0b000000 => Some(GroupVoiceUser),
            0b000010 => Some(GroupVoiceUpdate),
            0b000011 => Some(UnitVoiceUser),
            0b000100 => Some(GroupVoiceUpdateExplicit),
            0b000101 => Some(UnitCallRequest),
            0b000110 => Some(PhoneVoiceUser),
            0b000111 => Some(PhoneAlert),
            0b001111 => Some(CallTermination),
            0b010000 => Some(GroupAffiliationQuery),
            0b010001 => Some(UnitRegistrationCommand),
            0b010010 => Some(UnitAuthenticationCommand),
            0b010011 => Some(UnitStatusRequest),
            0b010100 => Some(UnitStatusUpdate),
            0b010101 => Some(UnitShortMessage),
            0b010110 => Some(UnitCallAlert),
            0b010111 => Some(ExtendedFunction),
            0b011000 => Some(ChannelParamsUpdate),
            0b011001 => Some(ChannelParamsExplicit),
            0b100000 => Some(SystemServiceBroadcast),
            0b100001 => Some(AltControlChannel),
            0b100010 => Some(AdjacentSite),
            0b100011 => Some(RfssStatusBroadcast),
            0b100100 => Some(NetworkStatusBroadcast),
            0b100101 => Some(ProtectionParamBroadcast),
            0b100110 => Some(AltControlChannelExplicit),
            0b100111 => Some(AdjacentSiteExplicit),
            0b101000 => Some(RfssStatusExplicit),
            0b101001 => Some(NetworkStatusExplicit),
            _ => None,
        }
    }

    /// Reduce the opcode to its 6 wire bits.
    pub fn to_bits(self) -> u8 {
        use self::LinkControlOpcode::*;

        match self {
            GroupVoiceUser => 0b000000,
            GroupVoiceUpdate => 0b000010,
            UnitVoiceUser => 0b000011,
            GroupVoiceUpdateExplicit => 0b000100,
            UnitCallRequest => 0b000101,
            PhoneVoiceUser => 0b000110,
            PhoneAlert => 0b000111,
            CallTermination => 0b001111,
            GroupAffiliationQuery => 0b010000,
            UnitRegistrationCommand => 0b010001,
            UnitAuthenticationCommand => 0b010010,
            UnitStatusRequest => 0b010011,
            UnitStatusUpdate => 0b010100,
            UnitShortMessage => 0b010101,
            UnitCallAlert => 0b010110,
            ExtendedFunction => 0b010111,
            ChannelParamsUpdate => 0b011000,
            ChannelParamsExplicit => 0b011001,
            SystemServiceBroadcast => 0b100000,
            AltControlChannel => 0b100001,
            AdjacentSite => 0b100010,
            RfssStatusBroadcast => 0b100011,
            NetworkStatusBroadcast => 0b100100,
            ProtectionParamBroadcast => 0b100101,
            AltControlChannelExplicit => 0b100110,
            AdjacentSiteExplicit => 0b100111,
            RfssStatusExplicit => 0b101000,
            NetworkStatusExplicit => 0b101001,
        }
    }
}

frame_layout! {
    /// Identity of the unit transmitting on the current talkgroup traffic
    /// channel.
    pub struct GroupVoiceUser {
        /// Manufacturer ID of the message.
        pub mf_id: u8 = 8 @ 56,
        /// Whether the call is in emergency mode.
        pub emergency: bool = 1 @ 55,
        /// Whether the call is encrypted.
        pub encrypted: bool = 1 @ 54,
        /// Priority assigned to the call.
        pub priority: u8 = 3 @ 48,
        /// Resident talkgroup of the traffic channel.
        pub talkgroup: TalkGroup = 16 @ 24,
        /// Unit currently transmitting.
        pub src_unit: u32 = 24 @ 0,
    }
}

frame_layout! {
    /// Identity of the units on the current unit-to-unit traffic channel.
    pub struct UnitVoiceUser {
        pub mf_id: u8 = 8 @ 56,
        pub emergency: bool = 1 @ 55,
        pub encrypted: bool = 1 @ 54,
        pub priority: u8 = 3 @ 48,
        pub dst_unit: u32 = 24 @ 24,
        pub src_unit: u32 = 24 @ 0,
    }
}

frame_layout! {
    /// Identity of the unit in the current phone interconnect call.
    pub struct PhoneVoiceUser {
        pub mf_id: u8 = 8 @ 56,
        pub emergency: bool = 1 @ 55,
        pub encrypted: bool = 1 @ 54,
        pub priority: u8 = 3 @ 48,
        /// Remaining call time in units of 100ms.
        pub call_timer: u16 = 16 @ 24,
        /// Unit participating in the call.
        pub unit: u32 = 24 @ 0,
    }
}

frame_layout! {
    /// Termination or cancellation of the current call.
    pub struct CallTermination {
        /// Unit that ended the call.
        pub src_unit: u32 = 24 @ 0,
    }
}

/// A decoded terminator link control message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TdulcFrame {
    GroupVoiceUser(GroupVoiceUser),
    UnitVoiceUser(UnitVoiceUser),
    PhoneVoiceUser(PhoneVoiceUser),
    CallTermination(CallTermination),
}

impl TdulcFrame {
    /// Try to decode a TDULC from the given 36-byte coded block.
    ///
    /// The Golay layer corrects best-effort, the Reed-Solomon layer reports
    /// an explicit error on an unrecoverable word, and a recovered word with
    /// an unknown opcode decodes to `Ok(None)`.
    pub fn decode(data: &[u8]) -> Result<Option<TdulcFrame>> {
        use self::LinkControlOpcode::*;

        if data.len() < TDULC_FEC_BYTES {
            return Err(CodecError::InvalidLength {
                expected: TDULC_FEC_BYTES,
                actual: data.len(),
            });
        }

        let mut rs = [0; TDULC_BYTES];
        golay::extended::decode_buf(&data[..TDULC_FEC_BYTES], &mut rs[..])?;

        let (lc, _err) = reed_solomon::short::decode_bytes(&rs[..])?;

        let lco = lc[0] & 0x3F;
        let value = bits::to_u64(&lc[1..LC_BYTES]);

        let opcode = match LinkControlOpcode::from_bits(lco) {
            Some(opcode) => opcode,
            None => {
                warn!(lco, "unknown TDULC opcode");
                return Ok(None);
            }
        };

        Ok(Some(match opcode {
            GroupVoiceUser =>
                TdulcFrame::GroupVoiceUser(self::GroupVoiceUser::from_value(value)),
            UnitVoiceUser =>
                TdulcFrame::UnitVoiceUser(self::UnitVoiceUser::from_value(value)),
            PhoneVoiceUser =>
                TdulcFrame::PhoneVoiceUser(self::PhoneVoiceUser::from_value(value)),
            CallTermination =>
                TdulcFrame::CallTermination(self::CallTermination::from_value(value)),
            other => {
                warn!(lco = other.to_bits(), "TDULC opcode has no defined layout");
                return Ok(None);
            }
        }))
    }

    /// Encode the message into its 36-byte coded block.
    pub fn encode(&self) -> Result<[u8; TDULC_FEC_BYTES]> {
        let (opcode, value) = self.parts();

        let mut lc = [0; LC_BYTES];
        lc[0] = opcode.to_bits();
        bits::from_u64(value, &mut lc[1..LC_BYTES]);

        let rs = reed_solomon::short::encode_bytes(&lc[..])?;

        let mut fec = [0; TDULC_FEC_BYTES];
        golay::extended::encode_buf(&rs[..], &mut fec[..])?;

        Ok(fec)
    }

    /// Opcode and payload value for the message.
    fn parts(&self) -> (LinkControlOpcode, u64) {
        use self::TdulcFrame::*;

        match self {
            GroupVoiceUser(f) => (LinkControlOpcode::GroupVoiceUser, f.to_value()),
            UnitVoiceUser(f) => (LinkControlOpcode::UnitVoiceUser, f.to_value()),
            PhoneVoiceUser(f) => (LinkControlOpcode::PhoneVoiceUser, f.to_value()),
            CallTermination(f) => (LinkControlOpcode::CallTermination, f.to_value()),
        }
    }
}

impl std::fmt::Display for TdulcFrame {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::TdulcFrame::*;

        fmt.write_str(match self {
            GroupVoiceUser(..) => "LC_GROUP (Group Voice Channel User)",
            UnitVoiceUser(..) => "LC_PRIVATE (Unit-to-Unit Voice Channel User)",
            PhoneVoiceUser(..) => "LC_TEL_INT (Telephone Interconnect Voice Channel User)",
            CallTermination(..) => "LC_CALL_TERM (Call Termination)",
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Build a coded block directly from an opcode value and payload.
    fn build_block(lco: u8, value: u64) -> [u8; TDULC_FEC_BYTES] {
        let mut lc = [0; LC_BYTES];
        lc[0] = lco;
        bits::from_u64(value, &mut lc[1..LC_BYTES]);

        let rs = reed_solomon::short::encode_bytes(&lc[..]).unwrap();

        let mut fec = [0; TDULC_FEC_BYTES];
        golay::extended::encode_buf(&rs[..], &mut fec[..]).unwrap();

        fec
    }

    #[test]
    fn test_opcode_bits() {
        for bits in 0..64 {
            if let Some(opcode) = LinkControlOpcode::from_bits(bits) {
                assert_eq!(opcode.to_bits(), bits);
            }
        }

        assert_eq!(LinkControlOpcode::from_bits(0b000000),
            Some(LinkControlOpcode::GroupVoiceUser));
        assert_eq!(LinkControlOpcode::from_bits(0b001111),
            Some(LinkControlOpcode::CallTermination));
        assert_eq!(LinkControlOpcode::from_bits(0b111111), None);
    }

    #[test]
    fn test_group_voice_round_trip() {
        let frame = TdulcFrame::GroupVoiceUser(GroupVoiceUser {
            mf_id: 0x00,
            emergency: false,
            encrypted: true,
            priority: 3,
            talkgroup: TalkGroup::Other(0x1234),
            src_unit: 0xABCDEF,
        });

        let fec = frame.encode().unwrap();
        assert_eq!(fec.len(), TDULC_FEC_BYTES);

        match TdulcFrame::decode(&fec[..]).unwrap() {
            Some(TdulcFrame::GroupVoiceUser(lc)) => {
                assert_eq!(lc.mf_id, 0x00);
                assert!(!lc.emergency);
                assert!(lc.encrypted);
                assert_eq!(lc.priority, 3);
                assert_eq!(lc.talkgroup, TalkGroup::Other(0x1234));
                assert_eq!(lc.src_unit, 0xABCDEF);
            }
            other => panic!("bad dispatch: {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_with_errors() {
        let frame = TdulcFrame::UnitVoiceUser(UnitVoiceUser {
            mf_id: 0x00,
            emergency: true,
            encrypted: false,
            priority: 7,
            dst_unit: 0x123456,
            src_unit: 0x654321,
        });

        let mut fec = frame.encode().unwrap();

        // One bit error in each Golay codeword, and the Reed-Solomon layer
        // sees a clean word underneath.
        for i in 0..12 {
            fec[i * 3] ^= 0x04;
        }

        assert_eq!(TdulcFrame::decode(&fec[..]).unwrap(), Some(frame));
    }

    #[test]
    fn test_other_frames_round_trip() {
        let frames = [
            TdulcFrame::PhoneVoiceUser(PhoneVoiceUser {
                mf_id: 0,
                emergency: false,
                encrypted: false,
                priority: 4,
                call_timer: 0x0258,
                unit: 0x00C0FE,
            }),
            TdulcFrame::CallTermination(CallTermination { src_unit: 0xABC123 }),
        ];

        for frame in frames {
            let fec = frame.encode().unwrap();
            assert_eq!(TdulcFrame::decode(&fec[..]).unwrap(), Some(frame));
        }
    }

    #[test]
    fn test_unknown_opcode_dropped() {
        let fec = build_block(0b111111, 0x1122_3344_5566_7788);
        assert_eq!(TdulcFrame::decode(&fec[..]).unwrap(), None);

        // Recognized opcode, but no layout defined for it.
        let fec = build_block(0b100010, 0);
        assert_eq!(TdulcFrame::decode(&fec[..]).unwrap(), None);
    }

    #[test]
    fn test_uncorrectable_reported() {
        let frame = TdulcFrame::CallTermination(CallTermination { src_unit: 1 });
        let mut fec = frame.encode().unwrap();

        // Trash over half the block: far beyond what either layer can
        // repair.
        for b in fec[..20].iter_mut() {
            *b = !*b;
        }

        assert_eq!(TdulcFrame::decode(&fec[..]), Err(CodecError::RsUncorrectable));
    }

    #[test]
    fn test_length_guard() {
        assert_eq!(
            TdulcFrame::decode(&[0; 35][..]),
            Err(CodecError::InvalidLength { expected: 36, actual: 35 })
        );
    }
}
