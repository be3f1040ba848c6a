//! NXDN control-channel (RCCH) messages.
//!
//! An RCCH block is 11 bytes: a message type byte (low 6 bits), a 64-bit
//! payload value, and a 12-bit CRC over the first 9 bytes. The block arrives
//! here already convolutionally decoded and deinterleaved by the framing
//! layer.

use tracing::warn;

use crate::bits;
use crate::coding::crc::Crc12;
use crate::error::{CodecError, Result};
use crate::layout::frame_layout;
use crate::nxdn::site::SiteData;

/// Bytes in an RCCH block.
pub const RCCH_BYTES: usize = 11;

/// Type of a control-channel message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageType {
    VoiceCallConnect,
    VoiceCallAssign,
    Disconnect,
    SiteInfo,
    ServiceInfo,
    ControlChannelInfo,
    AdjacentSiteInfo,
    Registration,
    GroupRegistration,
    ProprietaryForm,
}

impl MessageType {
    /// Try to parse a message type from the given 6 bits.
    pub fn from_bits(bits: u8) -> Option<MessageType> {
        use self::MessageType::*;

        assert!(bits >> 6 == 0);

        match bits {
            0x03 => Some(VoiceCallConnect),
            0x04 => Some(VoiceCallAssign),
            0x11 => Some(Disconnect),
            0x18 => Some(SiteInfo),
            0x19 => Some(ServiceInfo),
            0x1A => Some(ControlChannelInfo),
            0x1B => Some(AdjacentSiteInfo),
            0x20 => Some(Registration),
            0x24 => Some(GroupRegistration),
            0x3F => Some(ProprietaryForm),
            _ => None,
        }
    }

    /// Reduce the message type to its 6 wire bits.
    pub fn to_bits(self) -> u8 {
        use self::MessageType::*;

        match self {
            VoiceCallConnect => 0x03,
            VoiceCallAssign => 0x04,
            Disconnect => 0x11,
            SiteInfo => 0x18,
            ServiceInfo => 0x19,
            ControlChannelInfo => 0x1A,
            AdjacentSiteInfo => 0x1B,
            Registration => 0x20,
            GroupRegistration => 0x24,
            ProprietaryForm => 0x3F,
        }
    }
}

frame_layout! {
    /// Request or response connecting a voice call between subscribers.
    pub struct VoiceCallConnect {
        /// Whether the call is in emergency mode.
        pub emergency: bool = 1 @ 63,
        /// Whether the call is encrypted.
        pub encrypted: bool = 1 @ 62,
        /// Priority assigned to the call.
        pub priority: u8 = 3 @ 56,
        /// Type of the requested call.
        pub call_type: u8 = 3 @ 53,
        /// Requesting subscriber.
        pub src_id: u16 = 16 @ 32,
        /// Called subscriber or group.
        pub dst_id: u16 = 16 @ 16,
    }
}

frame_layout! {
    /// Assignment of a traffic channel to a connected call.
    pub struct VoiceCallAssign {
        /// Type of the assigned call.
        pub call_type: u8 = 3 @ 53,
        /// Calling subscriber.
        pub src_id: u16 = 16 @ 32,
        /// Called subscriber or group.
        pub dst_id: u16 = 16 @ 16,
        /// Assigned traffic channel number.
        pub channel_no: u16 = 10 @ 4,
    }
}

frame_layout! {
    /// Broadcast of the transmitting site's identity.
    pub struct SiteInfo {
        /// Location ID of the site.
        pub loc_id: u32 = 24 @ 40,
        /// Channel ID of the control channel.
        pub channel_id: u8 = 4 @ 36,
        /// Channel number of the control channel.
        pub channel_no: u16 = 10 @ 26,
        /// First site information byte.
        pub site_info1: u8 = 8 @ 18,
        /// Second site information byte.
        pub site_info2: u8 = 8 @ 10,
    }
}

frame_layout! {
    /// Broadcast of the services available at the site.
    pub struct ServiceInfo {
        /// Location ID of the site.
        pub loc_id: u32 = 24 @ 40,
        /// Available service flags.
        pub service_info: u16 = 16 @ 24,
        /// Service restriction flags.
        pub restriction_info: u16 = 16 @ 8,
    }
}

frame_layout! {
    /// A subscriber's location registration exchange.
    pub struct Registration {
        /// Registration option flags.
        pub reg_option: u8 = 8 @ 56,
        /// Registering subscriber.
        pub src_id: u16 = 16 @ 40,
        /// Group the subscriber selects.
        pub dst_id: u16 = 16 @ 24,
        /// Result cause value.
        pub cause: u8 = 8 @ 16,
    }
}

frame_layout! {
    /// A subscriber's group registration exchange.
    pub struct GroupRegistration {
        /// Group registration option flags.
        pub grp_reg_option: u8 = 8 @ 56,
        /// Registering subscriber.
        pub src_id: u16 = 16 @ 40,
        /// Group being registered.
        pub dst_id: u16 = 16 @ 24,
        /// Result cause value.
        pub cause: u8 = 8 @ 16,
    }
}

impl SiteInfo {
    /// Build the broadcast from the given site identity.
    pub fn from_site(site: &SiteData) -> SiteInfo {
        SiteInfo {
            loc_id: site.loc_id(),
            channel_id: site.channel_id(),
            channel_no: site.channel_no(),
            site_info1: site.site_info1(),
            site_info2: site.site_info2(),
        }
    }

    /// Rebuild site identity from the broadcast fields, reapplying the
    /// standard range clamps.
    pub fn site_data(&self) -> SiteData {
        SiteData::new(self.loc_id, self.channel_id, self.channel_no,
            self.site_info1, self.site_info2, false)
    }
}

/// A decoded control-channel message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RcchFrame {
    VoiceCallConnect(VoiceCallConnect),
    VoiceCallAssign(VoiceCallAssign),
    SiteInfo(SiteInfo),
    ServiceInfo(ServiceInfo),
    Registration(Registration),
    GroupRegistration(GroupRegistration),
}

impl RcchFrame {
    /// Try to decode an RCCH message from the given 11-byte block.
    ///
    /// Return `Ok(None)` if the block is well-formed but carries a message
    /// type with no defined layout — such blocks are dropped, not fatal.
    pub fn decode(data: &[u8]) -> Result<Option<RcchFrame>> {
        use self::MessageType::*;

        if data.len() < RCCH_BYTES {
            return Err(CodecError::InvalidLength {
                expected: RCCH_BYTES,
                actual: data.len(),
            });
        }

        let computed = calc_crc(&data[..9]);
        let received = u16::from(data[9] & 0x0F) << 8 | u16::from(data[10]);

        if computed != received {
            return Err(CodecError::CrcMismatch { computed, received });
        }

        let value = bits::to_u64(&data[1..9]);

        let msg_type = match MessageType::from_bits(data[0] & 0x3F) {
            Some(msg_type) => msg_type,
            None => {
                warn!(msg_type = data[0] & 0x3F, "unknown RCCH message type");
                return Ok(None);
            }
        };

        Ok(Some(match msg_type {
            VoiceCallConnect =>
                RcchFrame::VoiceCallConnect(self::VoiceCallConnect::from_value(value)),
            VoiceCallAssign =>
                RcchFrame::VoiceCallAssign(self::VoiceCallAssign::from_value(value)),
            SiteInfo =>
                RcchFrame::SiteInfo(self::SiteInfo::from_value(value)),
            ServiceInfo =>
                RcchFrame::ServiceInfo(self::ServiceInfo::from_value(value)),
            Registration =>
                RcchFrame::Registration(self::Registration::from_value(value)),
            GroupRegistration =>
                RcchFrame::GroupRegistration(self::GroupRegistration::from_value(value)),
            other => {
                warn!(msg_type = other.to_bits(), "RCCH message type has no defined layout");
                return Ok(None);
            }
        }))
    }

    /// Encode the message into its 11-byte block.
    pub fn encode(&self) -> [u8; RCCH_BYTES] {
        let (msg_type, value) = self.parts();

        let mut buf = [0; RCCH_BYTES];

        buf[0] = msg_type.to_bits();
        bits::from_u64(value, &mut buf[1..9]);

        let crc = calc_crc(&buf[..9]);
        buf[9] = (crc >> 8) as u8 & 0x0F;
        buf[10] = crc as u8;

        buf
    }

    /// Message type and payload value for the message.
    fn parts(&self) -> (MessageType, u64) {
        use self::RcchFrame::*;

        match self {
            VoiceCallConnect(f) => (MessageType::VoiceCallConnect, f.to_value()),
            VoiceCallAssign(f) => (MessageType::VoiceCallAssign, f.to_value()),
            SiteInfo(f) => (MessageType::SiteInfo, f.to_value()),
            ServiceInfo(f) => (MessageType::ServiceInfo, f.to_value()),
            Registration(f) => (MessageType::Registration, f.to_value()),
            GroupRegistration(f) => (MessageType::GroupRegistration, f.to_value()),
        }
    }
}

impl std::fmt::Display for RcchFrame {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::RcchFrame::*;

        fmt.write_str(match self {
            VoiceCallConnect(..) => "VCALL_CONN (Voice Call Connection)",
            VoiceCallAssign(..) => "VCALL_ASSGN (Voice Call Assignment)",
            SiteInfo(..) => "SITE_INFO (Site Information)",
            ServiceInfo(..) => "SRV_INFO (Service Information)",
            Registration(..) => "REG (Registration)",
            GroupRegistration(..) => "GRP_REG (Group Registration)",
        })
    }
}

/// Calculate the CRC over the data portion of a block.
fn calc_crc(data: &[u8]) -> u16 {
    Crc12::new().feed_bytes(data.iter().cloned()).finish() as u16
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nxdn::site::site_info;

    #[test]
    fn test_message_type_bits() {
        for bits in 0..64 {
            if let Some(msg_type) = MessageType::from_bits(bits) {
                assert_eq!(msg_type.to_bits(), bits);
            }
        }

        assert_eq!(MessageType::from_bits(0x18), Some(MessageType::SiteInfo));
        assert_eq!(MessageType::from_bits(0x24), Some(MessageType::GroupRegistration));
        assert_eq!(MessageType::from_bits(0x3E), None);
    }

    #[test]
    fn test_vcall_conn_round_trip() {
        let frame = RcchFrame::VoiceCallConnect(VoiceCallConnect {
            emergency: false,
            encrypted: true,
            priority: 3,
            call_type: 0b001,
            src_id: 0x1234,
            dst_id: 0x0FA0,
        });

        let bytes = frame.encode();

        assert_eq!(bytes[0] & 0x3F, 0x03);
        assert_eq!(RcchFrame::decode(&bytes[..]).unwrap(), Some(frame));
    }

    #[test]
    fn test_frame_round_trips() {
        let frames = [
            RcchFrame::VoiceCallAssign(VoiceCallAssign {
                call_type: 0b100,
                src_id: 0x0001,
                dst_id: 0xFFFF,
                channel_no: 0x3FF,
            }),
            RcchFrame::ServiceInfo(ServiceInfo {
                loc_id: 0x102034,
                service_info: 0xB0C0,
                restriction_info: 0x0102,
            }),
            RcchFrame::Registration(Registration {
                reg_option: 0x80,
                src_id: 0x1234,
                dst_id: 0x5678,
                cause: 0x06,
            }),
            RcchFrame::GroupRegistration(GroupRegistration {
                grp_reg_option: 0x01,
                src_id: 0x2345,
                dst_id: 0x6789,
                cause: 0x06,
            }),
        ];

        for frame in frames {
            let bytes = frame.encode();
            assert_eq!(RcchFrame::decode(&bytes[..]).unwrap(), Some(frame));
        }
    }

    #[test]
    fn test_site_info_round_trip() {
        let mut site = SiteData::new(0xABCDEF, 2, 0x155,
            site_info::VOICE_CALL_SVC | site_info::DATA_CALL_SVC, 0, true);
        site.set_net_active(true);

        let frame = RcchFrame::SiteInfo(SiteInfo::from_site(&site));
        let bytes = frame.encode();

        match RcchFrame::decode(&bytes[..]).unwrap() {
            Some(RcchFrame::SiteInfo(info)) => {
                assert_eq!(info.loc_id, 0xABCDEF);
                assert_eq!(info.channel_id, 2);
                assert_eq!(info.channel_no, 0x155);

                let out = info.site_data();
                assert_eq!(out.loc_id(), site.loc_id());
                assert_eq!(out.channel_no(), site.channel_no());
            }
            other => panic!("bad dispatch: {:?}", other),
        }
    }

    #[test]
    fn test_clamped_site_broadcast() {
        // Out-of-range identifiers never reach the air.
        let site = SiteData::new(0x1234, 20, 2000, 0, 0, false);
        let info = SiteInfo::from_site(&site);

        assert_eq!(info.channel_id, 15);
        assert_eq!(info.channel_no, 1023);
    }

    #[test]
    fn test_unknown_message_dropped() {
        // A well-formed block with an unassigned message type.
        let mut buf = [0; RCCH_BYTES];
        buf[0] = 0x3E;

        let crc = calc_crc(&buf[..9]);
        buf[9] = (crc >> 8) as u8 & 0x0F;
        buf[10] = crc as u8;

        assert_eq!(RcchFrame::decode(&buf[..]).unwrap(), None);

        // Recognized message type with no layout in this crate.
        buf[0] = MessageType::ProprietaryForm.to_bits();
        let crc = calc_crc(&buf[..9]);
        buf[9] = (crc >> 8) as u8 & 0x0F;
        buf[10] = crc as u8;

        assert_eq!(RcchFrame::decode(&buf[..]).unwrap(), None);
    }

    #[test]
    fn test_crc_guard() {
        let frame = RcchFrame::Registration(Registration {
            reg_option: 0,
            src_id: 1,
            dst_id: 2,
            cause: 3,
        });

        let mut bytes = frame.encode();
        bytes[3] ^= 0x10;

        match RcchFrame::decode(&bytes[..]) {
            Err(CodecError::CrcMismatch { .. }) => {}
            other => panic!("expected crc mismatch: {:?}", other),
        }
    }

    #[test]
    fn test_length_guard() {
        assert_eq!(
            RcchFrame::decode(&[0; 10][..]),
            Err(CodecError::InvalidLength { expected: 11, actual: 10 })
        );
    }
}
