//! Field types shared across the P25 frame families.

use crate::layout::FieldBits;

/// Options requested or granted for a traffic channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceOptions(u8);

impl ServiceOptions {
    /// Interpret the given byte as service options.
    pub fn new(opts: u8) -> ServiceOptions { ServiceOptions(opts) }

    /// Raw bits of the options byte.
    pub fn bits(&self) -> u8 { self.0 }

    /// Whether the service is in emergency mode.
    pub fn emergency(&self) -> bool { self.0 >> 7 == 1 }
    /// Whether the service is encrypted.
    pub fn protected(&self) -> bool { self.0 >> 6 & 1 == 1 }
    /// Whether the channel is full duplex.
    pub fn full_duplex(&self) -> bool { self.0 >> 5 & 1 == 1 }
    /// Whether the service is packet switched rather than circuit switched.
    pub fn packet_switched(&self) -> bool { self.0 >> 4 & 1 == 1 }
    /// Priority assigned to the service, between 1 (lowest) and 7.
    pub fn prio(&self) -> u8 { self.0 & 0x7 }
}

impl FieldBits for ServiceOptions {
    fn from_bits(bits: u64) -> Self { ServiceOptions::new(bits as u8) }
    fn to_bits(self) -> u64 { u64::from(self.0) }
}

/// Uniquely identifies a channel within a site.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel(u16);

impl Channel {
    /// Create a new `Channel` with the given channel ID and channel number,
    /// clamped to their field widths.
    pub fn new(id: u8, number: u16) -> Channel {
        Channel(u16::from(id.min(15)) << 12 | number.min(0xFFF))
    }

    /// Create a new `Channel` from its 16 packed bits.
    pub fn from_bits(bits: u16) -> Channel { Channel(bits) }

    /// Raw 16 packed bits.
    pub fn bits(&self) -> u16 { self.0 }

    /// Channel ID whose parameters to use, up to 16 per control channel.
    pub fn id(&self) -> u8 { (self.0 >> 12) as u8 }

    /// Individual channel number within the channel ID.
    pub fn number(&self) -> u16 { self.0 & 0xFFF }
}

impl FieldBits for Channel {
    fn from_bits(bits: u64) -> Self { Channel::from_bits(bits as u16) }
    fn to_bits(self) -> u64 { u64::from(self.0) }
}

/// Identifies which group a message belongs to.
///
/// Users direct each transmission to a talkgroup selected on the radio, and
/// a radio only unsquelches for talkgroups it was programmed to receive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize, serde::Deserialize))]
pub enum TalkGroup {
    /// Includes nobody.
    Nobody,
    /// Default talkgroup when no other is selected.
    Default,
    /// Includes everybody.
    Everybody,
    /// Specific group of users.
    Other(u16),
}

impl TalkGroup {
    /// Parse a talkgroup from the given 16 bits.
    pub fn from_bits(bits: u16) -> TalkGroup {
        use self::TalkGroup::*;

        match bits {
            0x0000 => Nobody,
            0x0001 => Default,
            0xFFFF => Everybody,
            _ => Other(bits),
        }
    }

    /// Reduce the talkgroup to its 16 wire bits.
    pub fn to_bits(self) -> u16 {
        use self::TalkGroup::*;

        match self {
            Nobody => 0x0000,
            Default => 0x0001,
            Everybody => 0xFFFF,
            Other(bits) => bits,
        }
    }
}

impl Default for TalkGroup {
    fn default() -> Self { TalkGroup::Default }
}

impl FieldBits for TalkGroup {
    fn from_bits(bits: u64) -> Self { TalkGroup::from_bits(bits as u16) }
    fn to_bits(self) -> u64 { u64::from(TalkGroup::to_bits(self)) }
}

/// Services advertised by a site.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemServices(u8);

impl SystemServices {
    /// Interpret the given byte as a system services word.
    pub fn new(ssc: u8) -> Self { SystemServices(ssc) }

    /// Raw bits of the services word.
    pub fn bits(&self) -> u8 { self.0 }

    /// Whether the site hosts a composite control channel.
    pub fn is_composite(&self) -> bool { self.0 & 0x01 != 0 }
    /// Whether the control channel only broadcasts updates.
    pub fn updates_only(&self) -> bool { self.0 & 0x02 != 0 }
    /// Whether the site is a backup control channel.
    pub fn is_backup(&self) -> bool { self.0 & 0x04 != 0 }
    /// Whether the site provides data services.
    pub fn has_data(&self) -> bool { self.0 & 0x10 != 0 }
    /// Whether the site provides voice services.
    pub fn has_voice(&self) -> bool { self.0 & 0x20 != 0 }
    /// Whether the site provides registration services.
    pub fn has_registration(&self) -> bool { self.0 & 0x40 != 0 }
    /// Whether the site provides authentication services.
    pub fn has_auth(&self) -> bool { self.0 & 0x80 != 0 }
}

impl FieldBits for SystemServices {
    fn from_bits(bits: u64) -> Self { SystemServices::new(bits as u8) }
    fn to_bits(self) -> u64 { u64::from(self.0) }
}

/// Identity of the local (or an adjacent) site, embedded by value in the
/// frames that announce site and registration information.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize, serde::Deserialize))]
pub struct SiteData {
    /// Location registration area.
    lra: u8,
    /// Wide area communication network ID.
    net_id: u32,
    /// System ID within the network.
    sys_id: u16,
    /// RF subsystem ID within the system.
    rfss_id: u8,
    /// Site ID within the RF subsystem.
    site_id: u8,
    /// Control channel of the site.
    channel: Channel,
    /// Services advertised by the site.
    services: SystemServices,
}

impl SiteData {
    /// Create a new `SiteData`, clamping each identifier to its
    /// standard-defined range.
    pub fn new(lra: u8, net_id: u32, sys_id: u16, rfss_id: u8, site_id: u8,
               channel: Channel, services: SystemServices) -> SiteData
    {
        SiteData {
            lra,
            net_id: net_id.min(0xFFFFF),
            sys_id: sys_id.min(0xFFF),
            rfss_id,
            site_id,
            channel,
            services,
        }
    }

    /// Location registration area of the site.
    pub fn lra(&self) -> u8 { self.lra }
    /// WACN ID of the site, up to 20 bits.
    pub fn net_id(&self) -> u32 { self.net_id }
    /// System ID of the site, up to 12 bits.
    pub fn sys_id(&self) -> u16 { self.sys_id }
    /// RF subsystem ID of the site.
    pub fn rfss_id(&self) -> u8 { self.rfss_id }
    /// Site ID within the RFSS.
    pub fn site_id(&self) -> u8 { self.site_id }
    /// Control channel of the site.
    pub fn channel(&self) -> Channel { self.channel }
    /// Services advertised by the site.
    pub fn services(&self) -> SystemServices { self.services }
}
