//! Site identity broadcast on the NXDN control channel.

/// Service flags carried in the first site information byte.
pub mod site_info {
    /// Site participates in a multi-site network.
    pub const MULTI_SITE_SVC: u8 = 0x80;
    /// Site participates in a multi-system network.
    pub const MULTI_SYSTEM_SVC: u8 = 0x40;
    /// Site provides location registration.
    pub const LOC_REG_SVC: u8 = 0x20;
    /// Site provides group registration.
    pub const GRP_REG_SVC: u8 = 0x10;
    /// Site provides authentication.
    pub const AUTH_SVC: u8 = 0x08;
    /// Site broadcasts composite control channel information.
    pub const COMP_INFO_SVC: u8 = 0x04;
    /// Site provides voice call service.
    pub const VOICE_CALL_SVC: u8 = 0x02;
    /// Site provides data call service.
    pub const DATA_CALL_SVC: u8 = 0x01;
}

/// Identity of the local or an adjacent NXDN site.
///
/// Identifiers are clamped to their standard-defined ranges on
/// construction, and the value is copied, never shared, into the frames
/// that announce it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize, serde::Deserialize))]
pub struct SiteData {
    loc_id: u32,
    channel_id: u8,
    channel_no: u16,
    site_info1: u8,
    site_info2: u8,
    is_adj_site: bool,
    callsign: String,
    require_reg: bool,
    net_active: bool,
}

impl SiteData {
    /// Create a new `SiteData` with the given location ID, control channel,
    /// and site information bytes, clamping each identifier to its valid
    /// range.
    pub fn new(loc_id: u32, channel_id: u8, channel_no: u16, site_info1: u8,
               site_info2: u8, require_reg: bool) -> SiteData
    {
        SiteData {
            loc_id: loc_id.min(0xFFFFFF),
            channel_id: channel_id.min(15),
            channel_no: channel_no.clamp(1, 1023),
            site_info1,
            site_info2,
            is_adj_site: false,
            callsign: "CHANGEME".to_string(),
            require_reg,
            net_active: false,
        }
    }

    /// Set the site callsign.
    pub fn set_callsign(&mut self, callsign: String) {
        self.callsign = callsign;
    }

    /// Set whether the site is an active network member.
    pub fn set_net_active(&mut self, net_active: bool) {
        self.net_active = net_active;
    }

    /// Rewrite this value as adjacent-site data, with the same clamping as
    /// construction. Adjacent sites are always network active.
    pub fn set_adj_site(&mut self, loc_id: u32, channel_id: u8, channel_no: u16,
                        site_info1: u8, site_info2: u8)
    {
        self.loc_id = loc_id.min(0xFFFFFF);
        self.channel_id = channel_id.min(15);
        self.channel_no = channel_no.clamp(1, 1023);
        self.site_info1 = site_info1;
        self.site_info2 = site_info2;
        self.is_adj_site = true;
        self.callsign = "ADJSITE".to_string();
        self.net_active = true;
    }

    /// Location ID of the site, up to 24 bits.
    pub fn loc_id(&self) -> u32 { self.loc_id }
    /// Channel ID of the control channel, up to 15.
    pub fn channel_id(&self) -> u8 { self.channel_id }
    /// Channel number of the control channel, between 1 and 1023.
    pub fn channel_no(&self) -> u16 { self.channel_no }
    /// First site information byte.
    pub fn site_info1(&self) -> u8 { self.site_info1 }
    /// Second site information byte.
    pub fn site_info2(&self) -> u8 { self.site_info2 }
    /// Whether this value describes an adjacent site.
    pub fn is_adj_site(&self) -> bool { self.is_adj_site }
    /// Callsign of the site.
    pub fn callsign(&self) -> &str { &self.callsign }
    /// Whether units must register before using the site.
    pub fn require_reg(&self) -> bool { self.require_reg }
    /// Whether the site is an active network member.
    pub fn net_active(&self) -> bool { self.net_active }
}

impl Default for SiteData {
    fn default() -> Self {
        SiteData::new(1, 1, 1,
            site_info::VOICE_CALL_SVC | site_info::DATA_CALL_SVC, 0, false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamping() {
        let site = SiteData::new(0x1234, 20, 2000, 0, 0, false);
        assert_eq!(site.channel_id(), 15);
        assert_eq!(site.channel_no(), 1023);

        let site = SiteData::new(0xFFFF_FFFF, 1, 0, 0, 0, false);
        assert_eq!(site.loc_id(), 0xFFFFFF);
        assert_eq!(site.channel_no(), 1);

        let site = SiteData::new(0x1234, 3, 700, 0x55, 0xAA, true);
        assert_eq!(site.loc_id(), 0x1234);
        assert_eq!(site.channel_id(), 3);
        assert_eq!(site.channel_no(), 700);
        assert!(site.require_reg());
    }

    #[test]
    fn test_adj_site() {
        let mut site = SiteData::default();
        assert!(!site.is_adj_site());
        assert_eq!(site.callsign(), "CHANGEME");

        site.set_adj_site(0xABCDEF, 18, 1100, 0x03, 0);
        assert!(site.is_adj_site());
        assert!(site.net_active());
        assert_eq!(site.channel_id(), 15);
        assert_eq!(site.channel_no(), 1023);
        assert_eq!(site.callsign(), "ADJSITE");
    }

    #[test]
    fn test_setters() {
        let mut site = SiteData::default();

        site.set_callsign("KA1RCI".to_string());
        assert_eq!(site.callsign(), "KA1RCI");

        site.set_net_active(true);
        assert!(site.net_active());
    }
}
