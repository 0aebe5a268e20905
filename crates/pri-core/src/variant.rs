//! Controller-wide configuration enums (spec §3/§6).

/// Which side of the interface this controller represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Network,
    User,
}

/// Physical/logical layout of the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    BriPtp,
    BriPtmp,
    Pri,
}

impl Layout {
    pub fn is_bri(self) -> bool {
        matches!(self, Layout::BriPtp | Layout::BriPtmp)
    }

    pub fn is_point_to_multipoint(self) -> bool {
        matches!(self, Layout::BriPtmp)
    }
}

/// GR-303 carries two distinct sub-channels over the same message set
/// (spec SPEC_FULL §2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gr303Channel {
    /// Embedded Operations Channel.
    Eoc,
    /// Test and Maintenance Channel.
    Tmc,
}

/// Supported switch variants (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchVariant {
    Att4Ess,
    Lucent5E,
    NortelDms100,
    NationalIsdn1,
    NationalIsdn2,
    EuroIsdnE1,
    EuroIsdnT1,
    Qsig,
    Gr303 { channel: Gr303Channel },
}

impl SwitchVariant {
    /// Q.SIG and EuroISDN send Display IE content as raw IA5 with no
    /// leading charset octet; everything else prepends `0xB1` (spec §4.2,
    /// Open Question #3 in DESIGN.md).
    pub fn display_ie_omits_charset_octet(self) -> bool {
        matches!(self, SwitchVariant::Qsig | SwitchVariant::EuroIsdnE1 | SwitchVariant::EuroIsdnT1)
    }

    /// True for the point-to-point European profile vs. the T1-framed one;
    /// both share message semantics and differ only in timing/framing
    /// details out of this engine's scope.
    pub fn is_euro_isdn(self) -> bool {
        matches!(self, SwitchVariant::EuroIsdnE1 | SwitchVariant::EuroIsdnT1)
    }

    /// Networks may send Date/Time; user-side equipment never does
    /// (spec §4.2).
    pub fn date_time_sendable(self, side: Side) -> bool {
        side == Side::Network
    }
}

/// Layer-2 persistence policy (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer2Persistence {
    #[default]
    Default,
    KeepUp,
    LeaveDown,
}

impl Layer2Persistence {
    /// Resolve `Default` against the interface layout (spec §4.4: "Default
    /// expands to LeaveDown for PTMP and KeepUp otherwise").
    pub fn resolve(self, layout: Layout) -> ResolvedPersistence {
        match self {
            Layer2Persistence::KeepUp => ResolvedPersistence::KeepUp,
            Layer2Persistence::LeaveDown => ResolvedPersistence::LeaveDown,
            Layer2Persistence::Default => {
                if layout.is_point_to_multipoint() {
                    ResolvedPersistence::LeaveDown
                } else {
                    ResolvedPersistence::KeepUp
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedPersistence {
    KeepUp,
    LeaveDown,
}

/// Date/time send policy granularity (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeSendPolicy {
    #[default]
    Default,
    No,
    Date,
    DateHh,
    DateHhMm,
    DateHhMmSs,
}

/// Bitset of display-IE send/receive behaviors (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct DisplayFlags {
    pub block: bool,
    pub name_initial: bool,
    pub name_update: bool,
    pub text: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallCompletionRecallMode {
    #[default]
    GloballyUnique,
    LinkId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionRequest {
    #[default]
    Release,
    RetainA,
    RetainAAndB,
}
