//! Q.931 Cause information element semantics (spec §4.2/§7).
//!
//! Enum-with-raw-value convention grounded on the teacher's
//! `tetra-pdus::cmce::enums::*` (`try_from`/`into_raw`), adapted to the
//! Cause IE's 7-bit value space instead of TETRA's narrower PDU-type enums.

/// Cause values this engine assigns or recognizes. Not exhaustive of the
/// full Q.850 table — values outside this set round-trip as
/// `Cause::Other(raw)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    UnallocatedNumber,
    NoRouteToTransitNetwork,
    NoRouteToDestination,
    ChannelUnacceptable,
    CallAwardedAndDelivered,
    NormalClearing,
    UserBusy,
    NoUserResponding,
    NoAnswerFromUser,
    CallRejected,
    NumberChanged,
    NonSelectedUserClearing,
    DestinationOutOfOrder,
    InvalidNumberFormat,
    FacilityRejected,
    ResponseToStatusEnquiry,
    NormalUnspecified,
    NoCircuitAvailable,
    NetworkOutOfOrder,
    TemporaryFailure,
    SwitchingEquipmentCongestion,
    AccessInformationDiscarded,
    RequestedChannelNotAvailable,
    ResourceUnavailable,
    FacilityNotSubscribed,
    BearerCapabilityNotAuthorized,
    BearerCapabilityNotAvailable,
    ServiceNotAvailable,
    BearerCapabilityNotImplemented,
    ChannelTypeNotImplemented,
    RequestedFacilityNotImplemented,
    OnlyRestrictedDigitalAvailable,
    ServiceNotImplemented,
    InvalidCallReference,
    IdentifiedChannelNotExist,
    IncompatibleDestination,
    InvalidTransitNetworkSelection,
    InvalidMessage,
    MandatoryIeMissing,
    MessageTypeNonexistent,
    MessageNotCompatibleWithCallState,
    IeNotImplemented,
    InvalidIeContents,
    RecoveryOnTimerExpiry,
    ProtocolErrorUnspecified,
    InterworkingUnspecified,
    Other(u8),
}

impl Cause {
    pub fn into_raw(self) -> u8 {
        match self {
            Cause::UnallocatedNumber => 1,
            Cause::NoRouteToTransitNetwork => 2,
            Cause::NoRouteToDestination => 3,
            Cause::ChannelUnacceptable => 6,
            Cause::CallAwardedAndDelivered => 7,
            Cause::NormalClearing => 16,
            Cause::UserBusy => 17,
            Cause::NoUserResponding => 18,
            Cause::NoAnswerFromUser => 19,
            Cause::CallRejected => 21,
            Cause::NumberChanged => 22,
            Cause::NonSelectedUserClearing => 26,
            Cause::DestinationOutOfOrder => 27,
            Cause::InvalidNumberFormat => 28,
            Cause::FacilityRejected => 29,
            Cause::ResponseToStatusEnquiry => 30,
            Cause::NormalUnspecified => 31,
            Cause::NoCircuitAvailable => 34,
            Cause::NetworkOutOfOrder => 38,
            Cause::TemporaryFailure => 41,
            Cause::SwitchingEquipmentCongestion => 42,
            Cause::AccessInformationDiscarded => 43,
            Cause::RequestedChannelNotAvailable => 44,
            Cause::ResourceUnavailable => 47,
            Cause::FacilityNotSubscribed => 50,
            Cause::BearerCapabilityNotAuthorized => 57,
            Cause::BearerCapabilityNotAvailable => 58,
            Cause::ServiceNotAvailable => 63,
            Cause::BearerCapabilityNotImplemented => 65,
            Cause::ChannelTypeNotImplemented => 66,
            Cause::RequestedFacilityNotImplemented => 69,
            Cause::OnlyRestrictedDigitalAvailable => 70,
            Cause::ServiceNotImplemented => 79,
            Cause::InvalidCallReference => 81,
            Cause::IdentifiedChannelNotExist => 82,
            Cause::IncompatibleDestination => 88,
            Cause::InvalidTransitNetworkSelection => 91,
            Cause::InvalidMessage => 95,
            Cause::MandatoryIeMissing => 96,
            Cause::MessageTypeNonexistent => 97,
            Cause::MessageNotCompatibleWithCallState => 101,
            Cause::IeNotImplemented => 99,
            Cause::InvalidIeContents => 100,
            Cause::RecoveryOnTimerExpiry => 102,
            Cause::ProtocolErrorUnspecified => 111,
            Cause::InterworkingUnspecified => 127,
            Cause::Other(v) => v,
        }
    }

    pub fn from_raw(v: u8) -> Self {
        match v {
            1 => Cause::UnallocatedNumber,
            2 => Cause::NoRouteToTransitNetwork,
            3 => Cause::NoRouteToDestination,
            6 => Cause::ChannelUnacceptable,
            7 => Cause::CallAwardedAndDelivered,
            16 => Cause::NormalClearing,
            17 => Cause::UserBusy,
            18 => Cause::NoUserResponding,
            19 => Cause::NoAnswerFromUser,
            21 => Cause::CallRejected,
            22 => Cause::NumberChanged,
            26 => Cause::NonSelectedUserClearing,
            27 => Cause::DestinationOutOfOrder,
            28 => Cause::InvalidNumberFormat,
            29 => Cause::FacilityRejected,
            30 => Cause::ResponseToStatusEnquiry,
            31 => Cause::NormalUnspecified,
            34 => Cause::NoCircuitAvailable,
            38 => Cause::NetworkOutOfOrder,
            41 => Cause::TemporaryFailure,
            42 => Cause::SwitchingEquipmentCongestion,
            43 => Cause::AccessInformationDiscarded,
            44 => Cause::RequestedChannelNotAvailable,
            47 => Cause::ResourceUnavailable,
            50 => Cause::FacilityNotSubscribed,
            57 => Cause::BearerCapabilityNotAuthorized,
            58 => Cause::BearerCapabilityNotAvailable,
            63 => Cause::ServiceNotAvailable,
            65 => Cause::BearerCapabilityNotImplemented,
            66 => Cause::ChannelTypeNotImplemented,
            69 => Cause::RequestedFacilityNotImplemented,
            70 => Cause::OnlyRestrictedDigitalAvailable,
            79 => Cause::ServiceNotImplemented,
            81 => Cause::InvalidCallReference,
            82 => Cause::IdentifiedChannelNotExist,
            88 => Cause::IncompatibleDestination,
            91 => Cause::InvalidTransitNetworkSelection,
            95 => Cause::InvalidMessage,
            96 => Cause::MandatoryIeMissing,
            97 => Cause::MessageTypeNonexistent,
            99 => Cause::IeNotImplemented,
            100 => Cause::InvalidIeContents,
            101 => Cause::MessageNotCompatibleWithCallState,
            102 => Cause::RecoveryOnTimerExpiry,
            111 => Cause::ProtocolErrorUnspecified,
            127 => Cause::InterworkingUnspecified,
            other => Cause::Other(other),
        }
    }
}

/// Coding standard, carried in bits 6-5 of Cause IE octet 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingStandard {
    Ccitt,
    National,
    NetworkSpecific,
    Reserved,
}

impl CodingStandard {
    pub fn into_raw(self) -> u8 {
        match self {
            CodingStandard::Ccitt => 0,
            CodingStandard::National => 1,
            CodingStandard::NetworkSpecific => 2,
            CodingStandard::Reserved => 3,
        }
    }

    pub fn from_raw(v: u8) -> Self {
        match v & 0x3 {
            0 => CodingStandard::Ccitt,
            1 => CodingStandard::National,
            2 => CodingStandard::NetworkSpecific,
            _ => CodingStandard::Reserved,
        }
    }
}

/// Location, carried in bits 4-1 of Cause IE octet 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CauseLocation {
    User,
    PrivateNetworkLocalUser,
    PublicNetworkLocalUser,
    TransitNetwork,
    PublicNetworkRemoteUser,
    PrivateNetworkRemoteUser,
    International,
    NetworkBeyondInterworking,
    Other(u8),
}

impl CauseLocation {
    pub fn into_raw(self) -> u8 {
        match self {
            CauseLocation::User => 0,
            CauseLocation::PrivateNetworkLocalUser => 1,
            CauseLocation::PublicNetworkLocalUser => 2,
            CauseLocation::TransitNetwork => 3,
            CauseLocation::PublicNetworkRemoteUser => 4,
            CauseLocation::PrivateNetworkRemoteUser => 5,
            CauseLocation::International => 7,
            CauseLocation::NetworkBeyondInterworking => 10,
            CauseLocation::Other(v) => v,
        }
    }

    pub fn from_raw(v: u8) -> Self {
        match v & 0xf {
            0 => CauseLocation::User,
            1 => CauseLocation::PrivateNetworkLocalUser,
            2 => CauseLocation::PublicNetworkLocalUser,
            3 => CauseLocation::TransitNetwork,
            4 => CauseLocation::PublicNetworkRemoteUser,
            5 => CauseLocation::PrivateNetworkRemoteUser,
            7 => CauseLocation::International,
            10 => CauseLocation::NetworkBeyondInterworking,
            other => CauseLocation::Other(other),
        }
    }
}

/// Full Cause IE content (value + coding context + debug-only diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CauseValue {
    pub coding_standard: CodingStandard,
    pub location: CauseLocation,
    pub cause: Cause,
    /// Diagnostic octets following the cause value. Retained only for
    /// debug dumps (spec §4.2), never interpreted by the state machine.
    pub diagnostics: Vec<u8>,
}

impl CauseValue {
    pub fn new(cause: Cause, location: CauseLocation) -> Self {
        CauseValue { coding_standard: CodingStandard::Ccitt, location, cause, diagnostics: Vec::new() }
    }
}
