//! Per-operation ROSE argument codecs (spec §4.3).
//!
//! Each operation's argument is a BER SEQUENCE; these modules decode/encode
//! just the argument payload carried inside [`crate::component::Invoke`]
//! or [`crate::component::ReturnResult`] — the invoke-id/operation-code
//! envelope is handled by [`crate::component`].

pub mod aoc;
pub mod diverting_leg_information;
pub mod transfer;

/// Local operation-value codes this engine recognizes, grounded on
/// `examples/original_source/libpri/rose.h`'s enumeration. Not exhaustive;
/// operations outside this set decode to
/// `pri_core::CodecError::NotImplemented` via [`Operation::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DivertingLegInformation1,
    DivertingLegInformation2,
    DivertingLegInformation3,
    CallTransferComplete,
    EctInform,
    ChargingRequest,
    AocSCurrency,
    AocDCurrency,
    AocDChargingUnit,
    AocECurrency,
    AocEChargingUnit,
    CallRerouting,
    ConnectedName,
    CalledName,
    MwiActivate,
    MwiDeactivate,
}

impl Operation {
    /// Local operation-value codes per Q.SIG/ETSI supplementary-services
    /// ASN.1 modules (spec §4.3).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Operation::DivertingLegInformation1),
            21 => Some(Operation::CallTransferComplete),
            4 => Some(Operation::DivertingLegInformation2),
            15 => Some(Operation::DivertingLegInformation3),
            20 => Some(Operation::EctInform),
            30 => Some(Operation::ChargingRequest),
            148 => Some(Operation::AocSCurrency),
            149 => Some(Operation::AocDCurrency),
            150 => Some(Operation::AocDChargingUnit),
            151 => Some(Operation::AocECurrency),
            152 => Some(Operation::AocEChargingUnit),
            7 => Some(Operation::CallRerouting),
            165 => Some(Operation::ConnectedName),
            166 => Some(Operation::CalledName),
            80 => Some(Operation::MwiActivate),
            81 => Some(Operation::MwiDeactivate),
            _ => None,
        }
    }

    pub fn into_code(self) -> i64 {
        match self {
            Operation::DivertingLegInformation1 => 1,
            Operation::CallTransferComplete => 21,
            Operation::DivertingLegInformation2 => 4,
            Operation::DivertingLegInformation3 => 15,
            Operation::EctInform => 20,
            Operation::ChargingRequest => 30,
            Operation::AocSCurrency => 148,
            Operation::AocDCurrency => 149,
            Operation::AocDChargingUnit => 150,
            Operation::AocECurrency => 151,
            Operation::AocEChargingUnit => 152,
            Operation::CallRerouting => 7,
            Operation::ConnectedName => 165,
            Operation::CalledName => 166,
            Operation::MwiActivate => 80,
            Operation::MwiDeactivate => 81,
        }
    }
}
