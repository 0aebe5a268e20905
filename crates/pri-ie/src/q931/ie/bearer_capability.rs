//! Bearer capability IE. Coding-standard in bits 6-5 of octet 3; `0x28 |
//! 0x80` (ISO coding, 64k circuit mode) is the Q.SIG call-independent
//! signaling placeholder (spec §4.2).

use pri_core::{CodecError, OctetReader, OctetWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InformationTransferCapability {
    Speech,
    UnrestrictedDigital,
    RestrictedDigital,
    Audio3_1k,
    CallIndependentSignaling,
    Video,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Circuit,
    Packet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerCapability {
    pub coding_standard: u8,
    pub capability: InformationTransferCapability,
    pub transfer_mode: TransferMode,
    /// Bits 4-0 of octet 4, the circuit-mode information transfer rate
    /// (64k is the only rate this engine constructs; other values
    /// round-trip verbatim).
    pub transfer_rate: u8,
}

const ISO_CODING_STANDARD: u8 = 0x01;
const QSIG_SIGNALING_OCTET3: u8 = 0x28 | 0x80;

impl BearerCapability {
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = OctetReader::new(bytes);
        let octet3 = r.read_u8("bearer_capability.octet3")?;
        let coding_standard = (octet3 >> 5) & 0x03;
        let capability = if octet3 == QSIG_SIGNALING_OCTET3 {
            InformationTransferCapability::CallIndependentSignaling
        } else {
            match octet3 & 0x1f {
                0x00 => InformationTransferCapability::Speech,
                0x08 => InformationTransferCapability::UnrestrictedDigital,
                0x09 => InformationTransferCapability::RestrictedDigital,
                0x10 => InformationTransferCapability::Audio3_1k,
                0x18 => InformationTransferCapability::Video,
                other => InformationTransferCapability::Other(other),
            }
        };
        let octet4 = r.read_u8("bearer_capability.octet4")?;
        let transfer_mode = if (octet4 >> 5) & 0x03 == 0 { TransferMode::Circuit } else { TransferMode::Packet };
        let transfer_rate = octet4 & 0x1f;
        Ok(BearerCapability { coding_standard, capability, transfer_mode, transfer_rate })
    }

    pub fn encode(&self, w: &mut OctetWriter) {
        if self.capability == InformationTransferCapability::CallIndependentSignaling {
            w.push_u8(QSIG_SIGNALING_OCTET3);
            w.push_u8(0x80 | (self.transfer_rate & 0x1f));
            return;
        }
        let cap_bits = match self.capability {
            InformationTransferCapability::Speech => 0x00,
            InformationTransferCapability::UnrestrictedDigital => 0x08,
            InformationTransferCapability::RestrictedDigital => 0x09,
            InformationTransferCapability::Audio3_1k => 0x10,
            InformationTransferCapability::Video => 0x18,
            InformationTransferCapability::CallIndependentSignaling => unreachable!(),
            InformationTransferCapability::Other(v) => v,
        };
        w.push_u8(0x80 | (self.coding_standard << 5) | cap_bits);
        let mode_bits = match self.transfer_mode {
            TransferMode::Circuit => 0x00,
            TransferMode::Packet => 0x20,
        };
        w.push_u8(0x80 | mode_bits | (self.transfer_rate & 0x1f));
    }

    pub fn speech() -> Self {
        BearerCapability {
            coding_standard: 0,
            capability: InformationTransferCapability::Speech,
            transfer_mode: TransferMode::Circuit,
            transfer_rate: 0x10,
        }
    }

    pub fn qsig_signaling() -> Self {
        BearerCapability {
            coding_standard: ISO_CODING_STANDARD,
            capability: InformationTransferCapability::CallIndependentSignaling,
            transfer_mode: TransferMode::Circuit,
            transfer_rate: 0x10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_round_trips() {
        let bc = BearerCapability::speech();
        let mut w = OctetWriter::new();
        bc.encode(&mut w);
        assert_eq!(BearerCapability::decode(w.as_slice()).unwrap(), bc);
    }

    #[test]
    fn qsig_signaling_round_trips() {
        let bc = BearerCapability::qsig_signaling();
        let mut w = OctetWriter::new();
        bc.encode(&mut w);
        let decoded = BearerCapability::decode(w.as_slice()).unwrap();
        assert_eq!(decoded.capability, InformationTransferCapability::CallIndependentSignaling);
    }
}
