use pri_core::{CallRef, CodecError, CrefWidth, OctetReader, OctetWriter};

/// Protocol discriminator octet (spec §6 "Wire").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolDiscriminator {
    Q931,
    Gr303,
    Maintenance,
    MaintenanceAlt,
}

impl ProtocolDiscriminator {
    pub fn into_raw(self) -> u8 {
        match self {
            ProtocolDiscriminator::Q931 => 0x08,
            ProtocolDiscriminator::Gr303 => 0x40,
            ProtocolDiscriminator::Maintenance => 0x03,
            ProtocolDiscriminator::MaintenanceAlt => 0x43,
        }
    }

    pub fn from_raw(v: u8) -> Result<Self, CodecError> {
        match v {
            0x08 => Ok(ProtocolDiscriminator::Q931),
            0x40 => Ok(ProtocolDiscriminator::Gr303),
            0x03 => Ok(ProtocolDiscriminator::Maintenance),
            0x43 => Ok(ProtocolDiscriminator::MaintenanceAlt),
            other => Err(CodecError::InvalidValue { field: "q931.protocol_discriminator", value: other as u64 }),
        }
    }
}

/// Q.931 message type tags actually exercised by this engine (spec §4.5/§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Alerting,
    CallProceeding,
    Connect,
    ConnectAcknowledge,
    Progress,
    Setup,
    SetupAcknowledge,
    Resume,
    ResumeAcknowledge,
    ResumeReject,
    Suspend,
    SuspendAcknowledge,
    SuspendReject,
    UserInformation,
    Disconnect,
    Release,
    ReleaseComplete,
    RestartAcknowledge,
    Restart,
    Segment,
    CongestionControl,
    Information,
    Notify,
    Status,
    StatusEnquiry,
    Facility,
    Hold,
    HoldAcknowledge,
    HoldReject,
    Retrieve,
    RetrieveAcknowledge,
    RetrieveReject,
    Other(u8),
}

impl MessageType {
    pub fn into_raw(self) -> u8 {
        match self {
            MessageType::Alerting => 0x01,
            MessageType::CallProceeding => 0x02,
            MessageType::Progress => 0x03,
            MessageType::Setup => 0x05,
            MessageType::Connect => 0x07,
            MessageType::SetupAcknowledge => 0x0d,
            MessageType::ConnectAcknowledge => 0x0f,
            MessageType::UserInformation => 0x20,
            MessageType::Suspend => 0x25,
            MessageType::SuspendAcknowledge => 0x26,
            MessageType::SuspendReject => 0x21,
            MessageType::Resume => 0x2d,
            MessageType::ResumeAcknowledge => 0x2e,
            MessageType::ResumeReject => 0x22,
            MessageType::Disconnect => 0x45,
            MessageType::Restart => 0x46,
            MessageType::Release => 0x4d,
            MessageType::RestartAcknowledge => 0x4e,
            MessageType::ReleaseComplete => 0x5a,
            MessageType::Segment => 0x60,
            MessageType::Facility => 0x62,
            MessageType::Notify => 0x6e,
            MessageType::Status => 0x7d,
            MessageType::StatusEnquiry => 0x75,
            MessageType::CongestionControl => 0x79,
            MessageType::Information => 0x7b,
            MessageType::Hold => 0x24,
            MessageType::HoldAcknowledge => 0x28,
            MessageType::HoldReject => 0x27,
            MessageType::Retrieve => 0x2c,
            MessageType::RetrieveAcknowledge => 0x2f,
            MessageType::RetrieveReject => 0x23,
            MessageType::Other(v) => v,
        }
    }

    pub fn from_raw(v: u8) -> Self {
        match v {
            0x01 => MessageType::Alerting,
            0x02 => MessageType::CallProceeding,
            0x03 => MessageType::Progress,
            0x05 => MessageType::Setup,
            0x07 => MessageType::Connect,
            0x0d => MessageType::SetupAcknowledge,
            0x0f => MessageType::ConnectAcknowledge,
            0x20 => MessageType::UserInformation,
            0x25 => MessageType::Suspend,
            0x26 => MessageType::SuspendAcknowledge,
            0x21 => MessageType::SuspendReject,
            0x2d => MessageType::Resume,
            0x2e => MessageType::ResumeAcknowledge,
            0x22 => MessageType::ResumeReject,
            0x45 => MessageType::Disconnect,
            0x46 => MessageType::Restart,
            0x4d => MessageType::Release,
            0x4e => MessageType::RestartAcknowledge,
            0x5a => MessageType::ReleaseComplete,
            0x60 => MessageType::Segment,
            0x62 => MessageType::Facility,
            0x6e => MessageType::Notify,
            0x7d => MessageType::Status,
            0x75 => MessageType::StatusEnquiry,
            0x79 => MessageType::CongestionControl,
            0x7b => MessageType::Information,
            0x24 => MessageType::Hold,
            0x28 => MessageType::HoldAcknowledge,
            0x27 => MessageType::HoldReject,
            0x2c => MessageType::Retrieve,
            0x2f => MessageType::RetrieveAcknowledge,
            0x23 => MessageType::RetrieveReject,
            other => MessageType::Other(other),
        }
    }
}

/// Decoded header: protocol discriminator, call reference, message type
/// (spec §6 "Q.931 message").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub protocol_discriminator: ProtocolDiscriminator,
    pub call_ref: CallRef,
    pub message_type: MessageType,
}

impl Header {
    pub fn decode(r: &mut OctetReader, width: CrefWidth) -> Result<Self, CodecError> {
        let pd = ProtocolDiscriminator::from_raw(r.read_u8("q931.protocol_discriminator")?)?;
        let len = r.read_u8("q931.call_ref.length")? as usize;
        let call_ref = if len == 0 {
            CallRef::Dummy
        } else {
            let bytes = r.read_bytes(len, "q931.call_ref.value")?;
            let from_originator = bytes[0] & 0x80 != 0;
            let mut value: u16 = (bytes[0] & 0x7f) as u16;
            for b in &bytes[1..] {
                value = (value << 8) | (*b as u16);
            }
            CallRef::new(value, from_originator, width)?
        };
        let message_type = MessageType::from_raw(r.read_u8("q931.message_type")?);
        Ok(Header { protocol_discriminator: pd, call_ref, message_type })
    }

    pub fn encode(&self, w: &mut OctetWriter) {
        w.push_u8(self.protocol_discriminator.into_raw());
        match self.call_ref {
            CallRef::Dummy => w.push_u8(0),
            CallRef::Value { value, from_originator, width } => {
                w.push_u8(width.length_octets() as u8);
                match width {
                    CrefWidth::Bri => {
                        w.push_u8((value as u8 & 0x7f) | if from_originator { 0x80 } else { 0x00 });
                    }
                    CrefWidth::Pri => {
                        let hi = ((value >> 8) as u8 & 0x7f) | if from_originator { 0x80 } else { 0x00 };
                        let lo = (value & 0xff) as u8;
                        w.push_u8(hi);
                        w.push_u8(lo);
                    }
                }
            }
        }
        w.push_u8(self.message_type.into_raw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pri_call_ref_round_trips() {
        let hdr = Header {
            protocol_discriminator: ProtocolDiscriminator::Q931,
            call_ref: CallRef::new(0x1234, true, CrefWidth::Pri).unwrap(),
            message_type: MessageType::Setup,
        };
        let mut w = OctetWriter::new();
        hdr.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = OctetReader::new(&bytes);
        let decoded = Header::decode(&mut r, CrefWidth::Pri).unwrap();
        assert_eq!(decoded, hdr);
    }

    #[test]
    fn dummy_call_ref_has_zero_length() {
        let hdr = Header {
            protocol_discriminator: ProtocolDiscriminator::Q931,
            call_ref: CallRef::Dummy,
            message_type: MessageType::Facility,
        };
        let mut w = OctetWriter::new();
        hdr.encode(&mut w);
        assert_eq!(w.as_slice()[1], 0);
    }
}
