use pri_core::{CodecError, OctetReader, OctetWriter};

/// SAPI for call-control signaling; the only one this engine ever uses.
pub const SAPI_CALL_CONTROL: u8 = 0;
/// SAPI used for layer-2 management frames (TEI assignment procedures).
pub const SAPI_LAYER2_MANAGEMENT: u8 = 63;

/// Broadcast TEI used during TEI assignment procedures.
pub const TEI_BROADCAST: u8 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub sapi: u8,
    pub command_response: bool,
    pub tei: u8,
}

impl Address {
    pub fn decode(r: &mut OctetReader) -> Result<Self, CodecError> {
        let b0 = r.read_u8("q921.address.octet1")?;
        let b1 = r.read_u8("q921.address.octet2")?;
        if b0 & 0x01 != 0 {
            return Err(CodecError::InvalidValue { field: "q921.address.ea0", value: b0 as u64 });
        }
        if b1 & 0x01 == 0 {
            return Err(CodecError::InvalidValue { field: "q921.address.ea1", value: b1 as u64 });
        }
        Ok(Address { sapi: (b0 >> 2) & 0x3f, command_response: b0 & 0x02 != 0, tei: (b1 >> 1) & 0x7f })
    }

    pub fn encode(&self, w: &mut OctetWriter) {
        let b0 = ((self.sapi & 0x3f) << 2) | (if self.command_response { 0x02 } else { 0x00 });
        let b1 = ((self.tei & 0x7f) << 1) | 0x01;
        w.push_u8(b0);
        w.push_u8(b1);
    }
}

/// Decoded Q.921 control field (spec §4.4: I/S/U frame types).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Information { n_s: u8, n_r: u8, poll: bool },
    ReceiveReady { n_r: u8, poll_final: bool },
    ReceiveNotReady { n_r: u8, poll_final: bool },
    Reject { n_r: u8, poll_final: bool },
    SetAsyncBalancedModeExtended { poll: bool },
    DisconnectedMode { final_bit: bool },
    Disconnect { poll: bool },
    UnnumberedAcknowledge { final_bit: bool },
    FrameReject { final_bit: bool },
    UnnumberedInformation { poll: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    Truncated,
    UnknownControl(u16),
}

impl Control {
    /// Decodes the control field, consuming 1 octet for S/U frames or 2 for I-frames.
    pub fn decode(r: &mut OctetReader) -> Result<Self, FrameError> {
        let b0 = r.read_u8("q921.control.octet1").map_err(|_| FrameError::Truncated)?;
        if b0 & 0x01 == 0 {
            let n_s = (b0 >> 1) & 0x7f;
            let b1 = r.read_u8("q921.control.octet2").map_err(|_| FrameError::Truncated)?;
            let n_r = (b1 >> 1) & 0x7f;
            let poll = b1 & 0x01 != 0;
            return Ok(Control::Information { n_s, n_r, poll });
        }
        if b0 & 0x03 == 0x01 {
            let b1 = r.read_u8("q921.control.octet2").map_err(|_| FrameError::Truncated)?;
            let n_r = (b1 >> 1) & 0x7f;
            let poll_final = b1 & 0x01 != 0;
            return match (b0 >> 2) & 0x03 {
                0b00 => Ok(Control::ReceiveReady { n_r, poll_final }),
                0b01 => Ok(Control::ReceiveNotReady { n_r, poll_final }),
                0b10 => Ok(Control::Reject { n_r, poll_final }),
                _ => Err(FrameError::UnknownControl(b0 as u16)),
            };
        }
        // U-frame: bits 2,3,4,6,7 carry the M-field, bit 4 is P/F.
        let pf = b0 & 0x10 != 0;
        let m = (b0 & 0xec) >> 2;
        match m {
            0b01111 => Ok(Control::SetAsyncBalancedModeExtended { poll: pf }),
            0b00011 => Ok(Control::DisconnectedMode { final_bit: pf }),
            0b00010 => Ok(Control::Disconnect { poll: pf }),
            0b01100 => Ok(Control::UnnumberedAcknowledge { final_bit: pf }),
            0b10001 => Ok(Control::FrameReject { final_bit: pf }),
            0b00000 => Ok(Control::UnnumberedInformation { poll: pf }),
            _ => Err(FrameError::UnknownControl(b0 as u16)),
        }
    }

    pub fn encode(&self, w: &mut OctetWriter) {
        match *self {
            Control::Information { n_s, n_r, poll } => {
                w.push_u8((n_s & 0x7f) << 1);
                w.push_u8(((n_r & 0x7f) << 1) | (poll as u8));
            }
            Control::ReceiveReady { n_r, poll_final } => {
                w.push_u8(0b0000_0001);
                w.push_u8(((n_r & 0x7f) << 1) | (poll_final as u8));
            }
            Control::ReceiveNotReady { n_r, poll_final } => {
                w.push_u8(0b0000_0101);
                w.push_u8(((n_r & 0x7f) << 1) | (poll_final as u8));
            }
            Control::Reject { n_r, poll_final } => {
                w.push_u8(0b0000_1001);
                w.push_u8(((n_r & 0x7f) << 1) | (poll_final as u8));
            }
            Control::SetAsyncBalancedModeExtended { poll } => {
                w.push_u8(0b0110_1111 | ((poll as u8) << 4));
            }
            Control::DisconnectedMode { final_bit } => {
                w.push_u8(0b0000_1111 | ((final_bit as u8) << 4));
            }
            Control::Disconnect { poll } => {
                w.push_u8(0b0100_0011 | ((poll as u8) << 4));
            }
            Control::UnnumberedAcknowledge { final_bit } => {
                w.push_u8(0b0110_0011 | ((final_bit as u8) << 4));
            }
            Control::FrameReject { final_bit } => {
                w.push_u8(0b1000_0111 | ((final_bit as u8) << 4));
            }
            Control::UnnumberedInformation { poll } => {
                w.push_u8(0b0000_0011 | ((poll as u8) << 4));
            }
        }
    }

    pub fn is_information(&self) -> bool {
        matches!(self, Control::Information { .. })
    }
}

/// A decoded Q.921 frame: address, control, and (for I/UI frames) payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub address: Address,
    pub control: Control,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let mut r = OctetReader::new(bytes);
        let address = Address::decode(&mut r).map_err(|_| FrameError::Truncated)?;
        let control = Control::decode(&mut r)?;
        let payload = r.rest().to_vec();
        Ok(Frame { address, control, payload })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = OctetWriter::with_capacity(2 + 2 + self.payload.len());
        self.address.encode(&mut w);
        self.control.encode(&mut w);
        w.push_bytes(&self.payload);
        w.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trips() {
        let addr = Address { sapi: 0, command_response: true, tei: 64 };
        let mut w = OctetWriter::new();
        addr.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = OctetReader::new(&bytes);
        assert_eq!(Address::decode(&mut r).unwrap(), addr);
    }

    #[test]
    fn sabme_round_trips() {
        let mut w = OctetWriter::new();
        Control::SetAsyncBalancedModeExtended { poll: true }.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = OctetReader::new(&bytes);
        assert_eq!(Control::decode(&mut r).unwrap(), Control::SetAsyncBalancedModeExtended { poll: true });
    }

    #[test]
    fn i_frame_carries_sequence_numbers() {
        let mut w = OctetWriter::new();
        Control::Information { n_s: 5, n_r: 3, poll: false }.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = OctetReader::new(&bytes);
        assert_eq!(Control::decode(&mut r).unwrap(), Control::Information { n_s: 5, n_r: 3, poll: false });
    }
}
