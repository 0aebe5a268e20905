//! Channel identification IE. BRI encodes B1/B2 in 2 bits; PRI encodes by
//! slot map (3 or 4 octets) or by channel number; "logical channel
//! mapping" mode skips slot 16 (the D-channel slot) so caller-visible
//! channels 17+ map to wire channels 18+ (spec §4.2).

use pri_core::{CodecError, OctetReader, OctetWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelection {
    /// BRI: which of the two B channels (1 or 2), or "any".
    BriChannel(Option<u8>),
    /// PRI: explicit channel number.
    ChannelNumber(u8),
    /// PRI: slot map, one bit per DS1 slot (bit N-1 == slot N in use).
    SlotMap(Vec<u8>),
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelId {
    pub exclusive: bool,
    pub d_channel_indicated: bool,
    pub interface_implicit: bool,
    pub selection: ChannelSelection,
}

/// Wire channel number for a caller-visible channel number under "logical
/// channel mapping" (spec §4.2: caller-visible 17+ maps to wire 18+,
/// skipping slot 16, the D-channel slot).
pub fn to_wire_channel(caller_visible: u8, logical_channel_mapping: bool) -> u8 {
    if logical_channel_mapping && caller_visible >= 16 {
        caller_visible + 1
    } else {
        caller_visible
    }
}

pub fn from_wire_channel(wire: u8, logical_channel_mapping: bool) -> u8 {
    if logical_channel_mapping && wire >= 17 {
        wire - 1
    } else {
        wire
    }
}

impl ChannelId {
    pub fn decode(bytes: &[u8], is_bri: bool) -> Result<Self, CodecError> {
        let mut r = OctetReader::new(bytes);
        let octet3 = r.read_u8("channel_id.octet3")?;
        let interface_implicit = octet3 & 0x40 == 0;
        let d_channel_indicated = octet3 & 0x08 != 0;
        let exclusive = octet3 & 0x08 != 0 && octet3 & 0x10 != 0;

        if is_bri {
            let chan = octet3 & 0x03;
            let selection = match chan {
                0 => ChannelSelection::Any,
                1 => ChannelSelection::BriChannel(Some(1)),
                2 => ChannelSelection::BriChannel(Some(2)),
                _ => ChannelSelection::BriChannel(None),
            };
            return Ok(ChannelId { exclusive, d_channel_indicated, interface_implicit, selection });
        }

        let channel_type = octet3 & 0x03;
        if r.is_empty() {
            return Ok(ChannelId {
                exclusive,
                d_channel_indicated,
                interface_implicit,
                selection: ChannelSelection::Any,
            });
        }
        let octet3_1 = r.read_u8("channel_id.octet3.1")?;
        let selection = if channel_type == 0x03 {
            // slot map form: remaining octets are the bitmap, octet3.1 is the first.
            let mut bits = vec![octet3_1 & 0x7f];
            bits.extend_from_slice(r.rest());
            ChannelSelection::SlotMap(bits)
        } else {
            ChannelSelection::ChannelNumber(octet3_1 & 0x7f)
        };
        Ok(ChannelId { exclusive, d_channel_indicated, interface_implicit, selection })
    }

    pub fn encode(&self, w: &mut OctetWriter, is_bri: bool) {
        let mut octet3 = 0x80 | 0x20; // ext bit, coding standard CCITT
        if !self.interface_implicit {
            octet3 |= 0x40;
        }
        if self.d_channel_indicated {
            octet3 |= 0x08;
        }
        if self.exclusive {
            octet3 |= 0x10;
        }
        if is_bri {
            let chan = match self.selection {
                ChannelSelection::Any => 0,
                ChannelSelection::BriChannel(Some(1)) => 1,
                ChannelSelection::BriChannel(Some(2)) => 2,
                ChannelSelection::BriChannel(None) => 3,
                _ => 0,
            };
            w.push_u8(octet3 | chan);
            return;
        }
        match &self.selection {
            ChannelSelection::Any => {
                w.push_u8(octet3 | 0x01);
            }
            ChannelSelection::ChannelNumber(n) => {
                w.push_u8(octet3 | 0x01);
                w.push_u8(0x80 | (n & 0x7f));
            }
            ChannelSelection::SlotMap(bits) => {
                w.push_u8(octet3 | 0x03);
                if let Some((first, rest)) = bits.split_first() {
                    w.push_u8(0x80 | (first & 0x7f));
                    w.push_bytes(rest);
                }
            }
            ChannelSelection::BriChannel(_) => {
                w.push_u8(octet3 | 0x01);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_channel_mapping_skips_slot_16() {
        assert_eq!(to_wire_channel(16, true), 16);
        assert_eq!(to_wire_channel(17, true), 18);
        assert_eq!(to_wire_channel(23, true), 24);
        assert_eq!(from_wire_channel(18, true), 17);
    }

    #[test]
    fn no_mapping_is_identity() {
        assert_eq!(to_wire_channel(17, false), 17);
    }

    #[test]
    fn pri_channel_number_round_trips() {
        let cid = ChannelId {
            exclusive: true,
            d_channel_indicated: false,
            interface_implicit: true,
            selection: ChannelSelection::ChannelNumber(5),
        };
        let mut w = OctetWriter::new();
        cid.encode(&mut w, false);
        let decoded = ChannelId::decode(w.as_slice(), false).unwrap();
        assert_eq!(decoded.selection, ChannelSelection::ChannelNumber(5));
        assert!(decoded.exclusive);
    }
}
