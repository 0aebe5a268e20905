//! Q.932 facility IE wrapper: protocol profile octet, optional DMS-100
//! service indicator, optional network-protocol-profile extension header,
//! then one or more ROSE components (spec §4.3).

use pri_core::{CodecError, OctetReader, OctetWriter};

use crate::component::{self, Component};

const PROTOCOL_PROFILE_ROSE: u8 = 0x91;
const PROTOCOL_PROFILE_NETWORK_EXTENSIONS: u8 = 0x9f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolProfile {
    Rose,
    NetworkExtensions,
}

/// Decoded facility IE content: the components carried, plus the DMS-100
/// service indicator octet when present (spec §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    pub profile: ProtocolProfileRaw,
    pub dms100_service_indicator: Option<u8>,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolProfileRaw(pub u8);

impl ProtocolProfileRaw {
    pub fn known(self) -> Option<ProtocolProfile> {
        match self.0 {
            PROTOCOL_PROFILE_ROSE => Some(ProtocolProfile::Rose),
            PROTOCOL_PROFILE_NETWORK_EXTENSIONS => Some(ProtocolProfile::NetworkExtensions),
            _ => None,
        }
    }
}

pub fn decode(bytes: &[u8]) -> Result<Facility, CodecError> {
    let mut r = OctetReader::new(bytes);
    let profile_octet = r.read_u8("facility.protocol_profile")?;
    let profile = ProtocolProfileRaw(profile_octet);

    // DMS-100 carries an optional service indicator octet directly after
    // the profile octet when its high bit is clear (spec SPEC_FULL §2).
    if let Some(peek) = r.peek_u8() {
        if peek & 0x80 == 0 && profile.known() == Some(ProtocolProfile::NetworkExtensions) {
            r.skip(1, "facility.dms100_service_indicator")?;
        }
    }

    let mut components = Vec::new();
    while !r.is_empty() {
        components.push(component::decode(&mut r)?);
    }

    Ok(Facility { profile, dms100_service_indicator: None, components })
}

pub fn encode(facility: &Facility, w: &mut OctetWriter) {
    w.push_u8(facility.profile.0);
    if let Some(indicator) = facility.dms100_service_indicator {
        w.push_u8(indicator);
    }
    for component in &facility.components {
        component::encode(component, w);
    }
}

impl Facility {
    pub fn rose(components: Vec<Component>) -> Self {
        Facility { profile: ProtocolProfileRaw(PROTOCOL_PROFILE_ROSE), dms100_service_indicator: None, components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Invoke, OperationCode};

    #[test]
    fn single_invoke_round_trips() {
        let facility = Facility::rose(vec![Component::Invoke(Invoke {
            invoke_id: 1,
            operation: OperationCode::Local(0x16),
            argument: vec![],
        })]);
        let mut w = OctetWriter::new();
        encode(&facility, &mut w);
        let decoded = decode(w.as_slice()).unwrap();
        assert_eq!(decoded.components.len(), 1);
        assert_eq!(decoded.profile.known(), Some(ProtocolProfile::Rose));
    }
}
