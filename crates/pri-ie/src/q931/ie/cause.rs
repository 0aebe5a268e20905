//! Cause IE: coding standard + location in octet 3, cause value in octet 4,
//! diagnostic octets retained only for debug (spec §4.2).

use pri_core::{CauseLocation, CauseValue, CodecError, CodingStandard, OctetReader, OctetWriter};

pub fn decode(bytes: &[u8]) -> Result<CauseValue, CodecError> {
    let mut r = OctetReader::new(bytes);
    let octet3 = r.read_u8("cause.octet3")?;
    if octet3 & 0x80 == 0 {
        // extension octet 3a present and unused by this engine; skip it.
        r.read_u8("cause.octet3a")?;
    }
    let coding_standard = CodingStandard::from_raw((octet3 >> 5) & 0x03);
    let location = CauseLocation::from_raw(octet3 & 0x0f);
    let octet4 = r.read_u8("cause.octet4")?;
    let cause = pri_core::Cause::from_raw(octet4 & 0x7f);
    let diagnostics = r.rest().to_vec();
    Ok(CauseValue { coding_standard, location, cause, diagnostics })
}

pub fn encode(value: &CauseValue, w: &mut OctetWriter) {
    let octet3 = 0x80 | (value.coding_standard.into_raw() << 5) | value.location.into_raw();
    w.push_u8(octet3);
    w.push_u8(0x80 | value.cause.into_raw());
    w.push_bytes(&value.diagnostics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pri_core::Cause;

    #[test]
    fn normal_clearing_round_trips() {
        let v = CauseValue::new(Cause::NormalClearing, CauseLocation::PrivateNetworkLocalUser);
        let mut w = OctetWriter::new();
        encode(&v, &mut w);
        let decoded = decode(w.as_slice()).unwrap();
        assert_eq!(decoded.cause, Cause::NormalClearing);
        assert_eq!(decoded.location, CauseLocation::PrivateNetworkLocalUser);
    }
}
