//! Progress indicator IE: coding standard + location in octet 3, progress
//! description in octet 4. Description values grounded on
//! `examples/original_source/libpri/q931.c`'s `Q931_PROG_*` constants.

use pri_core::{CodecError, OctetReader, OctetWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressDescription {
    NetworkNonIsdnCalledEnd,
    DestinationNonIsdn,
    OriginNonIsdn,
    CallReturnedToIsdn,
    InterworkingOccurred,
    InBandInformationAvailable,
    Other(u8),
}

impl ProgressDescription {
    fn into_raw(self) -> u8 {
        match self {
            ProgressDescription::CallReturnedToIsdn => 1,
            ProgressDescription::DestinationNonIsdn => 2,
            ProgressDescription::OriginNonIsdn => 3,
            ProgressDescription::NetworkNonIsdnCalledEnd => 4,
            ProgressDescription::InBandInformationAvailable => 8,
            ProgressDescription::InterworkingOccurred => 0x20,
            ProgressDescription::Other(v) => v,
        }
    }

    fn from_raw(v: u8) -> Self {
        match v {
            1 => ProgressDescription::CallReturnedToIsdn,
            2 => ProgressDescription::DestinationNonIsdn,
            3 => ProgressDescription::OriginNonIsdn,
            4 => ProgressDescription::NetworkNonIsdnCalledEnd,
            8 => ProgressDescription::InBandInformationAvailable,
            0x20 => ProgressDescription::InterworkingOccurred,
            other => ProgressDescription::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressIndicator {
    pub coding_standard: u8,
    pub location: u8,
    pub description: ProgressDescription,
}

pub fn decode(bytes: &[u8]) -> Result<ProgressIndicator, CodecError> {
    let mut r = OctetReader::new(bytes);
    let octet3 = r.read_u8("progress_indicator.octet3")?;
    let octet4 = r.read_u8("progress_indicator.octet4")?;
    Ok(ProgressIndicator {
        coding_standard: (octet3 >> 5) & 0x03,
        location: octet3 & 0x0f,
        description: ProgressDescription::from_raw(octet4 & 0x7f),
    })
}

pub fn encode(value: &ProgressIndicator, w: &mut OctetWriter) {
    w.push_u8(0x80 | ((value.coding_standard & 0x03) << 5) | (value.location & 0x0f));
    w.push_u8(0x80 | value.description.into_raw());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_band_available_round_trips() {
        let pi = ProgressIndicator { coding_standard: 0, location: 1, description: ProgressDescription::InBandInformationAvailable };
        let mut w = OctetWriter::new();
        encode(&pi, &mut w);
        assert_eq!(decode(w.as_slice()).unwrap(), pi);
    }
}
