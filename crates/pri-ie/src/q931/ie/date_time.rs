//! Date/time IE: BCD-free binary (year 1900-offset, month, day, optional
//! hour/min/sec). Only networks may send it (spec §4.2); enforced by the
//! caller checking `SwitchVariant::date_time_sendable`, not by this codec.

use pri_core::{CodecError, OctetReader, OctetWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
}

impl DateTime {
    pub fn date_only(year: u16, month: u8, day: u8) -> Self {
        DateTime { year, month, day, hour: None, minute: None, second: None }
    }
}

pub fn decode(bytes: &[u8]) -> Result<DateTime, CodecError> {
    let mut r = OctetReader::new(bytes);
    let year_offset = r.read_u8("date_time.year")?;
    let month = r.read_u8("date_time.month")?;
    let day = r.read_u8("date_time.day")?;
    let hour = if !r.is_empty() { Some(r.read_u8("date_time.hour")?) } else { None };
    let minute = if !r.is_empty() { Some(r.read_u8("date_time.minute")?) } else { None };
    let second = if !r.is_empty() { Some(r.read_u8("date_time.second")?) } else { None };
    Ok(DateTime { year: 1900 + year_offset as u16, month, day, hour, minute, second })
}

pub fn encode(value: &DateTime, w: &mut OctetWriter) {
    w.push_u8((value.year.saturating_sub(1900)) as u8);
    w.push_u8(value.month);
    w.push_u8(value.day);
    if let Some(h) = value.hour {
        w.push_u8(h);
    }
    if let Some(m) = value.minute {
        w.push_u8(m);
    }
    if let Some(s) = value.second {
        w.push_u8(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_round_trips() {
        let dt = DateTime::date_only(2026, 7, 26);
        let mut w = OctetWriter::new();
        encode(&dt, &mut w);
        assert_eq!(w.as_slice().len(), 3);
        let decoded = decode(w.as_slice()).unwrap();
        assert_eq!(decoded, dt);
    }

    #[test]
    fn full_date_time_round_trips() {
        let dt = DateTime { year: 2026, month: 7, day: 26, hour: Some(14), minute: Some(30), second: Some(0) };
        let mut w = OctetWriter::new();
        encode(&dt, &mut w);
        assert_eq!(decode(w.as_slice()).unwrap(), dt);
    }
}
