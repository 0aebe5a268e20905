//! DivertingLegInformation1/2/3 argument codecs (spec §4.3, §4.5
//! "redirecting updates").

use pri_core::{CodecError, OctetReader, OctetWriter};

use crate::ber::{self, Class, TagHeader};

/// DivertingLegInformation2: diversion reason plus the original and last
/// redirecting party numbers, carried as raw digit strings here (the full
/// number-presentation envelope is applied by the engine using
/// `pri-ie::q931::ie::calling_number`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivertingLegInformation2 {
    pub diversion_counter: i64,
    pub diversion_reason: u8,
    pub diverting_number: Option<String>,
    pub original_called_number: Option<String>,
}

pub fn decode_info2(bytes: &[u8]) -> Result<DivertingLegInformation2, CodecError> {
    let mut r = OctetReader::new(bytes);
    let seq = ber::decode_tlv(&mut r)?;
    let mut sr = OctetReader::new(seq.value);

    let counter_tlv = ber::decode_tlv(&mut sr)?;
    let diversion_counter = ber::decode_integer(counter_tlv.value)?;
    let reason_tlv = ber::decode_tlv(&mut sr)?;
    let diversion_reason = ber::decode_integer(reason_tlv.value)? as u8;

    let mut diverting_number = None;
    let mut original_called_number = None;
    while !sr.is_empty() {
        let tlv = ber::decode_tlv(&mut sr)?;
        let text = String::from_utf8_lossy(tlv.value).into_owned();
        match tlv.header.tag_number {
            // context [0] divertingNr, [1] originalCalledNr (simplified numbering).
            0 => diverting_number = Some(text),
            1 => original_called_number = Some(text),
            _ => {}
        }
    }
    Ok(DivertingLegInformation2 { diversion_counter, diversion_reason, diverting_number, original_called_number })
}

pub fn encode_info2(value: &DivertingLegInformation2, w: &mut OctetWriter) {
    let mut seq = OctetWriter::new();
    encode_int(value.diversion_counter, 2, &mut seq);
    encode_int(value.diversion_reason as i64, 10, &mut seq);
    if let Some(n) = &value.diverting_number {
        ber::encode_tlv(
            TagHeader { class: Class::ContextSpecific, constructed: false, tag_number: 0 },
            n.as_bytes(),
            &mut seq,
        );
    }
    if let Some(n) = &value.original_called_number {
        ber::encode_tlv(
            TagHeader { class: Class::ContextSpecific, constructed: false, tag_number: 1 },
            n.as_bytes(),
            &mut seq,
        );
    }
    ber::encode_tlv(TagHeader { class: Class::Universal, constructed: true, tag_number: 0x10 }, seq.as_slice(), w);
}

/// DivertingLegInformation1/3 share the simpler shape: just a
/// presentation-restricted subscriber number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivertingLegInformationSimple {
    pub presentation_allowed: bool,
    pub number: Option<String>,
}

pub fn decode_simple(bytes: &[u8]) -> Result<DivertingLegInformationSimple, CodecError> {
    let mut r = OctetReader::new(bytes);
    let seq = ber::decode_tlv(&mut r)?;
    let mut sr = OctetReader::new(seq.value);
    let pres_tlv = ber::decode_tlv(&mut sr)?;
    let presentation_allowed = ber::decode_integer(pres_tlv.value)? == 0;
    let number = if !sr.is_empty() {
        let tlv = ber::decode_tlv(&mut sr)?;
        Some(String::from_utf8_lossy(tlv.value).into_owned())
    } else {
        None
    };
    Ok(DivertingLegInformationSimple { presentation_allowed, number })
}

pub fn encode_simple(value: &DivertingLegInformationSimple, w: &mut OctetWriter) {
    let mut seq = OctetWriter::new();
    encode_int(if value.presentation_allowed { 0 } else { 1 }, 10, &mut seq);
    if let Some(n) = &value.number {
        ber::encode_tlv(
            TagHeader { class: Class::ContextSpecific, constructed: false, tag_number: 0 },
            n.as_bytes(),
            &mut seq,
        );
    }
    ber::encode_tlv(TagHeader { class: Class::Universal, constructed: true, tag_number: 0x10 }, seq.as_slice(), w);
}

fn encode_int(value: i64, tag_number: u32, w: &mut OctetWriter) {
    let mut bytes = OctetWriter::new();
    ber::encode_integer(value, &mut bytes);
    ber::encode_tlv(TagHeader { class: Class::Universal, constructed: false, tag_number }, bytes.as_slice(), w);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info2_round_trips() {
        let v = DivertingLegInformation2 {
            diversion_counter: 1,
            diversion_reason: 2,
            diverting_number: Some("5551000".into()),
            original_called_number: None,
        };
        let mut w = OctetWriter::new();
        encode_info2(&v, &mut w);
        assert_eq!(decode_info2(w.as_slice()).unwrap(), v);
    }

    #[test]
    fn simple_round_trips() {
        let v = DivertingLegInformationSimple { presentation_allowed: false, number: Some("200".into()) };
        let mut w = OctetWriter::new();
        encode_simple(&v, &mut w);
        assert_eq!(decode_simple(w.as_slice()).unwrap(), v);
    }
}
