//! AOC (Advice of Charge) argument codecs, currency and charging-unit
//! variants, grounded on `examples/original_source/libpri/pri_aoc.c`'s
//! ETSI amount/time/recorded-currency/recorded-units structures.

use pri_core::{CodecError, OctetReader, OctetWriter};

use crate::ber::{self, Class, TagHeader};

/// A charged amount: a fixed-point value and an exponent applied as
/// `value * 10^exponent` (pri_aoc.c `roseEtsiAOCAmount`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    pub currency: i64,
    pub multiplier_exponent: i8,
}

/// AOC-D/AOC-E currency-unit argument: a running total plus billing id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AocCurrency {
    pub amount: Amount,
    /// ISO 4217-ish 3-letter currency id is carried as a separate IA5
    /// string IE in the full ETSI ASN.1 module; this engine's argument
    /// shape keeps only the numeric fields call accounting needs.
    pub billing_id: Option<i64>,
}

pub fn decode_currency(bytes: &[u8]) -> Result<AocCurrency, CodecError> {
    let mut r = OctetReader::new(bytes);
    let seq = ber::decode_tlv(&mut r)?;
    let mut sr = OctetReader::new(seq.value);
    let currency_tlv = ber::decode_tlv(&mut sr)?;
    let currency = ber::decode_integer(currency_tlv.value)?;
    let exponent_tlv = ber::decode_tlv(&mut sr)?;
    let multiplier_exponent = ber::decode_integer(exponent_tlv.value)? as i8;
    let billing_id = if !sr.is_empty() {
        let tlv = ber::decode_tlv(&mut sr)?;
        Some(ber::decode_integer(tlv.value)?)
    } else {
        None
    };
    Ok(AocCurrency { amount: Amount { currency, multiplier_exponent }, billing_id })
}

pub fn encode_currency(value: &AocCurrency, w: &mut OctetWriter) {
    let mut seq = OctetWriter::new();
    encode_int(value.amount.currency, 2, &mut seq);
    encode_int(value.amount.multiplier_exponent as i64, 2, &mut seq);
    if let Some(id) = value.billing_id {
        encode_int(id, 2, &mut seq);
    }
    ber::encode_tlv(TagHeader { class: Class::Universal, constructed: true, tag_number: 0x10 }, seq.as_slice(), w);
}

/// AOC charging-unit argument: a recorded unit count (pri_aoc.c
/// `roseEtsiAOCRecordedUnitsList`, collapsed to its scalar case).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AocChargingUnit {
    pub recorded_units: i64,
}

pub fn decode_charging_unit(bytes: &[u8]) -> Result<AocChargingUnit, CodecError> {
    let mut r = OctetReader::new(bytes);
    let seq = ber::decode_tlv(&mut r)?;
    let mut sr = OctetReader::new(seq.value);
    let tlv = ber::decode_tlv(&mut sr)?;
    Ok(AocChargingUnit { recorded_units: ber::decode_integer(tlv.value)? })
}

pub fn encode_charging_unit(value: &AocChargingUnit, w: &mut OctetWriter) {
    let mut seq = OctetWriter::new();
    encode_int(value.recorded_units, 2, &mut seq);
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
    fn currency_round_trips() {
        let v = AocCurrency { amount: Amount { currency: 500, multiplier_exponent: -2 }, billing_id: Some(1) };
        let mut w = OctetWriter::new();
        encode_currency(&v, &mut w);
        assert_eq!(decode_currency(w.as_slice()).unwrap(), v);
    }

    #[test]
    fn charging_unit_round_trips() {
        let v = AocChargingUnit { recorded_units: 42 };
        let mut w = OctetWriter::new();
        encode_charging_unit(&v, &mut w);
        assert_eq!(decode_charging_unit(w.as_slice()).unwrap(), v);
    }
}
