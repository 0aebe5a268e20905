//! Number IE shape shared by calling/called/connected/redirecting party
//! number (spec §4.2: "plan in low nybble of octet 3, presentation+
//! screening in octet 3a; number digits are IA5. Nul bytes found in IA5
//! fields are stripped and reported.").

use pri_core::{CodecError, OctetReader, OctetWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingPlan {
    Unknown,
    Isdn,
    National,
    Private,
    Other(u8),
}

impl NumberingPlan {
    fn into_raw(self) -> u8 {
        match self {
            NumberingPlan::Unknown => 0,
            NumberingPlan::Isdn => 1,
            NumberingPlan::National => 8,
            NumberingPlan::Private => 9,
            NumberingPlan::Other(v) => v,
        }
    }

    fn from_raw(v: u8) -> Self {
        match v {
            0 => NumberingPlan::Unknown,
            1 => NumberingPlan::Isdn,
            8 => NumberingPlan::National,
            9 => NumberingPlan::Private,
            other => NumberingPlan::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOfNumber {
    Unknown,
    International,
    National,
    NetworkSpecific,
    Subscriber,
    Abbreviated,
    Other(u8),
}

impl TypeOfNumber {
    fn into_raw(self) -> u8 {
        match self {
            TypeOfNumber::Unknown => 0,
            TypeOfNumber::International => 1,
            TypeOfNumber::National => 2,
            TypeOfNumber::NetworkSpecific => 3,
            TypeOfNumber::Subscriber => 4,
            TypeOfNumber::Abbreviated => 6,
            TypeOfNumber::Other(v) => v,
        }
    }

    fn from_raw(v: u8) -> Self {
        match v {
            0 => TypeOfNumber::Unknown,
            1 => TypeOfNumber::International,
            2 => TypeOfNumber::National,
            3 => TypeOfNumber::NetworkSpecific,
            4 => TypeOfNumber::Subscriber,
            6 => TypeOfNumber::Abbreviated,
            other => TypeOfNumber::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Allowed,
    Restricted,
    NumberNotAvailable,
    Reserved(u8),
}

impl Presentation {
    fn into_raw(self) -> u8 {
        match self {
            Presentation::Allowed => 0,
            Presentation::Restricted => 1,
            Presentation::NumberNotAvailable => 2,
            Presentation::Reserved(v) => v,
        }
    }

    fn from_raw(v: u8) -> Self {
        match v & 0x03 {
            0 => Presentation::Allowed,
            1 => Presentation::Restricted,
            2 => Presentation::NumberNotAvailable,
            other => Presentation::Reserved(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screening {
    UserProvidedNotScreened,
    UserProvidedVerifiedPassed,
    UserProvidedVerifiedFailed,
    NetworkProvided,
}

impl Screening {
    fn into_raw(self) -> u8 {
        match self {
            Screening::UserProvidedNotScreened => 0,
            Screening::UserProvidedVerifiedPassed => 1,
            Screening::UserProvidedVerifiedFailed => 2,
            Screening::NetworkProvided => 3,
        }
    }

    fn from_raw(v: u8) -> Self {
        match v & 0x03 {
            0 => Screening::UserProvidedNotScreened,
            1 => Screening::UserProvidedVerifiedPassed,
            2 => Screening::UserProvidedVerifiedFailed,
            _ => Screening::NetworkProvided,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyNumber {
    pub type_of_number: TypeOfNumber,
    pub plan: NumberingPlan,
    /// `None` when octet 3a (presentation/screening) is absent — legal for
    /// e.g. redirecting number's "original called number" variant.
    pub presentation: Option<Presentation>,
    pub screening: Option<Screening>,
    pub digits: String,
    /// Set when a NUL byte was found and stripped from the IA5 digit
    /// string (spec §4.2 "Nul bytes found in IA5 fields are stripped and
    /// reported").
    pub had_embedded_nul: bool,
}

pub fn decode(bytes: &[u8]) -> Result<PartyNumber, CodecError> {
    let mut r = OctetReader::new(bytes);
    let octet3 = r.read_u8("party_number.octet3")?;
    let type_of_number = TypeOfNumber::from_raw((octet3 >> 4) & 0x07);
    let plan = NumberingPlan::from_raw(octet3 & 0x0f);

    let (presentation, screening) = if octet3 & 0x80 == 0 {
        let octet3a = r.read_u8("party_number.octet3a")?;
        (Some(Presentation::from_raw((octet3a >> 5) & 0x03)), Some(Screening::from_raw(octet3a & 0x03)))
    } else {
        (None, None)
    };

    let mut had_embedded_nul = false;
    let digit_bytes: Vec<u8> = r
        .rest()
        .iter()
        .filter(|b| {
            if **b == 0 {
                had_embedded_nul = true;
                false
            } else {
                true
            }
        })
        .copied()
        .collect();
    let digits = String::from_utf8_lossy(&digit_bytes).into_owned();

    Ok(PartyNumber { type_of_number, plan, presentation, screening, digits, had_embedded_nul })
}

pub fn encode(value: &PartyNumber, w: &mut OctetWriter) {
    let ext = if value.presentation.is_some() { 0x00 } else { 0x80 };
    let octet3 = ext | ((value.type_of_number.into_raw() & 0x07) << 4) | (value.plan.into_raw() & 0x0f);
    w.push_u8(octet3);
    if let (Some(pres), Some(scr)) = (value.presentation, value.screening) {
        w.push_u8(0x80 | ((pres.into_raw() & 0x03) << 5) | (scr.into_raw() & 0x03));
    }
    w.push_bytes(value.digits.as_bytes());
}

impl PartyNumber {
    pub fn simple(digits: impl Into<String>) -> Self {
        PartyNumber {
            type_of_number: TypeOfNumber::Unknown,
            plan: NumberingPlan::Isdn,
            presentation: Some(Presentation::Allowed),
            screening: Some(Screening::UserProvidedNotScreened),
            digits: digits.into(),
            had_embedded_nul: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_number_round_trips() {
        let n = PartyNumber::simple("5551234");
        let mut w = OctetWriter::new();
        encode(&n, &mut w);
        let decoded = decode(w.as_slice()).unwrap();
        assert_eq!(decoded.digits, "5551234");
        assert_eq!(decoded.presentation, Some(Presentation::Allowed));
    }

    #[test]
    fn embedded_nul_is_stripped_and_reported() {
        let bytes = [0x80, b'1', 0x00, b'2'];
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.digits, "12");
        assert!(decoded.had_embedded_nul);
    }

    #[test]
    fn no_presentation_octet_when_absent() {
        let bytes = [0x80 | 0x01, b'1', b'2', b'3'];
        let decoded = decode(&bytes).unwrap();
        assert!(decoded.presentation.is_none());
        assert_eq!(decoded.digits, "123");
    }
}
