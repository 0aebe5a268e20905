//! Restart indicator IE: a single class octet describing what a RESTART
//! applies to (spec §4.5/§8 "RESTART"). Class values grounded on
//! `examples/original_source/libpri/q931.c`'s `restart_ies[]`/class usage.

use pri_core::{CodecError, OctetReader, OctetWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartClass {
    IndicatedChannel,
    SingleInterface,
    AllInterfaces,
    Other(u8),
}

impl RestartClass {
    fn into_raw(self) -> u8 {
        match self {
            RestartClass::IndicatedChannel => 0,
            RestartClass::SingleInterface => 6,
            RestartClass::AllInterfaces => 7,
            RestartClass::Other(v) => v,
        }
    }

    fn from_raw(v: u8) -> Self {
        match v {
            0 => RestartClass::IndicatedChannel,
            6 => RestartClass::SingleInterface,
            7 => RestartClass::AllInterfaces,
            other => RestartClass::Other(other),
        }
    }
}

pub fn decode(bytes: &[u8]) -> Result<RestartClass, CodecError> {
    let mut r = OctetReader::new(bytes);
    let octet3 = r.read_u8("restart_indicator.octet3")?;
    Ok(RestartClass::from_raw(octet3 & 0x07))
}

pub fn encode(class: RestartClass, w: &mut OctetWriter) {
    w.push_u8(0x80 | class.into_raw());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_interface_round_trips() {
        let mut w = OctetWriter::new();
        encode(RestartClass::SingleInterface, &mut w);
        assert_eq!(decode(w.as_slice()).unwrap(), RestartClass::SingleInterface);
    }
}
