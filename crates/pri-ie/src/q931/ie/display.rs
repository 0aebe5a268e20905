//! Display IE: on Q.SIG/ETSI, bytes are raw IA5 with no charset octet;
//! elsewhere a leading `0xB1` charset octet is prepended on send (spec
//! §4.2, DESIGN.md Open Question #3).

use pri_core::{CodecError, OctetWriter, SwitchVariant};

const CHARSET_IA5: u8 = 0xb1;

pub fn decode(bytes: &[u8], variant: SwitchVariant) -> Result<String, CodecError> {
    let text_bytes = if variant.display_ie_omits_charset_octet() {
        bytes
    } else if bytes.first().copied() == Some(CHARSET_IA5) {
        &bytes[1..]
    } else {
        bytes
    };
    Ok(String::from_utf8_lossy(text_bytes).into_owned())
}

pub fn encode(text: &str, variant: SwitchVariant, w: &mut OctetWriter) {
    if !variant.display_ie_omits_charset_octet() {
        w.push_u8(CHARSET_IA5);
    }
    w.push_bytes(text.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn national_isdn_prepends_charset_octet() {
        let mut w = OctetWriter::new();
        encode("hello", SwitchVariant::NationalIsdn2, &mut w);
        assert_eq!(w.as_slice()[0], CHARSET_IA5);
        assert_eq!(decode(w.as_slice(), SwitchVariant::NationalIsdn2).unwrap(), "hello");
    }

    #[test]
    fn qsig_omits_charset_octet() {
        let mut w = OctetWriter::new();
        encode("hello", SwitchVariant::Qsig, &mut w);
        assert_eq!(w.as_slice(), b"hello");
        assert_eq!(decode(w.as_slice(), SwitchVariant::Qsig).unwrap(), "hello");
    }

    #[test]
    fn euro_isdn_omits_charset_octet() {
        let mut w = OctetWriter::new();
        encode("abc", SwitchVariant::EuroIsdnE1, &mut w);
        assert_eq!(w.as_slice(), b"abc");
    }
}
