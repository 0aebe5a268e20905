//! CallTransferComplete (Q.SIG) and EctInform (ETSI) argument codecs —
//! both notify the transferred party of the final remote number once a
//! transfer completes (spec §4.5 "Outgoing side... automatically emits
//! the correct supplementary notification for the current switch
//! variant").

use pri_core::{CodecError, OctetReader, OctetWriter};

use crate::ber::{self, Class, TagHeader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferredCallStatus {
    Active,
    Alerting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTransferComplete {
    pub status: TransferredCallStatus,
    pub redirection_number: Option<String>,
}

pub fn decode_call_transfer_complete(bytes: &[u8]) -> Result<CallTransferComplete, CodecError> {
    let mut r = OctetReader::new(bytes);
    let seq = ber::decode_tlv(&mut r)?;
    let mut sr = OctetReader::new(seq.value);
    let status_tlv = ber::decode_tlv(&mut sr)?;
    let status_raw = ber::decode_integer(status_tlv.value)?;
    let status = if status_raw == 0 { TransferredCallStatus::Active } else { TransferredCallStatus::Alerting };
    let redirection_number = if !sr.is_empty() {
        let tlv = ber::decode_tlv(&mut sr)?;
        Some(String::from_utf8_lossy(tlv.value).into_owned())
    } else {
        None
    };
    Ok(CallTransferComplete { status, redirection_number })
}

pub fn encode_call_transfer_complete(value: &CallTransferComplete, w: &mut OctetWriter) {
    let mut seq = OctetWriter::new();
    let status_raw = match value.status {
        TransferredCallStatus::Active => 0,
        TransferredCallStatus::Alerting => 1,
    };
    let mut status_bytes = OctetWriter::new();
    ber::encode_integer(status_raw, &mut status_bytes);
    ber::encode_tlv(
        TagHeader { class: Class::Universal, constructed: false, tag_number: 2 },
        status_bytes.as_slice(),
        &mut seq,
    );
    if let Some(n) = &value.redirection_number {
        ber::encode_tlv(
            TagHeader { class: Class::ContextSpecific, constructed: false, tag_number: 0 },
            n.as_bytes(),
            &mut seq,
        );
    }
    ber::encode_tlv(TagHeader { class: Class::Universal, constructed: true, tag_number: 0x10 }, seq.as_slice(), w);
}

/// EctInform: a single status octet, same semantics as
/// `CallTransferComplete` but ETSI's ECT supplementary service rather
/// than Q.SIG's call-transfer.
pub type EctInform = CallTransferComplete;

pub fn decode_ect_inform(bytes: &[u8]) -> Result<EctInform, CodecError> {
    decode_call_transfer_complete(bytes)
}

pub fn encode_ect_inform(value: &EctInform, w: &mut OctetWriter) {
    encode_call_transfer_complete(value, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_transfer_complete_round_trips() {
        let v = CallTransferComplete { status: TransferredCallStatus::Active, redirection_number: Some("300".into()) };
        let mut w = OctetWriter::new();
        encode_call_transfer_complete(&v, &mut w);
        assert_eq!(decode_call_transfer_complete(w.as_slice()).unwrap(), v);
    }
}
