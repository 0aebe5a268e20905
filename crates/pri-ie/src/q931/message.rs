//! Message assembly: ordered IE list (mandatory-first by tag number) plus
//! the mandatory-IE table used to flag incomplete incoming messages (spec
//! §4.2 "Message assembly ordering").

use std::collections::HashMap;

use crate::q931::header::MessageType;
use crate::q931::ie::{tag, RawIe};

/// An IE with its target codeset, keyed for assembly ordering.
#[derive(Debug, Clone)]
pub struct OutgoingIe {
    pub codeset: u8,
    pub tag: u8,
    pub value: Option<Vec<u8>>,
}

impl OutgoingIe {
    pub fn codeset0(tag: u8, value: Vec<u8>) -> Self {
        OutgoingIe { codeset: 0, tag, value: Some(value) }
    }

    pub fn single_octet(tag: u8) -> Self {
        OutgoingIe { codeset: 0, tag, value: None }
    }
}

/// Sorts a set of IEs the caller wants to send into Q.931's mandatory-
/// first, numerical-tag order. The caller supplies `order` purely as
/// "which IEs exist"; this function does not invent content.
pub fn assemble_order(mut ies: Vec<OutgoingIe>) -> Vec<OutgoingIe> {
    ies.sort_by_key(|ie| (ie.codeset, ie.tag));
    ies
}

/// Which IE tags are mandatory for a given message type, per this
/// engine's supported message set (spec §4.2/§4.5). Conservative: only
/// the message types whose SETUP/CONNECT/RELEASE exchanges this engine
/// actually checks are listed; others have an empty mandatory set and
/// rely on the state machine's own validation.
pub fn mandatory_tags(msg: MessageType) -> &'static [u8] {
    match msg {
        MessageType::Setup => &[tag::BEARER_CAPABILITY, tag::CHANNEL_IDENTIFICATION],
        MessageType::Release | MessageType::ReleaseComplete | MessageType::Disconnect => &[tag::CAUSE],
        _ => &[],
    }
}

/// Checks a decoded IE list against the message type's mandatory set.
/// Returns the list of missing mandatory tags (empty if none).
pub fn missing_mandatory(msg: MessageType, ies: &[RawIe]) -> Vec<u8> {
    let present: HashMap<u8, ()> = ies.iter().filter(|ie| ie.codeset == 0).map(|ie| (ie.tag, ())).collect();
    mandatory_tags(msg).iter().copied().filter(|t| !present.contains_key(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_missing_bearer_capability_is_flagged() {
        let ies = vec![RawIe { codeset: 0, tag: tag::CHANNEL_IDENTIFICATION, value: Some(vec![0x81]) }];
        let missing = missing_mandatory(MessageType::Setup, &ies);
        assert_eq!(missing, vec![tag::BEARER_CAPABILITY]);
    }

    #[test]
    fn assembly_is_tag_ordered() {
        let ies = vec![
            OutgoingIe::codeset0(tag::CAUSE, vec![0x80, 0x90]),
            OutgoingIe::codeset0(tag::BEARER_CAPABILITY, vec![0x80]),
        ];
        let ordered = assemble_order(ies);
        assert_eq!(ordered[0].tag, tag::BEARER_CAPABILITY);
        assert_eq!(ordered[1].tag, tag::CAUSE);
    }
}
