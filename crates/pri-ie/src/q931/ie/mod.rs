//! Generic information-element framework: codeset shifts, the Type-1
//! (single-octet) / Type-2+ (tag/length/value) tag model, and message
//! assembly support.
//!
//! Grounded on `tetra-core::typed_pdu_fields` (obit/mbit-delimited
//! optional-field handling) and `tetra-pdus::cmce::pdus::d_setup`'s
//! ordered-field assembly, adapted from bit-packed PDU fields to the
//! octet-aligned tag/length/value shape Q.931 actually uses.

pub mod bearer_capability;
pub mod calling_number;
pub mod cause;
pub mod channel_id;
pub mod date_time;
pub mod display;
pub mod progress_indicator;
pub mod restart_indicator;

use pri_core::{CodecError, OctetReader, OctetWriter};

/// Non-locking shift base (applies to the next IE only).
pub const NON_LOCKING_SHIFT_BASE: u8 = 0x90;
/// Locking shift base (applies until the next locking shift).
pub const LOCKING_SHIFT_BASE: u8 = 0x98;

/// Tracks the current codeset while parsing or assembling an IE list
/// (spec §4.2 "Codeset shifts").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodesetState {
    locked: u8,
    non_locking: Option<u8>,
}

impl Default for CodesetState {
    fn default() -> Self {
        CodesetState { locked: 0, non_locking: None }
    }
}

impl CodesetState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The codeset that applies to the *next* IE read/written.
    pub fn active(&self) -> u8 {
        self.non_locking.unwrap_or(self.locked)
    }

    /// Consume the non-locking shift (if any) after one IE has been
    /// processed under it.
    pub fn ie_consumed(&mut self) {
        self.non_locking = None;
    }

    /// Apply a shift octet (`0x90|n` or `0x98|n`). Returns an error for an
    /// illegal locking shift (to codeset 0, or to a lower codeset — spec
    /// §4.2).
    pub fn apply_shift(&mut self, octet: u8) -> Result<(), CodecError> {
        let n = octet & 0x07;
        if octet & 0xf8 == LOCKING_SHIFT_BASE {
            if n == 0 {
                return Err(CodecError::Inconsistency {
                    field: "q931.codeset_shift",
                    reason: "locking shift to codeset 0 is illegal",
                });
            }
            if n < self.locked {
                return Err(CodecError::Inconsistency {
                    field: "q931.codeset_shift",
                    reason: "locking shift to a lower codeset is illegal",
                });
            }
            self.locked = n;
            self.non_locking = None;
        } else if octet & 0xf8 == NON_LOCKING_SHIFT_BASE {
            self.non_locking = Some(n);
        } else {
            return Err(CodecError::InvalidTag(octet));
        }
        Ok(())
    }

    pub fn is_shift_octet(octet: u8) -> bool {
        octet & 0xf8 == NON_LOCKING_SHIFT_BASE || octet & 0xf8 == LOCKING_SHIFT_BASE
    }
}

/// One information element as parsed off the wire, before per-tag decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIe {
    pub codeset: u8,
    pub tag: u8,
    /// `None` for Type-1 (single-octet) IEs.
    pub value: Option<Vec<u8>>,
}

impl RawIe {
    pub fn is_single_octet(&self) -> bool {
        self.tag & 0x80 != 0
    }
}

/// Splits an IE list (the portion of a Q.931 message after the message
/// type) into raw, codeset-tagged IEs. Does not interpret IE contents.
pub fn split_ies(bytes: &[u8]) -> Result<Vec<RawIe>, CodecError> {
    let mut r = OctetReader::new(bytes);
    let mut codeset = CodesetState::new();
    let mut out = Vec::new();
    while !r.is_empty() {
        let tag = r.read_u8("q931.ie.tag")?;
        if CodesetState::is_shift_octet(tag) {
            codeset.apply_shift(tag)?;
            continue;
        }
        let active = codeset.active();
        if tag & 0x80 != 0 {
            out.push(RawIe { codeset: active, tag, value: None });
        } else {
            let len = r.read_u8("q931.ie.length")? as usize;
            let value = r.read_bytes(len, "q931.ie.value")?.to_vec();
            out.push(RawIe { codeset: active, tag, value: Some(value) });
        }
        codeset.ie_consumed();
    }
    Ok(out)
}

/// Appends one IE to an assembling message buffer, inserting a codeset
/// shift octet first if `tag`'s codeset differs from what's currently
/// active (spec §4.2 "Message assembly ordering").
pub fn push_ie(w: &mut OctetWriter, codeset: &mut CodesetState, target_codeset: u8, tag: u8, value: Option<&[u8]>) {
    if target_codeset != codeset.active() {
        w.push_u8(NON_LOCKING_SHIFT_BASE | (target_codeset & 0x07));
        codeset.non_locking = Some(target_codeset);
    }
    w.push_u8(tag);
    if let Some(v) = value {
        w.push_u8(v.len() as u8);
        w.push_bytes(v);
    }
    codeset.ie_consumed();
}

/// Well-known codeset-0 IE tags this engine understands (spec §4.2).
pub mod tag {
    pub const SEGMENTED_MESSAGE: u8 = 0x00;
    pub const BEARER_CAPABILITY: u8 = 0x04;
    pub const CAUSE: u8 = 0x08;
    pub const CALL_IDENTITY: u8 = 0x10;
    pub const CALL_STATE: u8 = 0x14;
    pub const CHANNEL_IDENTIFICATION: u8 = 0x18;
    pub const PROGRESS_INDICATOR: u8 = 0x1e;
    pub const NETWORK_SPECIFIC_FACILITY: u8 = 0x20;
    pub const NOTIFICATION_INDICATOR: u8 = 0x27;
    pub const DISPLAY: u8 = 0x28;
    pub const DATE_TIME: u8 = 0x29;
    pub const KEYPAD_FACILITY: u8 = 0x2c;
    pub const SIGNAL: u8 = 0x34;
    pub const CONNECTED_NUMBER: u8 = 0x4c;
    pub const CALLING_PARTY_NUMBER: u8 = 0x6c;
    pub const CALLING_PARTY_SUBADDRESS: u8 = 0x6d;
    pub const CALLED_PARTY_NUMBER: u8 = 0x70;
    pub const CALLED_PARTY_SUBADDRESS: u8 = 0x71;
    pub const REDIRECTING_NUMBER: u8 = 0x74;
    pub const TRANSIT_NETWORK_SELECTION: u8 = 0x78;
    pub const RESTART_INDICATOR: u8 = 0x79;
    pub const LOW_LAYER_COMPATIBILITY: u8 = 0x7c;
    pub const HIGH_LAYER_COMPATIBILITY: u8 = 0x7d;
    pub const USER_USER: u8 = 0x7e;
    pub const FACILITY: u8 = 0x1c;

    // Type-1 single-octet tags.
    pub const SENDING_COMPLETE: u8 = 0xa1;
    pub const CONGESTION_LEVEL: u8 = 0xb0;
    pub const REPEAT_INDICATOR: u8 = 0xd0;
}
