//! Thin facade of external entry points over [`Controller`] (spec §4.7).
//!
//! Each function here validates call-pool membership before acting and
//! otherwise defers straight to the controller/FSM — this layer exists so
//! a host only ever calls simple, validated functions rather than reaching
//! into the call pool or FSM modules directly.

use pri_core::{Cause, CauseLocation, CauseValue};
use pri_ie::q931::header::{Header, MessageType, ProtocolDiscriminator};
use pri_ie::q931::ie::tag;
use pri_ie::q931::ie::{channel_id, restart_indicator};
use pri_ie::q931::message::{assemble_order, OutgoingIe};

use crate::call::{Call, CallHandle};
use crate::controller::Controller;
use crate::q931::fsm;

/// A request to originate an outgoing call (spec §4.7 "outgoing-setup-
/// request builder").
#[derive(Debug, Clone, Default)]
pub struct SetupRequest {
    pub called_number: Option<String>,
    pub calling_number: Option<String>,
    pub channel: Option<u8>,
    pub exclusive: bool,
    pub overlap: bool,
}

pub(crate) fn encode_message(header: &Header, ies: Vec<OutgoingIe>) -> Vec<u8> {
    let mut w = pri_core::OctetWriter::new();
    header.encode(&mut w);
    let mut codeset = pri_ie::q931::ie::CodesetState::new();
    for ie in assemble_order(ies) {
        pri_ie::q931::ie::push_ie(&mut w, &mut codeset, ie.codeset, ie.tag, ie.value.as_deref());
    }
    w.into_vec()
}

/// Create a call record and send SETUP (spec §4.7 "setup"). On a
/// point-to-multipoint (BRI-PTMP, network side) layout the SETUP is
/// broadcast over TEI 127 rather than addressed to this link's own TEI,
/// and T312 (not T303) supervises the race among responding TEs (spec
/// §4.4/§8 "NT-PTMP broadcast SETUP").
pub fn setup(ctl: &mut Controller, req: SetupRequest) -> Option<CallHandle> {
    let call_ref = ctl.alloc_call_ref()?;
    let handle = ctl.call_pool_mut().insert(Call::new(call_ref));
    let mut outcome = {
        let call = ctl.call_pool_mut().get_mut(handle)?;
        let outcome = fsm::handle_originate(call, req.overlap);
        call.calling_number = req.calling_number.clone();
        call.called_number = req.called_number.clone();
        call.channel = req.channel;
        call.exclusive = req.exclusive;
        outcome
    };

    let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::Setup };
    let mut ies = vec![OutgoingIe::codeset0(tag::BEARER_CAPABILITY, vec![0x80, 0x90, 0xa3])];
    if let Some(chan) = req.channel {
        let cid = channel_id::ChannelId {
            exclusive: req.exclusive,
            d_channel_indicated: false,
            interface_implicit: true,
            selection: channel_id::ChannelSelection::ChannelNumber(chan),
        };
        let mut w = pri_core::OctetWriter::new();
        cid.encode(&mut w, ctl.config.layout.is_bri());
        ies.push(OutgoingIe::codeset0(tag::CHANNEL_IDENTIFICATION, w.into_vec()));
    }
    if let Some(digits) = &req.called_number {
        ies.push(OutgoingIe::codeset0(tag::CALLED_PARTY_NUMBER, encode_called_number(digits)));
    }
    let payload = encode_message(&header, ies);

    let broadcast = ctl.config.layout.is_point_to_multipoint() && ctl.config.side == pri_core::Side::Network;
    if broadcast {
        outcome.arm_timer = Some(pri_core::TimerIndex::T312);
    }
    if let Some(call) = ctl.call_pool_mut().get_mut(handle) {
        call.pending_retransmit = Some(payload.clone());
        call.outboundbroadcast = broadcast;
    }
    if broadcast {
        ctl.transmit_broadcast(payload);
    } else {
        ctl.transmit_i(payload);
    }
    ctl.apply_outcome(handle, outcome);
    Some(handle)
}

fn encode_called_number(digits: &str) -> Vec<u8> {
    let mut v = vec![0x80 | 0x01]; // octet3: ext bit, type unknown, ISDN numbering plan
    v.extend_from_slice(digits.as_bytes());
    v
}

/// Validate a handle against the pool; every facade call below starts
/// from this (spec §4.7 "validating call-pool membership before acting").
fn with_valid_call<R>(ctl: &mut Controller, handle: CallHandle, f: impl FnOnce(&mut Controller, &mut Call) -> R) -> Option<R> {
    if ctl.call_pool().get(handle).is_none() {
        return None;
    }
    let mut call = ctl.call_pool_mut().get_mut(handle)?.clone();
    let result = f(ctl, &mut call);
    *ctl.call_pool_mut().get_mut(handle)? = call;
    Some(result)
}

fn send_simple(ctl: &mut Controller, call: &Call, message_type: MessageType) {
    let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref: call.call_ref, message_type };
    ctl.transmit_i(encode_message(&header, Vec::new()));
}

pub fn alerting(ctl: &mut Controller, handle: CallHandle) -> bool {
    with_valid_call(ctl, handle, |ctl, call| {
        fsm::handle_incoming_alerting(call, handle);
        send_simple(ctl, call, MessageType::Alerting);
    })
    .is_some()
}

pub fn proceeding(ctl: &mut Controller, handle: CallHandle) -> bool {
    with_valid_call(ctl, handle, |ctl, call| {
        fsm::handle_incoming_call_proceeding(call, handle);
        send_simple(ctl, call, MessageType::CallProceeding);
    })
    .is_some()
}

pub fn answer(ctl: &mut Controller, handle: CallHandle) -> bool {
    with_valid_call(ctl, handle, |ctl, call| {
        fsm::handle_network_answer(call, handle);
        send_simple(ctl, call, MessageType::Connect);
    })
    .is_some()
}

pub fn connect_ack(ctl: &mut Controller, handle: CallHandle) -> bool {
    with_valid_call(ctl, handle, |ctl, call| {
        fsm::handle_connect_acknowledge(call, handle);
        send_simple(ctl, call, MessageType::ConnectAcknowledge);
    })
    .is_some()
}

/// Facade-driven HANGUP (spec §4.7/§4.5). Early states (never answered
/// from our side) send RELEASE directly and wait under T308; everything
/// else sends DISCONNECT and waits under T305 for the RELEASE that
/// follows.
pub fn hangup(ctl: &mut Controller, handle: CallHandle, cause: Option<CauseValue>) -> bool {
    let cause = cause.unwrap_or_else(|| CauseValue::new(Cause::NormalClearing, CauseLocation::PrivateNetworkLocalUser));
    let Some(call_ref) = ctl.call_pool().get(handle).map(|c| c.call_ref) else { return false };
    let outcome = match ctl.call_pool_mut().get_mut(handle) {
        Some(call) => fsm::handle_hangup_request(call, cause.clone()),
        None => return false,
    };
    let state = ctl.call_pool().get(handle).map(|c| c.state);
    let message_type = match state {
        Some(fsm::CallState::ReleaseRequest) => MessageType::Release,
        Some(fsm::CallState::DisconnectRequest) => MessageType::Disconnect,
        _ => return false,
    };
    let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type };
    let mut w = pri_core::OctetWriter::new();
    pri_ie::q931::ie::cause::encode(&cause, &mut w);
    let payload = encode_message(&header, vec![OutgoingIe::codeset0(tag::CAUSE, w.into_vec())]);
    if let Some(call) = ctl.call_pool_mut().get_mut(handle) {
        call.pending_retransmit = Some(payload.clone());
    }
    ctl.apply_outcome(handle, outcome);
    ctl.transmit_i(payload);
    true
}

/// Facade-driven HOLD (spec §4.5/§4.7 "Hold/Retrieve"). No-ops (returns
/// `false`, sends nothing) unless the call is Active and idle with
/// respect to hold.
pub fn hold(ctl: &mut Controller, handle: CallHandle) -> bool {
    let Some(call_ref) = ctl.call_pool().get(handle).map(|c| c.call_ref) else { return false };
    let outcome = match ctl.call_pool_mut().get_mut(handle) {
        Some(call) => fsm::handle_hold_request(call),
        None => return false,
    };
    if outcome.arm_timer.is_none() {
        return false;
    }
    let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::Hold };
    let payload = encode_message(&header, Vec::new());
    ctl.apply_outcome(handle, outcome);
    ctl.transmit_i(payload);
    true
}

/// Facade-driven RETRIEVE. Carries a Channel-Identification IE (any
/// channel) per spec §4.5 so the far end knows a new channel may be
/// needed, and arms TRetrieve to supervise the response.
pub fn retrieve(ctl: &mut Controller, handle: CallHandle) -> bool {
    let Some(call_ref) = ctl.call_pool().get(handle).map(|c| c.call_ref) else { return false };
    let outcome = match ctl.call_pool_mut().get_mut(handle) {
        Some(call) => fsm::handle_retrieve_request(call),
        None => return false,
    };
    if outcome.arm_timer.is_none() {
        return false;
    }
    let is_bri = ctl.config.layout.is_bri();
    let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::Retrieve };
    let cid = channel_id::ChannelId {
        exclusive: false,
        d_channel_indicated: false,
        interface_implicit: true,
        selection: channel_id::ChannelSelection::Any,
    };
    let mut w = pri_core::OctetWriter::new();
    cid.encode(&mut w, is_bri);
    let payload = encode_message(&header, vec![OutgoingIe::codeset0(tag::CHANNEL_IDENTIFICATION, w.into_vec())]);
    ctl.apply_outcome(handle, outcome);
    ctl.transmit_i(payload);
    true
}

/// Send RESTART, either for one channel or (with `channel: None`) the
/// whole interface (spec §4.5/§8 "RESTART"). Uses the global call
/// reference (value 0, originator flag set) per
/// `examples/original_source/libpri/q931.c`'s `q931_restart()`, never a
/// per-call reference.
pub fn restart(ctl: &mut Controller, channel: Option<u8>) {
    let width = ctl.width();
    let Ok(call_ref) = pri_core::CallRef::new(0, true, width) else { return };
    let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::Restart };
    let mut ies = Vec::new();
    if let Some(chan) = channel {
        let cid = channel_id::ChannelId {
            exclusive: false,
            d_channel_indicated: false,
            interface_implicit: true,
            selection: channel_id::ChannelSelection::ChannelNumber(chan),
        };
        let mut w = pri_core::OctetWriter::new();
        cid.encode(&mut w, ctl.config.layout.is_bri());
        ies.push(OutgoingIe::codeset0(tag::CHANNEL_IDENTIFICATION, w.into_vec()));
    }
    let class = if channel.is_some() { restart_indicator::RestartClass::IndicatedChannel } else { restart_indicator::RestartClass::SingleInterface };
    let mut rw = pri_core::OctetWriter::new();
    restart_indicator::encode(class, &mut rw);
    ies.push(OutgoingIe::codeset0(tag::RESTART_INDICATOR, rw.into_vec()));
    ctl.transmit_i(encode_message(&header, ies));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pri_config::ControllerConfig;
    use pri_core::{Layout, Side, SwitchVariant};

    #[test]
    fn setup_allocates_a_handle_and_emits_a_frame() {
        let config = ControllerConfig::new(Side::User, Layout::Pri, SwitchVariant::NationalIsdn2);
        let mut ctl = Controller::new(config);
        ctl.start();
        let req = SetupRequest { called_number: Some("5551212".into()), channel: Some(1), ..Default::default() };
        let handle = setup(&mut ctl, req);
        assert!(handle.is_some());
    }

    #[test]
    fn hangup_from_active_sends_disconnect_and_arms_t305() {
        let config = ControllerConfig::new(Side::User, Layout::Pri, SwitchVariant::NationalIsdn2);
        let mut ctl = Controller::new(config);
        ctl.start();
        let req = SetupRequest { called_number: Some("5551212".into()), ..Default::default() };
        let handle = setup(&mut ctl, req).unwrap();
        ctl.call_pool_mut().get_mut(handle).unwrap().state = fsm::CallState::Active;
        assert!(hangup(&mut ctl, handle, None));
        assert_eq!(ctl.call_pool().get(handle).unwrap().state, fsm::CallState::DisconnectRequest);
    }
}
