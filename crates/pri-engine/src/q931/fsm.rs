//! Q.931 call state machine (spec §4.5).
//!
//! Laid out the way the teacher's `cc_bs_fsm` handles call control: an
//! explicit state enum, a single `handle_*` entry point per trigger that
//! matches `(state, trigger)` and returns the outward-bound events,
//! mutating the call's own `state` field as a side effect rather than
//! returning a new state for the caller to store back.

use pri_core::{Cause, CauseLocation, CauseValue, TimerIndex};

use crate::call::{Call, HoldState};
use crate::events::{Event, EventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    NotSet,
    Null,
    CallInitiated,
    OverlapSending,
    OutgoingCallProceeding,
    CallDelivered,
    CallPresent,
    CallReceived,
    ConnectRequest,
    IncomingCallProceeding,
    Active,
    DisconnectRequest,
    DisconnectIndication,
    SuspendRequest,
    ResumeRequest,
    ReleaseRequest,
    CallAbort,
    OverlapReceiving,
    CallIndependentService,
    RestartRequest,
    Restart,
}

/// Outcome of a transition: which events to emit, whether the call should
/// be torn down from the pool once they're delivered (spec §4.5 "Null is
/// terminal: the call record is freed"), and which timer (if any) the
/// controller should arm now that the transition has landed.
pub struct Outcome {
    pub events: Vec<Event>,
    pub destroy: bool,
    pub arm_timer: Option<TimerIndex>,
}

impl Outcome {
    fn events(events: Vec<Event>) -> Self {
        Outcome { events, destroy: false, arm_timer: None }
    }

    fn destroy(events: Vec<Event>) -> Self {
        Outcome { events, destroy: true, arm_timer: None }
    }

    fn none() -> Self {
        Outcome { events: Vec::new(), destroy: false, arm_timer: None }
    }

    pub fn with_timer(mut self, idx: TimerIndex) -> Self {
        self.arm_timer = Some(idx);
        self
    }
}

fn cause_value(cause: Cause, location: CauseLocation) -> CauseValue {
    CauseValue::new(cause, location)
}

/// Maps a `CallState` to its Q.931 Table 3 numeric value, for the single
/// octet the CALL STATE IE carries in a STATUS message (spec §4.2/§4.5
/// "STATUS-ENQUIRY response").
pub fn call_state_wire_value(state: CallState) -> u8 {
    match state {
        CallState::NotSet | CallState::Null => 0,
        CallState::CallInitiated => 1,
        CallState::OverlapSending => 2,
        CallState::OutgoingCallProceeding => 3,
        CallState::CallDelivered => 4,
        CallState::CallPresent => 6,
        CallState::CallReceived => 7,
        CallState::ConnectRequest => 8,
        CallState::IncomingCallProceeding => 9,
        CallState::Active => 10,
        CallState::DisconnectRequest => 11,
        CallState::DisconnectIndication => 12,
        CallState::SuspendRequest => 15,
        CallState::ResumeRequest => 17,
        CallState::ReleaseRequest => 19,
        CallState::OverlapReceiving => 25,
        CallState::CallAbort | CallState::CallIndependentService | CallState::RestartRequest | CallState::Restart => 0,
    }
}

/// Network-side SETUP arrival on a fresh (network-originated toward the
/// user) or user-side outgoing SETUP request — distinct entry points kept
/// separate because the two sides see opposite message flows (spec §4.5).
pub fn handle_incoming_setup(
    call: &mut Call,
    handle: crate::call::CallHandle,
    calling: Option<String>,
    called: Option<String>,
    channel: Option<u8>,
    sending_complete: bool,
) -> Outcome {
    if call.state != CallState::Null {
        return Outcome::none();
    }
    call.calling_number = calling.clone();
    call.called_number = called.clone();
    call.channel = channel;
    call.overlap_receiving = !sending_complete && called.as_deref().unwrap_or("").is_empty();
    call.state = if call.overlap_receiving { CallState::OverlapReceiving } else { CallState::CallPresent };
    Outcome::events(vec![Event::new(EventKind::Ring { call: handle, calling, called, channel })])
}

/// Facade-driven outgoing SETUP (user side originates a call). Arms T303
/// to supervise the SETUP until some response arrives (spec §4.5 "T303
/// supervises an outgoing SETUP").
pub fn handle_originate(call: &mut Call, overlap: bool) -> Outcome {
    if call.state != CallState::Null {
        return Outcome::none();
    }
    call.overlap_sending = overlap;
    call.state = if overlap { CallState::OverlapSending } else { CallState::CallInitiated };
    call.retry_count = 0;
    Outcome::none().with_timer(TimerIndex::T303)
}

pub fn handle_call_proceeding(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    match call.state {
        CallState::CallInitiated | CallState::OverlapSending => {
            call.state = CallState::OutgoingCallProceeding;
            call.pending_retransmit = None;
            Outcome::events(vec![Event::new(EventKind::Proceeding { call: handle })])
        }
        _ => Outcome::none(),
    }
}

pub fn handle_setup_acknowledge(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    match call.state {
        CallState::CallInitiated | CallState::OverlapSending => {
            call.overlap_sending = true;
            call.state = CallState::OverlapSending;
            call.pending_retransmit = None;
            Outcome::events(vec![Event::new(EventKind::SetupAck { call: handle })])
        }
        _ => Outcome::none(),
    }
}

pub fn handle_alerting(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    match call.state {
        CallState::CallInitiated | CallState::OverlapSending | CallState::OutgoingCallProceeding => {
            call.state = CallState::CallDelivered;
            call.pending_retransmit = None;
            Outcome::events(vec![Event::new(EventKind::Alerting { call: handle })])
        }
        _ => Outcome::none(),
    }
}

pub fn handle_connect(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    match call.state {
        CallState::CallInitiated
        | CallState::OverlapSending
        | CallState::OutgoingCallProceeding
        | CallState::CallDelivered => {
            call.state = CallState::Active;
            call.pending_retransmit = None;
            Outcome::events(vec![Event::new(EventKind::Answer { call: handle })])
        }
        _ => Outcome::none(),
    }
}

pub fn handle_connect_acknowledge(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    match call.state {
        CallState::ConnectRequest => {
            call.state = CallState::Active;
            Outcome::events(vec![Event::new(EventKind::ConnectAck { call: handle })])
        }
        _ => Outcome::none(),
    }
}

/// Network-side answer: moves Call-Received into Connect-Request and
/// emits the CONNECT; a following CONNECT ACKNOWLEDGE lands in Active.
pub fn handle_network_answer(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    match call.state {
        CallState::CallPresent | CallState::CallReceived | CallState::IncomingCallProceeding => {
            call.state = CallState::ConnectRequest;
            Outcome::events(vec![Event::new(EventKind::Answer { call: handle })])
        }
        _ => Outcome::none(),
    }
}

pub fn handle_incoming_call_proceeding(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    match call.state {
        CallState::CallPresent | CallState::OverlapReceiving => {
            call.state = CallState::IncomingCallProceeding;
            Outcome::events(vec![Event::new(EventKind::Proceeding { call: handle })])
        }
        _ => Outcome::none(),
    }
}

pub fn handle_incoming_alerting(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    match call.state {
        CallState::CallPresent | CallState::CallReceived | CallState::IncomingCallProceeding => {
            call.state = CallState::CallReceived;
            Outcome::events(vec![Event::new(EventKind::Alerting { call: handle })])
        }
        _ => Outcome::none(),
    }
}

/// DISCONNECT arrival from the far end — moves to Disconnect-Indication
/// and the caller is expected to RELEASE in response; T305 supervises the
/// RELEASE we send back (spec §4.5 "T305 supervises a sent DISCONNECT").
pub fn handle_disconnect(call: &mut Call, handle: crate::call::CallHandle, cause: CauseValue) -> Outcome {
    match call.state {
        CallState::Null | CallState::ReleaseRequest => Outcome::none(),
        _ => {
            call.cause = Some(cause);
            call.state = CallState::DisconnectIndication;
            Outcome::events(vec![Event::new(EventKind::Hangup { call: handle, cause })]).with_timer(TimerIndex::T305)
        }
    }
}

/// RELEASE or RELEASE COMPLETE arrival terminates the call outright. The
/// mapped cause (the far end's, if it sent one, else the default local
/// one) rides on the `HangupAck` so the host can tell why the call ended.
pub fn handle_release(call: &mut Call, handle: crate::call::CallHandle, cause: Option<CauseValue>) -> Outcome {
    if call.state == CallState::Null {
        return Outcome::none();
    }
    let cause = cause.unwrap_or_else(|| cause_value(Cause::NormalClearing, CauseLocation::PrivateNetworkLocalUser));
    call.state = CallState::Null;
    call.cause = Some(cause.clone());
    Outcome::destroy(vec![Event::new(EventKind::HangupAck { call: handle, cause })])
}

/// Facade-driven HANGUP: starts teardown by sending DISCONNECT and
/// waiting for RELEASE (or RELEASE directly, from states that never saw
/// the far end accept the call — spec §4.5/§7). T308 supervises a sent
/// RELEASE the same way T305 supervises a sent DISCONNECT.
pub fn handle_hangup_request(call: &mut Call, cause: CauseValue) -> Outcome {
    match call.state {
        CallState::Null => Outcome::none(),
        CallState::CallPresent | CallState::CallInitiated | CallState::OverlapSending | CallState::OverlapReceiving => {
            call.state = CallState::ReleaseRequest;
            call.cause = Some(cause);
            call.retry_count = 0;
            Outcome::none().with_timer(TimerIndex::T308)
        }
        _ => {
            call.cause = Some(cause);
            call.state = CallState::DisconnectRequest;
            Outcome::none().with_timer(TimerIndex::T305)
        }
    }
}

/// STATUS arrival carrying a call state incompatible with ours: per spec
/// §4.5/§7, diverging state after a STATUS exchange forces local cleanup.
pub fn handle_status_mismatch(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    let cause = cause_value(Cause::MessageNotCompatibleWithCallState, CauseLocation::PrivateNetworkLocalUser);
    call.state = CallState::Null;
    Outcome::destroy(vec![Event::new(EventKind::Hangup { call: handle, cause })])
}

/// Facade-driven HOLD request: only a call sitting Active and not already
/// mid-hold can ask to be held (spec §4.5 "Hold/Retrieve"). Moves to
/// Hold-Req and arms THold to supervise the HOLD we're about to send.
pub fn handle_hold_request(call: &mut Call) -> Outcome {
    if call.state != CallState::Active || call.hold_state != HoldState::Idle {
        return Outcome::none();
    }
    call.hold_state = HoldState::HoldReq;
    Outcome::none().with_timer(TimerIndex::THold)
}

/// Inbound HOLD arrival. Role-based collision resolution: if we had
/// already requested our own HOLD (Hold-Req) when the far end's HOLD
/// arrives, the network side wins and keeps its own request in flight,
/// rejecting the user side's incoming one (spec §4.5 "Hold/Retrieve
/// collision").
pub fn handle_hold_indication(call: &mut Call, handle: crate::call::CallHandle, we_are_network: bool) -> HoldIndicationOutcome {
    match call.hold_state {
        HoldState::Idle => {
            call.hold_state = HoldState::HoldInd;
            HoldIndicationOutcome::Accept(Outcome::events(vec![Event::new(EventKind::Hold { call: handle })]))
        }
        HoldState::HoldReq if we_are_network => {
            HoldIndicationOutcome::Reject
        }
        _ => HoldIndicationOutcome::Reject,
    }
}

/// Outward result of resolving an inbound HOLD against any collision.
pub enum HoldIndicationOutcome {
    Accept(Outcome),
    Reject,
}

/// HOLD ACKNOWLEDGE arrival: the far end granted our hold request. Per
/// spec §4.5 the channel is released back to the pool while held, so the
/// channel/exclusive fields are cleared along with cancelling THold.
pub fn handle_hold_acknowledge(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    if call.hold_state != HoldState::HoldReq {
        return Outcome::none();
    }
    call.hold_state = HoldState::CallHeld;
    call.channel = None;
    call.exclusive = false;
    Outcome::events(vec![Event::new(EventKind::HoldAck { call: handle })])
}

/// HOLD REJECT arrival: our hold request was refused; back to Idle.
pub fn handle_hold_reject(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    if call.hold_state != HoldState::HoldReq {
        return Outcome::none();
    }
    call.hold_state = HoldState::Idle;
    Outcome::events(vec![Event::new(EventKind::HoldReject { call: handle })])
}

/// Facade-driven RETRIEVE request: only a held call can ask to resume.
/// Arms TRetrieve to supervise the RETRIEVE we're about to send.
pub fn handle_retrieve_request(call: &mut Call) -> Outcome {
    if call.hold_state != HoldState::CallHeld {
        return Outcome::none();
    }
    call.hold_state = HoldState::RetrieveReq;
    Outcome::none().with_timer(TimerIndex::TRetrieve)
}

/// Inbound RETRIEVE arrival.
pub fn handle_retrieve_indication(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    if call.hold_state != HoldState::CallHeld {
        return Outcome::none();
    }
    call.hold_state = HoldState::RetrieveInd;
    Outcome::events(vec![Event::new(EventKind::Retrieve { call: handle })])
}

/// RETRIEVE ACKNOWLEDGE arrival: the far end assigned us a (possibly new)
/// channel and the call is active on it again.
pub fn handle_retrieve_acknowledge(call: &mut Call, handle: crate::call::CallHandle, channel: Option<u8>) -> Outcome {
    if call.hold_state != HoldState::RetrieveReq {
        return Outcome::none();
    }
    call.hold_state = HoldState::Idle;
    call.channel = channel;
    Outcome::events(vec![Event::new(EventKind::RetrieveAck { call: handle })])
}

/// RETRIEVE REJECT arrival: stays held.
pub fn handle_retrieve_reject(call: &mut Call, handle: crate::call::CallHandle) -> Outcome {
    if call.hold_state != HoldState::RetrieveReq {
        return Outcome::none();
    }
    call.hold_state = HoldState::CallHeld;
    Outcome::events(vec![Event::new(EventKind::RetrieveReject { call: handle })])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::CallPool;
    use pri_core::{CallRef, CrefWidth};

    fn new_call(pool: &mut CallPool) -> (crate::call::CallHandle, CallState) {
        let cref = CallRef::new(1, true, CrefWidth::Pri).unwrap();
        let h = pool.insert(Call::new(cref));
        (h, CallState::Null)
    }

    #[test]
    fn setup_to_connect_reaches_active() {
        let mut pool = CallPool::new();
        let (h, _) = new_call(&mut pool);
        let call = pool.get_mut(h).unwrap();
        handle_originate(call, false);
        assert_eq!(call.state, CallState::CallInitiated);
        handle_call_proceeding(call, h);
        assert_eq!(call.state, CallState::OutgoingCallProceeding);
        handle_alerting(call, h);
        assert_eq!(call.state, CallState::CallDelivered);
        let outcome = handle_connect(call, h);
        assert_eq!(call.state, CallState::Active);
        assert_eq!(outcome.events.len(), 1);
    }

    #[test]
    fn release_from_active_destroys_call() {
        let mut pool = CallPool::new();
        let (h, _) = new_call(&mut pool);
        let call = pool.get_mut(h).unwrap();
        call.state = CallState::Active;
        let outcome = handle_release(call, h, None);
        assert!(outcome.destroy);
        assert_eq!(call.state, CallState::Null);
    }

    #[test]
    fn release_from_null_is_noop() {
        let mut pool = CallPool::new();
        let (h, _) = new_call(&mut pool);
        let call = pool.get_mut(h).unwrap();
        let outcome = handle_release(call, h, None);
        assert!(!outcome.destroy);
    }
}
