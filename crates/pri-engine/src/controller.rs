//! The controller: owns the call pool, the D-channel link(s), the timer
//! scheduler and the outward event queue, and is the only thing that
//! mutates any of them (spec §4.6, §5 "Concurrency & Resource Model").

use std::time::{Duration, Instant};

use pri_config::ControllerConfig;
use pri_core::{CallRef, Cause, CauseLocation, CauseValue, CrefAllocator, CrefWidth, Scheduler, TimerIndex};
use pri_ie::q921::Frame as Q921Frame;
use pri_ie::q931::header::{Header, MessageType, ProtocolDiscriminator};
use pri_ie::q931::ie::{self, calling_number, cause as cause_ie, channel_id, restart_indicator, split_ies, tag};
use pri_ie::q931::message::OutgoingIe;
use pri_rose::component::{Component, OperationCode};
use pri_rose::ops::{diverting_leg_information, Operation};

use crate::call::{Call, CallHandle, CallPool, HoldState};
use crate::call_completion::CompletionTable;
use crate::events::{Event, EventKind, EventQueue, Subcommand};
use crate::facade;
use crate::q921::{Link, TimerTag};
use crate::q931::fsm;
use crate::timer::TimerCookie;

/// Width of call-reference values this controller's layout uses (spec
/// §3/§6: "BRI wraps at 127, PRI at 32767").
fn cref_width(layout: pri_core::Layout) -> CrefWidth {
    if layout.is_bri() { CrefWidth::Bri } else { CrefWidth::Pri }
}

/// Owns everything needed to drive one D-channel interface end to end.
pub struct Controller {
    pub config: ControllerConfig,
    pub link: Link,
    pool: CallPool,
    cref_alloc: CrefAllocator,
    scheduler: Scheduler<TimerCookie>,
    events: EventQueue,
    outbound: Vec<Vec<u8>>,
    width: CrefWidth,
    pub completions: CompletionTable,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        let width = cref_width(config.layout);
        let persistence = config.layer2_persistence.resolve(config.layout);
        Controller {
            link: Link::new(0, persistence),
            pool: CallPool::new(),
            cref_alloc: CrefAllocator::new(width),
            scheduler: Scheduler::new(),
            events: EventQueue::new(256),
            outbound: Vec::new(),
            width,
            config,
            completions: CompletionTable::new(),
        }
    }

    /// Bring the D-channel up (spec §4.4 "bring_up primitive").
    pub fn start(&mut self) {
        let now = Instant::now();
        self.link.bring_up(&mut self.scheduler, now);
        self.drain_link_outbox();
    }

    fn drain_link_outbox(&mut self) {
        self.outbound.append(&mut self.link.outbox);
    }

    /// Pop the next outbound D-channel octet string, if any. The host
    /// transport layer is responsible for actually writing these octets to
    /// the wire; this engine only produces them (spec §6 "External
    /// Interfaces": octet-in/octet-out).
    pub fn poll_outbound(&mut self) -> Option<Vec<u8>> {
        if self.outbound.is_empty() {
            None
        } else {
            Some(self.outbound.remove(0))
        }
    }

    pub(crate) fn transmit_i(&mut self, payload: Vec<u8>) {
        let now = Instant::now();
        self.link.transmit_i_timed(payload, &mut self.scheduler, now);
        self.drain_link_outbox();
    }

    pub(crate) fn transmit_broadcast(&mut self, payload: Vec<u8>) {
        self.link.transmit_broadcast_ui(payload);
        self.drain_link_outbox();
    }

    /// Feed a raw octet string received on the D-channel (spec §4.4/§4.6).
    pub fn receive(&mut self, bytes: &[u8]) {
        let frame = match Q921Frame::decode(bytes) {
            Ok(f) => f,
            Err(_) => {
                tracing::debug!("dropped malformed q.921 frame");
                return;
            }
        };
        let now = Instant::now();
        let was_up = self.link.state == crate::q921::LinkState::MultiFrameEstablished;
        let link_events = self.link.handle_frame(&frame, &mut self.scheduler, now);
        for e in &link_events {
            match e.kind {
                EventKind::DChanDown => self.arm_t309_for_active_calls(now),
                EventKind::DChanUp => self.cancel_t309_for_all_calls(),
                _ => {}
            }
        }
        for e in link_events {
            self.events.push(e);
        }
        self.drain_link_outbox();
        if !was_up && self.link.state != crate::q921::LinkState::MultiFrameEstablished {
            return;
        }
        if frame.control.is_information() && !frame.payload.is_empty() {
            self.handle_q931_message(&frame.payload, frame.address.tei);
        }
    }

    /// A data-link failure under an active call starts T309; spec §4.5
    /// "S6" — if the link never comes back the call is torn down with
    /// cause 27.
    fn arm_t309_for_active_calls(&mut self, now: Instant) {
        let handles: Vec<CallHandle> = self
            .pool
            .iter()
            .filter(|(_, call)| call.state == fsm::CallState::Active && call.active_timer_index.is_none())
            .map(|(h, _)| h)
            .collect();
        for h in handles {
            self.arm_call_timer(h, TimerIndex::T309, now);
        }
    }

    fn cancel_t309_for_all_calls(&mut self) {
        let handles: Vec<CallHandle> = self
            .pool
            .iter()
            .filter(|(_, call)| call.active_timer_index == Some(TimerIndex::T309))
            .map(|(h, _)| h)
            .collect();
        for h in handles {
            self.cancel_call_timer(h);
        }
    }

    fn handle_q931_message(&mut self, bytes: &[u8], tei: u8) {
        let mut r = pri_core::OctetReader::new(bytes);
        let header = match Header::decode(&mut r, self.width) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(?e, "malformed q.931 header");
                return;
            }
        };
        if header.protocol_discriminator != ProtocolDiscriminator::Q931 {
            return;
        }
        let ies = match split_ies(r.rest()) {
            Ok(ies) => ies,
            Err(e) => {
                tracing::warn!(?e, "malformed q.931 ie list");
                return;
            }
        };
        let missing = pri_ie::q931::message::missing_mandatory(header.message_type, &ies);
        if !missing.is_empty() {
            tracing::warn!(?missing, msg = ?header.message_type, "missing mandatory ies");
            let cause = CauseValue::new(Cause::MandatoryIeMissing, CauseLocation::PrivateNetworkLocalUser);
            if header.message_type == MessageType::Setup {
                let reject = Header {
                    protocol_discriminator: ProtocolDiscriminator::Q931,
                    call_ref: header.call_ref,
                    message_type: MessageType::ReleaseComplete,
                };
                let mut w = pri_core::OctetWriter::new();
                cause_ie::encode(&cause, &mut w);
                self.transmit_i(facade::encode_message(&reject, vec![OutgoingIe::codeset0(tag::CAUSE, w.into_vec())]));
            } else {
                let state = self.pool.find_by_call_ref(header.call_ref).and_then(|h| self.pool.get(h)).map(|c| c.state).unwrap_or(fsm::CallState::Null);
                self.send_status(header.call_ref, cause, state);
            }
            return;
        }
        self.dispatch_message(header, &ies, tei);
    }

    fn find_ie<'a>(ies: &'a [ie::RawIe], t: u8) -> Option<&'a ie::RawIe> {
        ies.iter().find(|i| i.codeset == 0 && i.tag == t)
    }

    /// Builds and sends a STATUS message carrying the given cause plus the
    /// current CALL STATE IE (spec §4.2/§4.5 "STATUS-ENQUIRY response",
    /// "unhandled message type", "missing mandatory IE").
    fn send_status(&mut self, call_ref: CallRef, cause: CauseValue, state: fsm::CallState) {
        let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::Status };
        let mut cw = pri_core::OctetWriter::new();
        cause_ie::encode(&cause, &mut cw);
        let mut sw = pri_core::OctetWriter::new();
        sw.push_u8(0x80 | (fsm::call_state_wire_value(state) & 0x3f));
        let ies = vec![OutgoingIe::codeset0(tag::CAUSE, cw.into_vec()), OutgoingIe::codeset0(tag::CALL_STATE, sw.into_vec())];
        self.transmit_i(facade::encode_message(&header, ies));
    }

    fn dispatch_message(&mut self, header: Header, ies: &[ie::RawIe], tei: u8) {
        let handle = if self.config.layout.is_point_to_multipoint() {
            self.pool.find_by_call_ref_and_tei(header.call_ref, tei).or_else(|| self.pool.find_by_call_ref(header.call_ref))
        } else {
            self.pool.find_by_call_ref(header.call_ref)
        };
        match header.message_type {
            MessageType::Setup => self.on_setup(header.call_ref, ies, tei),
            MessageType::CallProceeding => {
                self.with_call(handle, |call, h| fsm::handle_call_proceeding(call, h));
                self.resolve_broadcast_winner(handle);
            }
            MessageType::SetupAcknowledge => self.with_call(handle, |call, h| fsm::handle_setup_acknowledge(call, h)),
            MessageType::Alerting => {
                let side = self.config.side;
                self.with_call(handle, |call, h| {
                    if side == pri_core::Side::User { fsm::handle_alerting(call, h) } else { fsm::handle_incoming_alerting(call, h) }
                });
                self.resolve_broadcast_winner(handle);
            }
            MessageType::Connect => {
                self.with_call(handle, |call, h| fsm::handle_connect(call, h));
                self.resolve_broadcast_winner(handle);
            }
            MessageType::ConnectAcknowledge => self.with_call(handle, |call, h| fsm::handle_connect_acknowledge(call, h)),
            MessageType::Disconnect => {
                let cause = Self::find_ie(ies, tag::CAUSE)
                    .and_then(|i| i.value.as_deref())
                    .and_then(|v| cause_ie::decode(v).ok())
                    .unwrap_or_else(|| CauseValue::new(Cause::NormalUnspecified, CauseLocation::PrivateNetworkLocalUser));
                self.with_call(handle, |call, h| fsm::handle_disconnect(call, h, cause));
            }
            MessageType::Release | MessageType::ReleaseComplete => {
                let cause = Self::find_ie(ies, tag::CAUSE).and_then(|i| i.value.as_deref()).and_then(|v| cause_ie::decode(v).ok());
                if let Some(h) = handle {
                    let outcome = self.pool.get_mut(h).map(|call| fsm::handle_release(call, h, cause));
                    self.finish(h, outcome);
                }
            }
            MessageType::Facility => {
                if let Some(h) = handle {
                    self.on_facility(h, ies);
                }
            }
            MessageType::Status => {
                if let Some(h) = handle {
                    let outcome = self.pool.get_mut(h).map(|call| fsm::handle_status_mismatch(call, h));
                    self.finish(h, outcome);
                }
            }
            MessageType::StatusEnquiry => {
                let state = handle.and_then(|h| self.pool.get(h)).map(|c| c.state).unwrap_or(fsm::CallState::Null);
                let cause = CauseValue::new(Cause::ResponseToStatusEnquiry, CauseLocation::PrivateNetworkLocalUser);
                self.send_status(header.call_ref, cause, state);
            }
            MessageType::Restart => self.on_restart(header.call_ref, ies),
            MessageType::RestartAcknowledge => self.events.push(Event::new(EventKind::RestartAck)),
            MessageType::Hold => {
                if let Some(h) = handle {
                    self.on_hold_indication(h);
                }
            }
            MessageType::HoldAcknowledge => self.with_call(handle, |call, h| fsm::handle_hold_acknowledge(call, h)),
            MessageType::HoldReject => self.with_call(handle, |call, h| fsm::handle_hold_reject(call, h)),
            MessageType::Retrieve => {
                if let Some(h) = handle {
                    let outcome = self.pool.get_mut(h).map(|call| fsm::handle_retrieve_indication(call, h));
                    self.finish(h, outcome);
                }
            }
            MessageType::RetrieveAcknowledge => {
                let channel = Self::find_ie(ies, tag::CHANNEL_IDENTIFICATION)
                    .and_then(|i| i.value.as_deref())
                    .and_then(|v| channel_id::ChannelId::decode(v, self.config.layout.is_bri()).ok())
                    .and_then(|c| match c.selection {
                        channel_id::ChannelSelection::ChannelNumber(n) => Some(n),
                        channel_id::ChannelSelection::BriChannel(n) => n,
                        _ => None,
                    });
                self.with_call(handle, |call, h| fsm::handle_retrieve_acknowledge(call, h, channel));
            }
            MessageType::RetrieveReject => self.with_call(handle, |call, h| fsm::handle_retrieve_reject(call, h)),
            MessageType::Information => {
                if let Some(h) = handle {
                    let digits = Self::find_ie(ies, tag::CALLED_PARTY_NUMBER)
                        .and_then(|i| i.value.as_deref())
                        .and_then(|v| calling_number::decode(v).ok())
                        .map(|p| p.digits)
                        .unwrap_or_default();
                    self.events.push(Event::new(EventKind::InfoReceived { call: h, digits }));
                }
            }
            MessageType::Notify => {
                if let Some(h) = handle {
                    self.events.push(Event::new(EventKind::Notify { call: h, notification: 0 }));
                }
            }
            MessageType::Progress => {
                if let Some(h) = handle {
                    self.events.push(Event::new(EventKind::Progress { call: h }));
                }
            }
            _ => {
                tracing::debug!(msg = ?header.message_type, "unhandled message type");
                let state = handle.and_then(|h| self.pool.get(h)).map(|c| c.state).unwrap_or(fsm::CallState::Null);
                let cause = CauseValue::new(Cause::MessageTypeNonexistent, CauseLocation::PrivateNetworkLocalUser);
                self.send_status(header.call_ref, cause, state);
            }
        }
    }

    /// Inbound HOLD: resolve against any collision and reply HOLD REJECT
    /// ourselves when the fsm says our own request wins (spec §4.5 "Hold/
    /// Retrieve collision").
    fn on_hold_indication(&mut self, handle: CallHandle) {
        let we_are_network = self.config.side == pri_core::Side::Network;
        let Some(call) = self.pool.get_mut(handle) else { return };
        match fsm::handle_hold_indication(call, handle, we_are_network) {
            fsm::HoldIndicationOutcome::Accept(outcome) => self.finish(handle, Some(outcome)),
            fsm::HoldIndicationOutcome::Reject => {
                let call_ref = call.call_ref;
                let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::HoldReject };
                self.transmit_i(facade::encode_message(&header, Vec::new()));
            }
        }
    }

    /// Decodes a FACILITY IE's ROSE components and, for
    /// DivertingLegInformation2, folds the redirecting-party update into
    /// the call and emits a `Redirecting` subcommand (spec §4.3/§4.5
    /// "redirecting updates").
    fn on_facility(&mut self, handle: CallHandle, ies: &[ie::RawIe]) {
        let raw = Self::find_ie(ies, tag::FACILITY).and_then(|i| i.value.as_deref());
        let facility = raw.and_then(|bytes| pri_rose::facility::decode(bytes).ok());
        let Some(facility) = facility else {
            self.events.push(Event::new(EventKind::Facility { call: handle }));
            return;
        };
        let mut subcommands = Vec::new();
        for component in &facility.components {
            let Component::Invoke(invoke) = component else { continue };
            let code = match &invoke.operation {
                OperationCode::Local(code) => *code,
                OperationCode::Global(_) => continue,
            };
            if Operation::from_code(code) != Some(Operation::DivertingLegInformation2) {
                continue;
            }
            let Ok(info) = diverting_leg_information::decode_info2(&invoke.argument) else { continue };
            if let Some(call) = self.pool.get_mut(handle) {
                call.redirecting_number = info.diverting_number.clone();
                call.redirecting_reason = info.diversion_reason;
                call.redirecting_count = info.diversion_counter as u8;
            }
            subcommands.push(Subcommand::Redirecting {
                from_number: info.diverting_number,
                reason: info.diversion_reason,
                count: info.diversion_counter as u8,
            });
        }
        self.events.push(Event::with_subcommands(EventKind::Facility { call: handle }, subcommands));
    }

    /// Inbound RESTART: emit one restart event per channel the message
    /// actually listed (or a single interface-wide one when it named
    /// none), then acknowledge (spec §4.5/§8 "RESTART").
    fn on_restart(&mut self, call_ref: CallRef, ies: &[ie::RawIe]) {
        let channel_ie = Self::find_ie(ies, tag::CHANNEL_IDENTIFICATION)
            .and_then(|i| i.value.as_deref())
            .and_then(|v| channel_id::ChannelId::decode(v, self.config.layout.is_bri()).ok());
        let channels: Vec<u8> = match &channel_ie {
            Some(cid) => match &cid.selection {
                channel_id::ChannelSelection::ChannelNumber(n) => vec![*n],
                channel_id::ChannelSelection::BriChannel(Some(n)) => vec![*n],
                channel_id::ChannelSelection::SlotMap(bits) => bits
                    .iter()
                    .enumerate()
                    .flat_map(|(octet_idx, byte)| (0..8u8).filter_map(move |bit| (byte & (1 << bit) != 0).then_some((octet_idx as u8) * 8 + bit + 1)))
                    .collect(),
                _ => Vec::new(),
            },
            None => Vec::new(),
        };
        if channels.is_empty() {
            self.events.push(Event::new(EventKind::Restart { channel: None }));
        } else {
            for ch in channels {
                self.events.push(Event::new(EventKind::Restart { channel: Some(ch) }));
            }
        }
        let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::RestartAcknowledge };
        let mut ies_out = Vec::new();
        if let Some(cid) = channel_ie {
            let mut w = pri_core::OctetWriter::new();
            cid.encode(&mut w, self.config.layout.is_bri());
            ies_out.push(OutgoingIe::codeset0(tag::CHANNEL_IDENTIFICATION, w.into_vec()));
        }
        let mut rw = pri_core::OctetWriter::new();
        restart_indicator::encode(restart_indicator::RestartClass::SingleInterface, &mut rw);
        ies_out.push(OutgoingIe::codeset0(tag::RESTART_INDICATOR, rw.into_vec()));
        self.transmit_i(facade::encode_message(&header, ies_out));
    }

    fn on_setup(&mut self, call_ref: CallRef, ies: &[ie::RawIe], tei: u8) {
        let call_ref = if call_ref.is_dummy() {
            match self.cref_alloc.allocate() {
                Some(v) => CallRef::new(v, false, self.width).unwrap(),
                None => {
                    tracing::warn!("call reference exhaustion, rejecting setup");
                    return;
                }
            }
        } else {
            call_ref
        };
        let handle = self.pool.insert(Call::new(call_ref));
        if let Some(call) = self.pool.get_mut(handle) {
            call.tei = tei;
        }
        let calling = Self::find_ie(ies, tag::CALLING_PARTY_NUMBER)
            .and_then(|i| i.value.as_deref())
            .and_then(|v| calling_number::decode(v).ok())
            .map(|p| p.digits);
        let called = Self::find_ie(ies, tag::CALLED_PARTY_NUMBER)
            .and_then(|i| i.value.as_deref())
            .and_then(|v| calling_number::decode(v).ok())
            .map(|p| p.digits);
        let channel = Self::find_ie(ies, tag::CHANNEL_IDENTIFICATION)
            .and_then(|i| i.value.as_deref())
            .and_then(|v| channel_id::ChannelId::decode(v, self.config.layout.is_bri()).ok())
            .and_then(|c| match c.selection {
                channel_id::ChannelSelection::ChannelNumber(n) => Some(n),
                channel_id::ChannelSelection::BriChannel(n) => n,
                _ => None,
            });
        let sending_complete = ies.iter().any(|i| i.codeset == 0 && i.tag == tag::SENDING_COMPLETE);
        if let Some(call) = self.pool.get_mut(handle) {
            let outcome = fsm::handle_incoming_setup(call, handle, calling, called, channel, sending_complete);
            for e in outcome.events {
                self.events.push(e);
            }
        }
    }

    /// Once a responding TE is accepted (CALL PROCEEDING/ALERTING/CONNECT)
    /// for a broadcast SETUP, it becomes the winner and every other TE
    /// still racing for the same call-reference value is released with
    /// cause 26 (spec §8 "losing broadcast responses").
    fn resolve_broadcast_winner(&mut self, handle: Option<CallHandle>) {
        let Some(handle) = handle else { return };
        let Some(call) = self.pool.get(handle) else { return };
        if call.pri_winner || !call.outboundbroadcast {
            return;
        }
        let call_ref = call.call_ref;
        self.cancel_call_timer(handle);
        if let Some(call) = self.pool.get_mut(handle) {
            call.pri_winner = true;
            call.outboundbroadcast = false;
        }
        let siblings: Vec<CallHandle> = self.pool.all_by_call_ref(call_ref).into_iter().filter(|h| *h != handle).collect();
        for sib in siblings {
            if let Some(sib_call) = self.pool.get(sib) {
                let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref: sib_call.call_ref, message_type: MessageType::ReleaseComplete };
                let cause = CauseValue::new(Cause::NonSelectedUserClearing, CauseLocation::PrivateNetworkLocalUser);
                let mut w = pri_core::OctetWriter::new();
                cause_ie::encode(&cause, &mut w);
                let payload = facade::encode_message(&header, vec![OutgoingIe::codeset0(tag::CAUSE, w.into_vec())]);
                self.transmit_i(payload);
            }
            self.cancel_call_timer(sib);
            self.pool.remove(sib);
        }
    }

    fn with_call(&mut self, handle: Option<CallHandle>, f: impl FnOnce(&mut Call, CallHandle) -> fsm::Outcome) {
        let Some(h) = handle else { return };
        let outcome = self.pool.get_mut(h).map(|call| f(call, h));
        self.finish(h, outcome);
    }

    fn finish(&mut self, handle: CallHandle, outcome: Option<fsm::Outcome>) {
        let Some(outcome) = outcome else { return };
        self.apply_outcome(handle, outcome);
    }

    /// Pushes an outcome's events, arms whichever timer it requested (if
    /// any — replacing any timer the call already had armed), and removes
    /// the call from the pool if the transition terminated it (spec §4.5
    /// "Null is terminal: the call record is freed").
    pub(crate) fn apply_outcome(&mut self, handle: CallHandle, outcome: fsm::Outcome) {
        for e in outcome.events {
            self.events.push(e);
        }
        if outcome.destroy {
            self.cancel_call_timer(handle);
            self.pool.remove(handle);
            return;
        }
        if let Some(idx) = outcome.arm_timer {
            let now = Instant::now();
            self.arm_call_timer(handle, idx, now);
        }
    }

    pub(crate) fn arm_call_timer(&mut self, handle: CallHandle, idx: TimerIndex, now: Instant) {
        self.cancel_call_timer(handle);
        let Some(millis) = self.config.timers.get(idx).millis() else { return };
        let id = self.scheduler.schedule(now, Duration::from_millis(millis as u64), TimerCookie::Call(handle, idx));
        if let Some(call) = self.pool.get_mut(handle) {
            call.active_timer = Some(id);
            call.active_timer_index = Some(idx);
        }
    }

    pub(crate) fn cancel_call_timer(&mut self, handle: CallHandle) {
        if let Some(call) = self.pool.get_mut(handle) {
            if let Some(id) = call.active_timer.take() {
                self.scheduler.cancel(id);
            }
            call.active_timer_index = None;
        }
    }

    /// Run any timers due by `now` (callers drive this from their own
    /// event loop alongside `receive`; spec §4.1 "callbacks may
    /// reschedule").
    pub fn tick(&mut self, now: Instant) {
        while let Some(fired) = self.scheduler.run_due(now) {
            match fired.cookie {
                TimerCookie::Link(TimerTag::T200(_)) => {
                    let events = self.link.on_t200_expiry(&mut self.scheduler, now);
                    self.drain_link_outbox();
                    for e in events {
                        self.events.push(e);
                    }
                }
                TimerCookie::Link(TimerTag::T203(_)) => {
                    let events = self.link.on_t203_expiry(&mut self.scheduler, now);
                    self.drain_link_outbox();
                    for e in events {
                        self.events.push(e);
                    }
                }
                TimerCookie::Call(handle, idx) => self.on_call_timer(handle, idx, now),
            }
        }
    }

    /// Supplementary-service call timer expiry table (spec §4.5 "T303/
    /// T305/T308/T309/T312/THold/TRetrieve").
    fn on_call_timer(&mut self, handle: CallHandle, idx: TimerIndex, now: Instant) {
        let Some(call) = self.pool.get(handle) else { return };
        if call.active_timer_index != Some(idx) {
            return; // stale: superseded by a later arm on this call
        }
        match idx {
            TimerIndex::T303 => self.on_t303_expiry(handle, now),
            TimerIndex::T305 => self.on_t305_expiry(handle, now),
            TimerIndex::T308 => self.on_t308_expiry(handle, now),
            TimerIndex::T309 => self.on_t309_expiry(handle),
            TimerIndex::T312 => self.on_t312_expiry(handle),
            TimerIndex::THold => self.on_thold_expiry(handle),
            TimerIndex::TRetrieve => self.on_tretrieve_expiry(handle),
            _ => {}
        }
    }

    /// T303: no response to an outgoing SETUP. Retransmit once, then give
    /// up with cause 18 (spec §4.5 "S2").
    fn on_t303_expiry(&mut self, handle: CallHandle, now: Instant) {
        let Some(call) = self.pool.get_mut(handle) else { return };
        if call.retry_count == 0 {
            call.retry_count = 1;
            let payload = call.pending_retransmit.clone();
            if let Some(payload) = payload {
                self.transmit_i(payload);
            }
            self.arm_call_timer(handle, TimerIndex::T303, now);
            return;
        }
        let cause = CauseValue::new(Cause::NoUserResponding, CauseLocation::PrivateNetworkLocalUser);
        self.abandon_call(handle, cause);
    }

    /// T305: peer never released after our DISCONNECT. Send RELEASE
    /// ourselves with cause 102 and fall through to T308 supervision
    /// (spec §4.5 "T305 supervises a sent DISCONNECT").
    fn on_t305_expiry(&mut self, handle: CallHandle, now: Instant) {
        let Some(call) = self.pool.get(handle) else { return };
        let call_ref = call.call_ref;
        let cause = CauseValue::new(Cause::RecoveryOnTimerExpiry, CauseLocation::PrivateNetworkLocalUser);
        let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::Release };
        let mut w = pri_core::OctetWriter::new();
        cause_ie::encode(&cause, &mut w);
        let payload = facade::encode_message(&header, vec![OutgoingIe::codeset0(tag::CAUSE, w.into_vec())]);
        if let Some(call) = self.pool.get_mut(handle) {
            call.state = fsm::CallState::ReleaseRequest;
            call.cause = Some(cause);
            call.pending_retransmit = Some(payload.clone());
            call.retry_count = 0;
        }
        self.transmit_i(payload);
        self.arm_call_timer(handle, TimerIndex::T308, now);
    }

    /// T308: no RELEASE COMPLETE after our RELEASE. Retransmit once, then
    /// force the call closed (spec §4.5 "T308 supervises a sent RELEASE").
    fn on_t308_expiry(&mut self, handle: CallHandle, now: Instant) {
        let Some(call) = self.pool.get_mut(handle) else { return };
        if call.retry_count == 0 {
            call.retry_count = 1;
            let payload = call.pending_retransmit.clone();
            if let Some(payload) = payload {
                self.transmit_i(payload);
            }
            self.arm_call_timer(handle, TimerIndex::T308, now);
            return;
        }
        let cause = call.cause.clone().unwrap_or_else(|| CauseValue::new(Cause::RecoveryOnTimerExpiry, CauseLocation::PrivateNetworkLocalUser));
        self.events.push(Event::new(EventKind::HangupAck { call: handle, cause }));
        self.cancel_call_timer(handle);
        self.pool.remove(handle);
    }

    /// T309: the data link went down under an active call and never came
    /// back (spec §4.5 "S6").
    fn on_t309_expiry(&mut self, handle: CallHandle) {
        let cause = CauseValue::new(Cause::DestinationOutOfOrder, CauseLocation::PrivateNetworkLocalUser);
        self.events.push(Event::new(EventKind::Hangup { call: handle, cause }));
        self.cancel_call_timer(handle);
        self.pool.remove(handle);
    }

    /// T312: a broadcast SETUP on an NT-PTMP interface got no winner
    /// (spec §4.4/§8 "NT-PTMP broadcast SETUP").
    fn on_t312_expiry(&mut self, handle: CallHandle) {
        let Some(call) = self.pool.get(handle) else { return };
        let call_ref = call.call_ref;
        let cause = CauseValue::new(Cause::NoUserResponding, CauseLocation::PrivateNetworkLocalUser);
        self.events.push(Event::new(EventKind::HangupAck { call: handle, cause }));
        let siblings = self.pool.all_by_call_ref(call_ref);
        for sib in siblings {
            self.cancel_call_timer(sib);
            self.pool.remove(sib);
        }
    }

    fn on_thold_expiry(&mut self, handle: CallHandle) {
        self.cancel_call_timer(handle);
        if let Some(call) = self.pool.get_mut(handle) {
            call.hold_state = HoldState::Idle;
        }
        self.events.push(Event::new(EventKind::HoldReject { call: handle }));
    }

    fn on_tretrieve_expiry(&mut self, handle: CallHandle) {
        self.cancel_call_timer(handle);
        if let Some(call) = self.pool.get_mut(handle) {
            call.hold_state = HoldState::CallHeld;
        }
        self.events.push(Event::new(EventKind::RetrieveReject { call: handle }));
    }

    /// Abandon a call that never got a response (a timer's final expiry):
    /// emit `HangupAck` with the given cause and free the call record.
    fn abandon_call(&mut self, handle: CallHandle, cause: CauseValue) {
        self.events.push(Event::new(EventKind::HangupAck { call: handle, cause }));
        self.cancel_call_timer(handle);
        self.pool.remove(handle);
    }

    /// Pop the next pending event, if any (spec §4.6 "poll_event").
    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop()
    }

    pub fn call_pool(&self) -> &CallPool {
        &self.pool
    }

    pub fn call_pool_mut(&mut self) -> &mut CallPool {
        &mut self.pool
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub(crate) fn alloc_call_ref(&mut self) -> Option<CallRef> {
        self.cref_alloc.allocate().map(|v| CallRef::new(v, true, self.width).unwrap())
    }

    pub(crate) fn width(&self) -> CrefWidth {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pri_core::{Layout, Side, SwitchVariant};

    #[test]
    fn start_brings_up_link() {
        let config = ControllerConfig::new(Side::User, Layout::Pri, SwitchVariant::NationalIsdn2);
        let mut ctl = Controller::new(config);
        ctl.start();
        assert_eq!(ctl.link.state, crate::q921::LinkState::AwaitingEstablishment);
        assert!(ctl.poll_outbound().is_some());
    }

    #[test]
    fn status_enquiry_replies_with_status() {
        let config = ControllerConfig::new(Side::Network, Layout::Pri, SwitchVariant::NationalIsdn2);
        let mut ctl = Controller::new(config);
        ctl.start();
        let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref: CallRef::new(0, true, CrefWidth::Pri).unwrap(), message_type: MessageType::StatusEnquiry };
        ctl.dispatch_message(header, &[], 0);
        assert!(ctl.poll_outbound().is_some());
    }
}
