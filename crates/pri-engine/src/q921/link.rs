//! Q.921 LAPD link state machine: one per TEI (spec §4.4).
//!
//! Structured the way the teacher structures its call FSMs: an explicit
//! state enum plus a single dispatch entry point per trigger, mutating
//! the link in place and returning whatever upward indications and
//! outbound frames resulted.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use pri_core::{Layout, ResolvedPersistence, Scheduler, TimerId};
use pri_ie::q921::{Address, Control, Frame, TEI_BROADCAST};

use crate::events::{Event, EventKind};
use crate::timer::TimerCookie;

/// Retransmission limit before a link is declared down (spec §4.4 "N200").
const N200_LIMIT: u32 = 3;
const T200_MILLIS: u64 = 1000;
const T203_MILLIS: u64 = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    TeiUnassigned,
    EstablishAwaitingTei,
    TeiAssigned,
    AwaitingEstablishment,
    MultiFrameEstablished,
    TimerRecovery,
    AwaitingRelease,
}

/// One Q.921 link: a TEI plus its send/receive sequence state, timers,
/// and retransmission queue.
pub struct Link {
    pub tei: u8,
    pub state: LinkState,
    pub persistence: ResolvedPersistence,
    /// V(S): next I-frame sequence number we will send.
    v_s: u8,
    /// V(R): next I-frame sequence number we expect to receive.
    v_r: u8,
    /// V(A): last I-frame of ours acknowledged by the peer.
    v_a: u8,
    retransmit_queue: VecDeque<Vec<u8>>,
    unacked: VecDeque<(u8, Vec<u8>)>,
    n200_count: u32,
    t200: Option<TimerId>,
    t203: Option<TimerId>,
    pub outbox: Vec<Vec<u8>>,
}

const MOD: u8 = 128;

fn seq_add(a: u8, b: u8) -> u8 {
    (a + b) % MOD
}

fn seq_between(lo: u8, n: u8, hi: u8) -> bool {
    // true if n is in [lo, hi) modulo 128, inclusive of lo, exclusive of hi.
    if lo <= hi { lo <= n && n < hi } else { n >= lo || n < hi }
}

impl Link {
    pub fn new(tei: u8, persistence: ResolvedPersistence) -> Self {
        Link {
            tei,
            state: LinkState::TeiUnassigned,
            persistence,
            v_s: 0,
            v_r: 0,
            v_a: 0,
            retransmit_queue: VecDeque::new(),
            unacked: VecDeque::new(),
            n200_count: 0,
            t200: None,
            t203: None,
            outbox: Vec::new(),
        }
    }

    fn send_frame(&mut self, control: Control, payload: Vec<u8>, command: bool) {
        let frame = Frame {
            address: Address { sapi: pri_ie::q921::SAPI_CALL_CONTROL, command_response: command, tei: self.tei },
            control,
            payload,
        };
        self.outbox.push(frame.encode());
    }

    /// Bring the link up: send SABME, enter Awaiting-Establishment, and arm
    /// T200 to supervise it (spec §4.4 "bring_up primitive"/"T200
    /// supervises the outstanding SABME/I-frame").
    pub fn bring_up(&mut self, scheduler: &mut Scheduler<TimerCookie>, now: Instant) -> Vec<Event> {
        if matches!(self.state, LinkState::MultiFrameEstablished | LinkState::AwaitingEstablishment) {
            return Vec::new();
        }
        self.v_s = 0;
        self.v_r = 0;
        self.v_a = 0;
        self.n200_count = 0;
        self.send_frame(Control::SetAsyncBalancedModeExtended { poll: true }, Vec::new(), true);
        self.state = LinkState::AwaitingEstablishment;
        self.arm_t200(scheduler, now);
        Vec::new()
    }

    /// Broadcast a SETUP (or any other Q.931 message) over TEI 127 rather
    /// than this link's own TEI (spec §4.5/§8 "NT-PTMP broadcast SETUP").
    pub fn transmit_broadcast_ui(&mut self, payload: Vec<u8>) {
        let frame = Frame {
            address: Address { sapi: pri_ie::q921::SAPI_CALL_CONTROL, command_response: true, tei: TEI_BROADCAST },
            control: Control::UnnumberedInformation { poll: false },
            payload,
        };
        self.outbox.push(frame.encode());
    }

    /// Queue an I-frame for transmission (spec §4.4 "transmit_i
    /// primitive"). Only meaningful once multi-frame established; earlier
    /// states simply buffer the payload for retransmission once the link
    /// comes up, matching the teacher's "queue until established" style.
    pub fn transmit_i(&mut self, payload: Vec<u8>) {
        if self.state != LinkState::MultiFrameEstablished {
            self.retransmit_queue.push_back(payload);
            return;
        }
        self.send_i_frame(payload);
    }

    fn send_i_frame(&mut self, payload: Vec<u8>) {
        let n_s = self.v_s;
        self.unacked.push_back((n_s, payload.clone()));
        self.v_s = seq_add(self.v_s, 1);
        self.send_frame(Control::Information { n_s, n_r: self.v_r, poll: false }, payload, true);
    }

    /// Queue an I-frame and arm T200 for it if nothing is currently
    /// outstanding (spec §4.4 "T200 supervises the outstanding SABME/
    /// I-frame"). This is the variant callers with scheduler access use;
    /// plain `transmit_i` still exists for tests that don't care about
    /// timer side effects.
    pub fn transmit_i_timed(&mut self, payload: Vec<u8>, scheduler: &mut Scheduler<TimerCookie>, now: Instant) {
        let was_idle = self.unacked.is_empty() && self.retransmit_queue.is_empty();
        self.transmit_i(payload);
        if self.state == LinkState::MultiFrameEstablished && was_idle {
            self.arm_t200(scheduler, now);
        }
    }

    pub fn transmit_ui(&mut self, payload: Vec<u8>) {
        self.send_frame(Control::UnnumberedInformation { poll: false }, payload, true);
    }

    /// Process an inbound frame for this link. Returns upward events plus
    /// (via `self.outbox`) whatever frames should go back out.
    pub fn handle_frame(&mut self, frame: &Frame, scheduler: &mut Scheduler<TimerCookie>, now: Instant) -> Vec<Event> {
        match frame.control {
            Control::SetAsyncBalancedModeExtended { .. } => self.on_sabme(scheduler, now),
            Control::UnnumberedAcknowledge { .. } => self.on_ua(scheduler, now),
            Control::DisconnectedMode { .. } => self.on_dm(scheduler),
            Control::Disconnect { .. } => self.on_disc(),
            Control::Information { n_s, n_r, poll } => self.on_i_frame(n_s, n_r, poll, &frame.payload),
            Control::ReceiveReady { n_r, .. } => self.on_rr(n_r, scheduler, now),
            Control::ReceiveNotReady { n_r, .. } => self.on_rr(n_r, scheduler, now),
            Control::Reject { n_r, .. } => self.on_rr(n_r, scheduler, now),
            Control::FrameReject { .. } => {
                tracing::warn!(tei = self.tei, "peer sent FRMR, re-establishing link");
                self.bring_up(scheduler, now)
            }
            Control::UnnumberedInformation { .. } => Vec::new(),
        }
    }

    fn on_sabme(&mut self, scheduler: &mut Scheduler<TimerCookie>, now: Instant) -> Vec<Event> {
        self.v_s = 0;
        self.v_r = 0;
        self.v_a = 0;
        self.send_frame(Control::UnnumberedAcknowledge { final_bit: true }, Vec::new(), false);
        let was_established = self.state == LinkState::MultiFrameEstablished;
        self.state = LinkState::MultiFrameEstablished;
        self.arm_t203(scheduler, now);
        if was_established {
            vec![Event::new(EventKind::DChanDown), Event::new(EventKind::DChanUp)]
        } else {
            vec![Event::new(EventKind::DChanUp)]
        }
    }

    fn on_ua(&mut self, scheduler: &mut Scheduler<TimerCookie>, now: Instant) -> Vec<Event> {
        if self.state != LinkState::AwaitingEstablishment {
            return Vec::new();
        }
        self.cancel_t200(scheduler);
        self.state = LinkState::MultiFrameEstablished;
        let queued = self.retransmit_queue.drain(..).collect::<Vec<_>>();
        let sent_any = !queued.is_empty();
        for payload in queued {
            self.send_i_frame(payload);
        }
        if sent_any {
            self.arm_t200(scheduler, now);
        }
        vec![Event::new(EventKind::DChanUp)]
    }

    fn on_dm(&mut self, scheduler: &mut Scheduler<TimerCookie>) -> Vec<Event> {
        self.cancel_t200(scheduler);
        let was_up = self.state == LinkState::MultiFrameEstablished;
        self.state = LinkState::TeiAssigned;
        if was_up {
            vec![Event::new(EventKind::DChanDown)]
        } else {
            Vec::new()
        }
    }

    fn on_disc(&mut self) -> Vec<Event> {
        self.send_frame(Control::UnnumberedAcknowledge { final_bit: true }, Vec::new(), false);
        let was_up = self.state == LinkState::MultiFrameEstablished;
        self.state = LinkState::TeiAssigned;
        if was_up {
            vec![Event::new(EventKind::DChanDown)]
        } else {
            Vec::new()
        }
    }

    fn on_i_frame(&mut self, n_s: u8, n_r: u8, poll: bool, payload: &[u8]) -> Vec<Event> {
        if self.state != LinkState::MultiFrameEstablished {
            return Vec::new();
        }
        if n_s != self.v_r {
            self.send_frame(Control::Reject { n_r: self.v_r, poll_final: false }, Vec::new(), true);
            return Vec::new();
        }
        self.v_r = seq_add(self.v_r, 1);
        self.ack_up_to(n_r);
        if poll {
            self.send_frame(Control::ReceiveReady { n_r: self.v_r, poll_final: true }, Vec::new(), false);
        } else {
            self.send_frame(Control::ReceiveReady { n_r: self.v_r, poll_final: false }, Vec::new(), false);
        }
        // The payload is a Q.931 message; the caller (controller) decodes
        // it separately from the raw frame it already has, so this
        // function itself does not produce content events.
        let _ = payload;
        Vec::new()
    }

    fn on_rr(&mut self, n_r: u8, scheduler: &mut Scheduler<TimerCookie>, now: Instant) -> Vec<Event> {
        self.ack_up_to(n_r);
        if self.unacked.is_empty() {
            self.cancel_t200(scheduler);
        } else {
            self.arm_t200(scheduler, now);
        }
        Vec::new()
    }

    fn ack_up_to(&mut self, n_r: u8) {
        if !seq_between(self.v_a, n_r, seq_add(self.v_s, 1)) && n_r != self.v_s {
            return;
        }
        while let Some((seq, _)) = self.unacked.front() {
            if *seq == n_r {
                break;
            }
            self.unacked.pop_front();
        }
        self.v_a = n_r;
    }

    fn arm_t203(&mut self, scheduler: &mut Scheduler<TimerCookie>, now: Instant) {
        if let Some(id) = self.t203.take() {
            scheduler.cancel(id);
        }
        self.t203 = Some(scheduler.schedule(now, Duration::from_millis(T203_MILLIS), TimerCookie::Link(TimerTag::T203(self.tei))));
    }

    fn arm_t200(&mut self, scheduler: &mut Scheduler<TimerCookie>, now: Instant) {
        if let Some(id) = self.t200.take() {
            scheduler.cancel(id);
        }
        self.t200 = Some(scheduler.schedule(now, Duration::from_millis(T200_MILLIS), TimerCookie::Link(TimerTag::T200(self.tei))));
    }

    fn cancel_t200(&mut self, scheduler: &mut Scheduler<TimerCookie>) {
        if let Some(id) = self.t200.take() {
            scheduler.cancel(id);
        }
        self.n200_count = 0;
    }

    /// T200 fired: retransmit the oldest unacked I-frame (or the SABME, if
    /// still awaiting establishment), or declare the link down past N200
    /// retries (spec §4.4 "T200/N200 retransmission").
    pub fn on_t200_expiry(&mut self, scheduler: &mut Scheduler<TimerCookie>, now: Instant) -> Vec<Event> {
        self.t200 = None;
        if self.state == LinkState::AwaitingEstablishment {
            self.n200_count += 1;
            if self.n200_count > N200_LIMIT {
                self.n200_count = 0;
                self.state = LinkState::TeiAssigned;
                return vec![Event::new(EventKind::DChanDown)];
            }
            self.send_frame(Control::SetAsyncBalancedModeExtended { poll: true }, Vec::new(), true);
            self.arm_t200(scheduler, now);
            return Vec::new();
        }
        if self.state != LinkState::MultiFrameEstablished || self.unacked.is_empty() {
            return Vec::new();
        }
        self.n200_count += 1;
        if self.n200_count > N200_LIMIT {
            self.n200_count = 0;
            let was_up = self.state == LinkState::MultiFrameEstablished;
            self.state = LinkState::TeiAssigned;
            return if was_up { vec![Event::new(EventKind::DChanDown)] } else { Vec::new() };
        }
        let payload = self.unacked.front().map(|(_, p)| p.clone());
        if let Some(payload) = payload {
            self.send_frame(Control::Information { n_s: self.v_s.wrapping_sub(self.unacked.len() as u8), n_r: self.v_r, poll: true }, payload, true);
        }
        self.arm_t200(scheduler, now);
        Vec::new()
    }

    /// T203 fired with the link idle: poll the peer to confirm it's still
    /// there (spec §4.4 "T203 supervises link activity in the absence of
    /// outstanding I-frames").
    pub fn on_t203_expiry(&mut self, scheduler: &mut Scheduler<TimerCookie>, now: Instant) -> Vec<Event> {
        self.t203 = None;
        if self.state != LinkState::MultiFrameEstablished {
            return Vec::new();
        }
        self.send_frame(Control::ReceiveReady { n_r: self.v_r, poll_final: true }, Vec::new(), true);
        self.arm_t200(scheduler, now);
        Vec::new()
    }

    /// Layer-2 persistence governs whether the link is automatically
    /// brought back up after a layout-driven or operator-driven teardown
    /// (spec §4.4).
    pub fn should_auto_restart(&self) -> bool {
        matches!(self.persistence, ResolvedPersistence::KeepUp)
    }
}

/// Cookie type used when arming link timers on the shared scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTag {
    T200(u8),
    T203(u8),
}

pub fn default_persistence(layout: Layout) -> ResolvedPersistence {
    pri_core::Layer2Persistence::Default.resolve(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bring_up_emits_sabme_and_enters_awaiting() {
        let mut link = Link::new(0, ResolvedPersistence::KeepUp);
        let mut scheduler: Scheduler<TimerCookie> = Scheduler::new();
        link.bring_up(&mut scheduler, Instant::now());
        assert_eq!(link.state, LinkState::AwaitingEstablishment);
        assert_eq!(link.outbox.len(), 1);
    }

    #[test]
    fn ua_after_sabme_establishes_link() {
        let mut link = Link::new(0, ResolvedPersistence::KeepUp);
        let mut scheduler: Scheduler<TimerCookie> = Scheduler::new();
        let now = Instant::now();
        link.bring_up(&mut scheduler, now);
        let events = link.on_ua(&mut scheduler, now);
        assert_eq!(link.state, LinkState::MultiFrameEstablished);
        assert_eq!(events, vec![Event::new(EventKind::DChanUp)]);
    }

    #[test]
    fn i_frame_out_of_sequence_is_rejected() {
        let mut link = Link::new(0, ResolvedPersistence::KeepUp);
        link.state = LinkState::MultiFrameEstablished;
        link.on_i_frame(1, 0, false, &[]);
        assert_eq!(link.v_r, 0);
        assert_eq!(link.outbox.len(), 1);
    }
}
