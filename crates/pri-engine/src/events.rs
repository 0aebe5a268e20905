//! The event/subcommand type hierarchy delivered upward from
//! [`crate::controller::Controller::poll_event`] (spec §4.6).

use pri_core::CauseValue;

use crate::call::CallHandle;

/// A structured sub-event accumulated while processing one signaling
/// message, attached to the event it rode in on (spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcommand {
    DisplayText(String),
    ConnectedLine { number: Option<String>, name: Option<String> },
    Redirecting { from_number: Option<String>, reason: u8, count: u8 },
    Aoc,
    CallCompletion,
    TransferInformation { redirection_number: Option<String> },
    StatusRequestResponse { suggested_state: Option<u8> },
}

/// The event discriminator plus payload (spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    DChanUp,
    DChanDown,
    Restart { channel: Option<u8> },
    RestartAck,
    ConfigErr(String),
    Ring { call: CallHandle, calling: Option<String>, called: Option<String>, channel: Option<u8> },
    Proceeding { call: CallHandle },
    SetupAck { call: CallHandle },
    Alerting { call: CallHandle },
    Answer { call: CallHandle },
    ConnectAck { call: CallHandle },
    Progress { call: CallHandle },
    Hangup { call: CallHandle, cause: CauseValue },
    HangupReq { call: CallHandle, cause: CauseValue },
    HangupAck { call: CallHandle, cause: CauseValue },
    Facility { call: CallHandle },
    InfoReceived { call: CallHandle, digits: String },
    Notify { call: CallHandle, notification: u8 },
    KeypadDigit { call: CallHandle, digit: char },
    Service { call: CallHandle },
    ServiceAck { call: CallHandle },
    Hold { call: CallHandle },
    HoldAck { call: CallHandle },
    HoldReject { call: CallHandle },
    Retrieve { call: CallHandle },
    RetrieveAck { call: CallHandle },
    RetrieveReject { call: CallHandle },
}

/// An event plus whatever subcommands were accumulated while it was
/// produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub subcommands: Vec<Subcommand>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Event { kind, subcommands: Vec::new() }
    }

    pub fn with_subcommands(kind: EventKind, subcommands: Vec<Subcommand>) -> Self {
        Event { kind, subcommands }
    }
}

/// Bounded FIFO of pending events, mirroring the teacher's
/// `MessageQueue`: push at the back, drain from the front, one event
/// produced per controller wake (spec §4.6).
#[derive(Debug, Default)]
pub struct EventQueue {
    events: std::collections::VecDeque<Event>,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        EventQueue { events: std::collections::VecDeque::new(), capacity }
    }

    /// Pushes an event, dropping the oldest queued event if at capacity
    /// (a host that doesn't drain promptly loses the least-recent event
    /// rather than the one currently being produced).
    pub fn push(&mut self, event: Event) {
        if self.capacity > 0 && self.events.len() >= self.capacity {
            tracing::warn!("event queue full, dropping oldest queued event");
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_when_over_capacity() {
        let mut q = EventQueue::new(2);
        q.push(Event::new(EventKind::DChanUp));
        q.push(Event::new(EventKind::DChanDown));
        q.push(Event::new(EventKind::RestartAck));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().unwrap().kind, EventKind::DChanDown);
    }
}
