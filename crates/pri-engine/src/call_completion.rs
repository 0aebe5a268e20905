//! Call-completion-on-busy/no-reply tracking (spec §3 "Call-completion
//! record", §4.5). Kept as its own small state machine rather than folded
//! into the main call FSM since a completion record outlives the call
//! that requested it.

use pri_core::{CallCompletionRecallMode, RetentionRequest, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    NotActive,
    RequestSent,
    Activated,
    AwaitingRecall,
    Recalled,
}

/// One outstanding call-completion subscription (CCBS/CCNR).
#[derive(Debug, Clone)]
pub struct CompletionRecord {
    pub id: u32,
    pub state: CompletionState,
    pub recall_mode: CallCompletionRecallMode,
    pub retention_request: RetentionRequest,
    pub busy_number: String,
    pub active_timer: Option<TimerId>,
}

impl CompletionRecord {
    pub fn new(id: u32, busy_number: String, recall_mode: CallCompletionRecallMode, retention_request: RetentionRequest) -> Self {
        CompletionRecord { id, state: CompletionState::NotActive, recall_mode, retention_request, busy_number, active_timer: None }
    }
}

/// A simple id-keyed table of outstanding completion records, owned
/// alongside the call pool by the controller.
#[derive(Debug, Default)]
pub struct CompletionTable {
    records: Vec<CompletionRecord>,
    next_id: u32,
}

impl CompletionTable {
    pub fn new() -> Self {
        CompletionTable { records: Vec::new(), next_id: 1 }
    }

    pub fn request(&mut self, busy_number: String, recall_mode: CallCompletionRecallMode, retention_request: RetentionRequest) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let mut record = CompletionRecord::new(id, busy_number, recall_mode, retention_request);
        record.state = CompletionState::RequestSent;
        self.records.push(record);
        id
    }

    pub fn cancel(&mut self, id: u32) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn activate(&mut self, id: u32) -> bool {
        if let Some(r) = self.records.iter_mut().find(|r| r.id == id) {
            r.state = CompletionState::Activated;
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: u32) -> Option<&CompletionRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_removes_record() {
        let mut table = CompletionTable::new();
        let id = table.request("5551000".into(), CallCompletionRecallMode::GloballyUnique, RetentionRequest::Release);
        assert!(table.get(id).is_some());
        assert!(table.cancel(id));
        assert!(table.get(id).is_none());
    }

    #[test]
    fn activate_transitions_state() {
        let mut table = CompletionTable::new();
        let id = table.request("5551000".into(), CallCompletionRecallMode::LinkId, RetentionRequest::RetainA);
        table.activate(id);
        assert_eq!(table.get(id).unwrap().state, CompletionState::Activated);
    }
}
