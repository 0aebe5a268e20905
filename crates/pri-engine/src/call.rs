//! The call pool: an arena of in-progress calls addressed by handle,
//! replacing the source engine's raw pointer graph with a generation-
//! checked index (spec §9 "Concurrency & Resource Model" redesign note).

use pri_core::{CallRef, CauseValue, TimerId, TimerIndex};

use crate::q931::fsm::CallState;

/// A generation-checked index into the call pool. Stale handles (from a
/// destroyed call) are rejected rather than silently aliasing a new call
/// that reused the slot (spec §8 "destroying an already-destroyed call
/// reference has no effect").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallHandle {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    call: Option<Call>,
}

/// Hold/retrieve sub-state machine (spec §4.5 "Hold/Retrieve"). Tracked
/// separately from `CallState` since a held call's main state stays
/// `Active` throughout — only this sub-machine moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    HoldReq,
    HoldInd,
    CallHeld,
    RetrieveReq,
    RetrieveInd,
}

impl Default for HoldState {
    fn default() -> Self {
        HoldState::Idle
    }
}

/// One in-progress call's full state (spec §3 "Call record").
#[derive(Debug, Clone)]
pub struct Call {
    pub call_ref: CallRef,
    pub state: CallState,
    pub channel: Option<u8>,
    pub exclusive: bool,
    pub calling_number: Option<String>,
    pub called_number: Option<String>,
    /// Digits collected so far for overlap-sent/received dialing.
    pub overlap_digits: String,
    pub overlap_sending: bool,
    pub overlap_receiving: bool,
    pub cause: Option<CauseValue>,
    pub hold_state: HoldState,
    pub outboundbroadcast: bool,
    /// Armed timer, if any, for the call's current state (T303/T305/T308/
    /// T309/etc — the FSM only ever arms one at a time per call).
    pub active_timer: Option<TimerId>,
    /// Which timer `active_timer` is, so a later expiry belonging to a
    /// since-superseded arm can be told apart from the live one.
    pub active_timer_index: Option<TimerIndex>,
    /// NT-PTMP broadcast SETUP: other call-refs still racing to answer.
    pub broadcast_siblings: Vec<CallRef>,
    /// Redirecting-party state accumulated from FACILITY
    /// DivertingLegInformation2 (spec §4.3/§4.5 "redirecting updates").
    pub redirecting_number: Option<String>,
    pub redirecting_reason: u8,
    pub redirecting_count: u8,
    /// TEI this call is bound to; only meaningful for NT-PTMP broadcast
    /// SETUPs, where several TEs share one call-reference value and are
    /// told apart by TEI alone (spec §4.4/§8 "NT-PTMP broadcast SETUP").
    pub tei: u8,
    /// True once this call has been selected as the broadcast winner; the
    /// others sharing its call-reference value are released with cause 26
    /// (spec §8 "losing broadcast responses").
    pub pri_winner: bool,
    /// Payload to resend on T303/T308 expiry (the original SETUP/RELEASE),
    /// set by whoever arms that timer.
    pub pending_retransmit: Option<Vec<u8>>,
    /// 0 before first expiry, 1 after the first T303/T308 retransmit — a
    /// second expiry abandons the call instead of retransmitting again.
    pub retry_count: u8,
}

impl Call {
    pub fn new(call_ref: CallRef) -> Self {
        Call {
            call_ref,
            state: CallState::Null,
            channel: None,
            exclusive: false,
            calling_number: None,
            called_number: None,
            overlap_digits: String::new(),
            overlap_sending: false,
            overlap_receiving: false,
            cause: None,
            hold_state: HoldState::Idle,
            outboundbroadcast: false,
            active_timer: None,
            active_timer_index: None,
            broadcast_siblings: Vec::new(),
            redirecting_number: None,
            redirecting_reason: 0,
            redirecting_count: 0,
            tei: 0,
            pri_winner: false,
            pending_retransmit: None,
            retry_count: 0,
        }
    }
}

/// Arena of live calls. Slots are reused once freed; handles carry a
/// generation counter so a stale handle into a reused slot is rejected
/// rather than silently acting on the wrong call.
#[derive(Default)]
pub struct CallPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl CallPool {
    pub fn new() -> Self {
        CallPool { slots: Vec::new(), free: Vec::new() }
    }

    pub fn insert(&mut self, call: Call) -> CallHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.call = Some(call);
            CallHandle { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, call: Some(call) });
            CallHandle { index, generation: 0 }
        }
    }

    /// Removes a call. No-op if the handle is already stale or the slot
    /// already freed.
    pub fn remove(&mut self, handle: CallHandle) -> Option<Call> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let call = slot.call.take();
        if call.is_some() {
            self.free.push(handle.index);
        }
        call
    }

    pub fn get(&self, handle: CallHandle) -> Option<&Call> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.call.as_ref()
    }

    pub fn get_mut(&mut self, handle: CallHandle) -> Option<&mut Call> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.call.as_mut()
    }

    pub fn find_by_call_ref(&self, call_ref: CallRef) -> Option<CallHandle> {
        self.slots.iter().enumerate().find_map(|(index, slot)| match &slot.call {
            Some(call) if call.call_ref.value() == call_ref.value() => {
                Some(CallHandle { index: index as u32, generation: slot.generation })
            }
            _ => None,
        })
    }

    /// TEI-aware lookup for NT-PTMP broadcast SETUPs, where several TEs
    /// share one call-reference value and are distinguished only by TEI
    /// (spec §4.4/§8 "NT-PTMP broadcast SETUP").
    pub fn find_by_call_ref_and_tei(&self, call_ref: CallRef, tei: u8) -> Option<CallHandle> {
        self.slots.iter().enumerate().find_map(|(index, slot)| match &slot.call {
            Some(call) if call.call_ref.value() == call_ref.value() && call.tei == tei => {
                Some(CallHandle { index: index as u32, generation: slot.generation })
            }
            _ => None,
        })
    }

    /// All calls sharing a call-reference value (broadcast siblings), each
    /// with its own handle.
    pub fn all_by_call_ref(&self, call_ref: CallRef) -> Vec<CallHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match &slot.call {
                Some(call) if call.call_ref.value() == call_ref.value() => {
                    Some(CallHandle { index: index as u32, generation: slot.generation })
                }
                _ => None,
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CallHandle, &Call)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.call.as_ref().map(|c| (CallHandle { index: index as u32, generation: slot.generation }, c))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CallHandle, &mut Call)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.call.as_mut().map(move |c| (CallHandle { index: index as u32, generation }, c))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pri_core::CrefWidth;

    #[test]
    fn stale_handle_is_rejected_after_reuse() {
        let mut pool = CallPool::new();
        let cref = CallRef::new(1, true, CrefWidth::Pri).unwrap();
        let h1 = pool.insert(Call::new(cref));
        pool.remove(h1);
        let h2 = pool.insert(Call::new(cref));
        assert!(pool.get(h1).is_none());
        assert!(pool.get(h2).is_some());
    }

    #[test]
    fn double_remove_is_noop() {
        let mut pool = CallPool::new();
        let cref = CallRef::new(2, true, CrefWidth::Pri).unwrap();
        let h = pool.insert(Call::new(cref));
        assert!(pool.remove(h).is_some());
        assert!(pool.remove(h).is_none());
    }
}
