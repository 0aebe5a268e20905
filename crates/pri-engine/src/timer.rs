//! Unified timer-cookie type so link-level (Q.921) and call-level
//! (Q.931) timers can share one [`pri_core::Scheduler`] and one `tick`
//! dispatch loop (spec §4.1/§4.5) instead of the controller needing a
//! scheduler per concern.

use pri_core::TimerIndex;

use crate::call::CallHandle;
use crate::q921::TimerTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCookie {
    Link(TimerTag),
    Call(CallHandle, TimerIndex),
}
