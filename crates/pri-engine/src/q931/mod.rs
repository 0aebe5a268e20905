//! Q.931 call state machine (spec §4.5).

pub mod fsm;

pub use fsm::{CallState, Outcome};
