//! The call-control engine: Q.921 link state, Q.931 call state, the
//! controller that owns both plus the event queue and scheduler, and a
//! thin facade of validated external entry points (spec §4.4-§4.7).

pub mod call;
pub mod call_completion;
pub mod controller;
pub mod events;
pub mod facade;
pub mod q921;
pub mod q931;
pub mod timer;

pub use call::{Call, CallHandle, CallPool, HoldState};
pub use controller::Controller;
pub use events::{Event, EventKind, EventQueue, Subcommand};
pub use timer::TimerCookie;
