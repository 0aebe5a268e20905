//! Core scalar types and utilities shared across the signaling engine.
//!
//! Mirrors the teacher's `tetra-core`: small, dependency-light building
//! blocks (errors, a byte cursor, a timer wheel, call-reference/cause
//! enums, switch-variant configuration, logging setup) that every other
//! crate in the workspace builds on.

pub mod callref;
pub mod cause;
pub mod debug;
pub mod error;
pub mod octets;
pub mod scheduler;
pub mod timers;
pub mod variant;

pub use callref::{CallRef, CrefAllocator, CrefWidth};
pub use cause::{Cause, CauseLocation, CauseValue, CodingStandard};
pub use error::CodecError;
pub use octets::{OctetReader, OctetWriter};
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, TimerId};
pub use timers::{TimerIndex, TimerTable, TimerValue};
pub use variant::{
    CallCompletionRecallMode, DateTimeSendPolicy, DisplayFlags, Gr303Channel, Layer2Persistence, Layout,
    ResolvedPersistence, RetentionRequest, Side, SwitchVariant,
};

/// Logs a warning for a reached-but-deliberately-unhandled branch, in the
/// style of the teacher's `unimplemented_log!`. Used sparingly, only where
/// DESIGN.md records an explicit, named Open Question deferral — never as
/// a stand-in for an unbuilt feature.
#[macro_export]
macro_rules! deferred_log {
    ( $($arg:tt)* ) => {{
        tracing::warn!("deferred (see DESIGN.md): {}", format_args!($($arg)*));
    }};
}
