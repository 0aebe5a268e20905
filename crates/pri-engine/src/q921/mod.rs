//! Q.921 link-layer state, one instance per TEI (spec §4.4).

pub mod link;

pub use link::{Link, LinkState, TimerTag};
