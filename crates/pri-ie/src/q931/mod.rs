//! Q.931 header and information-element codecs.

pub mod header;
pub mod ie;
pub mod message;

pub use header::{Header, MessageType, ProtocolDiscriminator};
