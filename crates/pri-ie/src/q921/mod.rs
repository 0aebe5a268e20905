//! Q.921 (LAPD) frame codec: address and control octets.

mod frame;

pub use frame::{Address, Control, Frame, FrameError, SAPI_CALL_CONTROL, SAPI_LAYER2_MANAGEMENT, TEI_BROADCAST};
