//! ASN.1 (BER) codec for ROSE invoke/result/error/reject components
//! carried inside Q.932 facility IEs, plus per-operation argument codecs.

pub mod ber;
pub mod component;
pub mod facility;
pub mod ops;

pub use component::{Component, Invoke, OperationCode, Reject, RejectProblem, ReturnError, ReturnResult};
pub use facility::{Facility, ProtocolProfile, ProtocolProfileRaw};
