//! Wire-format codecs for Q.921 and Q.931/Q.932 information elements.
//!
//! Stateless transformations between octet form and structured form;
//! does not own any call or link state (that lives in `pri-engine`).

pub mod q921;
pub mod q931;
