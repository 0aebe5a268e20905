/// Shared decode/encode failure type for the octet- and BER-level codecs.
///
/// Mirrors the teacher's `PduParseErr`: a plain enum, no `std::error::Error`
/// impl, propagated with `?` and matched on directly by callers that need to
/// distinguish "drop the IE" from "the whole message is malformed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Ran out of bytes while reading a field.
    BufferEnded { field: &'static str },
    /// A length prefix didn't match the bytes actually available.
    InconsistentLength { expected: usize, found: usize },
    /// A tag byte wasn't recognized in the expected codeset/context.
    InvalidTag(u8),
    /// A field held a value outside its legal range.
    InvalidValue { field: &'static str, value: u64 },
    /// A structural invariant was violated (e.g. locking shift to codeset 0).
    Inconsistency { field: &'static str, reason: &'static str },
    /// Decoded successfully but the IE/operation isn't implemented.
    NotImplemented { what: &'static str },
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Checks a decoded field against an expected value, in the style of the
/// teacher's `expect_value!` macro.
#[macro_export]
macro_rules! expect_value {
    ($value:expr, $expected:expr, $field:expr) => {{
        let val = $value;
        let exp = $expected;
        if val == exp {
            Ok(())
        } else {
            Err($crate::error::CodecError::InvalidValue { field: $field, value: val as u64 })
        }
    }};
}
