//! Error types for the message codec.
//!
//! Every failure is detected before any variable-length region is read, so a
//! caller holding a [`DecodeError`] knows that no field past the header was
//! trusted.

use thiserror::Error;

/// Failures raised while parsing a MAP bus message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than a full message header were supplied.
    #[error("incomplete message header: have {have}, need {need}")]
    IncompleteHeader {
        /// Bytes available.
        have: usize,
        /// Bytes required for the header.
        need: usize,
    },

    /// The header claims more payload than the buffer holds.
    #[error("message truncated: header declares {declared} bytes, {available} available")]
    Truncated {
        /// Payload length declared by the header.
        declared: usize,
        /// Payload bytes actually present.
        available: usize,
    },

    /// The declared length is below the fixed size of the body.
    #[error("message body too short: {declared} < minimum {minimum}")]
    TooShort {
        /// Declared body length.
        declared: usize,
        /// Minimum body length for the function.
        minimum: usize,
    },

    /// Internal length fields imply more bytes than the message declares.
    #[error("inconsistent lengths: fields imply {implied} bytes, message declares {declared}")]
    Inconsistent {
        /// Declared body length.
        declared: usize,
        /// Body length implied by the variable-length fields.
        implied: usize,
    },

    /// A string region is not NUL-terminated.
    #[error("string field `{field}` is not NUL-terminated")]
    UnterminatedString {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A string region is not valid UTF-8.
    #[error("string field `{field}` is not valid UTF-8")]
    InvalidUtf8 {
        /// Name of the offending field.
        field: &'static str,
    },

    /// An enumerated field carries an unknown value.
    #[error("field `{field}` has unsupported value {value}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value received.
        value: u32,
    },

    /// A message was parsed as the wrong body type.
    #[error("unexpected message function {actual:#x}, expected {expected:#x}")]
    UnexpectedFunction {
        /// Function code the body type expects.
        expected: u32,
        /// Function code carried by the header.
        actual: u32,
    },
}
