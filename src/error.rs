//! Canonical error and result types for the crate.
//!
//! Every public manager call returns [`MapmError`] on failure. Callers that
//! need the integer status codes used on the bus can map any error through
//! [`MapmError::code`].

use crate::{message::DecodeError, transport::TransportError, types::ConnectionStatus};

/// Top-level error type exposed by `mapm`.
#[derive(Debug, thiserror::Error)]
pub enum MapmError {
    /// The manager has not been initialised, or has been shut down.
    #[error("manager is not initialised")]
    NotInitialized,
    /// The manager was initialised twice.
    #[error("manager is already initialised")]
    AlreadyInitialized,
    /// An argument is out of range or inconsistent.
    #[error("invalid parameter")]
    InvalidParameter,
    /// A required callback is missing.
    #[error("invalid callback")]
    InvalidCallback,
    /// The manager state lock was poisoned by a panicking holder.
    #[error("unable to lock manager context")]
    UnableToLockContext,
    /// The completion used by a blocking connect could not be created.
    #[error("unable to create completion event")]
    UnableToCreateEvent,
    /// A message body exceeds what the wire format can describe.
    #[error("unable to allocate message")]
    UnableToAllocateMemory,
    /// A record with the same key exists, or the request could not be sent.
    #[error("unable to add registry entry")]
    UnableToAddEntry,
    /// The transport refused the group handler.
    #[error("unable to register message group handler")]
    UnableToRegisterHandler,
    /// No record matches the role and key.
    #[error("no connection in the expected state")]
    InvalidConnectionState,
    /// No local server is registered with the instance identifier.
    #[error("unknown instance identifier")]
    InvalidInstanceId,
    /// A response was undersized or internally inconsistent.
    #[error("response message invalid: {0}")]
    ResponseMessageInvalid(#[source] DecodeError),
    /// A blocking connect completed with a failure status.
    #[error("unable to connect to device: {status:?}")]
    UnableToConnectToDevice {
        /// Final status reported for the attempt.
        status: ConnectionStatus,
    },
    /// The local radio is powered down.
    #[error("local device is powered down")]
    LocalDevicePoweredDown,
    /// The bus failed to carry the request.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The server process reported a failure status.
    #[error("server reported status {0}")]
    Remote(i32),
}

impl MapmError {
    /// Integer status code for this error. Success is `0`; every error is
    /// negative.
    ///
    /// ```
    /// use mapm::MapmError;
    ///
    /// assert_eq!(MapmError::NotInitialized.code(), -1);
    /// assert_eq!(MapmError::Remote(-42).code(), -42);
    /// ```
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::NotInitialized => -1,
            Self::AlreadyInitialized => -2,
            Self::InvalidParameter => -3,
            Self::InvalidCallback => -4,
            Self::UnableToLockContext => -5,
            Self::UnableToCreateEvent => -6,
            Self::UnableToAllocateMemory => -7,
            Self::UnableToAddEntry => -8,
            Self::UnableToRegisterHandler => -9,
            Self::InvalidConnectionState => -10,
            Self::InvalidInstanceId => -11,
            Self::ResponseMessageInvalid(_) => -12,
            Self::UnableToConnectToDevice { .. } => -13,
            Self::LocalDevicePoweredDown => -14,
            Self::Transport(TransportError::Timeout(_)) => -15,
            Self::Transport(_) => -16,
            Self::Remote(status) => *status,
        }
    }
}

impl From<DecodeError> for MapmError {
    fn from(error: DecodeError) -> Self { Self::ResponseMessageInvalid(error) }
}

/// Canonical result alias used by `mapm` public APIs.
pub type Result<T> = std::result::Result<T, MapmError>;
