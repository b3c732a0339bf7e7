//! Manager configuration.
//!
//! [`ManagerConfig`] can be built in code or deserialised from any serde
//! format; missing fields take their defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bound on a request/response round trip.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Settings applied when a manager is initialised.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use mapm::ManagerConfig;
///
/// let config = ManagerConfig::default().response_timeout(Duration::from_secs(2));
/// assert_eq!(config.timeout(), Duration::from_secs(2));
/// assert!(config.is_initially_powered());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Round-trip bound in milliseconds.
    response_timeout_ms: u64,
    /// Address requests to this bus id instead of the transport's server.
    address_id_override: Option<u32>,
    /// Power state assumed until the first device event arrives.
    initially_powered: bool,
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: duration_millis(DEFAULT_RESPONSE_TIMEOUT),
            address_id_override: None,
            initially_powered: true,
        }
    }
}

impl ManagerConfig {
    /// Bound each request/response round trip.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout_ms = duration_millis(timeout);
        self
    }

    /// Send requests to `address_id` rather than the transport's default.
    #[must_use]
    pub fn address_id_override(mut self, address_id: Option<u32>) -> Self {
        self.address_id_override = address_id;
        self
    }

    /// Set the power state assumed at initialisation.
    #[must_use]
    pub fn initially_powered(mut self, powered: bool) -> Self {
        self.initially_powered = powered;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.response_timeout_ms) }

    #[must_use]
    pub fn address_id(&self) -> Option<u32> { self.address_id_override }

    #[must_use]
    pub fn is_initially_powered(&self) -> bool { self.initially_powered }

    /// Check the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MapmError::InvalidParameter`] for a zero timeout.
    pub fn validate(&self) -> crate::Result<()> {
        if self.response_timeout_ms == 0 {
            return Err(crate::MapmError::InvalidParameter);
        }
        Ok(())
    }
}
