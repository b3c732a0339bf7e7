//! Builder for [`Manager`].

use std::sync::Arc;

use super::Manager;
use crate::{config::ManagerConfig, transport::Transport};

/// Configures a [`Manager`] before it is created.
///
/// # Examples
///
/// ```no_run
/// use std::{sync::Arc, time::Duration};
///
/// use mapm::{Manager, ManagerConfig, transport::Transport};
///
/// # fn demo(transport: Arc<dyn Transport>) {
/// let manager = Manager::builder(transport)
///     .config(ManagerConfig::default().response_timeout(Duration::from_secs(1)))
///     .build();
/// assert!(!manager.is_initialized());
/// # }
/// ```
#[must_use]
pub struct ManagerBuilder {
    transport: Arc<dyn Transport>,
    config: ManagerConfig,
}

impl ManagerBuilder {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: ManagerConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply `f` to the current configuration.
    pub fn configure(mut self, f: impl FnOnce(ManagerConfig) -> ManagerConfig) -> Self {
        self.config = f(self.config);
        self
    }

    /// Create the manager. It must still be initialised before use.
    pub fn build(self) -> Manager { Manager::from_parts(self.transport, self.config) }
}
