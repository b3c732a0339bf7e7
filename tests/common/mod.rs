//! Shared utilities for integration tests.
//!
//! Provides a started manager bound to a [`MockTransport`] and a few
//! well-known addresses.

#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::sync::Arc;

use mapm::{BdAddr, Manager, ManagerConfig};
pub use mapm_testing::TestResult;
use mapm_testing::MockTransport;

pub const PEER: BdAddr = BdAddr::new([0x00, 0x1b, 0xdc, 0x0f, 0x10, 0x21]);
pub const OTHER_PEER: BdAddr = BdAddr::new([0x00, 0x1b, 0xdc, 0x0f, 0x10, 0x22]);

/// A running manager and the transport it talks through.
pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub manager: Manager,
}

impl Harness {
    /// Build and initialise a manager with default settings.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start() -> TestResult<Self> { Self::start_with(ManagerConfig::default()) }

    pub fn start_with(config: ManagerConfig) -> TestResult<Self> {
        let transport = Arc::new(MockTransport::new());
        let manager = Manager::builder(transport.clone()).config(config).build();
        manager.initialize()?;
        Ok(Self { transport, manager })
    }
}
