//! Test doubles for driving a [`Manager`](mapm::Manager) without a platform
//! bus.
//!
//! [`MockTransport`] answers requests from a script and lets tests inject the
//! asynchronous messages the server process would send.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mapm::Manager;
//! use mapm_testing::MockTransport;
//!
//! # async fn example() -> mapm::Result<()> {
//! let transport = Arc::new(MockTransport::new());
//! let manager = Manager::builder(transport.clone()).build();
//! manager.initialize()?;
//! assert!(transport.has_handler());
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod logging;
pub mod transport;

pub use events::{EventRecorder, recorder};
pub use logging::{LoggerHandle, logger};
pub use transport::{MockTransport, Responder, SERVER_ADDRESS_ID};

/// Result type for fallible tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
