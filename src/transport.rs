//! The message-bus facade the manager talks through.
//!
//! The bus itself lives outside this crate. Implementations forward
//! [`Message`]s to the platform-manager server process and deliver inbound
//! messages for a registered group into an unbounded channel, which the
//! manager's dispatch task drains one message at a time.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::message::Message;

/// Sink receiving every inbound message for a registered group.
pub type InboundSink = mpsc::UnboundedSender<Message>;

/// Failures raised by a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No response arrived within the allotted time.
    #[error("no response within {0:?}")]
    Timeout(Duration),
    /// The server process is unreachable.
    #[error("server process disconnected")]
    Disconnected,
    /// Another handler already owns the message group.
    #[error("message group {0:#x} already has a handler")]
    GroupInUse(u32),
    /// The bus rejected the message.
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Request/response and push delivery over the platform bus.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Bus address of the server process.
    fn server_address_id(&self) -> u32;

    /// A message identifier unique within this process.
    fn next_message_id(&self) -> u32;

    /// Send `message` and wait up to `timeout` for its response.
    ///
    /// The returned message is the raw response; the caller validates it.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the message cannot be delivered or no
    /// response arrives in time.
    async fn send_message_response(
        &self,
        message: Message,
        timeout: Duration,
    ) -> Result<Message, TransportError>;

    /// Route inbound messages of `group` into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::GroupInUse`] if the group is taken.
    fn register_group_handler(&self, group: u32, sink: InboundSink) -> Result<(), TransportError>;

    /// Stop routing inbound messages of `group`.
    fn unregister_group_handler(&self, group: u32);
}
