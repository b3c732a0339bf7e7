//! Outgoing connections.
//!
//! A connect first creates a provisional record, then sends the request. The
//! synchronous response only says the server accepted the request; the final
//! outcome arrives later as a connection-status message. In blocking mode
//! the caller waits for that message on the record's completion channel,
//! which the dispatcher fires.

use log::{debug, warn};

use super::{Manager, check_instance, check_port};
use crate::{
    address::BdAddr,
    error::{MapmError, Result},
    event::EventCallback,
    message::{connection::ConnectRemoteDevice, function},
    registry::ConnectionRecord,
    types::{ConnectionFlags, ConnectionRole, ConnectionStatus},
};

/// How the outcome of [`Manager::connect_remote_device`] is reported.
#[derive(Clone)]
pub enum ConnectMode {
    /// Return once the request is accepted; the outcome and all later events
    /// go to the callback.
    Callback(EventCallback),
    /// Wait for the final connection status.
    Blocking,
}

impl std::fmt::Debug for ConnectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Blocking => f.write_str("Blocking"),
        }
    }
}

impl Manager {
    /// Connect to a remote MSE, or to a remote MCE's notification server.
    ///
    /// In [`ConnectMode::Callback`] mode the returned status only means the
    /// server accepted the request. In [`ConnectMode::Blocking`] mode the
    /// call returns once the connection is up, which may take arbitrarily
    /// long; only a power-down or [`Manager::shutdown`] ends the wait early.
    ///
    /// # Errors
    ///
    /// - [`MapmError::InvalidParameter`] for a server role, a null address, or
    ///   an out-of-range port or instance.
    /// - [`MapmError::LocalDevicePoweredDown`] while the radio is off.
    /// - [`MapmError::UnableToAddEntry`] if the connection is already tracked
    ///   or the request could not be delivered.
    /// - [`MapmError::UnableToConnectToDevice`] if a blocking connect fails.
    pub async fn connect_remote_device(
        &self,
        role: ConnectionRole,
        address: BdAddr,
        remote_server_port: u32,
        instance_id: u32,
        connection_flags: ConnectionFlags,
        mode: ConnectMode,
    ) -> Result<ConnectionStatus> {
        if !role.is_client() || address.is_null() {
            return Err(MapmError::InvalidParameter);
        }
        check_port(remote_server_port)?;
        check_instance(instance_id)?;

        let (id, waiter) = {
            let mut state = self.inner.lock_initialized()?;
            if !state.powered {
                return Err(MapmError::LocalDevicePoweredDown);
            }
            let mut record = ConnectionRecord::new(role, address, instance_id);
            let waiter = match mode {
                ConnectMode::Callback(callback) => {
                    record = record.with_callback(callback);
                    None
                }
                ConnectMode::Blocking => Some(record.begin_opening()),
            };
            let id = state
                .entries
                .insert(record)
                .map_err(|e| {
                    debug!("connect rejected: {e}");
                    MapmError::UnableToAddEntry
                })?
                .id();
            (id, waiter)
        };

        let request = ConnectRemoteDevice {
            role,
            remote_device: address,
            remote_server_port,
            instance_id,
            connection_flags,
        };
        if let Err(e) = self.inner.call(function::CONNECT_REMOTE_DEVICE, &request).await {
            warn!("connect request to {address} failed: {e}");
            self.inner
                .lock()?
                .entries
                .remove_if_current(role, address, instance_id, id);
            return Err(MapmError::UnableToAddEntry);
        }

        let Some(waiter) = waiter else {
            return Ok(ConnectionStatus::Success);
        };
        // A dropped sender means the record was cleared by shutdown.
        let status = waiter.await.unwrap_or(ConnectionStatus::FailureUnknown);

        // The dispatcher may already have dropped this record, and another
        // caller may have claimed the key since; only our own record is ours
        // to finish or remove.
        let mut state = self.inner.lock()?;
        let connected = match state.entries.find_mut(role, address, instance_id) {
            Some(record) if record.id() == id => {
                record.opening = false;
                status.is_success()
            }
            _ => false,
        };
        if connected {
            return Ok(status);
        }
        state
            .entries
            .remove_if_current(role, address, instance_id, id);
        debug!("blocking connect to {address} ended with {status:?}");
        Err(MapmError::UnableToConnectToDevice {
            status: if status.is_success() {
                ConnectionStatus::FailureUnknown
            } else {
                status
            },
        })
    }
}
