//! The MAP manager context object.
//!
//! A [`Manager`] owns the connection registry, the data-callback registry and
//! the dispatch task that turns inbound bus messages into [`MapEvent`]s. It
//! is cheap to clone; every clone shares the same state. Several managers may
//! coexist, each bound to its own [`Transport`].
//!
//! [`MapEvent`]: crate::event::MapEvent

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace, warn};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

use crate::{
    address::BdAddr,
    config::ManagerConfig,
    dispatch,
    error::{MapmError, Result},
    message::{Body, DecodeError, MAP_MESSAGE_GROUP, Message, function, response::StatusResponse},
    power::{self, DeviceEvent},
    registry::Registry,
    transport::Transport,
    types::{
        ConnectionRole,
        ConnectionStatus,
        INSTANCE_ID_MAXIMUM,
        INSTANCE_ID_MINIMUM,
        MESSAGE_HANDLE_LENGTH,
        PORT_NUMBER_MAXIMUM,
        PORT_NUMBER_MINIMUM,
    },
};

mod access;
mod builder;
mod connect;
mod connection;
mod server;

pub use builder::ManagerBuilder;
pub use connect::ConnectMode;

/// Handle to a MAP manager.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use mapm::{Manager, ManagerConfig, transport::Transport};
///
/// # fn demo(transport: Arc<dyn Transport>) -> mapm::Result<()> {
/// let manager = Manager::builder(transport)
///     .config(ManagerConfig::default())
///     .build();
/// manager.initialize()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Manager {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    transport: Arc<dyn Transport>,
    config: ManagerConfig,
    state: Mutex<State>,
}

/// Everything guarded by the manager lock.
#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) initialized: bool,
    pub(crate) powered: bool,
    pub(crate) entries: Registry,
    pub(crate) data_entries: Registry,
    dispatcher: Option<JoinHandle<()>>,
}

impl Inner {
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| MapmError::UnableToLockContext)
    }

    /// Lock the state, failing if the manager is not running.
    fn lock_initialized(&self) -> Result<MutexGuard<'_, State>> {
        let state = self.lock()?;
        if state.initialized {
            Ok(state)
        } else {
            Err(MapmError::NotInitialized)
        }
    }

    fn ensure_initialized(&self) -> Result<()> { self.lock_initialized().map(drop) }

    /// Bus address requests are sent to.
    pub(crate) fn server_address(&self) -> u32 {
        self.config
            .address_id()
            .unwrap_or_else(|| self.transport.server_address_id())
    }

    /// Send `body` as `function` and decode the response as `R`.
    async fn request<B: Body, R: Body>(&self, function: u32, body: &B) -> Result<R> {
        if u32::try_from(body.size()).is_err() {
            return Err(MapmError::UnableToAllocateMemory);
        }
        let message = Message::with_body(
            self.server_address(),
            self.transport.next_message_id(),
            function,
            body,
        );
        trace!(
            "sending {}: message_id={}, length={}",
            function::name(function).unwrap_or("request"),
            message.header().message_id,
            message.header().message_length
        );
        let response = self
            .transport
            .send_message_response(message, self.config.timeout())
            .await?;
        if response.function() != function {
            return Err(DecodeError::UnexpectedFunction {
                expected: function,
                actual: response.function(),
            }
            .into());
        }
        Ok(response.parse()?)
    }

    /// Send a request whose response is a bare status.
    async fn call<B: Body>(&self, function: u32, body: &B) -> Result<()> {
        let StatusResponse { status } = self.request(function, body).await?;
        check_status(status).map(drop)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = state.dispatcher.take() {
            task.abort();
        }
    }
}

/// Map a server status to a result, passing non-negative values through.
fn check_status(status: i32) -> Result<u32> {
    u32::try_from(status).map_err(|_| MapmError::Remote(status))
}

fn check_instance(instance_id: u32) -> Result<()> {
    if (INSTANCE_ID_MINIMUM..=INSTANCE_ID_MAXIMUM).contains(&instance_id) {
        Ok(())
    } else {
        Err(MapmError::InvalidParameter)
    }
}

fn check_port(port: u32) -> Result<()> {
    if (PORT_NUMBER_MINIMUM..=PORT_NUMBER_MAXIMUM).contains(&port) {
        Ok(())
    } else {
        Err(MapmError::InvalidParameter)
    }
}

/// Validate the address and instance naming a remote MAS instance.
fn check_target(address: BdAddr, instance_id: u32) -> Result<()> {
    if address.is_null() {
        return Err(MapmError::InvalidParameter);
    }
    check_instance(instance_id)
}

fn check_handle(handle: &str) -> Result<()> {
    if handle.is_empty() || handle.len() > MESSAGE_HANDLE_LENGTH {
        return Err(MapmError::InvalidParameter);
    }
    Ok(())
}

/// An empty data chunk is only meaningful as the final one.
fn check_chunk(data: &[u8], is_final: bool) -> Result<()> {
    if data.is_empty() && !is_final {
        return Err(MapmError::InvalidParameter);
    }
    Ok(())
}

impl Manager {
    /// Start configuring a manager bound to `transport`.
    #[must_use]
    pub fn builder(transport: Arc<dyn Transport>) -> ManagerBuilder { ManagerBuilder::new(transport) }

    pub(crate) fn from_parts(transport: Arc<dyn Transport>, config: ManagerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                state: Mutex::new(State::default()),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ManagerConfig { &self.inner.config }

    /// Register the MAP group handler and start the dispatch task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::AlreadyInitialized`] on a second call,
    /// [`MapmError::InvalidParameter`] for an inconsistent configuration, and
    /// [`MapmError::UnableToRegisterHandler`] if no runtime is available or
    /// the transport refuses the handler.
    pub fn initialize(&self) -> Result<()> {
        self.inner.config.validate()?;
        let mut state = self.inner.lock()?;
        if state.initialized {
            return Err(MapmError::AlreadyInitialized);
        }
        let runtime = Handle::try_current().map_err(|e| {
            warn!("cannot start MAP dispatch outside a tokio runtime: {e}");
            MapmError::UnableToRegisterHandler
        })?;

        let (sink, inbound) = mpsc::unbounded_channel();
        self.inner
            .transport
            .register_group_handler(MAP_MESSAGE_GROUP, sink)
            .map_err(|e| {
                warn!("failed to register MAP message group handler: {e}");
                MapmError::UnableToRegisterHandler
            })?;

        state.dispatcher = Some(runtime.spawn(dispatch::run(Arc::downgrade(&self.inner), inbound)));
        state.powered = self.inner.config.is_initially_powered();
        state.initialized = true;
        debug!("MAP manager initialised: powered={}", state.powered);
        Ok(())
    }

    /// Stop dispatching and forget every record.
    ///
    /// Blocking connects still waiting return
    /// [`MapmError::UnableToConnectToDevice`]. Calling this on a manager that
    /// is not running does nothing.
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.initialized {
            return;
        }
        self.inner.transport.unregister_group_handler(MAP_MESSAGE_GROUP);
        state.entries.clear_all();
        state.data_entries.clear_all();
        state.powered = false;
        state.initialized = false;
        if let Some(task) = state.dispatcher.take() {
            task.abort();
        }
        debug!("MAP manager shut down");
    }

    /// Report whether [`Manager::initialize`] has succeeded and
    /// [`Manager::shutdown`] has not been called since.
    #[must_use]
    pub fn is_initialized(&self) -> bool { self.inner.lock().is_ok_and(|state| state.initialized) }

    #[must_use]
    pub fn is_powered(&self) -> bool { self.inner.lock().is_ok_and(|state| state.powered) }

    /// Apply a local device power transition.
    ///
    /// Powering down wakes every blocking connect with
    /// [`ConnectionStatus::FailureDevicePowerOff`] and drops every other
    /// record. The data-callback registry is untouched.
    pub fn handle_device_event(&self, event: DeviceEvent) {
        let Ok(mut state) = self.inner.lock() else {
            warn!("dropping device event {event:?}: manager lock poisoned");
            return;
        };
        if !state.initialized {
            return;
        }
        debug!("device power event: {event:?}");
        if event.is_power_down() {
            power::power_down(&mut state.entries);
            state.powered = false;
        } else {
            state.powered = true;
        }
    }

    /// Last known status of a tracked connection or server, if one exists.
    #[must_use]
    pub fn connection_status(
        &self,
        role: ConnectionRole,
        address: BdAddr,
        instance_id: u32,
    ) -> Option<ConnectionStatus> {
        let state = self.inner.lock().ok()?;
        state
            .entries
            .find(role, address, instance_id)
            .map(|record| record.status)
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, true)]
    #[case(255, true)]
    #[case(256, false)]
    fn instance_range(#[case] instance_id: u32, #[case] ok: bool) {
        assert_eq!(check_instance(instance_id).is_ok(), ok);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(30, true)]
    #[case(31, false)]
    fn port_range(#[case] port: u32, #[case] ok: bool) {
        assert_eq!(check_port(port).is_ok(), ok);
    }

    #[test]
    fn negative_status_is_remote_failure() {
        assert_eq!(check_status(7).ok(), Some(7));
        assert!(matches!(check_status(-4), Err(MapmError::Remote(-4))));
    }

    #[test]
    fn null_target_is_rejected() {
        assert!(check_target(BdAddr::NULL, 1).is_err());
        assert!(check_target(BdAddr::new([1, 0, 0, 0, 0, 0]), 1).is_ok());
    }

    #[rstest]
    #[case("", false)]
    #[case("20000100001", true)]
    #[case("12345678901234567", false)]
    fn handle_length(#[case] handle: &str, #[case] ok: bool) {
        assert_eq!(check_handle(handle).is_ok(), ok);
    }
}
