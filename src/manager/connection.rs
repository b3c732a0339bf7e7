//! Server registration, service records, disconnects and the data-callback
//! registry.

use log::{debug, warn};

use super::{Manager, check_instance, check_port, check_status, check_target};
use crate::{
    address::BdAddr,
    error::{MapmError, Result},
    event::EventCallback,
    message::{
        connection::{
            ConnectionRequestResponse,
            ConnectionTarget,
            InstanceRequest,
            ParseRemoteServices,
            RegisterServer,
            RegisterServiceRecord,
        },
        function,
        response::{ParseServicesResponse, ServiceRecordResponse},
    },
    registry::{ConnectionRecord, RegistryError},
    types::{ConnectionRole, MessageTypes, ParsedServiceInfo, ServerFlags},
};

impl Manager {
    /// Accept or reject an incoming connection announced by a
    /// [`MapEvent::ConnectionRequest`](crate::MapEvent::ConnectionRequest).
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a null address or an
    /// out-of-range instance, or the failure reported by the server.
    pub async fn connection_request_response(
        &self,
        address: BdAddr,
        instance_id: u32,
        accept: bool,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::CONNECTION_REQUEST_RESPONSE, &ConnectionRequestResponse {
                remote_device: address,
                instance_id,
                accept,
            })
            .await
    }

    /// Open a local MSE on `server_port`.
    ///
    /// `callback` receives every event addressed to the instance.
    ///
    /// # Errors
    ///
    /// - [`MapmError::InvalidParameter`] for an out-of-range port or instance.
    /// - [`MapmError::LocalDevicePoweredDown`] while the radio is off.
    /// - [`MapmError::UnableToAddEntry`] if the instance is already registered.
    /// - The failure reported by the server, after which nothing is registered.
    pub async fn register_server(
        &self,
        server_port: u32,
        server_flags: ServerFlags,
        instance_id: u32,
        supported_message_types: MessageTypes,
        callback: EventCallback,
    ) -> Result<()> {
        check_port(server_port)?;
        check_instance(instance_id)?;
        {
            let mut state = self.inner.lock_initialized()?;
            if !state.powered {
                return Err(MapmError::LocalDevicePoweredDown);
            }
            let record = ConnectionRecord::new(ConnectionRole::AccessServer, BdAddr::NULL, instance_id)
                .with_callback(callback);
            state.entries.insert(record).map_err(|e| {
                debug!("server registration rejected: {e}");
                MapmError::UnableToAddEntry
            })?;
        }

        let request = RegisterServer {
            server_port,
            server_flags,
            instance_id,
            supported_message_types,
        };
        let result = self.inner.call(function::REGISTER_SERVER, &request).await;
        if let Err(e) = &result {
            warn!("registering MAP server instance {instance_id} failed: {e}");
            self.inner
                .lock()?
                .entries
                .remove(ConnectionRole::AccessServer, BdAddr::NULL, instance_id);
        }
        result
    }

    /// Close a local MSE.
    ///
    /// The registration is dropped locally even if the server cannot be
    /// reached.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidInstanceId`] if no server is registered
    /// with `instance_id`.
    pub async fn un_register_server(&self, instance_id: u32) -> Result<()> {
        self.inner
            .lock_initialized()?
            .entries
            .remove(ConnectionRole::AccessServer, BdAddr::NULL, instance_id)
            .ok_or(MapmError::InvalidInstanceId)?;
        if let Err(e) = self
            .inner
            .call(function::UN_REGISTER_SERVER, &InstanceRequest { instance_id })
            .await
        {
            warn!("server did not acknowledge unregistering instance {instance_id}: {e}");
        }
        Ok(())
    }

    fn require_server(&self, instance_id: u32) -> Result<()> {
        let state = self.inner.lock_initialized()?;
        state
            .entries
            .find(ConnectionRole::AccessServer, BdAddr::NULL, instance_id)
            .map(drop)
            .ok_or(MapmError::InvalidInstanceId)
    }

    /// Publish an SDP record for a registered MSE and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidInstanceId`] if no server is registered
    /// with `instance_id`, or the failure reported by the server.
    pub async fn register_service_record(
        &self,
        instance_id: u32,
        service_name: Option<&str>,
    ) -> Result<u32> {
        self.require_server(instance_id)?;
        let response: ServiceRecordResponse = self
            .inner
            .request(function::REGISTER_SERVICE_RECORD, &RegisterServiceRecord {
                instance_id,
                service_name: service_name.map(str::to_owned),
            })
            .await?;
        check_status(response.status)?;
        Ok(response.service_record_handle)
    }

    /// Remove the SDP record of a registered MSE.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidInstanceId`] if no server is registered
    /// with `instance_id`, or the failure reported by the server.
    pub async fn un_register_service_record(&self, instance_id: u32) -> Result<()> {
        self.require_server(instance_id)?;
        self.inner
            .call(function::UN_REGISTER_SERVICE_RECORD, &InstanceRequest { instance_id })
            .await
    }

    /// Read the MAS instances a remote device advertises in its cached SDP
    /// records.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a null address,
    /// [`MapmError::ResponseMessageInvalid`] for a malformed response, or the
    /// failure reported by the server.
    pub async fn parse_remote_message_access_services(
        &self,
        address: BdAddr,
    ) -> Result<ParsedServiceInfo> {
        if address.is_null() {
            return Err(MapmError::InvalidParameter);
        }
        self.inner.ensure_initialized()?;
        let response: ParseServicesResponse = self
            .inner
            .request(function::PARSE_REMOTE_MESSAGE_ACCESS_SERVICES, &ParseRemoteServices {
                remote_device: address,
            })
            .await?;
        check_status(response.status)?;
        Ok(ParsedServiceInfo {
            services: response.services,
        })
    }

    /// Close a tracked connection.
    ///
    /// Client records are forgotten once the server accepts the request;
    /// server registrations stay in place.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidConnectionState`] if no such connection is
    /// tracked, or the failure reported by the server.
    pub async fn disconnect(
        &self,
        role: ConnectionRole,
        address: BdAddr,
        instance_id: u32,
    ) -> Result<()> {
        let id = {
            let state = self.inner.lock_initialized()?;
            state
                .entries
                .find(role, address, instance_id)
                .map(ConnectionRecord::id)
                .ok_or(MapmError::InvalidConnectionState)?
        };
        self.inner
            .call(function::DISCONNECT, &ConnectionTarget {
                role,
                remote_device: address,
                instance_id,
            })
            .await?;
        if role.is_client() {
            self.inner
                .lock()?
                .entries
                .remove_if_current(role, address, instance_id, id);
        }
        Ok(())
    }

    /// Abort the request outstanding on a connection.
    ///
    /// # Errors
    ///
    /// Returns the failure reported by the server.
    pub async fn abort(&self, role: ConnectionRole, address: BdAddr, instance_id: u32) -> Result<()> {
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::ABORT, &ConnectionTarget {
                role,
                remote_device: address,
                instance_id,
            })
            .await
    }

    /// Receive data-carrying events for a connection on a second callback,
    /// in addition to its primary callback.
    ///
    /// # Errors
    ///
    /// - [`MapmError::InvalidParameter`] for an out-of-range instance or a
    ///   client role without an address.
    /// - [`MapmError::UnableToAddEntry`] if a data callback is already
    ///   registered for the connection.
    pub fn register_data_event_callback(
        &self,
        role: ConnectionRole,
        address: BdAddr,
        instance_id: u32,
        callback: EventCallback,
    ) -> Result<()> {
        check_instance(instance_id)?;
        let mut state = self.inner.lock_initialized()?;
        let record = ConnectionRecord::new(role, address, instance_id).with_callback(callback);
        match state.data_entries.insert(record) {
            Ok(_) => Ok(()),
            Err(RegistryError::MissingAddress { .. }) => Err(MapmError::InvalidParameter),
            Err(RegistryError::Duplicate { .. }) => Err(MapmError::UnableToAddEntry),
        }
    }

    /// Remove a data callback added by
    /// [`Manager::register_data_event_callback`].
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidConnectionState`] if none is registered.
    pub fn un_register_data_event_callback(
        &self,
        role: ConnectionRole,
        address: BdAddr,
        instance_id: u32,
    ) -> Result<()> {
        self.inner
            .lock_initialized()?
            .data_entries
            .remove(role, address, instance_id)
            .map(drop)
            .ok_or(MapmError::InvalidConnectionState)
    }
}
