//! Bodies for connection management: server registration, service records,
//! outgoing connections and the asynchronous connection events.

use bytes::{BufMut, BytesMut};

use super::{
    Body,
    DecodeError,
    Decoder,
    cursor::{PutFields, cstr_len},
    fixed::fixed_body,
};
use crate::{
    address::BdAddr,
    types::{ConnectionFlags, ConnectionRole, ConnectionStatus, MessageTypes, ServerFlags},
};

fixed_body! {
    /// Accept or reject a pending incoming connection.
    pub struct ConnectionRequestResponse {
        pub remote_device: BdAddr,
        pub instance_id: u32,
        pub accept: bool,
    }

    /// Open a local MAP server on an RFCOMM port.
    pub struct RegisterServer {
        pub server_port: u32,
        pub server_flags: ServerFlags,
        pub instance_id: u32,
        pub supported_message_types: MessageTypes,
    }

    /// A request naming a single MAS instance.
    pub struct InstanceRequest {
        pub instance_id: u32,
    }

    /// Ask the server to query a remote device's MAS records.
    pub struct ParseRemoteServices {
        pub remote_device: BdAddr,
    }

    /// Open an outgoing connection.
    pub struct ConnectRemoteDevice {
        pub role: ConnectionRole,
        pub remote_device: BdAddr,
        pub remote_server_port: u32,
        pub instance_id: u32,
        pub connection_flags: ConnectionFlags,
    }

    /// Identifies one connection: used by disconnect and abort requests and
    /// by the connected and disconnected events.
    pub struct ConnectionTarget {
        pub role: ConnectionRole,
        pub remote_device: BdAddr,
        pub instance_id: u32,
    }

    /// Outcome of an outgoing connection attempt.
    pub struct ConnectionStatusNotice {
        pub role: ConnectionRole,
        pub remote_device: BdAddr,
        pub instance_id: u32,
        pub status: ConnectionStatus,
    }

    /// Identifies a MAS instance on a remote device. Most access requests
    /// without further parameters use this body.
    pub struct Target {
        pub remote_device: BdAddr,
        pub instance_id: u32,
    }

    /// Bus notice that a process has come or gone.
    pub struct ClientRegistration {
        pub address_id: u32,
        pub registered: bool,
    }
}

/// Publish an SDP record for a registered server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterServiceRecord {
    pub instance_id: u32,
    pub service_name: Option<String>,
}

impl RegisterServiceRecord {
    #[must_use]
    pub const fn size_for(name_len: usize) -> usize { Self::MIN_SIZE.saturating_add(name_len) }
}

impl Body for RegisterServiceRecord {
    const MIN_SIZE: usize = 8;

    fn size(&self) -> usize { Self::size_for(cstr_len(self.service_name.as_deref())) }

    fn encode_body(&self, dst: &mut BytesMut) {
        let name = self.service_name.as_deref();
        dst.put_u32(self.instance_id);
        dst.put_len(cstr_len(name));
        dst.put_cstr(name);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let instance_id = src.u32()?;
        let name_len = src.length()?;
        src.require(Self::size_for(name_len))?;
        Ok(Self {
            instance_id,
            service_name: src.cstr(name_len, "service_name")?,
        })
    }
}
