//! Public API for the `mapm` library.
//!
//! `mapm` is the client side of a Bluetooth Message Access Profile manager.
//! A [`Manager`] tracks local MAP servers and connections, marshals requests
//! to the platform-manager server process over a [`transport::Transport`],
//! and dispatches the server's asynchronous messages to registered
//! callbacks as typed [`MapEvent`]s.

pub mod address;
pub mod config;
mod dispatch;
pub mod error;
pub mod event;
pub mod manager;
pub mod message;
pub mod panic;
pub mod power;
pub mod registry;
pub mod transport;
pub mod types;

pub use address::BdAddr;
pub use config::ManagerConfig;
pub use error::{MapmError, Result};
pub use event::{EventCallback, MapEvent};
pub use manager::{ConnectMode, Manager, ManagerBuilder};
pub use power::DeviceEvent;
pub use types::{
    CharSet,
    ConnectionFlags,
    ConnectionRole,
    ConnectionStatus,
    FractionalType,
    ListingOptions,
    MessageListingInfo,
    MessageTypes,
    ParsedServiceInfo,
    ServerFlags,
    ServiceDetails,
    SetFolderOption,
    StatusIndicator,
    TimeDate,
};
