//! Typed events delivered to registered callbacks.
//!
//! Each inbound function code maps to exactly one [`MapEvent`] variant whose
//! payload is the decoded message body.

use std::sync::Arc;

use crate::{
    address::BdAddr,
    message::{
        DecodeError,
        Message,
        access::{
            EnableNotifications,
            FolderListing,
            FolderListingQuery,
            FolderListingSize,
            FolderPath,
            GetMessage,
            MessageData,
            MessageListing,
            MessageListingQuery,
            MessageListingSize,
            MessageListingSizeQuery,
            MessageStatus,
            Notification,
            PushConfirmation,
            PushMessage,
            SetFolderRequest,
            StatusReply,
        },
        connection::{ConnectionStatusNotice, ConnectionTarget, Target},
        function,
    },
};

/// Callback receiving events for one registry entry.
///
/// Invoked on the dispatch task with the manager lock released, so it may
/// call back into the manager. It must not retain the borrowed event.
pub type EventCallback = Arc<dyn Fn(&MapEvent) + Send + Sync>;

/// The local record an event is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventTarget {
    /// The record whose role the message names.
    Connection,
    /// A local MSE, found by instance identifier.
    AccessServer,
    /// A local MCE, found by instance identifier and peer address.
    AccessClient,
}

macro_rules! events {
    ($(
        $(#[$meta:meta])*
        $variant:ident($body:ty) = $function:ident => $target:ident;
    )*) => {
        /// An asynchronous event received from the server process.
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum MapEvent {
            $($(#[$meta])* $variant($body),)*
        }

        impl MapEvent {
            /// Decode an inbound message into its event.
            ///
            /// Returns `None` if the function code does not name an event.
            pub fn decode(message: &Message) -> Option<Result<Self, DecodeError>> {
                match message.function() {
                    $(function::$function => Some(message.parse().map(Self::$variant)),)*
                    _ => None,
                }
            }

            /// Function code carrying this event on the bus.
            #[must_use]
            pub fn function(&self) -> u32 {
                match self {
                    $(Self::$variant(_) => function::$function,)*
                }
            }

            /// Frame this event as the server process would send it.
            #[must_use]
            pub fn to_message(&self, address_id: u32, message_id: u32) -> Message {
                match self {
                    $(Self::$variant(body) => {
                        Message::with_body(address_id, message_id, function::$function, body)
                    })*
                }
            }

            /// Remote device the event concerns.
            #[must_use]
            pub fn remote_device(&self) -> BdAddr {
                match self {
                    $(Self::$variant(body) => body.remote_device,)*
                }
            }

            /// Instance identifier the event concerns.
            #[must_use]
            pub fn instance_id(&self) -> u32 {
                match self {
                    $(Self::$variant(body) => body.instance_id,)*
                }
            }

            #[must_use]
            pub fn target(&self) -> EventTarget {
                match self {
                    $(Self::$variant(_) => EventTarget::$target,)*
                }
            }
        }
    };
}

events! {
    /// A remote MCE asks to connect to a local MSE.
    ConnectionRequest(Target) = CONNECTION_REQUEST => AccessServer;
    DeviceConnected(ConnectionTarget) = DEVICE_CONNECTED => Connection;
    DeviceDisconnected(ConnectionTarget) = DEVICE_DISCONNECTED => Connection;
    /// Final outcome of an outgoing connection.
    ConnectionStatus(ConnectionStatusNotice) = CONNECTION_STATUS => Connection;

    EnableNotificationsResponse(StatusReply) = ENABLE_NOTIFICATIONS_RESPONSE => AccessClient;
    GetFolderListingResponse(FolderListing) = GET_FOLDER_LISTING_RESPONSE => AccessClient;
    GetFolderListingSizeResponse(FolderListingSize) = GET_FOLDER_LISTING_SIZE_RESPONSE => AccessClient;
    GetMessageListingResponse(MessageListing) = GET_MESSAGE_LISTING_RESPONSE => AccessClient;
    GetMessageListingSizeResponse(MessageListingSize) = GET_MESSAGE_LISTING_SIZE_RESPONSE => AccessClient;
    GetMessageResponse(MessageData) = GET_MESSAGE_RESPONSE => AccessClient;
    SetMessageStatusResponse(StatusReply) = SET_MESSAGE_STATUS_RESPONSE => AccessClient;
    PushMessageResponse(PushConfirmation) = PUSH_MESSAGE_RESPONSE => AccessClient;
    UpdateInboxResponse(StatusReply) = UPDATE_INBOX_RESPONSE => AccessClient;
    SetFolderResponse(FolderPath) = SET_FOLDER_RESPONSE => AccessClient;
    /// An event report pushed by a remote MSE.
    NotificationIndication(Notification) = NOTIFICATION_INDICATION => AccessClient;

    EnableNotificationsRequest(EnableNotifications) = ENABLE_NOTIFICATIONS_REQUEST => AccessServer;
    GetFolderListingRequest(FolderListingQuery) = GET_FOLDER_LISTING_REQUEST => AccessServer;
    GetFolderListingSizeRequest(Target) = GET_FOLDER_LISTING_SIZE_REQUEST => AccessServer;
    GetMessageListingRequest(MessageListingQuery) = GET_MESSAGE_LISTING_REQUEST => AccessServer;
    GetMessageListingSizeRequest(MessageListingSizeQuery) = GET_MESSAGE_LISTING_SIZE_REQUEST => AccessServer;
    GetMessageRequest(GetMessage) = GET_MESSAGE_REQUEST => AccessServer;
    SetMessageStatusRequest(MessageStatus) = SET_MESSAGE_STATUS_REQUEST => AccessServer;
    PushMessageRequest(PushMessage) = PUSH_MESSAGE_REQUEST => AccessServer;
    UpdateInboxRequest(Target) = UPDATE_INBOX_REQUEST => AccessServer;
    SetFolderRequest(SetFolderRequest) = SET_FOLDER_REQUEST => AccessServer;
    /// The remote MCE acknowledged a notification sent by a local MSE.
    NotificationConfirmation(StatusReply) = NOTIFICATION_CONFIRMATION => AccessServer;
}

impl MapEvent {
    /// Report whether the event carries a bulk data payload and is therefore
    /// also delivered to data-event callbacks.
    #[must_use]
    pub fn carries_data(&self) -> bool {
        matches!(
            self,
            Self::GetFolderListingResponse(_)
                | Self::GetMessageListingResponse(_)
                | Self::GetMessageResponse(_)
                | Self::NotificationIndication(_)
                | Self::PushMessageRequest(_)
        )
    }
}
