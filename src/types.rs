//! Value types shared by the public API, the codec and the event model.

use std::{fmt, ops::BitOr};

use serde::{Deserialize, Serialize};

/// Length of a MAP message handle, excluding the NUL terminator.
pub const MESSAGE_HANDLE_LENGTH: usize = 16;

/// Smallest valid MAP instance identifier.
pub const INSTANCE_ID_MINIMUM: u32 = 0;
/// Largest valid MAP instance identifier.
pub const INSTANCE_ID_MAXIMUM: u32 = 255;
/// Smallest valid RFCOMM server port.
pub const PORT_NUMBER_MINIMUM: u32 = 1;
/// Largest valid RFCOMM server port.
pub const PORT_NUMBER_MAXIMUM: u32 = 30;

/// The role a tracked MAP connection plays locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionRole {
    /// Local notification server receiving event reports from a remote MSE.
    NotificationServer,
    /// Local notification client pushing event reports to a remote MCE.
    NotificationClient,
    /// Local message access server (MSE).
    AccessServer,
    /// Local message access client (MCE).
    AccessClient,
}

impl ConnectionRole {
    /// Report whether this is one of the two client roles.
    #[must_use]
    pub const fn is_client(self) -> bool {
        matches!(self, Self::NotificationClient | Self::AccessClient)
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::NotificationServer => 0,
            Self::NotificationClient => 1,
            Self::AccessServer => 2,
            Self::AccessClient => 3,
        }
    }

    /// Parse the wire representation.
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::NotificationServer),
            1 => Some(Self::NotificationClient),
            2 => Some(Self::AccessServer),
            3 => Some(Self::AccessClient),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotificationServer => "notification server",
            Self::NotificationClient => "notification client",
            Self::AccessServer => "access server",
            Self::AccessClient => "access client",
        })
    }
}

/// Outcome of a connection attempt as reported by the server process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// The connection is up.
    #[default]
    Success,
    /// The remote device did not answer in time.
    FailureTimeout,
    /// The remote device refused the connection.
    FailureRefused,
    /// Authentication or encryption failed.
    FailureSecurity,
    /// The local radio was powered down.
    FailureDevicePowerOff,
    /// Any other failure.
    FailureUnknown,
}

impl ConnectionStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Success => 0,
            Self::FailureTimeout => 1,
            Self::FailureRefused => 2,
            Self::FailureSecurity => 3,
            Self::FailureDevicePowerOff => 4,
            Self::FailureUnknown => 5,
        }
    }

    /// Parse the wire representation. Unrecognised values map to
    /// [`ConnectionStatus::FailureUnknown`].
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Success,
            1 => Self::FailureTimeout,
            2 => Self::FailureRefused,
            3 => Self::FailureSecurity,
            4 => Self::FailureDevicePowerOff,
            _ => Self::FailureUnknown,
        }
    }

    /// Report whether the status denotes success.
    #[must_use]
    pub const fn is_success(self) -> bool { matches!(self, Self::Success) }
}

macro_rules! bit_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$cmeta:meta])* $flag:ident = $value:expr;)* }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            $($(#[$cmeta])* pub const $flag: Self = Self($value);)*

            /// The empty set.
            pub const NONE: Self = Self(0);

            /// Build from raw bits.
            #[must_use]
            pub const fn from_bits(bits: u32) -> Self { Self(bits) }

            /// Return the raw bits.
            #[must_use]
            pub const fn bits(self) -> u32 { self.0 }

            /// Report whether every bit of `other` is set in `self`.
            #[must_use]
            pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
        }
    };
}

bit_set! {
    /// Security requirements for a registered server.
    ServerFlags {
        /// Require authorisation of incoming connections.
        REQUIRE_AUTHORIZATION = 0x0000_0001;
        /// Require authentication of incoming connections.
        REQUIRE_AUTHENTICATION = 0x0000_0002;
        /// Require encryption of incoming connections.
        REQUIRE_ENCRYPTION = 0x0000_0004;
    }
}

bit_set! {
    /// Security requirements for an outgoing connection.
    ConnectionFlags {
        /// Authenticate the remote device.
        REQUIRE_AUTHENTICATION = 0x0000_0001;
        /// Encrypt the link.
        REQUIRE_ENCRYPTION = 0x0000_0002;
    }
}

bit_set! {
    /// Message types a MAS instance serves.
    MessageTypes {
        /// E-mail.
        EMAIL = 0x0000_0001;
        /// GSM SMS.
        SMS_GSM = 0x0000_0002;
        /// CDMA SMS.
        SMS_CDMA = 0x0000_0004;
        /// MMS.
        MMS = 0x0000_0008;
    }
}

bit_set! {
    /// Presence mask for the optional members of [`MessageListingInfo`].
    ListingOptions {
        /// `subject_length` is set.
        SUBJECT_LENGTH = 0x0000_0001;
        /// `parameter_mask` is set.
        PARAMETER_MASK = 0x0000_0002;
        /// `filter_message_type` is set.
        FILTER_MESSAGE_TYPE = 0x0000_0004;
        /// `filter_period_begin` is set.
        FILTER_PERIOD_BEGIN = 0x0000_0008;
        /// `filter_period_end` is set.
        FILTER_PERIOD_END = 0x0000_0010;
        /// `filter_read_status` is set.
        FILTER_READ_STATUS = 0x0000_0020;
        /// `filter_recipient` is set.
        FILTER_RECIPIENT = 0x0000_0040;
        /// `filter_originator` is set.
        FILTER_ORIGINATOR = 0x0000_0080;
        /// `filter_priority` is set.
        FILTER_PRIORITY = 0x0000_0100;
    }
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal,)* }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
        }

        impl $name {
            /// Wire representation.
            #[must_use]
            pub const fn as_u32(self) -> u32 {
                match self {
                    $(Self::$variant => $value,)*
                }
            }

            /// Parse the wire representation.
            #[must_use]
            pub const fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

wire_enum! {
    /// Character set requested for a message body.
    CharSet {
        /// Native encoding of the message type.
        #[default]
        Native = 0,
        /// UTF-8.
        Utf8 = 1,
    }
}

wire_enum! {
    /// Fragmentation state of an e-mail body transfer.
    FractionalType {
        /// The message is not fragmented.
        #[default]
        Unfragmented = 0,
        /// Request the first fragment.
        First = 1,
        /// Request the next fragment.
        Next = 2,
        /// More fragments follow.
        More = 3,
        /// This is the last fragment.
        Last = 4,
    }
}

wire_enum! {
    /// Message status attribute to modify.
    StatusIndicator {
        /// Read/unread flag.
        #[default]
        ReadStatus = 0,
        /// Deleted flag.
        DeletedStatus = 1,
    }
}

wire_enum! {
    /// Navigation direction for a relative set-folder operation.
    SetFolderOption {
        /// Go to the root folder.
        #[default]
        Root = 0,
        /// Descend into a child folder.
        Down = 1,
        /// Go to the parent folder.
        Up = 2,
    }
}

/// A calendar timestamp as carried in listings and filters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// `utc_offset` is meaningful only when this is set.
    pub utc_time: bool,
    /// Offset from UTC in minutes.
    pub utc_offset: i16,
}

/// Filters and paging hints for a message-listing query.
///
/// Members are meaningful only when the matching bit of `options` is set. The
/// string filters additionally travel in the variable region of the message
/// and decode to `None` when either their bit or their bytes are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageListingInfo {
    pub options: ListingOptions,
    pub subject_length: u8,
    pub parameter_mask: u32,
    pub filter_message_type: u8,
    pub filter_period_begin: TimeDate,
    pub filter_period_end: TimeDate,
    pub filter_read_status: u8,
    pub filter_recipient: Option<String>,
    pub filter_originator: Option<String>,
    pub filter_priority: u8,
}

impl MessageListingInfo {
    /// Recipient filter, if present and enabled.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        self.filter_recipient
            .as_deref()
            .filter(|_| self.options.contains(ListingOptions::FILTER_RECIPIENT))
    }

    /// Originator filter, if present and enabled.
    #[must_use]
    pub fn originator(&self) -> Option<&str> {
        self.filter_originator
            .as_deref()
            .filter(|_| self.options.contains(ListingOptions::FILTER_ORIGINATOR))
    }
}

/// A MAS instance discovered in a remote device's SDP records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetails {
    pub server_port: u32,
    pub instance_id: u32,
    pub supported_message_types: MessageTypes,
    pub service_name: Option<String>,
}

/// Result of parsing a remote device's MAS records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedServiceInfo {
    pub services: Vec<ServiceDetails>,
}

impl ParsedServiceInfo {
    /// Number of services discovered.
    #[must_use]
    pub fn len(&self) -> usize { self.services.len() }

    /// Report whether no service was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.services.is_empty() }

    /// Release the parsed details, leaving an empty value.
    pub fn clear(&mut self) { self.services.clear(); }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ConnectionRole::NotificationServer, false)]
    #[case(ConnectionRole::NotificationClient, true)]
    #[case(ConnectionRole::AccessServer, false)]
    #[case(ConnectionRole::AccessClient, true)]
    fn role_wire_values_are_stable(#[case] role: ConnectionRole, #[case] client: bool) {
        assert_eq!(ConnectionRole::from_u32(role.as_u32()), Some(role));
        assert_eq!(role.is_client(), client);
    }

    #[test]
    fn unknown_status_codes_collapse_to_unknown() {
        assert_eq!(ConnectionStatus::from_u32(4), ConnectionStatus::FailureDevicePowerOff);
        assert_eq!(ConnectionStatus::from_u32(99), ConnectionStatus::FailureUnknown);
    }

    #[test]
    fn bit_sets_combine() {
        let types = MessageTypes::EMAIL | MessageTypes::MMS;
        assert!(types.contains(MessageTypes::MMS));
        assert!(!types.contains(MessageTypes::SMS_GSM));
        assert_eq!(types.bits(), 0x9);
    }

    #[test]
    fn filters_respect_option_mask() {
        let info = MessageListingInfo {
            filter_recipient: Some("alice".into()),
            filter_originator: Some("bob".into()),
            options: ListingOptions::FILTER_ORIGINATOR,
            ..MessageListingInfo::default()
        };
        assert_eq!(info.recipient(), None);
        assert_eq!(info.originator(), Some("bob"));
    }
}
