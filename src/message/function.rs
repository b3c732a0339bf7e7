//! Message function codes used within the MAP message group.
//!
//! Codes below [`FUNCTION_MINIMUM`] are reserved for bus housekeeping such as
//! [`CLIENT_REGISTRATION`].

macro_rules! functions {
    ($($(#[$meta:meta])* $name:ident = $value:literal;)*) => {
        $($(#[$meta])* pub const $name: u32 = $value;)*

        /// Every known function code with its name, in declaration order.
        pub const ALL: &[(u32, &str)] = &[$(($value, stringify!($name)),)*];

        /// Human-readable name of a function code, if known.
        ///
        /// ```
        /// use mapm::message::function;
        ///
        /// assert_eq!(function::name(function::DISCONNECT), Some("DISCONNECT"));
        /// assert_eq!(function::name(0xdead), None);
        /// ```
        #[must_use]
        pub fn name(code: u32) -> Option<&'static str> {
            match code {
                $($value => Some(stringify!($name)),)*
                _ => None,
            }
        }
    };
}

/// Lowest code used by manager-specific messages.
pub const FUNCTION_MINIMUM: u32 = 0x0000_1000;

functions! {
    /// Bus notice that a process registered or unregistered.
    CLIENT_REGISTRATION = 0x0000_0001;

    CONNECTION_REQUEST_RESPONSE = 0x0000_1001;
    REGISTER_SERVER = 0x0000_1002;
    UN_REGISTER_SERVER = 0x0000_1003;
    REGISTER_SERVICE_RECORD = 0x0000_1004;
    UN_REGISTER_SERVICE_RECORD = 0x0000_1005;
    PARSE_REMOTE_MESSAGE_ACCESS_SERVICES = 0x0000_1006;
    CONNECT_REMOTE_DEVICE = 0x0000_1007;
    DISCONNECT = 0x0000_1008;
    ABORT = 0x0000_1009;

    QUERY_CURRENT_FOLDER = 0x0000_1101;
    ENABLE_NOTIFICATIONS = 0x0000_1102;
    GET_FOLDER_LISTING = 0x0000_1103;
    GET_FOLDER_LISTING_SIZE = 0x0000_1104;
    GET_MESSAGE_LISTING = 0x0000_1105;
    GET_MESSAGE_LISTING_SIZE = 0x0000_1106;
    GET_MESSAGE = 0x0000_1107;
    SET_MESSAGE_STATUS = 0x0000_1108;
    PUSH_MESSAGE = 0x0000_1109;
    UPDATE_INBOX = 0x0000_110A;
    SET_FOLDER = 0x0000_110B;
    SET_FOLDER_ABSOLUTE = 0x0000_110C;

    ENABLE_NOTIFICATIONS_CONFIRMATION = 0x0000_1201;
    SEND_FOLDER_LISTING = 0x0000_1202;
    SEND_FOLDER_LISTING_SIZE = 0x0000_1203;
    SEND_MESSAGE_LISTING = 0x0000_1204;
    SEND_MESSAGE_LISTING_SIZE = 0x0000_1205;
    SEND_MESSAGE = 0x0000_1206;
    SET_MESSAGE_STATUS_CONFIRMATION = 0x0000_1207;
    PUSH_MESSAGE_CONFIRMATION = 0x0000_1208;
    UPDATE_INBOX_CONFIRMATION = 0x0000_1209;
    SET_FOLDER_CONFIRMATION = 0x0000_120A;
    SEND_NOTIFICATION = 0x0000_1301;

    CONNECTION_REQUEST = 0x0001_0001;
    DEVICE_CONNECTED = 0x0001_0002;
    DEVICE_DISCONNECTED = 0x0001_0003;
    CONNECTION_STATUS = 0x0001_0004;

    ENABLE_NOTIFICATIONS_RESPONSE = 0x0001_1001;
    GET_FOLDER_LISTING_RESPONSE = 0x0001_1002;
    GET_FOLDER_LISTING_SIZE_RESPONSE = 0x0001_1003;
    GET_MESSAGE_LISTING_RESPONSE = 0x0001_1004;
    GET_MESSAGE_LISTING_SIZE_RESPONSE = 0x0001_1005;
    GET_MESSAGE_RESPONSE = 0x0001_1006;
    SET_MESSAGE_STATUS_RESPONSE = 0x0001_1007;
    PUSH_MESSAGE_RESPONSE = 0x0001_1008;
    UPDATE_INBOX_RESPONSE = 0x0001_1009;
    SET_FOLDER_RESPONSE = 0x0001_100A;

    NOTIFICATION_INDICATION = 0x0001_2001;

    ENABLE_NOTIFICATIONS_REQUEST = 0x0001_3001;
    GET_FOLDER_LISTING_REQUEST = 0x0001_3002;
    GET_FOLDER_LISTING_SIZE_REQUEST = 0x0001_3003;
    GET_MESSAGE_LISTING_REQUEST = 0x0001_3004;
    GET_MESSAGE_LISTING_SIZE_REQUEST = 0x0001_3005;
    GET_MESSAGE_REQUEST = 0x0001_3006;
    SET_MESSAGE_STATUS_REQUEST = 0x0001_3007;
    PUSH_MESSAGE_REQUEST = 0x0001_3008;
    UPDATE_INBOX_REQUEST = 0x0001_3009;
    SET_FOLDER_REQUEST = 0x0001_300A;

    NOTIFICATION_CONFIRMATION = 0x0001_4001;
}
