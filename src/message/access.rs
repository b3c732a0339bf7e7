//! Bodies for the message-access exchange between a client (MCE) and a
//! server (MSE).
//!
//! Requests issued by a local MCE arrive unchanged at the remote MSE's
//! manager, and the MSE's confirmations arrive unchanged as the MCE's
//! responses, so one type serves both ends of each exchange.

use bytes::{BufMut, Bytes, BytesMut};

use super::{
    Body,
    DecodeError,
    Decoder,
    Field,
    cursor::{HANDLE_SIZE, PutFields, TIME_DATE_SIZE, cstr_len},
    fixed::fixed_body,
};
use crate::{
    address::{BD_ADDR_LEN, BdAddr},
    types::{
        CharSet,
        FractionalType,
        ListingOptions,
        MessageListingInfo,
        SetFolderOption,
        StatusIndicator,
        TimeDate,
    },
};

/// Encoded size of the fixed part of a [`MessageListingInfo`], including
/// its presence flag.
const LISTING_INFO_SIZE: usize = 33;
/// Address plus instance identifier.
const TARGET_SIZE: usize = BD_ADDR_LEN + 4;

fixed_body! {
    /// Turn notification delivery on or off.
    pub struct EnableNotifications {
        pub remote_device: BdAddr,
        pub instance_id: u32,
        pub enabled: bool,
    }

    /// Page through the current folder's sub-folders.
    pub struct FolderListingQuery {
        pub remote_device: BdAddr,
        pub instance_id: u32,
        pub max_list_count: u16,
        pub list_start_offset: u16,
    }

    /// A bare OBEX response code.
    pub struct StatusReply {
        pub remote_device: BdAddr,
        pub instance_id: u32,
        pub response_code: u32,
    }

    /// Number of sub-folders in the current folder.
    pub struct FolderListingSize {
        pub remote_device: BdAddr,
        pub instance_id: u32,
        pub response_code: u32,
        pub folder_count: u16,
    }

    /// Number of messages matching a listing query.
    pub struct MessageListingSize {
        pub remote_device: BdAddr,
        pub instance_id: u32,
        pub response_code: u32,
        pub message_count: u16,
        pub new_message: bool,
        pub current_time: TimeDate,
    }
}

/// Retrieve one message by handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetMessage {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub attachment: bool,
    pub char_set: CharSet,
    pub fractional_type: FractionalType,
    pub message_handle: String,
}

impl Body for GetMessage {
    const MIN_SIZE: usize = TARGET_SIZE + 1 + 4 + 4 + HANDLE_SIZE;

    fn size(&self) -> usize { Self::MIN_SIZE }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_bool(self.attachment);
        self.char_set.put(dst);
        self.fractional_type.put(dst);
        dst.put_handle(&self.message_handle);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            remote_device: src.addr()?,
            instance_id: src.u32()?,
            attachment: src.bool()?,
            char_set: Field::get(src)?,
            fractional_type: Field::get(src)?,
            message_handle: src.handle()?,
        })
    }
}

/// Change the read or deleted flag of one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageStatus {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub message_handle: String,
    pub indicator: StatusIndicator,
    pub status_value: bool,
}

impl Body for MessageStatus {
    const MIN_SIZE: usize = TARGET_SIZE + HANDLE_SIZE + 4 + 1;

    fn size(&self) -> usize { Self::MIN_SIZE }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_handle(&self.message_handle);
        self.indicator.put(dst);
        dst.put_bool(self.status_value);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            remote_device: src.addr()?,
            instance_id: src.u32()?,
            message_handle: src.handle()?,
            indicator: Field::get(src)?,
            status_value: src.bool()?,
        })
    }
}

/// Outcome of a push, carrying the handle the MSE assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushConfirmation {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub response_code: u32,
    pub message_handle: String,
}

impl Body for PushConfirmation {
    const MIN_SIZE: usize = TARGET_SIZE + 4 + HANDLE_SIZE;

    fn size(&self) -> usize { Self::MIN_SIZE }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_u32(self.response_code);
        dst.put_handle(&self.message_handle);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            remote_device: src.addr()?,
            instance_id: src.u32()?,
            response_code: src.u32()?,
            message_handle: src.handle()?,
        })
    }
}

/// A chunk of folder-listing XML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderListing {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub response_code: u32,
    pub is_final: bool,
    pub data: Bytes,
}

impl FolderListing {
    #[must_use]
    pub const fn size_for(data_len: usize) -> usize { Self::MIN_SIZE.saturating_add(data_len) }
}

impl Body for FolderListing {
    const MIN_SIZE: usize = TARGET_SIZE + 4 + 1 + 4;

    fn size(&self) -> usize { Self::size_for(self.data.len()) }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_u32(self.response_code);
        dst.put_bool(self.is_final);
        dst.put_len(self.data.len());
        dst.put_slice(&self.data);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let response_code = src.u32()?;
        let is_final = src.bool()?;
        let data_len = src.length()?;
        src.require(Self::size_for(data_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            response_code,
            is_final,
            data: src.bytes(data_len)?,
        })
    }
}

/// A chunk of message-listing XML and the MSE's state at listing time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageListing {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub response_code: u32,
    pub message_count: u16,
    pub new_message: bool,
    pub current_time: TimeDate,
    pub is_final: bool,
    pub data: Bytes,
}

impl MessageListing {
    #[must_use]
    pub const fn size_for(data_len: usize) -> usize { Self::MIN_SIZE.saturating_add(data_len) }
}

impl Body for MessageListing {
    const MIN_SIZE: usize = TARGET_SIZE + 4 + 2 + 1 + TIME_DATE_SIZE + 1 + 4;

    fn size(&self) -> usize { Self::size_for(self.data.len()) }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_u32(self.response_code);
        dst.put_u16(self.message_count);
        dst.put_bool(self.new_message);
        dst.put_time(&self.current_time);
        dst.put_bool(self.is_final);
        dst.put_len(self.data.len());
        dst.put_slice(&self.data);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let response_code = src.u32()?;
        let message_count = src.u16()?;
        let new_message = src.bool()?;
        let current_time = src.time()?;
        let is_final = src.bool()?;
        let data_len = src.length()?;
        src.require(Self::size_for(data_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            response_code,
            message_count,
            new_message,
            current_time,
            is_final,
            data: src.bytes(data_len)?,
        })
    }
}

/// A chunk of a retrieved message in bMessage form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageData {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub response_code: u32,
    pub fractional_type: FractionalType,
    pub is_final: bool,
    pub data: Bytes,
}

impl MessageData {
    #[must_use]
    pub const fn size_for(data_len: usize) -> usize { Self::MIN_SIZE.saturating_add(data_len) }
}

impl Body for MessageData {
    const MIN_SIZE: usize = TARGET_SIZE + 4 + 4 + 1 + 4;

    fn size(&self) -> usize { Self::size_for(self.data.len()) }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_u32(self.response_code);
        self.fractional_type.put(dst);
        dst.put_bool(self.is_final);
        dst.put_len(self.data.len());
        dst.put_slice(&self.data);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let response_code = src.u32()?;
        let fractional_type = Field::get(src)?;
        let is_final = src.bool()?;
        let data_len = src.length()?;
        src.require(Self::size_for(data_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            response_code,
            fractional_type,
            is_final,
            data: src.bytes(data_len)?,
        })
    }
}

/// A chunk of event-report XML sent over the notification channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub is_final: bool,
    pub data: Bytes,
}

impl Notification {
    #[must_use]
    pub const fn size_for(data_len: usize) -> usize { Self::MIN_SIZE.saturating_add(data_len) }
}

impl Body for Notification {
    const MIN_SIZE: usize = TARGET_SIZE + 1 + 4;

    fn size(&self) -> usize { Self::size_for(self.data.len()) }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_bool(self.is_final);
        dst.put_len(self.data.len());
        dst.put_slice(&self.data);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let is_final = src.bool()?;
        let data_len = src.length()?;
        src.require(Self::size_for(data_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            is_final,
            data: src.bytes(data_len)?,
        })
    }
}

/// Upload a message into a folder on the MSE.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushMessage {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub folder_name: Option<String>,
    pub transparent: bool,
    pub retry: bool,
    pub char_set: CharSet,
    pub is_final: bool,
    pub data: Bytes,
}

impl PushMessage {
    /// A single, final chunk of `data` for `folder_name` in the native
    /// character set.
    #[must_use]
    pub fn new(remote_device: BdAddr, instance_id: u32, folder_name: Option<&str>, data: Bytes) -> Self {
        Self {
            remote_device,
            instance_id,
            folder_name: folder_name.map(str::to_owned),
            transparent: false,
            retry: false,
            char_set: CharSet::default(),
            is_final: true,
            data,
        }
    }

    #[must_use]
    pub const fn size_for(folder_len: usize, data_len: usize) -> usize {
        Self::MIN_SIZE.saturating_add(folder_len).saturating_add(data_len)
    }
}

impl Body for PushMessage {
    const MIN_SIZE: usize = TARGET_SIZE + 1 + 1 + 4 + 1 + 4 + 4;

    fn size(&self) -> usize {
        Self::size_for(cstr_len(self.folder_name.as_deref()), self.data.len())
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        let folder = self.folder_name.as_deref();
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_bool(self.transparent);
        dst.put_bool(self.retry);
        self.char_set.put(dst);
        dst.put_bool(self.is_final);
        dst.put_len(cstr_len(folder));
        dst.put_len(self.data.len());
        dst.put_cstr(folder);
        dst.put_slice(&self.data);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let transparent = src.bool()?;
        let retry = src.bool()?;
        let char_set = Field::get(src)?;
        let is_final = src.bool()?;
        let folder_len = src.length()?;
        let data_len = src.length()?;
        src.require(Self::size_for(folder_len, data_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            folder_name: src.cstr(folder_len, "folder_name")?,
            transparent,
            retry,
            char_set,
            is_final,
            data: src.bytes(data_len)?,
        })
    }
}

/// Navigate relative to the current folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetFolder {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub path_option: SetFolderOption,
    pub folder_name: Option<String>,
}

impl SetFolder {
    #[must_use]
    pub const fn size_for(name_len: usize) -> usize { Self::MIN_SIZE.saturating_add(name_len) }
}

impl Body for SetFolder {
    const MIN_SIZE: usize = TARGET_SIZE + 4 + 4;

    fn size(&self) -> usize { Self::size_for(cstr_len(self.folder_name.as_deref())) }

    fn encode_body(&self, dst: &mut BytesMut) {
        let name = self.folder_name.as_deref();
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        self.path_option.put(dst);
        dst.put_len(cstr_len(name));
        dst.put_cstr(name);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let path_option = Field::get(src)?;
        let name_len = src.length()?;
        src.require(Self::size_for(name_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            path_option,
            folder_name: src.cstr(name_len, "folder_name")?,
        })
    }
}

/// A relative navigation as seen by the MSE, with the path it would
/// produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetFolderRequest {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub path_option: SetFolderOption,
    pub folder_name: Option<String>,
    pub new_path: Option<String>,
}

impl SetFolderRequest {
    #[must_use]
    pub const fn size_for(name_len: usize, path_len: usize) -> usize {
        Self::MIN_SIZE.saturating_add(name_len).saturating_add(path_len)
    }
}

impl Body for SetFolderRequest {
    const MIN_SIZE: usize = TARGET_SIZE + 4 + 4 + 4;

    fn size(&self) -> usize {
        Self::size_for(
            cstr_len(self.folder_name.as_deref()),
            cstr_len(self.new_path.as_deref()),
        )
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        let name = self.folder_name.as_deref();
        let path = self.new_path.as_deref();
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        self.path_option.put(dst);
        dst.put_len(cstr_len(name));
        dst.put_len(cstr_len(path));
        dst.put_cstr(name);
        dst.put_cstr(path);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let path_option = Field::get(src)?;
        let name_len = src.length()?;
        let path_len = src.length()?;
        src.require(Self::size_for(name_len, path_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            path_option,
            folder_name: src.cstr(name_len, "folder_name")?,
            new_path: src.cstr(path_len, "new_path")?,
        })
    }
}

/// Outcome of a navigation, with the folder the MCE now stands in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderPath {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub response_code: u32,
    pub current_path: Option<String>,
}

impl FolderPath {
    #[must_use]
    pub const fn size_for(path_len: usize) -> usize { Self::MIN_SIZE.saturating_add(path_len) }
}

impl Body for FolderPath {
    const MIN_SIZE: usize = TARGET_SIZE + 4 + 4;

    fn size(&self) -> usize { Self::size_for(cstr_len(self.current_path.as_deref())) }

    fn encode_body(&self, dst: &mut BytesMut) {
        let path = self.current_path.as_deref();
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_u32(self.response_code);
        dst.put_len(cstr_len(path));
        dst.put_cstr(path);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let response_code = src.u32()?;
        let path_len = src.length()?;
        src.require(Self::size_for(path_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            response_code,
            current_path: src.cstr(path_len, "current_path")?,
        })
    }
}

/// Navigate to an absolute path from the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetFolderAbsolute {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub folder_name: Option<String>,
}

impl SetFolderAbsolute {
    #[must_use]
    pub const fn size_for(name_len: usize) -> usize { Self::MIN_SIZE.saturating_add(name_len) }
}

impl Body for SetFolderAbsolute {
    const MIN_SIZE: usize = TARGET_SIZE + 4;

    fn size(&self) -> usize { Self::size_for(cstr_len(self.folder_name.as_deref())) }

    fn encode_body(&self, dst: &mut BytesMut) {
        let name = self.folder_name.as_deref();
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_len(cstr_len(name));
        dst.put_cstr(name);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let remote_device = src.addr()?;
        let instance_id = src.u32()?;
        let name_len = src.length()?;
        src.require(Self::size_for(name_len))?;
        Ok(Self {
            remote_device,
            instance_id,
            folder_name: src.cstr(name_len, "folder_name")?,
        })
    }
}

/// Folder name and filters shared by both message-listing queries.
///
/// Layout: presence flag, fixed listing info, three length fields (folder,
/// recipient, originator), then the three strings back to back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingScope {
    pub folder_name: Option<String>,
    pub listing_info: Option<MessageListingInfo>,
}

impl ListingScope {
    const FIXED_SIZE: usize = LISTING_INFO_SIZE + 12;

    fn filters(&self) -> (Option<&str>, Option<&str>) {
        self.listing_info
            .as_ref()
            .map_or((None, None), |info| (info.recipient(), info.originator()))
    }

    fn variable_len(&self) -> usize {
        let (recipient, originator) = self.filters();
        cstr_len(self.folder_name.as_deref()) + cstr_len(recipient) + cstr_len(originator)
    }

    fn encode(&self, dst: &mut BytesMut) {
        let fallback = MessageListingInfo::default();
        let info = self.listing_info.as_ref().unwrap_or(&fallback);
        let folder = self.folder_name.as_deref();
        let (recipient, originator) = self.filters();

        dst.put_bool(self.listing_info.is_some());
        info.options.put(dst);
        dst.put_u8(info.subject_length);
        dst.put_u32(info.parameter_mask);
        dst.put_u8(info.filter_message_type);
        dst.put_time(&info.filter_period_begin);
        dst.put_time(&info.filter_period_end);
        dst.put_u8(info.filter_read_status);
        dst.put_u8(info.filter_priority);
        dst.put_len(cstr_len(folder));
        dst.put_len(cstr_len(recipient));
        dst.put_len(cstr_len(originator));
        dst.put_cstr(folder);
        dst.put_cstr(recipient);
        dst.put_cstr(originator);
    }

    /// Decode the scope; `preceding` is the number of body bytes before it.
    fn decode(src: &mut Decoder<'_>, preceding: usize) -> Result<Self, DecodeError> {
        let present = src.bool()?;
        let mut info = MessageListingInfo {
            options: ListingOptions::get(src)?,
            subject_length: src.u8()?,
            parameter_mask: src.u32()?,
            filter_message_type: src.u8()?,
            filter_period_begin: src.time()?,
            filter_period_end: src.time()?,
            filter_read_status: src.u8()?,
            filter_priority: src.u8()?,
            filter_recipient: None,
            filter_originator: None,
        };
        let folder_len = src.length()?;
        let recipient_len = src.length()?;
        let originator_len = src.length()?;
        src.require(
            (preceding + Self::FIXED_SIZE)
                .saturating_add(folder_len)
                .saturating_add(recipient_len)
                .saturating_add(originator_len),
        )?;

        let folder_name = src.cstr(folder_len, "folder_name")?;
        info.filter_recipient = src.cstr_if(
            info.options.contains(ListingOptions::FILTER_RECIPIENT),
            recipient_len,
            "filter_recipient",
        )?;
        info.filter_originator = src.cstr_if(
            info.options.contains(ListingOptions::FILTER_ORIGINATOR),
            originator_len,
            "filter_originator",
        )?;
        Ok(Self {
            folder_name,
            listing_info: present.then_some(info),
        })
    }
}

/// Page through the messages of a folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageListingQuery {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub max_list_count: u16,
    pub list_start_offset: u16,
    pub scope: ListingScope,
}

impl MessageListingQuery {
    const PRECEDING: usize = TARGET_SIZE + 2 + 2;

    #[must_use]
    pub const fn size_for(folder_len: usize, recipient_len: usize, originator_len: usize) -> usize {
        Self::MIN_SIZE
            .saturating_add(folder_len)
            .saturating_add(recipient_len)
            .saturating_add(originator_len)
    }
}

impl Body for MessageListingQuery {
    const MIN_SIZE: usize = Self::PRECEDING + ListingScope::FIXED_SIZE;

    fn size(&self) -> usize { Self::MIN_SIZE + self.scope.variable_len() }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        dst.put_u16(self.max_list_count);
        dst.put_u16(self.list_start_offset);
        self.scope.encode(dst);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            remote_device: src.addr()?,
            instance_id: src.u32()?,
            max_list_count: src.u16()?,
            list_start_offset: src.u16()?,
            scope: ListingScope::decode(src, Self::PRECEDING)?,
        })
    }
}

/// Count the messages of a folder that match the filters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageListingSizeQuery {
    pub remote_device: BdAddr,
    pub instance_id: u32,
    pub scope: ListingScope,
}

impl Body for MessageListingSizeQuery {
    const MIN_SIZE: usize = TARGET_SIZE + ListingScope::FIXED_SIZE;

    fn size(&self) -> usize { Self::MIN_SIZE + self.scope.variable_len() }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_addr(self.remote_device);
        dst.put_u32(self.instance_id);
        self.scope.encode(dst);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            remote_device: src.addr()?,
            instance_id: src.u32()?,
            scope: ListingScope::decode(src, TARGET_SIZE)?,
        })
    }
}
