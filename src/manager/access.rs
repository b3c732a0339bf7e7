//! Requests issued by a local message access client (MCE).
//!
//! Each call returns once the server has queued the request. The remote
//! MSE's answer arrives later as the matching `*Response` event on the
//! connection's callback.

use super::{Manager, check_chunk, check_handle, check_status, check_target};
use crate::{
    address::BdAddr,
    error::{MapmError, Result},
    message::{
        access::{
            EnableNotifications,
            FolderListingQuery,
            GetMessage,
            ListingScope,
            MessageListingQuery,
            MessageListingSizeQuery,
            MessageStatus,
            PushMessage,
            SetFolder,
            SetFolderAbsolute,
        },
        connection::Target,
        function,
        response::CurrentFolderResponse,
    },
    types::{CharSet, FractionalType, MessageListingInfo, SetFolderOption, StatusIndicator},
};

impl Manager {
    /// The folder the remote MSE currently has selected for this client.
    ///
    /// The root folder is reported as an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target,
    /// [`MapmError::ResponseMessageInvalid`] for a malformed response, or the
    /// failure reported by the server.
    pub async fn query_current_folder(&self, address: BdAddr, instance_id: u32) -> Result<String> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        let response: CurrentFolderResponse = self
            .inner
            .request(function::QUERY_CURRENT_FOLDER, &Target {
                remote_device: address,
                instance_id,
            })
            .await?;
        check_status(response.status)?;
        Ok(response.folder_name.unwrap_or_default())
    }

    /// Ask the remote MSE to start or stop sending event reports.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target, or the
    /// failure reported by the server.
    pub async fn enable_notifications(
        &self,
        address: BdAddr,
        instance_id: u32,
        enabled: bool,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::ENABLE_NOTIFICATIONS, &EnableNotifications {
                remote_device: address,
                instance_id,
                enabled,
            })
            .await
    }

    /// Navigate relative to the current folder.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target or a
    /// [`SetFolderOption::Down`] without a folder name, or the failure
    /// reported by the server.
    pub async fn set_folder(
        &self,
        address: BdAddr,
        instance_id: u32,
        path_option: SetFolderOption,
        folder_name: Option<&str>,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        if path_option == SetFolderOption::Down && folder_name.is_none() {
            return Err(MapmError::InvalidParameter);
        }
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::SET_FOLDER, &SetFolder {
                remote_device: address,
                instance_id,
                path_option,
                folder_name: folder_name.map(str::to_owned),
            })
            .await
    }

    /// Navigate to an absolute path. `None` selects the root folder.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target, or the
    /// failure reported by the server.
    pub async fn set_folder_absolute(
        &self,
        address: BdAddr,
        instance_id: u32,
        folder_name: Option<&str>,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::SET_FOLDER_ABSOLUTE, &SetFolderAbsolute {
                remote_device: address,
                instance_id,
                folder_name: folder_name.map(str::to_owned),
            })
            .await
    }

    /// Request a page of the current folder's sub-folders.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target, or the
    /// failure reported by the server.
    pub async fn get_folder_listing(
        &self,
        address: BdAddr,
        instance_id: u32,
        max_list_count: u16,
        list_start_offset: u16,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::GET_FOLDER_LISTING, &FolderListingQuery {
                remote_device: address,
                instance_id,
                max_list_count,
                list_start_offset,
            })
            .await
    }

    /// Request the number of sub-folders of the current folder.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target, or the
    /// failure reported by the server.
    pub async fn get_folder_listing_size(&self, address: BdAddr, instance_id: u32) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::GET_FOLDER_LISTING_SIZE, &Target {
                remote_device: address,
                instance_id,
            })
            .await
    }

    /// Request a page of the messages in `folder_name`, or in the current
    /// folder when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target, or the
    /// failure reported by the server.
    pub async fn get_message_listing(
        &self,
        address: BdAddr,
        instance_id: u32,
        folder_name: Option<&str>,
        max_list_count: u16,
        list_start_offset: u16,
        listing_info: Option<MessageListingInfo>,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::GET_MESSAGE_LISTING, &MessageListingQuery {
                remote_device: address,
                instance_id,
                max_list_count,
                list_start_offset,
                scope: ListingScope {
                    folder_name: folder_name.map(str::to_owned),
                    listing_info,
                },
            })
            .await
    }

    /// Request the number of messages matching `listing_info`.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target, or the
    /// failure reported by the server.
    pub async fn get_message_listing_size(
        &self,
        address: BdAddr,
        instance_id: u32,
        folder_name: Option<&str>,
        listing_info: Option<MessageListingInfo>,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::GET_MESSAGE_LISTING_SIZE, &MessageListingSizeQuery {
                remote_device: address,
                instance_id,
                scope: ListingScope {
                    folder_name: folder_name.map(str::to_owned),
                    listing_info,
                },
            })
            .await
    }

    /// Fetch one message.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target or a handle
    /// that is empty or too long, or the failure reported by the server.
    pub async fn get_message(
        &self,
        address: BdAddr,
        instance_id: u32,
        message_handle: &str,
        attachment: bool,
        char_set: CharSet,
        fractional_type: FractionalType,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        check_handle(message_handle)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::GET_MESSAGE, &GetMessage {
                remote_device: address,
                instance_id,
                attachment,
                char_set,
                fractional_type,
                message_handle: message_handle.to_owned(),
            })
            .await
    }

    /// Change the read or deleted flag of a message.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target or handle, or
    /// the failure reported by the server.
    pub async fn set_message_status(
        &self,
        address: BdAddr,
        instance_id: u32,
        message_handle: &str,
        indicator: StatusIndicator,
        status_value: bool,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        check_handle(message_handle)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::SET_MESSAGE_STATUS, &MessageStatus {
                remote_device: address,
                instance_id,
                message_handle: message_handle.to_owned(),
                indicator,
                status_value,
            })
            .await
    }

    /// Upload one chunk of a message to the remote MSE.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target or an empty
    /// chunk that is not final, or the failure reported by the server.
    pub async fn push_message(&self, message: PushMessage) -> Result<()> {
        check_target(message.remote_device, message.instance_id)?;
        check_chunk(&message.data, message.is_final)?;
        self.inner.ensure_initialized()?;
        self.inner.call(function::PUSH_MESSAGE, &message).await
    }

    /// Ask the remote MSE to check for new messages.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`] for a bad target, or the
    /// failure reported by the server.
    pub async fn update_inbox(&self, address: BdAddr, instance_id: u32) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::UPDATE_INBOX, &Target {
                remote_device: address,
                instance_id,
            })
            .await
    }
}
