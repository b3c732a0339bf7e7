//! Answers sent by a local message access server (MSE) to a connected MCE.

use bytes::Bytes;

use super::{Manager, check_chunk, check_handle, check_target};
use crate::{
    address::BdAddr,
    error::Result,
    message::{
        access::{
            FolderListing,
            FolderListingSize,
            MessageData,
            MessageListing,
            MessageListingSize,
            Notification,
            PushConfirmation,
            StatusReply,
        },
        function,
    },
    types::{FractionalType, TimeDate},
};

impl Manager {
    async fn confirm(
        &self,
        function: u32,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function, &StatusReply {
                remote_device: address,
                instance_id,
                response_code,
            })
            .await
    }

    /// Answer an enable-notifications request.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`](crate::MapmError::InvalidParameter)
    /// for a bad target, or the failure reported by the server.
    pub async fn enable_notifications_confirmation(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
    ) -> Result<()> {
        self.confirm(function::ENABLE_NOTIFICATIONS_CONFIRMATION, address, instance_id, response_code)
            .await
    }

    /// Answer a set-folder request.
    ///
    /// # Errors
    ///
    /// As for [`Manager::enable_notifications_confirmation`].
    pub async fn set_folder_confirmation(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
    ) -> Result<()> {
        self.confirm(function::SET_FOLDER_CONFIRMATION, address, instance_id, response_code)
            .await
    }

    /// Answer a set-message-status request.
    ///
    /// # Errors
    ///
    /// As for [`Manager::enable_notifications_confirmation`].
    pub async fn set_message_status_confirmation(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
    ) -> Result<()> {
        self.confirm(function::SET_MESSAGE_STATUS_CONFIRMATION, address, instance_id, response_code)
            .await
    }

    /// Answer an update-inbox request.
    ///
    /// # Errors
    ///
    /// As for [`Manager::enable_notifications_confirmation`].
    pub async fn update_inbox_confirmation(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
    ) -> Result<()> {
        self.confirm(function::UPDATE_INBOX_CONFIRMATION, address, instance_id, response_code)
            .await
    }

    /// Send one chunk of a folder listing.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`](crate::MapmError::InvalidParameter)
    /// for a bad target or an empty chunk that is not final, or the failure
    /// reported by the server.
    pub async fn send_folder_listing(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
        listing: Bytes,
        is_final: bool,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        check_chunk(&listing, is_final)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::SEND_FOLDER_LISTING, &FolderListing {
                remote_device: address,
                instance_id,
                response_code,
                is_final,
                data: listing,
            })
            .await
    }

    /// Report the number of sub-folders.
    ///
    /// # Errors
    ///
    /// As for [`Manager::enable_notifications_confirmation`].
    pub async fn send_folder_listing_size(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
        folder_count: u16,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::SEND_FOLDER_LISTING_SIZE, &FolderListingSize {
                remote_device: address,
                instance_id,
                response_code,
                folder_count,
            })
            .await
    }

    /// Send one chunk of a message listing.
    ///
    /// # Errors
    ///
    /// As for [`Manager::send_folder_listing`].
    pub async fn send_message_listing(&self, listing: MessageListing) -> Result<()> {
        check_target(listing.remote_device, listing.instance_id)?;
        check_chunk(&listing.data, listing.is_final)?;
        self.inner.ensure_initialized()?;
        self.inner.call(function::SEND_MESSAGE_LISTING, &listing).await
    }

    /// Report the number of messages matching a listing query.
    ///
    /// # Errors
    ///
    /// As for [`Manager::enable_notifications_confirmation`].
    pub async fn send_message_listing_size(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
        message_count: u16,
        new_message: bool,
        current_time: TimeDate,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::SEND_MESSAGE_LISTING_SIZE, &MessageListingSize {
                remote_device: address,
                instance_id,
                response_code,
                message_count,
                new_message,
                current_time,
            })
            .await
    }

    /// Send one chunk of a requested message.
    ///
    /// # Errors
    ///
    /// As for [`Manager::send_folder_listing`].
    pub async fn send_message(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
        fractional_type: FractionalType,
        message: Bytes,
        is_final: bool,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        check_chunk(&message, is_final)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::SEND_MESSAGE, &MessageData {
                remote_device: address,
                instance_id,
                response_code,
                fractional_type,
                is_final,
                data: message,
            })
            .await
    }

    /// Acknowledge a pushed message, reporting the handle it was stored
    /// under.
    ///
    /// # Errors
    ///
    /// Returns [`MapmError::InvalidParameter`](crate::MapmError::InvalidParameter)
    /// for a bad target or handle, or the failure reported by the server.
    pub async fn push_message_confirmation(
        &self,
        address: BdAddr,
        instance_id: u32,
        response_code: u32,
        message_handle: &str,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        check_handle(message_handle)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::PUSH_MESSAGE_CONFIRMATION, &PushConfirmation {
                remote_device: address,
                instance_id,
                response_code,
                message_handle: message_handle.to_owned(),
            })
            .await
    }

    /// Push one chunk of an event report to a connected MCE.
    ///
    /// # Errors
    ///
    /// As for [`Manager::send_folder_listing`].
    pub async fn send_notification(
        &self,
        address: BdAddr,
        instance_id: u32,
        event_report: Bytes,
        is_final: bool,
    ) -> Result<()> {
        check_target(address, instance_id)?;
        check_chunk(&event_report, is_final)?;
        self.inner.ensure_initialized()?;
        self.inner
            .call(function::SEND_NOTIFICATION, &Notification {
                remote_device: address,
                instance_id,
                is_final,
                data: event_report,
            })
            .await
    }
}
