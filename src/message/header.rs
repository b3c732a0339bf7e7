//! The fixed header that precedes every MAP manager bus message.
//!
//! All fields are big-endian `u32`s; `message_length` counts only the body.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::DecodeError;

/// Message group assigned to the MAP manager on the platform bus.
pub const MAP_MESSAGE_GROUP: u32 = 0x0000_1005;

/// Bit set in `message_id` when the message answers an earlier request.
pub const RESPONSE_MASK: u32 = 0x8000_0000;

/// Size of the fixed header preceding every body.
pub const HEADER_SIZE: usize = 20;

/// Fixed header carried by every bus message.
///
/// `message_length` counts the body only; the header itself is excluded.
///
/// ```
/// use mapm::message::{HEADER_SIZE, MAP_MESSAGE_GROUP, MessageHeader};
///
/// let header = MessageHeader::new(1, 7, MAP_MESSAGE_GROUP, 0x1001, 11);
/// assert_eq!(header.encoded().len(), HEADER_SIZE);
/// assert!(!header.is_response());
/// assert!(header.as_response().is_response());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageHeader {
    pub address_id: u32,
    pub message_id: u32,
    pub message_group: u32,
    pub message_function: u32,
    pub message_length: u32,
}

impl MessageHeader {
    /// Create a new header.
    #[must_use]
    pub const fn new(
        address_id: u32,
        message_id: u32,
        message_group: u32,
        message_function: u32,
        message_length: u32,
    ) -> Self {
        Self {
            address_id,
            message_id,
            message_group,
            message_function,
            message_length,
        }
    }

    /// Report whether the response bit is set.
    #[must_use]
    pub const fn is_response(&self) -> bool { self.message_id & RESPONSE_MASK != 0 }

    /// Copy of this header marked as a response.
    #[must_use]
    pub const fn as_response(&self) -> Self {
        Self {
            message_id: self.message_id | RESPONSE_MASK,
            ..*self
        }
    }

    /// Declared body length as a `usize`.
    #[must_use]
    pub fn body_len(&self) -> usize { usize::try_from(self.message_length).unwrap_or(usize::MAX) }

    /// Serialise the header in network byte order.
    #[must_use]
    pub fn encoded(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);
        self.encode(&mut buf);
        buf.freeze()
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32(self.address_id);
        dst.put_u32(self.message_id);
        dst.put_u32(self.message_group);
        dst.put_u32(self.message_function);
        dst.put_u32(self.message_length);
    }

    /// Parse a header from the front of `src`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::IncompleteHeader`] if fewer than
    /// [`HEADER_SIZE`] bytes are available.
    pub fn decode(mut src: &[u8]) -> Result<Self, DecodeError> {
        if src.len() < HEADER_SIZE {
            return Err(DecodeError::IncompleteHeader {
                have: src.len(),
                need: HEADER_SIZE,
            });
        }
        Ok(Self {
            address_id: src.get_u32(),
            message_id: src.get_u32(),
            message_group: src.get_u32(),
            message_function: src.get_u32(),
            message_length: src.get_u32(),
        })
    }
}
