//! Wire messages exchanged with the platform-manager server process.
//!
//! A message is a fixed [`MessageHeader`] followed by a body. Each body type
//! implements [`Body`], pairing a size function with its encoder and a
//! checked decoder. Body types are shared by both directions wherever the
//! layouts coincide, so a client-side response and the server-side call that
//! produces it use the same type.

use bytes::{Bytes, BytesMut};

pub mod access;
pub mod connection;
pub mod cursor;
pub mod error;
mod fixed;
pub mod function;
pub mod header;
pub mod response;

pub use cursor::Decoder;
pub use error::DecodeError;
pub use fixed::Field;
pub use header::{HEADER_SIZE, MAP_MESSAGE_GROUP, MessageHeader, RESPONSE_MASK};

/// A message body with a fixed part and optional trailing variable regions.
///
/// `size` must always equal the number of bytes `encode_body` writes. The
/// provided [`Body::to_bytes`] asserts this in debug builds.
pub trait Body: Sized {
    /// Body size with every variable region empty.
    const MIN_SIZE: usize;

    /// Total encoded size of this body.
    fn size(&self) -> usize;

    /// Append the encoded body to `dst`.
    fn encode_body(&self, dst: &mut BytesMut);

    /// Decode the body. `src` covers exactly the declared body length, which
    /// is already known to be at least [`Body::MIN_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if any field is malformed or if the
    /// variable-length fields claim more bytes than were declared.
    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError>;

    /// Encode into a freshly allocated buffer of exactly [`Body::size`] bytes.
    fn to_bytes(&self) -> Bytes {
        let size = self.size();
        let mut buf = BytesMut::with_capacity(size);
        self.encode_body(&mut buf);
        debug_assert_eq!(buf.len(), size, "size function disagrees with encoder");
        buf.freeze()
    }

    /// Decode a body after checking it against the minimum size.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TooShort`] for undersized bodies and propagates
    /// any error from [`Body::decode_body`].
    fn from_bytes(body: &[u8]) -> Result<Self, DecodeError> {
        if body.len() < Self::MIN_SIZE {
            return Err(DecodeError::TooShort {
                declared: body.len(),
                minimum: Self::MIN_SIZE,
            });
        }
        Self::decode_body(&mut Decoder::new(body))
    }
}

/// A framed bus message: header plus raw body bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    header: MessageHeader,
    payload: Bytes,
}

impl Message {
    /// Build a MAP-group message whose declared length matches `payload`.
    #[must_use]
    pub fn new(address_id: u32, message_id: u32, function: u32, payload: Bytes) -> Self {
        let header = MessageHeader::new(
            address_id,
            message_id,
            MAP_MESSAGE_GROUP,
            function,
            cursor::wire_len(payload.len()),
        );
        Self { header, payload }
    }

    /// Build a MAP-group message carrying `body`.
    #[must_use]
    pub fn with_body<B: Body>(address_id: u32, message_id: u32, function: u32, body: &B) -> Self {
        Self::new(address_id, message_id, function, body.to_bytes())
    }

    /// Assemble a message from an arbitrary header and payload.
    ///
    /// The header's declared length is kept as given, even if it disagrees
    /// with `payload`.
    #[must_use]
    pub fn from_parts(header: MessageHeader, payload: Bytes) -> Self { Self { header, payload } }

    /// Build the response to this message, echoing its identifiers.
    #[must_use]
    pub fn reply_with<B: Body>(&self, body: &B) -> Self {
        let payload = body.to_bytes();
        let mut header = self.header.as_response();
        header.message_length = cursor::wire_len(payload.len());
        Self { header, payload }
    }

    #[must_use]
    pub fn header(&self) -> &MessageHeader { &self.header }

    #[must_use]
    pub fn function(&self) -> u32 { self.header.message_function }

    #[must_use]
    pub fn is_response(&self) -> bool { self.header.is_response() }

    /// Raw payload bytes as received.
    #[must_use]
    pub fn payload(&self) -> &Bytes { &self.payload }

    /// The body as declared by the header.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if the header declares more bytes
    /// than the payload holds.
    pub fn body(&self) -> Result<&[u8], DecodeError> {
        let declared = self.header.body_len();
        self.payload
            .get(..declared)
            .ok_or(DecodeError::Truncated {
                declared,
                available: self.payload.len(),
            })
    }

    /// Decode the body as `B`.
    ///
    /// # Errors
    ///
    /// Propagates [`Message::body`] and [`Body::from_bytes`] failures.
    pub fn parse<B: Body>(&self) -> Result<B, DecodeError> { B::from_bytes(self.body()?) }

    /// Serialise header and payload into one frame.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.payload.len());
        self.header.encode(&mut buf);
        buf.extend_from_slice(&self.payload);
        buf.freeze()
    }

    /// Parse a frame produced by [`Message::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::IncompleteHeader`] or
    /// [`DecodeError::Truncated`] for short frames.
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        let header = MessageHeader::decode(frame)?;
        let rest = &frame[HEADER_SIZE..];
        let declared = header.body_len();
        if rest.len() < declared {
            return Err(DecodeError::Truncated {
                declared,
                available: rest.len(),
            });
        }
        Ok(Self {
            header,
            payload: Bytes::copy_from_slice(&rest[..declared]),
        })
    }
}
