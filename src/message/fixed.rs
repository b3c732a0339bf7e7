//! Fixed-width field codecs and the `fixed_body!` helper.

use bytes::{BufMut, BytesMut};

use super::{
    DecodeError,
    cursor::{Decoder, PutFields, TIME_DATE_SIZE},
};
use crate::{
    address::{BD_ADDR_LEN, BdAddr},
    types::{
        CharSet,
        ConnectionFlags,
        ConnectionRole,
        ConnectionStatus,
        FractionalType,
        ListingOptions,
        MessageTypes,
        ServerFlags,
        SetFolderOption,
        StatusIndicator,
        TimeDate,
    },
};

/// A value with a fixed wire width.
pub trait Field: Sized {
    /// Encoded width in bytes.
    const SIZE: usize;

    fn put(&self, dst: &mut BytesMut);

    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the bytes are missing or invalid.
    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError>;
}

impl Field for u16 {
    const SIZE: usize = 2;

    fn put(&self, dst: &mut BytesMut) { dst.put_u16(*self); }

    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> { src.u16() }
}

impl Field for u32 {
    const SIZE: usize = 4;

    fn put(&self, dst: &mut BytesMut) { dst.put_u32(*self); }

    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> { src.u32() }
}

impl Field for i32 {
    const SIZE: usize = 4;

    fn put(&self, dst: &mut BytesMut) { dst.put_i32(*self); }

    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> { src.i32() }
}

impl Field for bool {
    const SIZE: usize = 1;

    fn put(&self, dst: &mut BytesMut) { dst.put_bool(*self); }

    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> { src.bool() }
}

impl Field for BdAddr {
    const SIZE: usize = BD_ADDR_LEN;

    fn put(&self, dst: &mut BytesMut) { dst.put_addr(*self); }

    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> { src.addr() }
}

impl Field for TimeDate {
    const SIZE: usize = TIME_DATE_SIZE;

    fn put(&self, dst: &mut BytesMut) { dst.put_time(self); }

    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> { src.time() }
}

impl Field for ConnectionRole {
    const SIZE: usize = 4;

    fn put(&self, dst: &mut BytesMut) { dst.put_u32(self.as_u32()); }

    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> { src.role() }
}

impl Field for ConnectionStatus {
    const SIZE: usize = 4;

    fn put(&self, dst: &mut BytesMut) { dst.put_u32(self.as_u32()); }

    fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self::from_u32(src.u32()?))
    }
}

macro_rules! wire_enum_field {
    ($($ty:ident => $field:literal),* $(,)?) => {$(
        impl Field for $ty {
            const SIZE: usize = 4;

            fn put(&self, dst: &mut BytesMut) { dst.put_u32(self.as_u32()); }

            fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
                src.wire($field, $ty::from_u32)
            }
        }
    )*};
}

wire_enum_field! {
    CharSet => "char_set",
    FractionalType => "fractional_type",
    StatusIndicator => "status_indicator",
    SetFolderOption => "path_option",
}

macro_rules! bit_set_field {
    ($($ty:ident),* $(,)?) => {$(
        impl Field for $ty {
            const SIZE: usize = 4;

            fn put(&self, dst: &mut BytesMut) { dst.put_u32(self.bits()); }

            fn get(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
                Ok(Self::from_bits(src.u32()?))
            }
        }
    )*};
}

bit_set_field!(ServerFlags, ConnectionFlags, MessageTypes, ListingOptions);

/// Declare a body made only of [`Field`] members, laid out in order.
macro_rules! fixed_body {
    ($(
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($(#[$fmeta:meta])* pub $field:ident: $ty:ty,)*
        }
    )*) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        impl $crate::message::Body for $name {
            const MIN_SIZE: usize = 0 $(+ <$ty as $crate::message::Field>::SIZE)*;

            fn size(&self) -> usize { Self::MIN_SIZE }

            fn encode_body(&self, dst: &mut ::bytes::BytesMut) {
                $($crate::message::Field::put(&self.$field, dst);)*
            }

            fn decode_body(
                src: &mut $crate::message::Decoder<'_>,
            ) -> Result<Self, $crate::message::DecodeError> {
                Ok(Self {
                    $($field: <$ty as $crate::message::Field>::get(src)?,)*
                })
            }
        }
    )*};
}

pub(crate) use fixed_body;
