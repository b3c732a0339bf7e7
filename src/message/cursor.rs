//! Primitive field encoding and the checked body decoder.
//!
//! All integers travel in network byte order. Booleans are a single byte.
//! Strings are NUL-terminated and their length fields include the terminator;
//! a zero length means "absent".

use bytes::{Buf, BufMut, Bytes};

use super::DecodeError;
use crate::{
    address::{BD_ADDR_LEN, BdAddr},
    types::{ConnectionRole, MESSAGE_HANDLE_LENGTH, TimeDate},
};

/// Encoded size of a [`TimeDate`].
pub const TIME_DATE_SIZE: usize = 10;
/// Encoded size of a fixed-width message handle, terminator included.
pub const HANDLE_SIZE: usize = MESSAGE_HANDLE_LENGTH + 1;

/// Wire length of an optional string: its bytes plus the terminator, or zero.
#[must_use]
pub fn cstr_len(value: Option<&str>) -> usize { value.map_or(0, |s| s.len() + 1) }

/// Convert an in-memory length into its `u32` wire field.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "public entry points reject regions longer than u32::MAX"
)]
pub fn wire_len(len: usize) -> u32 { len as u32 }

/// Field writers for MAP bodies.
pub trait PutFields: BufMut {
    fn put_bool(&mut self, value: bool) { self.put_u8(u8::from(value)); }

    fn put_addr(&mut self, addr: BdAddr) { self.put_slice(&addr.octets()); }

    fn put_len(&mut self, len: usize) { self.put_u32(wire_len(len)); }

    /// Write the bytes of an optional string followed by its terminator.
    fn put_cstr(&mut self, value: Option<&str>) {
        if let Some(s) = value {
            self.put_slice(s.as_bytes());
            self.put_u8(0);
        }
    }

    /// Write a handle into its fixed-width, zero-padded slot.
    fn put_handle(&mut self, handle: &str) {
        let bytes = handle.as_bytes();
        let used = bytes.len().min(MESSAGE_HANDLE_LENGTH);
        self.put_slice(&bytes[..used]);
        self.put_bytes(0, HANDLE_SIZE - used);
    }

    fn put_time(&mut self, time: &TimeDate) {
        self.put_u16(time.year);
        self.put_u8(time.month);
        self.put_u8(time.day);
        self.put_u8(time.hour);
        self.put_u8(time.minute);
        self.put_u8(time.second);
        self.put_bool(time.utc_time);
        self.put_i16(time.utc_offset);
    }
}

impl<B: BufMut + ?Sized> PutFields for B {}

/// Bounds-checked reader over a message body.
///
/// The decoder never hands out a region that extends past the declared body,
/// so a lying length field surfaces as [`DecodeError::Inconsistent`] rather
/// than an out-of-bounds read.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

    /// Declared length of the body being decoded.
    #[must_use]
    pub fn declared(&self) -> usize { self.buf.len() }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize { self.buf.len() - self.pos }

    /// Fail unless the body is at least `implied` bytes long.
    ///
    /// Bodies call this with the output of their size function once every
    /// length field has been read, before touching the variable region.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Inconsistent`] when `implied` exceeds the
    /// declared length.
    pub fn require(&self, implied: usize) -> Result<(), DecodeError> {
        if implied > self.buf.len() {
            return Err(DecodeError::Inconsistent {
                declared: self.buf.len(),
                implied,
            });
        }
        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.saturating_add(len);
        self.require(end)?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> { Ok(self.take(1)?.get_u8()) }

    pub fn u16(&mut self) -> Result<u16, DecodeError> { Ok(self.take(2)?.get_u16()) }

    pub fn u32(&mut self) -> Result<u32, DecodeError> { Ok(self.take(4)?.get_u32()) }

    pub fn i32(&mut self) -> Result<i32, DecodeError> { Ok(self.take(4)?.get_i32()) }

    pub fn bool(&mut self) -> Result<bool, DecodeError> { Ok(self.u8()? != 0) }

    /// Read a `u32` length field.
    pub fn length(&mut self) -> Result<usize, DecodeError> {
        Ok(usize::try_from(self.u32()?).unwrap_or(usize::MAX))
    }

    pub fn addr(&mut self) -> Result<BdAddr, DecodeError> {
        let mut octets = [0u8; BD_ADDR_LEN];
        octets.copy_from_slice(self.take(BD_ADDR_LEN)?);
        Ok(BdAddr::new(octets))
    }

    pub fn role(&mut self) -> Result<ConnectionRole, DecodeError> {
        let value = self.u32()?;
        ConnectionRole::from_u32(value).ok_or(DecodeError::InvalidValue {
            field: "connection_type",
            value,
        })
    }

    /// Read a `u32` and map it through a wire enum's `from_u32`.
    pub fn wire<T>(
        &mut self,
        field: &'static str,
        parse: impl FnOnce(u32) -> Option<T>,
    ) -> Result<T, DecodeError> {
        let value = self.u32()?;
        parse(value).ok_or(DecodeError::InvalidValue { field, value })
    }

    pub fn time(&mut self) -> Result<TimeDate, DecodeError> {
        let mut src = self.take(TIME_DATE_SIZE)?;
        Ok(TimeDate {
            year: src.get_u16(),
            month: src.get_u8(),
            day: src.get_u8(),
            hour: src.get_u8(),
            minute: src.get_u8(),
            second: src.get_u8(),
            utc_time: src.get_u8() != 0,
            utc_offset: src.get_i16(),
        })
    }

    /// Read a fixed-width handle, stopping at the first NUL.
    pub fn handle(&mut self) -> Result<String, DecodeError> {
        let raw = self.take(HANDLE_SIZE)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        std::str::from_utf8(&raw[..end])
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 { field: "message_handle" })
    }

    /// Read an opaque region of `len` bytes.
    pub fn bytes(&mut self, len: usize) -> Result<Bytes, DecodeError> {
        Ok(Bytes::copy_from_slice(self.take(len)?))
    }

    /// Read a NUL-terminated string region of `len` bytes.
    ///
    /// A zero length yields `None`.
    pub fn cstr(&mut self, len: usize, field: &'static str) -> Result<Option<String>, DecodeError> {
        if len == 0 {
            return Ok(None);
        }
        let raw = self.take(len)?;
        let Some((&0, text)) = raw.split_last() else {
            return Err(DecodeError::UnterminatedString { field });
        };
        std::str::from_utf8(text)
            .map(|s| Some(s.to_owned()))
            .map_err(|_| DecodeError::InvalidUtf8 { field })
    }

    /// Like [`Decoder::cstr`], but the region is skipped and `None` returned
    /// unless `present` is set.
    pub fn cstr_if(
        &mut self,
        present: bool,
        len: usize,
        field: &'static str,
    ) -> Result<Option<String>, DecodeError> {
        let value = self.cstr(len, field)?;
        Ok(value.filter(|_| present))
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use rstest::rstest;

    use super::*;

    #[test]
    fn take_past_end_is_inconsistent() {
        let mut d = Decoder::new(&[0, 0, 0]);
        assert_eq!(
            d.u32(),
            Err(DecodeError::Inconsistent {
                declared: 3,
                implied: 4
            })
        );
    }

    #[rstest]
    #[case(&[b'h', b'i', 0], Ok(Some("hi".to_owned())))]
    #[case(&[b'h', b'i'], Err(DecodeError::UnterminatedString { field: "f" }))]
    #[case(&[0xff, 0], Err(DecodeError::InvalidUtf8 { field: "f" }))]
    fn cstr_validation(#[case] raw: &[u8], #[case] expected: Result<Option<String>, DecodeError>) {
        let mut d = Decoder::new(raw);
        assert_eq!(d.cstr(raw.len(), "f"), expected);
    }

    #[test]
    fn zero_length_string_is_absent() {
        let mut d = Decoder::new(&[]);
        assert_eq!(d.cstr(0, "f"), Ok(None));
    }

    #[test]
    fn handle_is_fixed_width() {
        let mut buf = BytesMut::new();
        buf.put_handle("20000100001");
        assert_eq!(buf.len(), HANDLE_SIZE);
        let mut d = Decoder::new(&buf);
        assert_eq!(d.handle().as_deref(), Ok("20000100001"));
        assert_eq!(d.remaining(), 0);
    }

    #[test]
    fn time_round_trips() {
        let time = TimeDate {
            year: 2024,
            month: 2,
            day: 29,
            hour: 23,
            minute: 59,
            second: 58,
            utc_time: true,
            utc_offset: -300,
        };
        let mut buf = BytesMut::new();
        buf.put_time(&time);
        assert_eq!(buf.len(), TIME_DATE_SIZE);
        assert_eq!(Decoder::new(&buf).time(), Ok(time));
    }
}
