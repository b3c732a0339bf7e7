//! Bluetooth device addresses.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of bytes in a `BD_ADDR`.
pub const BD_ADDR_LEN: usize = 6;

/// A 48-bit Bluetooth device address.
///
/// Bytes are held in transmission order, most significant first, so the
/// [`Display`](fmt::Display) form reads the same as the array.
///
/// ```
/// use mapm::BdAddr;
///
/// let addr: BdAddr = "00:1A:7D:DA:71:13".parse().expect("valid address");
/// assert_eq!(addr.to_string(), "00:1A:7D:DA:71:13");
/// assert!(!addr.is_null());
/// assert!(BdAddr::NULL.is_null());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BdAddr([u8; BD_ADDR_LEN]);

impl BdAddr {
    /// The all-zero address used by server roles to mean "no peer".
    pub const NULL: Self = Self([0; BD_ADDR_LEN]);

    /// Wrap raw address bytes.
    #[must_use]
    pub const fn new(bytes: [u8; BD_ADDR_LEN]) -> Self { Self(bytes) }

    /// Return the raw address bytes.
    #[must_use]
    pub const fn octets(&self) -> [u8; BD_ADDR_LEN] { self.0 }

    /// Report whether this is the all-zero sentinel.
    #[must_use]
    pub fn is_null(&self) -> bool { self.0 == [0; BD_ADDR_LEN] }
}

impl From<[u8; BD_ADDR_LEN]> for BdAddr {
    fn from(value: [u8; BD_ADDR_LEN]) -> Self { Self(value) }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Error returned when parsing a textual address fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid Bluetooth address: {0:?}")]
pub struct ParseBdAddrError(String);

impl FromStr for BdAddr {
    type Err = ParseBdAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; BD_ADDR_LEN];
        let mut parts = s.split([':', '-']);
        for slot in &mut bytes {
            let part = parts
                .next()
                .filter(|p| p.len() == 2 && p.bytes().all(|b| b.is_ascii_hexdigit()))
                .ok_or_else(|| ParseBdAddrError(s.to_owned()))?;
            *slot = u8::from_str_radix(part, 16).map_err(|_| ParseBdAddrError(s.to_owned()))?;
        }
        if parts.next().is_some() {
            return Err(ParseBdAddrError(s.to_owned()));
        }
        Ok(Self(bytes))
    }
}
