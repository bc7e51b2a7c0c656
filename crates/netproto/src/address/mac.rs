use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use super::{AddressKind, AddressParseError};

/// An IEEE 802 MAC-48 hardware address.
///
/// Parsing accepts six two-digit hexadecimal octets in either case, separated by `:` or `-`.
/// Display always produces the canonical lower-case, colon-separated form.
///
/// # Examples
///
/// ```
/// # use netproto::address::MacAddr;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mac: MacAddr = "00-C0-CA-A8-19-74".parse()?;
/// assert_eq!(mac.octets(), [0x00, 0xc0, 0xca, 0xa8, 0x19, 0x74]);
/// assert_eq!(mac.to_string(), "00:c0:ca:a8:19:74");
/// # Ok(())
/// # }
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// The length of a MAC address in bytes.
    pub const LENGTH: usize = 6;

    /// The broadcast address `ff:ff:ff:ff:ff:ff`.
    pub const BROADCAST: Self = Self([0xff; 6]);

    /// The all-zero address, as used for the unknown target of an ARP request.
    pub const UNSPECIFIED: Self = Self([0; 6]);

    /// Creates an address from its packed octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Returns the packed octets of the address.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Returns the organizationally unique identifier, the first three octets.
    pub const fn oui(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Returns true for the broadcast address.
    ///
    /// # Examples
    ///
    /// ```
    /// # use netproto::address::MacAddr;
    /// assert!(MacAddr::BROADCAST.is_broadcast());
    /// assert!(!MacAddr::UNSPECIFIED.is_broadcast());
    /// ```
    pub const fn is_broadcast(&self) -> bool {
        u64::from_be_bytes([
            0, 0, self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5],
        ]) == 0xffff_ffff_ffff
    }

    /// Returns true if the group bit (least significant bit of the first octet) is set.
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

/// Parses a single octet consisting of exactly two hexadecimal digits.
pub(crate) fn parse_hex_octet(part: &str) -> Option<u8> {
    if part.len() == 2 && part.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        u8::from_str_radix(part, 16).ok()
    } else {
        None
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(value: [u8; 6]) -> Self {
        Self(value)
    }
}

impl From<MacAddr> for [u8; 6] {
    fn from(value: MacAddr) -> Self {
        value.0
    }
}

impl Display for MacAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddr {
    type Err = AddressParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; Self::LENGTH];
        let mut parts = string.split(|c| c == ':' || c == '-');

        for octet in octets.iter_mut() {
            let part = parts.next().ok_or(AddressKind::Mac)?;
            *octet = parse_hex_octet(part).ok_or(AddressKind::Mac)?;
        }

        if parts.next().is_some() {
            return Err(AddressKind::Mac.into());
        }

        Ok(Self(octets))
    }
}

impl serde::Serialize for MacAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for MacAddr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = <String as serde::Deserialize>::deserialize(deserializer)?;
        string.parse().map_err(serde::de::Error::custom)
    }
}
