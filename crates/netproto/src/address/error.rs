use std::fmt::Display;

/// An error which can be returned when parsing the supported address formats.
#[derive(Eq, PartialEq, Clone, Debug, thiserror::Error)]
pub struct AddressParseError(pub(crate) AddressKind);

impl AddressParseError {
    /// The kind of address that failed to parse.
    pub fn kind(&self) -> AddressKind {
        self.0
    }
}

impl Display for AddressParseError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = match self.0 {
            AddressKind::Mac => "invalid MAC address syntax",
            AddressKind::Ipv4 => "invalid IPv4 address syntax",
            AddressKind::Ipv6 => "invalid IPv6 address syntax",
            AddressKind::Manufacturer => {
                "invalid manufacturer code, expected 3 colon-separated hex octets such as AA:BB:CC"
            }
        };

        fmt.write_str(description)
    }
}

/// The address formats that can fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// An IEEE 802 MAC-48 address.
    Mac,
    /// An IPv4 address in dotted-decimal notation.
    Ipv4,
    /// An IPv6 address in colon-hex notation.
    Ipv6,
    /// The organizationally unique identifier used to seed random MAC addresses.
    Manufacturer,
}

impl From<AddressKind> for AddressParseError {
    fn from(value: AddressKind) -> Self {
        Self(value)
    }
}
