//! Hardware (MAC-48) and protocol (IPv4/IPv6) addresses and their canonical text forms.
//!
//! Addresses are stored in their packed form only. The canonical string is always derived from
//! the packed bytes, so the two representations cannot disagree:
//!
//! - MAC: lower-case, colon-separated octets, e.g. `00:c0:ca:a8:19:74`.
//! - IPv4: dotted decimal, e.g. `185.159.104.91`.
//! - IPv6: lower-case colon-hex with the longest run of zero groups compressed, e.g.
//!   `fe80::200:86ff:fe05:80da`.

mod mac;
pub use mac::MacAddr;
pub(crate) use mac::parse_hex_octet;

mod ip;
pub use ip::{parse_ipv4, parse_ipv6, CanonicalIpv6};

mod error;
pub use error::{AddressKind, AddressParseError};
