use std::{
    fmt::{Display, Formatter},
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use super::{AddressKind, AddressParseError};

/// Parses an IPv4 address in dotted-decimal notation.
///
/// Exactly four decimal octets in the range 0–255 are accepted.
///
/// # Examples
///
/// ```
/// # use netproto::address::parse_ipv4;
/// assert_eq!(parse_ipv4("185.159.104.91").unwrap().octets(), [0xb9, 0x9f, 0x68, 0x5b]);
/// assert!(parse_ipv4("300.128.0.10").is_err());
/// ```
pub fn parse_ipv4(string: &str) -> Result<Ipv4Addr, AddressParseError> {
    Ipv4Addr::from_str(string).or(Err(AddressKind::Ipv4.into()))
}

/// Parses an IPv6 address in either compressed or fully expanded colon-hex notation.
pub fn parse_ipv6(string: &str) -> Result<Ipv6Addr, AddressParseError> {
    Ipv6Addr::from_str(string).or(Err(AddressKind::Ipv6.into()))
}

/// Displays an IPv6 address in its canonical compressed form.
///
/// Groups are written in lower-case hexadecimal without leading zeros. The longest run of two or
/// more all-zero groups is replaced by `::`; when several runs are equally long, the leftmost one
/// is compressed. IPv4-mapped addresses (`::ffff:0:0/96`) end in dotted-quad notation, as in
/// `::ffff:192.0.2.1`; no other address uses embedded IPv4 notation.
///
/// # Examples
///
/// ```
/// # use netproto::address::CanonicalIpv6;
/// # use std::net::Ipv6Addr;
/// let address = Ipv6Addr::new(0xfe80, 0, 0, 0, 0x200, 0x86ff, 0xfe05, 0x80da);
/// assert_eq!(CanonicalIpv6(address).to_string(), "fe80::200:86ff:fe05:80da");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalIpv6(pub Ipv6Addr);

impl CanonicalIpv6 {
    /// Finds the start and length of the leftmost longest run of zero groups.
    fn longest_zero_run(groups: &[u16; 8]) -> (usize, usize) {
        let (mut best_start, mut best_length) = (0, 0);
        let mut index = 0;

        while index < groups.len() {
            if groups[index] != 0 {
                index += 1;
                continue;
            }

            let start = index;
            while index < groups.len() && groups[index] == 0 {
                index += 1;
            }
            if index - start > best_length {
                (best_start, best_length) = (start, index - start);
            }
        }

        (best_start, best_length)
    }

    fn write_groups(f: &mut Formatter<'_>, groups: &[u16]) -> std::fmt::Result {
        for (i, group) in groups.iter().enumerate() {
            if i != 0 {
                f.write_str(":")?;
            }
            write!(f, "{group:x}")?;
        }
        Ok(())
    }
}

impl Display for CanonicalIpv6 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let groups = self.0.segments();

        if let Some(ipv4) = self.0.to_ipv4_mapped() {
            return write!(f, "::ffff:{ipv4}");
        }

        match Self::longest_zero_run(&groups) {
            (start, length) if length >= 2 => {
                Self::write_groups(f, &groups[..start])?;
                f.write_str("::")?;
                Self::write_groups(f, &groups[start + length..])
            }
            _ => Self::write_groups(f, &groups),
        }
    }
}
