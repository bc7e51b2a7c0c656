//! Validation of address strings supplied by callers, and random MAC generation.
//!
//! Each `validate_*` function returns the canonical form of a valid address, or the typed
//! [`AddressParseError`] describing what was expected. The `is_valid_*` variants only answer
//! yes or no.

use rand::Rng;

use crate::address::{
    parse_hex_octet, parse_ipv4, parse_ipv6, AddressKind, AddressParseError, CanonicalIpv6, MacAddr,
};

/// Validates a MAC address and returns its canonical lower-case, colon-separated form.
///
/// # Examples
///
/// ```
/// # use netproto::validation::validate_mac_address;
/// assert_eq!(validate_mac_address("AA-BB-CC-44-55-66").unwrap(), "aa:bb:cc:44:55:66");
/// assert!(validate_mac_address("11:22:33").is_err());
/// ```
pub fn validate_mac_address(value: &str) -> Result<String, AddressParseError> {
    value.parse::<MacAddr>().map(|mac| mac.to_string())
}

/// Returns true if the string is a valid MAC address.
pub fn is_valid_mac_address(value: &str) -> bool {
    validate_mac_address(value).is_ok()
}

/// Validates an IPv4 address and returns its dotted-decimal form.
pub fn validate_ipv4_address(value: &str) -> Result<String, AddressParseError> {
    parse_ipv4(value).map(|address| address.to_string())
}

/// Returns true if the string is a valid IPv4 address.
pub fn is_valid_ipv4_address(value: &str) -> bool {
    validate_ipv4_address(value).is_ok()
}

/// Validates an IPv6 address and returns its canonical compressed form.
///
/// # Examples
///
/// ```
/// # use netproto::validation::validate_ipv6_address;
/// assert_eq!(validate_ipv6_address("FE80:0:0:0:0:0:0:1").unwrap(), "fe80::1");
/// ```
pub fn validate_ipv6_address(value: &str) -> Result<String, AddressParseError> {
    parse_ipv6(value).map(|address| CanonicalIpv6(address).to_string())
}

/// Returns true if the string is a valid IPv6 address.
pub fn is_valid_ipv6_address(value: &str) -> bool {
    validate_ipv6_address(value).is_ok()
}

/// Generates a random MAC address using the thread-local random number generator.
///
/// See [`random_mac_with_rng`] for details.
pub fn random_mac(manufacturer: Option<&str>) -> Result<MacAddr, AddressParseError> {
    random_mac_with_rng(&mut rand::thread_rng(), manufacturer)
}

/// Generates a random MAC address, optionally with a fixed manufacturer code.
///
/// Without a manufacturer all six octets are random. A manufacturer code must consist of exactly
/// three two-digit hexadecimal octets separated by colons, such as `"AA:BB:CC"`; it then forms
/// the first three octets and only the device part is random.
///
/// # Examples
///
/// ```
/// # use netproto::validation::random_mac_with_rng;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mac = random_mac_with_rng(&mut rand::thread_rng(), Some("AA:BB:CC"))?;
/// assert_eq!(mac.oui(), [0xaa, 0xbb, 0xcc]);
/// # Ok(())
/// # }
/// ```
pub fn random_mac_with_rng<R: Rng>(
    rng: &mut R,
    manufacturer: Option<&str>,
) -> Result<MacAddr, AddressParseError> {
    let mut octets: [u8; MacAddr::LENGTH] = rng.gen();

    if let Some(code) = manufacturer {
        octets[..3].copy_from_slice(&parse_manufacturer(code)?);
    }

    Ok(MacAddr::new(octets))
}

fn parse_manufacturer(code: &str) -> Result<[u8; 3], AddressParseError> {
    let mut oui = [0u8; 3];
    let mut parts = code.split(':');

    for octet in oui.iter_mut() {
        let part = parts.next().ok_or(AddressKind::Manufacturer)?;
        *octet = parse_hex_octet(part).ok_or(AddressKind::Manufacturer)?;
    }

    if parts.next().is_some() {
        tracing::debug!(code, "rejecting manufacturer code with extra octets");
        return Err(AddressKind::Manufacturer.into());
    }

    Ok(oui)
}
