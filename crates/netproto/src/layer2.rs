//! Link-layer headers: Ethernet framing and the Address Resolution Protocol.

use crate::utils::encoded_type;

mod ethernet;
pub use ethernet::EthernetHeader;

mod arp;
pub use arp::{ArpHeader, ArpOperation};

encoded_type!(
    /// EtherType values identifying the protocol encapsulated in an Ethernet frame, which ARP
    /// reuses for its protocol type.
    pub enum EtherType(u16) {
        /// Internet Protocol version 4.
        Ipv4 = 0x0800 => "IPv4",
        /// Address Resolution Protocol.
        Arp = 0x0806 => "ARP",
        /// Internet Protocol version 6.
        Ipv6 = 0x86dd => "IPv6";
        /// Any other EtherType.
        Other = 0..=u16::MAX,
    }
);
