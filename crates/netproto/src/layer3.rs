//! Network-layer headers: the Internet Protocol in versions 4 and 6 and their control message
//! protocols.

use crate::{
    protocol::EncapsulatedProto,
    utils::encoded_type,
    wire_encoding::bounded_uint,
};

mod ipv4;
pub use ipv4::{Dscp, Ecn, FragmentFlags, FragmentOffset, Ihl, Ipv4Header};

mod ipv6;
pub use ipv6::{FlowLabel, Ipv6Header};

mod icmp;
pub use icmp::{icmpv4_type_name, icmpv6_type_name, Icmpv4Header, Icmpv6Header};

bounded_uint! {
    /// The 4-bit version field leading every IP header.
    pub struct Version(u8 : 4);
}

impl Version {
    /// Internet Protocol version 4.
    pub const IPV4: Self = Self(4);
    /// Internet Protocol version 6.
    pub const IPV6: Self = Self(6);
}

encoded_type!(
    /// Assigned Internet protocol numbers, as carried in the IPv4 protocol and the IPv6 next
    /// header field.
    pub enum IpProtocol(u8) {
        /// Internet Control Message Protocol.
        Icmpv4 = 1 => "ICMPv4",
        /// Internet Group Management Protocol.
        Igmp = 2 => "IGMP",
        /// Transmission Control Protocol.
        Tcp = 6 => "TCP",
        /// User Datagram Protocol.
        Udp = 17 => "UDP",
        /// ICMP for IPv6.
        Icmpv6 = 58 => "ICMPv6";
        /// Any other protocol number.
        Other = 0..=u8::MAX,
    }
);

impl IpProtocol {
    pub(crate) fn encapsulated(self) -> EncapsulatedProto {
        EncapsulatedProto::from_name(self.name())
    }
}
