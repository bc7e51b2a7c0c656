//! The closed set of supported protocols and the [`Header`] trait shared by their headers.
//!
//! Every header type describes itself with a static [`HeaderLayout`] and converts to and from
//! the generic field values of that layout. Decoding, encoding and rendering are then provided
//! for all headers alike.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use bytes::{Buf, BufMut};

use crate::{
    layer2::{ArpHeader, EthernetHeader},
    layer3::{Icmpv4Header, Icmpv6Header, Ipv4Header, Ipv6Header},
    layer4::{TcpHeader, UdpHeader},
    layout::{DecodeError, EncodeError, FieldReader, FieldValue, HeaderLayout},
    wire_encoding::{WireDecode, WireEncode},
};

/// Instances of an object associated with both a source and destination endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct ByEndpoint<T> {
    /// The value for the destination.
    pub destination: T,
    /// The value for the source.
    pub source: T,
}

/// The protocols whose headers can be represented.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Protocol {
    /// IEEE 802.3 Ethernet framing.
    Ethernet,
    /// Address Resolution Protocol, RFC 826.
    #[serde(rename = "ARP")]
    Arp,
    /// Internet Protocol version 4, RFC 791.
    #[serde(rename = "IPv4")]
    Ipv4,
    /// Internet Protocol version 6, RFC 8200.
    #[serde(rename = "IPv6")]
    Ipv6,
    /// Internet Control Message Protocol, RFC 792.
    #[serde(rename = "ICMPv4")]
    Icmpv4,
    /// Internet Control Message Protocol for IPv6, RFC 4443.
    #[serde(rename = "ICMPv6")]
    Icmpv6,
    /// Transmission Control Protocol, RFC 793.
    #[serde(rename = "TCP")]
    Tcp,
    /// User Datagram Protocol, RFC 768.
    #[serde(rename = "UDP")]
    Udp,
}

impl Protocol {
    /// All registered protocols.
    pub const ALL: [Protocol; 8] = [
        Protocol::Ethernet,
        Protocol::Arp,
        Protocol::Ipv4,
        Protocol::Ipv6,
        Protocol::Icmpv4,
        Protocol::Icmpv6,
        Protocol::Tcp,
        Protocol::Udp,
    ];

    /// The conventional name of the protocol, such as `"IPv4"`.
    pub const fn name(&self) -> &'static str {
        match self {
            Protocol::Ethernet => "Ethernet",
            Protocol::Arp => "ARP",
            Protocol::Ipv4 => "IPv4",
            Protocol::Ipv6 => "IPv6",
            Protocol::Icmpv4 => "ICMPv4",
            Protocol::Icmpv6 => "ICMPv6",
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }

    /// The header layout of the protocol.
    pub fn layout(&self) -> &'static HeaderLayout {
        match self {
            Protocol::Ethernet => EthernetHeader::LAYOUT,
            Protocol::Arp => ArpHeader::LAYOUT,
            Protocol::Ipv4 => Ipv4Header::LAYOUT,
            Protocol::Ipv6 => Ipv6Header::LAYOUT,
            Protocol::Icmpv4 => Icmpv4Header::LAYOUT,
            Protocol::Icmpv6 => Icmpv6Header::LAYOUT,
            Protocol::Tcp => TcpHeader::LAYOUT,
            Protocol::Udp => UdpHeader::LAYOUT,
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = UnregisteredProtocol;

    /// Resolves a protocol name, ignoring ASCII case.
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|protocol| protocol.name().eq_ignore_ascii_case(string))
            .ok_or_else(|| UnregisteredProtocol(string.to_owned()))
    }
}

/// Raised when a protocol name does not identify a registered protocol.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
#[error("invalid protocol: {0}")]
pub struct UnregisteredProtocol(pub String);

/// The protocol carried in the payload of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncapsulatedProto {
    /// A protocol named in the header's lookup table, which need not be registered here.
    Named(&'static str),
    /// The header identifies a next protocol that is missing from its lookup table.
    Unknown,
    /// The header does not identify its payload.
    Undefined,
}

impl EncapsulatedProto {
    pub(crate) fn from_name(name: Option<&'static str>) -> Self {
        name.map_or(Self::Unknown, Self::Named)
    }

    /// The name of the protocol, or the `"unknown"` or `"undefined"` sentinel.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EncapsulatedProto::Named(name) => *name,
            EncapsulatedProto::Unknown => "unknown",
            EncapsulatedProto::Undefined => "undefined",
        }
    }

    /// The registered protocol, if any, whose header follows.
    pub fn protocol(&self) -> Option<Protocol> {
        match self {
            EncapsulatedProto::Named(name) => name.parse().ok(),
            _ => None,
        }
    }
}

impl Display for EncapsulatedProto {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for EncapsulatedProto {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A fixed-length protocol header described by a [`HeaderLayout`].
///
/// Implementors only convert between themselves and the generic field values of their layout;
/// [`WireDecode`], [`WireEncode`] and [`Display`] follow from that.
pub trait Header: Sized {
    /// The protocol of the header.
    const PROTOCOL: Protocol;

    /// The layout of the header on the wire.
    const LAYOUT: &'static HeaderLayout;

    /// Returns one value per field of [`Self::LAYOUT`], in layout order.
    fn to_fields(&self) -> Vec<FieldValue>;

    /// Builds the header from the values decoded for [`Self::LAYOUT`].
    fn from_fields(fields: &mut FieldReader) -> Result<Self, DecodeError>;

    /// Returns the header if it is the content of `header`.
    fn from_any(header: &AnyHeader) -> Option<&Self>;

    /// The protocol carried in the payload.
    fn encapsulated_proto(&self) -> EncapsulatedProto {
        EncapsulatedProto::Undefined
    }
}

impl<T: Buf, H: Header> WireDecode<T> for H {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        let values = Self::LAYOUT.unpack(data)?;
        Self::from_fields(&mut FieldReader::new(Self::LAYOUT, values))
    }
}

impl<H: Header> WireEncode for H {
    type Error = EncodeError;

    #[inline]
    fn encoded_length(&self) -> usize {
        Self::LAYOUT.header_len
    }

    fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error> {
        Self::LAYOUT.pack(&self.to_fields(), buffer)
    }
}

macro_rules! any_header {
    ($($variant:ident($header:ty)),* $(,)?) => {
        /// A header of any registered protocol.
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub enum AnyHeader {
            $(
                #[allow(missing_docs)]
                $variant($header),
            )*
        }

        impl AnyHeader {
            /// The protocol of the contained header.
            pub fn protocol(&self) -> Protocol {
                match self {
                    $(Self::$variant(_) => <$header as Header>::PROTOCOL,)*
                }
            }

            /// The protocol carried in the payload of the contained header.
            pub fn encapsulated_proto(&self) -> EncapsulatedProto {
                match self {
                    $(Self::$variant(header) => header.encapsulated_proto(),)*
                }
            }

            /// Decodes a header of the given protocol from the front of `data`.
            pub fn decode<T: Buf>(protocol: Protocol, data: &mut T) -> Result<Self, DecodeError> {
                match protocol {
                    $(Protocol::$variant => <$header>::decode(data).map(Self::$variant),)*
                }
            }
        }

        impl WireEncode for AnyHeader {
            type Error = EncodeError;

            fn encoded_length(&self) -> usize {
                self.protocol().layout().header_len
            }

            fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error> {
                match self {
                    $(Self::$variant(header) => header.encode_to(buffer),)*
                }
            }
        }

        impl Display for AnyHeader {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant(header) => Display::fmt(header, f),)*
                }
            }
        }

        $(
            impl From<$header> for AnyHeader {
                fn from(value: $header) -> Self {
                    Self::$variant(value)
                }
            }

            impl Display for $header {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    <$header as Header>::LAYOUT.fmt_fields(&self.to_fields(), f)
                }
            }
        )*
    };
}

any_header! {
    Ethernet(EthernetHeader),
    Arp(ArpHeader),
    Ipv4(Ipv4Header),
    Ipv6(Ipv6Header),
    Icmpv4(Icmpv4Header),
    Icmpv6(Icmpv6Header),
    Tcp(TcpHeader),
    Udp(UdpHeader),
}
