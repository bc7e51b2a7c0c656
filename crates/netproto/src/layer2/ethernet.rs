use super::EtherType;
use crate::{
    address::MacAddr,
    layout::{DecodeError, FieldReader, FieldSpec, FieldValue, HeaderLayout},
    protocol::{AnyHeader, ByEndpoint, EncapsulatedProto, Header, Protocol},
};

const ETHERNET_LAYOUT: HeaderLayout = HeaderLayout {
    name: "Ethernet",
    header_len: EthernetHeader::HEADER_LEN,
    fields: &[
        FieldSpec::mac("dst"),
        FieldSpec::mac("src"),
        FieldSpec::u16("eth"),
    ],
};

const _: () = assert!(ETHERNET_LAYOUT.is_well_formed());

/// An Ethernet II frame header as specified in IEEE 802.3.
///
/// # Examples
///
/// ```
/// # use netproto::{address::MacAddr, layer2::{EtherType, EthernetHeader}};
/// # use netproto::wire_encoding::WireEncode;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = "00:07:0d:af:f4:54".parse()?;
/// let header = EthernetHeader::new(MacAddr::BROADCAST, source, EtherType::Arp);
///
/// assert_eq!(
///     header.encode_to_bytes().as_ref(),
///     b"\xff\xff\xff\xff\xff\xff\x00\x07\x0d\xaf\xf4\x54\x08\x06"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EthernetHeader {
    /// The destination and source hardware addresses.
    pub address: ByEndpoint<MacAddr>,
    /// The protocol of the frame's payload.
    pub ether_type: EtherType,
}

impl EthernetHeader {
    /// Length in bytes of the Ethernet header.
    pub const HEADER_LEN: usize = 14;

    /// Creates a new header.
    pub fn new(destination: MacAddr, source: MacAddr, ether_type: EtherType) -> Self {
        Self {
            address: ByEndpoint {
                destination,
                source,
            },
            ether_type,
        }
    }
}

impl Header for EthernetHeader {
    const PROTOCOL: Protocol = Protocol::Ethernet;
    const LAYOUT: &'static HeaderLayout = &ETHERNET_LAYOUT;

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            self.address.destination.into(),
            self.address.source.into(),
            u16::from(self.ether_type).into(),
        ]
    }

    fn from_fields(fields: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            address: ByEndpoint {
                destination: fields.mac()?,
                source: fields.mac()?,
            },
            ether_type: fields.uint::<u16>()?.into(),
        })
    }

    fn from_any(header: &AnyHeader) -> Option<&Self> {
        match header {
            AnyHeader::Ethernet(header) => Some(header),
            _ => None,
        }
    }

    fn encapsulated_proto(&self) -> EncapsulatedProto {
        EncapsulatedProto::from_name(self.ether_type.name())
    }
}
