use std::net::Ipv6Addr;

use super::{IpProtocol, Version};
use crate::{
    layout::{DecodeError, FieldReader, FieldSpec, FieldValue, HeaderLayout, StorageWord},
    protocol::{AnyHeader, ByEndpoint, EncapsulatedProto, Header, Protocol},
    utils::hex_string,
    wire_encoding::bounded_uint,
};

const IPV6_LAYOUT: HeaderLayout = HeaderLayout {
    name: "IPv6",
    header_len: Ipv6Header::HEADER_LEN,
    fields: &[
        FieldSpec::bits("version", 4, StorageWord::U32),
        FieldSpec::bits("tclass", 8, StorageWord::U32),
        FieldSpec::bits("flabel", 20, StorageWord::U32),
        FieldSpec::u16("payload_len"),
        FieldSpec::u8("next_header"),
        FieldSpec::u8("hop_limit"),
        FieldSpec::ipv6("src"),
        FieldSpec::ipv6("dst"),
    ],
};

const _: () = assert!(IPV6_LAYOUT.is_well_formed());

bounded_uint! {
    /// A 20-bit flow label.
    pub struct FlowLabel(u32 : 20);
}

/// An IPv6 fixed header, as specified in RFC 8200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Ipv6Header {
    /// The IP version, 6.
    pub version: Version,
    /// The traffic class.
    pub traffic_class: u8,
    /// The flow label.
    pub flow_label: FlowLabel,
    /// The length of the payload, including extension headers, in bytes.
    pub payload_length: u16,
    /// The protocol of the header following this one.
    pub next_header: IpProtocol,
    /// The remaining hop count.
    pub hop_limit: u8,
    /// The destination and source addresses.
    pub address: ByEndpoint<Ipv6Addr>,
}

impl Ipv6Header {
    /// Length in bytes of the IPv6 fixed header.
    pub const HEADER_LEN: usize = 40;

    /// The traffic class as a hexadecimal string, such as `"0x00"`.
    pub fn traffic_class_hex(&self) -> String {
        hex_string(self.traffic_class.into(), u8::BITS)
    }

    /// The flow label as a hexadecimal string, such as `"0x00000"`.
    pub fn flow_label_hex(&self) -> String {
        hex_string(self.flow_label.get(), FlowLabel::BITS)
    }
}

impl Header for Ipv6Header {
    const PROTOCOL: Protocol = Protocol::Ipv6;
    const LAYOUT: &'static HeaderLayout = &IPV6_LAYOUT;

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            u32::from(self.version).into(),
            self.traffic_class.into(),
            self.flow_label.get().into(),
            self.payload_length.into(),
            u8::from(self.next_header).into(),
            self.hop_limit.into(),
            self.address.source.into(),
            self.address.destination.into(),
        ]
    }

    fn from_fields(fields: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            version: fields.uint()?,
            traffic_class: fields.uint()?,
            flow_label: fields.uint()?,
            payload_length: fields.uint()?,
            next_header: fields.uint::<u8>()?.into(),
            hop_limit: fields.uint()?,
            address: ByEndpoint {
                source: fields.ipv6()?,
                destination: fields.ipv6()?,
            },
        })
    }

    fn from_any(header: &AnyHeader) -> Option<&Self> {
        match header {
            AnyHeader::Ipv6(header) => Some(header),
            _ => None,
        }
    }

    fn encapsulated_proto(&self) -> EncapsulatedProto {
        self.next_header.encapsulated()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::wire_encoding::{WireDecode, WireEncode};

    const RAW: [u8; 40] = [
        0x60, 0x00, 0x00, 0x00, 0x00, 0x78, 0x06, 0xff, 0xfe, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0xff, 0x02, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
    ];

    fn header() -> Ipv6Header {
        Ipv6Header {
            version: Version::IPV6,
            traffic_class: 0,
            flow_label: FlowLabel::new(0).unwrap(),
            payload_length: 120,
            next_header: IpProtocol::Tcp,
            hop_limit: 255,
            address: ByEndpoint {
                destination: Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1),
                source: Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1),
            },
        }
    }

    #[test]
    fn build() {
        let header = header();

        assert_eq!(header.traffic_class_hex(), "0x00");
        assert_eq!(header.flow_label_hex(), "0x00000");
        assert_eq!(header.encapsulated_proto().as_str(), "TCP");
        assert_eq!(header.address.source.octets()[..2], [0xfe, 0x80]);
        assert_eq!(header.encode_to_bytes().as_ref(), RAW);
    }

    #[test]
    fn decode() -> test_utils::Result {
        let header = Ipv6Header::decode(&mut Bytes::from_static(&RAW))?;

        assert_eq!(header.version.get(), 6);
        assert_eq!(header.traffic_class, 0);
        assert_eq!(header.flow_label.get(), 0);
        assert_eq!(header.payload_length, 120);
        assert_eq!(header.next_header, IpProtocol::Tcp);
        assert_eq!(header.hop_limit, 255);
        assert_eq!(header, self::header());
        Ok(())
    }

    #[test]
    fn packs_version_class_and_label_into_one_word() -> test_utils::Result {
        let header = Ipv6Header {
            traffic_class: 0xab,
            flow_label: FlowLabel::new(0xcdef1).unwrap(),
            ..header()
        };
        let encoded = header.encode_to_bytes();

        assert_eq!(encoded[..4], [0x6a, 0xbc, 0xde, 0xf1]);
        assert_eq!(header.traffic_class_hex(), "0xab");
        assert_eq!(header.flow_label_hex(), "0xcdef1");
        assert_eq!(Ipv6Header::decode(&mut encoded.clone())?, header);
        Ok(())
    }

    #[test]
    fn display() {
        assert_eq!(
            header().to_string(),
            "IPv6(version=6, tclass=0, flabel=0, payload_len=120, next_header=6, hop_limit=255, \
             src=fe80::1, dst=ff02::1)"
        );
    }
}
