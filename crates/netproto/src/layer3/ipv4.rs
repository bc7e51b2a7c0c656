use std::net::Ipv4Addr;

use super::{IpProtocol, Version};
use crate::{
    checksum::ChecksumDigest,
    layout::{DecodeError, FieldReader, FieldSpec, FieldValue, HeaderLayout, StorageWord},
    protocol::{AnyHeader, ByEndpoint, EncapsulatedProto, Header, Protocol},
    utils::hex_string,
    wire_encoding::{bounded_uint, WireEncode},
};

const IPV4_LAYOUT: HeaderLayout = HeaderLayout {
    name: "IPv4",
    header_len: Ipv4Header::HEADER_LEN,
    fields: &[
        FieldSpec::bits("version", 4, StorageWord::U8),
        FieldSpec::bits("ihl", 4, StorageWord::U8),
        FieldSpec::bits("dscp", 6, StorageWord::U8),
        FieldSpec::bits("ecn", 2, StorageWord::U8),
        FieldSpec::u16("len"),
        FieldSpec::u16("id"),
        FieldSpec::bits("flags", 3, StorageWord::U16),
        FieldSpec::bits("offset", 13, StorageWord::U16),
        FieldSpec::u8("ttl"),
        FieldSpec::u8("proto"),
        FieldSpec::u16("chksum"),
        FieldSpec::ipv4("src"),
        FieldSpec::ipv4("dst"),
    ],
};

const _: () = assert!(IPV4_LAYOUT.is_well_formed());

bounded_uint! {
    /// The length of an IPv4 header in 32-bit words.
    pub struct Ihl(u8 : 4);
}

impl Ihl {
    /// The length of a header without options.
    pub const MIN: Self = Self(5);
}

bounded_uint! {
    /// A 6-bit differentiated services code point.
    pub struct Dscp(u8 : 6);
}

bounded_uint! {
    /// The 2-bit explicit congestion notification field.
    pub struct Ecn(u8 : 2);
}

bounded_uint! {
    /// The 3-bit fragmentation control flags of IPv4.
    pub struct FragmentFlags(u8 : 3);
}

impl FragmentFlags {
    /// No flag is set.
    pub const NOT_SET: Self = Self(0);
    /// More fragments follow.
    pub const MORE_FRAGMENTS: Self = Self(1);
    /// The packet must not be fragmented.
    pub const DONT_FRAGMENT: Self = Self(2);

    /// A description of the flag value, or `"Error"` if it is not one of the three listed values.
    pub const fn as_str(&self) -> &'static str {
        match self.0 {
            0 => "Not set",
            1 => "More fragments (MF)",
            2 => "Don't fragment (DF)",
            _ => "Error",
        }
    }
}

bounded_uint! {
    /// The 13-bit offset of a fragment in units of 8 bytes.
    pub struct FragmentOffset(u16 : 13);
}

/// An IPv4 header without options, as specified in RFC 791.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Ipv4Header {
    /// The IP version, 4.
    pub version: Version,
    /// The length of the header in 32-bit words.
    pub ihl: Ihl,
    /// The differentiated services code point.
    pub dscp: Dscp,
    /// The explicit congestion notification.
    pub ecn: Ecn,
    /// The length of the header and the data in bytes.
    pub total_length: u16,
    /// Identifies the fragments of one datagram.
    pub identification: u16,
    /// The fragmentation control flags.
    pub flags: FragmentFlags,
    /// The offset of this fragment.
    pub fragment_offset: FragmentOffset,
    /// The remaining hop count.
    pub ttl: u8,
    /// The protocol of the payload.
    pub protocol: IpProtocol,
    /// The header checksum.
    pub checksum: u16,
    /// The destination and source addresses.
    pub address: ByEndpoint<Ipv4Addr>,
}

impl Ipv4Header {
    /// Length in bytes of an IPv4 header without options.
    pub const HEADER_LEN: usize = 20;

    /// The description of the fragmentation flags, such as `"Don't fragment (DF)"`.
    pub fn flags_str(&self) -> &'static str {
        self.flags.as_str()
    }

    /// The checksum as a hexadecimal string, such as `"0x2b51"`.
    pub fn checksum_hex(&self) -> String {
        hex_string(self.checksum.into(), u16::BITS)
    }

    /// The length of the header including options, as announced by [`Self::ihl`].
    pub fn header_length(&self) -> usize {
        usize::from(self.ihl.get()) * 4
    }

    /// Returns true if the header announces options following the fixed part.
    pub fn has_options(&self) -> bool {
        self.ihl > Ihl::MIN
    }

    /// Computes the header checksum, treating the stored checksum as zero.
    pub fn calculate_checksum(&self) -> u16 {
        let header = Self {
            checksum: 0,
            ..*self
        };
        ChecksumDigest::new()
            .add_slice(&header.encode_to_bytes())
            .checksum()
    }

    /// Clears then sets the checksum to the value returned by [`Self::calculate_checksum()`].
    pub fn set_checksum(&mut self) {
        self.checksum = self.calculate_checksum();
    }

    /// Returns true if the stored checksum successfully verifies, otherwise false.
    pub fn verify_checksum(&self) -> bool {
        ChecksumDigest::new()
            .add_slice(&self.encode_to_bytes())
            .checksum()
            == 0
    }
}

impl Header for Ipv4Header {
    const PROTOCOL: Protocol = Protocol::Ipv4;
    const LAYOUT: &'static HeaderLayout = &IPV4_LAYOUT;

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            u32::from(self.version).into(),
            u32::from(self.ihl).into(),
            u32::from(self.dscp).into(),
            u32::from(self.ecn).into(),
            self.total_length.into(),
            self.identification.into(),
            u32::from(self.flags).into(),
            u32::from(self.fragment_offset).into(),
            self.ttl.into(),
            u8::from(self.protocol).into(),
            self.checksum.into(),
            self.address.source.into(),
            self.address.destination.into(),
        ]
    }

    fn from_fields(fields: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            version: fields.uint()?,
            ihl: fields.uint()?,
            dscp: fields.uint()?,
            ecn: fields.uint()?,
            total_length: fields.uint()?,
            identification: fields.uint()?,
            flags: fields.uint()?,
            fragment_offset: fields.uint()?,
            ttl: fields.uint()?,
            protocol: fields.uint::<u8>()?.into(),
            checksum: fields.uint()?,
            address: ByEndpoint {
                source: fields.ipv4()?,
                destination: fields.ipv4()?,
            },
        })
    }

    fn from_any(header: &AnyHeader) -> Option<&Self> {
        match header {
            AnyHeader::Ipv4(header) => Some(header),
            _ => None,
        }
    }

    fn encapsulated_proto(&self) -> EncapsulatedProto {
        self.protocol.encapsulated()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use test_utils::param_test;

    use super::*;
    use crate::wire_encoding::WireDecode;

    const RAW: [u8; 20] = [
        0x45, 0x00, 0x00, 0x28, 0xec, 0x6c, 0x40, 0x00, 0x40, 0x06, 0x2b, 0x51, 0xc0, 0xa8, 0x01,
        0x60, 0xc0, 0xa8, 0x01, 0xfe,
    ];

    fn header() -> Ipv4Header {
        Ipv4Header {
            version: Version::IPV4,
            ihl: Ihl::MIN,
            dscp: Dscp::new(0).unwrap(),
            ecn: Ecn::new(0).unwrap(),
            total_length: 40,
            identification: 0xec6c,
            flags: FragmentFlags::DONT_FRAGMENT,
            fragment_offset: FragmentOffset::new(0).unwrap(),
            ttl: 64,
            protocol: IpProtocol::Tcp,
            checksum: 0x2b51,
            address: ByEndpoint {
                destination: Ipv4Addr::new(192, 168, 1, 254),
                source: Ipv4Addr::new(192, 168, 1, 96),
            },
        }
    }

    #[test]
    fn build() {
        let header = header();

        assert_eq!(header.checksum_hex(), "0x2b51");
        assert_eq!(header.flags_str(), "Don't fragment (DF)");
        assert_eq!(header.encapsulated_proto().as_str(), "TCP");
        assert_eq!(header.header_length(), 20);
        assert!(!header.has_options());
        assert_eq!(header.encode_to_bytes().as_ref(), RAW);
    }

    #[test]
    fn decode() -> test_utils::Result {
        let header = Ipv4Header::decode(&mut Bytes::from_static(&RAW))?;

        assert_eq!(header.version.get(), 4);
        assert_eq!(header.ihl.get(), 5);
        assert_eq!(header.dscp.get(), 0);
        assert_eq!(header.ecn.get(), 0);
        assert_eq!(header.total_length, 40);
        assert_eq!(header.identification, 0xec6c);
        assert_eq!(header.flags, FragmentFlags::DONT_FRAGMENT);
        assert_eq!(header.fragment_offset.get(), 0);
        assert_eq!(header.ttl, 64);
        assert_eq!(header.protocol, IpProtocol::Tcp);
        assert_eq!(header.checksum, 0x2b51);
        assert_eq!(header.address.source.to_string(), "192.168.1.96");
        assert_eq!(header.address.destination.to_string(), "192.168.1.254");
        assert_eq!(header, self::header());
        Ok(())
    }

    #[test]
    fn decode_packed_sub_byte_fields() -> test_utils::Result {
        let mut raw = RAW;
        raw[0] = 0x46;
        raw[1] = 0xb9;
        raw[6] = 0x3f;
        raw[7] = 0xff;

        let header = Ipv4Header::decode(&mut Bytes::copy_from_slice(&raw))?;

        assert_eq!(header.ihl.get(), 6);
        assert!(header.has_options());
        assert_eq!(header.dscp.get(), 0x2e);
        assert_eq!(header.ecn.get(), 1);
        assert_eq!(header.flags, FragmentFlags::MORE_FRAGMENTS);
        assert_eq!(header.fragment_offset, FragmentOffset::MAX);
        assert_eq!(header.encode_to_bytes().as_ref(), raw);
        Ok(())
    }

    param_test! {
        flag_descriptions: [
            dont_fragment: (2, "Don't fragment (DF)"),
            more_fragments: (1, "More fragments (MF)"),
            not_set: (0, "Not set"),
            reserved_bit: (4, "Error"),
            both: (3, "Error"),
        ]
    }
    fn flag_descriptions(flags: u8, expected: &str) {
        let header = Ipv4Header {
            flags: FragmentFlags::new(flags).unwrap(),
            ..header()
        };
        assert_eq!(header.flags_str(), expected);
    }

    #[test]
    fn unassigned_protocol_is_unknown() {
        let header = Ipv4Header {
            protocol: IpProtocol::from(253),
            ..header()
        };
        assert_eq!(header.encapsulated_proto().as_str(), "unknown");
    }

    mod checksum {
        use super::*;

        #[test]
        fn stored_checksum_of_fixture_does_not_verify() {
            assert!(!header().verify_checksum());
        }

        #[test]
        fn calculate_ignores_stored_checksum() {
            assert_eq!(header().calculate_checksum(), 0xc9b4);
        }

        #[test]
        fn set_then_verify() {
            let mut header = header();
            header.set_checksum();

            assert_eq!(header.checksum, 0xc9b4);
            assert_eq!(header.checksum_hex(), "0xc9b4");
            assert!(header.verify_checksum());
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            header().to_string(),
            "IPv4(version=4, ihl=5, dscp=0, ecn=0, len=40, id=60524, flags=2, offset=0, ttl=64, \
             proto=6, chksum=11089, src=192.168.1.96, dst=192.168.1.254)"
        );
    }
}
