use crate::{
    layout::{DecodeError, FieldReader, FieldSpec, FieldValue, HeaderLayout},
    protocol::{AnyHeader, ByEndpoint, Header, Protocol},
    utils::hex_string,
};

const UDP_LAYOUT: HeaderLayout = HeaderLayout {
    name: "UDP",
    header_len: UdpHeader::HEADER_LEN,
    fields: &[
        FieldSpec::u16("sport"),
        FieldSpec::u16("dport"),
        FieldSpec::u16("len"),
        FieldSpec::u16("chksum"),
    ],
};

const _: () = assert!(UDP_LAYOUT.is_well_formed());

/// Raised when a UDP header cannot describe a datagram.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum UdpEncodeError {
    /// The payload and the header together exceed the 16-bit length field.
    #[error("payload of {0} bytes is too large for a UDP datagram")]
    PayloadTooLarge(usize),
}

/// A UDP header, as specified in RFC 768.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct UdpHeader {
    /// The destination and source ports.
    pub port: ByEndpoint<u16>,
    /// The length of the header and the data in bytes.
    pub length: u16,
    /// The checksum, zero if unused over IPv4.
    pub checksum: u16,
}

impl UdpHeader {
    /// Length in bytes of the UDP header.
    pub const HEADER_LEN: usize = 8;

    /// Creates a header for a datagram carrying `payload_length` bytes, with no checksum.
    ///
    /// Returns an error if the length of the datagram does not fit in 16 bits.
    pub fn new(
        source: u16,
        destination: u16,
        payload_length: usize,
    ) -> Result<Self, UdpEncodeError> {
        let length = payload_length
            .checked_add(Self::HEADER_LEN)
            .and_then(|length| u16::try_from(length).ok())
            .ok_or(UdpEncodeError::PayloadTooLarge(payload_length))?;

        Ok(Self {
            port: ByEndpoint {
                destination,
                source,
            },
            length,
            checksum: 0,
        })
    }

    /// The checksum as a hexadecimal string.
    pub fn checksum_hex(&self) -> String {
        hex_string(self.checksum.into(), u16::BITS)
    }
}

impl Header for UdpHeader {
    const PROTOCOL: Protocol = Protocol::Udp;
    const LAYOUT: &'static HeaderLayout = &UDP_LAYOUT;

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            self.port.source.into(),
            self.port.destination.into(),
            self.length.into(),
            self.checksum.into(),
        ]
    }

    fn from_fields(fields: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            port: ByEndpoint {
                source: fields.uint()?,
                destination: fields.uint()?,
            },
            length: fields.uint()?,
            checksum: fields.uint()?,
        })
    }

    fn from_any(header: &AnyHeader) -> Option<&Self> {
        match header {
            AnyHeader::Udp(header) => Some(header),
            _ => None,
        }
    }
}
