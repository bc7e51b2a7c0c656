use bitflags::bitflags;

use crate::{
    layout::{DecodeError, FieldReader, FieldSpec, FieldValue, HeaderLayout, StorageWord},
    protocol::{AnyHeader, ByEndpoint, Header, Protocol},
    utils::hex_string,
    wire_encoding::bounded_uint,
};

const TCP_LAYOUT: HeaderLayout = HeaderLayout {
    name: "TCP",
    header_len: TcpHeader::HEADER_LEN,
    fields: &[
        FieldSpec::u16("sport"),
        FieldSpec::u16("dport"),
        FieldSpec::u32("seq"),
        FieldSpec::u32("ack"),
        FieldSpec::bits("offset", 4, StorageWord::U16),
        FieldSpec::bits("reserved", 3, StorageWord::U16),
        FieldSpec::bits("flags", TcpFlags::BITS, StorageWord::U16),
        FieldSpec::u16("window"),
        FieldSpec::u16("chksum"),
        FieldSpec::u16("urg"),
    ],
};

const _: () = assert!(TCP_LAYOUT.is_well_formed());

bounded_uint! {
    /// The length of a TCP header in 32-bit words.
    pub struct DataOffset(u8 : 4);
}

impl DataOffset {
    /// The length of a header without options.
    pub const MIN: Self = Self(5);
}

bounded_uint! {
    /// The three reserved bits between the data offset and the flags.
    pub struct TcpReserved(u8 : 3);
}

bitflags! {
    /// The control bits of a TCP header.
    ///
    /// Flags are declared from the least significant bit upwards, which is also the order in
    /// which [`TcpHeader::flags_str`] lists them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct TcpFlags: u16 {
        /// No more data from the sender.
        const FIN = 1 << 0;
        /// Synchronize sequence numbers.
        const SYN = 1 << 1;
        /// Reset the connection.
        const RST = 1 << 2;
        /// Push buffered data to the application.
        const PSH = 1 << 3;
        /// The acknowledgement number is significant.
        const ACK = 1 << 4;
        /// The urgent pointer is significant.
        const URG = 1 << 5;
        /// ECN echo.
        const ECE = 1 << 6;
        /// Congestion window reduced.
        const CWR = 1 << 7;
        /// ECN nonce concealment protection.
        const NS = 1 << 8;
    }
}

impl TcpFlags {
    /// The width of the flags field in bits.
    pub const BITS: u32 = 9;

    /// The flags as they appear on the wire, without any bits outside the nine known flags.
    pub const fn wire_bits(&self) -> u16 {
        self.bits() & Self::all().bits()
    }
}

// Bits that do not name a flag cannot be represented in the 9-bit field.
fn deserialize_known_flags<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<TcpFlags, D::Error> {
    let flags = <TcpFlags as serde::Deserialize>::deserialize(deserializer)?;
    TcpFlags::from_bits(flags.bits()).ok_or_else(|| {
        serde::de::Error::custom(format_args!(
            "flags {:#05x} do not fit in {} bits",
            flags.bits(),
            TcpFlags::BITS
        ))
    })
}

/// A TCP header without options, as specified in RFC 793.
///
/// Options announced by a data offset above [`DataOffset::MIN`] are not part of the header and
/// stay in the buffer after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TcpHeader {
    /// The destination and source ports.
    pub port: ByEndpoint<u16>,
    /// The sequence number of the first data byte.
    pub sequence_number: u32,
    /// The next sequence number expected by the sender, if ACK is set.
    pub acknowledgement_number: u32,
    /// The length of the header including options in 32-bit words.
    pub data_offset: DataOffset,
    /// Reserved bits, which should be zero.
    pub reserved: TcpReserved,
    /// The control bits.
    ///
    /// Bits outside [`TcpFlags::all()`] are ignored when encoding and rejected when
    /// deserializing.
    #[serde(deserialize_with = "deserialize_known_flags")]
    pub flags: TcpFlags,
    /// The size of the receive window.
    pub window: u16,
    /// The checksum over the pseudo-header, the header, and the data.
    pub checksum: u16,
    /// The offset of the last urgent data byte, if URG is set.
    pub urgent_pointer: u16,
}

impl TcpHeader {
    /// Length in bytes of a TCP header without options.
    pub const HEADER_LEN: usize = 20;

    /// The names of the set flags separated by spaces, least significant flag first, such as
    /// `"PSH ACK"`.
    pub fn flags_str(&self) -> String {
        self.flags
            .iter_names()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The flags as a three-digit hexadecimal string, such as `"0x018"`.
    pub fn flags_hex(&self) -> String {
        hex_string(self.flags.wire_bits().into(), TcpFlags::BITS)
    }

    /// The checksum as a hexadecimal string.
    pub fn checksum_hex(&self) -> String {
        hex_string(self.checksum.into(), u16::BITS)
    }

    /// The length of the header including options, as announced by [`Self::data_offset`].
    pub fn header_length(&self) -> usize {
        usize::from(self.data_offset.get()) * 4
    }

    /// Returns true if options follow the fixed part of the header.
    pub fn has_options(&self) -> bool {
        self.data_offset > DataOffset::MIN
    }
}

impl Header for TcpHeader {
    const PROTOCOL: Protocol = Protocol::Tcp;
    const LAYOUT: &'static HeaderLayout = &TCP_LAYOUT;

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            self.port.source.into(),
            self.port.destination.into(),
            self.sequence_number.into(),
            self.acknowledgement_number.into(),
            u32::from(self.data_offset).into(),
            u32::from(self.reserved).into(),
            self.flags.wire_bits().into(),
            self.window.into(),
            self.checksum.into(),
            self.urgent_pointer.into(),
        ]
    }

    fn from_fields(fields: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            port: ByEndpoint {
                source: fields.uint()?,
                destination: fields.uint()?,
            },
            sequence_number: fields.uint()?,
            acknowledgement_number: fields.uint()?,
            data_offset: fields.uint()?,
            reserved: fields.uint()?,
            flags: TcpFlags::from_bits_truncate(fields.uint()?),
            window: fields.uint()?,
            checksum: fields.uint()?,
            urgent_pointer: fields.uint()?,
        })
    }

    fn from_any(header: &AnyHeader) -> Option<&Self> {
        match header {
            AnyHeader::Tcp(header) => Some(header),
            _ => None,
        }
    }
}
