//! Table-driven layouts of fixed-length protocol headers.
//!
//! A [`HeaderLayout`] lists the fields of a header in wire order. Integer fields are backed by an
//! 8, 16, or 32-bit storage word, and consecutive integer fields sharing one word are packed
//! most-significant-bit first in declaration order: a 4-bit version followed by a 4-bit header
//! length occupy the high and the low nibble of a single byte. Addresses and opaque blocks are
//! byte aligned. Everything is big-endian.
//!
//! Layouts are plain constants and can be checked at compile time with
//! [`HeaderLayout::is_well_formed`]. Every header of this crate does so.

use std::{
    fmt::{self, Display, Formatter},
    iter::Zip,
    net::{Ipv4Addr, Ipv6Addr},
    slice,
    vec,
};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    address::{CanonicalIpv6, MacAddr},
    utils::hex_string,
};

mod error;
pub use error::{DecodeError, EncodeError};

/// The integer word backing one or more bit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageWord {
    /// A single byte.
    U8,
    /// A big-endian 16-bit word.
    U16,
    /// A big-endian 32-bit word.
    U32,
}

impl StorageWord {
    /// The size of the word in bits.
    pub const fn bits(self) -> u32 {
        match self {
            StorageWord::U8 => 8,
            StorageWord::U16 => 16,
            StorageWord::U32 => 32,
        }
    }

    /// The size of the word in bytes.
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }
}

/// How a field is represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// An unsigned integer of `width` bits inside a storage word.
    Bits {
        /// The width of the field in bits.
        width: u32,
        /// The word the field is packed into.
        word: StorageWord,
    },
    /// A 6-byte MAC address.
    Mac,
    /// A 4-byte IPv4 address.
    Ipv4,
    /// A 16-byte IPv6 address.
    Ipv6,
    /// A block of the given number of bytes that is not interpreted further.
    Opaque(usize),
}

impl FieldKind {
    /// The number of bits the field occupies on the wire.
    pub const fn bits(&self) -> u32 {
        match self {
            FieldKind::Bits { width, .. } => *width,
            FieldKind::Mac => 48,
            FieldKind::Ipv4 => 32,
            FieldKind::Ipv6 => 128,
            FieldKind::Opaque(length) => *length as u32 * 8,
        }
    }
}

/// A named field of a [`HeaderLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    /// The name of the field, used when rendering headers.
    pub name: &'static str,
    /// The wire representation of the field.
    pub kind: FieldKind,
}

impl FieldSpec {
    /// A bit field of `width` bits packed into a `word`.
    pub const fn bits(name: &'static str, width: u32, word: StorageWord) -> Self {
        Self {
            name,
            kind: FieldKind::Bits { width, word },
        }
    }

    /// A field filling a whole byte.
    pub const fn u8(name: &'static str) -> Self {
        Self::bits(name, 8, StorageWord::U8)
    }

    /// A field filling a whole 16-bit word.
    pub const fn u16(name: &'static str) -> Self {
        Self::bits(name, 16, StorageWord::U16)
    }

    /// A field filling a whole 32-bit word.
    pub const fn u32(name: &'static str) -> Self {
        Self::bits(name, 32, StorageWord::U32)
    }

    /// A MAC address field.
    pub const fn mac(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Mac,
        }
    }

    /// An IPv4 address field.
    pub const fn ipv4(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Ipv4,
        }
    }

    /// An IPv6 address field.
    pub const fn ipv6(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Ipv6,
        }
    }

    /// An uninterpreted block of `length` bytes.
    pub const fn opaque(name: &'static str, length: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Opaque(length),
        }
    }

    /// Renders a value of this field as zero-padded hexadecimal with one digit per started
    /// nibble of the field's width.
    ///
    /// # Examples
    ///
    /// ```
    /// # use netproto::layout::{FieldSpec, StorageWord};
    /// assert_eq!(FieldSpec::u16("checksum").render_hex(0x2b51), "0x2b51");
    /// assert_eq!(FieldSpec::bits("flags", 9, StorageWord::U16).render_hex(0x18), "0x018");
    /// ```
    pub fn render_hex(&self, value: u32) -> String {
        hex_string(value, self.kind.bits())
    }
}

const fn mask(width: u32) -> u64 {
    (1u64 << width) - 1
}

/// The static description of a fixed-length header.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HeaderLayout {
    /// The display name of the protocol.
    pub name: &'static str,
    /// The length of the header in bytes.
    pub header_len: usize,
    /// The fields of the header in wire order.
    pub fields: &'static [FieldSpec],
}

impl HeaderLayout {
    /// Returns true if the bit fields sharing a storage word exactly fill it, no word is left
    /// open at a byte-aligned field or at the end, and all fields add up to `header_len`.
    pub const fn is_well_formed(&self) -> bool {
        let mut total_bits = 0usize;
        let mut open_word_bits = 0u32;
        let mut used_bits = 0u32;

        let mut index = 0;
        while index < self.fields.len() {
            match self.fields[index].kind {
                FieldKind::Bits { width, word } => {
                    if width == 0 {
                        return false;
                    }
                    if open_word_bits == 0 {
                        open_word_bits = word.bits();
                        used_bits = 0;
                    } else if open_word_bits != word.bits() {
                        return false;
                    }

                    used_bits += width;
                    if used_bits > open_word_bits {
                        return false;
                    }
                    if used_bits == open_word_bits {
                        total_bits += open_word_bits as usize;
                        open_word_bits = 0;
                    }
                }
                kind => {
                    if open_word_bits != 0 {
                        return false;
                    }
                    total_bits += kind.bits() as usize;
                }
            }
            index += 1;
        }

        open_word_bits == 0 && total_bits == self.header_len * 8
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Decodes the values of all fields from the front of `data`.
    ///
    /// Exactly `header_len` bytes are consumed. If fewer are available, an error naming the
    /// layout is returned and `data` is not advanced.
    pub fn unpack<T: Buf>(&self, data: &mut T) -> Result<Vec<FieldValue>, DecodeError> {
        if data.remaining() < self.header_len {
            tracing::debug!(
                layout = self.name,
                expected = self.header_len,
                actual = data.remaining(),
                "input is shorter than the header"
            );
            return Err(DecodeError::HeaderTruncated {
                layout: self.name,
                expected: self.header_len,
                actual: data.remaining(),
            });
        }

        let mut header = data.copy_to_bytes(self.header_len);
        let mut values = Vec::with_capacity(self.fields.len());
        let mut word = 0u64;
        let mut bits_left = 0u32;

        for field in self.fields {
            let value = match field.kind {
                FieldKind::Bits {
                    width,
                    word: storage,
                } => {
                    if bits_left == 0 {
                        word = header.get_uint(storage.bytes());
                        bits_left = storage.bits();
                    }
                    bits_left -= width;
                    FieldValue::Uint(((word >> bits_left) & mask(width)) as u32)
                }
                FieldKind::Mac => {
                    let mut octets = [0u8; MacAddr::LENGTH];
                    header.copy_to_slice(&mut octets);
                    FieldValue::Mac(octets.into())
                }
                FieldKind::Ipv4 => FieldValue::Ipv4(header.get_u32().into()),
                FieldKind::Ipv6 => FieldValue::Ipv6(header.get_u128().into()),
                FieldKind::Opaque(length) => FieldValue::Opaque(header.split_to(length)),
            };
            values.push(value);
        }

        Ok(values)
    }

    /// Encodes one value per field, in layout order, to the buffer.
    ///
    /// Exactly `header_len` bytes are written on success. Nothing is written on failure.
    pub fn pack<T: BufMut>(
        &self,
        values: &[FieldValue],
        buffer: &mut T,
    ) -> Result<(), EncodeError> {
        if buffer.remaining_mut() < self.header_len {
            return Err(EncodeError::InadequateBufferSize);
        }
        if values.len() != self.fields.len() {
            return Err(self.encode_mismatch("*"));
        }

        let mut header = BytesMut::with_capacity(self.header_len);
        let mut word = 0u64;
        let mut bits_left = 0u32;

        for (field, value) in self.fields.iter().zip(values) {
            match (field.kind, value) {
                (
                    FieldKind::Bits {
                        width,
                        word: storage,
                    },
                    FieldValue::Uint(value),
                ) => {
                    if u64::from(*value) > mask(width) {
                        return Err(EncodeError::ValueOutOfRange {
                            layout: self.name,
                            field: field.name,
                            value: *value,
                            bits: width,
                        });
                    }
                    if bits_left == 0 {
                        bits_left = storage.bits();
                        word = 0;
                    }
                    bits_left -= width;
                    word |= u64::from(*value) << bits_left;
                    if bits_left == 0 {
                        header.put_uint(word, storage.bytes());
                    }
                }
                (FieldKind::Mac, FieldValue::Mac(mac)) => header.put_slice(&mac.octets()),
                (FieldKind::Ipv4, FieldValue::Ipv4(address)) => header.put_slice(&address.octets()),
                (FieldKind::Ipv6, FieldValue::Ipv6(address)) => header.put_slice(&address.octets()),
                (FieldKind::Opaque(length), FieldValue::Opaque(bytes)) if bytes.len() == length => {
                    header.put_slice(bytes)
                }
                _ => return Err(self.encode_mismatch(field.name)),
            }
        }

        buffer.put_slice(&header);
        Ok(())
    }

    fn encode_mismatch(&self, field: &'static str) -> EncodeError {
        EncodeError::FieldMismatch {
            layout: self.name,
            field,
        }
    }

    /// Writes the values as `Name(field=value, ...)`.
    pub(crate) fn fmt_fields(&self, values: &[FieldValue], f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, (field, value)) in self.fields.iter().zip(values).enumerate() {
            if index != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", field.name, value)?;
        }
        f.write_str(")")
    }
}

/// The value of a single header field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// An unsigned integer of at most 32 bits.
    Uint(u32),
    /// A MAC address.
    Mac(MacAddr),
    /// An IPv4 address.
    Ipv4(Ipv4Addr),
    /// An IPv6 address.
    Ipv6(Ipv6Addr),
    /// An uninterpreted block of bytes.
    Opaque(Bytes),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Uint(value) => write!(f, "{}", value),
            FieldValue::Mac(mac) => write!(f, "{}", mac),
            FieldValue::Ipv4(address) => write!(f, "{}", address),
            FieldValue::Ipv6(address) => write!(f, "{}", CanonicalIpv6(*address)),
            FieldValue::Opaque(bytes) => {
                f.write_str("0x")?;
                bytes.iter().try_for_each(|byte| write!(f, "{:02x}", byte))
            }
        }
    }
}

macro_rules! impl_from_for_field_value {
    ($($type:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$type> for FieldValue {
                fn from(value: $type) -> Self {
                    FieldValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_field_value! {
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    MacAddr => Mac,
    Ipv4Addr => Ipv4,
    Ipv6Addr => Ipv6,
    Bytes => Opaque,
}

/// Hands out the decoded values of a layout, in order, as typed values.
///
/// Used by typed headers to build themselves from the output of [`HeaderLayout::unpack`].
pub struct FieldReader {
    layout: &'static HeaderLayout,
    fields: Zip<slice::Iter<'static, FieldSpec>, vec::IntoIter<FieldValue>>,
}

impl FieldReader {
    /// Creates a reader over the values decoded for `layout`.
    pub fn new(layout: &'static HeaderLayout, values: Vec<FieldValue>) -> Self {
        Self {
            layout,
            fields: layout.fields.iter().zip(values),
        }
    }

    fn next(&mut self) -> Result<(&'static FieldSpec, FieldValue), DecodeError> {
        self.fields.next().ok_or(DecodeError::FieldMismatch {
            layout: self.layout.name,
            field: "*",
        })
    }

    fn mismatch(&self, field: &'static FieldSpec) -> DecodeError {
        DecodeError::FieldMismatch {
            layout: self.layout.name,
            field: field.name,
        }
    }

    /// Reads the next field as an integer type.
    pub fn uint<U: TryFrom<u32>>(&mut self) -> Result<U, DecodeError> {
        match self.next()? {
            (field, FieldValue::Uint(value)) => {
                U::try_from(value).map_err(|_| self.mismatch(field))
            }
            (field, _) => Err(self.mismatch(field)),
        }
    }

    /// Reads the next field as a MAC address.
    pub fn mac(&mut self) -> Result<MacAddr, DecodeError> {
        match self.next()? {
            (_, FieldValue::Mac(mac)) => Ok(mac),
            (field, _) => Err(self.mismatch(field)),
        }
    }

    /// Reads the next field as an IPv4 address.
    pub fn ipv4(&mut self) -> Result<Ipv4Addr, DecodeError> {
        match self.next()? {
            (_, FieldValue::Ipv4(address)) => Ok(address),
            (field, _) => Err(self.mismatch(field)),
        }
    }

    /// Reads the next field as an IPv6 address.
    pub fn ipv6(&mut self) -> Result<Ipv6Addr, DecodeError> {
        match self.next()? {
            (_, FieldValue::Ipv6(address)) => Ok(address),
            (field, _) => Err(self.mismatch(field)),
        }
    }

    /// Reads the next field as a fixed-size byte array.
    pub fn opaque<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        match self.next()? {
            (field, FieldValue::Opaque(bytes)) => {
                <[u8; N]>::try_from(bytes.as_ref()).map_err(|_| self.mismatch(field))
            }
            (field, _) => Err(self.mismatch(field)),
        }
    }
}
