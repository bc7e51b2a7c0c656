//! Traits for decoding headers from, and encoding them to, their wire format.

use bytes::{BufMut, Bytes, BytesMut};

/// A trait for types decodable from a wire format, without any additional information.
pub trait WireDecode<T>: Sized {
    /// The error type returned on a failed decode.
    type Error;

    /// Decodes an object from the provided data, such as a [`bytes::Buf`].
    ///
    /// The buffer is advanced by exactly as many bytes as the object occupies on the wire. If the
    /// buffer holds fewer bytes than that, it is left untouched.
    fn decode(data: &mut T) -> Result<Self, Self::Error>;
}

/// A trait for types encodable to a wire format.
pub trait WireEncode {
    /// The error type returned on a failed encode.
    type Error: std::fmt::Debug;

    /// The number of bytes written by a successful call to [`Self::encode_to`].
    fn encoded_length(&self) -> usize;

    /// Writes the wire format of the object to the buffer.
    fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error>;

    /// Encodes the object into a newly allocated, exactly sized [`Bytes`].
    ///
    /// # Panics
    ///
    /// Panics if the object cannot be encoded for reasons other than buffer space, which only
    /// happens if a header disagrees with its own layout table.
    fn encode_to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.encoded_length());
        self.encode_to(&mut buffer)
            .expect("headers always match their layout and BytesMut grows as needed");
        buffer.freeze()
    }
}

macro_rules! bounded_uint {
    (
        $(#[$outer:meta])*
        pub struct $name:ident($type:ty : $bits:literal);
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
        pub struct $name($type);

        impl $name {
            /// The number of bits useable for an instance of this type.
            pub const BITS: u32 = $bits;

            /// The maximum possible value for an instance of this type.
            pub const MAX: Self = Self(((1u64 << $bits) - 1) as $type);

            /// Create a new instance if the value is at most `Self::MAX.get()`.
            pub const fn new(value: $type) -> Option<Self> {
                if value <= Self::MAX.0 {
                    Some(Self(value))
                } else {
                    None
                }
            }

            /// Get the value of this instance as its underlying type.
            #[inline]
            pub const fn get(&self) -> $type {
                self.0
            }
        }

        impl TryFrom<u32> for $name {
            type Error = $crate::wire_encoding::ValueOutOfRange;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                <$type>::try_from(value)
                    .ok()
                    .and_then(Self::new)
                    .ok_or($crate::wire_encoding::ValueOutOfRange { value, bits: $bits })
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0.into()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serde::Serialize::serialize(&self.0, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <$type as serde::Deserialize>::deserialize(deserializer)?;
                Self::new(value).ok_or_else(|| {
                    serde::de::Error::custom(format_args!("{} does not fit in {} bits", value, $bits))
                })
            }
        }
    };
}
pub(crate) use bounded_uint;

/// Raised when an integer does not fit the bit width of a header field.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
#[error("value {value} does not fit in {bits} bits")]
pub struct ValueOutOfRange {
    /// The rejected value.
    pub value: u32,
    /// The width of the field in bits.
    pub bits: u32,
}
