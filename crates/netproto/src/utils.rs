//! Utils used internally in other modules.

/// This macro helps with creating enum types for header fields that carry well-known numeric
/// codes, such as EtherTypes or IP protocol numbers. It generates bidirectional [`From`]
/// implementations for the representation type, a catch-all variant for unassigned codes, and a
/// `name()` lookup into the symbolic table given by the `=> "label"` annotations.
///
/// Values are serialized as their numeric representation.
macro_rules! encoded_type {
    (
        $(#[$outer:meta])*
        pub enum $name:ident ($representation_type:ty) {
            $($(#[$doc:meta])* $variant:ident = $value:literal => $label:literal),*;
            $($(#[$doc_other:meta])* $variant_other:ident = $range:pat,)*
        }
    ) => {
        $(#[$outer])*
        #[non_exhaustive]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$doc])* $variant,)*
            $($(#[$doc_other])* $variant_other($representation_type),)*
        }

        impl $name {
            /// The symbolic name of the code, if it is in the table.
            pub const fn name(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($label),)*
                    $(Self::$variant_other(_) => None,)*
                }
            }
        }

        impl From<$representation_type> for $name {
            fn from(value: $representation_type) -> Self {
                match value {
                    $($value => Self::$variant,)*
                    #[allow(clippy::redundant_pattern)]
                    $(x@$range => Self::$variant_other(x),)*
                }
            }
        }

        impl From<$name> for $representation_type {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $value,)*
                    $($name::$variant_other(x) => x,)*
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serde::Serialize::serialize(&<$representation_type>::from(*self), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                <$representation_type as serde::Deserialize>::deserialize(deserializer).map(Self::from)
            }
        }
    };
}
pub(crate) use encoded_type;

/// Renders a value as a `0x`-prefixed, zero-padded, lower-case hexadecimal string with one digit
/// per started nibble of `bits`.
///
/// A 16-bit field always renders as four digits and a 9-bit field as three.
pub(crate) fn hex_string(value: u32, bits: u32) -> String {
    let digits = bits.div_ceil(4).max(1) as usize;
    format!("{:#0width$x}", value, width = digits + 2)
}
