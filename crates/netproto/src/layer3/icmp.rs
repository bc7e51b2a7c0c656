use crate::{
    layout::{DecodeError, FieldReader, FieldSpec, FieldValue, HeaderLayout},
    protocol::{AnyHeader, Header, Protocol},
    utils::hex_string,
};

const UNKNOWN_TYPE: &str = "Unknown, Unassigned or Deprecated";

/// The name of an ICMPv4 message type, as listed by IANA.
pub const fn icmpv4_type_name(message_type: u8) -> Option<&'static str> {
    Some(match message_type {
        0 => "Echo reply",
        3 => "Destination Unreachable",
        4 => "Source Quench",
        5 => "Redirect Message",
        8 => "Echo Request",
        9 => "Router Advertisement",
        10 => "Router Solicitation",
        11 => "Time Exceeded",
        12 => "Parameter Problem: Bad IP Header",
        13 => "Timestamp",
        14 => "Timestamp Reply",
        15 => "Information Request",
        16 => "Information Reply",
        17 => "Address Mask Request",
        18 => "Address Mask Reply",
        30 => "Traceroute",
        42 => "Extended Echo Request",
        43 => "Extended Echo Reply",
        _ => return None,
    })
}

/// The name of an ICMPv6 message type, as listed by IANA.
pub const fn icmpv6_type_name(message_type: u8) -> Option<&'static str> {
    Some(match message_type {
        1 => "Destination Unreachable",
        2 => "Packet Too Big",
        3 => "Time Exceeded",
        4 => "Parameter Problem",
        100 | 101 | 200 | 201 => "Private Experimentation",
        127 => "Reserved for Expansion of ICMPv6 Error Messages",
        128 => "Echo Request",
        129 => "Echo Reply",
        130 => "Multicast Listener Query",
        131 => "Multicast Listener Report",
        132 => "Multicast Listener Done",
        133 => "Router Solicitation",
        134 => "Router Advertisement",
        135 => "Neighbor Solicitation",
        136 => "Neighbor Advertisement",
        137 => "Redirect Message",
        138 => "Router Renumbering",
        139 => "ICMP Node Information Query",
        140 => "ICMP Node Information Response",
        141 => "Inverse Neighbor Discovery Solicitation Message",
        142 => "Inverse Neighbor Discovery Advertisement Message",
        143 => "Multicast Listener Discovery reports",
        144 => "Home Agent Address Discovery Request Message",
        145 => "Home Agent Address Discovery Reply Message",
        146 => "Mobile Prefix Solicitation",
        147 => "Mobile Prefix Advertisement",
        148 => "Certification Path Solicitation",
        149 => "Certification Path Advertisement",
        151 => "Multicast Router Advertisement",
        152 => "Multicast Router Solicitation",
        153 => "Multicast Router Termination",
        155 => "RPL Control Message",
        255 => "Reserved for Expansion of ICMPv6 Informational Messages",
        _ => return None,
    })
}

// Both ICMP versions share the first eight bytes: type, code, checksum, and four bytes whose
// meaning depends on the type.
macro_rules! icmp_header {
    (
        $(#[$outer:meta])*
        pub struct $name:ident {
            protocol: $protocol:ident,
            layout: $layout:ident = $layout_name:literal,
            type_names: $type_names:ident,
            $(#[$trailer_doc:meta])*
            $trailer:ident: $trailer_name:literal,
        }
    ) => {
        const $layout: HeaderLayout = HeaderLayout {
            name: $layout_name,
            header_len: $name::HEADER_LEN,
            fields: &[
                FieldSpec::u8("type"),
                FieldSpec::u8("code"),
                FieldSpec::u16("chksum"),
                FieldSpec::opaque($trailer_name, 4),
            ],
        };

        const _: () = assert!($layout.is_well_formed());

        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            /// The type of the message.
            pub message_type: u8,
            /// The subtype of the message.
            pub code: u8,
            /// The checksum over the message.
            pub checksum: u16,
            $(#[$trailer_doc])*
            pub $trailer: [u8; 4],
        }

        impl $name {
            /// Length in bytes of the header.
            pub const HEADER_LEN: usize = 8;

            /// The name of the message type, or `"Unknown, Unassigned or Deprecated"`.
            pub fn type_str(&self) -> &'static str {
                match $type_names(self.message_type) {
                    Some(name) => name,
                    None => UNKNOWN_TYPE,
                }
            }

            /// The checksum as a hexadecimal string, such as `"0x83f7"`.
            pub fn checksum_hex(&self) -> String {
                hex_string(self.checksum.into(), u16::BITS)
            }
        }

        impl Header for $name {
            const PROTOCOL: Protocol = Protocol::$protocol;
            const LAYOUT: &'static HeaderLayout = &$layout;

            fn to_fields(&self) -> Vec<FieldValue> {
                vec![
                    self.message_type.into(),
                    self.code.into(),
                    self.checksum.into(),
                    FieldValue::Opaque(self.$trailer.to_vec().into()),
                ]
            }

            fn from_fields(fields: &mut FieldReader) -> Result<Self, DecodeError> {
                Ok(Self {
                    message_type: fields.uint()?,
                    code: fields.uint()?,
                    checksum: fields.uint()?,
                    $trailer: fields.opaque()?,
                })
            }

            fn from_any(header: &AnyHeader) -> Option<&Self> {
                match header {
                    AnyHeader::$protocol(header) => Some(header),
                    _ => None,
                }
            }
        }
    };
}

icmp_header! {
    /// An ICMP header for IPv4, as specified in RFC 792.
    pub struct Icmpv4Header {
        protocol: Icmpv4,
        layout: ICMPV4_LAYOUT = "ICMPv4",
        type_names: icmpv4_type_name,
        /// The rest of the header, whose contents vary with the message type.
        rest: "rest",
    }
}

icmp_header! {
    /// An ICMP header for IPv6, as specified in RFC 4443.
    pub struct Icmpv6Header {
        protocol: Icmpv6,
        layout: ICMPV6_LAYOUT = "ICMPv6",
        type_names: icmpv6_type_name,
        /// The start of the message body, which is not interpreted further.
        body: "m_body",
    }
}
