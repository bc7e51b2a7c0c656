use std::net::Ipv4Addr;

use super::EtherType;
use crate::{
    address::MacAddr,
    layout::{DecodeError, FieldReader, FieldSpec, FieldValue, HeaderLayout},
    protocol::{AnyHeader, Header, Protocol},
    utils::{encoded_type, hex_string},
};

const ARP_LAYOUT: HeaderLayout = HeaderLayout {
    name: "ARP",
    header_len: ArpHeader::HEADER_LEN,
    fields: &[
        FieldSpec::u16("htype"),
        FieldSpec::u16("ptype"),
        FieldSpec::u8("hlen"),
        FieldSpec::u8("plen"),
        FieldSpec::u16("oper"),
        FieldSpec::mac("sha"),
        FieldSpec::ipv4("spa"),
        FieldSpec::mac("tha"),
        FieldSpec::ipv4("tpa"),
    ],
};

const _: () = assert!(ARP_LAYOUT.is_well_formed());

encoded_type!(
    /// The operation of an ARP message.
    pub enum ArpOperation(u16) {
        /// Asks for the hardware address of the target.
        Request = 1 => "request",
        /// Answers a request.
        Reply = 2 => "reply";
        /// Any other operation code.
        Other = 0..=u16::MAX,
    }
);

/// An ARP message for IPv4 over Ethernet, as specified in RFC 826.
///
/// The hardware and protocol types and lengths are carried as-is, but the addresses always have
/// the MAC-48 and IPv4 formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ArpHeader {
    /// The link-layer protocol type, 1 for Ethernet.
    pub hardware_type: u16,
    /// The protocol whose addresses are resolved.
    pub protocol_type: EtherType,
    /// The length of a hardware address in bytes.
    pub hardware_length: u8,
    /// The length of a protocol address in bytes.
    pub protocol_length: u8,
    /// Whether this is a request or a reply.
    pub operation: ArpOperation,
    /// The hardware address of the sender.
    pub sender_hardware_address: MacAddr,
    /// The protocol address of the sender.
    pub sender_protocol_address: Ipv4Addr,
    /// The hardware address of the target, all zeros in a request.
    pub target_hardware_address: MacAddr,
    /// The protocol address of the target.
    pub target_protocol_address: Ipv4Addr,
}

impl ArpHeader {
    /// Length in bytes of the ARP header.
    pub const HEADER_LEN: usize = 28;

    /// Hardware type of Ethernet.
    pub const HARDWARE_TYPE_ETHERNET: u16 = 1;

    /// Creates a message resolving IPv4 addresses over Ethernet.
    pub fn new_ipv4_over_ethernet(
        operation: ArpOperation,
        sender: (MacAddr, Ipv4Addr),
        target: (MacAddr, Ipv4Addr),
    ) -> Self {
        Self {
            hardware_type: Self::HARDWARE_TYPE_ETHERNET,
            protocol_type: EtherType::Ipv4,
            hardware_length: MacAddr::LENGTH as u8,
            protocol_length: 4,
            operation,
            sender_hardware_address: sender.0,
            sender_protocol_address: sender.1,
            target_hardware_address: target.0,
            target_protocol_address: target.1,
        }
    }

    /// The name of the operation, or `"Error"` for codes other than request and reply.
    pub fn operation_str(&self) -> &'static str {
        self.operation.name().unwrap_or("Error")
    }

    /// The name of the protocol type, or `"unknown"` for unlisted EtherTypes.
    pub fn protocol_type_str(&self) -> &'static str {
        self.protocol_type.name().unwrap_or("unknown")
    }

    /// The protocol type as a hexadecimal string, such as `"0x0800"`.
    pub fn protocol_type_hex(&self) -> String {
        hex_string(u16::from(self.protocol_type).into(), u16::BITS)
    }
}

impl Header for ArpHeader {
    const PROTOCOL: Protocol = Protocol::Arp;
    const LAYOUT: &'static HeaderLayout = &ARP_LAYOUT;

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            self.hardware_type.into(),
            u16::from(self.protocol_type).into(),
            self.hardware_length.into(),
            self.protocol_length.into(),
            u16::from(self.operation).into(),
            self.sender_hardware_address.into(),
            self.sender_protocol_address.into(),
            self.target_hardware_address.into(),
            self.target_protocol_address.into(),
        ]
    }

    fn from_fields(fields: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            hardware_type: fields.uint()?,
            protocol_type: fields.uint::<u16>()?.into(),
            hardware_length: fields.uint()?,
            protocol_length: fields.uint()?,
            operation: fields.uint::<u16>()?.into(),
            sender_hardware_address: fields.mac()?,
            sender_protocol_address: fields.ipv4()?,
            target_hardware_address: fields.mac()?,
            target_protocol_address: fields.ipv4()?,
        })
    }

    fn from_any(header: &AnyHeader) -> Option<&Self> {
        match header {
            AnyHeader::Arp(header) => Some(header),
            _ => None,
        }
    }
}
