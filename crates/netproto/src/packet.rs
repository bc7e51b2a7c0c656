//! Packets composed of a stack of protocol headers.
//!
//! A [`Packet`] holds at most one header per registered [`Protocol`], ordered from the outermost
//! to the innermost layer. It is either composed from headers built by the caller, or dissected
//! from raw bytes by following the encapsulated protocol of each layer.

use std::fmt::{self, Display, Formatter};

use bytes::{Buf, BufMut, Bytes};

use crate::{
    layout::EncodeError,
    protocol::{AnyHeader, Header, Protocol},
    wire_encoding::WireEncode,
};

mod error;
pub use error::PacketBuildError;

/// An ordered stack of headers with at most one header per protocol.
///
/// # Examples
///
/// ```
/// # use std::net::Ipv4Addr;
/// # use netproto::{
/// #     address::MacAddr,
/// #     layer2::{ArpHeader, ArpOperation, EtherType, EthernetHeader},
/// #     packet::Packet,
/// # };
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sender: MacAddr = "00:07:0d:af:f4:54".parse()?;
/// let packet = Packet::new([
///     EthernetHeader::new(MacAddr::BROADCAST, sender, EtherType::Arp).into(),
///     ArpHeader::new_ipv4_over_ethernet(
///         ArpOperation::Request,
///         (sender, Ipv4Addr::new(24, 166, 172, 1)),
///         (MacAddr::UNSPECIFIED, Ipv4Addr::new(24, 166, 173, 159)),
///     )
///     .into(),
/// ])?;
///
/// assert_eq!(packet.payload().len(), 42);
/// assert_eq!(packet.get::<ArpHeader>().map(|arp| arp.operation_str()), Some("request"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
#[serde(transparent)]
pub struct Packet {
    headers: Vec<AnyHeader>,
}

impl Packet {
    /// Composes a packet from headers ordered from the outermost layer inwards.
    ///
    /// Fails if two headers have the same protocol.
    pub fn new<I>(headers: I) -> Result<Self, PacketBuildError>
    where
        I: IntoIterator<Item = AnyHeader>,
    {
        let mut packet = Self::default();
        for header in headers {
            packet.push(header)?;
        }
        Ok(packet)
    }

    /// Composes a packet from layers given as a protocol name and the bytes of its header.
    ///
    /// Names are matched against the registered protocols ignoring ASCII case. Each header is
    /// decoded from the front of its bytes; anything following the header is ignored.
    pub fn from_named_layers<'a, I, B>(layers: I) -> Result<Self, PacketBuildError>
    where
        I: IntoIterator<Item = (&'a str, B)>,
        B: Buf,
    {
        let mut packet = Self::default();
        for (name, mut data) in layers {
            let protocol: Protocol = name.parse().inspect_err(|_| {
                tracing::debug!(layer = name, "rejected layer with unregistered protocol name");
            })?;
            packet.push(AnyHeader::decode(protocol, &mut data)?)?;
        }
        Ok(packet)
    }

    /// Decodes a packet from raw bytes, starting with a header of the `outermost` protocol.
    ///
    /// Further headers are decoded for as long as the innermost header names a registered
    /// protocol as its payload and enough bytes remain for it. Dissection also stops after an
    /// IPv4 or TCP header announcing options, as those are not decoded. The bytes that follow
    /// the last decoded header are returned alongside the packet.
    ///
    /// Only a failure to decode the outermost header is an error.
    pub fn dissect<T: Buf>(
        outermost: Protocol,
        data: &mut T,
    ) -> Result<(Self, Bytes), PacketBuildError> {
        let mut packet = Self::default();
        packet.push(AnyHeader::decode(outermost, data)?)?;

        while let Some(next) = packet.next_protocol() {
            let required = next.layout().header_len;
            if data.remaining() < required {
                tracing::trace!(
                    %next,
                    required,
                    remaining = data.remaining(),
                    "too few bytes left for the next layer"
                );
                break;
            }
            if packet.get_protocol(next).is_some() {
                tracing::trace!(%next, "next layer repeats a protocol of the packet");
                break;
            }

            tracing::trace!(%next, "dissecting next layer");
            packet.push(AnyHeader::decode(next, data)?)?;
        }

        let payload = data.copy_to_bytes(data.remaining());
        Ok((packet, payload))
    }

    /// The registered protocol carried by the innermost header, if dissection can continue
    /// with it.
    fn next_protocol(&self) -> Option<Protocol> {
        let innermost = self.headers.last()?;
        let has_options = match innermost {
            AnyHeader::Ipv4(header) => header.has_options(),
            AnyHeader::Tcp(header) => header.has_options(),
            _ => false,
        };
        if has_options {
            tracing::trace!(
                protocol = %innermost.protocol(),
                "stopping at a header with options"
            );
            return None;
        }

        let encapsulated = innermost.encapsulated_proto();
        let next = encapsulated.protocol();
        if next.is_none() {
            tracing::trace!(%encapsulated, "no registered protocol follows");
        }
        next
    }

    fn push(&mut self, header: AnyHeader) -> Result<(), PacketBuildError> {
        let protocol = header.protocol();
        if self.get_protocol(protocol).is_some() {
            tracing::debug!(%protocol, "rejected packet with duplicate protocol");
            return Err(PacketBuildError::DuplicateProtocol(protocol));
        }
        self.headers.push(header);
        Ok(())
    }

    /// The concatenated encodings of all headers, outermost first.
    pub fn payload(&self) -> Bytes {
        self.encode_to_bytes()
    }

    /// The headers of the packet, outermost first.
    pub fn encapsulated_protos(&self) -> &[AnyHeader] {
        &self.headers
    }

    /// The protocols of the headers, outermost first.
    pub fn protocols(&self) -> impl Iterator<Item = Protocol> + '_ {
        self.headers.iter().map(AnyHeader::protocol)
    }

    /// Returns the header of type `H`, if the packet contains one.
    pub fn get<H: Header>(&self) -> Option<&H> {
        self.headers.iter().find_map(H::from_any)
    }

    /// Returns the header of the given protocol, if the packet contains one.
    pub fn get_protocol(&self, protocol: Protocol) -> Option<&AnyHeader> {
        self.headers
            .iter()
            .find(|header| header.protocol() == protocol)
    }

    /// Returns the header of the protocol with the given name, ignoring ASCII case.
    ///
    /// Fails if the name does not identify a registered protocol.
    pub fn get_by_name(&self, name: &str) -> Result<Option<&AnyHeader>, PacketBuildError> {
        Ok(self.get_protocol(name.parse()?))
    }

    /// The number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if the packet has no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl WireEncode for Packet {
    type Error = EncodeError;

    fn encoded_length(&self) -> usize {
        self.headers.iter().map(WireEncode::encoded_length).sum()
    }

    fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error> {
        if buffer.remaining_mut() < self.encoded_length() {
            return Err(EncodeError::InadequateBufferSize);
        }
        self.headers
            .iter()
            .try_for_each(|header| header.encode_to(buffer))
    }
}

impl Display for Packet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, header) in self.headers.iter().enumerate() {
            if index != 0 {
                f.write_str(", ")?;
            }
            Display::fmt(header, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use bytes::BytesMut;
    use test_utils::param_test;

    use super::*;
    use crate::{
        address::MacAddr,
        layer2::{ArpHeader, ArpOperation, EtherType, EthernetHeader},
        layer3::{IpProtocol, Ipv4Header},
        layer4::{TcpHeader, UdpHeader},
        layout::DecodeError,
        protocol::UnregisteredProtocol,
        wire_encoding::WireDecode,
    };

    const RAW_ETHERNET: [u8; 14] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x07, 0x0d, 0xaf, 0xf4, 0x54, 0x08, 0x06,
    ];

    const RAW_ARP: [u8; 28] = [
        0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x00, 0x07, 0x0d, 0xaf, 0xf4, 0x54, 0x18,
        0xa6, 0xac, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0xa6, 0xad, 0x9f,
    ];

    fn sender() -> MacAddr {
        MacAddr::new([0x00, 0x07, 0x0d, 0xaf, 0xf4, 0x54])
    }

    fn ethernet() -> EthernetHeader {
        EthernetHeader::new(MacAddr::BROADCAST, sender(), EtherType::Arp)
    }

    fn arp() -> ArpHeader {
        ArpHeader::new_ipv4_over_ethernet(
            ArpOperation::Request,
            (sender(), Ipv4Addr::new(24, 166, 172, 1)),
            (MacAddr::UNSPECIFIED, Ipv4Addr::new(24, 166, 173, 159)),
        )
    }

    fn arp_packet() -> Packet {
        Packet::new([ethernet().into(), arp().into()]).unwrap()
    }

    fn raw_arp_packet() -> Vec<u8> {
        [&RAW_ETHERNET[..], &RAW_ARP[..]].concat()
    }

    mod build {
        use super::*;

        #[test]
        fn payload_concatenates_headers() {
            let packet = arp_packet();

            assert_eq!(packet.len(), 2);
            assert_eq!(packet.encoded_length(), 42);
            assert_eq!(packet.payload().as_ref(), raw_arp_packet());
        }

        #[test]
        fn keeps_insertion_order() {
            let packet = Packet::new([arp().into(), ethernet().into()]).unwrap();

            assert_eq!(
                packet.protocols().collect::<Vec<_>>(),
                [Protocol::Arp, Protocol::Ethernet]
            );
            assert_eq!(
                packet.payload().as_ref(),
                [&RAW_ARP[..], &RAW_ETHERNET[..]].concat()
            );
        }

        #[test]
        fn empty() {
            let packet = Packet::new(Vec::<AnyHeader>::new()).unwrap();

            assert!(packet.is_empty());
            assert!(packet.payload().is_empty());
            assert_eq!(packet.to_string(), "");
        }

        #[test]
        fn rejects_duplicate_protocol() {
            assert_eq!(
                Packet::new([ethernet().into(), arp().into(), ethernet().into()]),
                Err(PacketBuildError::DuplicateProtocol(Protocol::Ethernet))
            );
        }

        #[test]
        fn from_named_layers() -> test_utils::Result {
            let packet = Packet::from_named_layers([
                ("ethernet", &RAW_ETHERNET[..]),
                ("arp", &RAW_ARP[..]),
            ])?;

            assert_eq!(packet, arp_packet());
            Ok(())
        }

        #[test]
        fn from_unregistered_name() {
            let result = Packet::from_named_layers([
                ("Ethernet", &RAW_ETHERNET[..]),
                ("Foo", &RAW_ARP[..]),
            ]);

            assert_eq!(
                result,
                Err(PacketBuildError::UnregisteredProtocol(UnregisteredProtocol(
                    "Foo".to_string()
                )))
            );
            assert_eq!(
                result.unwrap_err().to_string(),
                "cannot build packet: invalid protocol: Foo"
            );
        }

        #[test]
        fn from_truncated_layer() {
            assert_eq!(
                Packet::from_named_layers([("ARP", &RAW_ARP[..20])]),
                Err(PacketBuildError::Decode(DecodeError::HeaderTruncated {
                    layout: "ARP",
                    expected: 28,
                    actual: 20
                }))
            );
        }
    }

    mod access {
        use super::*;

        #[test]
        fn by_type() {
            let packet = arp_packet();

            assert_eq!(packet.get::<EthernetHeader>(), Some(&ethernet()));
            assert_eq!(packet.get::<ArpHeader>(), Some(&arp()));
            assert_eq!(packet.get::<Ipv4Header>(), None);
        }

        #[test]
        fn by_protocol() {
            let packet = arp_packet();

            assert_eq!(
                packet.get_protocol(Protocol::Arp),
                Some(&AnyHeader::Arp(arp()))
            );
            assert_eq!(packet.get_protocol(Protocol::Tcp), None);
        }

        param_test! {
            by_name -> test_utils::Result: [
                canonical: ("ARP", Some(Protocol::Arp)),
                lower_case: ("ethernet", Some(Protocol::Ethernet)),
                absent: ("udp", None),
            ]
        }
        fn by_name(name: &str, expected: Option<Protocol>) -> test_utils::Result {
            let packet = arp_packet();

            assert_eq!(
                packet.get_by_name(name)?.map(AnyHeader::protocol),
                expected
            );
            Ok(())
        }

        #[test]
        fn by_unregistered_name() {
            assert!(matches!(
                arp_packet().get_by_name("IGMP"),
                Err(PacketBuildError::UnregisteredProtocol(_))
            ));
        }

        #[test]
        fn encapsulated_protos() {
            let packet = arp_packet();

            assert_eq!(
                packet.encapsulated_protos(),
                [AnyHeader::Ethernet(ethernet()), AnyHeader::Arp(arp())]
            );
            assert_eq!(
                packet.encapsulated_protos()[0]
                    .encapsulated_proto()
                    .as_str(),
                "ARP"
            );
        }
    }

    mod encode {
        use super::*;

        #[test]
        fn inadequate_buffer_writes_nothing() {
            let mut backing = [0u8; 41];
            let mut buffer = &mut backing[..];

            assert_eq!(
                arp_packet().encode_to(&mut buffer),
                Err(EncodeError::InadequateBufferSize)
            );
            assert_eq!(backing, [0u8; 41]);
        }

        #[test]
        fn appends_to_buffer() -> test_utils::Result {
            let mut buffer = BytesMut::from(&b"prefix"[..]);

            arp_packet().encode_to(&mut buffer)?;
            assert_eq!(&buffer[..6], b"prefix");
            assert_eq!(&buffer[6..], raw_arp_packet());
            Ok(())
        }
    }

    mod dissect {
        use super::*;

        const RAW_IPV4: [u8; 20] = [
            0x45, 0x00, 0x00, 0x28, 0xec, 0x6c, 0x40, 0x00, 0x40, 0x06, 0x2b, 0x51, 0xc0, 0xa8,
            0x01, 0x60, 0xc0, 0xa8, 0x01, 0xfe,
        ];

        const RAW_TCP: [u8; 32] = [
            0x03, 0xfe, 0x00, 0x16, 0xd6, 0x76, 0xf6, 0x71, 0x0c, 0x7a, 0x14, 0x57, 0x80, 0x18,
            0x21, 0x5c, 0x20, 0x08, 0x00, 0x00, 0x01, 0x01, 0x08, 0x0a, 0x00, 0x08, 0xca, 0x61,
            0x00, 0x01, 0x69, 0x2e,
        ];

        fn ipv4_frame() -> Vec<u8> {
            let mut ethernet = RAW_ETHERNET;
            ethernet[13] = 0x00;
            [&ethernet[..], &RAW_IPV4[..], &RAW_TCP[..]].concat()
        }

        #[test]
        fn arp_frame() -> test_utils::Result {
            let raw = [&raw_arp_packet()[..], &b"trailer"[..]].concat();

            let (packet, payload) = Packet::dissect(Protocol::Ethernet, &mut raw.as_slice())?;

            assert_eq!(packet, arp_packet());
            assert_eq!(payload.as_ref(), b"trailer");
            Ok(())
        }

        #[test]
        fn tcp_over_ipv4() -> test_utils::Result {
            let (packet, payload) =
                Packet::dissect(Protocol::Ethernet, &mut ipv4_frame().as_slice())?;

            assert_eq!(
                packet.protocols().collect::<Vec<_>>(),
                [Protocol::Ethernet, Protocol::Ipv4, Protocol::Tcp]
            );
            assert_eq!(
                packet.get::<Ipv4Header>().map(|ip| ip.protocol),
                Some(IpProtocol::Tcp)
            );
            assert_eq!(
                packet.get::<TcpHeader>().map(TcpHeader::flags_str),
                Some("PSH ACK".to_string())
            );
            // The TCP options are not decoded.
            assert_eq!(payload.as_ref(), &RAW_TCP[20..]);
            Ok(())
        }

        #[test]
        fn from_inner_layer() -> test_utils::Result {
            let (packet, payload) = Packet::dissect(Protocol::Ipv4, &mut &RAW_IPV4[..])?;

            assert_eq!(packet.protocols().collect::<Vec<_>>(), [Protocol::Ipv4]);
            assert!(payload.is_empty());
            Ok(())
        }

        #[test]
        fn stops_at_ipv4_options() -> test_utils::Result {
            let mut raw = RAW_IPV4.to_vec();
            raw[0] = 0x46;
            raw.extend_from_slice(&[0x01, 0x01, 0x01, 0x00]);
            raw.extend_from_slice(&RAW_TCP);

            let (packet, payload) = Packet::dissect(Protocol::Ipv4, &mut raw.as_slice())?;

            assert_eq!(packet.protocols().collect::<Vec<_>>(), [Protocol::Ipv4]);
            assert_eq!(payload.len(), 36);
            Ok(())
        }

        #[test]
        fn stops_at_unknown_protocol() -> test_utils::Result {
            let mut raw = ipv4_frame();
            raw[14 + 9] = 253;

            let (packet, payload) = Packet::dissect(Protocol::Ethernet, &mut raw.as_slice())?;

            assert_eq!(
                packet.protocols().collect::<Vec<_>>(),
                [Protocol::Ethernet, Protocol::Ipv4]
            );
            assert_eq!(payload.as_ref(), RAW_TCP);
            Ok(())
        }

        #[test]
        fn stops_at_unregistered_protocol() -> test_utils::Result {
            let mut raw = ipv4_frame();
            raw[14 + 9] = u8::from(IpProtocol::Igmp);

            let (packet, _) = Packet::dissect(Protocol::Ethernet, &mut raw.as_slice())?;

            assert_eq!(packet.len(), 2);
            Ok(())
        }

        #[test]
        fn stops_at_truncated_layer() -> test_utils::Result {
            let raw = &ipv4_frame()[..14 + 20 + 19];

            let (packet, payload) = Packet::dissect(Protocol::Ethernet, &mut &raw[..])?;

            assert_eq!(packet.len(), 2);
            assert_eq!(payload.as_ref(), &RAW_TCP[..19]);
            Ok(())
        }

        #[test]
        fn truncated_outermost_layer() {
            assert_eq!(
                Packet::dissect(Protocol::Ethernet, &mut &RAW_ETHERNET[..13]),
                Err(PacketBuildError::Decode(DecodeError::HeaderTruncated {
                    layout: "Ethernet",
                    expected: 14,
                    actual: 13
                }))
            );
        }

        #[test]
        fn udp_is_innermost() -> test_utils::Result {
            let mut raw = RAW_IPV4.to_vec();
            raw[9] = u8::from(IpProtocol::Udp);
            raw.extend_from_slice(&[0x00, 0x35, 0xd4, 0x31, 0x00, 0x0c, 0x00, 0x00]);
            raw.extend_from_slice(b"data");

            let (packet, payload) = Packet::dissect(Protocol::Ipv4, &mut raw.as_slice())?;

            assert_eq!(
                packet.get::<UdpHeader>().map(|udp| udp.length),
                Some(12)
            );
            assert_eq!(payload.as_ref(), b"data");
            Ok(())
        }

        #[test]
        fn dissected_headers_decode_alike() -> test_utils::Result {
            let raw = ipv4_frame();
            let (packet, _) = Packet::dissect(Protocol::Ethernet, &mut raw.as_slice())?;

            assert_eq!(
                packet.get::<Ipv4Header>(),
                Some(&Ipv4Header::decode(&mut &raw[14..34])?)
            );
            Ok(())
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            arp_packet().to_string(),
            "Ethernet(dst=ff:ff:ff:ff:ff:ff, src=00:07:0d:af:f4:54, eth=2054), \
             ARP(htype=1, ptype=2048, hlen=6, plen=4, oper=1, sha=00:07:0d:af:f4:54, \
             spa=24.166.172.1, tha=00:00:00:00:00:00, tpa=24.166.173.159)"
        );
    }

    #[test]
    fn serializes_headers_in_order() -> test_utils::Result {
        let json = serde_json::to_value(arp_packet())?;

        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert!(json[0].get("Ethernet").is_some());
        assert_eq!(json[1]["Arp"]["operation"], 1);
        Ok(())
    }
}
