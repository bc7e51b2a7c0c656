//! Transport-layer headers.

mod tcp;
pub use tcp::{DataOffset, TcpFlags, TcpHeader, TcpReserved};

mod udp;
pub use udp::{UdpEncodeError, UdpHeader};
