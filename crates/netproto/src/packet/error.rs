use crate::{
    layout::DecodeError,
    protocol::{Protocol, UnregisteredProtocol},
};

/// Errors raised when failing to build or dissect a [`Packet`][super::Packet].
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum PacketBuildError {
    /// A layer was named by something other than a registered protocol.
    #[error("cannot build packet: {0}")]
    UnregisteredProtocol(#[from] UnregisteredProtocol),
    /// A protocol occurs more than once in the packet.
    #[error("cannot build packet: duplicate protocol {0}")]
    DuplicateProtocol(Protocol),
    /// A header could not be decoded from the provided bytes.
    #[error("cannot build packet: {0}")]
    Decode(#[from] DecodeError),
}
