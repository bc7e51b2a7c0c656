//! Types, conversion functions, parsing, and encoding for common network protocol headers.
//!
//! Every header of the [`layer2`], [`layer3`] and [`layer4`] modules is a fixed-length table of
//! fields over the [`layout`] engine and decodes from and encodes to its exact wire format
//! through the traits of [`wire_encoding`]. Headers are stacked into a [`packet::Packet`].

pub mod address;
pub mod checksum;
pub mod layer2;
pub mod layer3;
pub mod layer4;
pub mod layout;
pub mod packet;
pub mod protocol;
pub(crate) mod utils;
pub mod validation;
pub mod wire_encoding;
