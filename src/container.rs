//! pcap-like containers carrying ERF records
//!
//! See <https://wiki.wireshark.org/Development/LibpcapFileFormat> for details.
//!
//! Several writers produced files with the standard 24-byte file header but a different frame
//! header: swapped length fields, or extra per-frame fields (interface index, protocol, packet
//! type). The magic number alone does not tell them apart, so the frame layout is chosen by
//! [`sniff_container`], which scores the first frames under every candidate layout.
//!
//! Once the layout is known, frames can be read with [`parse_container_frame`] or the
//! [`ContainerSlice`] iterator. Frames with link type [`Linktype::ERF`](crate::Linktype::ERF)
//! hold one ERF record each.

mod capture;
mod frame;
mod header;
mod sniff;

pub use capture::*;
pub use frame::*;
pub use header::*;
pub use sniff::*;
