//! ERF records
//!
//! An ERF record is made of:
//!
//! - a 16-byte fixed header (timestamp, type, flags, record length, loss counter, wire length)
//! - zero or more 8-byte extension headers, chained by a continuation bit
//! - a sub-header, whose size depends on the record type (0, 2 or 4 bytes)
//! - the payload: a network frame, or a MetaERF tag stream for metadata records
//!
//! All fields are big-endian, except the timestamp which is little-endian.
//!
//! Records can be decoded from a complete buffer with [`decode_erf_record`], or with the
//! streaming parser [`parse_erf_record`]. [`ErfReader`] reads records from any `Read` input.

mod ext_header;
mod header;
mod reader;
mod record;
mod subheader;
mod timestamp;

pub use ext_header::*;
pub use header::*;
pub use reader::*;
pub use record::*;
pub use subheader::*;
pub use timestamp::*;
