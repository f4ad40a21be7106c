//! MetaERF metadata records
//!
//! A metadata record (ERF type 27) carries a stream of tags instead of a network frame. Each
//! tag is made of a 16-bit code, a 16-bit length and a value padded to a 4-byte boundary.
//! Tags are grouped in sections: a section header tag (code `0xFF00` and above) carries the
//! section id and the declared length of the tags that follow.
//!
//! The same tag code can appear in every section, with a different meaning. Field descriptors
//! are built once, at first use, as the cross product of the section and tag templates (see
//! [`MetaRegistry`]). Descriptors are looked up by `section << 16 | tag`.
//!
//! Decoding is best-effort: structural problems (bad section length, truncated or empty tags)
//! are reported as [`MetaWarning`]s and never stop the walk.

mod decoder;
mod registry;
mod templates;
mod types;
mod value;

pub use decoder::*;
pub use registry::*;
pub use templates::*;
pub use types::*;
pub use value::*;

/// Section context of tags preceding the first section header
pub const NO_SECTION: u16 = 0x0000;
/// Section context of tags following a section header not listed in the templates
pub const UNKNOWN_SECTION: u16 = 0xffff;

/// Build the registry lookup key of a tag in a section
#[inline]
pub const fn meta_key(section: u16, tag: u16) -> u32 {
    (section as u32) << 16 | tag as u32
}

/// Returns true if `code` is a section header tag code
#[inline]
pub const fn is_section_code(code: u16) -> bool {
    code & 0xff00 == 0xff00
}
