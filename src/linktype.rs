use rusticata_macros::newtype_enum;

/// Data link type of a container file
///
/// Only frames whose container link type is [`Linktype::ERF`] carry ERF records. Other values
/// are kept so the caller can hand the frames to another decoder.
///
/// See <http://www.tcpdump.org/linktypes.html>
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Linktype(pub i32);

newtype_enum! {
impl display Linktype {
    NULL = 0,
    ETHERNET = 1,

    RAW = 101,

    LINUX_SLL = 113,

    // Endace Extensible Record Format; each frame is one ERF record.
    ERF = 197,

    IPV4 = 228,
    IPV6 = 229,
}
}

impl Linktype {
    /// Returns true if frames of this link type contain ERF records
    #[inline]
    pub fn is_erf(self) -> bool {
        self == Linktype::ERF
    }
}
