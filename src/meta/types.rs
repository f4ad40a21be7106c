/// Address family of address-valued and name-service tags
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AddrKind {
    Ipv4,
    Ipv6,
    Mac,
    Eui,
    Wwn,
    FcId,
    IbGid,
    IbLid,
}

impl AddrKind {
    /// Encoded length of the address, in bytes
    pub const fn len(self) -> usize {
        match self {
            AddrKind::Ipv4 => 4,
            AddrKind::Ipv6 => 16,
            AddrKind::Mac => 6,
            AddrKind::Eui => 8,
            AddrKind::Wwn => 8,
            AddrKind::FcId => 3,
            AddrKind::IbGid => 16,
            AddrKind::IbLid => 2,
        }
    }
}

/// Declared type of a MetaERF tag
///
/// The type selects the generic decode routine and the minimum length a tag must declare for
/// its value to be decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MetaTagType {
    Padding,
    /// Section header: section id (u16) and section length (u16)
    SectionHeader,
    String,
    Binary,
    U8,
    U16,
    U32,
    U64,
    I32,
    I64,
    /// Absolute ERF timestamp (little-endian 32.32 fixed point)
    ErfTime,
    /// Relative time, in nanoseconds
    DurationNs,
    /// Bit rate, in bits per second (SI suffix)
    Rate,
    /// Size, in bytes (IEC suffix)
    Size,
    /// Signed latitude, in 1e-7 degrees
    Latitude,
    /// Signed longitude, in 1e-7 degrees
    Longitude,
    /// Signed power, in 0.01 dBm
    Power,
    /// Signed temperature, in 0.001 degrees Celsius
    Temperature,
    /// Prefix length of a network mask
    Cidr,
    Addr(AddrKind),
    /// Reference to a parent section: section code (u16) and section id (u16)
    SectionRef,
    Bitfield32,
    Bitfield64,
    /// Address followed by a UTF-8 host name filling the rest of the tag
    NameService(AddrKind),
    /// PTP TimeInterval: signed nanoseconds scaled by 2^16
    PtpTimeInterval,
    /// Nanoseconds since the PTP epoch
    PtpTime,
}

impl MetaTagType {
    /// Minimum declared length for a value of this type to be decoded
    pub const fn min_len(self) -> usize {
        match self {
            MetaTagType::Padding | MetaTagType::String | MetaTagType::Binary => 0,
            MetaTagType::U8 => 1,
            MetaTagType::U16 => 2,
            MetaTagType::SectionHeader
            | MetaTagType::U32
            | MetaTagType::I32
            | MetaTagType::Latitude
            | MetaTagType::Longitude
            | MetaTagType::Power
            | MetaTagType::Temperature
            | MetaTagType::Cidr
            | MetaTagType::SectionRef
            | MetaTagType::Bitfield32 => 4,
            MetaTagType::U64
            | MetaTagType::I64
            | MetaTagType::ErfTime
            | MetaTagType::DurationNs
            | MetaTagType::Rate
            | MetaTagType::Size
            | MetaTagType::Bitfield64
            | MetaTagType::PtpTimeInterval
            | MetaTagType::PtpTime => 8,
            MetaTagType::Addr(k) | MetaTagType::NameService(k) => k.len(),
        }
    }
}

/// A named group of bits inside a bitfield tag
#[derive(Debug)]
pub struct BitSubfield {
    pub name: &'static str,
    pub abbrev: &'static str,
    pub mask: u64,
}

/// Value labels of an enumerated tag
pub type ValueLabels = &'static [(u64, &'static str)];

/// Declarative definition of one tag, independent of the section it appears in
#[derive(Debug)]
pub struct MetaTagTemplate {
    pub code: u16,
    pub name: &'static str,
    pub abbrev: &'static str,
    pub kind: MetaTagType,
    pub labels: ValueLabels,
    pub subfields: &'static [BitSubfield],
}

impl MetaTagTemplate {
    pub const fn new(
        code: u16,
        name: &'static str,
        abbrev: &'static str,
        kind: MetaTagType,
    ) -> MetaTagTemplate {
        MetaTagTemplate {
            code,
            name,
            abbrev,
            kind,
            labels: &[],
            subfields: &[],
        }
    }

    pub const fn with_labels(mut self, labels: ValueLabels) -> MetaTagTemplate {
        self.labels = labels;
        self
    }

    pub const fn with_subfields(mut self, subfields: &'static [BitSubfield]) -> MetaTagTemplate {
        self.subfields = subfields;
        self
    }
}

/// Declarative definition of one section
#[derive(Debug)]
pub struct MetaSectionTemplate {
    pub code: u16,
    pub name: &'static str,
    pub abbrev: &'static str,
}
