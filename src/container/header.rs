use nom::number::streaming::{i32 as e_i32, le_u32, u16 as e_u16, u32 as e_u32};
use nom::number::Endianness;
use nom::IResult;

use crate::linktype::Linktype;
use crate::ErfError;

/// Size of the container file header
pub const CONTAINER_HEADER_LEN: usize = 24;

pub const MAGIC_STANDARD: u32 = 0xa1b2_c3d4;
pub const MAGIC_NANOSECOND: u32 = 0xa1b2_3c4d;
pub const MAGIC_MODIFIED: u32 = 0xa1b2_cd34;

/// Frame header layout of a container
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ContainerLayout {
    /// 16-byte frame header, microsecond timestamps
    Standard,
    /// 16-byte frame header, nanosecond timestamps
    Nanosecond,
    /// Standard layout with captured and original lengths exchanged (pre-2.3 writers)
    SwappedLengths,
    /// 24-byte frame header with standard magic
    Ss990417,
    /// 20-byte frame header with standard magic
    Nokia,
    /// 24-byte frame header, modified magic
    Modified,
    /// 28-byte frame header, modified magic
    Ss990915,
}

impl ContainerLayout {
    /// Size of the frame header, in bytes
    pub const fn frame_header_len(self) -> usize {
        match self {
            ContainerLayout::Standard
            | ContainerLayout::Nanosecond
            | ContainerLayout::SwappedLengths => 16,
            ContainerLayout::Nokia => 20,
            ContainerLayout::Ss990417 | ContainerLayout::Modified => 24,
            ContainerLayout::Ss990915 => 28,
        }
    }

    /// Number of timestamp fraction units per second
    pub const fn fraction_units(self) -> u32 {
        match self {
            ContainerLayout::Nanosecond => 1_000_000_000,
            _ => 1_000_000,
        }
    }

    /// Returns true if the captured and original lengths are stored in reverse order
    pub const fn swapped_lengths(self) -> bool {
        matches!(self, ContainerLayout::SwappedLengths)
    }
}

/// Candidate frame layouts for a magic number (in native order)
///
/// The distinguished layout of each magic comes first.
pub fn candidate_layouts(magic: u32) -> &'static [ContainerLayout] {
    match magic {
        MAGIC_STANDARD => &[
            ContainerLayout::Standard,
            ContainerLayout::SwappedLengths,
            ContainerLayout::Ss990417,
            ContainerLayout::Nokia,
        ],
        MAGIC_NANOSECOND => &[ContainerLayout::Nanosecond],
        MAGIC_MODIFIED => &[ContainerLayout::Modified, ContainerLayout::Ss990915],
        _ => &[],
    }
}

pub(crate) fn endianness(big_endian: bool) -> Endianness {
    if big_endian {
        Endianness::Big
    } else {
        Endianness::Little
    }
}

/// Container file header
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerHeader {
    /// Magic number, in native order (`0xa1b2c3d4`, `0xa1b23c4d` or `0xa1b2cd34`)
    pub magic_number: u32,
    pub version_major: u16,
    pub version_minor: u16,
    /// The correction time in seconds between GMT (UTC) and the local timezone of the frame
    /// timestamps
    pub thiszone: i32,
    pub sigfigs: u32,
    /// max len of captured packets, in octets
    pub snaplen: u32,
    pub network: Linktype,
    /// The file was written with the byte order opposite to the magic constants
    pub big_endian: bool,
}

impl ContainerHeader {
    pub const fn size(&self) -> usize {
        CONTAINER_HEADER_LEN
    }

    pub fn endianness(&self) -> Endianness {
        endianness(self.big_endian)
    }

    pub fn is_nanosecond_precision(&self) -> bool {
        self.magic_number == MAGIC_NANOSECOND
    }

    pub fn is_modified_format(&self) -> bool {
        self.magic_number == MAGIC_MODIFIED
    }

    /// Candidate frame layouts for this header
    pub fn candidates(&self) -> &'static [ContainerLayout] {
        candidate_layouts(self.magic_number)
    }
}

/// Read the container file header
///
/// The byte order of the file is given by the magic number.
pub fn parse_container_header(i: &[u8]) -> IResult<&[u8], ContainerHeader, ErfError<&[u8]>> {
    let (i, magic) = le_u32(i)?;
    let (magic_number, big_endian) = match magic {
        MAGIC_STANDARD | MAGIC_NANOSECOND | MAGIC_MODIFIED => (magic, false),
        m if candidate_layouts(m.swap_bytes()).is_empty() => {
            return Err(nom::Err::Error(ErfError::HeaderNotRecognized))
        }
        m => (m.swap_bytes(), true),
    };
    let e = endianness(big_endian);
    let (i, version_major) = e_u16(e)(i)?;
    let (i, version_minor) = e_u16(e)(i)?;
    let (i, thiszone) = e_i32(e)(i)?;
    let (i, sigfigs) = e_u32(e)(i)?;
    let (i, snaplen) = e_u32(e)(i)?;
    let (i, network) = e_i32(e)(i)?;
    let header = ContainerHeader {
        magic_number,
        version_major,
        version_minor,
        thiszone,
        sigfigs,
        snaplen,
        network: Linktype(network),
        big_endian,
    };
    Ok((i, header))
}
