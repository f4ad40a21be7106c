use nom::bytes::streaming::take;
use nom::number::streaming::u32 as e_u32;
use nom::number::Endianness;
use nom::IResult;

use crate::container::{endianness, ContainerLayout};
use crate::ErfError;

/// Largest frame accepted from a container, whatever its snapshot length
pub const MAX_FRAME_LEN: u32 = 262_144;

/// Fixed fields of a container frame header
///
/// Layout-specific trailing fields (interface index, protocol, packet type) are skipped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameHeader {
    pub ts_sec: u32,
    /// Fractional part of the timestamp, in microseconds or nanoseconds depending on the layout
    pub ts_frac: u32,
    pub caplen: u32,
    pub origlen: u32,
}

/// A frame of a container
#[derive(Debug)]
pub struct ContainerFrame<'a> {
    pub header: FrameHeader,
    /// Frame data, `caplen` bytes
    pub data: &'a [u8],
}

/// Read a frame header, without its data
pub fn parse_frame_header(
    i: &[u8],
    layout: ContainerLayout,
    e: Endianness,
) -> IResult<&[u8], FrameHeader, ErfError<&[u8]>> {
    let hlen = layout.frame_header_len();
    if i.len() < hlen {
        return Err(nom::Err::Incomplete(nom::Needed::new(hlen - i.len())));
    }
    let (r, ts_sec) = e_u32(e)(i)?;
    let (r, ts_frac) = e_u32(e)(r)?;
    let (r, first) = e_u32(e)(r)?;
    let (_, second) = e_u32(e)(r)?;
    let (caplen, origlen) = if layout.swapped_lengths() {
        (second, first)
    } else {
        (first, second)
    };
    let header = FrameHeader {
        ts_sec,
        ts_frac,
        caplen,
        origlen,
    };
    Ok((&i[hlen..], header))
}

/// Read a container frame header and data
///
/// Frames larger than [`MAX_FRAME_LEN`] are rejected with `RecordTooLarge` before reading the
/// data.
pub fn parse_container_frame(
    i: &[u8],
    layout: ContainerLayout,
    big_endian: bool,
) -> IResult<&[u8], ContainerFrame, ErfError<&[u8]>> {
    let (i, header) = parse_frame_header(i, layout, endianness(big_endian))?;
    if header.caplen > MAX_FRAME_LEN {
        return Err(nom::Err::Failure(ErfError::RecordTooLarge {
            declared: header.caplen as usize,
            limit: MAX_FRAME_LEN as usize,
        }));
    }
    let (i, data) = take(header.caplen as usize)(i)?;
    Ok((i, ContainerFrame { header, data }))
}
