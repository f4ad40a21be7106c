use std::io::{Read, Seek, SeekFrom};

use nom::Needed;

use crate::container::{
    parse_container_header, parse_frame_header, ContainerHeader, ContainerLayout, MAX_FRAME_LEN,
};
use crate::ErfError;

/// Number of bytes read by [`sniff_reader`]
pub const SNIFF_LEN: usize = 65536;

/// Number of frames scored under each candidate layout
const SNIFF_FRAMES: usize = 2;

/// Score of one candidate layout
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LayoutScore {
    pub layout: ContainerLayout,
    /// Number of implausible frame header fields
    pub demerits: u32,
    /// Scoring stopped at the end of the input
    pub eof: bool,
}

/// Outcome of container sniffing
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SniffResult {
    pub header: ContainerHeader,
    /// The chosen frame layout
    pub layout: ContainerLayout,
    /// All candidates, best first (equal scores keep candidate order)
    pub ranking: Vec<LayoutScore>,
    /// The input ended before a candidate was fully validated, or another candidate has the same
    /// score
    pub ambiguous: bool,
}

fn score_layout(i: &[u8], header: &ContainerHeader, layout: ContainerLayout) -> LayoutScore {
    let mut demerits = 0;
    let mut eof = false;
    let mut rem = i;
    for _ in 0..SNIFF_FRAMES {
        let (data, fh) = match parse_frame_header(rem, layout, header.endianness()) {
            Ok(r) => r,
            Err(_) => {
                eof = true;
                break;
            }
        };
        if fh.caplen > MAX_FRAME_LEN {
            // the frame cannot be skipped
            demerits += 1;
            break;
        }
        if fh.origlen > MAX_FRAME_LEN {
            demerits += 1;
        }
        if fh.caplen > fh.origlen {
            demerits += 1;
        }
        if fh.ts_frac >= layout.fraction_units() {
            demerits += 1;
        }
        if header.snaplen != 0 && fh.caplen > header.snaplen {
            demerits += 1;
        }
        match data.get(fh.caplen as usize..) {
            Some(next) => rem = next,
            None => {
                eof = true;
                break;
            }
        }
    }
    LayoutScore {
        layout,
        demerits,
        eof,
    }
}

/// Identify the frame layout of a container, from the start of the file
///
/// Each candidate layout for the magic number reads the first two frame headers and counts
/// implausible values. The layout with the fewest demerits wins; on ties the earlier
/// candidate wins. Running out of input is not an error: the result is only flagged
/// ambiguous.
///
/// Fails with `HeaderNotRecognized` on an unknown magic, and `Incomplete` if the file header
/// itself is incomplete.
pub fn sniff_container(i: &[u8]) -> Result<SniffResult, ErfError<&[u8]>> {
    let (rem, header) = match parse_container_header(i) {
        Ok(r) => r,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => return Err(e),
        Err(nom::Err::Incomplete(Needed::Size(n))) => return Err(ErfError::Incomplete(n.into())),
        Err(nom::Err::Incomplete(Needed::Unknown)) => return Err(ErfError::Incomplete(0)),
    };
    let mut ranking: Vec<LayoutScore> = header
        .candidates()
        .iter()
        .map(|&layout| score_layout(rem, &header, layout))
        .collect();
    // stable: equal scores keep candidate order
    ranking.sort_by_key(|s| s.demerits);
    let best = match ranking.first() {
        Some(best) => *best,
        None => return Err(ErfError::HeaderNotRecognized),
    };
    let tied = ranking.iter().skip(1).any(|s| s.demerits == best.demerits);
    let ambiguous = tied || ranking.iter().any(|s| s.eof);
    tracing::debug!(
        layout = ?best.layout,
        demerits = best.demerits,
        ambiguous,
        "container layout selected"
    );
    Ok(SniffResult {
        header,
        layout: best.layout,
        ranking,
        ambiguous,
    })
}

/// Identify the frame layout of a container read from `r`
///
/// Reads up to [`SNIFF_LEN`] bytes, then seeks back to the original position, whether
/// sniffing succeeded or not.
pub fn sniff_reader<R>(r: &mut R) -> Result<SniffResult, ErfError<&'static [u8]>>
where
    R: Read + Seek,
{
    let start = r.stream_position().or(Err(ErfError::ReadError))?;
    let mut buf = Vec::with_capacity(SNIFF_LEN);
    let read = r.by_ref().take(SNIFF_LEN as u64).read_to_end(&mut buf);
    let rewind = r.seek(SeekFrom::Start(start));
    read.or(Err(ErfError::ReadError))?;
    rewind.or(Err(ErfError::ReadError))?;
    sniff_container(&buf).map_err(|e| e.to_owned_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::tests::HEADER_LE;
    use std::io::Cursor;

    fn frame(caplen: u32, origlen: u32, fill: u8) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(&1u32.to_le_bytes());
        v.extend_from_slice(&500u32.to_le_bytes());
        v.extend_from_slice(&caplen.to_le_bytes());
        v.extend_from_slice(&origlen.to_le_bytes());
        v.extend(std::iter::repeat(fill).take(caplen as usize));
        v
    }

    #[test]
    fn test_prefers_consistent_lengths() {
        let mut data = HEADER_LE.to_vec();
        data.extend(frame(40, 60, 0xaa));
        data.extend(frame(40, 64, 0xaa));
        data.extend(frame(40, 64, 0xaa));
        let res = sniff_container(&data).expect("sniff failed");
        assert_eq!(res.layout, ContainerLayout::Standard);
        assert!(!res.ambiguous);
        assert_eq!(res.ranking[0].demerits, 0);
        let swapped = res
            .ranking
            .iter()
            .find(|s| s.layout == ContainerLayout::SwappedLengths)
            .expect("no score");
        assert!(swapped.demerits > 0);
    }

    #[test]
    fn test_eof_is_ambiguous() {
        let res = sniff_container(HEADER_LE).expect("sniff failed");
        assert_eq!(res.layout, ContainerLayout::Standard);
        assert!(res.ambiguous);
        assert!(res.ranking.iter().all(|s| s.eof && s.demerits == 0));
    }

    #[test]
    fn test_unknown_magic() {
        let res = sniff_container(&[0x42; 24]);
        assert_eq!(res, Err(ErfError::HeaderNotRecognized));
        assert!(matches!(
            sniff_container(&HEADER_LE[..8]),
            Err(ErfError::Incomplete(_))
        ));
    }

    #[test]
    fn test_sniff_reader_rewinds() {
        let mut data = vec![0u8; 4];
        data.extend_from_slice(HEADER_LE);
        data.extend(frame(4, 4, 1));
        let mut cursor = Cursor::new(data);
        cursor.set_position(4);
        let res = sniff_reader(&mut cursor).expect("sniff failed");
        assert_eq!(res.layout, ContainerLayout::Standard);
        assert_eq!(cursor.position(), 4);
        cursor.set_position(0);
        assert!(sniff_reader(&mut cursor).is_err());
        assert_eq!(cursor.position(), 0);
    }
}
