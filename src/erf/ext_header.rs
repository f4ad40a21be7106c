use std::convert::TryFrom;

use rusticata_macros::newtype_enum;

/// Size of one extension header, in bytes
pub const EXT_HDR_LEN: usize = 8;
/// Continuation bit in the first byte of an extension header
pub const EXT_HDR_MORE: u8 = 0x80;
/// Mask of the 48-bit host identifier
pub const HOST_ID_MASK: u64 = 0x0000_ffff_ffff_ffff;

/// Extension header type code (7 bits)
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct ExtHeaderType(pub u8);

newtype_enum! {
impl debug ExtHeaderType {
    Classification = 1,
    InterceptId = 3,
    RawLink = 4,
    Bfs = 5,
    Channelised = 12,
    Signature = 14,
    FlowId = 16,
    HostId = 17,
}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClassificationHeader {
    /// 24 bits of classification flags
    pub flags: u32,
    pub seqnum: u32,
}

impl ClassificationHeader {
    #[inline]
    pub fn search_hit(&self) -> bool {
        self.flags & 0x80_0000 != 0
    }
    #[inline]
    pub fn multiple_search_hits(&self) -> bool {
        self.flags & 0x40_0000 != 0
    }
    #[inline]
    pub fn user_classification(&self) -> u16 {
        ((self.flags & 0x0f_fff0) >> 4) as u16
    }
    #[inline]
    pub fn drop(&self) -> bool {
        self.flags & 0x4 != 0
    }
    #[inline]
    pub fn stream_steering(&self) -> u8 {
        (self.flags & 0x3) as u8
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InterceptIdHeader {
    pub intercept_id: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawLinkHeader {
    pub seqnum: u16,
    pub rate: u8,
    pub link_type: u8,
}

/// Filter/hash ("BFS") extension header
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BfsHeader {
    pub hash: u8,
    pub color: u16,
    pub raw_hash: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelisedHeader {
    pub more_frag_of_frame: bool,
    pub more_fragments: bool,
    pub seqnum: u16,
    pub vc_id: u16,
    pub vc_size: u8,
    pub line_rate: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureHeader {
    pub payload_hash: u32,
    pub color: u8,
    pub flow_hash: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FlowIdHeader {
    pub source_id: u8,
    pub hash_type: u8,
    pub stack_type: u8,
    pub flow_hash: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HostIdHeader {
    pub source_id: u8,
    /// 48-bit host identifier
    pub host_id: u64,
}

/// One decoded extension header
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExtHeader {
    Classification(ClassificationHeader),
    InterceptId(InterceptIdHeader),
    RawLink(RawLinkHeader),
    Bfs(BfsHeader),
    Channelised(ChannelisedHeader),
    Signature(SignatureHeader),
    FlowId(FlowIdHeader),
    HostId(HostIdHeader),
    /// Unrecognized type, with the 56 payload bits
    Unknown { code: u8, payload: u64 },
}

#[inline]
fn field(word: u64, shift: u32, mask: u64) -> u64 {
    (word >> shift) & mask
}

impl ExtHeader {
    /// Decode an extension header from its 64-bit big-endian word
    ///
    /// The continuation bit is ignored here, it is handled by [`ExtHeaderChain`].
    pub fn from_word(word: u64) -> ExtHeader {
        let code = ((word >> 56) as u8) & !EXT_HDR_MORE;
        match ExtHeaderType(code) {
            ExtHeaderType::Classification => ExtHeader::Classification(ClassificationHeader {
                flags: field(word, 32, 0xff_ffff) as u32,
                seqnum: word as u32,
            }),
            ExtHeaderType::InterceptId => ExtHeader::InterceptId(InterceptIdHeader {
                intercept_id: field(word, 32, 0xffff) as u16,
            }),
            ExtHeaderType::RawLink => ExtHeader::RawLink(RawLinkHeader {
                seqnum: field(word, 16, 0xffff) as u16,
                rate: field(word, 8, 0xff) as u8,
                link_type: word as u8,
            }),
            ExtHeaderType::Bfs => ExtHeader::Bfs(BfsHeader {
                hash: field(word, 48, 0xff) as u8,
                color: field(word, 32, 0xffff) as u16,
                raw_hash: word as u32,
            }),
            ExtHeaderType::Channelised => ExtHeader::Channelised(ChannelisedHeader {
                more_frag_of_frame: field(word, 55, 1) != 0,
                more_fragments: field(word, 54, 1) != 0,
                seqnum: field(word, 40, 0x3fff) as u16,
                vc_id: field(word, 16, 0xffff) as u16,
                vc_size: field(word, 8, 0xff) as u8,
                line_rate: word as u8,
            }),
            ExtHeaderType::Signature => ExtHeader::Signature(SignatureHeader {
                payload_hash: field(word, 32, 0xff_ffff) as u32,
                color: field(word, 24, 0xff) as u8,
                flow_hash: field(word, 0, 0xff_ffff) as u32,
            }),
            ExtHeaderType::FlowId => ExtHeader::FlowId(FlowIdHeader {
                source_id: field(word, 48, 0xff) as u8,
                hash_type: field(word, 40, 0xff) as u8,
                stack_type: field(word, 32, 0xff) as u8,
                flow_hash: word as u32,
            }),
            ExtHeaderType::HostId => ExtHeader::HostId(HostIdHeader {
                source_id: field(word, 48, 0xff) as u8,
                host_id: word & HOST_ID_MASK,
            }),
            _ => ExtHeader::Unknown {
                code,
                payload: word & 0x00ff_ffff_ffff_ffff,
            },
        }
    }

    /// The type code of this header
    pub fn header_type(&self) -> ExtHeaderType {
        match self {
            ExtHeader::Classification(_) => ExtHeaderType::Classification,
            ExtHeader::InterceptId(_) => ExtHeaderType::InterceptId,
            ExtHeader::RawLink(_) => ExtHeaderType::RawLink,
            ExtHeader::Bfs(_) => ExtHeaderType::Bfs,
            ExtHeader::Channelised(_) => ExtHeaderType::Channelised,
            ExtHeader::Signature(_) => ExtHeaderType::Signature,
            ExtHeader::FlowId(_) => ExtHeaderType::FlowId,
            ExtHeader::HostId(_) => ExtHeaderType::HostId,
            ExtHeader::Unknown { code, .. } => ExtHeaderType(*code),
        }
    }
}

/// State of an extension header chain walk
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChainStatus {
    /// More headers may be returned
    InProgress,
    /// The last header cleared its continuation bit
    Complete,
    /// The chain length bound was reached while the continuation bit was still set
    LimitReached,
    /// The record ended while the continuation bit was still set
    Truncated,
}

/// Iterator over a self-terminating chain of extension headers
///
/// The walk stops when a header clears its continuation bit, when `max` headers were returned,
/// or when fewer than 8 bytes remain. It never reads past `data` and never loops more than
/// `max` times.
#[derive(Clone, Debug)]
pub struct ExtHeaderChain<'a> {
    data: &'a [u8],
    more: bool,
    index: usize,
    max: usize,
    status: ChainStatus,
}

impl<'a> ExtHeaderChain<'a> {
    /// Create a chain over the bytes following the fixed header
    ///
    /// `more` is the extension-present bit of the record type byte.
    pub fn new(data: &'a [u8], more: bool, max: usize) -> ExtHeaderChain<'a> {
        ExtHeaderChain {
            data,
            more,
            index: 0,
            max,
            status: ChainStatus::InProgress,
        }
    }

    /// Number of bytes consumed by the headers returned so far
    #[inline]
    pub fn consumed(&self) -> usize {
        self.index * EXT_HDR_LEN
    }

    #[inline]
    pub fn status(&self) -> ChainStatus {
        self.status
    }
}

impl<'a> Iterator for ExtHeaderChain<'a> {
    type Item = ExtHeader;

    fn next(&mut self) -> Option<ExtHeader> {
        if self.status != ChainStatus::InProgress {
            return None;
        }
        if !self.more {
            self.status = ChainStatus::Complete;
            return None;
        }
        if self.index >= self.max {
            self.status = ChainStatus::LimitReached;
            return None;
        }
        let start = self.index * EXT_HDR_LEN;
        let word = match self.data.get(start..start + EXT_HDR_LEN) {
            Some(b) => match <[u8; 8]>::try_from(b) {
                Ok(b) => u64::from_be_bytes(b),
                Err(_) => {
                    self.status = ChainStatus::Truncated;
                    return None;
                }
            },
            None => {
                self.status = ChainStatus::Truncated;
                return None;
            }
        };
        self.index += 1;
        self.more = (word >> 56) as u8 & EXT_HDR_MORE != 0;
        Some(ExtHeader::from_word(word))
    }
}

/// Decode a whole extension header chain
///
/// Returns the headers in chain order, the number of bytes they occupy, and the final status.
pub fn parse_ext_headers(
    data: &[u8],
    more: bool,
    max: usize,
) -> (Vec<ExtHeader>, usize, ChainStatus) {
    let mut chain = ExtHeaderChain::new(data, more, max);
    let headers: Vec<ExtHeader> = chain.by_ref().collect();
    (headers, chain.consumed(), chain.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // host id header (more bit set) followed by a flow id header
    const CHAIN: &[u8] = &hex!(
        "
91 05 00 00 DE AD BE EF
10 05 02 01 12 34 56 78"
    );

    #[test]
    fn test_chain() {
        let (headers, consumed, status) = parse_ext_headers(CHAIN, true, 32);
        assert_eq!(consumed, 16);
        assert_eq!(status, ChainStatus::Complete);
        assert_eq!(
            headers[0],
            ExtHeader::HostId(HostIdHeader {
                source_id: 5,
                host_id: 0xdead_beef
            })
        );
        assert_eq!(
            headers[1],
            ExtHeader::FlowId(FlowIdHeader {
                source_id: 5,
                hash_type: 2,
                stack_type: 1,
                flow_hash: 0x1234_5678
            })
        );
    }

    #[test]
    fn test_no_chain() {
        let (headers, consumed, status) = parse_ext_headers(CHAIN, false, 32);
        assert!(headers.is_empty());
        assert_eq!(consumed, 0);
        assert_eq!(status, ChainStatus::Complete);
    }

    #[test]
    fn test_unknown_type_continues() {
        let raw = hex!(
            "
FF 11 22 33 44 55 66 77
03 00 01 02 00 00 00 00"
        );
        let (headers, _, status) = parse_ext_headers(&raw, true, 32);
        assert_eq!(status, ChainStatus::Complete);
        assert_eq!(
            headers[0],
            ExtHeader::Unknown {
                code: 0x7f,
                payload: 0x0011_2233_4455_6677
            }
        );
        assert_eq!(
            headers[1],
            ExtHeader::InterceptId(InterceptIdHeader {
                intercept_id: 0x0102
            })
        );
    }

    #[test]
    fn test_limit_and_truncation() {
        let raw = hex!("81 00 00 00 00 00 00 00 81 00 00 00 00 00 00 00");
        let (headers, _, status) = parse_ext_headers(&raw, true, 1);
        assert_eq!(headers.len(), 1);
        assert_eq!(status, ChainStatus::LimitReached);
        let (headers, consumed, status) = parse_ext_headers(&raw, true, 32);
        assert_eq!(headers.len(), 2);
        assert_eq!(consumed, 16);
        assert_eq!(status, ChainStatus::Truncated);
    }

    #[test]
    fn test_classification_flags() {
        let h = ExtHeader::from_word(0x01c0_0015_0000_002a);
        match h {
            ExtHeader::Classification(c) => {
                assert!(c.search_hit());
                assert!(c.multiple_search_hits());
                assert_eq!(c.user_classification(), 1);
                assert!(c.drop());
                assert_eq!(c.stream_steering(), 1);
                assert_eq!(c.seqnum, 42);
            }
            _ => panic!("unexpected header {:?}", h),
        }
    }
}
