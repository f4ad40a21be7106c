use nom::number::streaming::{be_u16, be_u8, le_u64};
use nom::{IResult, Needed};
use rusticata_macros::newtype_enum;

use crate::erf::ErfTimestamp;
use crate::ErfError;

/// Size of the fixed ERF record header, in bytes
pub const ERF_HEADER_LEN: usize = 16;

/// Bit of the type byte signalling that extension headers follow the fixed header
pub const ERF_EXT_HDR_PRESENT: u8 = 0x80;
/// Mask of the record type code in the type byte
pub const ERF_TYPE_MASK: u8 = 0x7f;

/// ERF record type code (7 bits)
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct ErfType(pub u8);

newtype_enum! {
impl debug ErfType {
    Legacy = 0,
    HdlcPos = 1,
    Eth = 2,
    Atm = 3,
    Aal5 = 4,
    McHdlc = 5,
    McRaw = 6,
    McAtm = 7,
    McRawChannel = 8,
    McAal5 = 9,
    ColorHdlcPos = 10,
    ColorEth = 11,
    McAal2 = 12,
    IpCounter = 13,
    TcpFlowCounter = 14,
    DsmColorHdlcPos = 15,
    DsmColorEth = 16,
    ColorMcHdlcPos = 17,
    Aal2 = 18,
    ColorHashPos = 19,
    ColorHashEth = 20,
    Infiniband = 21,
    Ipv4 = 22,
    Ipv6 = 23,
    RawLink = 24,
    InfinibandLink = 25,
    Meta = 27,
    OpaSnc = 28,
    Opa9b = 29,
    Pad = 48,
}
}

impl ErfType {
    /// Returns true if this type code is one of the documented record types
    pub fn is_known(self) -> bool {
        matches!(self.0, 0..=25 | 27..=29 | 48)
    }

    /// Returns true for the Ethernet family, which carries a 2-byte offset/pad sub-header
    pub fn is_ethernet(self) -> bool {
        matches!(
            self,
            ErfType::Eth | ErfType::ColorEth | ErfType::DsmColorEth | ErfType::ColorHashEth
        )
    }
}

/// ERF flags byte
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ErfFlags(pub u8);

impl ErfFlags {
    pub const CAP_MASK: u8 = 0x03;
    pub const VARLEN: u8 = 0x04;
    pub const TRUNCATED: u8 = 0x08;
    pub const RX_ERROR: u8 = 0x10;
    pub const DS_ERROR: u8 = 0x20;
    pub const CAP_HIGH: u8 = 0x40;
    pub const RESERVED: u8 = 0x80;

    /// Capture interface, bits 0-1 extended by bit 6
    #[inline]
    pub fn interface(self) -> u8 {
        (self.0 & Self::CAP_MASK) | ((self.0 & Self::CAP_HIGH) >> 4)
    }
    #[inline]
    pub fn varlen(self) -> bool {
        self.0 & Self::VARLEN != 0
    }
    #[inline]
    pub fn truncated(self) -> bool {
        self.0 & Self::TRUNCATED != 0
    }
    #[inline]
    pub fn rx_error(self) -> bool {
        self.0 & Self::RX_ERROR != 0
    }
    #[inline]
    pub fn ds_error(self) -> bool {
        self.0 & Self::DS_ERROR != 0
    }
    #[inline]
    pub fn reserved(self) -> u8 {
        self.0 & Self::RESERVED
    }
}

/// Fixed ERF record header
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErfHeader {
    /// Capture timestamp
    pub ts: ErfTimestamp,
    /// Record type code and extension header present bit
    pub type_byte: u8,
    pub flags: ErfFlags,
    /// Declared record length, including this header
    pub rlen: u16,
    /// Loss counter (color/flow information on colored types)
    pub lctr: u16,
    /// Length of the frame on the wire
    pub wlen: u16,
}

impl ErfHeader {
    #[inline]
    pub fn erf_type(&self) -> ErfType {
        ErfType(self.type_byte & ERF_TYPE_MASK)
    }

    /// Returns true if at least one extension header follows the fixed header
    #[inline]
    pub fn has_ext_headers(&self) -> bool {
        self.type_byte & ERF_EXT_HDR_PRESENT != 0
    }

    #[inline]
    pub fn is_meta(&self) -> bool {
        self.erf_type() == ErfType::Meta
    }

    /// Declared record length, including the fixed header
    #[inline]
    pub fn record_len(&self) -> usize {
        usize::from(self.rlen)
    }

    /// Returns true if the declared record length is shorter than the fixed header
    #[inline]
    pub fn is_malformed(&self) -> bool {
        self.record_len() < ERF_HEADER_LEN
    }

    /// Number of bytes following the fixed header, 0 for malformed records
    #[inline]
    pub fn body_len(&self) -> usize {
        self.record_len().saturating_sub(ERF_HEADER_LEN)
    }

    /// Number of bytes to skip to reach the next record
    ///
    /// Malformed records still occupy at least one fixed header, so a stream never stalls.
    #[inline]
    pub fn stride(&self) -> usize {
        self.record_len().max(ERF_HEADER_LEN)
    }
}

/// Read a fixed ERF record header (streaming)
///
/// Returns `Incomplete` if fewer than 16 bytes are available.
pub fn parse_erf_header(i: &[u8]) -> IResult<&[u8], ErfHeader, ErfError<&[u8]>> {
    if i.len() < ERF_HEADER_LEN {
        return Err(nom::Err::Incomplete(Needed::new(ERF_HEADER_LEN - i.len())));
    }
    let (i, ts) = le_u64(i)?;
    let (i, type_byte) = be_u8(i)?;
    let (i, flags) = be_u8(i)?;
    let (i, rlen) = be_u16(i)?;
    let (i, lctr) = be_u16(i)?;
    let (i, wlen) = be_u16(i)?;
    let header = ErfHeader {
        ts: ErfTimestamp(ts),
        type_byte,
        flags: ErfFlags(flags),
        rlen,
        lctr,
        wlen,
    };
    Ok((i, header))
}

/// Check the declared body length of a record against the ceiling
///
/// Returns the number of body bytes to consume.
pub fn check_record_len<I>(header: &ErfHeader, max_body_len: usize) -> Result<usize, ErfError<I>> {
    let body_len = header.body_len();
    if body_len > max_body_len {
        tracing::warn!(
            declared = body_len,
            limit = max_body_len,
            "ERF record length exceeds ceiling"
        );
        return Err(ErfError::RecordTooLarge {
            declared: body_len,
            limit: max_body_len,
        });
    }
    Ok(body_len)
}

/// Decode a fixed ERF record header from a complete buffer
///
/// Returns the header and the number of body bytes still to be consumed for this record.
/// The body length is checked against `max_body_len` before the caller allocates or reads it.
pub fn decode_erf_header(
    i: &[u8],
    max_body_len: usize,
) -> Result<(ErfHeader, usize), ErfError<&[u8]>> {
    let header = match parse_erf_header(i) {
        Ok((_, header)) => header,
        Err(nom::Err::Incomplete(_)) => {
            return Err(ErfError::TruncatedHeader { available: i.len() })
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => return Err(e),
    };
    let body_len = check_record_len(&header, max_body_len)?;
    Ok((header, body_len))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hex_literal::hex;

    // Ethernet record, 2 bytes of pad sub-header and a 60-byte frame
    pub const ETH_HEADER: &[u8] = &hex!(
        "
00 00 00 80 5F 5E 10 00 02 04 00 50 00 00 00 40"
    );

    #[test]
    fn test_parse_erf_header() {
        let (rem, hdr) = parse_erf_header(ETH_HEADER).expect("header parsing failed");
        assert!(rem.is_empty());
        assert_eq!(hdr.ts.seconds(), 0x0010_5e5f);
        assert_eq!(hdr.ts.fraction(), 0x8000_0000);
        assert_eq!(hdr.erf_type(), ErfType::Eth);
        assert!(!hdr.has_ext_headers());
        assert!(hdr.flags.varlen());
        assert_eq!(hdr.flags.interface(), 0);
        assert_eq!(hdr.rlen, 80);
        assert_eq!(hdr.wlen, 64);
        assert_eq!(hdr.body_len(), 64);
    }

    #[test]
    fn test_short_header() {
        let res = decode_erf_header(&ETH_HEADER[..10], 65535);
        assert_eq!(res, Err(ErfError::TruncatedHeader { available: 10 }));
        assert!(matches!(
            parse_erf_header(&ETH_HEADER[..10]),
            Err(nom::Err::Incomplete(_))
        ));
    }

    #[test]
    fn test_ceiling() {
        let res = decode_erf_header(ETH_HEADER, 32);
        assert_eq!(
            res,
            Err(ErfError::RecordTooLarge {
                declared: 64,
                limit: 32
            })
        );
        let (_, body) = decode_erf_header(ETH_HEADER, 64).expect("decode failed");
        assert_eq!(body, 64);
    }

    #[test]
    fn test_malformed_length() {
        let mut raw = ETH_HEADER.to_vec();
        raw[10] = 0;
        raw[11] = 8;
        let (hdr, body) = decode_erf_header(&raw, 65535).expect("decode failed");
        assert!(hdr.is_malformed());
        assert_eq!(body, 0);
        assert_eq!(hdr.stride(), ERF_HEADER_LEN);
    }

    #[test]
    fn test_interface_high_bit() {
        assert_eq!(ErfFlags(0x43).interface(), 7);
        assert_eq!(ErfFlags(0x01).interface(), 1);
    }
}
