//! Type-specific sub-headers
//!
//! Multi-channel record types carry a 4-byte word between the extension headers and the
//! payload, Ethernet types a 2-byte offset/pad prefix. All multi-channel words are read the
//! same way, but the meaning of each bit differs per type, so every type has its own decode
//! routine in [`SUBHEADER_TABLE`].

use crate::erf::ErfType;

#[inline]
fn flag(word: u32, mask: u32) -> bool {
    word & mask != 0
}

#[inline]
fn bits(word: u32, mask: u32) -> u32 {
    (word & mask) >> mask.trailing_zeros()
}

/// Multi-channel HDLC sub-header (also used by colored MC HDLC)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct McHdlcHeader {
    pub connection: u16,
    pub fcs_error: bool,
    pub short_record: bool,
    pub long_record: bool,
    pub aborted_frame: bool,
    pub octet_error: bool,
    pub lost_byte: bool,
    pub first_record: bool,
    pub reserved: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct McRawHeader {
    pub interface: u8,
    pub short_record: bool,
    pub long_record: bool,
    pub first_record: bool,
    pub reserved: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct McAtmHeader {
    pub connection: u16,
    pub port: u8,
    pub lost_byte: bool,
    pub hec_corrected: bool,
    pub oam_crc10_error: bool,
    pub oam_cell: bool,
    pub first_record: bool,
    pub reserved: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct McRawChannelHeader {
    pub channel: u8,
    pub lost_byte: bool,
    pub first_record: bool,
    pub reserved: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct McAal5Header {
    pub connection: u16,
    pub port: u8,
    pub crc_checked: bool,
    pub crc_error: bool,
    pub length_checked: bool,
    pub length_error: bool,
    pub first_record: bool,
    pub reserved: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct McAal2Header {
    pub connection: u16,
    pub channel_id: u8,
    pub maal_error: bool,
    pub length_error: bool,
    pub first_record: bool,
    pub reserved: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Aal2Header {
    pub channel_id: u8,
    pub maal_error: bool,
    pub length_error: bool,
    pub reserved: u32,
}

/// Ethernet offset/pad prefix
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EthPadHeader {
    pub offset: u8,
    pub pad: u8,
}

/// A decoded type-specific sub-header
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubHeader {
    McHdlc(McHdlcHeader),
    McRaw(McRawHeader),
    McAtm(McAtmHeader),
    McRawChannel(McRawChannelHeader),
    McAal5(McAal5Header),
    McAal2(McAal2Header),
    Aal2(Aal2Header),
    Eth(EthPadHeader),
}

impl SubHeader {
    /// On-wire length of the sub-header
    pub fn len(&self) -> usize {
        match self {
            SubHeader::Eth(_) => 2,
            _ => 4,
        }
    }

    /// Channel or connection number, for multi-channel types
    pub fn channel(&self) -> Option<u32> {
        match self {
            SubHeader::McHdlc(h) => Some(u32::from(h.connection)),
            SubHeader::McRaw(h) => Some(u32::from(h.interface)),
            SubHeader::McAtm(h) => Some(u32::from(h.connection)),
            SubHeader::McRawChannel(h) => Some(u32::from(h.channel)),
            SubHeader::McAal5(h) => Some(u32::from(h.connection)),
            SubHeader::McAal2(h) => Some(u32::from(h.connection)),
            SubHeader::Aal2(h) => Some(u32::from(h.channel_id)),
            SubHeader::Eth(_) => None,
        }
    }
}

fn decode_mc_hdlc(w: u32) -> SubHeader {
    SubHeader::McHdlc(McHdlcHeader {
        connection: bits(w, 0x0000_03ff) as u16,
        fcs_error: flag(w, 0x0100_0000),
        short_record: flag(w, 0x0200_0000),
        long_record: flag(w, 0x0400_0000),
        aborted_frame: flag(w, 0x0800_0000),
        octet_error: flag(w, 0x1000_0000),
        lost_byte: flag(w, 0x2000_0000),
        first_record: flag(w, 0x4000_0000),
        reserved: w & 0x80ff_fc00,
    })
}

fn decode_mc_raw(w: u32) -> SubHeader {
    SubHeader::McRaw(McRawHeader {
        interface: bits(w, 0x0000_000f) as u8,
        short_record: flag(w, 0x0100_0000),
        long_record: flag(w, 0x0200_0000),
        first_record: flag(w, 0x4000_0000),
        reserved: w & 0xbcff_fff0,
    })
}

fn decode_mc_atm(w: u32) -> SubHeader {
    SubHeader::McAtm(McAtmHeader {
        connection: bits(w, 0x0000_03ff) as u16,
        port: bits(w, 0x000f_0000) as u8,
        lost_byte: flag(w, 0x0100_0000),
        hec_corrected: flag(w, 0x0200_0000),
        oam_crc10_error: flag(w, 0x0400_0000),
        oam_cell: flag(w, 0x0800_0000),
        first_record: flag(w, 0x1000_0000),
        reserved: w & 0xe0f0_fc00,
    })
}

fn decode_mc_raw_channel(w: u32) -> SubHeader {
    SubHeader::McRawChannel(McRawChannelHeader {
        channel: bits(w, 0x0000_00ff) as u8,
        lost_byte: flag(w, 0x0100_0000),
        first_record: flag(w, 0x4000_0000),
        reserved: w & 0xbeff_ff00,
    })
}

fn decode_mc_aal5(w: u32) -> SubHeader {
    SubHeader::McAal5(McAal5Header {
        connection: bits(w, 0x0000_03ff) as u16,
        port: bits(w, 0x000f_0000) as u8,
        crc_checked: flag(w, 0x0100_0000),
        crc_error: flag(w, 0x0200_0000),
        length_checked: flag(w, 0x0400_0000),
        length_error: flag(w, 0x0800_0000),
        first_record: flag(w, 0x4000_0000),
        reserved: w & 0xb0f0_fc00,
    })
}

fn decode_mc_aal2(w: u32) -> SubHeader {
    SubHeader::McAal2(McAal2Header {
        connection: bits(w, 0x0000_03ff) as u16,
        channel_id: bits(w, 0x00ff_0000) as u8,
        maal_error: flag(w, 0x0100_0000),
        length_error: flag(w, 0x0200_0000),
        first_record: flag(w, 0x4000_0000),
        reserved: w & 0xbc00_fc00,
    })
}

fn decode_aal2(w: u32) -> SubHeader {
    SubHeader::Aal2(Aal2Header {
        channel_id: bits(w, 0x0000_00ff) as u8,
        maal_error: flag(w, 0x0100_0000),
        length_error: flag(w, 0x0200_0000),
        reserved: w & 0xfcff_ff00,
    })
}

fn decode_eth(w: u32) -> SubHeader {
    SubHeader::Eth(EthPadHeader {
        offset: bits(w, 0xff00) as u8,
        pad: bits(w, 0x00ff) as u8,
    })
}

/// Entry of the sub-header decode table
pub struct SubHeaderDecoder {
    pub erf_type: ErfType,
    /// Sub-header length, in bytes (at most 4)
    pub len: usize,
    /// Decode routine, given the big-endian value of the `len` bytes
    pub decode: fn(u32) -> SubHeader,
}

#[rustfmt::skip]
pub const SUBHEADER_TABLE: &[SubHeaderDecoder] = &[
    SubHeaderDecoder { erf_type: ErfType::McHdlc, len: 4, decode: decode_mc_hdlc },
    SubHeaderDecoder { erf_type: ErfType::ColorMcHdlcPos, len: 4, decode: decode_mc_hdlc },
    SubHeaderDecoder { erf_type: ErfType::McRaw, len: 4, decode: decode_mc_raw },
    SubHeaderDecoder { erf_type: ErfType::McAtm, len: 4, decode: decode_mc_atm },
    SubHeaderDecoder { erf_type: ErfType::McRawChannel, len: 4, decode: decode_mc_raw_channel },
    SubHeaderDecoder { erf_type: ErfType::McAal5, len: 4, decode: decode_mc_aal5 },
    SubHeaderDecoder { erf_type: ErfType::McAal2, len: 4, decode: decode_mc_aal2 },
    SubHeaderDecoder { erf_type: ErfType::Aal2, len: 4, decode: decode_aal2 },
    SubHeaderDecoder { erf_type: ErfType::Eth, len: 2, decode: decode_eth },
    SubHeaderDecoder { erf_type: ErfType::ColorEth, len: 2, decode: decode_eth },
    SubHeaderDecoder { erf_type: ErfType::DsmColorEth, len: 2, decode: decode_eth },
    SubHeaderDecoder { erf_type: ErfType::ColorHashEth, len: 2, decode: decode_eth },
];

/// Find the sub-header decoder of a record type
pub fn subheader_decoder(erf_type: ErfType) -> Option<&'static SubHeaderDecoder> {
    SUBHEADER_TABLE.iter().find(|d| d.erf_type == erf_type)
}

/// Result of a sub-header decode
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubHeaderResult {
    /// Known type without sub-header
    Absent,
    Decoded(SubHeader),
    /// The record is too short to hold the sub-header
    Truncated { needed: usize, available: usize },
    /// Record type is not recognized, the payload starts right after the extension headers
    UnknownType,
}

/// Decode the sub-header of a record of type `erf_type`, from the bytes following the
/// extension headers
pub fn decode_subheader(erf_type: ErfType, i: &[u8]) -> SubHeaderResult {
    match subheader_decoder(erf_type) {
        Some(d) => {
            if i.len() < d.len {
                return SubHeaderResult::Truncated {
                    needed: d.len,
                    available: i.len(),
                };
            }
            let word = i[..d.len]
                .iter()
                .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
            SubHeaderResult::Decoded((d.decode)(word))
        }
        None if erf_type.is_known() => SubHeaderResult::Absent,
        None => SubHeaderResult::UnknownType,
    }
}
