use std::ops::Range;

use nom::bytes::streaming::take;
use nom::IResult;

use crate::config::ErfConfig;
use crate::erf::{
    check_record_len, decode_erf_header, decode_subheader, parse_erf_header, ChainStatus,
    ErfHeader, ErfType, ExtHeader, ExtHeaderChain, FlowIdHeader, HostIdHeader, SubHeader,
    SubHeaderResult, ERF_HEADER_LEN,
};
use crate::index::{Nearest, SourceKey};
use crate::meta::{decode_meta_record, MetaRecord, MetaRegistry};
use crate::ErfError;

/// Recoverable problem attached to a decoded record
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErfWarning {
    /// The declared record length cannot hold the fixed header, extension headers and
    /// sub-header. The payload is empty.
    Malformed { rlen: u16 },
    /// The extension header chain length bound was reached with the continuation bit set
    ExtHeadersNotFullyShown { shown: usize },
    /// The record ended inside the extension header chain
    ExtHeadersTruncated,
    /// The record type is not recognized, no sub-header was decoded
    UnknownRecordType(ErfType),
    /// The record is too short for the sub-header of its type
    SubHeaderTruncated { needed: usize, available: usize },
}

/// A decoded ERF record
#[derive(Clone, Debug, PartialEq)]
pub struct ErfRecord<'a> {
    pub header: ErfHeader,
    /// Extension headers, in chain order
    pub ext_headers: Vec<ExtHeader>,
    pub subheader: Option<SubHeader>,
    /// Payload bytes, for downstream protocol decoders
    pub payload: &'a [u8],
    /// Location of the payload, relative to the start of the record
    pub payload_range: Range<usize>,
    /// Decoded tag stream, for metadata records
    pub meta: Option<MetaRecord<'a>>,
    pub warnings: Vec<ErfWarning>,
    /// Host and source the record was attributed to, set by the decode session
    pub provenance: Option<SourceKey>,
    /// Metadata records in scope, set by the decode session
    ///
    /// For a metadata record, `prev` is the preceding metadata record with the same
    /// provenance, never the record itself.
    pub association: Nearest,
}

impl<'a> ErfRecord<'a> {
    #[inline]
    pub fn erf_type(&self) -> ErfType {
        self.header.erf_type()
    }

    #[inline]
    pub fn is_meta(&self) -> bool {
        self.header.is_meta()
    }

    /// Returns true if the record carries a `Malformed` warning
    pub fn is_malformed(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ErfWarning::Malformed { .. }))
    }

    /// First host id extension header of the chain
    pub fn host_id_header(&self) -> Option<&HostIdHeader> {
        self.ext_headers.iter().find_map(|h| match h {
            ExtHeader::HostId(h) => Some(h),
            _ => None,
        })
    }

    /// First flow id extension header of the chain
    pub fn flow_id_header(&self) -> Option<&FlowIdHeader> {
        self.ext_headers.iter().find_map(|h| match h {
            ExtHeader::FlowId(h) => Some(h),
            _ => None,
        })
    }
}

/// Split the body of a record (the bytes following the fixed header, `rlen - 16` bytes) into
/// extension headers, sub-header and payload
fn assemble<'a>(
    header: ErfHeader,
    body: &'a [u8],
    config: &ErfConfig,
    registry: &'a MetaRegistry,
) -> ErfRecord<'a> {
    let mut warnings = Vec::new();
    let empty = ERF_HEADER_LEN..ERF_HEADER_LEN;
    if header.is_malformed() {
        warnings.push(ErfWarning::Malformed { rlen: header.rlen });
    }

    let mut chain = ExtHeaderChain::new(body, header.has_ext_headers(), config.max_ext_headers);
    let ext_headers: Vec<ExtHeader> = chain.by_ref().collect();
    let ext_len = chain.consumed();
    let mut payload_ok = !header.is_malformed();
    match chain.status() {
        ChainStatus::LimitReached => warnings.push(ErfWarning::ExtHeadersNotFullyShown {
            shown: ext_headers.len(),
        }),
        ChainStatus::Truncated => {
            warnings.push(ErfWarning::ExtHeadersTruncated);
            if payload_ok {
                warnings.push(ErfWarning::Malformed { rlen: header.rlen });
            }
            payload_ok = false;
        }
        ChainStatus::Complete | ChainStatus::InProgress => (),
    }

    let rest = &body[ext_len..];
    let mut subheader = None;
    let mut sub_len = 0;
    if payload_ok {
        match decode_subheader(header.erf_type(), rest) {
            SubHeaderResult::Decoded(sh) => {
                sub_len = sh.len();
                subheader = Some(sh);
            }
            SubHeaderResult::Truncated { needed, available } => {
                warnings.push(ErfWarning::SubHeaderTruncated { needed, available });
                warnings.push(ErfWarning::Malformed { rlen: header.rlen });
                payload_ok = false;
            }
            SubHeaderResult::UnknownType => {
                warnings.push(ErfWarning::UnknownRecordType(header.erf_type()))
            }
            SubHeaderResult::Absent => (),
        }
    }

    let (payload, payload_range) = if payload_ok {
        let start = ext_len + sub_len;
        (
            &body[start..],
            ERF_HEADER_LEN + start..ERF_HEADER_LEN + body.len(),
        )
    } else {
        (&body[body.len()..], empty)
    };

    let meta = if header.is_meta() && config.decode_meta && payload_ok {
        Some(decode_meta_record(payload, registry))
    } else {
        None
    };

    for w in &warnings {
        tracing::trace!(warning = ?w, "ERF record warning");
    }

    ErfRecord {
        header,
        ext_headers,
        subheader,
        payload,
        payload_range,
        meta,
        warnings,
        provenance: None,
        association: Nearest::default(),
    }
}

/// Read a complete ERF record (streaming)
///
/// Returns `Incomplete` if the record is not fully available, and a `RecordTooLarge` failure if
/// the declared length exceeds the configured ceiling.
pub fn parse_erf_record<'a>(
    i: &'a [u8],
    config: &ErfConfig,
    registry: &'a MetaRegistry,
) -> IResult<&'a [u8], ErfRecord<'a>, ErfError<&'a [u8]>> {
    let (i, header) = parse_erf_header(i)?;
    let body_len = check_record_len(&header, config.max_record_len).map_err(nom::Err::Failure)?;
    let (i, body) = take(body_len)(i)?;
    Ok((i, assemble(header, body, config, registry)))
}

/// Decode one ERF record from the start of a complete buffer
///
/// Returns the record and the number of bytes it occupies. Missing bytes are reported as
/// `TruncatedHeader` or `TruncatedRecord`.
pub fn decode_erf_record<'a>(
    i: &'a [u8],
    config: &ErfConfig,
    registry: &'a MetaRegistry,
) -> Result<(ErfRecord<'a>, usize), ErfError<&'a [u8]>> {
    let (header, body_len) = decode_erf_header(i, config.max_record_len)?;
    let end = ERF_HEADER_LEN + body_len;
    let body = match i.get(ERF_HEADER_LEN..end) {
        Some(body) => body,
        None => {
            return Err(ErfError::TruncatedRecord {
                declared: end,
                available: i.len(),
            })
        }
    };
    Ok((assemble(header, body, config, registry), end))
}
