use std::fmt;
use std::ops::Range;

use nom::Offset;

use crate::config::ErfConfig;
use crate::container::{
    parse_container_header, sniff_container, ContainerHeader, ContainerLayout, ContainerSlice,
};
use crate::erf::{decode_erf_record, parse_erf_header, ErfRecord, ErfType, ERF_HEADER_LEN};
use crate::error::ErfError;
use crate::meta::MetaRegistry;
use crate::session::ErfSession;

/// Number of leading records checked by [`probe_native_erf`]
const PROBE_RECORDS: usize = 2;

/// Returns true if `i` looks like the start of a native ERF stream
///
/// Checks the first records (at most two): known record type, record length covering at least
/// the fixed header, and reserved flag bit unset.
pub fn probe_native_erf(i: &[u8]) -> bool {
    let mut offset = 0;
    let mut checked = 0;
    while checked < PROBE_RECORDS && offset < i.len() {
        let header = match parse_erf_header(&i[offset..]) {
            Ok((_, header)) => header,
            Err(_) => break,
        };
        let erf_type = header.erf_type();
        if !erf_type.is_known()
            || erf_type == ErfType::Legacy
            || header.record_len() < ERF_HEADER_LEN
            || header.flags.reserved() != 0
        {
            return false;
        }
        offset += header.stride();
        checked += 1;
    }
    checked > 0
}

/// In-memory ERF capture, with random access to records
///
/// The whole input is scanned once when the capture is created: record boundaries are stored,
/// and the temporal index of the decode session is filled. Records are then decoded on demand
/// with [`record_at`](ErfCapture::record_at), and associated with the metadata records of the
/// complete capture (including metadata records located after them).
///
/// Record positions are record numbers, starting at 0.
///
/// ```rust
/// use erf_parser::*;
///
/// # let data: &[u8] = &[0, 0, 0, 0, 0, 0, 0, 0, 0x1b, 0, 0, 0x10, 0, 0, 0, 0];
/// let capture = ErfCapture::from_slice(data, ErfConfig::default()).expect("ErfCapture");
/// for record in capture.iter() {
///     let record = record.expect("record");
///     println!("{} {:?}", record.header.ts, record.erf_type());
/// }
/// ```
pub struct ErfCapture<'a> {
    /// Container file header, if the records are stored in a container
    pub header: Option<ContainerHeader>,
    /// Container frame layout, if the records are stored in a container
    pub layout: Option<ContainerLayout>,

    data: &'a [u8],
    records: Vec<Range<usize>>,
    session: ErfSession,
}

impl<'a> ErfCapture<'a> {
    /// Scan a native ERF stream or a container, whichever `i` holds
    pub fn from_slice(
        i: &'a [u8],
        config: ErfConfig,
    ) -> Result<ErfCapture<'a>, ErfError<&'a [u8]>> {
        if parse_container_header(i).is_ok() {
            ErfCapture::from_container(i, config)
        } else if probe_native_erf(i) {
            ErfCapture::from_native(i, config)
        } else {
            Err(ErfError::HeaderNotRecognized)
        }
    }

    /// Scan a native ERF stream (records stored back to back, without file header)
    ///
    /// A truncated last record is kept: accessing it returns the truncation error.
    pub fn from_native(
        i: &'a [u8],
        config: ErfConfig,
    ) -> Result<ErfCapture<'a>, ErfError<&'a [u8]>> {
        let mut session = ErfSession::new(config);
        let mut records = Vec::new();
        let mut offset = 0;
        while offset < i.len() {
            let position = records.len() as u64;
            match session.decode_record(position, &i[offset..]) {
                Ok((_, consumed)) => {
                    records.push(offset..offset + consumed);
                    offset += consumed;
                }
                Err(e @ ErfError::TruncatedHeader { .. })
                | Err(e @ ErfError::TruncatedRecord { .. }) => {
                    tracing::debug!(offset, error = %e, "truncated record at end of capture");
                    records.push(offset..i.len());
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(ErfCapture {
            header: None,
            layout: None,
            data: i,
            records,
            session,
        })
    }

    /// Scan a container whose frames each hold one ERF record
    ///
    /// The frame layout is chosen by [`sniff_container`], and the record ceiling is tightened by
    /// the container snapshot length. Containers with another link type are rejected with
    /// `HeaderNotRecognized`.
    pub fn from_container(
        i: &'a [u8],
        config: ErfConfig,
    ) -> Result<ErfCapture<'a>, ErfError<&'a [u8]>> {
        let sniff = sniff_container(i)?;
        if !sniff.header.network.is_erf() {
            tracing::debug!(
                linktype = %sniff.header.network,
                "container does not hold ERF records"
            );
            return Err(ErfError::HeaderNotRecognized);
        }
        let config = config.limited_by_snaplen(sniff.header.snaplen);
        let mut session = ErfSession::new(config);
        let mut records = Vec::new();
        for frame in ContainerSlice::with_layout(i, sniff.layout)? {
            let frame = match frame {
                Ok(frame) => frame,
                Err(nom::Err::Incomplete(_)) => {
                    tracing::debug!(
                        records = records.len(),
                        "truncated frame at end of container"
                    );
                    break;
                }
                Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => return Err(e),
            };
            let start = i.offset(frame.data);
            let position = records.len() as u64;
            match session.decode_record(position, frame.data) {
                Ok(_) => (),
                Err(e @ ErfError::TruncatedHeader { .. })
                | Err(e @ ErfError::TruncatedRecord { .. }) => {
                    tracing::debug!(position, error = %e, "truncated record in container frame");
                }
                Err(e) => return Err(e),
            }
            records.push(start..start + frame.data.len());
        }
        Ok(ErfCapture {
            header: Some(sniff.header),
            layout: Some(sniff.layout),
            data: i,
            records,
            session,
        })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The decode session, holding the temporal index of the whole capture
    pub fn session(&self) -> &ErfSession {
        &self.session
    }

    /// Byte range of record `n` in the input
    pub fn record_range(&self, n: usize) -> Option<Range<usize>> {
        self.records.get(n).cloned()
    }

    /// Decode record `n`, and associate it with the metadata records of the capture
    ///
    /// Returns `None` if `n` is out of bounds.
    pub fn record_at(&self, n: usize) -> Option<Result<ErfRecord<'a>, ErfError<&'a [u8]>>> {
        let data: &'a [u8] = self.data;
        let range = self.records.get(n)?.clone();
        let r = decode_erf_record(&data[range], self.session.config(), MetaRegistry::global()).map(
            |(mut record, _)| {
                self.session.lookup_record(n as u64, &mut record);
                record
            },
        );
        Some(r)
    }

    /// Iterate over all records, in capture order
    pub fn iter<'b>(&'b self) -> ErfCaptureIterator<'a, 'b> {
        ErfCaptureIterator { cap: self, idx: 0 }
    }
}

impl<'a> fmt::Debug for ErfCapture<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "ErfCapture: {} records", self.records.len())
    }
}

/// Iterator over `ErfCapture`
pub struct ErfCaptureIterator<'a, 'b> {
    cap: &'b ErfCapture<'a>,
    idx: usize,
}

impl<'a, 'b> Iterator for ErfCaptureIterator<'a, 'b> {
    type Item = Result<ErfRecord<'a>, ErfError<&'a [u8]>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cap.record_at(self.idx).map(|r| {
            self.idx += 1;
            r
        })
    }
}
