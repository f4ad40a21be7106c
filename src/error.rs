use nom::error::{ErrorKind, ParseError};
use std::fmt;

/// The error type which is returned when reading an ERF stream or container
///
/// Only conditions that make further decoding of the current record or file impossible are
/// reported here. Recoverable problems (bad tags, section length mismatch, too many extension
/// headers, etc.) are attached to the decoded record as warnings instead.
#[derive(Debug, PartialEq)]
pub enum ErfError<I: Sized> {
    /// No more data available (clean end of stream, between records)
    Eof,
    /// An error happened during a `read` operation
    ReadError,
    /// Incomplete read, more data is required. The value is a hint for the missing length
    Incomplete(usize),

    /// The container file header (magic) was not recognized
    HeaderNotRecognized,
    /// Fewer bytes than a fixed ERF header are available
    TruncatedHeader { available: usize },
    /// The record header was read, but the record body is incomplete
    TruncatedRecord { declared: usize, available: usize },
    /// The declared record body length exceeds the configured ceiling
    RecordTooLarge { declared: usize, limit: usize },

    /// An error encountered during parsing
    NomError(I, ErrorKind),
    /// An error encountered during parsing (owned version)
    OwnedNomError(Vec<u8>, ErrorKind),

    /// The streaming buffer is too small to hold a complete record
    BufferTooSmall,
    /// Expected more data but got EOF (truncated stream)
    UnexpectedEof,
}

impl<I> ErfError<I> {
    /// Creates a `ErfError` object with borrowed data
    pub fn from_data_borrowed(input: I, kind: ErrorKind) -> Self {
        ErfError::NomError(input, kind)
    }

    /// Returns true if the error means the stream ended between two records
    pub fn is_eof(&self) -> bool {
        matches!(self, ErfError::Eof)
    }
}

impl<I> ErfError<I>
where
    I: AsRef<[u8]> + Sized,
{
    /// Creates a `ErfError` object with owned data from borrowed data
    pub fn to_owned_vec(&self) -> ErfError<&'static [u8]> {
        match self {
            ErfError::Eof => ErfError::Eof,
            ErfError::ReadError => ErfError::ReadError,
            ErfError::Incomplete(n) => ErfError::Incomplete(*n),
            ErfError::HeaderNotRecognized => ErfError::HeaderNotRecognized,
            ErfError::TruncatedHeader { available } => ErfError::TruncatedHeader {
                available: *available,
            },
            ErfError::TruncatedRecord {
                declared,
                available,
            } => ErfError::TruncatedRecord {
                declared: *declared,
                available: *available,
            },
            ErfError::RecordTooLarge { declared, limit } => ErfError::RecordTooLarge {
                declared: *declared,
                limit: *limit,
            },
            ErfError::NomError(i, e) => ErfError::OwnedNomError(i.as_ref().to_vec(), *e),
            ErfError::OwnedNomError(v, e) => ErfError::OwnedNomError(v.clone(), *e),
            ErfError::BufferTooSmall => ErfError::BufferTooSmall,
            ErfError::UnexpectedEof => ErfError::UnexpectedEof,
        }
    }
}

impl<I> ParseError<I> for ErfError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        ErfError::NomError(input, kind)
    }
    fn append(input: I, kind: ErrorKind, _other: Self) -> Self {
        ErfError::NomError(input, kind)
    }
}

impl<I> fmt::Display for ErfError<I>
where
    I: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErfError::Eof => write!(f, "End of file"),
            ErfError::ReadError => write!(f, "Read error"),
            ErfError::Incomplete(n) => write!(f, "Incomplete read: {}", n),
            ErfError::HeaderNotRecognized => write!(f, "Container header not recognized"),
            ErfError::TruncatedHeader { available } => {
                write!(f, "Truncated ERF header ({} bytes available)", available)
            }
            ErfError::TruncatedRecord {
                declared,
                available,
            } => write!(
                f,
                "Truncated ERF record (declared {} bytes, {} available)",
                declared, available
            ),
            ErfError::RecordTooLarge { declared, limit } => write!(
                f,
                "Record length {} exceeds maximum of {} bytes",
                declared, limit
            ),
            ErfError::NomError(i, e) => write!(f, "Internal parser error {:?}, input {:?}", e, i),
            ErfError::OwnedNomError(i, e) => {
                write!(f, "Internal parser error {:?}, input {:?}", e, &i)
            }
            ErfError::BufferTooSmall => write!(f, "Buffer is too small"),
            ErfError::UnexpectedEof => write!(f, "Unexpected end of file"),
        }
    }
}

impl<I> std::error::Error for ErfError<I> where I: fmt::Debug {}
