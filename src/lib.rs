//! # ERF and MetaERF parsers
//!
//! This crate contains parsers for captures in the Extensible Record Format (ERF), either
//! stored as a native ERF stream, or encapsulated in a pcap-like container.
//!
//! Each record is decoded into its fixed header, its chain of extension headers, its
//! type-specific sub-header and its payload. Metadata records (MetaERF) are further decoded into
//! sections and typed tags, using a field registry built once from declarative templates.
//! Records are attributed to a host and a source, and associated with the nearest metadata
//! records of the same provenance.
//!
//! Parsers use only safe code and do not copy data (zero-copy). Malformed input never panics:
//! fatal problems are returned as [`ErfError`], and recoverable ones are attached to records as
//! warnings ([`ErfWarning`], [`MetaWarning`]).
//!
//! # Example: streaming parser
//!
//! The following code shows how to parse a native ERF file, using an
//! [ErfReader](struct.ErfReader.html) streaming parser.
//!
//! ```rust
//! use erf_parser::*;
//! use erf_parser::traits::ErfReaderIterator;
//!
//! # let file: &[u8] = &[];
//! // file: any `Read` input, for example a `std::fs::File`
//! let mut num_records = 0;
//! let mut reader = ErfReader::new(65536, file).expect("ErfReader");
//! loop {
//!     match reader.next() {
//!         Ok((offset, record)) => {
//!             println!("got new record, type {:?}", record.erf_type());
//!             num_records += 1;
//!             reader.consume(offset);
//!         },
//!         Err(ErfError::Eof) => break,
//!         Err(ErfError::Incomplete(_)) => {
//!             reader.refill().unwrap();
//!         },
//!         Err(e) => panic!("error while reading: {:?}", e),
//!     }
//! }
//! println!("num_records: {}", num_records);
//! ```
//!
//! # Example: random access
//!
//! [ErfCapture](struct.ErfCapture.html) scans a complete buffer (native ERF, or a container
//! with link type ERF), and gives access to records by number. Records are associated with
//! metadata records found anywhere in the capture.
//!
//! Container frame layouts are detected with [sniff_container](fn.sniff_container.html).

mod capture;
mod config;
mod error;
mod linktype;
mod session;
pub use capture::*;
pub use config::*;
pub use error::*;
pub use linktype::*;
pub use session::*;

pub mod container;
pub mod erf;
pub mod index;
pub mod meta;
pub use container::*;
pub use erf::*;
pub use index::*;
pub use meta::*;

pub mod traits;
