use crate::config::ErfConfig;
use crate::erf::parse_erf_record;
use crate::error::ErfError;
use crate::meta::MetaRegistry;
use crate::session::ErfSession;
use crate::traits::{ErfReaderIterator, RecordResult};
use circular::Buffer;
use nom::{Needed, Offset};
use std::io::Read;

/// Parsing iterator over a native ERF stream (streaming version)
///
/// ## ERF Reader
///
/// This reader is a streaming parser based on a circular buffer, which means memory
/// usage is constant, and that it can be used to parse huge files or infinite streams.
/// It creates an abstraction over any input providing the `Read` trait, and takes care
/// of managing the circular buffer to provide an iterator-like interface.
///
/// Native ERF streams have no file header: every call to `next` returns a record. Records are
/// attributed to their host and source by the reader's [`ErfSession`], using the byte offset of
/// the record in the stream as its position.
///
/// The size of the circular buffer has to be big enough for at least one complete record. Using a
/// larger value (at least 65k) is advised to avoid frequent reads and buffer shifts.
///
/// **There are precautions to take when reading multiple records before consuming data. See
/// [`ErfReaderIterator`] for details.**
///
/// ## Example
///
/// ```rust
/// use erf_parser::*;
/// use erf_parser::traits::ErfReaderIterator;
///
/// # let data: &[u8] = &[0, 0, 0, 0, 0, 0, 0, 0, 0x1b, 0, 0, 0x10, 0, 0, 0, 0];
/// let mut num_records = 0;
/// let mut reader = ErfReader::new(65536, data).expect("ErfReader");
/// loop {
///     match reader.next() {
///         Ok((offset, record)) => {
///             num_records += 1;
///             if let Some(meta) = &record.meta {
///                 println!("metadata: {} tags", meta.entries.len());
///             }
///             reader.consume(offset);
///         },
///         Err(ErfError::Eof) => break,
///         Err(ErfError::Incomplete(_)) => {
///             reader.refill().unwrap();
///         },
///         Err(e) => panic!("error while reading: {:?}", e),
///     }
/// }
/// assert_eq!(num_records, 1);
/// ```
pub struct ErfReader<R>
where
    R: Read,
{
    reader: R,
    buffer: Buffer,
    consumed: usize,
    reader_exhausted: bool,
    session: ErfSession,
}

impl<R> ErfReader<R>
where
    R: Read,
{
    /// Creates a new `ErfReader<R>` with the provided buffer capacity.
    pub fn new(capacity: usize, reader: R) -> Result<ErfReader<R>, ErfError<&'static [u8]>> {
        Self::with_config(capacity, reader, ErfConfig::default())
    }

    /// Creates a new `ErfReader<R>` with the provided buffer capacity and decoder settings.
    pub fn with_config(
        capacity: usize,
        reader: R,
        config: ErfConfig,
    ) -> Result<ErfReader<R>, ErfError<&'static [u8]>> {
        let buffer = Buffer::with_capacity(capacity);
        Self::from_buffer(buffer, reader, config)
    }

    /// Creates a new `ErfReader<R>` using the provided `Buffer`.
    pub fn from_buffer(
        mut buffer: Buffer,
        mut reader: R,
        config: ErfConfig,
    ) -> Result<ErfReader<R>, ErfError<&'static [u8]>> {
        let sz = reader.read(buffer.space()).or(Err(ErfError::ReadError))?;
        buffer.fill(sz);
        Ok(ErfReader {
            reader,
            buffer,
            consumed: 0,
            reader_exhausted: sz == 0,
            session: ErfSession::new(config),
        })
    }

    /// The decode session, holding the temporal index built so far
    pub fn session(&self) -> &ErfSession {
        &self.session
    }

    /// Consume the reader, keeping the decode session for later random access
    pub fn into_session(self) -> ErfSession {
        self.session
    }
}

impl<R> ErfReaderIterator for ErfReader<R>
where
    R: Read,
{
    fn next(&mut self) -> RecordResult {
        // Return EOF if
        // 1) all bytes have been read
        // 2) no more data is available
        if self.buffer.available_data() == 0
            && (self.buffer.position() == 0 && self.reader_exhausted)
        {
            return Err(ErfError::Eof);
        }
        let data = self.buffer.data();
        match parse_erf_record(data, self.session.config(), MetaRegistry::global()) {
            Ok((rem, mut record)) => {
                let offset = data.offset(rem);
                self.session.scan_record(self.consumed as u64, &mut record);
                Ok((offset, record))
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
            Err(nom::Err::Incomplete(n)) => {
                if self.reader_exhausted {
                    // expected more bytes but reader is EOF, truncated ERF stream?
                    Err(ErfError::UnexpectedEof)
                } else {
                    match n {
                        Needed::Size(n) => {
                            if self.buffer.available_data() + usize::from(n)
                                >= self.buffer.capacity()
                            {
                                Err(ErfError::BufferTooSmall)
                            } else {
                                Err(ErfError::Incomplete(n.into()))
                            }
                        }
                        Needed::Unknown => Err(ErfError::Incomplete(0)),
                    }
                }
            }
        }
    }
    fn consume(&mut self, offset: usize) {
        self.consumed += offset;
        self.buffer.consume(offset);
    }
    fn consume_noshift(&mut self, offset: usize) {
        self.consumed += offset;
        self.buffer.consume_noshift(offset);
    }
    fn consumed(&self) -> usize {
        self.consumed
    }
    fn refill(&mut self) -> Result<(), ErfError<&[u8]>> {
        self.buffer.shift();
        let space = self.buffer.space();
        // check if available space is empty, so we can distinguish
        // a read() returning 0 because of EOF or because we requested 0
        if space.is_empty() {
            return Ok(());
        }
        let sz = self.reader.read(space).or(Err(ErfError::ReadError))?;
        self.reader_exhausted = sz == 0;
        self.buffer.fill(sz);
        Ok(())
    }
    fn position(&self) -> usize {
        self.buffer.position()
    }
    fn grow(&mut self, new_size: usize) -> bool {
        self.buffer.grow(new_size)
    }
    fn data(&self) -> &[u8] {
        self.buffer.data()
    }
    fn reader_exhausted(&self) -> bool {
        self.reader_exhausted
    }
}
