use crate::container::{
    parse_container_frame, parse_container_header, sniff_container, ContainerFrame,
    ContainerHeader, ContainerLayout,
};
use crate::error::ErfError;
use nom::Needed;

/// Parsing iterator over the frames of a container (requires data to be loaded into memory)
///
/// ```rust
/// use erf_parser::*;
///
/// # let path = "capture.pcap";
/// let buffer = std::fs::read(path).unwrap_or_default();
/// let mut num_frames = 0;
/// match ContainerSlice::from_slice(&buffer) {
///     Ok(iter) => {
///         println!("Layout: {:?}", iter.layout);
///         for _frame in iter {
///             num_frames += 1;
///         }
///         return;
///     },
///     _ => ()
/// }
/// ```
pub struct ContainerSlice<'a> {
    pub header: ContainerHeader,
    pub layout: ContainerLayout,
    // remaining (unparsed) data
    rem: &'a [u8],
}

impl<'a> ContainerSlice<'a> {
    /// Read the container header and choose the frame layout with [`sniff_container`]
    pub fn from_slice(i: &'a [u8]) -> Result<ContainerSlice<'a>, ErfError<&'a [u8]>> {
        let sniff = sniff_container(i)?;
        ContainerSlice::with_layout(i, sniff.layout)
    }

    /// Read the container header, and iterate frames using a known layout
    pub fn with_layout(
        i: &'a [u8],
        layout: ContainerLayout,
    ) -> Result<ContainerSlice<'a>, ErfError<&'a [u8]>> {
        match parse_container_header(i) {
            Ok((rem, header)) => Ok(ContainerSlice {
                header,
                layout,
                rem,
            }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
            Err(nom::Err::Incomplete(Needed::Size(n))) => Err(ErfError::Incomplete(n.into())),
            Err(nom::Err::Incomplete(Needed::Unknown)) => Err(ErfError::Incomplete(0)),
        }
    }
}

/// Iterator for ContainerSlice. Returns a result so parsing errors are not
/// silently ignored
///
/// Iteration stops after the first error.
impl<'a> Iterator for ContainerSlice<'a> {
    type Item = Result<ContainerFrame<'a>, nom::Err<ErfError<&'a [u8]>>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rem.is_empty() {
            return None;
        }
        let r = parse_container_frame(self.rem, self.layout, self.header.big_endian);
        match r {
            Ok((rem, frame)) => {
                self.rem = rem;
                Some(Ok(frame))
            }
            Err(e) => {
                self.rem = &[];
                Some(Err(e))
            }
        }
    }
}
