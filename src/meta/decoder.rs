use rusticata_macros::align32;

use super::registry::{MetaRegistry, MetaTagInfo};
use super::templates::TAG_PADDING;
use super::value::{decode_value, MetaValue};
use super::{is_section_code, NO_SECTION};

/// Size of a tag code and length pair
pub const META_TAG_HEADER_LEN: usize = 4;

/// Offset advance after a tag of declared length `declared`, with `remaining` value bytes left
/// in the record
///
/// The value length is rounded up to a 4-byte boundary. The result is always a positive multiple
/// of 4, and never accounts for more value bytes than the record holds (before padding).
#[inline]
pub fn tag_advance(declared: usize, remaining: usize) -> usize {
    META_TAG_HEADER_LEN + align32!(declared.min(remaining))
}

/// Structural problem found while walking a tag stream
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetaWarningKind {
    /// The tags of a section do not add up to its declared length
    SectionLengthMismatch {
        section: u16,
        declared: u16,
        actual: usize,
    },
    /// The declared tag length is below the minimum of the tag type, or beyond the record end
    TruncatedTag {
        tag: u16,
        declared: u16,
        available: usize,
        minimum: usize,
    },
    /// Zero-length tag, other than padding or section header
    EmptyTag { tag: u16 },
    /// Bytes left at the end of the record are too few for a tag header
    RecordTruncated { remaining: usize },
}

/// A structural warning, with the offset of the element it concerns
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MetaWarning {
    /// Offset in the tag stream
    pub offset: usize,
    pub kind: MetaWarningKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagStatus {
    Ok,
    /// Value not decoded, see the matching `TruncatedTag` warning
    Truncated,
    /// Deliberately empty tag
    Empty,
}

/// A section of a metadata record
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetaSection {
    /// Section header code, as found in the record
    pub code: u16,
    /// Section id, `None` if the section header is empty or truncated
    pub id: Option<u16>,
    pub declared_len: Option<u16>,
    /// Offset of the section header tag
    pub offset: usize,
    /// Bytes consumed by the tags of this section (aligned)
    pub consumed: usize,
    /// At least one tag of this section ran past the record end
    pub truncated: bool,
    pub length_mismatch: bool,
}

/// One tag of a metadata record, in record order
#[derive(Clone, Debug, PartialEq)]
pub struct MetaEntry<'a> {
    /// Section context the tag was resolved in
    pub section: u16,
    /// Index of the enclosing section in [`MetaRecord::sections`], `None` before the first one
    pub section_index: Option<usize>,
    pub tag: u16,
    /// Declared length
    pub len: u16,
    /// Offset of the tag header in the tag stream
    pub offset: usize,
    pub info: &'a MetaTagInfo,
    pub status: TagStatus,
    pub value: Option<MetaValue<'a>>,
}

/// Decoded tag stream of a metadata record
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetaRecord<'a> {
    pub sections: Vec<MetaSection>,
    /// Value tags, in record order (section headers are in `sections`)
    pub entries: Vec<MetaEntry<'a>>,
    pub warnings: Vec<MetaWarning>,
}

impl<'a> MetaRecord<'a> {
    /// Tags of the section at `index`
    pub fn section_entries(&self, index: usize) -> impl Iterator<Item = &MetaEntry<'a>> {
        self.entries
            .iter()
            .filter(move |e| e.section_index == Some(index))
    }

    /// First tag whose field path is `path`
    pub fn find(&self, path: &str) -> Option<&MetaEntry<'a>> {
        self.entries.iter().find(|e| e.info.path == path)
    }
}

struct OpenSection {
    index: usize,
    body_start: usize,
}

struct TagStreamDecoder<'a> {
    i: &'a [u8],
    registry: &'a MetaRegistry,
    record: MetaRecord<'a>,
    context: u16,
    open: Option<OpenSection>,
}

impl<'a> TagStreamDecoder<'a> {
    fn warn(&mut self, offset: usize, kind: MetaWarningKind) {
        tracing::trace!(offset, ?kind, "MetaERF structural warning");
        self.record.warnings.push(MetaWarning { offset, kind });
    }

    fn mark_truncated(&mut self) {
        if let Some(s) = &self.open {
            self.record.sections[s.index].truncated = true;
        }
    }

    fn close_section(&mut self, end: usize) {
        let s = match self.open.take() {
            Some(s) => s,
            None => return,
        };
        let section = &mut self.record.sections[s.index];
        section.consumed = end.saturating_sub(s.body_start);
        if section.truncated {
            return;
        }
        if let Some(declared) = section.declared_len {
            if usize::from(declared) != section.consumed {
                section.length_mismatch = true;
                let kind = MetaWarningKind::SectionLengthMismatch {
                    section: section.code,
                    declared,
                    actual: section.consumed,
                };
                let offset = section.offset;
                self.warn(offset, kind);
            }
        }
    }

    fn open_section(&mut self, offset: usize, code: u16, len: u16, value: &[u8], advance: usize) {
        self.close_section(offset);
        let (id, declared_len) = if len == 0 {
            (None, None)
        } else if usize::from(len) >= 4 && value.len() >= 4 {
            let id = u16::from_be_bytes([value[0], value[1]]);
            let declared = u16::from_be_bytes([value[2], value[3]]);
            (Some(id), Some(declared))
        } else {
            self.warn(
                offset,
                MetaWarningKind::TruncatedTag {
                    tag: code,
                    declared: len,
                    available: value.len(),
                    minimum: 4,
                },
            );
            (None, None)
        };
        self.context = self.registry.context_for(code);
        self.record.sections.push(MetaSection {
            code,
            id,
            declared_len,
            offset,
            consumed: 0,
            truncated: false,
            length_mismatch: false,
        });
        self.open = Some(OpenSection {
            index: self.record.sections.len() - 1,
            body_start: offset + advance,
        });
    }

    fn value_tag(&mut self, offset: usize, code: u16, len: u16, available: &'a [u8]) {
        let registry = self.registry;
        let info = registry.resolve(self.context, code);
        let declared = usize::from(len);
        let minimum = info.min_len();
        let (status, value) = if declared == 0 {
            if code == TAG_PADDING {
                (TagStatus::Ok, None)
            } else {
                self.warn(offset, MetaWarningKind::EmptyTag { tag: code });
                (TagStatus::Empty, None)
            }
        } else if declared > available.len() || declared < minimum {
            if declared > available.len() {
                self.mark_truncated();
            }
            let kind = MetaWarningKind::TruncatedTag {
                tag: code,
                declared: len,
                available: available.len(),
                minimum,
            };
            self.warn(offset, kind);
            (TagStatus::Truncated, None)
        } else {
            (TagStatus::Ok, decode_value(info, &available[..declared]))
        };
        let section_index = self.open.as_ref().map(|s| s.index);
        self.record.entries.push(MetaEntry {
            section: self.context,
            section_index,
            tag: code,
            len,
            offset,
            info,
            status,
            value,
        });
    }

    fn run(mut self) -> MetaRecord<'a> {
        let i = self.i;
        let mut offset = 0;
        while offset < i.len() {
            let remaining = i.len() - offset;
            if remaining < META_TAG_HEADER_LEN {
                self.warn(offset, MetaWarningKind::RecordTruncated { remaining });
                self.mark_truncated();
                break;
            }
            let code = u16::from_be_bytes([i[offset], i[offset + 1]]);
            let len = u16::from_be_bytes([i[offset + 2], i[offset + 3]]);
            let available = &i[offset + META_TAG_HEADER_LEN..];
            let advance = tag_advance(usize::from(len), available.len());
            if is_section_code(code) {
                self.open_section(offset, code, len, available, advance);
            } else {
                self.value_tag(offset, code, len, available);
            }
            offset += advance;
        }
        self.close_section(offset.min(i.len()));
        self.record
    }
}

/// Decode the tag stream of a metadata record (the record payload)
///
/// Decoding never fails: every structural problem is reported in
/// [`MetaRecord::warnings`] and the walk continues with the next tag. The number of iterations
/// is bounded by the input length, since each tag advances by at least 4 bytes.
pub fn decode_meta_record<'a>(i: &'a [u8], registry: &'a MetaRegistry) -> MetaRecord<'a> {
    let decoder = TagStreamDecoder {
        i,
        registry,
        record: MetaRecord::default(),
        context: NO_SECTION,
        open: None,
    };
    decoder.run()
}
