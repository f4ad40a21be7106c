use std::collections::HashMap;
use std::sync::OnceLock;

use super::templates::{section_template, META_SECTIONS, META_TAGS, TAG_PARENT_SECTION};
use super::types::{MetaTagType, ValueLabels};
use super::{meta_key, NO_SECTION, UNKNOWN_SECTION};

const PATH_PREFIX: &str = "erf.meta";

/// A named sub-field of a packed tag value
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetaSubfieldInfo {
    pub name: &'static str,
    pub path: String,
    /// Bits of the value holding this sub-field, 0 for positional sub-fields
    pub mask: u64,
}

/// Field descriptor of one tag in one section context
#[derive(Clone, Debug, PartialEq)]
pub struct MetaTagInfo {
    /// Lookup key, `section << 16 | tag`
    pub key: u32,
    pub section: u16,
    pub tag: u16,
    pub kind: MetaTagType,
    pub name: &'static str,
    /// Composite field path, `erf.meta.<section>.<tag>`
    pub path: String,
    pub labels: ValueLabels,
    pub subfields: Vec<MetaSubfieldInfo>,
}

impl MetaTagInfo {
    /// Minimum declared length for the value to be decoded
    #[inline]
    pub fn min_len(&self) -> usize {
        self.kind.min_len()
    }

    /// Label of an enumerated value, if any
    pub fn label(&self, value: u64) -> Option<&'static str> {
        self.labels
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, l)| *l)
    }

    /// Returns true for the generic descriptor substituted on lookup misses
    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.key == UNKNOWN_KEY
    }
}

// never registered: tag codes are outside the section header range
const UNKNOWN_KEY: u32 = meta_key(UNKNOWN_SECTION, UNKNOWN_SECTION);

/// Immutable table of MetaERF field descriptors
///
/// Built from the section and tag templates: every tag is registered under [`NO_SECTION`],
/// under every template section and under [`UNKNOWN_SECTION`]. Section templates are also
/// registered as section header tags under [`NO_SECTION`].
#[derive(Debug)]
pub struct MetaRegistry {
    entries: HashMap<u32, MetaTagInfo>,
    unknown: MetaTagInfo,
}

impl MetaRegistry {
    pub fn build() -> MetaRegistry {
        let contexts = std::iter::once((NO_SECTION, "tag"))
            .chain(META_SECTIONS.iter().map(|s| (s.code, s.abbrev)))
            .chain(std::iter::once((UNKNOWN_SECTION, "unknown_section")));
        let mut entries = HashMap::with_capacity((META_SECTIONS.len() + 2) * META_TAGS.len());
        for (section, section_abbrev) in contexts {
            for t in META_TAGS {
                let path = format!("{}.{}.{}", PATH_PREFIX, section_abbrev, t.abbrev);
                let subfields = synthesize_subfields(&path, t.code, t.kind, t.subfields);
                let key = meta_key(section, t.code);
                let info = MetaTagInfo {
                    key,
                    section,
                    tag: t.code,
                    kind: t.kind,
                    name: t.name,
                    path,
                    labels: t.labels,
                    subfields,
                };
                entries.insert(key, info);
            }
        }
        for s in META_SECTIONS {
            let key = meta_key(NO_SECTION, s.code);
            let path = format!("{}.section.{}", PATH_PREFIX, s.abbrev);
            let subfields = vec![
                MetaSubfieldInfo {
                    name: "Section ID",
                    path: format!("{}.id", path),
                    mask: 0,
                },
                MetaSubfieldInfo {
                    name: "Section length",
                    path: format!("{}.len", path),
                    mask: 0,
                },
            ];
            let info = MetaTagInfo {
                key,
                section: NO_SECTION,
                tag: s.code,
                kind: MetaTagType::SectionHeader,
                name: s.name,
                path,
                labels: &[],
                subfields,
            };
            entries.insert(key, info);
        }
        let unknown = MetaTagInfo {
            key: UNKNOWN_KEY,
            section: UNKNOWN_SECTION,
            tag: UNKNOWN_SECTION,
            kind: MetaTagType::Binary,
            name: "Unknown tag",
            path: format!("{}.unknown", PATH_PREFIX),
            labels: &[],
            subfields: Vec::new(),
        };
        MetaRegistry { entries, unknown }
    }

    /// The process-wide registry, built on first use
    pub fn global() -> &'static MetaRegistry {
        static REGISTRY_ONCE: OnceLock<MetaRegistry> = OnceLock::new();
        REGISTRY_ONCE.get_or_init(MetaRegistry::build)
    }

    /// Look up a descriptor by packed key
    ///
    /// Never fails: keys that are not registered resolve to the generic unknown descriptor.
    #[inline]
    pub fn lookup(&self, key: u32) -> &MetaTagInfo {
        self.entries.get(&key).unwrap_or(&self.unknown)
    }

    /// Look up a descriptor by packed key, without substitution
    #[inline]
    pub fn get(&self, key: u32) -> Option<&MetaTagInfo> {
        self.entries.get(&key)
    }

    /// Resolve a tag in the current section context
    #[inline]
    pub fn resolve(&self, context: u16, tag: u16) -> &MetaTagInfo {
        self.lookup(meta_key(context, tag))
    }

    /// Section context opened by a section header with code `section_code`
    pub fn context_for(&self, section_code: u16) -> u16 {
        match section_template(section_code) {
            Some(s) => s.code,
            None => UNKNOWN_SECTION,
        }
    }

    /// The generic descriptor returned on lookup misses
    #[inline]
    pub fn unknown(&self) -> &MetaTagInfo {
        &self.unknown
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn synthesize_subfields(
    path: &str,
    code: u16,
    kind: MetaTagType,
    bits: &'static [super::types::BitSubfield],
) -> Vec<MetaSubfieldInfo> {
    let positional = |names: &[(&'static str, &str)]| -> Vec<MetaSubfieldInfo> {
        names
            .iter()
            .map(|(name, abbrev)| MetaSubfieldInfo {
                name: *name,
                path: format!("{}.{}", path, abbrev),
                mask: 0,
            })
            .collect()
    };
    match kind {
        MetaTagType::SectionRef if code == TAG_PARENT_SECTION => {
            positional(&[("Section", "section"), ("Section ID", "section_id")])
        }
        MetaTagType::NameService(_) => positional(&[("Address", "addr"), ("Name", "name")]),
        MetaTagType::Bitfield32 | MetaTagType::Bitfield64 => bits
            .iter()
            .map(|b| MetaSubfieldInfo {
                name: b.name,
                path: format!("{}.{}", path, b.abbrev),
                mask: b.mask,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::AddrKind;

    #[test]
    fn cross_product() {
        let reg = MetaRegistry::build();
        assert_eq!(
            reg.len(),
            (META_SECTIONS.len() + 2) * META_TAGS.len() + META_SECTIONS.len()
        );
        let info = reg.resolve(0xff01, 24);
        assert_eq!(info.path, "erf.meta.host.hostname");
        assert_eq!(info.kind, MetaTagType::String);
        let info = reg.resolve(NO_SECTION, 1);
        assert_eq!(info.path, "erf.meta.tag.comment");
        let info = reg.resolve(UNKNOWN_SECTION, 1);
        assert_eq!(info.path, "erf.meta.unknown_section.comment");
    }

    #[test]
    fn section_headers_under_no_section() {
        let reg = MetaRegistry::build();
        let info = reg.resolve(NO_SECTION, 0xff03);
        assert_eq!(info.kind, MetaTagType::SectionHeader);
        assert_eq!(info.path, "erf.meta.section.interface");
        assert_eq!(info.subfields.len(), 2);
    }

    #[test]
    fn lookup_miss_is_unknown() {
        let reg = MetaRegistry::build();
        let info = reg.lookup(meta_key(0xff01, 0x7777));
        assert!(info.is_unknown());
        assert_eq!(info.kind, MetaTagType::Binary);
        assert!(reg.get(meta_key(0xff01, 0x7777)).is_none());
        assert!(reg.lookup(meta_key(0x1234, 1)).is_unknown());
    }

    #[test]
    fn synthesized_subfields() {
        let reg = MetaRegistry::build();
        let parent = reg.resolve(0xff03, TAG_PARENT_SECTION);
        let paths: Vec<_> = parent.subfields.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "erf.meta.interface.parent_section.section",
                "erf.meta.interface.parent_section.section_id"
            ]
        );
        let ns = reg.resolve(0xff0a, 0x01c2);
        assert_eq!(ns.kind, MetaTagType::NameService(AddrKind::Ipv4));
        assert_eq!(ns.subfields[1].path, "erf.meta.dns.ns_host_ipv4.name");
        let quality = reg.resolve(0xff00, 0x0207);
        assert_eq!(quality.subfields.len(), 3);
        assert_eq!(quality.subfields[0].mask, 0xff00_0000);
    }

    #[test]
    fn context_and_labels() {
        let reg = MetaRegistry::global();
        assert_eq!(reg.context_for(0xff05), 0xff05);
        assert_eq!(reg.context_for(0xff42), UNKNOWN_SECTION);
        let proto = reg.resolve(0xff04, 0x0148);
        assert_eq!(proto.label(6), Some("TCP"));
        assert_eq!(proto.label(250), None);
    }
}
