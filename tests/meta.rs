use erf_parser::*;
use hex_literal::hex;
use std::borrow::Cow;

/// Wrap a tag stream into a metadata record without extension headers
fn meta_record(tags: &[u8]) -> Vec<u8> {
    let rlen = (16 + tags.len()) as u16;
    let mut v = hex!("00 00 00 00 00 00 00 00 1B 00").to_vec();
    v.extend_from_slice(&rlen.to_be_bytes());
    v.extend_from_slice(&[0, 0, 0, 0]);
    v.extend_from_slice(tags);
    v
}

#[test]
fn test_meta_round_trip() {
    // host section, id 7, declared length 8, then an 8-byte comment tag
    let data = meta_record(&hex!(
        "
FF 01 00 04 00 07 00 08
00 01 00 04 61 62 63 64"
    ));
    let (rec, len) =
        decode_erf_record(&data, &ErfConfig::default(), MetaRegistry::global()).expect("decode");
    assert_eq!(len, 32);
    assert!(rec.warnings.is_empty());
    let meta = rec.meta.expect("no metadata");
    assert!(meta.warnings.is_empty());
    assert_eq!(meta.sections.len(), 1);
    assert_eq!(meta.entries.len(), 1);
    let section = &meta.sections[0];
    assert_eq!(section.id, Some(7));
    assert_eq!(section.declared_len, Some(8));
    assert_eq!(section.consumed, 8);
    assert!(!section.length_mismatch);
    let comment = &meta.entries[0];
    assert_eq!(comment.info.path, "erf.meta.host.comment");
    assert_eq!(comment.status, TagStatus::Ok);
    assert_eq!(comment.value, Some(MetaValue::Str(Cow::Borrowed("abcd"))));
}

#[test]
fn test_meta_truncated_tag() {
    let data = meta_record(&hex!("FF 01 00 04 00 07 00 08 00 01 00 01"));
    let (rec, _) =
        decode_erf_record(&data, &ErfConfig::default(), MetaRegistry::global()).expect("decode");
    let meta = rec.meta.expect("no metadata");
    assert_eq!(meta.warnings.len(), 1);
    assert!(matches!(
        meta.warnings[0].kind,
        MetaWarningKind::TruncatedTag {
            tag: 1,
            declared: 1,
            available: 0,
            ..
        }
    ));
    assert_eq!(meta.entries.len(), 1);
    assert_eq!(meta.entries[0].value, None);
    assert_eq!(meta.sections[0].consumed, 4);
    // the length mismatch is not reported on a truncated section
    assert!(!meta.sections[0].length_mismatch);
}

#[test]
fn test_meta_sections_and_contexts() {
    let tags = hex!(
        "
00 01 00 04 74 6F 70 00
FF 03 00 04 00 02 00 1C
01 05 00 08 00 00 00 02 54 0B E4 00
00 09 00 04 FF 02 00 01
00 10 00 04 00 00 00 18
FF 7F 00 04 00 01 00 10
00 01 00 03 61 62 63 00
77 77 00 04 DE AD BE EF"
    );
    let meta = decode_meta_record(&tags, MetaRegistry::global());
    assert!(meta.warnings.is_empty(), "warnings: {:?}", meta.warnings);
    assert_eq!(meta.sections.len(), 2);

    let paths: Vec<&str> = meta.entries.iter().map(|e| e.info.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "erf.meta.tag.comment",
            "erf.meta.interface.if_speed",
            "erf.meta.interface.parent_section",
            "erf.meta.interface.mask_cidr",
            "erf.meta.unknown_section.comment",
            "erf.meta.unknown",
        ]
    );
    assert_eq!(meta.entries[0].section_index, None);
    assert_eq!(meta.section_entries(0).count(), 3);
    let speed = meta.find("erf.meta.interface.if_speed").expect("if_speed");
    assert_eq!(
        speed.value.as_ref().map(|v| v.to_string()).as_deref(),
        Some("10 Gbps")
    );
    let parent = meta
        .find("erf.meta.interface.parent_section")
        .expect("parent_section");
    assert_eq!(
        parent.value,
        Some(MetaValue::SectionRef {
            section: 0xff02,
            id: 1
        })
    );
    let unknown = meta.entries.last().expect("entries");
    assert!(unknown.info.is_unknown());
    assert_eq!(
        unknown.value,
        Some(MetaValue::Bytes(&[0xde, 0xad, 0xbe, 0xef]))
    );
}

#[test]
fn test_meta_record_truncated_tail() {
    let tags = hex!("FF 01 00 04 00 01 00 00 00 01");
    let meta = decode_meta_record(&tags, MetaRegistry::global());
    assert_eq!(
        meta.warnings,
        vec![MetaWarning {
            offset: 8,
            kind: MetaWarningKind::RecordTruncated { remaining: 2 }
        }]
    );
}
