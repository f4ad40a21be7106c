use erf_parser::*;
use proptest::prelude::*;

const KNOWN_EXT_TYPES: &[u8] = &[1, 3, 4, 5, 12, 14, 16, 17];

fn contexts() -> Vec<u16> {
    let mut v = vec![NO_SECTION, UNKNOWN_SECTION];
    v.extend(META_SECTIONS.iter().map(|s| s.code));
    v
}

proptest! {
#[test]
fn ext_chain_terminates(
    data in proptest::collection::vec(any::<u8>(), 0..160),
    more: bool,
    max in 0usize..40
) {
    let mut chain = ExtHeaderChain::new(&data, more, max);
    let headers: Vec<ExtHeader> = chain.by_ref().collect();
    prop_assert!(headers.len() <= max);
    prop_assert_eq!(chain.consumed(), headers.len() * EXT_HDR_LEN);
    prop_assert!(chain.consumed() <= data.len());
    prop_assert_ne!(chain.status(), ChainStatus::InProgress);
    prop_assert!(chain.next().is_none());

    let (again, consumed, status) = parse_ext_headers(&data, more, max);
    prop_assert_eq!(again, headers);
    prop_assert_eq!(consumed, chain.consumed());
    prop_assert_eq!(status, chain.status());
}

#[test]
fn unknown_ext_header_continues(code in 0u8..128, payload in 0u64..(1 << 56), source: u8) {
    prop_assume!(!KNOWN_EXT_TYPES.contains(&code));
    let mut data = ((u64::from(code | EXT_HDR_MORE) << 56) | payload).to_be_bytes().to_vec();
    data.extend_from_slice(&[0x10, source, 0, 0, 0, 0, 0, 1]);
    let (headers, consumed, status) = parse_ext_headers(&data, true, DEFAULT_MAX_EXT_HEADERS);
    prop_assert_eq!(consumed, 16);
    prop_assert_eq!(status, ChainStatus::Complete);
    prop_assert_eq!(&headers[0], &ExtHeader::Unknown { code, payload });
    match &headers[1] {
        ExtHeader::FlowId(h) => prop_assert_eq!(h.source_id, source),
        h => prop_assert!(false, "unexpected header {:?}", h),
    }
}

#[test]
fn tag_advance_is_aligned(declared: u16, remaining in 0usize..70_000) {
    let adv = tag_advance(usize::from(declared), remaining);
    prop_assert_eq!(adv % 4, 0);
    prop_assert!(adv >= META_TAG_HEADER_LEN);
    prop_assert!(adv <= META_TAG_HEADER_LEN + usize::from(declared).min(remaining) + 3);
}

#[test]
fn tag_stream_never_overruns(data in proptest::collection::vec(any::<u8>(), 0..256)) {
    let meta = decode_meta_record(&data, MetaRegistry::global());
    prop_assert!(meta.entries.len() + meta.sections.len() <= data.len() / 4 + 1);
    for e in &meta.entries {
        prop_assert!(e.offset + META_TAG_HEADER_LEN <= data.len());
        prop_assert_eq!(e.offset % 4, 0);
    }
    for w in &meta.warnings {
        prop_assert!(w.offset < data.len());
    }
}

#[test]
fn registry_is_total(ctx_idx in 0usize..15, tag: u16) {
    let contexts = contexts();
    let context = contexts[ctx_idx % contexts.len()];
    let info = MetaRegistry::global().resolve(context, tag);
    match META_TAGS.iter().find(|t| t.code == tag) {
        Some(t) => {
            prop_assert_eq!(info.kind, t.kind);
            prop_assert_eq!(info.tag, tag);
            prop_assert_eq!(info.section, context);
            prop_assert_eq!(info.key, meta_key(context, tag));
        }
        None if context == NO_SECTION && section_template(tag).is_some() => {
            prop_assert_eq!(info.kind, MetaTagType::SectionHeader);
        }
        None => prop_assert!(info.is_unknown()),
    }
}

#[test]
fn index_nearest(positions in proptest::collection::vec(0u64..1000, 0..40), query in 0u64..1100) {
    let key = SourceKey::new(1, 2);
    let mut index = SourceIndex::new();
    for p in &positions {
        index.register(key, *p);
    }
    let nearest = index.nearest(key, query);
    prop_assert_eq!(nearest.prev, positions.iter().copied().filter(|p| *p <= query).max());
    prop_assert_eq!(nearest.next, positions.iter().copied().filter(|p| *p > query).min());
    prop_assert_eq!(
        index.previous_before(key, query),
        positions.iter().copied().filter(|p| *p < query).max()
    );
    prop_assert_eq!(index.nearest(SourceKey::new(2, 2), query), Nearest::default());
}

#[test]
fn record_payload_within_bounds(data in proptest::collection::vec(any::<u8>(), 0..256)) {
    let config = ErfConfig::default();
    if let Ok((rec, consumed)) = decode_erf_record(&data, &config, MetaRegistry::global()) {
        prop_assert!(consumed >= ERF_HEADER_LEN);
        prop_assert!(consumed <= data.len());
        prop_assert!(rec.payload_range.end <= consumed);
        prop_assert_eq!(rec.payload.len(), rec.payload_range.len());
        prop_assert!(rec.ext_headers.len() <= config.max_ext_headers);
        if rec.header.is_malformed() {
            prop_assert!(rec.payload.is_empty());
        }
    }
}
}
