use erf_parser::traits::ErfReaderIterator;
use erf_parser::*;
use hex_literal::hex;

// metadata record: host id 5, source 1, host section with a hostname tag
static META_HOST: &[u8] = &hex!(
    "
00 00 00 00 10 00 00 00 9B 00 00 2C 00 00 00 00
11 01 00 00 00 00 00 05
FF 01 00 04 00 00 00 0C
00 18 00 05 70 72 6F 62 65 00 00 00"
);

// IPv4 record, flow id header with source 1
static DATA: &[u8] = &hex!(
    "
00 00 00 80 10 00 00 00 96 00 00 1C 00 00 00 04
10 01 00 00 00 00 00 00 45 00 00 14"
);

fn stream() -> Vec<u8> {
    [META_HOST, DATA, DATA].concat()
}

#[test]
fn test_erf_reader_with_refill() {
    let data = stream();
    let mut reader = ErfReader::new(64, &data[..]).expect("ErfReader");
    let mut records = Vec::new();
    loop {
        let position = reader.consumed();
        match reader.next() {
            Ok((offset, record)) => {
                records.push((
                    position,
                    record.erf_type(),
                    record.provenance,
                    record.association,
                ));
                if let Some(meta) = &record.meta {
                    assert!(meta.warnings.is_empty());
                    let hostname = meta.find("erf.meta.host.hostname").expect("hostname tag");
                    assert_eq!(
                        hostname.value.as_ref().map(|v| v.to_string()).as_deref(),
                        Some("probe")
                    );
                }
                reader.consume(offset);
            }
            Err(ErfError::Eof) => break,
            Err(ErfError::Incomplete(_)) => {
                reader.refill().unwrap();
            }
            Err(e) => panic!("error while reading: {:?}", e),
        }
    }
    let key = SourceKey::new(5, 1);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].0, 0);
    assert_eq!(records[0].1, ErfType::Meta);
    assert_eq!(records[1].0, 44);
    assert_eq!(records[2].0, 72);
    for r in &records {
        assert_eq!(r.2, Some(key));
    }
    assert_eq!(records[2].1, ErfType::Ipv4);
    assert_eq!(
        records[2].3,
        Nearest {
            prev: Some(0),
            next: None
        }
    );

    let session = reader.into_session();
    assert_eq!(session.implicit_host_id(), Some(5));
    assert_eq!(session.index().positions(key), &[0]);
}

#[test]
fn test_erf_reader_truncated_stream() {
    let data = [META_HOST, &DATA[..20]].concat();
    let mut reader = ErfReader::new(65536, &data[..]).expect("ErfReader");
    let (offset, _) = reader.next().expect("first record");
    reader.consume(offset);
    let mut incomplete_count = 0;
    loop {
        match reader.next() {
            Ok(_) => panic!("truncated record returned"),
            Err(ErfError::Incomplete(_)) => {
                incomplete_count += 1;
                reader.refill().unwrap();
            }
            Err(ErfError::UnexpectedEof) => break,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
        assert!(incomplete_count < 10);
    }
    assert_eq!(incomplete_count, 1);
}

#[test]
fn test_erf_reader_errors() {
    let empty: &[u8] = &[];
    let mut reader = ErfReader::new(1024, empty).expect("ErfReader");
    assert_eq!(reader.next().err(), Some(ErfError::Eof));

    let config = ErfConfig::default().with_max_record_len(8);
    let mut reader = ErfReader::with_config(1024, META_HOST, config).expect("ErfReader");
    assert_eq!(
        reader.next().err(),
        Some(ErfError::RecordTooLarge {
            declared: 28,
            limit: 8
        })
    );

    let mut reader = ErfReader::new(32, META_HOST).expect("ErfReader");
    assert_eq!(reader.next().err(), Some(ErfError::BufferTooSmall));
}

#[test]
fn test_decode_without_meta() {
    let config = ErfConfig::default().with_decode_meta(false);
    let (rec, len) = decode_erf_record(META_HOST, &config, MetaRegistry::global()).expect("decode");
    assert_eq!(len, 44);
    assert!(rec.meta.is_none());
    assert_eq!(rec.payload.len(), 20);
    assert_eq!(rec.payload_range, 24..44);
    assert_eq!(
        rec.host_id_header(),
        Some(&HostIdHeader {
            source_id: 1,
            host_id: 5
        })
    );
}

#[test]
fn test_capture_random_access() {
    let data = [DATA, META_HOST, DATA].concat();
    let cap = ErfCapture::from_slice(&data, ErfConfig::default()).expect("ErfCapture");
    assert_eq!(cap.len(), 3);
    let key = SourceKey::new(5, 1);
    let last = cap.record_at(2).expect("record 2").expect("decode");
    assert_eq!(last.provenance, Some(key));
    assert_eq!(
        last.association,
        Nearest {
            prev: Some(1),
            next: None
        }
    );
    let first = cap.record_at(0).expect("record 0").expect("decode");
    assert_eq!(
        first.association,
        Nearest {
            prev: None,
            next: Some(1)
        }
    );
    let meta = cap.record_at(1).expect("record 1").expect("decode");
    assert_eq!(meta.meta.map(|m| m.entries.len()), Some(1));
    assert_eq!(meta.header.ts.seconds(), 16);
}
