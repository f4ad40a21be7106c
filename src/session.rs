use crate::config::ErfConfig;
use crate::erf::{decode_erf_record, ErfRecord};
use crate::index::{Nearest, SourceIndex, SourceKey};
use crate::meta::MetaRegistry;
use crate::ErfError;

/// Per-capture decode state
///
/// A session owns the temporal index of one capture, and the implicit host id: the host id of
/// the first metadata record carrying an explicit host id extension header. Records without a
/// host id header are attributed to the implicit host.
///
/// The index is filled by [`scan_record`](ErfSession::scan_record) during the first forward pass,
/// and queried read-only by [`lookup_record`](ErfSession::lookup_record) for random access.
#[derive(Debug, Default)]
pub struct ErfSession {
    config: ErfConfig,
    index: SourceIndex,
    implicit_host_id: Option<u64>,
}

impl ErfSession {
    pub fn new(config: ErfConfig) -> ErfSession {
        ErfSession {
            config,
            index: SourceIndex::new(),
            implicit_host_id: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &ErfConfig {
        &self.config
    }

    #[inline]
    pub fn index(&self) -> &SourceIndex {
        &self.index
    }

    /// Host id of the first metadata record carrying an explicit host id, if seen yet
    #[inline]
    pub fn implicit_host_id(&self) -> Option<u64> {
        self.implicit_host_id
    }

    /// Host and source a record is attributed to
    ///
    /// The first host id extension header wins. Otherwise the implicit host id is used (0 if not
    /// established yet), with the source id of the first flow id header, or 0.
    pub fn provenance(&self, record: &ErfRecord) -> SourceKey {
        match record.host_id_header() {
            Some(h) => SourceKey::new(h.host_id, h.source_id),
            None => {
                let source_id = record.flow_id_header().map_or(0, |h| h.source_id);
                SourceKey::new(self.implicit_host_id.unwrap_or(0), source_id)
            }
        }
    }

    fn associate(&self, key: SourceKey, position: u64, record: &ErfRecord) -> Nearest {
        let nearest = self.index.nearest(key, position);
        if record.is_meta() {
            Nearest {
                prev: self.index.previous_before(key, position),
                next: nearest.next,
            }
        } else {
            nearest
        }
    }

    /// Attribute a record during the forward pass
    ///
    /// Metadata records are registered into the index at `position`. Calling this twice for
    /// the same record has no further effect.
    pub fn scan_record(&mut self, position: u64, record: &mut ErfRecord) {
        if record.is_meta() && self.implicit_host_id.is_none() {
            if let Some(h) = record.host_id_header() {
                tracing::debug!(
                    host_id = h.host_id,
                    position,
                    "implicit host id established"
                );
                self.implicit_host_id = Some(h.host_id);
                // records seen so far without a host id belong to the implicit host
                self.index.rekey_host(0, h.host_id);
            }
        }
        let key = self.provenance(record);
        if record.is_meta() {
            self.index.register(key, position);
        }
        record.association = self.associate(key, position, record);
        record.provenance = Some(key);
    }

    /// Attribute a record using the index of a previous forward pass, without modifying it
    pub fn lookup_record(&self, position: u64, record: &mut ErfRecord) {
        let key = self.provenance(record);
        record.association = self.associate(key, position, record);
        record.provenance = Some(key);
    }

    /// Decode a record from a complete buffer and attribute it (forward pass)
    pub fn decode_record<'a>(
        &mut self,
        position: u64,
        i: &'a [u8],
    ) -> Result<(ErfRecord<'a>, usize), ErfError<&'a [u8]>> {
        let (mut record, consumed) = decode_erf_record(i, &self.config, MetaRegistry::global())?;
        self.scan_record(position, &mut record);
        Ok((record, consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // metadata record with host id 0x0a0b0c, source 2, and an empty tag stream
    const META_WITH_HOST: &[u8] = &hex!(
        "
00 00 00 00 00 00 00 00 9B 00 00 18 00 00 00 00
11 02 00 00 00 0A 0B 0C"
    );
    // metadata record without extension headers
    const META_NO_HOST: &[u8] = &hex!("00 00 00 00 00 00 00 00 1B 00 00 10 00 00 00 00");
    // data record (type 22, IPv4) with a flow id header, source 2
    const DATA_FLOW: &[u8] = &hex!(
        "
00 00 00 00 00 00 00 00 96 00 00 1C 00 00 00 04
10 02 00 00 00 00 00 00 45 00 00 14"
    );

    #[test]
    fn test_scan_and_lookup() {
        let mut session = ErfSession::default();
        let key = SourceKey::new(0x0a0b0c, 2);

        let (rec, _) = session.decode_record(0, META_NO_HOST).expect("decode");
        assert_eq!(rec.provenance, Some(SourceKey::new(0, 0)));
        assert_eq!(session.implicit_host_id(), None);

        let (rec, _) = session.decode_record(1, META_WITH_HOST).expect("decode");
        assert_eq!(rec.provenance, Some(key));
        assert_eq!(rec.association, Nearest::default());
        assert_eq!(session.implicit_host_id(), Some(0x0a0b0c));

        let (rec, _) = session.decode_record(2, DATA_FLOW).expect("decode");
        assert_eq!(rec.provenance, Some(key));
        assert_eq!(
            rec.association,
            Nearest {
                prev: Some(1),
                next: None
            }
        );

        let (rec, _) = session.decode_record(3, META_WITH_HOST).expect("decode");
        assert_eq!(
            rec.association,
            Nearest {
                prev: Some(1),
                next: None
            }
        );

        // random access, after the forward pass
        let (mut rec, _) =
            decode_erf_record(DATA_FLOW, session.config(), MetaRegistry::global()).expect("decode");
        session.lookup_record(2, &mut rec);
        assert_eq!(
            rec.association,
            Nearest {
                prev: Some(1),
                next: Some(3)
            }
        );
        let (mut rec, _) = decode_erf_record(
            META_WITH_HOST,
            session.config(),
            MetaRegistry::global(),
        )
        .expect("decode");
        session.lookup_record(1, &mut rec);
        assert_eq!(
            rec.association,
            Nearest {
                prev: None,
                next: Some(3)
            }
        );
    }

    #[test]
    fn test_implicit_host_rekeys_earlier_entries() {
        let mut session = ErfSession::default();
        session.decode_record(0, META_NO_HOST).expect("decode");
        assert_eq!(session.index().positions(SourceKey::new(0, 0)), &[0]);
        session.decode_record(1, META_WITH_HOST).expect("decode");
        assert!(session.index().positions(SourceKey::new(0, 0)).is_empty());
        assert_eq!(session.index().positions(SourceKey::new(0x0a0b0c, 0)), &[0]);

        // a later record without host id finds the earlier metadata
        let (rec, _) = session.decode_record(2, META_NO_HOST).expect("decode");
        assert_eq!(rec.provenance, Some(SourceKey::new(0x0a0b0c, 0)));
        assert_eq!(
            rec.association,
            Nearest {
                prev: Some(0),
                next: None
            }
        );
        assert_eq!(
            session.index().positions(SourceKey::new(0x0a0b0c, 0)),
            &[0, 2]
        );
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let mut session = ErfSession::default();
        let key = SourceKey::new(0x0a0b0c, 2);
        for _ in 0..2 {
            session.decode_record(4, META_WITH_HOST).expect("decode");
        }
        assert_eq!(session.index().positions(key), &[4]);
    }
}
