//! Host/source temporal index
//!
//! Positions of metadata records, grouped by provenance. The index is filled during the first
//! forward pass over a capture and queried read-only afterwards, so that any record can be
//! associated with the metadata in scope at its position.

use std::collections::HashMap;

use crate::erf::HOST_ID_MASK;

/// Provenance of a record: 48-bit host id and 8-bit source id
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SourceKey {
    pub host_id: u64,
    pub source_id: u8,
}

impl SourceKey {
    pub const fn new(host_id: u64, source_id: u8) -> SourceKey {
        SourceKey {
            host_id: host_id & HOST_ID_MASK,
            source_id,
        }
    }
}

/// Nearest registered positions around a query position
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Nearest {
    /// Largest registered position `<=` the query
    pub prev: Option<u64>,
    /// Smallest registered position `>` the query
    pub next: Option<u64>,
}

/// Ordered metadata record positions per provenance key
#[derive(Clone, Debug, Default)]
pub struct SourceIndex {
    entries: HashMap<SourceKey, Vec<u64>>,
}

impl SourceIndex {
    pub fn new() -> SourceIndex {
        SourceIndex::default()
    }

    /// Record that a metadata record with provenance `key` was seen at `position`
    ///
    /// Positions are expected in stream order (constant time append). Out of order positions
    /// are inserted in place, and duplicates are ignored.
    pub fn register(&mut self, key: SourceKey, position: u64) {
        let list = self.entries.entry(key).or_default();
        match list.last() {
            None => list.push(position),
            Some(&last) if last < position => list.push(position),
            Some(_) => {
                if let Err(idx) = list.binary_search(&position) {
                    list.insert(idx, position);
                }
            }
        }
    }

    /// Nearest registered positions for `key` around `position`
    ///
    /// An unknown key, or a key with nothing on one side of `position`, yields `None` on that
    /// side.
    pub fn nearest(&self, key: SourceKey, position: u64) -> Nearest {
        let list = match self.entries.get(&key) {
            Some(list) => list,
            None => return Nearest::default(),
        };
        let idx = list.partition_point(|&p| p <= position);
        Nearest {
            prev: idx.checked_sub(1).map(|i| list[i]),
            next: list.get(idx).copied(),
        }
    }

    /// Largest registered position strictly before `position`
    ///
    /// For a metadata record, `nearest` returns the record itself as `prev`; this returns the
    /// metadata record preceding it.
    pub fn previous_before(&self, key: SourceKey, position: u64) -> Option<u64> {
        let list = self.entries.get(&key)?;
        let idx = list.partition_point(|&p| p < position);
        idx.checked_sub(1).map(|i| list[i])
    }

    /// Move every list of host `from` under host `to`, keeping source ids
    ///
    /// Positions already registered under the target key are merged in order.
    pub fn rekey_host(&mut self, from: u64, to: u64) {
        let (from, to) = (from & HOST_ID_MASK, to & HOST_ID_MASK);
        if from == to {
            return;
        }
        let moved: Vec<SourceKey> = self
            .entries
            .keys()
            .filter(|k| k.host_id == from)
            .copied()
            .collect();
        for key in moved {
            if let Some(positions) = self.entries.remove(&key) {
                let list = self
                    .entries
                    .entry(SourceKey::new(to, key.source_id))
                    .or_default();
                list.extend(positions);
                list.sort_unstable();
                list.dedup();
            }
        }
    }

    /// Registered positions for `key`, in increasing order
    pub fn positions(&self, key: SourceKey) -> &[u64] {
        self.entries.get(&key).map_or(&[], |v| v.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &SourceKey> {
        self.entries.keys()
    }

    /// Number of distinct provenance keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: SourceKey = SourceKey::new(0x0123_4567_89ab, 1);

    #[test]
    fn test_nearest() {
        let mut idx = SourceIndex::new();
        for p in [3, 10, 25] {
            idx.register(KEY, p);
        }
        assert_eq!(
            idx.nearest(KEY, 0),
            Nearest {
                prev: None,
                next: Some(3)
            }
        );
        assert_eq!(
            idx.nearest(KEY, 10),
            Nearest {
                prev: Some(10),
                next: Some(25)
            }
        );
        assert_eq!(
            idx.nearest(KEY, 11),
            Nearest {
                prev: Some(10),
                next: Some(25)
            }
        );
        assert_eq!(
            idx.nearest(KEY, 99),
            Nearest {
                prev: Some(25),
                next: None
            }
        );
        assert_eq!(idx.previous_before(KEY, 10), Some(3));
        assert_eq!(idx.previous_before(KEY, 3), None);
    }

    #[test]
    fn test_unknown_key() {
        let idx = SourceIndex::new();
        assert_eq!(idx.nearest(KEY, 5), Nearest::default());
        assert_eq!(idx.previous_before(KEY, 5), None);
        assert!(idx.positions(KEY).is_empty());
    }

    #[test]
    fn test_out_of_order_and_duplicates() {
        let mut idx = SourceIndex::new();
        for p in [5, 1, 9, 5, 3] {
            idx.register(KEY, p);
        }
        assert_eq!(idx.positions(KEY), &[1, 3, 5, 9]);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_rekey_host_merges() {
        let mut idx = SourceIndex::new();
        idx.register(SourceKey::new(0, 1), 2);
        idx.register(SourceKey::new(0, 1), 8);
        idx.register(SourceKey::new(0, 4), 5);
        idx.register(KEY, 6);
        idx.rekey_host(0, KEY.host_id);
        assert_eq!(idx.positions(KEY), &[2, 6, 8]);
        assert_eq!(idx.positions(SourceKey::new(KEY.host_id, 4)), &[5]);
        assert!(idx.positions(SourceKey::new(0, 1)).is_empty());
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_host_id_masked() {
        let key = SourceKey::new(0xffff_0000_0000_0001, 2);
        assert_eq!(key.host_id, 1);
    }
}
