/// Largest record body accepted by default (ERF record lengths are 16-bit)
pub const DEFAULT_MAX_RECORD_LEN: usize = 65535;

/// Default bound on the number of extension headers decoded in one record
pub const DEFAULT_MAX_EXT_HEADERS: usize = 32;

/// Decoder settings shared by all records of a capture
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ErfConfig {
    /// Ceiling on the declared body length of a record (record length minus the fixed header).
    /// Longer records are rejected before any allocation.
    pub max_record_len: usize,
    /// Maximum number of extension headers walked in one chain
    pub max_ext_headers: usize,
    /// Decode the tag stream of metadata records
    pub decode_meta: bool,
}

impl ErfConfig {
    pub const fn new() -> ErfConfig {
        ErfConfig {
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            max_ext_headers: DEFAULT_MAX_EXT_HEADERS,
            decode_meta: true,
        }
    }

    pub const fn with_max_record_len(mut self, max_record_len: usize) -> ErfConfig {
        self.max_record_len = max_record_len;
        self
    }

    pub const fn with_max_ext_headers(mut self, max_ext_headers: usize) -> ErfConfig {
        self.max_ext_headers = max_ext_headers;
        self
    }

    pub const fn with_decode_meta(mut self, decode_meta: bool) -> ErfConfig {
        self.decode_meta = decode_meta;
        self
    }

    /// Tighten the record ceiling using a container snapshot length
    ///
    /// A snapshot length of 0 means "unspecified" and leaves the ceiling unchanged.
    pub fn limited_by_snaplen(self, snaplen: u32) -> ErfConfig {
        if snaplen == 0 {
            return self;
        }
        let limit = (snaplen as usize).min(self.max_record_len);
        self.with_max_record_len(limit)
    }
}

impl Default for ErfConfig {
    fn default() -> Self {
        ErfConfig::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaplen_only_tightens() {
        let cfg = ErfConfig::default().limited_by_snaplen(1500);
        assert_eq!(cfg.max_record_len, 1500);
        let cfg = ErfConfig::default().limited_by_snaplen(262_144);
        assert_eq!(cfg.max_record_len, DEFAULT_MAX_RECORD_LEN);
        let cfg = ErfConfig::default().limited_by_snaplen(0);
        assert_eq!(cfg, ErfConfig::default());
    }
}
