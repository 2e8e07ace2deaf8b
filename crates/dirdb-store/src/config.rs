//! Database open configuration, mirroring the flags an embedded hashed-file
//! engine is conventionally opened with.

/// Default number of hash buckets for the underlying engine's page table.
pub const DEFAULT_HASH_BUCKETS: u32 = 10_000;

/// Options controlling how [`crate::Store::open`] opens the database file.
///
/// `no_sync` and `no_mmap` describe durability/mapping trade-offs of the
/// underlying file format; the engine used here (`redb`) owns its own
/// on-disk layout and does not expose direct knobs for either, so both
/// fields are recorded for fidelity with the external interface but only
/// `read_only` and `hash_buckets` currently change observable behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub read_only: bool,
    pub no_sync: bool,
    pub no_mmap: bool,
    pub hash_buckets: u32,
    pub file_mode: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            read_only: false,
            no_sync: false,
            no_mmap: false,
            hash_buckets: DEFAULT_HASH_BUCKETS,
            file_mode: 0o600,
        }
    }
}

impl DatabaseConfig {
    pub fn read_only() -> Self {
        DatabaseConfig {
            read_only: true,
            ..DatabaseConfig::default()
        }
    }

    pub fn with_hash_buckets(mut self, buckets: u32) -> Self {
        self.hash_buckets = buckets;
        self
    }

    pub fn with_no_sync(mut self, no_sync: bool) -> Self {
        self.no_sync = no_sync;
        self
    }

    pub fn with_no_mmap(mut self, no_mmap: bool) -> Self {
        self.no_mmap = no_mmap;
        self
    }

    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }
}
