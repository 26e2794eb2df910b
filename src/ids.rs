//! Fallback-identifier generation, injectable so tests can be deterministic.
//!
//! Inbound messages are allowed to omit their control id and filler order
//! number; the extractor and ACK composer then mint one through this trait
//! instead of reaching for a random number directly.

use uuid::Uuid;

/// Source of generated identifiers such as `MSG…`, `FILLER…` and `ACK…`.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier starting with `prefix`.
    fn generate(&self, prefix: &str) -> String;
}

/// Production generator: the prefix plus the first 8 hex chars of a v4 uuid.
#[derive(Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn generate(&self, prefix: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}{}", prefix, &id[..8])
    }
}
