//! Error types for map construction and checked key access.

use thiserror::Error;

/// Result type alias using [`MapError`].
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors reported by configuration and the checked (`try_*`) operations.
///
/// Normal inserts and lookups cannot fail; these variants only describe a
/// configuration that cannot describe a trie, or a key that does not fit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    /// Branch width outside `1..=max`.
    #[error("branch width of {bits} bits is invalid (expected 1..={max})")]
    InvalidBranchBits {
        /// Requested bits per level.
        bits: u32,
        /// Largest supported branch width.
        max: u32,
    },

    /// Key width outside `1..=max`.
    #[error("key width of {bits} bits is invalid (expected 1..={max})")]
    InvalidKeyBits {
        /// Requested key width.
        bits: u32,
        /// Width of the key type, or 128 for a bare config.
        max: u32,
    },

    /// The key has bits set above the configured key width.
    #[error("key {key:#x} does not fit in {key_bits} bits")]
    KeyOutOfRange {
        /// The offending key, widened.
        key: u128,
        /// Configured key width.
        key_bits: u32,
    },
}
