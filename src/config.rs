//! Trie shape configuration.
//!
//! A map is shaped by two numbers fixed at construction: the branch width `B`
//! (key bits consumed per level, fan-out `2^B`) and the key width `W`. Every
//! key walks exactly `ceil(W / B)` levels.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::key::{KeyPath, TrieKey};

/// Branch width used when none is given (8-way fan-out).
pub const DEFAULT_BRANCH_BITS: u32 = 3;
/// Widest supported level (1024-way fan-out).
pub const MAX_BRANCH_BITS: u32 = 10;
/// Widest supported key.
pub const MAX_KEY_BITS: u32 = u128::BITS;

/// Shape of a trie: bits per level and total key width.
///
/// Always valid once constructed; deserialization goes through the same
/// validation as [`MapConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMapConfig")]
pub struct MapConfig {
    branch_bits: u32,
    key_bits: u32,
}

#[derive(Deserialize)]
struct RawMapConfig {
    branch_bits: u32,
    key_bits: u32,
}

impl TryFrom<RawMapConfig> for MapConfig {
    type Error = MapError;

    fn try_from(raw: RawMapConfig) -> Result<Self> {
        Self::new(raw.branch_bits, raw.key_bits)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            branch_bits: DEFAULT_BRANCH_BITS,
            key_bits: u64::BITS,
        }
    }
}

impl MapConfig {
    /// Creates a config for keys of `key_bits` bits split into `branch_bits`-bit groups.
    ///
    /// # Errors
    /// [`MapError::InvalidBranchBits`] unless `1 <= branch_bits <= MAX_BRANCH_BITS`,
    /// [`MapError::InvalidKeyBits`] unless `1 <= key_bits <= 128`.
    pub fn new(branch_bits: u32, key_bits: u32) -> Result<Self> {
        validate(branch_bits, key_bits, MAX_KEY_BITS)?;
        Ok(Self {
            branch_bits,
            key_bits,
        })
    }

    /// Creates a config covering the full width of `K`.
    ///
    /// # Errors
    /// [`MapError::InvalidBranchBits`] for an unsupported branch width.
    pub fn for_key<K: TrieKey>(branch_bits: u32) -> Result<Self> {
        Self::new(branch_bits, K::BITS)
    }

    /// Default branch width over the full width of `K`.
    pub fn default_for<K: TrieKey>() -> Self {
        Self {
            branch_bits: DEFAULT_BRANCH_BITS,
            key_bits: K::BITS,
        }
    }

    /// Bits consumed per level.
    #[inline]
    pub const fn branch_bits(&self) -> u32 {
        self.branch_bits
    }

    /// Total key width.
    #[inline]
    pub const fn key_bits(&self) -> u32 {
        self.key_bits
    }

    /// Child slots per branch node, `2^B`.
    #[inline]
    pub const fn fanout(&self) -> usize {
        1 << self.branch_bits
    }

    /// Mask selecting one branch index, `2^B - 1`.
    #[inline]
    pub const fn mask(&self) -> u128 {
        (1 << self.branch_bits) - 1
    }

    /// Levels below the root, `ceil(W / B)`.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.key_bits.div_ceil(self.branch_bits) as usize
    }

    /// Checks that this config can hold keys of type `K`.
    ///
    /// # Errors
    /// [`MapError::InvalidKeyBits`] when `W` exceeds the width of `K`.
    pub fn check_key_type<K: TrieKey>(&self) -> Result<()> {
        validate(self.branch_bits, self.key_bits, K::BITS)
    }

    /// Checks that `key` has no bits above the key width.
    ///
    /// # Errors
    /// [`MapError::KeyOutOfRange`] if it does.
    #[inline]
    pub fn check_key(&self, key: u128) -> Result<()> {
        if self.key_bits < MAX_KEY_BITS && key >> self.key_bits != 0 {
            return Err(MapError::KeyOutOfRange {
                key,
                key_bits: self.key_bits,
            });
        }
        Ok(())
    }

    /// Decomposes `key` into its branch indices.
    ///
    /// # Errors
    /// [`MapError::KeyOutOfRange`] if the key does not fit the key width.
    #[inline]
    pub fn path<K: TrieKey>(&self, key: K) -> Result<KeyPath> {
        let key = key.to_u128();
        self.check_key(key)?;
        Ok(KeyPath::new(key, self))
    }
}

fn validate(branch_bits: u32, key_bits: u32, max_key_bits: u32) -> Result<()> {
    let err = if branch_bits == 0 || branch_bits > MAX_BRANCH_BITS {
        MapError::InvalidBranchBits {
            bits: branch_bits,
            max: MAX_BRANCH_BITS,
        }
    } else if key_bits == 0 || key_bits > max_key_bits {
        MapError::InvalidKeyBits {
            bits: key_bits,
            max: max_key_bits,
        }
    } else {
        return Ok(());
    };
    tracing::warn!(branch_bits, key_bits, error = %err, "rejected trie configuration");
    Err(err)
}
