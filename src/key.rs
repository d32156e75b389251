//! Key types and their decomposition into branch indices.

use core::fmt::Debug;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::config::MapConfig;

/// Unsigned integer usable as a trie key.
///
/// Keys are only ever read as bit strings; magnitude and ordering play no
/// part in placement.
pub trait TrieKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Width of the key type in bits.
    const BITS: u32;

    /// Widens the key without changing its bits.
    fn to_u128(self) -> u128;
}

macro_rules! impl_trie_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl TrieKey for $t {
                const BITS: u32 = <$t>::BITS;

                #[inline(always)]
                #[allow(clippy::cast_lossless, clippy::unnecessary_cast)]
                fn to_u128(self) -> u128 {
                    self as u128
                }
            }
        )*
    };
}

impl_trie_key!(u8, u16, u32, u64, u128, usize);

/// The branch indices of one key, least significant group first.
///
/// Always yields exactly [`MapConfig::depth`] indices. Leading zero groups
/// are still walked: stopping once the remaining key is zero would send a
/// key and its zero-extended twin to the same node.
#[derive(Debug, Clone)]
pub struct KeyPath {
    rest: u128,
    mask: u128,
    shift: u32,
    remaining: usize,
}

impl KeyPath {
    /// Starts the walk for `key` under `config`.
    ///
    /// Bits above the key width are ignored; use [`MapConfig::path`] to
    /// reject such keys instead.
    #[inline]
    pub fn new(key: u128, config: &MapConfig) -> Self {
        Self {
            rest: key,
            mask: config.mask(),
            shift: config.branch_bits(),
            remaining: config.depth(),
        }
    }
}

impl Iterator for KeyPath {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // At most MAX_BRANCH_BITS wide, so always fits.
        #[allow(clippy::cast_possible_truncation)]
        let index = (self.rest & self.mask) as usize;
        self.rest >>= self.shift;
        Some(index)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for KeyPath {}

impl FusedIterator for KeyPath {}

/// Branch indices for `key`, see [`KeyPath`].
#[inline]
pub fn decompose<K: TrieKey>(key: K, config: &MapConfig) -> KeyPath {
    KeyPath::new(key.to_u128(), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(key: u64, branch_bits: u32, key_bits: u32) -> Vec<usize> {
        let config = MapConfig::new(branch_bits, key_bits).unwrap();
        decompose(key, &config).collect()
    }

    #[test]
    fn test_small_keys() {
        // 00000101 and 00001101 share the low group and split one level down.
        assert_eq!(indices(5, 3, 8), vec![5, 0, 0]);
        assert_eq!(indices(13, 3, 8), vec![5, 1, 0]);
    }

    #[test]
    fn test_fixed_depth() {
        let config = MapConfig::new(3, 64).unwrap();
        for key in [0u64, 1, 7, 8, 0xdead_beef, u64::MAX] {
            let path = decompose(key, &config);
            assert_eq!(path.len(), 22);
            assert_eq!(path.count(), 22);
        }
    }

    #[test]
    fn test_leading_zero_group_is_walked() {
        // 5 and 5 + 2^6 agree on the two low groups and differ only in the top one.
        let low = indices(5, 3, 9);
        let high = indices(5 | (1 << 6), 3, 9);
        assert_eq!(low, vec![5, 0, 0]);
        assert_eq!(high, vec![5, 0, 1]);
        assert_ne!(low, high);
    }

    #[test]
    fn test_binary_branching() {
        assert_eq!(indices(0b1011, 1, 4), vec![1, 1, 0, 1]);
    }

    #[test]
    fn test_full_width_u128() {
        let config = MapConfig::new(10, 128).unwrap();
        let path: Vec<usize> = decompose(u128::MAX, &config).collect();
        assert_eq!(path.len(), 13);
        assert!(path[..12].iter().all(|&i| i == 1023));
        // The top group holds the remaining 8 bits.
        assert_eq!(path[12], 0xff);
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let config = MapConfig::new(4, 16).unwrap();
        let mut path = decompose(0xabcdu16, &config);
        assert_eq!(path.len(), 4);
        assert_eq!(path.next(), Some(0xd));
        assert_eq!(path.len(), 3);
        assert_eq!(path.collect::<Vec<_>>(), vec![0xc, 0xb, 0xa]);
    }
}
