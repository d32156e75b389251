//! Single-threaded map.

use core::fmt;
use core::marker::PhantomData;

use crate::config::MapConfig;
use crate::error::Result;
use crate::key::{KeyPath, TrieKey};
use crate::map::MapStats;
use crate::node::Node;
use crate::policy::Local;
use crate::traverse::{assume_path, ensure_path_mut, find_path};

/// The same trie as [`ConcurrentMap`](crate::ConcurrentMap) with plain
/// owning slots. Growth needs `&mut self`; values may be any `Default` type.
///
/// ```
/// use binmap::LocalMap;
///
/// let mut map: LocalMap<u32, String> = LocalMap::new();
/// map.insert(5, "five".to_owned());
/// map.query(6).push_str("six");
/// assert_eq!(map.get(5).map(String::as_str), Some("five"));
/// assert_eq!(map.get(6).map(String::as_str), Some("six"));
/// assert_eq!(map.get(7), None);
/// ```
pub struct LocalMap<K, V: Default> {
    root: Node<V, Local>,
    config: MapConfig,
    nodes: usize,
    _key: PhantomData<fn(K) -> K>,
}

impl<K: TrieKey, V: Default> LocalMap<K, V> {
    /// Creates a map over the full width of `K` with 8-way branching.
    pub fn new() -> Self {
        Self::build(MapConfig::default_for::<K>())
    }

    /// Creates a map over the full width of `K` with `2^branch_bits`-way branching.
    ///
    /// # Errors
    /// [`MapError::InvalidBranchBits`](crate::MapError::InvalidBranchBits).
    pub fn with_branch_bits(branch_bits: u32) -> Result<Self> {
        MapConfig::for_key::<K>(branch_bits).map(Self::build)
    }

    /// Creates a map with an explicit shape.
    ///
    /// # Errors
    /// [`MapError::InvalidKeyBits`](crate::MapError::InvalidKeyBits) if the
    /// key width exceeds `K`.
    pub fn with_config(config: MapConfig) -> Result<Self> {
        config.check_key_type::<K>()?;
        Ok(Self::build(config))
    }

    fn build(config: MapConfig) -> Self {
        tracing::debug!(
            branch_bits = config.branch_bits(),
            key_bits = config.key_bits(),
            depth = config.depth(),
            "creating local trie map"
        );
        Self {
            root: Node::new(config.fanout()),
            config,
            nodes: 1,
            _key: PhantomData,
        }
    }

    /// The map's shape.
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Levels walked by every operation.
    #[inline]
    pub fn depth(&self) -> usize {
        self.config.depth()
    }

    #[inline]
    fn terminal(&mut self, path: KeyPath) -> &mut Node<V, Local> {
        ensure_path_mut(&mut self.root, path, self.config.fanout(), &mut self.nodes)
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Panics
    /// If `key` has bits above the configured key width.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        *self.query(key) = value;
    }

    /// [`insert`](Self::insert) that reports an out-of-range key.
    ///
    /// # Errors
    /// [`MapError::KeyOutOfRange`](crate::MapError::KeyOutOfRange).
    pub fn try_insert(&mut self, key: K, value: V) -> Result<()> {
        *self.try_query(key)? = value;
        Ok(())
    }

    /// Creates the path to `key` and returns its value, `V::default()` if
    /// never written.
    ///
    /// # Panics
    /// If `key` has bits above the configured key width.
    #[inline]
    pub fn query(&mut self, key: K) -> &mut V {
        match self.config.path(key) {
            Ok(path) => self.terminal(path).item_mut(),
            Err(err) => panic!("{err}"),
        }
    }

    /// [`query`](Self::query) that reports an out-of-range key.
    ///
    /// # Errors
    /// [`MapError::KeyOutOfRange`](crate::MapError::KeyOutOfRange).
    pub fn try_query(&mut self, key: K) -> Result<&mut V> {
        let path = self.config.path(key)?;
        Ok(self.terminal(path).item_mut())
    }

    /// The value under `key`, or `None` if its path was never created.
    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        let path = self.config.path(key).ok()?;
        find_path(&self.root, path).map(Node::item)
    }

    /// The value under `key`, without checking that its path exists.
    ///
    /// # Safety
    /// `key` must have been inserted (or queried) earlier.
    #[inline]
    pub unsafe fn get_unchecked(&self, key: K) -> &V {
        let path = KeyPath::new(key.to_u128(), &self.config);
        // SAFETY: upheld by the caller.
        unsafe { assume_path(&self.root, path) }.item()
    }

    /// Whether the path for `key` exists.
    #[inline]
    pub fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }
}

impl<K, V: Default> LocalMap<K, V> {
    /// Node counters. Nothing is ever discarded without concurrency.
    pub fn stats(&self) -> MapStats {
        MapStats {
            nodes: self.nodes,
            discarded: 0,
            depth: self.config.depth(),
            fanout: self.config.fanout(),
        }
    }

    /// Counts reachable nodes by walking the trie.
    pub fn count_nodes(&self) -> usize {
        self.root.count()
    }
}

impl<K: TrieKey, V: Default> Default for LocalMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TrieKey, V: Default> Extend<(K, V)> for LocalMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: TrieKey, V: Default> FromIterator<(K, V)> for LocalMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V: Default> fmt::Debug for LocalMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMap")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_small_keys() {
        let mut map: LocalMap<u8, &str> = LocalMap::new();
        map.insert(5, "a");
        map.insert(13, "b");
        assert_eq!(map.get(5), Some(&"a"));
        assert_eq!(map.get(13), Some(&"b"));
        assert_eq!(map.stats().nodes, 6);
        assert_eq!(map.count_nodes(), 6);
    }

    #[test]
    fn test_query_defaults_then_mutates() {
        let mut map: LocalMap<u64, Vec<u32>> = LocalMap::with_branch_bits(4).unwrap();
        assert!(map.query(1 << 40).is_empty());
        map.query(1 << 40).push(3);
        map.query(1 << 40).push(4);
        assert_eq!(map.get(1 << 40), Some(&vec![3, 4]));
        assert_eq!(unsafe { map.get_unchecked(1 << 40) }, &vec![3, 4]);
        assert!(map.contains_key(1 << 40));
        assert!(!map.contains_key(1 << 41));
    }

    #[test]
    fn test_try_insert_out_of_range() {
        let mut map: LocalMap<u16, u8> =
            LocalMap::with_config(MapConfig::new(2, 10).unwrap()).unwrap();
        assert!(map.try_insert(1023, 1).is_ok());
        assert!(map.try_insert(1024, 1).is_err());
        assert_eq!(map.get(1024), None);
        assert_eq!(map.get(1023), Some(&1));
    }
}
