//! Shared-access map over a concurrent policy.

use core::fmt;
use core::marker::PhantomData;

use crate::config::MapConfig;
use crate::error::Result;
use crate::key::{KeyPath, TrieKey};
use crate::map::MapStats;
use crate::node::Node;
use crate::policy::{Census, Layout, LockFree, Locked, SharedLayout};
use crate::traverse::{assume_path, ensure_path, find_path};

/// An integer-keyed prefix trie that any number of threads may insert into
/// and read from through `&self`.
///
/// The trie only grows: nodes are created on first use, never replaced and
/// freed together when the map is dropped. How new children are published
/// is decided by the policy `P`; see [`LockFreeMap`] and [`MutexMap`].
///
/// ```
/// use binmap::LockFreeMap;
///
/// let map: LockFreeMap<u64, u64> = LockFreeMap::new();
/// std::thread::scope(|s| {
///     for t in 0..4u64 {
///         let map = &map;
///         s.spawn(move || {
///             for k in (t * 100)..(t * 100 + 100) {
///                 map.insert(k, k * 2);
///             }
///         });
///     }
/// });
/// assert_eq!(map.get(250), Some(500));
/// assert_eq!(map.get(9999), None);
/// ```
pub struct ConcurrentMap<K, V, P = LockFree>
where
    P: Layout<V>,
{
    root: Node<V, P>,
    config: MapConfig,
    census: Census,
    _key: PhantomData<fn(K) -> K>,
}

/// Lock-free map: children published by compare-exchange, `Copy` values in
/// atomic cells.
pub type LockFreeMap<K, V> = ConcurrentMap<K, V, LockFree>;

/// Map with one mutex per node, taken only to install a missing child.
/// Values sit in atomic cells as in [`LockFreeMap`].
pub type MutexMap<K, V> = ConcurrentMap<K, V, Locked>;

impl<K: TrieKey, V, P: SharedLayout<V>> ConcurrentMap<K, V, P> {
    /// Creates a map over the full width of `K` with 8-way branching.
    pub fn new() -> Self {
        Self::build(MapConfig::default_for::<K>())
    }

    /// Creates a map over the full width of `K` with `2^branch_bits`-way branching.
    ///
    /// # Errors
    /// [`MapError::InvalidBranchBits`](crate::MapError::InvalidBranchBits) for an
    /// unsupported width.
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
            fanout = config.fanout(),
            "creating concurrent trie map"
        );
        let census = Census::default();
        census.record_published();
        Self {
            root: Node::new(config.fanout()),
            config,
            census,
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
    fn path(&self, key: K) -> KeyPath {
        match self.config.path(key) {
            Ok(path) => path,
            Err(err) => panic!("{err}"),
        }
    }

    #[inline]
    fn terminal(&self, path: KeyPath) -> &Node<V, P> {
        ensure_path(&self.root, path, self.config.fanout(), &self.census)
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Racing inserts of one key leave whichever store lands last.
    ///
    /// # Panics
    /// If `key` has bits above the configured key width; see [`try_insert`](Self::try_insert).
    #[inline]
    pub fn insert(&self, key: K, value: V) {
        let node = self.terminal(self.path(key));
        P::store(node.item(), value);
    }

    /// [`insert`](Self::insert) that reports an out-of-range key.
    ///
    /// # Errors
    /// [`MapError::KeyOutOfRange`](crate::MapError::KeyOutOfRange).
    pub fn try_insert(&self, key: K, value: V) -> Result<()> {
        let node = self.terminal(self.config.path(key)?);
        P::store(node.item(), value);
        Ok(())
    }

    /// Creates the path to `key` and returns its item slot.
    ///
    /// A slot that was never written holds `V::default()`. The handle can be
    /// read or written later without walking the trie again.
    ///
    /// # Panics
    /// If `key` has bits above the configured key width.
    #[inline]
    pub fn query(&self, key: K) -> &P::Item {
        self.terminal(self.path(key)).item()
    }

    /// [`query`](Self::query) that reports an out-of-range key.
    ///
    /// # Errors
    /// [`MapError::KeyOutOfRange`](crate::MapError::KeyOutOfRange).
    pub fn try_query(&self, key: K) -> Result<&P::Item> {
        Ok(self.terminal(self.config.path(key)?).item())
    }

    /// Reads the value under `key`, or `None` if its path was never created.
    ///
    /// A key reached only through [`query`](Self::query) reads as `V::default()`.
    #[inline]
    pub fn get(&self, key: K) -> Option<V> {
        let path = self.config.path(key).ok()?;
        find_path(&self.root, path).map(|node| P::load(node.item()))
    }

    /// Reads the value under `key` without checking that its path exists.
    ///
    /// # Safety
    /// `key` must have been inserted (or queried), and that call must
    /// happen-before this one, e.g. by joining the inserting thread.
    /// Otherwise the walk follows a null child.
    #[inline]
    pub unsafe fn get_unchecked(&self, key: K) -> V {
        let path = KeyPath::new(key.to_u128(), &self.config);
        // SAFETY: upheld by the caller.
        let node = unsafe { assume_path(&self.root, path) };
        P::load(node.item())
    }

    /// Whether the path for `key` exists.
    #[inline]
    pub fn contains_key(&self, key: K) -> bool {
        self.config
            .path(key)
            .is_ok_and(|path| find_path(&self.root, path).is_some())
    }
}

impl<K, V, P: Layout<V>> ConcurrentMap<K, V, P> {
    /// Node and race counters.
    pub fn stats(&self) -> MapStats {
        MapStats {
            nodes: self.census.published(),
            discarded: self.census.discarded(),
            depth: self.config.depth(),
            fanout: self.config.fanout(),
        }
    }

    /// Counts reachable nodes by walking the trie.
    ///
    /// With no insert in flight this equals `stats().nodes`: every published
    /// node is reachable from exactly one slot.
    pub fn count_nodes(&self) -> usize {
        self.root.count()
    }
}

#[cfg(feature = "parallel")]
impl<K, V, P> ConcurrentMap<K, V, P>
where
    K: TrieKey,
    V: Send,
    P: SharedLayout<V>,
    Self: Sync,
{
    /// Inserts every pair on the rayon thread pool.
    ///
    /// # Panics
    /// If any key has bits above the configured key width.
    pub fn par_extend<I>(&self, items: I)
    where
        I: rayon::iter::IntoParallelIterator<Item = (K, V)>,
    {
        use rayon::iter::ParallelIterator;
        items
            .into_par_iter()
            .for_each(|(key, value)| self.insert(key, value));
    }
}

impl<K: TrieKey, V, P: SharedLayout<V>> Default for ConcurrentMap<K, V, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TrieKey, V, P: SharedLayout<V>> Extend<(K, V)> for ConcurrentMap<K, V, P> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: TrieKey, V, P: SharedLayout<V>> FromIterator<(K, V)> for ConcurrentMap<K, V, P> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, P: Layout<V>> fmt::Debug for ConcurrentMap<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentMap")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapError;

    #[test]
    fn test_new_map_has_root_only() {
        let map: LockFreeMap<u64, u64> = LockFreeMap::new();
        assert_eq!(map.depth(), 22);
        assert_eq!(map.count_nodes(), 1);
        assert_eq!(
            map.stats(),
            MapStats {
                nodes: 1,
                discarded: 0,
                depth: 22,
                fanout: 8
            }
        );
    }

    #[test]
    fn test_insert_get_overwrite() {
        let map: LockFreeMap<u32, i64> = LockFreeMap::new();
        map.insert(42, -1);
        assert_eq!(map.get(42), Some(-1));
        map.insert(42, 7);
        assert_eq!(map.get(42), Some(7));
        assert_eq!(unsafe { map.get_unchecked(42) }, 7);
        assert_eq!(map.get(43), None);
    }

    #[test]
    fn test_query_handle_writes_through() {
        let map: LockFreeMap<u16, u32> = LockFreeMap::new();
        let slot = map.query(9);
        assert_eq!(slot.load(), 0);
        assert!(map.contains_key(9));
        slot.store(99);
        assert_eq!(map.get(9), Some(99));
    }

    #[test]
    fn test_narrow_key_width() {
        let config = MapConfig::new(3, 8).unwrap();
        let map: MutexMap<u64, u16> = MutexMap::with_config(config).unwrap();
        assert_eq!(map.depth(), 3);
        map.insert(0xff, 0xabc);
        assert_eq!(map.get(0xff), Some(0xabc));

        assert_eq!(
            map.try_insert(0x100, 1),
            Err(MapError::KeyOutOfRange { key: 0x100, key_bits: 8 })
        );
        assert!(map.try_query(0x1ff).is_err());
        assert_eq!(map.get(0x100), None);
        assert!(!map.contains_key(0x100));
    }

    #[test]
    fn test_mutex_get_and_insert_never_wait() {
        use std::sync::mpsc;
        use std::time::Duration;

        let map: MutexMap<u32, u64> = MutexMap::new();
        map.insert(1, 10);
        let slot = map.query(1);

        // Neither the item handle nor a held install lock stalls a present key.
        let guard = map.root.install_lock().lock();
        let (tx, rx) = mpsc::channel();
        std::thread::scope(|s| {
            s.spawn(|| {
                let before = map.get(1);
                map.insert(1, 11);
                tx.send((before, map.get(1))).unwrap();
            });
            let seen = rx.recv_timeout(Duration::from_secs(5));
            drop(guard);
            assert_eq!(seen, Ok((Some(10), Some(11))));
        });
        assert_eq!(slot.load(), 11);
    }

    #[test]
    #[should_panic(expected = "does not fit in 8 bits")]
    fn test_insert_out_of_range_panics() {
        let map: LockFreeMap<u32, u32> =
            LockFreeMap::with_config(MapConfig::new(2, 8).unwrap()).unwrap();
        map.insert(256, 1);
    }

    #[test]
    fn test_rejects_config_wider_than_key() {
        let config = MapConfig::new(3, 64).unwrap();
        assert!(matches!(
            LockFreeMap::<u32, u32>::with_config(config),
            Err(MapError::InvalidKeyBits { bits: 64, max: 32 })
        ));
        assert!(matches!(
            MutexMap::<u32, u32>::with_branch_bits(0),
            Err(MapError::InvalidBranchBits { .. })
        ));
    }

    #[test]
    fn test_collect_and_debug() {
        let map: MutexMap<u8, u8> = (0..=255u8).map(|k| (k, k.wrapping_mul(3))).collect();
        assert_eq!(map.get(7), Some(21));
        assert_eq!(map.get(255), Some(253));
        // 8 + 64 + 256 nodes under the root for a full u8 space at B = 3.
        assert_eq!(map.count_nodes(), 1 + 8 + 64 + 256);
        let debug = format!("{map:?}");
        assert!(debug.starts_with("ConcurrentMap"));
    }
}
