//! # `binmap` - Concurrent Integer Prefix Trie
//!
//! An associative map keyed by fixed-width unsigned integers, stored as a
//! prefix trie (radix tree) that branches on fixed-size groups of key bits.
//! Threads insert and read concurrently without a global lock.
//!
//! ## Shape
//!
//! A map is configured with a branch width `B` and a key width `W`
//! ([`MapConfig`]). Every node has `2^B` child slots and one item slot; every
//! key walks exactly `ceil(W / B)` levels, low bits first. The walk length
//! never depends on the key's value, so `5` and `5 + 2^60` can never land on
//! the same node.
//!
//! ## Policies
//!
//! The same shape and walk run under three synchronization policies:
//!
//! 1. [`LockFree`] ([`LockFreeMap`]): a missing child is built in full, then
//!    published with one compare-exchange from null. Losers drop their
//!    unpublished candidate and follow the winner. Values live in
//!    `AtomicCell`s.
//! 2. [`Locked`] ([`MutexMap`]): a missing child is installed under the
//!    parent's mutex, which is released before descending. Values live in
//!    `AtomicCell`s, so reads and writes of present keys never wait.
//! 3. [`Local`] ([`LocalMap`]): no synchronization; growth takes `&mut self`.
//!    Values may be any `Default` type, not only `Copy` ones.
//!
//! Publication uses release ordering and slot reads use acquire ordering,
//! so a reader that sees a node also sees everything written into it first.
//!
//! ## Lifecycle
//!
//! The root exists from construction. Nodes are created the first time a
//! walk needs them, are never replaced or removed, and are all freed when
//! the map is dropped. There is no delete.
//!
//! ## Example
//!
//! ```rust
//! use binmap::{LockFreeMap, MapConfig};
//!
//! let config = MapConfig::new(3, 8).unwrap();
//! let map: LockFreeMap<u8, u32> = LockFreeMap::with_config(config).unwrap();
//!
//! map.insert(5, 50);
//! map.insert(13, 130);
//!
//! assert_eq!(map.get(5), Some(50));
//! assert_eq!(map.get(13), Some(130));
//! assert_eq!(map.get(21), None);
//!
//! // `query` creates the path and hands back the item slot.
//! map.query(21).store(210);
//! assert_eq!(map.get(21), Some(210));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod key;
pub mod map;
pub mod node;
pub mod policy;
mod traverse;

pub use config::{MapConfig, DEFAULT_BRANCH_BITS, MAX_BRANCH_BITS};
pub use error::{MapError, Result};
pub use key::{decompose, KeyPath, TrieKey};
pub use map::{ConcurrentMap, LocalMap, LockFreeMap, MapStats, MutexMap};
pub use policy::{Local, LockFree, Locked};

// Compile-time layout checks.
const _: () = {
    use core::mem;

    // Policies are pure type-level markers.
    assert!(mem::size_of::<LockFree>() == 0);
    assert!(mem::size_of::<Locked>() == 0);
    assert!(mem::size_of::<Local>() == 0);

    // A child slot is one pointer wide under every policy.
    assert!(mem::size_of::<policy::AtomicChild<u64, LockFree>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<policy::AtomicChild<u64, Locked>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<Option<Box<node::Node<u64, Local>>>>() == mem::size_of::<usize>());
};
