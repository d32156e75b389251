//! Map engines: the public insert / query / get surface over a policy.

pub mod concurrent;
pub mod local;

pub use concurrent::{ConcurrentMap, LockFreeMap, MutexMap};
pub use local::LocalMap;

use serde::Serialize;

/// Shape and growth diagnostics for a map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapStats {
    /// Nodes published, root included.
    pub nodes: usize,
    /// Candidate nodes dropped after losing an install race.
    pub discarded: usize,
    /// Levels below the root.
    pub depth: usize,
    /// Child slots per branch node.
    pub fanout: usize,
}
