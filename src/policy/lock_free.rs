//! Lock-free policy: children are published with a single compare-exchange.
//!
//! A thread that finds an empty slot builds a complete candidate node and
//! tries to swing the slot from null to the candidate. The loser of a race
//! drops its candidate, which no other thread ever saw, and descends into
//! the winner. Publication uses release ordering and every slot read uses
//! acquire ordering, so a thread that sees a child also sees its contents.

use crossbeam_utils::atomic::AtomicCell;

use super::{sealed::Sealed, AtomicChild, Census, Layout, SharedLayout};
use crate::node::Node;

/// Lock-free synchronization: CAS-published children, atomic item cells.
///
/// Values must be `Copy`; they live in a [`AtomicCell`], which is lock-free
/// for word-sized values and falls back to a striped seqlock otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LockFree;

impl Sealed for LockFree {}

impl<V: Copy + Default> Layout<V> for LockFree {
    type Child = AtomicChild<V, Self>;
    type Item = AtomicCell<V>;
    type Lock = ();

    #[inline]
    fn child(slot: &Self::Child) -> Option<&Node<V, Self>> {
        slot.get()
    }
}

impl<V: Copy + Default> SharedLayout<V> for LockFree {
    fn ensure_child<'a>(
        node: &'a Node<V, Self>,
        index: usize,
        fanout: usize,
        census: &Census,
    ) -> &'a Node<V, Self> {
        let slot = node.slot(index);
        if let Some(child) = slot.get() {
            return child;
        }
        match slot.install(Box::new(Node::new(fanout))) {
            Ok(child) => {
                census.record_published();
                child
            }
            Err((candidate, winner)) => {
                drop(candidate);
                census.record_discarded();
                tracing::trace!(index, "lost child install race, candidate dropped");
                winner
            }
        }
    }

    #[inline]
    fn store(item: &AtomicCell<V>, value: V) {
        item.store(value);
    }

    #[inline]
    fn load(item: &AtomicCell<V>) -> V {
        item.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_ensure_child_reuses_published() {
        let census = Census::default();
        let root: Node<u64, LockFree> = Node::new(8);
        let a = LockFree::ensure_child(&root, 3, 8, &census) as *const _;
        let b = LockFree::ensure_child(&root, 3, 8, &census) as *const _;
        assert_eq!(a, b);
        assert_eq!(census.published(), 1);
        assert_eq!(census.discarded(), 0);
    }

    #[test]
    fn test_racing_threads_share_one_child() {
        const THREADS: usize = 8;
        let census = Census::default();
        let root: Node<u64, LockFree> = Node::new(8);
        let barrier = Barrier::new(THREADS);

        let seen: Vec<usize> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        LockFree::ensure_child(&root, 5, 8, &census) as *const _ as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(seen.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(census.published(), 1);
        assert!(census.discarded() < THREADS);
        assert_eq!(root.count(), 2);
    }

    #[test]
    fn test_item_store_load() {
        let node: Node<u32, LockFree> = Node::new(0);
        assert_eq!(LockFree::load(node.item()), 0);
        LockFree::store(node.item(), 17);
        assert_eq!(LockFree::load(node.item()), 17);
    }
}
