//! Mutex-per-node policy.
//!
//! A missing child is installed while holding the parent's lock and nothing
//! else; the lock is released before the walk moves down a level, so no
//! thread ever holds two node locks. Present children are read without
//! locking, and values live in atomic cells, so the node lock is the only
//! thing any operation can wait on.

use crossbeam_utils::atomic::AtomicCell;
use parking_lot::Mutex;

use super::{sealed::Sealed, AtomicChild, Census, Layout, SharedLayout};
use crate::node::Node;

/// Per-node mutex synchronization for child installation.
///
/// Values are `Copy` and held in an [`AtomicCell`], the same item slot
/// [`LockFree`](super::LockFree) uses; only growth differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Locked;

impl Sealed for Locked {}

impl<V: Copy + Default> Layout<V> for Locked {
    type Child = AtomicChild<V, Self>;
    type Item = AtomicCell<V>;
    type Lock = Mutex<()>;

    #[inline]
    fn child(slot: &Self::Child) -> Option<&Node<V, Self>> {
        slot.get()
    }
}

impl<V: Copy + Default> SharedLayout<V> for Locked {
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

        let _guard = node.install_lock().lock();
        // Installed by whoever held the lock before us.
        if let Some(child) = slot.get() {
            return child;
        }
        census.record_published();
        slot.store(Box::new(Node::new(fanout)))
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
