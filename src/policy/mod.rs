//! Synchronization policies over one trie shape.
//!
//! Every policy walks the same fixed-depth path; they differ only in what a
//! child slot, an item slot and a node lock are:
//!
//! | policy       | child slot                 | item slot         | lock            |
//! |--------------|----------------------------|-------------------|-----------------|
//! | [`LockFree`] | [`AtomicChild`], CAS       | `AtomicCell<V>`   | none            |
//! | [`Locked`]   | [`AtomicChild`], locked    | `AtomicCell<V>`   | `Mutex<()>`     |
//! | [`Local`]    | `Option<Box<Node>>`        | `V`               | none            |

pub mod local;
pub mod lock_free;
pub mod locked;

pub use local::Local;
pub use lock_free::LockFree;
pub use locked::Locked;

use core::marker::PhantomData;
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::node::Node;

mod sealed {
    pub trait Sealed {}
}

/// Slot types a policy stores in each [`Node`].
pub trait Layout<V>: sealed::Sealed + Sized {
    /// Holds at most one child node, set once and never cleared.
    type Child: Default;
    /// Holds the node's value.
    type Item: Default;
    /// Guards child installation.
    type Lock: Default;

    /// The child published in `slot`, if any.
    fn child(slot: &Self::Child) -> Option<&Node<V, Self>>;
}

/// Policies that can grow the trie and move values through `&Node`.
pub trait SharedLayout<V>: Layout<V> {
    /// Returns the child at `index`, creating and publishing a node with
    /// `fanout` slots if the slot is empty.
    ///
    /// At most one node is ever published per slot.
    fn ensure_child<'a>(
        node: &'a Node<V, Self>,
        index: usize,
        fanout: usize,
        census: &Census,
    ) -> &'a Node<V, Self>;

    /// Overwrites the value in `item`.
    fn store(item: &Self::Item, value: V);

    /// Reads the value in `item`.
    fn load(item: &Self::Item) -> V;
}

/// Counts of nodes created by a concurrent map.
#[derive(Debug, Default)]
pub struct Census {
    published: CachePadded<AtomicUsize>,
    discarded: CachePadded<AtomicUsize>,
}

impl Census {
    #[inline]
    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Nodes published so far, root included.
    pub fn published(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }

    /// Candidates built and dropped after losing an install race.
    pub fn discarded(&self) -> usize {
        self.discarded.load(Ordering::Relaxed)
    }
}

/// A child slot shared between threads. Owns the node it points to.
///
/// Null until a node is published, then fixed until the slot is dropped.
pub struct AtomicChild<V, P: Layout<V>> {
    ptr: AtomicPtr<Node<V, P>>,
    _owns: PhantomData<Box<Node<V, P>>>,
}

impl<V, P: Layout<V>> Default for AtomicChild<V, P> {
    fn default() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
            _owns: PhantomData,
        }
    }
}

impl<V, P: Layout<V>> AtomicChild<V, P> {
    /// The published child, if any.
    #[inline]
    pub(crate) fn get(&self) -> Option<&Node<V, P>> {
        // SAFETY: a non-null pointer was published with release ordering
        // after the node was fully built, and the slot keeps it alive until
        // the slot itself is dropped.
        unsafe { self.ptr.load(Ordering::Acquire).as_ref() }
    }

    /// Publishes `node` if the slot is still empty.
    ///
    /// On a lost race the unpublished candidate comes back together with
    /// the node that won.
    #[inline]
    #[allow(clippy::type_complexity)]
    pub(crate) fn install(
        &self,
        node: Box<Node<V, P>>,
    ) -> Result<&Node<V, P>, (Box<Node<V, P>>, &Node<V, P>)> {
        let candidate = Box::into_raw(node);
        match self.ptr.compare_exchange(
            ptr::null_mut(),
            candidate,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            // SAFETY: the slot now owns `candidate` for its whole lifetime.
            Ok(_) => Ok(unsafe { &*candidate }),
            // SAFETY: `candidate` was never visible to another thread, so we
            // still own it; `winner` is published and owned by the slot.
            Err(winner) => Err(unsafe { (Box::from_raw(candidate), &*winner) }),
        }
    }

    /// Publishes `node` into a slot the caller has checked is empty while
    /// holding the owning node's install lock.
    #[inline]
    pub(crate) fn store(&self, node: Box<Node<V, P>>) -> &Node<V, P> {
        let raw = Box::into_raw(node);
        let previous = self.ptr.swap(raw, Ordering::AcqRel);
        debug_assert!(previous.is_null(), "child slot published twice");
        // SAFETY: the slot now owns `raw` for its whole lifetime.
        unsafe { &*raw }
    }
}

impl<V, P: Layout<V>> Drop for AtomicChild<V, P> {
    fn drop(&mut self) {
        let raw = *self.ptr.get_mut();
        if !raw.is_null() {
            // SAFETY: the slot is the only owner and `&mut self` rules out
            // any reader.
            drop(unsafe { Box::from_raw(raw) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_once() {
        let slot: AtomicChild<u64, LockFree> = AtomicChild::default();
        assert!(slot.get().is_none());

        let first = slot.install(Box::new(Node::new(4))).ok().unwrap() as *const _;
        let (loser, winner) = match slot.install(Box::new(Node::new(4))) {
            Ok(_) => panic!("second install must fail"),
            Err(pair) => pair,
        };
        assert_eq!(winner as *const _, first);
        assert_ne!(&*loser as *const _, first);
        assert_eq!(slot.get().map(|n| n as *const _), Some(first));
    }

    #[test]
    fn test_census_counts() {
        let census = Census::default();
        census.record_published();
        census.record_published();
        census.record_discarded();
        assert_eq!(census.published(), 2);
        assert_eq!(census.discarded(), 1);
    }
}
