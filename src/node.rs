//! Trie nodes.

use core::marker::PhantomData;

use crate::policy::Layout;

/// One trie level: child slots, one item slot and a per-node lock slot.
///
/// All three slot types come from the policy `P`. Branch nodes carry
/// `2^B` child slots; nodes on the final level carry none, since no key
/// descends past them.
pub struct Node<V, P: Layout<V>> {
    children: Box<[P::Child]>,
    item: P::Item,
    lock: P::Lock,
    _value: PhantomData<fn() -> V>,
}

impl<V, P: Layout<V>> Node<V, P> {
    /// A fully built node with `fanout` empty child slots and a default item.
    pub(crate) fn new(fanout: usize) -> Self {
        Self {
            children: core::iter::repeat_with(P::Child::default)
                .take(fanout)
                .collect(),
            item: P::Item::default(),
            lock: P::Lock::default(),
            _value: PhantomData,
        }
    }

    /// Number of child slots.
    #[inline]
    pub fn fanout(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> &P::Child {
        &self.children[index]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut P::Child {
        &mut self.children[index]
    }

    #[inline]
    pub(crate) fn item(&self) -> &P::Item {
        &self.item
    }

    #[inline]
    pub(crate) fn item_mut(&mut self) -> &mut P::Item {
        &mut self.item
    }

    /// Lock guarding child installation (unit for lock-free policies).
    #[inline]
    pub(crate) fn install_lock(&self) -> &P::Lock {
        &self.lock
    }

    /// The published child at `index`, if any.
    #[inline]
    pub(crate) fn child(&self, index: usize) -> Option<&Self> {
        P::child(self.slot(index))
    }

    /// Counts this node and every published descendant.
    pub(crate) fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .filter_map(P::child)
            .map(Node::count)
            .sum::<usize>()
    }
}
