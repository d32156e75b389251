//! Root-to-terminal walks, shared by every policy.
//!
//! The walk consumes one branch index per level. The node reached after the
//! last index is the key's terminal node and holds its item. Nodes created
//! for the final level get no child slots.

use crate::key::KeyPath;
use crate::node::Node;
use crate::policy::{Census, Layout, Local, SharedLayout};

#[inline]
fn child_fanout(path: &KeyPath, fanout: usize) -> usize {
    if path.len() == 0 {
        0
    } else {
        fanout
    }
}

/// Walks `path`, creating missing nodes, and returns the terminal node.
pub(crate) fn ensure_path<'a, V, P: SharedLayout<V>>(
    root: &'a Node<V, P>,
    mut path: KeyPath,
    fanout: usize,
    census: &Census,
) -> &'a Node<V, P> {
    let mut node = root;
    while let Some(index) = path.next() {
        node = P::ensure_child(node, index, child_fanout(&path, fanout), census);
    }
    node
}

/// Single-threaded [`ensure_path`]: check-then-create, no synchronization.
pub(crate) fn ensure_path_mut<'a, V: Default>(
    root: &'a mut Node<V, Local>,
    mut path: KeyPath,
    fanout: usize,
    created: &mut usize,
) -> &'a mut Node<V, Local> {
    let mut node = root;
    while let Some(index) = path.next() {
        let child_fanout = child_fanout(&path, fanout);
        node = &mut **node.slot_mut(index).get_or_insert_with(|| {
            *created += 1;
            Box::new(Node::new(child_fanout))
        });
    }
    node
}

/// Walks `path` without creating anything.
///
/// # Safety
/// Every node on the path must already be published, and that publication
/// must happen-before this call (for example, the inserting thread was joined).
#[inline]
pub(crate) unsafe fn assume_path<'a, V, P: Layout<V>>(
    root: &'a Node<V, P>,
    path: KeyPath,
) -> &'a Node<V, P> {
    path.fold(root, |node, index| {
        // SAFETY: upheld by the caller.
        unsafe { node.child(index).unwrap_unchecked() }
    })
}

/// Walks `path` without creating anything, stopping at the first empty slot.
#[inline]
pub(crate) fn find_path<'a, V, P: Layout<V>>(
    root: &'a Node<V, P>,
    mut path: KeyPath,
) -> Option<&'a Node<V, P>> {
    path.try_fold(root, |node, index| node.child(index))
}
