//! Single-threaded policy: plain owning slots, mutation through `&mut`.

use super::{sealed::Sealed, Layout};
use crate::node::Node;

/// No synchronization. Exclusive borrows take the place of atomics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Local;

impl Sealed for Local {}

impl<V: Default> Layout<V> for Local {
    type Child = Option<Box<Node<V, Self>>>;
    type Item = V;
    type Lock = ();

    #[inline]
    fn child(slot: &Self::Child) -> Option<&Node<V, Self>> {
        slot.as_deref()
    }
}
