// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Counted back-references from child objects to their owner.

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared state of an object that owns children.
pub(crate) trait Owner {
    fn live_children(&self) -> &AtomicUsize;
}

/// Keeps the owner's shared state alive and counts towards its live children.
pub(crate) struct OwnerRef<O: Owner>(Arc<O>);

impl<O: Owner> OwnerRef<O> {
    pub(crate) fn new(owner: &Arc<O>) -> Self {
        owner.live_children().fetch_add(1, Ordering::AcqRel);
        OwnerRef(owner.clone())
    }
}

impl<O: Owner> Deref for OwnerRef<O> {
    type Target = O;
    fn deref(&self) -> &O {
        &self.0
    }
}

impl<O: Owner> Drop for OwnerRef<O> {
    fn drop(&mut self) {
        self.0.live_children().fetch_sub(1, Ordering::AcqRel);
    }
}

impl<O: Owner> std::fmt::Debug for OwnerRef<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OwnerRef({} live)",
            self.0.live_children().load(Ordering::Relaxed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Parent(AtomicUsize);
    impl Owner for Parent {
        fn live_children(&self) -> &AtomicUsize {
            &self.0
        }
    }

    #[test]
    fn counts_children() {
        let parent = Arc::new(Parent(AtomicUsize::new(0)));
        let a = OwnerRef::new(&parent);
        let b = OwnerRef::new(&parent);
        assert_eq!(parent.0.load(Ordering::Relaxed), 2);
        drop(a);
        assert_eq!(b.live_children().load(Ordering::Relaxed), 1);
        drop(b);
        assert_eq!(parent.0.load(Ordering::Relaxed), 0);
    }
}
