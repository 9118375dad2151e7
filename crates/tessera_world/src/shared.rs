//! # Shared World
//!
//! A [`ChunkStore`] behind a `parking_lot::RwLock` for callers that share one
//! world between threads (for example parallel chunk loading next to a
//! lighting thread).
//!
//! The store itself is single-threaded. Readers may run concurrently; any
//! write, including every query window, holds the lock exclusively for its
//! whole duration.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::coord::ChunkCoord;
use crate::events::WorldObserver;
use crate::query::QueryContext;
use crate::store::ChunkStore;

/// Reference-counted, lock-protected chunk store.
#[derive(Clone, Debug, Default)]
pub struct SharedChunkStore {
    inner: Arc<RwLock<ChunkStore>>,
}

impl SharedChunkStore {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: ChunkStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, ChunkStore> {
        self.inner.read()
    }

    /// Exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, ChunkStore> {
        self.inner.write()
    }

    /// Runs `f` on a loaded query window over the box `a..=b`.
    ///
    /// The write lock is held until the window is torn down (notify mode, on
    /// drop) and `f` has returned.
    pub fn with_query<O, R>(
        &self,
        observer: &mut O,
        a: ChunkCoord,
        b: ChunkCoord,
        allocate: bool,
        f: impl FnOnce(&mut QueryContext<'_, O>) -> R,
    ) -> R
    where
        O: WorldObserver,
    {
        let mut guard = self.inner.write();
        let mut ctx = QueryContext::setup(&mut guard, observer, a, b);
        ctx.load_chunks(allocate);
        f(&mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellUpdate;
    use crate::coord::CellPos;
    use crate::events::EventLog;
    use std::thread;

    #[test]
    fn test_with_query_notifies_on_drop() {
        let shared = SharedChunkStore::default();
        let mut log = EventLog::<()>::new();
        let written = shared.with_query(&mut log, ChunkCoord::default(), ChunkCoord::default(), true, |ctx| {
            ctx.set_at(CellPos::new(2, 2, 2), CellUpdate::ty(3))
        });

        assert!(written);
        assert_eq!(log.changed_chunks(), vec![ChunkCoord::default()]);
        assert_eq!(shared.read().chunk(ChunkCoord::default()).unwrap().cell(2, 2, 2).ty, 3);
    }

    #[test]
    fn test_concurrent_allocation() {
        let shared = SharedChunkStore::default();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for z in 0..8 {
                        shared.write().chunk_or_insert(ChunkCoord::new(i, 0, z));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.read().chunk_count(), 32);
    }
}
