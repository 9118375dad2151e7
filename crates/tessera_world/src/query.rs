//! # Query Context
//!
//! A short-lived window over a box of chunks.
//!
//! Resolving a chunk through the three-level sparse index for every single
//! cell would dominate the cost of lighting and bulk edits. A query window
//! resolves every chunk of its box once, caches the handles, and then maps
//! window-relative cell positions straight to a chunk and an offset.
//!
//! ## Lifecycle
//!
//! ```text
//! setup ──► load_chunks ──► cell_at / cell_at_mut / set_at ... ──► desetup
//! ```
//!
//! The window mutably borrows the store and the observer for its whole life,
//! so only one window per store can exist at a time. Dropping a loaded window
//! tears it down in [`Teardown::Notify`] mode.

use crate::cell::{Cell, CellUpdate};
use crate::chunk::{local_offset, Chunk, CHUNK_SIZE};
use crate::coord::{CellPos, ChunkCoord};
use crate::events::WorldObserver;
use crate::store::{ChunkHandle, ChunkStore};

/// Largest window edge, in chunks.
pub const MAX_WINDOW_EDGE: usize = 20;

const SIZE: i32 = CHUNK_SIZE as i32;

/// How a window reports its chunks when it is torn down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Teardown {
    /// Notify every dirty chunk and clear its dirty flag.
    #[default]
    Notify,
    /// Unload without notifying anyone. Dirty flags are left as they are.
    Discard,
    /// Notify every loaded chunk, dirty or not, and clear dirty flags.
    ForceNotify,
}

/// A loaded window of chunks.
pub struct QueryContext<'w, O: WorldObserver> {
    store: &'w mut ChunkStore,
    observer: &'w mut O,
    start: ChunkCoord,
    end: ChunkCoord,
    dims: [usize; 3],
    chunks: Vec<Option<ChunkHandle>>,
    loaded: bool,
}

impl<'w, O: WorldObserver> QueryContext<'w, O> {
    /// Creates a window spanning the chunk box between two corners (inclusive).
    ///
    /// Corners may be given in any order. Nothing is loaded yet.
    ///
    /// # Panics
    ///
    /// Panics if the box is larger than [`MAX_WINDOW_EDGE`] chunks on any axis.
    pub fn setup(store: &'w mut ChunkStore, observer: &'w mut O, a: ChunkCoord, b: ChunkCoord) -> Self {
        let start = ChunkCoord::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let end = ChunkCoord::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
        let dims = [
            (end.x - start.x) as usize + 1,
            (end.y - start.y) as usize + 1,
            (end.z - start.z) as usize + 1,
        ];
        assert!(
            dims.iter().all(|&d| d <= MAX_WINDOW_EDGE),
            "query window {dims:?} exceeds {MAX_WINDOW_EDGE} chunks per axis"
        );

        Self {
            store,
            observer,
            start,
            end,
            dims,
            chunks: vec![None; dims[0] * dims[1] * dims[2]],
            loaded: false,
        }
    }

    /// Lowest chunk corner of the window.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> ChunkCoord {
        self.start
    }

    /// Highest chunk corner of the window (inclusive).
    #[inline]
    #[must_use]
    pub const fn end(&self) -> ChunkCoord {
        self.end
    }

    /// Window size in chunks per axis.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Window size in cells per axis.
    #[inline]
    #[must_use]
    pub fn cell_extent(&self) -> [i32; 3] {
        self.dims.map(|d| d as i32 * SIZE)
    }

    /// Returns true between [`load_chunks`](Self::load_chunks) and teardown.
    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The underlying store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ChunkStore {
        &*self.store
    }

    fn window_index(&self, cx: usize, cy: usize, cz: usize) -> usize {
        cx + cy * self.dims[0] + cz * self.dims[0] * self.dims[1]
    }

    fn window_coords(&self) -> impl Iterator<Item = ChunkCoord> {
        let (start, end) = (self.start, self.end);
        (start.z..=end.z).flat_map(move |z| {
            (start.y..=end.y).flat_map(move |y| (start.x..=end.x).map(move |x| ChunkCoord::new(x, y, z)))
        })
    }

    /// Chunks of the window that do not exist in the store yet.
    #[must_use]
    pub fn unallocated_chunks(&self) -> Vec<ChunkCoord> {
        self.window_coords().filter(|&coord| self.store.handle(coord).is_none()).collect()
    }

    /// Resolves every chunk of the window, allocating missing ones if asked.
    ///
    /// Each loaded chunk starts with a clean dirty flag. Without `allocate`,
    /// missing chunks stay holes and cells inside them read as absent.
    pub fn load_chunks(&mut self, allocate: bool) {
        let mut loaded = 0usize;
        let coords: Vec<ChunkCoord> = self.window_coords().collect();
        for coord in coords {
            let handle = self.store.chunk_handle(coord, allocate);
            if let Some(chunk) = handle.and_then(|h| self.store.chunk_by_handle_mut(h)) {
                chunk.dirty = false;
                loaded += 1;
            }

            let idx = self.window_index(
                (coord.x - self.start.x) as usize,
                (coord.y - self.start.y) as usize,
                (coord.z - self.start.z) as usize,
            );
            self.chunks[idx] = handle;
        }
        self.loaded = true;

        tracing::debug!(
            start = ?self.start,
            end = ?self.end,
            loaded,
            holes = self.chunks.len() - loaded,
            "query window loaded"
        );
    }

    /// Converts a window-relative position to a world position.
    #[inline]
    #[must_use]
    pub const fn rel2abs(&self, rel: CellPos) -> CellPos {
        let origin = self.start.world_origin();
        CellPos::new(origin.x + rel.x, origin.y + rel.y, origin.z + rel.z)
    }

    /// Converts a world position to a window-relative position.
    #[inline]
    #[must_use]
    pub const fn abs2rel(&self, abs: CellPos) -> CellPos {
        let origin = self.start.world_origin();
        CellPos::new(abs.x - origin.x, abs.y - origin.y, abs.z - origin.z)
    }

    /// Chunk handle and local offset for a relative position.
    fn locate(&self, rel: CellPos) -> Option<(ChunkHandle, usize)> {
        assert!(self.loaded, "query window accessed before load_chunks");
        if rel.x < 0 || rel.y < 0 || rel.z < 0 {
            return None;
        }
        let (x, y, z) = (rel.x as usize, rel.y as usize, rel.z as usize);
        let (cx, cy, cz) = (x / CHUNK_SIZE, y / CHUNK_SIZE, z / CHUNK_SIZE);
        if cx >= self.dims[0] || cy >= self.dims[1] || cz >= self.dims[2] {
            return None;
        }

        let handle = self.chunks[self.window_index(cx, cy, cz)]?;
        let offs = local_offset(x % CHUNK_SIZE, y % CHUNK_SIZE, z % CHUNK_SIZE);
        Some((handle, offs))
    }

    /// Cell at a window-relative position.
    ///
    /// `None` for negative positions, positions past the window, and holes
    /// left by a non-allocating load.
    ///
    /// # Panics
    ///
    /// Panics if the window is not loaded.
    #[must_use]
    pub fn cell_at(&self, rel: CellPos) -> Option<&Cell> {
        let (handle, offs) = self.locate(rel)?;
        self.store.chunk_by_handle(handle).map(|chunk| &chunk.cells()[offs])
    }

    /// Mutable cell at a window-relative position. Marks its chunk dirty.
    ///
    /// # Panics
    ///
    /// Panics if the window is not loaded.
    pub fn cell_at_mut(&mut self, rel: CellPos) -> Option<&mut Cell> {
        let (handle, offs) = self.locate(rel)?;
        let chunk: &mut Chunk = self.store.chunk_by_handle_mut(handle)?;
        chunk.dirty = true;
        Some(&mut chunk.cells_mut()[offs])
    }

    /// Returns true if the cell at `rel` exists and lets light through.
    #[must_use]
    pub fn transparent_at(&self, rel: CellPos) -> bool {
        self.cell_at(rel).is_some_and(|cell| self.store.cell_transparent(cell))
    }

    /// Writes the set fields of `update` into the cell at `rel`.
    ///
    /// Returns false if there is no cell there. Writes touching an active type
    /// (before or after) notify the observer without a payload.
    ///
    /// # Panics
    ///
    /// Panics if the window is not loaded.
    pub fn set_at(&mut self, rel: CellPos, update: CellUpdate) -> bool {
        self.set_at_with(rel, update, None)
    }

    /// Like [`set_at`](Self::set_at), passing `payload` through to the
    /// active-cell notification.
    ///
    /// # Panics
    ///
    /// Panics if the window is not loaded.
    pub fn set_at_with(&mut self, rel: CellPos, update: CellUpdate, payload: Option<&O::Payload>) -> bool {
        let Some(cell) = self.cell_at_mut(rel) else {
            return false;
        };
        let old_ty = cell.ty;
        update.apply(cell);
        let new_ty = cell.ty;

        if self.store.is_active(old_ty) || self.store.is_active(new_ty) {
            let abs = self.rel2abs(rel);
            self.observer.on_active_cell_changed(abs, new_ty, payload);
            self.store.counters_mut().active_cell_changes += 1;
        }
        true
    }

    /// Recomputes visibility of every loaded chunk (same-chunk approximation).
    pub fn calc_visibility(&mut self) {
        for coord in self.window_coords().collect::<Vec<_>>() {
            self.store.chunk_calc_visibility(coord);
        }
    }

    /// Tears the window down and returns how many loaded chunks were dirty.
    pub fn desetup(mut self, mode: Teardown) -> usize {
        self.teardown(mode)
    }

    fn teardown(&mut self, mode: Teardown) -> usize {
        if !self.loaded {
            return 0;
        }

        let mut dirty_count = 0usize;
        let mut notified = 0u64;
        for handle in self.chunks.iter().flatten() {
            let Some(chunk) = self.store.chunk_by_handle_mut(*handle) else {
                continue;
            };
            let dirty = chunk.dirty;
            if dirty {
                dirty_count += 1;
            }

            let notify = match mode {
                Teardown::Notify => dirty,
                Teardown::Discard => false,
                Teardown::ForceNotify => true,
            };
            if notify {
                chunk.dirty = false;
                let coord = chunk.coord;
                self.observer.on_chunk_changed(coord);
                notified += 1;
            }
        }

        self.store.counters_mut().chunk_changes += notified;
        self.loaded = false;
        tracing::debug!(?mode, dirty = dirty_count, notified, "query window torn down");
        dirty_count
    }
}

impl<O: WorldObserver> Drop for QueryContext<'_, O> {
    fn drop(&mut self) {
        if self.loaded {
            self.teardown(Teardown::Notify);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::ObjectProps;
    use crate::events::{EventLog, NullObserver, WorldEvent};

    #[test]
    fn test_setup_normalizes_corners() {
        let mut store = ChunkStore::new();
        let mut observer = NullObserver;
        let ctx = QueryContext::setup(
            &mut store,
            &mut observer,
            ChunkCoord::new(2, -1, 5),
            ChunkCoord::new(0, 1, 5),
        );
        assert_eq!(ctx.start(), ChunkCoord::new(0, -1, 5));
        assert_eq!(ctx.end(), ChunkCoord::new(2, 1, 5));
        assert_eq!(ctx.dims(), [3, 3, 1]);
        assert_eq!(ctx.cell_extent(), [36, 36, 12]);
        assert!(!ctx.is_loaded());
    }

    #[test]
    #[should_panic(expected = "exceeds 20 chunks")]
    fn test_oversized_window_panics() {
        let mut store = ChunkStore::new();
        let mut observer = NullObserver;
        let _ = QueryContext::setup(&mut store, &mut observer, ChunkCoord::new(0, 0, 0), ChunkCoord::new(20, 0, 0));
    }

    #[test]
    #[should_panic(expected = "before load_chunks")]
    fn test_access_before_load_panics() {
        let mut store = ChunkStore::new();
        let mut observer = NullObserver;
        let ctx = QueryContext::setup(&mut store, &mut observer, ChunkCoord::default(), ChunkCoord::default());
        let _ = ctx.cell_at(CellPos::default());
    }

    #[test]
    fn test_unallocated_and_holes() {
        let mut store = ChunkStore::new();
        store.chunk_or_insert(ChunkCoord::new(0, 0, 0));
        let mut observer = NullObserver;
        let mut ctx = QueryContext::setup(&mut store, &mut observer, ChunkCoord::new(0, 0, 0), ChunkCoord::new(1, 0, 0));
        assert_eq!(ctx.unallocated_chunks(), vec![ChunkCoord::new(1, 0, 0)]);

        ctx.load_chunks(false);
        assert!(ctx.cell_at(CellPos::new(11, 0, 0)).is_some());
        assert!(ctx.cell_at(CellPos::new(12, 0, 0)).is_none(), "hole");
        assert!(ctx.cell_at(CellPos::new(-1, 0, 0)).is_none());
        assert!(ctx.cell_at(CellPos::new(0, 12, 0)).is_none(), "past the window");
        ctx.desetup(Teardown::Discard);
        assert_eq!(store.chunk_count(), 1);
    }

    #[test]
    fn test_coordinate_conversion() {
        let mut store = ChunkStore::new();
        let mut observer = NullObserver;
        let ctx = QueryContext::setup(&mut store, &mut observer, ChunkCoord::new(-1, 2, 0), ChunkCoord::new(0, 2, 0));
        let rel = CellPos::new(3, 4, 5);
        let abs = ctx.rel2abs(rel);
        assert_eq!(abs, CellPos::new(-9, 28, 5));
        assert_eq!(ctx.abs2rel(abs), rel);
    }

    #[test]
    fn test_teardown_modes() {
        let mut store = ChunkStore::new();
        let (a, b) = (ChunkCoord::new(0, 0, 0), ChunkCoord::new(1, 0, 0));

        let mut log = EventLog::<()>::new();
        let mut ctx = QueryContext::setup(&mut store, &mut log, a, b);
        ctx.load_chunks(true);
        ctx.cell_at_mut(CellPos::new(13, 0, 0)).unwrap().ty = 2;
        assert_eq!(ctx.desetup(Teardown::Notify), 1);
        assert_eq!(log.changed_chunks(), vec![b]);

        let mut log = EventLog::<()>::new();
        let mut ctx = QueryContext::setup(&mut store, &mut log, a, b);
        ctx.load_chunks(true);
        ctx.cell_at_mut(CellPos::new(0, 0, 0)).unwrap().ty = 2;
        assert_eq!(ctx.desetup(Teardown::Discard), 1);
        assert!(log.events.is_empty());

        let mut log = EventLog::<()>::new();
        let mut ctx = QueryContext::setup(&mut store, &mut log, a, b);
        ctx.load_chunks(true);
        assert_eq!(ctx.desetup(Teardown::ForceNotify), 0, "load clears dirty flags");
        assert_eq!(log.changed_chunks(), vec![a, b]);
        assert_eq!(store.counters().chunk_changes, 3);
    }

    #[test]
    fn test_drop_notifies_dirty_chunks() {
        let mut store = ChunkStore::new();
        let mut log = EventLog::<()>::new();
        {
            let mut ctx = QueryContext::setup(&mut store, &mut log, ChunkCoord::default(), ChunkCoord::default());
            ctx.load_chunks(true);
            ctx.set_at(CellPos::new(1, 1, 1), CellUpdate::ty(5));
        }
        assert_eq!(log.changed_chunks(), vec![ChunkCoord::default()]);
    }

    #[test]
    fn test_set_at_notifies_active_types() {
        let mut store = ChunkStore::new();
        store.set_object_type(40, ObjectProps::solid().with_active(true)).unwrap();
        store.set_object_type(2, ObjectProps::solid()).unwrap();

        let mut log = EventLog::<String>::new();
        let mut ctx = QueryContext::setup(&mut store, &mut log, ChunkCoord::new(1, 0, 0), ChunkCoord::new(1, 0, 0));
        ctx.load_chunks(true);

        assert!(ctx.set_at(CellPos::new(0, 0, 0), CellUpdate::ty(2)));
        let payload = String::from("entity-7");
        assert!(ctx.set_at_with(CellPos::new(1, 0, 0), CellUpdate::ty(40), Some(&payload)));
        // Replacing an active type also notifies
        assert!(ctx.set_at(CellPos::new(1, 0, 0), CellUpdate::ty(0).with_light(3)));
        assert!(!ctx.set_at(CellPos::new(-1, 0, 0), CellUpdate::ty(40)));
        assert_eq!(ctx.cell_at(CellPos::new(1, 0, 0)).unwrap().light, 3);
        assert!(!ctx.transparent_at(CellPos::new(0, 0, 0)), "type 2 is solid");
        assert!(ctx.transparent_at(CellPos::new(1, 0, 0)), "emptied again");
        assert!(!ctx.transparent_at(CellPos::new(-1, 0, 0)), "outside the window");
        ctx.desetup(Teardown::Discard);

        let active: Vec<_> = log
            .events
            .iter()
            .filter_map(|e| match e {
                WorldEvent::ActiveCellChanged { pos, new_type, payload } => Some((*pos, *new_type, payload.clone())),
                WorldEvent::ChunkChanged(_) => None,
            })
            .collect();
        assert_eq!(
            active,
            vec![
                (CellPos::new(13, 0, 0), 40, Some(payload)),
                (CellPos::new(13, 0, 0), 0, None),
            ]
        );
        assert_eq!(store.counters().active_cell_changes, 2);
    }
}
