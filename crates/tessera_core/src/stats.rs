//! # Profiling Counters
//!
//! Cheap running totals the world keeps about itself. Read them for debug
//! overlays or tests; nothing in the core makes decisions based on them.

/// Running totals for one world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Chunk-changed notifications emitted by query teardown.
    pub chunk_changes: u64,
    /// Active-cell notifications emitted by cell writes.
    pub active_cell_changes: u64,
    /// Live intermediate axis indices (X and Z levels; the root Y index is not counted).
    pub allocated_axes: u64,
    /// Live chunks.
    pub allocated_chunks: u64,
}

impl Counters {
    /// Resets the event totals. Allocation gauges are left alone.
    pub fn reset_events(&mut self) {
        self.chunk_changes = 0;
        self.active_cell_changes = 0;
    }
}
