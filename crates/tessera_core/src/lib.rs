//! # Tessera Core
//!
//! Storage primitives for the voxel world core.
//!
//! ## Architecture Rules
//!
//! 1. **Allocate up front** - queues are sized once, never grow in the hot path
//! 2. **Handles over references** - storage is addressed by index, not borrowed
//! 3. **Invariant violations panic** - overflow is a sizing bug, not an error
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{RingQueue, SparseAxisIndex};
//!
//! let mut axis = SparseAxisIndex::new();
//! axis.add(-4, "chunk");
//!
//! let mut queue = RingQueue::new(1024);
//! queue.enqueue((1, 2, 3));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;
pub mod stats;

pub use memory::{
    AxisNode, QueueCheckpoint, RingQueue, Slab, SlabHandle, SparseAxisIndex,
    AXIS_INITIAL_CAPACITY,
};
pub use stats::Counters;
