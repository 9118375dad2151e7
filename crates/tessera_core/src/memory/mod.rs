//! # Memory
//!
//! Storage primitives used by the world and the light engine.
//!
//! - [`SparseAxisIndex`]: sorted sparse map, nested three deep for the chunk grid
//! - [`RingQueue`]: pre-allocated FIFO with checkpoint/rewind for replaying passes
//! - [`Slab`]: growable slot storage with stable handles

mod axis_index;
mod ring_queue;
mod slab;

pub use axis_index::{AxisNode, SparseAxisIndex, AXIS_INITIAL_CAPACITY};
pub use ring_queue::{QueueCheckpoint, RingQueue};
pub use slab::{Slab, SlabHandle};
