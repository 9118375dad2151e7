//! # Tessera World
//!
//! Chunked voxel storage and light propagation.
//!
//! ## Design Principles
//!
//! 1. **Sparse**: chunks exist only where something was loaded or written
//! 2. **Windowed**: all cell work goes through a bounded [`QueryContext`]
//! 3. **Local**: a light change re-lights only the cells it can reach
//! 4. **Observable**: changes leave through a [`WorldObserver`], never a global
//!
//! ## Core Components
//!
//! - `Cell`, `CellUpdate`: one voxel and its 4-byte wire form
//! - `ObjectTable`: per-type attributes (transparency, activity, models)
//! - `Chunk`: a `12³` cell cube
//! - `ChunkStore`: Y → X → Z sparse index of chunks
//! - `QueryContext`: a loaded window of up to `20³` chunks
//! - `LightEngine`: flood fill plus fixed-point relaxation
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_world::{
//!     CellPos, CellUpdate, ChunkCoord, ChunkStore, EventLog, LightEngine, ObjectProps,
//!     QueryContext, Teardown,
//! };
//!
//! let mut store = ChunkStore::new();
//! store.set_object_type(40, ObjectProps::solid())?;
//!
//! let mut events = EventLog::<()>::new();
//! let mut light = LightEngine::default();
//! let mut ctx = QueryContext::setup(&mut store, &mut events, ChunkCoord::new(0, 0, 0), ChunkCoord::new(2, 2, 2));
//! ctx.load_chunks(true);
//!
//! let center = CellPos::new(18, 18, 18);
//! ctx.set_at(center, CellUpdate::ty(40));
//! light.reflow(&mut ctx, center);
//! ctx.desetup(Teardown::Notify);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod attr;
pub mod cell;
pub mod chunk;
pub mod config;
pub mod coord;
pub mod error;
pub mod events;
pub mod light;
pub mod query;
pub mod shared;
pub mod store;

pub use attr::{ObjectAttr, ObjectProps, ObjectTable, UvRect, MAX_MODEL_DIM, MAX_OBJECT_TYPES};
pub use cell::{Cell, CellUpdate, CELL_WIRE_SIZE, MAX_LIGHT, MAX_TYPE_ID};
pub use chunk::{Chunk, FaceMask, NeighbourCell, CHUNK_CELLS, CHUNK_DATA_SIZE, CHUNK_SIZE, OUTSIDE_CELL};
pub use config::{ObjectTypeConfig, WorldConfig};
pub use coord::{CellPos, ChunkCoord};
pub use error::{WorldError, WorldResult};
pub use events::{ChannelObserver, EventLog, NullObserver, WorldEvent, WorldObserver};
pub use light::{emission, LightConfig, LightEngine, LightNode, ReflowStats, LIGHT_VISITED};
pub use query::{QueryContext, Teardown, MAX_WINDOW_EDGE};
pub use shared::SharedChunkStore;
pub use store::{ChunkHandle, ChunkStore};
