//! # Chunk Store
//!
//! Owns every chunk of one world plus the object attribute table.
//!
//! ## Index Layout
//!
//! ```text
//! Y axis ──► X axis ──► Z axis ──► ChunkHandle ──► Slab<Chunk>
//! ```
//!
//! Each level is a [`SparseAxisIndex`], so empty regions of the grid cost
//! nothing. Intermediate axes are created on the first allocating lookup that
//! needs them and pruned again when their last chunk is purged.

use tessera_core::{Counters, Slab, SlabHandle, SparseAxisIndex};

use crate::attr::{ObjectAttr, ObjectProps, ObjectTable};
use crate::cell::Cell;
use crate::chunk::{Chunk, FaceMask};
use crate::coord::{CellPos, ChunkCoord};
use crate::error::WorldResult;

/// Stable reference to a chunk inside a [`ChunkStore`].
pub type ChunkHandle = SlabHandle;

type ZAxis = SparseAxisIndex<ChunkHandle>;
type XAxis = SparseAxisIndex<ZAxis>;

/// Sparse chunk storage for one world.
#[derive(Debug, Default)]
pub struct ChunkStore {
    index: SparseAxisIndex<XAxis>,
    chunks: Slab<Chunk>,
    attrs: ObjectTable,
    counters: Counters,
}

impl ChunkStore {
    /// Creates an empty world with a default attribute table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty world with the given attribute table.
    #[must_use]
    pub fn with_attrs(attrs: ObjectTable) -> Self {
        Self {
            attrs,
            ..Self::default()
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// The attribute table.
    #[inline]
    #[must_use]
    pub fn attrs(&self) -> &ObjectTable {
        &self.attrs
    }

    /// Descriptor of a type.
    #[inline]
    #[must_use]
    pub fn attr(&self, ty: u16) -> &ObjectAttr {
        self.attrs.get(ty)
    }

    /// Configures the basic properties of a type.
    ///
    /// # Errors
    ///
    /// Returns error if `type_id` is outside the type space.
    pub fn set_object_type(&mut self, type_id: u32, props: ObjectProps) -> WorldResult<()> {
        self.attrs.set_object_type(type_id, props)
    }

    /// Attaches a voxel model to a type.
    ///
    /// # Errors
    ///
    /// See [`ObjectTable::set_object_model`].
    pub fn set_object_model(&mut self, type_id: u32, dim: u32, blocks: &[u16]) -> WorldResult<()> {
        self.attrs.set_object_model(type_id, dim, blocks)
    }

    /// Returns true if light passes through the cell.
    #[inline]
    #[must_use]
    pub fn cell_transparent(&self, cell: &Cell) -> bool {
        self.attrs.cell_transparent(cell)
    }

    /// Returns true if the type is backed by an external entity.
    #[inline]
    #[must_use]
    pub fn is_active(&self, ty: u16) -> bool {
        self.attrs.is_active(ty)
    }

    // =========================================================================
    // Chunk lookup
    // =========================================================================

    /// Number of live chunks.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Running counters.
    #[inline]
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Mutable counters.
    #[inline]
    pub fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    /// Handle of the chunk at `coord`, if one exists.
    #[must_use]
    pub fn handle(&self, coord: ChunkCoord) -> Option<ChunkHandle> {
        self.index
            .get(coord.y)
            .and_then(|x_axis| x_axis.get(coord.x))
            .and_then(|z_axis| z_axis.get(coord.z))
            .copied()
    }

    /// Handle of the chunk at `coord`, allocating a zeroed chunk (and any
    /// missing intermediate axes) when `allocate` is set.
    pub fn chunk_handle(&mut self, coord: ChunkCoord, allocate: bool) -> Option<ChunkHandle> {
        if !allocate {
            return self.handle(coord);
        }
        Some(self.chunk_or_insert(coord))
    }

    /// Handle of the chunk at `coord`, allocating it if absent.
    pub fn chunk_or_insert(&mut self, coord: ChunkCoord) -> ChunkHandle {
        if let Some(handle) = self.handle(coord) {
            return handle;
        }

        let counters = &mut self.counters;
        let x_axis = self.index.get_or_insert_with(coord.y, || {
            counters.allocated_axes += 1;
            XAxis::new()
        });
        let z_axis = x_axis.get_or_insert_with(coord.x, || {
            counters.allocated_axes += 1;
            ZAxis::new()
        });

        let handle = self.chunks.insert(Chunk::new(coord));
        z_axis.add(coord.z, handle);
        self.counters.allocated_chunks += 1;

        tracing::debug!(x = coord.x, y = coord.y, z = coord.z, "allocated chunk");
        handle
    }

    /// Chunk at `coord`, if one exists.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.handle(coord).and_then(|h| self.chunks.get(h))
    }

    /// Mutable chunk at `coord`, if one exists.
    pub fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        let handle = self.handle(coord)?;
        self.chunks.get_mut(handle)
    }

    /// Chunk containing a world cell position.
    #[must_use]
    pub fn chunk_at_world(&self, pos: CellPos) -> Option<&Chunk> {
        self.chunk(ChunkCoord::from_world_pos(pos))
    }

    /// Chunk by handle.
    #[inline]
    #[must_use]
    pub fn chunk_by_handle(&self, handle: ChunkHandle) -> Option<&Chunk> {
        self.chunks.get(handle)
    }

    /// Mutable chunk by handle.
    #[inline]
    pub fn chunk_by_handle_mut(&mut self, handle: ChunkHandle) -> Option<&mut Chunk> {
        self.chunks.get_mut(handle)
    }

    /// The six face neighbours of a chunk, ordered −X, +X, −Y, +Y, −Z, +Z.
    #[must_use]
    pub fn neighbour_chunks(&self, coord: ChunkCoord) -> [Option<&Chunk>; 6] {
        FaceMask::FACES.map(|(_, [dx, dy, dz])| self.chunk(coord.offset(dx, dy, dz)))
    }

    /// Iterates over every live chunk in storage order.
    pub fn iter_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter().map(|(_, chunk)| chunk)
    }

    /// Removes and drops the chunk at `coord`.
    ///
    /// Returns true if a chunk was removed. Axes left empty are pruned.
    pub fn purge_chunk(&mut self, coord: ChunkCoord) -> bool {
        let Some(x_axis) = self.index.get_mut(coord.y) else {
            return false;
        };
        let Some(z_axis) = x_axis.get_mut(coord.x) else {
            return false;
        };
        let Some(handle) = z_axis.remove(coord.z) else {
            return false;
        };

        if z_axis.is_empty() {
            x_axis.remove(coord.x);
            self.counters.allocated_axes -= 1;
        }
        if x_axis.is_empty() {
            self.index.remove(coord.y);
            self.counters.allocated_axes -= 1;
        }

        self.chunks.remove(handle);
        self.counters.allocated_chunks -= 1;
        tracing::debug!(x = coord.x, y = coord.y, z = coord.z, "purged chunk");
        true
    }

    // =========================================================================
    // Bulk operations
    // =========================================================================

    /// Recomputes visibility for the chunk at `coord`.
    ///
    /// Same-chunk approximation, see [`Chunk::calc_visibility`]. Returns false
    /// if there is no chunk there.
    pub fn chunk_calc_visibility(&mut self, coord: ChunkCoord) -> bool {
        let Some(handle) = self.handle(coord) else {
            return false;
        };
        match self.chunks.get_mut(handle) {
            Some(chunk) => {
                chunk.calc_visibility(&self.attrs);
                true
            }
            None => false,
        }
    }

    /// Loads serialized cells into the chunk at `coord`, allocating it if needed.
    ///
    /// Returns the faces whose neighbour chunks need a change notification.
    ///
    /// # Panics
    ///
    /// Panics if `data` is too short for a cell it has to decode.
    pub fn set_chunk_from_data(&mut self, coord: ChunkCoord, data: &[u8]) -> FaceMask {
        let handle = self.chunk_or_insert(coord);
        match self.chunks.get_mut(handle) {
            Some(chunk) => chunk.set_from_data(data),
            None => FaceMask::empty(),
        }
    }

    /// Serialized cells of the chunk at `coord`.
    #[must_use]
    pub fn chunk_data(&self, coord: ChunkCoord) -> Option<Vec<u8>> {
        self.chunk(coord).map(Chunk::to_data)
    }

    /// Loads LZ4-compressed serialized cells into the chunk at `coord`.
    ///
    /// # Errors
    ///
    /// Returns error if the data does not decompress to one chunk.
    pub fn load_compressed(&mut self, coord: ChunkCoord, compressed: &[u8]) -> WorldResult<FaceMask> {
        let data = Chunk::decompress(compressed)?;
        Ok(self.set_chunk_from_data(coord, &data))
    }
}
