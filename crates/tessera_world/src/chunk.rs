//! # Chunk
//!
//! A fixed `CHUNK_SIZE³` cube of cells plus its grid coordinate and a dirty
//! flag.
//!
//! ## Layout
//!
//! Cells are stored flat, x innermost:
//!
//! ```text
//! offset(x, y, z) = x + y * S + z * S²
//! ```
//!
//! The same order is used for the serialized form: `CHUNK_CELLS` records of
//! [`CELL_WIRE_SIZE`] bytes each.

use bitflags::bitflags;
use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::attr::ObjectTable;
use crate::cell::{Cell, CELL_WIRE_SIZE};
use crate::coord::ChunkCoord;
use crate::error::{WorldError, WorldResult};

/// Chunk edge length in cells.
pub const CHUNK_SIZE: usize = 12;

/// Cells per chunk.
pub const CHUNK_CELLS: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Serialized chunk size in bytes.
pub const CHUNK_DATA_SIZE: usize = CHUNK_CELLS * CELL_WIRE_SIZE;

/// Cell returned for lookups that fall outside the loaded world.
///
/// Empty, dark and visible.
pub static OUTSIDE_CELL: Cell = Cell {
    ty: 0,
    light: 0,
    meta: 0,
    add: 0,
    visible: true,
};

bitflags! {
    /// Set of chunk faces.
    ///
    /// Returned by [`Chunk::set_from_data`] to name the face neighbours whose
    /// view of this chunk changed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FaceMask: u8 {
        /// Neighbour at x - 1.
        const NEG_X = 0x01;
        /// Neighbour at x + 1.
        const POS_X = 0x02;
        /// Neighbour at y - 1.
        const NEG_Y = 0x04;
        /// Neighbour at y + 1.
        const POS_Y = 0x08;
        /// Neighbour at z - 1.
        const NEG_Z = 0x10;
        /// Neighbour at z + 1.
        const POS_Z = 0x20;
    }
}

impl FaceMask {
    /// Faces in neighbour order (−X, +X, −Y, +Y, −Z, +Z) with their chunk offsets.
    pub const FACES: [(Self, [i32; 3]); 6] = [
        (Self::NEG_X, [-1, 0, 0]),
        (Self::POS_X, [1, 0, 0]),
        (Self::NEG_Y, [0, -1, 0]),
        (Self::POS_Y, [0, 1, 0]),
        (Self::NEG_Z, [0, 0, -1]),
        (Self::POS_Z, [0, 0, 1]),
    ];

    /// Chunk coordinates of the neighbours named by this mask.
    pub fn neighbours(self, coord: ChunkCoord) -> impl Iterator<Item = ChunkCoord> {
        Self::FACES
            .into_iter()
            .filter(move |(face, _)| self.contains(*face))
            .map(move |(_, [dx, dy, dz])| coord.offset(dx, dy, dz))
    }

    /// Faces touched by a cell at a local position.
    fn of_local(x: usize, y: usize, z: usize) -> Self {
        let last = CHUNK_SIZE - 1;
        let mut mask = Self::empty();
        mask.set(Self::NEG_X, x == 0);
        mask.set(Self::POS_X, x == last);
        mask.set(Self::NEG_Y, y == 0);
        mask.set(Self::POS_Y, y == last);
        mask.set(Self::NEG_Z, z == 0);
        mask.set(Self::POS_Z, z == last);
        mask
    }
}

/// Result of a neighbour lookup.
///
/// The world-edge case hands out [`OUTSIDE_CELL`] by shared reference only,
/// so nothing can write through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighbourCell<'a> {
    /// Inside the chunk that was asked.
    Local(&'a Cell),
    /// Wrapped into the supplied neighbour chunk.
    Neighbour(&'a Cell),
    /// Out of bounds with no neighbour chunk supplied.
    WorldEdge,
}

impl<'a> NeighbourCell<'a> {
    /// The cell, with the world edge reading as [`OUTSIDE_CELL`].
    #[inline]
    #[must_use]
    pub fn cell(self) -> &'a Cell {
        match self {
            Self::Local(cell) | Self::Neighbour(cell) => cell,
            Self::WorldEdge => &OUTSIDE_CELL,
        }
    }
}

/// Flat offset of an in-bounds local position.
#[inline]
#[must_use]
pub const fn local_offset(x: usize, y: usize, z: usize) -> usize {
    x + y * CHUNK_SIZE + z * CHUNK_SIZE * CHUNK_SIZE
}

/// A chunk of world data.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Chunk position in the world.
    pub coord: ChunkCoord,
    cells: Box<[Cell]>,
    /// Modified since the last query window loaded it.
    pub dirty: bool,
}

impl Chunk {
    /// Creates a zeroed chunk at the given coordinate.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            cells: vec![Cell::EMPTY; CHUNK_CELLS].into_boxed_slice(),
            dirty: false,
        }
    }

    /// All cells in offset order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All cells, mutable. Does not touch the dirty flag.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Cell at a local position.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is `>= CHUNK_SIZE`.
    #[inline]
    #[must_use]
    pub fn cell(&self, x: usize, y: usize, z: usize) -> &Cell {
        assert!(x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE, "local position out of chunk");
        &self.cells[local_offset(x, y, z)]
    }

    /// Mutable cell at a local position. Does not touch the dirty flag.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is `>= CHUNK_SIZE`.
    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Cell {
        assert!(x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE, "local position out of chunk");
        &mut self.cells[local_offset(x, y, z)]
    }

    /// Cell at a possibly out-of-bounds local position.
    ///
    /// In bounds reads this chunk. Out of bounds on any axis wraps the
    /// coordinate into `neighbour`, or reports the world edge if there is none.
    #[must_use]
    pub fn neighbour_cell<'a>(
        &'a self,
        x: i32,
        y: i32,
        z: i32,
        neighbour: Option<&'a Chunk>,
    ) -> NeighbourCell<'a> {
        let size = CHUNK_SIZE as i32;
        let inside = |v: i32| (0..size).contains(&v);
        if inside(x) && inside(y) && inside(z) {
            return NeighbourCell::Local(&self.cells[local_offset(x as usize, y as usize, z as usize)]);
        }
        match neighbour {
            Some(chunk) => {
                let wrap = |v: i32| v.rem_euclid(size) as usize;
                NeighbourCell::Neighbour(&chunk.cells[local_offset(wrap(x), wrap(y), wrap(z))])
            }
            None => NeighbourCell::WorldEdge,
        }
    }

    /// Recomputes every cell's `visible` flag.
    ///
    /// A non-empty cell is visible if any of its six neighbours inside this
    /// same chunk is transparent. Neighbours across the chunk border are not
    /// consulted, so border cells may come out invisible even when exposed;
    /// exact border visibility needs the neighbour chunks. Empty cells are
    /// always invisible.
    pub fn calc_visibility(&mut self, attrs: &ObjectTable) {
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let offs = local_offset(x, y, z);
                    if self.cells[offs].ty == 0 {
                        self.cells[offs].visible = false;
                        continue;
                    }

                    let exposed = [
                        (x + 1 < CHUNK_SIZE).then(|| local_offset(x + 1, y, z)),
                        x.checked_sub(1).map(|nx| local_offset(nx, y, z)),
                        (y + 1 < CHUNK_SIZE).then(|| local_offset(x, y + 1, z)),
                        y.checked_sub(1).map(|ny| local_offset(x, ny, z)),
                        (z + 1 < CHUNK_SIZE).then(|| local_offset(x, y, z + 1)),
                        z.checked_sub(1).map(|nz| local_offset(x, y, nz)),
                    ]
                    .into_iter()
                    .flatten()
                    .any(|n| attrs.cell_transparent(&self.cells[n]));

                    self.cells[offs].visible = exposed;
                }
            }
        }
    }

    /// Overwrites every cell from serialized data.
    ///
    /// Returns the faces whose neighbour chunks must be told, because a border
    /// cell changed type or light. Meta/add changes do not count.
    ///
    /// # Panics
    ///
    /// Panics if `data` is too short to hold a cell it has to decode.
    pub fn set_from_data(&mut self, data: &[u8]) -> FaceMask {
        let mut mask = FaceMask::empty();
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let offs = local_offset(x, y, z);
                    let start = offs * CELL_WIRE_SIZE;
                    assert!(
                        data.len() >= start + CELL_WIRE_SIZE,
                        "chunk data underrun: {} bytes, cell {offs} needs {}",
                        data.len(),
                        start + CELL_WIRE_SIZE
                    );

                    let cell = &mut self.cells[offs];
                    let (old_ty, old_light) = (cell.ty, cell.light);
                    let mut record = [0u8; CELL_WIRE_SIZE];
                    record.copy_from_slice(&data[start..start + CELL_WIRE_SIZE]);
                    cell.decode_into(record);

                    if old_ty != cell.ty || old_light != cell.light {
                        mask |= FaceMask::of_local(x, y, z);
                    }
                }
            }
        }
        self.dirty = true;
        mask
    }

    /// Serializes every cell into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than [`CHUNK_DATA_SIZE`].
    pub fn write_data(&self, out: &mut [u8]) {
        assert!(out.len() >= CHUNK_DATA_SIZE, "chunk output buffer too small: {}", out.len());
        for (record, cell) in out.chunks_exact_mut(CELL_WIRE_SIZE).zip(self.cells.iter()) {
            record.copy_from_slice(&cell.encode());
        }
    }

    /// Serialized form as a fresh buffer.
    #[must_use]
    pub fn to_data(&self) -> Vec<u8> {
        let mut out = vec![0u8; CHUNK_DATA_SIZE];
        self.write_data(&mut out);
        out
    }

    /// LZ4-compressed serialized form.
    #[must_use]
    pub fn to_compressed(&self) -> Vec<u8> {
        compress_prepend_size(&self.to_data())
    }

    /// Decompresses data written by [`to_compressed`](Self::to_compressed).
    ///
    /// # Errors
    ///
    /// Returns error if decompression fails or the size is wrong.
    pub fn decompress(compressed: &[u8]) -> WorldResult<Vec<u8>> {
        let data = decompress_size_prepended(compressed)
            .map_err(|e| WorldError::CorruptChunk(e.to_string()))?;
        if data.len() != CHUNK_DATA_SIZE {
            return Err(WorldError::CorruptChunk(format!(
                "expected {CHUNK_DATA_SIZE} bytes, got {}",
                data.len()
            )));
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::ObjectProps;

    fn table_with_stone() -> ObjectTable {
        let mut table = ObjectTable::new();
        table.set_object_type(1, ObjectProps::solid()).unwrap();
        table
    }

    #[test]
    fn test_offset_order() {
        assert_eq!(local_offset(0, 0, 0), 0);
        assert_eq!(local_offset(1, 0, 0), 1);
        assert_eq!(local_offset(0, 1, 0), CHUNK_SIZE);
        assert_eq!(local_offset(0, 0, 1), CHUNK_SIZE * CHUNK_SIZE);
        assert_eq!(local_offset(11, 11, 11), CHUNK_CELLS - 1);
    }

    #[test]
    fn test_neighbour_cell_variants() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        let mut right = Chunk::new(ChunkCoord::new(1, 0, 0));
        chunk.cell_mut(11, 3, 4).ty = 7;
        right.cell_mut(0, 3, 4).ty = 9;

        assert_eq!(chunk.neighbour_cell(11, 3, 4, None), NeighbourCell::Local(&Cell::new(7)));
        match chunk.neighbour_cell(12, 3, 4, Some(&right)) {
            NeighbourCell::Neighbour(cell) => assert_eq!(cell.ty, 9),
            other => panic!("expected neighbour cell, got {other:?}"),
        }

        let edge = chunk.neighbour_cell(-1, 3, 4, None);
        assert_eq!(edge, NeighbourCell::WorldEdge);
        assert!(edge.cell().visible);
        assert_eq!(edge.cell().ty, 0);
    }

    #[test]
    fn test_visibility_same_chunk_only() {
        let table = table_with_stone();
        let mut chunk = Chunk::new(ChunkCoord::default());
        for cell in chunk.cells.iter_mut() {
            cell.ty = 1;
        }
        // Hollow out one cell in the middle
        chunk.cell_mut(5, 5, 5).ty = 0;
        chunk.calc_visibility(&table);

        assert!(chunk.cell(4, 5, 5).visible, "next to the hole");
        assert!(chunk.cell(5, 6, 5).visible, "above the hole");
        assert!(!chunk.cell(2, 2, 2).visible, "buried cell");
        assert!(!chunk.cell(0, 0, 0).visible, "border cells ignore the outside");
        assert!(!chunk.cell(5, 5, 5).visible, "empty cells are skipped");
    }

    #[test]
    fn test_emptied_cell_loses_visibility() {
        let table = table_with_stone();
        let mut chunk = Chunk::new(ChunkCoord::default());
        chunk.cell_mut(3, 3, 3).ty = 1;
        chunk.calc_visibility(&table);
        assert!(chunk.cell(3, 3, 3).visible);

        chunk.cell_mut(3, 3, 3).ty = 0;
        chunk.calc_visibility(&table);
        assert!(!chunk.cell(3, 3, 3).visible, "empty cell must come out invisible");
    }

    #[test]
    fn test_data_round_trip() {
        let mut chunk = Chunk::new(ChunkCoord::new(1, 2, 3));
        *chunk.cell_mut(3, 4, 5) = Cell { ty: 300, light: 12, meta: 9, add: 4, visible: false };
        *chunk.cell_mut(11, 0, 7) = Cell { ty: 1, light: 0, meta: 0, add: 15, visible: false };

        let data = chunk.to_data();
        assert_eq!(data.len(), CHUNK_DATA_SIZE);

        let mut copy = Chunk::new(ChunkCoord::new(1, 2, 3));
        copy.set_from_data(&data);
        assert_eq!(copy.cells(), chunk.cells());
        assert!(copy.dirty);
    }

    #[test]
    fn test_face_mask_on_border_changes() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        let mut source = Chunk::new(ChunkCoord::default());

        // Interior change only
        source.cell_mut(5, 5, 5).ty = 3;
        assert_eq!(chunk.set_from_data(&source.to_data()), FaceMask::empty());

        // Corner cell light change touches three faces
        source.cell_mut(0, 11, 0).light = 4;
        let mask = chunk.set_from_data(&source.to_data());
        assert_eq!(mask, FaceMask::NEG_X | FaceMask::POS_Y | FaceMask::NEG_Z);

        // Meta/add only changes do not notify
        source.cell_mut(11, 5, 5).meta = 200;
        source.cell_mut(11, 5, 5).add = 3;
        assert_eq!(chunk.set_from_data(&source.to_data()), FaceMask::empty());
    }

    #[test]
    fn test_face_mask_neighbours() {
        let coords: Vec<ChunkCoord> =
            (FaceMask::POS_X | FaceMask::NEG_Z).neighbours(ChunkCoord::new(0, 0, 0)).collect();
        assert_eq!(coords, vec![ChunkCoord::new(1, 0, 0), ChunkCoord::new(0, 0, -1)]);
    }

    #[test]
    #[should_panic(expected = "chunk data underrun")]
    fn test_short_data_panics() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        chunk.set_from_data(&[0u8; CHUNK_DATA_SIZE - 1]);
    }

    #[test]
    fn test_compression_round_trip() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        chunk.cell_mut(1, 1, 1).ty = 42;
        let compressed = chunk.to_compressed();
        assert!(compressed.len() < CHUNK_DATA_SIZE, "empty-ish chunk should compress");

        let data = Chunk::decompress(&compressed).unwrap();
        assert_eq!(data, chunk.to_data());
        assert!(Chunk::decompress(&[1, 2, 3]).is_err());
    }
}
