//! # Coordinates
//!
//! Two grids share one integer space:
//!
//! - [`ChunkCoord`] counts chunks
//! - [`CellPos`] counts cells, either world-absolute or relative to a query window
//!
//! Conversions use floor division so negative coordinates land in the right
//! chunk (`-1` is in chunk `-1`, not chunk `0`).

use crate::chunk::CHUNK_SIZE;

const SIZE: i32 = CHUNK_SIZE as i32;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not cells).
    pub x: i32,
    /// Y coordinate (in chunks).
    pub y: i32,
    /// Z coordinate (in chunks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing the given world cell.
    #[inline]
    #[must_use]
    pub const fn from_world_pos(pos: CellPos) -> Self {
        Self {
            x: pos.x.div_euclid(SIZE),
            y: pos.y.div_euclid(SIZE),
            z: pos.z.div_euclid(SIZE),
        }
    }

    /// World position of the chunk's origin (lowest corner cell).
    #[inline]
    #[must_use]
    pub const fn world_origin(self) -> CellPos {
        CellPos::new(self.x * SIZE, self.y * SIZE, self.z * SIZE)
    }

    /// Coordinate shifted by a chunk offset.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// A cell position.
///
/// World-absolute or window-relative depending on where it came from; the
/// query window converts between the two.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl CellPos {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position shifted by an offset.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The six face neighbours: above, below, left, right, front, back.
    #[inline]
    #[must_use]
    pub const fn neighbours(self) -> [Self; 6] {
        [
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(-1, 0, 0),
            self.offset(1, 0, 0),
            self.offset(0, 0, -1),
            self.offset(0, 0, 1),
        ]
    }

    /// Manhattan distance to another position.
    #[inline]
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_world_pos() {
        assert_eq!(ChunkCoord::from_world_pos(CellPos::new(0, 0, 0)), ChunkCoord::new(0, 0, 0));
        assert_eq!(ChunkCoord::from_world_pos(CellPos::new(11, 11, 11)), ChunkCoord::new(0, 0, 0));
        assert_eq!(ChunkCoord::from_world_pos(CellPos::new(12, 24, 36)), ChunkCoord::new(1, 2, 3));
        assert_eq!(ChunkCoord::from_world_pos(CellPos::new(-1, -12, -13)), ChunkCoord::new(-1, -1, -2));
    }

    #[test]
    fn test_world_origin_round_trip() {
        let coord = ChunkCoord::new(-3, 2, 7);
        let origin = coord.world_origin();
        assert_eq!(origin, CellPos::new(-36, 24, 84));
        assert_eq!(ChunkCoord::from_world_pos(origin), coord);
        assert_eq!(ChunkCoord::from_world_pos(origin.offset(11, 11, 11)), coord);
    }

    #[test]
    fn test_neighbours_are_unit_distance() {
        let pos = CellPos::new(4, -2, 9);
        for n in pos.neighbours() {
            assert_eq!(pos.manhattan_distance(n), 1);
        }
    }
}
