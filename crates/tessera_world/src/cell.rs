//! # Cells
//!
//! The smallest world unit and its 4-byte wire encoding.
//!
//! ## Wire Format
//!
//! ```text
//! byte 0-1  u16 big-endian: high 12 bits type id, low 4 bits light
//! byte 2    meta (opaque, type-specific)
//! byte 3    add  (low nibble tint index, high nibble unused)
//! ```
//!
//! `visible` is derived and never travels over the wire.

/// Bytes per encoded cell.
pub const CELL_WIRE_SIZE: usize = 4;

/// Largest light level a cell can legally hold.
pub const MAX_LIGHT: u8 = 15;

/// Largest encodable type id (12 bits).
pub const MAX_TYPE_ID: u16 = 0x0FFF;

/// A single voxel.
///
/// Cells have no identity of their own; they are addressed by chunk and local
/// offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Object/material type id. 0 is empty.
    pub ty: u16,
    /// Light level 0-15.
    pub light: u8,
    /// Auxiliary byte.
    pub meta: u8,
    /// Tint/color index in the low nibble.
    pub add: u8,
    /// At least one face could be rendered.
    pub visible: bool,
}

impl Cell {
    /// Empty, dark, invisible cell.
    pub const EMPTY: Self = Self {
        ty: 0,
        light: 0,
        meta: 0,
        add: 0,
        visible: false,
    };

    /// Creates a cell of the given type with everything else zeroed.
    #[inline]
    #[must_use]
    pub const fn new(ty: u16) -> Self {
        Self { ty, ..Self::EMPTY }
    }

    /// Returns true if this is the empty type.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ty == 0
    }

    /// Tint index (low nibble of `add`).
    #[inline]
    #[must_use]
    pub const fn tint(&self) -> u8 {
        self.add & 0x0F
    }

    /// Light as a brightness factor in `[0.1, 1.0]`.
    #[must_use]
    pub fn light_factor(&self) -> f32 {
        (f32::from(self.light) / f32::from(MAX_LIGHT)).max(0.1)
    }

    /// Encodes the cell into its 4-byte wire form.
    #[inline]
    #[must_use]
    pub const fn encode(&self) -> [u8; CELL_WIRE_SIZE] {
        let word = ((self.ty & MAX_TYPE_ID) << 4) | (self.light as u16 & 0x000F);
        let [hi, lo] = word.to_be_bytes();
        [hi, lo, self.meta, self.add]
    }

    /// Overwrites type, light, meta and add from the wire form.
    ///
    /// `visible` is left untouched.
    #[inline]
    pub fn decode_into(&mut self, bytes: [u8; CELL_WIRE_SIZE]) {
        let word = u16::from_be_bytes([bytes[0], bytes[1]]);
        self.ty = (word & 0xFFF0) >> 4;
        self.light = (word & 0x000F) as u8;
        self.meta = bytes[2];
        self.add = bytes[3];
    }

    /// Decodes a fresh cell from the wire form.
    #[inline]
    #[must_use]
    pub fn decode(bytes: [u8; CELL_WIRE_SIZE]) -> Self {
        let mut cell = Self::EMPTY;
        cell.decode_into(bytes);
        cell
    }
}

/// A partial cell write. Unset fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellUpdate {
    /// New type.
    pub ty: Option<u16>,
    /// New light level.
    pub light: Option<u8>,
    /// New meta byte.
    pub meta: Option<u8>,
    /// New add byte.
    pub add: Option<u8>,
    /// New visibility.
    pub visible: Option<bool>,
}

impl CellUpdate {
    /// Update that only changes the type.
    #[must_use]
    pub const fn ty(ty: u16) -> Self {
        Self {
            ty: Some(ty),
            light: None,
            meta: None,
            add: None,
            visible: None,
        }
    }

    /// Update that overwrites every field with `cell`'s.
    #[must_use]
    pub const fn all(cell: Cell) -> Self {
        Self {
            ty: Some(cell.ty),
            light: Some(cell.light),
            meta: Some(cell.meta),
            add: Some(cell.add),
            visible: Some(cell.visible),
        }
    }

    /// Sets the light level.
    #[must_use]
    pub const fn with_light(mut self, light: u8) -> Self {
        self.light = Some(light);
        self
    }

    /// Sets the meta byte.
    #[must_use]
    pub const fn with_meta(mut self, meta: u8) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Sets the add byte.
    #[must_use]
    pub const fn with_add(mut self, add: u8) -> Self {
        self.add = Some(add);
        self
    }

    /// Sets visibility.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Writes the set fields into `cell`.
    pub fn apply(&self, cell: &mut Cell) {
        if let Some(ty) = self.ty {
            cell.ty = ty;
        }
        if let Some(light) = self.light {
            cell.light = light;
        }
        if let Some(meta) = self.meta {
            cell.meta = meta;
        }
        if let Some(add) = self.add {
            cell.add = add;
        }
        if let Some(visible) = self.visible {
            cell.visible = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let cell = Cell {
            ty: 0x0ABC,
            light: 7,
            meta: 0x12,
            add: 0x34,
            visible: true,
        };
        assert_eq!(cell.encode(), [0xAB, 0xC7, 0x12, 0x34]);
    }

    #[test]
    fn test_codec_round_trip_edges() {
        for ty in [0u16, 1, 40, 2048, MAX_TYPE_ID] {
            for light in [0u8, 1, 8, MAX_LIGHT] {
                for (meta, add) in [(0u8, 0u8), (255, 15), (17, 0xF3)] {
                    let cell = Cell { ty, light, meta, add, visible: false };
                    let back = Cell::decode(cell.encode());
                    assert_eq!(back.ty, ty);
                    assert_eq!(back.light, light);
                    assert_eq!(back.meta, meta);
                    assert_eq!(back.tint(), add & 0x0F);
                }
            }
        }
    }

    #[test]
    fn test_decode_into_keeps_visibility() {
        let mut cell = Cell { visible: true, ..Cell::EMPTY };
        cell.decode_into(Cell::new(5).encode());
        assert_eq!(cell.ty, 5);
        assert!(cell.visible);
    }

    #[test]
    fn test_partial_update() {
        let mut cell = Cell { ty: 3, light: 9, meta: 1, add: 2, visible: true };
        CellUpdate::ty(7).with_meta(42).apply(&mut cell);
        assert_eq!(cell, Cell { ty: 7, light: 9, meta: 42, add: 2, visible: true });

        CellUpdate::all(Cell::EMPTY).apply(&mut cell);
        assert_eq!(cell, Cell::EMPTY);
    }

    #[test]
    fn test_light_factor_floor() {
        assert!((Cell::EMPTY.light_factor() - 0.1).abs() < f32::EPSILON);
        let lit = Cell { light: 15, ..Cell::EMPTY };
        assert!((lit.light_factor() - 1.0).abs() < f32::EPSILON);
    }
}
