//! # Object Attributes
//!
//! Static per-type descriptors, indexed by the 12-bit type id.
//!
//! The table is written at configuration time and read by everything else.
//! Type 0 is the empty type and is always transparent.

use crate::cell::{Cell, MAX_TYPE_ID};
use crate::error::{WorldError, WorldResult};

/// Size of the type space.
pub const MAX_OBJECT_TYPES: usize = MAX_TYPE_ID as usize + 1;

/// Largest edge length of a voxel model.
pub const MAX_MODEL_DIM: u32 = 4;

/// Texture rectangle `[u0, v0, u1, v1]`.
pub type UvRect = [f32; 4];

/// Descriptor of one object type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectAttr {
    /// Lets light through.
    pub transparent: bool,
    /// Collides with entities.
    pub blocking: bool,
    /// Rendered with a textured face (as opposed to a model).
    pub has_txt: bool,
    /// Backed by an external entity; writes to it are reported.
    pub active: bool,
    /// Texture rectangle.
    pub uv: UvRect,
    /// Rendered as a recursive voxel model.
    pub model: bool,
    /// Model edge length in sub-blocks.
    pub model_dim: u32,
    /// `model_dim³` sub-block type ids, y-major, then z, then x.
    pub model_blocks: Vec<u16>,
}

/// Descriptor returned for ids outside the type space.
static UNKNOWN_ATTR: ObjectAttr = ObjectAttr {
    transparent: false,
    blocking: false,
    has_txt: false,
    active: false,
    uv: [0.0; 4],
    model: false,
    model_dim: 0,
    model_blocks: Vec::new(),
};

impl ObjectAttr {
    /// Sub-block type at a model-local position.
    #[must_use]
    pub fn model_block(&self, x: u32, y: u32, z: u32) -> Option<u16> {
        let dim = self.model_dim;
        if !self.model || x >= dim || y >= dim || z >= dim {
            return None;
        }
        let offs = (x + z * dim + y * dim * dim) as usize;
        self.model_blocks.get(offs).copied()
    }
}

/// The configurable part of an [`ObjectAttr`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObjectProps {
    /// Lets light through.
    pub transparent: bool,
    /// Collides with entities.
    pub blocking: bool,
    /// Has a textured face.
    pub has_txt: bool,
    /// Backed by an external entity.
    pub active: bool,
    /// Texture rectangle.
    pub uv: UvRect,
}

impl ObjectProps {
    /// Opaque, blocking, textured block.
    #[must_use]
    pub const fn solid() -> Self {
        Self {
            transparent: false,
            blocking: true,
            has_txt: true,
            active: false,
            uv: [0.0; 4],
        }
    }

    /// Transparent, non-blocking, untextured (air-like).
    #[must_use]
    pub const fn clear() -> Self {
        Self {
            transparent: true,
            blocking: false,
            has_txt: false,
            active: false,
            uv: [0.0; 4],
        }
    }

    /// Marks the type as backed by an external entity.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the texture rectangle.
    #[must_use]
    pub const fn with_uv(mut self, uv: UvRect) -> Self {
        self.uv = uv;
        self
    }
}

/// Process-wide attribute table.
#[derive(Clone, Debug)]
pub struct ObjectTable {
    attrs: Box<[ObjectAttr]>,
}

impl ObjectTable {
    /// Creates a table where every type is zeroed except type 0 (transparent).
    #[must_use]
    pub fn new() -> Self {
        let mut attrs = vec![ObjectAttr::default(); MAX_OBJECT_TYPES].into_boxed_slice();
        attrs[0].transparent = true;
        Self { attrs }
    }

    /// Descriptor for a type. Ids outside the type space read as a zeroed, opaque type.
    #[inline]
    #[must_use]
    pub fn get(&self, ty: u16) -> &ObjectAttr {
        self.attrs.get(usize::from(ty)).unwrap_or(&UNKNOWN_ATTR)
    }

    /// Returns true if light passes through the cell's type.
    #[inline]
    #[must_use]
    pub fn cell_transparent(&self, cell: &Cell) -> bool {
        self.get(cell.ty).transparent
    }

    /// Returns true if the type is backed by an external entity.
    #[inline]
    #[must_use]
    pub fn is_active(&self, ty: u16) -> bool {
        self.get(ty).active
    }

    fn slot_mut(&mut self, type_id: u32) -> WorldResult<&mut ObjectAttr> {
        let max = u32::from(MAX_TYPE_ID);
        if type_id > max {
            return Err(WorldError::TypeOutOfRange { type_id, max });
        }
        Ok(&mut self.attrs[type_id as usize])
    }

    /// Sets the basic properties of a type.
    ///
    /// # Errors
    ///
    /// Returns error if `type_id` is outside the type space.
    pub fn set_object_type(&mut self, type_id: u32, props: ObjectProps) -> WorldResult<()> {
        let attr = self.slot_mut(type_id)?;
        attr.transparent = props.transparent;
        attr.blocking = props.blocking;
        attr.has_txt = props.has_txt;
        attr.active = props.active;
        attr.uv = props.uv;

        if type_id == 0 && !props.transparent {
            tracing::warn!("type 0 must stay transparent, ignoring opaque configuration");
            attr.transparent = true;
        }
        Ok(())
    }

    /// Attaches a voxel model to a type.
    ///
    /// # Errors
    ///
    /// Returns error if `type_id` is out of range, `dim` is 0 or larger than
    /// [`MAX_MODEL_DIM`], or `blocks` does not hold `dim³` ids.
    pub fn set_object_model(&mut self, type_id: u32, dim: u32, blocks: &[u16]) -> WorldResult<()> {
        let short_id = self.slot_mut(type_id).map(|_| type_id as u16)?;
        if dim == 0 || dim > MAX_MODEL_DIM {
            return Err(WorldError::InvalidModelDim { type_id: short_id, dim, max: MAX_MODEL_DIM });
        }
        let expected = (dim * dim * dim) as usize;
        if blocks.len() != expected {
            return Err(WorldError::ModelSizeMismatch {
                type_id: short_id,
                expected,
                actual: blocks.len(),
            });
        }

        let attr = self.slot_mut(type_id)?;
        attr.model = true;
        attr.model_dim = dim;
        attr.model_blocks = blocks.to_vec();
        Ok(())
    }
}

impl Default for ObjectTable {
    fn default() -> Self {
        Self::new()
    }
}
