//! # Volume Canvas
//!
//! Four `size³` density buffers and a small drawing state machine.
//!
//! Every write funnels through [`VolumeCanvas::draw_op`], which:
//!
//! 1. drops the write if the destination or source value is outside its range
//! 2. blends the incoming value with the source value
//! 3. applies the current [`DrawOp`] to the destination
//!
//! Coordinates outside the canvas are ignored, so generators may overshoot.
//!
//! ## Buffer Layout
//!
//! ```text
//! index(x, y, z) = x + y * size + z * size²
//! ```

use crate::error::{VolumeError, VolumeResult};
use crate::noise::NoiseLattice;

/// Number of buffers on a canvas.
pub const BUFFER_COUNT: usize = 4;

/// Largest canvas edge length.
pub const MAX_CANVAS_SIZE: usize = 512;

/// How a drawn value combines with the destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawOp {
    /// `dst += v`
    Add,
    /// `dst = max(dst - v, 0)`
    Sub,
    /// `dst *= v`
    Mul,
    /// `dst = v`
    #[default]
    Set,
}

impl DrawOp {
    #[inline]
    fn apply(self, dst: &mut f64, val: f64) {
        match self {
            Self::Add => *dst += val,
            Self::Sub => *dst = (*dst - val).max(0.0),
            Self::Mul => *dst *= val,
            Self::Set => *dst = val,
        }
    }
}

/// Inclusive value range gating writes.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Range {
    lo: f64,
    hi: f64,
}

impl Range {
    const UNIT: Self = Self { lo: 0.0, hi: 1.0 };

    fn new(a: f64, b: f64) -> Self {
        Self { lo: a.min(b), hi: a.max(b) }
    }

    #[inline]
    fn contains(self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }
}

/// A procedural drawing surface.
#[derive(Clone, Debug)]
pub struct VolumeCanvas {
    size: usize,
    buffers: [Vec<f64>; BUFFER_COUNT],
    op: DrawOp,
    src: usize,
    dst: usize,
    src_range: Range,
    dst_range: Range,
    src_blend: f64,
}

impl VolumeCanvas {
    /// Creates a zeroed canvas with default drawing state.
    ///
    /// # Errors
    ///
    /// Returns error if `size` is 0 or larger than [`MAX_CANVAS_SIZE`].
    pub fn new(size: usize) -> VolumeResult<Self> {
        let mut canvas = Self {
            size: 0,
            buffers: Default::default(),
            op: DrawOp::Set,
            src: 0,
            dst: 1,
            src_range: Range::UNIT,
            dst_range: Range::UNIT,
            src_blend: 1.0,
        };
        canvas.alloc(size)?;
        Ok(canvas)
    }

    /// Reallocates all buffers zeroed and resets the drawing state.
    ///
    /// Resets op to `Set`, both ranges to `[0, 1]`, blend to 1, source to
    /// buffer 0 and destination to buffer 1.
    ///
    /// # Errors
    ///
    /// Returns error if `size` is 0 or larger than [`MAX_CANVAS_SIZE`].
    pub fn alloc(&mut self, size: usize) -> VolumeResult<()> {
        if size == 0 {
            return Err(VolumeError::ZeroSize);
        }
        if size > MAX_CANVAS_SIZE {
            return Err(VolumeError::TooLarge { size, max: MAX_CANVAS_SIZE });
        }

        let cells = size * size * size;
        for buffer in &mut self.buffers {
            buffer.clear();
            buffer.resize(cells, 0.0);
        }
        self.size = size;
        self.op = DrawOp::Set;
        self.src = 0;
        self.dst = 1;
        self.src_range = Range::UNIT;
        self.dst_range = Range::UNIT;
        self.src_blend = 1.0;

        tracing::debug!(size, "volume canvas allocated");
        Ok(())
    }

    /// Edge length.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Current draw operator.
    #[inline]
    #[must_use]
    pub const fn op(&self) -> DrawOp {
        self.op
    }

    /// Sets the draw operator.
    pub fn set_op(&mut self, op: DrawOp) {
        self.op = op;
    }

    /// Source buffer index.
    #[inline]
    #[must_use]
    pub const fn src(&self) -> usize {
        self.src
    }

    /// Destination buffer index.
    #[inline]
    #[must_use]
    pub const fn dst(&self) -> usize {
        self.dst
    }

    /// Selects the source buffer, clamped to `0..=3`.
    pub fn set_src(&mut self, index: i32) {
        self.src = clamp_index(index);
    }

    /// Selects the destination buffer, clamped to `0..=3`.
    pub fn set_dst(&mut self, index: i32) {
        self.dst = clamp_index(index);
    }

    /// Exchanges the source and destination buffer indices.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.src, &mut self.dst);
    }

    /// Only draw where the destination value lies in `[a, b]`.
    pub fn set_dst_range(&mut self, a: f64, b: f64) {
        self.dst_range = Range::new(a, b);
    }

    /// Only draw where the source value lies in `[a, b]`.
    pub fn set_src_range(&mut self, a: f64, b: f64) {
        self.src_range = Range::new(a, b);
    }

    /// Sets the source blend factor, clamped to `[-1, 1]`.
    ///
    /// `1` draws the value as given, `0` draws the source value, negative
    /// factors invert the value (`1 - v`) before blending.
    pub fn set_src_blend(&mut self, r: f64) {
        self.src_blend = r.clamp(-1.0, 1.0);
    }

    /// Buffer index of a position, if inside the canvas.
    #[inline]
    #[must_use]
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let size = self.size as i64;
        let (x, y, z) = (i64::from(x), i64::from(y), i64::from(z));
        if x < 0 || y < 0 || z < 0 || x >= size || y >= size || z >= size {
            return None;
        }
        Some((x + y * size + z * size * size) as usize)
    }

    /// Destination value at a position.
    #[must_use]
    pub fn value(&self, x: i32, y: i32, z: i32) -> Option<f64> {
        self.index(x, y, z).map(|i| self.buffers[self.dst][i])
    }

    /// Source value at a position.
    #[must_use]
    pub fn src_value(&self, x: i32, y: i32, z: i32) -> Option<f64> {
        self.index(x, y, z).map(|i| self.buffers[self.src][i])
    }

    /// Draws one value at a position.
    ///
    /// No-op outside the canvas or when a range gate rejects the cell.
    #[inline]
    pub fn draw_op(&mut self, x: i32, y: i32, z: i32, val: f64) {
        let Some(i) = self.index(x, y, z) else {
            return;
        };
        let src = self.buffers[self.src][i];
        let dst = self.buffers[self.dst][i];
        if !self.dst_range.contains(dst) || !self.src_range.contains(src) {
            return;
        }

        let r = self.src_blend;
        let val = if r < 0.0 { 1.0 - val } else { val };
        let weight = r.abs();
        let blended = val * weight + src * (1.0 - weight);

        self.op.apply(&mut self.buffers[self.dst][i], blended);
    }

    /// Draws a constant over the whole canvas.
    pub fn fill(&mut self, val: f64) {
        let size = self.size as i32;
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    self.draw_op(x, y, z, val);
                }
            }
        }
    }

    /// Draws the source buffer onto the destination.
    pub fn draw_self(&mut self) {
        let size = self.size as i32;
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    let val = self.src_value(x, y, z).unwrap_or(0.0);
                    self.draw_op(x, y, z, val);
                }
            }
        }
    }

    /// Draws octaves of lattice noise over the whole canvas.
    ///
    /// Octave `i` in `0..=octaves` samples at scale `factor^(octaves - i)`
    /// with amplitude `persistence^i`. The sum is normalized by the total
    /// amplitude, so results stay in `[0, 1]`. Seed 0 is treated as 1.
    pub fn fill_noise_octaves(&mut self, seed: u32, octaves: u32, factor: f64, persistence: f64) {
        let seed = if seed == 0 { 1 } else { seed };
        let lattice = NoiseLattice::new(self.size, seed);
        let size = self.size as u32;
        let mut field = vec![0.0f64; self.size * self.size * self.size];
        let mut amp_sum = 0.0;

        for i in 0..=octaves {
            let scale = factor.powf(f64::from(octaves - i)) as u32;
            let amp = persistence.powf(f64::from(i));
            amp_sum += amp;

            let mut offs = 0;
            for z in 0..size {
                for y in 0..size {
                    for x in 0..size {
                        let s = lattice.sample(x, y, z, scale);
                        field[offs] += f64::from(s) / f64::from(u32::MAX) * amp;
                        offs += 1;
                    }
                }
            }
        }

        let size = self.size as i32;
        let mut offs = 0;
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    self.draw_op(x, y, z, field[offs] / amp_sum);
                    offs += 1;
                }
            }
        }
        tracing::debug!(seed, octaves, factor, persistence, "noise octaves drawn");
    }

    /// A buffer by index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= BUFFER_COUNT`.
    #[must_use]
    pub fn buffer(&self, index: usize) -> &[f64] {
        &self.buffers[index]
    }

    /// The destination buffer.
    #[inline]
    #[must_use]
    pub fn dst_buffer(&self) -> &[f64] {
        &self.buffers[self.dst]
    }

    /// The destination buffer as raw native-endian bytes.
    #[must_use]
    pub fn dst_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.dst_buffer())
    }

    /// Copies the destination buffer into `out`. Returns the number of values copied.
    pub fn copy(&self, out: &mut [f64]) -> usize {
        let src = self.dst_buffer();
        let n = src.len().min(out.len());
        out[..n].copy_from_slice(&src[..n]);
        n
    }
}

fn clamp_index(index: i32) -> usize {
    index.clamp(0, BUFFER_COUNT as i32 - 1) as usize
}
