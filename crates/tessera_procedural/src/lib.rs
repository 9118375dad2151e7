//! # Tessera Procedural
//!
//! Deterministic density fields for world generation.
//!
//! A [`VolumeCanvas`] holds four `size³` buffers of `f64` densities. Generators
//! draw into the destination buffer through one primitive, [`VolumeCanvas::draw_op`],
//! which honours the canvas' operator, range gates and source blend. Turning
//! densities into cell types is left to the caller.
//!
//! ## Core Components
//!
//! - `noise`: avalanche hash, xorshift and the integer value-noise lattice
//! - `VolumeCanvas`, `DrawOp`: buffers and the drawing state machine
//! - shape generators: boxes, spheres, pyramids, Menger sponge, Cantor dust,
//!   self-similar cubes, Sierpinski pyramids, random spheres
//!
//! ## Determinism
//!
//! The same seed and the same call sequence produce bit-identical buffers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_procedural::{DrawOp, VolumeCanvas};
//!
//! let mut canvas = VolumeCanvas::new(64)?;
//! canvas.fill_noise_octaves(1234, 4, 2.0, 0.5);
//!
//! // Carve a sponge out of the noise
//! canvas.set_op(DrawOp::Mul);
//! canvas.set_src_blend(-1.0);
//! canvas.menger_sponge(0.0, 0.0, 0.0, 54.0, 2);
//!
//! let densities = canvas.dst_buffer();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod noise;
pub mod shapes;
pub mod volume;

pub use error::{VolumeError, VolumeResult};
pub use noise::{hash32, hash_coord, lerp_int, smoothstep_int, xorshift32, NoiseLattice, INTSCALE};
pub use volume::{DrawOp, VolumeCanvas, BUFFER_COUNT, MAX_CANVAS_SIZE};
