//! # Lattice Value Noise
//!
//! Integer value noise over a cubic lattice of pseudo-random `u32` values.
//!
//! ## Determinism Guarantee
//!
//! Every step is integer arithmetic with explicit wrapping, so the same seed
//! produces bit-identical lattices and samples on any platform. The hash and
//! xorshift below are part of the world format: changing them changes every
//! generated world.

/// Fixed-point scale of the interpolation factor.
pub const INTSCALE: u64 = 128;

const INTSCALE3: u64 = INTSCALE * INTSCALE * INTSCALE;

/// 32-bit integer avalanche hash.
#[inline]
#[must_use]
pub const fn hash32(i: u32) -> u32 {
    let mut i = (i << 15).wrapping_sub(i).wrapping_sub(1);
    i ^= i >> 12;
    i = i.wrapping_add(i << 2);
    i ^= i >> 4;
    i = i.wrapping_mul(2057);
    i ^= i >> 16;
    i
}

/// One step of the 6/3/17 xorshift generator.
///
/// Zero is a fixed point; seed with something non-zero.
#[inline]
#[must_use]
pub const fn xorshift32(mut x: u32) -> u32 {
    x ^= x << 6;
    x ^= x >> 3;
    x ^= x << 17;
    x
}

/// Hash of a lattice coordinate: bits of x, y and z interleaved, then hashed.
#[must_use]
pub const fn hash_coord(mut x: u32, mut y: u32, mut z: u32) -> u32 {
    let mut out: u32 = 0;
    let mut bit = 0;
    while (x > 0 || y > 0 || z > 0) && bit < 32 {
        out |= (x & 1) << bit;
        bit += 1;
        if bit < 32 {
            out |= (y & 1) << bit;
            bit += 1;
        }
        if bit < 32 {
            out |= (z & 1) << bit;
            bit += 1;
        }
        x >>= 1;
        y >>= 1;
        z >>= 1;
    }
    hash32(out)
}

/// Linear interpolation with a fixed-point factor `x` in `0..INTSCALE`.
#[inline]
#[must_use]
pub const fn lerp_int(a: u32, b: u32, x: u32) -> u32 {
    let x = x as u64;
    let i = (a as u64) * (INTSCALE - x) + (b as u64) * x;
    (i / INTSCALE) as u32
}

/// Smoothstep interpolation with a fixed-point factor `x` in `0..INTSCALE`.
#[inline]
#[must_use]
pub const fn smoothstep_int(a: u32, b: u32, x: u32) -> u32 {
    let x = x as u64;
    let xs = x.wrapping_mul(x).wrapping_mul((3 * INTSCALE).wrapping_sub(2 * x));
    let i = (a as u64)
        .wrapping_mul(INTSCALE3.wrapping_sub(xs))
        .wrapping_add((b as u64).wrapping_mul(xs));
    (i / INTSCALE3) as u32
}

/// A `(size + 1)³` lattice of xorshift values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseLattice {
    side: usize,
    values: Vec<u32>,
}

impl NoiseLattice {
    /// Builds the lattice for a `size³` field.
    ///
    /// One extra sample per axis lets the far edge interpolate.
    #[must_use]
    pub fn new(size: usize, seed: u32) -> Self {
        let side = size + 1;
        let mut values = vec![0u32; side * side * side];
        let mut state = hash32(seed);

        // Fill order is x-major; the index order is x-minor
        for x in 0..side {
            for y in 0..side {
                for z in 0..side {
                    state = xorshift32(state);
                    values[x + y * side + z * side * side] = state;
                }
            }
        }
        Self { side, values }
    }

    /// Lattice points per axis.
    #[inline]
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    #[inline]
    fn at(&self, x: usize, y: usize, z: usize) -> u32 {
        self.values[x + y * self.side + z * self.side * self.side]
    }

    /// Samples at a field position, reading every `scale`-th lattice point.
    ///
    /// Larger scales consult fewer points and interpolate more. Scale 0, or a
    /// position whose cell would reach past the lattice, samples as 0.
    #[must_use]
    pub fn sample(&self, x: u32, y: u32, z: u32, scale: u32) -> u32 {
        if scale == 0 {
            return 0;
        }

        let rest = |v: u32| ((INTSCALE * u64::from(v % scale)) / u64::from(scale)) as u32;
        let (x_rest, y_rest, z_rest) = (rest(x), rest(y), rest(z));
        let (x, y, z) = ((x / scale) as usize, (y / scale) as usize, (z / scale) as usize);

        if x + 1 >= self.side || y + 1 >= self.side || z + 1 >= self.side {
            return 0;
        }

        let along_x = |y: usize, z: usize| smoothstep_int(self.at(x, y, z), self.at(x + 1, y, z), x_rest);
        let near = smoothstep_int(along_x(y, z), along_x(y + 1, z), y_rest);
        let far = smoothstep_int(along_x(y, z + 1), along_x(y + 1, z + 1), y_rest);
        smoothstep_int(near, far, z_rest)
    }
}
