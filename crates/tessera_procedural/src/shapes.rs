//! # Shape Generators
//!
//! Primitive and recursive shapes drawn onto a [`VolumeCanvas`].
//!
//! Positions and sizes are in canvas cells as `f64`; recursive subdivision
//! produces fractional positions, which are floored per cell. Everything is
//! written through [`VolumeCanvas::draw_op`], so the current operator, ranges
//! and blend apply, and cells past the canvas edge are dropped.
//!
//! The three primitives draw a falloff, `1.0` at the centre down towards `0.0`
//! at the surface:
//!
//! | Primitive      | Falloff                                 |
//! |----------------|-----------------------------------------|
//! | `fill_box`     | `1 - chebyshev(cell, centre) / half`    |
//! | `fill_sphere`  | `1 - distance(cell, centre) / radius`   |
//! | `fill_pyramid` | `1 - layer / half`                      |

use crate::noise::{hash32, xorshift32};
use crate::volume::VolumeCanvas;

/// Corner offsets of an octree split, bit 0 = x, bit 1 = y, bit 2 = z.
const OCTANTS: [(f64, f64, f64); 8] = [
    (0.0, 0.0, 0.0),
    (1.0, 0.0, 0.0),
    (0.0, 1.0, 0.0),
    (1.0, 1.0, 0.0),
    (0.0, 0.0, 1.0),
    (1.0, 0.0, 1.0),
    (0.0, 1.0, 1.0),
    (1.0, 1.0, 1.0),
];

/// Cells covered by `size` from `origin`, as `(offset, cell)`.
fn span(origin: f64, size: f64) -> impl Iterator<Item = (f64, i32)> {
    let n = if size > 0.0 { size.ceil() as i32 } else { 0 };
    (0..n).map(move |j| {
        let j = f64::from(j);
        (j, (origin + j).floor() as i32)
    })
}

/// Unit float from a generator state.
fn unit(state: u32) -> f64 {
    f64::from(state) / f64::from(u32::MAX)
}

impl VolumeCanvas {
    /// Draws an axis-aligned cube with its minimum corner at `(x, y, z)`.
    pub fn fill_box(&mut self, x: f64, y: f64, z: f64, size: f64) {
        if size <= 0.0 {
            return;
        }
        let half = size / 2.0;
        let falloff = |j: f64| ((j + 0.5 - half) / half).abs();

        for (l, cz) in span(z, size) {
            for (k, cy) in span(y, size) {
                for (j, cx) in span(x, size) {
                    let d = falloff(j).max(falloff(k)).max(falloff(l));
                    self.draw_op(cx, cy, cz, (1.0 - d).max(0.0));
                }
            }
        }
    }

    /// Draws a sphere centred at `(x, y, z)`.
    ///
    /// A cell is inside when its centre is within `radius`.
    pub fn fill_sphere(&mut self, x: f64, y: f64, z: f64, radius: f64) {
        if radius <= 0.0 {
            return;
        }
        let lo = |c: f64| (c - radius).floor() as i32;
        let hi = |c: f64| (c + radius).ceil() as i32;

        for cz in lo(z)..=hi(z) {
            for cy in lo(y)..=hi(y) {
                for cx in lo(x)..=hi(x) {
                    let dx = f64::from(cx) + 0.5 - x;
                    let dy = f64::from(cy) + 0.5 - y;
                    let dz = f64::from(cz) + 0.5 - z;
                    let d = (dx * dx + dy * dy + dz * dz).sqrt();
                    if d <= radius {
                        self.draw_op(cx, cy, cz, 1.0 - d / radius);
                    }
                }
            }
        }
    }

    /// Draws a stepped pyramid standing on a `size × size` base at `(x, y, z)`.
    ///
    /// Layer `h` above the base is inset by `h` on every side; there are
    /// `size / 2` layers.
    pub fn fill_pyramid(&mut self, x: f64, y: f64, z: f64, size: f64) {
        if size <= 0.0 {
            return;
        }
        let half = size / 2.0;

        for (h, cy) in span(y, half) {
            let val = 1.0 - h / half;
            for (l, cz) in span(z, size) {
                for (j, cx) in span(x, size) {
                    if j >= h && l >= h && j < size - h && l < size - h {
                        self.draw_op(cx, cy, cz, val);
                    }
                }
            }
        }
    }

    /// Draws a Menger sponge of `lvl` subdivisions.
    ///
    /// Each level splits the cube 3×3×3 and keeps the 20 sub-cubes with at
    /// least two coordinates on the outer ring.
    pub fn menger_sponge(&mut self, x: f64, y: f64, z: f64, size: f64, lvl: u32) {
        if lvl == 0 {
            self.fill_box(x, y, z, size);
            return;
        }

        let s3 = size / 3.0;
        for l in 0..3u8 {
            for k in 0..3u8 {
                for j in 0..3u8 {
                    let ring = [j, k, l].iter().filter(|&&v| v != 1).count();
                    if ring < 2 {
                        continue;
                    }
                    self.menger_sponge(
                        x + f64::from(j) * s3,
                        y + f64::from(k) * s3,
                        z + f64::from(l) * s3,
                        s3,
                        lvl - 1,
                    );
                }
            }
        }
    }

    /// Draws Cantor dust of `lvl` subdivisions.
    ///
    /// Each level keeps the 8 corner cubes, separated by a gap that widens
    /// with the level (`2 * max(lvl / 1.3, 1)`).
    pub fn cantor_dust(&mut self, x: f64, y: f64, z: f64, size: f64, lvl: u32) {
        if size <= 0.0 {
            return;
        }
        if lvl == 0 {
            self.fill_box(x, y, z, size);
            return;
        }

        let rad = (f64::from(lvl) / 1.3).max(1.0);
        let size = size / 2.0 - rad;
        let offs = size + 2.0 * rad;

        for (dx, dy, dz) in OCTANTS {
            self.cantor_dust(x + dx * offs, y + dy * offs, z + dz * offs, size, lvl - 1);
        }
    }

    /// Draws an octree of cubes with randomly omitted octants.
    ///
    /// Every octant is dropped with probability 1/4, drawn from a xorshift
    /// stream keyed by `seed`. The same seed always yields the same shape.
    pub fn self_similar_cubes(&mut self, x: f64, y: f64, z: f64, size: f64, lvl: u32, seed: u32) {
        let mut state = hash32(seed) | 1;
        self.self_similar_step(x, y, z, size, lvl, &mut state);
    }

    fn self_similar_step(&mut self, x: f64, y: f64, z: f64, size: f64, lvl: u32, state: &mut u32) {
        if lvl == 0 {
            self.fill_box(x, y, z, size);
            return;
        }

        let half = size / 2.0;
        for (dx, dy, dz) in OCTANTS {
            *state = xorshift32(*state);
            if *state % 4 == 0 {
                continue;
            }
            self.self_similar_step(x + dx * half, y + dy * half, z + dz * half, half, lvl - 1, state);
        }
    }

    /// Draws a Sierpinski pyramid of `lvl` subdivisions.
    ///
    /// Each level places four half-size pyramids on the base corners and one
    /// on top of them, centred.
    pub fn sierpinski_pyramid(&mut self, x: f64, y: f64, z: f64, size: f64, lvl: u32) {
        if lvl == 0 {
            self.fill_pyramid(x, y, z, size);
            return;
        }

        let half = size / 2.0;
        for (dx, dz) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            self.sierpinski_pyramid(x + dx * half, y, z + dz * half, half, lvl - 1);
        }
        self.sierpinski_pyramid(x + half / 2.0, y + half, z + half / 2.0, half, lvl - 1);
    }

    /// Draws `count` spheres at seeded random positions inside the canvas.
    ///
    /// Radii are uniform in `[min_radius, max_radius]` (bounds may be given in
    /// either order).
    pub fn random_spheres(&mut self, count: u32, min_radius: f64, max_radius: f64, seed: u32) {
        let (lo, hi) = (min_radius.min(max_radius), min_radius.max(max_radius));
        let extent = self.size() as f64;
        let mut state = hash32(seed) | 1;
        let mut next = || {
            state = xorshift32(state);
            unit(state)
        };

        for _ in 0..count {
            let (x, y, z) = (next() * extent, next() * extent, next() * extent);
            let radius = lo + next() * (hi - lo);
            self.fill_sphere(x, y, z, radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::volume::{DrawOp, VolumeCanvas};

    fn canvas(size: usize) -> VolumeCanvas {
        VolumeCanvas::new(size).unwrap()
    }

    fn filled(c: &VolumeCanvas) -> usize {
        c.dst_buffer().iter().filter(|&&v| v > 0.0).count()
    }

    #[test]
    fn test_box_falloff() {
        let mut c = canvas(4);
        c.fill_box(0.0, 0.0, 0.0, 3.0);

        assert_eq!(c.value(1, 1, 1), Some(1.0));
        let corner = c.value(0, 0, 0).unwrap();
        assert!((corner - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(c.value(3, 0, 0), Some(0.0));
        assert_eq!(filled(&c), 27);
    }

    #[test]
    fn test_box_overshoot_is_clipped() {
        let mut c = canvas(4);
        c.fill_box(2.0, 2.0, 2.0, 6.0);
        assert_eq!(filled(&c), 8);
    }

    #[test]
    fn test_sphere_symmetry() {
        let mut c = canvas(8);
        c.fill_sphere(4.0, 4.0, 4.0, 3.0);

        let center = c.value(4, 4, 4).unwrap();
        assert!(center > 0.7);
        assert_eq!(c.value(3, 3, 3), Some(center));
        assert_eq!(c.value(0, 0, 0), Some(0.0));
        assert_eq!(c.value(4, 4, 7), Some(0.0), "cell centre 3.5 away");
    }

    #[test]
    fn test_pyramid_layers() {
        let mut c = canvas(4);
        c.fill_pyramid(0.0, 0.0, 0.0, 4.0);

        assert_eq!(c.value(0, 0, 0), Some(1.0));
        assert_eq!(c.value(0, 1, 0), Some(0.0));
        assert_eq!(c.value(1, 1, 1), Some(0.5));
        assert_eq!(c.value(1, 2, 1), Some(0.0));
        assert_eq!(filled(&c), 16 + 4);
    }

    #[test]
    fn test_menger_level_one() {
        let mut c = canvas(9);
        c.menger_sponge(0.0, 0.0, 0.0, 9.0, 1);

        assert_eq!(filled(&c), 20 * 27);
        assert_eq!(c.value(4, 4, 4), Some(0.0), "centre removed");
        assert_eq!(c.value(4, 4, 1), Some(0.0), "face centre removed");
        assert_eq!(c.value(1, 1, 1), Some(1.0));
        assert_eq!(c.value(4, 1, 1), Some(1.0), "edge kept");
    }

    #[test]
    fn test_cantor_gap() {
        let mut c = canvas(16);
        c.cantor_dust(0.0, 0.0, 0.0, 16.0, 1);

        assert_eq!(c.value(3, 3, 3), Some(1.0));
        assert_eq!(c.value(12, 12, 12), Some(1.0));
        assert_eq!(c.value(7, 3, 3), Some(0.0));
        assert_eq!(c.value(8, 3, 3), Some(0.0));
        assert_eq!(filled(&c), 8 * 7 * 7 * 7);
    }

    #[test]
    fn test_cantor_degenerate_size() {
        let mut c = canvas(4);
        c.cantor_dust(0.0, 0.0, 0.0, 2.0, 3);
        assert_eq!(filled(&c), 0);
    }

    #[test]
    fn test_self_similar_omits_seeded_octant() {
        let mut c = canvas(8);
        c.self_similar_cubes(0.0, 0.0, 0.0, 8.0, 1, 2);

        assert_eq!(c.value(5, 1, 5), Some(0.0), "octant (1, 0, 1) dropped for seed 2");
        assert!(c.value(1, 1, 1).unwrap() > 0.0);
        assert!(c.value(5, 5, 5).unwrap() > 0.0);
        assert_eq!(filled(&c), 7 * 64);
    }

    #[test]
    fn test_self_similar_deterministic() {
        let mut a = canvas(16);
        let mut b = canvas(16);
        a.self_similar_cubes(0.0, 0.0, 0.0, 16.0, 3, 99);
        b.self_similar_cubes(0.0, 0.0, 0.0, 16.0, 3, 99);
        assert_eq!(a.dst_bytes(), b.dst_bytes());
    }

    #[test]
    fn test_sierpinski_level_one() {
        let mut c = canvas(8);
        c.sierpinski_pyramid(0.0, 0.0, 0.0, 8.0, 1);

        assert_eq!(c.value(0, 0, 0), Some(1.0));
        assert_eq!(c.value(7, 0, 7), Some(1.0));
        assert_eq!(c.value(2, 4, 2), Some(1.0), "apex pyramid base");
        assert_eq!(c.value(0, 4, 0), Some(0.0));
        assert_eq!(c.value(3, 5, 3), Some(0.5));
        assert_eq!(c.value(2, 5, 2), Some(0.0));
        assert!((6..8).all(|y| c.value(4, y, 4) == Some(0.0)));
    }

    #[test]
    fn test_random_spheres() {
        let mut a = canvas(16);
        a.random_spheres(0, 1.0, 3.0, 5);
        assert_eq!(filled(&a), 0);

        a.set_op(DrawOp::Add);
        a.random_spheres(6, 3.0, 1.0, 5);
        assert!(filled(&a) > 0);

        let mut b = canvas(16);
        b.set_op(DrawOp::Add);
        b.random_spheres(6, 1.0, 3.0, 5);
        assert_eq!(a.dst_bytes(), b.dst_bytes());
    }
}
