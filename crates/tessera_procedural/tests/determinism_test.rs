//! # Generation Determinism Tests
//!
//! World generation must reproduce the same densities for the same seed.
//! These values are part of the world format.

use tessera_procedural::{DrawOp, VolumeCanvas};

const EPSILON: f64 = 1e-12;

fn noise_canvas(seed: u32) -> VolumeCanvas {
    let mut canvas = VolumeCanvas::new(8).unwrap();
    canvas.fill_noise_octaves(seed, 3, 2.0, 0.5);
    canvas
}

/// Test: octave noise matches the reference values for seed 42.
#[test]
fn test_noise_octaves_reference_values() {
    let canvas = noise_canvas(42);
    let dst = canvas.dst_buffer();

    let expected = [
        (0, 0.232_015_461_249_280_6),
        (1, 0.242_527_847_265_792_38),
        (7 * 64 + 7 * 8 + 7, 0.563_252_852_662_292_5),
    ];
    for (index, value) in expected {
        assert!((dst[index] - value).abs() < EPSILON, "index {index}: {} != {value}", dst[index]);
    }

    let min = dst.iter().copied().fold(f64::INFINITY, f64::min);
    let max = dst.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert!((min - 0.146_031_991_829_947_86).abs() < EPSILON);
    assert!((max - 0.687_191_256_388_833_7).abs() < EPSILON);
}

/// Test: two runs with the same seed are byte-identical.
#[test]
fn test_same_seed_same_bytes() {
    let a = noise_canvas(1234);
    let b = noise_canvas(1234);
    assert_eq!(a.dst_bytes(), b.dst_bytes());
    assert_ne!(a.dst_bytes(), noise_canvas(1235).dst_bytes());
}

/// Test: seed 0 is an alias for seed 1.
#[test]
fn test_seed_zero_aliases_one() {
    assert_eq!(noise_canvas(0).dst_bytes(), noise_canvas(1).dst_bytes());
}

/// Test: a full pipeline (noise, then a sponge carved out) is reproducible.
#[test]
fn test_pipeline_reproducible() {
    let run = || {
        let mut canvas = VolumeCanvas::new(27).unwrap();
        canvas.fill_noise_octaves(7, 2, 2.0, 0.5);

        // Stage the sponge in buffer 2, then multiply it into the noise
        canvas.set_dst(2);
        canvas.menger_sponge(0.0, 0.0, 0.0, 27.0, 2);
        canvas.set_src(2);
        canvas.set_dst(1);
        canvas.set_op(DrawOp::Mul);
        canvas.draw_self();
        canvas.dst_bytes().to_vec()
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(first.len(), 27 * 27 * 27 * 8);
}

/// Test: the multiply pass zeroes the sponge holes and keeps the walls.
#[test]
fn test_sponge_mask_carves_noise() {
    let mut canvas = VolumeCanvas::new(9).unwrap();
    canvas.fill_noise_octaves(3, 2, 2.0, 0.5);
    let noise_at_wall = canvas.value(1, 1, 1).unwrap();

    canvas.set_dst(2);
    canvas.menger_sponge(0.0, 0.0, 0.0, 9.0, 1);
    canvas.set_src(2);
    canvas.set_dst(1);
    canvas.set_op(DrawOp::Mul);
    canvas.draw_self();

    assert_eq!(canvas.value(4, 4, 4), Some(0.0));
    assert!((canvas.value(1, 1, 1).unwrap() - noise_at_wall).abs() < EPSILON);
}
