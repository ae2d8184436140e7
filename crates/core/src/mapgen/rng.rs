//! Uniform-draw helpers over the shared `ChaCha8Rng`.
//!
//! The generator never uses an ambient RNG; every stage receives the one
//! seeded stream by mutable reference and consumes it in a fixed order.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

/// Uniform f32 in `[0, 1)` with 24 bits of precision.
pub(super) fn unit_f32(rng: &mut ChaCha8Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1 << 24) as f32)
}

/// Uniform f32 in `[min, max)`.
pub(super) fn range_f32(rng: &mut ChaCha8Rng, min: f32, max: f32) -> f32 {
    min + (max - min) * unit_f32(rng)
}

/// Uniform integer in `[min, max]`.
pub(super) fn range_usize(rng: &mut ChaCha8Rng, min: usize, max: usize) -> usize {
    debug_assert!(min <= max);
    let range_size = max - min + 1;
    min + (rng.next_u64() as usize % range_size)
}

pub(super) fn chance(rng: &mut ChaCha8Rng, probability: f32) -> bool {
    unit_f32(rng) < probability
}

pub(super) fn pick<'a, T>(rng: &mut ChaCha8Rng, slice: &'a [T]) -> &'a T {
    debug_assert!(!slice.is_empty());
    &slice[rng.next_u64() as usize % slice.len()]
}
