//! Random access pseudo-random numbers.
//!
//! Every value is a pure function of `(seed, index)`: there is no generator
//! object and no cursor, so any single value can be recomputed without
//! replaying the ones before it.

use std::f64::consts::PI;

const INDEX_STEP: u32 = 0x6D2B_79F5;
const HIGH_INDEX_STEP: u32 = 0x9E37_79B9;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Smallest positive value [`seeded_random`] can return.
pub const MIN_POSITIVE_UNIFORM: f64 = 1.0 / TWO_POW_32;

/// Uniform value in `[0, 1)` for the given seed and index.
///
/// This is the Mulberry32 finalizer applied to the state the plain generator
/// would hold after `index` steps. Indices at or above 2^32 fold their high
/// word in with a second odd multiplier.
pub fn seeded_random(seed: u64, index: u64) -> f64 {
    let seed = (seed as u32) ^ ((seed >> 32) as u32);
    let mut t = seed
        .wrapping_add((index as u32).wrapping_mul(INDEX_STEP))
        .wrapping_add(((index >> 32) as u32).wrapping_mul(HIGH_INDEX_STEP));
    t = (t ^ (t >> 15)).wrapping_mul(t | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    t ^= t >> 14;
    t as f64 / TWO_POW_32
}

/// Normal variate with the given mean and standard deviation.
///
/// Consumes slots `2 * index` and `2 * index + 1`. A zero first uniform is
/// clamped to [`MIN_POSITIVE_UNIFORM`] so the logarithm stays finite.
pub fn random_normal(mean: f64, std_dev: f64, seed: u64, index: u64) -> f64 {
    let slot = index.wrapping_mul(2);
    let u = seeded_random(seed, slot).max(MIN_POSITIVE_UNIFORM);
    let v = seeded_random(seed, slot.wrapping_add(1));
    let z = (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos();
    mean + z * std_dev
}
