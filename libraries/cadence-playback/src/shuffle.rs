//! Shuffle algorithm for queue randomization
//!
//! Fisher-Yates, walking from the last index down to 1 and swapping each slot
//! with a uniformly chosen index at or before it. The generator is a parameter
//! so tests can pin the permutation with a seeded RNG.

use rand::Rng;

/// Uniformly permute `items` in place
///
/// Hand-written rather than `SliceRandom::shuffle`: rand does not promise a
/// stable draw sequence across versions, and seeded tests pin this walk.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
