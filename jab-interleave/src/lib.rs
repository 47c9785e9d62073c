#![allow(dead_code)]

//! Seeded interleaver/deinterleaver (C4): a Fisher-Yates permutation driven
//! by a fixed 64-bit LCG, so the encoder and decoder can agree on the same
//! permutation without exchanging an index table.

use log::debug;

/// Seed for the interleaver's PRNG. Part of the wire contract; must not change.
pub const INTERLEAVE_SEED: u64 = 226759;

/// A 64-bit linear congruential generator with upper-bits tempering.
///
/// Uses the Knuth multiplier and a PCG-style increment; `next_u32` advances
/// the state once and returns its upper 32 bits. The encoder and decoder must
/// use the exact same sequence, so this is a fixed construction, not a
/// pluggable `rand`-crate RNG.
#[derive(Debug, Clone, Copy)]
pub struct Lcg64 {
    state: u64,
}

const LCG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const LCG_INCREMENT: u64 = 1_442_695_040_888_963_407;

impl Lcg64 {
    pub fn new(seed: u64) -> Self {
        Lcg64 { state: seed }
    }

    /// Advances the generator and returns a tempered 32-bit draw.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
        (self.state >> 32) as u32
    }
}

/// Draws the position swapped with `buf[len - 1 - i]` on round `i` of a
/// length-`len` Fisher-Yates shuffle, i.e. `floor(next_u32() / 2^32 * (len - i))`.
fn next_swap_position(rng: &mut Lcg64, remaining: i32) -> usize {
    let draw = rng.next_u32() as f64 / (u32::MAX as f64 + 1.0);
    (draw * remaining as f64) as usize
}

/// Builds the permutation `index[0..len]` produced by the interleaver's
/// Fisher-Yates walk, seeded with `INTERLEAVE_SEED`.
fn build_permutation(len: usize) -> Vec<usize> {
    let mut index: Vec<usize> = (0..len).collect();
    let mut rng = Lcg64::new(INTERLEAVE_SEED);
    for i in 0..len {
        let remaining = (len - i) as i32;
        let pos = next_swap_position(&mut rng, remaining);
        index.swap(len - 1 - i, pos);
    }
    index
}

/// In-place interleaving: shuffles `buf` using the seeded permutation.
pub fn interleave(buf: &mut [u8]) {
    let len = buf.len();
    debug!("interleave: shuffling {} bytes", len);
    let mut rng = Lcg64::new(INTERLEAVE_SEED);
    for i in 0..len {
        let remaining = (len - i) as i32;
        let pos = next_swap_position(&mut rng, remaining);
        buf.swap(len - 1 - i, pos);
    }
}

/// In-place deinterleaving: the inverse of `interleave`, given the same `buf`
/// length the forward call used.
pub fn deinterleave(buf: &mut [u8]) {
    let len = buf.len();
    debug!("deinterleave: unshuffling {} bytes", len);
    let index = build_permutation(len);
    let tmp = buf.to_vec();
    for (i, &dest) in index.iter().enumerate() {
        buf[dest] = tmp[i];
    }
}
