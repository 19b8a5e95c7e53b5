//! Sharder implementation.
//!
//! The string hash, the seed expansion and the generator are all pinned: changing any of them
//! reassigns users of every running experiment.
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait Sharder {
    /// Map `input` to a slot in `[0, total_slots)`. `total_slots` must be non-zero.
    fn get_slot(&self, input: impl AsRef<[u8]>, total_slots: usize) -> usize;
}

/// The default (and only) sharder.
///
/// The djb2 hash of the input is expanded into a ChaCha8 seed, and the generator draws one
/// uniform slot.
pub struct Djb2Sharder;

impl Sharder for Djb2Sharder {
    fn get_slot(&self, input: impl AsRef<[u8]>, total_slots: usize) -> usize {
        let mut rng = ChaCha8Rng::from_seed(expand_seed(djb2(input.as_ref())));
        draw_below(&mut rng, total_slots as u64) as usize
    }
}

/// djb2 string hash (`hash * 33 + byte`, starting from 5381) over 64-bit signed integers with
/// wraparound.
pub fn djb2(bytes: &[u8]) -> i64 {
    bytes.iter().fold(5381i64, |hash, &b| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(i64::from(b))
    })
}

/// Expand a hash into a 32-byte generator seed with SplitMix64.
///
/// djb2 is linear in its input, so hashes of `experiment + user` for two experiments differ by
/// the same amount for many users. The non-linear expansion keeps draws for different
/// experiments independent.
pub fn expand_seed(hash: i64) -> [u8; 32] {
    let mut state = hash as u64;
    let mut seed = [0u8; 32];
    for chunk in seed.chunks_mut(8) {
        chunk.copy_from_slice(&splitmix64(&mut state).to_le_bytes());
    }
    seed
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Draw a uniform integer in `[0, bound)` using widening multiplication with rejection.
///
/// `Rng::gen_range` is not guaranteed to produce the same values across `rand` releases.
fn draw_below(rng: &mut impl RngCore, bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    let threshold = bound.wrapping_neg() % bound;
    loop {
        let m = u128::from(rng.next_u64()) * u128::from(bound);
        if (m as u64) >= threshold {
            return (m >> 64) as u64;
        }
    }
}
