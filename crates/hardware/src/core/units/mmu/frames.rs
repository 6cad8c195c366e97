//! Victim frame selection.
//!
//! `select_victim` works on a snapshot of every frame's flag word:
//! 1. The first invalid frame wins outright.
//! 2. Otherwise the first unreferenced, unpinned frame wins; a combo pair is a
//!    candidate only as a whole (neither half referenced) and is reported by its
//!    low half.
//! 3. Otherwise a pseudo-random unpinned frame is drawn; a draw landing on the
//!    high half of a combo pair is moved to its low half.

use crate::common::constants::{
    FLAG_CHIGH, FLAG_CLOCK, FLAG_COMBO, FLAG_FIXED, FLAG_VALID, LCG_INCREMENT, LCG_MULTIPLIER,
};

/// Linear-congruential generator used for the random fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Creates a generator from `seed`.
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Advances the generator and returns a value in `0..modulus`.
    pub const fn next_below(&mut self, modulus: usize) -> usize {
        self.state = self.state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
        ((self.state >> 33) % modulus as u64) as usize
    }
}

/// Partner slot of `frame` in its combo pair.
pub const fn partner(frame: usize) -> usize {
    frame ^ 1
}

/// Chooses the frame to (re)fill.
///
/// # Arguments
///
/// * `flags` - Flag word of every frame, in frame order.
/// * `lcg` - Generator for the random fallback.
///
/// # Returns
///
/// The chosen frame, or `None` if every frame is pinned.
pub fn select_victim(flags: &[u32], lcg: &mut Lcg) -> Option<usize> {
    if let Some(free) = flags.iter().position(|f| f & FLAG_VALID == 0) {
        return Some(free);
    }

    for (frame, &f) in flags.iter().enumerate() {
        if f & FLAG_FIXED != 0 {
            continue;
        }
        if f & FLAG_COMBO != 0 {
            if f & FLAG_CHIGH != 0 {
                continue;
            }
            let Some(&other) = flags.get(partner(frame)) else {
                continue;
            };
            if (f | other) & FLAG_CLOCK == 0 && other & FLAG_FIXED == 0 {
                return Some(frame);
            }
            continue;
        }
        if f & FLAG_CLOCK == 0 {
            return Some(frame);
        }
    }

    if flags.iter().all(|f| f & FLAG_FIXED != 0) {
        return None;
    }
    let start = lcg.next_below(flags.len());
    let frame = (0..flags.len()).map(|step| (start + step) % flags.len()).find(|&i| flags[i] & FLAG_FIXED == 0)?;
    if flags[frame] & (FLAG_COMBO | FLAG_CHIGH) == FLAG_COMBO | FLAG_CHIGH {
        return Some(partner(frame));
    }
    Some(frame)
}
