//! # Spawn Randomness
//!
//! The two random primitives spawning needs, behind a trait so evaluation can
//! be driven by a seeded generator or by a fixed script of draws.

use rand::rngs::{StdRng, ThreadRng};
use rand::Rng;
use std::collections::VecDeque;

/// Random source consumed by spawning.
pub trait SpawnRng {
    /// Uniform integer in `[lo, hi]`. Reversed bounds are swapped.
    fn rng(&mut self, lo: i32, hi: i32) -> i32;

    /// True one time in `n`. Always true for `n <= 1`.
    fn one_in(&mut self, n: u32) -> bool {
        if n <= 1 {
            return true;
        }
        let hi = i32::try_from(n - 1).unwrap_or(i32::MAX);
        self.rng(0, hi) == 0
    }

    /// Uniform integer in `[lo, hi]` over the wide range used for summed
    /// weights. Ranges that fit in `i32` go through [`SpawnRng::rng`].
    fn rng_wide(&mut self, lo: i64, hi: i64) -> i64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        match (i32::try_from(lo), i32::try_from(hi)) {
            (Ok(lo), Ok(hi)) => i64::from(self.rng(lo, hi)),
            _ => {
                // Scale a full-width draw onto the requested span
                let draw = i128::from(self.rng(0, i32::MAX));
                let span = i128::from(hi) - i128::from(lo);
                let offset = draw * span / i128::from(i32::MAX);
                i64::try_from(i128::from(lo) + offset).unwrap_or(hi)
            }
        }
    }
}

fn ordered(lo: i32, hi: i32) -> (i32, i32) {
    if lo <= hi {
        (lo, hi)
    } else {
        (hi, lo)
    }
}

impl SpawnRng for StdRng {
    fn rng(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = ordered(lo, hi);
        self.gen_range(lo..=hi)
    }

    fn rng_wide(&mut self, lo: i64, hi: i64) -> i64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        match (i32::try_from(lo), i32::try_from(hi)) {
            (Ok(lo), Ok(hi)) => i64::from(self.gen_range(lo..=hi)),
            _ => self.gen_range(lo..=hi),
        }
    }
}

impl SpawnRng for ThreadRng {
    fn rng(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = ordered(lo, hi);
        self.gen_range(lo..=hi)
    }

    fn rng_wide(&mut self, lo: i64, hi: i64) -> i64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        match (i32::try_from(lo), i32::try_from(hi)) {
            (Ok(lo), Ok(hi)) => i64::from(self.gen_range(lo..=hi)),
            _ => self.gen_range(lo..=hi),
        }
    }
}

/// Replays a fixed sequence of draws.
///
/// Each non-degenerate draw takes the next scripted value, clamped into the
/// requested range. Degenerate ranges (`lo == hi`) return `lo` without
/// consuming anything. Once the script runs out every draw returns the
/// fallback, clamped the same way.
///
/// # Examples
///
/// ```
/// use item_groups::{ScriptedRng, SpawnRng};
///
/// let mut rng = ScriptedRng::new([25, 500]);
/// assert_eq!(rng.rng(0, 99), 25);
/// assert_eq!(rng.rng(7, 7), 7);
/// assert_eq!(rng.rng(0, 99), 99);
/// assert_eq!(rng.rng(0, 99), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    draws: VecDeque<i32>,
    fallback: i32,
    consumed: usize,
}

impl ScriptedRng {
    /// Creates a script; draws past its end return 0 (clamped).
    pub fn new(draws: impl IntoIterator<Item = i32>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback: 0,
            consumed: 0,
        }
    }

    /// Sets the value returned once the script is exhausted.
    pub fn with_fallback(mut self, fallback: i32) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of scripted draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of scripted draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl SpawnRng for ScriptedRng {
    fn rng(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = ordered(lo, hi);
        if lo == hi {
            return lo;
        }
        let value = match self.draws.pop_front() {
            Some(value) => {
                self.consumed += 1;
                value
            }
            None => self.fallback,
        };
        value.clamp(lo, hi)
    }

    fn rng_wide(&mut self, lo: i64, hi: i64) -> i64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if lo == hi {
            return lo;
        }
        let value = match self.draws.pop_front() {
            Some(value) => {
                self.consumed += 1;
                value
            }
            None => self.fallback,
        };
        i64::from(value).clamp(lo, hi)
    }
}
