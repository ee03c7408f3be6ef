//! Engine seeds.
//!
//! Callers pass a signed seed. `0` asks for a fresh random seed, any other
//! value is used as-is. The engine parses its seed as an unsigned 32-bit
//! number and rejects `0`, so drawn seeds lie in `1..=MAX_DRAWN_SEED`.

use battle_core::error::{BattleError, Result};
use rand::Rng;

/// Largest seed [`RandomSeeds`] draws.
pub const MAX_DRAWN_SEED: u32 = 1_000_000_000;

/// Source of fresh seeds for runs requested with seed `0`.
pub trait SeedSource: Send + Sync {
    /// Draw a positive seed.
    fn next_seed(&self) -> u32;
}

impl<F> SeedSource for F
where
    F: Fn() -> u32 + Send + Sync,
{
    fn next_seed(&self) -> u32 {
        self()
    }
}

/// Draws seeds uniformly from `1..=MAX_DRAWN_SEED` using the thread RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSeeds;

impl SeedSource for RandomSeeds {
    fn next_seed(&self) -> u32 {
        rand::thread_rng().gen_range(1..=MAX_DRAWN_SEED)
    }
}

/// Check a caller seed. Returns `None` when a seed should be drawn.
///
/// # Errors
///
/// Returns [`BattleError::InvalidSeed`] for negative seeds and seeds above
/// `u32::MAX`.
pub fn check_seed(seed: i64) -> Result<Option<u32>> {
    match u32::try_from(seed) {
        Ok(0) => Ok(None),
        Ok(seed) => Ok(Some(seed)),
        Err(_) => Err(BattleError::InvalidSeed(seed)),
    }
}

/// Draw one seed from `source`, checking it lies in `1..=MAX_DRAWN_SEED`.
///
/// # Errors
///
/// Returns [`BattleError::InvalidSeed`] when the source hands out a seed
/// outside that range. The engine refuses `0`.
pub fn draw_seed(source: &dyn SeedSource) -> Result<u32> {
    let seed = source.next_seed();
    if (1..=MAX_DRAWN_SEED).contains(&seed) {
        Ok(seed)
    } else {
        Err(BattleError::InvalidSeed(i64::from(seed)))
    }
}

/// Resolve the seeds of `count` runs.
///
/// An explicit seed is repeated for every run. Seed `0` draws one seed per
/// run, in run order, so run `i` always gets the `i`-th draw.
///
/// # Errors
///
/// See [`check_seed`] and [`draw_seed`].
pub fn resolve_seeds(seed: i64, count: usize, source: &dyn SeedSource) -> Result<Vec<u32>> {
    match check_seed(seed)? {
        Some(seed) => Ok(vec![seed; count]),
        None => (0..count).map(|_| draw_seed(source)).collect(),
    }
}
