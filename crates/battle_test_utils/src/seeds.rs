//! Deterministic seed sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use battle_client::seed::SeedSource;

/// Hands out a fixed list of seeds, cycling when exhausted, and records every
/// draw.
#[derive(Debug)]
pub struct SeedSequence {
    seeds: Vec<u32>,
    next: AtomicUsize,
    drawn: Mutex<Vec<u32>>,
}

impl SeedSequence {
    /// Create a sequence over `seeds`.
    ///
    /// # Panics
    ///
    /// Panics if `seeds` is empty.
    #[must_use]
    pub fn new(seeds: impl Into<Vec<u32>>) -> Self {
        let seeds = seeds.into();
        assert!(!seeds.is_empty(), "a seed sequence needs at least one seed");
        Self {
            seeds,
            next: AtomicUsize::new(0),
            drawn: Mutex::new(Vec::new()),
        }
    }

    /// Seeds drawn so far, in draw order.
    ///
    /// # Panics
    ///
    /// Panics if a draw panicked while recording.
    #[must_use]
    pub fn drawn(&self) -> Vec<u32> {
        self.drawn.lock().expect("drawn lock").clone()
    }
}

impl SeedSource for SeedSequence {
    fn next_seed(&self) -> u32 {
        let i = self.next.fetch_add(1, Ordering::SeqCst) % self.seeds.len();
        let seed = self.seeds[i];
        if let Ok(mut drawn) = self.drawn.lock() {
            drawn.push(seed);
        }
        seed
    }
}
