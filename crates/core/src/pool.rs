use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::fmt;

/// Result of drawing from a [`ChallengePool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draw<T> {
    Challenge(T),
    /// The pool was built from an empty source; there is nothing to practice.
    Exhausted,
}

impl<T> Draw<T> {
    #[must_use]
    pub fn into_challenge(self) -> Option<T> {
        match self {
            Draw::Challenge(challenge) => Some(challenge),
            Draw::Exhausted => None,
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Draw::Exhausted)
    }
}

/// Working set of challenges not yet served in the current pass.
///
/// Every pass serves each source item exactly once in a uniformly shuffled order. When a
/// pass runs out the pool refills itself with a fresh shuffle, so the next pass is
/// independent of the previous one. Only an empty source ever yields [`Draw::Exhausted`].
pub struct ChallengePool<T, R = StdRng> {
    source: Vec<T>,
    available: VecDeque<T>,
    rng: R,
    refills: u64,
}

impl<T: Clone> ChallengePool<T, StdRng> {
    /// Pool seeded from the operating system.
    #[must_use]
    pub fn from_os_rng(source: Vec<T>) -> Self {
        Self::new(source, StdRng::from_os_rng())
    }

    /// Pool with a reproducible draw order.
    #[must_use]
    pub fn seeded(source: Vec<T>, seed: u64) -> Self {
        Self::new(source, StdRng::seed_from_u64(seed))
    }
}

impl<T: Clone, R: Rng> ChallengePool<T, R> {
    #[must_use]
    pub fn new(source: Vec<T>, rng: R) -> Self {
        let mut pool = Self {
            source: Vec::new(),
            available: VecDeque::new(),
            rng,
            refills: 0,
        };
        pool.initialize(source);
        pool
    }

    /// Replaces the source list and starts a new shuffled pass over it.
    pub fn initialize(&mut self, source: Vec<T>) {
        self.source = source;
        self.refills = 0;
        self.refill();
    }

    /// Removes and returns the next challenge of the current pass.
    pub fn draw(&mut self) -> Draw<T> {
        if self.available.is_empty() {
            if self.source.is_empty() {
                return Draw::Exhausted;
            }
            self.refill();
            self.refills += 1;
        }
        match self.available.pop_front() {
            Some(challenge) => Draw::Challenge(challenge),
            None => Draw::Exhausted,
        }
    }

    fn refill(&mut self) {
        self.available.clear();
        self.available.extend(self.source.iter().cloned());
        self.available.make_contiguous().shuffle(&mut self.rng);
    }
}

impl<T, R> ChallengePool<T, R> {
    /// Challenges left before the next refill.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.available.len()
    }

    #[must_use]
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Number of times the pool refilled itself after running out.
    #[must_use]
    pub fn refills(&self) -> u64 {
        self.refills
    }
}

impl<T, R> fmt::Debug for ChallengePool<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallengePool")
            .field("source_len", &self.source.len())
            .field("remaining", &self.available.len())
            .field("refills", &self.refills)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
