//! The shoe: a weighted multiset of undealt ranks.
//!
//! A `Shoe` only tracks how many cards of each rank are left, never their
//! order. Drawing picks uniformly among the remaining physical cards by
//! scanning cumulative counts in canonical rank order, so the outcome never
//! depends on hash-map iteration order.
//!
//! Every shoe owns its random source. Forking a shoe copies the counts and
//! seeds the child from one value drawn off the parent, which keeps sibling
//! shoes on separate streams while a whole simulation stays reproducible from
//! a single root seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::rank::{Rank, NUM_RANKS, PER_DECK};
use crate::error::{Result, SimError};

/// Cards in one standard deck.
pub const DECK_SIZE: u32 = 52;

/// Largest shoe that can be built. Keeps every count well inside `u32`.
pub const MAX_DECKS: u32 = 1_000;

/// Remaining cards per rank, plus a private random source.
///
/// Not `Clone`: a copy would replay its parent's random stream. Use
/// [`Shoe::fork`] or [`Shoe::fork_with_seed`].
#[derive(Debug)]
pub struct Shoe {
    /// Remaining count per rank, indexed by `Rank::index()`.
    counts: [u32; NUM_RANKS],

    /// Cached sum of `counts`.
    remaining: u32,

    /// Number of decks the shoe was built from.
    num_decks: u32,

    /// Random source used by `draw` and `fork`.
    rng: StdRng,
}

impl Shoe {
    /// Build a full shoe of `num_decks` decks seeded with `seed`.
    ///
    /// `num_decks` is capped at [`MAX_DECKS`].
    pub fn new(num_decks: u32, seed: u64) -> Self {
        Self::with_rng(num_decks, StdRng::seed_from_u64(seed))
    }

    /// Build a full shoe with an OS-seeded random source.
    pub fn from_entropy(num_decks: u32) -> Self {
        Self::with_rng(num_decks, StdRng::from_entropy())
    }

    fn with_rng(num_decks: u32, rng: StdRng) -> Self {
        let num_decks = num_decks.min(MAX_DECKS);
        let per_rank = PER_DECK * num_decks;
        Self {
            counts: [per_rank; NUM_RANKS],
            remaining: per_rank * NUM_RANKS as u32,
            num_decks,
            rng,
        }
    }

    /// Draw one card, weighted by the remaining count of each rank.
    ///
    /// # Errors
    /// [`SimError::Exhausted`] if no cards are left.
    pub fn draw(&mut self) -> Result<Rank> {
        if self.remaining == 0 {
            return Err(SimError::Exhausted);
        }

        let target = self.rng.gen_range(1..=self.remaining);
        let mut cumulative = 0;
        for (index, &count) in self.counts.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                let rank = Rank::from_index(index);
                self.counts[index] -= 1;
                self.remaining -= 1;
                return Ok(rank);
            }
        }

        // `remaining` is the sum of `counts`, so the scan always selects.
        Err(SimError::Exhausted)
    }

    /// Remove one card of a known rank, e.g. a card already dealt.
    ///
    /// # Errors
    /// [`SimError::InvalidState`] if that rank has no cards left.
    pub fn remove(&mut self, rank: Rank) -> Result<()> {
        let slot = &mut self.counts[rank.index()];
        if *slot == 0 {
            return Err(SimError::InvalidState { rank });
        }
        *slot -= 1;
        self.remaining -= 1;
        Ok(())
    }

    /// Remove every rank in `ranks`, stopping at the first failure.
    pub fn remove_all(&mut self, ranks: &[Rank]) -> Result<()> {
        ranks.iter().try_for_each(|&rank| self.remove(rank))
    }

    /// Fork an independent shoe with the same counts.
    ///
    /// The child's random source is seeded from one value drawn from this
    /// shoe's source, so the parent's stream advances by exactly one draw and
    /// its counts are untouched.
    pub fn fork(&mut self) -> Shoe {
        let seed = self.rng.gen::<u64>();
        self.fork_with_seed(seed)
    }

    /// Fork an independent shoe with the same counts and an explicit seed.
    ///
    /// Takes `&self`, so a shared read-only base shoe can hand out per-trial
    /// copies without synchronization.
    pub fn fork_with_seed(&self, seed: u64) -> Shoe {
        Shoe {
            counts: self.counts,
            remaining: self.remaining,
            num_decks: self.num_decks,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Total cards left.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Cards left of one rank.
    #[inline]
    pub fn count(&self, rank: Rank) -> u32 {
        self.counts[rank.index()]
    }

    /// Snapshot of the per-rank counts in canonical order.
    pub fn counts(&self) -> [u32; NUM_RANKS] {
        self.counts
    }

    /// Number of decks the shoe was built from.
    pub fn num_decks(&self) -> u32 {
        self.num_decks
    }

    /// Size of the shoe when full.
    pub fn initial(&self) -> u32 {
        self.num_decks * DECK_SIZE
    }

    /// Fraction of the full shoe still undealt (1.0 when fresh).
    pub fn remaining_ratio(&self) -> f64 {
        let initial = self.initial();
        if initial == 0 {
            0.0
        } else {
            self.remaining as f64 / initial as f64
        }
    }

    /// Whether the undealt fraction has dropped to `threshold_ratio` or below.
    ///
    /// Callers use this as the reshuffle / end-of-shoe cut card.
    pub fn is_below(&self, threshold_ratio: f64) -> bool {
        self.remaining as f64 <= (self.initial() as f64 * threshold_ratio).floor()
    }
}
