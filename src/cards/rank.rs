//! Suit-independent card ranks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Number of distinct ranks in a deck.
pub const NUM_RANKS: usize = 13;

/// Cards of each rank in a single 52-card deck.
pub const PER_DECK: u32 = 4;

/// One of the 13 card ranks.
///
/// The token is `1` for an ace, `2`-`10` for pip cards and `11`-`13` for
/// jack, queen and king. Faces are worth 10 in blackjack.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(u8);

impl Rank {
    /// Ace.
    pub const ACE: Rank = Rank(1);
    /// Ten.
    pub const TEN: Rank = Rank(10);
    /// King.
    pub const KING: Rank = Rank(13);

    /// Every rank in canonical order (ace first, king last).
    ///
    /// Weighted draws walk the shoe in exactly this order.
    pub const ALL: [Rank; NUM_RANKS] = [
        Rank(1),
        Rank(2),
        Rank(3),
        Rank(4),
        Rank(5),
        Rank(6),
        Rank(7),
        Rank(8),
        Rank(9),
        Rank(10),
        Rank(11),
        Rank(12),
        Rank(13),
    ];

    /// Create a rank from its token (1-13).
    pub fn new(token: u8) -> Result<Self> {
        if (1..=NUM_RANKS as u8).contains(&token) {
            Ok(Self(token))
        } else {
            Err(SimError::InvalidInput(format!(
                "rank token {} is outside 1..=13",
                token
            )))
        }
    }

    /// Create a rank from its position in [`Rank::ALL`].
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < NUM_RANKS, "rank index must be 0-12");
        Self(index as u8 + 1)
    }

    /// The raw token (1-13).
    #[inline]
    pub fn token(self) -> u8 {
        self.0
    }

    /// Position in the canonical ordering (0-12).
    #[inline]
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Blackjack value with the ace counted as 1.
    #[inline]
    pub fn value(self) -> u8 {
        self.0.min(10)
    }

    /// Whether this rank is an ace.
    #[inline]
    pub fn is_ace(self) -> bool {
        self.0 == 1
    }
}

impl TryFrom<u8> for Rank {
    type Error = SimError;

    fn try_from(token: u8) -> Result<Self> {
        Self::new(token)
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rank {}", self.0)
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank({})", self.0)
    }
}

/// Convert raw tokens into ranks, failing on the first invalid one.
pub fn ranks_from_tokens(tokens: &[u8]) -> Result<Vec<Rank>> {
    tokens.iter().map(|&t| Rank::new(t)).collect()
}
