//! Blackjack hand representation and value arithmetic.

use serde::{Deserialize, Serialize};

use super::rank::Rank;

/// Highest total that does not bust.
pub const BLACKJACK: u32 = 21;

/// Extra value an ace is worth when counted as 11.
const ACE_BONUS: u32 = 10;

/// Cards held by one party (player or dealer).
///
/// A hand only ever grows. `bet` is the stake multiplier before doubling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Rank>,
    /// Whether the player doubled down on this hand.
    pub doubled: bool,
    /// Stake multiplier (1.0 = one unit).
    pub bet: f64,
}

impl Hand {
    /// Empty hand with a unit bet.
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            doubled: false,
            bet: 1.0,
        }
    }

    /// Hand holding `ranks` in order, with a unit bet.
    pub fn from_ranks(ranks: &[Rank]) -> Self {
        Self {
            cards: ranks.to_vec(),
            ..Self::new()
        }
    }

    /// Append a card.
    pub fn add_card(&mut self, rank: Rank) {
        self.cards.push(rank);
    }

    /// Cards in deal order.
    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }

    /// Number of cards held.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether no cards are held.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Total with aces promoted to 11 wherever that keeps the hand at 21 or
    /// under, and whether any ace ended up promoted.
    ///
    /// If even the all-ones total busts, that bust total is returned with
    /// `is_soft == false`.
    pub fn values(&self) -> (u32, bool) {
        let mut total: u32 = self.cards.iter().map(|r| r.value() as u32).sum();
        let mut soft = false;
        for _ in self.cards.iter().filter(|r| r.is_ace()) {
            if total + ACE_BONUS <= BLACKJACK {
                total += ACE_BONUS;
                soft = true;
            }
        }
        (total, soft)
    }

    /// Highest non-busting total, or the minimum total if every arrangement busts.
    #[inline]
    pub fn best_value(&self) -> u32 {
        self.values().0
    }

    /// Whether an ace is currently counted as 11.
    #[inline]
    pub fn is_soft(&self) -> bool {
        self.values().1
    }

    /// Whether the hand is over 21.
    #[inline]
    pub fn is_bust(&self) -> bool {
        self.best_value() > BLACKJACK
    }

    /// Two-card 21 that was not reached by doubling.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && !self.doubled && self.best_value() == BLACKJACK
    }

    /// Amount at risk once doubling is taken into account.
    #[inline]
    pub fn effective_bet(&self) -> f64 {
        if self.doubled {
            self.bet * 2.0
        } else {
            self.bet
        }
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}
