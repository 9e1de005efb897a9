//! Table rules: the dealer's drawing policy and bet settlement.
//!
//! ## Dealer policy
//!
//! ```text
//!            best < 17, or soft 17
//!          ┌───────────────────────┐
//!          ▼                       │
//!     ┌─────────┐   draw card   ┌──┴──────┐
//!     │ Hitting ├──────────────►│ (check) │
//!     └─────────┘               └──┬──────┘
//!                                  │ otherwise
//!                                  ▼
//!                             ┌──────────┐
//!                             │ Standing │
//!                             └──────────┘
//! ```
//!
//! The dealer hits soft 17. This is fixed, not configurable.
//!
//! ## Settlement order
//!
//! 1. Player natural: push against a dealer natural, else `payout × bet`.
//! 2. Doubling multiplies the bet, never a blackjack payout.
//! 3. Player bust loses before the dealer's hand is looked at.

use log::trace;

use crate::cards::{Hand, Shoe};
use crate::error::Result;

/// Total at which the dealer stops drawing (soft 17 excepted).
pub const DEALER_STAND_TOTAL: u32 = 17;

/// Standard 3:2 blackjack payout.
pub const DEFAULT_BLACKJACK_PAYOUT: f64 = 1.5;

/// State of the dealer's drawing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerState {
    /// Dealer must take another card.
    Hitting,
    /// Dealer is done (terminal).
    Standing,
}

/// Decide what the dealer does next with `hand`.
pub fn dealer_state(hand: &Hand) -> DealerState {
    let (total, soft) = hand.values();
    if total < DEALER_STAND_TOTAL || (total == DEALER_STAND_TOTAL && soft) {
        DealerState::Hitting
    } else {
        DealerState::Standing
    }
}

/// Draw for the dealer from `shoe` until the policy says stand.
///
/// Calling this on a hand that is already standing draws nothing.
///
/// # Errors
/// Propagates [`crate::SimError::Exhausted`] if the shoe runs dry.
pub fn play_dealer(shoe: &mut Shoe, hand: &mut Hand) -> Result<()> {
    while dealer_state(hand) == DealerState::Hitting {
        let card = shoe.draw()?;
        hand.add_card(card);
    }
    trace!("dealer stands on {} with {} cards", hand.best_value(), hand.len());
    Ok(())
}

/// Player's net payoff for a finished round, in bet units.
///
/// Positive is a player win, negative a loss, `0.0` a push.
pub fn settle(player: &Hand, dealer: &Hand, blackjack_payout: f64) -> f64 {
    if player.is_blackjack() {
        return if dealer.is_blackjack() {
            0.0
        } else {
            blackjack_payout * player.bet
        };
    }

    let stake = player.effective_bet();

    if player.is_bust() {
        return -stake;
    }
    if dealer.is_bust() {
        return stake;
    }

    let (player_total, dealer_total) = (player.best_value(), dealer.best_value());
    if player_total > dealer_total {
        stake
    } else if player_total < dealer_total {
        -stake
    } else {
        0.0
    }
}
