//! Card primitives: ranks, hands and the shoe they are drawn from.
//!
//! - [`Rank`]: suit-independent rank token (ace = 1, faces = 11-13)
//! - [`Hand`]: one party's cards with soft/hard total arithmetic
//! - [`Shoe`]: weighted multiset of undealt ranks with its own random source

pub mod hand;
pub mod rank;
pub mod shoe;

pub use hand::{Hand, BLACKJACK};
pub use rank::{ranks_from_tokens, Rank, NUM_RANKS};
pub use shoe::{Shoe, DECK_SIZE, MAX_DECKS};
