//! Error types shared by the shoe, hand rules and the estimator.

use thiserror::Error;

use crate::cards::Rank;

/// Errors raised by the simulation core.
///
/// None of these are transient: each one indicates either a caller bug or a
/// misconfigured shoe, so nothing in the crate retries on them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A specific rank was requested but none of it is left in the shoe.
    #[error("no {rank} left in the shoe to remove")]
    InvalidState {
        /// The rank whose count was already zero.
        rank: Rank,
    },

    /// A draw was attempted on a shoe with no cards left.
    #[error("shoe is exhausted")]
    Exhausted,

    /// Arguments handed to the core were malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;
