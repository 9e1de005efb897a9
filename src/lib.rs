//! # bj-advisor
//!
//! Monte Carlo expected-value advisor for blackjack decisions.
//!
//! Given the player's cards, the dealer's up-card and the composition of the
//! shoe, the estimator simulates STAND, HIT and DOUBLE (whichever are legal)
//! and recommends the action with the highest expected payoff per unit bet.
//!
//! ## Features
//!
//! - **Finite shoe**: draws are weighted by the ranks actually left, so a
//!   depleted shoe shifts the estimates
//! - **Fixed table rules**: dealer hits soft 17, configurable blackjack payout
//! - **Reproducible**: a root seed fixes every trial, whatever the thread count
//! - **Parallel**: trials run on rayon, optionally on a dedicated pool
//!
//! ## Quick Start
//!
//! ```
//! use bj_advisor::{Estimator, EstimatorConfig, Rank};
//!
//! let config = EstimatorConfig::default().with_seed(42).with_trials(1_000);
//! let estimator = Estimator::new(config).unwrap();
//!
//! let player = [Rank::TEN, Rank::new(6).unwrap()];
//! let dealer = [Rank::TEN];
//! let rec = estimator.recommend(&player, &dealer).unwrap();
//!
//! println!("{} (ev {:.3})", rec.best_action, rec.best_ev);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Estimator                         │
//! │  - per-action trial batches   - seed derivation          │
//! │  - rayon execution            - Recommendation           │
//! └──────────────────────────────────────────────────────────┘
//!                  │ forks                │ plays / settles
//!                  ▼                      ▼
//!           ┌─────────────┐        ┌─────────────┐
//!           │    Shoe     │◄───────│    rules    │
//!           │ (counts,rng)│  draws │ dealer, pay │
//!           └─────────────┘        └─────────────┘
//!                  │ Rank                 │ Hand
//!                  ▼                      ▼
//!           ┌─────────────────────────────────────┐
//!           │           cards: Rank, Hand         │
//!           └─────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

/// Ranks, hands and the shoe.
pub mod cards;

/// Error types.
pub mod error;

/// Dealer policy and settlement.
pub mod rules;

/// Monte Carlo estimator and its results.
pub mod sim;

pub use cards::{Hand, Rank, Shoe};
pub use error::{Result, SimError};
pub use sim::{Action, ActionStats, ConfigError, Estimator, EstimatorConfig, Recommendation};
