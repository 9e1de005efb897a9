//! Monte Carlo evaluation of player actions.
//!
//! - [`Action`]: the decisions that can be evaluated and their legality
//! - [`ActionStats`] / [`Recommendation`]: aggregated trial results
//! - [`EstimatorConfig`]: trial count, payout, seeding and threading
//! - [`Estimator`]: runs the trials

pub mod action;
pub mod config;
pub mod estimator;
pub mod stats;

pub use action::{legal_actions, Action, MAX_HIT_CARDS};
pub use config::{ConfigError, EstimatorConfig};
pub use estimator::Estimator;
pub use stats::{ActionStats, Recommendation};
