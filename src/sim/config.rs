//! Configuration for the Monte Carlo estimator.
//!
//! Configs can be built in code with the `with_*` builders or loaded from
//! JSON. Every loader validates before returning.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::MAX_DECKS;
use crate::rules::DEFAULT_BLACKJACK_PAYOUT;

/// Settings for [`crate::Estimator`].
///
/// # Example
/// ```
/// use bj_advisor::EstimatorConfig;
///
/// let config = EstimatorConfig::default().with_seed(42).with_trials(2_000);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.num_decks, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Decks in a fresh shoe.
    pub num_decks: u32,

    /// Trials simulated for each legal action.
    pub trials_per_action: usize,

    /// Multiple of the bet paid on a player natural (1.5 = 3:2).
    pub blackjack_payout: f64,

    /// Root seed. `None` seeds from OS entropy once, when the estimator is built.
    pub seed: Option<u64>,

    /// Worker threads for trial execution.
    ///
    /// `None` uses rayon's global pool. Results do not depend on this value.
    pub num_threads: Option<usize>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            num_decks: 6,
            trials_per_action: 10_000,
            blackjack_payout: DEFAULT_BLACKJACK_PAYOUT,
            seed: None,
            num_threads: None,
        }
    }
}

impl EstimatorConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of decks.
    pub fn with_decks(mut self, num_decks: u32) -> Self {
        self.num_decks = num_decks;
        self
    }

    /// Builder method: set trials per action.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials_per_action = trials;
        self
    }

    /// Builder method: set the blackjack payout multiple.
    pub fn with_payout(mut self, payout: f64) -> Self {
        self.blackjack_payout = payout;
        self
    }

    /// Builder method: set the root seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_decks == 0 || self.num_decks > MAX_DECKS {
            return Err(ConfigError::InvalidDecks(self.num_decks));
        }
        if self.trials_per_action == 0 {
            return Err(ConfigError::InvalidTrials(self.trials_per_action));
        }
        if !self.blackjack_payout.is_finite() || self.blackjack_payout < 0.0 {
            return Err(ConfigError::InvalidPayout(self.blackjack_payout));
        }
        if self.num_threads == Some(0) {
            return Err(ConfigError::InvalidThreads);
        }
        Ok(())
    }
}

/// Errors from loading or validating an [`EstimatorConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("could not read config: {0}")]
    Io(String),
    /// Config file is not valid JSON for this schema.
    #[error("could not parse config: {0}")]
    Parse(String),
    /// Deck count must be between one and [`MAX_DECKS`].
    #[error("deck count {0} must be between 1 and 1000")]
    InvalidDecks(u32),
    /// Trial count must be at least one.
    #[error("trials per action {0} must be at least 1")]
    InvalidTrials(usize),
    /// Payout must be finite and non-negative.
    #[error("blackjack payout {0} must be a finite non-negative number")]
    InvalidPayout(f64),
    /// Thread count, when set, must be at least one.
    #[error("thread count must be at least 1")]
    InvalidThreads,
    /// The worker pool could not be started.
    #[error("could not build worker pool: {0}")]
    ThreadPool(String),
}
