//! Payoff aggregation and the recommendation returned to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::action::Action;

/// Summary statistics over the simulated payoffs of one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStats {
    /// Number of trials.
    pub n: usize,
    /// Mean payoff per unit bet.
    pub ev: f64,
    /// Fraction of trials with a positive payoff.
    pub win_rate: f64,
    /// Fraction of trials with a negative payoff.
    pub loss_rate: f64,
    /// Fraction of trials that pushed.
    pub push_rate: f64,
    /// Population standard deviation of the payoff.
    pub stddev: f64,
}

impl ActionStats {
    /// Aggregate a slice of payoffs.
    ///
    /// The reduction runs in slice order, so the result only depends on the
    /// payoffs and their order, not on how they were produced.
    pub fn from_payoffs(payoffs: &[f64]) -> Self {
        let n = payoffs.len();
        if n == 0 {
            return Self {
                n: 0,
                ev: 0.0,
                win_rate: 0.0,
                loss_rate: 0.0,
                push_rate: 0.0,
                stddev: 0.0,
            };
        }

        let count = n as f64;
        let mean = payoffs.iter().sum::<f64>() / count;
        let variance = payoffs.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / count;

        let wins = payoffs.iter().filter(|&&p| p > 0.0).count();
        let losses = payoffs.iter().filter(|&&p| p < 0.0).count();
        let pushes = n - wins - losses;

        Self {
            n,
            ev: mean,
            win_rate: wins as f64 / count,
            loss_rate: losses as f64 / count,
            push_rate: pushes as f64 / count,
            stddev: variance.sqrt(),
        }
    }

    /// Standard error of the EV estimate.
    pub fn std_error(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.stddev / (self.n as f64).sqrt()
        }
    }
}

/// Statistics for every legal action plus the best one.
///
/// Serializes as
/// `{ "results": { "STAND": {..}, .. }, "best_action": "STAND", "best_ev": 0.1 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Per-action statistics, keyed in evaluation order.
    pub results: BTreeMap<Action, ActionStats>,
    /// Action with the highest EV.
    pub best_action: Action,
    /// EV of `best_action`.
    pub best_ev: f64,
}

impl Recommendation {
    /// Build from per-action results given in evaluation order.
    ///
    /// Returns `None` if `results` is empty. On an exact EV tie the earlier
    /// action wins.
    pub fn from_results(results: Vec<(Action, ActionStats)>) -> Option<Self> {
        let (best_action, best_ev) =
            results
                .iter()
                .fold(None::<(Action, f64)>, |best, (action, stats)| match best {
                    Some((_, ev)) if stats.ev <= ev => best,
                    _ => Some((*action, stats.ev)),
                })?;

        Some(Self {
            results: results.into_iter().collect(),
            best_action,
            best_ev,
        })
    }

    /// Statistics for one action, if it was legal.
    pub fn stats(&self, action: Action) -> Option<&ActionStats> {
        self.results.get(&action)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
