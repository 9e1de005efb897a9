//! Player actions the estimator can evaluate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Most cards a player may hold and still hit.
pub const MAX_HIT_CARDS: usize = 5;

/// A candidate player decision.
///
/// Variant order is the evaluation order and the tie-break order when two
/// actions have exactly the same EV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Keep the current hand.
    Stand,
    /// Take cards (see the estimator for the simulated stopping rule).
    Hit,
    /// Double the bet and take exactly one card.
    Double,
}

impl Action {
    /// Every action in evaluation order.
    pub const ALL: [Action; 3] = [Action::Stand, Action::Hit, Action::Double];

    /// Upper-case wire name (`STAND`, `HIT`, `DOUBLE`).
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Stand => "STAND",
            Action::Hit => "HIT",
            Action::Double => "DOUBLE",
        }
    }

    /// Whether this action is allowed for a player holding `num_cards`.
    pub fn is_legal(self, num_cards: usize) -> bool {
        match self {
            Action::Stand => true,
            Action::Hit => num_cards < MAX_HIT_CARDS,
            Action::Double => num_cards == 2,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal actions for a player holding `num_cards`, in evaluation order.
pub fn legal_actions(num_cards: usize) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|a| a.is_legal(num_cards))
        .collect()
}
