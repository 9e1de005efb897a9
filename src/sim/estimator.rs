//! Monte Carlo estimator for stand / hit / double.
//!
//! For each legal action the estimator runs a fixed number of independent
//! trials. A trial forks the base shoe, rebuilds the player's hand and the
//! dealer's up-card, deals the dealer a hole card, plays the action, lets the
//! dealer finish and settles the bet.
//!
//! ## Seeding
//!
//! A root seed feeds a seeder stream. Before any trial runs, the seeder hands
//! out one seed per trial, action by action in evaluation order. Each trial
//! forks the base shoe with its own seed, so the payoff of trial `i` depends
//! only on the root seed and `i`, never on which worker ran it or when.
//!
//! ## The HIT trial
//!
//! HIT is not an optimal multi-card strategy. The player draws a card, the
//! dealer's hand is finished against a fork of the current shoe, and the
//! trial stops as soon as the player has busted or would win. Otherwise the
//! player draws again. The dealer hand is finished in place, so after the
//! first pass it is already standing and later passes only re-settle.

use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPool;

use super::action::{legal_actions, Action};
use super::config::{ConfigError, EstimatorConfig};
use super::stats::{ActionStats, Recommendation};
use crate::cards::{Hand, Rank, Shoe};
use crate::error::{Result, SimError};
use crate::rules::{play_dealer, settle};

/// Below this many cards a single trial could plausibly drain the shoe.
const LOW_SHOE_WARNING: u32 = 30;

/// Monte Carlo action evaluator.
///
/// Owns the reference shoe. The shoe is only read during [`Estimator::evaluate`];
/// callers update it between evaluations through [`Estimator::shoe_mut`]
/// (e.g. to remove cards that have been dealt).
///
/// # Example
/// ```
/// use bj_advisor::{Action, Estimator, EstimatorConfig, Rank};
///
/// let config = EstimatorConfig::default().with_seed(7).with_trials(500);
/// let estimator = Estimator::new(config).unwrap();
///
/// let player = [Rank::TEN, Rank::new(7).unwrap()];
/// let dealer = [Rank::new(6).unwrap()];
/// let rec = estimator.recommend(&player, &dealer).unwrap();
///
/// assert_eq!(rec.stats(Action::Stand).unwrap().n, 500);
/// ```
#[derive(Debug)]
pub struct Estimator {
    /// Reference shoe that every trial forks from.
    base: Shoe,

    /// Configuration.
    config: EstimatorConfig,

    /// Root seed for trial seeding.
    seed: u64,

    /// Dedicated worker pool when a thread count is configured.
    pool: Option<ThreadPool>,
}

impl Estimator {
    /// Create an estimator with a fresh shoe of `config.num_decks` decks.
    pub fn new(config: EstimatorConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let seed = resolve_seed(&config);
        let base = Shoe::new(config.num_decks, seed);
        Self::build(base, config, seed)
    }

    /// Create an estimator around an existing, possibly depleted, shoe.
    ///
    /// `config.num_decks` is ignored in favour of the shoe's own size.
    pub fn with_shoe(
        shoe: Shoe,
        config: EstimatorConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let seed = resolve_seed(&config);
        Self::build(shoe, config, seed)
    }

    fn build(
        base: Shoe,
        config: EstimatorConfig,
        seed: u64,
    ) -> std::result::Result<Self, ConfigError> {
        let pool = match config.num_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| ConfigError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            base,
            config,
            seed,
            pool,
        })
    }

    /// The reference shoe.
    pub fn shoe(&self) -> &Shoe {
        &self.base
    }

    /// Mutable access to the reference shoe between evaluations.
    pub fn shoe_mut(&mut self) -> &mut Shoe {
        &mut self.base
    }

    /// Active configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Root seed actually in use (drawn from entropy if none was configured).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Evaluate with the configured trial count and payout.
    pub fn recommend(&self, player: &[Rank], dealer_up: &[Rank]) -> Result<Recommendation> {
        self.evaluate(
            player,
            dealer_up,
            self.config.trials_per_action,
            self.config.blackjack_payout,
        )
    }

    /// Simulate every legal action and pick the one with the highest EV.
    ///
    /// # Arguments
    /// * `player` - Player's cards, at least one
    /// * `dealer_up` - Dealer's visible card, exactly one
    /// * `trials_per_action` - Trials per legal action, at least one
    /// * `blackjack_payout` - Multiple of the bet paid on a player natural
    ///
    /// # Errors
    /// - [`SimError::InvalidInput`] for malformed arguments
    /// - [`SimError::Exhausted`] if any trial drains its shoe; the whole call
    ///   fails rather than silently dropping trials
    pub fn evaluate(
        &self,
        player: &[Rank],
        dealer_up: &[Rank],
        trials_per_action: usize,
        blackjack_payout: f64,
    ) -> Result<Recommendation> {
        validate_inputs(player, dealer_up, trials_per_action, blackjack_payout)?;

        if self.base.remaining() < LOW_SHOE_WARNING {
            warn!(
                "evaluating against a shoe with only {} cards left",
                self.base.remaining()
            );
        }

        let start = Instant::now();
        let mut seeder = StdRng::seed_from_u64(self.seed);
        let mut results = Vec::new();

        for action in legal_actions(player.len()) {
            let seeds: Vec<u64> = (0..trials_per_action).map(|_| seeder.gen()).collect();
            let payoffs = self.run_trials(&seeds, action, player, dealer_up, blackjack_payout)?;
            let stats = ActionStats::from_payoffs(&payoffs);

            debug!(
                "{}: ev={:.4} ±{:.4} (win {:.3}, loss {:.3}, push {:.3})",
                action,
                stats.ev,
                stats.std_error(),
                stats.win_rate,
                stats.loss_rate,
                stats.push_rate
            );
            results.push((action, stats));
        }

        let recommendation = Recommendation::from_results(results)
            .ok_or_else(|| SimError::InvalidInput("no legal actions".to_string()))?;

        info!(
            "evaluated {} actions x {} trials in {:.2}s: best {} (ev {:.4})",
            recommendation.results.len(),
            trials_per_action,
            start.elapsed().as_secs_f64(),
            recommendation.best_action,
            recommendation.best_ev
        );

        Ok(recommendation)
    }

    /// Statistics for a single action, independent of whether it is the best.
    pub fn simulate_action(
        &self,
        action: Action,
        player: &[Rank],
        dealer_up: &[Rank],
        trials: usize,
        blackjack_payout: f64,
    ) -> Result<ActionStats> {
        validate_inputs(player, dealer_up, trials, blackjack_payout)?;
        if !action.is_legal(player.len()) {
            return Err(SimError::InvalidInput(format!(
                "{} is not legal with {} cards",
                action,
                player.len()
            )));
        }

        let mut seeder = StdRng::seed_from_u64(self.seed);
        let seeds: Vec<u64> = (0..trials).map(|_| seeder.gen()).collect();
        let payoffs = self.run_trials(&seeds, action, player, dealer_up, blackjack_payout)?;
        Ok(ActionStats::from_payoffs(&payoffs))
    }

    /// Run one trial per seed in parallel, returning payoffs in seed order.
    fn run_trials(
        &self,
        seeds: &[u64],
        action: Action,
        player: &[Rank],
        dealer_up: &[Rank],
        blackjack_payout: f64,
    ) -> Result<Vec<f64>> {
        let base = &self.base;
        let run = || {
            seeds
                .par_iter()
                .map(|&seed| run_trial(base, seed, action, player, dealer_up, blackjack_payout))
                .collect::<Result<Vec<f64>>>()
        };

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

fn resolve_seed(config: &EstimatorConfig) -> u64 {
    config
        .seed
        .unwrap_or_else(|| StdRng::from_entropy().gen::<u64>())
}

fn validate_inputs(
    player: &[Rank],
    dealer_up: &[Rank],
    trials: usize,
    blackjack_payout: f64,
) -> Result<()> {
    if player.is_empty() {
        return Err(SimError::InvalidInput(
            "player hand must hold at least one card".to_string(),
        ));
    }
    if dealer_up.len() != 1 {
        return Err(SimError::InvalidInput(format!(
            "dealer must show exactly one card, got {}",
            dealer_up.len()
        )));
    }
    if trials == 0 {
        return Err(SimError::InvalidInput(
            "trials per action must be positive".to_string(),
        ));
    }
    if !blackjack_payout.is_finite() || blackjack_payout < 0.0 {
        return Err(SimError::InvalidInput(format!(
            "blackjack payout {} must be a finite non-negative number",
            blackjack_payout
        )));
    }
    Ok(())
}

/// Play one trial of `action` to a settled payoff.
fn run_trial(
    base: &Shoe,
    seed: u64,
    action: Action,
    player: &[Rank],
    dealer_up: &[Rank],
    blackjack_payout: f64,
) -> Result<f64> {
    let mut shoe = base.fork_with_seed(seed);
    let mut player_hand = Hand::from_ranks(player);
    let mut dealer_hand = Hand::from_ranks(dealer_up);
    dealer_hand.add_card(shoe.draw()?);

    resolve_action(
        &mut shoe,
        action,
        &mut player_hand,
        &mut dealer_hand,
        blackjack_payout,
    )
}

/// Play `action` for the player, finish the dealer and settle.
fn resolve_action(
    shoe: &mut Shoe,
    action: Action,
    player: &mut Hand,
    dealer: &mut Hand,
    blackjack_payout: f64,
) -> Result<f64> {
    match action {
        Action::Stand => {}
        Action::Double => {
            player.doubled = true;
            player.add_card(shoe.draw()?);
        }
        Action::Hit => return hit_until_resolved(shoe, player, dealer, blackjack_payout),
    }

    play_dealer(shoe, dealer)?;
    Ok(settle(player, dealer, blackjack_payout))
}

/// Draw for the player until they bust or are ahead of the finished dealer.
fn hit_until_resolved(
    shoe: &mut Shoe,
    player: &mut Hand,
    dealer: &mut Hand,
    blackjack_payout: f64,
) -> Result<f64> {
    loop {
        player.add_card(shoe.draw()?);

        let mut lookahead = shoe.fork();
        play_dealer(&mut lookahead, dealer)?;

        let payoff = settle(player, dealer, blackjack_payout);
        if player.is_bust() || payoff > 0.0 {
            return Ok(payoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(tokens: &[u8]) -> Vec<Rank> {
        tokens.iter().map(|&t| Rank::new(t).unwrap()).collect()
    }

    fn estimator(seed: u64) -> Estimator {
        Estimator::new(EstimatorConfig::default().with_seed(seed)).unwrap()
    }

    /// One-deck shoe holding only the given tokens (each at most 4 times).
    fn stacked_shoe(keep: &[u8]) -> Shoe {
        let mut shoe = Shoe::new(1, 0);
        for rank in Rank::ALL {
            let keep_count = keep.iter().filter(|&&t| t == rank.token()).count() as u32;
            for _ in keep_count..4 {
                shoe.remove(rank).unwrap();
            }
        }
        shoe
    }

    #[test]
    fn test_invalid_inputs() {
        let est = estimator(1);
        let dealer = ranks(&[6]);
        assert!(matches!(
            est.evaluate(&[], &dealer, 10, 1.5),
            Err(SimError::InvalidInput(_))
        ));
        assert!(matches!(
            est.evaluate(&ranks(&[10, 7]), &[], 10, 1.5),
            Err(SimError::InvalidInput(_))
        ));
        assert!(matches!(
            est.evaluate(&ranks(&[10, 7]), &ranks(&[6, 10]), 10, 1.5),
            Err(SimError::InvalidInput(_))
        ));
        assert!(matches!(
            est.evaluate(&ranks(&[10, 7]), &dealer, 0, 1.5),
            Err(SimError::InvalidInput(_))
        ));
        assert!(matches!(
            est.evaluate(&ranks(&[1, 10]), &dealer, 10, -1.5),
            Err(SimError::InvalidInput(_))
        ));
        assert!(matches!(
            est.evaluate(&ranks(&[1, 10]), &dealer, 10, f64::INFINITY),
            Err(SimError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_hard_17_vs_6_all_actions() {
        let est = estimator(42);
        let rec = est.evaluate(&ranks(&[10, 7]), &ranks(&[6]), 2_000, 1.5).unwrap();

        assert_eq!(rec.results.len(), 3);
        for action in Action::ALL {
            let stats = rec.stats(action).unwrap();
            assert_eq!(stats.n, 2_000);
            let total = stats.win_rate + stats.loss_rate + stats.push_rate;
            assert!((total - 1.0).abs() < 1e-9);
        }
        let best = rec.stats(rec.best_action).unwrap();
        assert_eq!(best.ev, rec.best_ev);
        assert!(rec.results.values().all(|s| s.ev <= rec.best_ev));
    }

    #[test]
    fn test_five_card_hand_cannot_hit() {
        let est = estimator(3);
        let rec = est.evaluate(&ranks(&[2, 2, 2, 2, 2]), &ranks(&[9]), 200, 1.5).unwrap();
        assert_eq!(rec.results.len(), 1);
        assert!(rec.stats(Action::Hit).is_none());
        assert!(rec.stats(Action::Double).is_none());
        assert_eq!(rec.best_action, Action::Stand);
    }

    #[test]
    fn test_three_card_hand_cannot_double() {
        let est = estimator(3);
        let rec = est.evaluate(&ranks(&[2, 3, 4]), &ranks(&[9]), 200, 1.5).unwrap();
        assert!(rec.stats(Action::Double).is_none());
        assert!(rec.stats(Action::Hit).is_some());
    }

    #[test]
    fn test_natural_stand_pays_or_pushes() {
        let est = estimator(11);
        let player = ranks(&[1, 10]);
        let dealer = ranks(&[6]);

        // A 6 up-card can never become a dealer natural.
        let stats = est.simulate_action(Action::Stand, &player, &dealer, 1_000, 1.5).unwrap();
        assert_eq!(stats.ev, 1.5);
        assert_eq!(stats.win_rate, 1.0);

        // Against an ace the dealer sometimes has a natural too.
        let dealer_ace = ranks(&[1]);
        for seed in 0..500u64 {
            let payoff =
                run_trial(est.shoe(), seed, Action::Stand, &player, &dealer_ace, 1.5).unwrap();
            assert!(payoff == 0.0 || payoff == 1.5, "payoff {}", payoff);
        }
        let stats = est.simulate_action(Action::Stand, &player, &dealer_ace, 2_000, 1.5).unwrap();
        assert_eq!(stats.loss_rate, 0.0);
        assert!(stats.push_rate > 0.0);
        assert!((stats.ev - 1.5 * stats.win_rate).abs() < 1e-9);
    }

    #[test]
    fn test_double_risks_twice_the_bet() {
        let est = estimator(5);
        let player = ranks(&[5, 6]);
        let dealer = ranks(&[10]);
        for seed in 0..500u64 {
            let payoff =
                run_trial(est.shoe(), seed, Action::Double, &player, &dealer, 1.5).unwrap();
            assert!(
                payoff == 2.0 || payoff == -2.0 || payoff == 0.0,
                "payoff {}",
                payoff
            );
        }
    }

    #[test]
    fn test_doubled_natural_is_paid_as_double() {
        // One-card hand doubled onto a ten is 21 but not a natural.
        let shoe = stacked_shoe(&[10, 10, 10, 10]);
        let payoff = run_trial(&shoe, 9, Action::Double, &ranks(&[1]), &ranks(&[10]), 1.5).unwrap();
        // Dealer 10+10 = 20 stands, player doubled 21 wins 2 units.
        assert_eq!(payoff, 2.0);
    }

    #[test]
    fn test_double_takes_exactly_one_card() {
        let mut shoe = stacked_shoe(&[10, 10, 10, 10]);
        let mut player = Hand::from_ranks(&ranks(&[5, 6]));
        let mut dealer = Hand::from_ranks(&ranks(&[10, 10]));

        let payoff =
            resolve_action(&mut shoe, Action::Double, &mut player, &mut dealer, 1.5).unwrap();

        assert!(player.doubled);
        assert_eq!(player.len(), 3);
        assert_eq!(player.best_value(), 21);
        assert_eq!(shoe.remaining(), 3);
        assert_eq!(dealer.len(), 2);
        assert_eq!(payoff, 2.0);
    }

    #[test]
    fn test_double_stops_after_one_card_on_low_total() {
        // 2 + 2 + 2 = 6 would keep a hitting hand drawing; a double does not.
        let mut shoe = stacked_shoe(&[2, 2, 2, 2]);
        let mut player = Hand::from_ranks(&ranks(&[2, 2]));
        let mut dealer = Hand::from_ranks(&ranks(&[10, 8]));

        let payoff =
            resolve_action(&mut shoe, Action::Double, &mut player, &mut dealer, 1.5).unwrap();

        assert_eq!(player.len(), 3);
        assert_eq!(shoe.remaining(), 3);
        assert_eq!(payoff, -2.0);
    }

    #[test]
    fn test_hit_never_pushes() {
        let est = estimator(8);
        let stats = est
            .simulate_action(Action::Hit, &ranks(&[10, 2]), &ranks(&[10]), 2_000, 1.5)
            .unwrap();
        assert_eq!(stats.push_rate, 0.0);
        assert!((stats.ev - (stats.win_rate - stats.loss_rate)).abs() < 1e-9);
    }

    #[test]
    fn test_hit_draws_until_ahead() {
        let mut shoe = stacked_shoe(&[2, 2, 2, 2]);
        let mut player = Hand::from_ranks(&ranks(&[10, 2]));
        let mut dealer = Hand::from_ranks(&ranks(&[10, 9]));

        let payoff = hit_until_resolved(&mut shoe, &mut player, &mut dealer, 1.5).unwrap();

        // 12 -> 14 -> 16 -> 18 -> 20 beats the dealer's 19.
        assert_eq!(payoff, 1.0);
        assert_eq!(player.len(), 6);
        assert_eq!(dealer.len(), 2);
        assert_eq!(shoe.remaining(), 0);
    }

    #[test]
    fn test_hit_finishes_dealer_once_in_place() {
        let mut shoe = stacked_shoe(&[5, 5, 5, 5]);
        let mut player = Hand::from_ranks(&ranks(&[10, 2]));
        let mut dealer = Hand::from_ranks(&ranks(&[10, 6]));

        let payoff = hit_until_resolved(&mut shoe, &mut player, &mut dealer, 1.5).unwrap();

        // Player 17 vs dealer 21 (drawn from the lookahead fork), then busts on 22.
        assert_eq!(payoff, -1.0);
        assert_eq!(dealer.best_value(), 21);
        assert_eq!(dealer.len(), 3);
        assert_eq!(player.best_value(), 22);
        // The lookahead card came from a fork, not from the trial shoe.
        assert_eq!(shoe.remaining(), 2);
    }

    #[test]
    fn test_oversized_shoe_rejected() {
        let config = EstimatorConfig::default().with_decks(100_000_000).with_seed(1);
        assert!(matches!(
            Estimator::new(config),
            Err(ConfigError::InvalidDecks(100_000_000))
        ));
    }

    #[test]
    fn test_exhausted_shoe_is_fatal() {
        let shoe = stacked_shoe(&[2, 2]);
        let est = Estimator::with_shoe(shoe, EstimatorConfig::default().with_seed(1)).unwrap();
        let result = est.evaluate(&ranks(&[10, 6]), &ranks(&[10]), 10, 1.5);
        assert_eq!(result, Err(SimError::Exhausted));
    }

    #[test]
    fn test_reproducible_across_thread_counts() {
        let player = ranks(&[1, 6]);
        let dealer = ranks(&[9]);

        let single = Estimator::new(EstimatorConfig::default().with_seed(77).with_threads(1))
            .unwrap()
            .evaluate(&player, &dealer, 1_000, 1.5)
            .unwrap();
        let multi = Estimator::new(EstimatorConfig::default().with_seed(77).with_threads(4))
            .unwrap()
            .evaluate(&player, &dealer, 1_000, 1.5)
            .unwrap();
        let global = estimator(77).evaluate(&player, &dealer, 1_000, 1.5).unwrap();

        assert_eq!(single, multi);
        assert_eq!(single, global);
    }

    #[test]
    fn test_different_seeds_differ() {
        let player = ranks(&[10, 6]);
        let dealer = ranks(&[10]);
        let a = estimator(1).evaluate(&player, &dealer, 500, 1.5).unwrap();
        let b = estimator(2).evaluate(&player, &dealer, 500, 1.5).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_base_shoe_untouched() {
        let est = estimator(4);
        let before = est.shoe().counts();
        est.evaluate(&ranks(&[9, 7]), &ranks(&[8]), 500, 1.5).unwrap();
        assert_eq!(est.shoe().counts(), before);
    }

    #[test]
    fn test_stand_ev_sanity() {
        let est = estimator(2024);
        let strong = est
            .simulate_action(Action::Stand, &ranks(&[10, 13]), &ranks(&[6]), 4_000, 1.5)
            .unwrap();
        assert!(strong.ev > 0.4, "stand 20 vs 6 ev {}", strong.ev);

        let weak = est
            .simulate_action(Action::Stand, &ranks(&[10, 2]), &ranks(&[10]), 4_000, 1.5)
            .unwrap();
        assert!(weak.ev < -0.3, "stand 12 vs 10 ev {}", weak.ev);
    }

    #[test]
    fn test_simulate_illegal_action() {
        let est = estimator(1);
        assert!(matches!(
            est.simulate_action(Action::Double, &ranks(&[2, 3, 4]), &ranks(&[6]), 10, 1.5),
            Err(SimError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_depleted_shoe_shifts_ev() {
        // With no ten-valued cards left a dealer 6 rarely busts, so standing
        // on 12 gets worse.
        let mut rich = Shoe::new(1, 0);
        for token in 10..=13u8 {
            for _ in 0..4 {
                rich.remove(Rank::new(token).unwrap()).unwrap();
            }
        }
        let no_tens = Estimator::with_shoe(rich, EstimatorConfig::default().with_seed(6)).unwrap();
        let full = estimator(6);

        let player = ranks(&[10, 2]);
        let dealer = ranks(&[6]);
        let depleted_ev = no_tens
            .simulate_action(Action::Stand, &player, &dealer, 4_000, 1.5)
            .unwrap()
            .ev;
        let full_ev = full
            .simulate_action(Action::Stand, &player, &dealer, 4_000, 1.5)
            .unwrap()
            .ev;
        assert!(depleted_ev < full_ev, "{} vs {}", depleted_ev, full_ev);
    }
}
