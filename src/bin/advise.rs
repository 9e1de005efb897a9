//! Command-line blackjack advisor.
//!
//! Usage:
//!   cargo run --release --bin advise -- --player A,7 --dealer 9 [OPTIONS]
//!   cargo run --release --bin advise -- --batch spots.json [OPTIONS]
//!
//! Batch files hold a JSON array of spots:
//! `[{ "player": ["10", "6"], "dealer": "10" }, ...]`

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;

use bj_advisor::{Estimator, EstimatorConfig, Rank, Recommendation};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(
    name = "advise",
    about = "Estimate the EV of stand, hit and double for a blackjack hand"
)]
struct Args {
    /// Player cards, comma separated (A, 2-10, J, Q, K or 1-13)
    #[arg(long, value_delimiter = ',')]
    player: Vec<String>,

    /// Dealer up-card
    #[arg(long)]
    dealer: Option<String>,

    /// Evaluate every spot in a JSON file instead of a single hand
    #[arg(long, conflicts_with_all = ["player", "dealer"])]
    batch: Option<PathBuf>,

    /// Configuration JSON file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trials per action
    #[arg(long)]
    trials: Option<usize>,

    /// Number of decks in the shoe
    #[arg(long)]
    decks: Option<u32>,

    /// Blackjack payout multiple (1.5 = 3:2, 1.2 = 6:5)
    #[arg(long)]
    payout: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Cards already dealt from the shoe, comma separated
    #[arg(long, value_delimiter = ',')]
    removed: Vec<String>,

    /// Print results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Deserialize)]
struct Spot {
    player: Vec<String>,
    dealer: String,
}

#[derive(Serialize)]
struct SpotResult {
    player: Vec<String>,
    dealer: String,
    recommendation: Recommendation,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = build_config(args)?;
    let mut estimator = Estimator::new(config)?;
    info!(
        "{} decks, {} trials per action, payout {}, seed {}",
        estimator.config().num_decks,
        estimator.config().trials_per_action,
        estimator.config().blackjack_payout,
        estimator.seed()
    );

    if !args.removed.is_empty() {
        let removed = parse_ranks(&args.removed)?;
        estimator.shoe_mut().remove_all(&removed)?;
        info!(
            "removed {} cards, {} left ({:.1}% of the shoe)",
            removed.len(),
            estimator.shoe().remaining(),
            estimator.shoe().remaining_ratio() * 100.0
        );
    }

    match &args.batch {
        Some(path) => run_batch(&estimator, path, args.json),
        None => run_single(&estimator, args),
    }
}

fn build_config(args: &Args) -> Result<EstimatorConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            EstimatorConfig::from_json_file(path)?
        }
        None => EstimatorConfig::default(),
    };

    if let Some(trials) = args.trials {
        config = config.with_trials(trials);
    }
    if let Some(decks) = args.decks {
        config = config.with_decks(decks);
    }
    if let Some(payout) = args.payout {
        config = config.with_payout(payout);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }

    config.validate()?;
    Ok(config)
}

fn run_single(estimator: &Estimator, args: &Args) -> Result<(), Box<dyn Error>> {
    let dealer_label = args
        .dealer
        .as_deref()
        .ok_or("--dealer is required unless --batch is given")?;
    if args.player.is_empty() {
        return Err("--player is required unless --batch is given".into());
    }

    let player = parse_ranks(&args.player)?;
    let dealer = [parse_rank(dealer_label)?];
    let recommendation = estimator.recommend(&player, &dealer)?;

    if args.json {
        println!("{}", recommendation.to_json()?);
    } else {
        println!(
            "Player {} vs dealer {}",
            args.player.join(" "),
            dealer_label
        );
        print_table(&recommendation);
    }
    Ok(())
}

fn run_batch(estimator: &Estimator, path: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    let spots: Vec<Spot> = serde_json::from_str(&content)?;
    info!("evaluating {} spots from {}", spots.len(), path.display());

    let pb = ProgressBar::new(spots.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "{bar:40} {pos}/{len} spots [{elapsed_precise}]",
    )?);

    let start = Instant::now();
    let mut results = Vec::with_capacity(spots.len());
    for spot in spots {
        let player = parse_ranks(&spot.player)?;
        let dealer = [parse_rank(&spot.dealer)?];
        let recommendation = estimator.recommend(&player, &dealer)?;
        results.push(SpotResult {
            player: spot.player,
            dealer: spot.dealer,
            recommendation,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();
    info!(
        "batch finished in {:.2}s",
        start.elapsed().as_secs_f64()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!(
                "{:<12} vs {:<3} -> {:<6} ev {:+.4}",
                result.player.join(" "),
                result.dealer,
                result.recommendation.best_action,
                result.recommendation.best_ev
            );
        }
    }
    Ok(())
}

fn print_table(rec: &Recommendation) {
    println!(
        "{:<8} {:>9} {:>9} {:>7} {:>7} {:>7}",
        "action", "ev", "±se", "win", "loss", "push"
    );
    for (action, stats) in &rec.results {
        let marker = if *action == rec.best_action { "*" } else { "" };
        println!(
            "{:<8} {:>+9.4} {:>9.4} {:>7.3} {:>7.3} {:>7.3}",
            format!("{}{}", action, marker),
            stats.ev,
            stats.std_error(),
            stats.win_rate,
            stats.loss_rate,
            stats.push_rate
        );
    }
}

fn parse_ranks(labels: &[String]) -> Result<Vec<Rank>, Box<dyn Error>> {
    labels.iter().map(|l| parse_rank(l)).collect()
}

/// Parse a card label: `A`, `2`-`10`, `T`, `J`, `Q`, `K` or a numeric token 1-13.
fn parse_rank(label: &str) -> Result<Rank, Box<dyn Error>> {
    let token = match label.trim().to_ascii_uppercase().as_str() {
        "A" => 1,
        "T" => 10,
        "J" => 11,
        "Q" => 12,
        "K" => 13,
        other => other
            .parse::<u8>()
            .map_err(|_| format!("unrecognised card '{}'", label))?,
    };
    Ok(Rank::new(token)?)
}
