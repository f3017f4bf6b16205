//! Example: Q-learning agent playing Snake
//!
//! Pass a JSON training config path as the first argument to override the
//! defaults. Set `RUST_LOG=debug` for per-episode output.

use anyhow::Context;
use tabular_rl_agent::{Trainer, TrainingConfig};
use tabular_rl_env::{SnakeConfig, SnakeEncoder, SnakeGame};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args().nth(1) {
        Some(path) => TrainingConfig::from_path(&path)
            .with_context(|| format!("failed to load training config from {path}"))?,
        None => TrainingConfig {
            episodes: 5_000,
            seed: Some(42),
            log_interval: 500,
            ..TrainingConfig::default()
        },
    };

    let game = SnakeGame::new(SnakeConfig {
        board_size: 10,
        seed: config.seed,
    })?;
    let mut trainer = Trainer::new(game, SnakeEncoder::new(), config)?;
    let report = trainer.train()?.clone();

    println!(
        "Trained {} episodes ({} failed), {} Q-entries, final epsilon {:.3}",
        report.episodes_completed,
        report.episodes_failed,
        report.table_entries,
        report.final_epsilon
    );

    let evaluation = trainer.evaluate(100)?;
    println!(
        "Greedy play over {} games: mean reward {:.2}, mean length {:.1} moves, best reward {:.0}",
        evaluation.episodes,
        evaluation.mean_reward,
        evaluation.mean_steps,
        evaluation.best_reward.unwrap_or_default()
    );

    let records = trainer.table().records();
    println!("{}", serde_json::to_string(&records.iter().take(5).collect::<Vec<_>>())?);

    Ok(())
}
