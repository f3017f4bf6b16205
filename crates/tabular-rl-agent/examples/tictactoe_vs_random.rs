//! Example: learning tic-tac-toe against a random opponent

use tabular_rl_agent::{ExponentialSchedule, RandomAdversary, Trainer, TrainingConfig};
use tabular_rl_env::{SymmetryEncoder, TicTacToe};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = TrainingConfig {
        episodes: 20_000,
        learning_rate: 0.2,
        discount_factor: 0.95,
        epsilon: ExponentialSchedule::reaching(1.0, 0.05, 15_000).into(),
        seed: Some(7),
        log_interval: 2_000,
        ..TrainingConfig::default()
    };

    let mut trainer = Trainer::new(TicTacToe::new(), SymmetryEncoder::new(), config)?
        .with_adversary(RandomAdversary::seeded(8));
    trainer.train()?;

    let report = trainer.evaluate(1_000)?;
    println!(
        "wins {} / losses {} / draws {} (win rate {:.1}%), {} states learned",
        report.wins,
        report.losses,
        report.draws,
        report.win_rate() * 100.0,
        trainer.table().state_count()
    );

    let game = trainer.run_greedy_episode()?;
    println!("Sample game, cells in canonical frame: {:?}", game.actions().collect::<Vec<_>>());
    Ok(())
}
