use std::sync::atomic::AtomicBool;

use tabular_rl_agent::{
    evaluate, run_training, Adversary, BoxedAdversary, ExponentialSchedule, FrozenQAdversary,
    HeuristicAdversary, RandomAdversary, RolloutOptions, Seat, Trainer, TrainingConfig,
};
use tabular_rl_core::RLError;
use tabular_rl_env::{Board, SymmetryEncoder, TicTacToe};

fn config(episodes: usize, seat: Seat) -> TrainingConfig {
    TrainingConfig {
        episodes,
        learning_rate: 0.2,
        discount_factor: 0.95,
        epsilon: ExponentialSchedule::reaching(1.0, 0.05, episodes * 4 / 5).into(),
        learner_seat: seat,
        seed: Some(11),
        log_interval: 0,
        ..TrainingConfig::default()
    }
}

#[test]
fn test_beats_random_opponent() {
    let mut trainer = Trainer::new(
        TicTacToe::new(),
        SymmetryEncoder::new(),
        config(10_000, Seat::First),
    )
    .unwrap()
    .with_adversary(RandomAdversary::seeded(5));
    trainer.train().unwrap();

    let report = trainer.evaluate(1_000).unwrap();
    assert_eq!(report.episodes, 1_000);
    assert_eq!(report.truncated, 0);
    assert!(report.win_rate() > 0.6, "win rate {}", report.win_rate());
}

#[test]
fn test_learns_from_second_seat() {
    let mut trainer = Trainer::new(
        TicTacToe::new(),
        SymmetryEncoder::new(),
        config(10_000, Seat::Second),
    )
    .unwrap()
    .with_adversary(RandomAdversary::seeded(6));
    trainer.train().unwrap();

    let report = trainer.evaluate(1_000).unwrap();
    // An untrained second player loses more than half of its games
    let loss_rate = report.losses as f64 / report.episodes as f64;
    assert!(loss_rate < 0.3, "loss rate {loss_rate}");
}

#[test]
fn test_second_seat_without_adversary_fails() {
    let mut trainer =
        Trainer::new(TicTacToe::new(), SymmetryEncoder::new(), config(10, Seat::Second)).unwrap();
    assert!(matches!(trainer.train(), Err(RLError::Config(_))));
}

#[test]
fn test_frozen_learner_as_opponent() {
    let adversary: BoxedAdversary<TicTacToe> = Box::new(RandomAdversary::seeded(2));
    let first = run_training(
        TicTacToe::new(),
        SymmetryEncoder::new(),
        config(2_000, Seat::First),
        Some(adversary),
    )
    .unwrap();
    assert_eq!(first.report.episodes_completed, 2_000);

    let frozen = FrozenQAdversary::new(SymmetryEncoder::new(), first.table);
    let mut trainer = Trainer::new(
        TicTacToe::new(),
        SymmetryEncoder::new(),
        config(2_000, Seat::Second),
    )
    .unwrap()
    .with_adversary(frozen);
    trainer.train().unwrap();

    // Both sides greedy and deterministic: every evaluation game is the same
    let report = trainer.evaluate(5).unwrap();
    assert!([0, 5].contains(&report.wins));
    assert!([0, 5].contains(&report.losses));
    assert!([0, 5].contains(&report.draws));
}

#[test]
fn test_heuristic_opponent_blocks_immediate_wins() {
    // Takes a winning cell when one exists, otherwise plays randomly
    let finisher = HeuristicAdversary::seeded(
        |board: &Board, legal: &[usize]| {
            let mover = board.to_move();
            legal.iter().copied().find(|&cell| {
                let mut game = TicTacToe::new();
                tabular_rl_core::Environment::step(&mut game, board, &cell)
                    .map(|step| step.done && step.position.winner() == Some(mover))
                    .unwrap_or(false)
            })
        },
        8,
    );
    let mut trainer = Trainer::new(
        TicTacToe::new(),
        SymmetryEncoder::new(),
        config(3_000, Seat::First),
    )
    .unwrap()
    .with_adversary(finisher);
    let report = trainer.train().unwrap();
    assert_eq!(report.episodes_completed, 3_000);
    assert_eq!(report.wins + report.losses + report.draws, 3_000);
}

#[test]
fn test_free_evaluate_with_borrowed_adversary() {
    let mut trainer = Trainer::new(
        TicTacToe::new(),
        SymmetryEncoder::new(),
        config(500, Seat::First),
    )
    .unwrap()
    .with_adversary(RandomAdversary::seeded(3));
    trainer.train_until(&AtomicBool::new(false)).unwrap();

    let mut random = RandomAdversary::seeded(4);
    let opponent: &mut dyn Adversary<Board, usize> = &mut random;
    let report = evaluate(
        &mut TicTacToe::new(),
        &SymmetryEncoder::new(),
        trainer.table(),
        Some(opponent),
        &RolloutOptions::default(),
        50,
    )
    .unwrap();
    assert_eq!(report.episodes, 50);
    assert_eq!(report.wins + report.losses + report.draws, 50);
}
