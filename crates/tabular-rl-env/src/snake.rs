//! Snake on a square board with a compact local-view encoding

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tabular_rl_core::{ensure_legal, Environment, RLError, Result, StateEncoder, Step};
use tracing::debug;

/// Board cell as (row, column); row 0 is the top
pub type Cell = (i32, i32);

const MIN_BOARD_SIZE: usize = 5;
const CRASH_REWARD: f64 = -10.0;
const FRUIT_REWARD: f64 = 10.0;

/// Absolute direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Toward row 0
    Up,
    /// Away from row 0
    Down,
    /// Toward column 0
    Left,
    /// Away from column 0
    Right,
}

impl Heading {
    /// Heading after turning
    #[must_use]
    pub fn turn(self, turn: Turn) -> Self {
        match (self, turn) {
            (heading, Turn::Forward) => heading,
            (Heading::Up, Turn::Left) | (Heading::Down, Turn::Right) => Heading::Left,
            (Heading::Up, Turn::Right) | (Heading::Down, Turn::Left) => Heading::Right,
            (Heading::Left, Turn::Left) | (Heading::Right, Turn::Right) => Heading::Down,
            (Heading::Left, Turn::Right) | (Heading::Right, Turn::Left) => Heading::Up,
        }
    }

    fn delta(self) -> Cell {
        match self {
            Heading::Up => (-1, 0),
            Heading::Down => (1, 0),
            Heading::Left => (0, -1),
            Heading::Right => (0, 1),
        }
    }

    fn advance(self, (row, col): Cell) -> Cell {
        let (dr, dc) = self.delta();
        (row + dr, col + dc)
    }
}

/// Move relative to the snake's heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    /// Keep going
    Forward,
    /// Turn to the snake's left
    Left,
    /// Turn to the snake's right
    Right,
}

/// Snake game position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnakePosition {
    /// Body cells from tail to head
    pub body: VecDeque<Cell>,
    /// Direction of the last move
    pub heading: Heading,
    /// Fruit cell; `None` once the snake fills the board
    pub fruit: Option<Cell>,
    /// Side length of the board
    pub board_size: usize,
    /// Whether the snake hit a wall or itself
    pub crashed: bool,
}

impl SnakePosition {
    /// Head cell, `None` for a snake without a body
    #[must_use]
    pub fn head(&self) -> Option<Cell> {
        self.body.back().copied()
    }

    /// Snake length
    #[must_use]
    pub fn score(&self) -> usize {
        self.body.len()
    }

    /// Whether the game is over
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.crashed || self.fruit.is_none()
    }

    /// Whether `cell` lies on the board
    #[must_use]
    pub fn on_board(&self, (row, col): Cell) -> bool {
        let size = i32::try_from(self.board_size).unwrap_or(i32::MAX);
        (0..size).contains(&row) && (0..size).contains(&col)
    }

    /// Whether moving into `cell` right now would crash, judged against the current body
    #[must_use]
    pub fn is_danger(&self, cell: Cell) -> bool {
        !self.on_board(cell) || self.body.contains(&cell)
    }

    fn free_cells(&self) -> Vec<Cell> {
        let size = i32::try_from(self.board_size).unwrap_or(i32::MAX);
        (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .filter(|cell| !self.body.contains(cell))
            .collect()
    }
}

/// Snake game configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Side length of the square board, at least 5
    pub board_size: usize,
    /// Seed for fruit placement; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            board_size: 10,
            seed: None,
        }
    }
}

/// Single-player snake.
///
/// The snake starts along the top row heading right with its head at
/// (0, 2). Crashing costs 10 and ends the game, eating fruit earns 10 and
/// grows the snake by one cell; every other move earns nothing.
#[derive(Debug, Clone)]
pub struct SnakeGame {
    board_size: usize,
    rng: StdRng,
}

impl SnakeGame {
    /// Create a game
    pub fn new(config: SnakeConfig) -> Result<Self> {
        if config.board_size < MIN_BOARD_SIZE {
            return Err(RLError::Config(format!(
                "board size {} is below the minimum of {MIN_BOARD_SIZE}",
                config.board_size
            )));
        }
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(Self {
            board_size: config.board_size,
            rng,
        })
    }

    /// Side length of the board
    #[must_use]
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    fn place_fruit(&mut self, position: &SnakePosition) -> Option<Cell> {
        let free = position.free_cells();
        if free.is_empty() {
            None
        } else {
            Some(free[self.rng.gen_range(0..free.len())])
        }
    }
}

impl Environment for SnakeGame {
    type Position = SnakePosition;
    type Action = Turn;

    fn reset(&mut self) -> Result<SnakePosition> {
        let mut position = SnakePosition {
            body: VecDeque::from(vec![(0, 0), (0, 1), (0, 2)]),
            heading: Heading::Right,
            fruit: None,
            board_size: self.board_size,
            crashed: false,
        };
        position.fruit = self.place_fruit(&position);
        Ok(position)
    }

    fn legal_actions(&self, position: &SnakePosition) -> Vec<Turn> {
        if position.is_over() {
            Vec::new()
        } else {
            vec![Turn::Forward, Turn::Left, Turn::Right]
        }
    }

    fn step(&mut self, position: &SnakePosition, action: &Turn) -> Result<Step<SnakePosition>> {
        ensure_legal(action, &self.legal_actions(position))?;

        let mut next = position.clone();
        next.heading = position.heading.turn(*action);
        let head = position
            .head()
            .map(|cell| next.heading.advance(cell))
            .ok_or_else(|| RLError::Environment("snake has no body".to_string()))?;
        let tail = next
            .body
            .pop_front()
            .ok_or_else(|| RLError::Environment("snake has no body".to_string()))?;

        if !next.on_board(head) || next.body.contains(&head) {
            next.body.push_back(head);
            next.crashed = true;
            return Ok(Step::terminal(next, CRASH_REWARD));
        }

        next.body.push_back(head);
        if Some(head) != position.fruit {
            return Ok(Step::running(next, 0.0));
        }

        next.body.push_front(tail);
        next.fruit = self.place_fruit(&next);
        if next.fruit.is_none() {
            debug!(length = next.score(), "snake filled the board");
            Ok(Step::terminal(next, FRUIT_REWARD))
        } else {
            Ok(Step::running(next, FRUIT_REWARD))
        }
    }
}

/// Eleven-bit local view of a snake position.
///
/// From the most significant bit down: danger straight ahead, to the left
/// and to the right; fruit above, below, left and right of the head; then the
/// heading one-hot as up, down, left, right.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeEncoder;

impl SnakeEncoder {
    /// Create the encoder
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StateEncoder<SnakePosition, Turn> for SnakeEncoder {
    type State = u16;

    fn encode(&self, position: &SnakePosition) -> Result<u16> {
        let head = position
            .head()
            .ok_or_else(|| RLError::Encoding("snake has no body".to_string()))?;
        let heading = position.heading;

        let mut bits = [false; 11];
        for (slot, turn) in [Turn::Forward, Turn::Left, Turn::Right].into_iter().enumerate() {
            bits[slot] = position.is_danger(heading.turn(turn).advance(head));
        }
        if let Some((fruit_row, fruit_col)) = position.fruit {
            bits[3] = head.0 > fruit_row;
            bits[4] = head.0 < fruit_row;
            bits[5] = head.1 > fruit_col;
            bits[6] = head.1 < fruit_col;
        }
        let heading_slot = match heading {
            Heading::Up => 7,
            Heading::Down => 8,
            Heading::Left => 9,
            Heading::Right => 10,
        };
        bits[heading_slot] = true;

        Ok(bits
            .iter()
            .fold(0u16, |code, &bit| (code << 1) | u16::from(bit)))
    }
}
