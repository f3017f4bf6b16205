//! Tic-tac-toe and its symmetry-folding encoder

use std::fmt;

use serde::{Deserialize, Serialize};
use tabular_rl_core::{ensure_legal, Environment, RLError, Result, StateEncoder, Step};

/// A player's mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Moves first
    X,
    /// Moves second
    O,
}

impl Mark {
    fn digit(cell: Option<Mark>) -> u32 {
        match cell {
            None => 0,
            Some(Mark::X) => 1,
            Some(Mark::O) => 2,
        }
    }
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// The eight symmetries of the square; cell `i` of the image is cell
/// `SYMMETRIES[t][i]` of the source.
const SYMMETRIES: [[usize; 9]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8],
    [6, 3, 0, 7, 4, 1, 8, 5, 2],
    [8, 7, 6, 5, 4, 3, 2, 1, 0],
    [2, 5, 8, 1, 4, 7, 0, 3, 6],
    [2, 1, 0, 5, 4, 3, 8, 7, 6],
    [6, 7, 8, 3, 4, 5, 0, 1, 2],
    [0, 3, 6, 1, 4, 7, 2, 5, 8],
    [8, 5, 2, 7, 4, 1, 6, 3, 0],
];

/// 3×3 board, cells numbered row by row from the top left
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Option<Mark>; 9],
}

impl Board {
    /// Empty board
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Board from a nine-character string of `X`, `O` and `.`
    pub fn parse(text: &str) -> Result<Self> {
        let mut cells = [None; 9];
        let mut count = 0;
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            if count == 9 {
                return Err(RLError::InvalidParameter(format!("too many cells in {text:?}")));
            }
            cells[count] = match ch {
                'X' | 'x' => Some(Mark::X),
                'O' | 'o' => Some(Mark::O),
                '.' | '-' => None,
                other => {
                    return Err(RLError::InvalidParameter(format!("unexpected cell {other:?}")))
                }
            };
            count += 1;
        }
        if count != 9 {
            return Err(RLError::InvalidParameter(format!("expected 9 cells in {text:?}")));
        }
        Ok(Self { cells })
    }

    /// Mark in `cell`, if any
    #[must_use]
    pub fn get(&self, cell: usize) -> Option<Mark> {
        self.cells.get(cell).copied().flatten()
    }

    fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|c| **c == Some(mark)).count()
    }

    /// Player to move, assuming X opened
    #[must_use]
    pub fn to_move(&self) -> Mark {
        if self.count(Mark::X) > self.count(Mark::O) {
            Mark::O
        } else {
            Mark::X
        }
    }

    /// Player holding a complete line
    #[must_use]
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let first = self.cells[line[0]]?;
            line.iter()
                .all(|&cell| self.cells[cell] == Some(first))
                .then_some(first)
        })
    }

    /// Whether every cell is taken
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Empty cells in ascending order
    #[must_use]
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..9).filter(|&cell| self.cells[cell].is_none()).collect()
    }

    fn place(&self, cell: usize, mark: Mark) -> Self {
        let mut next = *self;
        next.cells[cell] = Some(mark);
        next
    }

    fn transformed(&self, symmetry: &[usize; 9]) -> Self {
        let mut cells = [None; 9];
        for (target, &source) in cells.iter_mut().zip(symmetry) {
            *target = self.cells[source];
        }
        Self { cells }
    }

    /// Base-3 code, cell 0 most significant
    fn code(&self) -> u32 {
        self.cells
            .iter()
            .fold(0, |code, &cell| code * 3 + Mark::digit(cell))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let ch = match self.cells[row * 3 + col] {
                    Some(Mark::X) => 'X',
                    Some(Mark::O) => 'O',
                    None => '.',
                };
                write!(f, "{ch}")?;
            }
            if row < 2 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Tic-tac-toe with X moving first.
///
/// The mover earns +1 for completing a line and 0 otherwise; a full board
/// without a line is a draw. Actions are cell indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl TicTacToe {
    /// Create the game
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for TicTacToe {
    type Position = Board;
    type Action = usize;

    fn reset(&mut self) -> Result<Board> {
        Ok(Board::new())
    }

    fn legal_actions(&self, position: &Board) -> Vec<usize> {
        if position.winner().is_some() {
            Vec::new()
        } else {
            position.empty_cells()
        }
    }

    fn step(&mut self, position: &Board, action: &usize) -> Result<Step<Board>> {
        ensure_legal(action, &self.legal_actions(position))?;
        let mover = position.to_move();
        let next = position.place(*action, mover);
        Ok(if next.winner() == Some(mover) {
            Step::terminal(next, 1.0)
        } else if next.is_full() {
            Step::terminal(next, 0.0)
        } else {
            Step::running(next, 0.0)
        })
    }
}

/// Folds the eight rotations and reflections of a board into one state.
///
/// The state is the smallest base-3 code over all symmetries. Moves are
/// mapped into that canonical frame, and moves that are equivalent under the
/// board's own symmetries share one key.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetryEncoder;

impl SymmetryEncoder {
    /// Create the encoder
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn canonical_code(board: &Board) -> u32 {
        SYMMETRIES
            .iter()
            .map(|symmetry| board.transformed(symmetry).code())
            .min()
            .unwrap_or_else(|| board.code())
    }
}

impl StateEncoder<Board, usize> for SymmetryEncoder {
    type State = u32;

    fn encode(&self, board: &Board) -> Result<u32> {
        let xs = board.count(Mark::X);
        let os = board.count(Mark::O);
        if xs != os && xs != os + 1 {
            return Err(RLError::Encoding(format!(
                "board has {xs} X and {os} O marks:\n{board}"
            )));
        }
        Ok(Self::canonical_code(board))
    }

    fn encode_action(&self, board: &Board, cell: &usize) -> usize {
        let canonical = Self::canonical_code(board);
        SYMMETRIES
            .iter()
            .filter(|symmetry| board.transformed(symmetry).code() == canonical)
            .filter_map(|symmetry| symmetry.iter().position(|source| source == cell))
            .min()
            .unwrap_or(*cell)
    }
}
