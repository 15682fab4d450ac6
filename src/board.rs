//! Canonical Reversi board and move generation.
//!
//! A [`Board`] is always seen from the side to move: `Black` cells belong to
//! the player whose turn it is and `White` cells to the opponent. After a
//! move is generated the colors are swapped, so move generation only ever
//! has to place Black stones. Use [`crate::game::AbsoluteBoard`] when the
//! real colors matter.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{
    BOARD_CELLS, BOARD_SIZE, DIRECTIONS, GLYPH_BLACK, GLYPH_EMPTY, GLYPH_WHITE,
};

/// A cell coordinate `(x, y)`, zero-indexed from the top-left corner.
pub type Coord = (usize, usize);

/// Contents of one board cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Black,
    White,
    Empty,
}

impl Cell {
    /// Parse a layout glyph. Accepts `X`/`O` in either case and `.`.
    pub fn from_char(ch: char) -> Option<Cell> {
        match ch.to_ascii_uppercase() {
            GLYPH_BLACK => Some(Cell::Black),
            GLYPH_WHITE => Some(Cell::White),
            GLYPH_EMPTY => Some(Cell::Empty),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Black => GLYPH_BLACK,
            Cell::White => GLYPH_WHITE,
            Cell::Empty => GLYPH_EMPTY,
        }
    }

    /// Swap Black and White; Empty stays Empty.
    #[inline]
    pub fn flipped(self) -> Cell {
        match self {
            Cell::Black => Cell::White,
            Cell::White => Cell::Black,
            Cell::Empty => Cell::Empty,
        }
    }
}

/// An absolute player color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }
}

/// Error returned when a layout string cannot be turned into a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout must have exactly {expected} cells, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid cell character '{character}' at position {position}")]
    InvalidCell { character: char, position: usize },
}

/// An 8x8 Reversi board in canonical form (Black = side to move).
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard opening position with Black to move.
    pub fn new() -> Self {
        let mut board = Self::empty();
        let mid = BOARD_SIZE / 2;
        board.set(mid - 1, mid - 1, Cell::White);
        board.set(mid, mid - 1, Cell::Black);
        board.set(mid - 1, mid, Cell::Black);
        board.set(mid, mid, Cell::White);
        board
    }

    /// A board with no stones on it.
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_CELLS],
        }
    }

    /// Parse a 64-character row-major layout (`X`, `O`, `.`).
    pub fn parse(layout: &str) -> Result<Self, LayoutError> {
        let got = layout.chars().count();
        if got != BOARD_CELLS {
            return Err(LayoutError::InvalidLength {
                expected: BOARD_CELLS,
                got,
            });
        }

        let mut cells = [Cell::Empty; BOARD_CELLS];
        for (position, (slot, character)) in cells.iter_mut().zip(layout.chars()).enumerate() {
            *slot = Cell::from_char(character).ok_or(LayoutError::InvalidCell {
                character,
                position,
            })?;
        }
        Ok(Self { cells })
    }

    /// The layout string for this board, the inverse of [`Board::parse`].
    pub fn layout(&self) -> String {
        self.cells.iter().map(|c| c.to_char()).collect()
    }

    #[inline]
    fn idx(x: usize, y: usize) -> usize {
        assert!(
            x < BOARD_SIZE && y < BOARD_SIZE,
            "coordinate ({x}, {y}) is off the board"
        );
        y * BOARD_SIZE + x
    }

    /// Cell at `(x, y)`. Panics if the coordinate is off the board.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> Cell {
        self.cells[Self::idx(x, y)]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[Self::idx(x, y)] = cell;
    }

    /// Number of cells holding `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// True when no empty cells remain.
    pub fn is_filled(&self) -> bool {
        self.cells.iter().all(|&c| c != Cell::Empty)
    }

    /// True when the board is full or neither side has a legal move.
    pub fn is_game_over(&self) -> bool {
        self.is_filled() || (self.next_states().is_empty() && self.flipped().next_states().is_empty())
    }

    /// Fraction of all cells that are Black, in `[0, 1]`.
    pub fn black_occupation(&self) -> f32 {
        self.count(Cell::Black) as f32 / BOARD_CELLS as f32
    }

    /// Swap every Black and White stone in place. Self-inverse.
    pub fn flip_colors(&mut self) {
        for cell in &mut self.cells {
            *cell = cell.flipped();
        }
    }

    /// A copy of this board with colors swapped.
    pub fn flipped(&self) -> Board {
        let mut board = *self;
        board.flip_colors();
        board
    }

    /// Try to place a Black stone at `(x, y)`.
    ///
    /// Every straight run of White stones closed off by a Black stone is
    /// flipped. Returns false and leaves the board untouched if the cell is
    /// off the board, occupied, or captures nothing.
    pub fn try_place(&mut self, x: usize, y: usize) -> bool {
        if x >= BOARD_SIZE || y >= BOARD_SIZE || self.at(x, y) != Cell::Empty {
            return false;
        }

        let mut captured = false;
        for &(dx, dy) in &DIRECTIONS {
            let run = self.capture_run(x, y, dx, dy);
            if run == 0 {
                continue;
            }
            captured = true;
            for n in 1..=run {
                if let Some((cx, cy)) = step(x, y, dx, dy, n) {
                    self.set(cx, cy, Cell::Black);
                }
            }
        }

        if captured {
            self.set(x, y, Cell::Black);
        }
        captured
    }

    /// Length of the White run starting next to `(x, y)` in direction
    /// `(dx, dy)`, or 0 unless it is terminated by a Black stone.
    fn capture_run(&self, x: usize, y: usize, dx: isize, dy: isize) -> usize {
        let mut n = 1;
        while let Some((cx, cy)) = step(x, y, dx, dy, n) {
            match self.at(cx, cy) {
                Cell::White => n += 1,
                Cell::Black => return n - 1,
                Cell::Empty => return 0,
            }
        }
        0
    }

    /// Whether Black could legally play at `(x, y)`.
    pub fn is_legal(&self, x: usize, y: usize) -> bool {
        let mut scratch = *self;
        scratch.try_place(x, y)
    }

    /// All cells where Black has a legal move, in row-major order.
    pub fn legal_moves(&self) -> Vec<Coord> {
        (0..BOARD_SIZE)
            .flat_map(|y| (0..BOARD_SIZE).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_legal(x, y))
            .collect()
    }

    /// Every position reachable by one legal Black move, each already
    /// flipped so that Black is again the side to move.
    pub fn next_states(&self) -> Vec<Board> {
        let mut boards = Vec::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let mut next = *self;
                if next.try_place(x, y) {
                    next.flip_colors();
                    boards.push(next);
                }
            }
        }
        boards
    }
}

/// The cell `n` steps from `(x, y)` along `(dx, dy)`, if still on the board.
#[inline]
fn step(x: usize, y: usize, dx: isize, dy: isize, n: usize) -> Option<Coord> {
    let n = n as isize;
    let cx = x.checked_add_signed(dx * n)?;
    let cy = y.checked_add_signed(dy * n)?;
    (cx < BOARD_SIZE && cy < BOARD_SIZE).then_some((cx, cy))
}

impl FromStr for Board {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::parse(s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                write!(f, "{}", self.at(x, y).to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\"{}\")", self.layout())
    }
}
