//! Constants for board geometry and search parameters.
//!
//! The board is a flat row-major array of 64 cells. Directions are kept as
//! `(dx, dy)` pairs rather than flat offsets so that edge checks stay
//! explicit.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Reversi is always played on 8x8.
pub const BOARD_SIZE: usize = 8;

/// Total number of cells on the board.
pub const BOARD_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Standard opening position, Black to move.
///
/// Row-major, `X` = Black, `O` = White, `.` = empty.
pub const INITIAL_BOARD: &str = concat!(
    "........",
    "........",
    "........",
    "...OX...",
    "...XO...",
    "........",
    "........",
    "........",
);

/// Offsets to the eight neighbouring cells.
/// Order: North, NE, East, SE, South, SW, West, NW
pub const DIRECTIONS: [(isize, isize); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Minimum visits before a node is expanded.
pub const MIN_VISITS_TO_EXPAND: u32 = 1;

/// UCB1 exploration constant.
pub const EXPLORATION_CONST: f32 = std::f32::consts::SQRT_2;

/// Default thinking time per AI move, in seconds.
pub const DEFAULT_TIME_BUDGET_SECS: f64 = 1.0;

// =============================================================================
// Cell Glyphs
// =============================================================================

/// Black stone (side to move on a canonical board).
pub const GLYPH_BLACK: char = 'X';

/// White stone.
pub const GLYPH_WHITE: char = 'O';

/// Empty cell.
pub const GLYPH_EMPTY: char = '.';
