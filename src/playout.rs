//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal moves until the board is full or
//! both sides pass in a row. The random generator is passed in explicitly so
//! that searches can be reproduced in tests.

use crate::board::Board;

/// Uniform random index generator used by playouts.
pub struct RandomSource {
    rng: fastrand::Rng,
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource {
    /// A generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// A deterministic generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Generate a random index in `[0, n)`.
    ///
    /// `n == 1` returns 0 without drawing from the generator.
    /// Panics if `n == 0`.
    #[inline]
    pub fn uniform_index(&mut self, n: usize) -> usize {
        assert!(n > 0, "cannot pick an index from an empty range");
        if n == 1 { 0 } else { self.rng.usize(..n) }
    }
}

/// Outcome of a single random simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playout {
    /// Final position, canonical for whoever would move next.
    pub board: Board,
    /// Number of plies played, passes included. The terminating second
    /// pass is not counted.
    pub plies: usize,
}

impl Playout {
    /// Score for the player who moved *into* the starting position.
    ///
    /// The final occupation is measured in canonical Black, i.e. for the
    /// side that would move next. After an even number of plies that is the
    /// starting mover, whose share must be inverted; after an odd number it
    /// already belongs to the opponent.
    pub fn value(&self) -> f32 {
        let occupation = self.board.black_occupation();
        if self.plies % 2 == 0 {
            1.0 - occupation
        } else {
            occupation
        }
    }
}

/// Perform a random playout from `board`.
///
/// `passed` tells whether the ply leading to `board` was already a pass, in
/// which case a position with no legal moves ends the game immediately.
pub fn simulate(board: &Board, passed: bool, rng: &mut RandomSource) -> Playout {
    let mut current = *board;
    let mut passed = passed;
    let mut plies = 0;

    while !current.is_filled() {
        let mut boards = current.next_states();
        if boards.is_empty() {
            if passed {
                break;
            }
            passed = true;
            current.flip_colors();
        } else {
            passed = false;
            let idx = rng.uniform_index(boards.len());
            current = boards.swap_remove(idx);
        }
        plies += 1;
    }

    Playout {
        board: current,
        plies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn test_uniform_index_single_choice() {
        let mut rng = RandomSource::with_seed(7);
        for _ in 0..10 {
            assert_eq!(rng.uniform_index(1), 0);
        }
    }

    #[test]
    fn test_uniform_index_in_range() {
        let mut rng = RandomSource::with_seed(42);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let i = rng.uniform_index(5);
            assert!(i < 5);
            seen[i] = true;
        }
        assert!(seen.iter().all(|&s| s), "every index should come up");
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn test_uniform_index_zero_panics() {
        RandomSource::with_seed(1).uniform_index(0);
    }

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = RandomSource::with_seed(99);
        let mut b = RandomSource::with_seed(99);
        for _ in 0..20 {
            assert_eq!(a.uniform_index(64), b.uniform_index(64));
        }
    }

    #[test]
    fn test_filled_board_scores_for_previous_mover() {
        // 40 stones for the side to move, 24 for the side that just moved.
        let layout = format!("{}{}", "X".repeat(40), "O".repeat(24));
        let board = Board::parse(&layout).unwrap();
        let result = simulate(&board, false, &mut RandomSource::with_seed(1));
        assert_eq!(result.plies, 0);
        assert_eq!(result.board, board);
        assert!((result.value() - 24.0 / 64.0).abs() < 1e-6);
    }

    #[test]
    fn test_last_move_fills_board() {
        // Side to move takes the last empty cell and flips the lone O.
        let layout = format!("{}O.", "X".repeat(62));
        let board = Board::parse(&layout).unwrap();
        let result = simulate(&board, false, &mut RandomSource::with_seed(1));
        assert_eq!(result.plies, 1);
        assert_eq!(result.board.count(Cell::White), 64);
        // The starting mover owns everything, so the previous mover gets 0.
        assert!(result.value().abs() < 1e-6);
    }

    #[test]
    fn test_double_pass_ends_playout() {
        // Neither side can reach the two empty cells with a capture.
        let layout = format!("{}.O", "X".repeat(62));
        let board = Board::parse(&layout).unwrap();
        assert!(board.next_states().is_empty());
        assert!(board.flipped().next_states().is_empty());

        let result = simulate(&board, false, &mut RandomSource::with_seed(1));
        assert_eq!(result.plies, 1);
        assert_eq!(result.board, board.flipped());
        // Previous mover (O) holds a single stone.
        assert!((result.value() - 1.0 / 64.0).abs() < 1e-6);
    }

    #[test]
    fn test_pass_after_pass_stops_immediately() {
        let layout = format!("{}.O", "X".repeat(62));
        let board = Board::parse(&layout).unwrap();
        let result = simulate(&board, true, &mut RandomSource::with_seed(1));
        assert_eq!(result.plies, 0);
        assert_eq!(result.board, board);
        assert!((result.value() - 2.0 / 64.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_playout_from_opening_terminates() {
        let mut rng = RandomSource::with_seed(2024);
        for _ in 0..20 {
            let result = simulate(&Board::new(), false, &mut rng);
            let b = result.board;
            assert!(b.is_filled() || (b.next_states().is_empty() && b.flipped().next_states().is_empty()));
            assert!((0.0..=1.0).contains(&result.value()));
            assert!(result.plies >= 4);
        }
    }
}
