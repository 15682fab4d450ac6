//! Interactive human-vs-engine session.
//!
//! The human plays Black (`X`) and moves first; the engine answers each move
//! with a time-bounded MCTS search. Moves are entered as a column letter and
//! a row digit, e.g. `f5`.
//!
//! Internally the position is kept as a canonical [`Board`] plus the color
//! to move. [`AbsoluteBoard`] is the real-color view used for display and
//! scoring.
//!
//! ## Example
//!
//! ```ignore
//! use std::io;
//! use std::time::Duration;
//! use reversi_mcts::game::GameSession;
//! use reversi_mcts::playout::RandomSource;
//!
//! let mut session = GameSession::new(
//!     io::stdin().lock(),
//!     io::stdout().lock(),
//!     Duration::from_secs(1),
//!     RandomSource::new(),
//! );
//! session.run()?;
//! ```

use std::fmt;
use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::board::{Board, Cell, Coord, Player};
use crate::constants::BOARD_SIZE;
use crate::mcts::search_with_stats;
use crate::playout::RandomSource;

/// A board in real colors: Black is the player who moved first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AbsoluteBoard {
    board: Board,
}

impl Default for AbsoluteBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl AbsoluteBoard {
    /// The standard opening position.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
        }
    }

    /// Wrap a layout that is already in real colors.
    pub fn from_layout(board: Board) -> Self {
        Self { board }
    }

    /// Real colors of a canonical board on which `to_move` is to play.
    pub fn from_canonical(board: &Board, to_move: Player) -> Self {
        let board = match to_move {
            Player::Black => *board,
            Player::White => board.flipped(),
        };
        Self { board }
    }

    /// Canonical board for `to_move`, the inverse of [`AbsoluteBoard::from_canonical`].
    pub fn to_canonical(&self, to_move: Player) -> Board {
        match to_move {
            Player::Black => self.board,
            Player::White => self.board.flipped(),
        }
    }

    /// Owner of the cell at `(x, y)`, if any.
    pub fn at(&self, x: usize, y: usize) -> Option<Player> {
        match self.board.at(x, y) {
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
            Cell::Empty => None,
        }
    }

    /// Number of discs owned by `player`.
    pub fn count(&self, player: Player) -> usize {
        match player {
            Player::Black => self.board.count(Cell::Black),
            Player::White => self.board.count(Cell::White),
        }
    }

    /// The player with more discs, or `None` on a draw.
    pub fn leader(&self) -> Option<Player> {
        let black = self.count(Player::Black);
        let white = self.count(Player::White);
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Some(Player::Black),
            std::cmp::Ordering::Less => Some(Player::White),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for AbsoluteBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..BOARD_SIZE {
            write!(f, "{}", (b'a' + x as u8) as char)?;
        }
        writeln!(f)?;
        writeln!(f, " +{}", "-".repeat(BOARD_SIZE))?;
        for y in 0..BOARD_SIZE {
            write!(f, "{}|", y + 1)?;
            for x in 0..BOARD_SIZE {
                write!(f, "{}", self.board.at(x, y).to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parse a move such as `f5` into zero-indexed `(x, y)`.
///
/// Column letters `a`-`h` (either case), row digits `1`-`8`.
/// Returns `None` for anything else.
pub fn parse_coord(s: &str) -> Option<Coord> {
    let bytes = s.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }

    let col = bytes[0].to_ascii_lowercase().checked_sub(b'a')? as usize;
    let row = bytes[1].checked_sub(b'1')? as usize;
    (col < BOARD_SIZE && row < BOARD_SIZE).then_some((col, row))
}

/// Convert `(x, y)` to move notation (e.g. `"f5"`).
pub fn str_coord((x, y): Coord) -> String {
    format!("{}{}", (b'a' + x as u8) as char, y + 1)
}

/// A game between a human on `input`/`output` and the engine.
pub struct GameSession<R, W> {
    input: R,
    output: W,
    /// Current position, canonical for `to_move`
    board: Board,
    to_move: Player,
    /// Thinking time per engine move
    budget: Duration,
    rng: RandomSource,
}

impl<R: BufRead, W: Write> GameSession<R, W> {
    /// Create a session starting from the standard opening.
    pub fn new(input: R, output: W, budget: Duration, rng: RandomSource) -> Self {
        Self::with_position(input, output, budget, rng, AbsoluteBoard::new())
    }

    /// Create a session from an arbitrary position with the human to move.
    pub fn with_position(
        input: R,
        output: W,
        budget: Duration,
        rng: RandomSource,
        position: AbsoluteBoard,
    ) -> Self {
        Self {
            input,
            output,
            board: position.to_canonical(Player::Black),
            to_move: Player::Black,
            budget,
            rng,
        }
    }

    /// The current position in real colors.
    pub fn position(&self) -> AbsoluteBoard {
        AbsoluteBoard::from_canonical(&self.board, self.to_move)
    }

    /// Play until the game ends or the input is exhausted.
    pub fn run(&mut self) -> Result<()> {
        info!(budget_secs = self.budget.as_secs_f64(), "game started");
        self.print_board()?;

        while !self.board.is_game_over() {
            if !self.human_turn()? {
                info!("input closed, leaving game");
                return Ok(());
            }
            if self.board.is_game_over() {
                break;
            }
            self.engine_turn()?;
        }

        self.print_result()
    }

    /// Read and play one human move. Returns false once input is exhausted.
    fn human_turn(&mut self) -> Result<bool> {
        if self.board.legal_moves().is_empty() {
            writeln!(self.output, "no legal move, you pass")?;
            self.pass();
            return Ok(true);
        }

        let Some((x, y)) = self.read_move()? else {
            return Ok(false);
        };
        let placed = self.board.try_place(x, y);
        debug_assert!(placed);
        self.print_board()?;
        self.pass();
        Ok(true)
    }

    /// Prompt until a legal move is entered. `None` on end of input.
    fn read_move(&mut self) -> Result<Option<Coord>> {
        let mut line = String::new();
        loop {
            write!(self.output, "move? ")?;
            self.output.flush().context("failed to flush output")?;

            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .context("failed to read move")?;
            if read == 0 {
                return Ok(None);
            }

            match parse_coord(&line) {
                Some((x, y)) if self.board.is_legal(x, y) => return Ok(Some((x, y))),
                _ => continue,
            }
        }
    }

    fn engine_turn(&mut self) -> Result<()> {
        if self.board.legal_moves().is_empty() {
            writeln!(self.output, "engine has no legal move and passes")?;
        }

        let result = search_with_stats(&self.board, self.budget, &mut self.rng);
        if let Some(occupation) = result.expected_occupation {
            writeln!(
                self.output,
                "#games: {}, occupation: {}",
                result.games, occupation
            )?;
        }
        self.board = result.board;
        self.to_move = self.to_move.opponent();
        self.print_board()
    }

    /// Hand the turn to the other side without changing the discs.
    fn pass(&mut self) {
        self.board.flip_colors();
        self.to_move = self.to_move.opponent();
    }

    fn print_board(&mut self) -> Result<()> {
        let position = self.position();
        write!(self.output, "{position}").context("failed to print board")?;
        Ok(())
    }

    fn print_result(&mut self) -> Result<()> {
        let position = self.position();
        let black = position.count(Player::Black);
        let white = position.count(Player::White);
        info!(black, white, "game over");

        writeln!(self.output, "game over: X {black} - O {white}")?;
        match position.leader() {
            Some(Player::Black) => writeln!(self.output, "you win")?,
            Some(Player::White) => writeln!(self.output, "engine wins")?,
            None => writeln!(self.output, "draw")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(input: &str, position: AbsoluteBoard) -> GameSession<Cursor<Vec<u8>>, Vec<u8>> {
        GameSession::with_position(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            Duration::from_millis(10),
            RandomSource::with_seed(17),
            position,
        )
    }

    fn output(s: &GameSession<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(s.output.clone()).unwrap()
    }

    #[test]
    fn test_parse_coord() {
        assert_eq!(parse_coord("f5"), Some((5, 4)));
        assert_eq!(parse_coord("F5"), Some((5, 4)));
        assert_eq!(parse_coord("a1"), Some((0, 0)));
        assert_eq!(parse_coord("h8\n"), Some((7, 7)));
        assert_eq!(parse_coord("i1"), None);
        assert_eq!(parse_coord("a9"), None);
        assert_eq!(parse_coord("a0"), None);
        assert_eq!(parse_coord("f"), None);
        assert_eq!(parse_coord("f55"), None);
        assert_eq!(parse_coord("5f"), None);
        assert_eq!(parse_coord(""), None);
    }

    #[test]
    fn test_parse_str_coord_roundtrip() {
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let s = str_coord((x, y));
                assert_eq!(parse_coord(&s), Some((x, y)), "failed roundtrip for {s}");
            }
        }
        assert_eq!(str_coord((5, 4)), "f5");
    }

    #[test]
    fn test_canonical_conversion_roundtrip() {
        let mut absolute = Board::new();
        assert!(absolute.try_place(5, 4));
        let position = AbsoluteBoard::from_layout(absolute);

        assert_eq!(position.to_canonical(Player::Black), absolute);
        assert_eq!(position.to_canonical(Player::White), absolute.flipped());
        for player in [Player::Black, Player::White] {
            let canonical = position.to_canonical(player);
            assert_eq!(AbsoluteBoard::from_canonical(&canonical, player), position);
        }
    }

    #[test]
    fn test_absolute_counts_and_leader() {
        let position = AbsoluteBoard::new();
        assert_eq!(position.count(Player::Black), 2);
        assert_eq!(position.count(Player::White), 2);
        assert_eq!(position.leader(), None);
        assert_eq!(position.at(4, 3), Some(Player::Black));
        assert_eq!(position.at(3, 3), Some(Player::White));
        assert_eq!(position.at(0, 0), None);

        let mut board = Board::new();
        board.try_place(5, 4);
        assert_eq!(AbsoluteBoard::from_layout(board).leader(), Some(Player::Black));
    }

    #[test]
    fn test_render_opening() {
        let expected = concat!(
            "  abcdefgh\n",
            " +--------\n",
            "1|........\n",
            "2|........\n",
            "3|........\n",
            "4|...OX...\n",
            "5|...XO...\n",
            "6|........\n",
            "7|........\n",
            "8|........\n",
        );
        assert_eq!(AbsoluteBoard::new().to_string(), expected);
    }

    #[test]
    fn test_session_plays_human_and_engine_moves() {
        let mut s = session("f5\n", AbsoluteBoard::new());
        s.run().unwrap();
        let out = output(&s);

        assert!(out.contains("5|...XXX..\n"), "human move should be shown:\n{out}");
        assert!(out.contains("#games: "), "engine should report its search:\n{out}");
        // Engine moved, human to move again, then input ran out.
        assert_eq!(s.to_move, Player::Black);
        assert_eq!(out.matches("move? ").count(), 2);
        let position = s.position();
        assert_eq!(
            position.count(Player::Black) + position.count(Player::White),
            6
        );
    }

    #[test]
    fn test_session_reprompts_on_bad_input() {
        let mut s = session("zz\na1\nd4\nf5\n", AbsoluteBoard::new());
        s.run().unwrap();
        let out = output(&s);
        // Three rejected entries, the accepted f5, then end of input.
        assert_eq!(out.matches("move? ").count(), 5);
        assert_eq!(s.position().at(5, 4), Some(Player::Black));
    }

    #[test]
    fn test_session_ends_on_finished_board() {
        let full = Board::parse(&format!("{}{}", "X".repeat(40), "O".repeat(24))).unwrap();
        let mut s = session("", AbsoluteBoard::from_layout(full));
        s.run().unwrap();
        let out = output(&s);
        assert!(out.contains("game over: X 40 - O 24"));
        assert!(out.contains("you win"));
        assert!(!out.contains("move? "));
    }

    #[test]
    fn test_session_human_passes_when_stuck() {
        // Human (X) has no move; the engine (O) has exactly one, c1.
        let layout = Board::parse(&format!("OX{}", ".".repeat(62))).unwrap();
        let mut s = session("", AbsoluteBoard::from_layout(layout));
        s.run().unwrap();
        let out = output(&s);
        assert!(out.contains("you pass"));
        // A single legal reply needs no search.
        assert!(!out.contains("#games"));
        assert!(out.contains("game over: X 0 - O 3"));
        assert!(out.contains("engine wins"));
    }
}
