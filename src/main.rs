//! Reversi-MCTS: play Reversi against a Monte Carlo Tree Search engine.
//!
//! ## Usage
//!
//! - `reversi-mcts` - Play with one second of thinking time per engine move
//! - `reversi-mcts 2.5` - Play with 2.5 seconds per engine move
//!
//! Set `RUST_LOG=debug` to see search statistics on stderr.

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use reversi_mcts::constants::DEFAULT_TIME_BUDGET_SECS;
use reversi_mcts::game::GameSession;
use reversi_mcts::playout::RandomSource;

/// Reversi-MCTS: play Reversi against a Monte Carlo Tree Search engine
#[derive(Parser)]
#[command(name = "reversi-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Thinking time per engine move, in seconds
    #[arg(value_name = "TIME", default_value = "1.0", value_parser = parse_seconds)]
    time: Duration,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|e| format!("time must be a non-negative number of seconds, got {s}: {e}"))
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut session = GameSession::new(
        io::stdin().lock(),
        io::stdout().lock(),
        cli.time,
        RandomSource::new(),
    );
    session.run()
}
