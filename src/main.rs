use std::io;

use clap::Parser;
use gambit::chess::board::Board;
use gambit::Engine;

/// Chess rules engine speaking a line-based text protocol: send moves in
/// algebraic notation to stdin, read responses from stdout.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Config {
    /// Start from this position (Forsyth-Edwards Notation) instead of the
    /// standard one.
    #[arg(long)]
    fen: Option<String>,
    /// Do not print engine and build information on startup.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    if !config.quiet {
        gambit::print_engine_info();
        gambit::print_binary_info();
    }
    let board = match config.fen {
        Some(fen) => Board::from_fen(&fen)?,
        None => Board::starting(),
    };
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut engine = Engine::with_board(board, &mut input, &mut output);
    engine.protocol_loop()
}
