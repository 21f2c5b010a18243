//! The engine wraps a [`Board`] with a line-based text protocol: one command
//! per line on the input stream, responses on the output stream.
//!
//! [`Engine::protocol_loop`] is the "main loop" of the engine which
//! communicates with the environment and executes commands from the input
//! stream. Rejected moves and malformed commands are reported as
//! `info string ...` lines and never stop the loop.

use std::io::{BufRead, Write};

use anyhow::Context;
use itertools::Itertools;

use crate::chess::attacks::{self, Status};
use crate::chess::board::Board;
use crate::chess::moves;
use crate::chess::notation;
use crate::engine::protocol::Command;

mod protocol;

/// The Engine connects the board to the I/O streams and handles commands sent
/// by the client.
pub struct Engine<'a, R: BufRead, W: Write> {
    board: Board,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Engine<'a, R, W> {
    /// Creates a new instance of the engine with starting position and provided
    /// I/O.
    #[must_use]
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self::with_board(Board::starting(), input, output)
    }

    /// Creates an engine that starts from a custom position.
    #[must_use]
    pub fn with_board(board: Board, input: &'a mut R, output: &'a mut W) -> Self {
        Self {
            board,
            input,
            output,
        }
    }

    /// Current state of the game.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Continuously reads the input stream and executes commands until "quit"
    /// is sent or the stream is closed.
    ///
    /// # Errors
    ///
    /// Only I/O failures are returned: chess-level problems are reported to
    /// the output stream.
    pub fn protocol_loop(&mut self) -> anyhow::Result<()> {
        loop {
            let mut line = String::new();
            if self
                .input
                .read_line(&mut line)
                .context("reading command from input")?
                == 0
            {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Command::NewGame => self.board = Board::starting(),
                Command::SetPosition { fen, moves } => self.handle_position(fen, &moves)?,
                Command::Play(text) => self.handle_play(&text)?,
                Command::Undo(plies) => self.handle_undo(plies)?,
                Command::ListMoves => self.handle_moves()?,
                Command::Display => self.handle_display()?,
                Command::Quit => break,
                Command::Unknown(command) => writeln!(
                    self.output,
                    "info string unsupported command: {}",
                    command.trim()
                )?,
            }
        }
        Ok(())
    }

    /// Replaces the board and replays the moves on top of it. Replay stops at
    /// the first rejected move.
    fn handle_position(&mut self, fen: Option<String>, moves: &[String]) -> anyhow::Result<()> {
        self.board = match fen {
            None => Board::starting(),
            Some(fen) => match Board::from_fen(&fen) {
                Ok(board) => board,
                Err(e) => {
                    writeln!(self.output, "info string {e:#}")?;
                    return Ok(());
                },
            },
        };
        for text in moves {
            if let Err(e) = notation::play(&mut self.board, text) {
                writeln!(self.output, "info string {text}: {e}")?;
                break;
            }
        }
        Ok(())
    }

    fn handle_play(&mut self, text: &str) -> anyhow::Result<()> {
        match notation::play(&mut self.board, text) {
            Ok(played) => {
                writeln!(self.output, "played {played}")?;
                match attacks::status(&self.board) {
                    Status::Ongoing => (),
                    status => writeln!(self.output, "{status}")?,
                }
            },
            Err(e) => writeln!(self.output, "info string {text}: {e}")?,
        }
        Ok(())
    }

    fn handle_undo(&mut self, plies: usize) -> anyhow::Result<()> {
        let reverted = self.board.revert(plies);
        writeln!(self.output, "undone {reverted}")?;
        Ok(())
    }

    /// Lists legal moves of the side to move in algebraic notation.
    fn handle_moves(&mut self) -> anyhow::Result<()> {
        let moves = moves::legal_moves(&self.board)
            .iter()
            .map(|next_move| notation::to_notation(next_move, &self.board))
            .sorted()
            .join(" ");
        writeln!(self.output, "{moves}")?;
        Ok(())
    }

    fn handle_display(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{}", self.board)?;
        writeln!(self.output, "side {}", self.board.side_to_move())?;
        writeln!(self.output, "fen {}", self.board.fen())?;
        writeln!(self.output, "status {}", attacks::status(&self.board))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(board: Board, commands: &str) -> (String, Board) {
        let mut input = commands.as_bytes();
        let mut output = Vec::new();
        let mut engine = Engine::with_board(board, &mut input, &mut output);
        engine.protocol_loop().unwrap();
        let board = engine.board().clone();
        (String::from_utf8(output).unwrap(), board)
    }

    #[test]
    fn plays_notation() {
        let (output, board) = run(Board::starting(), "e4\nmove e5\nNf3\nquit\nd4\n");
        assert_eq!(output, "played e4\nplayed e5\nplayed Nf3\n");
        assert_eq!(board.plies(), 3);
    }

    #[test]
    fn reports_rejections() {
        let (output, board) = run(Board::starting(), "e5\nZz9\nO-O\nfrobnicate now\n");
        assert_eq!(
            output,
            "info string e5: notation can not be parsed\n\
             info string Zz9: notation can not be parsed\n\
             info string O-O: destination is not reachable\n\
             info string unsupported command: frobnicate now\n"
        );
        assert_eq!(board.plies(), 0);
    }

    #[test]
    fn position_and_undo() {
        let (output, board) = run(
            Board::starting(),
            "position startpos moves e4 e5 Qh5 Nc6 Bc4 Nf6\nQxf7\nundo 2\nundo\n",
        );
        assert_eq!(output, "played Qxf7\ncheckmate\nundone 2\nundone 1\n");
        assert_eq!(board.plies(), 4);
    }

    #[test]
    fn position_errors() {
        let (output, board) = run(
            Board::starting(),
            "position fen 8/8/8/8/8/8/8/9 w\nposition startpos moves e4 e4 d4\n",
        );
        let lines = output.lines().collect_vec();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("info string "));
        assert_eq!(lines[1], "info string e4: notation can not be parsed");
        assert_eq!(board.plies(), 1);
    }

    #[test]
    fn lists_moves() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let (output, _) = run(board, "moves\n");
        assert_eq!(
            output,
            "Kd1 Kd2 Ke2 Kf1 Kf2 O-O-O Ra2 Ra3 Ra4 Ra5 Ra6 Ra7 Ra8 Rb1 Rc1 Rd1\n"
        );
    }

    #[test]
    fn display() {
        let (output, _) = run(Board::from_fen("k7/8/1Q6/8/8/8/8/7K b").unwrap(), "d\n");
        assert_eq!(
            output,
            "k . . . . . . .\n\
             . . . . . . . .\n\
             . Q . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . K\n\
             side b\n\
             fen k7/8/1Q6/8/8/8/8/7K b\n\
             status stalemate\n"
        );
    }
}
