//! Check, checkmate and stalemate detection.
//!
//! Attacks are computed from [`Reach::Attacks`] sets, so pawns threaten their
//! forward diagonals regardless of occupancy and never threaten by pushing.
//! Every "would the king still be in check" question is answered by
//! simulating the move on a [`Board::copy`].

use std::fmt;

use itertools::Itertools;

use crate::chess::bitboard::Bitboard;
use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Square};
use crate::chess::movement::{path, Reach};
use crate::chess::moves::{candidates, exposes_king, legal_moves};
use crate::chess::piece::{Piece, PieceId};

/// Returns the opposing pieces attacking the `king`. The result is empty if
/// the king is safe or not on the board.
#[must_use]
pub fn in_check(king: PieceId, board: &Board) -> Vec<PieceId> {
    let king = board.piece(king);
    let Some(square) = king.position() else {
        return Vec::new();
    };
    board
        .active(king.team().opponent())
        .filter(|piece| piece.reach(board, Reach::Attacks).contains(square))
        .map(Piece::id)
        .collect()
}

/// Returns true if any piece of player `by` attacks the square.
#[must_use]
pub fn is_attacked(square: Square, by: Player, board: &Board) -> bool {
    board
        .active(by)
        .any(|piece| piece.reach(board, Reach::Attacks).contains(square))
}

/// Decides whether the `king` is checkmated: it is in check, it can not step
/// out of it and no friendly piece can capture an attacker or block the line
/// of attack.
#[must_use]
pub fn checkmate(king: PieceId, board: &Board) -> bool {
    let attackers = in_check(king, board);
    if attackers.is_empty() {
        return false;
    }
    if candidates(board, king)
        .iter()
        .any(|escape| !exposes_king(board, escape, king))
    {
        return false;
    }
    let Some(king_square) = board.piece(king).position() else {
        return false;
    };
    // Squares where an interposing piece (or a capture) can stop the check.
    let critical: Bitboard = attackers
        .iter()
        .filter_map(|attacker| board.piece(*attacker).position())
        .flat_map(|square| path(king_square, square).into_iter().chain([square]))
        .collect();
    let defenders = board
        .active(board.piece(king).team())
        .filter(|piece| piece.kind() != PieceKind::King)
        .map(Piece::id)
        .collect_vec();
    !defenders
        .into_iter()
        .flat_map(|defender| candidates(board, defender))
        .filter(|defence| {
            critical.contains(defence.destination())
                || defence
                    .captured()
                    .is_some_and(|captured| attackers.contains(&captured))
        })
        .any(|defence| !exposes_king(board, &defence, king))
}

/// Outcome of the position for the side to move.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ongoing => "ongoing",
            Self::Check => "check",
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
        })
    }
}

/// Evaluates the position for the side to move. A side without a king can
/// not be checked: it is stalemated once it runs out of moves.
#[must_use]
pub fn status(board: &Board) -> Status {
    let in_check = board
        .king(board.side_to_move())
        .is_some_and(|king| !in_check(king, board).is_empty());
    match (in_check, legal_moves(board).is_empty()) {
        (true, true) => Status::Checkmate,
        (true, false) => Status::Check,
        (false, true) => Status::Stalemate,
        (false, false) => Status::Ongoing,
    }
}
