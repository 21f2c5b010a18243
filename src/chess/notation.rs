//! [Algebraic notation] of moves: "e4", "Nxd5", "R1a3", "exd6", "e8=Q",
//! "O-O-O".
//!
//! Notation always describes a move relative to the board *before* it is
//! committed. Check and mate suffixes ("+", "#") are accepted when parsing but
//! never produced.
//!
//! [Algebraic notation]: https://en.wikipedia.org/wiki/Algebraic_notation_(chess)

use lazy_static::lazy_static;
use regex::Regex;

use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Promotion, Rejection, Square};
use crate::chess::moves::{candidates, leaves_king_in_check, validate, CastleSide, Move, MoveKind};
use crate::chess::piece::{Piece, PieceId};

lazy_static! {
    static ref MOVE_RE: Regex =
        Regex::new(r"^([NBRQK])?([a-h])?([1-8])?(x)?([a-h][1-8])(?:=([NBRQ]))?[+#]?$").unwrap();
    static ref KINGSIDE_CASTLE_RE: Regex = Regex::new(r"^(O-O|0-0)[+#]?$").unwrap();
    static ref QUEENSIDE_CASTLE_RE: Regex = Regex::new(r"^(O-O-O|0-0-0)[+#]?$").unwrap();
}

/// Renders the move in algebraic notation. `board` is the position the move
/// is made from.
///
/// ```
/// use gambit::chess::board::Board;
/// use gambit::chess::core::Square;
/// use gambit::chess::moves::validate;
/// use gambit::chess::notation::to_notation;
///
/// let board = Board::starting();
/// let knight = board.get_piece_at(Square::new(7, 6)).unwrap();
/// let next_move = validate(&board, knight, Square::new(5, 5), None).unwrap();
/// assert_eq!(to_notation(&next_move, &board), "Nf3");
/// ```
#[must_use]
pub fn to_notation(next_move: &Move, board: &Board) -> String {
    let piece = board.piece(next_move.piece());
    let (origin, destination) = (next_move.origin(), next_move.destination());
    let castle = match next_move.kind() {
        MoveKind::Castle(side) => Some(side),
        _ if piece.kind() == PieceKind::King && origin.file().abs_diff(destination.file()) == 2 => {
            if destination.file() > origin.file() {
                Some(CastleSide::Kingside)
            } else {
                Some(CastleSide::Queenside)
            }
        },
        _ => None,
    };
    match castle {
        Some(CastleSide::Kingside) => return "O-O".to_string(),
        Some(CastleSide::Queenside) => return "O-O-O".to_string(),
        None => (),
    }
    let mut result = String::new();
    if let Some(letter) = piece.kind().letter() {
        result.push(letter);
    }
    if let Some(disambiguator) = disambiguate(next_move, piece, board) {
        result.push_str(&disambiguator);
    }
    if next_move.captured().is_some() {
        result.push('x');
    }
    result.push_str(&board.square_name(destination));
    if let MoveKind::Promotion(promotion) = next_move.kind() {
        result.push('=');
        result.push(PieceKind::from(promotion).symbol(Player::White));
    }
    result
}

/// Origin file if another piece of the same kind on the mover's rank can also
/// legally reach the destination, origin rank if one elsewhere can, nothing
/// otherwise. The whole origin square is used when rivals share both the
/// mover's rank and its file.
fn disambiguate(next_move: &Move, mover: &Piece, board: &Board) -> Option<String> {
    let rivals: Vec<Square> = board
        .active(mover.team())
        .filter(|piece| piece.id() != mover.id() && piece.kind() == mover.kind())
        .filter(|piece| can_reach_legally(board, piece.id(), next_move))
        .filter_map(Piece::position)
        .collect();
    if rivals.is_empty() {
        return None;
    }
    let origin = next_move.origin();
    let same_rank = rivals.iter().any(|square| square.rank() == origin.rank());
    let same_file = rivals.iter().any(|square| square.file() == origin.file());
    match (same_rank, same_file) {
        (true, true) => Some(board.square_name(origin)),
        (true, false) => Some(board.file_name(origin.file()).to_string()),
        (false, _) => Some(board.rank_name(origin.rank()).to_string()),
    }
}

fn can_reach_legally(board: &Board, piece: PieceId, next_move: &Move) -> bool {
    candidates(board, piece).iter().any(|candidate| {
        candidate.destination() == next_move.destination()
            && !leaves_king_in_check(board, candidate)
    })
}

/// Resolves the notation into a validated move of the side to move.
///
/// # Errors
///
/// [`Rejection::UnparsableNotation`] if the text does not follow the grammar
/// or no piece can reach the destination, [`Rejection::AmbiguousNotation`] if
/// the disambiguator does not single out one piece and
/// [`Rejection::InvalidSquare`] if a square is outside of the board. Once the
/// piece is resolved, any [`Rejection`] of [`validate`] is propagated.
pub fn from_notation(text: &str, board: &Board) -> Result<Move, Rejection> {
    let text = text.trim();
    let team = board.side_to_move();
    for (pattern, side) in [
        (&*QUEENSIDE_CASTLE_RE, CastleSide::Queenside),
        (&*KINGSIDE_CASTLE_RE, CastleSide::Kingside),
    ] {
        if !pattern.is_match(text) {
            continue;
        }
        let king = board.king(team).ok_or(Rejection::IllegalMove)?;
        let castle = candidates(board, king)
            .into_iter()
            .find(|candidate| candidate.kind() == MoveKind::Castle(side))
            .ok_or(Rejection::IllegalMove)?;
        return validate(board, king, castle.destination(), None);
    }
    let captures = MOVE_RE
        .captures(text)
        .ok_or(Rejection::UnparsableNotation)?;
    let first_char = |group: usize| {
        captures
            .get(group)
            .and_then(|matched| matched.as_str().chars().next())
    };
    let kind = match first_char(1) {
        Some(letter) => {
            PieceKind::try_from(letter).map_err(|_| Rejection::UnparsableNotation)?
        },
        None => PieceKind::Pawn,
    };
    let file = first_char(2).map(|file| board.parse_file(file)).transpose()?;
    let rank = first_char(3).map(|rank| board.parse_rank(rank)).transpose()?;
    let destination = board.parse_square(&captures[5])?;
    let promotion = first_char(6)
        .map(Promotion::try_from)
        .transpose()
        .map_err(|_| Rejection::UnparsableNotation)?;
    let reaching: Vec<PieceId> = board
        .active(team)
        .filter(|piece| piece.kind() == kind)
        .filter(|piece| {
            candidates(board, piece.id())
                .iter()
                .any(|candidate| candidate.destination() == destination)
        })
        .map(Piece::id)
        .collect();
    let piece = match reaching.len() {
        0 => return Err(Rejection::UnparsableNotation),
        1 => reaching[0],
        _ => {
            let filtered: Vec<PieceId> = reaching
                .into_iter()
                .filter(|piece| {
                    board.piece(*piece).position().is_some_and(|square| {
                        file.map_or(true, |file| square.file() == file)
                            && rank.map_or(true, |rank| square.rank() == rank)
                    })
                })
                .filter(|piece| validate(board, *piece, destination, promotion).is_ok())
                .collect();
            match filtered.as_slice() {
                [piece] => *piece,
                _ => return Err(Rejection::AmbiguousNotation),
            }
        },
    };
    validate(board, piece, destination, promotion)
}

/// Parses the notation and commits the move.
///
/// # Errors
///
/// See [`from_notation`]. The board is left untouched on error.
pub fn play(board: &mut Board, text: &str) -> Result<Move, Rejection> {
    let next_move = from_notation(text, board)?;
    board.make_move(&next_move)?;
    Ok(next_move)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::board::BoardConfig;
    use crate::chess::core::Square;

    fn empty_board(first_to_move: Player) -> Board {
        Board::new(BoardConfig {
            first_to_move,
            ..BoardConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn pawn_double_step() {
        let mut board = empty_board(Player::White);
        let pawn = board
            .spawn(Player::White, PieceKind::Pawn, Square::new(6, 3))
            .unwrap();
        let next_move = validate(&board, pawn, Square::new(4, 3), None).unwrap();
        assert_eq!(to_notation(&next_move, &board), "d4");
        assert_eq!(next_move.notation(), Some("d4"));
    }

    #[test]
    fn castles() {
        for (rook_file, destination_file, expected) in [(7, 6, "O-O"), (0, 2, "O-O-O")] {
            let mut board = empty_board(Player::Black);
            let king = board
                .spawn(Player::Black, PieceKind::King, Square::new(0, 4))
                .unwrap();
            let _ = board
                .spawn(Player::Black, PieceKind::Rook, Square::new(0, rook_file))
                .unwrap();
            let destination = Square::new(0, destination_file);
            let plain = Move::new(king, Square::new(0, 4), destination, None);
            assert_eq!(to_notation(&plain, &board), expected);
            let castle = validate(&board, king, destination, None).unwrap();
            assert_eq!(castle.notation(), Some(expected));
            assert_eq!(from_notation(expected, &board), Ok(castle));
        }
    }

    #[test]
    fn rank_disambiguation() {
        let mut board = empty_board(Player::White);
        let first = board
            .spawn(Player::White, PieceKind::Knight, Square::new(5, 2))
            .unwrap();
        let second = board
            .spawn(Player::White, PieceKind::Knight, Square::new(1, 4))
            .unwrap();
        let destination = Square::new(3, 3);
        let next_move = validate(&board, second, destination, None).unwrap();
        assert_eq!(to_notation(&next_move, &board), "N7d5");
        assert_eq!(
            to_notation(&validate(&board, first, destination, None).unwrap(), &board),
            "N3d5"
        );
        assert_eq!(
            from_notation("N7d5", &board).map(|m| m.piece()),
            Ok(second)
        );
        assert_eq!(from_notation("Ncd5", &board).map(|m| m.piece()), Ok(first));
        assert_eq!(
            from_notation("Nd5", &board),
            Err(Rejection::AmbiguousNotation)
        );
        assert_eq!(
            from_notation("Nad5", &board),
            Err(Rejection::AmbiguousNotation)
        );
    }

    #[test]
    fn file_disambiguation() {
        let board = Board::from_fen("4k3/8/8/8/R6R/8/8/R3K3 w - - 0 1").unwrap();
        let left = board.get_piece_at(Square::new(4, 0)).unwrap();
        let right = board.get_piece_at(Square::new(4, 7)).unwrap();
        let next_move = validate(&board, left, Square::new(4, 4), None).unwrap();
        assert_eq!(next_move.notation(), Some("Rae4"));
        let next_move = validate(&board, right, Square::new(4, 4), None).unwrap();
        assert_eq!(next_move.notation(), Some("Rhe4"));
        let next_move = validate(&board, left, Square::new(6, 0), None).unwrap();
        assert_eq!(next_move.notation(), Some("R4a2"));
        assert_eq!(from_notation("R1a2", &board).map(|m| m.origin()), Ok(Square::new(7, 0)));
    }

    #[test]
    fn captures_and_promotions() {
        let mut board = Board::from_fen("3qk3/4P3/8/3p4/2P1P3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            from_notation("xd5", &board),
            Err(Rejection::AmbiguousNotation)
        );
        let capture = from_notation("cxd5", &board).unwrap();
        assert_eq!(capture.origin(), Square::new(4, 2));
        assert_eq!(capture.notation(), Some("cxd5"));
        let promotion = from_notation("exd8=N+", &board).unwrap();
        assert_eq!(promotion.kind(), MoveKind::Promotion(Promotion::Knight));
        assert_eq!(promotion.notation(), Some("xd8=N"));
        let played = play(&mut board, "xd8=Q").unwrap();
        assert_eq!(played.notation(), Some("xd8=Q"));
        assert_eq!(board.fen(), "3Qk3/8/8/3p4/2P1P3/8/8/4K3 b");
    }

    #[test]
    fn rejections() {
        let mut board = Board::starting();
        assert_eq!(
            from_notation("Zz9", &board),
            Err(Rejection::UnparsableNotation)
        );
        assert_eq!(
            from_notation("e5", &board),
            Err(Rejection::UnparsableNotation)
        );
        assert_eq!(from_notation("O-O", &board), Err(Rejection::IllegalMove));
        assert_eq!(
            from_notation("Nbd2", &board),
            Err(Rejection::UnparsableNotation)
        );
        let small = Board::from_fen("k3/4/4/3K w").unwrap();
        assert_eq!(from_notation("Ke5", &small), Err(Rejection::InvalidSquare));
        let played = play(&mut board, "e4").unwrap();
        assert_eq!(played.notation(), Some("e4"));
        assert_eq!(play(&mut board, "e4"), Err(Rejection::UnparsableNotation));
        assert_eq!(board.plies(), 1);
        assert_eq!(play(&mut board, " e5 ").unwrap().to_string(), "e5");
        assert_eq!(play(&mut board, "Ke2").unwrap().to_string(), "Ke2");
    }

    #[test]
    fn check_suffix_is_tolerated() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let played = play(&mut board, "Ra8+").unwrap();
        assert_eq!(played.notation(), Some("Ra8"));
    }
}
