//! Move representation, pseudo-legal move generation and the validation
//! pipeline that turns a requested `(piece, destination)` pair into a
//! committable [`Move`].

use std::fmt;

use itertools::Itertools;

use crate::chess::attacks;
use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Promotion, Rejection, Square};
use crate::chess::notation;
use crate::chess::piece::{Piece, PieceId};

/// Direction of a castle relative to the king.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastleSide {
    /// Toward the higher file ("O-O").
    Kingside,
    /// Toward the lower file ("O-O-O").
    Queenside,
}

impl CastleSide {
    const fn direction(self) -> i8 {
        match self {
            Self::Kingside => 1,
            Self::Queenside => -1,
        }
    }
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    Castle(CastleSide),
    EnPassant,
    Promotion(Promotion),
}

/// Relocation of a second piece as part of the same move: the rook when
/// castling, the captured pawn (which leaves the board) on en passant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubMove {
    #[allow(missing_docs)]
    pub piece: PieceId,
    #[allow(missing_docs)]
    pub origin: Square,
    /// [`None`] if the piece is removed from the board.
    pub destination: Option<Square>,
}

/// A move of a single piece together with everything needed to commit it
/// atomically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    piece: PieceId,
    origin: Square,
    destination: Square,
    captured: Option<PieceId>,
    auxiliary: Option<SubMove>,
    kind: MoveKind,
    notation: Option<String>,
}

impl Move {
    /// Creates a regular move. `captured` is the opposing piece standing on
    /// the destination, if any.
    #[must_use]
    pub const fn new(
        piece: PieceId,
        origin: Square,
        destination: Square,
        captured: Option<PieceId>,
    ) -> Self {
        Self {
            piece,
            origin,
            destination,
            captured,
            auxiliary: None,
            kind: MoveKind::Normal,
            notation: None,
        }
    }

    #[must_use]
    fn with_kind(mut self, kind: MoveKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    fn with_auxiliary(mut self, auxiliary: SubMove) -> Self {
        self.auxiliary = Some(auxiliary);
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn piece(&self) -> PieceId {
        self.piece
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn origin(&self) -> Square {
        self.origin
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn destination(&self) -> Square {
        self.destination
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn captured(&self) -> Option<PieceId> {
        self.captured
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn auxiliary(&self) -> Option<SubMove> {
        self.auxiliary
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Algebraic notation computed by [`validate`] on the board the move was
    /// validated against.
    #[must_use]
    pub fn notation(&self) -> Option<&str> {
        self.notation.as_deref()
    }

    /// Serializes the move in [UCI format] (origin, destination and the
    /// promotion letter), e.g. "e7e8q". Castling is written as the king's
    /// two-file step.
    ///
    /// [UCI format]: https://www.chessprogramming.org/Algebraic_Chess_Notation#UCI
    #[must_use]
    pub fn uci(&self, board: &Board) -> String {
        let mut result = format!(
            "{}{}",
            board.square_name(self.origin),
            board.square_name(self.destination)
        );
        if let MoveKind::Promotion(promotion) = self.kind {
            result.push(PieceKind::from(promotion).symbol(Player::Black));
        }
        result
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.notation {
            Some(notation) => f.write_str(notation),
            None => write!(f, "{} {} -> {}", self.piece, self.origin, self.destination),
        }
    }
}

/// Generates pseudo-legal moves of the piece: every reachable square plus the
/// special moves currently available to it. Moves that would leave the own
/// king in check are not filtered out.
#[must_use]
pub fn candidates(board: &Board, piece: PieceId) -> Vec<Move> {
    let piece = *board.piece(piece);
    let Some(origin) = piece.position() else {
        return Vec::new();
    };
    let mut moves = Vec::new();
    for destination in piece.reachable(board) {
        let regular = Move::new(piece.id(), origin, destination, board.get_piece_at(destination));
        if piece.kind() == PieceKind::Pawn && is_last_rank(board, piece.team(), destination) {
            moves.extend(
                Promotion::ALL
                    .iter()
                    .map(|promotion| regular.clone().with_kind(MoveKind::Promotion(*promotion))),
            );
        } else {
            moves.push(regular);
        }
    }
    match piece.kind() {
        PieceKind::Pawn => moves.extend(en_passant(board, &piece, origin)),
        PieceKind::King => moves.extend(castles(board, &piece, origin)),
        _ => (),
    }
    moves
}

fn is_last_rank(board: &Board, team: Player, square: Square) -> bool {
    match team {
        Player::White => square.rank() == 0,
        Player::Black => square.rank() + 1 == board.height(),
    }
}

/// Capture of an opposing pawn that has just advanced two squares and now
/// stands beside ours.
fn en_passant(board: &Board, pawn: &Piece, origin: Square) -> Option<Move> {
    let last = board.last_move()?;
    let pushed = board.piece(last.piece);
    if pushed.kind() != PieceKind::Pawn
        || pushed.team() == pawn.team()
        || pushed.position() != Some(last.destination)
        || last.origin.file() != last.destination.file()
        || last.origin.rank().abs_diff(last.destination.rank()) != 2
    {
        return None;
    }
    if last.destination.rank() != origin.rank()
        || last.destination.file().abs_diff(origin.file()) != 1
    {
        return None;
    }
    let skipped = Square::new(
        (last.origin.rank() + last.destination.rank()) / 2,
        last.destination.file(),
    );
    if board.get_piece_at(skipped).is_some() {
        return None;
    }
    Some(
        Move::new(pawn.id(), origin, skipped, Some(last.piece))
            .with_kind(MoveKind::EnPassant)
            .with_auxiliary(SubMove {
                piece: last.piece,
                origin: last.destination,
                destination: None,
            }),
    )
}

fn castles(board: &Board, king: &Piece, origin: Square) -> Vec<Move> {
    if king.moved() || attacks::is_attacked(origin, king.team().opponent(), board) {
        return Vec::new();
    }
    [CastleSide::Kingside, CastleSide::Queenside]
        .into_iter()
        .filter_map(|side| castle(board, king, origin, side))
        .collect()
}

fn castle(board: &Board, king: &Piece, origin: Square, side: CastleSide) -> Option<Move> {
    let direction = side.direction();
    // The first piece met toward the side has to be our unmoved rook.
    let (rook_square, distance) = (1..)
        .map_while(|distance| {
            origin
                .shift((0, direction.checked_mul(distance)?))
                .filter(|square| board.contains(*square))
                .map(|square| (square, distance))
        })
        .find(|(square, _)| board.get_piece_at(*square).is_some())?;
    let rook = board.piece(board.get_piece_at(rook_square)?);
    if rook.kind() != PieceKind::Rook || rook.team() != king.team() || rook.moved() || distance <= 2
    {
        return None;
    }
    let crossed = origin.shift((0, direction))?;
    let destination = origin.shift((0, 2 * direction))?;
    // The king may not pass through or land on an attacked square.
    for square in [crossed, destination] {
        let mut trial = board.copy();
        if trial.place(king.id(), square).is_err()
            || !attacks::in_check(king.id(), &trial).is_empty()
        {
            return None;
        }
    }
    Some(
        Move::new(king.id(), origin, destination, None)
            .with_kind(MoveKind::Castle(side))
            .with_auxiliary(SubMove {
                piece: rook.id(),
                origin: rook_square,
                destination: Some(crossed),
            }),
    )
}

/// Simulates the move on a copy of the board and checks whether the mover's
/// king is attacked afterwards. Teams without a king are never in check.
#[must_use]
pub fn leaves_king_in_check(board: &Board, candidate: &Move) -> bool {
    let team = board.piece(candidate.piece()).team();
    board
        .king(team)
        .is_some_and(|king| exposes_king(board, candidate, king))
}

/// Like [`leaves_king_in_check`] but for a specific `king`, which matters on
/// custom layouts with more than one king per team.
#[must_use]
pub fn exposes_king(board: &Board, candidate: &Move, king: PieceId) -> bool {
    let mut trial = board.copy();
    if trial.make_move(candidate).is_err() {
        return true;
    }
    !attacks::in_check(king, &trial).is_empty()
}

/// Runs the validation pipeline for moving `piece` to `destination` without
/// touching the board: ownership, bounds, occupancy, reachability (including
/// special moves) and king safety. `promotion` selects the promoted kind for
/// pawns reaching the last rank and defaults to a queen.
///
/// The returned move carries its algebraic notation and can be committed with
/// [`Board::make_move`].
///
/// # Errors
///
/// The first [`Rejection`] raised by the pipeline.
pub fn validate(
    board: &Board,
    piece: PieceId,
    destination: Square,
    promotion: Option<Promotion>,
) -> Result<Move, Rejection> {
    let mover = board.piece(piece);
    if !mover.is_on_board() {
        return Err(Rejection::NoPieceAtOrigin);
    }
    if mover.team() != board.side_to_move() {
        return Err(Rejection::NotYourTurn);
    }
    if !board.contains(destination) {
        return Err(Rejection::InvalidSquare);
    }
    if board
        .get_piece_at(destination)
        .is_some_and(|occupant| board.piece(occupant).team() == mover.team())
    {
        return Err(Rejection::OccupiedByAlly);
    }
    let promotion = promotion.unwrap_or(Promotion::Queen);
    let mut resolved = candidates(board, piece)
        .into_iter()
        .find(|candidate| {
            candidate.destination() == destination
                && match candidate.kind() {
                    MoveKind::Promotion(kind) => kind == promotion,
                    _ => true,
                }
        })
        .ok_or(Rejection::IllegalMove)?;
    if leaves_king_in_check(board, &resolved) {
        return Err(Rejection::LeavesKingInCheck);
    }
    resolved.notation = Some(notation::to_notation(&resolved, board));
    Ok(resolved)
}

/// All legal moves of the side to move. Notation is not computed.
#[must_use]
pub fn legal_moves(board: &Board) -> Vec<Move> {
    board
        .active(board.side_to_move())
        .map(Piece::id)
        .collect_vec()
        .into_iter()
        .flat_map(|piece| candidates(board, piece))
        .filter(|candidate| !leaves_king_in_check(board, candidate))
        .collect()
}

/// [Perft] counts the leaf nodes of the legal move tree of given depth. The
/// board is restored to its original state afterwards.
///
/// [Perft]: https://www.chessprogramming.org/Perft
#[must_use]
pub fn perft(board: &mut Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for next_move in moves {
        if board.make_move(&next_move).is_ok() {
            nodes += perft(board, depth - 1);
            let _ = board.revert(1);
        }
    }
    nodes
}
