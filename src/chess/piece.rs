//! Piece identity and the table of movement rules.
//!
//! Every piece taking part in a game is created once by the [`Registry`]
//! arena and gets a stable [`PieceId`]. Ids are never reused: captured pieces
//! stay in the registry (with no position) so that collaborators can still
//! refer to them, e.g. when printing a capture.

use std::fmt;

use crate::chess::bitboard::Bitboard;
use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Square};
use crate::chess::movement::{MoveBuilder, Reach};

/// Stable integer identity of a piece, assigned by the [`Registry`] at
/// creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(u32);

impl PieceId {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A piece owned by a player.
///
/// `position` caches the square the piece occupies on the owning
/// [`Board`]; the board grid is the source of truth and keeps the two in sync
/// on every committed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    team: Player,
    kind: PieceKind,
    moved: bool,
    position: Option<Square>,
}

impl Piece {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn team(&self) -> Player {
        self.team
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Whether the piece has moved since the game started. Pawn double
    /// pushes and castling are only available to pieces that have not.
    #[must_use]
    pub const fn moved(&self) -> bool {
        self.moved
    }

    /// Current square or [`None`] if the piece has been captured or was never
    /// placed.
    #[must_use]
    pub const fn position(&self) -> Option<Square> {
        self.position
    }

    #[must_use]
    pub const fn is_on_board(&self) -> bool {
        self.position.is_some()
    }

    /// Squares the piece can geometrically reach on the `board`, before
    /// checking whether the move would expose its king. Special moves
    /// (castling, en passant) are not included, see
    /// [`crate::chess::moves::candidates`].
    #[must_use]
    pub fn reachable(&self, board: &Board) -> Bitboard {
        self.reach(board, Reach::Moves)
    }

    /// Like [`Piece::reachable`] but with the given [`Reach`] policy.
    #[must_use]
    pub fn reach(&self, board: &Board, reach: Reach) -> Bitboard {
        movement(self.kind, self.team, self.moved, board.reach_limit()).finalize(self, board, reach)
    }

    pub(crate) fn set_position(&mut self, position: Option<Square>) {
        self.position = position;
    }

    pub(crate) fn mark_moved(&mut self) {
        self.moved = true;
    }

    pub(crate) fn set_moved(&mut self, moved: bool) {
        self.moved = moved;
    }

    pub(crate) fn promote(&mut self, kind: PieceKind) {
        debug_assert_eq!(self.kind, PieceKind::Pawn, "only pawns are promoted");
        self.kind = kind;
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.symbol(self.team))
    }
}

/// Arena owning every piece created for a game. Ids are handed out
/// sequentially.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    pieces: Vec<Piece>,
}

impl Registry {
    #[must_use]
    pub const fn new() -> Self {
        Self { pieces: Vec::new() }
    }

    /// Creates a new piece that is not on any square yet.
    ///
    /// # Panics
    ///
    /// If more than `u32::MAX` pieces are created.
    pub fn spawn(&mut self, team: Player, kind: PieceKind) -> PieceId {
        let id = PieceId(u32::try_from(self.pieces.len()).expect("piece ids exhausted"));
        self.pieces.push(Piece {
            id,
            team,
            kind,
            moved: false,
            position: None,
        });
        id
    }

    /// Returns the piece with given id.
    ///
    /// # Panics
    ///
    /// If the id was not produced by this registry.
    #[must_use]
    pub fn get(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.index()]
    }

    #[must_use]
    pub fn contains(&self, id: PieceId) -> bool {
        id.index() < self.pieces.len()
    }

    /// Iterates over all pieces ever created, including captured ones.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.pieces.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

/// Movement rule of each piece kind expressed with [`MoveBuilder`]
/// combinators. `limit` is the longest slide on the board (usually 7).
#[must_use]
pub fn movement(kind: PieceKind, team: Player, moved: bool, limit: i8) -> MoveBuilder {
    let builder = MoveBuilder::new(team);
    match kind {
        PieceKind::Pawn => builder
            .forward(if moved { 1..=1 } else { 1..=2 })
            .or()
            .forward(1)
            .and()
            .horizontally(1),
        PieceKind::Knight => builder
            .vertically(2)
            .and()
            .horizontally(1)
            .or()
            .vertically(1)
            .and()
            .horizontally(2),
        PieceKind::Bishop => builder.diagonally(1).up_to(limit),
        PieceKind::Rook => builder
            .horizontally(1)
            .up_to(limit)
            .or()
            .vertically(1)
            .up_to(limit),
        PieceKind::Queen => builder
            .horizontally(0..=1)
            .and()
            .vertically(0..=1)
            .up_to(limit),
        PieceKind::King => builder.horizontally(0..=1).and().vertically(0..=1),
    }
}
