//! Square-centric board: a grid of [`PieceId`]s, the [`Registry`] of every
//! piece in the game and an append-only log of per-ply occupancy changes.
//!
//! The log is the only durable record of history. Each [`Ply`] stores, for
//! every piece whose occupancy changed, either a snapshot of the piece with its
//! new square or [`Occupancy::Removed`]. Merging the entries in order
//! reconstructs the arrangement at any ply, which is how [`Board::revert`] is
//! implemented without storing full grid snapshots.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use anyhow::{bail, Context};
use itertools::Itertools;

use crate::chess::core::{PieceKind, Player, Rejection, Square, MAX_BOARD_WIDTH};
use crate::chess::moves::{Move, MoveKind};
use crate::chess::piece::{Piece, PieceId, Registry};

/// Dimensions of the grid and the player who moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    /// Number of ranks, within `1..=8`.
    pub height: u8,
    /// Number of files, within `1..=8`.
    pub width: u8,
    #[allow(missing_docs)]
    pub first_to_move: Player,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            height: MAX_BOARD_WIDTH,
            width: MAX_BOARD_WIDTH,
            first_to_move: Player::White,
        }
    }
}

/// State of a single piece recorded in a [`Ply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupancy {
    /// The piece (with its flags and kind at that moment) stands on the
    /// square.
    At(Piece, Square),
    /// The piece has left the board since the prior entry.
    Removed,
}

/// Move committed in a ply. Needed to decide whether en passant is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LastMove {
    #[allow(missing_docs)]
    pub piece: PieceId,
    #[allow(missing_docs)]
    pub origin: Square,
    #[allow(missing_docs)]
    pub destination: Square,
}

/// One entry of the state log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ply {
    changes: BTreeMap<PieceId, Occupancy>,
    last_move: Option<LastMove>,
}

impl Ply {
    /// Pieces whose occupancy changed in this ply.
    #[must_use]
    pub const fn changes(&self) -> &BTreeMap<PieceId, Occupancy> {
        &self.changes
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }
}

/// The board owns the grid, every piece of the game and the state log. It is
/// the single source of truth for piece positions.
#[derive(Clone, Debug)]
pub struct Board {
    config: BoardConfig,
    grid: Vec<Option<PieceId>>,
    registry: Registry,
    /// Entry 0 describes the initial setup, every further entry is one ply.
    log: Vec<Ply>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Errors
    ///
    /// If the height or the width is outside `1..=8`.
    pub fn new(config: BoardConfig) -> anyhow::Result<Self> {
        for (name, value) in [("height", config.height), ("width", config.width)] {
            if !(1..=MAX_BOARD_WIDTH).contains(&value) {
                bail!("board {name} should be within 1..={MAX_BOARD_WIDTH}, got {value}");
            }
        }
        Ok(Self::with_config(config))
    }

    fn with_config(config: BoardConfig) -> Self {
        Self {
            config,
            grid: vec![None; usize::from(config.height) * usize::from(config.width)],
            registry: Registry::new(),
            log: vec![Ply::default()],
        }
    }

    /// Creates the starting position of the standard chess variant.
    ///
    /// ```
    /// use gambit::chess::board::Board;
    ///
    /// let board = Board::starting();
    /// assert_eq!(board.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w");
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        const BACKRANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Self::with_config(BoardConfig::default());
        for (player, backrank, pawns) in [(Player::Black, 0, 1), (Player::White, 7, 6)] {
            for (file, kind) in (0..MAX_BOARD_WIDTH).zip(BACKRANK) {
                let _ = board.setup(player, kind, Square::new(backrank, file));
            }
            for file in 0..MAX_BOARD_WIDTH {
                let _ = board.setup(player, PieceKind::Pawn, Square::new(pawns, file));
            }
        }
        board
    }

    /// Places a freshly created piece on a square known to be empty and within
    /// bounds.
    fn setup(&mut self, team: Player, kind: PieceKind, square: Square) -> PieceId {
        let id = self.registry.spawn(team, kind);
        let mut touched = Vec::new();
        self.put(id, square, &mut touched);
        self.amend_tip(&touched);
        id
    }

    /// Parses the board from [Forsyth-Edwards Notation]. Piece placement
    /// defines the grid dimensions (at most 8x8). Castling rights are mapped
    /// onto the `moved` flags of kings and rooks, the en passant square onto
    /// the last move of the setup. Halfmove clock and fullmove counter are
    /// optional and ignored.
    ///
    /// # Errors
    ///
    /// If the input is not a well-formed FEN.
    ///
    /// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split_ascii_whitespace();
        let Some(placement) = parts.next() else {
            bail!("incorrect FEN: missing pieces placement");
        };
        let mut pieces = Vec::new();
        let mut width = None;
        let ranks = placement.split('/').collect_vec();
        for (rank, rank_fen) in ranks.iter().enumerate() {
            let rank = u8::try_from(rank).context("incorrect FEN: too many ranks")?;
            let mut file: u8 = 0;
            for symbol in rank_fen.chars() {
                if file >= MAX_BOARD_WIDTH {
                    bail!("incorrect FEN: file exceeded {MAX_BOARD_WIDTH} in {rank_fen}");
                }
                match symbol {
                    '0' => bail!("incorrect FEN: increment can not be 0"),
                    '1'..='8' => {
                        file += symbol as u8 - b'0';
                        continue;
                    },
                    _ => (),
                }
                let kind = PieceKind::try_from(symbol.to_ascii_uppercase())?;
                let team = if symbol.is_ascii_uppercase() {
                    Player::White
                } else {
                    Player::Black
                };
                pieces.push((team, kind, Square::new(rank, file)));
                file += 1;
            }
            match width {
                None => width = Some(file),
                Some(width) if width != file => {
                    bail!("incorrect FEN: rank size should be exactly {width}, got {rank_fen} of length {file}")
                },
                Some(_) => (),
            }
        }
        let height = u8::try_from(ranks.len()).context("incorrect FEN: too many ranks")?;
        let first_to_move = match parts.next() {
            Some(value) => Player::try_from(value)?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        let mut board = Self::new(BoardConfig {
            height,
            width: width.unwrap_or_default(),
            first_to_move,
        })
        .context("incorrect FEN: unsupported board size")?;
        for (team, kind, square) in pieces {
            let _ = board.setup(team, kind, square);
        }
        let castling = parts.next().unwrap_or("-");
        board.apply_castling_rights(castling)?;
        match parts.next() {
            None | Some("-") => (),
            Some(value) => board.apply_en_passant(value)?,
        }
        for counter in parts.by_ref().take(2) {
            if !counter.bytes().all(|c| c.is_ascii_digit()) {
                bail!("incorrect FEN: move counters can not contain anything other than digits, got {counter}");
            }
        }
        if parts.next().is_some() {
            bail!("trailing symbols are not allowed in FEN");
        }
        Ok(board)
    }

    fn apply_castling_rights(&mut self, castling: &str) -> anyhow::Result<()> {
        if castling != "-"
            && (!castling.chars().all(|c| "KQkq".contains(c)) || !castling.chars().all_unique())
        {
            bail!("unknown castle rights: {castling}");
        }
        let (height, width) = (self.height(), self.width());
        let updates = self
            .registry
            .iter()
            .filter_map(|piece| {
                let square = piece.position()?;
                let (backrank, kingside, queenside, pawns) = match piece.team() {
                    Player::White => (height - 1, 'K', 'Q', height.saturating_sub(2)),
                    Player::Black => (0, 'k', 'q', 1),
                };
                let on_backrank = square.rank() == backrank;
                let moved = match piece.kind() {
                    PieceKind::King => {
                        !(on_backrank
                            && (castling.contains(kingside) || castling.contains(queenside)))
                    },
                    PieceKind::Rook => {
                        !(on_backrank
                            && ((square.file() == width - 1 && castling.contains(kingside))
                                || (square.file() == 0 && castling.contains(queenside))))
                    },
                    PieceKind::Pawn => square.rank() != pawns,
                    _ => false,
                };
                Some((piece.id(), moved))
            })
            .collect_vec();
        for (id, moved) in updates {
            self.registry.get_mut(id).set_moved(moved);
        }
        let touched = self.pieces().map(Piece::id).collect_vec();
        self.amend_tip(&touched);
        Ok(())
    }

    fn apply_en_passant(&mut self, value: &str) -> anyhow::Result<()> {
        let square = self
            .parse_square(value)
            .with_context(|| format!("incorrect FEN: en passant square {value}"))?;
        let pusher = self.side_to_move().opponent();
        let (Some(destination), Some(origin)) = (
            square.shift((pusher.forward(), 0)),
            square.shift((-pusher.forward(), 0)),
        ) else {
            bail!("en passant square is not beyond pushed pawn");
        };
        let pawn = self
            .get_piece_at(destination)
            .filter(|id| {
                let piece = self.piece(*id);
                piece.team() == pusher && piece.kind() == PieceKind::Pawn
            })
            .context("en passant square is not beyond pushed pawn")?;
        if let Some(tip) = self.log.last_mut() {
            tip.last_move = Some(LastMove {
                piece: pawn,
                origin,
                destination,
            });
        }
        Ok(())
    }

    /// Serializes piece placement and side to move in FEN format.
    #[must_use]
    pub fn fen(&self) -> String {
        let mut result = String::new();
        for rank in 0..self.height() {
            let mut empty_squares = 0;
            for file in 0..self.width() {
                match self.get_piece_at(Square::new(rank, file)) {
                    Some(id) => {
                        if empty_squares != 0 {
                            result.push_str(&empty_squares.to_string());
                            empty_squares = 0;
                        }
                        result.push_str(&self.piece(id).to_string());
                    },
                    None => empty_squares += 1,
                }
            }
            if empty_squares != 0 {
                result.push_str(&empty_squares.to_string());
            }
            if rank + 1 != self.height() {
                result.push('/');
            }
        }
        format!("{result} {}", self.side_to_move())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn config(&self) -> BoardConfig {
        self.config
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.config.height
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.config.width
    }

    /// Returns true if the square is within the grid bounds.
    #[must_use]
    pub const fn contains(&self, square: Square) -> bool {
        square.rank() < self.config.height && square.file() < self.config.width
    }

    /// Longest distance a sliding piece can travel on this board.
    #[must_use]
    pub fn reach_limit(&self) -> i8 {
        i8::try_from(self.height().max(self.width()) - 1).unwrap_or(i8::MAX)
    }

    /// Algebraic name of the square, e.g. `(6, 3)` is "d2" on a standard
    /// board.
    #[must_use]
    pub fn square_name(&self, square: Square) -> String {
        format!("{}{}", self.file_name(square.file()), self.rank_name(square.rank()))
    }

    /// Letter of the file: 'a' for file 0.
    #[must_use]
    pub fn file_name(&self, file: u8) -> char {
        debug_assert!(file < self.width());
        char::from(b'a' + file)
    }

    /// Digit of the rank: 1 for the bottom row.
    #[must_use]
    pub fn rank_name(&self, rank: u8) -> char {
        debug_assert!(rank < self.height());
        char::from(b'0' + (self.height() - rank))
    }

    /// Inverse of [`Board::square_name`].
    ///
    /// # Errors
    ///
    /// [`Rejection::UnparsableNotation`] if the text is not a square name and
    /// [`Rejection::InvalidSquare`] if the square is outside of the board.
    pub fn parse_square(&self, name: &str) -> Result<Square, Rejection> {
        let Some((file, rank)) = name.chars().collect_tuple() else {
            return Err(Rejection::UnparsableNotation);
        };
        let file = self.parse_file(file)?;
        let rank = self.parse_rank(rank)?;
        Ok(Square::new(rank, file))
    }

    pub(crate) fn parse_file(&self, file: char) -> Result<u8, Rejection> {
        if !file.is_ascii_lowercase() {
            return Err(Rejection::UnparsableNotation);
        }
        let file = file as u8 - b'a';
        if file >= self.width() {
            return Err(Rejection::InvalidSquare);
        }
        Ok(file)
    }

    pub(crate) fn parse_rank(&self, rank: char) -> Result<u8, Rejection> {
        let Some(digit) = rank.to_digit(10) else {
            return Err(Rejection::UnparsableNotation);
        };
        match u8::try_from(digit) {
            Ok(digit) if (1..=self.height()).contains(&digit) => Ok(self.height() - digit),
            _ => Err(Rejection::InvalidSquare),
        }
    }

    /// Creates a new piece in the registry and places it on the board.
    ///
    /// # Errors
    ///
    /// [`Rejection::InvalidSquare`] if the square is outside of the board; no
    /// piece is created then.
    pub fn spawn(
        &mut self,
        team: Player,
        kind: PieceKind,
        square: Square,
    ) -> Result<PieceId, Rejection> {
        if !self.contains(square) {
            return Err(Rejection::InvalidSquare);
        }
        let id = self.registry.spawn(team, kind);
        self.place(id, square)?;
        Ok(id)
    }

    /// Puts the piece on the square, evicting any occupant. The change is
    /// merged into the latest log entry (the setup entry before any move was
    /// committed).
    ///
    /// # Errors
    ///
    /// [`Rejection::InvalidSquare`] if the square is outside of the board.
    pub fn place(&mut self, piece: PieceId, square: Square) -> Result<(), Rejection> {
        if !self.contains(square) {
            return Err(Rejection::InvalidSquare);
        }
        let mut touched = Vec::new();
        self.lift(piece, &mut touched);
        self.put(piece, square, &mut touched);
        self.amend_tip(&touched);
        Ok(())
    }

    /// Moves the piece from its current square to `square`, capturing any
    /// occupant, and appends one log entry. No rules are checked: see
    /// [`crate::chess::moves::validate`].
    ///
    /// # Errors
    ///
    /// [`Rejection::NoPieceAtOrigin`] if the piece is not on the board and
    /// [`Rejection::InvalidSquare`] if the square is outside of it.
    pub fn move_piece(&mut self, piece: PieceId, square: Square) -> Result<(), Rejection> {
        let Some(origin) = self.piece(piece).position() else {
            return Err(Rejection::NoPieceAtOrigin);
        };
        if !self.contains(square) {
            return Err(Rejection::InvalidSquare);
        }
        let captured = self.get_piece_at(square).filter(|occupant| *occupant != piece);
        self.make_move(&Move::new(piece, origin, square, captured))
    }

    /// Commits a move (including its auxiliary sub-move and promotion) as a
    /// single log entry.
    ///
    /// # Errors
    ///
    /// [`Rejection::NoPieceAtOrigin`] if a moving piece is not on its origin
    /// square and [`Rejection::InvalidSquare`] if a destination is outside of
    /// the board. The board is not modified in that case.
    pub fn make_move(&mut self, next_move: &Move) -> Result<(), Rejection> {
        let mut movers = vec![(next_move.piece(), next_move.origin(), Some(next_move.destination()))];
        if let Some(auxiliary) = next_move.auxiliary() {
            movers.push((auxiliary.piece, auxiliary.origin, auxiliary.destination));
        }
        for &(piece, origin, destination) in &movers {
            if self.piece(piece).position() != Some(origin) {
                return Err(Rejection::NoPieceAtOrigin);
            }
            if destination.is_some_and(|square| !self.contains(square)) {
                return Err(Rejection::InvalidSquare);
            }
        }
        let mut touched = Vec::new();
        // Lift every moving piece first so that castling can swap the king
        // and the rook around each other.
        for &(piece, _, _) in &movers {
            self.lift(piece, &mut touched);
        }
        for &(piece, _, destination) in &movers {
            if let Some(square) = destination {
                self.put(piece, square, &mut touched);
                self.registry.get_mut(piece).mark_moved();
            }
        }
        if let MoveKind::Promotion(promotion) = next_move.kind() {
            self.registry
                .get_mut(next_move.piece())
                .promote(promotion.into());
        }
        debug_assert!(next_move
            .captured()
            .map_or(true, |captured| !self.piece(captured).is_on_board()));
        self.log.push(Ply::default());
        self.amend_tip(&touched);
        if let Some(tip) = self.log.last_mut() {
            tip.last_move = Some(LastMove {
                piece: next_move.piece(),
                origin: next_move.origin(),
                destination: next_move.destination(),
            });
        }
        debug_assert!(self.is_consistent());
        Ok(())
    }

    /// Returns the piece on the square, if any.
    #[must_use]
    pub fn get_piece_at(&self, square: Square) -> Option<PieceId> {
        if !self.contains(square) {
            return None;
        }
        self.grid[self.cell(square)]
    }

    /// Finds the square the piece occupies by scanning the grid.
    #[must_use]
    pub fn get_coords(&self, piece: PieceId) -> Option<Square> {
        let width = usize::from(self.width());
        let coords = self
            .grid
            .iter()
            .position(|cell| *cell == Some(piece))
            .and_then(|index| {
                Some(Square::new(
                    u8::try_from(index / width).ok()?,
                    u8::try_from(index % width).ok()?,
                ))
            });
        debug_assert_eq!(coords, self.piece(piece).position());
        coords
    }

    /// Returns the piece with given id.
    ///
    /// # Panics
    ///
    /// If the piece was not created on this board.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> &Piece {
        self.registry.get(id)
    }

    /// Every piece of the game, including captured ones.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.registry.iter()
    }

    /// Pieces of `team` that are currently on the board.
    pub fn active(&self, team: Player) -> impl Iterator<Item = &Piece> {
        self.registry
            .iter()
            .filter(move |piece| piece.team() == team && piece.is_on_board())
    }

    /// King of `team` if it is on the board.
    #[must_use]
    pub fn king(&self, team: Player) -> Option<PieceId> {
        self.active(team)
            .find(|piece| piece.kind() == PieceKind::King)
            .map(Piece::id)
    }

    /// Produces an independent board for simulation: mutating the copy never
    /// affects the original grid, pieces or log.
    ///
    /// The history is not carried over: the copy's setup entry is the current
    /// position along with the last move, so its size does not depend on the
    /// length of the game. Use [`Clone`] to keep the whole log.
    #[must_use]
    pub fn copy(&self) -> Self {
        let setup = Ply {
            changes: self
                .registry
                .iter()
                .filter(|piece| piece.is_on_board())
                .map(|piece| (piece.id(), self.occupancy(piece.id())))
                .collect(),
            last_move: self.last_move(),
        };
        Self {
            config: BoardConfig {
                first_to_move: self.side_to_move(),
                ..self.config
            },
            grid: self.grid.clone(),
            registry: self.registry.clone(),
            log: vec![setup],
        }
    }

    /// Discards up to `plies` latest log entries and rebuilds the grid from the
    /// rest of the log. The setup entry is never discarded. Returns the number
    /// of plies actually reverted.
    pub fn revert(&mut self, plies: usize) -> usize {
        let plies = plies.min(self.plies());
        self.log.truncate(self.log.len() - plies);
        self.rebuild();
        plies
    }

    /// Number of committed moves.
    #[must_use]
    pub fn plies(&self) -> usize {
        self.log.len() - 1
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn side_to_move(&self) -> Player {
        if self.plies() % 2 == 0 {
            self.config.first_to_move
        } else {
            self.config.first_to_move.opponent()
        }
    }

    /// The most recently committed move (or the pawn push implied by the en
    /// passant square of a FEN setup).
    #[must_use]
    pub fn last_move(&self) -> Option<LastMove> {
        self.log.last().and_then(Ply::last_move)
    }

    /// The state log, setup entry first.
    #[must_use]
    pub fn log(&self) -> &[Ply] {
        &self.log
    }

    fn cell(&self, square: Square) -> usize {
        usize::from(square.rank()) * usize::from(self.width()) + usize::from(square.file())
    }

    /// Removes the piece from its square, if it has one.
    fn lift(&mut self, piece: PieceId, touched: &mut Vec<PieceId>) {
        if let Some(square) = self.piece(piece).position() {
            let cell = self.cell(square);
            self.grid[cell] = None;
            self.registry.get_mut(piece).set_position(None);
            touched.push(piece);
        }
    }

    /// Puts a lifted piece on the square, capturing whatever stands there.
    fn put(&mut self, piece: PieceId, square: Square, touched: &mut Vec<PieceId>) {
        debug_assert!(!self.piece(piece).is_on_board());
        if let Some(occupant) = self.get_piece_at(square) {
            self.lift(occupant, touched);
        }
        let cell = self.cell(square);
        self.grid[cell] = Some(piece);
        self.registry.get_mut(piece).set_position(Some(square));
        touched.push(piece);
    }

    fn occupancy(&self, piece: PieceId) -> Occupancy {
        let piece = self.piece(piece);
        piece
            .position()
            .map_or(Occupancy::Removed, |square| Occupancy::At(*piece, square))
    }

    /// Records the current state of the touched pieces in the latest log
    /// entry.
    fn amend_tip(&mut self, touched: &[PieceId]) {
        let changes = touched
            .iter()
            .unique()
            .map(|id| (*id, self.occupancy(*id)))
            .collect_vec();
        if let Some(tip) = self.log.last_mut() {
            tip.changes.extend(changes);
        }
    }

    fn rebuild(&mut self) {
        let merged: BTreeMap<PieceId, Occupancy> = self
            .log
            .iter()
            .flat_map(|ply| ply.changes.iter().map(|(id, occupancy)| (*id, *occupancy)))
            .collect();
        self.grid.fill(None);
        for piece in self.registry.iter_mut() {
            piece.set_position(None);
        }
        for (id, occupancy) in merged {
            if let Occupancy::At(snapshot, square) = occupancy {
                let cell = self.cell(square);
                assert!(
                    self.grid[cell].is_none(),
                    "state log places two pieces on {square}"
                );
                self.grid[cell] = Some(id);
                *self.registry.get_mut(id) = snapshot;
            }
        }
        debug_assert!(self.is_consistent());
    }

    /// Checks that the cached piece positions match the grid.
    fn is_consistent(&self) -> bool {
        self.registry.iter().all(|piece| match piece.position() {
            Some(square) => self.get_piece_at(square) == Some(piece.id()),
            None => !self.grid.contains(&Some(piece.id())),
        })
    }
}

impl fmt::Display for Board {
    /// Dumps the board in a simple format ('.' for empty square, FEN algebraic
    /// symbol for piece), top rank first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in 0..self.height() {
            for file in 0..self.width() {
                match self.get_piece_at(Square::new(rank, file)) {
                    Some(id) => write!(f, "{}", self.piece(id)),
                    None => f.write_char('.'),
                }?;
                if file + 1 != self.width() {
                    f.write_str(SQUARE_SEPARATOR)?;
                }
            }
            if rank + 1 != self.height() {
                f.write_str(LINE_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starting_board() {
        let board = Board::starting();
        assert_eq!(
            board.to_string(),
            "r n b q k b n r\n\
             p p p p p p p p\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             P P P P P P P P\n\
             R N B Q K B N R"
        );
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.plies(), 0);
        assert_eq!(board.side_to_move(), Player::White);
        assert_eq!(board.log()[0].changes().len(), 32);
        let king = board.king(Player::White).unwrap();
        assert_eq!(board.get_coords(king), Some(Square::new(7, 4)));
        assert_eq!(board.square_name(Square::new(7, 4)), "e1");
    }

    #[test]
    fn empty_board() {
        let board = Board::new(BoardConfig::default()).unwrap();
        assert_eq!(
            board.to_string(),
            ". . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . ."
        );
        assert_eq!(board.fen(), "8/8/8/8/8/8/8/8 w");
    }

    #[test]
    #[should_panic(expected = "board width should be within 1..=8, got 9")]
    fn oversized_board() {
        let _ = Board::new(BoardConfig {
            width: 9,
            ..BoardConfig::default()
        })
        .unwrap();
    }

    #[test]
    fn place_out_of_bounds() {
        let mut board = Board::new(BoardConfig {
            height: 4,
            width: 5,
            first_to_move: Player::Black,
        })
        .unwrap();
        assert_eq!(
            board.spawn(Player::White, PieceKind::Rook, Square::new(4, 0)),
            Err(Rejection::InvalidSquare)
        );
        assert!(board.pieces().next().is_none());
        let rook = board
            .spawn(Player::White, PieceKind::Rook, Square::new(3, 4))
            .unwrap();
        assert_eq!(
            board.place(rook, Square::new(0, 5)),
            Err(Rejection::InvalidSquare)
        );
        assert_eq!(board.get_coords(rook), Some(Square::new(3, 4)));
        assert_eq!(board.square_name(Square::new(3, 4)), "e1");
        assert_eq!(board.side_to_move(), Player::Black);
    }

    #[test]
    fn place_evicts_occupant() {
        let mut board = Board::new(BoardConfig::default()).unwrap();
        let first = board
            .spawn(Player::White, PieceKind::Queen, Square::new(3, 3))
            .unwrap();
        let second = board
            .spawn(Player::Black, PieceKind::Queen, Square::new(3, 3))
            .unwrap();
        assert_eq!(board.get_piece_at(Square::new(3, 3)), Some(second));
        assert!(!board.piece(first).is_on_board());
        assert_eq!(board.get_coords(first), None);
        assert_eq!(board.log()[0].changes()[&first], Occupancy::Removed);
    }

    #[test]
    fn move_piece_logs_delta() {
        let mut board = Board::new(BoardConfig::default()).unwrap();
        let rook = board
            .spawn(Player::White, PieceKind::Rook, Square::new(7, 0))
            .unwrap();
        let knight = board
            .spawn(Player::Black, PieceKind::Knight, Square::new(2, 0))
            .unwrap();
        let bystander = board
            .spawn(Player::Black, PieceKind::King, Square::new(0, 4))
            .unwrap();
        board.move_piece(rook, Square::new(2, 0)).unwrap();
        assert_eq!(board.plies(), 1);
        let ply = &board.log()[1];
        assert_eq!(ply.changes().len(), 2);
        assert_eq!(ply.changes()[&knight], Occupancy::Removed);
        assert!(matches!(
            ply.changes()[&rook],
            Occupancy::At(piece, square) if square == Square::new(2, 0) && piece.moved()
        ));
        assert!(!ply.changes().contains_key(&bystander));
        assert_eq!(
            ply.last_move(),
            Some(LastMove {
                piece: rook,
                origin: Square::new(7, 0),
                destination: Square::new(2, 0),
            })
        );
        assert_eq!(board.piece(rook).position(), Some(Square::new(2, 0)));
        assert_eq!(board.get_coords(rook), Some(Square::new(2, 0)));
        assert_eq!(board.side_to_move(), Player::Black);
    }

    #[test]
    fn move_captured_piece() {
        let mut board = Board::new(BoardConfig::default()).unwrap();
        let rook = board
            .spawn(Player::White, PieceKind::Rook, Square::new(7, 0))
            .unwrap();
        let knight = board
            .spawn(Player::Black, PieceKind::Knight, Square::new(2, 0))
            .unwrap();
        board.move_piece(rook, Square::new(2, 0)).unwrap();
        assert_eq!(
            board.move_piece(knight, Square::new(0, 1)),
            Err(Rejection::NoPieceAtOrigin)
        );
        assert_eq!(
            board.move_piece(rook, Square::new(2, 8)),
            Err(Rejection::InvalidSquare)
        );
        assert_eq!(board.plies(), 1);
    }

    #[test]
    fn revert_restores_grid() {
        let mut board = Board::starting();
        let original = board.to_string();
        let pawn = board.get_piece_at(Square::new(6, 4)).unwrap();
        let knight = board.get_piece_at(Square::new(0, 6)).unwrap();
        board.move_piece(pawn, Square::new(4, 4)).unwrap();
        board.move_piece(knight, Square::new(2, 5)).unwrap();
        board.move_piece(pawn, Square::new(3, 4)).unwrap();
        let after_two = {
            let mut copy = board.clone();
            assert_eq!(copy.revert(1), 1);
            copy.to_string()
        };
        assert_eq!(board.revert(3), 3);
        assert_eq!(board.to_string(), original);
        assert!(!board.piece(pawn).moved());
        assert_eq!(board.side_to_move(), Player::White);
        assert_eq!(board.last_move(), None);
        board.move_piece(pawn, Square::new(4, 4)).unwrap();
        board.move_piece(knight, Square::new(2, 5)).unwrap();
        assert_eq!(board.to_string(), after_two);
    }

    #[test]
    fn revert_is_clamped() {
        let mut board = Board::starting();
        let pawn = board.get_piece_at(Square::new(6, 0)).unwrap();
        board.move_piece(pawn, Square::new(5, 0)).unwrap();
        assert_eq!(board.revert(10), 1);
        assert_eq!(board.revert(1), 0);
        assert_eq!(board.pieces().filter(|piece| piece.is_on_board()).count(), 32);
    }

    #[test]
    fn copy_is_independent() {
        let board = Board::starting();
        let mut copy = board.copy();
        let pawn = copy.get_piece_at(Square::new(6, 4)).unwrap();
        copy.move_piece(pawn, Square::new(4, 4)).unwrap();
        assert_eq!(board.get_piece_at(Square::new(6, 4)), Some(pawn));
        assert_eq!(board.get_piece_at(Square::new(4, 4)), None);
        assert_eq!(board.plies(), 0);
        assert_eq!(board.piece(pawn).position(), Some(Square::new(6, 4)));
    }

    #[test]
    fn copy_starts_from_current_position() {
        let mut board = Board::starting();
        let pawn = board.get_piece_at(Square::new(6, 4)).unwrap();
        let knight = board.get_piece_at(Square::new(0, 6)).unwrap();
        board.move_piece(pawn, Square::new(4, 4)).unwrap();
        board.move_piece(knight, Square::new(2, 5)).unwrap();
        board.move_piece(pawn, Square::new(3, 4)).unwrap();
        let mut copy = board.copy();
        assert_eq!(copy.plies(), 0);
        assert_eq!(copy.log()[0].changes().len(), 32);
        assert_eq!(copy.side_to_move(), board.side_to_move());
        assert_eq!(copy.last_move(), board.last_move());
        assert_eq!(copy.fen(), board.fen());
        assert_eq!(copy.revert(1), 0);
        assert_eq!(copy.to_string(), board.to_string());
        assert!(copy.piece(pawn).moved());
    }

    #[test]
    fn fen_round_trip() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w",
            "8/8/8/8/2P5/3k4/8/KB6 b",
            "k3/4/4/3K w",
        ] {
            assert_eq!(Board::from_fen(fen).unwrap().fen(), fen);
        }
    }

    #[test]
    fn fen_flags() {
        let board =
            Board::from_fen("r3k2r/8/8/3pP3/8/8/1P6/R3K2R w Kq d6 0 2").unwrap();
        let flag = |square: Square| board.piece(board.get_piece_at(square).unwrap()).moved();
        // Kings keep castling rights, so they have not moved.
        assert!(!flag(Square::new(7, 4)));
        assert!(!flag(Square::new(0, 4)));
        assert!(!flag(Square::new(7, 7)));
        assert!(flag(Square::new(7, 0)));
        assert!(!flag(Square::new(0, 0)));
        assert!(flag(Square::new(0, 7)));
        // Pawns off their starting ranks have moved.
        assert!(!flag(Square::new(6, 1)));
        assert!(flag(Square::new(3, 4)));
        assert_eq!(
            board.last_move(),
            Some(LastMove {
                piece: board.get_piece_at(Square::new(3, 3)).unwrap(),
                origin: Square::new(1, 3),
                destination: Square::new(3, 3),
            })
        );
    }

    #[test]
    fn incorrect_fen() {
        assert!(Board::from_fen("").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/9 w").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/7 w").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8/8 w").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/7x w").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 x").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 w KK").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 w - e3").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1 extra").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 w - - x 1").is_err());
    }
}
