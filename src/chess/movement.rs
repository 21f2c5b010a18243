//! Combinator language describing how pieces move.
//!
//! A movement rule is built from directional primitives (`up`, `forward`,
//! `diagonally`, ...) that are combined by Cartesian product against the
//! currently "open" set of relative vectors. `or` starts an independent
//! branch, `up_to` turns single steps into slides. The builder is an immutable
//! value: every combinator consumes it and returns the next state.
//!
//! ```
//! use gambit::chess::core::Player;
//! use gambit::chess::movement::MoveBuilder;
//!
//! // Knight: two squares vertically and one horizontally, or the other way
//! // around.
//! let knight = MoveBuilder::new(Player::White)
//!     .vertically(2)
//!     .and()
//!     .horizontally(1)
//!     .or()
//!     .vertically(1)
//!     .and()
//!     .horizontally(2);
//! assert_eq!(knight.vectors().len(), 8);
//! ```
//!
//! [`MoveBuilder::finalize`] turns relative vectors into absolute squares on a
//! concrete [`Board`].

use std::ops::RangeInclusive;

use itertools::Itertools;

use crate::chess::bitboard::Bitboard;
use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Square};
use crate::chess::piece::Piece;

/// Relative `(rank, file)` displacement.
pub type Vector = (i8, i8);

const IDENTITY: Vector = (0, 0);

/// Argument of the directional primitives: a single distance, an explicit set
/// of distances or an inclusive range of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Magnitude {
    #[allow(missing_docs)]
    Single(i8),
    #[allow(missing_docs)]
    Set(Vec<i8>),
    #[allow(missing_docs)]
    Range(RangeInclusive<i8>),
}

impl Magnitude {
    fn values(&self) -> Vec<i8> {
        match self {
            Self::Single(value) => vec![*value],
            Self::Set(values) => values.clone(),
            Self::Range(range) => range.clone().collect(),
        }
    }
}

impl From<i8> for Magnitude {
    fn from(value: i8) -> Self {
        Self::Single(value)
    }
}

impl From<&[i8]> for Magnitude {
    fn from(values: &[i8]) -> Self {
        Self::Set(values.to_vec())
    }
}

impl<const N: usize> From<[i8; N]> for Magnitude {
    fn from(values: [i8; N]) -> Self {
        Self::Set(values.to_vec())
    }
}

impl From<RangeInclusive<i8>> for Magnitude {
    fn from(range: RangeInclusive<i8>) -> Self {
        Self::Range(range)
    }
}

/// Policy for the pawn-specific filtering of [`MoveBuilder::finalize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reach {
    /// Squares the piece can move to: pawns only step diagonally to capture
    /// and only push onto empty squares.
    Moves,
    /// Squares the piece attacks: pawn diagonals regardless of occupancy, no
    /// pawn pushes. Used for check detection.
    Attacks,
}

/// Immutable builder of movement rules. See the [module
/// documentation](self).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveBuilder {
    team: Player,
    open: Vec<Vector>,
    branches: Vec<Vector>,
}

impl MoveBuilder {
    /// Starts a rule for a piece of `team`: the open set only contains the
    /// identity vector.
    #[must_use]
    pub fn new(team: Player) -> Self {
        Self {
            team,
            open: vec![IDENTITY],
            branches: Vec::new(),
        }
    }

    /// Toward decreasing rank.
    #[must_use]
    pub fn up(self, magnitude: impl Into<Magnitude>) -> Self {
        self.primitive(magnitude.into(), &[(-1, 0)])
    }

    /// Toward increasing rank.
    #[must_use]
    pub fn down(self, magnitude: impl Into<Magnitude>) -> Self {
        self.primitive(magnitude.into(), &[(1, 0)])
    }

    /// Toward decreasing file.
    #[must_use]
    pub fn left(self, magnitude: impl Into<Magnitude>) -> Self {
        self.primitive(magnitude.into(), &[(0, -1)])
    }

    /// Toward increasing file.
    #[must_use]
    pub fn right(self, magnitude: impl Into<Magnitude>) -> Self {
        self.primitive(magnitude.into(), &[(0, 1)])
    }

    /// [`MoveBuilder::up`] for White, [`MoveBuilder::down`] for Black.
    #[must_use]
    pub fn forward(self, magnitude: impl Into<Magnitude>) -> Self {
        let direction = (self.team.forward(), 0);
        self.primitive(magnitude.into(), &[direction])
    }

    /// Both left and right.
    #[must_use]
    pub fn horizontally(self, magnitude: impl Into<Magnitude>) -> Self {
        self.primitive(magnitude.into(), &[(0, -1), (0, 1)])
    }

    /// Both up and down.
    #[must_use]
    pub fn vertically(self, magnitude: impl Into<Magnitude>) -> Self {
        self.primitive(magnitude.into(), &[(-1, 0), (1, 0)])
    }

    /// All four diagonal directions.
    #[must_use]
    pub fn diagonally(self, magnitude: impl Into<Magnitude>) -> Self {
        self.primitive(magnitude.into(), &[(-1, -1), (-1, 1), (1, -1), (1, 1)])
    }

    /// No-op connector for readability.
    #[must_use]
    pub const fn and(self) -> Self {
        self
    }

    /// Commits the open vectors as a finished branch and starts a new one from
    /// the identity vector.
    #[must_use]
    pub fn or(self) -> Self {
        let Self {
            team,
            open,
            mut branches,
        } = self;
        branches.extend(open);
        Self {
            team,
            open: vec![IDENTITY],
            branches,
        }
    }

    /// Repeats every open vector with multipliers `1..=times`, e.g. turning a
    /// single diagonal step into a bishop slide.
    #[must_use]
    pub fn up_to(self, times: i8) -> Self {
        let open = self
            .open
            .iter()
            .cartesian_product(1..=times)
            .map(|(&(ranks, files), multiplier)| {
                (ranks.saturating_mul(multiplier), files.saturating_mul(multiplier))
            })
            .collect();
        Self { open, ..self }
    }

    /// All vectors of the rule: committed branches followed by the open set,
    /// without duplicates and without the identity vector.
    #[must_use]
    pub fn vectors(&self) -> Vec<Vector> {
        self.branches
            .iter()
            .chain(self.open.iter())
            .copied()
            .filter(|vector| *vector != IDENTITY)
            .unique()
            .collect()
    }

    /// Translates the rule into absolute squares for `piece` on the `board`.
    ///
    /// Off-grid squares are discarded. Unless the piece is a knight, squares
    /// with a blocked path are dropped too. Pawn moves are further filtered
    /// according to `reach`.
    #[must_use]
    pub fn finalize(&self, piece: &Piece, board: &Board, reach: Reach) -> Bitboard {
        let Some(origin) = piece.position() else {
            return Bitboard::empty();
        };
        let mut result = Bitboard::empty();
        for vector in self.vectors() {
            let Some(destination) = origin.shift(vector).filter(|square| board.contains(*square))
            else {
                continue;
            };
            let blocked = if piece.kind() == PieceKind::Knight {
                occupied_by(board, destination, piece.team())
            } else {
                is_blocked(board, origin, destination, piece.team())
            };
            if blocked {
                continue;
            }
            if piece.kind() == PieceKind::Pawn {
                let occupant = board.get_piece_at(destination);
                let diagonal = vector.1 != 0;
                let allowed = match (diagonal, reach) {
                    (true, Reach::Attacks) => true,
                    (true, Reach::Moves) => occupant.is_some(),
                    (false, Reach::Attacks) => false,
                    (false, Reach::Moves) => occupant.is_none(),
                };
                if !allowed {
                    continue;
                }
            }
            result.insert(destination);
        }
        result
    }

    fn primitive(self, magnitude: Magnitude, directions: &[Vector]) -> Self {
        let steps: Vec<Vector> = magnitude
            .values()
            .into_iter()
            .cartesian_product(directions)
            .map(|(distance, &(ranks, files))| {
                (ranks.saturating_mul(distance), files.saturating_mul(distance))
            })
            .collect();
        let open = self
            .open
            .iter()
            .cartesian_product(&steps)
            .map(|(&(ranks, files), &(step_ranks, step_files))| {
                (
                    ranks.saturating_add(step_ranks),
                    files.saturating_add(step_files),
                )
            })
            .collect();
        Self { open, ..self }
    }
}

/// Squares strictly between `origin` and `destination`, walking one unit per
/// axis toward the destination on every step.
#[must_use]
pub fn path(origin: Square, destination: Square) -> Vec<Square> {
    let step = |from: u8, to: u8| -> i8 {
        match from.cmp(&to) {
            std::cmp::Ordering::Less => 1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => -1,
        }
    };
    let mut squares = Vec::new();
    let mut current = origin;
    loop {
        let vector = (
            step(current.rank(), destination.rank()),
            step(current.file(), destination.file()),
        );
        match current.shift(vector) {
            Some(next) if next != destination => {
                squares.push(next);
                current = next;
            },
            _ => break,
        }
    }
    squares
}

/// A move is blocked if any square on its path is occupied or if the
/// destination holds a piece of the mover's team. An opposing piece on the
/// destination is a capture.
#[must_use]
pub fn is_blocked(board: &Board, origin: Square, destination: Square, team: Player) -> bool {
    path(origin, destination)
        .into_iter()
        .any(|square| board.get_piece_at(square).is_some())
        || occupied_by(board, destination, team)
}

fn occupied_by(board: &Board, square: Square, team: Player) -> bool {
    board
        .get_piece_at(square)
        .is_some_and(|id| board.piece(id).team() == team)
}
