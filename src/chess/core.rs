//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};

use anyhow::bail;

/// Largest supported board side. Reachable-square sets are stored in a single
/// [`crate::chess::bitboard::Bitboard`], so both height and width are bounded
/// by it.
pub const MAX_BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const MAX_BOARD_SIZE: u8 = MAX_BOARD_WIDTH * MAX_BOARD_WIDTH;

/// A cell of the grid addressed by `(rank, file)`.
///
/// Rank 0 is the top row (Black's back rank on a standard board) and file 0 is
/// the leftmost column, so the standard "a8" is `(0, 0)` and "h1" is `(7, 7)`.
///
/// ```
/// use gambit::chess::core::Square;
///
/// let square = Square::new(6, 3);
/// assert_eq!(square.rank(), 6);
/// assert_eq!(square.file(), 3);
/// assert_eq!(square, Square::new(6, 3));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Connects rank (row) and file (column) to form a full square.
    #[must_use]
    pub const fn new(rank: u8, file: u8) -> Self {
        Self { rank, file }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub const fn file(self) -> u8 {
        self.file
    }

    /// Shifts the square by a relative vector. Returns [`None`] if either
    /// coordinate would become negative or exceed [`MAX_BOARD_WIDTH`]; the
    /// board is responsible for checking its actual bounds.
    #[must_use]
    pub fn shift(self, (ranks, files): (i8, i8)) -> Option<Self> {
        let rank = i16::from(self.rank) + i16::from(ranks);
        let file = i16::from(self.file) + i16::from(files);
        let range = 0..i16::from(MAX_BOARD_WIDTH);
        if !range.contains(&rank) || !range.contains(&file) {
            return None;
        }
        Some(Self::new(
            u8::try_from(rank).ok()?,
            u8::try_from(file).ok()?,
        ))
    }

    /// Index of the square within a [`MAX_BOARD_WIDTH`]-wide row-major layout.
    #[must_use]
    pub(crate) const fn index(self) -> u8 {
        self.rank * MAX_BOARD_WIDTH + self.file
    }

    pub(crate) const fn from_index(index: u8) -> Self {
        Self::new(index / MAX_BOARD_WIDTH, index % MAX_BOARD_WIDTH)
    }
}

impl fmt::Display for Square {
    /// Coordinates rather than algebraic name: the algebraic rank digit
    /// depends on the board height.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rank, self.file)
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank delta of a single step "forward": White advances toward the top of
    /// the board (decreasing rank), Black toward the bottom.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("player should be 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Uppercase letter used in algebraic notation. Pawns don't have one.
    #[must_use]
    pub const fn letter(self) -> Option<char> {
        match self {
            Self::King => Some('K'),
            Self::Queen => Some('Q'),
            Self::Rook => Some('R'),
            Self::Bishop => Some('B'),
            Self::Knight => Some('N'),
            Self::Pawn => None,
        }
    }

    /// Symbol of a piece owned by `player`: uppercase for White, lowercase for
    /// Black.
    #[must_use]
    pub const fn symbol(self, player: Player) -> char {
        let symbol = match self.letter() {
            Some(letter) => letter,
            None => 'P',
        };
        match player {
            Player::White => symbol,
            Player::Black => symbol.to_ascii_lowercase(),
        }
    }
}

impl TryFrom<char> for PieceKind {
    type Error = anyhow::Error;

    fn try_from(letter: char) -> anyhow::Result<Self> {
        match letter {
            'K' => Ok(Self::King),
            'Q' => Ok(Self::Queen),
            'R' => Ok(Self::Rook),
            'B' => Ok(Self::Bishop),
            'N' => Ok(Self::Knight),
            'P' => Ok(Self::Pawn),
            _ => bail!("piece letter should be within \"KQRBNP\", got '{letter}'"),
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.symbol(Player::White))
    }
}

/// A pawn can be promoted to a queen, rook, bishop or a knight.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    #[allow(missing_docs)]
    pub const ALL: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];
}

impl From<Promotion> for PieceKind {
    fn from(promotion: Promotion) -> Self {
        match promotion {
            Promotion::Queen => Self::Queen,
            Promotion::Rook => Self::Rook,
            Promotion::Bishop => Self::Bishop,
            Promotion::Knight => Self::Knight,
        }
    }
}

impl TryFrom<char> for Promotion {
    type Error = anyhow::Error;

    fn try_from(letter: char) -> anyhow::Result<Self> {
        match letter {
            'Q' => Ok(Self::Queen),
            'R' => Ok(Self::Rook),
            'B' => Ok(Self::Bishop),
            'N' => Ok(Self::Knight),
            _ => bail!("promotion should be within \"QRBN\", got '{letter}'"),
        }
    }
}

/// Reasons for rejecting a board operation or a requested move. None of these
/// are fatal: the board is left untouched and the caller can retry with a
/// different input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Coordinates are outside of the grid bounds.
    InvalidSquare,
    /// The piece is not currently on the board.
    NoPieceAtOrigin,
    /// The piece does not belong to the player to move.
    NotYourTurn,
    /// The destination is not reachable by the piece.
    IllegalMove,
    /// The destination is occupied by a piece of the same team.
    OccupiedByAlly,
    /// Committing the move would leave the mover's king in check.
    LeavesKingInCheck,
    /// Disambiguation is not sufficient to select exactly one piece.
    AmbiguousNotation,
    /// The text does not match the notation grammar.
    UnparsableNotation,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidSquare => "square is outside of the board",
            Self::NoPieceAtOrigin => "piece is not on the board",
            Self::NotYourTurn => "piece does not belong to the player to move",
            Self::IllegalMove => "destination is not reachable",
            Self::OccupiedByAlly => "destination is occupied by an allied piece",
            Self::LeavesKingInCheck => "move leaves the king in check",
            Self::AmbiguousNotation => "notation matches more than one piece",
            Self::UnparsableNotation => "notation can not be parsed",
        })
    }
}

impl std::error::Error for Rejection {}
