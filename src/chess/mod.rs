//! Implementation of chess rules: the board and its history, movement rules,
//! move validation, check detection and algebraic notation.

pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod core;
pub mod movement;
pub mod moves;
pub mod notation;
pub mod piece;
