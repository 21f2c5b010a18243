#![no_main]
use gambit::chess::board::Board;
use gambit::chess::moves::legal_moves;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use shakmaty::{CastlingMode, Chess, Position};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(board) = Board::from_fen(input) else {
        return;
    };
    // Boards shakmaty does not accept (no kings, smaller than 8x8) are not
    // compared.
    let Ok(shakmaty_setup) = input.parse::<shakmaty::fen::Fen>() else {
        return;
    };
    let Ok(shakmaty_position) = shakmaty_setup.into_position::<Chess>(CastlingMode::Standard)
    else {
        return;
    };
    assert_eq!(
        legal_moves(&board)
            .iter()
            .map(|m| m.uci(&board))
            .sorted()
            .collect::<Vec<_>>(),
        shakmaty_position
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .sorted()
            .collect::<Vec<_>>()
    );
});
