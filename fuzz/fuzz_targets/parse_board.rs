#![no_main]
use gambit::chess::board::Board;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(board) = Board::from_fen(input) else {
        return;
    };
    // Placement and side to move survive serialization.
    let reparsed = Board::from_fen(&board.fen()).expect("serialized board should be parsed back");
    assert_eq!(reparsed.fen(), board.fen());
});
