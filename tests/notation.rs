use gambit::chess::board::Board;
use gambit::chess::core::{Promotion, Rejection};
use gambit::chess::moves::{legal_moves, validate, MoveKind};
use gambit::chess::notation::{from_notation, play, to_notation};
use itertools::Itertools;
use pretty_assertions::assert_eq;

/// Every legal move is rendered to notation and resolved back to the same
/// move.
fn round_trip(fen: &str) {
    let board = Board::from_fen(fen).unwrap();
    for next_move in legal_moves(&board) {
        let promotion = match next_move.kind() {
            MoveKind::Promotion(promotion) => Some(promotion),
            _ => None,
        };
        let validated = validate(&board, next_move.piece(), next_move.destination(), promotion)
            .unwrap_or_else(|e| panic!("{fen}: {}: {e}", next_move.uci(&board)));
        let text = validated.notation().unwrap().to_string();
        assert_eq!(to_notation(&next_move, &board), text);
        let parsed = from_notation(&text, &board).unwrap_or_else(|e| panic!("{fen}: {text}: {e}"));
        assert_eq!(parsed.piece(), next_move.piece(), "{fen}: {text}");
        assert_eq!(parsed.destination(), next_move.destination(), "{fen}: {text}");
        assert_eq!(parsed.kind(), next_move.kind(), "{fen}: {text}");
        assert_eq!(parsed.captured(), next_move.captured(), "{fen}: {text}");
    }
}

#[test]
fn notation_round_trip() {
    round_trip("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    round_trip("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    round_trip("r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1");
    round_trip("2n4k/1PP5/6K1/3Pp1Q1/3N4/3P4/P3R3/8 w - e6 0 1");
    round_trip("4k3/8/8/8/R6R/8/8/R3K3 w - - 0 1");
    round_trip("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    round_trip("7k/8/8/2N3N1/8/2N3N1/8/K7 w - - 0 1");
}

#[test]
fn notation_of_special_moves() {
    let board = Board::from_fen("r3k2r/1P6/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1").unwrap();
    let notations = legal_moves(&board)
        .iter()
        .map(|next_move| to_notation(next_move, &board))
        .collect_vec();
    for expected in ["O-O", "O-O-O", "xd6", "e6", "xa8=Q", "b8=N"] {
        assert!(notations.contains(&expected.to_string()), "{expected}");
    }
}

#[test]
fn knight_disambiguation() {
    // Four knights reach e4.
    let board = Board::from_fen("7k/8/8/2N3N1/8/2N3N1/8/K7 w - - 0 1").unwrap();
    assert_eq!(
        from_notation("Ne4", &board).map(|m| m.destination()),
        Err(Rejection::AmbiguousNotation)
    );
    assert_eq!(
        from_notation("Nce4", &board).map(|m| m.destination()),
        Err(Rejection::AmbiguousNotation)
    );
    assert_eq!(
        from_notation("N3e4", &board).map(|m| m.destination()),
        Err(Rejection::AmbiguousNotation)
    );
    assert_eq!(
        from_notation("Nc3e4", &board).map(|m| m.origin()),
        board.parse_square("c3")
    );
    assert_eq!(
        from_notation("Ng5xe4", &board).map(|m| m.origin()),
        board.parse_square("g5")
    );
    let notations = legal_moves(&board)
        .iter()
        .map(|next_move| to_notation(next_move, &board))
        .collect_vec();
    assert!(notations.iter().all_unique(), "{notations:?}");
    for expected in ["Nc3e4", "Nc5e4", "Ng3e4", "Ng5e4", "Nce6", "N3a4", "N5a4"] {
        assert!(notations.contains(&expected.to_string()), "{expected}");
    }
    let mut board = board;
    let played = play(&mut board, "Nc3e4").unwrap();
    assert_eq!(played.notation(), Some("Nc3e4"));
    let _ = board.revert(1);
    assert_eq!(
        from_notation("Nc3e4", &board).map(|m| m.notation().map(str::to_string)),
        Ok(Some("Nc3e4".to_string()))
    );
}

#[test]
fn underpromotion() {
    let mut board = Board::from_fen("8/4P1k1/8/8/8/8/8/K7 w - - 0 1").unwrap();
    let played = play(&mut board, "e8=N").unwrap();
    assert_eq!(played.kind(), MoveKind::Promotion(Promotion::Knight));
    assert_eq!(played.notation(), Some("e8=N"));
    assert_eq!(board.fen(), "4N3/6k1/8/8/8/8/8/K7 b");
    // The knight gives check and guards f6.
    assert_eq!(
        play(&mut board, "Kf6").map(|m| m.destination()),
        Err(Rejection::LeavesKingInCheck)
    );
    let _ = board.revert(1);
    // Promotion defaults to a queen.
    let played = play(&mut board, "e8").unwrap();
    assert_eq!(played.notation(), Some("e8=Q"));
    assert_eq!(board.fen(), "4Q3/6k1/8/8/8/8/8/K7 b");
}
