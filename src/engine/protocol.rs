//! Commands of the text protocol understood by the [`super::Engine`].

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    /// `new`
    NewGame,
    /// `position startpos|fen <FEN> [moves <notation>...]`
    SetPosition {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// `move <notation>` or the notation on its own.
    Play(String),
    /// `undo [plies]`
    Undo(usize),
    /// `moves`
    ListMoves,
    /// `d`
    Display,
    /// `quit`
    Quit,
    Unknown(String),
}

fn parse_setposition(parts: &[&str]) -> Command {
    let moves_index = parts.iter().position(|&x| x == "moves");
    let end = moves_index.unwrap_or(parts.len());
    let fen = match parts.get(1) {
        Some(&"startpos") if end == 2 => None,
        Some(&"fen") if end > 2 => Some(parts[2..end].join(" ")),
        _ => return Command::Unknown(parts.join(" ")),
    };
    let moves = moves_index.map_or_else(Vec::new, |moves_index| {
        parts[moves_index + 1..]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    });
    Command::SetPosition { fen, moves }
}

fn parse_undo(parts: &[&str]) -> Command {
    match parts {
        [_] => Command::Undo(1),
        [_, plies] => plies
            .parse()
            .map_or_else(|_| Command::Unknown(parts.join(" ")), Command::Undo),
        _ => Command::Unknown(parts.join(" ")),
    }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.is_empty() {
            return Self::Unknown(input.to_string());
        }

        match (parts[0], parts.len()) {
            ("new", 1) => Self::NewGame,
            ("position", _) => parse_setposition(&parts),
            ("move", 2) => Self::Play(parts[1].to_string()),
            ("undo", _) => parse_undo(&parts),
            ("moves", 1) => Self::ListMoves,
            ("d", 1) => Self::Display,
            ("quit", 1) => Self::Quit,
            (notation, 1) => Self::Play(notation.to_string()),
            _ => Self::Unknown(input.to_string()),
        }
    }
}
