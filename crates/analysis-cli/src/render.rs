//! Text and JSON output of the analysis board.

use analysis_board::{AnalysisSnapshot, Arrow, BoardConfig, Orientation, Position};
use serde::Serialize;
use shakmaty::{Board, Color, File, Piece, Rank, Role, Square};
use std::fmt::Write as _;

/// How the board is drawn and which way up.
#[derive(Debug, Clone)]
pub struct View {
    orientation: Orientation,
    arrow_color: String,
    json: bool,
}

impl View {
    pub fn new(config: &BoardConfig, json: bool) -> Self {
        Self {
            orientation: config.orientation,
            arrow_color: config.arrow_color.clone(),
            json,
        }
    }

    pub fn flip(&mut self) {
        self.orientation = self.orientation.flipped();
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// One frame of output for the current state.
    pub fn frame(
        &self,
        position: &Position,
        snapshot: &AnalysisSnapshot,
        game_over: bool,
    ) -> serde_json::Result<String> {
        if self.json {
            return serde_json::to_string(&Update {
                fen: position.fen(),
                orientation: self.orientation,
                game_over,
                snapshot,
                arrow: snapshot.arrow(&self.arrow_color).map(ArrowJson::from),
            });
        }

        let arrow = snapshot.arrow(&self.arrow_color);
        let mut out = header(snapshot);
        out.push('\n');
        out.push_str(&board(position.board(), self.orientation, arrow.as_ref()));
        if let Some(arrow) = &arrow {
            let _ = writeln!(out, "Arrow: {} -> {} ({})", arrow.from, arrow.to, arrow.color);
        }
        if game_over {
            out.push_str("Game over\n");
        }
        Ok(out)
    }
}

#[derive(Serialize)]
struct Update<'a> {
    fen: &'a str,
    orientation: Orientation,
    game_over: bool,
    #[serde(flatten)]
    snapshot: &'a AnalysisSnapshot,
    arrow: Option<ArrowJson>,
}

#[derive(Serialize)]
struct ArrowJson {
    from: String,
    to: String,
    color: String,
}

impl From<Arrow> for ArrowJson {
    fn from(arrow: Arrow) -> Self {
        Self {
            from: arrow.from.to_string(),
            to: arrow.to.to_string(),
            color: arrow.color,
        }
    }
}

/// The evaluation and best-line header lines.
pub fn header(snapshot: &AnalysisSnapshot) -> String {
    format!(
        "Position Evaluation: {}; Depth: {}\nBest line: {} ...\n",
        snapshot.evaluation_text(),
        snapshot.depth,
        snapshot.best_line_preview()
    )
}

/// Draws the board with `orientation` at the bottom. The arrow's squares are
/// bracketed.
pub fn board(board: &Board, orientation: Orientation, arrow: Option<&Arrow>) -> String {
    let (ranks, files): (Vec<Rank>, Vec<File>) = match orientation {
        Orientation::White => (Rank::ALL.into_iter().rev().collect(), File::ALL.to_vec()),
        Orientation::Black => (Rank::ALL.to_vec(), File::ALL.into_iter().rev().collect()),
    };
    let marked = |square: Square| arrow.is_some_and(|a| a.from == square || a.to == square);

    let mut out = String::new();
    for &rank in &ranks {
        out.push(rank.char());
        out.push(' ');
        for &file in &files {
            let square = Square::from_coords(file, rank);
            let glyph = board.piece_at(square).map_or('·', glyph);
            if marked(square) {
                let _ = write!(out, "[{}]", glyph);
            } else {
                let _ = write!(out, " {} ", glyph);
            }
        }
        out.push('\n');
    }
    out.push_str("  ");
    for &file in &files {
        let _ = write!(out, " {} ", file.char());
    }
    out.push('\n');
    out
}

fn glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}
