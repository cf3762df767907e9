//! Rules state: the canonical game position and the moves that change it.
//!
//! The controller never inspects board contents itself. It asks a
//! [`RulesState`] to apply gestures and reads back an opaque [`Position`]
//! snapshot. [`StandardRules`] implements the trait for standard chess on top
//! of `shakmaty`.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{
    Board, CastlingMode, Chess, Color, EnPassantMode, Position as _, Rank, Role, Square,
};
use std::fmt;
use thiserror::Error;

/// Error returned when a FEN string cannot seed a legal position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid FEN: {0}")]
pub struct InvalidFen(pub String);

/// Read-only snapshot of a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    fen: String,
    side_to_move: Color,
    board: Board,
}

impl Position {
    /// The position in FEN notation.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Whose turn it is.
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Piece placement, for rendering.
    pub fn board(&self) -> &Board {
        &self.board
    }

    fn of(chess: &Chess) -> Self {
        Self {
            fen: Fen::from_position(chess.clone(), EnPassantMode::Legal).to_string(),
            side_to_move: chess.turn(),
            board: chess.board().clone(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen)
    }
}

/// Owner of the game position, its legality rules and its history.
pub trait RulesState {
    /// Snapshot of the current position.
    fn current_position(&self) -> Position;

    /// Attempts a move. Returns the new position, or `None` (and leaves the
    /// state untouched) if the move is illegal.
    ///
    /// `promotion` is only consulted when the move is a pawn promotion.
    fn apply_move(&mut self, from: Square, to: Square, promotion: Option<Role>)
        -> Option<Position>;

    /// Takes back the last move. Returns `false` if there was nothing to undo.
    fn undo(&mut self) -> bool;

    /// Returns to the standard starting position and clears history.
    fn reset(&mut self);

    /// Replaces the position with one given in FEN. Returns `false` (and
    /// leaves the state untouched) if the FEN is malformed or describes an
    /// impossible position.
    fn load_position(&mut self, fen: &str) -> bool;

    /// True once the game is over: checkmate, stalemate, insufficient
    /// material, the fifty-move rule or threefold repetition.
    fn is_terminal(&self) -> bool;
}

/// Plies without capture or pawn move after which the game is drawn.
const FIFTY_MOVE_PLIES: u32 = 100;

/// Standard chess rules with an undo stack.
#[derive(Debug, Clone, Default)]
pub struct StandardRules {
    chess: Chess,
    history: Vec<Chess>,
}

impl StandardRules {
    /// Starts from the standard initial position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a custom position.
    pub fn from_fen(fen: &str) -> Result<Self, InvalidFen> {
        let chess = parse_fen(fen).ok_or_else(|| InvalidFen(fen.trim().to_string()))?;
        Ok(Self {
            chess,
            history: Vec::new(),
        })
    }

    /// Number of moves that can be taken back.
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    /// True if the current position occurred at least three times since the
    /// game was reset or loaded.
    fn is_threefold_repetition(&self) -> bool {
        let current = repetition_key(&self.chess);
        let earlier = self
            .history
            .iter()
            .filter(|chess| repetition_key(chess) == current)
            .count();
        earlier >= 2
    }

    fn is_promotion(&self, from: Square, to: Square) -> bool {
        let last_rank = self.chess.turn().fold_wb(Rank::Eighth, Rank::First);
        self.chess
            .board()
            .piece_at(from)
            .is_some_and(|piece| piece.role == Role::Pawn && to.rank() == last_rank)
    }
}

/// Placement, side to move, castling rights and en passant square.
fn repetition_key(chess: &Chess) -> String {
    let fen = Fen::from_position(chess.clone(), EnPassantMode::Legal).to_string();
    fen.split(' ').take(4).collect::<Vec<_>>().join(" ")
}

fn parse_fen(fen: &str) -> Option<Chess> {
    let fen: Fen = fen.trim().parse().ok()?;
    fen.into_position(CastlingMode::Standard).ok()
}

impl RulesState for StandardRules {
    fn current_position(&self) -> Position {
        Position::of(&self.chess)
    }

    fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Option<Position> {
        let promotion = if self.is_promotion(from, to) {
            Some(promotion.unwrap_or(Role::Queen))
        } else {
            None
        };

        let uci = UciMove::Normal {
            from,
            to,
            promotion,
        };
        let m = uci.to_move(&self.chess).ok()?;

        let mut next = self.chess.clone();
        next.play_unchecked(&m);
        self.history.push(std::mem::replace(&mut self.chess, next));

        Some(self.current_position())
    }

    fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.chess = previous;
                true
            }
            None => false,
        }
    }

    fn reset(&mut self) {
        self.chess = Chess::default();
        self.history.clear();
    }

    fn load_position(&mut self, fen: &str) -> bool {
        match parse_fen(fen) {
            Some(chess) => {
                self.chess = chess;
                self.history.clear();
                true
            }
            None => false,
        }
    }

    fn is_terminal(&self) -> bool {
        self.chess.is_game_over()
            || self.chess.halfmoves() >= FIFTY_MOVE_PLIES
            || self.is_threefold_repetition()
    }
}
