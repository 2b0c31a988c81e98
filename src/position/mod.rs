pub mod san;

use cozy_chess::{Board, Move};
use std::fmt::Debug;

pub use san::SanError;

/// Rules-aware board state consulted by the tree merger.
///
/// Implementations parse move tokens against the current position, apply
/// moves, and render the canonical notation of a move in a position. The
/// move value must compare by meaning, not by spelling: two notations of
/// the same move must produce equal values.
pub trait Position: Clone {
    type Move: Copy + Eq + Debug;

    fn parse_move(&self, token: &str) -> Result<Self::Move, SanError>;

    /// Applies a move previously returned by `parse_move` for this position.
    fn play_move(&mut self, mv: Self::Move);

    /// Canonical notation of `mv` played from this position, or `None` if
    /// the move does not belong to it.
    fn notation(&self, mv: Self::Move) -> Option<String>;

    /// Position-free rendering of a move, used when `notation` fails.
    fn move_text(mv: Self::Move) -> String;
}

impl Position for Board {
    type Move = Move;

    fn parse_move(&self, token: &str) -> Result<Move, SanError> {
        san::parse_san(self, token)
    }

    fn play_move(&mut self, mv: Move) {
        self.play_unchecked(mv);
    }

    fn notation(&self, mv: Move) -> Option<String> {
        san::format_san(self, mv)
    }

    fn move_text(mv: Move) -> String {
        format!("{}", mv)
    }
}
