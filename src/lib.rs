// Repertoire lines -> merged move tree -> PGN + Graphviz
pub mod dot;
pub mod error;
pub mod merge;
pub mod notation;
pub mod pgn;
pub mod pipeline;
pub mod position;
pub mod render;
pub mod tree;

pub use error::{Error, Result};
pub use merge::{build_tree, MergeReport, Merger};
pub use tree::{ChessTree, MoveTree, NodeId};
