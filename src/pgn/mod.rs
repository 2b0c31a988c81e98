//! PGN export of a merged tree, and the reader used to load one back.

mod reader;
mod writer;

pub use reader::{read_pgn, read_pgn_file};
pub use writer::{write_pgn, write_pgn_file};

use crate::position::SanError;
use thiserror::Error;

pub const DEFAULT_EVENT: &str = "Branching Repertoire";

#[derive(Debug, Error)]
pub enum PgnError {
    #[error("invalid move {token} after {ply} plies: {source}")]
    IllegalMove {
        token: String,
        ply: usize,
        #[source]
        source: SanError,
    },
    #[error("unbalanced parenthesis in movetext")]
    UnbalancedVariation,
    #[error("variation opened before any move")]
    OrphanVariation,
    #[error("malformed tag pair: {0}")]
    MalformedTag(String),
}

/// Tag pairs of the exported game. The Seven Tag Roster comes first, in
/// its standard order, then `extra` in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnHeaders {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub result: String,
    pub extra: Vec<(String, String)>,
}

impl Default for PgnHeaders {
    fn default() -> Self {
        Self {
            event: DEFAULT_EVENT.to_string(),
            site: "?".to_string(),
            date: "????.??.??".to_string(),
            round: "?".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
            result: "*".to_string(),
            extra: Vec::new(),
        }
    }
}

impl PgnHeaders {
    pub fn with_event(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut v = vec![
            ("Event", self.event.as_str()),
            ("Site", self.site.as_str()),
            ("Date", self.date.as_str()),
            ("Round", self.round.as_str()),
            ("White", self.white.as_str()),
            ("Black", self.black.as_str()),
            ("Result", self.result.as_str()),
        ];
        v.extend(self.extra.iter().map(|(k, val)| (k.as_str(), val.as_str())));
        v
    }

    /// Sets a tag by name, routing roster tags to their fields.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "Event" => self.event = value,
            "Site" => self.site = value,
            "Date" => self.date = value,
            "Round" => self.round = value,
            "White" => self.white = value,
            "Black" => self.black = value,
            "Result" => self.result = value,
            _ => match self.extra.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value,
                None => self.extra.push((name.to_string(), value)),
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs()
            .into_iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }
}

pub(crate) const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];
