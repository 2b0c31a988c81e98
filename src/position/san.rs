use cozy_chess::{Board, Move, Piece, Square};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    #[error("invalid move syntax: {0}")]
    Syntax(String),
    #[error("illegal move: {0}")]
    Illegal(String),
    #[error("ambiguous move: {0}")]
    Ambiguous(String),
}

// piece, from file, from rank, capture, destination, promotion
static SAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([NBRQK])?([a-h])?([1-8])?(x)?([a-h][1-8])(?:=?([NBRQnbrq]))?$")
        .expect("static SAN pattern")
});

fn piece_letter(piece: Piece) -> Option<char> {
    match piece {
        Piece::Pawn => None,
        Piece::Knight => Some('N'),
        Piece::Bishop => Some('B'),
        Piece::Rook => Some('R'),
        Piece::Queen => Some('Q'),
        Piece::King => Some('K'),
    }
}

fn piece_from_letter(c: char) -> Option<Piece> {
    match c.to_ascii_uppercase() {
        'N' => Some(Piece::Knight),
        'B' => Some(Piece::Bishop),
        'R' => Some(Piece::Rook),
        'Q' => Some(Piece::Queen),
        'K' => Some(Piece::King),
        _ => None,
    }
}

#[inline]
fn square_chars(sq: Square) -> (char, char) {
    let s = sq.to_string();
    let mut it = s.chars();
    let file = it.next().unwrap_or('?');
    let rank = it.next().unwrap_or('?');
    (file, rank)
}

pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut v = Vec::new();
    board.generate_moves(|ml| {
        for m in ml {
            v.push(m);
        }
        false
    });
    v
}

/// Castling is encoded by cozy-chess as the king capturing its own rook.
/// Returns `Some(true)` for the king side, `Some(false)` for the queen side.
pub fn castling_side(board: &Board, mv: Move) -> Option<bool> {
    if board.piece_on(mv.from) != Some(Piece::King) {
        return None;
    }
    if board.color_on(mv.to) != Some(board.side_to_move()) {
        return None;
    }
    let (from_file, _) = square_chars(mv.from);
    let (to_file, _) = square_chars(mv.to);
    Some(to_file > from_file)
}

/// A pawn changing file onto an empty square can only be en passant.
fn is_en_passant(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::Pawn)
        && mv.from.file() != mv.to.file()
        && board.piece_on(mv.to).is_none()
}

pub fn is_capture(board: &Board, mv: Move) -> bool {
    if castling_side(board, mv).is_some() {
        return false;
    }
    match board.color_on(mv.to) {
        Some(color) => color != board.side_to_move(),
        None => is_en_passant(board, mv),
    }
}

fn check_suffix(board: &Board, mv: Move) -> &'static str {
    let mut next = board.clone();
    next.play_unchecked(mv);
    if next.checkers().is_empty() {
        return "";
    }
    let mut has_legal = false;
    next.generate_moves(|_| {
        has_legal = true;
        true
    });
    if has_legal {
        "+"
    } else {
        "#"
    }
}

/// Formats a legal move in Standard Algebraic Notation, including the
/// check or mate suffix. Returns `None` if `mv` is not legal on `board`.
pub fn format_san(board: &Board, mv: Move) -> Option<String> {
    if !board.is_legal(mv) {
        return None;
    }
    if let Some(king_side) = castling_side(board, mv) {
        let mut s = String::from(if king_side { "O-O" } else { "O-O-O" });
        s.push_str(check_suffix(board, mv));
        return Some(s);
    }

    let piece = board.piece_on(mv.from)?;
    let capture = is_capture(board, mv);
    let (from_file, from_rank) = square_chars(mv.from);
    let mut s = String::new();

    match piece_letter(piece) {
        Some(letter) => {
            s.push(letter);
            if piece != Piece::King {
                let rivals: Vec<Move> = legal_moves(board)
                    .into_iter()
                    .filter(|m| {
                        m.to == mv.to && m.from != mv.from && board.piece_on(m.from) == Some(piece)
                    })
                    .collect();
                if !rivals.is_empty() {
                    let shares_file = rivals.iter().any(|m| square_chars(m.from).0 == from_file);
                    let shares_rank = rivals.iter().any(|m| square_chars(m.from).1 == from_rank);
                    if !shares_file {
                        s.push(from_file);
                    } else if !shares_rank {
                        s.push(from_rank);
                    } else {
                        s.push(from_file);
                        s.push(from_rank);
                    }
                }
            }
        }
        None => {
            if capture {
                s.push(from_file);
            }
        }
    }

    if capture {
        s.push('x');
    }
    s.push_str(&mv.to.to_string());
    if let Some(promo) = mv.promotion.and_then(piece_letter) {
        s.push('=');
        s.push(promo);
    }
    s.push_str(check_suffix(board, mv));
    Some(s)
}

/// Strips check, mate and annotation glyphs (`+`, `#`, `!`, `?`) and a
/// trailing `e.p.` marker.
fn strip_decorations(token: &str) -> &str {
    let t = token.trim();
    let t = t.strip_suffix("e.p.").unwrap_or(t);
    t.trim_end_matches(['+', '#', '!', '?'])
}

/// Parses a SAN token against `board`. Accepts `0-0` castling, omitted
/// `=` in promotions, missing or superfluous capture marks and
/// over-specified origin squares. Pawn captures still need their file
/// (`exd5`, not `d5`).
pub fn parse_san(board: &Board, token: &str) -> Result<Move, SanError> {
    let san = strip_decorations(token);
    if san.is_empty() {
        return Err(SanError::Syntax(token.to_string()));
    }

    let castle = match san {
        "O-O" | "0-0" => Some(true),
        "O-O-O" | "0-0-0" => Some(false),
        _ => None,
    };
    if let Some(king_side) = castle {
        return legal_moves(board)
            .into_iter()
            .find(|&m| castling_side(board, m) == Some(king_side))
            .ok_or_else(|| SanError::Illegal(token.to_string()));
    }

    let caps = SAN_RE
        .captures(san)
        .ok_or_else(|| SanError::Syntax(token.to_string()))?;
    let piece = caps
        .get(1)
        .and_then(|m| m.as_str().chars().next())
        .and_then(piece_from_letter)
        .unwrap_or(Piece::Pawn);
    let from_file = caps.get(2).and_then(|m| m.as_str().chars().next());
    let from_rank = caps.get(3).and_then(|m| m.as_str().chars().next());
    let to: Square = caps[5]
        .parse()
        .map_err(|_| SanError::Syntax(token.to_string()))?;
    let promotion = caps
        .get(6)
        .and_then(|m| m.as_str().chars().next())
        .and_then(piece_from_letter);
    if promotion.is_some() && piece != Piece::Pawn {
        return Err(SanError::Syntax(token.to_string()));
    }

    let candidates: Vec<Move> = legal_moves(board)
        .into_iter()
        .filter(|&m| {
            if m.to != to || board.piece_on(m.from) != Some(piece) {
                return false;
            }
            if castling_side(board, m).is_some() || m.promotion != promotion {
                return false;
            }
            // a pawn capture must name its source file
            if piece == Piece::Pawn && from_file.is_none() && m.from.file() != to.file() {
                return false;
            }
            let (f, r) = square_chars(m.from);
            from_file.map_or(true, |c| c == f) && from_rank.map_or(true, |c| c == r)
        })
        .collect();

    match candidates.as_slice() {
        [] => Err(SanError::Illegal(token.to_string())),
        [only] => Ok(*only),
        _ => Err(SanError::Ambiguous(token.to_string())),
    }
}
