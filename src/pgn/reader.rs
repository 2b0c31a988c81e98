use super::{PgnError, PgnHeaders, RESULT_TOKENS};
use crate::error::{Error, Result};
use crate::notation::strip_move_number;
use crate::position::Position;
use crate::tree::{ChessTree, NodeId};
use cozy_chess::Board;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[([A-Za-z0-9_]+)\s+"((?:[^"\\]|\\.)*)"\s*\]$"#).expect("static tag pattern")
});

#[derive(Debug, PartialEq, Eq)]
enum Lexeme<'a> {
    Open,
    Close,
    Word(&'a str),
}

/// Splits movetext into words and parentheses, dropping `{}` and `;`
/// comments and `$n` annotations.
fn lex(movetext: &str) -> Vec<Lexeme<'_>> {
    let mut out = Vec::new();
    let bytes = movetext.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() => i += 1,
            b'{' => {
                i = movetext[i..].find('}').map_or(bytes.len(), |off| i + off + 1);
            }
            b';' => {
                i = movetext[i..].find('\n').map_or(bytes.len(), |off| i + off + 1);
            }
            b'(' => {
                out.push(Lexeme::Open);
                i += 1;
            }
            b')' => {
                out.push(Lexeme::Close);
                i += 1;
            }
            b'$' => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'(' | b')' | b'{' | b';')
                {
                    i += 1;
                }
                out.push(Lexeme::Word(&movetext[start..i]));
            }
        }
    }
    out
}

fn unescape_tag(value: &str) -> String {
    let mut s = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                s.push(next);
            }
        } else {
            s.push(c);
        }
    }
    s
}

/// Reads the first game of a PGN text into a tree. Variations become
/// sibling branches; moves repeated across variations are merged.
pub fn read_pgn(text: &str) -> std::result::Result<(PgnHeaders, ChessTree), PgnError> {
    let mut headers = PgnHeaders::default();
    let mut rest = text;
    loop {
        let (line, tail) = match rest.find('\n') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            let caps = TAG_RE
                .captures(trimmed)
                .ok_or_else(|| PgnError::MalformedTag(trimmed.to_string()))?;
            headers.set(&caps[1], unescape_tag(&caps[2]));
        } else if !trimmed.is_empty() {
            break;
        }
        if tail.is_empty() {
            rest = tail;
            break;
        }
        rest = tail;
    }

    let mut tree = ChessTree::default();
    let mut current = tree.root();
    let mut pos = Board::default();
    let mut stack: Vec<(NodeId, Board)> = Vec::new();

    for lexeme in lex(rest) {
        match lexeme {
            Lexeme::Open => {
                let parent = tree
                    .node(current)
                    .parent()
                    .ok_or(PgnError::OrphanVariation)?;
                stack.push((current, pos));
                current = parent;
                pos = tree.position_at(parent);
            }
            Lexeme::Close => {
                let (node, saved) = stack.pop().ok_or(PgnError::UnbalancedVariation)?;
                current = node;
                pos = saved;
            }
            Lexeme::Word(word) => {
                if RESULT_TOKENS.contains(&word) {
                    if stack.is_empty() {
                        break;
                    }
                    continue;
                }
                let token = strip_move_number(word);
                if token.trim_matches(['!', '?']).is_empty() {
                    continue;
                }
                let mv = pos.parse_move(token).map_err(|source| PgnError::IllegalMove {
                    token: token.to_string(),
                    ply: (tree.node(current).ply() + 1) as usize,
                    source,
                })?;
                let (child, _) = tree.child_or_insert(current, mv);
                pos.play_move(mv);
                current = child;
            }
        }
    }

    if !stack.is_empty() {
        return Err(PgnError::UnbalancedVariation);
    }
    Ok((headers, tree))
}

pub fn read_pgn_file(path: &Path) -> Result<(PgnHeaders, ChessTree)> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(read_pgn(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexer_skips_comments_and_nags() {
        let lx = lex("1. e4 {best by test} e5 $1 (1... c5 ; sicilian\n) 2. Nf3");
        assert_eq!(
            lx,
            vec![
                Lexeme::Word("1."),
                Lexeme::Word("e4"),
                Lexeme::Word("e5"),
                Lexeme::Open,
                Lexeme::Word("1..."),
                Lexeme::Word("c5"),
                Lexeme::Close,
                Lexeme::Word("2."),
                Lexeme::Word("Nf3"),
            ]
        );
    }

    #[test]
    fn tag_values_unescape() {
        assert_eq!(unescape_tag(r#"a \"b\" \\c"#), r#"a "b" \c"#);
    }

    #[test]
    fn variation_before_first_move_is_rejected() {
        assert!(matches!(read_pgn("(1. e4) *"), Err(PgnError::OrphanVariation)));
        assert!(matches!(
            read_pgn("1. e4 (1. d4 *"),
            Err(PgnError::UnbalancedVariation)
        ));
    }
}
