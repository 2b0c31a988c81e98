use super::PgnHeaders;
use crate::error::{Error, Result};
use crate::position::Position;
use crate::tree::{MoveTree, NodeId};
use log::info;
use std::path::Path;

const LINE_WIDTH: usize = 80;

#[derive(Default)]
struct Movetext {
    tokens: Vec<String>,
    pending_open: usize,
}

impl Movetext {
    fn push(&mut self, token: String) {
        let mut t = "(".repeat(self.pending_open);
        self.pending_open = 0;
        t.push_str(&token);
        self.tokens.push(t);
    }

    fn open_variation(&mut self) {
        self.pending_open += 1;
    }

    fn close_variation(&mut self) {
        if let Some(last) = self.tokens.last_mut() {
            last.push(')');
        }
    }

    fn wrap(&self, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut cur = String::new();
        for t in &self.tokens {
            if !cur.is_empty() && cur.len() + 1 + t.len() > width {
                lines.push(std::mem::take(&mut cur));
            }
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(t);
        }
        if !cur.is_empty() {
            lines.push(cur);
        }
        lines
    }
}

fn emit_move<P: Position>(
    tree: &MoveTree<P>,
    out: &mut Movetext,
    id: NodeId,
    before: &P,
    force_number: bool,
) -> Option<P::Move> {
    let node = tree.node(id);
    let mv = node.mv()?;
    let ply = node.ply();
    let number = ply / 2 + 1;
    if ply % 2 == 0 {
        out.push(format!("{}.", number));
    } else if force_number {
        out.push(format!("{}...", number));
    }
    out.push(before.notation(mv).unwrap_or_else(|| P::move_text(mv)));
    Some(mv)
}

enum Step<P: Position> {
    /// Continue the line below `node`, `pos` being the position after it.
    Line { node: NodeId, pos: P, force_number: bool },
    /// Open a variation holding `node`, played from `before`.
    Variation { node: NodeId, before: P },
    Close,
}

/// Writes the subtree below `node`: first child as the mainline, every
/// other child as a parenthesised variation right after it.
fn write_children<P: Position>(tree: &MoveTree<P>, out: &mut Movetext, node: NodeId, pos: P) {
    let mut stack = vec![Step::Line {
        node,
        pos,
        force_number: false,
    }];
    while let Some(step) = stack.pop() {
        match step {
            Step::Line {
                node,
                pos,
                force_number,
            } => {
                let Some((&main, alts)) = tree.children(node).split_first() else {
                    continue;
                };
                let Some(main_mv) = emit_move(tree, out, main, &pos, force_number) else {
                    continue;
                };
                let mut after = pos.clone();
                after.play_move(main_mv);
                // popped last: the mainline resumes once every variation is closed
                stack.push(Step::Line {
                    node: main,
                    pos: after,
                    force_number: !alts.is_empty(),
                });
                for &alt in alts.iter().rev() {
                    stack.push(Step::Variation {
                        node: alt,
                        before: pos.clone(),
                    });
                }
            }
            Step::Variation { node, before } => {
                out.open_variation();
                stack.push(Step::Close);
                if let Some(mv) = emit_move(tree, out, node, &before, true) {
                    let mut pos = before;
                    pos.play_move(mv);
                    stack.push(Step::Line {
                        node,
                        pos,
                        force_number: false,
                    });
                }
            }
            Step::Close => out.close_variation(),
        }
    }
}

fn escape_tag(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders the whole tree as one PGN game.
pub fn write_pgn<P: Position>(tree: &MoveTree<P>, headers: &PgnHeaders) -> String {
    let mut s = String::new();
    for (name, value) in headers.pairs() {
        s.push_str(&format!("[{} \"{}\"]\n", name, escape_tag(value)));
    }
    s.push('\n');

    let mut movetext = Movetext::default();
    write_children(tree, &mut movetext, tree.root(), tree.start().clone());
    movetext.push(headers.result.clone());
    for line in movetext.wrap(LINE_WIDTH) {
        s.push_str(&line);
        s.push('\n');
    }
    s
}

pub fn write_pgn_file<P: Position>(
    path: &Path,
    tree: &MoveTree<P>,
    headers: &PgnHeaders,
) -> Result<()> {
    std::fs::write(path, write_pgn(tree, headers)).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("PGN file written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_width() {
        let mut m = Movetext::default();
        for i in 0..30 {
            m.push(format!("tok{}", i));
        }
        let lines = m.wrap(20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 20));
    }

    #[test]
    fn parens_attach_to_neighbours() {
        let mut m = Movetext::default();
        m.push("1.".into());
        m.push("e4".into());
        m.open_variation();
        m.push("1.".into());
        m.push("d4".into());
        m.close_variation();
        assert_eq!(m.wrap(80), vec!["1. e4 (1. d4)".to_string()]);
    }
}
