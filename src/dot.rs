use crate::error::{Error, Result};
use crate::position::Position;
use crate::tree::{MoveTree, NodeId};
use log::info;
use std::fmt;
use std::path::Path;

/// Cosmetic knobs of the diagram. Whatever the colors, fill alternates by
/// ply parity: even plies (White's moves) take `even_color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotStyle {
    pub graph_name: String,
    pub node_attrs: String,
    pub even_color: String,
    pub odd_color: String,
}

impl Default for DotStyle {
    fn default() -> Self {
        Self {
            graph_name: "Opening".to_string(),
            node_attrs: r#"shape=box fontname="Arial""#.to_string(),
            even_color: "white".to_string(),
            odd_color: "lightgray".to_string(),
        }
    }
}

impl DotStyle {
    pub fn fill_for_ply(&self, ply: i32) -> &str {
        if ply.rem_euclid(2) == 1 {
            &self.odd_color
        } else {
            &self.even_color
        }
    }
}

/// Lines of a DOT digraph, header and closing brace included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphRecord {
    lines: Vec<String>,
    nodes: usize,
    edges: usize,
}

impl GraphRecord {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
    pub fn node_count(&self) -> usize {
        self.nodes
    }
    pub fn edge_count(&self) -> usize {
        self.edges
    }
}

impl fmt::Display for GraphRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Escapes backslashes and double quotes for a quoted DOT string.
pub fn escape_label(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    fn fresh(&mut self) -> String {
        let id = format!("n{}", self.next);
        self.next += 1;
        id
    }
}

/// Flattens a tree into DOT, depth-first pre-order with children left to
/// right. The root emits nothing; first-ply nodes therefore have no
/// incoming edge.
pub fn flatten<P: Position>(tree: &MoveTree<P>, style: &DotStyle) -> GraphRecord {
    let mut out = GraphRecord::default();
    out.lines.push(format!("digraph \"{}\" {{", escape_label(&style.graph_name)));
    out.lines.push(format!("node [{}];", style.node_attrs));

    let mut ids = IdAllocator { next: 0 };
    // (parent diagram id, node, position before the node's move)
    let mut stack: Vec<(Option<String>, NodeId, P)> =
        vec![(None, tree.root(), tree.start().clone())];

    while let Some((parent_id, id, before)) = stack.pop() {
        let node = tree.node(id);
        let (pass_id, after) = match node.mv() {
            Some(mv) => {
                let current = ids.fresh();
                let label = before.notation(mv).unwrap_or_else(|| P::move_text(mv));
                out.lines.push(format!(
                    "\"{}\" [label=\"{}\", style=filled, fillcolor={}];",
                    current,
                    escape_label(&label),
                    style.fill_for_ply(node.ply())
                ));
                out.nodes += 1;
                if let Some(parent) = parent_id {
                    out.lines.push(format!("\"{}\" -> \"{}\";", parent, current));
                    out.edges += 1;
                }
                let mut after = before;
                after.play_move(mv);
                (Some(current), after)
            }
            None => (parent_id, before),
        };
        for &child in node.children().iter().rev() {
            stack.push((pass_id.clone(), child, after.clone()));
        }
    }

    out.lines.push("}".to_string());
    out
}

pub fn write_dot_file(path: &Path, record: &GraphRecord) -> Result<()> {
    std::fs::write(path, record.to_string()).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("DOT file written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_label(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_label("Nf3"), "Nf3");
    }

    #[test]
    fn fill_alternates_by_ply() {
        let style = DotStyle::default();
        assert_eq!(style.fill_for_ply(0), "white");
        assert_eq!(style.fill_for_ply(1), "lightgray");
        assert_eq!(style.fill_for_ply(2), "white");
        assert_eq!(style.fill_for_ply(-1), "lightgray");
    }
}
