use crate::notation::tokenize_line;
use crate::position::{Position, SanError};
use crate::tree::{MoveTree, NodeId};
use log::{debug, warn};

/// An illegal or unreadable move that cut a repertoire line short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number: the caller's numbering for `merge_line_at`,
    /// otherwise the position among the lines fed so far.
    pub line: usize,
    pub token: String,
    pub error: SanError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub lines: usize,
    pub complete: usize,
    pub truncated: usize,
    pub empty: usize,
    pub nodes_created: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Feeds repertoire lines into a tree, one at a time and in order.
pub struct Merger<P: Position> {
    tree: MoveTree<P>,
    report: MergeReport,
}

impl<P: Position> Merger<P> {
    pub fn new(start: P) -> Self {
        Self::from_tree(MoveTree::new(start))
    }

    pub fn from_tree(tree: MoveTree<P>) -> Self {
        Self {
            tree,
            report: MergeReport::default(),
        }
    }

    pub fn tree(&self) -> &MoveTree<P> {
        &self.tree
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    /// Tokenizes and merges one raw line. Returns the deepest node the line
    /// reached, or `None` for a line with no moves.
    pub fn merge_line(&mut self, raw: &str) -> Option<NodeId> {
        let line_no = self.report.lines + 1;
        self.merge_line_at(line_no, raw)
    }

    /// Like [`Merger::merge_line`], but diagnostics carry `line_no`, e.g.
    /// the line's number in its source file.
    pub fn merge_line_at(&mut self, line_no: usize, raw: &str) -> Option<NodeId> {
        self.report.lines += 1;
        let tokens = tokenize_line(raw);
        if tokens.is_empty() {
            self.report.empty += 1;
            return None;
        }

        let ins = self.tree.insert_line(&tokens);
        self.report.nodes_created += ins.created;
        debug!(
            "line {}: {} of {} moves merged, {} new nodes",
            line_no,
            ins.merged,
            tokens.len(),
            ins.created
        );
        match ins.rejected {
            Some(rej) => {
                warn!("line {}: invalid move {}: {}", line_no, rej.token, rej.error);
                self.report.truncated += 1;
                self.report.diagnostics.push(Diagnostic {
                    line: line_no,
                    token: rej.token,
                    error: rej.error,
                });
            }
            None => self.report.complete += 1,
        }
        Some(ins.leaf)
    }

    pub fn merge_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.merge_line(line.as_ref());
        }
    }

    /// Merges `(line number, text)` pairs as produced by
    /// [`crate::pipeline::read_lines`].
    pub fn merge_numbered<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = (usize, S)>,
        S: AsRef<str>,
    {
        for (line_no, line) in lines {
            self.merge_line_at(line_no, line.as_ref());
        }
    }

    pub fn finish(self) -> (MoveTree<P>, MergeReport) {
        (self.tree, self.report)
    }
}

/// Merges all `lines` from `start` in one pass.
pub fn build_tree<P, I, S>(start: P, lines: I) -> (MoveTree<P>, MergeReport)
where
    P: Position,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut merger = Merger::new(start);
    merger.merge_lines(lines);
    merger.finish()
}
