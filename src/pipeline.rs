use crate::dot::{flatten, write_dot_file, DotStyle};
use crate::error::{Error, Result};
use crate::merge::{MergeReport, Merger};
use crate::pgn::{read_pgn_file, write_pgn_file, PgnHeaders};
use crate::render::{render, RenderConfig};
use cozy_chess::Board;
use log::info;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub pgn: PathBuf,
    pub dot: PathBuf,
    pub image: PathBuf,
}

impl OutputPaths {
    /// `king-pawn-lines.txt` gives `king-pawn-merged.pgn`,
    /// `kingpawn-merged.dot` and `kingpawn-merged.<format>`.
    pub fn derive(input: &Path, out_dir: Option<&Path>, format: &str) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repertoire".to_string());
        let base = stem.replace("-lines", "");
        let dir = match out_dir {
            Some(d) => d.to_path_buf(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let dot_base = format!("{}-merged", base.replace('-', ""));
        Self {
            pgn: dir.join(format!("{}-merged.pgn", base)),
            dot: dir.join(format!("{}.dot", dot_base)),
            image: dir.join(format!("{}.{}", dot_base, format)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub outputs: OutputPaths,
    /// Read `input` as PGN instead of repertoire lines; no PGN is written.
    pub from_pgn: bool,
    pub headers: PgnHeaders,
    pub style: DotStyle,
    /// `None` skips the external renderer.
    pub render: Option<RenderConfig>,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let outputs = OutputPaths::derive(&input, None, &RenderConfig::default().format);
        Self {
            input,
            outputs,
            from_pgn: false,
            headers: PgnHeaders::default(),
            style: DotStyle::default(),
            render: Some(RenderConfig::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Absent when the tree was loaded from PGN.
    pub merge: Option<MergeReport>,
    pub moves: usize,
    pub dot_nodes: usize,
    pub dot_edges: usize,
    pub pgn: Option<PathBuf>,
    pub dot: PathBuf,
    pub image: Option<PathBuf>,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Value {
        let merge = self.merge.as_ref().map(|r| {
            serde_json::json!({
                "lines": r.lines,
                "complete": r.complete,
                "truncated": r.truncated,
                "empty": r.empty,
                "nodes_created": r.nodes_created,
                "diagnostics": r.diagnostics.iter().map(|d| serde_json::json!({
                    "line": d.line,
                    "token": d.token,
                    "error": d.error.to_string(),
                })).collect::<Vec<_>>(),
            })
        });
        serde_json::json!({
            "merge": merge,
            "moves": self.moves,
            "dot": {"nodes": self.dot_nodes, "edges": self.dot_edges},
            "outputs": {
                "pgn": self.pgn.as_ref().map(|p| p.display().to_string()),
                "dot": self.dot.display().to_string(),
                "image": self.image.as_ref().map(|p| p.display().to_string()),
            },
        })
    }
}

/// Reads repertoire lines, trimmed, with blank lines dropped. Each line
/// keeps its 1-based number in the file.
pub fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .map(|(n, l)| (n, l.to_string()))
        .collect())
}

/// Merge, write PGN, write DOT, render. Stops at the first I/O or render
/// failure; illegal moves only cut their own line short.
pub fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    let (tree, merge, pgn) = if cfg.from_pgn {
        let (_, tree) = read_pgn_file(&cfg.input)?;
        (tree, None, None)
    } else {
        let lines = read_lines(&cfg.input)?;
        let mut merger = Merger::new(Board::default());
        merger.merge_numbered(lines);
        let (tree, report) = merger.finish();
        info!(
            "merged {} lines into {} moves ({} truncated)",
            report.lines,
            tree.move_count(),
            report.truncated
        );
        write_pgn_file(&cfg.outputs.pgn, &tree, &cfg.headers)?;
        (tree, Some(report), Some(cfg.outputs.pgn.clone()))
    };

    let record = flatten(&tree, &cfg.style);
    write_dot_file(&cfg.outputs.dot, &record)?;

    let image = match &cfg.render {
        Some(rc) => {
            render(rc, &cfg.outputs.dot, &cfg.outputs.image)?;
            Some(cfg.outputs.image.clone())
        }
        None => None,
    };

    Ok(RunSummary {
        merge,
        moves: tree.move_count(),
        dot_nodes: record.node_count(),
        dot_edges: record.edge_count(),
        pgn,
        dot: cfg.outputs.dot.clone(),
        image,
    })
}
