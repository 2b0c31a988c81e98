use anyhow::Context;
use clap::Parser;
use repertree::dot::DotStyle;
use repertree::pgn::PgnHeaders;
use repertree::pipeline::{run, OutputPaths, PipelineConfig};
use repertree::render::RenderConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repertree")]
#[command(about = "Merge repertoire lines into one game tree, then write PGN, DOT and an image")]
struct Args {
    /// Repertoire file, one line of moves per line (e.g. "1.e4 e5 2.Nf3")
    input: PathBuf,

    /// Treat INPUT as a PGN game and only export the diagram
    #[arg(long)]
    from_pgn: bool,

    /// Directory for derived output names (default: next to INPUT)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Override the PGN output path
    #[arg(long)]
    pgn_out: Option<PathBuf>,

    /// Override the DOT output path
    #[arg(long)]
    dot_out: Option<PathBuf>,

    /// Override the rendered image path
    #[arg(long)]
    image_out: Option<PathBuf>,

    /// Skip running Graphviz
    #[arg(long)]
    no_render: bool,

    /// Graphviz executable
    #[arg(long, default_value = "dot")]
    dot_program: String,

    /// Graphviz output format (-T)
    #[arg(long, default_value = "png")]
    format: String,

    /// PGN Event tag
    #[arg(long, default_value = repertree::pgn::DEFAULT_EVENT)]
    event: String,

    /// Name of the DOT digraph
    #[arg(long, default_value = "Opening")]
    graph_name: String,

    /// Fill color for White's moves
    #[arg(long, default_value = "white")]
    even_color: String,

    /// Fill color for Black's moves
    #[arg(long, default_value = "lightgray")]
    odd_color: String,

    /// Optional: write a JSON run summary to this path
    #[arg(long)]
    json_out: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        let mut outputs = OutputPaths::derive(&self.input, self.out_dir.as_deref(), &self.format);
        if let Some(p) = self.pgn_out {
            outputs.pgn = p;
        }
        if let Some(p) = self.dot_out {
            outputs.dot = p;
        }
        if let Some(p) = self.image_out {
            outputs.image = p;
        }
        let render = (!self.no_render).then(|| RenderConfig {
            program: self.dot_program,
            format: self.format,
        });
        PipelineConfig {
            input: self.input,
            outputs,
            from_pgn: self.from_pgn,
            headers: PgnHeaders::with_event(self.event),
            style: DotStyle {
                graph_name: self.graph_name,
                even_color: self.even_color,
                odd_color: self.odd_color,
                ..DotStyle::default()
            },
            render,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let json_out = args.json_out.clone();
    let cfg = args.into_config();

    let summary = run(&cfg).with_context(|| format!("processing {}", cfg.input.display()))?;

    if let Some(report) = &summary.merge {
        println!(
            "lines={} complete={} truncated={} moves={}",
            report.lines, report.complete, report.truncated, summary.moves
        );
    } else {
        println!("moves={}", summary.moves);
    }

    if let Some(path) = json_out {
        let payload = serde_json::to_string_pretty(&summary.to_json())?;
        std::fs::write(&path, payload)
            .with_context(|| format!("writing summary to {}", path.display()))?;
    }
    Ok(())
}
