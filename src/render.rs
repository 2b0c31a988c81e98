use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status} while rendering {}", dot.display())]
    Failed {
        program: String,
        status: ExitStatus,
        dot: PathBuf,
    },
}

/// External Graphviz invocation: `<program> -T<format> <dot> -o <out>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub program: String,
    pub format: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: "dot".to_string(),
            format: "png".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn command(&self, dot: &Path, out: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("-T{}", self.format))
            .arg(dot)
            .arg("-o")
            .arg(out);
        cmd
    }
}

/// Runs the renderer to completion. A non-zero exit is an error.
pub fn render(cfg: &RenderConfig, dot: &Path, out: &Path) -> Result<(), RenderError> {
    let mut cmd = cfg.command(dot, out);
    debug!("running {:?}", cmd);
    let status = cmd.status().map_err(|source| RenderError::Spawn {
        program: cfg.program.clone(),
        source,
    })?;
    if !status.success() {
        return Err(RenderError::Failed {
            program: cfg.program.clone(),
            status,
            dot: dot.to_path_buf(),
        });
    }
    info!("{} image written to: {}", cfg.format.to_uppercase(), out.display());
    Ok(())
}
