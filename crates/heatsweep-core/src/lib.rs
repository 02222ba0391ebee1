use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod config;
pub mod error;
pub mod extract;
pub mod grid;
pub mod naming;

pub use config::{PassesConfig, PathsConfig, ProgramConfig, SweepConfig};
pub use error::SweepError;
pub use extract::extract_execution_time;
pub use grid::{GridPoint, ParameterGrid, RunResult, ThreadShape};
pub use naming::NamingConfig;

pub type Result<T> = anyhow::Result<T>;

/// The passes of a sweep, in the order `run` performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Compile,
    Prepare,
    Execute,
    Validate,
    Aggregate,
}

impl Pass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pass::Compile => "compile",
            Pass::Prepare => "prepare",
            Pass::Execute => "execute",
            Pass::Validate => "validate",
            Pass::Aggregate => "aggregate",
        }
    }
}

pub fn runtime_dir(workspace: &Path) -> PathBuf {
    workspace.join(".heatsweep")
}

/// Resolves `path` against `workspace` unless it is already absolute.
pub fn resolve_path(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}
