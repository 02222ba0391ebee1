use crate::error::SweepError;
use crate::grid::ParameterGrid;
use crate::naming::NamingConfig;
use crate::{Result, resolve_path, runtime_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Static description of a sweep: which passes run, over which grid, and
/// where everything lives. Fixed before a run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub passes: PassesConfig,
    pub grid: ParameterGrid,
    pub program: ProgramConfig,
    pub paths: PathsConfig,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassesConfig {
    pub compile: bool,
    /// Delete artifacts and result files left by a previous sweep.
    pub clean: bool,
    pub execute: bool,
    pub validate: bool,
    pub aggregate: bool,
}

impl Default for PassesConfig {
    fn default() -> Self {
        Self {
            compile: false,
            clean: true,
            execute: true,
            validate: false,
            aggregate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    pub executable: PathBuf,
    /// Run through the platform shell by the compile pass.
    pub compile_command: String,
    /// Pause after every invocation, successful or not.
    pub pause_ms: u64,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("./heat_cuda"),
            compile_command: "nvcc heat_cuda.cu -o heat_cuda".to_string(),
            pause_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub artifact_dir: PathBuf,
    pub results_dir: PathBuf,
    pub reference_dir: PathBuf,
    pub table: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("bmp"),
            results_dir: PathBuf::from("results"),
            reference_dir: PathBuf::from("bmp_serial"),
            table: PathBuf::from("heat_results.csv"),
        }
    }
}

/// Workspace-resolved locations derived from a [`SweepConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepLayout {
    pub workspace: PathBuf,
    pub executable: PathBuf,
    pub artifact_dir: PathBuf,
    pub results_dir: PathBuf,
    pub reference_dir: PathBuf,
    pub table: PathBuf,
}

impl SweepConfig {
    pub fn legacy_toml_path(workspace: &Path) -> PathBuf {
        runtime_dir(workspace).join("config.toml")
    }

    pub fn project_settings_path(workspace: &Path) -> PathBuf {
        runtime_dir(workspace).join("settings.json")
    }

    pub fn project_local_settings_path(workspace: &Path) -> PathBuf {
        runtime_dir(workspace).join("settings.local.json")
    }

    /// Layers defaults, `.heatsweep/config.toml`, `.heatsweep/settings.json`,
    /// `.heatsweep/settings.local.json` and finally `explicit`, then validates.
    pub fn load(workspace: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut merged = serde_json::to_value(Self::default())?;

        let mut layers = vec![
            Self::legacy_toml_path(workspace),
            Self::project_settings_path(workspace),
            Self::project_local_settings_path(workspace),
        ];
        if let Some(path) = explicit {
            let path = resolve_path(workspace, path);
            if !path.exists() {
                return Err(SweepError::config(format!(
                    "config file {} does not exist",
                    path.display()
                ))
                .into());
            }
            layers.push(path);
        }

        for path in layers {
            if !path.exists() {
                continue;
            }
            let overlay = read_layer(&path)?;
            merge_json_value(&mut merged, &overlay);
        }

        let cfg: SweepConfig = serde_json::from_value(merged)
            .map_err(|err| SweepError::config(format!("malformed configuration: {err}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate().map_err(SweepError::Config)?;
        self.naming.validate().map_err(SweepError::Config)?;
        if self.program.executable.as_os_str().is_empty() {
            return Err(SweepError::config("program.executable must not be empty").into());
        }
        Ok(())
    }

    pub fn layout(&self, workspace: &Path) -> SweepLayout {
        SweepLayout {
            workspace: workspace.to_path_buf(),
            executable: resolve_executable(workspace, &self.program.executable),
            artifact_dir: resolve_path(workspace, &self.paths.artifact_dir),
            results_dir: resolve_path(workspace, &self.paths.results_dir),
            reference_dir: resolve_path(workspace, &self.paths.reference_dir),
            table: resolve_path(workspace, &self.paths.table),
        }
    }
}

/// Bare program names are left for `PATH` lookup; anything with a directory
/// component is anchored to the workspace.
fn resolve_executable(workspace: &Path, executable: &Path) -> PathBuf {
    if executable.components().count() > 1 || executable.is_absolute() {
        resolve_path(workspace, executable)
    } else {
        executable.to_path_buf()
    }
}

fn read_layer(path: &Path) -> Result<serde_json::Value> {
    let raw = fs::read_to_string(path).map_err(|err| SweepError::io("read", path, err))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let value = if is_toml {
        toml::from_str::<serde_json::Value>(&raw)
            .map_err(|err| SweepError::config(format!("{}: {err}", path.display())))?
    } else {
        serde_json::from_str::<serde_json::Value>(&raw)
            .map_err(|err| SweepError::config(format!("{}: {err}", path.display())))?
    };
    Ok(value)
}

fn merge_json_value(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(overlay_obj)) => {
            for (key, overlay_value) in overlay_obj {
                if let Some(base_value) = base_obj.get_mut(key) {
                    merge_json_value(base_value, overlay_value);
                } else {
                    base_obj.insert(key.clone(), overlay_value.clone());
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}
