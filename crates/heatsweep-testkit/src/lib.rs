//! Fake benchmark programs and scratch workspaces for sweep tests.
//!
//! A fake program is a `/bin/sh` script honouring the real kernel's argument
//! contract `<size> <steps> <artifact_path> <thread_x> <thread_y>`.

use anyhow::Result;
use heatsweep_core::{NamingConfig, ParameterGrid, SweepConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// What the fake writes to the artifact path it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactMode {
    None,
    /// Content depends only on size and steps, so it equals the reference
    /// produced by [`write_reference`].
    BySizeSteps,
    /// Content also depends on the thread shape, so it never matches.
    ByThreads,
}

#[derive(Debug, Clone)]
pub struct FakeProgram {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub artifact: ArtifactMode,
    /// Thread shape for which the program prints no timing line.
    pub silent_for: Option<(u32, u32)>,
}

impl Default for FakeProgram {
    fn default() -> Self {
        Self {
            stdout: "The Execution Time= 0.5\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
            artifact: ArtifactMode::BySizeSteps,
            silent_for: None,
        }
    }
}

impl FakeProgram {
    pub fn printing(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    pub fn failing(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
            artifact: ArtifactMode::None,
            silent_for: None,
        }
    }

    pub fn with_artifact(mut self, artifact: ArtifactMode) -> Self {
        self.artifact = artifact;
        self
    }

    pub fn silent_for(mut self, x: u32, y: u32) -> Self {
        self.silent_for = Some((x, y));
        self
    }

    /// Writes the script (plus its output fixtures) into `dir` and returns
    /// the script path. Each invocation appends its arguments to
    /// [`calls_log`]`(dir)`.
    #[cfg(unix)]
    pub fn install(&self, dir: &Path) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        fs::create_dir_all(dir)?;
        let stdout_path = dir.join("fake_stdout.txt");
        let stderr_path = dir.join("fake_stderr.txt");
        fs::write(&stdout_path, &self.stdout)?;
        fs::write(&stderr_path, &self.stderr)?;

        let mut script = String::from("#!/bin/sh\n");
        script.push_str(&format!(
            "echo \"$@\" >> '{}'\n",
            calls_log(dir).display()
        ));
        match self.artifact {
            ArtifactMode::None => {}
            ArtifactMode::BySizeSteps => {
                script.push_str("printf 'heat %s %s\\n' \"$1\" \"$2\" > \"$3\"\n");
            }
            ArtifactMode::ByThreads => {
                script.push_str(
                    "printf 'heat %s %s %s %s\\n' \"$1\" \"$2\" \"$4\" \"$5\" > \"$3\"\n",
                );
            }
        }
        if let Some((x, y)) = self.silent_for {
            script.push_str(&format!(
                "if [ \"$4\" = {x} ] && [ \"$5\" = {y} ]; then echo 'kernel finished'; exit 0; fi\n"
            ));
        }
        script.push_str(&format!("cat '{}'\n", stdout_path.display()));
        script.push_str(&format!("cat '{}' >&2\n", stderr_path.display()));
        script.push_str(&format!("exit {}\n", self.exit_code));

        let path = dir.join("fake_heat");
        fs::write(&path, script)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}

pub fn calls_log(dir: &Path) -> PathBuf {
    dir.join("calls.log")
}

/// Argument lines the fake program received, in order.
pub fn recorded_calls(dir: &Path) -> Result<Vec<String>> {
    let path = calls_log(dir);
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::to_string)
        .collect())
}

/// Writes the baseline image a [`ArtifactMode::BySizeSteps`] fake produces.
pub fn write_reference(
    reference_dir: &Path,
    naming: &NamingConfig,
    size: u64,
    steps: u64,
) -> Result<PathBuf> {
    fs::create_dir_all(reference_dir)?;
    let path = reference_dir.join(naming.reference_name(size, steps));
    fs::write(&path, format!("heat {size} {steps}\n"))?;
    Ok(path)
}

/// Scratch workspace with a config pointing at `executable`, no pause
/// between runs, and the given grid.
pub struct SweepWorkspace {
    pub dir: TempDir,
    pub config: SweepConfig,
}

impl SweepWorkspace {
    pub fn new(grid: ParameterGrid, executable: &Path) -> Result<Self> {
        let dir = TempDir::new()?;
        let mut config = SweepConfig::default();
        config.grid = grid;
        config.program.executable = executable.to_path_buf();
        config.program.pause_ms = 0;
        Ok(Self { dir, config })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
