use anyhow::Result;
use heatsweep_core::SweepError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, Stdio};

/// Captured outcome of one blocking program invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Launches a program with positional arguments and waits for it.
pub trait ProgramRunner {
    fn run(&self, program: &Path, args: &[String], cwd: &Path) -> Result<RunOutput>;
}

/// Runs the program directly (no shell), stdin closed, stdout and stderr captured.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProgramRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[String], cwd: &Path) -> Result<RunOutput> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SweepError::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        Ok(RunOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Human-readable command line, as printed before each run.
pub fn format_command(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
