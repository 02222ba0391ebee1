use crate::SweepDriver;
use anyhow::Result;
use heatsweep_core::{Pass, SweepError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CompileReport {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
}

impl SweepDriver<'_> {
    /// Builds the benchmark program with `program.compile_command`, run
    /// through the platform shell in the workspace.
    pub fn compile(&self) -> Result<CompileReport> {
        self.pass_started(Pass::Compile, 0);
        let command = self.config.program.compile_command.clone();
        if command.trim().is_empty() {
            return Err(SweepError::config("program.compile_command is empty").into());
        }
        self.observer.info(&format!("Compiling: {command}"));
        let output = self.shell.run(&command, &self.layout.workspace)?;
        // The compiler gets the same SIGINT; its status says nothing then.
        self.interrupt.check()?;
        if !output.success() {
            return Err(SweepError::CompileFailed {
                command,
                code: output.status,
                stderr: output.stderr,
            }
            .into());
        }
        self.pass_finished(Pass::Compile);
        Ok(CompileReport {
            command,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
