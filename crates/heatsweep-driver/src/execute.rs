use crate::SweepDriver;
use anyhow::Result;
use heatsweep_core::{GridPoint, Pass, RunResult, SweepError, extract_execution_time};
use heatsweep_observe::SweepEvent;
use heatsweep_tools::format_command;
use serde::Serialize;
use std::fs;
use std::time::Duration;

#[derive(Debug, Default, Serialize)]
pub struct ExecuteReport {
    pub completed: Vec<RunResult>,
    pub skipped: Vec<SkippedRun>,
}

/// A run whose output lacked the execution-time line. Both streams are kept
/// for diagnosis.
#[derive(Debug, Serialize)]
pub struct SkippedRun {
    #[serde(flatten)]
    pub point: GridPoint,
    pub stdout: String,
    pub stderr: String,
}

impl SweepDriver<'_> {
    /// Runs the program once per grid point and writes one result file per
    /// run that reported an execution time.
    ///
    /// A missing timing line skips the point. A launch failure or nonzero
    /// exit aborts the pass, leaving earlier result files on disk.
    pub fn execute(&self) -> Result<ExecuteReport> {
        let grid = &self.config.grid;
        for dir in [&self.layout.artifact_dir, &self.layout.results_dir] {
            fs::create_dir_all(dir).map_err(|err| SweepError::io("create", dir, err))?;
        }
        self.pass_started(Pass::Execute, grid.len());

        let pause = Duration::from_millis(self.config.program.pause_ms);
        let mut report = ExecuteReport::default();
        for point in grid.points() {
            self.interrupt.check()?;
            let args = self.program_args(&point);
            let command = format_command(&self.layout.executable, &args);
            self.observer.info(&format!("Running: {command}"));

            let output = self
                .runner
                .run(&self.layout.executable, &args, &self.layout.workspace)?;
            // A SIGINT also reaches the child, so its exit status says nothing.
            self.interrupt.check()?;
            if !output.success() {
                return Err(SweepError::InvocationFailed {
                    command,
                    code: output.status,
                    stderr: output.stderr,
                }
                .into());
            }

            match extract_execution_time(&output.stdout) {
                Some(elapsed) => {
                    let path = self.result_path(&point);
                    fs::write(&path, format!("{elapsed}\n"))
                        .map_err(|err| SweepError::io("write", &path, err))?;
                    self.observer.info(&format!("Execution time: {elapsed} s"));
                    self.record(SweepEvent::RunCompleted {
                        point,
                        elapsed: elapsed.to_string(),
                    });
                    report.completed.push(RunResult {
                        point,
                        elapsed: elapsed.to_string(),
                    });
                }
                None => {
                    self.observer.warn_log(&format!(
                        "Execution time not found in output of: {command}\nProgram output:\n{}\nError output:\n{}",
                        output.stdout, output.stderr
                    ));
                    self.record(SweepEvent::RunSkipped { point });
                    report.skipped.push(SkippedRun {
                        point,
                        stdout: output.stdout,
                        stderr: output.stderr,
                    });
                }
            }

            self.interrupt.sleep(pause)?;
        }

        self.observer.info(&format!(
            "Execute pass finished: {} completed, {} skipped.",
            report.completed.len(),
            report.skipped.len()
        ));
        self.pass_finished(Pass::Execute);
        Ok(report)
    }

    /// `<size> <steps> <artifact_path> <thread_x> <thread_y>`
    fn program_args(&self, point: &GridPoint) -> Vec<String> {
        vec![
            point.size.to_string(),
            point.steps.to_string(),
            self.artifact_path(point).display().to_string(),
            point.threads.x.to_string(),
            point.threads.y.to_string(),
        ]
    }
}
