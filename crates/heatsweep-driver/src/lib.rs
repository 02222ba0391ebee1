//! The sweep driver: runs a benchmark program over every grid point and
//! turns its output into per-run result files and a summary table.
//!
//! Everything is sequential. One program invocation is awaited before the
//! next grid point is considered, and every pass is a single linear walk of
//! the grid in `sizes × steps × threads` order.

use anyhow::{Context, Result};
use heatsweep_core::config::SweepLayout;
use heatsweep_core::{GridPoint, Pass, SweepConfig};
use heatsweep_observe::{Observer, SweepEvent};
use heatsweep_tools::{PlatformShellRunner, ProcessRunner, ProgramRunner, ShellRunner};
use serde::Serialize;
use std::path::{Path, PathBuf};

mod aggregate;
mod compile;
mod execute;
mod interrupt;
mod prepare;
mod validate;

pub use aggregate::{AggregateReport, TABLE_HEADER, render_row};
pub use compile::CompileReport;
pub use execute::{ExecuteReport, SkippedRun};
pub use interrupt::Interrupt;
pub use prepare::PrepareReport;
pub use validate::{ArtifactCheck, CheckOutcome, ValidateReport};

pub struct SweepDriver<'a> {
    config: &'a SweepConfig,
    layout: SweepLayout,
    observer: &'a Observer,
    interrupt: Interrupt,
    runner: Box<dyn ProgramRunner + 'a>,
    shell: Box<dyn ShellRunner + 'a>,
}

/// Reports of every pass performed by [`SweepDriver::run`]; skipped passes are `None`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub compile: Option<CompileReport>,
    pub prepare: PrepareReport,
    pub execute: Option<ExecuteReport>,
    pub validate: Option<ValidateReport>,
    pub aggregate: Option<AggregateReport>,
}

impl<'a> SweepDriver<'a> {
    pub fn new(workspace: &Path, config: &'a SweepConfig, observer: &'a Observer) -> Self {
        Self {
            config,
            layout: config.layout(workspace),
            observer,
            interrupt: Interrupt::new(),
            runner: Box::new(ProcessRunner),
            shell: Box::new(PlatformShellRunner),
        }
    }

    pub fn with_runner(mut self, runner: impl ProgramRunner + 'a) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_shell(mut self, shell: impl ShellRunner + 'a) -> Self {
        self.shell = Box::new(shell);
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn layout(&self) -> &SweepLayout {
        &self.layout
    }

    /// Performs the enabled passes in order: compile, prepare (always),
    /// execute, validate, aggregate. The first fatal error stops the run.
    pub fn run(&self) -> Result<RunReport> {
        let passes = &self.config.passes;
        let compile = if passes.compile {
            Some(self.compile().context("compile pass failed")?)
        } else {
            None
        };
        let prepare = self
            .prepare(passes.clean)
            .context("preparing output directories failed")?;
        let execute = if passes.execute {
            Some(self.execute().context("execute pass failed")?)
        } else {
            None
        };
        let validate = if passes.validate {
            Some(self.validate().context("validate pass failed")?)
        } else {
            None
        };
        let aggregate = if passes.aggregate {
            Some(self.aggregate().context("aggregate pass failed")?)
        } else {
            None
        };
        Ok(RunReport {
            compile,
            prepare,
            execute,
            validate,
            aggregate,
        })
    }

    fn artifact_path(&self, point: &GridPoint) -> PathBuf {
        self.layout
            .artifact_dir
            .join(self.config.naming.artifact_name(point))
    }

    fn result_path(&self, point: &GridPoint) -> PathBuf {
        self.layout
            .results_dir
            .join(self.config.naming.result_name(point))
    }

    fn reference_path(&self, point: &GridPoint) -> PathBuf {
        self.layout.reference_dir.join(
            self.config
                .naming
                .reference_name(point.size, point.steps),
        )
    }

    fn record(&self, event: SweepEvent) {
        if let Err(err) = self.observer.record_event(event) {
            self.observer
                .verbose_log(&format!("failed to record event: {err}"));
        }
    }

    fn pass_started(&self, pass: Pass, grid_points: usize) {
        self.observer
            .verbose_log(&format!("{} pass started", pass.as_str()));
        self.record(SweepEvent::PassStarted { pass, grid_points });
    }

    fn pass_finished(&self, pass: Pass) {
        self.observer
            .verbose_log(&format!("{} pass finished", pass.as_str()));
        self.record(SweepEvent::PassFinished { pass });
    }
}
