use anyhow::Result;
use chrono::{DateTime, Utc};
use heatsweep_core::{GridPoint, Pass, runtime_dir};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Something a pass did, appended to the run log as an `EVENT` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepEvent {
    PassStarted {
        pass: Pass,
        grid_points: usize,
    },
    RunCompleted {
        point: GridPoint,
        elapsed: String,
    },
    /// The program exited cleanly but printed no execution time.
    RunSkipped {
        point: GridPoint,
    },
    ArtifactChecked {
        point: GridPoint,
        matched: bool,
    },
    ResultMissing {
        point: GridPoint,
    },
    TableWritten {
        path: PathBuf,
        rows: usize,
    },
    PassFinished {
        pass: Pass,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub run_id: Uuid,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: SweepEvent,
}

pub struct Observer {
    log_path: PathBuf,
    run_id: Uuid,
    verbose: bool,
    quiet: bool,
}

impl Observer {
    pub fn new(workspace: &Path) -> Result<Self> {
        let dir = runtime_dir(workspace);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            log_path: dir.join("sweep.log"),
            run_id: Uuid::now_v7(),
            verbose: false,
            quiet: false,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn record_event(&self, event: SweepEvent) -> Result<()> {
        let envelope = EventEnvelope {
            run_id: self.run_id,
            at: Utc::now(),
            event,
        };
        self.append_log_line(&format!(
            "{} EVENT {}",
            envelope.at.to_rfc3339(),
            serde_json::to_string(&envelope)?
        ))
    }

    /// Enable or disable verbose logging to stderr.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Suppress progress lines on stdout, e.g. when stdout carries JSON.
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Progress line: stdout unless quiet, and always the log file.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{msg}");
        }
        let _ = self.append_log_line(&format!("{} INFO {msg}", Utc::now().to_rfc3339()));
    }

    /// Log a message to stderr with `[heatsweep]` prefix when verbose mode is on.
    pub fn verbose_log(&self, msg: &str) {
        if self.verbose {
            eprintln!("[heatsweep] {msg}");
        }
    }

    /// Warnings always go to stderr and the log file.
    pub fn warn_log(&self, msg: &str) {
        eprintln!("[heatsweep WARN] {msg}");
        let _ = self.append_log_line(&format!("{} WARN {msg}", Utc::now().to_rfc3339()));
    }

    fn append_log_line(&self, line: &str) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}
