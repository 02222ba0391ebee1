use crate::SweepDriver;
use anyhow::Result;
use heatsweep_core::{GridPoint, Pass, RunResult, SweepError};
use heatsweep_observe::SweepEvent;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const TABLE_HEADER: &str = "config,size,step,threads,time";

#[derive(Debug, Serialize)]
pub struct AggregateReport {
    pub table: PathBuf,
    pub rows: Vec<RunResult>,
    /// Grid points with no usable result file.
    pub missing: Vec<GridPoint>,
}

/// One table line (without newline): `label,size,steps,x*y,elapsed`.
pub fn render_row(label: &str, result: &RunResult) -> String {
    format!(
        "{label},{},{},{},{}",
        result.point.size,
        result.point.steps,
        result.point.thread_count(),
        result.elapsed
    )
}

impl SweepDriver<'_> {
    /// Reads every grid point's result file back from disk and rewrites the
    /// summary table from scratch. Missing or empty result files are logged
    /// and left out of the table.
    pub fn aggregate(&self) -> Result<AggregateReport> {
        let grid = &self.config.grid;
        self.pass_started(Pass::Aggregate, grid.len());

        let mut rows = Vec::new();
        let mut missing = Vec::new();
        for point in grid.points() {
            self.interrupt.check()?;
            let path = self.result_path(&point);
            let name = self.config.naming.result_name(&point);
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    self.observer
                        .warn_log(&format!("File {name} not found. Skipping."));
                    self.record(SweepEvent::ResultMissing { point });
                    missing.push(point);
                    continue;
                }
                Err(err) => return Err(SweepError::io("read", &path, err).into()),
            };
            let elapsed = raw.trim();
            if elapsed.is_empty() {
                self.observer
                    .warn_log(&format!("File {name} is empty. Skipping."));
                self.record(SweepEvent::ResultMissing { point });
                missing.push(point);
                continue;
            }
            rows.push(RunResult {
                point,
                elapsed: elapsed.to_string(),
            });
        }

        let label = &self.config.naming.label;
        let mut table = String::with_capacity(TABLE_HEADER.len() + 1 + rows.len() * 32);
        table.push_str(TABLE_HEADER);
        table.push('\n');
        for row in &rows {
            table.push_str(&render_row(label, row));
            table.push('\n');
        }

        let table_path = self.layout.table.clone();
        if let Some(parent) = table_path.parent() {
            fs::create_dir_all(parent).map_err(|err| SweepError::io("create", parent, err))?;
        }
        fs::write(&table_path, table).map_err(|err| SweepError::io("write", &table_path, err))?;

        self.observer.info(&format!(
            "Wrote {} rows to {} ({} missing).",
            rows.len(),
            table_path.display(),
            missing.len()
        ));
        self.record(SweepEvent::TableWritten {
            path: table_path.clone(),
            rows: rows.len(),
        });
        self.pass_finished(Pass::Aggregate);
        Ok(AggregateReport {
            table: table_path,
            rows,
            missing,
        })
    }
}
