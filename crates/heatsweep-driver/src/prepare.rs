use crate::SweepDriver;
use anyhow::Result;
use heatsweep_core::{Pass, SweepError};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Serialize)]
pub struct PrepareReport {
    pub removed_artifacts: usize,
    pub removed_results: usize,
}

impl SweepDriver<'_> {
    /// Creates the artifact and results directories. With `clean`, also
    /// deletes files left there by a previous sweep, matched by extension.
    pub fn prepare(&self, clean: bool) -> Result<PrepareReport> {
        self.pass_started(Pass::Prepare, 0);
        let naming = &self.config.naming;
        for dir in [&self.layout.artifact_dir, &self.layout.results_dir] {
            fs::create_dir_all(dir).map_err(|err| SweepError::io("create", dir, err))?;
        }

        let mut report = PrepareReport::default();
        if clean {
            report.removed_artifacts =
                remove_with_extension(&self.layout.artifact_dir, &naming.artifact_extension)?;
            report.removed_results =
                remove_with_extension(&self.layout.results_dir, &naming.result_extension)?;
            self.observer.verbose_log(&format!(
                "removed {} artifacts and {} result files",
                report.removed_artifacts, report.removed_results
            ));
        }
        self.pass_finished(Pass::Prepare);
        Ok(report)
    }
}

fn remove_with_extension(dir: &Path, extension: &str) -> Result<usize> {
    let mut removed = 0;
    let entries = fs::read_dir(dir).map_err(|err| SweepError::io("list", dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| SweepError::io("list", dir, err))?;
        let path = entry.path();
        let is_file = entry
            .file_type()
            .map_err(|err| SweepError::io("stat", &path, err))?
            .is_file();
        if is_file && path.extension().is_some_and(|ext| ext == extension) {
            fs::remove_file(&path).map_err(|err| SweepError::io("remove", &path, err))?;
            removed += 1;
        }
    }
    Ok(removed)
}
