use crate::SweepDriver;
use anyhow::Result;
use heatsweep_core::{GridPoint, Pass};
use heatsweep_observe::SweepEvent;
use heatsweep_tools::{Comparison, compare_files};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Ok,
    Mismatch,
    MissingArtifact,
    MissingReference,
}

#[derive(Debug, Serialize)]
pub struct ArtifactCheck {
    #[serde(flatten)]
    pub point: GridPoint,
    pub artifact: PathBuf,
    pub reference: PathBuf,
    pub outcome: CheckOutcome,
}

#[derive(Debug, Default, Serialize)]
pub struct ValidateReport {
    pub checks: Vec<ArtifactCheck>,
}

impl ValidateReport {
    pub fn passed(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.outcome == CheckOutcome::Ok)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.checks.len() - self.passed()
    }
}

impl SweepDriver<'_> {
    /// Compares every generated artifact byte for byte with the reference
    /// image for its `(size, steps)`. Mismatches are reported per point and
    /// never stop the pass.
    pub fn validate(&self) -> Result<ValidateReport> {
        let grid = &self.config.grid;
        self.pass_started(Pass::Validate, grid.len());

        let mut report = ValidateReport::default();
        for point in grid.points() {
            self.interrupt.check()?;
            let artifact = self.artifact_path(&point);
            let reference = self.reference_path(&point);
            let outcome = match compare_files(&artifact, &reference)? {
                Comparison::Identical => CheckOutcome::Ok,
                Comparison::Different => CheckOutcome::Mismatch,
                Comparison::Missing { path } if path == artifact => CheckOutcome::MissingArtifact,
                Comparison::Missing { .. } => CheckOutcome::MissingReference,
            };

            let artifact_name = self.config.naming.artifact_name(&point);
            let reference_name = self
                .config
                .naming
                .reference_name(point.size, point.steps);
            match outcome {
                CheckOutcome::Ok => self.observer.info(&format!("{artifact_name} --> OK")),
                CheckOutcome::Mismatch => self.observer.warn_log(&format!(
                    "FAILURE: {artifact_name} does not match {reference_name}"
                )),
                CheckOutcome::MissingArtifact => self.observer.warn_log(&format!(
                    "FAILURE: {artifact_name} was not found in {}",
                    self.layout.artifact_dir.display()
                )),
                CheckOutcome::MissingReference => self.observer.warn_log(&format!(
                    "FAILURE: reference {reference_name} was not found in {}",
                    self.layout.reference_dir.display()
                )),
            }
            self.record(SweepEvent::ArtifactChecked {
                point,
                matched: outcome == CheckOutcome::Ok,
            });
            report.checks.push(ArtifactCheck {
                point,
                artifact,
                reference,
                outcome,
            });
        }

        self.observer.info(&format!(
            "Validate pass finished: {} OK, {} failed.",
            report.passed(),
            report.failed()
        ));
        self.pass_finished(Pass::Validate);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::config;
    use heatsweep_observe::Observer;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &std::path::Path, body: &[u8]) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, body).expect("write");
    }

    #[test]
    fn reports_each_point_independently() {
        let workspace = TempDir::new().expect("workspace");
        let cfg = config(&[100], &[100], &[(2, 1), (2, 2), (4, 2)]);
        let observer = Observer::new(workspace.path()).expect("observer");
        let driver = SweepDriver::new(workspace.path(), &cfg, &observer);
        let bmp = workspace.path().join("bmp");

        write(
            &workspace.path().join("bmp_serial/output_serial_nx_100_st_100.bmp"),
            b"BM-reference",
        );
        write(
            &bmp.join("output_cuda_nx_100_st_100_thx_2_thy_1_th_2.bmp"),
            b"BM-reference",
        );
        write(
            &bmp.join("output_cuda_nx_100_st_100_thx_2_thy_2_th_4.bmp"),
            b"BM-referencf",
        );

        let report = driver.validate().expect("validate");
        let outcomes: Vec<_> = report.checks.iter().map(|c| c.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                CheckOutcome::Ok,
                CheckOutcome::Mismatch,
                CheckOutcome::MissingArtifact
            ]
        );
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 2);
    }

    #[test]
    fn reference_is_shared_across_thread_shapes() {
        let workspace = TempDir::new().expect("workspace");
        let cfg = config(&[100], &[100], &[(2, 1), (32, 32)]);
        let observer = Observer::new(workspace.path()).expect("observer");
        let driver = SweepDriver::new(workspace.path(), &cfg, &observer);
        for name in [
            "output_cuda_nx_100_st_100_thx_2_thy_1_th_2.bmp",
            "output_cuda_nx_100_st_100_thx_32_thy_32_th_1024.bmp",
        ] {
            write(&workspace.path().join("bmp").join(name), b"same");
        }

        let report = driver.validate().expect("validate");
        assert!(
            report
                .checks
                .iter()
                .all(|c| c.outcome == CheckOutcome::MissingReference)
        );
        assert!(
            report
                .checks
                .iter()
                .all(|c| c.reference.ends_with("output_serial_nx_100_st_100.bmp"))
        );

        write(
            &workspace.path().join("bmp_serial/output_serial_nx_100_st_100.bmp"),
            b"same",
        );
        let report = driver.validate().expect("validate");
        assert_eq!(report.passed(), 2);
    }
}
