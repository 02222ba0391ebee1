//! Deterministic file names for grid points.
//!
//! Every per-run file encodes the full coordinate tuple as
//! `nx_<size>_st_<steps>_thx_<x>_thy_<y>_th_<x*y>`, so the name alone is
//! enough to recover the grid point. Reference images only depend on
//! `(size, steps)`.

use crate::grid::{GridPoint, ThreadShape};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub artifact_prefix: String,
    pub artifact_extension: String,
    pub result_prefix: String,
    pub result_extension: String,
    pub reference_prefix: String,
    /// Value of the `config` column in the aggregate table.
    pub label: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            artifact_prefix: "output_cuda".to_string(),
            artifact_extension: "bmp".to_string(),
            result_prefix: "heat_cuda".to_string(),
            result_extension: "txt".to_string(),
            reference_prefix: "output_serial".to_string(),
            label: "CUDA".to_string(),
        }
    }
}

impl NamingConfig {
    pub fn artifact_name(&self, point: &GridPoint) -> String {
        format!(
            "{}_{}.{}",
            self.artifact_prefix,
            encode_point(point),
            self.artifact_extension
        )
    }

    pub fn result_name(&self, point: &GridPoint) -> String {
        format!(
            "{}_{}.{}",
            self.result_prefix,
            encode_point(point),
            self.result_extension
        )
    }

    /// Baseline image for `(size, steps)`; thread shape plays no part.
    pub fn reference_name(&self, size: u64, steps: u64) -> String {
        format!(
            "{}_nx_{size}_st_{steps}.{}",
            self.reference_prefix, self.artifact_extension
        )
    }

    pub fn parse_artifact_name(&self, name: &str) -> Option<GridPoint> {
        parse_name(name, &self.artifact_prefix, &self.artifact_extension)
    }

    pub fn parse_result_name(&self, name: &str) -> Option<GridPoint> {
        parse_name(name, &self.result_prefix, &self.result_extension)
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("artifact_prefix", &self.artifact_prefix),
            ("artifact_extension", &self.artifact_extension),
            ("result_prefix", &self.result_prefix),
            ("result_extension", &self.result_extension),
            ("reference_prefix", &self.reference_prefix),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(format!("naming.{field} must not be empty"));
            }
            if value.contains(['/', '\\']) {
                return Err(format!(
                    "naming.{field} must not contain path separators: '{value}'"
                ));
            }
        }
        if self.label.contains([',', '\n']) {
            return Err(format!(
                "naming.label must not contain commas or newlines: '{}'",
                self.label
            ));
        }
        Ok(())
    }
}

pub fn encode_point(point: &GridPoint) -> String {
    format!(
        "nx_{}_st_{}_thx_{}_thy_{}_th_{}",
        point.size,
        point.steps,
        point.threads.x,
        point.threads.y,
        point.thread_count()
    )
}

/// Inverse of [`encode_point`]. Rejects names whose total thread count does
/// not equal `thx * thy`.
pub fn decode_point(encoded: &str) -> Option<GridPoint> {
    let parts: Vec<&str> = encoded.split('_').collect();
    let ["nx", size, "st", steps, "thx", x, "thy", y, "th", total] = parts.as_slice() else {
        return None;
    };
    let point = GridPoint::new(
        parse_positive(size)?,
        parse_positive(steps)?,
        ThreadShape::new(parse_positive(x)?, parse_positive(y)?),
    );
    let total: u64 = parse_positive(total)?;
    (point.thread_count() == total).then_some(point)
}

fn parse_name(name: &str, prefix: &str, extension: &str) -> Option<GridPoint> {
    let stem = name.strip_suffix(extension)?.strip_suffix('.')?;
    let encoded = stem.strip_prefix(prefix)?.strip_prefix('_')?;
    decode_point(encoded)
}

fn parse_positive<T>(raw: &str) -> Option<T>
where
    T: std::str::FromStr + PartialEq + Default,
{
    // Leading zeros or signs would give one grid point several spellings.
    if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: T = raw.parse().ok()?;
    (value != T::default()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn point(size: u64, steps: u64, x: u32, y: u32) -> GridPoint {
        GridPoint::new(size, steps, ThreadShape::new(x, y))
    }

    #[test]
    fn default_names_follow_heat_cuda_layout() {
        let naming = NamingConfig::default();
        let p = point(100, 1_000, 8, 4);
        assert_eq!(
            naming.artifact_name(&p),
            "output_cuda_nx_100_st_1000_thx_8_thy_4_th_32.bmp"
        );
        assert_eq!(
            naming.result_name(&p),
            "heat_cuda_nx_100_st_1000_thx_8_thy_4_th_32.txt"
        );
        assert_eq!(
            naming.reference_name(100, 1_000),
            "output_serial_nx_100_st_1000.bmp"
        );
    }

    #[test]
    fn parse_rejects_inconsistent_thread_total() {
        let naming = NamingConfig::default();
        assert_eq!(
            naming.parse_result_name("heat_cuda_nx_100_st_100_thx_2_thy_1_th_2.txt"),
            Some(point(100, 100, 2, 1))
        );
        assert_eq!(
            naming.parse_result_name("heat_cuda_nx_100_st_100_thx_2_thy_1_th_4.txt"),
            None
        );
    }

    #[test]
    fn parse_rejects_foreign_prefix_and_extension() {
        let naming = NamingConfig::default();
        let name = "heat_cuda_nx_100_st_100_thx_2_thy_1_th_2.txt";
        assert!(naming.parse_artifact_name(name).is_none());
        assert!(
            naming
                .parse_result_name("heat_cuda_nx_100_st_100_thx_2_thy_1_th_2.bmp")
                .is_none()
        );
        assert!(
            naming
                .parse_result_name("heat_cuda_nx_0100_st_100_thx_2_thy_1_th_2.txt")
                .is_none()
        );
    }

    #[test]
    fn validate_rejects_separators_and_blank_fields() {
        let mut naming = NamingConfig::default();
        assert!(naming.validate().is_ok());
        naming.result_prefix = "sub/heat".to_string();
        assert!(naming.validate().unwrap_err().contains("result_prefix"));

        let mut naming = NamingConfig::default();
        naming.artifact_extension = " ".to_string();
        assert!(naming.validate().unwrap_err().contains("artifact_extension"));
    }

    #[test]
    fn default_grid_has_no_name_collisions() {
        let naming = NamingConfig::default();
        let grid = crate::grid::ParameterGrid::default();
        let artifacts: HashSet<_> = grid.points().map(|p| naming.artifact_name(&p)).collect();
        let results: HashSet<_> = grid.points().map(|p| naming.result_name(&p)).collect();
        assert_eq!(artifacts.len(), grid.len());
        assert_eq!(results.len(), grid.len());
    }

    fn arb_point() -> impl Strategy<Value = GridPoint> {
        (1u64..1_000_000, 1u64..1_000_000, 1u32..1_024, 1u32..1_024)
            .prop_map(|(size, steps, x, y)| point(size, steps, x, y))
    }

    proptest! {
        #[test]
        fn result_names_round_trip_to_the_same_point(p in arb_point()) {
            let naming = NamingConfig::default();
            prop_assert_eq!(naming.parse_result_name(&naming.result_name(&p)), Some(p));
            prop_assert_eq!(naming.parse_artifact_name(&naming.artifact_name(&p)), Some(p));
        }

        #[test]
        fn distinct_points_get_distinct_names(a in arb_point(), b in arb_point()) {
            let naming = NamingConfig::default();
            prop_assert_eq!(a == b, naming.result_name(&a) == naming.result_name(&b));
            prop_assert_eq!(a == b, naming.artifact_name(&a) == naming.artifact_name(&b));
        }
    }
}
