use serde::{Deserialize, Serialize};

/// Thread-block geometry handed to the kernel as `<thread_x> <thread_y>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct ThreadShape {
    pub x: u32,
    pub y: u32,
}

impl ThreadShape {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y)
    }
}

impl From<(u32, u32)> for ThreadShape {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

impl From<ThreadShape> for (u32, u32) {
    fn from(shape: ThreadShape) -> Self {
        (shape.x, shape.y)
    }
}

/// One concrete combination of the three grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub size: u64,
    pub steps: u64,
    pub threads: ThreadShape,
}

impl GridPoint {
    pub fn new(size: u64, steps: u64, threads: ThreadShape) -> Self {
        Self {
            size,
            steps,
            threads,
        }
    }

    pub fn thread_count(&self) -> u64 {
        self.threads.total()
    }
}

/// Cartesian product of sizes × steps × thread shapes, iterated in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub sizes: Vec<u64>,
    pub steps: Vec<u64>,
    pub threads: Vec<ThreadShape>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            sizes: vec![100, 1_000, 2_000],
            steps: vec![100, 1_000, 10_000, 100_000],
            threads: [
                (2, 1),
                (2, 2),
                (4, 2),
                (4, 4),
                (8, 4),
                (8, 8),
                (16, 8),
                (16, 16),
                (32, 16),
                (32, 32),
            ]
            .into_iter()
            .map(ThreadShape::from)
            .collect(),
        }
    }
}

impl ParameterGrid {
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.sizes.iter().flat_map(move |&size| {
            self.steps.iter().flat_map(move |&steps| {
                self.threads
                    .iter()
                    .map(move |&threads| GridPoint::new(size, steps, threads))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.sizes.len() * self.steps.len() * self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that every axis is non-empty and holds only positive values.
    pub fn validate(&self) -> Result<(), String> {
        if self.sizes.is_empty() {
            return Err("grid.sizes must not be empty".to_string());
        }
        if self.steps.is_empty() {
            return Err("grid.steps must not be empty".to_string());
        }
        if self.threads.is_empty() {
            return Err("grid.threads must not be empty".to_string());
        }
        if self.sizes.contains(&0) {
            return Err("grid.sizes must be positive".to_string());
        }
        if self.steps.contains(&0) {
            return Err("grid.steps must be positive".to_string());
        }
        if let Some(shape) = self.threads.iter().find(|t| t.x == 0 || t.y == 0) {
            return Err(format!(
                "grid.threads entry ({}, {}) must have positive dimensions",
                shape.x, shape.y
            ));
        }
        Ok(())
    }
}

/// Elapsed time extracted for one grid point. `elapsed` keeps the exact text
/// the program printed so the result file and table reproduce it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(flatten)]
    pub point: GridPoint,
    pub elapsed: String,
}

impl RunResult {
    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.elapsed.parse().ok()
    }
}
