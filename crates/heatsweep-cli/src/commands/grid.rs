use anyhow::Result;
use heatsweep_core::GridPoint;
use serde::Serialize;

use crate::context::SweepSession;
use crate::output::print_json;

#[derive(Serialize)]
struct GridEntry {
    #[serde(flatten)]
    point: GridPoint,
    threads_total: u64,
    artifact: String,
    result: String,
    reference: String,
}

pub(crate) fn run_grid(session: &SweepSession, json_mode: bool) -> Result<()> {
    let naming = &session.config.naming;
    let entries: Vec<GridEntry> = session
        .config
        .grid
        .points()
        .map(|point| GridEntry {
            point,
            threads_total: point.thread_count(),
            artifact: naming.artifact_name(&point),
            result: naming.result_name(&point),
            reference: naming.reference_name(point.size, point.steps),
        })
        .collect();

    if json_mode {
        return print_json(&entries);
    }
    for entry in &entries {
        println!(
            "size={:<6} steps={:<7} threads={:>2}x{:<2} ({:>4})  {}",
            entry.point.size,
            entry.point.steps,
            entry.point.threads.x,
            entry.point.threads.y,
            entry.threads_total,
            entry.result
        );
    }
    println!("{} grid points", entries.len());
    Ok(())
}
