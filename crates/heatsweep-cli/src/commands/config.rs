use anyhow::Result;
use serde_json::json;

use crate::context::SweepSession;
use crate::output::{print_json, print_pretty_json};

pub(crate) fn run_config(session: &SweepSession, json_mode: bool) -> Result<()> {
    let payload = json!({
        "config": session.config,
        "layout": session.config.layout(&session.workspace),
        "grid_points": session.config.grid.len(),
    });
    if json_mode {
        print_json(&payload)
    } else {
        print_pretty_json(&payload)
    }
}
