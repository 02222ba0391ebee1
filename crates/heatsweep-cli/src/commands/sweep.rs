use anyhow::{Context, Result};

use crate::PrepareArgs;
use crate::context::SweepSession;
use crate::output::print_json;

pub(crate) fn run_all(session: &SweepSession, json_mode: bool) -> Result<()> {
    let report = session.driver().run()?;
    if json_mode {
        print_json(&report)?;
    } else {
        session.observer.info("All passes completed successfully.");
    }
    Ok(())
}

pub(crate) fn run_execute(session: &SweepSession, json_mode: bool) -> Result<()> {
    let report = session
        .driver()
        .execute()
        .context("execute pass failed")?;
    if json_mode {
        print_json(&report)?;
    }
    Ok(())
}

pub(crate) fn run_validate(session: &SweepSession, json_mode: bool) -> Result<()> {
    let report = session
        .driver()
        .validate()
        .context("validate pass failed")?;
    if json_mode {
        print_json(&report)?;
    }
    Ok(())
}

pub(crate) fn run_aggregate(session: &SweepSession, json_mode: bool) -> Result<()> {
    let report = session
        .driver()
        .aggregate()
        .context("aggregate pass failed")?;
    if json_mode {
        print_json(&report)?;
    }
    Ok(())
}

pub(crate) fn run_compile(session: &SweepSession, json_mode: bool) -> Result<()> {
    let report = session
        .driver()
        .compile()
        .context("compile pass failed")?;
    if json_mode {
        print_json(&report)?;
    } else {
        print!("{}", report.stdout);
        session.observer.info("Compilation finished.");
    }
    Ok(())
}

pub(crate) fn run_prepare(session: &SweepSession, args: PrepareArgs, json_mode: bool) -> Result<()> {
    let clean = args.clean || (!args.keep && session.config.passes.clean);
    let report = session
        .driver()
        .prepare(clean)
        .context("preparing output directories failed")?;
    if json_mode {
        print_json(&report)?;
    } else {
        session.observer.info(&format!(
            "Prepared output directories ({} artifacts, {} result files removed).",
            report.removed_artifacts, report.removed_results
        ));
    }
    Ok(())
}
