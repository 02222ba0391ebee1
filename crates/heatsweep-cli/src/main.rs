use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use heatsweep_core::SweepError;
use heatsweep_errors::ErrorHandler;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod context;
mod output;

use commands::config::run_config;
use commands::grid::run_grid;
use commands::sweep::{
    run_aggregate, run_all, run_compile, run_execute, run_prepare, run_validate,
};
use context::SweepSession;
use output::print_json;

#[derive(Parser)]
#[command(name = "heatsweep")]
#[command(about = "Benchmark sweep harness for grid-parameterised compute kernels", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Print one JSON report on stdout instead of progress lines.
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging to stderr.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Directory holding the program, outputs and `.heatsweep/` (default: cwd).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Extra TOML or JSON config file, applied after the workspace layers.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every pass enabled in the configuration (default).
    Run,
    /// Invoke the program for each grid point and write result files.
    Execute,
    /// Compare generated artifacts with the reference images.
    Validate,
    /// Rebuild the summary table from the result files.
    Aggregate,
    /// Build the program with the configured compile command.
    Compile,
    /// Create output directories, optionally removing previous outputs.
    Prepare(PrepareArgs),
    /// List grid points and the file names derived from them.
    Grid,
    /// Print the effective configuration.
    Config,
}

#[derive(Args, Default)]
struct PrepareArgs {
    /// Remove previous artifacts and result files.
    #[arg(long)]
    clean: bool,
    /// Keep previous outputs even if `passes.clean` is set.
    #[arg(long, conflicts_with = "clean")]
    keep: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli.command, &cli.global) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err, &cli.global),
    }
}

fn dispatch(command: Option<Commands>, global: &GlobalArgs) -> Result<()> {
    let session = SweepSession::open(global)?;
    let json_mode = global.json;
    match command.unwrap_or(Commands::Run) {
        Commands::Run => run_all(&session, json_mode),
        Commands::Execute => run_execute(&session, json_mode),
        Commands::Validate => run_validate(&session, json_mode),
        Commands::Aggregate => run_aggregate(&session, json_mode),
        Commands::Compile => run_compile(&session, json_mode),
        Commands::Prepare(args) => run_prepare(&session, args, json_mode),
        Commands::Grid => run_grid(&session, json_mode),
        Commands::Config => run_config(&session, json_mode),
    }
}

/// An interrupt is a clean exit; anything else is a failure.
fn report_error(err: &anyhow::Error, global: &GlobalArgs) -> ExitCode {
    if SweepError::is_interrupted(err) {
        if global.json {
            let _ = print_json(&json!({"status": "interrupted"}));
        } else {
            println!("Process interrupted by user.");
        }
        return ExitCode::SUCCESS;
    }

    let handler = ErrorHandler::new().verbose(global.verbose);
    if global.json {
        let _ = print_json(&json!({"status": "error", "error": handler.enhance(err)}));
    } else {
        eprint!("{}", handler.handle(err));
    }
    ExitCode::FAILURE
}
