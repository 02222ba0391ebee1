#![cfg(unix)]

use assert_cmd::Command;
use heatsweep_testkit::{ArtifactMode, FakeProgram, recorded_calls, write_reference};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_settings(workspace: &Path, program: &Path, extra: Value) {
    let dir = workspace.join(".heatsweep");
    fs::create_dir_all(&dir).expect("runtime dir");
    let mut settings = json!({
        "grid": {"sizes": [100], "steps": [100], "threads": [[2, 1]]},
        "program": {"executable": program, "pause_ms": 0},
    });
    if let (Some(base), Some(overlay)) = (settings.as_object_mut(), extra.as_object()) {
        for (key, value) in overlay {
            base.insert(key.clone(), value.clone());
        }
    }
    fs::write(
        dir.join("settings.json"),
        serde_json::to_vec_pretty(&settings).expect("settings json"),
    )
    .expect("write settings");
}

fn heatsweep(workspace: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("heatsweep"));
    cmd.current_dir(workspace);
    cmd
}

fn run_json(workspace: &Path, args: &[&str]) -> Value {
    let output = heatsweep(workspace)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("json output")
}

#[test]
fn run_produces_result_file_and_table_row() {
    let workspace = TempDir::new().expect("workspace");
    let bin = TempDir::new().expect("bin");
    let program = FakeProgram::printing("The Execution Time= 0.5\n")
        .install(bin.path())
        .expect("install");
    write_settings(workspace.path(), &program, json!({}));

    let out = run_json(workspace.path(), &["--json", "run"]);
    assert_eq!(out["execute"]["completed"][0]["elapsed"], "0.5");
    assert_eq!(out["aggregate"]["rows"].as_array().map(Vec::len), Some(1));
    assert!(out["validate"].is_null());

    let result = workspace
        .path()
        .join("results/heat_cuda_nx_100_st_100_thx_2_thy_1_th_2.txt");
    assert_eq!(fs::read_to_string(result).expect("result"), "0.5\n");
    assert_eq!(
        fs::read_to_string(workspace.path().join("heat_results.csv")).expect("table"),
        "config,size,step,threads,time\nCUDA,100,100,2,0.5\n"
    );
}

#[test]
fn human_mode_prints_progress_lines() {
    let workspace = TempDir::new().expect("workspace");
    let bin = TempDir::new().expect("bin");
    let program = FakeProgram::default().install(bin.path()).expect("install");
    write_settings(workspace.path(), &program, json!({}));

    let output = heatsweep(workspace.path())
        .arg("execute")
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Running: "));
    assert!(stdout.contains(" 100 100 "));
    assert!(stdout.contains("Execution time: 0.5 s"));
    assert!(
        fs::read_to_string(workspace.path().join(".heatsweep/sweep.log"))
            .expect("log")
            .contains("\"kind\":\"run_completed\"")
    );
}

#[test]
fn aggregate_twice_yields_identical_tables() {
    let workspace = TempDir::new().expect("workspace");
    let bin = TempDir::new().expect("bin");
    let program = FakeProgram::default().install(bin.path()).expect("install");
    write_settings(
        workspace.path(),
        &program,
        json!({"grid": {"sizes": [100, 1000], "steps": [100], "threads": [[2, 1], [4, 4]]}}),
    );
    run_json(workspace.path(), &["--json", "execute"]);
    fs::remove_file(
        workspace
            .path()
            .join("results/heat_cuda_nx_1000_st_100_thx_4_thy_4_th_16.txt"),
    )
    .expect("remove one result");

    let first = run_json(workspace.path(), &["--json", "aggregate"]);
    let table_one = fs::read(workspace.path().join("heat_results.csv")).expect("table");
    let second = run_json(workspace.path(), &["--json", "aggregate"]);
    let table_two = fs::read(workspace.path().join("heat_results.csv")).expect("table");

    assert_eq!(table_one, table_two);
    assert_eq!(first["rows"], second["rows"]);
    assert_eq!(first["rows"].as_array().map(Vec::len), Some(3));
    assert_eq!(first["missing"][0]["size"], 1000);
}

#[test]
fn failing_program_exits_nonzero_with_structured_error() {
    let workspace = TempDir::new().expect("workspace");
    let bin = TempDir::new().expect("bin");
    let program = FakeProgram::failing(2, "no CUDA-capable device")
        .install(bin.path())
        .expect("install");
    write_settings(workspace.path(), &program, json!({}));

    let output = heatsweep(workspace.path())
        .args(["--json", "run"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let out: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(out["status"], "error");
    assert_eq!(out["error"]["error_type"], "invocation");
    assert_eq!(out["error"]["context"], "execute pass failed");
    assert!(
        out["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("no CUDA-capable device"))
    );
    assert_eq!(recorded_calls(bin.path()).expect("calls").len(), 1);
    assert!(!workspace.path().join("heat_results.csv").exists());
}

#[test]
fn validation_mismatch_does_not_change_exit_code() {
    let workspace = TempDir::new().expect("workspace");
    let bin = TempDir::new().expect("bin");
    let program = FakeProgram::default()
        .with_artifact(ArtifactMode::ByThreads)
        .install(bin.path())
        .expect("install");
    write_settings(
        workspace.path(),
        &program,
        json!({"passes": {"validate": true}}),
    );
    write_reference(
        &workspace.path().join("bmp_serial"),
        &heatsweep_core::NamingConfig::default(),
        100,
        100,
    )
    .expect("reference");

    let out = run_json(workspace.path(), &["--json", "run"]);
    assert_eq!(out["validate"]["checks"][0]["outcome"], "mismatch");
    assert_eq!(out["aggregate"]["rows"].as_array().map(Vec::len), Some(1));
}

#[test]
fn invalid_config_is_reported_as_configuration_error() {
    let workspace = TempDir::new().expect("workspace");
    let bin = TempDir::new().expect("bin");
    let program = FakeProgram::default().install(bin.path()).expect("install");
    write_settings(
        workspace.path(),
        &program,
        json!({"grid": {"sizes": [0], "steps": [100], "threads": [[2, 1]]}}),
    );

    let output = heatsweep(workspace.path())
        .args(["--json", "grid"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let out: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(out["error"]["error_type"], "configuration");
    assert!(recorded_calls(bin.path()).expect("calls").is_empty());
}

#[test]
fn grid_lists_every_point_with_file_names() {
    let workspace = TempDir::new().expect("workspace");
    fs::write(
        workspace.path().join("sweep.toml"),
        "[grid]\nsizes = [100, 2000]\nsteps = [100]\nthreads = [[2, 1], [32, 32]]\n",
    )
    .expect("config");

    let out = run_json(workspace.path(), &["--json", "--config", "sweep.toml", "grid"]);
    let entries = out.as_array().expect("array");
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[3]["threads_total"], 1024);
    assert_eq!(
        entries[3]["result"],
        "heat_cuda_nx_2000_st_100_thx_32_thy_32_th_1024.txt"
    );
    assert_eq!(entries[3]["reference"], "output_serial_nx_2000_st_100.bmp");
}

#[test]
fn prepare_clean_removes_previous_outputs() {
    let workspace = TempDir::new().expect("workspace");
    let results = workspace.path().join("results");
    fs::create_dir_all(&results).expect("results");
    fs::write(results.join("old.txt"), "1.0\n").expect("old result");

    let keep = run_json(workspace.path(), &["--json", "prepare", "--keep"]);
    assert_eq!(keep["removed_results"], 0);
    assert!(results.join("old.txt").exists());

    let clean = run_json(workspace.path(), &["--json", "prepare", "--clean"]);
    assert_eq!(clean["removed_results"], 1);
    assert!(!results.join("old.txt").exists());
    assert!(workspace.path().join("bmp").is_dir());
}

#[test]
fn config_command_shows_merged_settings() {
    let workspace = TempDir::new().expect("workspace");
    let bin = TempDir::new().expect("bin");
    let program = FakeProgram::default().install(bin.path()).expect("install");
    write_settings(workspace.path(), &program, json!({"naming": {"label": "CUDA-T4"}}));

    let out = run_json(workspace.path(), &["--json", "config"]);
    assert_eq!(out["config"]["naming"]["label"], "CUDA-T4");
    assert_eq!(out["config"]["naming"]["result_prefix"], "heat_cuda");
    assert_eq!(out["grid_points"], 1);
    assert_eq!(out["config"]["program"]["pause_ms"], 0);
}
