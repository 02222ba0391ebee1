use crate::runner::RunOutput;
use anyhow::{Result, anyhow};
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Runs a free-form command line through the platform shell. Used for the
/// compile step, whose command is user-supplied text.
pub trait ShellRunner {
    fn run(&self, cmd: &str, cwd: &Path) -> Result<RunOutput>;
}

#[derive(Debug, Default)]
pub struct PlatformShellRunner;

impl ShellRunner for PlatformShellRunner {
    fn run(&self, cmd: &str, cwd: &Path) -> Result<RunOutput> {
        let child = spawn_command(cmd, cwd)?;
        let output = child.wait_with_output()?;
        Ok(RunOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

fn spawn_command(cmd: &str, cwd: &Path) -> Result<Child> {
    let mut errors = Vec::new();
    for mut command in candidate_commands(cmd) {
        command.current_dir(cwd);
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.stdin(Stdio::null());
        let program = command.get_program().to_string_lossy().to_string();
        match command.spawn() {
            Ok(child) => return Ok(child),
            Err(err) => errors.push(format!("{program}: {err}")),
        }
    }
    Err(anyhow!(
        "failed to spawn command '{cmd}' in '{}': {}",
        cwd.display(),
        errors.join(" | ")
    ))
}

#[cfg(target_os = "windows")]
fn candidate_commands(cmd: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut cmd_shell = Command::new("cmd");
    cmd_shell.arg("/C").arg(cmd);
    commands.push(cmd_shell);

    let mut ps_shell = Command::new("powershell");
    ps_shell
        .arg("-NoLogo")
        .arg("-NoProfile")
        .arg("-Command")
        .arg(cmd);
    commands.push(ps_shell);

    commands
}

#[cfg(not(target_os = "windows"))]
fn candidate_commands(cmd: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut sh_shell = Command::new("sh");
    sh_shell.arg("-lc").arg(cmd);
    commands.push(sh_shell);

    let mut bash_shell = Command::new("bash");
    bash_shell.arg("-lc").arg(cmd);
    commands.push(bash_shell);

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_runner_executes_command() {
        let out = PlatformShellRunner
            .run("echo heatsweep", Path::new("."))
            .expect("run command");
        assert!(out.success());
        assert!(out.stdout.contains("heatsweep"));
    }

    #[cfg(unix)]
    #[test]
    fn shell_runner_reports_nonzero_status() {
        let out = PlatformShellRunner
            .run("echo broken >&2; exit 2", Path::new("."))
            .expect("run command");
        assert_eq!(out.status, Some(2));
        assert!(out.stderr.contains("broken"));
    }
}
