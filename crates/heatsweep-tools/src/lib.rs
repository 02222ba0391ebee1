pub mod compare;
pub mod runner;
pub mod shell;

pub use compare::{Comparison, compare_files};
pub use runner::{ProcessRunner, ProgramRunner, RunOutput, format_command};
pub use shell::{PlatformShellRunner, ShellRunner};
