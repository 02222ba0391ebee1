use std::io;
use std::path::PathBuf;

/// Fatal failures of a sweep. Extraction misses, missing result files and
/// artifact mismatches are not errors; they are reported by the passes.
#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("command '{command}' {}: {}", describe_exit(code), stderr.trim())]
    InvocationFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("compile command '{command}' {}: {}", describe_exit(code), stderr.trim())]
    CompileFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("interrupted by user")]
    Interrupted,
}

impl SweepError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True when `err` is (or wraps) an interruption.
    pub fn is_interrupted(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<SweepError>(),
                Some(SweepError::Interrupted)
            )
        })
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_failure_mentions_status_and_stderr() {
        let err = SweepError::InvocationFailed {
            command: "./heat_cuda 100 100 out.bmp 2 1".to_string(),
            code: Some(3),
            stderr: "cudaMalloc failed\n".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exited with status 3"));
        assert!(msg.ends_with("cudaMalloc failed"));
    }

    #[test]
    fn signal_termination_is_described() {
        let err = SweepError::CompileFailed {
            command: "nvcc".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by a signal"));
    }

    #[test]
    fn interruption_is_detected_through_context() {
        let err = anyhow::Error::new(SweepError::Interrupted).context("execute pass");
        assert!(SweepError::is_interrupted(&err));
        let other = anyhow::Error::new(SweepError::config("empty sizes"));
        assert!(!SweepError::is_interrupted(&other));
    }
}
