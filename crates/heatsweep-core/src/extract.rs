use regex::Regex;
use std::sync::LazyLock;

static EXECUTION_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"The Execution Time=\s*((?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("valid regex")
});

/// Returns the elapsed-seconds text printed as `The Execution Time=<float>`,
/// or `None` when the marker is absent.
pub fn extract_execution_time(stdout: &str) -> Option<&str> {
    EXECUTION_TIME
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
