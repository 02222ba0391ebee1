//! User-facing error presentation for heatsweep.
//!
//! Turns fatal sweep errors into a short title, the underlying message and a
//! list of recovery suggestions, for either terminal or JSON output.

use anyhow::Error;
use heatsweep_core::SweepError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error with a user-friendly title and recovery suggestions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedError {
    pub title: String,
    pub message: String,
    pub suggestions: Vec<String>,
    pub error_type: ErrorType,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Invalid or unreadable configuration
    Configuration,
    /// The benchmark program could not be launched or exited nonzero
    Invocation,
    /// The compile command failed
    Compilation,
    /// Reading or writing sweep files failed
    Filesystem,
    /// The user interrupted the sweep
    Interrupted,
    Unknown,
}

impl EnhancedError {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        error_type: ErrorType,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            suggestions: Vec::new(),
            error_type,
            context: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions
            .extend(suggestions.into_iter().map(Into::into));
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Format error for display
    pub fn format(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}: {}\n", self.error_type.tag(), self.title));
        output.push_str(&format!("  {}\n", self.message));

        if verbose && let Some(context) = &self.context {
            output.push_str(&format!("\n  Context: {context}\n"));
        }

        if !self.suggestions.is_empty() {
            output.push_str("\n  Suggestions:\n");
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("    {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl ErrorType {
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorType::Configuration => "[config]",
            ErrorType::Invocation => "[run]",
            ErrorType::Compilation => "[compile]",
            ErrorType::Filesystem => "[fs]",
            ErrorType::Interrupted => "[interrupt]",
            ErrorType::Unknown => "[error]",
        }
    }
}

impl fmt::Display for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

impl std::error::Error for EnhancedError {}

/// Error handler for providing user-friendly error messages
pub struct ErrorHandler {
    verbose: bool,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self {
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Render `error` for the terminal.
    pub fn handle(&self, error: &Error) -> String {
        self.enhance(error).format(self.verbose)
    }

    /// Classify `error` without rendering it, e.g. for JSON output.
    pub fn enhance(&self, error: &Error) -> EnhancedError {
        let enhanced = if let Some(enhanced) = error.downcast_ref::<EnhancedError>() {
            enhanced.clone()
        } else if let Some(sweep) = error.chain().find_map(|c| c.downcast_ref::<SweepError>()) {
            classify_sweep_error(sweep)
        } else {
            EnhancedError::new("Error", error.to_string(), ErrorType::Unknown)
                .with_suggestion("Re-run with --verbose and check .heatsweep/sweep.log")
        };

        // Outermost anyhow context, e.g. the pass that failed.
        let outer = error.to_string();
        if enhanced.context.is_none() && outer != enhanced.message {
            return enhanced.with_context(outer);
        }
        enhanced
    }
}

fn classify_sweep_error(err: &SweepError) -> EnhancedError {
    let message = err.to_string();
    match err {
        SweepError::Config(_) => errors::invalid_configuration(&message),
        SweepError::Spawn { program, .. } => {
            EnhancedError::new("Program Not Launched", message.clone(), ErrorType::Invocation)
                .with_suggestions([
                    format!("Check that '{program}' exists and is executable"),
                    "Enable passes.compile or run `heatsweep compile` first".to_string(),
                ])
        }
        SweepError::InvocationFailed { .. } => {
            EnhancedError::new("Benchmark Run Failed", message, ErrorType::Invocation)
                .with_suggestions([
                    "Inspect the program's stderr above",
                    "Results written before the failure are kept in the results directory",
                ])
        }
        SweepError::CompileFailed { .. } => {
            EnhancedError::new("Compilation Failed", message, ErrorType::Compilation)
                .with_suggestion("Check program.compile_command and the compiler output")
        }
        SweepError::Io { path, .. } => errors::file_access(&path.display().to_string(), &message),
        SweepError::Interrupted => errors::interrupted(),
    }
}

/// Constructors for frequently encountered errors
pub mod errors {
    use super::*;

    pub fn invalid_configuration(message: &str) -> EnhancedError {
        EnhancedError::new("Invalid Configuration", message, ErrorType::Configuration)
            .with_suggestions([
                "Check .heatsweep/config.toml and .heatsweep/settings.json",
                "Run `heatsweep config` to print the effective configuration",
            ])
    }

    pub fn file_access(path: &str, message: &str) -> EnhancedError {
        EnhancedError::new("File Access Failed", message, ErrorType::Filesystem)
            .with_suggestion(format!("Check that '{path}' is readable and writable"))
    }

    pub fn interrupted() -> EnhancedError {
        EnhancedError::new(
            "Interrupted",
            "Process interrupted by user.",
            ErrorType::Interrupted,
        )
    }
}
