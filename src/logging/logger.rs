//! Thin structured logger used by the command handlers.
use std::time::Instant;

use super::STAGE_TARGET;

/// Leveled logger over [`tracing`].
///
/// Every method emits one event; the subscriber installed by
/// [`init_subscriber`](super::init_subscriber) decides what reaches the
/// console.
#[derive(Debug)]
pub struct Logger {
    command: String,
    start: Instant,
}

impl Logger {
    /// Create a logger for one command invocation.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            start: Instant::now(),
        }
    }

    /// Name of the command this logger belongs to.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!(command = %self.command, "{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!(command = %self.command, "{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, command = %self.command, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!(command = %self.command, "{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!(command = %self.command, "{msg}");
    }

    /// Log how long the command took, at debug level.
    pub fn finish(&self) {
        let elapsed = self.start.elapsed();
        tracing::debug!("{} finished in {:.2?}", self.command, elapsed);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::capture;

    #[test]
    fn logger_new() {
        let log = Logger::new("generate");
        assert_eq!(log.command(), "generate");
    }

    #[test]
    fn methods_reach_subscriber() {
        let out = capture(|| {
            let log = Logger::new("generate");
            log.stage("Questions");
            log.info("plain");
            log.warn("odd");
            log.error("bad");
            log.debug("noise");
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, ["==> Questions", "  plain", "WARN  odd", "ERROR bad", "  noise"]);
    }

    #[test]
    fn finish_reports_command() {
        let out = capture(|| Logger::new("matrix").finish());
        assert!(out.starts_with("  matrix finished in "), "{out}");
    }
}
