//! Per-invocation log returned to the caller alongside the result.
//!
//! Every line is also emitted as a `tracing` event, so the journal never
//! replaces the process log.

use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct Journal {
    debug: bool,
    lines: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl Journal {
    /// `debug` controls whether debug lines are recorded; they are always
    /// emitted to tracing.
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            ..Self::default()
        }
    }

    pub fn info(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{line}");
        self.lines.lock().push(line);
    }

    /// Record a soft warning. The flow carries on.
    pub fn warn(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!("{line}");
        self.lines.lock().push(format!("WARNING: {line}"));
        self.warnings.lock().push(line);
    }

    pub fn error(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::error!("{line}");
        self.lines.lock().push(format!("ERROR: {line}"));
    }

    pub fn debug(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!("{line}");
        if self.debug {
            self.lines.lock().push(line);
        }
    }

    /// Consume the journal into `(lines, warnings)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.lines.into_inner(), self.warnings.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_lines_only_when_enabled() {
        let quiet = Journal::new(false);
        quiet.debug("payload");
        quiet.info("deploying");
        assert_eq!(quiet.into_parts().0, vec!["deploying"]);

        let verbose = Journal::new(true);
        verbose.debug("payload");
        verbose.info("deploying");
        assert_eq!(verbose.into_parts().0, vec!["payload", "deploying"]);
    }

    #[test]
    fn test_warnings_are_collected_separately() {
        let journal = Journal::new(false);
        journal.info("start");
        journal.warn("no project");
        journal.error("boom");

        let (lines, warnings) = journal.into_parts();
        assert_eq!(
            lines,
            vec!["start", "WARNING: no project", "ERROR: boom"]
        );
        assert_eq!(warnings, vec!["no project"]);
    }
}
