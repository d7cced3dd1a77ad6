use crate::integration::DispatchOutcome;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub level: Level,
    pub text: String,
}

impl ReportLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

/// Turns pipeline results into operator-facing lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeReporter {
    verbose: bool,
}

impl OutcomeReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Headline, then the log block when verbose.
    pub fn outcome(&self, outcome: &DispatchOutcome) -> Vec<ReportLine> {
        let mut lines = vec![if outcome.accepted {
            ReportLine::info("Contact accepted.")
        } else {
            ReportLine::error("Contact rejected.")
        }];
        if self.verbose && !outcome.logs.is_empty() {
            lines.push(ReportLine::info(outcome.logs.to_yaml()));
        }
        lines
    }

    /// A reason the pipeline stopped before invoking the integration.
    pub fn abort(&self, reason: impl Into<String>) -> Vec<ReportLine> {
        vec![ReportLine::error(reason)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::DispatchLogs;

    fn logs() -> DispatchLogs {
        let mut logs = DispatchLogs::new();
        logs.push("deliver", "queued");
        logs
    }

    #[test]
    fn accepted_headline_only_when_quiet() {
        let lines = OutcomeReporter::new(false).outcome(&DispatchOutcome::accepted(logs()));
        assert_eq!(lines, vec![ReportLine::info("Contact accepted.")]);
    }

    #[test]
    fn rejected_is_error_level() {
        let lines = OutcomeReporter::new(false).outcome(&DispatchOutcome::rejected(logs()));
        assert_eq!(lines, vec![ReportLine::error("Contact rejected.")]);
    }

    #[test]
    fn verbose_appends_log_block() {
        let lines = OutcomeReporter::new(true).outcome(&DispatchOutcome::rejected(logs()));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].level, Level::Info);
        assert!(lines[1].text.contains("step: deliver"));
    }

    #[test]
    fn abort_is_single_error_line() {
        let lines = OutcomeReporter::new(true).abort("Client is required.");
        assert_eq!(lines, vec![ReportLine::error("Client is required.")]);
    }
}
