//! User-facing console lines. The host test runner owns the process output,
//! so the reporter emits events through an injectable sink instead of
//! printing directly; the default sink mirrors the lines to stdout/stderr.

use std::fmt;
use std::sync::Arc;

/// A required configuration field that failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Host,
    Credentials,
    ProjectId,
    CoverageCaseId,
    SuiteId,
}

/// One console line the reporter wants shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    /// A required field was absent from the resolved configuration.
    Missing(MissingField),
    /// An existing run matched and its description and cases were updated.
    RunUpdated { name: String },
    /// No run matched; a new one was added.
    RunAdded { name: String },
    /// The service acknowledged the submitted results.
    ReportSent,
    /// The exchange with the service failed.
    SendFailed { error: String },
}

impl fmt::Display for ConsoleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleEvent::Missing(field) => {
                let what = match field {
                    MissingField::Host => "Hostname",
                    MissingField::Credentials => "Username or api key",
                    MissingField::ProjectId => "Project id",
                    MissingField::CoverageCaseId => "Coverage testcase id",
                    MissingField::SuiteId => "Suite id",
                };
                write!(f, "[TestRail] {} was not provided.", what)
            }
            ConsoleEvent::RunUpdated { name } => {
                write!(f, "[TestRail] Test run updated successfully: {}", name)
            }
            ConsoleEvent::RunAdded { name } => {
                write!(f, "[TestRail] Test run added successfully: {}", name)
            }
            ConsoleEvent::ReportSent => {
                write!(f, "[TestRail] Sending report to TestRail successfull")
            }
            ConsoleEvent::SendFailed { error } => {
                write!(f, "[TestRail] Sending report to TestRail failed: {}", error)
            }
        }
    }
}

/// Sink for console events. Called once per line, in emission order.
pub type ConsoleSink = Arc<dyn Fn(ConsoleEvent) + Send + Sync>;

/// Default sink: diagnostics and confirmations to stdout, failures to stderr.
pub fn standard_sink() -> ConsoleSink {
    Arc::new(|event| match event {
        ConsoleEvent::SendFailed { .. } => eprintln!("{}", event),
        _ => println!("{}", event),
    })
}

/// Events recorded by [`capture_sink`].
#[cfg(test)]
pub(crate) type CapturedEvents = Arc<std::sync::Mutex<Vec<ConsoleEvent>>>;

/// Sink that records events for later inspection.
#[cfg(test)]
pub(crate) fn capture_sink() -> (ConsoleSink, CapturedEvents) {
    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorded = Arc::clone(&events);
    let sink: ConsoleSink = Arc::new(move |event| {
        recorded.lock().unwrap().push(event);
    });
    (sink, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_match_the_console_contract() {
        let cases = [
            (ConsoleEvent::Missing(MissingField::Host), "[TestRail] Hostname was not provided."),
            (
                ConsoleEvent::Missing(MissingField::Credentials),
                "[TestRail] Username or api key was not provided.",
            ),
            (
                ConsoleEvent::Missing(MissingField::ProjectId),
                "[TestRail] Project id was not provided.",
            ),
            (
                ConsoleEvent::Missing(MissingField::CoverageCaseId),
                "[TestRail] Coverage testcase id was not provided.",
            ),
            (
                ConsoleEvent::Missing(MissingField::SuiteId),
                "[TestRail] Suite id was not provided.",
            ),
            (
                ConsoleEvent::RunUpdated { name: "main#7 - build".to_string() },
                "[TestRail] Test run updated successfully: main#7 - build",
            ),
            (
                ConsoleEvent::RunAdded { name: "main#7 - build".to_string() },
                "[TestRail] Test run added successfully: main#7 - build",
            ),
            (ConsoleEvent::ReportSent, "[TestRail] Sending report to TestRail successfull"),
            (
                ConsoleEvent::SendFailed { error: "boom".to_string() },
                "[TestRail] Sending report to TestRail failed: boom",
            ),
        ];
        for (event, line) in cases {
            assert_eq!(event.to_string(), line);
        }
    }

    #[test]
    fn capture_sink_records_in_order() {
        let (sink, events) = capture_sink();
        sink(ConsoleEvent::ReportSent);
        sink(ConsoleEvent::SendFailed { error: "x".to_string() });
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ConsoleEvent::ReportSent);
    }
}
