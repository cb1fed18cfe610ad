//! Optional diagnostics sink for movement events.

/// Receives tagged diagnostic lines from the movement core. The core never
/// depends on a sink being present; the null sink is the default.
pub trait DiagnosticsSink {
    fn emit(&mut self, tag: &str, message: &str);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullDiagnostics;

impl DiagnosticsSink for NullDiagnostics {
    fn emit(&mut self, _tag: &str, _message: &str) {}
}

/// Prints tagged lines to stderr
#[derive(Debug, Default)]
pub struct StderrDiagnostics;

impl DiagnosticsSink for StderrDiagnostics {
    fn emit(&mut self, tag: &str, message: &str) {
        eprintln!("[{}] {}", tag, message);
    }
}
