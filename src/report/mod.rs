use std::fmt;

use crate::types::CheckKind;

/// NRPE severity. Ordering follows escalation, so `max` is the worse verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn code(&self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one check: severity, alarm message and one status line per
/// examined resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    pub severity: Severity,
    pub message: String,
    pub details: Vec<String>,
}

impl Verdict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Unknown,
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Raises the severity to at least `severity`; never lowers it.
    pub fn escalate(&mut self, severity: Severity) {
        self.severity = self.severity.max(severity);
    }

    /// Escalates and appends `fragment` to the alarm message.
    pub fn raise(&mut self, severity: Severity, fragment: &str) {
        self.escalate(severity);
        self.message.push_str(fragment);
    }

    pub fn note(&mut self, detail: String) {
        self.details.push(detail);
    }

    pub fn alarm(&self) -> &str {
        self.message.trim()
    }

    pub fn exit_code(&self) -> i32 {
        self.severity.code()
    }
}

/// Verdicts of several checks run together, folded into one.
#[derive(Debug, Default)]
pub struct HealthReport {
    pub checks: Vec<(CheckKind, Verdict)>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: CheckKind, verdict: Verdict) {
        self.checks.push((kind, verdict));
    }

    pub fn has_issues(&self) -> bool {
        self.checks.iter().any(|(_, v)| v.severity > Severity::Ok)
    }

    /// Worst severity wins; alarms of failing checks are joined with their check name.
    pub fn verdict(&self) -> Verdict {
        let mut combined = Verdict::new();
        for (kind, verdict) in &self.checks {
            combined.escalate(verdict.severity);
            if verdict.severity > Severity::Ok && !verdict.alarm().is_empty() {
                combined.message.push_str(&format!("{}: {} ", kind, verdict.alarm()));
            }
            combined.details.extend(verdict.details.iter().cloned());
        }
        combined
    }

    pub fn summary(&self) -> ReportSummary {
        let count = |s: Severity| self.checks.iter().filter(|(_, v)| v.severity == s).count();
        ReportSummary {
            ok_count: count(Severity::Ok),
            warning_count: count(Severity::Warning),
            critical_count: count(Severity::Critical),
            unknown_count: count(Severity::Unknown),
        }
    }
}

pub struct ReportSummary {
    pub ok_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    pub unknown_count: usize,
}

impl ReportSummary {
    pub fn total_issues(&self) -> usize {
        self.warning_count + self.critical_count + self.unknown_count
    }

    pub fn has_issues(&self) -> bool {
        self.total_issues() > 0
    }
}
