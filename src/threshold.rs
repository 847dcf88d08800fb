use crate::report::Severity;
use crate::types::Thresholds;

/// Availability of one group of hosts measured against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Availability {
    pub available: usize,
    pub total: usize,
    pub severity: Severity,
}

impl Availability {
    /// `None` for an empty group.
    pub fn rate(&self) -> Option<f64> {
        availability_rate(self.available, self.total)
    }

    pub fn is_violation(&self) -> bool {
        self.severity > Severity::Ok
    }

    pub fn summary(&self) -> String {
        if self.total == 0 {
            "no hosts in scope".to_string()
        } else {
            format!("{} of {} hosts available", self.available, self.total)
        }
    }
}

pub fn availability_rate(available: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(available as f64 / total as f64)
}

/// Critical below `critical`, warning below `warning`, ok otherwise. An empty
/// group is ok.
pub fn severity_for_rate(rate: f64, thresholds: &Thresholds) -> Severity {
    if rate < thresholds.critical {
        Severity::Critical
    } else if rate < thresholds.warning {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

pub fn evaluate_availability(available: usize, total: usize, thresholds: &Thresholds) -> Availability {
    let severity = availability_rate(available, total)
        .map(|rate| severity_for_rate(rate, thresholds))
        .unwrap_or(Severity::Ok);
    Availability {
        available,
        total,
        severity,
    }
}
