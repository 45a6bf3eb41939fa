//! Error values that flow on a signal's failure channel.
//!
//! Failures are never thrown: every asynchronous step returns
//! `Result<T, Failure>`, and combinators merge failures instead of
//! short-circuiting on the first one.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Which part of the build a record originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Template,
    Script,
    Style,
    Watch,
    Write,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Script => "script",
            Self::Style => "style",
            Self::Watch => "watch",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A single diagnostic message tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}[{stage}]: {message}", severity.label())]
pub struct ErrorRecord {
    pub stage: Stage,
    pub severity: Severity,
    pub message: String,
}

impl ErrorRecord {
    pub fn error(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

/// Aggregated failure of one asynchronous step.
///
/// Cheap to clone: shared signals hand the same failure to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    records: Arc<[ErrorRecord]>,
}

impl Failure {
    /// Failure with a single error record.
    pub fn error(stage: Stage, message: impl Into<String>) -> Self {
        Self::from_records(vec![ErrorRecord::error(stage, message)])
    }

    /// Failure reported by a step whose cancellation token went stale.
    pub fn superseded(stage: Stage) -> Self {
        Self::error(stage, "superseded by a newer build")
    }

    pub fn from_records(records: Vec<ErrorRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Merge several failures into one, keeping every record in order.
    pub fn merge(failures: impl IntoIterator<Item = Failure>) -> Self {
        let records: Vec<_> = failures
            .into_iter()
            .flat_map(|failure| failure.records.iter().cloned().collect::<Vec<_>>())
            .collect();
        Self::from_records(records)
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn has_stage(&self, stage: Stage) -> bool {
        self.records.iter().any(|r| r.stage == stage)
    }

    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_error()).count()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{record}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Failure {}
