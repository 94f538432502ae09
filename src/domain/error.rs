// Errors surfaced by the scheduling core

use std::fmt;

use super::solver_service::SolverError;

/// Which index space an invalid reference points into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Employee,
    Shift,
    Day,
    Weekday,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Employee => write!(f, "employee"),
            ReferenceKind::Shift => write!(f, "shift"),
            ReferenceKind::Day => write!(f, "day"),
            ReferenceKind::Weekday => write!(f, "weekday"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("{context}: {kind} index {index} out of range 0..{bound}")]
    InvalidReference {
        kind: ReferenceKind,
        index: usize,
        bound: usize,
        context: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed request: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Conflicting forced assignments for employee {employee} on day {day}: {reason}")]
    ConflictingFixedAssignment {
        employee: usize,
        day: usize,
        reason: String,
    },

    #[error("No schedule satisfies the hard rules (INFEASIBLE)")]
    Infeasible,

    #[error("Time budget of {budget_secs}s exhausted without a schedule (UNKNOWN)")]
    Timeout { budget_secs: f64 },

    #[error("Corrupt solver response: {0}")]
    CorruptSolution(String),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl ScheduleError {
    pub(crate) fn reference(
        kind: ReferenceKind,
        index: usize,
        bound: usize,
        context: impl Into<String>,
    ) -> Self {
        ScheduleError::InvalidReference {
            kind,
            index,
            bound,
            context: context.into(),
        }
    }
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;
