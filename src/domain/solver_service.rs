// Domain service interface for solving integer models
// Defines the contract that any solver implementation must follow

use super::models::{OptimizationProblem, Solution};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for combinatorial solvers
///
/// The scheduling core only ever talks to this trait, so model-correctness
/// tests can run against a stub returning canned assignments.
pub trait SolverService: Send + Sync {
    /// Solve the problem under `problem.solver_config` (time budget, workers).
    ///
    /// `Ok` carries every terminal status, including `INFEASIBLE` and
    /// `UNKNOWN`; `Err` is reserved for failures of the backend itself.
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &OptimizationProblem) -> Result<()> {
        let mut errors = Vec::new();
        let num_vars = problem.num_variables();

        for (i, var) in problem.variables.iter().enumerate() {
            if var.lower_bound > var.upper_bound {
                errors.push(format!(
                    "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                    i, var.name, var.lower_bound, var.upper_bound
                ));
            }
        }

        for (i, constraint) in problem.constraints.iter().enumerate() {
            if let Some(&(v, _)) = constraint
                .expr
                .terms()
                .iter()
                .find(|(v, _)| v.index() >= num_vars)
            {
                errors.push(format!(
                    "Constraint {} '{}' references variable {} but problem has {} variables",
                    i,
                    constraint.name,
                    v.index(),
                    num_vars
                ));
            }
        }

        if let Some(&(v, _)) = problem
            .objective
            .expr
            .terms()
            .iter()
            .find(|(v, _)| v.index() >= num_vars)
        {
            errors.push(format!(
                "Objective references variable {} but problem has {} variables",
                v.index(),
                num_vars
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;
}
