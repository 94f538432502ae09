// Acceptance of backend answers
// Raw column values are rounded and re-checked against the model before anything trusts them.

use tracing::warn;

use crate::domain::{
    solver_service::Result, OptimizationProblem, Solution, SolutionStatus, SolverError,
};

/// Rounds raw backend values and checks them against the model.
///
/// A proven-optimal answer that breaks a row is a backend fault. A
/// time-limited incumbent that breaks a row is simply no answer, reported
/// as `UNKNOWN`.
pub(crate) fn accept_assignment(
    problem: &OptimizationProblem,
    raw: &[f64],
    claimed: SolutionStatus,
) -> Result<Solution> {
    let values: Vec<i64> = raw.iter().map(|v| v.round() as i64).collect();
    if problem.is_feasible(&values) {
        let objective = problem.objective_value(&values);
        return Ok(Solution::with_assignment(claimed, objective, values));
    }

    let violated = problem.violated_constraints(&values).len();
    if claimed == SolutionStatus::Optimal {
        return Err(SolverError::ExecutionFailed(format!(
            "optimal assignment breaks {violated} rows of '{}'",
            problem.name
        )));
    }
    warn!(violated, values = values.len(), "incumbent rejected");
    Ok(Solution::new(
        SolutionStatus::Unknown,
        "time limit reached without a usable assignment",
    ))
}
