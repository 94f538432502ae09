// microlp Solver Adapter
// Implements the SolverService interface for good_lp's pure-Rust microlp backend
// No native libraries are needed, which makes it the default backend.
// microlp has no time limit of its own: the solve runs on a worker thread and
// is abandoned when the budget runs out.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use good_lp::{solvers::microlp::microlp, ResolutionError, Solution as _, SolverModel};
use tracing::{debug, warn};

use crate::domain::{
    models::{OptimizationProblem, Solution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolutionStatus,
};

use super::good_lp_model::translate;
use super::incumbent::accept_assignment;

/// What the worker thread reports back
enum Outcome {
    Values(Vec<f64>),
    Infeasible,
    Failed(String),
}

fn run(problem: &OptimizationProblem) -> Outcome {
    let model = translate(problem);
    let mut lp_model = model.vars.minimise(model.objective).using(microlp);
    for row in model.rows {
        lp_model = lp_model.with(row);
    }
    match lp_model.solve() {
        Ok(sol) => Outcome::Values(model.columns.iter().map(|&c| sol.value(c)).collect()),
        Err(ResolutionError::Infeasible) => Outcome::Infeasible,
        Err(e) => Outcome::Failed(format!("microlp: {e:?}")),
    }
}

pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicroLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for MicroLpSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let statistics = |problem: &OptimizationProblem| {
            SolverStatistics::for_problem(problem, start_time.elapsed().as_secs_f64() * 1000.0)
        };
        let timed_out = |problem: &OptimizationProblem| {
            Solution::new(
                SolutionStatus::Unknown,
                "time limit reached before microlp finished",
            )
            .with_statistics(statistics(problem))
        };

        let outcome = match problem.solver_config.time_limit {
            None => run(problem),
            Some(limit) if limit.is_zero() => return Ok(timed_out(problem)),
            Some(limit) => {
                let (tx, rx) = mpsc::channel();
                let owned = problem.clone();
                thread::Builder::new()
                    .name("microlp".into())
                    .spawn(move || {
                        // the receiver is gone once the budget ran out
                        let _ = tx.send(run(&owned));
                    })
                    .map_err(|e| SolverError::ExecutionFailed(format!("microlp worker: {e}")))?;

                match rx.recv_timeout(limit) {
                    Ok(outcome) => outcome,
                    Err(RecvTimeoutError::Timeout) => {
                        warn!(
                            limit_secs = limit.as_secs_f64(),
                            "microlp exceeded the time limit; solve abandoned"
                        );
                        return Ok(timed_out(problem));
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(SolverError::ExecutionFailed(
                            "microlp worker stopped without an answer".into(),
                        ))
                    }
                }
            }
        };
        debug!(elapsed_ms = start_time.elapsed().as_millis() as u64, "microlp returned");

        match outcome {
            Outcome::Values(raw) => Ok(accept_assignment(problem, &raw, SolutionStatus::Optimal)?
                .with_statistics(statistics(problem))),
            Outcome::Infeasible => Ok(Solution::new(
                SolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics(problem))),
            Outcome::Failed(message) => Err(SolverError::ExecutionFailed(message)),
        }
    }

    fn name(&self) -> &str {
        "microlp"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::LinearExpr;

    fn problem(time_limit: Option<Duration>) -> OptimizationProblem {
        let mut problem = OptimizationProblem::new("tiny");
        let x = problem.new_bool("x");
        let y = problem.new_bool("y");
        problem.add_ge(LinearExpr::sum([x, y]), 1, "cover");
        problem.set_objective(LinearExpr::from(x).with_term(y, 2));
        problem.solver_config.time_limit = time_limit;
        problem
    }

    #[test]
    fn solves_within_a_generous_budget() {
        let solution = MicroLpSolver::new()
            .solve(&problem(Some(Duration::from_secs(30))))
            .unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.variable_values, vec![1, 0]);
        assert_eq!(solution.objective_value, Some(1));
    }

    #[test]
    fn solves_without_a_budget() {
        let solution = MicroLpSolver::new().solve(&problem(None)).unwrap();
        assert_eq!(solution.objective_value, Some(1));
    }

    #[test]
    fn exhausted_budget_is_unknown() {
        let solution = MicroLpSolver::new()
            .solve(&problem(Some(Duration::ZERO)))
            .unwrap();
        assert_eq!(solution.status, SolutionStatus::Unknown);
        assert!(solution.variable_values.is_empty());
    }
}
