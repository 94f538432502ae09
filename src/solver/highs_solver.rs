// HiGHS Solver Adapter
// Implements the SolverService interface for HiGHS
// This is an adapter pattern - translates our domain models to HiGHS API

use std::time::Instant;

use highs::{HighsModelStatus, RowProblem, Sense};
use tracing::debug;

use crate::domain::{
    models::{OptimizationProblem, Solution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintType, SolutionStatus},
};

use super::incumbent::accept_assignment;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let config = &problem.solver_config;

        // Use HiGHS RowProblem (add variables first, then constraints)
        let mut pb = RowProblem::default();
        let costs = problem.objective.coefficients(problem.num_variables());
        let cols: Vec<_> = problem
            .variables
            .iter()
            .zip(&costs)
            .map(|(v, &cost)| {
                pb.add_integer_column(cost, v.lower_bound as f64..=v.upper_bound as f64)
            })
            .collect();

        for constraint in &problem.constraints {
            let terms: Vec<_> = constraint
                .expr
                .terms()
                .iter()
                .map(|&(v, c)| (cols[v.index()], c as f64))
                .collect();
            let bound = constraint.bound as f64;
            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => pb.add_row(..=bound, &terms),
                ConstraintType::Equal => pb.add_row(bound..=bound, &terms),
                ConstraintType::GreaterThanOrEqual => pb.add_row(bound.., &terms),
            }
        }

        let mut model = pb.optimise(Sense::Minimise);
        if !config.verbose {
            model.make_quiet();
        }
        if let Some(limit) = config.time_limit {
            model.set_option("time_limit", limit.as_secs_f64());
        }
        model.set_option("threads", config.workers as i32);

        let solved = model.solve();
        let statistics =
            SolverStatistics::for_problem(problem, start_time.elapsed().as_secs_f64() * 1000.0);
        let status = solved.status();
        debug!(?status, "HiGHS returned");

        match status {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => {
                let raw = solved.get_solution().columns().to_vec();
                Ok(accept_assignment(problem, &raw, SolutionStatus::Optimal)?
                    .with_statistics(statistics))
            }
            HighsModelStatus::ReachedTimeLimit => {
                let raw = solved.get_solution().columns().to_vec();
                Ok(accept_assignment(problem, &raw, SolutionStatus::Feasible)?
                    .with_statistics(statistics))
            }
            HighsModelStatus::Infeasible => Ok(Solution::new(
                SolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
