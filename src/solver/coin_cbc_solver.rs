// COIN-OR CBC Solver Adapter
// Implements the SolverService interface for CBC through good_lp
// Time budget and worker count are passed as CBC parameters.

use std::time::Instant;

use good_lp::{solvers::coin_cbc::coin_cbc, ResolutionError, Solution as _, SolverModel};
use tracing::debug;

use crate::domain::{
    models::{OptimizationProblem, Solution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolutionStatus,
};

use super::good_lp_model::translate;
use super::incumbent::accept_assignment;

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let config = &problem.solver_config;

        let model = translate(problem);
        let mut lp_model = model.vars.minimise(model.objective).using(coin_cbc);
        for row in model.rows {
            lp_model = lp_model.with(row);
        }
        if let Some(limit) = config.time_limit {
            lp_model.set_parameter("sec", &limit.as_secs_f64().to_string());
        }
        lp_model.set_parameter("threads", &config.workers.to_string());
        lp_model.set_parameter("logLevel", if config.verbose { "1" } else { "0" });

        let result = lp_model.solve();
        let elapsed = start_time.elapsed();
        let statistics = SolverStatistics::for_problem(problem, elapsed.as_secs_f64() * 1000.0);
        let out_of_time = config.time_limit.is_some_and(|limit| elapsed >= limit);
        debug!(elapsed_ms = elapsed.as_millis() as u64, out_of_time, "CBC returned");

        match result {
            Ok(sol) => {
                let raw: Vec<f64> = model.columns.iter().map(|&c| sol.value(c)).collect();
                let claimed = if out_of_time {
                    SolutionStatus::Feasible
                } else {
                    SolutionStatus::Optimal
                };
                Ok(accept_assignment(problem, &raw, claimed)?.with_statistics(statistics))
            }
            Err(ResolutionError::Infeasible) => Ok(Solution::new(
                SolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            Err(e) if out_of_time => Ok(Solution::new(
                SolutionStatus::Unknown,
                format!("time limit reached: {e:?}"),
            )
            .with_statistics(statistics)),
            Err(e) => Err(SolverError::ExecutionFailed(format!("CBC: {e:?}"))),
        }
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }
}
