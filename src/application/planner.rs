// Planner: the scheduling use case
// Assemble -> solve -> decode -> verify, mapping solver statuses onto scheduling errors.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::config::PlannerConfig;
use crate::domain::{
    Schedule, ScheduleError, ScheduleResult, SchedulingRequest, SolutionStatus, SolverService,
};
use crate::solver::SolverFactory;

use super::decoder::decode;
use super::model::{assemble, AssembledModel};
use super::verify::verify_schedule;

/// Solves scheduling requests with one solver backend and one configuration.
///
/// Holds no per-request state; a shared `Planner` can serve concurrent
/// requests, each of which builds its own model.
pub struct Planner {
    solver: Arc<dyn SolverService>,
    config: PlannerConfig,
}

impl Planner {
    pub fn new(solver: Arc<dyn SolverService>, config: PlannerConfig) -> Self {
        Self { solver, config }
    }

    /// Picks the solver backend named in `config`.
    pub fn from_config(config: PlannerConfig) -> ScheduleResult<Self> {
        let solver = SolverFactory::create_from_backend(config.solver.backend)?;
        Ok(Self::new(solver, config))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Builds the model for `request` without solving it.
    pub fn assemble(&self, request: &SchedulingRequest) -> ScheduleResult<AssembledModel> {
        let mut model = assemble(request, &self.config)?;
        model.problem.solver_config = self.config.solver_config(request.time_budget_secs);
        Ok(model)
    }

    pub fn solve(&self, request: &SchedulingRequest) -> ScheduleResult<Schedule> {
        let _span = info_span!("schedule", request = %request.name).entered();

        let model = self.assemble(request)?;
        let budget_secs = model
            .problem
            .solver_config
            .time_limit
            .map_or(0.0, |t| t.as_secs_f64());

        info!(solver = self.solver.name(), budget_secs, "solving");
        let started = Instant::now();
        let solution = self.solver.solve(&model.problem)?;
        info!(
            status = %solution.status,
            objective = ?solution.objective_value,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solver finished"
        );

        match solution.status {
            SolutionStatus::Infeasible => Err(ScheduleError::Infeasible),
            SolutionStatus::Unknown => Err(ScheduleError::Timeout { budget_secs }),
            SolutionStatus::Optimal | SolutionStatus::Feasible => {
                let schedule = decode(request, &model, &solution)?;
                let violations = verify_schedule(request, &self.config, &schedule);
                if let Some(first) = violations.first() {
                    warn!(
                        count = violations.len(),
                        first = %first,
                        "decoded schedule breaks hard rules"
                    );
                    return Err(ScheduleError::CorruptSolution(format!(
                        "{} hard-rule violations, first: {first}",
                        violations.len()
                    )));
                }
                info!(
                    objective = schedule.objective_value,
                    dummy_shifts = schedule.dummy_shift_count(),
                    "schedule decoded"
                );
                Ok(schedule)
            }
        }
    }
}
