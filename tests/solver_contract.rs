// Planner behaviour against canned solver responses
mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use shiftopt::config::PlannerConfig;
use shiftopt::domain::{ReferenceKind, Solution, SolutionStatus, SolverError, SolverService};
use shiftopt::{OptimizationProblem, Planner, ScheduleError, SchedulingRequest};

use common::{cover, day_and_night, employees, request};

/// Returns one canned response and remembers the time limit it was given.
type Respond = fn(&OptimizationProblem) -> Result<Solution, SolverError>;

struct CannedSolver {
    respond: Respond,
    seen_limit: Mutex<Option<Duration>>,
}

impl CannedSolver {
    fn planner(respond: Respond) -> (Planner, Arc<Self>) {
        let solver = Arc::new(Self {
            respond,
            seen_limit: Mutex::new(None),
        });
        let planner = Planner::new(solver.clone(), PlannerConfig::default());
        (planner, solver)
    }
}

impl SolverService for CannedSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution, SolverError> {
        *self.seen_limit.lock().unwrap() = problem.solver_config.time_limit;
        (self.respond)(problem)
    }

    fn name(&self) -> &str {
        "canned"
    }
}

fn week() -> SchedulingRequest {
    request(
        employees(&["ann", "bo"]),
        day_and_night(),
        cover(7, |_| vec![0, 1, 0]),
        7,
        json!({"time_budget_secs": 5.0}),
    )
}

#[test]
fn infeasible_status_is_reported_as_infeasible() {
    let (planner, _) =
        CannedSolver::planner(|_| Ok(Solution::new(SolutionStatus::Infeasible, "no")));
    assert!(matches!(planner.solve(&week()), Err(ScheduleError::Infeasible)));
}

#[test]
fn unknown_status_is_a_timeout_with_the_request_budget() {
    let (planner, solver) =
        CannedSolver::planner(|_| Ok(Solution::new(SolutionStatus::Unknown, "out of time")));
    match planner.solve(&week()) {
        Err(ScheduleError::Timeout { budget_secs }) => assert_eq!(budget_secs, 5.0),
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert_eq!(*solver.seen_limit.lock().unwrap(), Some(Duration::from_secs(5)));
}

#[test]
fn short_assignment_is_corrupt() {
    let (planner, _) = CannedSolver::planner(|_| {
        Ok(Solution::with_assignment(SolutionStatus::Optimal, 0, vec![0; 3]))
    });
    assert!(matches!(planner.solve(&week()), Err(ScheduleError::CorruptSolution(_))));
}

#[test]
fn assignment_breaking_hard_rules_is_corrupt() {
    // right length, every variable at its lower bound: nobody works
    let (planner, _) = CannedSolver::planner(|problem| {
        let values = problem.variables.iter().map(|v| v.lower_bound).collect();
        Ok(Solution::with_assignment(SolutionStatus::Feasible, 0, values))
    });
    assert!(matches!(planner.solve(&week()), Err(ScheduleError::CorruptSolution(_))));
}

#[test]
fn backend_failure_is_passed_through() {
    let (planner, _) =
        CannedSolver::planner(|_| Err(SolverError::ExecutionFailed("segfault".into())));
    assert!(matches!(
        planner.solve(&week()),
        Err(ScheduleError::Solver(SolverError::ExecutionFailed(_)))
    ));
}

#[test]
fn invalid_reference_is_rejected_before_solving() {
    let (planner, solver) = CannedSolver::planner(|_| panic!("solver must not run"));
    let request = request(
        employees(&["ann"]),
        day_and_night(),
        cover(7, |_| vec![0, 1, 0]),
        7,
        json!({"fixed_assignments": [{"employee": 3, "shift": 1, "day": 2}]}),
    );
    match planner.solve(&request) {
        Err(ScheduleError::InvalidReference { kind, index, bound, .. }) => {
            assert_eq!(kind, ReferenceKind::Employee);
            assert_eq!(index, 3);
            assert_eq!(bound, 1);
        }
        other => panic!("expected an invalid reference, got {other:?}"),
    }
    assert!(solver.seen_limit.lock().unwrap().is_none());
}

#[test]
fn request_forcing_work_after_a_night_conflicts() {
    let (planner, _) = CannedSolver::planner(|_| panic!("solver must not run"));
    let request = request(
        employees(&["ann"]),
        day_and_night(),
        cover(7, |_| vec![0, 1, 0]),
        7,
        json!({
            "fixed_assignments": [{"employee": 0, "shift": 1, "day": 3}],
            "requests": [{"employee": 0, "shift": 2, "day": 2, "weight": 0}]
        }),
    );
    assert!(matches!(
        planner.solve(&request),
        Err(ScheduleError::ConflictingFixedAssignment { employee: 0, day: 3, .. })
    ));
}

#[test]
fn horizon_must_start_on_a_monday() {
    let (planner, _) = CannedSolver::planner(|_| panic!("solver must not run"));
    let mut request = week();
    request.start_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    assert!(matches!(planner.solve(&request), Err(ScheduleError::InvalidRequest(_))));
}

#[cfg(feature = "microlp")]
#[test]
fn microlp_stops_at_an_exhausted_budget() {
    use shiftopt::solver::MicroLpSolver;

    let solver = Arc::new(MicroLpSolver::new());
    let planner = Planner::new(solver.clone(), PlannerConfig::default());
    let mut model = planner.assemble(&week()).unwrap();
    model.problem.solver_config.time_limit = Some(Duration::ZERO);

    let solution = solver.solve(&model.problem).unwrap();
    assert_eq!(solution.status, SolutionStatus::Unknown);
    assert!(solution.variable_values.is_empty());
}
