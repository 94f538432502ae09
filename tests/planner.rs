// Scheduling scenarios solved with the default backend
#![cfg(feature = "microlp")]

mod common;

use std::sync::Arc;

use serde_json::json;
use shiftopt::application::verify_schedule;
use shiftopt::config::PlannerConfig;
use shiftopt::domain::{SolverBackend, OFF_SHIFT};
use shiftopt::solver::MicroLpSolver;
use shiftopt::{Planner, ScheduleError, SchedulingRequest};

use common::{cover, day_and_night, days_on, employees, request, DAY, NIGHT};

fn planner(config: PlannerConfig) -> Planner {
    Planner::new(Arc::new(MicroLpSolver::new()), config)
}

/// Two employees, one day shift every day and a single night on Monday.
fn small_week(extra: serde_json::Value) -> SchedulingRequest {
    request(
        employees(&["ann", "bo"]),
        day_and_night(),
        cover(7, |d| vec![0, 1, u32::from(d == 0)]),
        7,
        extra,
    )
}

#[test]
fn covers_demand_exactly_without_the_dummy() {
    let request = small_week(json!({}));
    let planner = planner(PlannerConfig::default());
    let schedule = planner.solve(&request).unwrap();

    assert_eq!(schedule.dummy_shift_count(), 0);
    for d in 0..7 {
        assert_eq!(schedule.headcount(DAY, d), 1, "day shift on day {d}");
        assert_eq!(schedule.headcount(NIGHT, d), usize::from(d == 0), "night shift on day {d}");
    }
    assert_eq!(schedule.objective_value, schedule.penalties.total);
    assert!(verify_schedule(&request, planner.config(), &schedule).is_empty());
}

#[test]
fn day_and_night_every_day_leaves_five_nights_to_the_dummy() {
    let request = request(
        employees(&["ann", "bo"]),
        day_and_night(),
        cover(7, |_| vec![0, 1, 1]),
        7,
        json!({}),
    );
    let planner = planner(PlannerConfig::default());
    let schedule = planner.solve(&request).unwrap();

    // one night per employee per week, the rest falls to the dummy
    assert_eq!(schedule.dummy_shift_count(), 5);
    for d in 0..7 {
        assert_eq!(schedule.headcount(DAY, d), 1, "day shift on day {d}");
        assert_eq!(schedule.headcount(NIGHT, d), 1, "night shift on day {d}");
    }
    for e in 0..2 {
        let nights = days_on(&schedule, e, NIGHT);
        assert_eq!(nights.len(), 1, "nights of employee {e}");
        if let Some(&d) = nights.first().filter(|&&d| d + 1 < 7) {
            assert_eq!(schedule.employees[e].shifts[d + 1], vec![OFF_SHIFT]);
        }
    }
    assert!(verify_schedule(&request, planner.config(), &schedule).is_empty());
}

#[test]
fn one_night_a_day_is_shared_evenly() {
    let shift_types = json!([
        {"name": "off"},
        {"name": "night", "window": {"start": "22:00", "end": "06:00"}, "duration_hours": 8.0, "night": true}
    ]);
    let request = request(
        employees(&["ann", "bo", "cy"]),
        shift_types,
        cover(14, |_| vec![0, 1]),
        14,
        json!({}),
    );
    let planner = planner(PlannerConfig::default());
    let schedule = planner.solve(&request).unwrap();

    let counts: Vec<usize> = (0..3).map(|e| days_on(&schedule, e, 1).len()).collect();
    assert_eq!(counts, vec![2, 2, 2]);
    assert_eq!(schedule.dummy_shift_count(), 8);
    assert!(schedule.penalties.excess("night_spread").is_none());
    assert!(verify_schedule(&request, planner.config(), &schedule).is_empty());
}

#[test]
fn night_is_followed_by_rest() {
    let request = small_week(json!({}));
    let schedule = planner(PlannerConfig::default()).solve(&request).unwrap();

    let sleeper = (0..2)
        .find(|&e| schedule.employees[e].works(NIGHT, 0))
        .unwrap();
    assert_eq!(schedule.employees[sleeper].shifts[1], vec![OFF_SHIFT]);
}

#[test]
fn fixed_assignments_are_honoured() {
    let request = small_week(json!({
        "fixed_assignments": [
            {"employee": 1, "shift": 2, "day": 0},
            {"employee": 1, "shift": 1, "day": 3}
        ]
    }));
    let schedule = planner(PlannerConfig::default()).solve(&request).unwrap();

    assert!(schedule.employees[1].works(NIGHT, 0));
    assert!(schedule.employees[1].works(DAY, 3));
    assert!(schedule.employees[0].works(DAY, 1));
}

#[test]
fn history_pins_the_carry_over_day_and_its_rest() {
    let request = small_week(json!({
        "offset": 1,
        "history": [{"employee": 0, "shift": 2, "day": 0}]
    }));
    let schedule = planner(PlannerConfig::default()).solve(&request).unwrap();

    assert_eq!(schedule.employees[0].shifts[0], vec![NIGHT]);
    assert_eq!(schedule.employees[1].shifts[0], vec![OFF_SHIFT]);
    assert!(!schedule.days[0].live);
    // demand of the carry-over day is not enforced
    assert_eq!(schedule.headcount(DAY, 0), 0);
    assert_eq!(schedule.employees[0].shifts[1], vec![OFF_SHIFT]);
    assert!(schedule.employees[1].works(DAY, 1));
}

#[test]
fn hard_transition_that_contradicts_coverage_is_infeasible() {
    // Monday day shift must be followed by a Tuesday night nobody asked for
    let request = small_week(json!({
        "fixed_assignments": [{"employee": 0, "shift": 1, "day": 0}],
        "day_transitions": [
            {"first_shift": 1, "first_weekday": 0, "second_shift": 2, "second_weekday": 1, "cost": 0}
        ]
    }));
    let err = planner(PlannerConfig::default()).solve(&request).unwrap_err();
    assert!(matches!(err, ScheduleError::Infeasible), "{err}");
}

#[test]
fn night_spread_penalty_is_the_real_spread() {
    let shift_types = json!([
        {"name": "off"},
        {"name": "night", "window": {"start": "22:00", "end": "06:00"}, "duration_hours": 8.0, "night": true}
    ]);
    let nights = [0, 3, 7, 10];
    let request = request(
        employees(&["ann", "bo", "cy"]),
        shift_types,
        cover(14, |d| vec![0, u32::from(nights.contains(&d))]),
        14,
        json!({}),
    );
    let mut config = PlannerConfig::default();
    config.weights.weekend_window = 0;
    config.weights.consecutive_weekends = 0;
    config.weights.weekend_spread = 0;

    let schedule = planner(config).solve(&request).unwrap();
    assert_eq!(schedule.dummy_shift_count(), 0);

    let counts: Vec<usize> = (0..3).map(|e| days_on(&schedule, e, 1).len()).collect();
    let spread = counts.iter().max().unwrap() - counts.iter().min().unwrap();
    assert_eq!(counts.iter().sum::<usize>(), 4);
    assert_eq!(spread, 1);

    let penalised = schedule
        .penalties
        .excess("night_spread")
        .map_or(0, |p| p.value);
    assert_eq!(penalised, spread as i64);
}

#[test]
fn uncoverable_demand_falls_to_the_dummy() {
    // one employee cannot work two nights in a row
    let request = request(
        employees(&["ann"]),
        day_and_night(),
        cover(7, |d| vec![0, 0, u32::from(d < 2)]),
        7,
        json!({}),
    );
    let schedule = planner(PlannerConfig::default()).solve(&request).unwrap();

    assert_eq!(schedule.dummy_shift_count(), 1);
    assert_eq!(days_on(&schedule, 0, NIGHT).len(), 1);
    let dummy = schedule.dummy().unwrap();
    assert_eq!(dummy.name, "dummy");
    assert!(schedule.penalties.excess("dummy_shifts").is_some());
}

#[test]
fn configured_backend_is_used() {
    let mut config = PlannerConfig::default();
    config.solver.backend = SolverBackend::Microlp;
    let planner = Planner::from_config(config).unwrap();
    assert_eq!(planner.solver_name(), "microlp");
}
