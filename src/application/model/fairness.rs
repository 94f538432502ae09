//! Fairness: spreads of per-employee counts and the weekend rules.
//!
//! A spread is `max − min` over per-employee integer aggregates, both
//! linked exactly, so the penalised value is always the real difference.

use crate::config::PlannerConfig;
use crate::domain::{
    LinearExpr, OptimizationProblem, SchedulingRequest, SoftBounds, VarId, FRIDAY, SATURDAY, SUNDAY,
};

use super::primitives::{add_soft_sequence_constraint, add_soft_sum_constraint};
use super::ModelBuilder;

pub fn add_fairness_rules(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    config: &PlannerConfig,
) {
    let weights = &config.weights;
    let employees: Vec<usize> = (0..request.num_employees()).collect();

    let nights = request.night_shifts();
    if weights.night_spread > 0 && !nights.is_empty() {
        let counts = count_per_employee(builder, request, &employees, &nights, "nights");
        penalize_spread(builder, &counts, weights.night_spread, "night_spread");
    }

    let equal_shifts = request.equal_function_shifts();
    let mut equal_counts: Option<Vec<LinearExpr>> = None;
    if weights.equal_function_spread > 0 && !equal_shifts.is_empty() {
        let counts =
            count_per_employee(builder, request, &employees, &equal_shifts, "equal_functions");
        penalize_spread(builder, &counts, weights.equal_function_spread, "equal_function_spread");
        equal_counts = Some(counts);
    }

    if weights.equal_group_spread > 0 {
        for group in &request.equal_function_groups {
            let counts = if group.shifts.is_empty() {
                if equal_shifts.is_empty() {
                    continue;
                }
                match &equal_counts {
                    Some(all) => group.employees.iter().map(|&e| all[e].clone()).collect(),
                    None => count_per_employee(
                        builder,
                        request,
                        &group.employees,
                        &equal_shifts,
                        &format!("group[{}]", group.name),
                    ),
                }
            } else {
                count_per_employee(
                    builder,
                    request,
                    &group.employees,
                    &group.shifts,
                    &format!("group[{}]", group.name),
                )
            };
            penalize_spread(
                builder,
                &counts,
                weights.equal_group_spread,
                &format!("equal_group_spread[{}]", group.name),
            );
        }
    }
    builder.checkpoint("spreads");

    add_weekend_rules(builder, request, config);
}

/// Per listed employee, the number of live days worked on any of `shifts`.
fn count_per_employee(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    employees: &[usize],
    shifts: &[usize],
    label: &str,
) -> Vec<LinearExpr> {
    employees
        .iter()
        .map(|&e| {
            let worked = LinearExpr::sum(
                request
                    .live_days()
                    .flat_map(|d| shifts.iter().map(move |&s| (s, d)))
                    .map(|(s, d)| builder.cube.var(e, s, d)),
            );
            LinearExpr::from(builder.int_equal_to(worked, format!("{label}[{e}]")))
        })
        .collect()
}

/// Integer variable equal to `max(values) − min(values)`.
fn add_spread(
    problem: &mut OptimizationProblem,
    values: &[LinearExpr],
    label: &str,
) -> Option<VarId> {
    if values.len() < 2 {
        return None;
    }
    let (lo, hi) = values
        .iter()
        .map(|v| problem.bounds(v))
        .fold((i64::MAX, i64::MIN), |(lo, hi), (l, h)| (lo.min(l), hi.max(h)));

    let min = problem.new_int(lo, hi, format!("{label}: min"));
    let max = problem.new_int(lo, hi, format!("{label}: max"));
    problem.add_min_equality(min, values, format!("{label}: min"));
    problem.add_max_equality(max, values, format!("{label}: max"));

    let spread = problem.new_int(0, hi - lo, label);
    problem.add_eq(
        LinearExpr::from(spread)
            .minus(&LinearExpr::from(max))
            .plus(&LinearExpr::from(min)),
        0,
        label,
    );
    Some(spread)
}

fn penalize_spread(builder: &mut ModelBuilder, values: &[LinearExpr], weight: i64, label: &str) {
    if let Some(spread) = add_spread(&mut builder.problem, values, label) {
        builder.penalize_int(spread, weight, label);
    }
}

/// `(shift, day)` cells of week `week` that make it a worked weekend.
fn weekend_cells(request: &SchedulingRequest, week: usize) -> Vec<(usize, usize)> {
    let nights = request.night_shifts();
    let mut cells = Vec::new();
    let friday = week * 7 + FRIDAY;
    if friday < request.num_days && request.is_live(friday) {
        cells.extend(nights.iter().map(|&s| (s, friday)));
    }
    for day in [week * 7 + SATURDAY, week * 7 + SUNDAY] {
        if day < request.num_days && request.is_live(day) {
            cells.extend(request.working_shifts().map(|s| (s, day)));
        }
    }
    cells
}

/// Worked-weekend indicators per employee and week, then the rolling
/// window cap, the consecutive-weekend penalty and the lookback spread.
fn add_weekend_rules(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    config: &PlannerConfig,
) {
    let weights = &config.weights;
    let rules = &config.rules;
    if weights.weekend_window == 0
        && weights.consecutive_weekends == 0
        && weights.weekend_spread == 0
    {
        return;
    }

    let weeks: Vec<(usize, Vec<(usize, usize)>)> = (0..request.num_weeks())
        .map(|w| (w, weekend_cells(request, w)))
        .filter(|(_, cells)| !cells.is_empty())
        .collect();
    if weeks.is_empty() {
        return;
    }

    let mut totals = Vec::with_capacity(request.num_employees());
    for (e, employee) in request.employees.iter().enumerate() {
        let worked: Vec<VarId> = weeks
            .iter()
            .map(|(w, cells)| {
                let expr = LinearExpr::sum(cells.iter().map(|&(s, d)| builder.cube.var(e, s, d)));
                let indicator = builder.problem.new_bool(format!("weekend[{e},{w}]"));
                builder
                    .problem
                    .add_positive_indicator(indicator, expr, format!("weekend[{e},{w}]"));
                indicator
            })
            .collect();

        if weights.weekend_window > 0 {
            let width = rules.weekend_window_weeks.min(worked.len());
            for start in 0..=worked.len() - width {
                let window = &worked[start..start + width];
                if window.len() <= rules.max_weekends_per_window {
                    continue;
                }
                let bounds = SoftBounds {
                    hard_min: 0,
                    soft_min: 0,
                    min_cost: 0,
                    soft_max: rules.max_weekends_per_window,
                    hard_max: window.len(),
                    max_cost: weights.weekend_window,
                };
                let terms = add_soft_sum_constraint(
                    &mut builder.problem,
                    window,
                    &bounds,
                    &format!("weekend_window[{e},{}]", weeks[start].0),
                );
                builder.int_terms.extend(terms);
            }
        }

        if weights.consecutive_weekends > 0 && worked.len() > 1 {
            let bounds = SoftBounds {
                hard_min: 0,
                soft_min: 0,
                min_cost: 0,
                soft_max: 1,
                hard_max: worked.len(),
                max_cost: weights.consecutive_weekends,
            };
            let terms = add_soft_sequence_constraint(
                &mut builder.problem,
                &worked,
                &bounds,
                &format!("consecutive_weekends[{e}]"),
            );
            builder.bool_terms.extend(terms);
        }

        totals.push(
            LinearExpr::sum(worked.iter().copied())
                .with_constant(i64::from(employee.weekends_worked_lookback)),
        );
    }

    if weights.weekend_spread > 0 {
        penalize_spread(builder, &totals, weights.weekend_spread, "weekend_spread");
    }
    builder.checkpoint("weekends");
}
