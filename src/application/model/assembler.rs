//! Core rule families of the scheduling model.
//!
//! [`assemble`] validates the request, allocates the work cube and emits
//! every hard rule and soft term in turn. Structural per-day rules apply to
//! live days only; carry-over days are pinned outright.

use tracing::info;

use crate::config::{PenaltyWeights, PlannerConfig, RuleSettings};
use crate::domain::{
    Literal, LinearExpr, ScheduleResult, SchedulingRequest, SoftBounds, OFF_SHIFT,
};

use super::forced::ForcedAssignments;
use super::primitives::{add_soft_sequence_constraint, add_soft_sum_constraint};
use super::{fairness, transitions, AssembledModel, ModelBuilder};

/// Builds the complete model for `request`.
pub fn assemble(
    request: &SchedulingRequest,
    config: &PlannerConfig,
) -> ScheduleResult<AssembledModel> {
    request.validate()?;
    let forced = ForcedAssignments::collect(request)?;

    let mut builder = ModelBuilder::new(request);
    builder.checkpoint("work cube");

    add_daily_cardinality(&mut builder, request);
    add_combination_rules(&mut builder, request, &config.rules);
    add_overlap_rules(&mut builder, request);
    add_dummy_rules(&mut builder, request, &config.weights);
    add_forced_assignments(&mut builder, request, &forced);
    add_skill_rules(&mut builder, request);
    add_soft_requests(&mut builder, request);
    add_coverage(&mut builder, request);
    add_night_rules(&mut builder, request, &config.rules);
    add_weekly_caps(&mut builder, request, &config.weights);
    add_contract_hours(&mut builder, request, config);
    add_sequence_rules(&mut builder, request);
    transitions::add_day_transitions(&mut builder, request);
    transitions::add_shift_transitions(&mut builder, request);
    fairness::add_fairness_rules(&mut builder, request, config);

    let model = builder.finish();
    info!(
        request = %request.name,
        employees = request.num_employees(),
        shifts = request.num_shift_types(),
        days = request.num_days,
        variables = model.problem.num_variables(),
        constraints = model.problem.constraints.len(),
        penalty_terms = model.num_penalty_terms(),
        "model assembled"
    );
    Ok(model)
}

/// Each real employee works one or two shift types per day, off included.
fn add_daily_cardinality(builder: &mut ModelBuilder, request: &SchedulingRequest) {
    for e in 0..request.num_employees() {
        for d in request.live_days() {
            let day = LinearExpr::sum(builder.cube.day_vars(e, d));
            builder
                .problem
                .add_ge(day.clone(), 1, format!("at_least_one[{e},{d}]"));
            builder.problem.add_le(day, 2, format!("at_most_two[{e},{d}]"));
        }
    }
    builder.checkpoint("daily cardinality");
}

/// Non-combinable shifts stand alone; short shifts need a partner.
fn add_combination_rules(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    rules: &RuleSettings,
) {
    for (s, shift) in request.shift_types.iter().enumerate() {
        let short = s != OFF_SHIFT && shift.duration_hours < rules.short_shift_hours;
        for e in 0..request.num_employees() {
            for d in request.live_days() {
                let day = LinearExpr::sum(builder.cube.day_vars(e, d));
                let work = builder.cube.var(e, s, d);
                if !shift.allow_combination {
                    builder.problem.add_le(
                        day.clone().with_term(work, 1),
                        2,
                        format!("alone[{e},{s},{d}]"),
                    );
                }
                if short {
                    builder.problem.add_ge(
                        day.with_term(work, -2),
                        0,
                        format!("short_paired[{e},{s},{d}]"),
                    );
                    builder.problem.add_bool_or(
                        &[Literal::Neg(work), Literal::Neg(builder.cube.var(e, OFF_SHIFT, d))],
                        format!("short_not_off[{e},{s},{d}]"),
                    );
                }
            }
        }
    }
    builder.checkpoint("combination");
}

/// Time-clashing pairs are exclusive; overlap-allowed shifts exclude off.
fn add_overlap_rules(builder: &mut ModelBuilder, request: &SchedulingRequest) {
    let shifts: Vec<usize> = request.working_shifts().collect();
    let clashing: Vec<(usize, usize)> = shifts
        .iter()
        .flat_map(|&a| shifts.iter().map(move |&b| (a, b)))
        .filter(|&(a, b)| a < b && request.shift_types[a].clashes_with(&request.shift_types[b]))
        .collect();

    for e in 0..request.num_employees() {
        for d in request.live_days() {
            for &(a, b) in &clashing {
                builder.problem.add_bool_or(
                    &[
                        Literal::Neg(builder.cube.var(e, a, d)),
                        Literal::Neg(builder.cube.var(e, b, d)),
                    ],
                    format!("no_overlap[{e},{a},{b},{d}]"),
                );
            }
            for &s in shifts.iter().filter(|&&s| request.shift_types[s].allow_overlap) {
                builder.problem.add_bool_or(
                    &[
                        Literal::Neg(builder.cube.var(e, s, d)),
                        Literal::Neg(builder.cube.var(e, OFF_SHIFT, d)),
                    ],
                    format!("overlap_not_off[{e},{s},{d}]"),
                );
            }
        }
    }
    builder.checkpoint("overlap");
}

/// The dummy holds at least one shift type every day and pays for each
/// working shift it covers on a live day.
fn add_dummy_rules(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    weights: &PenaltyWeights,
) {
    let dummy = request.dummy();
    for d in 0..request.num_days {
        let day = LinearExpr::sum(builder.cube.day_vars(dummy, d));
        builder.problem.add_ge(day, 1, format!("dummy_present[{d}]"));
    }

    if weights.dummy > 0 && request.num_shift_types() > 1 {
        let covered = LinearExpr::sum(
            request
                .live_days()
                .flat_map(|d| request.working_shifts().map(move |s| (s, d)))
                .map(|(s, d)| builder.cube.var(dummy, s, d)),
        );
        let count = builder.int_equal_to(covered, "dummy_shifts");
        builder.penalize_int(count, weights.dummy, "dummy_shifts");
    }
    builder.checkpoint("dummy");
}

/// Live forced literals are set; carry-over days are pinned completely.
fn add_forced_assignments(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    forced: &ForcedAssignments,
) {
    for (e, s, d) in forced.live(request) {
        builder
            .problem
            .add_eq(builder.cube.var(e, s, d).into(), 1, format!("forced[{e},{s},{d}]"));
    }

    for d in 0..request.offset {
        for e in 0..request.num_employees() {
            let pinned = forced.pinned(e, d);
            for s in 0..request.num_shift_types() {
                let value = i64::from(pinned.contains(&s));
                builder
                    .problem
                    .add_eq(
                        builder.cube.var(e, s, d).into(),
                        value,
                        format!("history[{e},{s},{d}]"),
                    );
            }
        }
        let dummy = request.dummy();
        for s in 0..request.num_shift_types() {
            let value = i64::from(s == OFF_SHIFT);
            builder
                .problem
                .add_eq(
                    builder.cube.var(dummy, s, d).into(),
                    value,
                    format!("history[{dummy},{s},{d}]"),
                );
        }
    }
    builder.checkpoint("forced");
}

/// Ineligible shifts are forbidden on live days unless fixed.
fn add_skill_rules(builder: &mut ModelBuilder, request: &SchedulingRequest) {
    for e in 0..request.num_employees() {
        for s in request.working_shifts() {
            if request.is_eligible(e, s) {
                continue;
            }
            for d in request.live_days() {
                if !request.is_fixed(e, s, d) {
                    builder
                        .problem
                        .add_eq(builder.cube.var(e, s, d).into(), 0, format!("skill[{e},{s},{d}]"));
                }
            }
        }
    }
    builder.checkpoint("skills");
}

fn add_soft_requests(builder: &mut ModelBuilder, request: &SchedulingRequest) {
    for r in request
        .requests
        .iter()
        .filter(|r| r.weight != 0 && request.is_live(r.day))
    {
        let work = builder.cube.var(r.employee, r.shift, r.day);
        let label = format!("request[{},{},{}]", r.employee, r.shift, r.day);
        builder.penalize_bool(work, r.weight, label);
    }
    builder.checkpoint("requests");
}

/// Exact headcount per working shift and live day, the dummy included.
fn add_coverage(builder: &mut ModelBuilder, request: &SchedulingRequest) {
    for d in request.live_days() {
        for s in request.working_shifts() {
            let worked =
                LinearExpr::sum((0..=request.num_employees()).map(|e| builder.cube.var(e, s, d)));
            builder
                .problem
                .add_eq(worked, i64::from(request.demand(d, s)), format!("cover[{s},{d}]"));
        }
    }
    builder.checkpoint("coverage");
}

/// Off after every night shift, and at most one night per rolling window.
fn add_night_rules(builder: &mut ModelBuilder, request: &SchedulingRequest, rules: &RuleSettings) {
    let nights = request.night_shifts();
    if nights.is_empty() {
        return;
    }
    let first = request.offset.saturating_sub(1);

    for e in 0..request.num_employees() {
        for d in first..request.num_days - 1 {
            for &s in &nights {
                builder.problem.add_implication(
                    builder.cube.lit(e, s, d),
                    builder.cube.lit(e, OFF_SHIFT, d + 1),
                    format!("rest_after_night[{e},{s},{d}]"),
                );
            }
        }

        for (start, end) in night_windows(request, rules.night_window_days) {
            let worked = LinearExpr::sum(
                (start..end)
                    .flat_map(|d| nights.iter().map(move |&s| (s, d)))
                    .map(|(s, d)| builder.cube.var(e, s, d)),
            );
            builder
                .problem
                .add_le(worked, 1, format!("one_night_per_window[{e},{start}]"));
        }
    }
    builder.checkpoint("nights");
}

/// Rolling `[start, end)` windows over the live days, clipped to the horizon.
pub(crate) fn night_windows(request: &SchedulingRequest, width: usize) -> Vec<(usize, usize)> {
    let live = request.live_days();
    if live.len() <= width {
        return vec![(live.start, live.end)];
    }
    (live.start..=live.end - width).map(|d| (d, d + width)).collect()
}

/// Per employee, shift type and week: occurrences above the cap are penalised.
fn add_weekly_caps(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    weights: &PenaltyWeights,
) {
    if weights.weekly_cap == 0 {
        return;
    }
    for s in request.working_shifts() {
        let Some(cap) = request.shift_types[s].max_per_week else {
            continue;
        };
        for week in 0..request.num_weeks() {
            let days: Vec<usize> = (week * 7..(week * 7 + 7).min(request.num_days))
                .filter(|&d| request.is_live(d))
                .collect();
            if days.len() <= cap as usize {
                continue;
            }
            let bounds = SoftBounds {
                hard_min: 0,
                soft_min: 0,
                min_cost: 0,
                soft_max: cap as usize,
                hard_max: days.len(),
                max_cost: weights.weekly_cap,
            };
            for e in 0..request.num_employees() {
                let works: Vec<_> = days.iter().map(|&d| builder.cube.var(e, s, d)).collect();
                let terms = add_soft_sum_constraint(
                    &mut builder.problem,
                    &works,
                    &bounds,
                    &format!("weekly_cap[{e},{s},{week}]"),
                );
                builder.int_terms.extend(terms);
            }
        }
    }
    builder.checkpoint("weekly caps");
}

/// Worked hours stay under the contracted ceiling; shortfall is penalised.
fn add_contract_hours(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    config: &PlannerConfig,
) {
    let full_time = config.rules.full_time_weekly_hours;
    for (e, employee) in request.employees.iter().enumerate() {
        let contract = employee.contract_hours.unwrap_or(full_time);
        let ceiling = (request.norm_hours * contract / full_time).floor() as i64;

        let mut worked = LinearExpr::new();
        for d in request.live_days() {
            for s in request.working_shifts() {
                worked.add_term(builder.cube.var(e, s, d), request.shift_types[s].whole_hours());
            }
        }
        builder
            .problem
            .add_le(worked.clone(), ceiling, format!("hours_ceiling[{e}]"));

        if config.weights.hours_shortfall > 0 {
            let label = format!("hours_shortfall[{e}]");
            let (lo, _) = builder.problem.bounds(&worked);
            let shortfall = builder.problem.new_int(0, (ceiling - lo).max(0), label.clone());
            builder.problem.add_eq(
                LinearExpr::from(shortfall).plus(&worked),
                ceiling,
                label.clone(),
            );
            builder.penalize_int(shortfall, config.weights.hours_shortfall, label);
        }
    }
    builder.checkpoint("contract hours");
}

fn add_sequence_rules(builder: &mut ModelBuilder, request: &SchedulingRequest) {
    for (i, rule) in request.sequence_rules.iter().enumerate() {
        for e in 0..request.num_employees() {
            let works = builder.cube.shift_vars(e, rule.shift);
            let terms = add_soft_sequence_constraint(
                &mut builder.problem,
                &works,
                &rule.bounds,
                &format!("sequence[{i},{e}]"),
            );
            builder.bool_terms.extend(terms);
        }
    }
    builder.checkpoint("sequences");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Employee, ShiftType, TimeOfDay, TimeWindow};
    use chrono::NaiveDate;

    fn request(days: usize, offset: usize) -> SchedulingRequest {
        let window = |a, b| {
            TimeWindow::new(
                TimeOfDay::new(a, 0).unwrap(),
                TimeOfDay::new(b, 0).unwrap(),
            )
        };
        SchedulingRequest {
            name: "unit".into(),
            employees: vec![Employee::new("a"), Employee::new("b")],
            shift_types: vec![
                ShiftType::off("off"),
                ShiftType::timed("day", window(8, 16), 8.0),
                ShiftType::timed("night", window(22, 6), 8.0).as_night(),
            ],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            num_days: days,
            offset,
            cover_demand: vec![vec![0, 1, 1]; days],
            norm_hours: 40.0,
            fixed_assignments: vec![],
            history: vec![],
            requests: vec![],
            skills: vec![],
            day_transitions: vec![],
            shift_transitions: vec![],
            equal_function_groups: vec![],
            sequence_rules: vec![],
            time_budget_secs: None,
        }
    }

    #[test]
    fn night_windows_roll_over_live_days() {
        let req = request(10, 1);
        assert_eq!(night_windows(&req, 7), vec![(1, 8), (2, 9), (3, 10)]);

        let short = request(5, 1);
        assert_eq!(night_windows(&short, 7), vec![(1, 5)]);
    }

    #[test]
    fn dummy_penalty_counts_only_live_working_shifts() {
        let req = request(3, 1);
        let model = assemble(&req, &PlannerConfig::default()).unwrap();
        let dummy = model
            .int_terms
            .iter()
            .find(|t| t.label == "dummy_shifts")
            .unwrap();
        assert_eq!(dummy.coefficient, 300);
        assert_eq!(model.problem.variable(dummy.var).upper_bound, 4);
    }

    #[test]
    fn carry_over_days_are_pinned_to_off() {
        let req = request(3, 1);
        let model = assemble(&req, &PlannerConfig::default()).unwrap();
        let pinned = model
            .problem
            .constraints
            .iter()
            .filter(|c| c.name.starts_with("history["))
            .count();
        // three employees (dummy included) by three shift types, one day
        assert_eq!(pinned, 9);
    }
}
