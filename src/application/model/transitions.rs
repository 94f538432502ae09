//! Transition preferences between two (shift, day) cells.
//!
//! Cost 0 makes the transition mandatory. A positive cost creates an
//! indicator that can only be true when both cells are worked, and rewards
//! it with `-cost` in the objective.

use crate::domain::{LinearExpr, SchedulingRequest};

use super::ModelBuilder;

fn link(
    builder: &mut ModelBuilder,
    request: &SchedulingRequest,
    first: (usize, usize),
    second: (usize, usize),
    cost: i64,
    label: String,
) {
    for e in 0..request.num_employees() {
        let a = builder.cube.lit(e, first.0, first.1);
        let b = builder.cube.lit(e, second.0, second.1);
        if cost == 0 {
            builder
                .problem
                .add_implication(a, b, format!("{label}[{e}]"));
        } else {
            let granted = builder.problem.new_bool(format!("{label}[{e}]"));
            for (side, lit) in [("first", a), ("second", b)] {
                builder.problem.add_le(
                    LinearExpr::from(granted).minus(&LinearExpr::from(lit)),
                    0,
                    format!("{label}[{e}]: {side}"),
                );
            }
            builder.penalize_bool(granted, -cost, format!("{label}[{e}]"));
        }
    }
}

/// Weekday-to-weekday transitions, repeated in every week of the horizon.
pub fn add_day_transitions(builder: &mut ModelBuilder, request: &SchedulingRequest) {
    for (i, t) in request.day_transitions.iter().enumerate() {
        for week in 0..request.num_weeks() {
            let d1 = week * 7 + t.first_weekday;
            let d2 = week * 7 + t.second_weekday;
            if d1 >= request.num_days || d2 >= request.num_days || !request.is_live(d2) {
                continue;
            }
            link(
                builder,
                request,
                (t.first_shift, d1),
                (t.second_shift, d2),
                t.cost,
                format!("day_transition[{i},{week}]"),
            );
        }
    }
    builder.checkpoint("day transitions");
}

/// Offset-day transitions, anchored at every day of the horizon.
pub fn add_shift_transitions(builder: &mut ModelBuilder, request: &SchedulingRequest) {
    for (i, t) in request.shift_transitions.iter().enumerate() {
        for d in 0..request.num_days {
            let d1 = d + t.first_day_offset;
            let d2 = d + t.next_day_offset;
            if d1 >= request.num_days || d2 >= request.num_days || !request.is_live(d2) {
                continue;
            }
            link(
                builder,
                request,
                (t.first_shift, d1),
                (t.next_shift, d2),
                t.cost,
                format!("shift_transition[{i},{d}]"),
            );
        }
    }
    builder.checkpoint("shift transitions");
}
