// Decoder: turns a solver assignment into a schedule
// Every field of the output is read off the assignment; nothing else is consulted.

use tracing::debug;

use crate::domain::{
    DayRoster, EmployeeSchedule, ExcessPenalty, IndicatorPenalty, PenaltyReport, Schedule,
    ScheduleError, ScheduleResult, SchedulingRequest, ShiftAssignment, Solution, OFF_SHIFT,
};

use super::model::AssembledModel;

/// Decodes `solution` against the model it was produced for.
pub fn decode(
    request: &SchedulingRequest,
    model: &AssembledModel,
    solution: &Solution,
) -> ScheduleResult<Schedule> {
    let values = &solution.variable_values;
    check_assignment(model, values)?;

    let cube = &model.cube;
    let dummy = request.dummy();
    let employee_name = |e: usize| {
        if e == dummy {
            "dummy".to_string()
        } else {
            request.employees[e].name.clone()
        }
    };

    let days = (0..request.num_days)
        .map(|d| {
            let assignments = request
                .working_shifts()
                .flat_map(|s| (0..=dummy).map(move |e| (s, e)))
                .filter(|&(s, e)| cube.is_set(values, e, s, d))
                .map(|(s, e)| ShiftAssignment {
                    shift: s,
                    shift_name: request.shift_types[s].name.clone(),
                    employee: e,
                    employee_name: employee_name(e),
                })
                .collect();
            let off = (0..=dummy)
                .filter(|&e| cube.is_set(values, e, OFF_SHIFT, d))
                .collect();
            DayRoster {
                day: d,
                date: request.date(d),
                weekday: request.weekday(d),
                live: request.is_live(d),
                assignments,
                off,
            }
        })
        .collect();

    let employees = (0..=dummy)
        .map(|e| {
            let shifts: Vec<Vec<usize>> = (0..request.num_days)
                .map(|d| {
                    (0..request.num_shift_types())
                        .filter(|&s| cube.is_set(values, e, s, d))
                        .collect()
                })
                .collect();
            let line = request
                .live_days()
                .map(|d| render_day(request, &shifts[d]))
                .collect::<Vec<_>>()
                .join(" ");
            EmployeeSchedule {
                employee: e,
                name: employee_name(e),
                dummy: e == dummy,
                shifts,
                line,
            }
        })
        .collect();

    let penalties = penalty_report(model, values);
    let objective_value = model.problem.objective_value(values);
    if solution.objective_value.is_some_and(|v| v != objective_value) {
        debug!(
            reported = ?solution.objective_value,
            recomputed = objective_value,
            "solver objective differs from the recomputed one"
        );
    }

    Ok(Schedule {
        status: solution.status,
        objective_value,
        days,
        employees,
        penalties,
    })
}

fn check_assignment(model: &AssembledModel, values: &[i64]) -> ScheduleResult<()> {
    let expected = model.problem.num_variables();
    if values.len() != expected {
        return Err(ScheduleError::CorruptSolution(format!(
            "assignment has {} values, model has {expected} variables",
            values.len()
        )));
    }
    if let Some(var) = model.problem.out_of_bounds(values).first() {
        return Err(ScheduleError::CorruptSolution(format!(
            "`{}` = {} is outside its domain",
            model.problem.variable(*var).name,
            values[var.index()]
        )));
    }
    Ok(())
}

fn render_day(request: &SchedulingRequest, shifts: &[usize]) -> String {
    match shifts {
        [] => "-".to_string(),
        _ => shifts
            .iter()
            .map(|&s| request.shift_types[s].name.as_str())
            .collect::<Vec<_>>()
            .join("+"),
    }
}

/// True indicators and positive excess variables, with the objective they add up to.
pub fn penalty_report(model: &AssembledModel, values: &[i64]) -> PenaltyReport {
    let indicators: Vec<IndicatorPenalty> = model
        .bool_terms
        .iter()
        .filter(|t| values[t.var.index()] != 0)
        .map(|t| IndicatorPenalty {
            label: t.label.clone(),
            coefficient: t.coefficient,
        })
        .collect();
    let excesses: Vec<ExcessPenalty> = model
        .int_terms
        .iter()
        .filter(|t| values[t.var.index()] > 0)
        .map(|t| ExcessPenalty {
            label: t.label.clone(),
            value: values[t.var.index()],
            coefficient: t.coefficient,
        })
        .collect();
    let total = indicators.iter().map(|p| p.coefficient).sum::<i64>()
        + excesses.iter().map(|p| p.coefficient * p.value).sum::<i64>();
    PenaltyReport {
        indicators,
        excesses,
        total,
    }
}
