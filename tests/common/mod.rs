// Shared request fixtures for the integration scenarios
#![allow(dead_code)]

use serde_json::{json, Value};
use shiftopt::SchedulingRequest;

pub const DAY: usize = 1;
pub const NIGHT: usize = 2;

/// off, day 08:00-16:00, night 22:00-06:00
pub fn day_and_night() -> Value {
    json!([
        {"name": "off"},
        {"name": "day", "window": {"start": "08:00", "end": "16:00"}, "duration_hours": 8.0},
        {"name": "night", "window": {"start": "22:00", "end": "06:00"}, "duration_hours": 8.0, "night": true}
    ])
}

pub fn employees(names: &[&str]) -> Value {
    Value::Array(names.iter().map(|n| json!({"name": n})).collect())
}

/// `demand(d)` gives the cover row of day `d`.
pub fn cover(num_days: usize, demand: impl Fn(usize) -> Vec<u32>) -> Value {
    json!((0..num_days).map(demand).collect::<Vec<_>>())
}

/// A request over `num_days` starting Monday 2024-01-01; `extra` fields override the base.
pub fn request(
    employees: Value,
    shift_types: Value,
    cover: Value,
    num_days: usize,
    extra: Value,
) -> SchedulingRequest {
    let mut base = json!({
        "name": "fixture",
        "employees": employees,
        "shift_types": shift_types,
        "start_date": "2024-01-01",
        "num_days": num_days,
        "cover_demand": cover,
        "norm_hours": 80.0
    });
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    serde_json::from_value(base).unwrap()
}

/// Days on which `employee` works `shift`.
pub fn days_on(schedule: &shiftopt::Schedule, employee: usize, shift: usize) -> Vec<usize> {
    (0..schedule.days.len())
        .filter(|&d| schedule.employees[employee].works(shift, d))
        .collect()
}
