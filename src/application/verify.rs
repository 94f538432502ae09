//! Re-checks the hard rules on a decoded schedule.
//!
//! Works on the [`Schedule`] alone, independent of the model rows, so a
//! solver response that slipped past the model (or a model bug) is caught
//! before the schedule leaves the planner.

use std::fmt;

use crate::config::{PlannerConfig, RuleSettings};
use crate::domain::{Schedule, SchedulingRequest, OFF_SHIFT};

use super::model::assembler::night_windows;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardRule {
    DailyCardinality,
    Combination,
    ShortShift,
    Overlap,
    Coverage,
    RestAfterNight,
    NightWindow,
    Skill,
    Forced,
    History,
}

impl fmt::Display for HardRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HardRule::DailyCardinality => "daily cardinality",
            HardRule::Combination => "combination",
            HardRule::ShortShift => "short shift",
            HardRule::Overlap => "overlap",
            HardRule::Coverage => "coverage",
            HardRule::RestAfterNight => "rest after night",
            HardRule::NightWindow => "night window",
            HardRule::Skill => "skill",
            HardRule::Forced => "forced assignment",
            HardRule::History => "history",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: HardRule,
    pub employee: Option<usize>,
    pub day: usize,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.employee {
            Some(e) => write!(f, "{} (employee {e}, day {}): {}", self.rule, self.day, self.detail),
            None => write!(f, "{} (day {}): {}", self.rule, self.day, self.detail),
        }
    }
}

/// Every hard rule broken by `schedule`; empty for a valid schedule.
pub fn verify_schedule(
    request: &SchedulingRequest,
    config: &PlannerConfig,
    schedule: &Schedule,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut flag = |rule, employee, day, detail: String| {
        violations.push(Violation {
            rule,
            employee,
            day,
            detail,
        })
    };

    let nights = request.night_shifts();
    for e in 0..request.num_employees() {
        let shifts = &schedule.employees[e].shifts;
        for d in request.live_days() {
            check_day(request, &config.rules, &shifts[d], e, d, &mut flag);
        }
        for d in 0..request.offset {
            let mut expected: Vec<usize> = request
                .history
                .iter()
                .filter(|h| h.employee == e && h.day == d)
                .map(|h| h.shift)
                .collect();
            if expected.is_empty() {
                expected.push(OFF_SHIFT);
            }
            expected.sort_unstable();
            expected.dedup();
            if shifts[d] != expected {
                let detail = format!("expected {expected:?}, got {:?}", shifts[d]);
                flag(HardRule::History, Some(e), d, detail);
            }
        }

        for d in request.offset.saturating_sub(1)..request.num_days.saturating_sub(1) {
            if shifts[d].iter().any(|s| nights.contains(s)) && !shifts[d + 1].contains(&OFF_SHIFT) {
                let detail = "not off after a night shift".to_string();
                flag(HardRule::RestAfterNight, Some(e), d + 1, detail);
            }
        }
        if !nights.is_empty() {
            for (start, end) in night_windows(request, config.rules.night_window_days) {
                let worked = (start..end)
                    .filter(|&d| shifts[d].iter().any(|s| nights.contains(s)))
                    .count();
                if worked > 1 {
                    let detail = format!("{worked} nights in {start}..{end}");
                    flag(HardRule::NightWindow, Some(e), start, detail);
                }
            }
        }

        for s in request.working_shifts() {
            if request.is_eligible(e, s) {
                continue;
            }
            for d in request.live_days() {
                if shifts[d].contains(&s) && !request.is_fixed(e, s, d) {
                    flag(HardRule::Skill, Some(e), d, format!("not eligible for shift {s}"));
                }
            }
        }
    }

    let forced = request
        .fixed_assignments
        .iter()
        .map(|f| (f.employee, f.shift, f.day))
        .chain(
            request
                .requests
                .iter()
                .filter(|r| r.weight == 0)
                .map(|r| (r.employee, r.shift, r.day)),
        );
    for (e, s, d) in forced.filter(|&(_, _, d)| request.is_live(d)) {
        if !schedule.employees[e].works(s, d) {
            flag(HardRule::Forced, Some(e), d, format!("shift {s} not assigned"));
        }
    }

    for d in request.live_days() {
        for s in request.working_shifts() {
            let demand = request.demand(d, s) as usize;
            let covered = schedule.headcount(s, d);
            if covered != demand {
                let detail = format!("shift {s}: {covered} assigned, {demand} required");
                flag(HardRule::Coverage, None, d, detail);
            }
        }
    }

    violations
}

fn check_day(
    request: &SchedulingRequest,
    rules: &RuleSettings,
    worked: &[usize],
    e: usize,
    d: usize,
    flag: &mut impl FnMut(HardRule, Option<usize>, usize, String),
) {
    if worked.is_empty() || worked.len() > 2 {
        flag(HardRule::DailyCardinality, Some(e), d, format!("{} shift types", worked.len()));
        return;
    }
    let types: Vec<_> = worked.iter().map(|&s| (s, &request.shift_types[s])).collect();

    if worked.len() == 2 {
        if let Some((s, _)) = types.iter().find(|(_, t)| !t.allow_combination) {
            flag(HardRule::Combination, Some(e), d, format!("shift {s} is not combinable"));
        }
        let (a, b) = (types[0], types[1]);
        if a.0 != OFF_SHIFT && b.0 != OFF_SHIFT && a.1.clashes_with(b.1) {
            flag(HardRule::Overlap, Some(e), d, format!("shifts {} and {} overlap", a.0, b.0));
        }
    }

    let off = worked.contains(&OFF_SHIFT);
    for &(s, t) in &types {
        if s == OFF_SHIFT {
            continue;
        }
        if t.duration_hours < rules.short_shift_hours && (worked.len() < 2 || off) {
            flag(HardRule::ShortShift, Some(e), d, format!("short shift {s} is not paired"));
        }
        if t.allow_overlap && off {
            flag(HardRule::Overlap, Some(e), d, format!("overlap shift {s} on a day off"));
        }
    }
}
