//! Forced literals: fixed assignments, required requests and history.
//!
//! All three pin `work[e, s, d]` to true. They are gathered per
//! `(employee, day)` first so contradictions surface as a build error
//! instead of an infeasible model.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::domain::{ScheduleError, ScheduleResult, SchedulingRequest, OFF_SHIFT};

#[derive(Debug, Default)]
pub struct ForcedAssignments {
    cells: BTreeMap<(usize, usize), BTreeSet<usize>>,
}

fn conflict(employee: usize, day: usize, reason: String) -> ScheduleError {
    ScheduleError::ConflictingFixedAssignment {
        employee,
        day,
        reason,
    }
}

impl ForcedAssignments {
    /// Collects every forced literal of `request` and rejects contradictions.
    pub fn collect(request: &SchedulingRequest) -> ScheduleResult<Self> {
        let mut forced = Self::default();

        for f in request
            .fixed_assignments
            .iter()
            .filter(|f| request.is_live(f.day))
        {
            forced.insert(f.employee, f.shift, f.day, "fixed assignment");
        }

        for r in request
            .requests
            .iter()
            .filter(|r| r.weight == 0 && request.is_live(r.day))
        {
            if !request.is_eligible(r.employee, r.shift)
                && !request.is_fixed(r.employee, r.shift, r.day)
            {
                return Err(conflict(
                    r.employee,
                    r.day,
                    format!(
                        "required request for `{}` contradicts the skill rules",
                        request.shift_types[r.shift].name
                    ),
                ));
            }
            forced.insert(r.employee, r.shift, r.day, "required request");
        }

        for h in &request.history {
            forced.insert(h.employee, h.shift, h.day, "history");
        }

        forced.check(request)?;
        Ok(forced)
    }

    fn insert(&mut self, employee: usize, shift: usize, day: usize, source: &str) {
        if !self.cells.entry((employee, day)).or_default().insert(shift) {
            warn!(employee, shift, day, source, "duplicate forced assignment ignored");
        }
    }

    fn check(&self, request: &SchedulingRequest) -> ScheduleResult<()> {
        for (&(e, d), shifts) in &self.cells {
            if shifts.len() > 2 {
                return Err(conflict(e, d, format!("{} shifts forced on one day", shifts.len())));
            }
            if shifts.len() == 2 {
                let pair: Vec<_> = shifts.iter().map(|&s| &request.shift_types[s]).collect();
                if let Some(single) = pair.iter().find(|t| !t.allow_combination) {
                    return Err(conflict(
                        e,
                        d,
                        format!("`{}` cannot be combined with another shift", single.name),
                    ));
                }
                if pair[0].clashes_with(pair[1]) {
                    return Err(conflict(
                        e,
                        d,
                        format!("`{}` and `{}` overlap", pair[0].name, pair[1].name),
                    ));
                }
            }

            let next = d + 1;
            let after_night = shifts.iter().any(|&s| request.shift_types[s].night);
            if after_night && next < request.num_days && request.is_live(next) {
                if let Some(following) = self.cells.get(&(e, next)) {
                    if !following.contains(&OFF_SHIFT) {
                        return Err(conflict(
                            e,
                            next,
                            format!("rest day after the night shift of day {d} is overridden"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, employee: usize, shift: usize, day: usize) -> bool {
        self.cells
            .get(&(employee, day))
            .is_some_and(|shifts| shifts.contains(&shift))
    }

    /// Forced `(employee, shift, day)` triples on live days.
    pub fn live(&self, request: &SchedulingRequest) -> Vec<(usize, usize, usize)> {
        self.cells
            .iter()
            .filter(|((_, d), _)| request.is_live(*d))
            .flat_map(|(&(e, d), shifts)| shifts.iter().map(move |&s| (e, s, d)))
            .collect()
    }

    /// Shifts an employee is pinned to on a carry-over day: the history
    /// entries for that day, or off when there are none.
    pub fn pinned(&self, employee: usize, day: usize) -> BTreeSet<usize> {
        self.cells
            .get(&(employee, day))
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([OFF_SHIFT]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(extra: serde_json::Value) -> SchedulingRequest {
        let mut base = serde_json::json!({
            "employees": [{"name": "a"}, {"name": "b"}],
            "shift_types": [
                {"name": "off"},
                {"name": "early", "window": {"start": "07:00", "end": "15:00"}, "duration_hours": 8.0, "allow_combination": true},
                {"name": "late", "window": {"start": "14:00", "end": "22:00"}, "duration_hours": 8.0, "allow_combination": true},
                {"name": "night", "window": {"start": "22:00", "end": "06:00"}, "duration_hours": 8.0, "night": true}
            ],
            "start_date": "2024-01-01",
            "num_days": 4,
            "offset": 1,
            "cover_demand": [[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            "norm_hours": 40.0
        });
        if let (Some(base), serde_json::Value::Object(extra)) = (base.as_object_mut(), extra) {
            base.extend(extra);
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn duplicates_collapse_into_one_literal() {
        let request = request(serde_json::json!({
            "fixed_assignments": [{"employee": 0, "shift": 1, "day": 2}],
            "requests": [{"employee": 0, "shift": 1, "day": 2, "weight": 0}]
        }));
        let forced = ForcedAssignments::collect(&request).unwrap();
        assert!(forced.contains(0, 1, 2));
        assert_eq!(forced.live(&request), vec![(0, 1, 2)]);
    }

    #[test]
    fn soft_requests_and_carry_over_fixes_are_not_forced() {
        let request = request(serde_json::json!({
            "fixed_assignments": [{"employee": 1, "shift": 1, "day": 0}],
            "requests": [{"employee": 0, "shift": 2, "day": 2, "weight": 3}]
        }));
        let forced = ForcedAssignments::collect(&request).unwrap();
        assert!(forced.live(&request).is_empty());
        assert!(!forced.contains(1, 1, 0));
    }

    #[test]
    fn overlapping_pair_is_a_conflict() {
        let request = request(serde_json::json!({
            "fixed_assignments": [
                {"employee": 0, "shift": 1, "day": 2},
                {"employee": 0, "shift": 2, "day": 2}
            ]
        }));
        let err = ForcedAssignments::collect(&request).unwrap_err();
        assert!(matches!(err, ScheduleError::ConflictingFixedAssignment { employee: 0, day: 2, .. }));
    }

    #[test]
    fn night_cannot_share_a_day() {
        let request = request(serde_json::json!({
            "fixed_assignments": [
                {"employee": 1, "shift": 1, "day": 3},
                {"employee": 1, "shift": 3, "day": 3}
            ]
        }));
        assert!(ForcedAssignments::collect(&request).is_err());
    }

    #[test]
    fn history_night_blocks_a_forced_first_live_day() {
        let request = request(serde_json::json!({
            "history": [{"employee": 0, "shift": 3, "day": 0}],
            "fixed_assignments": [{"employee": 0, "shift": 2, "day": 1}]
        }));
        let err = ForcedAssignments::collect(&request).unwrap_err();
        assert!(matches!(err, ScheduleError::ConflictingFixedAssignment { day: 1, .. }));
    }

    #[test]
    fn carry_over_days_default_to_off() {
        let request = request(serde_json::json!({
            "history": [{"employee": 0, "shift": 3, "day": 0}]
        }));
        let forced = ForcedAssignments::collect(&request).unwrap();
        assert_eq!(forced.pinned(0, 0), BTreeSet::from([3]));
        assert_eq!(forced.pinned(1, 0), BTreeSet::from([OFF_SHIFT]));
    }
}
