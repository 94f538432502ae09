//! Scheduling request: employees, shift types, horizon, demand and preferences.
//!
//! Every tuple family of the request has its own record type and is checked
//! by [`SchedulingRequest::validate`] before a model is built, so the model
//! assembler can index into the request without further bounds checks.
//!
//! Day indexing: day `d` falls on `start_date + d`, weekday `d mod 7`
//! (0 = Monday) and week `d / 7`. Days before `offset` are the carry-over
//! window pinned by `history`.

use std::fmt;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::error::{ReferenceKind, ScheduleError, ScheduleResult};

/// Index of the reserved "off/rest" shift type.
pub const OFF_SHIFT: usize = 0;

pub const FRIDAY: usize = 4;
pub const SATURDAY: usize = 5;
pub const SUNDAY: usize = 6;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Time of day in minutes since midnight, written as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32) -> Option<Self> {
        (hours < 24 && minutes < 60).then_some(Self(hours * 60 + minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (h, m) = value
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got `{value}`"))?;
        let hours = h
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("bad hour in `{value}`: {e}"))?;
        let minutes = m
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("bad minute in `{value}`: {e}"))?;
        TimeOfDay::new(hours, minutes).ok_or_else(|| format!("time `{value}` out of range"))
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Clock window of a shift; `end <= start` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn wraps(&self) -> bool {
        self.end <= self.start
    }

    // Half-open interval in minutes on the day the shift starts.
    fn span(&self) -> (i64, i64) {
        let start = self.start.minutes() as i64;
        let mut end = self.end.minutes() as i64;
        if self.wraps() {
            end += MINUTES_PER_DAY as i64;
        }
        (start, end)
    }

    /// Whether two windows of shifts starting on the same day intersect,
    /// counting the part of a wrapping window that spills into the next day.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        let (a_start, a_end) = self.span();
        let (b_start, b_end) = other.span();
        let day = MINUTES_PER_DAY as i64;
        [-day, 0, day]
            .iter()
            .any(|shift| a_start < b_end + shift && b_start + shift < a_end)
    }
}

/// A type of shift; index 0 is the reserved off/rest type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftType {
    pub name: String,
    #[serde(default)]
    pub window: Option<TimeWindow>,
    #[serde(default)]
    pub duration_hours: f64,
    #[serde(default)]
    pub max_per_week: Option<u32>,
    #[serde(default)]
    pub night: bool,
    #[serde(default)]
    pub allow_overlap: bool,
    #[serde(default)]
    pub allow_combination: bool,
    #[serde(default)]
    pub equal_function: bool,
}

impl ShiftType {
    pub fn off(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            window: None,
            duration_hours: 0.0,
            max_per_week: None,
            night: false,
            allow_overlap: false,
            allow_combination: false,
            equal_function: false,
        }
    }

    pub fn timed(name: impl Into<String>, window: TimeWindow, duration_hours: f64) -> Self {
        Self {
            window: Some(window),
            duration_hours,
            ..Self::off(name)
        }
    }

    pub fn as_night(mut self) -> Self {
        self.night = true;
        self
    }

    pub fn combinable(mut self) -> Self {
        self.allow_combination = true;
        self
    }

    /// Duration rounded to whole hours, as counted against contracted hours.
    pub fn whole_hours(&self) -> i64 {
        self.duration_hours.round() as i64
    }

    /// Whether this shift and `other` clash in time on the same day.
    pub fn clashes_with(&self, other: &ShiftType) -> bool {
        if self.allow_overlap && other.allow_overlap {
            return false;
        }
        match (&self.window, &other.window) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => false,
        }
    }
}

/// A real employee; the dummy employee is implicit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    /// Contracted weekly hours; `None` means full time.
    #[serde(default)]
    pub contract_hours: Option<f64>,
    /// Weekends worked in the lookback window preceding this period.
    #[serde(default)]
    pub weekends_worked_lookback: u32,
}

impl Employee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contract_hours: None,
            weekends_worked_lookback: 0,
        }
    }
}

/// Forces `work[employee, shift, day] = 1` for live days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedAssignment {
    pub employee: usize,
    pub shift: usize,
    pub day: usize,
}

/// A shift worked in the carry-over window (`day < offset`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryAssignment {
    pub employee: usize,
    pub shift: usize,
    pub day: usize,
}

/// Employee preference; weight 0 is hard, any other weight is an objective coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequest {
    pub employee: usize,
    pub shift: usize,
    pub day: usize,
    pub weight: i64,
}

/// Skill eligibility of one employee for one shift type (default: eligible).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFlag {
    pub employee: usize,
    pub shift: usize,
    pub eligible: bool,
}

/// Within every week: `first_shift` on `first_weekday` should be followed by
/// `second_shift` on `second_weekday`. Cost 0 is a hard implication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTransition {
    pub first_shift: usize,
    pub first_weekday: usize,
    pub second_shift: usize,
    pub second_weekday: usize,
    pub cost: i64,
}

/// Across the horizon: `first_shift` on `d + first_day_offset` should be
/// followed by `next_shift` on `d + next_day_offset`. Cost 0 is hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTransition {
    pub first_shift: usize,
    pub first_day_offset: usize,
    pub next_shift: usize,
    pub next_day_offset: usize,
    pub cost: i64,
}

/// Employees whose counts on `shifts` should stay level. An empty `shifts`
/// list means every shift flagged `equal_function`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EqualFunctionGroup {
    pub name: String,
    #[serde(default)]
    pub shifts: Vec<usize>,
    pub employees: Vec<usize>,
}

/// Hard and soft limits with linear penalty coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftBounds {
    pub hard_min: usize,
    pub soft_min: usize,
    pub min_cost: i64,
    pub soft_max: usize,
    pub hard_max: usize,
    pub max_cost: i64,
}

impl SoftBounds {
    /// Hard limits only.
    pub fn hard(min: usize, max: usize) -> Self {
        Self {
            hard_min: min,
            soft_min: min,
            min_cost: 0,
            soft_max: max,
            hard_max: max,
            max_cost: 0,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.hard_min <= self.soft_min
            && self.soft_min <= self.soft_max
            && self.soft_max <= self.hard_max
            && self.min_cost >= 0
            && self.max_cost >= 0
    }
}

/// Run-length limits on one shift type, applied to every employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRule {
    pub shift: usize,
    #[serde(flatten)]
    pub bounds: SoftBounds,
}

/// Everything needed to assemble one scheduling model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingRequest {
    #[serde(default)]
    pub name: String,
    pub employees: Vec<Employee>,
    pub shift_types: Vec<ShiftType>,
    pub start_date: NaiveDate,
    pub num_days: usize,
    #[serde(default)]
    pub offset: usize,
    /// `cover_demand[d][s]`; column 0 (off) is ignored.
    pub cover_demand: Vec<Vec<u32>>,
    /// Full-time hours for the live period.
    pub norm_hours: f64,
    #[serde(default)]
    pub fixed_assignments: Vec<FixedAssignment>,
    #[serde(default)]
    pub history: Vec<HistoryAssignment>,
    #[serde(default)]
    pub requests: Vec<ShiftRequest>,
    #[serde(default)]
    pub skills: Vec<SkillFlag>,
    #[serde(default)]
    pub day_transitions: Vec<DayTransition>,
    #[serde(default)]
    pub shift_transitions: Vec<ShiftTransition>,
    #[serde(default)]
    pub equal_function_groups: Vec<EqualFunctionGroup>,
    #[serde(default)]
    pub sequence_rules: Vec<SequenceRule>,
    #[serde(default)]
    pub time_budget_secs: Option<f64>,
}

impl SchedulingRequest {
    pub fn from_json_str(s: &str) -> ScheduleResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ScheduleResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ScheduleError::InvalidRequest(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn num_employees(&self) -> usize {
        self.employees.len()
    }

    /// Index of the synthetic dummy employee.
    pub fn dummy(&self) -> usize {
        self.employees.len()
    }

    pub fn num_shift_types(&self) -> usize {
        self.shift_types.len()
    }

    pub fn num_weeks(&self) -> usize {
        self.num_days.div_ceil(7)
    }

    pub fn is_live(&self, day: usize) -> bool {
        day >= self.offset
    }

    pub fn live_days(&self) -> std::ops::Range<usize> {
        self.offset..self.num_days
    }

    pub fn weekday(&self, day: usize) -> usize {
        day % 7
    }

    pub fn date(&self, day: usize) -> NaiveDate {
        self.start_date + Duration::days(day as i64)
    }

    pub fn demand(&self, day: usize, shift: usize) -> u32 {
        if shift == OFF_SHIFT {
            return 0;
        }
        self.cover_demand[day][shift]
    }

    pub fn working_shifts(&self) -> std::ops::Range<usize> {
        1..self.shift_types.len()
    }

    pub fn night_shifts(&self) -> Vec<usize> {
        self.working_shifts()
            .filter(|&s| self.shift_types[s].night)
            .collect()
    }

    pub fn equal_function_shifts(&self) -> Vec<usize> {
        self.working_shifts()
            .filter(|&s| self.shift_types[s].equal_function)
            .collect()
    }

    pub fn is_eligible(&self, employee: usize, shift: usize) -> bool {
        // the last flag given for a pair wins
        self.skills
            .iter()
            .rev()
            .find(|k| k.employee == employee && k.shift == shift)
            .map_or(true, |k| k.eligible)
    }

    pub fn is_fixed(&self, employee: usize, shift: usize, day: usize) -> bool {
        self.fixed_assignments
            .iter()
            .any(|f| f.employee == employee && f.shift == shift && f.day == day)
    }

    /// Checks shape and every index reference; fails fast on the first problem.
    pub fn validate(&self) -> ScheduleResult<()> {
        let invalid = |msg: String| Err(ScheduleError::InvalidRequest(msg));

        if self.shift_types.is_empty() {
            return invalid("at least the off shift type is required".into());
        }
        let off = &self.shift_types[OFF_SHIFT];
        if off.window.is_some() || off.night {
            return invalid(format!(
                "shift type 0 (`{}`) is reserved for off and cannot have a window or be night",
                off.name
            ));
        }
        for (s, shift) in self.shift_types.iter().enumerate() {
            if !shift.duration_hours.is_finite() || shift.duration_hours < 0.0 {
                return invalid(format!("shift type {s} has invalid duration"));
            }
        }
        if self.num_days == 0 {
            return invalid("horizon must contain at least one day".into());
        }
        if self.offset >= self.num_days {
            return invalid(format!(
                "offset {} leaves no live day in a {}-day horizon",
                self.offset, self.num_days
            ));
        }
        if self.start_date.weekday() != Weekday::Mon {
            return invalid(format!("start date {} is not a Monday", self.start_date));
        }
        if self.cover_demand.len() != self.num_days {
            return invalid(format!(
                "cover demand has {} rows, expected {}",
                self.cover_demand.len(),
                self.num_days
            ));
        }
        if let Some((d, row)) = self
            .cover_demand
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.num_shift_types())
        {
            return invalid(format!(
                "cover demand row {d} has {} columns, expected {}",
                row.len(),
                self.num_shift_types()
            ));
        }
        if !self.norm_hours.is_finite() || self.norm_hours < 0.0 {
            return invalid("norm hours must be a non-negative number".into());
        }
        for e in &self.employees {
            if let Some(h) = e.contract_hours {
                if !h.is_finite() || h <= 0.0 {
                    return invalid(format!("employee `{}` has invalid contract hours", e.name));
                }
            }
        }
        if let Some(budget) = self.time_budget_secs {
            if !budget.is_finite() || budget <= 0.0 {
                return invalid("time budget must be positive".into());
            }
        }

        for f in &self.fixed_assignments {
            self.check_cell(f.employee, f.shift, f.day, "fixed assignment")?;
        }
        for h in &self.history {
            self.check_cell(h.employee, h.shift, h.day, "history")?;
            if self.is_live(h.day) {
                return Err(ScheduleError::reference(
                    ReferenceKind::Day,
                    h.day,
                    self.offset,
                    "history",
                ));
            }
        }
        for r in &self.requests {
            self.check_cell(r.employee, r.shift, r.day, "request")?;
            if r.weight < 0 {
                return invalid(format!(
                    "request of employee {} for shift {} on day {} has negative weight {}",
                    r.employee, r.shift, r.day, r.weight
                ));
            }
        }
        for k in &self.skills {
            self.check_employee(k.employee, "skill")?;
            self.check_shift(k.shift, "skill")?;
        }
        for t in &self.day_transitions {
            self.check_shift(t.first_shift, "day transition")?;
            self.check_shift(t.second_shift, "day transition")?;
            check(ReferenceKind::Weekday, t.first_weekday, 7, "day transition")?;
            check(ReferenceKind::Weekday, t.second_weekday, 7, "day transition")?;
            if t.cost < 0 {
                return invalid("day transition cost must not be negative".into());
            }
        }
        for t in &self.shift_transitions {
            self.check_shift(t.first_shift, "shift transition")?;
            self.check_shift(t.next_shift, "shift transition")?;
            check(ReferenceKind::Day, t.first_day_offset, self.num_days, "shift transition")?;
            check(ReferenceKind::Day, t.next_day_offset, self.num_days, "shift transition")?;
            if t.cost < 0 {
                return invalid("shift transition cost must not be negative".into());
            }
        }
        for g in &self.equal_function_groups {
            let context = format!("equal-function group `{}`", g.name);
            for &s in &g.shifts {
                self.check_shift(s, &context)?;
            }
            for &e in &g.employees {
                self.check_employee(e, &context)?;
            }
        }
        for rule in &self.sequence_rules {
            self.check_shift(rule.shift, "sequence rule")?;
            if !rule.bounds.is_ordered() {
                return invalid(format!(
                    "sequence rule on shift {} needs hard_min <= soft_min <= soft_max <= hard_max",
                    rule.shift
                ));
            }
        }
        Ok(())
    }

    fn check_employee(&self, employee: usize, context: &str) -> ScheduleResult<()> {
        check(ReferenceKind::Employee, employee, self.num_employees(), context)
    }

    fn check_shift(&self, shift: usize, context: &str) -> ScheduleResult<()> {
        check(ReferenceKind::Shift, shift, self.num_shift_types(), context)
    }

    fn check_cell(
        &self,
        employee: usize,
        shift: usize,
        day: usize,
        context: &str,
    ) -> ScheduleResult<()> {
        self.check_employee(employee, context)?;
        self.check_shift(shift, context)?;
        check(ReferenceKind::Day, day, self.num_days, context)
    }
}

fn check(kind: ReferenceKind, index: usize, bound: usize, context: &str) -> ScheduleResult<()> {
    if index < bound {
        Ok(())
    } else {
        Err(ScheduleError::reference(kind, index, bound, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::new(
            TimeOfDay::try_from(start.to_string()).unwrap(),
            TimeOfDay::try_from(end.to_string()).unwrap(),
        )
    }

    #[test]
    fn parses_clock_times() {
        assert_eq!(TimeOfDay::try_from("07:30".to_string()).unwrap().minutes(), 450);
        assert!(TimeOfDay::try_from("24:00".to_string()).is_err());
        assert!(TimeOfDay::try_from("0730".to_string()).is_err());
    }

    #[test]
    fn disjoint_day_windows_do_not_overlap() {
        assert!(!window("07:00", "15:00").overlaps(&window("15:00", "23:00")));
        assert!(window("07:00", "15:00").overlaps(&window("14:00", "22:00")));
    }

    #[test]
    fn wrapping_windows_overlap_across_midnight() {
        let night = window("23:00", "07:00");
        assert!(night.overlaps(&window("22:00", "23:30")));
        assert!(night.overlaps(&window("06:00", "08:00")));
        assert!(!night.overlaps(&window("08:00", "16:00")));
        assert!(night.overlaps(&window("22:00", "06:00")));
    }

    fn week(requests: serde_json::Value) -> SchedulingRequest {
        serde_json::from_value(serde_json::json!({
            "employees": [{"name": "a"}],
            "shift_types": [{"name": "off"}, {"name": "day", "duration_hours": 8.0}],
            "start_date": "2024-01-01",
            "num_days": 7,
            "cover_demand": [[0, 1], [0, 1], [0, 1], [0, 1], [0, 1], [0, 1], [0, 1]],
            "norm_hours": 40.0,
            "requests": requests
        }))
        .unwrap()
    }

    #[test]
    fn request_weights_must_not_be_negative() {
        let ok = week(serde_json::json!([
            {"employee": 0, "shift": 1, "day": 2, "weight": 0},
            {"employee": 0, "shift": 0, "day": 3, "weight": 5}
        ]));
        assert!(ok.validate().is_ok());

        let negative = week(serde_json::json!([{"employee": 0, "shift": 1, "day": 2, "weight": -4}]));
        assert!(matches!(negative.validate(), Err(ScheduleError::InvalidRequest(_))));
    }

    #[test]
    fn overlap_allowed_only_when_both_flagged() {
        let mut a = ShiftType::timed("a", window("07:00", "15:00"), 8.0);
        let mut b = ShiftType::timed("b", window("12:00", "20:00"), 8.0);
        a.allow_overlap = true;
        assert!(a.clashes_with(&b));
        b.allow_overlap = true;
        assert!(!a.clashes_with(&b));
    }
}
