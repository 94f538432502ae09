// Decoded schedule: the canonical output handed to front ends

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::value_objects::SolutionStatus;

/// One (shift, employee) pair worked on a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub shift: usize,
    pub shift_name: String,
    pub employee: usize,
    pub employee_name: String,
}

/// Everything worked and everyone off on one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRoster {
    pub day: usize,
    pub date: NaiveDate,
    pub weekday: usize,
    /// False for carry-over days before the offset.
    pub live: bool,
    pub assignments: Vec<ShiftAssignment>,
    pub off: Vec<usize>,
}

/// One employee's shifts, day by day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSchedule {
    pub employee: usize,
    pub name: String,
    pub dummy: bool,
    /// `shifts[d]` lists the shift types worked on day `d`, ascending.
    pub shifts: Vec<Vec<usize>>,
    /// Shift names over the live days, space separated.
    pub line: String,
}

impl EmployeeSchedule {
    pub fn works(&self, shift: usize, day: usize) -> bool {
        self.shifts[day].contains(&shift)
    }
}

/// A soft-constraint indicator that ended up true
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorPenalty {
    pub label: String,
    /// Negative coefficients are rewards.
    pub coefficient: i64,
}

/// An integer excess variable with a positive value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcessPenalty {
    pub label: String,
    pub value: i64,
    pub coefficient: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PenaltyReport {
    pub indicators: Vec<IndicatorPenalty>,
    pub excesses: Vec<ExcessPenalty>,
    pub total: i64,
}

impl PenaltyReport {
    pub fn excess(&self, label: &str) -> Option<&ExcessPenalty> {
        self.excesses.iter().find(|p| p.label == label)
    }
}

/// Complete decoded result of one scheduling request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub status: SolutionStatus,
    pub objective_value: i64,
    pub days: Vec<DayRoster>,
    /// Real employees in request order, then the dummy.
    pub employees: Vec<EmployeeSchedule>,
    pub penalties: PenaltyReport,
}

impl Schedule {
    pub fn dummy(&self) -> Option<&EmployeeSchedule> {
        self.employees.iter().find(|e| e.dummy)
    }

    /// Non-off shifts the dummy covers on live days.
    pub fn dummy_shift_count(&self) -> usize {
        self.days
            .iter()
            .filter(|d| d.live)
            .flat_map(|d| &d.assignments)
            .filter(|a| self.employees[a.employee].dummy)
            .count()
    }

    pub fn headcount(&self, shift: usize, day: usize) -> usize {
        self.days[day]
            .assignments
            .iter()
            .filter(|a| a.shift == shift)
            .count()
    }
}
