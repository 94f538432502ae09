use crate::domain::{Literal, OptimizationProblem, VarId};

/// The `work[e, s, d]` Boolean cube, allocated as one contiguous block of
/// problem variables and addressed through a single linear index.
#[derive(Debug, Clone)]
pub struct WorkCube {
    employees: usize,
    shifts: usize,
    days: usize,
    base: usize,
}

impl WorkCube {
    /// Allocates `employees × shifts × days` binaries; `employees` includes the dummy.
    pub fn allocate(
        problem: &mut OptimizationProblem,
        employees: usize,
        shifts: usize,
        days: usize,
    ) -> Self {
        let base = problem.num_variables();
        for e in 0..employees {
            for s in 0..shifts {
                for d in 0..days {
                    problem.new_bool(format!("work[{e},{s},{d}]"));
                }
            }
        }
        Self {
            employees,
            shifts,
            days,
            base,
        }
    }

    fn index(&self, employee: usize, shift: usize, day: usize) -> usize {
        debug_assert!(employee < self.employees && shift < self.shifts && day < self.days);
        (employee * self.shifts + shift) * self.days + day
    }

    pub fn var(&self, employee: usize, shift: usize, day: usize) -> VarId {
        VarId::from_index(self.base + self.index(employee, shift, day))
    }

    pub fn lit(&self, employee: usize, shift: usize, day: usize) -> Literal {
        Literal::Pos(self.var(employee, shift, day))
    }

    /// Every shift variable of one employee on one day.
    pub fn day_vars(&self, employee: usize, day: usize) -> impl Iterator<Item = VarId> + '_ {
        (0..self.shifts).map(move |s| self.var(employee, s, day))
    }

    /// One employee's variables for one shift, day by day.
    pub fn shift_vars(&self, employee: usize, shift: usize) -> Vec<VarId> {
        (0..self.days).map(|d| self.var(employee, shift, d)).collect()
    }

    pub fn is_set(&self, assignment: &[i64], employee: usize, shift: usize, day: usize) -> bool {
        assignment[self.var(employee, shift, day).index()] != 0
    }
}
