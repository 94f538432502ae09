//! Soft-bound primitives.
//!
//! The two general-purpose encodings every soft rule is built from: a
//! bounded run length over a Boolean sequence and a bounded total over a
//! Boolean set. Both return the objective terms they create; the caller
//! decides which collection they belong to.

use crate::domain::{Literal, LinearExpr, OptimizationProblem, SoftBounds, VarId};

use super::PenaltyTerm;

/// Literals forcing `works[start..start+length]` to be a maximal run of true.
///
/// The run itself must hold and both neighbours (where they exist) must be
/// false; the clause built from the negation of these literals rules the
/// run out.
fn negated_bounded_span(works: &[VarId], start: usize, length: usize) -> Vec<Literal> {
    let mut span = Vec::with_capacity(length + 2);
    if start > 0 {
        span.push(Literal::Pos(works[start - 1]));
    }
    for &v in &works[start..start + length] {
        span.push(Literal::Neg(v));
    }
    if start + length < works.len() {
        span.push(Literal::Pos(works[start + length]));
    }
    span
}

/// Bounded-run-length constraint over `works`.
///
/// Maximal runs of true shorter than `hard_min` or longer than `hard_max`
/// are forbidden. Runs between a hard and a soft bound each get their own
/// indicator, which the clause can only force to true when that exact run
/// occurs; its coefficient grows with the distance to the soft bound.
pub fn add_soft_sequence_constraint(
    problem: &mut OptimizationProblem,
    works: &[VarId],
    bounds: &SoftBounds,
    prefix: &str,
) -> Vec<PenaltyTerm> {
    let n = works.len();
    let mut penalties = Vec::new();

    for length in 1..bounds.hard_min.min(n + 1) {
        for start in 0..=n - length {
            let span = negated_bounded_span(works, start, length);
            problem.add_bool_or(&span, format!("{prefix}: short_run[{start},{length}]"));
        }
    }

    if bounds.min_cost > 0 {
        for length in bounds.hard_min.max(1)..bounds.soft_min.min(n + 1) {
            for start in 0..=n - length {
                let label = format!("{prefix}: under_span[{start},{length}]");
                let indicator = problem.new_bool(label.clone());
                let mut span = negated_bounded_span(works, start, length);
                span.push(Literal::Pos(indicator));
                problem.add_bool_or(&span, label.clone());
                penalties.push(PenaltyTerm::new(
                    indicator,
                    bounds.min_cost * (bounds.soft_min - length) as i64,
                    label,
                ));
            }
        }
    }

    if bounds.max_cost > 0 {
        for length in bounds.soft_max + 1..=bounds.hard_max.min(n) {
            for start in 0..=n - length {
                let label = format!("{prefix}: over_span[{start},{length}]");
                let indicator = problem.new_bool(label.clone());
                let mut span = negated_bounded_span(works, start, length);
                span.push(Literal::Pos(indicator));
                problem.add_bool_or(&span, label.clone());
                penalties.push(PenaltyTerm::new(
                    indicator,
                    bounds.max_cost * (length - bounds.soft_max) as i64,
                    label,
                ));
            }
        }
    }

    // any hard_max + 1 consecutive trues
    if bounds.hard_max < n {
        for start in 0..n - bounds.hard_max {
            let window: Vec<Literal> = works[start..=start + bounds.hard_max]
                .iter()
                .map(|&v| Literal::Neg(v))
                .collect();
            problem.add_bool_or(&window, format!("{prefix}: long_run[{start}]"));
        }
    }

    penalties
}

/// Bounded-total constraint over `works`.
///
/// The sum is an integer variable in `[hard_min, hard_max]`; each active
/// soft bound adds an excess variable equal to the distance past it.
pub fn add_soft_sum_constraint(
    problem: &mut OptimizationProblem,
    works: &[VarId],
    bounds: &SoftBounds,
    prefix: &str,
) -> Vec<PenaltyTerm> {
    let mut penalties = Vec::new();
    let hard_min = bounds.hard_min as i64;
    let hard_max = bounds.hard_max as i64;

    let sum = problem.new_int(hard_min, hard_max, format!("{prefix}: sum"));
    problem.add_eq(
        LinearExpr::from(sum).minus(&LinearExpr::sum(works.iter().copied())),
        0,
        format!("{prefix}: sum"),
    );

    if bounds.soft_min > bounds.hard_min && bounds.min_cost > 0 {
        let soft_min = bounds.soft_min as i64;
        let label = format!("{prefix}: under_sum");
        let excess = problem.new_int(0, soft_min - hard_min, label.clone());
        let delta = LinearExpr::constant(soft_min).minus(&LinearExpr::from(sum));
        problem.add_max_equality(excess, &[delta, LinearExpr::constant(0)], label.clone());
        penalties.push(PenaltyTerm::new(excess, bounds.min_cost, label));
    }

    if bounds.soft_max < bounds.hard_max && bounds.max_cost > 0 {
        let soft_max = bounds.soft_max as i64;
        let label = format!("{prefix}: over_sum");
        let excess = problem.new_int(0, hard_max - soft_max, label.clone());
        let delta = LinearExpr::from(sum).with_constant(-soft_max);
        problem.add_max_equality(excess, &[delta, LinearExpr::constant(0)], label.clone());
        penalties.push(PenaltyTerm::new(excess, bounds.max_cost, label));
    }

    penalties
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every assignment of the variables from `free_from` on, within bounds,
    /// that completes `prefix` into a feasible point.
    fn feasible_completions(problem: &OptimizationProblem, prefix: &[i64]) -> Vec<Vec<i64>> {
        let mut out = Vec::new();
        let mut current = prefix.to_vec();
        extend(problem, &mut current, &mut out);
        out
    }

    fn extend(problem: &OptimizationProblem, current: &mut Vec<i64>, out: &mut Vec<Vec<i64>>) {
        if current.len() == problem.num_variables() {
            if problem.is_feasible(current) {
                out.push(current.clone());
            }
            return;
        }
        let var = &problem.variables[current.len()];
        for value in var.lower_bound..=var.upper_bound {
            current.push(value);
            extend(problem, current, out);
            current.pop();
        }
    }

    fn bools(problem: &mut OptimizationProblem, n: usize) -> Vec<VarId> {
        (0..n).map(|i| problem.new_bool(format!("x{i}"))).collect()
    }

    fn with_runs(n: usize, runs: &[(usize, usize)]) -> Vec<i64> {
        let mut values = vec![0; n];
        for &(start, len) in runs {
            for v in &mut values[start..start + len] {
                *v = 1;
            }
        }
        values
    }

    #[test]
    fn exact_run_length_forbids_every_other_length() {
        let mut problem = OptimizationProblem::new("runs");
        let works = bools(&mut problem, 10);
        let penalties =
            add_soft_sequence_constraint(&mut problem, &works, &SoftBounds::hard(3, 3), "r");
        assert!(penalties.is_empty());
        assert_eq!(problem.num_variables(), 10);

        // runs of 2, 3 and 5
        assert!(!problem.is_feasible(&with_runs(10, &[(0, 2), (3, 3), (7, 3)])));
        assert!(!problem.is_feasible(&with_runs(10, &[(0, 3), (4, 5)])));
        assert!(!problem.is_feasible(&with_runs(10, &[(0, 5)])));
        assert!(!problem.is_feasible(&with_runs(10, &[(8, 2)])));

        assert!(problem.is_feasible(&with_runs(10, &[(0, 3), (4, 3)])));
        assert!(problem.is_feasible(&with_runs(10, &[(7, 3)])));
        assert!(problem.is_feasible(&with_runs(10, &[])));
    }

    #[test]
    fn short_run_indicator_only_fires_for_the_actual_run() {
        let mut problem = OptimizationProblem::new("runs");
        let works = bools(&mut problem, 4);
        let bounds = SoftBounds {
            hard_min: 1,
            soft_min: 3,
            min_cost: 5,
            soft_max: 4,
            hard_max: 4,
            max_cost: 0,
        };
        let penalties = add_soft_sequence_constraint(&mut problem, &works, &bounds, "r");
        // lengths 1 and 2 at every start: 4 + 3 indicators
        assert_eq!(penalties.len(), 7);

        // single run of length 2 at start 1: only that indicator is forced
        let completions = feasible_completions(&problem, &[0, 1, 1, 0]);
        let cheapest = completions
            .iter()
            .map(|values| {
                penalties
                    .iter()
                    .map(|p| p.coefficient * values[p.var.index()])
                    .sum::<i64>()
            })
            .min()
            .unwrap();
        assert_eq!(cheapest, 5);
    }

    #[test]
    fn bounded_total_excess_is_exact() {
        let bounds = SoftBounds {
            hard_min: 2,
            soft_min: 4,
            min_cost: 3,
            soft_max: 6,
            hard_max: 8,
            max_cost: 2,
        };
        for (fixed, expected) in [(3, 3), (7, 2), (5, 0)] {
            let mut problem = OptimizationProblem::new("sum");
            let works = bools(&mut problem, 8);
            let penalties = add_soft_sum_constraint(&mut problem, &works, &bounds, "s");
            assert_eq!(penalties.len(), 2);

            let prefix: Vec<i64> = (0..8).map(|i| i64::from(i < fixed)).collect();
            let completions = feasible_completions(&problem, &prefix);
            assert!(!completions.is_empty());
            for values in completions {
                let contribution: i64 = penalties
                    .iter()
                    .map(|p| p.coefficient * values[p.var.index()])
                    .sum();
                assert_eq!(contribution, expected, "sum fixed to {fixed}");
            }
        }
    }

    #[test]
    fn bounded_total_enforces_hard_range() {
        let mut problem = OptimizationProblem::new("sum");
        let works = bools(&mut problem, 4);
        add_soft_sum_constraint(&mut problem, &works, &SoftBounds::hard(1, 2), "s");
        assert!(feasible_completions(&problem, &[0, 0, 0, 0]).is_empty());
        assert!(feasible_completions(&problem, &[1, 1, 1, 0]).is_empty());
        assert_eq!(feasible_completions(&problem, &[1, 0, 1, 0]).len(), 1);
    }
}
