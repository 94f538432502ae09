// Translation of the integer model into good_lp's types
// Shared by every backend reached through good_lp.

use good_lp::{
    variable, Constraint as GoodLpConstraint, Expression, ProblemVariables,
    Variable as GoodLpVariable,
};

use crate::domain::{ConstraintType, LinearExpr, OptimizationProblem};

pub(crate) struct GoodLpModel {
    pub vars: ProblemVariables,
    pub columns: Vec<GoodLpVariable>,
    pub objective: Expression,
    pub rows: Vec<GoodLpConstraint>,
}

pub(crate) fn translate(problem: &OptimizationProblem) -> GoodLpModel {
    let mut vars = ProblemVariables::new();
    let columns: Vec<GoodLpVariable> = problem
        .variables
        .iter()
        .map(|v| {
            vars.add(
                variable()
                    .integer()
                    .min(v.lower_bound as f64)
                    .max(v.upper_bound as f64),
            )
        })
        .collect();

    let objective = expression(&problem.objective.expr, &columns);

    let rows = problem
        .constraints
        .iter()
        .map(|c| {
            let lhs = expression(&c.expr, &columns);
            let bound = c.bound as f64;
            match c.constraint_type {
                ConstraintType::LessThanOrEqual => lhs.leq(bound),
                ConstraintType::Equal => lhs.eq(bound),
                ConstraintType::GreaterThanOrEqual => lhs.geq(bound),
            }
        })
        .collect();

    GoodLpModel {
        vars,
        columns,
        objective,
        rows,
    }
}

fn expression(expr: &LinearExpr, columns: &[GoodLpVariable]) -> Expression {
    let mut out: Expression = 0.into();
    for &(v, c) in expr.terms() {
        out += (c as f64) * columns[v.index()];
    }
    out
}
