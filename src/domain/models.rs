use std::time::Duration;

use super::value_objects::{ConstraintType, SolutionStatus, SolverBackend, VariableType};

/// Handle to a variable of an [`OptimizationProblem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    pub(crate) fn from_index(index: usize) -> Self {
        VarId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A Boolean variable or its negation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Pos(VarId),
    Neg(VarId),
}

impl Literal {
    pub fn var(self) -> VarId {
        match self {
            Literal::Pos(v) | Literal::Neg(v) => v,
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Literal::Pos(v) => Literal::Neg(v),
            Literal::Neg(v) => Literal::Pos(v),
        }
    }

    /// Truth value (0/1) under `assignment`.
    pub fn value(self, assignment: &[i64]) -> i64 {
        match self {
            Literal::Pos(v) => assignment[v.0],
            Literal::Neg(v) => 1 - assignment[v.0],
        }
    }
}

impl From<VarId> for Literal {
    fn from(v: VarId) -> Self {
        Literal::Pos(v)
    }
}

/// Decision variable in the model
#[derive(Debug, Clone)]
pub struct Variable {
    pub variable_type: VariableType,
    pub lower_bound: i64,
    pub upper_bound: i64,
    /// Diagnostic label only; never interpreted.
    pub name: String,
}

impl Variable {
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Binary,
            lower_bound: 0,
            upper_bound: 1,
            name: name.into(),
        }
    }

    pub fn integer(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            variable_type: VariableType::Integer,
            lower_bound: lower,
            upper_bound: upper,
            name: name.into(),
        }
    }

    pub fn is_binary(&self) -> bool {
        self.variable_type == VariableType::Binary
    }
}

/// Integer linear expression `Σ c·x + constant`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Sum of `vars`, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self::weighted_sum(vars.into_iter().map(|v| (v, 1)))
    }

    pub fn weighted_sum(terms: impl IntoIterator<Item = (VarId, i64)>) -> Self {
        let mut expr = Self::new();
        for (v, c) in terms {
            expr.add_term(v, c);
        }
        expr
    }

    pub fn with_term(mut self, var: VarId, coeff: i64) -> Self {
        self.add_term(var, coeff);
        self
    }

    pub fn with_constant(mut self, value: i64) -> Self {
        self.constant += value;
        self
    }

    pub fn add_term(&mut self, var: VarId, coeff: i64) {
        if coeff != 0 {
            self.terms.push((var, coeff));
        }
    }

    /// Adds `coeff · lit`, expanding a negated literal to `coeff · (1 − x)`.
    pub fn add_literal(&mut self, lit: Literal, coeff: i64) {
        match lit {
            Literal::Pos(v) => self.add_term(v, coeff),
            Literal::Neg(v) => {
                self.constant += coeff;
                self.add_term(v, -coeff);
            }
        }
    }

    pub fn plus(mut self, other: &LinearExpr) -> Self {
        self.terms.extend_from_slice(&other.terms);
        self.constant += other.constant;
        self
    }

    pub fn minus(mut self, other: &LinearExpr) -> Self {
        self.terms.extend(other.terms.iter().map(|&(v, c)| (v, -c)));
        self.constant -= other.constant;
        self
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn constant_value(&self) -> i64 {
        self.constant
    }

    pub fn evaluate(&self, assignment: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * assignment[v.0])
            .sum::<i64>()
            + self.constant
    }

    fn without_constant(mut self) -> (Self, i64) {
        let constant = self.constant;
        self.constant = 0;
        (self, constant)
    }
}

impl From<VarId> for LinearExpr {
    fn from(v: VarId) -> Self {
        Self::new().with_term(v, 1)
    }
}

impl From<Literal> for LinearExpr {
    fn from(lit: Literal) -> Self {
        let mut expr = Self::new();
        expr.add_literal(lit, 1);
        expr
    }
}

/// Linear constraint `expr <op> bound`; the expression carries no constant.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub expr: LinearExpr,
    pub bound: i64,
    pub name: String,
}

impl Constraint {
    /// Builds the row, moving any constant of `expr` to the right-hand side.
    pub fn new(expr: LinearExpr, constraint_type: ConstraintType, bound: i64) -> Self {
        let (expr, constant) = expr.without_constant();
        Self {
            constraint_type,
            expr,
            bound: bound - constant,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_satisfied(&self, assignment: &[i64]) -> bool {
        self.constraint_type
            .holds(self.expr.evaluate(assignment), self.bound)
    }
}

/// Objective to minimize
#[derive(Debug, Clone, Default)]
pub struct ObjectiveFunction {
    pub expr: LinearExpr,
}

impl ObjectiveFunction {
    pub fn minimize(expr: LinearExpr) -> Self {
        Self { expr }
    }

    /// Dense coefficient vector, duplicate terms merged.
    pub fn coefficients(&self, num_vars: usize) -> Vec<f64> {
        let mut dense = vec![0.0; num_vars];
        for &(v, c) in self.expr.terms() {
            dense[v.0] += c as f64;
        }
        dense
    }
}

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    pub time_limit: Option<Duration>,
    pub workers: usize,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            workers: 1,
            verbose: false,
        }
    }
}

/// Complete integer model: variables, linear rows and a minimized objective.
///
/// Boolean constructs (clauses, implications, reified rows, min/max
/// equalities) are lowered to linear rows as they are added, so every
/// backend only ever sees `Σ c·x <op> b` over bounded integer variables.
#[derive(Debug, Clone, Default)]
pub struct OptimizationProblem {
    pub name: String,
    pub objective: ObjectiveFunction,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Variable>,
    pub solver_config: SolverConfig,
}

impl OptimizationProblem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_variable(&mut self, variable: Variable) -> VarId {
        self.variables.push(variable);
        VarId(self.variables.len() - 1)
    }

    pub fn new_bool(&mut self, name: impl Into<String>) -> VarId {
        self.add_variable(Variable::binary(name))
    }

    pub fn new_int(&mut self, lower: i64, upper: i64, name: impl Into<String>) -> VarId {
        self.add_variable(Variable::integer(name, lower, upper))
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn set_objective(&mut self, expr: LinearExpr) {
        self.objective = ObjectiveFunction::minimize(expr);
    }

    /// Smallest and largest value `expr` can take within variable bounds.
    pub fn bounds(&self, expr: &LinearExpr) -> (i64, i64) {
        let mut lo = expr.constant_value();
        let mut hi = expr.constant_value();
        for &(v, c) in expr.terms() {
            let var = &self.variables[v.0];
            if c >= 0 {
                lo += c * var.lower_bound;
                hi += c * var.upper_bound;
            } else {
                lo += c * var.upper_bound;
                hi += c * var.lower_bound;
            }
        }
        (lo, hi)
    }

    pub fn add_constraint(
        &mut self,
        expr: LinearExpr,
        constraint_type: ConstraintType,
        bound: i64,
        name: impl Into<String>,
    ) {
        self.constraints
            .push(Constraint::new(expr, constraint_type, bound).with_name(name));
    }

    pub fn add_eq(&mut self, expr: LinearExpr, bound: i64, name: impl Into<String>) {
        self.add_constraint(expr, ConstraintType::Equal, bound, name);
    }

    pub fn add_le(&mut self, expr: LinearExpr, bound: i64, name: impl Into<String>) {
        self.add_constraint(expr, ConstraintType::LessThanOrEqual, bound, name);
    }

    pub fn add_ge(&mut self, expr: LinearExpr, bound: i64, name: impl Into<String>) {
        self.add_constraint(expr, ConstraintType::GreaterThanOrEqual, bound, name);
    }

    /// At least one of `literals` is true.
    pub fn add_bool_or(&mut self, literals: &[Literal], name: impl Into<String>) {
        let mut expr = LinearExpr::new();
        for &lit in literals {
            expr.add_literal(lit, 1);
        }
        self.add_ge(expr, 1, name);
    }

    /// `premise ⇒ conclusion`.
    pub fn add_implication(
        &mut self,
        premise: Literal,
        conclusion: Literal,
        name: impl Into<String>,
    ) {
        self.add_bool_or(&[premise.negate(), conclusion], name);
    }

    /// `expr <op> bound` must hold whenever `enforce` is true.
    ///
    /// Big-M reification with M taken from the variable bounds; nothing is
    /// emitted when the row already holds over the whole domain.
    pub fn add_linear_if(
        &mut self,
        expr: LinearExpr,
        constraint_type: ConstraintType,
        bound: i64,
        enforce: Literal,
        name: impl Into<String>,
    ) {
        let name = name.into();
        let (lo, hi) = self.bounds(&expr);
        if matches!(
            constraint_type,
            ConstraintType::LessThanOrEqual | ConstraintType::Equal
        ) {
            let big_m = hi - bound;
            if big_m > 0 {
                // expr ≤ bound + M·(1 − enforce)
                let mut row = expr.clone();
                row.add_literal(enforce, big_m);
                self.add_le(row, bound + big_m, name.clone());
            }
        }
        if matches!(
            constraint_type,
            ConstraintType::GreaterThanOrEqual | ConstraintType::Equal
        ) {
            let big_m = bound - lo;
            if big_m > 0 {
                // expr ≥ bound − M·(1 − enforce)
                let mut row = expr;
                row.add_literal(enforce, -big_m);
                self.add_ge(row, bound - big_m, name);
            }
        }
    }

    /// `target == max(exprs)`, exact.
    pub fn add_max_equality(
        &mut self,
        target: VarId,
        exprs: &[LinearExpr],
        name: impl Into<String>,
    ) {
        self.add_extremum_equality(target, exprs, true, name.into());
    }

    /// `target == min(exprs)`, exact.
    pub fn add_min_equality(
        &mut self,
        target: VarId,
        exprs: &[LinearExpr],
        name: impl Into<String>,
    ) {
        self.add_extremum_equality(target, exprs, false, name.into());
    }

    fn add_extremum_equality(
        &mut self,
        target: VarId,
        exprs: &[LinearExpr],
        max: bool,
        name: String,
    ) {
        let (outer, inner) = if max {
            (ConstraintType::GreaterThanOrEqual, ConstraintType::LessThanOrEqual)
        } else {
            (ConstraintType::LessThanOrEqual, ConstraintType::GreaterThanOrEqual)
        };
        if let [only] = exprs {
            self.add_eq(LinearExpr::from(target).minus(only), 0, name);
            return;
        }
        let mut selectors = LinearExpr::new();
        for (i, expr) in exprs.iter().enumerate() {
            let diff = LinearExpr::from(target).minus(expr);
            self.add_constraint(diff.clone(), outer, 0, format!("{name}: bound[{i}]"));
            let selector = self.new_bool(format!("{name}: select[{i}]"));
            selectors.add_term(selector, 1);
            let label = format!("{name}: tight[{i}]");
            self.add_linear_if(diff, inner, 0, Literal::Pos(selector), label);
        }
        self.add_eq(selectors, 1, format!("{name}: one_selected"));
    }

    /// `indicator ⇔ expr ≥ 1` for an expression that is never negative.
    pub fn add_positive_indicator(
        &mut self,
        indicator: VarId,
        expr: LinearExpr,
        name: impl Into<String>,
    ) {
        let name = name.into();
        self.add_linear_if(
            expr.clone(),
            ConstraintType::GreaterThanOrEqual,
            1,
            Literal::Pos(indicator),
            format!("{name}: on"),
        );
        self.add_linear_if(
            expr,
            ConstraintType::LessThanOrEqual,
            0,
            Literal::Neg(indicator),
            format!("{name}: off"),
        );
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_binary_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_binary()).count()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.num_variables() - self.num_binary_variables()
    }

    /// Indices of rows violated by `assignment`, plus rows of out-of-bound variables
    /// reported through [`OptimizationProblem::out_of_bounds`].
    pub fn violated_constraints(&self, assignment: &[i64]) -> Vec<usize> {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_satisfied(assignment))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn out_of_bounds(&self, assignment: &[i64]) -> Vec<VarId> {
        self.variables
            .iter()
            .zip(assignment)
            .enumerate()
            .filter(|(_, (var, &value))| value < var.lower_bound || value > var.upper_bound)
            .map(|(i, _)| VarId(i))
            .collect()
    }

    /// Whether `assignment` covers every variable and satisfies every bound and row.
    pub fn is_feasible(&self, assignment: &[i64]) -> bool {
        assignment.len() == self.variables.len()
            && self.out_of_bounds(assignment).is_empty()
            && self.violated_constraints(assignment).is_empty()
    }

    pub fn objective_value(&self, assignment: &[i64]) -> i64 {
        self.objective.expr.evaluate(assignment)
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_integer_vars: u32,
    pub num_binary_vars: u32,
}

impl SolverStatistics {
    pub fn for_problem(problem: &OptimizationProblem, solve_time_ms: f64) -> Self {
        Self {
            solve_time_ms,
            num_variables: problem.num_variables() as u32,
            num_constraints: problem.constraints.len() as u32,
            num_integer_vars: problem.num_integer_variables() as u32,
            num_binary_vars: problem.num_binary_variables() as u32,
        }
    }
}

/// Solver response: a status and, when feasible, one value per variable
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub objective_value: Option<i64>,
    pub variable_values: Vec<i64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            objective_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_assignment(
        status: SolutionStatus,
        objective_value: i64,
        variable_values: Vec<i64>,
    ) -> Self {
        Self {
            status,
            objective_value: Some(objective_value),
            variable_values,
            message: format!("{status} solution found"),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_feasible(&self) -> bool {
        self.status.has_assignment()
    }
}
