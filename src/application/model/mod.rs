// Model assembly: the work cube, soft-bound primitives and rule families

pub mod assembler;
pub mod cube;
pub mod fairness;
pub mod forced;
pub mod primitives;
pub mod transitions;

pub use assembler::assemble;
pub use cube::WorkCube;
pub use primitives::{add_soft_sequence_constraint, add_soft_sum_constraint};

use tracing::debug;

use crate::domain::{LinearExpr, OptimizationProblem, SchedulingRequest, VarId};

/// One objective term with a diagnostic label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyTerm {
    pub var: VarId,
    pub coefficient: i64,
    pub label: String,
}

impl PenaltyTerm {
    pub fn new(var: VarId, coefficient: i64, label: impl Into<String>) -> Self {
        Self {
            var,
            coefficient,
            label: label.into(),
        }
    }
}

/// Owns the model under construction and both objective collections.
///
/// Every rule family takes the builder by `&mut` and appends to it; nothing
/// is shared between requests.
#[derive(Debug)]
pub struct ModelBuilder {
    pub problem: OptimizationProblem,
    pub cube: WorkCube,
    /// "This event happened" terms over Boolean indicators.
    pub bool_terms: Vec<PenaltyTerm>,
    /// "By how much" terms over integer excess variables.
    pub int_terms: Vec<PenaltyTerm>,
    rows_at_checkpoint: usize,
    vars_at_checkpoint: usize,
}

impl ModelBuilder {
    /// Allocates the work cube for every real employee plus the dummy.
    pub fn new(request: &SchedulingRequest) -> Self {
        let mut problem = OptimizationProblem::new(request.name.clone());
        let cube = WorkCube::allocate(
            &mut problem,
            request.num_employees() + 1,
            request.num_shift_types(),
            request.num_days,
        );
        let vars = problem.num_variables();
        Self {
            problem,
            cube,
            bool_terms: Vec::new(),
            int_terms: Vec::new(),
            rows_at_checkpoint: 0,
            vars_at_checkpoint: vars,
        }
    }

    pub fn penalize_bool(&mut self, var: VarId, coefficient: i64, label: impl Into<String>) {
        if coefficient != 0 {
            self.bool_terms.push(PenaltyTerm::new(var, coefficient, label));
        }
    }

    pub fn penalize_int(&mut self, var: VarId, coefficient: i64, label: impl Into<String>) {
        if coefficient != 0 {
            self.int_terms.push(PenaltyTerm::new(var, coefficient, label));
        }
    }

    /// Integer variable equal to `expr`, with its domain taken from the bounds.
    pub fn int_equal_to(&mut self, expr: LinearExpr, label: impl Into<String>) -> VarId {
        let label = label.into();
        let (lo, hi) = self.problem.bounds(&expr);
        let var = self.problem.new_int(lo, hi, label.clone());
        self.problem
            .add_eq(LinearExpr::from(var).minus(&expr), 0, label);
        var
    }

    /// Logs what the rule family emitted since the previous checkpoint.
    pub fn checkpoint(&mut self, rule: &str) {
        let rows = self.problem.constraints.len();
        let vars = self.problem.num_variables();
        debug!(
            rule,
            rows = rows - self.rows_at_checkpoint,
            variables = vars - self.vars_at_checkpoint,
            "rule emitted"
        );
        self.rows_at_checkpoint = rows;
        self.vars_at_checkpoint = vars;
    }

    /// Sets the objective from both term collections.
    pub fn finish(mut self) -> AssembledModel {
        let objective = LinearExpr::weighted_sum(
            self.bool_terms
                .iter()
                .chain(&self.int_terms)
                .map(|t| (t.var, t.coefficient)),
        );
        self.problem.set_objective(objective);
        AssembledModel {
            problem: self.problem,
            cube: self.cube,
            bool_terms: self.bool_terms,
            int_terms: self.int_terms,
        }
    }
}

/// A complete model ready to hand to a solver
#[derive(Debug, Clone)]
pub struct AssembledModel {
    pub problem: OptimizationProblem,
    pub cube: WorkCube,
    pub bool_terms: Vec<PenaltyTerm>,
    pub int_terms: Vec<PenaltyTerm>,
}

impl AssembledModel {
    pub fn num_penalty_terms(&self) -> usize {
        self.bool_terms.len() + self.int_terms.len()
    }
}
