// Domain layer: integer model, solver contract and scheduling entities
pub mod domain;

// Planner configuration (TOML)
pub mod config;

// Application layer: model assembly, decoding and the planner use case
pub mod application;

// Infrastructure layer: logging and the batch runner
pub mod infrastructure;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    Constraint, ConstraintType, LinearExpr, Literal, ObjectiveFunction, OptimizationProblem,
    Schedule, ScheduleError, ScheduleResult, SchedulingRequest, Solution, SolutionStatus,
    SolverBackend, SolverError, SolverService, VarId, Variable, VariableType,
};

pub use application::{assemble, decode, verify_schedule, AssembledModel, Planner};
pub use config::PlannerConfig;
pub use solver::SolverFactory;
