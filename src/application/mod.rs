// Application layer: the scheduling use case
// Model assembly, decoding, verification and the planner that runs them in order.

pub mod decoder;
pub mod model;
pub mod planner;
pub mod verify;

pub use decoder::{decode, penalty_report};
pub use model::{assemble, AssembledModel, ModelBuilder, PenaltyTerm, WorkCube};
pub use planner::Planner;
pub use verify::{verify_schedule, HardRule, Violation};
