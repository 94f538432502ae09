// Domain module: integer model, solver contract and scheduling entities

pub mod error;
pub mod models;
pub mod schedule;
pub mod shifts;
pub mod solver_service;
pub mod value_objects;

pub use error::*;
pub use models::*;
pub use schedule::*;
pub use shifts::*;
pub use solver_service::*;
pub use value_objects::*;
