use std::sync::Arc;

use crate::domain::{
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            SolverBackend::Auto => Self::default_solver(),
            SolverBackend::Microlp => microlp(),
            SolverBackend::CoinCbc => coin_cbc(),
            SolverBackend::Highs => highs(),
        }
    }

    /// The strongest backend compiled in: HiGHS, then CBC, then microlp.
    pub fn default_solver() -> Result<Arc<dyn SolverService>> {
        highs()
            .or_else(|_| coin_cbc())
            .or_else(|_| microlp())
            .map_err(|_| SolverError::SolverNotAvailable("no solver backend compiled in".into()))
    }

    pub fn available_backends() -> Vec<SolverBackend> {
        [SolverBackend::Highs, SolverBackend::CoinCbc, SolverBackend::Microlp]
            .into_iter()
            .filter(|&b| Self::create_from_backend(b).is_ok())
            .collect()
    }
}

#[allow(dead_code)]
fn not_compiled(backend: SolverBackend, feature: &str) -> SolverError {
    SolverError::SolverNotAvailable(format!(
        "{backend} support not compiled in (enable the `{feature}` feature)"
    ))
}

#[cfg(feature = "microlp")]
fn microlp() -> Result<Arc<dyn SolverService>> {
    Ok(Arc::new(super::MicroLpSolver::new()))
}

#[cfg(not(feature = "microlp"))]
fn microlp() -> Result<Arc<dyn SolverService>> {
    Err(not_compiled(SolverBackend::Microlp, "microlp"))
}

#[cfg(feature = "coin_cbc")]
fn coin_cbc() -> Result<Arc<dyn SolverService>> {
    Ok(Arc::new(super::CoinCbcSolver::new()))
}

#[cfg(not(feature = "coin_cbc"))]
fn coin_cbc() -> Result<Arc<dyn SolverService>> {
    Err(not_compiled(SolverBackend::CoinCbc, "coin_cbc"))
}

#[cfg(feature = "highs")]
fn highs() -> Result<Arc<dyn SolverService>> {
    Ok(Arc::new(super::HighsSolver::new()))
}

#[cfg(not(feature = "highs"))]
fn highs() -> Result<Arc<dyn SolverService>> {
    Err(not_compiled(SolverBackend::Highs, "highs"))
}
