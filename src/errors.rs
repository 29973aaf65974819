use thiserror::Error;

use crate::node::SatId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Propagation error: {0}")]
    Propagation(#[from] PropagationError),
}

/// Errors raised at orchestrator entry, before any pipeline stage runs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("time step must be strictly positive")]
    NonPositiveTimeStep,

    #[error("propagation span does not cover a single time step")]
    EmptyTimeGrid,

    #[error("constellation has no satellites")]
    EmptyConstellation,

    #[error("no ground station provided")]
    EmptyGroundStations,

    #[error("doppler upper bound lies below lower bound")]
    InvalidDopplerBounds,

    #[error("simulation horizon must be strictly positive")]
    NonPositiveHorizon,
}

/// Failure reported by the external orbit propagator, bubbled up unchanged.
#[derive(Debug, Error)]
#[error("failed to propagate {sat}: {reason}")]
pub struct PropagationError {
    /// Satellite whose propagation failed.
    pub sat: SatId,

    /// Collaborator-provided description.
    pub reason: String,
}
