//! Error types for the fluid simulation.

use thiserror::Error;

/// Errors raised while configuring or loading a simulation.
///
/// Nothing inside a running sub-step produces an error; numerical
/// degeneracies are resolved locally by the solver.
#[derive(Debug, Error)]
pub enum FluidError {
    /// A parameter snapshot failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The simulation was asked to run with no particles.
    #[error("Particle count must be at least 1")]
    EmptyPopulation,

    /// I/O failure while reading or writing presets.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Preset file could not be parsed or written.
    #[error("Preset serialization error: {0}")]
    Preset(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, FluidError>`.
pub type FluidResult<T> = Result<T, FluidError>;
