use thiserror::Error;

pub type DiffusionResult<T> = Result<T, DiffusionError>;

#[derive(Error, Debug)]
pub enum DiffusionError {
    #[error("dimension mismatch in {context}: expected {expected} values, got {provided}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        provided: usize,
    },
    /// Both ends carry a Neumann condition, so no reference level is fixed.
    #[error("singular system: both boundary conditions are Neumann")]
    SingularSystem,
    #[error("sparse solver failure: {0}")]
    SolverFailure(String),
    #[error("Picard iteration did not converge in {iterations} iterations (change {residual:.3e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Errors surfaced by the binary: numerical failures plus parameter/output I/O.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Diffusion(#[from] DiffusionError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse parameter file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),
}
