use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;

use crate::disc::{
    assembly::{Source, assemble},
    boundary::scalar1d::BoundaryPair,
    diffusivity::DiffusivityField,
};
use crate::error::{DiffusionError, DiffusionResult};
use crate::temporal_disc::theta_scheme::ImplicitStepper;

pub const DEFAULT_TOLERANCE: f64 = 1e-5;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

#[derive(Clone, Debug)]
pub struct PicardOutcome {
    pub solution: Array1<f64>,
    /// Relative change of the last iteration.
    pub residual: f64,
    pub iterations: usize,
}

/// Fixed-point linearization of one theta step with `K = K(u)`.
#[derive(Clone, Copy, Debug)]
pub struct PicardSolver<'a> {
    stepper: ImplicitStepper<'a>,
    pub tolerance: f64,
    pub max_iterations: usize,
}
impl<'a> PicardSolver<'a> {
    pub fn new(stepper: ImplicitStepper<'a>) -> DiffusionResult<Self> {
        if stepper.theta() == 0.0 {
            return Err(DiffusionError::InvalidParameter {
                name: "theta",
                reason: "Picard iteration needs an implicit step (theta > 0)".to_string(),
            });
        }
        Ok(Self {
            stepper,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
    pub fn step(
        &self,
        diffusivity: &DiffusivityField,
        bcs: &BoundaryPair,
        source: &Source,
        dt: f64,
        uold: ArrayView1<f64>,
    ) -> DiffusionResult<PicardOutcome> {
        self.stepper.check_step_input(dt, uold)?;
        let mesh = self.stepper.mesh;
        let mut iterate = uold.to_owned();
        let mut residual = f64::INFINITY;
        for iteration in 1..=self.max_iterations {
            let k = diffusivity.evaluate(mesh, iterate.view())?;
            let system = assemble(mesh, k.view(), bcs, source, self.stepper.averaging())?;
            let candidate = self.stepper.implicit_update(&system, bcs, dt, uold)?;
            residual = relative_change(iterate.view(), candidate.view())?;
            log::trace!("picard iter: {iteration}, relative change: {residual:.4e}");
            iterate = candidate;
            if residual < self.tolerance {
                return Ok(PicardOutcome {
                    solution: iterate,
                    residual,
                    iterations: iteration,
                });
            }
        }
        Err(DiffusionError::ConvergenceFailure {
            iterations: self.max_iterations,
            residual,
        })
    }
}

/// `max|new - old| / max|old|`, or the absolute change when `old` vanishes.
fn relative_change(old: ArrayView1<f64>, new: ArrayView1<f64>) -> DiffusionResult<f64> {
    let to_failure =
        |e: ndarray_stats::errors::MinMaxError| DiffusionError::SolverFailure(format!("{e}"));
    let change = (&new - &old).mapv(f64::abs);
    let numerator = *change.max().map_err(to_failure)?;
    let magnitude = old.mapv(f64::abs);
    let denominator = *magnitude.max().map_err(to_failure)?;
    let criterion = if denominator > 0.0 {
        numerator / denominator
    } else {
        numerator
    };
    if !criterion.is_finite() {
        return Err(DiffusionError::SolverFailure(format!(
            "non-finite Picard criterion {criterion}"
        )));
    }
    Ok(criterion)
}
