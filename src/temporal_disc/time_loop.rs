use ndarray::{Array1, ArrayView1};
use serde::Deserialize;

use crate::disc::{
    assembly::Source,
    boundary::scalar1d::{BoundaryPair, BoundaryValue},
    diffusivity::DiffusivityField,
};
use crate::error::{DiffusionError, DiffusionResult};
use crate::temporal_disc::{picard::PicardSolver, theta_scheme::ImplicitStepper};

/// How each step treats the diffusivity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linearization {
    /// Coefficients frozen at the previous step.
    #[default]
    Linear,
    Picard,
}

/// Append-only record of `(time, solution)` pairs, starting at the initial state.
#[derive(Clone, Debug)]
pub struct SolutionHistory {
    times: Vec<f64>,
    solutions: Vec<Array1<f64>>,
}
impl SolutionHistory {
    pub fn new(t0: f64, uinit: Array1<f64>) -> Self {
        Self {
            times: vec![t0],
            solutions: vec![uinit],
        }
    }
    pub fn push(&mut self, time: f64, solution: Array1<f64>) {
        self.times.push(time);
        self.solutions.push(solution);
    }
    pub fn len(&self) -> usize {
        self.times.len()
    }
    pub fn times(&self) -> &[f64] {
        &self.times
    }
    pub fn solutions(&self) -> &[Array1<f64>] {
        &self.solutions
    }
    pub fn last(&self) -> (f64, ArrayView1<f64>) {
        let i = self.times.len() - 1;
        (self.times[i], self.solutions[i].view())
    }
    pub fn iter(&self) -> impl Iterator<Item = (f64, ArrayView1<f64>)> {
        self.times
            .iter()
            .copied()
            .zip(self.solutions.iter().map(|u| u.view()))
    }
}

pub struct TimeLoop<'a> {
    stepper: ImplicitStepper<'a>,
    picard_tolerance: f64,
    picard_max_iterations: usize,
}
impl<'a> TimeLoop<'a> {
    pub fn new(stepper: ImplicitStepper<'a>) -> Self {
        Self {
            stepper,
            picard_tolerance: crate::temporal_disc::picard::DEFAULT_TOLERANCE,
            picard_max_iterations: crate::temporal_disc::picard::DEFAULT_MAX_ITERATIONS,
        }
    }
    pub fn with_picard(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.picard_tolerance = tolerance;
        self.picard_max_iterations = max_iterations;
        self
    }
    /// Marches from `t0` to `tf`. A trailing interval shorter than `1.1 dt` is
    /// taken as a single clipped step that lands exactly on `tf`.
    pub fn run(
        &self,
        diffusivity: &DiffusivityField,
        bcs: &BoundaryPair<BoundaryValue>,
        source: &dyn Fn(f64) -> Source,
        t0: f64,
        tf: f64,
        dt: f64,
        uinit: ArrayView1<f64>,
        linearization: Linearization,
    ) -> DiffusionResult<SolutionHistory> {
        let mesh = self.stepper.mesh;
        if !(t0.is_finite() && tf.is_finite() && tf >= t0) {
            return Err(DiffusionError::InvalidParameter {
                name: "final_time",
                reason: format!("time interval [{t0}, {tf}] is empty or not finite"),
            });
        }
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(DiffusionError::InvalidParameter {
                name: "dt",
                reason: format!("time step must be positive and finite, got {dt}"),
            });
        }
        if uinit.len() != mesh.cell_num() {
            return Err(DiffusionError::DimensionMismatch {
                context: "initial condition",
                expected: mesh.cell_num(),
                provided: uinit.len(),
            });
        }
        let picard = match linearization {
            Linearization::Picard => Some(
                PicardSolver::new(self.stepper)?
                    .with_tolerance(self.picard_tolerance)
                    .with_max_iterations(self.picard_max_iterations),
            ),
            Linearization::Linear => None,
        };
        let theta = self.stepper.theta();

        let mut history = SolutionHistory::new(t0, uinit.to_owned());
        let mut uold = uinit.to_owned();
        let mut t = t0;
        let mut dt = dt;
        let mut step = 0usize;
        while t < tf {
            let mut t_next = t + dt;
            if tf - t < 1.1 * dt {
                dt = tf - t;
                t_next = tf;
            }
            if t_next <= t {
                return Err(DiffusionError::InvalidParameter {
                    name: "dt",
                    reason: format!("time step {dt} does not advance t = {t}"),
                });
            }
            let frozen_bcs = bcs.blend(t, dt, theta);
            let source_now = source(t_next);
            let unew = match &picard {
                Some(picard) => {
                    let outcome =
                        picard.step(diffusivity, &frozen_bcs, &source_now, dt, uold.view())?;
                    log::trace!(
                        "step {}: picard converged in {} iterations (relative change {:.4e})",
                        step + 1,
                        outcome.iterations,
                        outcome.residual
                    );
                    outcome.solution
                }
                None => {
                    let k = diffusivity.evaluate(mesh, uold.view())?;
                    self.stepper
                        .step(k.view(), &frozen_bcs, &source_now, dt, uold.view())?
                }
            };
            step += 1;
            t = t_next;
            log::debug!("step: {step}, time: {t:.6e}, dt: {dt:.6e}");
            history.push(t, unew.clone());
            uold = unew;
        }
        Ok(history)
    }
}
