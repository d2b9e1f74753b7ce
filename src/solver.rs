use std::{fs, path::Path};

use ndarray::{Array1, ArrayView1};

use crate::disc::{
    assembly::{Source, compute_interface_flux},
    boundary::scalar1d::{BoundaryPair, BoundaryValue},
    diffusivity::DiffusivityField,
    mesh::mesh1d::Mesh1d,
    permeability::InterfaceAveraging,
};
use crate::error::{AppError, DiffusionResult};
use crate::io::write_to_csv::{write_flux_to_csv, write_to_csv};
use crate::temporal_disc::{
    theta_scheme::ImplicitStepper,
    time_loop::{Linearization, SolutionHistory, TimeLoop},
};

pub struct SolverParameters {
    pub initial_time: f64,
    pub final_time: f64,
    pub time_step: f64,
    pub theta: f64,
    pub averaging: InterfaceAveraging,
    pub linearization: Linearization,
    pub picard_tolerance: f64,
    pub picard_max_iterations: usize,
    pub output_interval: usize,
}

pub struct DiffusionSolver<'a> {
    pub mesh: &'a Mesh1d,
    pub diffusivity: DiffusivityField,
    pub boundaries: BoundaryPair<BoundaryValue>,
    /// Source term at a given time.
    pub source: Box<dyn Fn(f64) -> Source>,
    pub solver_params: &'a SolverParameters,
}
impl<'a> DiffusionSolver<'a> {
    pub fn solve(&self, uinit: ArrayView1<f64>) -> DiffusionResult<SolutionHistory> {
        let params = self.solver_params;
        let stepper =
            ImplicitStepper::new(self.mesh, params.theta)?.with_averaging(params.averaging);
        let time_loop = TimeLoop::new(stepper)
            .with_picard(params.picard_tolerance, params.picard_max_iterations);
        let (left, right) = self.mesh.domain();
        log::info!(
            "solving on [{left}, {right}] with {} cells from t = {} to t = {} \
             (dt = {}, theta = {}, {:?})",
            self.mesh.cell_num(),
            params.initial_time,
            params.final_time,
            params.time_step,
            params.theta,
            params.linearization
        );
        let picard = params.linearization == Linearization::Picard;
        if picard && !self.diffusivity.is_solution_dependent() {
            log::warn!("Picard iteration requested for a diffusivity that does not depend on u");
        }
        let history = time_loop.run(
            &self.diffusivity,
            &self.boundaries,
            self.source.as_ref(),
            params.initial_time,
            params.final_time,
            params.time_step,
            uinit,
            params.linearization,
        )?;
        log::info!("Final step: {}", history.len() - 1);
        log::info!("Final time: {}", history.last().0);
        Ok(history)
    }
    /// Interface fluxes of the last stored solution.
    pub fn final_flux(&self, history: &SolutionHistory) -> DiffusionResult<Array1<f64>> {
        let (_, u) = history.last();
        let k = self.diffusivity.evaluate(self.mesh, u)?;
        compute_interface_flux(self.mesh, k.view(), u, self.solver_params.averaging)
    }
    pub fn write_outputs(
        &self,
        history: &SolutionHistory,
        output_dir: &str,
    ) -> Result<(), AppError> {
        let dir = Path::new(output_dir);
        fs::create_dir_all(dir)?;
        let solutions_path = dir.join("solutions.csv");
        write_to_csv(
            history,
            self.mesh,
            self.solver_params.output_interval,
            &solutions_path,
        )?;
        let flux_path = dir.join("flux_final.csv");
        write_flux_to_csv(self.final_flux(history)?.view(), self.mesh, &flux_path)?;
        log::info!(
            "wrote {} and {}",
            solutions_path.display(),
            flux_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::boundary::scalar1d::BoundaryCondition;
    use approx::assert_relative_eq;

    #[test]
    fn test_steady_source_problem() {
        // -u'' = 2, u(0) = u(1) = 0 reached from rest
        let mesh = Mesh1d::uniform(0.0, 1.0, 10).unwrap();
        let params = SolverParameters {
            initial_time: 0.0,
            final_time: 4.0,
            time_step: 0.05,
            theta: 1.0,
            averaging: InterfaceAveraging::Harmonic,
            linearization: Linearization::Linear,
            picard_tolerance: 1e-5,
            picard_max_iterations: 100,
            output_interval: 10,
        };
        let solver = DiffusionSolver {
            mesh: &mesh,
            diffusivity: DiffusivityField::Uniform(1.0),
            boundaries: BoundaryPair::new(
                BoundaryCondition::Dirichlet(BoundaryValue::Constant(0.0)),
                BoundaryCondition::Dirichlet(BoundaryValue::Constant(0.0)),
            ),
            source: Box::new(|_t: f64| Source::Function(Box::new(|_x: f64| 2.0))),
            solver_params: &params,
        };
        let history = solver.solve(Array1::zeros(10).view()).unwrap();
        let (_, u) = history.last();
        let h = 0.1;
        for (v, x) in u.iter().zip(mesh.centers().iter()) {
            assert_relative_eq!(*v, x * (1.0 - x) + 0.25 * h * h, epsilon = 1e-6);
        }
        let flux = solver.final_flux(&history).unwrap();
        for (f, x) in flux.iter().zip(mesh.interior_vertices().iter()) {
            assert_relative_eq!(*f, 1.0 - 2.0 * x, epsilon = 1e-6);
        }
    }
}
