use ndarray::{Array1, ArrayView1, Zip};

use crate::disc::{
    assembly::{LinearSystem, Source, assemble},
    boundary::scalar1d::BoundaryPair,
    linear_solver::solve_linear,
    mesh::mesh1d::Mesh1d,
    permeability::InterfaceAveraging,
};
use crate::error::{DiffusionError, DiffusionResult};

/// One theta-scheme step for a frozen diffusivity field.
///
/// `theta = 1` is backward Euler, `theta = 0.5` Crank-Nicolson and
/// `theta = 0` the explicit update.
#[derive(Clone, Copy, Debug)]
pub struct ImplicitStepper<'a> {
    pub mesh: &'a Mesh1d,
    theta: f64,
    averaging: InterfaceAveraging,
}
impl<'a> ImplicitStepper<'a> {
    pub fn new(mesh: &'a Mesh1d, theta: f64) -> DiffusionResult<Self> {
        if !(0.0..=1.0).contains(&theta) {
            return Err(DiffusionError::InvalidParameter {
                name: "theta",
                reason: format!("{theta} is outside [0, 1]"),
            });
        }
        Ok(Self {
            mesh,
            theta,
            averaging: InterfaceAveraging::default(),
        })
    }
    pub fn with_averaging(mut self, averaging: InterfaceAveraging) -> Self {
        self.averaging = averaging;
        self
    }
    pub fn theta(&self) -> f64 {
        self.theta
    }
    pub fn averaging(&self) -> InterfaceAveraging {
        self.averaging
    }
    pub fn step(
        &self,
        k: ArrayView1<f64>,
        bcs: &BoundaryPair,
        source: &Source,
        dt: f64,
        uold: ArrayView1<f64>,
    ) -> DiffusionResult<Array1<f64>> {
        self.check_step_input(dt, uold)?;
        let system = assemble(self.mesh, k, bcs, source, self.averaging)?;
        if self.theta == 0.0 {
            Ok(self.explicit_update(&system, dt, uold))
        } else {
            self.implicit_update(&system, bcs, dt, uold)
        }
    }
    pub(crate) fn check_step_input(&self, dt: f64, uold: ArrayView1<f64>) -> DiffusionResult<()> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(DiffusionError::InvalidParameter {
                name: "dt",
                reason: format!("time step must be positive and finite, got {dt}"),
            });
        }
        if uold.len() != self.mesh.cell_num() {
            return Err(DiffusionError::DimensionMismatch {
                context: "previous solution",
                expected: self.mesh.cell_num(),
                provided: uold.len(),
            });
        }
        Ok(())
    }
    /// `uold + dt (f - A uold) / measure`, no linear solve.
    fn explicit_update(
        &self,
        system: &LinearSystem,
        dt: f64,
        uold: ArrayView1<f64>,
    ) -> Array1<f64> {
        let a_uold = system.operator.apply(uold);
        Zip::from(uold)
            .and(&system.rhs)
            .and(&a_uold)
            .and(self.mesh.measures())
            .map_collect(|&u, &f, &au, &m| u + dt * (f - au) / m)
    }
    /// Solves `(A + measure / (theta dt)) unew = b` with
    /// `b = (f + measure uold / dt - (1 - theta) A uold) / theta`.
    ///
    /// `system` may be assembled with coefficients other than those at `uold`
    /// (Picard iterates), the old-step solution always enters the rhs.
    pub(crate) fn implicit_update(
        &self,
        system: &LinearSystem,
        bcs: &BoundaryPair,
        dt: f64,
        uold: ArrayView1<f64>,
    ) -> DiffusionResult<Array1<f64>> {
        let theta = self.theta;
        let measures = self.mesh.measures();
        let a_uold = system.operator.apply(uold);
        let rhs = Zip::from(&system.rhs)
            .and(&measures)
            .and(uold)
            .and(&a_uold)
            .map_collect(|&f, &m, &u, &au| (f + m * u / dt - (1.0 - theta) * au) / theta);
        let shift = measures.mapv(|m| m / (theta * dt));
        let shifted = LinearSystem {
            operator: system.operator.with_diagonal_shift(shift.view())?,
            rhs,
        };
        solve_linear(&shifted, bcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::boundary::scalar1d::BoundaryCondition;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    #[test]
    fn test_rejects_theta_out_of_range() {
        let mesh = Mesh1d::uniform(0.0, 1.0, 4).unwrap();
        assert!(ImplicitStepper::new(&mesh, 1.5).is_err());
        assert!(ImplicitStepper::new(&mesh, -0.1).is_err());
        assert!(ImplicitStepper::new(&mesh, 0.0).is_ok());
    }

    #[test]
    fn test_uniform_state_is_fixed_point_without_diffusion() {
        let mesh = Mesh1d::uniform(0.0, 1.0, 8).unwrap();
        let stepper = ImplicitStepper::new(&mesh, 1.0).unwrap();
        let bcs = BoundaryPair::new(
            BoundaryCondition::Neumann(0.0),
            BoundaryCondition::Dirichlet(0.3),
        );
        let uold = Array1::from_elem(8, 0.3);
        let unew = stepper
            .step(Array1::zeros(8).view(), &bcs, &Source::Zero, 0.1, uold.view())
            .unwrap();
        for &u in unew.iter() {
            assert_relative_eq!(u, 0.3, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_steady_state_is_fixed_point_with_diffusion() {
        let mesh = Mesh1d::uniform(0.0, 1.0, 8).unwrap();
        let bcs = BoundaryPair::new(
            BoundaryCondition::Neumann(0.0),
            BoundaryCondition::Dirichlet(2.0),
        );
        let uold = Array1::from_elem(8, 2.0);
        for theta in [0.0, 0.5, 1.0] {
            let stepper = ImplicitStepper::new(&mesh, theta).unwrap();
            let unew = stepper
                .step(Array1::ones(8).view(), &bcs, &Source::Zero, 1e-3, uold.view())
                .unwrap();
            for &u in unew.iter() {
                assert_relative_eq!(u, 2.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_explicit_update_formula() {
        let mesh = Mesh1d::uniform(0.0, 1.0, 3).unwrap();
        let stepper = ImplicitStepper::new(&mesh, 0.0).unwrap();
        let bcs = BoundaryPair::new(
            BoundaryCondition::Dirichlet(0.0),
            BoundaryCondition::Neumann(0.0),
        );
        let uold = ndarray::array![1.0, 0.0, 0.0];
        let k = Array1::ones(3);
        let dt = 0.01;
        let unew = stepper.step(k.view(), &bcs, &Source::Zero, dt, uold.view()).unwrap();
        // h = 1/3: interior transmissivity 3, Dirichlet transmissivity 6
        let h = 1.0 / 3.0;
        assert_relative_eq!(unew[0], 1.0 - dt * (9.0 * 1.0) / h, epsilon = 1e-12);
        assert_relative_eq!(unew[1], dt * 3.0 / h, epsilon = 1e-12);
        assert_relative_eq!(unew[2], 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_backward_euler_relaxes_towards_dirichlet_values() {
        let mesh = Mesh1d::uniform(0.0, 1.0, 20).unwrap();
        let stepper = ImplicitStepper::new(&mesh, 1.0)
            .unwrap()
            .with_averaging(InterfaceAveraging::Harmonic);
        let bcs = BoundaryPair::new(
            BoundaryCondition::Dirichlet(1.0),
            BoundaryCondition::Dirichlet(1.0),
        );
        let mut u = Array1::zeros(20);
        for _ in 0..200 {
            u = stepper
                .step(Array1::ones(20).view(), &bcs, &Source::Zero, 0.05, u.view())
                .unwrap();
        }
        for &v in u.iter() {
            assert_relative_eq!(v, 1.0, epsilon = 1e-6);
        }
    }

    fn decay_error(theta: f64) -> f64 {
        // sin(pi x) with homogeneous Dirichlet ends decays as exp(-pi^2 t)
        let cell_num = 100;
        let mesh = Mesh1d::uniform(0.0, 1.0, cell_num).unwrap();
        let pi = std::f64::consts::PI;
        let stepper = ImplicitStepper::new(&mesh, theta).unwrap();
        let bcs = BoundaryPair::new(
            BoundaryCondition::Dirichlet(0.0),
            BoundaryCondition::Dirichlet(0.0),
        );
        let k = Array1::ones(cell_num);
        let mut u = mesh.centers().mapv(|x| (pi * x).sin());
        for _ in 0..10 {
            u = stepper.step(k.view(), &bcs, &Source::Zero, 0.01, u.view()).unwrap();
        }
        let exact = mesh.centers().mapv(|x| (-pi * pi * 0.1).exp() * (pi * x).sin());
        (&u - &exact).iter().fold(0.0_f64, |acc, e| acc.max(e.abs()))
    }

    #[test]
    fn test_crank_nicolson_beats_backward_euler() {
        let be_error = decay_error(1.0);
        let cn_error = decay_error(0.5);
        assert!(be_error < 0.05);
        assert!(cn_error < 0.2 * be_error, "cn {cn_error:e} vs be {be_error:e}");
    }

    #[test]
    fn test_implicit_step_rejects_double_neumann() {
        let mesh = Mesh1d::uniform(0.0, 1.0, 10).unwrap();
        let stepper = ImplicitStepper::new(&mesh, 0.5).unwrap();
        let bcs = BoundaryPair::new(
            BoundaryCondition::Neumann(0.0),
            BoundaryCondition::Neumann(0.0),
        );
        let result = stepper.step(
            Array1::ones(10).view(),
            &bcs,
            &Source::Zero,
            1e-3,
            Array1::zeros(10).view(),
        );
        assert!(matches!(result, Err(DiffusionError::SingularSystem)));
    }

    #[test]
    fn test_invalid_time_step_and_length() {
        let mesh = Mesh1d::uniform(0.0, 1.0, 4).unwrap();
        let stepper = ImplicitStepper::new(&mesh, 1.0).unwrap();
        let bcs = BoundaryPair::new(
            BoundaryCondition::Dirichlet(0.0),
            BoundaryCondition::Dirichlet(0.0),
        );
        let k = Array1::ones(4);
        assert!(matches!(
            stepper.step(k.view(), &bcs, &Source::Zero, 0.0, Array1::zeros(4).view()),
            Err(DiffusionError::InvalidParameter { name: "dt", .. })
        ));
        assert!(matches!(
            stepper.step(k.view(), &bcs, &Source::Zero, 0.1, Array1::zeros(3).view()),
            Err(DiffusionError::DimensionMismatch { .. })
        ));
    }
}
