use faer::{Col, prelude::Solve};
use ndarray::{Array1, ArrayView1};

use crate::disc::{
    assembly::{LinearSystem, TridiagonalOperator},
    boundary::scalar1d::BoundaryPair,
};
use crate::error::{DiffusionError, DiffusionResult};

/// Solves an assembled system. A both-Neumann pair is rejected before any
/// factorization is attempted.
pub fn solve_linear(system: &LinearSystem, bcs: &BoundaryPair) -> DiffusionResult<Array1<f64>> {
    if bcs.is_singular() {
        return Err(DiffusionError::SingularSystem);
    }
    solve_sparse(&system.operator, system.rhs.view())
}

fn solve_sparse(
    operator: &TridiagonalOperator,
    rhs: ArrayView1<f64>,
) -> DiffusionResult<Array1<f64>> {
    if rhs.len() != operator.dim() {
        return Err(DiffusionError::DimensionMismatch {
            context: "right-hand side",
            expected: operator.dim(),
            provided: rhs.len(),
        });
    }
    let a = operator.to_sparse()?;
    let lu = a.as_ref().sp_lu().map_err(|e| {
        DiffusionError::SolverFailure(format!("sparse LU factorization failed: {e:?}"))
    })?;
    let b = Col::<f64>::from_iter(rhs.iter().copied());
    let x = lu.solve(&b);
    let u = Array1::from_iter(x.iter().copied());
    if let Some(i) = u.iter().position(|v| !v.is_finite()) {
        return Err(DiffusionError::SolverFailure(format!(
            "non-finite solution entry at cell {i}"
        )));
    }
    Ok(u)
}
