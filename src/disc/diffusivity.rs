use std::fmt;

use ndarray::{Array1, ArrayView1};

use crate::disc::mesh::mesh1d::Mesh1d;
use crate::error::{DiffusionError, DiffusionResult};

pub enum DiffusivityField {
    Uniform(f64),
    Cellwise(Array1<f64>),
    /// K(u): cell values of the diffusivity for the given cell solution.
    SolutionDependent(Box<dyn Fn(ArrayView1<f64>) -> Array1<f64>>),
}
impl DiffusivityField {
    /// Porous-medium law `K(u) = m |u|^(m-1)`, i.e. `u_t = (u^m)_xx` for `u >= 0`.
    pub fn porous_medium(exponent: f64) -> Self {
        DiffusivityField::SolutionDependent(Box::new(move |u: ArrayView1<f64>| {
            u.mapv(|v| exponent * v.abs().powf(exponent - 1.0))
        }))
    }
    pub fn is_solution_dependent(&self) -> bool {
        matches!(self, DiffusivityField::SolutionDependent(_))
    }
    /// Resolves the field to one value per cell, evaluating K(u) at `u` if needed.
    ///
    /// Cellwise values are returned as given; their length is checked by the
    /// interface averaging.
    pub fn evaluate(&self, mesh: &Mesh1d, u: ArrayView1<f64>) -> DiffusionResult<Array1<f64>> {
        match self {
            DiffusivityField::Uniform(k) => Ok(Array1::from_elem(mesh.cell_num(), *k)),
            DiffusivityField::Cellwise(k) => Ok(k.clone()),
            DiffusivityField::SolutionDependent(func) => {
                if u.len() != mesh.cell_num() {
                    return Err(DiffusionError::DimensionMismatch {
                        context: "diffusivity argument",
                        expected: mesh.cell_num(),
                        provided: u.len(),
                    });
                }
                let k = func(u);
                if k.len() != mesh.cell_num() {
                    return Err(DiffusionError::DimensionMismatch {
                        context: "solution-dependent diffusivity",
                        expected: mesh.cell_num(),
                        provided: k.len(),
                    });
                }
                Ok(k)
            }
        }
    }
}
impl fmt::Debug for DiffusivityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffusivityField::Uniform(k) => f.debug_tuple("Uniform").field(k).finish(),
            DiffusivityField::Cellwise(k) => f.debug_tuple("Cellwise").field(k).finish(),
            DiffusivityField::SolutionDependent(_) => f.write_str("SolutionDependent(..)"),
        }
    }
}
