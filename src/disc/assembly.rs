use std::fmt;

use faer::sparse::{SparseColMat, Triplet};
use ndarray::{Array1, ArrayView1, Zip, s};

use crate::disc::{
    boundary::{
        BoundaryPosition,
        scalar1d::{BoundaryCondition, BoundaryPair},
    },
    mesh::mesh1d::Mesh1d,
    permeability::{InterfaceAveraging, average_interface_values},
};
use crate::error::{DiffusionError, DiffusionResult};

/// Right-hand side of the balance equation, evaluated at cell centers.
pub enum Source {
    Zero,
    Cellwise(Array1<f64>),
    Function(Box<dyn Fn(f64) -> f64>),
}
impl Source {
    pub fn evaluate(&self, mesh: &Mesh1d) -> DiffusionResult<Array1<f64>> {
        match self {
            Source::Zero => Ok(Array1::zeros(mesh.cell_num())),
            Source::Cellwise(values) => {
                if values.len() != mesh.cell_num() {
                    return Err(DiffusionError::DimensionMismatch {
                        context: "source values",
                        expected: mesh.cell_num(),
                        provided: values.len(),
                    });
                }
                Ok(values.clone())
            }
            Source::Function(func) => Ok(mesh.centers().mapv(|x| func(x))),
        }
    }
}
impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Zero => f.write_str("Zero"),
            Source::Cellwise(values) => f.debug_tuple("Cellwise").field(values).finish(),
            Source::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Tridiagonal operator stored by bands.
///
/// `lower[i]` is entry `(i + 1, i)` and `upper[i]` is entry `(i, i + 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TridiagonalOperator {
    lower: Array1<f64>,
    diag: Array1<f64>,
    upper: Array1<f64>,
}
impl TridiagonalOperator {
    pub fn new(
        lower: Array1<f64>,
        diag: Array1<f64>,
        upper: Array1<f64>,
    ) -> DiffusionResult<Self> {
        let n = diag.len();
        if n == 0 {
            return Err(DiffusionError::DimensionMismatch {
                context: "operator diagonal",
                expected: 1,
                provided: 0,
            });
        }
        let bands = [("operator lower band", &lower), ("operator upper band", &upper)];
        for (context, band) in bands {
            if band.len() != n - 1 {
                return Err(DiffusionError::DimensionMismatch {
                    context,
                    expected: n - 1,
                    provided: band.len(),
                });
            }
        }
        Ok(Self { lower, diag, upper })
    }
    pub fn dim(&self) -> usize {
        self.diag.len()
    }
    #[cfg(test)]
    pub fn diagonal(&self) -> ArrayView1<f64> {
        self.diag.view()
    }
    #[cfg(test)]
    pub fn lower(&self) -> ArrayView1<f64> {
        self.lower.view()
    }
    #[cfg(test)]
    pub fn upper(&self) -> ArrayView1<f64> {
        self.upper.view()
    }
    /// Matrix-vector product `A u`.
    pub fn apply(&self, u: ArrayView1<f64>) -> Array1<f64> {
        let n = self.dim();
        let mut au = &self.diag * &u;
        if n > 1 {
            Zip::from(au.slice_mut(s![..n - 1]))
                .and(&self.upper)
                .and(u.slice(s![1..]))
                .for_each(|y, &a, &x| *y += a * x);
            Zip::from(au.slice_mut(s![1..]))
                .and(&self.lower)
                .and(u.slice(s![..n - 1]))
                .for_each(|y, &a, &x| *y += a * x);
        }
        au
    }
    /// New operator with `shift` added to the diagonal; `self` is left untouched.
    pub fn with_diagonal_shift(&self, shift: ArrayView1<f64>) -> DiffusionResult<Self> {
        if shift.len() != self.dim() {
            return Err(DiffusionError::DimensionMismatch {
                context: "diagonal shift",
                expected: self.dim(),
                provided: shift.len(),
            });
        }
        Ok(Self {
            lower: self.lower.clone(),
            diag: &self.diag + &shift,
            upper: self.upper.clone(),
        })
    }
    #[cfg(test)]
    pub fn is_symmetric(&self, tol: f64) -> bool {
        Zip::from(&self.lower)
            .and(&self.upper)
            .all(|&l, &u| (l - u).abs() <= tol)
    }
    /// Weak diagonal dominance by rows.
    #[cfg(test)]
    pub fn is_diagonally_dominant(&self) -> bool {
        let n = self.dim();
        (0..n).all(|i| {
            let mut off = 0.0;
            if i > 0 {
                off += self.lower[i - 1].abs();
            }
            if i + 1 < n {
                off += self.upper[i].abs();
            }
            self.diag[i] >= off
        })
    }
    pub fn to_sparse(&self) -> DiffusionResult<SparseColMat<usize, f64>> {
        let n = self.dim();
        let mut triplets = Vec::with_capacity(3 * n - 2);
        for i in 0..n {
            triplets.push(Triplet::new(i, i, self.diag[i]));
        }
        for i in 0..n - 1 {
            triplets.push(Triplet::new(i + 1, i, self.lower[i]));
            triplets.push(Triplet::new(i, i + 1, self.upper[i]));
        }
        SparseColMat::<usize, f64>::try_new_from_triplets(n, n, &triplets).map_err(|e| {
            DiffusionError::SolverFailure(format!("failed to build sparse matrix: {e:?}"))
        })
    }
    #[cfg(test)]
    pub fn to_dense(&self) -> ndarray::Array2<f64> {
        let n = self.dim();
        let mut dense = ndarray::Array2::zeros((n, n));
        for i in 0..n {
            dense[(i, i)] = self.diag[i];
            if i + 1 < n {
                dense[(i + 1, i)] = self.lower[i];
                dense[(i, i + 1)] = self.upper[i];
            }
        }
        dense
    }
}

#[derive(Clone, Debug)]
pub struct LinearSystem {
    pub operator: TridiagonalOperator,
    pub rhs: Array1<f64>,
}

/// Interface transmissivities `kbar / distances` with the two domain-end
/// entries zeroed; boundary exchange is injected separately.
fn interior_transmissivities(mesh: &Mesh1d, kbar: &Array1<f64>) -> Array1<f64> {
    let mut tx = kbar / &mesh.distances();
    let n = mesh.cell_num();
    tx[0] = 0.0;
    tx[n] = 0.0;
    tx
}

/// Ghost-cell Dirichlet or prescribed-flux Neumann contribution at one end.
fn inject_boundary(
    mesh: &Mesh1d,
    kbar: &Array1<f64>,
    bc: &BoundaryCondition,
    position: BoundaryPosition,
    diag: &mut Array1<f64>,
    rhs: &mut Array1<f64>,
) {
    let n = mesh.cell_num();
    let (icell, iface) = match position {
        BoundaryPosition::Left => (0, 0),
        BoundaryPosition::Right => (n - 1, n),
    };
    match *bc {
        BoundaryCondition::Dirichlet(value) => {
            let t = kbar[iface] / mesh.distances()[iface];
            diag[icell] += t;
            rhs[icell] += t * value;
        }
        BoundaryCondition::Neumann(value) => {
            rhs[icell] += value;
        }
    }
}

/// Assembles `A u = b` for frozen per-cell diffusivity `k`.
pub fn assemble(
    mesh: &Mesh1d,
    k: ArrayView1<f64>,
    bcs: &BoundaryPair,
    source: &Source,
    mode: InterfaceAveraging,
) -> DiffusionResult<LinearSystem> {
    let n = mesh.cell_num();
    let kbar = average_interface_values(mesh, k, mode)?;
    let tx = interior_transmissivities(mesh, &kbar);

    let mut diag = &tx.slice(s![..n]) + &tx.slice(s![1..]);
    let off = tx.slice(s![1..n]).mapv(|t| -t);
    let mut rhs = &mesh.measures() * &source.evaluate(mesh)?;

    for position in [BoundaryPosition::Left, BoundaryPosition::Right] {
        inject_boundary(mesh, &kbar, bcs.get(position), position, &mut diag, &mut rhs);
    }
    let operator = TridiagonalOperator::new(off.clone(), diag, off)?;
    Ok(LinearSystem { operator, rhs })
}

/// `tx_i (u_{i+1} - u_i)` at each interior interface, i.e. `K du/dx`.
/// The Darcy flux is the negation.
pub fn compute_interface_flux(
    mesh: &Mesh1d,
    k: ArrayView1<f64>,
    u: ArrayView1<f64>,
    mode: InterfaceAveraging,
) -> DiffusionResult<Array1<f64>> {
    let n = mesh.cell_num();
    if u.len() != n {
        return Err(DiffusionError::DimensionMismatch {
            context: "flux solution",
            expected: n,
            provided: u.len(),
        });
    }
    let kbar = average_interface_values(mesh, k, mode)?;
    let tx = interior_transmissivities(mesh, &kbar);
    Ok(Zip::from(tx.slice(s![1..n]))
        .and(u.slice(s![..n - 1]))
        .and(u.slice(s![1..]))
        .map_collect(|&t, &ul, &ur| t * (ur - ul)))
}
