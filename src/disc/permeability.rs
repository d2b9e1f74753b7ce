use ndarray::{Array1, ArrayView1, Zip, s};
use serde::Deserialize;

use crate::disc::mesh::mesh1d::Mesh1d;
use crate::error::{DiffusionError, DiffusionResult};

/// Rule used to turn cell diffusivities into interface diffusivities.
///
/// `Harmonic` weights each side by its half-cell distance. `Constant` takes
/// the value of the cell to the right of each interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceAveraging {
    Constant,
    #[default]
    Arithmetic,
    Harmonic,
}

/// Per-interface diffusivity `kbar` (length `cell_num + 1`) from per-cell values `k`.
pub fn average_interface_values(
    mesh: &Mesh1d,
    k: ArrayView1<f64>,
    mode: InterfaceAveraging,
) -> DiffusionResult<Array1<f64>> {
    let n = mesh.cell_num();
    if k.len() != n {
        return Err(DiffusionError::DimensionMismatch {
            context: "cell diffusivity",
            expected: n,
            provided: k.len(),
        });
    }
    let mut kbar = Array1::<f64>::zeros(n + 1);
    match mode {
        InterfaceAveraging::Constant => {
            kbar.slice_mut(s![..n]).assign(&k);
            kbar[n] = k[n - 1];
        }
        InterfaceAveraging::Arithmetic => {
            Zip::from(kbar.slice_mut(s![1..n]))
                .and(k.slice(s![..n - 1]))
                .and(k.slice(s![1..]))
                .for_each(|kb, &kl, &kr| *kb = 0.5 * (kl + kr));
            kbar[0] = k[0];
            kbar[n] = k[n - 1];
        }
        InterfaceAveraging::Harmonic => {
            let vertices = mesh.vertices();
            let centers = mesh.centers();
            let distances = mesh.distances();
            for i in 1..n {
                let d_left = vertices[i] - centers[i - 1];
                let d_right = centers[i] - vertices[i];
                let denominator = d_left * k[i] + d_right * k[i - 1];
                // both sides vanish: the harmonic mean tends to zero
                kbar[i] = if denominator == 0.0 {
                    0.0
                } else {
                    distances[i] * k[i - 1] * k[i] / denominator
                };
            }
            // boundary interfaces copy the adjacent cell
            kbar[0] = k[0];
            kbar[n] = k[n - 1];
        }
    }
    Ok(kbar)
}
