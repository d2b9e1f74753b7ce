use std::path::Path;

use csv::Writer;
use ndarray::ArrayView1;
use serde::Serialize;

use crate::disc::mesh::mesh1d::Mesh1d;
use crate::temporal_disc::time_loop::SolutionHistory;

#[derive(Serialize)]
struct PointData {
    time: f64,
    x: f64,
    solution: f64,
}

#[derive(Serialize)]
struct FluxData {
    x: f64,
    flux: f64,
}

/// Writes every `interval`-th history entry (and always the last one) as
/// `time,x,solution` rows at the cell centers.
pub fn write_to_csv(
    history: &SolutionHistory,
    mesh: &Mesh1d,
    interval: usize,
    filename: &Path,
) -> Result<(), csv::Error> {
    let mut writer = Writer::from_path(filename)?;
    let last = history.len() - 1;
    for (istep, (time, solution)) in history.iter().enumerate() {
        if istep != last && istep % interval.max(1) != 0 {
            continue;
        }
        for (&x, &u) in mesh.centers().iter().zip(solution.iter()) {
            writer.serialize(PointData {
                time,
                x,
                solution: u,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// `x,flux` rows at the interior interfaces.
pub fn write_flux_to_csv(
    flux: ArrayView1<f64>,
    mesh: &Mesh1d,
    filename: &Path,
) -> Result<(), csv::Error> {
    let mut writer = Writer::from_path(filename)?;
    for (&x, &flux) in mesh.interior_vertices().iter().zip(flux.iter()) {
        writer.serialize(FluxData { x, flux })?;
    }
    writer.flush()?;
    Ok(())
}
