mod disc;
mod error;
mod initialization;
mod io;
mod solver;
mod temporal_disc;

use crate::error::AppError;
use crate::solver::DiffusionSolver;

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let param_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "inputs/solverparam.json".to_string());
    let param = initialization::initialize_params_by_file(&param_path)?;
    let solver_params = initialization::initialize_solver_params(&param);
    let mesh = initialization::initialize_mesh1d(&param)?;
    let solver = DiffusionSolver {
        mesh: &mesh,
        diffusivity: initialization::initialize_diffusivity(&param),
        boundaries: initialization::initialize_boundaries(&param),
        source: initialization::initialize_source(&param),
        solver_params: &solver_params,
    };
    let uinit = initialization::initialize_solution(&param, &mesh);
    let history = match solver.solve(uinit.view()) {
        Ok(history) => history,
        Err(e) => {
            log::error!("{e}");
            return Err(e.into());
        }
    };
    solver.write_outputs(&history, &param.output_dir)?;
    Ok(())
}
