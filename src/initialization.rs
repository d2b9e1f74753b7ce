use ndarray::Array1;

use crate::{
    disc::{
        assembly::Source,
        boundary::scalar1d::{BoundaryCondition, BoundaryPair, BoundaryValue},
        diffusivity::DiffusivityField,
        mesh::mesh1d::Mesh1d,
    },
    error::{AppError, DiffusionResult},
    io::param_parser::{
        BoundaryKind, BoundaryParam, DiffusivityParam, SolverParamParser, SourceParam,
    },
    solver::SolverParameters,
};

pub fn initialize_params_by_file(file_path: &str) -> Result<SolverParamParser, AppError> {
    let param = SolverParamParser::parse(file_path)?;
    log::debug!("parameters from {file_path}: {param:?}");
    Ok(param)
}
pub fn initialize_solver_params(param: &SolverParamParser) -> SolverParameters {
    SolverParameters {
        initial_time: param.initial_time,
        final_time: param.final_time,
        time_step: param.time_step,
        theta: param.theta,
        averaging: param.averaging,
        linearization: param.linearization,
        picard_tolerance: param.picard_tolerance,
        picard_max_iterations: param.picard_max_iterations,
        output_interval: param.output_interval,
    }
}
pub fn initialize_mesh1d(param: &SolverParamParser) -> DiffusionResult<Mesh1d> {
    Mesh1d::uniform(0.0, param.domain_length, param.cell_num)
}
fn initialize_boundary(param: &BoundaryParam) -> BoundaryCondition<BoundaryValue> {
    let value = if param.rate == 0.0 {
        BoundaryValue::Constant(param.value)
    } else {
        let (value, rate) = (param.value, param.rate);
        BoundaryValue::TimeDependent(Box::new(move |t| value + rate * t))
    };
    match param.kind {
        BoundaryKind::Dirichlet => BoundaryCondition::Dirichlet(value),
        BoundaryKind::Neumann => BoundaryCondition::Neumann(value),
    }
}
pub fn initialize_boundaries(param: &SolverParamParser) -> BoundaryPair<BoundaryValue> {
    BoundaryPair::new(
        initialize_boundary(&param.left_boundary),
        initialize_boundary(&param.right_boundary),
    )
}
pub fn initialize_diffusivity(param: &SolverParamParser) -> DiffusivityField {
    match &param.diffusivity {
        DiffusivityParam::Constant { value } => DiffusivityField::Uniform(*value),
        DiffusivityParam::Cellwise { values } => {
            DiffusivityField::Cellwise(Array1::from_vec(values.clone()))
        }
        DiffusivityParam::PorousMedium { exponent } => DiffusivityField::porous_medium(*exponent),
    }
}
/// Time-independent source built from the parameter file.
pub fn initialize_source(param: &SolverParamParser) -> Box<dyn Fn(f64) -> Source> {
    match &param.source {
        SourceParam::Uniform(value) if *value == 0.0 => Box::new(|_t: f64| Source::Zero),
        SourceParam::Uniform(value) => {
            let value = *value;
            Box::new(move |_t: f64| Source::Function(Box::new(move |_x: f64| value)))
        }
        SourceParam::Cellwise(values) => {
            let values = Array1::from_vec(values.clone());
            Box::new(move |_t: f64| Source::Cellwise(values.clone()))
        }
    }
}
pub fn initialize_solution(param: &SolverParamParser, mesh: &Mesh1d) -> Array1<f64> {
    Array1::from_elem(mesh.cell_num(), param.initial_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initialize_from_parameters() {
        let param = SolverParamParser::parse_str(
            r#"{
                "domain_length": 3.0,
                "cell_num": 3,
                "final_time": 1.0,
                "time_step": 0.1,
                "theta": 1.0,
                "diffusivity": {"type": "cellwise", "values": [1.0, 2.0, 3.0]},
                "left_boundary": {"type": "dirichlet", "value": 1.0, "rate": 2.0},
                "right_boundary": {"type": "neumann", "value": 0.5},
                "initial_value": 0.25,
                "source": [0.5, 0.0, 1.5]
            }"#,
        )
        .unwrap();
        let mesh = initialize_mesh1d(&param).unwrap();
        assert_eq!(mesh.cell_num(), 3);
        assert_relative_eq!(mesh.measures()[0], 1.0, epsilon = 1e-14);

        let bcs = initialize_boundaries(&param);
        let frozen = bcs.blend(1.0, 0.5, 1.0);
        assert_eq!(frozen.left, BoundaryCondition::Dirichlet(4.0));
        assert_eq!(frozen.right, BoundaryCondition::Neumann(0.5));

        let k = initialize_diffusivity(&param)
            .evaluate(&mesh, Array1::zeros(3).view())
            .unwrap();
        assert_eq!(k, Array1::from_vec(vec![1.0, 2.0, 3.0]));
        assert_eq!(initialize_solution(&param, &mesh), Array1::from_elem(3, 0.25));
        let source = initialize_source(&param)(0.7).evaluate(&mesh).unwrap();
        assert_eq!(source, Array1::from_vec(vec![0.5, 0.0, 1.5]));
    }

    #[test]
    fn test_uniform_source_covers_every_cell() {
        let param = SolverParamParser::parse_str(
            r#"{
                "domain_length": 1.0,
                "cell_num": 4,
                "final_time": 1.0,
                "time_step": 0.1,
                "theta": 1.0,
                "diffusivity": {"type": "constant", "value": 1.0},
                "left_boundary": {"type": "dirichlet", "value": 0.0},
                "right_boundary": {"type": "dirichlet", "value": 0.0},
                "source": 2.0
            }"#,
        )
        .unwrap();
        let mesh = initialize_mesh1d(&param).unwrap();
        let source = initialize_source(&param)(0.0).evaluate(&mesh).unwrap();
        assert_eq!(source, Array1::from_elem(4, 2.0));
    }
}
