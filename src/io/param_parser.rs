use std::fs;

use serde::Deserialize;

use crate::disc::permeability::InterfaceAveraging;
use crate::error::AppError;
use crate::temporal_disc::{
    picard::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE},
    time_loop::Linearization,
};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Dirichlet,
    Neumann,
}
/// Boundary value `value + rate * t`.
#[derive(Deserialize, Debug, Clone)]
pub struct BoundaryParam {
    #[serde(rename = "type")]
    pub kind: BoundaryKind,
    pub value: f64,
    #[serde(default)]
    pub rate: f64,
}
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiffusivityParam {
    Constant { value: f64 },
    Cellwise { values: Vec<f64> },
    PorousMedium { exponent: f64 },
}
/// Volumetric source: one number for the whole domain, or one value per cell.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SourceParam {
    Uniform(f64),
    Cellwise(Vec<f64>),
}
impl Default for SourceParam {
    fn default() -> Self {
        SourceParam::Uniform(0.0)
    }
}
#[derive(Deserialize, Debug)]
pub struct SolverParamParser {
    pub domain_length: f64,
    pub cell_num: usize,
    #[serde(default)]
    pub initial_time: f64,
    pub final_time: f64,
    pub time_step: f64,
    pub theta: f64,
    #[serde(default)]
    pub averaging: InterfaceAveraging,
    #[serde(default)]
    pub linearization: Linearization,
    #[serde(default = "default_picard_tolerance")]
    pub picard_tolerance: f64,
    #[serde(default = "default_picard_max_iterations")]
    pub picard_max_iterations: usize,
    pub diffusivity: DiffusivityParam,
    pub left_boundary: BoundaryParam,
    pub right_boundary: BoundaryParam,
    #[serde(default)]
    pub initial_value: f64,
    #[serde(default)]
    pub source: SourceParam,
    #[serde(default = "default_output_interval")]
    pub output_interval: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}
fn default_picard_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_picard_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}
fn default_output_interval() -> usize {
    10
}
fn default_output_dir() -> String {
    "outputs".to_string()
}
impl SolverParamParser {
    pub fn parse(file_path: &str) -> Result<Self, AppError> {
        let file_content = fs::read_to_string(file_path)?;
        Self::parse_str(&file_content)
    }
    pub fn parse_str(content: &str) -> Result<Self, AppError> {
        let param: SolverParamParser = serde_json::from_str(content)?;
        Ok(param)
    }
}
