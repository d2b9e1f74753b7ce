pub mod assembly;
pub mod boundary;
pub mod diffusivity;
pub mod linear_solver;
pub mod mesh;
pub mod permeability;
