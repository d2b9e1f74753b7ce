use ndarray::{Array1, ArrayView1, s};

use crate::error::{DiffusionError, DiffusionResult};

/// Cell-centered partition of a 1D domain.
///
/// `distances[0]` and `distances[cell_num]` are the half-distances from the
/// outer cell centers to the domain ends; the interior entries are
/// center-to-center distances.
#[derive(Clone, Debug)]
pub struct Mesh1d {
    domain: (f64, f64),
    vertices: Array1<f64>,
    centers: Array1<f64>,
    measures: Array1<f64>,
    distances: Array1<f64>,
}
impl Mesh1d {
    pub fn new(
        domain: (f64, f64),
        vertices: Array1<f64>,
        centers: Array1<f64>,
        measures: Array1<f64>,
        distances: Array1<f64>,
    ) -> DiffusionResult<Self> {
        let cell_num = centers.len();
        if cell_num == 0 {
            return Err(DiffusionError::InvalidMesh(
                "mesh must contain at least one cell".to_string(),
            ));
        }
        if !(domain.0 < domain.1) {
            return Err(DiffusionError::InvalidMesh(format!(
                "domain bounds ({}, {}) are not increasing",
                domain.0, domain.1
            )));
        }
        if vertices.len() != cell_num + 1 {
            return Err(DiffusionError::DimensionMismatch {
                context: "mesh vertices",
                expected: cell_num + 1,
                provided: vertices.len(),
            });
        }
        if distances.len() != cell_num + 1 {
            return Err(DiffusionError::DimensionMismatch {
                context: "mesh distances",
                expected: cell_num + 1,
                provided: distances.len(),
            });
        }
        if measures.len() != cell_num {
            return Err(DiffusionError::DimensionMismatch {
                context: "mesh measures",
                expected: cell_num,
                provided: measures.len(),
            });
        }
        if let Some(i) = measures.iter().position(|&m| !(m > 0.0 && m.is_finite())) {
            return Err(DiffusionError::InvalidMesh(format!(
                "cell {i} has non-positive measure {}",
                measures[i]
            )));
        }
        if let Some(i) = distances.iter().position(|&d| !(d > 0.0 && d.is_finite())) {
            return Err(DiffusionError::InvalidMesh(format!(
                "distance {i} is non-positive: {}",
                distances[i]
            )));
        }
        if vertices.windows(2).into_iter().any(|w| !(w[0] < w[1])) {
            return Err(DiffusionError::InvalidMesh(
                "vertices are not strictly increasing".to_string(),
            ));
        }
        if let Some(i) = (0..cell_num)
            .find(|&i| !(vertices[i] <= centers[i] && centers[i] <= vertices[i + 1]))
        {
            return Err(DiffusionError::InvalidMesh(format!(
                "center {} of cell {i} lies outside [{}, {}]",
                centers[i],
                vertices[i],
                vertices[i + 1]
            )));
        }
        Ok(Self {
            domain,
            vertices,
            centers,
            measures,
            distances,
        })
    }
    /// Uniform partition of `[left_coord, right_coord]` into `cell_num` cells.
    pub fn uniform(left_coord: f64, right_coord: f64, cell_num: usize) -> DiffusionResult<Self> {
        if cell_num == 0 {
            return Err(DiffusionError::InvalidMesh(
                "mesh must contain at least one cell".to_string(),
            ));
        }
        let h = (right_coord - left_coord) / cell_num as f64;
        let vertices = Array1::linspace(left_coord, right_coord, cell_num + 1);
        let centers = Array1::from_iter((0..cell_num).map(|i| left_coord + (i as f64 + 0.5) * h));
        let measures = Array1::from_elem(cell_num, h);
        let mut distances = Array1::from_elem(cell_num + 1, h);
        distances[0] = 0.5 * h;
        distances[cell_num] = 0.5 * h;
        Self::new(
            (left_coord, right_coord),
            vertices,
            centers,
            measures,
            distances,
        )
    }
    pub fn cell_num(&self) -> usize {
        self.centers.len()
    }
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
    pub fn vertices(&self) -> ArrayView1<f64> {
        self.vertices.view()
    }
    pub fn interior_vertices(&self) -> ArrayView1<f64> {
        self.vertices.slice(s![1..-1])
    }
    pub fn centers(&self) -> ArrayView1<f64> {
        self.centers.view()
    }
    pub fn measures(&self) -> ArrayView1<f64> {
        self.measures.view()
    }
    pub fn distances(&self) -> ArrayView1<f64> {
        self.distances.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_uniform_mesh_layout() {
        let mesh = Mesh1d::uniform(0.0, 1.0, 4).unwrap();
        assert_eq!(mesh.cell_num(), 4);
        assert_eq!(mesh.vertices().len(), 5);
        assert_eq!(mesh.distances().len(), 5);
        assert_relative_eq!(mesh.centers()[0], 0.125, epsilon = 1e-14);
        assert_relative_eq!(mesh.centers()[3], 0.875, epsilon = 1e-14);
        assert_relative_eq!(mesh.distances()[0], 0.125, epsilon = 1e-14);
        assert_relative_eq!(mesh.distances()[2], 0.25, epsilon = 1e-14);
        assert_relative_eq!(mesh.distances()[4], 0.125, epsilon = 1e-14);
        assert_relative_eq!(mesh.measures().sum(), 1.0, epsilon = 1e-14);
        assert_eq!(mesh.interior_vertices().len(), 3);
    }

    #[test]
    fn test_single_cell_mesh() {
        let mesh = Mesh1d::uniform(-1.0, 1.0, 1).unwrap();
        assert_eq!(mesh.cell_num(), 1);
        assert_relative_eq!(mesh.centers()[0], 0.0, epsilon = 1e-14);
        assert_eq!(mesh.interior_vertices().len(), 0);
    }

    #[test]
    fn test_rejects_inconsistent_lengths() {
        let result = Mesh1d::new(
            (0.0, 1.0),
            array![0.0, 0.5, 1.0],
            array![0.25, 0.75],
            array![0.5, 0.5],
            array![0.25, 0.5],
        );
        assert!(matches!(
            result,
            Err(DiffusionError::DimensionMismatch {
                context: "mesh distances",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_non_positive_measure() {
        let result = Mesh1d::new(
            (0.0, 1.0),
            array![0.0, 0.5, 1.0],
            array![0.25, 0.75],
            array![0.5, 0.0],
            array![0.25, 0.5, 0.25],
        );
        assert!(matches!(result, Err(DiffusionError::InvalidMesh(_))));
    }

    #[test]
    fn test_rejects_center_outside_its_cell() {
        let result = Mesh1d::new(
            (0.0, 1.0),
            array![0.0, 0.5, 1.0],
            array![0.6, 0.75],
            array![0.5, 0.5],
            array![0.6, 0.15, 0.25],
        );
        assert!(matches!(result, Err(DiffusionError::InvalidMesh(_))));
    }

    #[test]
    fn test_rejects_empty_and_reversed_domains() {
        assert!(Mesh1d::uniform(0.0, 1.0, 0).is_err());
        assert!(Mesh1d::uniform(1.0, 0.0, 4).is_err());
    }
}
