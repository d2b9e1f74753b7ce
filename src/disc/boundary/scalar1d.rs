use std::fmt;

use crate::disc::boundary::BoundaryPosition;

/// Boundary condition at one end of the domain.
///
/// For `Neumann` the value is the flux added to the end cell's balance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryCondition<V = f64> {
    Dirichlet(V),
    Neumann(V),
}
impl<V> BoundaryCondition<V> {
    #[cfg(test)]
    pub fn value(&self) -> &V {
        match self {
            BoundaryCondition::Dirichlet(v) | BoundaryCondition::Neumann(v) => v,
        }
    }
    pub fn is_neumann(&self) -> bool {
        matches!(self, BoundaryCondition::Neumann(_))
    }
    pub fn map<W>(&self, f: impl FnOnce(&V) -> W) -> BoundaryCondition<W> {
        match self {
            BoundaryCondition::Dirichlet(v) => BoundaryCondition::Dirichlet(f(v)),
            BoundaryCondition::Neumann(v) => BoundaryCondition::Neumann(f(v)),
        }
    }
}
impl BoundaryCondition<BoundaryValue> {
    /// Theta-weighted boundary value over the interval `[t, t + dt]`.
    pub fn blend(&self, t: f64, dt: f64, theta: f64) -> BoundaryCondition<f64> {
        self.map(|v| theta * v.evaluate(t + dt) + (1.0 - theta) * v.evaluate(t))
    }
}

pub enum BoundaryValue {
    Constant(f64),
    TimeDependent(Box<dyn Fn(f64) -> f64>),
}
impl BoundaryValue {
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            BoundaryValue::Constant(v) => *v,
            BoundaryValue::TimeDependent(func) => func(t),
        }
    }
}
impl fmt::Debug for BoundaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryValue::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            BoundaryValue::TimeDependent(_) => f.write_str("TimeDependent(..)"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryPair<V = f64> {
    pub left: BoundaryCondition<V>,
    pub right: BoundaryCondition<V>,
}
impl<V> BoundaryPair<V> {
    pub fn new(left: BoundaryCondition<V>, right: BoundaryCondition<V>) -> Self {
        Self { left, right }
    }
    pub fn get(&self, position: BoundaryPosition) -> &BoundaryCondition<V> {
        match position {
            BoundaryPosition::Left => &self.left,
            BoundaryPosition::Right => &self.right,
        }
    }
    /// Both ends flux-only: the operator has a one-dimensional null space.
    pub fn is_singular(&self) -> bool {
        self.left.is_neumann() && self.right.is_neumann()
    }
}
impl BoundaryPair<BoundaryValue> {
    pub fn blend(&self, t: f64, dt: f64, theta: f64) -> BoundaryPair<f64> {
        BoundaryPair::new(
            self.left.blend(t, dt, theta),
            self.right.blend(t, dt, theta),
        )
    }
}
