//! Complex-valued fixed-point and floating-point scalars.

mod fixed;
mod float;

pub use fixed::ComplexFixedPoint;
pub use float::ComplexFloat;
