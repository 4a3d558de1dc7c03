//! Arbitrary-precision floating-point scalars.

mod arith;
mod cast;
mod scalar;
mod spec;

pub use arith::scalbn;
pub use cast::cast;
pub use scalar::FloatPoint;
pub use spec::{FloatData, FloatSpec};
