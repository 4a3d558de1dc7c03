//! Arbitrary-precision fixed-point scalars.

mod arith;
mod cast;
mod scalar;
mod spec;

pub use arith::{add, div, mul, neg, shift_left, shift_right, sub};
pub use cast::cast;
pub use scalar::FixedPoint;
pub use spec::{FixedCastOption, FixedSpec};
