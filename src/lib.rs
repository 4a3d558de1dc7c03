//! Arbitrary-precision, user-configurable numeric types for deterministic
//! numeric simulation.
//!
//! This crate provides fixed-point and floating-point scalars (real and
//! complex) with caller-chosen bit widths, a shared fifteen-mode
//! quantization vocabulary and three-mode overflow handling for casting
//! between them, and an N-dimensional array layer over all of the above.
//! Every operation is designed to be bit-reproducible regardless of thread
//! count — the point of the crate is to let hardware and DSP models predict
//! exactly the rounding and overflow behavior of a fixed-width target
//! before that target exists in silicon.
//!
//! # Module overview
//!
//! - `limb` — two's-complement multi-limb integer arithmetic: the kernel
//!   every other module builds on.
//! - `scratch` — an inline-small-storage vector so short operands (the
//!   common case) never allocate.
//! - `bcd` — exact binary/decimal conversion for fixed-point string I/O.
//! - `quantize` — the shared guard/round/sticky rounding-mode vocabulary.
//! - `rng` — the seeded, reproducible bit source stochastic rounding draws
//!   from.
//! - `context` — scoped, thread-local default quantization/overflow/
//!   accumulator options.
//! - `fixed` — fixed-point scalars: spec, cast engine, arithmetic.
//! - `float` — custom floating-point scalars: spec, cast engine,
//!   arithmetic.
//! - `complex` — complex-valued fixed-point and floating-point scalars.
//! - `array` — N-dimensional arrays of any scalar type above: indexing,
//!   broadcasting, reductions, matmul, convolution.
//! - `sched` — the bounded worker pool `array::reduce::fold_last_axis` and
//!   `array::linalg::matmul` dispatch to once an operation is large enough
//!   for partitioning to pay off.
//! - `error` — the crate's error type.
//!
//! # Design goals
//!
//! - Bit-exact, reproducible results independent of thread count.
//! - No silent precision loss: every cast states its rounding and overflow
//!   behavior explicitly.
//! - Small operands stay allocation-free; large ones scale to arbitrary
//!   width.

pub mod array;
pub mod bcd;
pub mod complex;
pub mod context;
pub mod error;
pub mod fixed;
pub mod float;
pub mod limb;
pub mod quantize;
pub mod rng;
pub mod scratch;
pub mod sched;

pub use error::{AtError, AtResult};
pub use quantize::{OverflowMode, QuantizationMode};
