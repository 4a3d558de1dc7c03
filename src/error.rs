//! Crate-wide error type.
//!
//! One small enum covers every fallible concern, with `Display` +
//! `std::error::Error` bodies (via `thiserror`) so call sites can carry the
//! offending shapes/indices as formatted text instead of matching on a bare
//! `#[derive(Debug)]` variant.

use std::fmt;

/// The seven user-visible error kinds.
#[derive(Debug, thiserror::Error)]
pub enum AtError {
    /// Bit widths out of range, or redundant specifiers inconsistent.
    #[error("spec-invalid: {0}")]
    SpecInvalid(String),

    /// Non-broadcastable shapes, non-conformable matmul dims, or convolve on
    /// a non-1-D operand.
    #[error("shape-mismatch: {0}")]
    ShapeMismatch(String),

    /// Integer index outside axis bounds.
    #[error("index-out-of-range: {0}")]
    IndexOutOfRange(String),

    /// Unsupported key type in subscript, multiple ellipses, or a key tuple
    /// longer than ndim.
    #[error("key-invalid: {0}")]
    KeyInvalid(String),

    /// Malformed decimal string, reshape total-size mismatch, squeezing a
    /// non-size-1 axis, or a negative dimension < -1 in reshape.
    #[error("value-invalid: {0}")]
    ValueInvalid(String),

    /// An ndarray dtype is not supported by a conversion constructor.
    #[error("type-invalid: {0}")]
    TypeInvalid(String),

    /// Quantization mode or base not yet supported by the requested
    /// operation.
    #[error("not-implemented: {0}")]
    NotImplemented(String),
}

pub type AtResult<T> = Result<T, AtError>;

impl AtError {
    pub fn spec_invalid(msg: impl fmt::Display) -> Self {
        Self::SpecInvalid(msg.to_string())
    }

    pub fn shape_mismatch(msg: impl fmt::Display) -> Self {
        Self::ShapeMismatch(msg.to_string())
    }

    pub fn index_out_of_range(msg: impl fmt::Display) -> Self {
        Self::IndexOutOfRange(msg.to_string())
    }

    pub fn key_invalid(msg: impl fmt::Display) -> Self {
        Self::KeyInvalid(msg.to_string())
    }

    pub fn value_invalid(msg: impl fmt::Display) -> Self {
        Self::ValueInvalid(msg.to_string())
    }

    pub fn type_invalid(msg: impl fmt::Display) -> Self {
        Self::TypeInvalid(msg.to_string())
    }

    pub fn not_implemented(msg: impl fmt::Display) -> Self {
        Self::NotImplemented(msg.to_string())
    }
}
