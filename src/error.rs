// src/error.rs

//! Error types for the symbolic engine and the curvature pipeline.

use thiserror::Error;

/// Failures raised by the algebra engine itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolicError {
    #[error("division by zero while simplifying `{0}`")]
    DivisionByZero(String),
    #[error("matrix is singular")]
    Singular,
    #[error("shape mismatch: expected {expected} entries, found {found}")]
    Shape { expected: usize, found: usize },
    #[error("matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
    #[error("unsupported expression: {0}")]
    Unsupported(String),
}

/// Failures raised by the curvature pipeline.
///
/// Every variant aborts the invocation that produced it. Incomplete
/// integration is not an error; see `IntegrationStatus`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("metric is not invertible: its determinant simplifies to zero")]
    NotInvertible,
    #[error("metric is not symmetric: entries ({row}, {col}) and ({col}, {row}) differ")]
    NotSymmetric { row: usize, col: usize },
    #[error("`{operation}` requires a {expected}x{expected} metric, found {found}x{found}")]
    Dimension {
        operation: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid Christoffel kind `{0}` (expected `first` or `second`)")]
    InvalidKind(String),
    #[error("invalid tensor type `{0}` (expected `covariant` or `contravariant`)")]
    InvalidTensorType(String),
    #[error("manifolds with boundary are not supported")]
    UnsupportedBoundary,
    #[error("{coordinates} coordinates given for a {dimension}x{dimension} metric")]
    CoordinateMismatch { coordinates: usize, dimension: usize },
    #[error("coordinate `{0}` appears more than once")]
    DuplicateCoordinate(String),
    #[error("integration variable `{0}` is not a coordinate")]
    UnknownBoundVariable(String),
    #[error("integration variable `{0}` is bounded more than once")]
    RepeatedBoundVariable(String),
    #[error("dimension {dimension} exceeds the configured limit of {limit}")]
    ResourceExhausted { dimension: usize, limit: usize },
    #[error("deadline exceeded during {stage}")]
    DeadlineExceeded { stage: &'static str },
    #[error("computation cancelled during {stage}")]
    Cancelled { stage: &'static str },
    #[error(transparent)]
    Symbolic(#[from] SymbolicError),
}

pub type Result<T, E = GeometryError> = std::result::Result<T, E>;
