// src/geometry/metric.rs

//! Metric tensors, coordinate lists and the metric validator.

use log::debug;
use serde::Serialize;

use crate::error::{GeometryError, Result, SymbolicError};
use crate::symbolic::{Expr, Matrix, Symbol};

/// A square matrix of expressions, symmetric by contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    matrix: Matrix,
}

impl Metric {
    pub fn new(matrix: Matrix) -> Result<Self> {
        if !matrix.is_square() {
            return Err(SymbolicError::NotSquare {
                rows: matrix.rows(),
                cols: matrix.cols(),
            }
            .into());
        }
        Ok(Metric { matrix })
    }

    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self> {
        Metric::new(Matrix::from_rows(rows)?)
    }

    /// Orthogonal metric `diag(entries)`.
    pub fn diagonal(entries: Vec<Expr>) -> Self {
        Metric {
            matrix: Matrix::diagonal(entries),
        }
    }

    pub fn dimension(&self) -> usize {
        self.matrix.rows()
    }

    /// `g_ij`.
    pub fn get(&self, i: usize, j: usize) -> &Expr {
        self.matrix.get(i, j)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn determinant(&self) -> Result<Expr> {
        Ok(self.matrix.determinant()?)
    }

    /// `g^ij`; a singular metric is reported as [`GeometryError::NotInvertible`].
    pub fn inverse(&self) -> Result<Matrix> {
        self.matrix.inverse().map_err(|e| match e {
            SymbolicError::Singular => GeometryError::NotInvertible,
            other => other.into(),
        })
    }

    pub fn check_symmetric(&self) -> Result<()> {
        match self.matrix.asymmetry()? {
            Some((row, col)) => Err(GeometryError::NotSymmetric { row, col }),
            None => Ok(()),
        }
    }

    pub fn subs(&self, var: &Symbol, value: &Expr) -> Metric {
        Metric {
            matrix: self.matrix.subs(var, value),
        }
    }
}

/// Ordered, duplicate-free coordinate symbols. Position `i` names the
/// `i`-th row and column of the metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coordinates(Vec<Symbol>);

impl Coordinates {
    pub fn new(symbols: Vec<Symbol>) -> Result<Self> {
        for (i, s) in symbols.iter().enumerate() {
            if symbols[..i].iter().any(|prev| prev.name() == s.name()) {
                return Err(GeometryError::DuplicateCoordinate(s.name().to_string()));
            }
        }
        Ok(Coordinates(symbols))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> &Symbol {
        &self.0[i]
    }

    pub fn position(&self, symbol: &Symbol) -> Option<usize> {
        self.0.iter().position(|s| s == symbol)
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }
}

/// Fails when the metric's determinant simplifies to zero or, with
/// `check_symmetry`, when the matrix is not symmetric.
pub fn validate_metric_with(metric: &Metric, check_symmetry: bool) -> Result<()> {
    if check_symmetry {
        metric.check_symmetric()?;
    }
    let det = metric.determinant()?;
    debug!("metric determinant: {}", det);
    if det.is_zero() {
        return Err(GeometryError::NotInvertible);
    }
    Ok(())
}

/// [`validate_metric_with`] using the process configuration.
pub fn validate_metric(metric: &Metric) -> Result<()> {
    validate_metric_with(metric, crate::config::CONFIG.validation.check_symmetry)
}
