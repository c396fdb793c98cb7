// src/symbolic/matrix.rs

//! Dense symbolic matrices.

use super::canonical::{canonicalize, Frac};
use super::expr::Expr;
use super::symbol::Symbol;
use crate::error::SymbolicError;

type Result<T> = std::result::Result<T, SymbolicError>;

/// Row-major matrix of expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Expr>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<Expr>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(SymbolicError::Shape {
                expected: rows * cols,
                found: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a matrix from equally long rows.
    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self> {
        let n = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n * cols);
        for row in rows {
            if row.len() != cols {
                return Err(SymbolicError::Shape {
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Matrix::new(n, cols, data)
    }

    pub fn diagonal(entries: Vec<Expr>) -> Self {
        let n = entries.len();
        let mut data = vec![Expr::zero(); n * n];
        for (i, e) in entries.into_iter().enumerate() {
            data[i * n + i] = e;
        }
        Matrix { rows: n, cols: n, data }
    }

    pub fn identity(n: usize) -> Self {
        Matrix::diagonal(vec![Expr::one(); n])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// # Panics
    /// Panics if `(i, j)` is out of range.
    pub fn get(&self, i: usize, j: usize) -> &Expr {
        assert!(i < self.rows && j < self.cols, "index ({}, {}) out of range", i, j);
        &self.data[i * self.cols + j]
    }

    pub fn row(&self, i: usize) -> &[Expr] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn entries(&self) -> impl Iterator<Item = &Expr> {
        self.data.iter()
    }

    pub fn map(&self, f: impl FnMut(&Expr) -> Expr) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub fn simplify(&self) -> Result<Matrix> {
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(Expr::simplify).collect::<Result<_>>()?,
        })
    }

    pub fn subs(&self, var: &Symbol, value: &Expr) -> Matrix {
        self.map(|e| e.subs(var, value))
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.get(i, j).clone());
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// `Some((i, j))` for the first pair with `m[i][j] != m[j][i]` after
    /// simplification, `None` if symmetric.
    pub fn asymmetry(&self) -> Result<Option<(usize, usize)>> {
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                if !self.get(i, j).is_equivalent(self.get(j, i))? {
                    return Ok(Some((i, j)));
                }
            }
        }
        Ok(None)
    }

    fn require_square(&self) -> Result<usize> {
        if self.is_square() {
            Ok(self.rows)
        } else {
            Err(SymbolicError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    fn to_fracs(&self) -> Result<Vec<Vec<Frac>>> {
        (0..self.rows)
            .map(|i| self.row(i).iter().map(canonicalize).collect())
            .collect()
    }

    fn from_fracs(rows: &[Vec<Frac>]) -> Matrix {
        let n = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        Matrix {
            rows: n,
            cols,
            data: rows.iter().flatten().map(Frac::to_expr).collect(),
        }
    }

    /// Determinant by fraction-exact Gaussian elimination.
    pub fn determinant(&self) -> Result<Expr> {
        let n = self.require_square()?;
        let mut a = self.to_fracs()?;
        let mut det = Frac::one();
        for col in 0..n {
            let Some(pivot_row) = (col..n).find(|&r| !a[r][col].is_zero()) else {
                return Ok(Expr::zero());
            };
            if pivot_row != col {
                a.swap(pivot_row, col);
                det = det.neg();
            }
            let pivot = a[col][col].clone();
            det = det.mul(&pivot)?;
            for r in (col + 1)..n {
                if a[r][col].is_zero() {
                    continue;
                }
                let factor = a[r][col].div(&pivot)?;
                for c in col..n {
                    a[r][c] = a[r][c].sub(&factor.mul(&a[col][c])?)?;
                }
            }
        }
        Ok(det.to_expr())
    }

    /// Inverse by Gauss-Jordan elimination; entries come back canonical.
    pub fn inverse(&self) -> Result<Matrix> {
        let n = self.require_square()?;
        let mut a = self.to_fracs()?;
        let mut inv: Vec<Vec<Frac>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { Frac::one() } else { Frac::zero() })
                    .collect()
            })
            .collect();
        for col in 0..n {
            let pivot_row = (col..n)
                .find(|&r| !a[r][col].is_zero())
                .ok_or(SymbolicError::Singular)?;
            a.swap(pivot_row, col);
            inv.swap(pivot_row, col);
            let scale = a[col][col].recip()?;
            for c in 0..n {
                a[col][c] = a[col][c].mul(&scale)?;
                inv[col][c] = inv[col][c].mul(&scale)?;
            }
            for r in (0..n).filter(|&r| r != col) {
                let factor = a[r][col].clone();
                if factor.is_zero() {
                    continue;
                }
                for c in 0..n {
                    a[r][c] = a[r][c].sub(&factor.mul(&a[col][c])?)?;
                    inv[r][c] = inv[r][c].sub(&factor.mul(&inv[col][c])?)?;
                }
            }
        }
        Ok(Matrix::from_fracs(&inv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Expr {
        Expr::sym(&Symbol::new(name))
    }

    #[test_log::test]
    fn determinant_of_general_two_by_two() {
        let m = Matrix::from_rows(vec![
            vec![sym("a"), sym("b")],
            vec![sym("c"), sym("d")],
        ])
        .unwrap();
        let expected = sym("a") * sym("d") - sym("b") * sym("c");
        assert!(m.determinant().unwrap().is_equivalent(&expected).unwrap());
    }

    #[test_log::test]
    fn inverse_times_matrix_is_identity() {
        let x = sym("x");
        let m = Matrix::from_rows(vec![
            vec![Expr::one(), x.clone()],
            vec![x.clone(), Expr::one() + x.clone().powi(2) + sym("y").powi(2)],
        ])
        .unwrap();
        let inv = m.inverse().unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let entry = Expr::sum((0..2).map(|k| m.get(i, k) * inv.get(k, j)));
                let expected = if i == j { Expr::one() } else { Expr::zero() };
                assert!(entry.is_equivalent(&expected).unwrap(), "({}, {})", i, j);
            }
        }
    }

    #[test_log::test]
    fn singular_and_non_square_inputs() {
        let x = sym("x");
        let singular = Matrix::from_rows(vec![
            vec![x.clone(), x.clone()],
            vec![x.clone(), x.clone()],
        ])
        .unwrap();
        assert_eq!(singular.inverse(), Err(SymbolicError::Singular));
        assert!(singular.determinant().unwrap().is_zero());

        let wide = Matrix::new(1, 2, vec![x.clone(), x]).unwrap();
        assert_eq!(wide.determinant(), Err(SymbolicError::NotSquare { rows: 1, cols: 2 }));
    }

    #[test_log::test]
    fn ragged_rows_are_rejected() {
        let err = Matrix::from_rows(vec![vec![Expr::one()], vec![Expr::one(), Expr::zero()]]);
        assert!(matches!(err, Err(SymbolicError::Shape { .. })));
    }
}
