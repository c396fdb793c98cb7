// src/symbolic/array.rs

//! N-dimensional arrays of expressions, used for every tensor the
//! curvature pipeline produces.

use rayon::prelude::*;
use serde::Serialize;
use std::ops::Index;

use super::expr::Expr;
use crate::error::SymbolicError;

/// Row-major array of expressions with a fixed shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TensorArray {
    shape: Vec<usize>,
    data: Vec<Expr>,
}

impl TensorArray {
    pub fn zeros(shape: &[usize]) -> Self {
        TensorArray {
            shape: shape.to_vec(),
            data: vec![Expr::zero(); shape.iter().product()],
        }
    }

    pub fn from_vec(shape: &[usize], data: Vec<Expr>) -> Result<Self, SymbolicError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(SymbolicError::Shape {
                expected,
                found: data.len(),
            });
        }
        Ok(TensorArray {
            shape: shape.to_vec(),
            data,
        })
    }

    /// Fills every entry from its multi-index. With `parallel`, entries are
    /// computed on the rayon pool; the first error wins either way.
    pub fn try_from_fn<F, E>(shape: &[usize], parallel: bool, f: F) -> Result<Self, E>
    where
        F: Fn(&[usize]) -> Result<Expr, E> + Sync + Send,
        E: Send,
    {
        let len: usize = shape.iter().product();
        let build = |flat: usize| f(&unravel(shape, flat));
        let data = if parallel {
            (0..len).into_par_iter().map(build).collect::<Result<Vec<_>, E>>()?
        } else {
            (0..len).map(build).collect::<Result<Vec<_>, E>>()?
        };
        Ok(TensorArray {
            shape: shape.to_vec(),
            data,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// # Panics
    /// Panics if `index` has the wrong rank or is out of range.
    pub fn get(&self, index: &[usize]) -> &Expr {
        &self.data[self.offset(index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, &Expr)> {
        self.data
            .iter()
            .enumerate()
            .map(move |(flat, e)| (unravel(&self.shape, flat), e))
    }

    /// Entries that are not structurally zero.
    pub fn nonzero(&self) -> impl Iterator<Item = (Vec<usize>, &Expr)> {
        self.iter().filter(|(_, e)| !e.is_zero())
    }

    /// True when every entry is structurally zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(Expr::is_zero)
    }

    /// Every entry brought to canonical form.
    pub fn simplified(&self, parallel: bool) -> Result<TensorArray, SymbolicError> {
        let data = if parallel {
            self.data.par_iter().map(Expr::simplify).collect::<Result<Vec<_>, _>>()?
        } else {
            self.data.iter().map(Expr::simplify).collect::<Result<Vec<_>, _>>()?
        };
        Ok(TensorArray {
            shape: self.shape.clone(),
            data,
        })
    }

    fn offset(&self, index: &[usize]) -> usize {
        assert_eq!(
            index.len(),
            self.shape.len(),
            "rank {} index into rank {} array",
            index.len(),
            self.shape.len()
        );
        index.iter().zip(&self.shape).fold(0, |acc, (&i, &n)| {
            assert!(i < n, "index {:?} out of range for shape {:?}", index, self.shape);
            acc * n + i
        })
    }
}

impl Index<&[usize]> for TensorArray {
    type Output = Expr;

    fn index(&self, index: &[usize]) -> &Expr {
        self.get(index)
    }
}

impl<const N: usize> Index<[usize; N]> for TensorArray {
    type Output = Expr;

    fn index(&self, index: [usize; N]) -> &Expr {
        self.get(&index)
    }
}

fn unravel(shape: &[usize], mut flat: usize) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, &n) in index.iter_mut().zip(shape).rev() {
        *slot = flat % n;
        flat /= n;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn row_major_layout() {
        let t = TensorArray::try_from_fn(&[2, 3], false, |i| {
            Ok::<_, SymbolicError>(Expr::int((i[0] * 10 + i[1]) as i64))
        })
        .unwrap();
        assert_eq!(t[[1, 2]], Expr::int(12));
        assert_eq!(t.get(&[0, 1]), &Expr::int(1));
        assert_eq!(t.rank(), 2);
        assert_eq!(t.len(), 6);
    }

    #[test_log::test]
    fn parallel_fill_matches_sequential() {
        let f = |i: &[usize]| Ok::<_, SymbolicError>(Expr::int((i[0] + 2 * i[1] + 3 * i[2]) as i64));
        let a = TensorArray::try_from_fn(&[3, 3, 3], false, f).unwrap();
        let b = TensorArray::try_from_fn(&[3, 3, 3], true, f).unwrap();
        assert_eq!(a, b);
    }

    #[test_log::test]
    fn errors_propagate_from_the_fill() {
        let result = TensorArray::try_from_fn(&[2, 2], true, |i| {
            if *i == [1, 1] {
                Err(SymbolicError::Singular)
            } else {
                Ok(Expr::zero())
            }
        });
        assert_eq!(result, Err(SymbolicError::Singular));
    }

    #[test_log::test]
    fn shape_mismatch_is_rejected() {
        let err = TensorArray::from_vec(&[2, 2], vec![Expr::zero(); 3]).unwrap_err();
        assert_eq!(err, SymbolicError::Shape { expected: 4, found: 3 });
    }
}
