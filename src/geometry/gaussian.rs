// src/geometry/gaussian.rs

//! Gaussian curvature of a surface by the Brioschi formula, which needs only
//! the first fundamental form and its derivatives up to second order.

use log::debug;

use super::fundamental_form::FirstFundamentalForm;
use super::manifold::Manifold;
use super::metric::{Coordinates, Metric};
use crate::error::{GeometryError, Result};
use crate::symbolic::{Expr, Matrix, Symbol};

/// Gaussian curvature `K` of a 2×2 metric over `(u, v)`.
pub fn gaussian_curvature(metric: &Metric, coordinates: &Coordinates) -> Result<Expr> {
    Manifold::new(metric.clone(), coordinates.clone())?.gaussian_curvature()
}

/// K = (det M1 − det M2) / (EG − F²)².
pub(crate) fn brioschi(form: &FirstFundamentalForm, u: &Symbol, v: &Symbol) -> Result<Expr> {
    let FirstFundamentalForm { e, f, g } = form;
    let denominator = form.determinant().simplify()?;
    if denominator.is_zero() {
        return Err(GeometryError::NotInvertible);
    }
    let half = |x: Expr| Expr::rational(1, 2) * x;

    let e_u = e.diff(u);
    let e_v = e.diff(v);
    let f_u = f.diff(u);
    let f_v = f.diff(v);
    let g_u = g.diff(u);
    let g_v = g.diff(v);
    let e_vv = e_v.diff(v);
    let f_uv = f_u.diff(v);
    let g_uu = g_u.diff(u);

    let m1 = Matrix::from_rows(vec![
        vec![
            half(-e_vv) + f_uv - half(g_uu),
            half(e_u),
            f_u - half(e_v.clone()),
        ],
        vec![f_v - half(g_u.clone()), e.clone(), f.clone()],
        vec![half(g_v), f.clone(), g.clone()],
    ])?;
    let m2 = Matrix::from_rows(vec![
        vec![Expr::zero(), half(e_v.clone()), half(g_u.clone())],
        vec![half(e_v), e.clone(), f.clone()],
        vec![half(g_u), f.clone(), g.clone()],
    ])?;

    let numerator = m1.determinant()? - m2.determinant()?;
    let k = (numerator / denominator.powi(2)).simplify()?;
    debug!("gaussian curvature: {}", k);
    Ok(k)
}
