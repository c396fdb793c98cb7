// src/geometry/ricci.rs

//! Ricci tensor and scalar curvature, contracted from the covariant
//! Riemann tensor with the inverse metric.

use log::debug;
use std::time::Instant;

use super::manifold::Manifold;
use super::metric::{Coordinates, Metric};
use super::riemann::TensorType;
use crate::error::{GeometryError, Result};
use crate::symbolic::{Expr, TensorArray};

pub(crate) const STAGE: &str = "ricci";

/// Ricci tensor `R_hk` of `metric` over `coordinates`.
pub fn ricci_tensor(metric: &Metric, coordinates: &Coordinates) -> Result<TensorArray> {
    let manifold = Manifold::new(metric.clone(), coordinates.clone())?;
    Ok(manifold.ricci()?.clone())
}

/// Scalar curvature of `metric` over `coordinates`.
pub fn scalar_curvature(metric: &Metric, coordinates: &Coordinates) -> Result<Expr> {
    Manifold::new(metric.clone(), coordinates.clone())?.scalar_curvature()
}

/// `[h, k]` = Σ_{a,b} g^{ab} R_{ahbk}.
pub(crate) fn ricci(manifold: &Manifold) -> Result<TensorArray> {
    let started = Instant::now();
    let n = manifold.dimension();
    let riemann = manifold.riemann(TensorType::Covariant)?;
    let inverse = manifold.inverse_metric()?;
    let parallel = manifold.parallel_for(n * n);
    let raw = TensorArray::try_from_fn(&[n, n], parallel, |index| {
        let [h, k] = [index[0], index[1]];
        manifold.budget().check(STAGE)?;
        let mut terms = Vec::with_capacity(n * n);
        for a in 0..n {
            for b in 0..n {
                terms.push(inverse.get(a, b) * &riemann[[a, h, b, k]]);
            }
        }
        Ok::<_, GeometryError>(Expr::sum(terms))
    })?;
    let ricci = raw.simplified(parallel)?;
    debug!("ricci tensor computed in {:?}", started.elapsed());
    Ok(ricci)
}

/// Σ_{a,b} g^{ab} R_{ab}.
pub(crate) fn scalar(manifold: &Manifold) -> Result<Expr> {
    let n = manifold.dimension();
    let ricci = manifold.ricci()?;
    let inverse = manifold.inverse_metric()?;
    manifold.budget().check(STAGE)?;
    let mut terms = Vec::with_capacity(n * n);
    for a in 0..n {
        for b in 0..n {
            terms.push(inverse.get(a, b) * &ricci[[a, b]]);
        }
    }
    Ok(Expr::sum(terms).simplify()?)
}
