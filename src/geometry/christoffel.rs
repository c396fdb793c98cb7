// src/geometry/christoffel.rs

//! Christoffel symbols of the Levi-Civita connection.
//!
//! Index layout:
//! - first kind `[c, a, b]` = Γ_{cab} = ½ (∂_a g_{bc} + ∂_b g_{ca} − ∂_c g_{ab})
//! - second kind `[k, i, j]` = Γ^k_{ij} = Σ_m g^{km} Γ_{mij}
//!
//! Both are symmetric in their last two indices.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use super::manifold::Manifold;
use super::metric::{Coordinates, Metric};
use crate::error::{GeometryError, Result};
use crate::symbolic::{Expr, TensorArray};

pub(crate) const STAGE: &str = "christoffel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChristoffelKind {
    First,
    Second,
}

impl FromStr for ChristoffelKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(ChristoffelKind::First),
            "second" => Ok(ChristoffelKind::Second),
            other => Err(GeometryError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for ChristoffelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChristoffelKind::First => "first",
            ChristoffelKind::Second => "second",
        })
    }
}

/// Christoffel symbols of `metric` over `coordinates`.
pub fn christoffel_symbols(
    metric: &Metric,
    coordinates: &Coordinates,
    kind: ChristoffelKind,
) -> Result<TensorArray> {
    let manifold = Manifold::new(metric.clone(), coordinates.clone())?;
    Ok(manifold.christoffel(kind)?.clone())
}

/// `[m, i, j]` = ∂g_{ij}/∂x^m, simplified.
pub(crate) fn metric_derivatives(manifold: &Manifold) -> Result<TensorArray> {
    let n = manifold.dimension();
    let metric = manifold.metric();
    let coords = manifold.coordinates();
    let shape = [n, n, n];
    let parallel = manifold.parallel_for(n * n * n);
    let raw = TensorArray::try_from_fn(&shape, parallel, |index| {
        let [m, i, j] = [index[0], index[1], index[2]];
        manifold.budget().check(STAGE)?;
        Ok::<_, GeometryError>(metric.get(i, j).diff(coords.get(m)))
    })?;
    Ok(raw.simplified(parallel)?)
}

pub(crate) fn first_kind(manifold: &Manifold) -> Result<TensorArray> {
    let started = Instant::now();
    let n = manifold.dimension();
    let dg = manifold.metric_derivatives()?;
    let parallel = manifold.parallel_for(n * n * n);
    let half = Expr::rational(1, 2);
    let raw = TensorArray::try_from_fn(&[n, n, n], parallel, |index| {
        let [c, a, b] = [index[0], index[1], index[2]];
        manifold.budget().check(STAGE)?;
        let sum = Expr::sum([
            dg[[a, b, c]].clone(),
            dg[[b, c, a]].clone(),
            -dg[[c, a, b]].clone(),
        ]);
        Ok::<_, GeometryError>(&half * &sum)
    })?;
    let gamma = raw.simplified(parallel)?;
    debug!("christoffel (first kind) computed in {:?}", started.elapsed());
    Ok(gamma)
}

pub(crate) fn second_kind(manifold: &Manifold) -> Result<TensorArray> {
    let started = Instant::now();
    let n = manifold.dimension();
    let first = manifold.christoffel(ChristoffelKind::First)?;
    let inverse = manifold.inverse_metric()?;
    let parallel = manifold.parallel_for(n * n * n);
    let raw = TensorArray::try_from_fn(&[n, n, n], parallel, |index| {
        let [k, i, j] = [index[0], index[1], index[2]];
        manifold.budget().check(STAGE)?;
        let entry = Expr::sum((0..n).map(|m| inverse.get(k, m) * &first[[m, i, j]]));
        trace!("Γ^{}_{}{} = {}", k, i, j, entry);
        Ok::<_, GeometryError>(entry)
    })?;
    let gamma = raw.simplified(parallel)?;
    debug!("christoffel (second kind) computed in {:?}", started.elapsed());
    Ok(gamma)
}
