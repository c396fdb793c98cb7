// src/geometry/riemann.rs

//! The Riemann curvature tensor.
//!
//! Contravariant layout `[rho, sigma, mu, nu]` holds
//!
//! R^ρ_{σμν} = ∂_μ Γ^ρ_{νσ} − ∂_ν Γ^ρ_{μσ} + Σ_λ Γ^ρ_{μλ} Γ^λ_{νσ} − Σ_λ Γ^ρ_{νλ} Γ^λ_{μσ}
//!
//! and the covariant layout `[lambda, i, kappa, j]` lowers the first index:
//! R_{λiκj} = Σ_s g_{λs} R^s_{ikj}.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use super::christoffel::ChristoffelKind;
use super::manifold::Manifold;
use super::metric::{Coordinates, Metric};
use crate::error::{GeometryError, Result};
use crate::symbolic::{Expr, TensorArray};

pub(crate) const STAGE: &str = "riemann";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorType {
    Covariant,
    Contravariant,
}

impl FromStr for TensorType {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "covariant" => Ok(TensorType::Covariant),
            "contravariant" => Ok(TensorType::Contravariant),
            other => Err(GeometryError::InvalidTensorType(other.to_string())),
        }
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TensorType::Covariant => "covariant",
            TensorType::Contravariant => "contravariant",
        })
    }
}

/// Riemann tensor of `metric` over `coordinates`.
pub fn riemann_tensor(
    metric: &Metric,
    coordinates: &Coordinates,
    tensor_type: TensorType,
) -> Result<TensorArray> {
    let manifold = Manifold::new(metric.clone(), coordinates.clone())?;
    Ok(manifold.riemann(tensor_type)?.clone())
}

pub(crate) fn contravariant(manifold: &Manifold) -> Result<TensorArray> {
    let started = Instant::now();
    let n = manifold.dimension();
    let coords = manifold.coordinates();
    let gamma = manifold.christoffel(ChristoffelKind::Second)?;

    // [d, k, i, j] = ∂_d Γ^k_{ij}
    let parallel = manifold.parallel_for(n.pow(4));
    let d_gamma = TensorArray::try_from_fn(&[n, n, n, n], parallel, |index| {
        let [d, k, i, j] = [index[0], index[1], index[2], index[3]];
        manifold.budget().check(STAGE)?;
        Ok::<_, GeometryError>(gamma[[k, i, j]].diff(coords.get(d)))
    })?
    .simplified(parallel)?;

    let raw = TensorArray::try_from_fn(&[n, n, n, n], parallel, |index| {
        let [rho, sigma, mu, nu] = [index[0], index[1], index[2], index[3]];
        manifold.budget().check(STAGE)?;
        let mut terms = vec![
            d_gamma[[mu, rho, nu, sigma]].clone(),
            -d_gamma[[nu, rho, mu, sigma]].clone(),
        ];
        for lambda in 0..n {
            terms.push(&gamma[[rho, mu, lambda]] * &gamma[[lambda, nu, sigma]]);
            terms.push(-(&gamma[[rho, nu, lambda]] * &gamma[[lambda, mu, sigma]]));
        }
        Ok::<_, GeometryError>(Expr::sum(terms))
    })?;
    let riemann = raw.simplified(parallel)?;
    debug!("riemann (contravariant) computed in {:?}", started.elapsed());
    Ok(riemann)
}

pub(crate) fn covariant(manifold: &Manifold) -> Result<TensorArray> {
    let started = Instant::now();
    let n = manifold.dimension();
    let metric = manifold.metric();
    let upper = manifold.riemann(TensorType::Contravariant)?;
    let parallel = manifold.parallel_for(n.pow(4));
    let raw = TensorArray::try_from_fn(&[n, n, n, n], parallel, |index| {
        let [lambda, i, kappa, j] = [index[0], index[1], index[2], index[3]];
        manifold.budget().check(STAGE)?;
        let entry = Expr::sum((0..n).map(|s| metric.get(lambda, s) * &upper[[s, i, kappa, j]]));
        Ok::<_, GeometryError>(entry)
    })?;
    let riemann = raw.simplified(parallel)?;
    debug!("riemann (covariant) computed in {:?}", started.elapsed());
    Ok(riemann)
}
