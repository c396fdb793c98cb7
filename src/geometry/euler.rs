// src/geometry/euler.rs

//! Euler characteristic of a closed surface by Gauss-Bonnet:
//! χ = (1/2π) ∫∫ K dA with dA = sqrt(EG − F²) du dv.

use log::{debug, warn};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::fundamental_form::FirstFundamentalForm;
use super::manifold::Manifold;
use super::metric::{Coordinates, Metric};
use crate::error::{GeometryError, Result};
use crate::symbolic::{integrate_over, manifest_sign, Bound, Expr, Func};

pub(crate) const STAGE: &str = "integration";

/// Boundary curve of a surface patch, as parametrized coordinate
/// expressions. Accepted only to be rejected: manifolds with boundary are
/// not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Boundary {
    pub curve: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationStatus {
    /// The integral was evaluated in closed form.
    Closed,
    /// The value still contains an unevaluated integral.
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EulerCharacteristic {
    pub value: Expr,
    pub status: IntegrationStatus,
}

impl EulerCharacteristic {
    pub fn is_complete(&self) -> bool {
        self.status == IntegrationStatus::Closed
    }

    /// The value as an integer, when it is one.
    pub fn as_integer(&self) -> Option<i64> {
        let n = self.value.as_rational()?;
        if n.is_integer() {
            n.to_integer().to_i64()
        } else {
            None
        }
    }
}

/// Euler characteristic of the surface with metric `metric` over the
/// coordinate rectangle `bounds` (first bound innermost).
pub fn euler_characteristic(
    metric: &Metric,
    coordinates: &Coordinates,
    bounds: &[Bound; 2],
    boundary: Option<&Boundary>,
) -> Result<EulerCharacteristic> {
    if boundary.is_some() {
        return Err(GeometryError::UnsupportedBoundary);
    }
    Manifold::new(metric.clone(), coordinates.clone())?.euler_characteristic(bounds, boundary)
}

pub(crate) fn gauss_bonnet(
    manifold: &Manifold,
    bounds: &[Bound; 2],
    boundary: Option<&Boundary>,
) -> Result<EulerCharacteristic> {
    if boundary.is_some() {
        return Err(GeometryError::UnsupportedBoundary);
    }
    let form = manifold.first_fundamental_form()?;
    for bound in bounds {
        if manifold.coordinates().position(&bound.var).is_none() {
            return Err(GeometryError::UnknownBoundVariable(bound.var.name().to_string()));
        }
    }
    if bounds[0].var.name() == bounds[1].var.name() {
        return Err(GeometryError::RepeatedBoundVariable(bounds[1].var.name().to_string()));
    }
    let curvature = manifold.gaussian_curvature()?;
    let area = area_element(&form, bounds)?;
    debug!("area element: {}", area);
    let integrand = (&curvature * &area).simplify()?;

    manifold.budget().check(STAGE)?;
    let total = integrate_over(&integrand, bounds)?;
    let value = (total / (Expr::int(2) * Expr::pi())).simplify()?;
    let status = if value.contains_integral() {
        warn!("Gauss-Bonnet integral has no closed form; returning it unevaluated");
        IntegrationStatus::Incomplete
    } else {
        IntegrationStatus::Closed
    };
    debug!("euler characteristic: {} ({:?})", value, status);
    Ok(EulerCharacteristic { value, status })
}

/// sqrt(EG − F²) with every `abs(Q)` the integrator cannot split replaced
/// by `±Q`, using the sign `Q` has at a corner of the domain.
fn area_element(form: &FirstFundamentalForm, bounds: &[Bound; 2]) -> Result<Expr> {
    let area = Expr::sqrt(form.determinant()).simplify()?;
    let mut resolved = area.clone();
    for arg in area.abs_arguments() {
        if is_trig_of_bound(&arg, bounds) {
            continue;
        }
        let replacement = match sign_on_domain(&arg, bounds)? {
            Some(Ordering::Greater) => arg.clone(),
            Some(Ordering::Less) => -arg.clone(),
            _ => continue,
        };
        resolved = resolved.replace(&Expr::abs(arg), &replacement);
    }
    Ok(resolved.simplify()?)
}

fn is_trig_of_bound(arg: &Expr, bounds: &[Bound; 2]) -> bool {
    match arg {
        Expr::Func(Func::Sin | Func::Cos, inner) => bounds
            .iter()
            .any(|b| matches!(inner.as_ref(), Expr::Sym(s) if *s == b.var)),
        _ => false,
    }
}

/// First strict sign `arg` shows at a corner of the bounds rectangle.
fn sign_on_domain(arg: &Expr, bounds: &[Bound; 2]) -> Result<Option<Ordering>> {
    for corner in 0..4usize {
        let mut at = arg.clone();
        for (axis, bound) in bounds.iter().enumerate() {
            let value = if (corner >> axis) & 1 == 0 {
                &bound.lower
            } else {
                &bound.upper
            };
            at = at.subs(&bound.var, value);
        }
        match manifest_sign(&at)? {
            Some(Ordering::Equal) | None => continue,
            strict => return Ok(strict),
        }
    }
    Ok(None)
}
