// src/geometry/fundamental_form.rs

//! First fundamental form of a surface.

use serde::Serialize;

use super::metric::Metric;
use crate::error::{GeometryError, Result};
use crate::symbolic::Expr;

/// `E du² + 2F du dv + G dv²`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstFundamentalForm {
    pub e: Expr,
    pub f: Expr,
    pub g: Expr,
}

impl FirstFundamentalForm {
    /// `EG − F²`, unsimplified.
    pub fn determinant(&self) -> Expr {
        &self.e * &self.g - self.f.clone().powi(2)
    }
}

/// `(E, F, G) = (g00, g01, g11)` of a 2×2 metric.
pub fn first_fundamental_form(metric: &Metric) -> Result<FirstFundamentalForm> {
    require_surface(metric.dimension(), "first fundamental form")?;
    Ok(FirstFundamentalForm {
        e: metric.get(0, 0).clone(),
        f: metric.get(0, 1).clone(),
        g: metric.get(1, 1).clone(),
    })
}

pub(crate) fn require_surface(dimension: usize, operation: &'static str) -> Result<()> {
    if dimension == 2 {
        Ok(())
    } else {
        Err(GeometryError::Dimension {
            operation,
            expected: 2,
            found: dimension,
        })
    }
}
