// src/geometry/mod.rs

//! The curvature pipeline.
//!
//! Data flows metric → Christoffel → Riemann → Ricci → scalar curvature, and
//! metric → first fundamental form → Gaussian curvature → Euler
//! characteristic. The free functions each take a metric and its
//! coordinates; [`Manifold`] runs several stages over one metric without
//! recomputing shared intermediates.

pub mod budget;
pub mod christoffel;
pub mod euler;
pub mod fundamental_form;
pub mod gaussian;
pub mod manifold;
pub mod metric;
pub mod ricci;
pub mod riemann;

pub use budget::{Budget, CancelToken};
pub use christoffel::{christoffel_symbols, ChristoffelKind};
pub use euler::{euler_characteristic, Boundary, EulerCharacteristic, IntegrationStatus};
pub use fundamental_form::{first_fundamental_form, FirstFundamentalForm};
pub use gaussian::gaussian_curvature;
pub use manifold::Manifold;
pub use metric::{validate_metric, validate_metric_with, Coordinates, Metric};
pub use ricci::{ricci_tensor, scalar_curvature};
pub use riemann::{riemann_tensor, TensorType};

#[cfg(test)]
mod tests;
