// src/lib.rs

//! Symbolic curvature of Riemannian manifolds.
//!
//! Given a metric tensor written over coordinate symbols, the crate derives
//! the Christoffel symbols, the Riemann, Ricci and scalar curvatures, and
//! for surfaces the Gaussian curvature and the Euler characteristic. All
//! results are exact symbolic expressions in canonical form.

pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod symbolic;

pub use error::{GeometryError, Result, SymbolicError};
pub use geometry::{
    christoffel_symbols, euler_characteristic, first_fundamental_form, gaussian_curvature,
    ricci_tensor, riemann_tensor, scalar_curvature, validate_metric, Boundary, ChristoffelKind,
    Coordinates, EulerCharacteristic, FirstFundamentalForm, IntegrationStatus, Manifold, Metric,
    TensorType,
};
pub use symbolic::{Bound, Expr, Symbol, TensorArray};
