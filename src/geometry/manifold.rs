// src/geometry/manifold.rs

//! A metric over its coordinates, with write-once caches for every
//! intermediate the curvature stages share.
//!
//! Stages ask the manifold for what they need (`inverse_metric`,
//! `christoffel`, `riemann`, ...); each value is computed on first request
//! and reused for the lifetime of the manifold. Nothing is shared between
//! manifolds.

use log::debug;
use once_cell::sync::OnceCell;

use super::budget::Budget;
use super::christoffel::{self, ChristoffelKind};
use super::euler::{self, Boundary, EulerCharacteristic};
use super::fundamental_form::{self, FirstFundamentalForm};
use super::gaussian;
use super::metric::{validate_metric_with, Coordinates, Metric};
use super::riemann::{self, TensorType};
use super::ricci;
use crate::config::{Config, CONFIG};
use crate::error::{GeometryError, Result};
use crate::symbolic::{Bound, Expr, Matrix, TensorArray};

#[derive(Debug)]
pub struct Manifold {
    metric: Metric,
    coordinates: Coordinates,
    config: Config,
    budget: Budget,
    inverse: OnceCell<Matrix>,
    metric_derivatives: OnceCell<TensorArray>,
    christoffel_first: OnceCell<TensorArray>,
    christoffel_second: OnceCell<TensorArray>,
    riemann_contravariant: OnceCell<TensorArray>,
    riemann_covariant: OnceCell<TensorArray>,
    ricci: OnceCell<TensorArray>,
    gaussian: OnceCell<Expr>,
}

impl Manifold {
    /// Validates `metric` against `coordinates` using the process
    /// configuration.
    pub fn new(metric: Metric, coordinates: Coordinates) -> Result<Self> {
        Manifold::with_config(metric, coordinates, CONFIG.clone())
    }

    pub fn with_config(metric: Metric, coordinates: Coordinates, config: Config) -> Result<Self> {
        let n = metric.dimension();
        if coordinates.len() != n {
            return Err(GeometryError::CoordinateMismatch {
                coordinates: coordinates.len(),
                dimension: n,
            });
        }
        if n > config.limits.max_dimension {
            return Err(GeometryError::ResourceExhausted {
                dimension: n,
                limit: config.limits.max_dimension,
            });
        }
        validate_metric_with(&metric, config.validation.check_symmetry)?;
        debug!("validated {}x{} metric over {:?}", n, n, coordinates.as_slice());
        let budget = Budget::from_config(&config);
        Ok(Manifold {
            metric,
            coordinates,
            config,
            budget,
            inverse: OnceCell::new(),
            metric_derivatives: OnceCell::new(),
            christoffel_first: OnceCell::new(),
            christoffel_second: OnceCell::new(),
            riemann_contravariant: OnceCell::new(),
            riemann_covariant: OnceCell::new(),
            ricci: OnceCell::new(),
            gaussian: OnceCell::new(),
        })
    }

    /// Replaces the budget derived from the configuration.
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn dimension(&self) -> usize {
        self.metric.dimension()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Whether an array with `entries` entries is filled on the rayon pool.
    pub(crate) fn parallel_for(&self, entries: usize) -> bool {
        self.config.compute.parallel && entries >= self.config.compute.min_parallel_entries
    }

    pub fn inverse_metric(&self) -> Result<&Matrix> {
        self.inverse.get_or_try_init(|| self.metric.inverse())
    }

    /// `[m, i, j]` = ∂_m g_{ij}.
    pub fn metric_derivatives(&self) -> Result<&TensorArray> {
        self.metric_derivatives
            .get_or_try_init(|| christoffel::metric_derivatives(self))
    }

    pub fn christoffel(&self, kind: ChristoffelKind) -> Result<&TensorArray> {
        match kind {
            ChristoffelKind::First => self
                .christoffel_first
                .get_or_try_init(|| christoffel::first_kind(self)),
            ChristoffelKind::Second => self
                .christoffel_second
                .get_or_try_init(|| christoffel::second_kind(self)),
        }
    }

    pub fn riemann(&self, tensor_type: TensorType) -> Result<&TensorArray> {
        match tensor_type {
            TensorType::Contravariant => self
                .riemann_contravariant
                .get_or_try_init(|| riemann::contravariant(self)),
            TensorType::Covariant => self
                .riemann_covariant
                .get_or_try_init(|| riemann::covariant(self)),
        }
    }

    pub fn ricci(&self) -> Result<&TensorArray> {
        self.ricci.get_or_try_init(|| ricci::ricci(self))
    }

    pub fn scalar_curvature(&self) -> Result<Expr> {
        ricci::scalar(self)
    }

    pub fn first_fundamental_form(&self) -> Result<FirstFundamentalForm> {
        fundamental_form::first_fundamental_form(&self.metric)
    }

    pub fn gaussian_curvature(&self) -> Result<Expr> {
        self.gaussian
            .get_or_try_init(|| {
                let form = self.first_fundamental_form()?;
                gaussian::brioschi(&form, self.coordinates.get(0), self.coordinates.get(1))
            })
            .cloned()
    }

    pub fn euler_characteristic(
        &self,
        bounds: &[Bound; 2],
        boundary: Option<&Boundary>,
    ) -> Result<EulerCharacteristic> {
        euler::gauss_bonnet(self, bounds, boundary)
    }
}
