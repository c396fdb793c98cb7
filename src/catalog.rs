// src/catalog.rs

//! Built-in example metrics.

use crate::error::Result;
use crate::geometry::{Coordinates, Metric};
use crate::symbolic::{Bound, Expr, Symbol};

/// A named metric, its coordinates and, for closed surfaces, the coordinate
/// rectangle Gauss-Bonnet integrates over.
#[derive(Debug, Clone)]
pub struct Example {
    pub name: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub coordinates: Coordinates,
    pub bounds: Option<[Bound; 2]>,
}

pub const NAMES: [&str; 6] = ["sphere", "torus", "plane", "polar", "hyperbolic", "three-sphere"];

pub fn by_name(name: &str) -> Option<Result<Example>> {
    let example = match name {
        "sphere" => sphere(),
        "torus" => torus(),
        "plane" => plane(),
        "polar" => polar(),
        "hyperbolic" => hyperbolic(),
        "three-sphere" => three_sphere(),
        _ => return None,
    };
    Some(example)
}

pub fn all() -> Result<Vec<Example>> {
    NAMES
        .iter()
        .filter_map(|name| by_name(name))
        .collect()
}

/// Round sphere of radius `R`: `diag(R², R² sin²θ)` over `(θ, φ)`.
pub fn sphere() -> Result<Example> {
    let r = Expr::sym(&Symbol::positive("R"));
    let theta = Symbol::new("theta");
    let phi = Symbol::new("phi");
    let metric = Metric::diagonal(vec![
        r.clone().powi(2),
        r.powi(2) * Expr::sin(Expr::sym(&theta)).powi(2),
    ]);
    Ok(Example {
        name: "sphere",
        description: "round sphere of radius R",
        metric,
        bounds: Some([
            Bound::new(&theta, Expr::zero(), Expr::pi()),
            Bound::new(&phi, Expr::zero(), Expr::int(2) * Expr::pi()),
        ]),
        coordinates: Coordinates::new(vec![theta, phi])?,
    })
}

/// Torus of revolution with tube radius `r` around a circle of radius `R`.
pub fn torus() -> Result<Example> {
    let big = Expr::sym(&Symbol::positive("R"));
    let small = Expr::sym(&Symbol::positive("r"));
    let theta = Symbol::new("theta");
    let phi = Symbol::new("phi");
    let ring = big + small.clone() * Expr::cos(Expr::sym(&theta));
    let metric = Metric::diagonal(vec![small.powi(2), ring.powi(2)]);
    let two_pi = Expr::int(2) * Expr::pi();
    Ok(Example {
        name: "torus",
        description: "torus of revolution, R > r > 0",
        metric,
        bounds: Some([
            Bound::new(&theta, Expr::zero(), two_pi.clone()),
            Bound::new(&phi, Expr::zero(), two_pi),
        ]),
        coordinates: Coordinates::new(vec![theta, phi])?,
    })
}

/// Euclidean plane in Cartesian coordinates.
pub fn plane() -> Result<Example> {
    let x = Symbol::new("x");
    let y = Symbol::new("y");
    Ok(Example {
        name: "plane",
        description: "Euclidean plane, Cartesian coordinates",
        metric: Metric::diagonal(vec![Expr::one(), Expr::one()]),
        coordinates: Coordinates::new(vec![x, y])?,
        bounds: None,
    })
}

/// Euclidean plane in polar coordinates: flat, with non-zero Christoffels.
pub fn polar() -> Result<Example> {
    let rho = Symbol::positive("rho");
    let theta = Symbol::new("theta");
    Ok(Example {
        name: "polar",
        description: "Euclidean plane, polar coordinates",
        metric: Metric::diagonal(vec![Expr::one(), Expr::sym(&rho).powi(2)]),
        coordinates: Coordinates::new(vec![rho, theta])?,
        bounds: None,
    })
}

/// Poincaré half-plane `(dx² + dy²) / y²`, `y > 0`.
pub fn hyperbolic() -> Result<Example> {
    let x = Symbol::new("x");
    let y = Symbol::positive("y");
    let inv_y2 = Expr::sym(&y).powi(-2);
    Ok(Example {
        name: "hyperbolic",
        description: "Poincare half-plane",
        metric: Metric::diagonal(vec![inv_y2.clone(), inv_y2]),
        coordinates: Coordinates::new(vec![x, y])?,
        bounds: None,
    })
}

/// Round 3-sphere of radius `R` in hyperspherical coordinates.
pub fn three_sphere() -> Result<Example> {
    let r2 = Expr::sym(&Symbol::positive("R")).powi(2);
    let chi = Symbol::new("chi");
    let theta = Symbol::new("theta");
    let phi = Symbol::new("phi");
    let sin_chi2 = Expr::sin(Expr::sym(&chi)).powi(2);
    let sin_theta2 = Expr::sin(Expr::sym(&theta)).powi(2);
    let metric = Metric::diagonal(vec![
        r2.clone(),
        &r2 * &sin_chi2,
        r2 * sin_chi2 * sin_theta2,
    ]);
    Ok(Example {
        name: "three-sphere",
        description: "round 3-sphere of radius R",
        metric,
        coordinates: Coordinates::new(vec![chi, theta, phi])?,
        bounds: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn every_name_resolves() {
        let examples = all().unwrap();
        assert_eq!(examples.len(), NAMES.len());
        for (example, name) in examples.iter().zip(NAMES) {
            assert_eq!(example.name, name);
            assert_eq!(example.metric.dimension(), example.coordinates.len());
        }
        assert!(by_name("klein-bottle").is_none());
    }

    #[test_log::test]
    fn closed_surfaces_carry_bounds() {
        assert!(sphere().unwrap().bounds.is_some());
        assert!(torus().unwrap().bounds.is_some());
        assert!(plane().unwrap().bounds.is_none());
    }
}
