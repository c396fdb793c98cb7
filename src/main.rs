// src/main.rs

//! `core-curvature [EXAMPLE | --list]`: computes every applicable invariant
//! of a built-in example metric and prints a JSON report.

use anyhow::{bail, Context};
use log::info;
use serde::Serialize;
use std::time::Instant;

use core_curvature::catalog::{self, Example};
use core_curvature::config::CONFIG;
use core_curvature::geometry::{
    ChristoffelKind, EulerCharacteristic, FirstFundamentalForm, Manifold, TensorType,
};
use core_curvature::symbolic::{Expr, TensorArray};

const DEFAULT_EXAMPLE: &str = "sphere";

/// Non-zero entry of a tensor array.
#[derive(Serialize)]
struct Entry {
    index: Vec<usize>,
    value: Expr,
}

#[derive(Serialize)]
struct Report {
    name: &'static str,
    description: &'static str,
    coordinates: Vec<String>,
    metric: Vec<Vec<Expr>>,
    christoffel_second_kind: Vec<Entry>,
    riemann_covariant: Vec<Entry>,
    ricci: Vec<Entry>,
    scalar_curvature: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_fundamental_form: Option<FirstFundamentalForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gaussian_curvature: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    euler_characteristic: Option<EulerCharacteristic>,
}

fn nonzero(array: &TensorArray) -> Vec<Entry> {
    array
        .nonzero()
        .map(|(index, value)| Entry {
            index,
            value: value.clone(),
        })
        .collect()
}

fn report(example: Example) -> anyhow::Result<Report> {
    let started = Instant::now();
    let manifold = Manifold::with_config(
        example.metric.clone(),
        example.coordinates.clone(),
        CONFIG.clone(),
    )
    .with_context(|| format!("Invalid metric for example '{}'", example.name))?;
    let n = manifold.dimension();

    let christoffel = nonzero(manifold.christoffel(ChristoffelKind::Second)?);
    let riemann = nonzero(manifold.riemann(TensorType::Covariant)?);
    let ricci = nonzero(manifold.ricci()?);
    let scalar_curvature = manifold.scalar_curvature()?;

    let (form, gaussian, euler) = if n == 2 {
        let euler = match &example.bounds {
            Some(bounds) => Some(
                manifold
                    .euler_characteristic(bounds, None)
                    .context("Gauss-Bonnet integration failed")?,
            ),
            None => None,
        };
        (
            Some(manifold.first_fundamental_form()?),
            Some(manifold.gaussian_curvature()?),
            euler,
        )
    } else {
        (None, None, None)
    };
    info!("'{}' computed in {:?}", example.name, started.elapsed());

    Ok(Report {
        name: example.name,
        description: example.description,
        coordinates: example
            .coordinates
            .iter()
            .map(|s| s.name().to_string())
            .collect(),
        metric: (0..n)
            .map(|i| example.metric.matrix().row(i).to_vec())
            .collect(),
        christoffel_second_kind: christoffel,
        riemann_covariant: riemann,
        ricci,
        scalar_curvature,
        first_fundamental_form: form,
        gaussian_curvature: gaussian,
        euler_characteristic: euler,
    })
}

/// Main entry point for the `core-curvature` binary.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--list") {
        for name in catalog::NAMES {
            println!("{}", name);
        }
        return Ok(());
    }
    let name = arg.as_deref().unwrap_or(DEFAULT_EXAMPLE);
    let Some(example) = catalog::by_name(name) else {
        bail!(
            "unknown example '{}'; expected one of: {}",
            name,
            catalog::NAMES.join(", ")
        );
    };
    let example = example.context("Failed to build example metric")?;
    info!("Computing curvature of '{}'", example.name);

    let report = report(example)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
