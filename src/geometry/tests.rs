// src/geometry/tests.rs

use super::*;
use crate::catalog::{self, Example};
use crate::config::Config;
use crate::error::GeometryError;
use crate::symbolic::{Bound, Expr, Symbol};

fn manifold(example: Example) -> Manifold {
    Manifold::with_config(example.metric, example.coordinates, Config::default())
        .expect("valid example metric")
}

fn serial_config() -> Config {
    let mut config = Config::default();
    config.compute.parallel = false;
    config
}

fn assert_equivalent(actual: &Expr, expected: &Expr) {
    assert!(
        actual.is_equivalent(expected).expect("simplifies"),
        "expected {}, got {}",
        expected,
        actual
    );
}

fn sin(e: Expr) -> Expr {
    Expr::sin(e)
}

fn cos(e: Expr) -> Expr {
    Expr::cos(e)
}

fn theta() -> Expr {
    Expr::sym(&Symbol::new("theta"))
}

fn big_r() -> Expr {
    Expr::sym(&Symbol::positive("R"))
}

/// `[[1, x], [x, 1 + x² + y²]]`: non-diagonal, determinant `1 + y²`.
fn skew_example() -> (Metric, Coordinates) {
    let x = Symbol::new("x");
    let y = Symbol::new("y");
    let ex = Expr::sym(&x);
    let ey = Expr::sym(&y);
    let metric = Metric::from_rows(vec![
        vec![Expr::one(), ex.clone()],
        vec![ex.clone(), Expr::one() + ex.powi(2) + ey.powi(2)],
    ])
    .unwrap();
    (metric, Coordinates::new(vec![x, y]).unwrap())
}

// --- Sphere ---

#[test_log::test]
fn sphere_christoffel_second_kind() {
    let m = manifold(catalog::sphere().unwrap());
    let gamma = m.christoffel(ChristoffelKind::Second).unwrap();
    assert_eq!(gamma.shape(), &[2, 2, 2]);
    assert_equivalent(&gamma[[0, 1, 1]], &-(sin(theta()) * cos(theta())));
    assert_equivalent(&gamma[[1, 0, 1]], &Expr::cot(theta()));
    assert_equivalent(&gamma[[1, 1, 0]], &Expr::cot(theta()));
    for index in [[0usize, 0, 0], [0, 0, 1], [0, 1, 0], [1, 0, 0], [1, 1, 1]] {
        assert!(gamma[index].is_zero(), "Γ{:?} = {}", index, gamma[index]);
    }
}

#[test_log::test]
fn sphere_christoffel_first_kind() {
    let m = manifold(catalog::sphere().unwrap());
    let gamma = m.christoffel(ChristoffelKind::First).unwrap();
    let rsc = big_r().powi(2) * sin(theta()) * cos(theta());
    assert_equivalent(&gamma[[0, 1, 1]], &-rsc.clone());
    assert_equivalent(&gamma[[1, 0, 1]], &rsc);
    assert_equivalent(&gamma[[1, 1, 0]], &rsc);
    assert!(gamma[[0, 0, 0]].is_zero());
}

#[test_log::test]
fn sphere_riemann_both_layouts() {
    let m = manifold(catalog::sphere().unwrap());
    let upper = m.riemann(TensorType::Contravariant).unwrap();
    assert_equivalent(&upper[[0, 1, 0, 1]], &sin(theta()).powi(2));
    assert_equivalent(&upper[[0, 1, 1, 0]], &-sin(theta()).powi(2));
    let lower = m.riemann(TensorType::Covariant).unwrap();
    assert_equivalent(&lower[[0, 1, 0, 1]], &(big_r().powi(2) * sin(theta()).powi(2)));
    assert!(lower[[0, 0, 0, 1]].is_zero());
}

#[test_log::test]
fn sphere_curvatures() {
    let m = manifold(catalog::sphere().unwrap());
    let scalar = m.scalar_curvature().unwrap();
    assert_eq!(scalar, (Expr::int(2) / big_r().powi(2)).simplify().unwrap());
    let k = m.gaussian_curvature().unwrap();
    assert_eq!(k, big_r().powi(-2).simplify().unwrap());
    assert_equivalent(&scalar, &(Expr::int(2) * k));
}

#[test_log::test]
fn sphere_euler_characteristic_in_either_order() {
    let example = catalog::sphere().unwrap();
    let [theta_bound, phi_bound] = example.bounds.clone().expect("closed surface");
    let m = manifold(example);

    let chi = m.euler_characteristic(&[theta_bound.clone(), phi_bound.clone()], None).unwrap();
    assert_eq!(chi.status, IntegrationStatus::Closed);
    assert_eq!(chi.as_integer(), Some(2));

    let chi = m.euler_characteristic(&[phi_bound, theta_bound], None).unwrap();
    assert_eq!(chi.as_integer(), Some(2));
}

#[test_log::test]
fn sphere_euler_characteristic_over_full_polar_turn() {
    // theta over [0, 2pi], phi over [0, pi]: |sin theta| changes sign mid-range.
    let example = catalog::sphere().unwrap();
    let bounds = [
        Bound::new(&Symbol::new("theta"), Expr::zero(), Expr::int(2) * Expr::pi()),
        Bound::new(&Symbol::new("phi"), Expr::zero(), Expr::pi()),
    ];
    let chi = euler_characteristic(&example.metric, &example.coordinates, &bounds, None).unwrap();
    assert_eq!(chi.status, IntegrationStatus::Closed);
    assert_eq!(chi.as_integer(), Some(2));
}

// --- Flat metrics ---

#[test_log::test]
fn cartesian_plane_is_flat() {
    let m = manifold(catalog::plane().unwrap());
    assert!(m.christoffel(ChristoffelKind::First).unwrap().is_zero());
    assert!(m.christoffel(ChristoffelKind::Second).unwrap().is_zero());
    assert!(m.riemann(TensorType::Covariant).unwrap().is_zero());
    assert!(m.ricci().unwrap().is_zero());
    assert!(m.scalar_curvature().unwrap().is_zero());
    assert!(m.gaussian_curvature().unwrap().is_zero());
}

#[test_log::test]
fn polar_plane_has_connection_but_no_curvature() {
    let m = manifold(catalog::polar().unwrap());
    let rho = Expr::sym(&Symbol::positive("rho"));
    let gamma = m.christoffel(ChristoffelKind::Second).unwrap();
    assert_equivalent(&gamma[[0, 1, 1]], &-rho.clone());
    assert_equivalent(&gamma[[1, 0, 1]], &rho.powi(-1));
    assert!(m.riemann(TensorType::Contravariant).unwrap().is_zero());
    assert!(m.gaussian_curvature().unwrap().is_zero());
}

// --- Other catalog surfaces ---

#[test_log::test]
fn torus_curvature_and_euler_characteristic() {
    let example = catalog::torus().unwrap();
    let bounds = example.bounds.clone().expect("closed surface");
    let m = manifold(example);
    let r = Expr::sym(&Symbol::positive("r"));
    let expected = cos(theta()) / (r.clone() * (big_r() + r * cos(theta())));

    let k = m.gaussian_curvature().unwrap();
    assert_equivalent(&k, &expected);
    assert_equivalent(&m.scalar_curvature().unwrap(), &(Expr::int(2) * k));

    let chi = m.euler_characteristic(&bounds, None).unwrap();
    assert!(chi.is_complete());
    assert_eq!(chi.as_integer(), Some(0));
}

#[test_log::test]
fn hyperbolic_plane_has_constant_negative_curvature() {
    let m = manifold(catalog::hyperbolic().unwrap());
    assert_eq!(m.gaussian_curvature().unwrap(), Expr::int(-1));
    assert_eq!(m.scalar_curvature().unwrap(), Expr::int(-2));
}

#[test_log::test]
fn three_sphere_scalar_curvature() {
    let m = manifold(catalog::three_sphere().unwrap());
    assert_eq!(m.riemann(TensorType::Covariant).unwrap().shape(), &[3, 3, 3, 3]);
    assert_equivalent(&m.scalar_curvature().unwrap(), &(Expr::int(6) / big_r().powi(2)));
}

// --- Identities ---

#[test_log::test]
fn non_diagonal_metric_scalar_is_twice_gaussian() {
    let (metric, coords) = skew_example();
    let m = Manifold::with_config(metric, coords, Config::default()).unwrap();
    let k = m.gaussian_curvature().unwrap();
    assert_equivalent(&m.scalar_curvature().unwrap(), &(Expr::int(2) * k));
}

#[test_log::test]
fn covariant_riemann_symmetries() {
    let (metric, coords) = skew_example();
    let skew = Manifold::with_config(metric, coords, Config::default()).unwrap();
    let torus = manifold(catalog::torus().unwrap());
    for m in [&skew, &torus] {
        let r = m.riemann(TensorType::Covariant).unwrap();
        let n = m.dimension();
        for a in 0..n {
            for b in 0..n {
                for c in 0..n {
                    for d in 0..n {
                        let v = &r[[a, b, c, d]];
                        assert_equivalent(v, &-r[[b, a, c, d]].clone());
                        assert_equivalent(v, &-r[[a, b, d, c]].clone());
                        assert_equivalent(v, &r[[c, d, a, b]]);
                        let bianchi = Expr::sum([
                            v.clone(),
                            r[[a, c, d, b]].clone(),
                            r[[a, d, b, c]].clone(),
                        ]);
                        assert!(bianchi.simplify().unwrap().is_zero());
                    }
                }
            }
        }
    }
}

#[test_log::test]
fn christoffel_symmetric_in_lower_indices() {
    let (metric, coords) = skew_example();
    let gamma = christoffel_symbols(&metric, &coords, ChristoffelKind::Second).unwrap();
    for k in 0..2 {
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(gamma[[k, i, j]], gamma[[k, j, i]]);
            }
        }
    }
}

#[test_log::test]
fn results_are_already_simplified() {
    let m = manifold(catalog::torus().unwrap());
    for kind in [ChristoffelKind::First, ChristoffelKind::Second] {
        for (_, entry) in m.christoffel(kind).unwrap().iter() {
            assert_eq!(&entry.simplify().unwrap(), entry);
        }
    }
    for (_, entry) in m.ricci().unwrap().iter() {
        assert_eq!(&entry.simplify().unwrap(), entry);
    }
}

#[test_log::test]
fn renaming_coordinates_renames_results() {
    let example = catalog::sphere().unwrap();
    let u = Symbol::new("u");
    let v = Symbol::new("v");
    let theta = Symbol::new("theta");
    let renamed = example.metric.subs(&theta, &Expr::sym(&u));
    let coords = Coordinates::new(vec![u.clone(), v]).unwrap();
    let k_renamed = gaussian_curvature(&renamed, &coords).unwrap();
    let k = manifold(example).gaussian_curvature().unwrap();
    assert_eq!(k_renamed, k.subs(&theta, &Expr::sym(&u)).simplify().unwrap());

    let gamma = christoffel_symbols(&renamed, &coords, ChristoffelKind::Second).unwrap();
    assert_equivalent(&gamma[[1, 0, 1]], &Expr::cot(Expr::sym(&u)));
}

#[test_log::test]
fn renaming_both_coordinates_preserves_ricci_and_scalar() {
    let (metric, coords) = skew_example();
    let (x, y) = (Symbol::new("x"), Symbol::new("y"));
    let (u, v) = (Symbol::new("u"), Symbol::new("v"));
    let rename = |e: &Expr| e.subs(&x, &Expr::sym(&u)).subs(&y, &Expr::sym(&v));

    let renamed_metric = Metric::from_rows(
        (0..2)
            .map(|i| metric.matrix().row(i).iter().map(rename).collect())
            .collect(),
    )
    .unwrap();
    let renamed_coords = Coordinates::new(vec![u.clone(), v.clone()]).unwrap();

    let original = Manifold::with_config(metric, coords, Config::default()).unwrap();
    let renamed = Manifold::with_config(renamed_metric, renamed_coords, Config::default()).unwrap();

    let ricci = original.ricci().unwrap();
    let renamed_ricci = renamed.ricci().unwrap();
    assert_eq!(ricci.shape(), renamed_ricci.shape());
    assert!(!ricci.is_zero());
    for (index, value) in ricci.iter() {
        assert_eq!(
            renamed_ricci[index.as_slice()],
            rename(value).simplify().unwrap(),
            "Ric{:?}",
            index
        );
    }
    let scalar = original.scalar_curvature().unwrap();
    assert!(scalar.depends_on(&y));
    assert_eq!(
        renamed.scalar_curvature().unwrap(),
        rename(&scalar).simplify().unwrap()
    );
}

#[test_log::test]
fn free_functions_agree_with_manifold() {
    let example = catalog::sphere().unwrap();
    let ricci = ricci_tensor(&example.metric, &example.coordinates).unwrap();
    let scalar = scalar_curvature(&example.metric, &example.coordinates).unwrap();
    let riemann = riemann_tensor(&example.metric, &example.coordinates, TensorType::Covariant).unwrap();
    let m = manifold(example);
    assert_eq!(&ricci, m.ricci().unwrap());
    assert_eq!(scalar, m.scalar_curvature().unwrap());
    assert_eq!(&riemann, m.riemann(TensorType::Covariant).unwrap());
}

#[test_log::test]
fn parallel_and_serial_evaluation_agree() {
    let example = catalog::three_sphere().unwrap();
    let serial = Manifold::with_config(
        example.metric.clone(),
        example.coordinates.clone(),
        serial_config(),
    )
    .unwrap();
    let mut eager = Config::default();
    eager.compute.min_parallel_entries = 1;
    let parallel = Manifold::with_config(example.metric, example.coordinates, eager).unwrap();
    assert_eq!(
        serial.riemann(TensorType::Covariant).unwrap(),
        parallel.riemann(TensorType::Covariant).unwrap()
    );
}

// --- Validation and error paths ---

#[test_log::test]
fn singular_metric_is_rejected() {
    let x = Expr::sym(&Symbol::new("x"));
    let metric = Metric::from_rows(vec![vec![x.clone(), x.clone()], vec![x.clone(), x]]).unwrap();
    assert_eq!(validate_metric_with(&metric, true), Err(GeometryError::NotInvertible));
    let coords = Coordinates::new(vec![Symbol::new("x"), Symbol::new("y")]).unwrap();
    let err = Manifold::with_config(metric, coords, Config::default()).unwrap_err();
    assert_eq!(err, GeometryError::NotInvertible);
}

#[test_log::test]
fn asymmetric_metric_is_rejected_when_checked() {
    let x = Expr::sym(&Symbol::new("x"));
    let metric = Metric::from_rows(vec![vec![Expr::one(), x], vec![Expr::zero(), Expr::one()]]).unwrap();
    assert_eq!(
        validate_metric_with(&metric, true),
        Err(GeometryError::NotSymmetric { row: 0, col: 1 })
    );
    assert_eq!(validate_metric_with(&metric, false), Ok(()));
}

#[test_log::test]
fn coordinate_list_must_match_metric() {
    let example = catalog::sphere().unwrap();
    let coords = Coordinates::new(vec![Symbol::new("theta")]).unwrap();
    let err = Manifold::with_config(example.metric, coords, Config::default()).unwrap_err();
    assert_eq!(err, GeometryError::CoordinateMismatch { coordinates: 1, dimension: 2 });

    let err = Coordinates::new(vec![Symbol::new("x"), Symbol::new("x")]).unwrap_err();
    assert_eq!(err, GeometryError::DuplicateCoordinate("x".to_string()));

    // Same name under different assumptions is still the same coordinate.
    let err = Coordinates::new(vec![Symbol::new("x"), Symbol::positive("x")]).unwrap_err();
    assert_eq!(err, GeometryError::DuplicateCoordinate("x".to_string()));
}

#[test_log::test]
fn dimension_limit_is_enforced() {
    let example = catalog::three_sphere().unwrap();
    let mut config = Config::default();
    config.limits.max_dimension = 2;
    let err = Manifold::with_config(example.metric, example.coordinates, config).unwrap_err();
    assert_eq!(err, GeometryError::ResourceExhausted { dimension: 3, limit: 2 });
}

#[test_log::test]
fn surface_operations_require_two_dimensions() {
    let example = catalog::three_sphere().unwrap();
    assert!(matches!(
        first_fundamental_form(&example.metric),
        Err(GeometryError::Dimension { expected: 2, found: 3, .. })
    ));
    let bounds = [
        Bound::new(&Symbol::new("chi"), Expr::zero(), Expr::pi()),
        Bound::new(&Symbol::new("theta"), Expr::zero(), Expr::pi()),
    ];
    let m = manifold(example);
    assert!(matches!(
        m.gaussian_curvature(),
        Err(GeometryError::Dimension { expected: 2, found: 3, .. })
    ));
    assert!(matches!(
        m.euler_characteristic(&bounds, None),
        Err(GeometryError::Dimension { expected: 2, found: 3, .. })
    ));
}

#[test_log::test]
fn boundaries_are_rejected_before_integration() {
    let example = catalog::sphere().unwrap();
    let bounds = example.bounds.clone().expect("closed surface");
    let boundary = Boundary {
        curve: vec![theta(), Expr::zero()],
    };
    let err = euler_characteristic(&example.metric, &example.coordinates, &bounds, Some(&boundary))
        .unwrap_err();
    assert_eq!(err, GeometryError::UnsupportedBoundary);
}

#[test_log::test]
fn bound_variables_must_be_coordinates() {
    let example = catalog::sphere().unwrap();
    let psi = Symbol::new("psi");
    let bounds = [
        Bound::new(&psi, Expr::zero(), Expr::pi()),
        Bound::new(&Symbol::new("phi"), Expr::zero(), Expr::int(2) * Expr::pi()),
    ];
    let err = manifold(example).euler_characteristic(&bounds, None).unwrap_err();
    assert_eq!(err, GeometryError::UnknownBoundVariable("psi".to_string()));
}

#[test_log::test]
fn bound_variables_must_be_distinct() {
    let example = catalog::sphere().unwrap();
    let theta = Symbol::new("theta");
    let bounds = [
        Bound::new(&theta, Expr::zero(), Expr::pi()),
        Bound::new(&theta, Expr::zero(), Expr::pi()),
    ];
    let err = euler_characteristic(&example.metric, &example.coordinates, &bounds, None)
        .unwrap_err();
    assert_eq!(err, GeometryError::RepeatedBoundVariable("theta".to_string()));
}

#[test_log::test]
fn unintegrable_curvature_is_reported_incomplete() {
    // du² + exp(u²)² dv²: K dA = -(2 + 4u²) exp(u²) has no elementary antiderivative.
    let u = Symbol::new("u");
    let v = Symbol::new("v");
    let metric = Metric::diagonal(vec![
        Expr::one(),
        Expr::exp(Expr::sym(&u).powi(2)).powi(2),
    ]);
    let coords = Coordinates::new(vec![u.clone(), v.clone()]).unwrap();
    let m = Manifold::with_config(metric, coords, Config::default()).unwrap();
    let bounds = [
        Bound::new(&u, Expr::zero(), Expr::one()),
        Bound::new(&v, Expr::zero(), Expr::int(2) * Expr::pi()),
    ];
    let chi = m.euler_characteristic(&bounds, None).unwrap();
    assert_eq!(chi.status, IntegrationStatus::Incomplete);
    assert!(chi.value.contains_integral());
}

#[test_log::test]
fn mode_strings_parse() {
    assert_eq!("first".parse::<ChristoffelKind>(), Ok(ChristoffelKind::First));
    assert_eq!("second".parse::<ChristoffelKind>(), Ok(ChristoffelKind::Second));
    assert_eq!(
        "third".parse::<ChristoffelKind>(),
        Err(GeometryError::InvalidKind("third".to_string()))
    );
    assert_eq!("covariant".parse::<TensorType>(), Ok(TensorType::Covariant));
    assert_eq!("contravariant".parse::<TensorType>(), Ok(TensorType::Contravariant));
    assert_eq!(
        "mixed".parse::<TensorType>(),
        Err(GeometryError::InvalidTensorType("mixed".to_string()))
    );
}

#[test_log::test]
fn cancelled_budget_aborts_christoffel_stage() {
    let token = CancelToken::new();
    token.cancel();
    let example = catalog::sphere().unwrap();
    let m = Manifold::with_config(example.metric, example.coordinates, serial_config())
        .unwrap()
        .with_budget(Budget::unlimited().with_cancel_token(token));
    assert_eq!(
        m.christoffel(ChristoffelKind::Second).unwrap_err(),
        GeometryError::Cancelled { stage: "christoffel" }
    );
}

#[test_log::test]
fn enums_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&ChristoffelKind::Second).unwrap(), "\"second\"");
    assert_eq!(serde_json::to_string(&TensorType::Covariant).unwrap(), "\"covariant\"");
    assert_eq!(serde_json::to_string(&IntegrationStatus::Incomplete).unwrap(), "\"incomplete\"");
}
