// src/symbolic/integrate.rs

//! Definite integration.
//!
//! The integrator covers what the Gauss-Bonnet integrand needs on the
//! classical surfaces: polynomials in the variable, powers of `exp(x)`,
//! powers of `sin(x)` (optionally times one `cos(x)`), and `|sin(x)|` or
//! `|cos(x)|` over bounds that are rational multiples of `pi`. Anything
//! else comes back as an unevaluated [`Integral`] node.

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::Serialize;

use super::canonical::{canonicalize, pi_multiple, pi_times, Frac};
use super::expr::{Expr, Func, Integral};
use super::poly::{Atom, Monomial, Poly};
use super::symbol::Symbol;
use crate::error::SymbolicError;

type Result<T> = std::result::Result<T, SymbolicError>;

/// Splitting `|sin x|` at more zeros than this is not attempted.
const MAX_ABS_PIECES: usize = 64;

/// One integration variable with its bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Bound {
    pub var: Symbol,
    pub lower: Expr,
    pub upper: Expr,
}

impl Bound {
    pub fn new(var: &Symbol, lower: Expr, upper: Expr) -> Self {
        Bound {
            var: var.clone(),
            lower,
            upper,
        }
    }
}

/// `integral(integrand, (var, lower, upper))`, canonical. Returns an
/// unevaluated integral when no antiderivative is found.
pub fn integrate(integrand: &Expr, var: &Symbol, lower: &Expr, upper: &Expr) -> Result<Expr> {
    let f = canonicalize(integrand)?;
    let a = canonicalize(lower)?;
    let b = canonicalize(upper)?;
    match definite(&f, var, &a, &b)? {
        Some(value) => Ok(value.to_expr()),
        None => {
            debug!("no closed form for integral of {} d{}", f.to_expr(), var);
            Ok(Expr::Integral(Box::new(Integral {
                integrand: f.to_expr(),
                var: var.clone(),
                lower: a.to_expr(),
                upper: b.to_expr(),
            })))
        }
    }
}

/// Iterated integral; `bounds[0]` is the innermost integration.
pub fn integrate_over(integrand: &Expr, bounds: &[Bound]) -> Result<Expr> {
    let mut value = integrand.clone();
    for bound in bounds {
        value = integrate(&value, &bound.var, &bound.lower, &bound.upper)?;
    }
    Ok(value)
}

fn definite(f: &Frac, x: &Symbol, a: &Frac, b: &Frac) -> Result<Option<Frac>> {
    if f.is_zero() {
        return Ok(Some(Frac::zero()));
    }
    if !f.depends_on(x) {
        return Ok(Some(f.mul(&b.sub(a)?)?));
    }
    if let Some((abs, trig)) = abs_trig(f, x) {
        return split_abs(f, x, &abs, trig, a, b);
    }
    if f.den().depends_on(x) {
        return Ok(None);
    }
    let mut anti = Frac::zero();
    for (m, c) in f.num().terms() {
        let (inner, outer) = separate(m, x);
        let Some(primitive) = antiderivative(&inner, x)? else {
            return Ok(None);
        };
        anti = anti.add(&primitive.mul(&Frac::from_poly(Poly::term(outer, c.clone()))?)?)?;
    }
    let anti = anti.div(&Frac::from_poly(f.den().clone())?)?;
    let anti = anti.to_expr();
    let upper = canonicalize(&anti.subs(x, &b.to_expr()))?;
    let lower = canonicalize(&anti.subs(x, &a.to_expr()))?;
    Ok(Some(upper.sub(&lower)?))
}

/// Splits a monomial into the factors that mention `x` and the rest.
fn separate(m: &Monomial, x: &Symbol) -> (Monomial, Monomial) {
    let (inner, outer): (Vec<_>, Vec<_>) = m
        .factors()
        .iter()
        .cloned()
        .partition(|(atom, _)| atom.depends_on(x));
    (Monomial::from_factors(inner), Monomial::from_factors(outer))
}

/// Antiderivative of a monomial in `x` alone.
fn antiderivative(m: &Monomial, x: &Symbol) -> Result<Option<Frac>> {
    let xe = Expr::sym(x);
    let var = Atom::Sym(x.clone());
    let sin = Atom::Func(Func::Sin, xe.clone());
    let cos = Atom::Func(Func::Cos, xe.clone());
    let exp = Atom::Func(Func::Exp, xe);
    let (mut p, mut s, mut c, mut e) = (0u32, 0u32, 0u32, 0u32);
    for (atom, k) in m.factors() {
        if *atom == var {
            p = *k;
        } else if *atom == sin {
            s = *k;
        } else if *atom == cos {
            c = *k;
        } else if *atom == exp {
            e = *k;
        } else {
            return Ok(None);
        }
    }
    let power = |atom: &Atom, k: u32, over: u32| -> Result<Frac> {
        Frac::from_poly(Poly::term(
            Monomial::atom(atom.clone(), k),
            BigRational::new(BigInt::one(), BigInt::from(over)),
        ))
    };
    let value = match (p, s, c, e) {
        (p, 0, 0, 0) => power(&var, p + 1, p + 1)?,
        (0, 0, 0, e) => power(&exp, e, e)?,
        (0, s, 1, 0) => power(&sin, s + 1, s + 1)?,
        (0, s, 0, 0) => sin_power(s, x)?,
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Antiderivative of `sin(x)^n` by the reduction formula
/// `I_n = -sin^(n-1) cos / n + (n-1)/n I_(n-2)`.
fn sin_power(n: u32, x: &Symbol) -> Result<Frac> {
    let xe = Expr::sym(x);
    let sin = Atom::Func(Func::Sin, xe.clone());
    let cos = Frac::atom(Atom::Func(Func::Cos, xe));
    match n {
        0 => Ok(Frac::atom(Atom::Sym(x.clone()))),
        1 => Ok(cos.neg()),
        _ => {
            let n_r = BigRational::from_integer(BigInt::from(n));
            let lead = Frac::from_poly(Poly::term(
                Monomial::atom(sin, n - 1),
                -n_r.recip(),
            ))?
            .mul(&cos)?;
            let ratio = BigRational::new(BigInt::from(n - 1), BigInt::from(n));
            lead.add(&sin_power(n - 2, x)?.mul(&Frac::constant(ratio))?)
        }
    }
}

/// `abs(sin(x))` or `abs(cos(x))` appearing in `f`.
fn abs_trig(f: &Frac, x: &Symbol) -> Option<(Expr, Func)> {
    let target = Expr::sym(x);
    f.num().atoms().into_iter().find_map(|atom| match &atom {
        Atom::Func(Func::Abs, Expr::Func(trig @ (Func::Sin | Func::Cos), inner))
            if **inner == target =>
        {
            Some((atom.to_expr(), *trig))
        }
        _ => None,
    })
}

/// Integrates `f` piecewise between the zeros of the trig function under
/// `abs`, replacing the absolute value by the sign it has on each piece.
fn split_abs(
    f: &Frac,
    x: &Symbol,
    abs: &Expr,
    trig: Func,
    a: &Frac,
    b: &Frac,
) -> Result<Option<Frac>> {
    let (Some(lo), Some(hi)) = (pi_multiple(a), pi_multiple(b)) else {
        return Ok(None);
    };
    if lo > hi {
        return Ok(split_abs(f, x, abs, trig, b, a)?.map(|v| v.neg()));
    }
    // sin vanishes at k pi, cos at (k + 1/2) pi.
    let offset = if trig == Func::Sin {
        BigRational::zero()
    } else {
        BigRational::new(BigInt::one(), BigInt::from(2))
    };
    let mut points = vec![lo.clone()];
    let mut k = (&lo - &offset).floor() + BigRational::one();
    while &k + &offset < hi {
        if points.len() > MAX_ABS_PIECES {
            return Ok(None);
        }
        points.push(&k + &offset);
        k += BigRational::one();
    }
    points.push(hi);

    let trig_expr = Expr::Func(trig, Box::new(Expr::sym(x)));
    let f_expr = f.to_expr();
    let mut total = Frac::zero();
    for piece in points.windows(2) {
        let mid = (&piece[0] + &piece[1]) / BigRational::from_integer(BigInt::from(2));
        // sin(m pi) > 0 iff floor(m) is even; cos(m pi) = sin((m + 1/2) pi).
        let positive = (mid + &offset).floor().to_integer().is_even();
        let replacement = if positive {
            trig_expr.clone()
        } else {
            -trig_expr.clone()
        };
        let g = canonicalize(&f_expr.replace(abs, &replacement))?;
        let lower = pi_times(piece[0].clone());
        let upper = pi_times(piece[1].clone());
        match definite(&g, x, &lower, &upper)? {
            Some(value) => total = total.add(&value)?,
            None => return Ok(None),
        }
    }
    Ok(Some(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Symbol {
        Symbol::new("x")
    }

    fn eval(integrand: Expr, lower: Expr, upper: Expr) -> Expr {
        integrate(&integrand, &x(), &lower, &upper).expect("integrates")
    }

    #[test_log::test]
    fn polynomial() {
        let ex = Expr::sym(&x());
        let value = eval(ex.clone().powi(2) + Expr::int(1), Expr::zero(), Expr::int(3));
        assert_eq!(value, Expr::int(12));
    }

    #[test_log::test]
    fn sine_over_half_period() {
        let ex = Expr::sym(&x());
        assert_eq!(eval(Expr::sin(ex.clone()), Expr::zero(), Expr::pi()), Expr::int(2));
        // sin^2 over a full period is pi.
        let v = eval(Expr::sin(ex.clone()).powi(2), Expr::zero(), Expr::int(2) * Expr::pi());
        assert_eq!(v, Expr::pi());
        // cos^2 reduces to 1 - sin^2.
        let v = eval(Expr::cos(ex).powi(2), Expr::zero(), Expr::pi());
        assert!(v.is_equivalent(&(Expr::pi() / Expr::int(2))).unwrap());
    }

    #[test_log::test]
    fn absolute_sine_over_full_period() {
        let ex = Expr::sym(&x());
        let v = eval(Expr::abs(Expr::sin(ex.clone())), Expr::zero(), Expr::int(2) * Expr::pi());
        assert_eq!(v, Expr::int(4));
        let v = eval(Expr::abs(Expr::cos(ex)), Expr::zero(), Expr::pi());
        assert_eq!(v, Expr::int(2));
    }

    #[test_log::test]
    fn reversed_bounds_flip_the_sign() {
        let ex = Expr::sym(&x());
        let v = eval(Expr::abs(Expr::sin(ex)), Expr::pi(), Expr::zero());
        assert_eq!(v, Expr::int(-2));
    }

    #[test_log::test]
    fn exponentials() {
        let ex = Expr::sym(&x());
        let v = eval(Expr::exp(Expr::int(2) * ex), Expr::zero(), Expr::one());
        let expected = (Expr::exp(Expr::int(2)) - Expr::one()) / Expr::int(2);
        assert!(v.is_equivalent(&expected).unwrap());
    }

    #[test_log::test]
    fn unsupported_integrand_stays_unevaluated() {
        let ex = Expr::sym(&x());
        let v = eval(Expr::exp(ex.clone().powi(2)), Expr::zero(), Expr::one());
        assert!(v.contains_integral());
    }

    #[test_log::test]
    fn iterated_integral_runs_inner_first() {
        let u = Symbol::new("u");
        let v = Symbol::new("v");
        let integrand = Expr::sym(&u) * Expr::sym(&v);
        let value = integrate_over(
            &integrand,
            &[
                Bound::new(&u, Expr::zero(), Expr::sym(&v)),
                Bound::new(&v, Expr::zero(), Expr::int(2)),
            ],
        )
        .unwrap();
        // inner: v^3/2, outer: 2^4/8 = 2
        assert_eq!(value, Expr::int(2));
    }
}
