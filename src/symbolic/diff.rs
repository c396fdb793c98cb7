// src/symbolic/diff.rs

//! Symbolic partial differentiation.
//!
//! The rules are the usual ones: linearity, Leibniz for products, the power
//! rule for constant exponents and the chain rule for elementary functions.
//! Subtrees that do not mention the variable are pruned before recursing.
//! The result is not simplified.

use num_rational::BigRational;
use num_traits::One;

use super::expr::{Expr, Func, Integral};
use super::symbol::Symbol;

pub fn diff(expr: &Expr, var: &Symbol) -> Expr {
    if !expr.depends_on(var) {
        return Expr::zero();
    }
    match expr {
        Expr::Num(_) | Expr::Pi => Expr::zero(),
        Expr::Sym(s) => {
            if s == var {
                Expr::one()
            } else {
                Expr::zero()
            }
        }
        Expr::Add(terms) => Expr::sum(terms.iter().map(|t| diff(t, var))),
        Expr::Mul(factors) => Expr::sum(
            factors
                .iter()
                .enumerate()
                .filter(|(_, f)| f.depends_on(var))
                .map(|(i, f)| {
                    let rest = factors
                        .iter()
                        .enumerate()
                        .filter(move |(j, _)| *j != i)
                        .map(|(_, g)| g.clone());
                    Expr::product(std::iter::once(diff(f, var)).chain(rest))
                }),
        ),
        // d(u^e) = e u^(e-1) du
        Expr::Pow(base, exponent) => Expr::product([
            Expr::Num(exponent.clone()),
            base.as_ref().clone().pow(exponent - BigRational::one()),
            diff(base, var),
        ]),
        Expr::Func(func, arg) => {
            let inner = diff(arg, var);
            let arg = arg.as_ref().clone();
            let outer = match func {
                Func::Sin => Expr::cos(arg),
                Func::Cos => -Expr::sin(arg),
                Func::Exp => Expr::exp(arg),
                Func::Ln => arg.powi(-1),
                Func::Abs => arg.clone() * Expr::abs(arg).powi(-1),
            };
            outer * inner
        }
        Expr::Integral(integral) => leibniz(integral, var),
    }
}

/// d/dv of `integral(f(t, v), (t, a(v), b(v)))`.
fn leibniz(integral: &Integral, var: &Symbol) -> Expr {
    let Integral {
        integrand,
        var: bound,
        lower,
        upper,
    } = integral;
    let mut parts = Vec::with_capacity(3);
    let d_upper = diff(upper, var);
    if !d_upper.is_zero() {
        parts.push(integrand.subs(bound, upper) * d_upper);
    }
    let d_lower = diff(lower, var);
    if !d_lower.is_zero() {
        parts.push(-(integrand.subs(bound, lower) * d_lower));
    }
    if bound != var {
        let inner = diff(integrand, var);
        if !inner.is_zero() {
            parts.push(Expr::Integral(Box::new(Integral {
                integrand: inner,
                var: bound.clone(),
                lower: lower.clone(),
                upper: upper.clone(),
            })));
        }
    }
    Expr::sum(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(expr: Expr, var: &Symbol, expected: Expr) {
        let d = diff(&expr, var);
        assert!(
            d.is_equivalent(&expected).expect("simplifies"),
            "d/d{} {} = {}, expected {}",
            var,
            expr,
            d.simplify().unwrap_or(d.clone()),
            expected
        );
    }

    #[test_log::test]
    fn product_and_chain_rules() {
        let x = Symbol::new("x");
        let ex = Expr::sym(&x);
        check(ex.clone().powi(3) * Expr::sin(ex.clone()), &x,
            Expr::int(3) * ex.clone().powi(2) * Expr::sin(ex.clone())
                + ex.clone().powi(3) * Expr::cos(ex.clone()));
        check(Expr::cos(ex.clone().powi(2)), &x,
            -(Expr::int(2) * ex.clone() * Expr::sin(ex.clone().powi(2))));
        check(Expr::ln(ex.clone()), &x, ex.clone().powi(-1));
        check(Expr::exp(Expr::int(2) * ex.clone()), &x, Expr::int(2) * Expr::exp(Expr::int(2) * ex));
    }

    #[test_log::test]
    fn constants_are_pruned() {
        let x = Symbol::new("x");
        let r = Symbol::positive("R");
        let expr = Expr::sym(&r).powi(2) * Expr::sin(Expr::sym(&r));
        assert!(diff(&expr, &x).is_zero());
    }

    #[test_log::test]
    fn integral_with_variable_upper_bound() {
        let x = Symbol::new("x");
        let t = Symbol::new("t");
        let integral = Expr::Integral(Box::new(Integral {
            integrand: Expr::sym(&t).powi(2),
            var: t.clone(),
            lower: Expr::zero(),
            upper: Expr::sym(&x),
        }));
        check(integral, &x, Expr::sym(&x).powi(2));
    }
}
