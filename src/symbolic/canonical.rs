// src/symbolic/canonical.rs

//! Canonical rational forms.
//!
//! Every expression is brought to a quotient `num / den` of polynomials over
//! [`Atom`]s such that two equal expressions produce identical quotients for
//! the identities the curvature pipeline meets:
//!
//! - `cos(u)^2` never survives; it is rewritten as `1 - sin(u)^2`.
//! - Denominators never contain `cos(u)`; it is rationalized away with the
//!   conjugate `den(cos -> -cos)`.
//! - `num` and `den` share no polynomial factor and `den` is monic.
//! - Function arguments, radicands and `abs` arguments are canonical.
//!
//! Sums inside `sin`/`cos` are expanded with the addition formulas, so
//! `sin(u + pi/2)` and `cos(u)` meet in the same form. `sqrt` extracts
//! perfect powers and takes the sign from the symbols' assumptions, falling
//! back to `abs(..)` when the sign is not manifest.

use std::cmp::Ordering;

use log::trace;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::expr::{Expr, Func, Integral};
use super::poly::{gcd, monomial_root, rational_root, Atom, Monomial, Poly};
use super::symbol::Symbol;
use crate::error::SymbolicError;

type Result<T> = std::result::Result<T, SymbolicError>;

/// `sin(n u)` is expanded into powers of `sin(u)`/`cos(u)` up to this `n`.
const MAX_MULTIPLE_ANGLE: u32 = 24;

/// Largest integer exponent the canonicalizer expands.
const MAX_EXPONENT: i64 = 4096;

/// Integer radicands are searched for `p^q` factors with `p` up to here.
const TRIAL_DIVISOR_LIMIT: u32 = 1000;

// --- Rational functions ---

/// A canonical quotient of polynomials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frac {
    num: Poly,
    den: Poly,
}

impl Frac {
    pub fn zero() -> Frac {
        Frac {
            num: Poly::zero(),
            den: Poly::one(),
        }
    }

    pub fn one() -> Frac {
        Frac::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Frac {
        Frac {
            num: Poly::constant(c),
            den: Poly::one(),
        }
    }

    /// A single atom. Atoms are already reduced at exponent one.
    pub fn atom(atom: Atom) -> Frac {
        Frac {
            num: Poly::atom(atom),
            den: Poly::one(),
        }
    }

    pub fn from_poly(num: Poly) -> Result<Frac> {
        Frac::new(num, Poly::one())
    }

    /// Normalizes `num / den`.
    pub fn new(num: Poly, den: Poly) -> Result<Frac> {
        let mut num = reduce(num)?;
        let mut den = reduce(den)?;
        if den.is_zero() {
            return Err(SymbolicError::DivisionByZero(num.to_expr().to_string()));
        }
        if num.is_zero() {
            return Ok(Frac::zero());
        }
        let cosines: Vec<Atom> = den
            .atoms()
            .into_iter()
            .filter(|a| matches!(a, Atom::Func(Func::Cos, _)))
            .collect();
        for cos in &cosines {
            if den.degree_in(cos) == 0 {
                continue;
            }
            let conjugate = den.negate_atom(cos);
            num = reduce(num.mul(&conjugate))?;
            den = reduce(den.mul(&conjugate))?;
        }
        if den.is_zero() {
            return Err(SymbolicError::DivisionByZero(num.to_expr().to_string()));
        }
        if let Some(c) = den.as_constant() {
            return Ok(Frac {
                num: num.scale(&c.recip()),
                den: Poly::one(),
            });
        }
        let common = gcd(&num, &den);
        if !common.is_one() {
            if let (Some(n), Some(d)) = (num.div_exact(&common), den.div_exact(&common)) {
                num = n;
                den = d;
            }
        }
        let lc = den.leading_coefficient().recip();
        Ok(Frac {
            num: num.scale(&lc),
            den: den.scale(&lc),
        })
    }

    pub fn num(&self) -> &Poly {
        &self.num
    }

    pub fn den(&self) -> &Poly {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn as_constant(&self) -> Option<BigRational> {
        if self.den.is_one() {
            self.num.as_constant()
        } else {
            None
        }
    }

    pub fn depends_on(&self, var: &Symbol) -> bool {
        self.num.depends_on(var) || self.den.depends_on(var)
    }

    pub fn add(&self, other: &Frac) -> Result<Frac> {
        if self.is_zero() {
            return Ok(other.clone());
        }
        if other.is_zero() {
            return Ok(self.clone());
        }
        if self.den == other.den {
            return Frac::new(self.num.add(&other.num), self.den.clone());
        }
        if let Some(k) = self.den.div_exact(&other.den) {
            return Frac::new(self.num.add(&other.num.mul(&k)), self.den.clone());
        }
        if let Some(k) = other.den.div_exact(&self.den) {
            return Frac::new(other.num.add(&self.num.mul(&k)), other.den.clone());
        }
        Frac::new(
            self.num.mul(&other.den).add(&other.num.mul(&self.den)),
            self.den.mul(&other.den),
        )
    }

    pub fn sub(&self, other: &Frac) -> Result<Frac> {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Frac {
        Frac {
            num: self.num.neg(),
            den: self.den.clone(),
        }
    }

    pub fn mul(&self, other: &Frac) -> Result<Frac> {
        if self.is_zero() || other.is_zero() {
            return Ok(Frac::zero());
        }
        Frac::new(self.num.mul(&other.num), self.den.mul(&other.den))
    }

    pub fn recip(&self) -> Result<Frac> {
        if self.is_zero() {
            return Err(SymbolicError::DivisionByZero("1/0".to_string()));
        }
        Frac::new(self.den.clone(), self.num.clone())
    }

    pub fn div(&self, other: &Frac) -> Result<Frac> {
        self.mul(&other.recip()?)
    }

    pub fn pow(&self, k: i64) -> Result<Frac> {
        if k.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
            return Err(SymbolicError::Unsupported(format!(
                "exponent {} is too large to expand",
                k
            )));
        }
        if k < 0 {
            return self.recip()?.pow(-k);
        }
        let k = k as u32;
        if k == 1 {
            return Ok(self.clone());
        }
        Frac::new(self.num.pow(k), self.den.pow(k))
    }

    pub fn to_expr(&self) -> Expr {
        if self.den.is_one() {
            return self.num.to_expr();
        }
        Expr::product([self.num.to_expr(), self.den.to_expr().powi(-1)])
    }
}

/// Canonical form of `expr` as an expression.
pub fn simplify(expr: &Expr) -> Result<Expr> {
    Ok(canonicalize(expr)?.to_expr())
}

/// Canonical rational form of `expr`.
pub fn canonicalize(expr: &Expr) -> Result<Frac> {
    match expr {
        Expr::Num(n) => Ok(Frac::constant(n.clone())),
        Expr::Sym(s) => Ok(Frac::atom(Atom::Sym(s.clone()))),
        Expr::Pi => Ok(Frac::atom(Atom::Pi)),
        Expr::Add(terms) => {
            let mut polynomial = Poly::zero();
            let mut rational = Frac::zero();
            for term in terms {
                let f = canonicalize(term)?;
                if f.den.is_one() {
                    polynomial = polynomial.add(&f.num);
                } else {
                    rational = rational.add(&f)?;
                }
            }
            rational.add(&Frac::from_poly(polynomial)?)
        }
        Expr::Mul(factors) => {
            let mut num = Poly::one();
            let mut den = Poly::one();
            for factor in factors {
                let f = canonicalize(factor)?;
                if f.is_zero() {
                    return Ok(Frac::zero());
                }
                num = num.mul(&f.num);
                den = den.mul(&f.den);
            }
            Frac::new(num, den)
        }
        Expr::Pow(base, exponent) => power(base, exponent),
        Expr::Func(func, arg) => {
            let arg = canonicalize(arg)?;
            match func {
                Func::Sin | Func::Cos => trig(*func, &arg),
                Func::Exp => exp(&arg),
                Func::Ln => ln(&arg),
                Func::Abs => abs(&arg),
            }
        }
        Expr::Integral(integral) => {
            let integrand = simplify(&integral.integrand)?;
            if integrand.is_zero() {
                return Ok(Frac::zero());
            }
            Ok(Frac::atom(Atom::Integral(Box::new(Integral {
                integrand,
                var: integral.var.clone(),
                lower: simplify(&integral.lower)?,
                upper: simplify(&integral.upper)?,
            }))))
        }
    }
}

/// Sign of `expr` when it can be read off the canonical form: every term
/// shares one sign and is built from nonnegative factors.
pub fn manifest_sign(expr: &Expr) -> Result<Option<Ordering>> {
    let f = canonicalize(expr)?;
    if f.is_zero() {
        return Ok(Some(Ordering::Equal));
    }
    let num = definite_sign(&f.num, true);
    let den = definite_sign(&f.den, true);
    Ok(match (num, den) {
        (Some(n), Some(Ordering::Greater)) => Some(n),
        (Some(n), Some(Ordering::Less)) => Some(n.reverse()),
        _ => None,
    })
}

// --- Reduction rules ---

/// Applies the monomial rewrite rules until none fires.
fn reduce(p: Poly) -> Result<Poly> {
    let mut current = p;
    loop {
        let mut changed = false;
        let mut out = Poly::zero();
        for (m, c) in current.terms() {
            match rewrite_monomial(m)? {
                Some(replacement) => {
                    out = out.add(&replacement.scale(c));
                    changed = true;
                }
                None => out.add_term(m.clone(), c.clone()),
            }
        }
        if !changed {
            return Ok(out);
        }
        current = out;
    }
}

fn rewrite_monomial(m: &Monomial) -> Result<Option<Poly>> {
    for (atom, e) in m.factors() {
        let e = *e;
        match atom {
            Atom::Func(Func::Cos, arg) if e >= 2 => {
                let rest = m.without(atom).mul(&Monomial::atom(atom.clone(), e % 2));
                let sin = Poly::atom(Atom::Func(Func::Sin, arg.clone()));
                let cos_squared = Poly::one().sub(&sin.pow(2));
                return Ok(Some(cos_squared.pow(e / 2).mul_term(&rest, &BigRational::one())));
            }
            Atom::Root(radicand, q) if e >= *q => {
                let Some(base) = polynomial_of(radicand)? else {
                    continue;
                };
                let rest = m.without(atom).mul(&Monomial::atom(atom.clone(), e % q));
                return Ok(Some(base.pow(e / q).mul_term(&rest, &BigRational::one())));
            }
            Atom::Func(Func::Abs, arg) if e >= 2 && arg.is_real() => {
                let Some(base) = polynomial_of(arg)? else {
                    continue;
                };
                let rest = m.without(atom).mul(&Monomial::atom(atom.clone(), e % 2));
                return Ok(Some(base.pow(e - e % 2).mul_term(&rest, &BigRational::one())));
            }
            _ => {}
        }
    }
    Ok(None)
}

fn polynomial_of(expr: &Expr) -> Result<Option<Poly>> {
    let f = canonicalize(expr)?;
    Ok(f.den.is_one().then_some(f.num))
}

// --- Powers and roots ---

fn power(base: &Expr, exponent: &BigRational) -> Result<Frac> {
    let base = canonicalize(base)?;
    let too_large = || SymbolicError::Unsupported(format!("exponent {}", exponent));
    if exponent.is_integer() {
        let k = exponent.to_integer().to_i64().ok_or_else(too_large)?;
        return base.pow(k);
    }
    let p = exponent.numer().to_i64().ok_or_else(too_large)?;
    let q = exponent.denom().to_u32().ok_or_else(too_large)?;
    if base.is_zero() {
        if p < 0 {
            return Err(SymbolicError::DivisionByZero(format!("0^({})", exponent)));
        }
        return Ok(Frac::zero());
    }
    root(&base, q)?.pow(p)
}

/// Principal `q`-th root of a canonical quotient.
fn root(base: &Frac, q: u32) -> Result<Frac> {
    let (num_out, num_in) = root_poly(&base.num, q)?;
    let (den_out, den_in) = root_poly(&base.den, q)?;
    Frac::new(
        num_out.mul(&root_atom(num_in, q)),
        den_out.mul(&root_atom(den_in, q)),
    )
}

fn root_atom(radicand: Poly, q: u32) -> Poly {
    if radicand.is_one() {
        Poly::one()
    } else {
        Poly::atom(Atom::Root(radicand.to_expr(), q))
    }
}

/// Splits `p^(1/q)` into an extracted factor and the radicand left under
/// the root.
fn root_poly(p: &Poly, q: u32) -> Result<(Poly, Poly)> {
    let mut extracted = Poly::one();
    let mut residual = Poly::one();
    let mut p = p.clone();
    if p.is_one() {
        return Ok((extracted, residual));
    }
    if q % 2 == 1 && p.leading_coefficient().is_negative() {
        p = p.neg();
        extracted = extracted.neg();
    }

    let content = p.rational_content();
    let monomial = p.monomial_content();
    let primitive = p
        .div_exact(&Poly::term(monomial.clone(), content.clone()))
        .unwrap_or_else(|| p.clone());
    let (content, monomial) = if primitive == p {
        (BigRational::one(), Monomial::one())
    } else {
        (content, monomial)
    };

    let (outside, inside) = split_rational_root(&content, q);
    extracted = extracted.scale(&outside);
    residual = residual.scale(&inside);
    for (atom, e) in monomial.factors() {
        let (k, r) = (e / q, e % q);
        if k > 0 {
            let value = if q % 2 == 1 {
                Poly::term(Monomial::atom(atom.clone(), k), BigRational::one())
            } else {
                abs_atom_power(atom, k)
            };
            extracted = extracted.mul(&value);
        }
        if r > 0 {
            residual = residual.mul_term(&Monomial::atom(atom.clone(), r), &BigRational::one());
        }
    }
    if !primitive.is_one() {
        match perfect_power(&primitive, q)? {
            Some(base) if q % 2 == 0 => extracted = extracted.mul(&abs_poly(&base)?),
            Some(base) => extracted = extracted.mul(&base),
            None => residual = residual.mul(&primitive),
        }
    }
    Ok((reduce(extracted)?, reduce(residual)?))
}

/// `c^(1/q) = outside * inside^(1/q)` for positive `c`, with `inside` an
/// integer free of small `q`-th power factors.
fn split_rational_root(c: &BigRational, q: u32) -> (BigRational, BigRational) {
    if let Some(r) = rational_root(c, q) {
        return (r, BigRational::one());
    }
    let denom = c.denom().clone();
    let whole = c.numer() * num_traits::pow(denom.clone(), q as usize - 1);
    let mut outside = BigInt::one();
    let mut inside = whole;
    for p in 2u32..=TRIAL_DIVISOR_LIMIT {
        let pq = num_traits::pow(BigInt::from(p), q as usize);
        if pq > inside {
            break;
        }
        while (&inside % &pq).is_zero() {
            inside /= &pq;
            outside *= p;
        }
    }
    if let Some(r) = rational_root(&BigRational::from_integer(inside.clone()), q) {
        outside *= r.to_integer();
        inside = BigInt::one();
    }
    (
        BigRational::new(outside, denom),
        BigRational::from_integer(inside),
    )
}

/// `p = b^q` for some polynomial `b` with positive leading coefficient.
/// Only square roots of non-monomial polynomials are attempted.
fn perfect_power(p: &Poly, q: u32) -> Result<Option<Poly>> {
    if p.is_monomial() {
        let Some((m, c)) = p.leading() else {
            return Ok(None);
        };
        return Ok(monomial_root(m, q)
            .zip(rational_root(c, q))
            .map(|(m, c)| Poly::term(m, c)));
    }
    if q != 2 {
        return Ok(None);
    }
    if let Some(root) = p.sqrt() {
        return Ok(Some(root));
    }
    // sin(u)^2 = 1 - cos(u)^2 may expose a square hidden by the reduction.
    let mut substituted = p.clone();
    let mut any = false;
    for atom in p.atoms() {
        if let Atom::Func(Func::Sin, arg) = &atom {
            let cos = Poly::atom(Atom::Func(Func::Cos, arg.clone()));
            if let Some(next) = substituted.substitute_square(&atom, &Poly::one().sub(&cos.pow(2))) {
                substituted = next;
                any = true;
            }
        }
    }
    if !any {
        return Ok(None);
    }
    match substituted.sqrt() {
        Some(root) => {
            trace!("square root found after trig substitution: {}", root.to_expr());
            Ok(Some(reduce(root)?))
        }
        None => Ok(None),
    }
}

// --- Absolute values and signs ---

fn abs(arg: &Frac) -> Result<Frac> {
    Frac::new(abs_poly(&arg.num)?, abs_poly(&arg.den)?)
}

fn abs_poly(p: &Poly) -> Result<Poly> {
    if p.is_zero() {
        return Ok(Poly::zero());
    }
    match definite_sign(p, false) {
        Some(Ordering::Greater) | Some(Ordering::Equal) => return Ok(p.clone()),
        Some(Ordering::Less) => return Ok(p.neg()),
        None => {}
    }
    let content = p.rational_content();
    let monomial = p.monomial_content();
    let Some(mut primitive) = p.div_exact(&Poly::term(monomial.clone(), content.clone())) else {
        return Ok(Poly::atom(Atom::Func(Func::Abs, p.to_expr())));
    };
    if primitive.leading_coefficient().is_negative() {
        primitive = primitive.neg();
    }
    let mut out = Poly::constant(content);
    for (atom, e) in monomial.factors() {
        out = out.mul(&abs_atom_power(atom, *e));
    }
    if !primitive.is_one() {
        if definite_sign(&primitive, false) == Some(Ordering::Greater) {
            out = out.mul(&primitive);
        } else {
            out = out.mul(&Poly::atom(Atom::Func(Func::Abs, primitive.to_expr())));
        }
    }
    reduce(out)
}

/// `|atom|^e`.
fn abs_atom_power(atom: &Atom, e: u32) -> Poly {
    let one = BigRational::one();
    if atom.is_nonnegative() || (e % 2 == 0 && atom.is_real()) {
        return Poly::term(Monomial::atom(atom.clone(), e), one);
    }
    let abs = Atom::Func(Func::Abs, atom.to_expr());
    if atom.is_real() {
        Poly::term(
            Monomial::from_factors([(abs, 1), (atom.clone(), e - 1)]),
            one,
        )
    } else {
        Poly::term(Monomial::atom(abs, e), one)
    }
}

/// Sign shared by every value of `p`, if the form makes it evident. With
/// `strict`, zero must be excluded as well.
fn definite_sign(p: &Poly, strict: bool) -> Option<Ordering> {
    if p.is_zero() {
        return (!strict).then_some(Ordering::Equal);
    }
    let mut sign = None;
    let mut any_positive = false;
    for (m, c) in p.terms() {
        let nonnegative = m
            .factors()
            .iter()
            .all(|(a, e)| a.is_nonnegative() || (e % 2 == 0 && a.is_real()));
        if !nonnegative {
            return None;
        }
        let s = if c.is_positive() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        match sign {
            None => sign = Some(s),
            Some(prev) if prev != s => return None,
            Some(_) => {}
        }
        if m.factors().iter().all(|(a, _)| a.is_positive()) {
            any_positive = true;
        }
    }
    if strict && !any_positive {
        return None;
    }
    sign
}

// --- Elementary functions ---

fn trig(func: Func, arg: &Frac) -> Result<Frac> {
    if arg.is_zero() {
        return Ok(if func == Func::Sin {
            Frac::zero()
        } else {
            Frac::one()
        });
    }
    if !arg.den.is_one() {
        let negate = arg.num.leading_coefficient().is_negative();
        let arg = if negate { arg.neg() } else { arg.clone() };
        let value = Frac::atom(Atom::Func(func, arg.to_expr()));
        return Ok(if negate && func == Func::Sin {
            value.neg()
        } else {
            value
        });
    }
    if arg.num.len() > 1 {
        let Some((m, c)) = arg.num.leading() else {
            return Ok(Frac::zero());
        };
        let head = Poly::term(m.clone(), c.clone());
        let tail = Frac::from_poly(arg.num.sub(&head))?;
        let head = Frac::from_poly(head)?;
        let (s1, c1) = (trig(Func::Sin, &head)?, trig(Func::Cos, &head)?);
        let (s2, c2) = (trig(Func::Sin, &tail)?, trig(Func::Cos, &tail)?);
        return match func {
            Func::Sin => s1.mul(&c2)?.add(&c1.mul(&s2)?),
            _ => c1.mul(&c2)?.sub(&s1.mul(&s2)?),
        };
    }
    let Some((m, c)) = arg.num.leading() else {
        return Ok(Frac::zero());
    };
    if *m == Monomial::atom(Atom::Pi, 1) {
        if let Some(value) = exact_trig(func, c)? {
            return Ok(value);
        }
    }
    let negative = c.is_negative();
    let multiple = c.numer().abs();
    let base = Poly::term(
        m.clone(),
        BigRational::new(BigInt::one(), c.denom().clone()),
    );
    let base = base.to_expr();
    let n = match multiple.to_u32() {
        Some(n) if n <= MAX_MULTIPLE_ANGLE => n,
        _ => {
            // Too large to expand: keep the angle whole.
            let angle = Poly::term(m.clone(), c.abs()).to_expr();
            let value = Frac::atom(Atom::Func(func, angle));
            return Ok(if negative && func == Func::Sin {
                value.neg()
            } else {
                value
            });
        }
    };
    let (s, co) = multiple_angle(n, &base)?;
    Ok(match func {
        Func::Sin if negative => s.neg(),
        Func::Sin => s,
        _ => co,
    })
}

/// `(sin(n u), cos(n u))` in powers of `sin(u)` and `cos(u)`.
fn multiple_angle(n: u32, base: &Expr) -> Result<(Frac, Frac)> {
    let s = Frac::atom(Atom::Func(Func::Sin, base.clone()));
    let c = Frac::atom(Atom::Func(Func::Cos, base.clone()));
    let (mut sk, mut ck) = (s.clone(), c.clone());
    for _ in 1..n {
        let next_s = sk.mul(&c)?.add(&ck.mul(&s)?)?;
        let next_c = ck.mul(&c)?.sub(&sk.mul(&s)?)?;
        sk = next_s;
        ck = next_c;
    }
    Ok((sk, ck))
}

/// `sin(c pi)` or `cos(c pi)` when `c` is a multiple of 1/12 landing on an
/// angle with a closed form.
fn exact_trig(func: Func, c: &BigRational) -> Result<Option<Frac>> {
    let two = BigRational::from_integer(BigInt::from(2));
    let turns = c - (c / &two).floor() * &two;
    let twelfths = turns * BigRational::from_integer(BigInt::from(12));
    if !twelfths.is_integer() {
        return Ok(None);
    }
    let Some(mut k) = twelfths.to_integer().to_i64() else {
        return Ok(None);
    };
    if func == Func::Cos {
        k = (k + 6).mod_floor(&24);
    }
    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    let root_half = |n: i64| -> Frac {
        Frac {
            num: Poly::term(
                Monomial::atom(Atom::Root(Expr::int(n), 2), 1),
                half.clone(),
            ),
            den: Poly::one(),
        }
    };
    let value = match k {
        0 | 12 => Frac::zero(),
        6 => Frac::one(),
        18 => Frac::one().neg(),
        2 | 10 => Frac::constant(half.clone()),
        14 | 22 => Frac::constant(-half.clone()),
        3 | 9 => root_half(2),
        15 | 21 => root_half(2).neg(),
        4 | 8 => root_half(3),
        16 | 20 => root_half(3).neg(),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn exp(arg: &Frac) -> Result<Frac> {
    if arg.is_zero() {
        return Ok(Frac::one());
    }
    if !arg.den.is_one() {
        return Ok(Frac::atom(Atom::Func(Func::Exp, arg.to_expr())));
    }
    let mut out = Frac::one();
    for (m, c) in arg.num.terms() {
        if let [(Atom::Func(Func::Ln, inner), 1)] = m.factors() {
            if c.is_integer() {
                if let Some(k) = c.to_integer().to_i64() {
                    out = out.mul(&canonicalize(inner)?.pow(k)?)?;
                    continue;
                }
            }
        }
        let p = c
            .numer()
            .to_i64()
            .ok_or_else(|| SymbolicError::Unsupported(format!("exp coefficient {}", c)))?;
        let base = Poly::term(m.clone(), BigRational::new(BigInt::one(), c.denom().clone()));
        let factor = Frac::atom(Atom::Func(Func::Exp, base.to_expr()));
        out = out.mul(&factor.pow(p)?)?;
    }
    Ok(out)
}

fn ln(arg: &Frac) -> Result<Frac> {
    if arg.as_constant().is_some_and(|c| c.is_one()) {
        return Ok(Frac::zero());
    }
    if arg.den.is_one() {
        if let Some((m, c)) = arg.num.leading().filter(|_| arg.num.is_monomial()) {
            if let [(Atom::Func(Func::Exp, inner), k)] = m.factors() {
                if c.is_one() {
                    let inner = canonicalize(inner)?;
                    return inner.mul(&Frac::constant(BigRational::from_integer(BigInt::from(*k))));
                }
            }
        }
    }
    Ok(Frac::atom(Atom::Func(Func::Ln, arg.to_expr())))
}

/// `c` with `f = c pi`, when `f` is a rational multiple of `pi`.
pub fn pi_multiple(f: &Frac) -> Option<BigRational> {
    if f.is_zero() {
        return Some(BigRational::zero());
    }
    if !f.den.is_one() || !f.num.is_monomial() {
        return None;
    }
    let (m, c) = f.num.leading()?;
    (*m == Monomial::atom(Atom::Pi, 1)).then(|| c.clone())
}

/// `c pi` as a canonical quotient.
pub fn pi_times(c: BigRational) -> Frac {
    Frac {
        num: Poly::term(Monomial::atom(Atom::Pi, 1), c),
        den: Poly::one(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theta() -> Symbol {
        Symbol::new("theta")
    }

    #[test_log::test]
    fn cosine_squared_becomes_sine() {
        let t = Expr::sym(&theta());
        let c2 = Expr::cos(t.clone()).powi(2);
        let f = canonicalize(&c2).expect("canonical");
        assert_eq!(f.num.degree_in(&Atom::Func(Func::Cos, t.clone())), 0);
        assert_eq!(f.num.degree_in(&Atom::Func(Func::Sin, t)), 2);
    }

    #[test_log::test]
    fn cosine_leaves_denominators() {
        let t = Expr::sym(&theta());
        let f = canonicalize(&Expr::cos(t.clone()).powi(-1)).expect("canonical");
        assert_eq!(f.den.degree_in(&Atom::Func(Func::Cos, t)), 0);
    }

    #[test_log::test]
    fn zero_denominator_is_an_error() {
        let x = Expr::sym(&theta());
        let err = canonicalize(&(x.clone() - x).powi(-1)).unwrap_err();
        assert!(matches!(err, SymbolicError::DivisionByZero(_)));
    }

    #[test_log::test]
    fn manifest_sign_of_positive_sums() {
        let r = Expr::sym(&Symbol::positive("R"));
        let t = Expr::sym(&theta());
        let expr = r.clone().powi(2) + Expr::sin(t.clone()).powi(2);
        assert_eq!(manifest_sign(&expr).unwrap(), Some(Ordering::Greater));
        assert_eq!(manifest_sign(&-r).unwrap(), Some(Ordering::Less));
        assert_eq!(manifest_sign(&Expr::sin(t)).unwrap(), None);
    }

    #[test_log::test]
    fn extreme_exponents_are_rejected() {
        let x = Expr::sym(&theta());
        for k in [i64::MIN, i64::MAX, MAX_EXPONENT + 1] {
            let err = canonicalize(&x.clone().powi(k)).unwrap_err();
            assert!(matches!(err, SymbolicError::Unsupported(_)), "x^{}", k);
        }
        assert!(canonicalize(&x.powi(-MAX_EXPONENT)).is_ok());
    }

    #[test_log::test]
    fn pi_multiples_are_recognized() {
        let f = canonicalize(&(Expr::pi() * Expr::rational(3, 2))).unwrap();
        assert_eq!(pi_multiple(&f), Some(BigRational::new(BigInt::from(3), BigInt::from(2))));
        let g = canonicalize(&Expr::sym(&theta())).unwrap();
        assert_eq!(pi_multiple(&g), None);
    }
}
