// src/symbolic/expr.rs

//! The symbolic expression tree.
//!
//! `Expr` is what callers build metrics from and what every pipeline stage
//! returns. Arithmetic operators only assemble trees (with light flattening);
//! [`Expr::simplify`] brings a tree to canonical form.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::symbol::Symbol;
use crate::error::SymbolicError;

/// Elementary functions understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    Sin,
    Cos,
    Exp,
    Ln,
    Abs,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Abs => "abs",
        }
    }
}

/// A definite integral the engine could not evaluate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integral {
    pub integrand: Expr,
    pub var: Symbol,
    pub lower: Expr,
    pub upper: Expr,
}

impl Integral {
    /// Free-variable dependence; the integration variable is bound.
    pub fn depends_on(&self, var: &Symbol) -> bool {
        self.lower.depends_on(var)
            || self.upper.depends_on(var)
            || (&self.var != var && self.integrand.depends_on(var))
    }
}

/// A symbolic expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expr {
    /// Exact rational constant.
    Num(BigRational),
    Sym(Symbol),
    Pi,
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    /// Base raised to a constant rational exponent.
    Pow(Box<Expr>, BigRational),
    Func(Func, Box<Expr>),
    /// Unevaluated definite integral.
    Integral(Box<Integral>),
}

// --- Constructors ---

impl Expr {
    pub fn zero() -> Expr {
        Expr::Num(BigRational::zero())
    }

    pub fn one() -> Expr {
        Expr::Num(BigRational::one())
    }

    pub fn int(n: i64) -> Expr {
        Expr::Num(BigRational::from_integer(BigInt::from(n)))
    }

    /// `numer/denom`.
    ///
    /// # Panics
    /// Panics if `denom` is zero.
    pub fn rational(numer: i64, denom: i64) -> Expr {
        Expr::Num(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn sym(symbol: &Symbol) -> Expr {
        Expr::Sym(symbol.clone())
    }

    pub fn pi() -> Expr {
        Expr::Pi
    }

    pub fn sin(arg: Expr) -> Expr {
        Expr::Func(Func::Sin, Box::new(arg))
    }

    pub fn cos(arg: Expr) -> Expr {
        Expr::Func(Func::Cos, Box::new(arg))
    }

    /// `sin(arg)/cos(arg)`.
    pub fn tan(arg: Expr) -> Expr {
        Expr::sin(arg.clone()) * Expr::cos(arg).powi(-1)
    }

    /// `cos(arg)/sin(arg)`.
    pub fn cot(arg: Expr) -> Expr {
        Expr::cos(arg.clone()) * Expr::sin(arg).powi(-1)
    }

    pub fn exp(arg: Expr) -> Expr {
        Expr::Func(Func::Exp, Box::new(arg))
    }

    pub fn ln(arg: Expr) -> Expr {
        Expr::Func(Func::Ln, Box::new(arg))
    }

    pub fn abs(arg: Expr) -> Expr {
        Expr::Func(Func::Abs, Box::new(arg))
    }

    pub fn sqrt(arg: Expr) -> Expr {
        arg.pow(BigRational::new(BigInt::one(), BigInt::from(2)))
    }

    pub fn powi(self, exponent: i64) -> Expr {
        self.pow(BigRational::from_integer(BigInt::from(exponent)))
    }

    pub fn pow(self, exponent: BigRational) -> Expr {
        if exponent.is_one() {
            return self;
        }
        if exponent.is_zero() {
            return Expr::one();
        }
        Expr::Pow(Box::new(self), exponent)
    }

    /// Flattened sum; zero terms are dropped.
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Expr {
        let mut flat = Vec::new();
        for term in terms {
            match term {
                Expr::Add(inner) => flat.extend(inner),
                t if t.is_zero() => {}
                t => flat.push(t),
            }
        }
        match flat.len() {
            0 => Expr::zero(),
            1 => flat.pop().unwrap_or_else(Expr::zero),
            _ => Expr::Add(flat),
        }
    }

    /// Flattened product; numeric factors are folded into one coefficient.
    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Expr {
        let mut coefficient = BigRational::one();
        let mut flat = Vec::new();
        for factor in factors {
            let inner = match factor {
                Expr::Mul(inner) => inner,
                f => vec![f],
            };
            for f in inner {
                match f {
                    Expr::Num(n) => coefficient *= n,
                    other => flat.push(other),
                }
            }
        }
        if coefficient.is_zero() {
            return Expr::zero();
        }
        if !coefficient.is_one() || flat.is_empty() {
            flat.insert(0, Expr::Num(coefficient));
        }
        match flat.len() {
            1 => flat.pop().unwrap_or_else(Expr::one),
            _ => Expr::Mul(flat),
        }
    }
}

// --- Queries and structural rewrites ---

impl Expr {
    /// Structural zero test. Use [`Expr::is_equivalent`] for semantic checks.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_one())
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Expr::Num(n) => Some(n),
            _ => None,
        }
    }

    /// Whether `var` occurs free in the expression.
    pub fn depends_on(&self, var: &Symbol) -> bool {
        match self {
            Expr::Num(_) | Expr::Pi => false,
            Expr::Sym(s) => s == var,
            Expr::Add(terms) | Expr::Mul(terms) => terms.iter().any(|t| t.depends_on(var)),
            Expr::Pow(base, _) => base.depends_on(var),
            Expr::Func(_, arg) => arg.depends_on(var),
            Expr::Integral(integral) => integral.depends_on(var),
        }
    }

    /// True when the tree still holds an unevaluated integral.
    pub fn contains_integral(&self) -> bool {
        match self {
            Expr::Num(_) | Expr::Pi | Expr::Sym(_) => false,
            Expr::Add(terms) | Expr::Mul(terms) => terms.iter().any(Expr::contains_integral),
            Expr::Pow(base, _) => base.contains_integral(),
            Expr::Func(_, arg) => arg.contains_integral(),
            Expr::Integral(_) => true,
        }
    }

    /// Real-valued under the symbols' assumptions (logarithms are taken on
    /// their positive domain).
    pub fn is_real(&self) -> bool {
        match self {
            Expr::Num(_) | Expr::Pi => true,
            Expr::Sym(s) => s.is_real(),
            Expr::Add(terms) | Expr::Mul(terms) => terms.iter().all(Expr::is_real),
            Expr::Pow(base, _) => base.is_real(),
            Expr::Func(_, arg) => arg.is_real(),
            Expr::Integral(integral) => {
                integral.integrand.is_real() && integral.lower.is_real() && integral.upper.is_real()
            }
        }
    }

    /// Replaces every free occurrence of `var` with `value`.
    pub fn subs(&self, var: &Symbol, value: &Expr) -> Expr {
        match self {
            Expr::Num(_) | Expr::Pi => self.clone(),
            Expr::Sym(s) if s == var => value.clone(),
            Expr::Sym(_) => self.clone(),
            Expr::Add(terms) => Expr::sum(terms.iter().map(|t| t.subs(var, value))),
            Expr::Mul(terms) => Expr::product(terms.iter().map(|t| t.subs(var, value))),
            Expr::Pow(base, exponent) => base.subs(var, value).pow(exponent.clone()),
            Expr::Func(func, arg) => Expr::Func(*func, Box::new(arg.subs(var, value))),
            Expr::Integral(integral) => {
                let integrand = if &integral.var == var {
                    integral.integrand.clone()
                } else {
                    integral.integrand.subs(var, value)
                };
                Expr::Integral(Box::new(Integral {
                    integrand,
                    var: integral.var.clone(),
                    lower: integral.lower.subs(var, value),
                    upper: integral.upper.subs(var, value),
                }))
            }
        }
    }

    /// Replaces every subtree structurally equal to `target`.
    pub fn replace(&self, target: &Expr, with: &Expr) -> Expr {
        if self == target {
            return with.clone();
        }
        match self {
            Expr::Num(_) | Expr::Pi | Expr::Sym(_) => self.clone(),
            Expr::Add(terms) => Expr::sum(terms.iter().map(|t| t.replace(target, with))),
            Expr::Mul(terms) => Expr::product(terms.iter().map(|t| t.replace(target, with))),
            Expr::Pow(base, exponent) => base.replace(target, with).pow(exponent.clone()),
            Expr::Func(func, arg) => Expr::Func(*func, Box::new(arg.replace(target, with))),
            Expr::Integral(integral) => Expr::Integral(Box::new(Integral {
                integrand: integral.integrand.replace(target, with),
                var: integral.var.clone(),
                lower: integral.lower.replace(target, with),
                upper: integral.upper.replace(target, with),
            })),
        }
    }

    /// Collects the arguments of every `abs(..)` in the tree.
    pub fn abs_arguments(&self) -> Vec<Expr> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Expr::Num(_) | Expr::Pi | Expr::Sym(_) => {}
                Expr::Add(terms) | Expr::Mul(terms) => stack.extend(terms.iter()),
                Expr::Pow(base, _) => stack.push(base),
                Expr::Func(Func::Abs, arg) => {
                    if !found.contains(arg.as_ref()) {
                        found.push(arg.as_ref().clone());
                    }
                    stack.push(arg);
                }
                Expr::Func(_, arg) => stack.push(arg),
                Expr::Integral(integral) => {
                    stack.push(&integral.integrand);
                    stack.push(&integral.lower);
                    stack.push(&integral.upper);
                }
            }
        }
        found
    }

    /// Canonical form of this expression.
    pub fn simplify(&self) -> Result<Expr, SymbolicError> {
        super::canonical::simplify(self)
    }

    /// Partial derivative with respect to `var` (unsimplified).
    pub fn diff(&self, var: &Symbol) -> Expr {
        super::diff::diff(self, var)
    }

    /// Semantic equality: `self - other` simplifies to zero.
    pub fn is_equivalent(&self, other: &Expr) -> Result<bool, SymbolicError> {
        Ok((self - other).simplify()?.is_zero())
    }
}

// --- Operators ---

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::sum([self, rhs])
    }
}

impl<'a> Add<&'a Expr> for &'a Expr {
    type Output = Expr;
    fn add(self, rhs: &'a Expr) -> Expr {
        Expr::sum([self.clone(), rhs.clone()])
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::sum([self, -rhs])
    }
}

impl<'a> Sub<&'a Expr> for &'a Expr {
    type Output = Expr;
    fn sub(self, rhs: &'a Expr) -> Expr {
        Expr::sum([self.clone(), -rhs.clone()])
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::product([self, rhs])
    }
}

impl<'a> Mul<&'a Expr> for &'a Expr {
    type Output = Expr;
    fn mul(self, rhs: &'a Expr) -> Expr {
        Expr::product([self.clone(), rhs.clone()])
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::product([self, rhs.powi(-1)])
    }
}

impl<'a> Div<&'a Expr> for &'a Expr {
    type Output = Expr;
    fn div(self, rhs: &'a Expr) -> Expr {
        Expr::product([self.clone(), rhs.clone().powi(-1)])
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::product([Expr::int(-1), self])
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        -self.clone()
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Expr {
        Expr::int(n)
    }
}

impl From<&Symbol> for Expr {
    fn from(s: &Symbol) -> Expr {
        Expr::sym(s)
    }
}

// --- Display ---

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Num(n) if n.is_negative() || !n.is_integer() => PREC_MUL,
            Expr::Add(_) => PREC_ADD,
            Expr::Mul(_) => PREC_MUL,
            Expr::Pow(_, e) if e.is_negative() => PREC_MUL,
            Expr::Pow(_, e) if *e == half() => PREC_ATOM,
            Expr::Pow(_, _) => PREC_POW,
            _ => PREC_ATOM,
        }
    }

    /// `Some(-self)` when the expression prints with a leading minus.
    fn negated(&self) -> Option<Expr> {
        match self {
            Expr::Num(n) if n.is_negative() => Some(Expr::Num(-n)),
            Expr::Mul(factors) => match factors.first() {
                Some(Expr::Num(n)) if n.is_negative() => {
                    let rest = factors[1..].iter().cloned();
                    Some(Expr::product(std::iter::once(Expr::Num(-n)).chain(rest)))
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        if self.precedence() < parent {
            write!(f, "(")?;
            self.fmt_bare(f)?;
            write!(f, ")")
        } else {
            self.fmt_bare(f)
        }
    }

    fn fmt_bare(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{}", n),
            Expr::Sym(s) => write!(f, "{}", s),
            Expr::Pi => write!(f, "pi"),
            Expr::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    match (i, term.negated()) {
                        (0, Some(pos)) => {
                            write!(f, "-")?;
                            pos.fmt_prec(f, PREC_MUL)?;
                        }
                        (0, None) => term.fmt_prec(f, PREC_ADD)?,
                        (_, Some(pos)) => {
                            write!(f, " - ")?;
                            pos.fmt_prec(f, PREC_MUL)?;
                        }
                        (_, None) => {
                            write!(f, " + ")?;
                            term.fmt_prec(f, PREC_MUL)?;
                        }
                    }
                }
                Ok(())
            }
            Expr::Mul(factors) => {
                if let Some(pos) = self.negated() {
                    write!(f, "-")?;
                    return pos.fmt_prec(f, PREC_MUL);
                }
                let mut numer = Vec::new();
                let mut denom = Vec::new();
                for factor in factors {
                    match factor {
                        Expr::Pow(base, e) if e.is_negative() => {
                            denom.push(base.as_ref().clone().pow(-e.clone()))
                        }
                        other => numer.push(other.clone()),
                    }
                }
                if numer.is_empty() {
                    write!(f, "1")?;
                }
                for (i, factor) in numer.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    factor.fmt_prec(f, PREC_POW)?;
                }
                if !denom.is_empty() {
                    write!(f, "/")?;
                    if denom.len() > 1 {
                        write!(f, "(")?;
                    }
                    for (i, factor) in denom.iter().enumerate() {
                        if i > 0 {
                            write!(f, "*")?;
                        }
                        factor.fmt_prec(f, PREC_POW)?;
                    }
                    if denom.len() > 1 {
                        write!(f, ")")?;
                    }
                }
                Ok(())
            }
            Expr::Pow(base, e) if *e == half() => write!(f, "sqrt({})", base),
            Expr::Pow(base, e) if e.is_negative() => {
                write!(f, "1/")?;
                base.as_ref().clone().pow(-e.clone()).fmt_prec(f, PREC_ATOM)
            }
            Expr::Pow(base, e) => {
                base.fmt_prec(f, PREC_ATOM)?;
                if e.is_integer() {
                    write!(f, "^{}", e)
                } else {
                    write!(f, "^({})", e)
                }
            }
            Expr::Func(func, arg) => write!(f, "{}({})", func.name(), arg),
            Expr::Integral(integral) => write!(
                f,
                "Integral({}, ({}, {}, {}))",
                integral.integrand, integral.var, integral.lower, integral.upper
            ),
        }
    }
}

fn half() -> BigRational {
    BigRational::new(BigInt::one(), BigInt::from(2))
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_bare(f)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
