// src/symbolic/poly.rs

//! Sparse multivariate polynomials over the rationals.
//!
//! The indeterminates are [`Atom`]s: symbols, `pi`, and function applications
//! the canonicalizer treats as opaque. Monomials are ordered lexicographically
//! on their exponent vectors, so the last entry of a polynomial's term map is
//! its leading term. Exact division, GCD and square roots rely on that.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::expr::{Expr, Func, Integral};
use super::symbol::Symbol;

/// An indeterminate of the polynomial ring.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    Sym(Symbol),
    Pi,
    /// `f(arg)` with `arg` in canonical form.
    Func(Func, Expr),
    /// Principal `q`-th root of a polynomial radicand.
    Root(Expr, u32),
    Integral(Box<Integral>),
}

impl Atom {
    pub fn to_expr(&self) -> Expr {
        match self {
            Atom::Sym(s) => Expr::Sym(s.clone()),
            Atom::Pi => Expr::Pi,
            Atom::Func(func, arg) => Expr::Func(*func, Box::new(arg.clone())),
            Atom::Root(radicand, q) => Expr::Pow(
                Box::new(radicand.clone()),
                BigRational::new(BigInt::one(), BigInt::from(*q)),
            ),
            Atom::Integral(integral) => Expr::Integral(integral.clone()),
        }
    }

    /// Strictly positive for every admissible value of its symbols.
    pub fn is_positive(&self) -> bool {
        match self {
            Atom::Sym(s) => s.is_positive(),
            Atom::Pi => true,
            Atom::Func(Func::Exp, arg) => arg.is_real(),
            Atom::Func(_, _) | Atom::Root(_, _) | Atom::Integral(_) => false,
        }
    }

    pub fn is_nonnegative(&self) -> bool {
        self.is_positive() || matches!(self, Atom::Func(Func::Abs, _) | Atom::Root(_, _))
    }

    pub fn is_real(&self) -> bool {
        match self {
            Atom::Sym(s) => s.is_real(),
            Atom::Pi | Atom::Root(_, _) => true,
            Atom::Func(_, arg) => arg.is_real(),
            Atom::Integral(integral) => integral.integrand.is_real(),
        }
    }

    pub fn depends_on(&self, var: &Symbol) -> bool {
        match self {
            Atom::Sym(s) => s == var,
            Atom::Pi => false,
            Atom::Func(_, arg) | Atom::Root(arg, _) => arg.depends_on(var),
            Atom::Integral(integral) => integral.depends_on(var),
        }
    }
}

// --- Monomials ---

/// Product of atoms with positive exponents, sorted by atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Monomial(Vec<(Atom, u32)>);

impl Monomial {
    pub fn one() -> Self {
        Monomial(Vec::new())
    }

    pub fn atom(atom: Atom, exp: u32) -> Self {
        if exp == 0 {
            Monomial::one()
        } else {
            Monomial(vec![(atom, exp)])
        }
    }

    pub fn from_factors(factors: impl IntoIterator<Item = (Atom, u32)>) -> Self {
        let mut map: BTreeMap<Atom, u32> = BTreeMap::new();
        for (atom, exp) in factors {
            *map.entry(atom).or_insert(0) += exp;
        }
        Monomial(map.into_iter().filter(|(_, e)| *e > 0).collect())
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn factors(&self) -> &[(Atom, u32)] {
        &self.0
    }

    pub fn degree_of(&self, atom: &Atom) -> u32 {
        self.0
            .binary_search_by(|(a, _)| a.cmp(atom))
            .map(|i| self.0[i].1)
            .unwrap_or(0)
    }

    pub fn without(&self, atom: &Atom) -> Monomial {
        Monomial(self.0.iter().filter(|(a, _)| a != atom).cloned().collect())
    }

    pub fn mul(&self, other: &Monomial) -> Monomial {
        Monomial::from_factors(self.0.iter().chain(other.0.iter()).cloned())
    }

    /// `self / other`, or `None` when `other` does not divide `self`.
    pub fn div(&self, other: &Monomial) -> Option<Monomial> {
        let mut out = Vec::with_capacity(self.0.len());
        let mut j = 0;
        for (atom, exp) in &self.0 {
            let mut sub = 0;
            if let Some((b, eb)) = other.0.get(j) {
                match atom.cmp(b) {
                    Ordering::Equal => {
                        sub = *eb;
                        j += 1;
                    }
                    Ordering::Greater => return None,
                    Ordering::Less => {}
                }
            }
            if sub > *exp {
                return None;
            }
            if exp - sub > 0 {
                out.push((atom.clone(), exp - sub));
            }
        }
        if j < other.0.len() {
            return None;
        }
        Some(Monomial(out))
    }

    pub fn gcd(&self, other: &Monomial) -> Monomial {
        Monomial(
            self.0
                .iter()
                .filter_map(|(a, e)| {
                    let k = (*e).min(other.degree_of(a));
                    (k > 0).then(|| (a.clone(), k))
                })
                .collect(),
        )
    }
}

impl Ord for Monomial {
    /// Lexicographic on exponent vectors; the smallest atom is most
    /// significant.
    fn cmp(&self, other: &Self) -> Ordering {
        let mut lhs = self.0.iter();
        let mut rhs = other.0.iter();
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some((a, ea)), Some((b, eb))) => match a.cmp(b) {
                    Ordering::Equal => match ea.cmp(eb) {
                        Ordering::Equal => continue,
                        unequal => return unequal,
                    },
                    Ordering::Less => return Ordering::Greater,
                    Ordering::Greater => return Ordering::Less,
                },
            }
        }
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// --- Polynomials ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Poly {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Poly {
    pub fn zero() -> Self {
        Poly::default()
    }

    pub fn one() -> Self {
        Poly::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        Poly::term(Monomial::one(), c)
    }

    pub fn term(monomial: Monomial, c: BigRational) -> Self {
        let mut p = Poly::zero();
        p.add_term(monomial, c);
        p
    }

    pub fn atom(atom: Atom) -> Self {
        Poly::term(Monomial::atom(atom, 1), BigRational::one())
    }

    pub fn add_term(&mut self, monomial: Monomial, c: BigRational) {
        if c.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += c;
                if slot.get().is_zero() {
                    slot.remove();
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(c);
            }
        }
    }

    pub fn terms(&self) -> impl DoubleEndedIterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.as_constant().is_some_and(|c| c.is_one())
    }

    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(m, _)| m.is_one())
                .map(|(_, c)| c.clone()),
            _ => None,
        }
    }

    pub fn is_monomial(&self) -> bool {
        self.terms.len() == 1
    }

    pub fn leading(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().next_back()
    }

    pub fn leading_coefficient(&self) -> BigRational {
        self.leading().map(|(_, c)| c.clone()).unwrap_or_else(BigRational::zero)
    }

    pub fn atoms(&self) -> BTreeSet<Atom> {
        self.terms
            .keys()
            .flat_map(|m| m.factors().iter().map(|(a, _)| a.clone()))
            .collect()
    }

    pub fn degree_in(&self, atom: &Atom) -> u32 {
        self.terms.keys().map(|m| m.degree_of(atom)).max().unwrap_or(0)
    }

    pub fn depends_on(&self, var: &Symbol) -> bool {
        self.atoms().iter().any(|a| a.depends_on(var))
    }

    pub fn add(&self, other: &Poly) -> Poly {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), c.clone());
        }
        out
    }

    pub fn sub(&self, other: &Poly) -> Poly {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), -c.clone());
        }
        out
    }

    pub fn neg(&self) -> Poly {
        self.scale(&-BigRational::one())
    }

    pub fn scale(&self, c: &BigRational) -> Poly {
        if c.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self.terms.iter().map(|(m, v)| (m.clone(), v * c)).collect(),
        }
    }

    pub fn mul_term(&self, monomial: &Monomial, c: &BigRational) -> Poly {
        if c.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, v)| (m.mul(monomial), v * c))
                .collect(),
        }
    }

    pub fn mul(&self, other: &Poly) -> Poly {
        let mut out = Poly::zero();
        for (m, c) in &other.terms {
            for (m2, c2) in &self.terms {
                out.add_term(m.mul(m2), c * c2);
            }
        }
        out
    }

    pub fn pow(&self, k: u32) -> Poly {
        let mut out = Poly::one();
        let mut base = self.clone();
        let mut k = k;
        while k > 0 {
            if k & 1 == 1 {
                out = out.mul(&base);
            }
            k >>= 1;
            if k > 0 {
                base = base.mul(&base);
            }
        }
        out
    }

    /// Replaces `atom` by `-atom`.
    pub fn negate_atom(&self, atom: &Atom) -> Poly {
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| {
                    if m.degree_of(atom) % 2 == 1 {
                        (m.clone(), -c.clone())
                    } else {
                        (m.clone(), c.clone())
                    }
                })
                .collect(),
        }
    }

    /// Rewrites `atom^(2k)` as `replacement^k`; `None` if some term has an
    /// odd power of `atom`.
    pub fn substitute_square(&self, atom: &Atom, replacement: &Poly) -> Option<Poly> {
        let mut out = Poly::zero();
        for (m, c) in &self.terms {
            let e = m.degree_of(atom);
            if e % 2 == 1 {
                return None;
            }
            out = out.add(&replacement.pow(e / 2).mul_term(&m.without(atom), c));
        }
        Some(out)
    }

    /// Greatest common divisor of all monomials.
    pub fn monomial_content(&self) -> Monomial {
        let mut iter = self.terms.keys();
        let Some(first) = iter.next() else {
            return Monomial::one();
        };
        iter.fold(first.clone(), |acc, m| acc.gcd(m))
    }

    /// Positive rational `c` such that `self / c` has coprime integer
    /// coefficients.
    pub fn rational_content(&self) -> BigRational {
        let mut numer = BigInt::zero();
        let mut denom = BigInt::one();
        for c in self.terms.values() {
            numer = num_integer::Integer::gcd(&numer, c.numer());
            denom = num_integer::Integer::lcm(&denom, c.denom());
        }
        if numer.is_zero() {
            return BigRational::one();
        }
        BigRational::new(numer, denom)
    }

    /// Exact quotient `self / divisor`, or `None` if the division leaves a
    /// remainder.
    pub fn div_exact(&self, divisor: &Poly) -> Option<Poly> {
        let (lead_m, lead_c) = divisor.leading()?;
        if divisor.is_monomial() {
            let mut out = Poly::zero();
            for (m, c) in &self.terms {
                out.add_term(m.div(lead_m)?, c / lead_c);
            }
            return Some(out);
        }
        let mut rem = self.clone();
        let mut quotient = Poly::zero();
        while let Some((m, c)) = rem.leading() {
            let qm = m.div(lead_m)?;
            let qc = c / lead_c;
            rem = rem.sub(&divisor.mul_term(&qm, &qc));
            quotient.add_term(qm, qc);
        }
        Some(quotient)
    }

    /// Polynomial square root with positive leading coefficient, if `self`
    /// is a perfect square.
    pub fn sqrt(&self) -> Option<Poly> {
        let (lead_m, lead_c) = self.leading()?;
        let root_m = monomial_root(lead_m, 2)?;
        let root_c = rational_root(lead_c, 2)?;
        let two_lead = &root_c * BigRational::from_integer(BigInt::from(2));
        let mut root = Poly::term(root_m.clone(), root_c);
        for _ in 0..=self.len() {
            let rem = self.sub(&root.mul(&root));
            let Some((m, c)) = rem.leading() else {
                return Some(root);
            };
            let tm = m.div(&root_m)?;
            if tm >= root_m {
                return None;
            }
            root.add_term(tm, c / &two_lead);
        }
        None
    }

    /// Coefficient list in `x` (index = degree), coefficients free of `x`.
    fn to_univariate(&self, x: &Atom) -> Vec<Poly> {
        let mut coeffs = vec![Poly::zero(); self.degree_in(x) as usize + 1];
        for (m, c) in &self.terms {
            let d = m.degree_of(x) as usize;
            coeffs[d].add_term(m.without(x), c.clone());
        }
        trim(&mut coeffs);
        coeffs
    }

    fn from_univariate(coeffs: &[Poly], x: &Atom) -> Poly {
        let mut out = Poly::zero();
        for (d, coeff) in coeffs.iter().enumerate() {
            out = out.add(&coeff.mul_term(&Monomial::atom(x.clone(), d as u32), &BigRational::one()));
        }
        out
    }

    /// `self` scaled to a leading coefficient of one.
    pub fn monic(&self) -> Poly {
        let lc = self.leading_coefficient();
        if lc.is_zero() || lc.is_one() {
            return self.clone();
        }
        self.scale(&lc.recip())
    }

    pub fn to_expr(&self) -> Expr {
        Expr::sum(self.terms.iter().rev().map(|(m, c)| term_expr(m, c)))
    }
}

fn term_expr(m: &Monomial, c: &BigRational) -> Expr {
    let factors = m
        .factors()
        .iter()
        .map(|(atom, e)| atom.to_expr().powi(i64::from(*e)));
    Expr::product(std::iter::once(Expr::Num(c.clone())).chain(factors))
}

fn trim(coeffs: &mut Vec<Poly>) {
    while coeffs.last().is_some_and(Poly::is_zero) {
        coeffs.pop();
    }
}

/// `m^(1/q)` when every exponent is divisible by `q`.
pub fn monomial_root(m: &Monomial, q: u32) -> Option<Monomial> {
    m.factors()
        .iter()
        .map(|(a, e)| (e % q == 0).then(|| (a.clone(), e / q)))
        .collect::<Option<Vec<_>>>()
        .map(Monomial::from_factors)
}

/// Exact rational `q`-th root, when one exists among the reals.
pub fn rational_root(c: &BigRational, q: u32) -> Option<BigRational> {
    if c.is_negative() && q % 2 == 0 {
        return None;
    }
    let root_int = |n: &BigInt| -> Option<BigInt> {
        let magnitude = n.abs();
        let r = magnitude.nth_root(q);
        (num_traits::pow(r.clone(), q as usize) == magnitude).then(|| if n.is_negative() { -r } else { r })
    };
    Some(BigRational::new(root_int(c.numer())?, root_int(c.denom())?))
}

// --- GCD ---

/// Monic greatest common divisor. Falls back to `1` when a required exact
/// division fails, which only costs cancellation, never correctness.
pub fn gcd(a: &Poly, b: &Poly) -> Poly {
    if a.is_zero() {
        return b.monic();
    }
    if b.is_zero() {
        return a.monic();
    }
    if a.as_constant().is_some() || b.as_constant().is_some() {
        return Poly::one();
    }
    if a.is_monomial() || b.is_monomial() {
        let m = a.monomial_content().gcd(&b.monomial_content());
        return Poly::term(m, BigRational::one());
    }
    gcd_general(a, b).map(|g| g.monic()).unwrap_or_else(Poly::one)
}

fn gcd_general(a: &Poly, b: &Poly) -> Option<Poly> {
    let mut atoms = a.atoms();
    atoms.extend(b.atoms());
    let x = atoms.into_iter().next()?;
    let ua = a.to_univariate(&x);
    let ub = b.to_univariate(&x);
    let ca = content(&ua);
    let cb = content(&ub);
    let c = gcd(&ca, &cb);
    let pa = primitive(&ua, &ca)?;
    let pb = primitive(&ub, &cb)?;
    let g = prs_gcd(pa, pb)?;
    Some(c.mul(&Poly::from_univariate(&g, &x)))
}

fn content(coeffs: &[Poly]) -> Poly {
    let mut acc = Poly::zero();
    for c in coeffs.iter().filter(|c| !c.is_zero()) {
        acc = gcd(&acc, c);
        if acc.is_one() {
            break;
        }
    }
    if acc.is_zero() {
        Poly::one()
    } else {
        acc
    }
}

fn primitive(coeffs: &[Poly], content: &Poly) -> Option<Vec<Poly>> {
    if content.is_one() {
        return Some(coeffs.to_vec());
    }
    coeffs.iter().map(|c| c.div_exact(content)).collect()
}

/// GCD of two primitive univariate polynomials by primitive PRS.
fn prs_gcd(a: Vec<Poly>, b: Vec<Poly>) -> Option<Vec<Poly>> {
    let (mut a, mut b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    loop {
        if b.is_empty() {
            return Some(a);
        }
        if b.len() == 1 {
            return Some(vec![Poly::one()]);
        }
        let r = pseudo_remainder(&a, &b);
        a = b;
        b = if r.is_empty() {
            Vec::new()
        } else {
            let c = content(&r);
            primitive(&r, &c)?
        };
    }
}

fn pseudo_remainder(a: &[Poly], b: &[Poly]) -> Vec<Poly> {
    let mut r = a.to_vec();
    let db = b.len() - 1;
    let lb = &b[db];
    while r.len() > db {
        let dr = r.len() - 1;
        let lr = r[dr].clone();
        let shift = dr - db;
        for c in r.iter_mut() {
            *c = c.mul(lb);
        }
        for (i, bc) in b.iter().enumerate() {
            r[i + shift] = r[i + shift].sub(&lr.mul(bc));
        }
        trim(&mut r);
    }
    r
}
