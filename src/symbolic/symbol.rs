// src/symbolic/symbol.rs

//! Named symbols and the assumptions attached to them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Facts the simplifier may rely on when it sees a symbol.
    ///
    /// `POSITIVE` lets `sqrt(R^2)` collapse to `R`; `REAL` alone turns it
    /// into `abs(R)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
    pub struct Assumptions: u8 {
        const REAL     = 1 << 0;
        const POSITIVE = 1 << 1;
    }
}

/// A named variable or free parameter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol {
    name: String,
    assumptions: Assumptions,
}

impl Symbol {
    /// A real-valued symbol. Coordinates are created this way.
    pub fn new(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            assumptions: Assumptions::REAL,
        }
    }

    /// A strictly positive real symbol (radii, scale factors).
    pub fn positive(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            assumptions: Assumptions::REAL | Assumptions::POSITIVE,
        }
    }

    pub fn with_assumptions(name: impl Into<String>, assumptions: Assumptions) -> Self {
        let assumptions = if assumptions.contains(Assumptions::POSITIVE) {
            assumptions | Assumptions::REAL
        } else {
            assumptions
        };
        Symbol {
            name: name.into(),
            assumptions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assumptions(&self) -> Assumptions {
        self.assumptions
    }

    pub fn is_real(&self) -> bool {
        self.assumptions.contains(Assumptions::REAL)
    }

    pub fn is_positive(&self) -> bool {
        self.assumptions.contains(Assumptions::POSITIVE)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn positive_implies_real() {
        let r = Symbol::with_assumptions("R", Assumptions::POSITIVE);
        assert!(r.is_real());
        assert!(r.is_positive());
        assert_eq!(r, Symbol::positive("R"));
    }

    #[test_log::test]
    fn plain_symbols_are_real_but_not_positive() {
        let theta = Symbol::new("theta");
        assert!(theta.is_real());
        assert!(!theta.is_positive());
        assert_eq!(theta.to_string(), "theta");
    }
}
