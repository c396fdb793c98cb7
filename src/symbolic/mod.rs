// src/symbolic/mod.rs

//! Exact symbolic algebra: expressions, canonical simplification,
//! differentiation, matrices, tensor arrays and definite integration.

pub mod array;
pub(crate) mod canonical;
pub mod diff;
pub mod expr;
pub mod integrate;
pub mod matrix;
pub(crate) mod poly;
pub mod symbol;

pub use array::TensorArray;
pub use canonical::{manifest_sign, simplify};
pub use expr::{Expr, Func, Integral};
pub use integrate::{integrate, integrate_over, Bound};
pub use matrix::Matrix;
pub use symbol::{Assumptions, Symbol};
