// src/stats/mod.rs
//! Base counters for one leaderboard row and the derived metrics built on them.
//!
//! Every derived metric is written once, as a formula over an [`Evaluator`].
//! The formula runs eagerly over a loaded [`RawStats`] ([`derive`]) or compiles
//! to a SQLite expression ([`derive_expr`], [`derive_sum_expr`]) so the store can
//! filter and sort on it without loading rows.

pub mod derived;
pub mod expr;
pub mod raw;

pub use derived::{derive, DerivedView, Evaluator, Metric, Scalar};
pub use expr::{derive_expr, derive_sum_expr, SqlEval, SqlExpr};
pub use raw::{Field, RawStats};
