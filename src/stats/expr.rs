// src/stats/expr.rs
use std::fmt;

use super::derived::{Evaluator, Metric};
use super::raw::Field;

/// A SQLite expression over the `records` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqlExpr(String);

impl SqlExpr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds SQL for the derived formulas.
///
/// SQLite divides two integers as integers, so every column is cast to REAL
/// where it enters the expression. Zero guards become `CASE` expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlEval {
    /// One value per row.
    Row,
    /// One value per query, over the column totals. `TOTAL` sums as REAL, so
    /// it cannot overflow and is 0.0 over no rows.
    Totals,
}

impl Evaluator for SqlEval {
    type Value = SqlExpr;

    fn field(&self, field: Field) -> SqlExpr {
        let col = field.as_str();
        match self {
            SqlEval::Row => SqlExpr(format!("CAST({col} AS REAL)")),
            SqlEval::Totals => SqlExpr(format!("TOTAL({col})")),
        }
    }

    fn constant(&self, value: f64) -> SqlExpr {
        // `{:?}` keeps the decimal point, so 60.0 stays a REAL literal.
        SqlExpr(format!("{value:?}"))
    }

    fn sub(&self, lhs: SqlExpr, rhs: SqlExpr) -> SqlExpr {
        SqlExpr(format!("({lhs} - {rhs})"))
    }

    fn div(&self, lhs: SqlExpr, rhs: SqlExpr) -> SqlExpr {
        SqlExpr(format!("({lhs} / {rhs})"))
    }

    fn safe_div(&self, lhs: SqlExpr, rhs: SqlExpr) -> SqlExpr {
        SqlExpr(format!("(CASE WHEN {rhs} = 0 THEN 0.0 ELSE {lhs} / {rhs} END)"))
    }
}

/// Derived metric as a per-row SQL expression, for filtering and ordering
/// inside a scan.
pub fn derive_expr(metric: Metric) -> SqlExpr {
    metric.eval(&SqlEval::Row)
}

/// Derived metric over the summed counters of every row a query selects.
pub fn derive_sum_expr(metric: Metric) -> SqlExpr {
    metric.eval(&SqlEval::Totals)
}
