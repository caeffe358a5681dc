// src/store/query.rs
use chrono::NaiveDate;

use crate::stats::{derive_expr, Metric, RawStats};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn sql(self) -> &'static str {
        match self { Order::Asc => "ASC", Order::Desc => "DESC" }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cmp {
    Lt,
    Le,
    Ge,
    Gt,
}

impl Cmp {
    fn sql(self) -> &'static str {
        match self { Cmp::Lt => "<", Cmp::Le => "<=", Cmp::Ge => ">=", Cmp::Gt => ">" }
    }
}

/// `metric <cmp> value`, evaluated by SQLite per row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Filter {
    pub metric: Metric,
    pub cmp: Cmp,
    pub value: f64,
}

/// A ranking/filter scan over one capture date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanQuery {
    /// `None` scans the latest date in the store.
    pub date: Option<NaiveDate>,
    pub filters: Vec<Filter>,
    pub order_by: Option<(Metric, Order)>,
    pub limit: Option<usize>,
}

impl ScanQuery {
    pub fn on(date: NaiveDate) -> Self {
        Self { date: Some(date), ..Self::default() }
    }

    pub fn filter(mut self, metric: Metric, cmp: Cmp, value: f64) -> Self {
        self.filters.push(Filter { metric, cmp, value });
        self
    }

    pub fn order_by(mut self, metric: Metric, order: Order) -> Self {
        self.order_by = Some((metric, order));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// SQL text for this scan. Parameter `?1` is the date; filter values
    /// follow as `?2..` in `filters` order.
    pub(crate) fn to_sql(&self, columns: &str) -> String {
        let value = match self.order_by {
            Some((m, _)) => derive_expr(m).to_string(),
            None => s!("NULL"),
        };
        let mut sql = format!("SELECT {columns}, {value} AS value FROM records WHERE date = ?1");
        for (i, f) in self.filters.iter().enumerate() {
            sql.push_str(&format!(" AND {} {} ?{}", derive_expr(f.metric), f.cmp.sql(), i + 2));
        }
        if let Some((_, order)) = self.order_by {
            sql.push_str(&format!(" ORDER BY value {}, username ASC", order.sql()));
        } else {
            sql.push_str(" ORDER BY username ASC");
        }
        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }
        sql
    }
}

/// One scanned row: the record and, when the scan is ordered, the order-by
/// metric as SQLite computed it.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranked {
    pub stats: RawStats,
    pub value: Option<f64>,
}
