//! Column sorting
//!
//! Numeric comparison is attempted first (strip everything that is not a
//! digit, dot, or minus, then parse); lexical comparison is the fallback
//! when either side fails to parse. Sorting is stable: ties preserve input
//! order under `slice::sort_by`, and the mirrored controller script relies
//! on the equally stable `Array.prototype.sort`.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

/// Numeric view of a cell's display text, if one survives stripping
pub fn numeric_value(text: &str) -> Option<f64> {
    static NON_NUMERIC: OnceLock<Regex> = OnceLock::new();
    let pattern = NON_NUMERIC.get_or_init(|| {
        Regex::new(r"[^0-9.\-]").expect("static pattern compiles")
    });
    let stripped = pattern.replace_all(text, "");
    if stripped.is_empty() {
        return None;
    }
    stripped.parse().ok()
}

/// Compare two cell texts: numeric when both parse, lexical otherwise
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Active sort column and direction for one table.
///
/// First activation of a column sorts ascending; repeat activation toggles
/// the direction. Only the active column carries an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<usize>,
    pub ascending: bool,
}

impl SortState {
    /// Header-cell activation
    pub fn activate(&mut self, column: usize) {
        if self.column == Some(column) {
            self.ascending = !self.ascending;
        } else {
            self.column = Some(column);
            self.ascending = true;
        }
    }

    /// Indicator for a column: `Some("asc")`/`Some("desc")` on the active
    /// column, `None` everywhere else
    pub fn indicator(&self, column: usize) -> Option<&'static str> {
        if self.column == Some(column) {
            Some(if self.ascending { "asc" } else { "desc" })
        } else {
            None
        }
    }
}

/// Row order (as indices into `rows`) under the current sort state.
///
/// Rows are compared by the active column's cell text; with no active
/// column the input order is returned unchanged.
pub fn row_order(state: &SortState, rows: &[Vec<String>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    let Some(column) = state.column else {
        return order;
    };
    order.sort_by(|&a, &b| {
        let left = rows[a].get(column).map(String::as_str).unwrap_or("");
        let right = rows[b].get(column).map(String::as_str).unwrap_or("");
        let ordering = compare_cells(left, right);
        if state.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    order
}
