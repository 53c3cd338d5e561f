//! Result shapes produced by the aggregation layer and consumed by charts.

/// A two-way table: one row per value of the first grouping column, one
/// column per value of the second. Cells are `None` where the combination
/// never occurs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrossTab {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.column_labels.is_empty()
    }

    /// Cell value for a (row, column) pair, `None` if either label is
    /// unknown or the combination is absent.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.column_labels.iter().position(|l| l == column)?;
        self.cells[r][c]
    }

    /// Values of one column in row order.
    pub fn column(&self, column: &str) -> Vec<Option<f64>> {
        match self.column_labels.iter().position(|l| l == column) {
            Some(c) => self.cells.iter().map(|row| row[c]).collect(),
            None => vec![None; self.row_labels.len()],
        }
    }

    /// Rows rearranged to `order`. Labels absent from the table become
    /// all-`None` rows; labels absent from `order` are dropped.
    pub fn reindex_rows(&self, order: &[&str]) -> CrossTab {
        let cells = order
            .iter()
            .map(|label| match self.row_labels.iter().position(|l| l == label) {
                Some(r) => self.cells[r].clone(),
                None => vec![None; self.column_labels.len()],
            })
            .collect();
        CrossTab {
            row_labels: order.iter().map(|s| s.to_string()).collect(),
            column_labels: self.column_labels.clone(),
            cells,
        }
    }
}

/// One line of a long-form two-column table: a category, the hue it is
/// split by, and a value (a count or a share).
#[derive(Debug, Clone, PartialEq)]
pub struct PairValue {
    pub first: String,
    pub second: String,
    pub value: f64,
}

/// Group counts of one column, largest first, with treemap-ready labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnCounts {
    pub entries: Vec<(String, usize)>,
    /// `"<value>\n (<count>)"` per entry.
    pub labels: Vec<String>,
    pub sizes: Vec<usize>,
}
