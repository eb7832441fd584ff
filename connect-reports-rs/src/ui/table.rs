//! Aligned text tables
//!
//! A `Table` holds labelled rows of cell strings. Every column is padded to
//! the widest cell in that column, so all rows line up regardless of how
//! long the individual values are.

/// Width reserved for row labels
const LABEL_WIDTH: usize = 12;

#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<(String, Vec<String>)>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row; missing trailing cells render as blank padding
    pub fn row(mut self, label: impl Into<String>, cells: Vec<String>) -> Self {
        self.rows.push((label.into(), cells));
        self
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0)
    }

    /// Printed width of each column
    pub fn column_widths(&self) -> Vec<usize> {
        (0..self.column_count())
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|(_, cells)| cells.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Render every row, one per line, without a trailing newline
    pub fn render(&self) -> String {
        let widths = self.column_widths();

        self.rows
            .iter()
            .map(|(label, cells)| {
                let mut line = format!("{:<width$} | ", label, width = LABEL_WIDTH);
                for (col, width) in widths.iter().enumerate() {
                    let cell = cells.get(col).map(String::as_str).unwrap_or("");
                    line.push_str(&format!("{:<width$} | ", cell, width = *width));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
