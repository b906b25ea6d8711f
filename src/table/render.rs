//! Table Rendering
//!
//! Plain-text rendering of a projected page for terminals and logs.

use serde::Serialize;

use super::directory::AgentDirectory;
use super::projection::{build_columns, build_rows, ColumnHeaderSet, DynamicRow};
use super::record::RawRecord;

/// Cells wider than this are cut with `...`.
const MAX_CELL_WIDTH: usize = 32;

/// Headers plus rows for one page.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: ColumnHeaderSet,
    pub rows: Vec<DynamicRow>,
}

impl TableView {
    /// Projects a page of records.
    pub fn project(records: &[RawRecord], directory: &AgentDirectory) -> Self {
        Self {
            columns: build_columns(records),
            rows: build_rows(records, directory),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text for every column of every row. Missing cells are blank.
    pub fn grid(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| row.cell(column).map(|c| c.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    /// Renders the table with `Status` appended after the dynamic columns.
    pub fn render(&self) -> String {
        let mut headers: Vec<String> = self.columns.iter().map(str::to_string).collect();
        headers.push("Status".to_string());

        let body: Vec<Vec<String>> = self
            .grid()
            .into_iter()
            .zip(&self.rows)
            .map(|(mut cells, row)| {
                cells.push(row.status.clone());
                cells.into_iter().map(|c| truncate(&c, MAX_CELL_WIDTH)).collect()
            })
            .collect();

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                body.iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        output.push_str(&format_line(&headers, &widths));
        output.push_str(&separator(&widths));

        if body.is_empty() {
            output.push_str("(no data)\n");
        }

        for cells in &body {
            output.push_str(&format_line(cells, &widths));
        }

        output
    }
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect();
    format!("{}\n", padded.join(" | ").trim_end())
}

fn separator(widths: &[usize]) -> String {
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    format!("{}\n", dashes.join("-+-"))
}

fn pad(text: &str, width: usize) -> String {
    let length = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(length)))
}

/// Truncates a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::record::AgentEntry;

    fn sample_view() -> TableView {
        let directory = AgentDirectory::from_entries([AgentEntry::new("a1", "Acme")]);
        let records = vec![
            RawRecord::new("r1", "a1", r#"{"X":"1"}"#).with_status("Pending"),
            RawRecord::new("r2", "zzz", r#"{"Y":"2"}"#).with_status("Paid"),
        ];
        TableView::project(&records, &directory)
    }

    #[test]
    fn test_grid_blanks_missing_cells() {
        let grid = sample_view().grid();
        assert_eq!(grid[0], vec!["Acme", "1", ""]);
        assert_eq!(grid[1], vec!["Agent-zzz", "", "2"]);
    }

    #[test]
    fn test_render_contains_headers_and_rows() {
        let text = sample_view().render();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("AgentName"));
        assert!(lines[0].ends_with("Status"));
        assert!(lines[1].starts_with("---"));
        assert!(lines[2].contains("Acme"));
        assert!(lines[3].contains("Agent-zzz"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_render_empty_page() {
        let view = TableView::project(&[], &AgentDirectory::new());
        assert!(view.is_empty());
        let text = view.render();
        assert!(text.starts_with("AgentName | Status"));
        assert!(text.contains("(no data)"));
    }

    #[test]
    fn test_truncate_long_cells() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_columns_aligned() {
        let text = sample_view().render();
        let lines: Vec<&str> = text.lines().collect();
        let header_bar = lines[0].find('|').unwrap();
        assert_eq!(lines[2].find('|'), Some(header_bar));
        assert_eq!(lines[3].find('|'), Some(header_bar));
    }
}
