//! Box-drawn tables for session and step listings.

/// Cells longer than this are cut with an ellipsis.
const MAX_CELL_WIDTH: usize = 48;

/// A simple table for formatted output.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

fn width(cell: &str) -> usize {
    cell.chars().count()
}

fn fit(cell: &str) -> String {
    let single_line = cell.lines().next().unwrap_or("").trim();
    if width(single_line) <= MAX_CELL_WIDTH && !cell.trim().contains('\n') {
        return single_line.to_string();
    }
    let cut: String = single_line.chars().take(MAX_CELL_WIDTH - 1).collect();
    format!("{}…", cut)
}

impl Table {
    /// Create a new table with the given headers.
    pub fn new(headers: &[&str]) -> Self {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let column_widths = headers.iter().map(|h| width(h)).collect();

        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Add a row to the table.
    pub fn add_row<S: AsRef<str>>(&mut self, row: &[S]) {
        let row: Vec<String> = row.iter().map(|s| fit(s.as_ref())).collect();

        for (i, cell) in row.iter().enumerate() {
            if i < self.column_widths.len() {
                self.column_widths[i] = self.column_widths[i].max(width(cell));
            }
        }

        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a string.
    pub fn render(&self) -> String {
        let mut lines = vec![
            self.render_border('┌', '┬', '┐'),
            self.render_row(&self.headers),
            self.render_border('├', '┼', '┤'),
        ];
        lines.extend(self.rows.iter().map(|row| self.render_row(row)));
        lines.push(self.render_border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|w| "─".repeat(w + 2))
            .collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");

        for (i, column_width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(|s| s.as_str()).unwrap_or("");
            let padding = column_width - width(cell);
            s.push_str(&format!(" {}{} │", cell, " ".repeat(padding)));
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_renders_headers() {
        let table = Table::new(&["ID", "Course"]);
        assert!(table.is_empty());
        let output = table.render();
        assert!(output.contains("ID"));
        assert!(output.contains("Course"));
    }

    #[test]
    fn rows_have_borders_and_separators() {
        let mut table = Table::new(&["ID", "Course", "Level"]);
        table.add_row(&["1", "Intro to ML", "undergraduate"]);
        table.add_row(&["2", "Statistics", "graduate"]);

        assert_eq!(table.row_count(), 2);
        let output = table.render();
        let lines: Vec<_> = output.lines().collect();
        // top border, header, separator, 2 rows, bottom border
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with('┌') && lines[0].contains('┬'));
        assert!(lines[2].contains('┼'));
        assert!(lines[5].starts_with('└'));
    }

    #[test]
    fn columns_align_with_unicode_content() {
        let mut table = Table::new(&["Phase", "Status"]);
        table.add_row(&["objective-analysis", "✓"]);
        table.add_row(&["summary", "•"]);

        let widths: Vec<usize> = table.render().lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn long_or_multiline_cells_are_cut() {
        let mut table = Table::new(&["Input"]);
        table.add_row(&["1. Explain gradient descent\n2. Apply it".to_string()]);
        table.add_row(&["x".repeat(80)]);

        let output = table.render();
        assert!(output.contains("1. Explain gradient descent…"));
        assert!(!output.contains("Apply it"));
        assert!(output.contains(&format!("{}…", "x".repeat(MAX_CELL_WIDTH - 1))));
    }

    #[test]
    fn missing_cells_are_blank() {
        let mut table = Table::new(&["A", "B", "C"]);
        table.add_row(&["only", "two"]);
        let output = table.render();
        assert!(output.contains("only"));
        assert!(output.contains("two"));
    }
}
