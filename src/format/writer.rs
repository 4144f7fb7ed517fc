//! Column writer
//!
//! Pads fields to fixed widths and strips trailing whitespace from each finished row.

/// Builds rows of left-justified columns
#[derive(Debug, Default)]
pub struct ColumnWriter {
    /// Finished rows
    rows: Vec<String>,
    /// The row being built
    current: String,
}

impl ColumnWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `text` padded to at least `width` characters
    ///
    /// Text longer than the column is written in full followed by a single space, so columns never run together.
    pub fn column(&mut self, text: &str, width: usize) {
        let len = text.chars().count();
        self.current.push_str(text);
        if len < width {
            self.current.push_str(&" ".repeat(width - len));
        } else if !text.is_empty() {
            self.current.push(' ');
        }
    }

    /// Write `text` right-justified in `width` characters
    pub fn right(&mut self, text: &str, width: usize) {
        let len = text.chars().count();
        if len < width {
            self.current.push_str(&" ".repeat(width - len));
        }
        self.current.push_str(text);
    }

    /// Write `text` without padding
    pub fn write(&mut self, text: &str) {
        self.current.push_str(text);
    }

    /// Finish the current row
    pub fn end_row(&mut self) {
        let row = std::mem::take(&mut self.current);
        self.rows.push(row.trim_end().to_string());
    }

    /// All finished rows; an unfinished row is finished first
    pub fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.end_row();
        }
        self.rows
    }
}
