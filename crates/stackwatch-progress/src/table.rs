//! Column-aligned table renderer.

use std::io::Write;

use console::measure_text_width;

use stackwatch_core::constants::{NESTED_PADDING, TABLE_GAP_WIDTH, TABLE_MIN_CELL_WIDTH};
use stackwatch_core::ProgressError;

use crate::renderer::Renderer;
use crate::text::{untab, SingleLine};

/// A titled table. Renders nothing at all while it has no rows, so empty
/// tables never flash on screen during the first polling cycles.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub padding: usize,
}

impl Table {
    #[must_use]
    pub fn new(title: impl Into<String>, header: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.into(),
            header: header.iter().map(|h| (*h).to_string()).collect(),
            rows,
            padding: 0,
        }
    }

    #[must_use]
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in std::iter::once(&self.header).chain(&self.rows) {
            for (col, cell) in row.iter().enumerate() {
                let width = (measure_text_width(&untab(cell)) + TABLE_GAP_WIDTH).max(TABLE_MIN_CELL_WIDTH);
                if col == widths.len() {
                    widths.push(width);
                } else if widths[col] < width {
                    widths[col] = width;
                }
            }
        }
        widths
    }

    fn format_row(&self, row: &[String], widths: &[usize]) -> String {
        let mut line = String::new();
        let last = row.len().saturating_sub(1);
        for (col, cell) in row.iter().enumerate() {
            line.push_str(&untab(cell));
            if col < last {
                let pad = widths[col] - measure_text_width(&untab(cell));
                line.extend(std::iter::repeat(' ').take(pad));
            }
        }
        line.trim_end().to_string()
    }
}

impl Renderer for Table {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        if self.rows.is_empty() {
            return Ok(0);
        }

        let mut buf = Vec::new();
        let mut lines = SingleLine::new(self.title.clone(), self.padding).render(&mut buf)?;

        let widths = self.column_widths();
        let indent = self.padding + NESTED_PADDING;
        for row in std::iter::once(&self.header).chain(&self.rows) {
            lines += SingleLine::new(self.format_row(row, &widths), indent).render(&mut buf)?;
        }

        out.write_all(&buf)?;
        Ok(lines)
    }
}
