//! Tab-separated column alignment for a rendered frame.
//!
//! Components separate the columns of a line with `\t`. Every cell followed
//! by a tab belongs to a column; the text after the last tab is trailing and
//! not aligned. Column widths are measured without ANSI escapes.

use std::io::Write;

use console::measure_text_width;

use stackwatch_core::constants::TABLE_GAP_WIDTH;
use stackwatch_core::ProgressError;

/// Align the tab-separated cells of `text` and write the result to `out`.
pub fn write_aligned(out: &mut dyn Write, text: &str) -> Result<(), ProgressError> {
    out.write_all(align(text).as_bytes())?;
    Ok(())
}

/// Replace tabs by enough spaces to line up columns across all lines.
#[must_use]
pub fn align(text: &str) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }

    let rows: Vec<Vec<&str>> = text.split_inclusive('\n').map(|l| l.split('\t').collect()).collect();

    let mut widths: Vec<usize> = Vec::new();
    for cells in &rows {
        for (col, cell) in cells.iter().take(cells.len() - 1).enumerate() {
            let width = measure_text_width(cell) + TABLE_GAP_WIDTH;
            if col == widths.len() {
                widths.push(width);
            } else if widths[col] < width {
                widths[col] = width;
            }
        }
    }

    let mut aligned = String::with_capacity(text.len());
    for cells in &rows {
        let last = cells.len() - 1;
        for (col, cell) in cells.iter().enumerate() {
            aligned.push_str(cell);
            if col < last {
                let pad = widths[col] - measure_text_width(cell);
                aligned.extend(std::iter::repeat(' ').take(pad));
            }
        }
    }
    aligned
}
