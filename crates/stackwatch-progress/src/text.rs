//! Single-line renderer and text wrapping.

use std::io::Write;

use stackwatch_core::ProgressError;

use crate::renderer::Renderer;

/// A line of text indented by `padding` spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleLine {
    pub text: String,
    pub padding: usize,
}

impl SingleLine {
    #[must_use]
    pub fn new(text: impl Into<String>, padding: usize) -> Self {
        Self {
            text: text.into(),
            padding,
        }
    }

    /// An empty separator line.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }
}

impl Renderer for SingleLine {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        writeln!(out, "{:width$}{}", "", self.text, width = self.padding)?;
        Ok(1)
    }
}

/// Write every line in order, returning how many were written.
pub fn render_lines(out: &mut dyn Write, lines: &[SingleLine]) -> Result<usize, ProgressError> {
    let mut total = 0;
    for line in lines {
        total += line.render(out)?;
    }
    Ok(total)
}

/// Replace tabs by spaces, so free text never opens a new column.
#[must_use]
pub fn untab(s: &str) -> String {
    s.replace('\t', " ")
}

/// Split `s` into chunks of at most `max` characters, tabs turned into spaces.
///
/// Chunks break at character counts, not at word boundaries.
#[must_use]
pub fn split_by_length(s: &str, max: usize) -> Vec<String> {
    let s = untab(s);
    if max == 0 {
        return vec![s];
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(max).map(|chunk| chunk.iter().collect()).collect()
}
