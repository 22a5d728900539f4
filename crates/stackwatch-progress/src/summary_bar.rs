//! Proportional summary bar, e.g. `█████▒▒▒░░` for running/pending/stopped tasks.

use std::io::Write;

use stackwatch_core::ProgressError;

use crate::renderer::Renderer;
use crate::text::SingleLine;

/// A bar of fixed width split between magnitudes in proportion to their size.
///
/// Configuration errors surface at render time so the caller can decide to
/// skip the bar instead of aborting the whole frame.
#[derive(Debug, Clone)]
pub struct SummaryBar {
    data: Vec<i64>,
    width: i64,
    representations: Vec<String>,
    empty: String,
    padding: usize,
}

impl SummaryBar {
    #[must_use]
    pub fn new(
        data: Vec<i64>,
        width: i64,
        representations: Vec<String>,
        empty: impl Into<String>,
    ) -> Self {
        Self {
            data,
            width,
            representations,
            empty: empty.into(),
            padding: 0,
        }
    }

    #[must_use]
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// The bar itself, without padding or newline.
    pub fn bar(&self) -> Result<String, ProgressError> {
        let width = usize::try_from(self.width)
            .ok()
            .filter(|w| *w > 0)
            .ok_or(ProgressError::InvalidWidth(self.width))?;
        if self.representations.len() < self.data.len() {
            return Err(ProgressError::MissingRepresentations {
                data: self.data.len(),
                representations: self.representations.len(),
            });
        }
        if self.data.iter().any(|d| *d < 0) {
            return Err(ProgressError::NegativeValue);
        }

        let (data, representations): (Vec<u64>, Vec<&str>) = self
            .data
            .iter()
            .zip(&self.representations)
            .filter(|(d, _)| **d > 0)
            .map(|(d, r)| (d.unsigned_abs(), r.as_str()))
            .unzip();

        if data.is_empty() {
            return Ok(self.empty.repeat(width));
        }

        let portions = portions(&data, width);
        Ok(representations
            .iter()
            .zip(portions)
            .map(|(r, p)| r.repeat(p))
            .collect())
    }
}

impl Renderer for SummaryBar {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        SingleLine::new(self.bar()?, self.padding).render(out)
    }
}

/// Split `width` units between positive magnitudes by largest remainder.
///
/// Every magnitude first gets the floor of its exact share; the leftover
/// units go one at a time to the largest remainders, ties going to the
/// earlier magnitude. Shares are computed in `u128` so any set of `i64`
/// magnitudes sums without overflow and remainders compare exactly.
fn portions(data: &[u64], width: usize) -> Vec<usize> {
    let sum: u128 = data.iter().map(|d| u128::from(*d)).sum();
    let total = width as u128;
    let mut shares: Vec<(usize, usize, u128)> = data
        .iter()
        .enumerate()
        .map(|(index, d)| {
            let scaled = u128::from(*d) * total;
            // Never more than `width`, so it fits back into usize.
            let floor = usize::try_from(scaled / sum).unwrap_or(width);
            (index, floor, scaled % sum)
        })
        .collect();

    let allocated: usize = shares.iter().map(|s| s.1).sum();
    shares.sort_by(|a, b| b.2.cmp(&a.2));
    for share in shares.iter_mut().take(width.saturating_sub(allocated)) {
        share.1 += 1;
    }
    shares.sort_by_key(|s| s.0);
    shares.into_iter().map(|s| s.1).collect()
}
