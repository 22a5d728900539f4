//! Renderer traits shared by every component.

use std::io::Write;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use tracing::debug;

use stackwatch_core::constants::NESTED_PADDING;
use stackwatch_core::signal::{wait_closed, DoneSignal};
use stackwatch_core::ProgressError;

/// Something that can write its current state as lines of text.
pub trait Renderer: Send + Sync {
    /// Write the current state to `out` and return the number of lines written.
    ///
    /// Implementations write only into `out` and never keep it.
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError>;
}

/// A renderer whose state keeps changing until it signals done.
pub trait DynamicRenderer: Renderer {
    /// A receiver that disconnects once no further state changes will happen.
    fn done(&self) -> Receiver<()>;
}

impl<R: Renderer + ?Sized> Renderer for Arc<R> {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        (**self).render(out)
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        (**self).render(out)
    }
}

impl<R: DynamicRenderer + ?Sized> DynamicRenderer for Arc<R> {
    fn done(&self) -> Receiver<()> {
        (**self).done()
    }
}

/// Presentation options propagated from parents to children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Number of spaces in front of every line.
    pub padding: usize,
}

impl RenderOptions {
    #[must_use]
    pub fn new(padding: usize) -> Self {
        Self { padding }
    }

    /// Options for the children of a component rendered with `self`.
    #[must_use]
    pub fn nested(self) -> Self {
        Self {
            padding: self.padding + NESTED_PADDING,
        }
    }
}

/// Render every component in order, stopping at the first error.
pub fn render_all<'a, I>(out: &mut dyn Write, components: I) -> Result<usize, ProgressError>
where
    I: IntoIterator<Item = &'a dyn Renderer>,
{
    let mut total = 0;
    for component in components {
        total += component.render(out)?;
    }
    Ok(total)
}

/// A signal that closes once every receiver in `inputs` has disconnected.
///
/// The wait happens on a dedicated thread, so the returned signal can be
/// selected on like any other done signal.
#[must_use]
pub fn fan_in(name: &'static str, inputs: Vec<Receiver<()>>) -> DoneSignal {
    let done = DoneSignal::new();
    let closer = done.clone();
    std::thread::spawn(move || {
        for input in &inputs {
            wait_closed(input);
        }
        debug!(component = name, inputs = inputs.len(), "all children done");
        closer.close();
    });
    done
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::SingleLine;

    #[test]
    fn nested_padding_increases() {
        let opts = RenderOptions::new(2);
        assert_eq!(opts.nested().padding, 4);
        assert_eq!(opts.nested().nested().padding, 6);
    }

    #[test]
    fn render_all_sums_lines() {
        let a = SingleLine::new("a", 0);
        let b = SingleLine::new("b", 2);
        let mut buf = Vec::new();
        let n = render_all(&mut buf, [&a as &dyn Renderer, &b as &dyn Renderer]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(String::from_utf8(buf).unwrap(), "a\n  b\n");
    }

    #[test]
    fn fan_in_waits_for_every_input() {
        let first = DoneSignal::new();
        let second = DoneSignal::new();
        let done = fan_in("test", vec![first.receiver(), second.receiver()]);

        first.close();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(!done.is_closed());

        second.close();
        done.wait();
        assert!(done.is_closed());
    }

    #[test]
    fn fan_in_of_nothing_closes() {
        fan_in("empty", Vec::new()).wait();
    }
}
