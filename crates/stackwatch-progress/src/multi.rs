//! Several independent dynamic renderers shown one after the other.

use std::io::Write;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use stackwatch_core::signal::DoneSignal;
use stackwatch_core::ProgressError;

use crate::renderer::{fan_in, DynamicRenderer, Renderer};

/// Concatenates its children; done once every child is done.
pub struct MultiRenderer {
    children: Vec<Arc<dyn DynamicRenderer>>,
    done: DoneSignal,
}

impl MultiRenderer {
    #[must_use]
    pub fn new(children: Vec<Arc<dyn DynamicRenderer>>) -> Self {
        let done = fan_in("multi", children.iter().map(|c| c.done()).collect());
        Self { children, done }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Renderer for MultiRenderer {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        let mut buf = Vec::new();
        let mut total = 0;
        for child in &self.children {
            total += child.render(&mut buf)?;
        }
        out.write_all(&buf)?;
        Ok(total)
    }
}

impl DynamicRenderer for MultiRenderer {
    fn done(&self) -> Receiver<()> {
        self.done.receiver()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::SingleLine;
    use stackwatch_core::signal::wait_closed;
    use std::time::Duration;

    struct Line {
        text: &'static str,
        fail: bool,
        done: DoneSignal,
    }

    impl Renderer for Line {
        fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
            if self.fail {
                return Err(ProgressError::InvalidWidth(0));
            }
            SingleLine::new(self.text, 0).render(out)
        }
    }

    impl DynamicRenderer for Line {
        fn done(&self) -> Receiver<()> {
            self.done.receiver()
        }
    }

    fn line(text: &'static str, fail: bool) -> Arc<dyn DynamicRenderer> {
        Arc::new(Line {
            text,
            fail,
            done: DoneSignal::new(),
        })
    }

    #[test]
    fn concatenates_in_order() {
        let multi = MultiRenderer::new(vec![line("a", false), line("b", false)]);
        let mut buf = Vec::new();
        assert_eq!(multi.render(&mut buf).unwrap(), 2);
        assert_eq!(buf, b"a\nb\n");
        assert_eq!(multi.len(), 2);
    }

    #[test]
    fn fails_fast_without_output() {
        let multi = MultiRenderer::new(vec![line("a", false), line("b", true), line("c", false)]);
        let mut buf = Vec::new();
        assert!(matches!(multi.render(&mut buf), Err(ProgressError::InvalidWidth(0))));
        assert!(buf.is_empty());
    }

    #[test]
    fn done_in_any_order() {
        let (a, b) = (
            Arc::new(Line { text: "a", fail: false, done: DoneSignal::new() }),
            Arc::new(Line { text: "b", fail: false, done: DoneSignal::new() }),
        );
        let multi = MultiRenderer::new(vec![a.clone() as Arc<dyn DynamicRenderer>, b.clone()]);
        b.done.close();
        assert!(multi.done().recv_timeout(Duration::from_millis(20)).is_err());
        a.done.close();
        wait_closed(&multi.done());
    }
}
