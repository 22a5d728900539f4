//! Root-and-children composites.

use std::io::Write;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use stackwatch_core::signal::DoneSignal;
use stackwatch_core::ProgressError;

use crate::columns;
use crate::renderer::{fan_in, DynamicRenderer, Renderer};

/// Renders `root` followed by every child, in order.
///
/// The frame is built in a buffer first: if any part fails, nothing is
/// written to `out`.
pub struct TreeComponent {
    root: Box<dyn Renderer>,
    children: Vec<Box<dyn Renderer>>,
}

impl TreeComponent {
    #[must_use]
    pub fn new(root: Box<dyn Renderer>, children: Vec<Box<dyn Renderer>>) -> Self {
        Self { root, children }
    }
}

impl Renderer for TreeComponent {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        render_tree(out, &*self.root, self.children.iter().map(|c| &**c as &dyn Renderer))
    }
}

/// A child of a [`DynamicTreeComponent`].
pub enum Child {
    /// Rendered, but ignored when deciding whether the tree is done.
    Static(Box<dyn Renderer>),
    /// The tree is not done until this child is.
    Dynamic(Arc<dyn DynamicRenderer>),
}

impl Child {
    fn renderer(&self) -> &dyn Renderer {
        match self {
            Self::Static(r) => &**r,
            Self::Dynamic(r) => r,
        }
    }
}

/// A tree whose root, and possibly some children, keep changing.
pub struct DynamicTreeComponent {
    root: Arc<dyn DynamicRenderer>,
    children: Vec<Child>,
    done: DoneSignal,
}

impl DynamicTreeComponent {
    /// Done once the root and every dynamic child are done.
    #[must_use]
    pub fn new(root: Arc<dyn DynamicRenderer>, children: Vec<Child>) -> Self {
        let mut inputs = vec![root.done()];
        inputs.extend(children.iter().filter_map(|c| match c {
            Child::Dynamic(r) => Some(r.done()),
            Child::Static(_) => None,
        }));
        let done = fan_in("tree", inputs);
        Self { root, children, done }
    }
}

impl Renderer for DynamicTreeComponent {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        render_tree(out, &self.root, self.children.iter().map(Child::renderer))
    }
}

impl DynamicRenderer for DynamicTreeComponent {
    fn done(&self) -> Receiver<()> {
        self.done.receiver()
    }
}

fn render_tree<'a>(
    out: &mut dyn Write,
    root: &dyn Renderer,
    children: impl Iterator<Item = &'a dyn Renderer>,
) -> Result<usize, ProgressError> {
    let mut buf = Vec::new();
    let mut total = root.render(&mut buf)?;
    for child in children {
        total += child.render(&mut buf)?;
    }
    columns::write_aligned(out, &String::from_utf8_lossy(&buf))?;
    Ok(total)
}
