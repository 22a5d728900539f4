//! The custom resource that creates or updates an environment stack.

use std::io::Write;
use std::thread;

use crossbeam_channel::Receiver;
use tracing::info;

use stackwatch_core::signal::{wait_closed, DoneSignal};
use stackwatch_core::ProgressError;

use crate::renderer::{DynamicRenderer, Renderer};
use crate::resource::ResourceComponent;
use crate::stack::StackComponent;

/// Shows the triggering action until the environment stack reports its
/// first event, then shows the whole stack.
///
/// If the action finishes without the stack ever reporting an event, the
/// stack is assumed unchanged and `cancel` is invoked to stop its stream.
#[derive(Clone)]
pub struct EnvControllerComponent {
    action: ResourceComponent,
    stack: StackComponent,
    done: DoneSignal,
}

impl EnvControllerComponent {
    pub fn new<F>(action: ResourceComponent, stack: StackComponent, cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let done = DoneSignal::new();

        let (action_done, watched, closer) = (action.done(), stack.clone(), done.clone());
        thread::spawn(move || {
            wait_closed(&action_done);
            if !watched.has_events() {
                info!("environment stack has no updates, stopping its stream");
                cancel();
            }
            wait_closed(&watched.done());
            closer.close();
        });

        Self { action, stack, done }
    }
}

impl Renderer for EnvControllerComponent {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        if self.stack.has_events() {
            self.stack.render(out)
        } else {
            self.action.render(out)
        }
    }
}

impl DynamicRenderer for EnvControllerComponent {
    fn done(&self) -> Receiver<()> {
        self.done.receiver()
    }
}
