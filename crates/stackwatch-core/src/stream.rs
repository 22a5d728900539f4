//! Subscription interfaces for event streams, and an in-memory firehose.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::debug;

use crate::events::{ServiceSnapshot, StackEvent, StackSetOpEvent};

/// Source of stack resource events.
pub trait StackSubscriber: Send + Sync {
    /// A new channel receiving every stack event from now on.
    ///
    /// The channel closes once the stream ends.
    fn subscribe(&self) -> Receiver<StackEvent>;
}

/// Source of service snapshots during a rolling update.
pub trait ServiceSubscriber: Send + Sync {
    fn subscribe(&self) -> Receiver<ServiceSnapshot>;
}

/// Source of stack-set operation events.
pub trait StackSetSubscriber: Send + Sync {
    fn subscribe(&self) -> Receiver<StackSetOpEvent>;
}

/// Fans every published event out to all subscribers.
///
/// Closing the fanout drops every sender, so subscribers observe the end of
/// the stream; subscribing after close yields an already-closed channel.
pub struct Fanout<T> {
    subscribers: RwLock<Option<Vec<Sender<T>>>>,
}

impl<T: Clone + Send> Fanout<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Some(Vec::new())),
        }
    }

    /// Register a new subscriber.
    pub fn add_subscriber(&self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        if let Some(subscribers) = self.subscribers.write().as_mut() {
            subscribers.push(tx);
        }
        rx
    }

    /// Send an event to every live subscriber.
    ///
    /// Subscribers whose receiver was dropped are forgotten.
    pub fn publish(&self, event: &T) {
        let mut guard = self.subscribers.write();
        let Some(subscribers) = guard.as_mut() else {
            return;
        };
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        if subscribers.len() < before {
            debug!(dropped = before - subscribers.len(), "pruned closed subscribers");
        }
    }

    /// End the stream for every subscriber.
    pub fn close(&self) {
        if let Some(subscribers) = self.subscribers.write().take() {
            debug!(subscribers = subscribers.len(), "closing event stream");
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.subscribers.read().is_none()
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.subscribers.read().as_ref().map_or(0, Vec::len)
    }
}

impl<T: Clone + Send> Default for Fanout<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl StackSubscriber for Fanout<StackEvent> {
    fn subscribe(&self) -> Receiver<StackEvent> {
        self.add_subscriber()
    }
}

impl ServiceSubscriber for Fanout<ServiceSnapshot> {
    fn subscribe(&self) -> Receiver<ServiceSnapshot> {
        self.add_subscriber()
    }
}

impl StackSetSubscriber for Fanout<StackSetOpEvent> {
    fn subscribe(&self) -> Receiver<StackSetOpEvent> {
        self.add_subscriber()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_every_subscriber() {
        let fanout = Fanout::<StackEvent>::new();
        let a = fanout.subscribe();
        let b = fanout.subscribe();
        assert_eq!(fanout.count(), 2);

        fanout.publish(&StackEvent::new("ALB", "CREATE_IN_PROGRESS"));
        assert_eq!(a.recv().unwrap().logical_id, "ALB");
        assert_eq!(b.recv().unwrap().logical_id, "ALB");
    }

    #[test]
    fn close_ends_streams() {
        let fanout = Fanout::<StackEvent>::new();
        let rx = fanout.subscribe();
        fanout.publish(&StackEvent::new("Role", "CREATE_COMPLETE"));
        fanout.close();
        assert!(fanout.is_closed());
        assert!(rx.recv().is_ok());
        assert!(rx.recv().is_err());
    }

    #[test]
    fn subscribe_after_close_is_closed() {
        let fanout = Fanout::<ServiceSnapshot>::new();
        fanout.close();
        let rx = fanout.subscribe();
        assert!(rx.recv().is_err());
        assert_eq!(fanout.count(), 0);
    }

    #[test]
    fn dropped_subscriber_does_not_block_others() {
        let fanout = Fanout::<StackEvent>::new();
        drop(fanout.subscribe());
        let live = fanout.subscribe();
        fanout.publish(&StackEvent::new("ALB", "CREATE_IN_PROGRESS"));
        assert!(live.recv().is_ok());
    }

    #[test]
    fn publish_forgets_dropped_subscribers() {
        let fanout = Fanout::<StackEvent>::new();
        drop(fanout.subscribe());
        drop(fanout.subscribe());
        let live = fanout.subscribe();
        assert_eq!(fanout.count(), 3);

        fanout.publish(&StackEvent::new("ALB", "CREATE_IN_PROGRESS"));
        assert_eq!(fanout.count(), 1);
        assert_eq!(live.recv().unwrap().logical_id, "ALB");
    }
}
