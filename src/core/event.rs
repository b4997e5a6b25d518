//! Typed multicast event channels.
//!
//! Replaces signal/slot sockets with explicit typed channels. Each channel
//! keeps one `crossbeam_channel` pair
//! per subscriber so a slow or absent subscriber can never block a sender,
//! and subscribers may install a filter predicate to ignore events they
//! don't care about without paying allocation cost for the ignored payload.

use crossbeam_channel::{Receiver, Sender};
use uuid::Uuid;

/// `resource_loaded(uuid)` — a resource's payload finished loading and, for
/// graphics resources, post-construction has run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceLoaded(pub Uuid);

/// `resource_load_failed(uuid, error)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLoadFailed {
    /// The resource that failed to load.
    pub uuid: Uuid,
    /// Human-readable failure reason.
    pub reason: String,
}

/// `selected_scene_object_changed(id)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectedSceneObjectChanged(pub Option<u32>);

/// `font_face_cleared(id)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontFaceCleared(pub u32);

/// A multicast channel of events of type `E`.
///
/// `publish` fans an event out to every live subscriber. A subscriber that
/// has dropped its [`EventSubscription`] is pruned lazily on the next
/// publish.
pub struct EventChannel<E: Clone> {
    subscribers: Vec<Sender<E>>,
}

impl<E: Clone> EventChannel<E> {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Registers a new subscriber and returns its receiving end.
    ///
    /// `filter` is applied by the subscriber when draining, not here, so
    /// that publishing itself never depends on subscriber-specific logic.
    pub fn subscribe(&mut self) -> EventSubscription<E> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        EventSubscription { receiver: rx }
    }

    /// Sends `event` to every subscriber whose receiver is still alive.
    pub fn publish(&mut self, event: E) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of currently live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: Clone> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscriber's receiving end of an [`EventChannel`].
pub struct EventSubscription<E> {
    receiver: Receiver<E>,
}

impl<E> EventSubscription<E> {
    /// Drains every event currently pending for this subscriber, keeping
    /// only those for which `filter` returns `true`.
    pub fn drain_filtered(&self, mut filter: impl FnMut(&E) -> bool) -> Vec<E> {
        self.receiver.try_iter().filter(|e| filter(e)).collect()
    }

    /// Drains every event currently pending for this subscriber.
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_all_subscribers() {
        let mut channel: EventChannel<ResourceLoaded> = EventChannel::new();
        let a = channel.subscribe();
        let b = channel.subscribe();

        let uuid = Uuid::new_v4();
        channel.publish(ResourceLoaded(uuid));

        assert_eq!(a.drain(), vec![ResourceLoaded(uuid)]);
        assert_eq!(b.drain(), vec![ResourceLoaded(uuid)]);
    }

    #[test]
    fn dropped_subscriber_is_pruned_on_next_publish() {
        let mut channel: EventChannel<FontFaceCleared> = EventChannel::new();
        {
            let _sub = channel.subscribe();
            assert_eq!(channel.subscriber_count(), 1);
        }
        channel.publish(FontFaceCleared(0));
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn filter_drops_unwanted_events() {
        let mut channel: EventChannel<SelectedSceneObjectChanged> = EventChannel::new();
        let sub = channel.subscribe();
        channel.publish(SelectedSceneObjectChanged(Some(1)));
        channel.publish(SelectedSceneObjectChanged(None));
        channel.publish(SelectedSceneObjectChanged(Some(2)));

        let only_selections = sub.drain_filtered(|e| e.0.is_some());
        assert_eq!(
            only_selections,
            vec![
                SelectedSceneObjectChanged(Some(1)),
                SelectedSceneObjectChanged(Some(2)),
            ]
        );
    }
}
