//! Per-run publish/subscribe bus for progress events.

use super::{ChannelSink, ProgressSink};
use crate::core::ProgressEvent;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handle returned by [`ProgressNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// In-memory fan-out of progress events.
///
/// One notifier is constructed per pipeline run and passed into it, so events
/// never leak between concurrent runs. Fan-out is synchronous and unbuffered:
/// a subscriber added after an event was published never sees that event.
#[derive(Default)]
pub struct ProgressNotifier {
    subscribers: RwLock<Vec<(SubscriptionId, Arc<dyn ProgressSink>)>>,
    next_id: AtomicU64,
}

impl fmt::Debug for ProgressNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl ProgressNotifier {
    /// Creates a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier with one initial subscriber.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn ProgressSink>) -> Self {
        let notifier = Self::new();
        notifier.subscribe(sink);
        notifier
    }

    /// Registers a sink and returns its handle.
    pub fn subscribe(&self, sink: Arc<dyn ProgressSink>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, sink));
        id
    }

    /// Registers a channel-backed subscriber and returns its receiver.
    pub fn subscribe_channel(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sink, rx) = ChannelSink::channel();
        (self.subscribe(Arc::new(sink)), rx)
    }

    /// Removes a subscriber. Returns false if the handle was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Delivers an event to every current subscriber.
    ///
    /// The subscriber list is snapshotted first so sinks may subscribe or
    /// unsubscribe from inside `try_emit` without deadlocking.
    pub fn publish(&self, event: &ProgressEvent) {
        let snapshot: Vec<Arc<dyn ProgressSink>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, sink)| Arc::clone(sink))
            .collect();

        for sink in snapshot {
            sink.try_emit(event);
        }
    }

    /// Returns the number of current subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageName;
    use crate::events::CollectingSink;

    #[test]
    fn test_fan_out_to_all_subscribers() {
        let notifier = ProgressNotifier::new();
        let first = Arc::new(CollectingSink::new());
        let second = Arc::new(CollectingSink::new());
        notifier.subscribe(first.clone());
        notifier.subscribe(second.clone());

        notifier.publish(&ProgressEvent::active(StageName::Research));

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let notifier = ProgressNotifier::new();
        notifier.publish(&ProgressEvent::active(StageName::Research));

        let late = Arc::new(CollectingSink::new());
        notifier.subscribe(late.clone());
        assert!(late.is_empty());

        notifier.publish(&ProgressEvent::active(StageName::Writer));
        assert_eq!(late.events()[0].agent, StageName::Writer);
    }

    #[test]
    fn test_unsubscribe() {
        let notifier = ProgressNotifier::new();
        let sink = Arc::new(CollectingSink::new());
        let id = notifier.subscribe(sink.clone());

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        assert_eq!(notifier.subscriber_count(), 0);

        notifier.publish(&ProgressEvent::active(StageName::Research));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let notifier = ProgressNotifier::new();
        let a = notifier.subscribe(Arc::new(CollectingSink::new()));
        let b = notifier.subscribe(Arc::new(CollectingSink::new()));
        assert_ne!(a, b);
    }

    struct SelfRemovingSink {
        notifier: Arc<ProgressNotifier>,
        id: parking_lot::Mutex<Option<SubscriptionId>>,
        seen: AtomicU64,
    }

    impl ProgressSink for SelfRemovingSink {
        fn try_emit(&self, _event: &ProgressEvent) {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = self.id.lock().take() {
                self.notifier.unsubscribe(id);
            }
        }
    }

    #[test]
    fn test_unsubscribe_during_publish() {
        let notifier = Arc::new(ProgressNotifier::new());
        let sink = Arc::new(SelfRemovingSink {
            notifier: notifier.clone(),
            id: parking_lot::Mutex::new(None),
            seen: AtomicU64::new(0),
        });
        let id = notifier.subscribe(sink.clone());
        *sink.id.lock() = Some(id);

        notifier.publish(&ProgressEvent::active(StageName::Research));
        notifier.publish(&ProgressEvent::active(StageName::Writer));

        assert_eq!(sink.seen.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_subscribe_and_publish() {
        let notifier = Arc::new(ProgressNotifier::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let notifier = notifier.clone();
            handles.push(tokio::spawn(async move {
                let (id, mut rx) = notifier.subscribe_channel();
                notifier.publish(&ProgressEvent::active(StageName::Editor));
                let received = rx.recv().await;
                notifier.unsubscribe(id);
                received.is_some()
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(notifier.subscriber_count(), 0);
    }
}
