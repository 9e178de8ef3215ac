//! Progress sink trait and implementations.

use crate::core::ProgressEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, Level};

/// Trait for subscribers that receive progress events.
///
/// Delivery happens synchronously inside [`ProgressNotifier::publish`](super::ProgressNotifier::publish),
/// so implementations must not block. Delivery failures are swallowed.
pub trait ProgressSink: Send + Sync {
    /// Delivers an event.
    fn try_emit(&self, event: &ProgressEvent);
}

/// A no-op sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ProgressSink for NoOpSink {
    fn try_emit(&self, _event: &ProgressEvent) {}
}

/// A sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingSink {
    level: Level,
}

impl Default for LoggingSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingSink {
    /// Creates a new logging sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl ProgressSink for LoggingSink {
    fn try_emit(&self, event: &ProgressEvent) {
        if self.level == Level::DEBUG {
            debug!(
                agent = %event.agent,
                status = %event.status,
                message = event.message.as_deref().unwrap_or(""),
                "Progress event"
            );
        } else {
            info!(
                agent = %event.agent,
                status = %event.status,
                message = event.message.as_deref().unwrap_or(""),
                "Progress event"
            );
        }
    }
}

/// A sink that accumulates events in memory.
///
/// Used by synchronous transports to return the progress log with the result.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: parking_lot::RwLock<Vec<ProgressEvent>>,
}

impl CollectingSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Removes and returns all collected events.
    pub fn take(&self) -> Vec<ProgressEvent> {
        std::mem::take(&mut *self.events.write())
    }
}

impl ProgressSink for CollectingSink {
    fn try_emit(&self, event: &ProgressEvent) {
        self.events.write().push(event.clone());
    }
}

/// A sink that forwards events into an unbounded tokio channel.
///
/// A closed receiver is not an error; the event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    /// Creates a sink writing to `tx`.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }

    /// Creates a sink and the receiving half of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ProgressSink for ChannelSink {
    fn try_emit(&self, event: &ProgressEvent) {
        if self.tx.send(event.clone()).is_err() {
            debug!(agent = %event.agent, "Progress receiver dropped; discarding event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProgressStatus, StageName};

    #[test]
    fn test_noop_and_logging_sinks() {
        let event = ProgressEvent::active(StageName::Research);
        NoOpSink.try_emit(&event);
        LoggingSink::default().try_emit(&event);
        LoggingSink::debug().try_emit(&event);
        // Should not panic
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.try_emit(&ProgressEvent::active(StageName::Research));
        sink.try_emit(&ProgressEvent::completed(StageName::Research, "notes"));
        assert_eq!(sink.len(), 2);

        let events = sink.take();
        assert_eq!(events[0].status, ProgressStatus::Active);
        assert_eq!(events[1].status, ProgressStatus::Completed);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_channel_sink() {
        let (sink, mut rx) = ChannelSink::channel();
        sink.try_emit(&ProgressEvent::active(StageName::Editor));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.agent, StageName::Editor);

        drop(rx);
        sink.try_emit(&ProgressEvent::active(StageName::Seo));
    }
}
