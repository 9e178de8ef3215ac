//! Progress notification for live clients.
//!
//! A [`ProgressNotifier`] is created per pipeline run and fans events out to
//! [`ProgressSink`] subscribers: WebSocket sessions ([`ChannelSink`]),
//! accumulated logs for synchronous responses ([`CollectingSink`]) or the
//! tracing log ([`LoggingSink`]).

mod notifier;
mod sink;

pub use notifier::{ProgressNotifier, SubscriptionId};
pub use sink::{ChannelSink, CollectingSink, LoggingSink, NoOpSink, ProgressSink};
