//! Outbound notifications and the per-participant sinks that carry them.

use crate::controller::SessionSnapshot;
use crate::games::eriantys::{PromptKind, Termination};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Something the controller tells a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Notification {
    /// The participant is expected to submit an action of this kind.
    Prompt(PromptKind),
    /// A fresh view of the whole session.
    State(Box<SessionSnapshot>),
    /// Human-readable text (rejection causes, other players' moves).
    Message(String),
    /// The session terminated.
    GameOver(Termination),
}

/// Delivery endpoint for one participant.
///
/// Delivery is fire-and-forget: a failing sink never rolls back a
/// committed transition.
pub trait NotificationSink: Send + std::fmt::Debug {
    /// Hands a notification to the transport.
    fn deliver(&self, notification: Notification);
}

/// Sink forwarding notifications into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the transport reads from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn deliver(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            debug!(notification = ?e.0, "Receiver dropped, notification discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards() {
        let (sink, mut rx) = ChannelSink::new();
        sink.deliver(Notification::Prompt(PromptKind::Avatar));
        assert_eq!(rx.try_recv().unwrap(), Notification::Prompt(PromptKind::Avatar));
    }

    #[test]
    fn test_dropped_receiver_is_not_an_error() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.deliver(Notification::Message("lost".into()));
    }
}
