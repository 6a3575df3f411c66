//! Events published to viewers.
//!
//! Delivery is fire-and-forget: a sink must never block the polling thread,
//! and a notification that cannot be delivered is dropped.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use log::{debug, warn};
use reedchess_core::Coordinate;
use serde::Serialize;

use crate::{BoardState, Destination, GameOutcome, squares::square_name};

/// A change viewers should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    /// A move was committed or the game was reset.
    BoardChanged(BoardState),
    /// The legal destinations of a lifted piece, or a request to clear them.
    Highlight(HighlightEvent),
    /// The rook relocation after castling was completed.
    Resynchronized,
    /// The game ended and polling stopped.
    GameOver {
        /// How the game ended.
        outcome: GameOutcome,
    },
}

/// Squares to light up for a lifted piece.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightEvent {
    /// The lifted piece's square, or `None` when clearing.
    pub origin_square: Option<String>,
    /// Every legal destination.
    pub destinations: Vec<String>,
    /// The destinations that capture, a subset of `destinations`.
    pub capture_destinations: Vec<String>,
}

impl HighlightEvent {
    /// Creates a highlight for the piece lifted from `origin`.
    #[must_use]
    pub fn new(origin: Coordinate, destinations: &[Destination]) -> Self {
        Self {
            origin_square: Some(square_name(origin)),
            destinations: destinations.iter().map(|d| square_name(d.square)).collect(),
            capture_destinations: destinations
                .iter()
                .filter(|d| d.capture)
                .map(|d| square_name(d.square))
                .collect(),
        }
    }

    /// Creates the event that turns every highlight off.
    #[must_use]
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Returns whether this event clears the highlights.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.origin_square.is_none()
    }
}

/// Receives notifications from the reconciler.
pub trait NotificationSink {
    /// Delivers `notification` without blocking.
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

impl<S> NotificationSink for &mut S
where
    S: NotificationSink + ?Sized,
{
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// A sink that forwards notifications over a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: SyncSender<Notification>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that drains it.
    ///
    /// At most `capacity` undelivered notifications are queued.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<Notification>) {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&mut self, notification: Notification) {
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(notification)) => {
                warn!("notification queue is full, dropping {notification:?}");
            }
            Err(TrySendError::Disconnected(notification)) => {
                debug!("no receiver, dropping {notification:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Side;

    #[test]
    fn test_highlight_event() {
        let e4 = Coordinate::new(4, 4);
        let event = HighlightEvent::new(
            e4,
            &[
                Destination {
                    square: Coordinate::new(3, 3),
                    capture: true,
                },
                Destination {
                    square: Coordinate::new(4, 3),
                    capture: false,
                },
            ],
        );
        assert_eq!(event.origin_square.as_deref(), Some("e4"));
        assert_eq!(event.destinations, ["d5", "e5"]);
        assert_eq!(event.capture_destinations, ["d5"]);
        assert!(!event.is_cleared());
        assert!(HighlightEvent::cleared().is_cleared());
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (mut sink, receiver) = ChannelSink::bounded(1);
        sink.notify(Notification::Resynchronized);
        sink.notify(Notification::Highlight(HighlightEvent::cleared()));
        assert_eq!(receiver.try_recv(), Ok(Notification::Resynchronized));
        assert!(receiver.try_recv().is_err());

        drop(receiver);
        sink.notify(Notification::Resynchronized);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Notification::Highlight(HighlightEvent::cleared())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "highlight",
                "originSquare": null,
                "destinations": [],
                "captureDestinations": []
            })
        );

        let json = serde_json::to_value(Notification::GameOver {
            outcome: GameOutcome::Decisive {
                winner: Side::Black,
            },
        })
        .unwrap();
        assert_eq!(json["type"], "gameOver");
        assert_eq!(json["outcome"]["winner"], "black");

        let json = serde_json::to_value(Notification::Resynchronized).unwrap();
        assert_eq!(json, serde_json::json!({"type": "resynchronized"}));
    }
}
