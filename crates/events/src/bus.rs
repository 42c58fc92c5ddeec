//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! A [`TrackingSession`](homepro_core::session::TrackingSession) delivers
//! events to synchronous observers. [`TrackingBus::forwarder`] builds such
//! an observer that republishes every event as a [`TrackingNotification`],
//! so any number of async consumers (screens, loggers, the review flow)
//! can follow a job without holding the session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use homepro_core::clock::Clock;
use homepro_core::session::TrackingEvent;
use homepro_core::types::JobId;

// ---------------------------------------------------------------------------
// TrackingNotification
// ---------------------------------------------------------------------------

/// A session event tagged with the job it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingNotification {
    pub job_id: JobId,

    #[serde(flatten)]
    pub event: TrackingEvent,

    /// When the event was published (UTC).
    pub timestamp: DateTime<Utc>,
}

impl TrackingNotification {
    pub fn new(job_id: JobId, event: TrackingEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            job_id,
            event,
            timestamp,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.event, TrackingEvent::Completed)
    }
}

// ---------------------------------------------------------------------------
// TrackingBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out bus for tracking notifications.
///
/// Cloning is cheap and every clone publishes into the same channel.
///
/// # Usage
///
/// ```rust
/// use homepro_core::session::TrackingEvent;
/// use homepro_events::bus::{TrackingBus, TrackingNotification};
///
/// let bus = TrackingBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(TrackingNotification::new(
///     uuid::Uuid::nil(),
///     TrackingEvent::Completed,
///     chrono::Utc::now(),
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct TrackingBus {
    sender: broadcast::Sender<TrackingNotification>,
}

impl TrackingBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification to all current subscribers.
    ///
    /// Returns how many subscribers it reached; zero subscribers is not
    /// an error.
    pub fn publish(&self, notification: TrackingNotification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackingNotification> {
        self.sender.subscribe()
    }

    /// Session observer that republishes events for `job_id` on this bus,
    /// stamped with `clock`.
    pub fn forwarder(
        &self,
        job_id: JobId,
        clock: Arc<dyn Clock>,
    ) -> impl FnMut(&TrackingEvent) + Send + 'static {
        let bus = self.clone();
        move |event: &TrackingEvent| {
            let reached = bus.publish(TrackingNotification::new(job_id, event.clone(), clock.now()));
            tracing::trace!(job_id = %job_id, reached, "Tracking notification published");
        }
    }
}

impl Default for TrackingBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
