//! Per-job tracking session.
//!
//! A [`TrackingSession`] composes the [`StatusTimeline`] and the position
//! interpolator into one simulation. It owns no timers: whoever drives it
//! calls [`TrackingSession::tick`] with the current time, and the session
//! notifies its observers of every status change and position update.
//!
//! Once the job completes, or the session is cancelled, the session is
//! inert. Later ticks are silently ignored.

use serde::{Deserialize, Serialize};

use crate::booking::TrackingSeed;
use crate::clock::{elapsed_between, Clock};
use crate::error::CoreError;
use crate::geo::{self, Coordinates};
use crate::job_status::JobStatus;
use crate::settings::SimulationSettings;
use crate::timeline::StatusTimeline;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Notification delivered to session observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TrackingEvent {
    StatusChanged { status: JobStatus },
    PositionUpdated { position: Coordinates },
    /// Emitted once, after the `StatusChanged` into `Completed`.
    Completed,
}

/// Handle returned by [`TrackingSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&TrackingEvent) + Send>;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Whether the session still accepts ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Active,
    Completed,
    Cancelled,
}

/// Point-in-time copy of a session, safe to hand to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub job_id: JobId,
    pub status: JobStatus,
    pub phase: SessionPhase,
    pub started_at: Timestamp,
    pub provider_position: Coordinates,
    pub destination: Coordinates,
    pub eta_label: String,
}

// ---------------------------------------------------------------------------
// TrackingSession
// ---------------------------------------------------------------------------

pub struct TrackingSession {
    job_id: JobId,
    started_at: Timestamp,
    destination: Coordinates,
    eta_label: String,
    status: JobStatus,
    provider_position: Coordinates,
    phase: SessionPhase,
    timeline: StatusTimeline,
    damping: f64,
    arrival_epsilon: f64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl TrackingSession {
    /// Create a session that started at `started_at`.
    ///
    /// Fails with [`CoreError::Configuration`] when the settings or the
    /// seed coordinates are invalid.
    pub fn new(
        job_id: JobId,
        seed: &TrackingSeed,
        settings: &SimulationSettings,
        started_at: Timestamp,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let destination = seed.destination.validate("destination")?;
        let start_offset = seed.start_offset.validate("start offset")?;

        tracing::debug!(
            job_id = %job_id,
            lat = destination.lat,
            lng = destination.lng,
            "Tracking session created"
        );

        Ok(Self {
            job_id,
            started_at,
            destination,
            eta_label: seed.provider.eta_label().to_string(),
            status: settings.timeline.initial_status(),
            provider_position: destination.offset_by(start_offset),
            phase: SessionPhase::Active,
            timeline: settings.timeline.clone(),
            damping: settings.damping,
            arrival_epsilon: settings.arrival_epsilon,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Create a session starting now according to `clock`.
    pub fn start(
        job_id: JobId,
        seed: &TrackingSeed,
        settings: &SimulationSettings,
        clock: &dyn Clock,
    ) -> Result<Self, CoreError> {
        Self::new(job_id, seed, settings, clock.now())
    }

    /// Advance the simulation to `now`.
    ///
    /// When a coarse tick crosses several timeline entries, every
    /// intermediate status is emitted in order. The provider moves one
    /// interpolation step per tick, and only while `OnTheWay`.
    pub fn tick(&mut self, now: Timestamp) {
        if self.phase != SessionPhase::Active {
            return;
        }

        let target = self.timeline.status_at(elapsed_between(self.started_at, now));

        while self.status < target {
            let Some(next) = self.status.next() else {
                break;
            };
            self.status = next;
            tracing::debug!(job_id = %self.job_id, status = %next, "Tracking status advanced");
            self.emit(&TrackingEvent::StatusChanged { status: next });
        }

        if self.status == JobStatus::OnTheWay {
            let next = geo::step(
                self.provider_position,
                self.destination,
                self.damping,
                self.arrival_epsilon,
            );
            if next != self.provider_position {
                self.provider_position = next;
                self.emit(&TrackingEvent::PositionUpdated { position: next });
            }
        }

        if self.status.is_terminal() {
            self.emit(&TrackingEvent::Completed);
            self.close(SessionPhase::Completed);
        }
    }

    /// Register an observer for every subsequent event.
    ///
    /// Observers added to an inert session are dropped immediately since
    /// nothing will ever be delivered to them.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&TrackingEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        if self.phase == SessionPhase::Active {
            self.observers.push((id, Box::new(observer)));
        }
        id
    }

    /// Stop delivery to one observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Stop the simulation. Idempotent; later ticks are no-ops.
    pub fn cancel(&mut self) {
        if self.phase == SessionPhase::Active {
            self.close(SessionPhase::Cancelled);
        }
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            job_id: self.job_id,
            status: self.status,
            phase: self.phase,
            started_at: self.started_at,
            provider_position: self.provider_position,
            destination: self.destination,
            eta_label: self.eta_label.clone(),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn provider_position(&self) -> Coordinates {
        self.provider_position
    }

    pub fn destination(&self) -> Coordinates {
        self.destination
    }

    pub fn eta_label(&self) -> &str {
        &self.eta_label
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.phase == SessionPhase::Cancelled
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn emit(&mut self, event: &TrackingEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
    }

    fn close(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.observers.clear();
        tracing::info!(job_id = %self.job_id, phase = ?phase, status = %self.status, "Tracking session closed");
    }
}

impl std::fmt::Debug for TrackingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingSession")
            .field("job_id", &self.job_id)
            .field("status", &self.status)
            .field("phase", &self.phase)
            .field("provider_position", &self.provider_position)
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::booking::ProviderProfile;
    use crate::clock::ManualClock;
    use crate::geo::{has_arrived, DEFAULT_DESTINATION, DEFAULT_START_OFFSET};
    use crate::timeline::StatusTimeline;

    fn seed() -> TrackingSeed {
        TrackingSeed {
            provider: ProviderProfile::new("Chinedu Eze").with_eta("12 min"),
            destination: DEFAULT_DESTINATION,
            start_offset: DEFAULT_START_OFFSET,
            service_name: "Laptop Repair".to_string(),
            price: Some(25_000),
        }
    }

    fn session_at(start: Timestamp) -> TrackingSession {
        TrackingSession::new(
            uuid::Uuid::new_v4(),
            &seed(),
            &SimulationSettings::default(),
            start,
        )
        .unwrap()
    }

    fn recorder(session: &mut TrackingSession) -> Arc<Mutex<Vec<TrackingEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    fn at(start: Timestamp, secs: i64) -> Timestamp {
        start + chrono::Duration::seconds(secs)
    }

    #[test]
    fn starts_confirmed_at_offset_position() {
        let start = Utc::now();
        let session = session_at(start);

        assert_eq!(session.status(), JobStatus::Confirmed);
        assert_eq!(session.started_at(), start);
        assert_eq!(session.eta_label(), "12 min");
        assert_eq!(
            session.provider_position(),
            DEFAULT_DESTINATION.offset_by(DEFAULT_START_OFFSET)
        );
        assert!(session.is_active());
    }

    #[test]
    fn start_reads_injected_clock() {
        let clock = ManualClock::default();
        let session = TrackingSession::start(
            uuid::Uuid::new_v4(),
            &seed(),
            &SimulationSettings::default(),
            &clock,
        )
        .unwrap();
        assert_eq!(session.started_at(), clock.now());
    }

    #[test]
    fn two_second_ticks_follow_default_schedule() {
        let start = Utc::now();
        let mut session = session_at(start);
        let events = recorder(&mut session);

        let mut observed = Vec::new();
        for t in (0..=16).step_by(2) {
            session.tick(at(start, t));
            observed.push(session.status());
        }

        assert_eq!(
            observed,
            vec![
                JobStatus::Confirmed,
                JobStatus::Confirmed,
                JobStatus::OnTheWay,
                JobStatus::OnTheWay,
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::Completed,
            ]
        );

        let events = events.lock().unwrap();
        let completions = events
            .iter()
            .filter(|e| matches!(e, TrackingEvent::Completed))
            .count();
        assert_eq!(completions, 1);

        let statuses: Vec<JobStatus> = events
            .iter()
            .filter_map(|e| match e {
                TrackingEvent::StatusChanged { status } => Some(*status),
                _ => None,
            })
            .collect();
        assert_eq!(
            statuses,
            vec![JobStatus::OnTheWay, JobStatus::InProgress, JobStatus::Completed]
        );

        // Moved at t=4 and t=6 only.
        let moves = events
            .iter()
            .filter(|e| matches!(e, TrackingEvent::PositionUpdated { .. }))
            .count();
        assert_eq!(moves, 2);
        assert_eq!(events.last(), Some(&TrackingEvent::Completed));
        assert!(session.is_completed());
    }

    #[test]
    fn coarse_tick_walks_every_intermediate_status() {
        let start = Utc::now();
        let mut session = session_at(start);
        let events = recorder(&mut session);
        let initial = session.provider_position();

        session.tick(at(start, 100));

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                TrackingEvent::StatusChanged { status: JobStatus::OnTheWay },
                TrackingEvent::StatusChanged { status: JobStatus::InProgress },
                TrackingEvent::StatusChanged { status: JobStatus::Completed },
                TrackingEvent::Completed,
            ]
        );
        assert_eq!(session.provider_position(), initial);
    }

    #[test]
    fn status_changes_never_regress() {
        let start = Utc::now();
        let mut session = session_at(start);
        let events = recorder(&mut session);

        // Out-of-order and repeated times must not move status backwards.
        for t in [0, 5, 2, 9, 1, 9, 20] {
            session.tick(at(start, t));
        }

        let statuses: Vec<JobStatus> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                TrackingEvent::StatusChanged { status } => Some(*status),
                _ => None,
            })
            .collect();
        assert!(statuses.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(statuses.last(), Some(&JobStatus::Completed));
    }

    #[test]
    fn position_frozen_outside_on_the_way() {
        let start = Utc::now();
        let mut session = session_at(start);
        let initial = session.provider_position();

        session.tick(at(start, 1));
        session.tick(at(start, 2));
        assert_eq!(session.provider_position(), initial);

        session.tick(at(start, 3));
        let moved = session.provider_position();
        assert_ne!(moved, initial);

        session.tick(at(start, 9));
        session.tick(at(start, 10));
        assert_eq!(session.status(), JobStatus::InProgress);
        assert_eq!(session.provider_position(), moved);
    }

    #[test]
    fn position_converges_during_long_trip() {
        let timeline = StatusTimeline::from_delays(
            Duration::from_secs(1),
            Duration::from_secs(10_000),
            Duration::from_secs(20_000),
        )
        .unwrap();
        let settings = SimulationSettings::new(timeline, 0.08, 0.001).unwrap();
        let clock = ManualClock::default();
        let mut session =
            TrackingSession::start(uuid::Uuid::new_v4(), &seed(), &settings, &clock).unwrap();

        for _ in 0..41 {
            clock.advance(Duration::from_secs(1));
            session.tick(clock.now());
        }

        assert_eq!(session.status(), JobStatus::OnTheWay);
        assert!(has_arrived(session.provider_position(), DEFAULT_DESTINATION, 0.001));
        assert!((session.provider_position().lat - DEFAULT_DESTINATION.lat).abs() < 0.001);
    }

    #[test]
    fn tick_before_start_counts_as_zero_elapsed() {
        let start = Utc::now();
        let mut session = session_at(start);
        let events = recorder(&mut session);
        let initial = session.provider_position();

        session.tick(at(start, -30));

        assert_eq!(session.status(), JobStatus::Confirmed);
        assert_eq!(session.provider_position(), initial);
        assert!(session.is_active());
        assert!(events.lock().unwrap().is_empty());

        session.tick(at(start, 4));
        assert_eq!(session.status(), JobStatus::OnTheWay);
        assert_eq!(
            events.lock().unwrap()[0],
            TrackingEvent::StatusChanged {
                status: JobStatus::OnTheWay
            }
        );
    }

    #[test]
    fn cancel_silences_later_ticks() {
        let start = Utc::now();
        let mut session = session_at(start);
        let events = recorder(&mut session);

        session.cancel();
        session.tick(at(start, 100));

        assert!(events.lock().unwrap().is_empty());
        assert!(session.is_cancelled());
        assert_eq!(session.status(), JobStatus::Confirmed);
    }

    #[test]
    fn cancel_is_idempotent_and_does_not_override_completion() {
        let start = Utc::now();
        let mut session = session_at(start);

        session.cancel();
        session.cancel();
        assert!(session.is_cancelled());

        let mut finished = session_at(start);
        finished.tick(at(start, 15));
        finished.cancel();
        assert!(finished.is_completed());
    }

    #[test]
    fn ticks_after_completion_emit_nothing() {
        let start = Utc::now();
        let mut session = session_at(start);
        let events = recorder(&mut session);

        session.tick(at(start, 15));
        let delivered = events.lock().unwrap().len();
        session.tick(at(start, 30));
        session.tick(at(start, 60));

        assert_eq!(events.lock().unwrap().len(), delivered);
        assert_eq!(session.observer_count(), 0);
    }

    #[test]
    fn unsubscribe_only_affects_that_observer() {
        let start = Utc::now();
        let mut session = session_at(start);
        let kept = recorder(&mut session);

        let dropped = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&dropped);
        let id = session.subscribe(move |event: &TrackingEvent| sink.lock().unwrap().push(event.clone()));

        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));

        session.tick(at(start, 4));

        assert!(dropped.lock().unwrap().is_empty());
        assert!(!kept.lock().unwrap().is_empty());
    }

    #[test]
    fn subscribing_to_inert_session_registers_nothing() {
        let mut session = session_at(Utc::now());
        session.cancel();
        session.subscribe(|_| {});
        assert_eq!(session.observer_count(), 0);
    }

    #[test]
    fn rejects_non_finite_seed() {
        let mut bad = seed();
        bad.destination.lat = f64::NAN;
        let result = TrackingSession::new(
            uuid::Uuid::new_v4(),
            &bad,
            &SimulationSettings::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_value(TrackingEvent::StatusChanged {
            status: JobStatus::OnTheWay,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"kind": "status-changed", "status": "on-the-way"}));

        let json = serde_json::to_value(TrackingEvent::Completed).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "completed"}));
    }
}
