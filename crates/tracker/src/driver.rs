//! The recurring tick that drives one tracking session.
//!
//! [`run`] owns the session for its whole life and ticks it from a single
//! `tokio::time::interval`. It stops when the session completes or when
//! `cancel` is triggered, whichever comes first.

use std::sync::Arc;
use std::time::Duration;

use homepro_core::clock::Clock;
use homepro_core::session::{SessionState, TrackingSession};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Drive `session` until it completes or `cancel` fires.
///
/// The first tick happens immediately. Returns the final snapshot; a
/// cancelled run leaves the session in the `Cancelled` phase.
pub async fn run(
    mut session: TrackingSession,
    clock: Arc<dyn Clock>,
    tick_every: Duration,
    cancel: CancellationToken,
) -> SessionState {
    let job_id = session.job_id();

    tracing::info!(
        job_id = %job_id,
        tick_ms = tick_every.as_millis() as u64,
        "Tracking driver started"
    );

    let mut interval = tokio::time::interval(tick_every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                session.cancel();
                tracing::info!(job_id = %job_id, status = %session.status(), "Tracking driver stopping");
                break;
            }
            _ = interval.tick() => {
                // Cancellation may land while the tick future is resolving.
                if cancel.is_cancelled() {
                    continue;
                }
                session.tick(clock.now());
                if !session.is_active() {
                    tracing::info!(job_id = %job_id, "Tracking driver finished");
                    break;
                }
            }
        }
    }

    session.snapshot()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use homepro_core::booking::{ProviderProfile, TrackingSeed};
    use homepro_core::geo::{DEFAULT_DESTINATION, DEFAULT_START_OFFSET};
    use homepro_core::job_status::JobStatus;
    use homepro_core::session::{SessionPhase, TrackingEvent};
    use homepro_core::settings::SimulationSettings;

    use super::*;
    use crate::clock::TokioClock;

    fn session(clock: &TokioClock) -> TrackingSession {
        let seed = TrackingSeed {
            provider: ProviderProfile::new("Kemi Balogun"),
            destination: DEFAULT_DESTINATION,
            start_offset: DEFAULT_START_OFFSET,
            service_name: "Makeup Services".to_string(),
            price: None,
        };
        TrackingSession::start(
            uuid::Uuid::new_v4(),
            &seed,
            &SimulationSettings::default(),
            clock,
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_completion() {
        let clock = TokioClock::new();
        let mut session = session(&clock);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        let started = tokio::time::Instant::now();
        let state = run(
            session,
            Arc::new(clock),
            Duration::from_secs(2),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(state.status, JobStatus::Completed);
        assert_eq!(state.phase, SessionPhase::Completed);
        // First tick at or after 15 s on a 2 s grid.
        assert_eq!(started.elapsed(), Duration::from_secs(16));

        let events = events.lock().unwrap();
        assert_eq!(
            events.iter().filter(|e| **e == TrackingEvent::Completed).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop() {
        let clock = TokioClock::new();
        let session = session(&clock);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            session,
            Arc::new(clock),
            Duration::from_secs(2),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();
        let state = handle.await.unwrap();

        assert_eq!(state.phase, SessionPhase::Cancelled);
        assert_eq!(state.status, JobStatus::OnTheWay);
    }

    #[tokio::test(start_paused = true)]
    async fn pre_cancelled_token_never_ticks() {
        let clock = TokioClock::new();
        let session = session(&clock);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let state = run(session, Arc::new(clock), Duration::from_secs(2), cancel).await;

        assert_eq!(state.phase, SessionPhase::Cancelled);
        assert_eq!(state.status, JobStatus::Confirmed);
    }
}
