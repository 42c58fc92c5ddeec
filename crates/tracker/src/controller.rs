//! Owner of one live tracking session.
//!
//! A [`TrackingController`] is what the tracking screen holds. Starting it
//! resolves the booking, builds the session, and spawns the tick driver
//! under a [`CancellationToken`] that the controller alone owns. Dropping
//! the controller (navigating away) cancels everything it spawned.
//!
//! When the job completes, the controller waits its own review delay and
//! then hands off to the [`ReviewFlow`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use homepro_core::booking::{BookingLookup, ProviderProfile, TrackingSeed};
use homepro_core::clock::Clock;
use homepro_core::job_status::{BookingStatus, JobStatus};
use homepro_core::presentation::TrackingView;
use homepro_core::session::{SessionPhase, SessionState, TrackingEvent, TrackingSession};
use homepro_core::types::JobId;
use homepro_events::TrackingBus;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::driver;
use crate::error::{TrackerError, TrackerResult};

// ---------------------------------------------------------------------------
// Review flow
// ---------------------------------------------------------------------------

/// Receives the hand-off to the review/rating screen.
pub trait ReviewFlow: Send + Sync {
    fn launch(&self, job_id: JobId, provider: &ProviderProfile);
}

/// A request to open the review screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRequest {
    pub job_id: JobId,
    pub provider: ProviderProfile,
}

/// [`ReviewFlow`] that forwards requests over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ReviewChannel {
    sender: mpsc::UnboundedSender<ReviewRequest>,
}

impl ReviewChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReviewRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ReviewFlow for ReviewChannel {
    fn launch(&self, job_id: JobId, provider: &ProviderProfile) {
        let request = ReviewRequest {
            job_id,
            provider: provider.clone(),
        };
        if self.sender.send(request).is_err() {
            tracing::warn!(job_id = %job_id, "Review flow receiver is gone");
        }
    }
}

// ---------------------------------------------------------------------------
// TrackingController
// ---------------------------------------------------------------------------

pub struct TrackingController {
    job_id: JobId,
    seed: TrackingSeed,
    state: Arc<watch::Sender<SessionState>>,
    cancel: CancellationToken,
    booking_cancelled: AtomicBool,
    task: Option<JoinHandle<SessionState>>,
}

impl TrackingController {
    /// Resolve `job_id` and start tracking it.
    ///
    /// Lookup failures surface as [`TrackerError::CannotStartTracking`],
    /// a zero tick interval as [`TrackerError::Config`] and invalid
    /// settings as [`TrackerError::Core`]; in every case nothing is
    /// spawned. Must be called from within a tokio runtime.
    pub async fn start(
        job_id: JobId,
        lookup: &dyn BookingLookup,
        config: &TrackerConfig,
        clock: Arc<dyn Clock>,
        bus: &TrackingBus,
        review: Arc<dyn ReviewFlow>,
    ) -> TrackerResult<Self> {
        config.validate()?;

        let seed = lookup.tracking_seed(job_id).await.map_err(|e| {
            tracing::warn!(job_id = %job_id, error = %e, "Booking lookup failed");
            TrackerError::CannotStartTracking {
                job_id,
                reason: e.to_string(),
            }
        })?;

        let mut session = TrackingSession::start(job_id, &seed, &config.simulation, clock.as_ref())?;

        let (state_tx, _) = watch::channel(session.snapshot());
        let state = Arc::new(state_tx);

        session.subscribe(bus.forwarder(job_id, Arc::clone(&clock)));
        let mirror = Arc::clone(&state);
        session.subscribe(move |event| mirror.send_modify(|s| apply_event(s, event)));

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_session(
            session,
            clock,
            config.tick_interval,
            config.review_delay,
            cancel.clone(),
            review,
            seed.provider.clone(),
        ));

        tracing::info!(
            job_id = %job_id,
            provider = %seed.provider.name,
            service = seed.service_category().display_name(),
            "Tracking started"
        );

        Ok(Self {
            job_id,
            seed,
            state,
            cancel,
            booking_cancelled: AtomicBool::new(false),
            task: Some(task),
        })
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn seed(&self) -> &TrackingSeed {
        &self.seed
    }

    /// Latest known session state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Follow state changes; the receiver sees the newest state on each change.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current display fields for the tracking screen.
    pub fn view(&self) -> TrackingView {
        TrackingView::build(&self.state.borrow(), &self.seed.provider)
    }

    /// Stop tracking without touching the booking (e.g. leaving the screen).
    ///
    /// Idempotent. Also suppresses a pending review launch.
    pub fn cancel(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        self.state.send_modify(|s| {
            if s.phase == SessionPhase::Active {
                s.phase = SessionPhase::Cancelled;
            }
        });
        tracing::info!(job_id = %self.job_id, "Tracking cancelled");
    }

    /// Status to persist on the booking for the current tracking state.
    ///
    /// `OnTheWay` has no booking counterpart and is stored as `confirmed`.
    /// Only [`cancel_booking`](Self::cancel_booking) yields `cancelled`;
    /// leaving the screen stops tracking but keeps the booking.
    pub fn booking_status(&self) -> BookingStatus {
        if self.booking_cancelled.load(Ordering::SeqCst) {
            return BookingStatus::Cancelled;
        }
        BookingStatus::from(self.state.borrow().status)
    }

    /// Customer-initiated booking cancellation.
    ///
    /// Only allowed before work starts. On success tracking stops and the
    /// status to persist on the booking is returned.
    ///
    /// The check and the phase change happen under the state lock that the
    /// driver also takes to publish each event, so a tick cannot move the
    /// mirrored status past `OnTheWay` in between. On a multi-thread
    /// runtime a tick already inside `TrackingSession::tick` when this
    /// returns may still publish one bus notification.
    pub fn cancel_booking(&self) -> TrackerResult<BookingStatus> {
        let mut rejected = None;
        let changed = self.state.send_if_modified(|s| {
            if !s.status.allows_cancellation() {
                rejected = Some(s.status);
                return false;
            }
            self.booking_cancelled.store(true, Ordering::SeqCst);
            self.cancel.cancel();
            if s.phase != SessionPhase::Active {
                return false;
            }
            s.phase = SessionPhase::Cancelled;
            true
        });

        if let Some(status) = rejected {
            return Err(TrackerError::CancellationNotAllowed { status });
        }
        if changed {
            tracing::info!(job_id = %self.job_id, "Booking cancelled");
        }
        Ok(BookingStatus::Cancelled)
    }

    /// Wait for the driver, including any review launch, to finish.
    ///
    /// Returns `None` if the driver task panicked.
    pub async fn finished(mut self) -> Option<SessionState> {
        let task = self.task.take()?;
        match task.await {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::error!(job_id = %self.job_id, error = %e, "Tracking task failed");
                None
            }
        }
    }
}

impl Drop for TrackingController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Mirror a session event onto the controller's copy of the state.
fn apply_event(state: &mut SessionState, event: &TrackingEvent) {
    if state.phase != SessionPhase::Active {
        return;
    }
    match event {
        TrackingEvent::StatusChanged { status } => state.status = *status,
        TrackingEvent::PositionUpdated { position } => state.provider_position = *position,
        TrackingEvent::Completed => {
            state.status = JobStatus::Completed;
            state.phase = SessionPhase::Completed;
        }
    }
}

async fn run_session(
    session: TrackingSession,
    clock: Arc<dyn Clock>,
    tick_every: Duration,
    review_delay: Duration,
    cancel: CancellationToken,
    review: Arc<dyn ReviewFlow>,
    provider: ProviderProfile,
) -> SessionState {
    let job_id = session.job_id();
    let state = driver::run(session, clock, tick_every, cancel.clone()).await;

    if state.phase == SessionPhase::Completed {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, "Review launch skipped, tracking was cancelled");
            }
            _ = tokio::time::sleep(review_delay) => {
                tracing::info!(job_id = %job_id, "Launching review flow");
                review.launch(job_id, &provider);
            }
        }
    }

    // Release anything still tied to this session's token.
    cancel.cancel();
    state
}
