use homepro_core::error::CoreError;
use homepro_core::job_status::JobStatus;
use homepro_core::types::JobId;

/// Runtime-level error type.
///
/// Wraps [`CoreError`] for domain failures and adds the conditions that
/// only exist once sessions are started and driven.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A domain-level error from `homepro_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Booking data could not be resolved, so no session was created.
    #[error("Cannot start tracking job {job_id}: {reason}")]
    CannotStartTracking { job_id: JobId, reason: String },

    /// The customer tried to cancel after work had started.
    #[error("Booking can no longer be cancelled (status: {status})")]
    CancellationNotAllowed { status: JobStatus },

    /// An environment variable held an unusable value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for tracker results.
pub type TrackerResult<T> = Result<T, TrackerError>;
