//! Status timeline: a pure mapping from elapsed time to [`JobStatus`].
//!
//! The timeline holds no timers. Callers feed it the time elapsed since a
//! session started, which keeps the transition schedule testable without
//! waiting in real time.

use std::time::Duration;

use crate::error::CoreError;
use crate::job_status::{JobStatus, TRACKING_STATUSES};

/// One scheduled transition: `status` becomes current `delay` after start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub delay: Duration,
    pub status: JobStatus,
}

impl TimelineEntry {
    pub const fn new(delay: Duration, status: JobStatus) -> Self {
        Self { delay, status }
    }
}

/// Default delay before the provider sets off.
pub const DEFAULT_ON_THE_WAY_DELAY: Duration = Duration::from_secs(3);
/// Default delay before work starts.
pub const DEFAULT_IN_PROGRESS_DELAY: Duration = Duration::from_secs(8);
/// Default delay before the job completes.
pub const DEFAULT_COMPLETED_DELAY: Duration = Duration::from_secs(15);

/// Validated, ordered schedule of tracking statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTimeline {
    entries: Vec<TimelineEntry>,
}

impl StatusTimeline {
    /// Build a timeline from explicit entries.
    ///
    /// The entries must name exactly the tracking statuses in canonical
    /// order, with strictly increasing delays.
    pub fn new(entries: Vec<TimelineEntry>) -> Result<Self, CoreError> {
        validate_entries(&entries)?;
        Ok(Self { entries })
    }

    /// Build the canonical four-step timeline from the three transition
    /// delays; `Confirmed` always starts at zero.
    pub fn from_delays(
        on_the_way: Duration,
        in_progress: Duration,
        completed: Duration,
    ) -> Result<Self, CoreError> {
        Self::new(vec![
            TimelineEntry::new(Duration::ZERO, JobStatus::Confirmed),
            TimelineEntry::new(on_the_way, JobStatus::OnTheWay),
            TimelineEntry::new(in_progress, JobStatus::InProgress),
            TimelineEntry::new(completed, JobStatus::Completed),
        ])
    }

    /// Status in effect after `elapsed`.
    ///
    /// Returns the status whose delay is the greatest one not exceeding
    /// `elapsed`, or the first status when `elapsed` precedes every delay.
    pub fn status_at(&self, elapsed: Duration) -> JobStatus {
        self.entries
            .iter()
            .take_while(|entry| entry.delay <= elapsed)
            .last()
            .unwrap_or(&self.entries[0])
            .status
    }

    /// First status of the schedule.
    pub fn initial_status(&self) -> JobStatus {
        self.entries[0].status
    }

    /// Delay at which the job becomes `Completed`.
    pub fn completion_delay(&self) -> Duration {
        self.entries[self.entries.len() - 1].delay
    }
}

impl Default for StatusTimeline {
    fn default() -> Self {
        Self {
            entries: vec![
                TimelineEntry::new(Duration::ZERO, JobStatus::Confirmed),
                TimelineEntry::new(DEFAULT_ON_THE_WAY_DELAY, JobStatus::OnTheWay),
                TimelineEntry::new(DEFAULT_IN_PROGRESS_DELAY, JobStatus::InProgress),
                TimelineEntry::new(DEFAULT_COMPLETED_DELAY, JobStatus::Completed),
            ],
        }
    }
}

fn validate_entries(entries: &[TimelineEntry]) -> Result<(), CoreError> {
    let statuses: Vec<JobStatus> = entries.iter().map(|e| e.status).collect();
    if statuses != TRACKING_STATUSES {
        let names: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        return Err(CoreError::Configuration(format!(
            "Timeline statuses must be confirmed, on-the-way, in-progress, completed; got [{}]",
            names.join(", ")
        )));
    }

    for pair in entries.windows(2) {
        if pair[1].delay <= pair[0].delay {
            return Err(CoreError::Configuration(format!(
                "Timeline delays must be strictly increasing: {} at {:?} does not follow {} at {:?}",
                pair[1].status, pair[1].delay, pair[0].status, pair[0].delay
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
