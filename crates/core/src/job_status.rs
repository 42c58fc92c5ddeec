//! Job and booking status vocabulary.
//!
//! [`JobStatus`] is the ordered lifecycle a tracked job moves through.
//! [`BookingStatus`] is the coarser status stored on the booking record,
//! which additionally knows about cancellation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a booked job, in canonical order.
///
/// The derived ordering follows declaration order, so `Pending` sorts
/// before every tracked status and `Completed` after all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    /// Booking made but not yet accepted. Never part of a tracking timeline.
    Pending,
    Confirmed,
    OnTheWay,
    InProgress,
    Completed,
}

/// The statuses a tracking session walks through, in order.
pub const TRACKING_STATUSES: [JobStatus; 4] = [
    JobStatus::Confirmed,
    JobStatus::OnTheWay,
    JobStatus::InProgress,
    JobStatus::Completed,
];

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::OnTheWay => "on-the-way",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Short label used on the step tracker.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::OnTheWay => "On the Way",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Zero-based position within [`TRACKING_STATUSES`], `None` for `Pending`.
    pub fn tracking_index(self) -> Option<usize> {
        TRACKING_STATUSES.iter().position(|s| *s == self)
    }

    /// The status directly after this one, `None` once terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::OnTheWay),
            Self::OnTheWay => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }

    /// Whether the customer may still cancel the booking.
    ///
    /// Cancellation closes once the professional has started working.
    pub fn allows_cancellation(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::OnTheWay)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BookingStatus
// ---------------------------------------------------------------------------

/// Status column of a stored booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Convert to a data-store-compatible string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<JobStatus> for BookingStatus {
    /// The store has no "on the way" state; the booking stays confirmed
    /// until work starts.
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => Self::Pending,
            JobStatus::Confirmed | JobStatus::OnTheWay => Self::Confirmed,
            JobStatus::InProgress => Self::InProgress,
            JobStatus::Completed => Self::Completed,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
