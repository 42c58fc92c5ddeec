//! Maps tracking state onto what the tracking screen renders.
//!
//! Everything here is a pure function of a [`SessionState`] snapshot;
//! nothing mutates the session. Views are rebuilt on every notification.

use serde::Serialize;

use crate::booking::ProviderProfile;
use crate::geo::Coordinates;
use crate::job_status::{JobStatus, TRACKING_STATUSES};
use crate::session::SessionState;
use crate::types::JobId;

/// Shown when a booking has no id yet.
pub const FALLBACK_BOOKING_REFERENCE: &str = "BK-001";

/// How a step on the progress tracker is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Done,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerStep {
    pub status: JobStatus,
    pub label: &'static str,
    pub state: StepState,
}

/// Display fields for the live tracking screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingView {
    pub title: &'static str,
    pub subtitle: String,
    /// Fill of the progress line, `0.0` at confirmation and `1.0` at completion.
    pub progress: f64,
    pub steps: Vec<TrackerStep>,
    pub provider_marker: Coordinates,
    pub destination_marker: Coordinates,
    /// Only present while the provider is travelling.
    pub eta_badge: Option<String>,
    pub can_cancel: bool,
}

impl TrackingView {
    pub fn build(state: &SessionState, provider: &ProviderProfile) -> Self {
        let (title, subtitle) = status_message(state.status, &provider.name, &state.eta_label);

        Self {
            title,
            subtitle,
            progress: progress_fraction(state.status),
            steps: tracker_steps(state.status),
            provider_marker: state.provider_position,
            destination_marker: state.destination,
            eta_badge: (state.status == JobStatus::OnTheWay)
                .then(|| format!("ETA: {}", state.eta_label)),
            can_cancel: state.status.allows_cancellation(),
        }
    }
}

/// Header title and subtitle for a status.
pub fn status_message(status: JobStatus, provider_name: &str, eta_label: &str) -> (&'static str, String) {
    match status {
        JobStatus::Pending => ("Awaiting Confirmation", "Finding the right professional for you".to_string()),
        JobStatus::Confirmed => ("Booking Confirmed", format!("{provider_name} has accepted your request")),
        JobStatus::OnTheWay => ("On the Way", format!("{provider_name} will arrive in {eta_label}")),
        JobStatus::InProgress => (
            "Service in Progress",
            "Your professional is working on your request".to_string(),
        ),
        JobStatus::Completed => ("Service Completed", "How was your experience?".to_string()),
    }
}

/// `index(status) / (steps - 1)`; `Pending` sits at zero.
pub fn progress_fraction(status: JobStatus) -> f64 {
    let last = (TRACKING_STATUSES.len() - 1) as f64;
    status.tracking_index().map_or(0.0, |i| i as f64 / last)
}

pub fn tracker_steps(current: JobStatus) -> Vec<TrackerStep> {
    TRACKING_STATUSES
        .iter()
        .map(|&status| TrackerStep {
            status,
            label: status.label(),
            state: if status < current {
                StepState::Done
            } else if status == current {
                StepState::Current
            } else {
                StepState::Upcoming
            },
        })
        .collect()
}

/// Short booking reference: `#` and the first eight id characters.
pub fn booking_reference(job_id: Option<JobId>) -> String {
    match job_id {
        Some(id) => {
            let simple = id.simple().to_string();
            format!("#{}", simple[..8].to_uppercase())
        }
        None => FALLBACK_BOOKING_REFERENCE.to_string(),
    }
}

/// Naira amount with thousands separators, e.g. `₦15,000`.
pub fn format_naira(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₦{grouped}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
