//! Booking data needed to start tracking, and the lookup boundary that
//! provides it.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::Coordinates;
use crate::service_category::ServiceCategory;
use crate::types::JobId;

/// ETA shown when the provider record carries none.
pub const DEFAULT_ETA_LABEL: &str = "15 min";

/// The professional assigned to a booking, as shown on the tracking screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub name: String,
    /// Free-text estimate such as `"12 min"`.
    pub eta: Option<String>,
}

impl ProviderProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            eta: None,
        }
    }

    pub fn with_eta(mut self, eta: impl Into<String>) -> Self {
        self.eta = Some(eta.into());
        self
    }

    /// ETA for display, falling back to [`DEFAULT_ETA_LABEL`].
    pub fn eta_label(&self) -> &str {
        self.eta
            .as_deref()
            .filter(|eta| !eta.trim().is_empty())
            .unwrap_or(DEFAULT_ETA_LABEL)
    }
}

/// Everything a tracking session is initialised from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSeed {
    pub provider: ProviderProfile,
    /// The customer's location.
    pub destination: Coordinates,
    /// Provider start position relative to `destination`.
    pub start_offset: Coordinates,
    /// Catalogue service name as stored on the booking.
    pub service_name: String,
    /// Agreed price in whole naira.
    pub price: Option<u64>,
}

impl TrackingSeed {
    pub fn service_category(&self) -> ServiceCategory {
        ServiceCategory::from_name(&self.service_name)
    }
}

// ---------------------------------------------------------------------------
// Lookup boundary
// ---------------------------------------------------------------------------

/// Resolves a confirmed booking into a [`TrackingSeed`].
///
/// Implementations talk to the remote data store. A failure means tracking
/// cannot start; no session is created.
#[async_trait]
pub trait BookingLookup: Send + Sync {
    async fn tracking_seed(&self, job_id: JobId) -> Result<TrackingSeed, CoreError>;
}

/// Map-backed lookup for tests and local simulation.
#[derive(Debug, Default)]
pub struct InMemoryBookings {
    seeds: RwLock<HashMap<JobId, TrackingSeed>>,
}

impl InMemoryBookings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job_id: JobId, seed: TrackingSeed) {
        self.seeds
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(job_id, seed);
    }
}

#[async_trait]
impl BookingLookup for InMemoryBookings {
    async fn tracking_seed(&self, job_id: JobId) -> Result<TrackingSeed, CoreError> {
        self.seeds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&job_id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "booking",
                id: job_id,
            })
    }
}
