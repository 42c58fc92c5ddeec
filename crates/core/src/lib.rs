//! HomePro Connect job tracking core.
//!
//! Pure domain logic for the live tracking screen: the status vocabulary,
//! the status timeline, the position interpolator, the per-job
//! [`TrackingSession`](session::TrackingSession) and the presentation
//! adapter. Nothing in this crate spawns tasks or reads the wall clock
//! except through [`clock::Clock`].

pub mod booking;
pub mod clock;
pub mod error;
pub mod geo;
pub mod intro;
pub mod job_status;
pub mod presentation;
pub mod service_category;
pub mod session;
pub mod settings;
pub mod timeline;
pub mod types;
