//! HomePro live tracking runtime.
//!
//! Drives [`homepro_core`] tracking sessions on a tokio runtime: loads
//! configuration, resolves bookings, ticks each session from one owned
//! interval, fans notifications out over [`homepro_events`] and launches
//! the review flow once a job completes.

pub mod clock;
pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod store;
