//! HomePro tracking event bus.
//!
//! - [`TrackingBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`TrackingNotification`]: a session event stamped with its job and
//!   publication time.

pub mod bus;

pub use bus::{TrackingBus, TrackingNotification};
