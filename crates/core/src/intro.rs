//! First-visit intro flag.
//!
//! The flag lives in an injected [`KeyValueStore`]. [`IntroGate::load`]
//! reads it once at startup; [`IntroGate::mark_seen`] writes it once when
//! the intro completes or is skipped.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::CoreError;

/// Store key holding the flag.
pub const SEEN_INTRO_KEY: &str = "homepro-seen-intro";

/// Minimal string key-value capability.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
}

/// Process-local store, mainly for tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Why the intro stopped showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroOutcome {
    Completed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroGate {
    seen: bool,
}

impl IntroGate {
    /// Read the flag. Any value other than `"true"` counts as unseen.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, CoreError> {
        let seen = store.get(SEEN_INTRO_KEY)?.as_deref() == Some("true");
        Ok(Self { seen })
    }

    pub fn should_show_intro(&self) -> bool {
        !self.seen
    }

    /// Persist the flag. Writes only the first time; later calls are no-ops.
    pub fn mark_seen(&mut self, store: &dyn KeyValueStore, outcome: IntroOutcome) -> Result<(), CoreError> {
        if self.seen {
            return Ok(());
        }
        store.set(SEEN_INTRO_KEY, "true")?;
        self.seen = true;
        tracing::debug!(outcome = ?outcome, "Intro marked as seen");
        Ok(())
    }
}
