//! services/app/src/adapters/clock.rs
//!
//! This module contains the adapters for the `Clock` and `IdProvider` ports.
//! Production code uses the system clock and random UUIDs; tests pin both so
//! that generated stories and persistence expiry are deterministic.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use storybook_core::ports::{Clock, IdProvider};
use uuid::Uuid;

/// The production `Clock`: plain wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The production `IdProvider`: a fresh v4 UUID per story.
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// A clock that only moves when told to. Used by tests that exercise the
/// persistence retention window without waiting on real time.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock poisoned") = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}
