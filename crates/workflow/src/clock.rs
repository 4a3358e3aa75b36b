// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::{Mutex, PoisonError};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

/// Source of the current local date and time.
///
/// Deadlines are calendar-day values with no time zone, so the clock hands
/// out naive local times.
pub trait Clock: Send + Sync {
    /// The current local date and time, truncated to whole seconds.
    fn now(&self) -> PrimitiveDateTime;

    /// The current local calendar date.
    fn today(&self) -> Date {
        self.now().date()
    }
}

/// The host clock. Falls back to UTC when the local offset cannot be
/// determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now: OffsetDateTime =
            OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let time = now.time();
        PrimitiveDateTime::new(now.date(), time.replace_nanosecond(0).unwrap_or(time))
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<PrimitiveDateTime>,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: PrimitiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: PrimitiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.saturating_add(Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
