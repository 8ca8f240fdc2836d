//! Sources of "now" for the rotation check and record timestamps.

use std::sync::{Arc, Mutex, PoisonError};

use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

/// A wall clock reporting local date and time.
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> PrimitiveDateTime;

    /// Current local calendar date.
    fn today(&self) -> Date {
        self.now().date()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> PrimitiveDateTime {
        (**self).now()
    }
}

/// The system clock in the local time zone.
///
/// Falls back to UTC when the local offset cannot be determined, which the
/// `time` crate reports on some platforms once the process has spawned threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<PrimitiveDateTime>,
}

impl ManualClock {
    pub fn new(now: PrimitiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to an absolute point in time.
    pub fn set(&self, now: PrimitiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move forward (or backward, for a negative duration).
    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> PrimitiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn test_manual_clock_advance_crosses_midnight() {
        let clock = ManualClock::new(datetime!(2026-10-17 23:59:30));
        assert_eq!(clock.today(), date!(2026 - 10 - 17));

        clock.advance(Duration::seconds(45));
        assert_eq!(clock.today(), date!(2026 - 10 - 18));
        assert_eq!(clock.now(), datetime!(2026-10-18 00:00:15));
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = Arc::new(ManualClock::new(datetime!(2026-01-01 12:00)));
        let shared: Arc<dyn Clock> = clock.clone();

        clock.set(datetime!(2026-03-01 08:00));
        assert_eq!(shared.today(), date!(2026 - 03 - 01));
    }

    #[test]
    fn test_local_clock_is_close_to_utc() {
        let local = LocalClock.now().assume_utc();
        let utc = OffsetDateTime::now_utc();
        // Local offsets never exceed 26 hours.
        assert!((local - utc).whole_hours().abs() <= 26);
    }
}
