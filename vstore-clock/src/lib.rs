//! Clock abstraction for version records.
//!
//! Version records carry a 32-bit epoch-seconds timestamp, matching what a
//! small RTC-backed target can provide. The trait lets tests pin or step time.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync {
    /// Current time as Unix seconds, saturated to `u32`.
    fn now_epoch_secs(&self) -> u32;
}

/// Real system clock.
///
/// A clock set before 1970 reads as 0 rather than failing; a clock past
/// 2106 saturates at `u32::MAX`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    secs: u32,
}

impl FixedClock {
    pub fn new(secs: u32) -> Self {
        Self { secs }
    }
}

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> u32 {
        self.secs
    }
}

/// Clock that moves forward by `step` seconds on every read.
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicU32,
    step: u32,
}

impl SteppingClock {
    pub fn new(start: u32, step: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now_epoch_secs(&self) -> u32 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_epoch_secs(&self) -> u32 {
        (**self).now_epoch_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fixed_clock_is_pinned() {
        let clock = FixedClock::new(1_700_000_000);
        assert_eq!(clock.now_epoch_secs(), 1_700_000_000);
        assert_eq!(clock.now_epoch_secs(), 1_700_000_000);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_epoch_secs() > 1_577_836_800);
    }

    #[test]
    fn test_stepping_clock_advances() {
        let clock = SteppingClock::new(100, 10);
        assert_eq!(clock.now_epoch_secs(), 100);
        assert_eq!(clock.now_epoch_secs(), 110);
        assert_eq!(clock.now_epoch_secs(), 120);
    }

    #[test]
    fn test_arc_clock_delegates() {
        let clock = Arc::new(SteppingClock::new(5, 1));
        let shared = Arc::clone(&clock);
        assert_eq!(shared.now_epoch_secs(), 5);
        assert_eq!(clock.now_epoch_secs(), 6);
    }

    #[test]
    fn test_clock_trait_object() {
        let clock: Box<dyn Clock> = Box::new(FixedClock::new(42));
        assert_eq!(clock.now_epoch_secs(), 42);
    }
}
