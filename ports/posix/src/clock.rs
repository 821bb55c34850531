//! Monotonic cycle clock for POSIX hosts

use std::time::Instant;

use fcs_core::{CycleClock, Cycles};

/// Default host resolution: 10ns per tick
pub const DEFAULT_TICKS_PER_US: u32 = 100;

/// Cycle counter synthesized from a monotonic clock
///
/// The counter is 32 bits wide and wraps like a hardware cycle counter. At
/// the default rate it wraps roughly every 43 seconds.
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: Instant,
    ticks_per_us: u32,
}

impl StdClock {
    pub fn new() -> Self {
        Self::with_ticks_per_us(DEFAULT_TICKS_PER_US)
    }

    /// Clock with a custom tick rate, clamped to at least one tick per microsecond
    pub fn with_ticks_per_us(ticks_per_us: u32) -> Self {
        Self {
            origin: Instant::now(),
            ticks_per_us: ticks_per_us.max(1),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleClock for StdClock {
    fn now(&self) -> Cycles {
        let nanos = self.origin.elapsed().as_nanos();
        let ticks = nanos * u128::from(self.ticks_per_us) / 1_000;
        Cycles(ticks as u32)
    }

    fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clock_advances() {
        let clock = StdClock::new();
        let start = clock.now();
        std::thread::sleep(Duration::from_millis(2));
        let elapsed_us = clock.cycles_to_us(clock.elapsed_since(start));
        assert!(elapsed_us >= 2_000, "elapsed only {}us", elapsed_us);
    }

    #[test]
    fn test_zero_rate_clamped() {
        assert_eq!(StdClock::with_ticks_per_us(0).ticks_per_us(), 1);
    }
}
