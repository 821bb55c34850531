//! Cycle counter time base

use core::fmt;

/// Timestamp read from a free-running 32-bit cycle counter
///
/// The counter wraps; all comparisons go through wrapping arithmetic and are
/// valid as long as the two stamps are less than half a wrap apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cycles(pub u32);

impl Cycles {
    /// Zero timestamp
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from a raw counter value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw counter value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Cycles elapsed since an earlier stamp
    pub const fn elapsed_since(self, earlier: Cycles) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Check if this stamp is at or after another (handles wraparound)
    pub const fn is_at_or_after(self, other: Cycles) -> bool {
        (self.0.wrapping_sub(other.0) as i32) >= 0
    }

    /// Advance the stamp by a number of cycles
    pub const fn wrapping_add(self, cycles: u32) -> Self {
        Self(self.0.wrapping_add(cycles))
    }
}

impl fmt::Display for Cycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}cyc", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Cycles {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}cyc", self.0);
    }
}

/// Cycle counter extended to 64 bits
///
/// Counts counter wraps, so stamps taken any distance apart still order and
/// subtract correctly. The counter must be folded in at least once per wrap;
/// the scheduler does so at the top of every iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeline {
    ticks: u64,
}

impl Timeline {
    /// Timeline whose low 32 bits start in step with the counter
    pub const fn new() -> Self {
        Self { ticks: 0 }
    }

    /// Fold a counter reading in and return the extended value
    pub fn extend(&mut self, now: Cycles) -> u64 {
        let delta = now.raw().wrapping_sub(self.ticks as u32);
        self.ticks += u64::from(delta);
        self.ticks
    }

    /// Extended value of the last reading
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Monotonic hardware time source
///
/// The scheduler only reads the clock; it never adjusts it.
pub trait CycleClock {
    /// Current counter value
    fn now(&self) -> Cycles;

    /// Counter ticks per microsecond
    fn ticks_per_us(&self) -> u32;

    /// Convert microseconds to counter cycles
    fn us_to_cycles(&self, us: u32) -> u32 {
        us.saturating_mul(self.ticks_per_us())
    }

    /// Convert counter cycles to microseconds
    fn cycles_to_us(&self, cycles: u32) -> u32 {
        cycles / self.ticks_per_us().max(1)
    }

    /// Cycles elapsed since `earlier`
    fn elapsed_since(&self, earlier: Cycles) -> u32 {
        self.now().elapsed_since(earlier)
    }

    /// Current counter value in microseconds; wraps with the counter
    fn micros(&self) -> u32 {
        self.cycles_to_us(self.now().raw())
    }
}

impl<C: CycleClock + ?Sized> CycleClock for &C {
    fn now(&self) -> Cycles {
        (**self).now()
    }

    fn ticks_per_us(&self) -> u32 {
        (**self).ticks_per_us()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl CycleClock for Fixed {
        fn now(&self) -> Cycles {
            Cycles(self.0)
        }

        fn ticks_per_us(&self) -> u32 {
            168
        }
    }

    #[test]
    fn test_elapsed_across_wrap() {
        let before = Cycles(u32::MAX - 9);
        let after = before.wrapping_add(20);
        assert_eq!(after.raw(), 10);
        assert_eq!(after.elapsed_since(before), 20);
    }

    #[test]
    fn test_ordering_across_wrap() {
        let before = Cycles(u32::MAX - 1);
        let after = Cycles(3);
        assert!(after.is_at_or_after(before));
        assert!(!before.is_at_or_after(after));
        assert!(after.is_at_or_after(after));
    }

    #[test]
    fn test_unit_conversion() {
        let clock = Fixed(0);
        assert_eq!(clock.us_to_cycles(1000), 168_000);
        assert_eq!(clock.cycles_to_us(168_000), 1000);
        assert_eq!(clock.cycles_to_us(167), 0);
        assert_eq!(clock.us_to_cycles(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_clock_by_reference() {
        let clock = Fixed(500);
        let by_ref = &clock;
        assert_eq!(by_ref.elapsed_since(Cycles(100)), 400);
    }

    #[test]
    fn test_timeline_counts_wraps() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.extend(Cycles(1_000)), 1_000);
        assert_eq!(timeline.extend(Cycles(u32::MAX)), u64::from(u32::MAX));
        assert_eq!(timeline.extend(Cycles(4)), (1u64 << 32) + 4);
        assert_eq!(timeline.extend(Cycles(1u32 << 31)), (1u64 << 32) + (1u64 << 31));
        assert_eq!(timeline.extend(Cycles(0)), 2u64 << 32);
        assert_eq!(timeline.ticks(), 2u64 << 32);
    }

    #[test]
    fn test_micros() {
        assert_eq!(Fixed(168 * 250 + 100).micros(), 250);
    }
}
