//! Flight context masks
//!
//! Every iteration the scheduler derives a context mask from the flight-state
//! flags. A task is applicable only when its own mask shares a bit with it.

use bitflags::bitflags;

bitflags! {
    /// Flight contexts in which a task is eligible to run
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TaskMask: u8 {
        /// Set in every context
        const DEFAULT = 1 << 0;
        /// Armed or airborne
        const IN_AIR = 1 << 1;
        /// Disarmed and on the ground
        const ON_GROUND = 1 << 2;
        /// Eligible in every context
        const ALWAYS = Self::DEFAULT.bits() | Self::IN_AIR.bits() | Self::ON_GROUND.bits();
    }
}

impl TaskMask {
    /// Check whether a task carrying `self` may run under `context`
    pub const fn applies_to(self, context: TaskMask) -> bool {
        self.bits() & context.bits() != 0
    }
}

impl Default for TaskMask {
    fn default() -> Self {
        TaskMask::ALWAYS
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskMask {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "TaskMask({=u8:b})", self.bits());
    }
}

/// Flight-state flags owned by the arming and flight-detection subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlightFlags {
    /// Motors armed
    pub armed: bool,
    /// Aircraft detected as airborne
    pub in_air: bool,
}

impl FlightFlags {
    /// Disarmed, on the ground
    pub const GROUNDED: Self = Self {
        armed: false,
        in_air: false,
    };

    /// Create flags from raw state
    pub const fn new(armed: bool, in_air: bool) -> Self {
        Self { armed, in_air }
    }

    /// Compute the context mask for the current iteration
    ///
    /// `DEFAULT` is always present; `IN_AIR` when armed or airborne, otherwise
    /// `ON_GROUND`.
    pub const fn context_mask(self) -> TaskMask {
        if self.in_air || self.armed {
            TaskMask::DEFAULT.union(TaskMask::IN_AIR)
        } else {
            TaskMask::DEFAULT.union(TaskMask::ON_GROUND)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FlightFlags {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "FlightFlags{{armed: {}, in_air: {}}}", self.armed, self.in_air);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_mask_on_ground() {
        let mask = FlightFlags::GROUNDED.context_mask();
        assert!(mask.contains(TaskMask::DEFAULT));
        assert!(mask.contains(TaskMask::ON_GROUND));
        assert!(!mask.contains(TaskMask::IN_AIR));
    }

    #[test]
    fn test_context_mask_armed_counts_as_in_air() {
        let mask = FlightFlags::new(true, false).context_mask();
        assert_eq!(mask, TaskMask::DEFAULT | TaskMask::IN_AIR);

        let mask = FlightFlags::new(false, true).context_mask();
        assert_eq!(mask, TaskMask::DEFAULT | TaskMask::IN_AIR);
    }

    #[test]
    fn test_applicability() {
        let flying = FlightFlags::new(true, true).context_mask();
        assert!(TaskMask::ALWAYS.applies_to(flying));
        assert!(TaskMask::DEFAULT.applies_to(flying));
        assert!(TaskMask::IN_AIR.applies_to(flying));
        assert!(!TaskMask::ON_GROUND.applies_to(flying));
        assert!(!TaskMask::empty().applies_to(flying));
    }
}
