//! Task priority levels

use core::fmt;
use crate::{SchedError, SchedResult};

/// Type-safe task priority
///
/// Larger values are scheduled earlier. [`Priority::REALTIME`] is the top
/// tier: tasks at that level are never denied admission for lack of budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    /// Lowest usable priority (logging, OSD, VTX negotiation)
    pub const LOW: Priority = Priority(1);

    /// Medium priority (USB configurator, telemetry)
    pub const MEDIUM: Priority = Priority(64);

    /// High priority (receiver decoding)
    pub const HIGH: Priority = Priority(128);

    /// Realtime tier (gyro sampling, control law); exempt from budget checks
    pub const REALTIME: Priority = Priority(u8::MAX);

    /// Create a new priority level
    pub fn new(priority: u8) -> SchedResult<Self> {
        if priority == 0 {
            Err(SchedError::InvalidPriority)
        } else {
            Ok(Priority(priority))
        }
    }

    /// Create priority without validation (const fn)
    pub const fn new_unchecked(priority: u8) -> Self {
        Priority(priority)
    }

    /// Get the raw priority value
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check if this priority belongs to the realtime tier
    pub const fn is_realtime(self) -> bool {
        self.0 == Self::REALTIME.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_realtime() {
            write!(f, "Priority(realtime)")
        } else {
            write!(f, "Priority({})", self.0)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Priority {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Priority({})", self.0);
    }
}

/// Macro to create compile-time priority constants
#[macro_export]
macro_rules! priority {
    (realtime) => {
        $crate::Priority::REALTIME
    };
    ($value:literal) => {
        $crate::Priority::new_unchecked($value)
    };
}
