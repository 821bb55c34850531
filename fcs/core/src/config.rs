//! Scheduler tuning configuration

use crate::{SchedError, SchedResult};

/// Samples folded into the leaky-integrator runtime average
pub const AVERAGE_SAMPLES: u32 = 32;

/// Factor applied to a task's worst-case estimate each time it is denied budget
pub const RUNTIME_REDUCTION: f32 = 0.75;

/// Safety factor applied to the smoothed average when raising the worst case
pub const RUNTIME_MARGIN: f32 = 1.25;

/// Microseconds held back from the loop period when computing the deadline
pub const RUNTIME_BUFFER_US: u32 = 10;

/// Scheduler tuning values
///
/// The defaults are empirically chosen firmware constants. They are kept
/// adjustable rather than replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Decay factor for the worst-case estimate on budget denial, in `(0, 1]`
    pub runtime_reduction: f32,
    /// Padding applied to the average when raising the worst case, `>= 1`
    pub runtime_margin: f32,
    /// Safety buffer subtracted from the loop period, in microseconds
    pub runtime_buffer_us: u32,
}

impl SchedulerConfig {
    /// Firmware default tuning
    pub const DEFAULT: Self = Self {
        runtime_reduction: RUNTIME_REDUCTION,
        runtime_margin: RUNTIME_MARGIN,
        runtime_buffer_us: RUNTIME_BUFFER_US,
    };

    /// Check that every factor is within its valid range
    pub fn validate(&self) -> SchedResult<()> {
        if !(self.runtime_reduction > 0.0 && self.runtime_reduction <= 1.0) {
            return Err(SchedError::InvalidConfig);
        }
        if !(self.runtime_margin >= 1.0 && self.runtime_margin.is_finite()) {
            return Err(SchedError::InvalidConfig);
        }
        Ok(())
    }

    /// Loop deadline in microseconds for a given loop period
    pub const fn deadline_us(&self, looptime_us: u32) -> u32 {
        looptime_us.saturating_sub(self.runtime_buffer_us)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SchedulerConfig {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "SchedulerConfig{{reduction: {}, margin: {}, buffer: {}us}}",
            self.runtime_reduction,
            self.runtime_margin,
            self.runtime_buffer_us
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SchedulerConfig::DEFAULT.validate().is_ok());
        assert_eq!(SchedulerConfig::default(), SchedulerConfig::DEFAULT);
    }

    #[test]
    fn test_rejects_out_of_range_factors() {
        let mut config = SchedulerConfig::DEFAULT;
        config.runtime_reduction = 0.0;
        assert_eq!(config.validate(), Err(SchedError::InvalidConfig));

        config.runtime_reduction = 1.5;
        assert_eq!(config.validate(), Err(SchedError::InvalidConfig));

        config = SchedulerConfig::DEFAULT;
        config.runtime_margin = 0.9;
        assert_eq!(config.validate(), Err(SchedError::InvalidConfig));

        config.runtime_margin = f32::NAN;
        assert_eq!(config.validate(), Err(SchedError::InvalidConfig));
    }

    #[test]
    fn test_deadline_saturates() {
        let config = SchedulerConfig::DEFAULT;
        assert_eq!(config.deadline_us(250), 240);
        assert_eq!(config.deadline_us(5), 0);
    }
}
