//! Loop environment: the externally owned inputs of each iteration
//!
//! The adaptive loop-period estimate and the flight-state flags belong to
//! other subsystems. The scheduler only reads them, once per iteration.

use core::cell::Cell;
use critical_section::Mutex;
use fcs_core::FlightFlags;

/// Inputs sampled at the top of an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopInputs {
    /// Current adaptive loop period, in microseconds
    pub looptime_us: u32,
    /// Current flight-state flags
    pub flags: FlightFlags,
}

#[cfg(feature = "defmt")]
impl defmt::Format for LoopInputs {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "LoopInputs{{looptime: {}us, flags: {}}}", self.looptime_us, self.flags);
    }
}

/// Source of per-iteration inputs
///
/// `begin_iteration` is called exactly once at the top of each iteration. It
/// is the hook where an external loop-period estimator gets updated.
pub trait LoopEnvironment {
    fn begin_iteration(&mut self) -> LoopInputs;
}

impl<E: LoopEnvironment + ?Sized> LoopEnvironment for &mut E {
    fn begin_iteration(&mut self) -> LoopInputs {
        (**self).begin_iteration()
    }
}

/// Constant loop period and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLooptime {
    pub looptime_us: u32,
    pub flags: FlightFlags,
}

impl FixedLooptime {
    pub const fn new(looptime_us: u32) -> Self {
        Self {
            looptime_us,
            flags: FlightFlags::GROUNDED,
        }
    }

    pub const fn with_flags(mut self, flags: FlightFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl LoopEnvironment for FixedLooptime {
    fn begin_iteration(&mut self) -> LoopInputs {
        LoopInputs {
            looptime_us: self.looptime_us,
            flags: self.flags,
        }
    }
}

/// Loop inputs shared with interrupt handlers and other subsystems
///
/// Writers and the scheduler meet inside short critical sections, so a
/// `static` instance is sound on a single core with interrupts.
pub struct SharedLoopState {
    looptime_us: Mutex<Cell<u32>>,
    flags: Mutex<Cell<FlightFlags>>,
}

impl SharedLoopState {
    /// Create the shared state with an initial loop period
    pub const fn new(looptime_us: u32) -> Self {
        Self {
            looptime_us: Mutex::new(Cell::new(looptime_us)),
            flags: Mutex::new(Cell::new(FlightFlags::GROUNDED)),
        }
    }

    /// Publish a new loop-period estimate
    pub fn set_looptime_us(&self, looptime_us: u32) {
        critical_section::with(|cs| self.looptime_us.borrow(cs).set(looptime_us));
    }

    pub fn looptime_us(&self) -> u32 {
        critical_section::with(|cs| self.looptime_us.borrow(cs).get())
    }

    /// Publish new flight flags
    pub fn set_flags(&self, flags: FlightFlags) {
        critical_section::with(|cs| self.flags.borrow(cs).set(flags));
    }

    pub fn set_armed(&self, armed: bool) {
        critical_section::with(|cs| {
            let cell = self.flags.borrow(cs);
            cell.set(FlightFlags { armed, ..cell.get() });
        });
    }

    pub fn set_in_air(&self, in_air: bool) {
        critical_section::with(|cs| {
            let cell = self.flags.borrow(cs);
            cell.set(FlightFlags { in_air, ..cell.get() });
        });
    }

    pub fn flags(&self) -> FlightFlags {
        critical_section::with(|cs| self.flags.borrow(cs).get())
    }

    /// Read both values in one critical section
    pub fn inputs(&self) -> LoopInputs {
        critical_section::with(|cs| LoopInputs {
            looptime_us: self.looptime_us.borrow(cs).get(),
            flags: self.flags.borrow(cs).get(),
        })
    }
}

impl LoopEnvironment for &SharedLoopState {
    fn begin_iteration(&mut self) -> LoopInputs {
        self.inputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SHARED: SharedLoopState = SharedLoopState::new(250);

    #[test]
    fn test_shared_state_round_trip() {
        let shared = SharedLoopState::new(500);
        shared.set_armed(true);
        assert_eq!(shared.flags(), FlightFlags::new(true, false));
        shared.set_in_air(true);
        shared.set_armed(false);
        assert_eq!(shared.flags(), FlightFlags::new(false, true));

        shared.set_looptime_us(125);
        let mut env = &shared;
        let inputs = env.begin_iteration();
        assert_eq!(inputs.looptime_us, 125);
        assert!(inputs.flags.in_air);
    }

    #[test]
    fn test_static_shared_state() {
        assert_eq!(SHARED.looptime_us(), 250);
        assert_eq!(SHARED.flags(), FlightFlags::GROUNDED);
    }

    #[test]
    fn test_fixed_looptime() {
        let mut env = FixedLooptime::new(1000).with_flags(FlightFlags::new(true, true));
        let inputs = env.begin_iteration();
        assert_eq!(inputs.looptime_us, 1000);
        assert!(inputs.flags.armed);
    }
}
