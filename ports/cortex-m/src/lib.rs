#![no_std]
#![forbid(unsafe_code)]

//! Cortex-M port for the FCS scheduler
//!
//! Supplies the scheduler's time source from the DWT cycle counter, which
//! runs at the core clock and wraps every `2^32` cycles (about 25 seconds at
//! 168 MHz). Interrupt masking for shared loop state comes from the
//! `cortex-m` single-core critical-section implementation.

use cortex_m::peripheral::{DCB, DWT};
use fcs_core::{CycleClock, Cycles, SchedError, SchedResult};

/// Cycle clock backed by the DWT cycle counter
#[derive(Debug, Clone, Copy)]
pub struct DwtClock {
    ticks_per_us: u32,
}

impl DwtClock {
    /// Enable tracing and the cycle counter, then wrap them as a clock
    ///
    /// `sysclk_hz` is the core clock frequency and must be at least 1 MHz.
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, sysclk_hz: u32) -> SchedResult<Self> {
        let ticks_per_us = sysclk_hz / 1_000_000;
        if ticks_per_us == 0 {
            return Err(SchedError::InvalidConfig);
        }
        if !DWT::has_cycle_counter() {
            fcs_core::error!("core has no DWT cycle counter");
            return Err(SchedError::InvalidConfig);
        }

        dcb.enable_trace();
        dwt.enable_cycle_counter();
        fcs_core::info!("DWT clock at {} ticks/us", ticks_per_us);
        Ok(Self { ticks_per_us })
    }
}

impl CycleClock for DwtClock {
    fn now(&self) -> Cycles {
        Cycles(DWT::cycle_count())
    }

    fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }
}

/// Sleep until the next interrupt
///
/// For boards that pace the loop from a gyro data-ready interrupt and want to
/// idle between iterations.
pub fn wait_for_interrupt() {
    cortex_m::asm::wfi();
}
