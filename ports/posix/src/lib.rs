//! POSIX host port for the FCS scheduler
//!
//! Runs the flight loop on a desktop or CI machine: a monotonic cycle clock
//! backed by [`std::time::Instant`], a stop flag wired to Ctrl+C, and a loop
//! driver that hands each iteration's report to the caller.

pub mod clock;
pub mod runner;

pub use clock::StdClock;
pub use runner::{install_stop_handler, is_running, run_until_stopped, stop};
