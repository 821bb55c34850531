//! Loop driver for POSIX hosts

use std::sync::atomic::{AtomicBool, Ordering};

use fcs_core::CycleClock;
use fcs_kernel::{IterationReport, LoopEnvironment, Scheduler};

/// Global running flag
static RUNNING: AtomicBool = AtomicBool::new(true);

/// Stop the loop at the end of the current iteration
pub fn stop() {
    RUNNING.store(false, Ordering::SeqCst);
}

pub fn is_running() -> bool {
    RUNNING.load(Ordering::Relaxed)
}

/// Route Ctrl+C to [`stop`]
pub fn install_stop_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        log::info!("interrupt received, stopping flight loop");
        stop();
    })
}

/// Run iterations until [`stop`] is called
///
/// `on_iteration` sees every report along with the scheduler, and may call
/// [`stop`] itself. Returns the number of iterations run.
pub fn run_until_stopped<'a, C, E, F, const N: usize>(
    scheduler: &mut Scheduler<'a, C, N>,
    mut env: E,
    mut on_iteration: F,
) -> u32
where
    C: CycleClock,
    E: LoopEnvironment,
    F: FnMut(&Scheduler<'a, C, N>, &IterationReport),
{
    RUNNING.store(true, Ordering::SeqCst);
    log::info!("flight loop started with {} tasks", scheduler.tasks().len());

    let mut iterations = 0u32;
    while is_running() {
        let report = scheduler.run_iteration(&mut env);
        iterations = iterations.wrapping_add(1);
        if report.deadline_overrun {
            log::trace!("iteration {} overran its deadline", iterations);
        }
        on_iteration(scheduler, &report);
    }

    log::info!("flight loop stopped after {} iterations", iterations);
    iterations
}
