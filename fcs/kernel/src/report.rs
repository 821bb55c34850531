//! Per-iteration diagnostics

/// Summary of one scheduler iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IterationReport {
    /// Tasks that were admitted and executed
    pub tasks_run: u32,
    /// Admission checks performed, across all passes
    pub tasks_considered: u32,
    /// Iteration ran past its deadline
    pub deadline_overrun: bool,
    /// Microseconds between the last task finishing and the sweep ending
    pub load_us: u32,
}

#[cfg(feature = "defmt")]
impl defmt::Format for IterationReport {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "IterationReport{{run: {}, considered: {}, overrun: {}, load: {}us}}",
            self.tasks_run,
            self.tasks_considered,
            self.deadline_overrun,
            self.load_us
        );
    }
}
