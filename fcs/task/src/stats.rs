//! Per-task runtime statistics

use fcs_core::AVERAGE_SAMPLES;

/// Timing statistics of a single task, in counter cycles
///
/// `runtime_avg` is a leaky integrator, not a windowed mean: the accumulator
/// sheds one average and gains one sample per run, so it settles at
/// `AVERAGE_SAMPLES` times a steady runtime without keeping any history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Extended counter value at the start of the most recent run, `None`
    /// until the first run
    pub last_run: Option<u64>,
    /// Runtime of the most recent run
    pub runtime_current: u32,
    /// Shortest observed runtime
    pub runtime_min: u32,
    /// Longest observed runtime
    pub runtime_max: u32,
    /// Smoothed runtime
    pub runtime_avg: u32,
    /// Leaky-integrator accumulator behind `runtime_avg`
    pub runtime_avg_sum: u32,
    /// Predicted upper bound used for admission
    pub runtime_worst: u32,
    /// Completed runs
    pub run_count: u32,
}

impl TaskStats {
    /// Statistics of a task that has never run
    pub const fn new() -> Self {
        Self {
            last_run: None,
            runtime_current: 0,
            runtime_min: u32::MAX,
            runtime_max: 0,
            runtime_avg: 0,
            runtime_avg_sum: 0,
            runtime_worst: 0,
            run_count: 0,
        }
    }

    /// Record the start of a run
    pub fn mark_started(&mut self, start: u64) {
        self.last_run = Some(start);
    }

    /// Fold an observed runtime into the statistics
    ///
    /// The worst case is raised to `runtime_avg * margin` if it fell below;
    /// it is never lowered here.
    pub fn record_runtime(&mut self, runtime: u32, margin: f32) {
        self.runtime_current = runtime;
        self.runtime_min = self.runtime_min.min(runtime);
        self.runtime_max = self.runtime_max.max(runtime);

        self.runtime_avg_sum = self.runtime_avg_sum.saturating_sub(self.runtime_avg).saturating_add(runtime);
        self.runtime_avg = self.runtime_avg_sum / AVERAGE_SAMPLES;

        let padded = (self.runtime_avg as f32 * margin) as u32;
        if self.runtime_worst < padded {
            self.runtime_worst = padded;
        }

        self.run_count = self.run_count.wrapping_add(1);
    }

    /// Shrink the worst case after the task was denied budget
    pub fn decay_worst(&mut self, reduction: f32) {
        self.runtime_worst = (self.runtime_worst as f32 * reduction) as u32;
    }

    /// Check whether the task has run at least once
    pub const fn has_run(&self) -> bool {
        self.last_run.is_some()
    }
}

impl Default for TaskStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "TaskStats{{cur: {}, min: {}, avg: {}, max: {}, worst: {}}}",
            self.runtime_current,
            self.runtime_min,
            self.runtime_avg,
            self.runtime_max,
            self.runtime_worst
        );
    }
}
