//! Diagnostics view of task statistics

use fcs_core::{CycleClock, Priority};

use crate::{Task, TaskId};

/// Point-in-time copy of a task's statistics, converted to microseconds
///
/// Runtime fields of a task that has never run read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub name: &'static str,
    pub priority: Priority,
    /// Extended counter value of the last run start in microseconds,
    /// truncated to 32 bits
    pub last_us: u32,
    pub current_us: u32,
    pub min_us: u32,
    pub avg_us: u32,
    pub max_us: u32,
    pub worst_us: u32,
    pub run_count: u32,
}

impl TaskSnapshot {
    /// Capture a task's current statistics
    pub fn capture<C: CycleClock>(task: &Task<'_>, clock: &C) -> Self {
        let stats = task.stats();
        let to_us = |cycles: u32| clock.cycles_to_us(cycles);

        Self {
            id: task.id(),
            name: task.name(),
            priority: task.priority(),
            last_us: stats
                .last_run
                .map_or(0, |start| (start / u64::from(clock.ticks_per_us().max(1))) as u32),
            current_us: to_us(stats.runtime_current),
            min_us: if stats.has_run() { to_us(stats.runtime_min) } else { 0 },
            avg_us: to_us(stats.runtime_avg),
            max_us: to_us(stats.runtime_max),
            worst_us: to_us(stats.runtime_worst),
            run_count: stats.run_count,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskSnapshot {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{=str}: last {}us cur {}us min {}us avg {}us max {}us worst {}us",
            self.name,
            self.last_us,
            self.current_us,
            self.min_us,
            self.avg_us,
            self.max_us,
            self.worst_us
        );
    }
}
