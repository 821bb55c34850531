//! Task descriptors and the work capability

use core::fmt;
use fcs_core::{CycleClock, Priority, SchedulerConfig, TaskMask, Timeline};

use crate::{TaskSnapshot, TaskStats};

/// Work performed by a scheduled task
///
/// # Contract
///
/// - [`run`](TaskWork::run) is invoked synchronously and must return. It must
///   not block indefinitely and must not allocate. A call that never returns
///   stalls the whole flight loop; only a hardware watchdog recovers from that.
/// - Calls are never nested: the scheduler does not re-enter a task.
/// - [`poll`](TaskWork::poll) is the optional readiness predicate used for
///   event-driven work ("data available"). The default reports always ready.
pub trait TaskWork {
    /// Perform the task's effect to completion
    fn run(&mut self);

    /// Check whether the task has work pending
    fn poll(&mut self) -> bool {
        true
    }
}

/// Task backed by plain function pointers
///
/// Matches the firmware registry style where every task is a free function
/// operating on its own static state.
#[derive(Clone, Copy)]
pub struct FnTask {
    work: fn(),
    poll: Option<fn() -> bool>,
}

impl FnTask {
    /// Task without a readiness predicate
    pub const fn new(work: fn()) -> Self {
        Self { work, poll: None }
    }

    /// Task gated by a readiness predicate
    pub const fn with_poll(work: fn(), poll: fn() -> bool) -> Self {
        Self {
            work,
            poll: Some(poll),
        }
    }
}

impl TaskWork for FnTask {
    fn run(&mut self) {
        (self.work)()
    }

    fn poll(&mut self) -> bool {
        self.poll.map_or(true, |poll| poll())
    }
}

/// Stable task identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u8);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "task#{}", self.0);
    }
}

/// A schedulable unit of work
pub struct Task<'a> {
    id: TaskId,
    name: &'static str,
    priority: Priority,
    mask: TaskMask,
    period_us: u32,
    work: &'a mut dyn TaskWork,
    stats: TaskStats,
}

impl<'a> Task<'a> {
    /// Create a task that runs in every context, as often as admitted
    pub fn new(id: TaskId, name: &'static str, priority: Priority, work: &'a mut dyn TaskWork) -> Self {
        Self {
            id,
            name,
            priority,
            mask: TaskMask::ALWAYS,
            period_us: 0,
            work,
            stats: TaskStats::new(),
        }
    }

    /// Restrict the flight contexts the task runs in
    pub fn with_mask(mut self, mask: TaskMask) -> Self {
        self.mask = mask;
        self
    }

    /// Minimum microseconds between runs; 0 runs as often as admitted
    pub fn with_period_us(mut self, period_us: u32) -> Self {
        self.period_us = period_us;
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn mask(&self) -> TaskMask {
        self.mask
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    /// Statistics are owned by the scheduler; mutate only from its thread
    pub fn stats_mut(&mut self) -> &mut TaskStats {
        &mut self.stats
    }

    /// Evaluate the task's readiness predicate
    pub fn poll(&mut self) -> bool {
        self.work.poll()
    }

    /// Run the task to completion and record its timing
    ///
    /// The start stamp, extended through `timeline`, becomes the new last-run
    /// time before the work is invoked. Returns the observed runtime in cycles.
    pub fn execute<C: CycleClock>(&mut self, clock: &C, timeline: &mut Timeline, config: &SchedulerConfig) -> u32 {
        let start = clock.now();
        self.stats.mark_started(timeline.extend(start));
        self.work.run();
        let elapsed = clock.elapsed_since(start);
        self.stats.record_runtime(elapsed, config.runtime_margin);
        elapsed
    }

    /// Capture the task's statistics in microseconds
    pub fn snapshot<C: CycleClock>(&self, clock: &C) -> TaskSnapshot {
        TaskSnapshot::capture(self, clock)
    }
}

impl fmt::Debug for Task<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("mask", &self.mask)
            .field("period_us", &self.period_us)
            .field("stats", &self.stats)
            .finish()
    }
}
