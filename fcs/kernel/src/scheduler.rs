//! Scheduler loop

use fcs_core::{CycleClock, SchedResult, SchedulerConfig, Timeline};
use fcs_task::{TaskQueue, TaskSnapshot};

use crate::admission::{self, IterationFrame};
use crate::{IterationReport, LoopEnvironment, RoundRobin};

/// Cooperative budgeted scheduler
///
/// Owns the task queue, the clock and all scheduling state. A single
/// instance is created at startup and driven from the main loop; nothing
/// here is shared with other threads of control.
pub struct Scheduler<'a, C, const N: usize> {
    queue: TaskQueue<'a, N>,
    clock: C,
    timeline: Timeline,
    config: SchedulerConfig,
    cursor: RoundRobin,
    cpu_load_us: u32,
    iterations: u32,
}

impl<'a, C: CycleClock, const N: usize> Scheduler<'a, C, N> {
    /// Create a scheduler with the default tuning
    pub fn new(queue: TaskQueue<'a, N>, clock: C) -> Self {
        Self {
            queue,
            clock,
            timeline: Timeline::new(),
            config: SchedulerConfig::DEFAULT,
            cursor: RoundRobin::new(),
            cpu_load_us: 0,
            iterations: 0,
        }
    }

    /// Create a scheduler with custom tuning
    pub fn with_config(queue: TaskQueue<'a, N>, clock: C, config: SchedulerConfig) -> SchedResult<Self> {
        config.validate()?;
        let mut scheduler = Self::new(queue, clock);
        scheduler.config = config;
        Ok(scheduler)
    }

    /// Iteration deadline in cycles for a loop period
    pub fn deadline_cycles(&self, looptime_us: u32) -> u32 {
        self.clock.us_to_cycles(self.config.deadline_us(looptime_us))
    }

    /// Run one loop iteration
    ///
    /// Keeps sweeping the queue while a full pass has not yet been made since
    /// the iteration began, or while time remains before the deadline. Every
    /// task is therefore considered at least once, even when the deadline has
    /// already passed.
    pub fn run_iteration<E: LoopEnvironment>(&mut self, env: &mut E) -> IterationReport {
        let start = self.clock.now();
        let start_ticks = self.timeline.extend(start);
        let inputs = env.begin_iteration();

        let frame = IterationFrame {
            start,
            start_ticks,
            context: inputs.flags.context_mask(),
            deadline_cycles: self.deadline_cycles(inputs.looptime_us),
        };

        self.iterations = self.iterations.wrapping_add(1);
        let mut report = IterationReport::default();

        let len = self.queue.len();
        if len == 0 {
            self.cpu_load_us = 0;
            return report;
        }

        let mut last_progress = start;
        let mut visited = 0usize;
        while visited < len || self.clock.elapsed_since(start) < frame.deadline_cycles {
            let (index, _) = self.cursor.advance(len);
            visited += 1;

            if let Some(task) = self.queue.get_mut(index) {
                report.tasks_considered += 1;
                if !admission::evaluate(task, &self.clock, &frame, &self.config).is_admitted() {
                    continue;
                }

                task.execute(&self.clock, &mut self.timeline, &self.config);
                report.tasks_run += 1;
                last_progress = self.clock.now();
            }
        }

        let now = self.clock.now();
        let elapsed = now.elapsed_since(start);
        report.deadline_overrun = elapsed > frame.deadline_cycles;
        if report.deadline_overrun {
            fcs_core::trace!("iteration overran deadline by {} cycles", elapsed - frame.deadline_cycles);
        }

        self.cpu_load_us = self.clock.cycles_to_us(now.elapsed_since(last_progress));
        report.load_us = self.cpu_load_us;
        report
    }

    /// Drive the scheduler forever
    pub fn run<E: LoopEnvironment>(&mut self, mut env: E) -> ! {
        fcs_core::info!("scheduler running {} tasks", self.queue.len());
        loop {
            self.run_iteration(&mut env);
        }
    }

    /// Statistics of every task in queue order
    pub fn snapshot(&self) -> impl Iterator<Item = TaskSnapshot> + use<'_, 'a, C, N> {
        self.queue.iter().map(move |task| task.snapshot(&self.clock))
    }

    /// Time between the last task run and the end of the previous sweep
    pub fn cpu_load_us(&self) -> u32 {
        self.cpu_load_us
    }

    /// Current round-robin position
    pub fn cursor(&self) -> usize {
        self.cursor.position()
    }

    /// Iterations run so far
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Queued tasks in priority order
    pub fn tasks(&self) -> &TaskQueue<'a, N> {
        &self.queue
    }

    /// Clock the scheduler reads
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Active tuning
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}
