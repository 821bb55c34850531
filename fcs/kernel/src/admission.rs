//! Admission evaluator
//!
//! Decides whether a candidate task runs now. Checks short-circuit in a fixed
//! order: applicability, already-run, readiness, period, budget.

use fcs_core::{CycleClock, Cycles, SchedulerConfig, TaskMask};
use fcs_task::Task;

/// Per-iteration inputs shared by every admission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationFrame {
    /// Counter value captured at the top of the iteration
    pub start: Cycles,
    /// `start` extended through the scheduler's timeline
    pub start_ticks: u64,
    /// Context mask derived from the flight flags
    pub context: TaskMask,
    /// Budget of the iteration, in cycles from `start`
    pub deadline_cycles: u32,
}

impl IterationFrame {
    /// Signed cycles left before the deadline
    pub fn time_left<C: CycleClock>(&self, clock: &C) -> i64 {
        i64::from(self.deadline_cycles) - i64::from(clock.elapsed_since(self.start))
    }

    /// Current time on the extended timeline
    pub fn now_ticks<C: CycleClock>(&self, clock: &C) -> u64 {
        self.start_ticks + u64::from(clock.elapsed_since(self.start))
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The task runs now
    Admitted,
    /// The task's mask excludes the current flight context
    NotApplicable,
    /// The task already started during this iteration
    AlreadyRan,
    /// The readiness predicate reported nothing to do
    NotReady,
    /// The task's period has not elapsed since its last run
    PeriodPending,
    /// The predicted runtime exceeds the remaining budget
    OverBudget,
}

impl Admission {
    pub const fn is_admitted(self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Admission {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Admission::Admitted => defmt::write!(fmt, "Admitted"),
            Admission::NotApplicable => defmt::write!(fmt, "NotApplicable"),
            Admission::AlreadyRan => defmt::write!(fmt, "AlreadyRan"),
            Admission::NotReady => defmt::write!(fmt, "NotReady"),
            Admission::PeriodPending => defmt::write!(fmt, "PeriodPending"),
            Admission::OverBudget => defmt::write!(fmt, "OverBudget"),
        }
    }
}

/// Evaluate whether `task` may run in the current iteration
///
/// Side effect: a non-realtime task denied for budget has its worst-case
/// estimate decayed by `config.runtime_reduction`, so a starved task becomes
/// admissible again over time.
pub fn evaluate<C: CycleClock>(
    task: &mut Task<'_>,
    clock: &C,
    frame: &IterationFrame,
    config: &SchedulerConfig,
) -> Admission {
    if !task.mask().applies_to(frame.context) {
        return Admission::NotApplicable;
    }

    let last_run = task.stats().last_run;
    if let Some(last) = last_run {
        if last >= frame.start_ticks {
            return Admission::AlreadyRan;
        }
    }

    if !task.poll() {
        return Admission::NotReady;
    }

    if let Some(last) = last_run {
        let period = task.period_us();
        if period != 0 {
            let elapsed = frame.now_ticks(clock).saturating_sub(last);
            if elapsed < u64::from(clock.us_to_cycles(period)) {
                return Admission::PeriodPending;
            }
        }
    }

    if !task.priority().is_realtime() {
        let time_left = frame.time_left(clock);
        if i64::from(task.stats().runtime_worst) > time_left {
            task.stats_mut().decay_worst(config.runtime_reduction);
            fcs_core::trace!("{} denied: worst {} > left", task.name(), task.stats().runtime_worst);
            return Admission::OverBudget;
        }
    }

    Admission::Admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use fcs_core::{FlightFlags, Priority};
    use fcs_task::{TaskId, TaskWork};

    struct TestClock(Cell<u32>);

    impl CycleClock for TestClock {
        fn now(&self) -> Cycles {
            Cycles(self.0.get())
        }

        fn ticks_per_us(&self) -> u32 {
            1
        }
    }

    struct Gate(bool);

    impl TaskWork for Gate {
        fn run(&mut self) {}

        fn poll(&mut self) -> bool {
            self.0
        }
    }

    fn frame(start: u32, deadline: u32) -> IterationFrame {
        IterationFrame {
            start: Cycles(start),
            start_ticks: u64::from(start),
            context: FlightFlags::GROUNDED.context_mask(),
            deadline_cycles: deadline,
        }
    }

    #[test]
    fn test_mask_excluded_task_never_admitted() {
        let clock = TestClock(Cell::new(0));
        let mut work = Gate(true);
        let mut task = Task::new(TaskId(0), "blackbox", Priority::REALTIME, &mut work)
            .with_mask(TaskMask::IN_AIR);

        let decision = evaluate(&mut task, &clock, &frame(0, 1_000), &SchedulerConfig::DEFAULT);
        assert_eq!(decision, Admission::NotApplicable);
    }

    #[test]
    fn test_poll_gates_admission() {
        let clock = TestClock(Cell::new(0));
        let mut work = Gate(false);
        let mut task = Task::new(TaskId(1), "rx", Priority::HIGH, &mut work);

        let decision = evaluate(&mut task, &clock, &frame(0, 1_000), &SchedulerConfig::DEFAULT);
        assert_eq!(decision, Admission::NotReady);
    }

    #[test]
    fn test_time_left_goes_negative() {
        let clock = TestClock(Cell::new(150));
        assert_eq!(frame(100, 20).time_left(&clock), -30);
    }
}
