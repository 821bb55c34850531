//! Task queue and execution tests for fcs-task

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};

use proptest::prelude::*;

use fcs_task::{
    CycleClock, Cycles, FnTask, Priority, SchedError, SchedulerConfig, Task, TaskId, TaskQueue,
    TaskWork, Timeline,
};

struct Nop;

impl TaskWork for Nop {
    fn run(&mut self) {}
}

/// Clock that only moves when a task burns time
struct StepClock {
    now: Cell<u32>,
}

impl StepClock {
    fn new(start: u32) -> Self {
        Self { now: Cell::new(start) }
    }

    fn burn(&self, cycles: u32) {
        self.now.set(self.now.get().wrapping_add(cycles));
    }
}

impl CycleClock for StepClock {
    fn now(&self) -> Cycles {
        Cycles(self.now.get())
    }

    fn ticks_per_us(&self) -> u32 {
        10
    }
}

struct Burner<'c> {
    clock: &'c StepClock,
    cost: u32,
}

impl TaskWork for Burner<'_> {
    fn run(&mut self) {
        self.clock.burn(self.cost);
    }
}

fn assert_sorted(queue: &TaskQueue<'_, 16>) {
    let priorities: Vec<Priority> = queue.iter().map(|task| task.priority()).collect();
    assert!(
        priorities.windows(2).all(|pair| pair[0] >= pair[1]),
        "queue not sorted: {:?}",
        priorities
    );
}

fn ids(queue: &TaskQueue<'_, 16>) -> Vec<u8> {
    queue.iter().map(|task| task.id().0).collect()
}

proptest! {
    #[test]
    fn test_queue_order_for_any_insertion_sequence(
        entries in prop::collection::vec((0u8..20, 1u8..=6), 0..28)
    ) {
        let mut workers: Vec<Nop> = entries.iter().map(|_| Nop).collect();
        let mut queue: TaskQueue<16> = TaskQueue::new();
        // Expected (id, priority) order: descending priority, first come first.
        let mut expected: Vec<(u8, u8)> = Vec::new();

        for (&(id, raw), work) in entries.iter().zip(workers.iter_mut()) {
            let before = ids(&queue);
            let result = queue.push(Task::new(TaskId(id), "task", Priority::new_unchecked(raw), work));

            if expected.len() == 16 {
                prop_assert_eq!(result, Err(SchedError::QueueFull));
                prop_assert_eq!(ids(&queue), before);
            } else if expected.iter().any(|&(queued, _)| queued == id) {
                prop_assert_eq!(result, Err(SchedError::DuplicateTask));
                prop_assert_eq!(ids(&queue), before);
            } else {
                prop_assert_eq!(result, Ok(()));
                let at = expected.iter().position(|&(_, p)| p < raw).unwrap_or(expected.len());
                expected.insert(at, (id, raw));
            }

            let priorities: Vec<u8> = queue.iter().map(|task| task.priority().raw()).collect();
            prop_assert!(priorities.windows(2).all(|pair| pair[0] >= pair[1]), "not sorted: {:?}", priorities);
            let expected_ids: Vec<u8> = expected.iter().map(|&(id, _)| id).collect();
            prop_assert_eq!(ids(&queue), expected_ids);
        }
    }
}

#[test]
fn test_duplicate_insertion_leaves_order_untouched() {
    let mut workers: Vec<Nop> = (0..5).map(|_| Nop).collect();
    let (first, rest) = workers.split_at_mut(4);
    let mut queue: TaskQueue<16> = TaskQueue::new();

    for (id, work) in first.iter_mut().enumerate() {
        let priority = Priority::new_unchecked(10 - id as u8 * 2);
        queue.push(Task::new(TaskId(id as u8), "task", priority, work)).unwrap();
    }
    let before: Vec<TaskId> = queue.iter().map(|task| task.id()).collect();

    let duplicate = Task::new(TaskId(2), "again", Priority::REALTIME, &mut rest[0]);
    assert_eq!(queue.push(duplicate), Err(SchedError::DuplicateTask));

    let after: Vec<TaskId> = queue.iter().map(|task| task.id()).collect();
    assert_eq!(before, after);
    assert_sorted(&queue);
}

#[test]
fn test_from_registry_drops_overflow_and_duplicates() {
    let mut workers: Vec<Nop> = (0..4).map(|_| Nop).collect();
    let mut iter = workers.iter_mut();
    let registry = [
        Task::new(TaskId(0), "a", Priority::LOW, iter.next().unwrap()),
        Task::new(TaskId(0), "a-dup", Priority::HIGH, iter.next().unwrap()),
        Task::new(TaskId(1), "b", Priority::MEDIUM, iter.next().unwrap()),
        Task::new(TaskId(2), "c", Priority::HIGH, iter.next().unwrap()),
    ];

    let queue: TaskQueue<2> = TaskQueue::from_registry(registry);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.get(0).unwrap().name(), "b");
    assert_eq!(queue.get(1).unwrap().name(), "a");
}

#[test]
fn test_from_array_within_capacity() {
    let (mut a, mut b) = (Nop, Nop);
    let queue: TaskQueue<4> = TaskQueue::from_array([
        Task::new(TaskId(0), "osd", Priority::LOW, &mut a),
        Task::new(TaskId(1), "gyro", Priority::REALTIME, &mut b),
    ]);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.capacity(), 4);
    assert_eq!(queue.get(0).unwrap().name(), "gyro");
}

#[test]
fn test_execute_records_start_and_runtime() {
    let clock = StepClock::new(1_000);
    let mut work = Burner { clock: &clock, cost: 640 };
    let mut task = Task::new(TaskId(3), "rx", Priority::HIGH, &mut work);

    let elapsed = task.execute(&clock, &mut Timeline::new(), &SchedulerConfig::DEFAULT);

    assert_eq!(elapsed, 640);
    let stats = task.stats();
    assert_eq!(stats.last_run, Some(1_000));
    assert_eq!(stats.runtime_current, 640);
    assert_eq!(stats.runtime_avg, 20);
    assert_eq!(stats.runtime_worst, 25);
}

#[test]
fn test_snapshot_in_microseconds() {
    let clock = StepClock::new(5_000);
    let mut work = Burner { clock: &clock, cost: 3_200 };
    let mut task = Task::new(TaskId(4), "blackbox", Priority::LOW, &mut work);

    let fresh = task.snapshot(&clock);
    assert_eq!(fresh.min_us, 0);
    assert_eq!(fresh.run_count, 0);

    task.execute(&clock, &mut Timeline::new(), &SchedulerConfig::DEFAULT);
    let snap = task.snapshot(&clock);
    assert_eq!(snap.name, "blackbox");
    assert_eq!(snap.last_us, 500);
    assert_eq!(snap.current_us, 320);
    assert_eq!(snap.min_us, 320);
    assert_eq!(snap.max_us, 320);
    assert_eq!(snap.avg_us, 10);
    assert_eq!(snap.worst_us, 12);
    assert_eq!(snap.run_count, 1);
}

static RUNS: AtomicU32 = AtomicU32::new(0);
static READY: AtomicU32 = AtomicU32::new(0);

fn count_run() {
    RUNS.fetch_add(1, Ordering::SeqCst);
}

fn data_ready() -> bool {
    READY.load(Ordering::SeqCst) != 0
}

#[test]
fn test_fn_task_poll() {
    let mut plain = FnTask::new(count_run);
    assert!(plain.poll());

    let mut gated = FnTask::with_poll(count_run, data_ready);
    assert!(!gated.poll());
    READY.store(1, Ordering::SeqCst);
    assert!(gated.poll());

    gated.run();
    plain.run();
    assert_eq!(RUNS.load(Ordering::SeqCst), 2);
}
