//! Priority-ordered task queue

use fcs_core::{SchedError, SchedResult};
use heapless::Vec;

use crate::{Task, TaskId};

/// Compile-time guard that a registry array fits a queue
struct CapacityCheck<const R: usize, const N: usize>;

impl<const R: usize, const N: usize> CapacityCheck<R, N> {
    const FITS: () = assert!(R <= N, "task registry is larger than the task queue capacity");
}

/// Fixed-capacity task queue
///
/// Tasks are kept in non-increasing priority order. Among equal priorities
/// the first registered stays first. Each identity appears at most once and
/// nothing is ever removed.
pub struct TaskQueue<'a, const N: usize> {
    tasks: Vec<Task<'a>, N>,
}

impl<'a, const N: usize> TaskQueue<'a, N> {
    /// Create a new empty queue
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Build a queue from a registry of known size
    ///
    /// A registry longer than `N` is rejected at compile time. Duplicate
    /// identities are logged and dropped.
    pub fn from_array<const R: usize>(registry: [Task<'a>; R]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = CapacityCheck::<R, N>::FITS;
        Self::from_registry(registry)
    }

    /// Build a queue from any registry
    ///
    /// Entries that do not fit or repeat an identity are logged and dropped.
    pub fn from_registry<I>(registry: I) -> Self
    where
        I: IntoIterator<Item = Task<'a>>,
    {
        let mut queue = Self::new();
        for task in registry {
            let id = task.id().0;
            let name = task.name();
            match queue.push(task) {
                Ok(()) => fcs_core::debug!("task {} ({}) registered", name, id),
                Err(SchedError::DuplicateTask) => {
                    fcs_core::warn!("task {} ({}) dropped: duplicate identity", name, id)
                }
                Err(_) => fcs_core::warn!("task {} ({}) dropped: queue full", name, id),
            }
        }
        queue
    }

    /// Insert a task, preserving descending priority order
    ///
    /// Fails if the queue is at capacity or the identity is already present.
    pub fn push(&mut self, task: Task<'a>) -> SchedResult<()> {
        if self.tasks.is_full() {
            return Err(SchedError::QueueFull);
        }
        if self.contains(task.id()) {
            return Err(SchedError::DuplicateTask);
        }

        let index = self
            .tasks
            .iter()
            .position(|queued| queued.priority() < task.priority())
            .unwrap_or(self.tasks.len());

        self.tasks.insert(index, task).map_err(|_| SchedError::QueueFull)
    }

    /// Check whether a task identity is queued
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id() == id)
    }

    /// Queue position of a task identity
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }

    /// Get a task by queue position
    pub fn get(&self, index: usize) -> Option<&Task<'a>> {
        self.tasks.get(index)
    }

    /// Get a mutable task by queue position
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Task<'a>> {
        self.tasks.get_mut(index)
    }

    /// Find a task by identity
    pub fn find(&self, id: TaskId) -> Option<&Task<'a>> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Find a mutable task by identity
    pub fn find_mut(&mut self, id: TaskId) -> Option<&mut Task<'a>> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    /// Iterate in queue order
    pub fn iter(&self) -> impl Iterator<Item = &Task<'a>> + '_ {
        self.tasks.iter()
    }

    /// Iterate mutably in queue order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Task<'a>> + '_ {
        self.tasks.iter_mut()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Check if the queue is full
    pub fn is_full(&self) -> bool {
        self.tasks.is_full()
    }

    /// Get the number of queued tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Get the maximum capacity of the queue
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for TaskQueue<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
