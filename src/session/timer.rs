//! One-shot delayed tasks owned by a module instance.
//!
//! Tasks live inside the module that scheduled them and are drained from the
//! shell's tick. Re-initialising a module cancels everything it had pending,
//! and dropping the module drops the queue with it, so a callback can never
//! land on a replaced instance.

use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct TaskId;
}

#[derive(Debug)]
struct Scheduled<T> {
    deadline: Instant,
    task: T,
}

#[derive(Debug)]
pub struct FeedbackTimers<T> {
    tasks: SlotMap<TaskId, Scheduled<T>>,
}

impl<T> Default for FeedbackTimers<T> {
    fn default() -> Self {
        Self {
            tasks: SlotMap::with_key(),
        }
    }
}

impl<T> FeedbackTimers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        self.schedule_at(Instant::now() + delay, task)
    }

    pub fn schedule_at(&mut self, deadline: Instant, task: T) -> TaskId {
        self.tasks.insert(Scheduled { deadline, task })
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Remove and return every task whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<(Instant, TaskId)> = self
            .tasks
            .iter()
            .filter(|(_, s)| s.deadline <= now)
            .map(|(id, s)| (s.deadline, id))
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter()
            .filter_map(|(_, id)| self.tasks.remove(id))
            .map(|s| s.task)
            .collect()
    }
}
