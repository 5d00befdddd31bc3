//! Post-layout callback queue with a bounded retry count.
//!
//! Some widget state (focus, text selection) only sticks if it is applied
//! after the toolkit has finished laying out a freshly shown widget. Those
//! requests are posted here and run once per frame after layout. A handler
//! that reports `Flow::Retry` gets the request back next frame until its
//! retry budget runs out.

use std::collections::VecDeque;

/// What a handler wants done with the request it just ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// The target condition holds; forget the request.
    Done,
    /// Try again next frame if budget remains.
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending<T> {
    task: T,
    retries_left: u32,
}

/// FIFO of deferred tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredQueue<T> {
    pending: VecDeque<Pending<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }
}

impl<T: PartialEq> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` with `retries` extra attempts after the first.
    ///
    /// Posting a task equal to one already queued refreshes its budget
    /// instead of stacking a duplicate.
    pub fn post(&mut self, task: T, retries: u32) {
        if let Some(existing) = self.pending.iter_mut().find(|p| p.task == task) {
            existing.retries_left = existing.retries_left.max(retries);
            return;
        }
        self.pending.push_back(Pending {
            task,
            retries_left: retries,
        });
    }

    /// Run every task queued before this call once.
    ///
    /// Returns how many tasks were run.
    pub fn run_pending(&mut self, mut handler: impl FnMut(&T) -> Flow) -> usize {
        let batch: Vec<Pending<T>> = self.pending.drain(..).collect();
        let ran = batch.len();
        for mut item in batch {
            if handler(&item.task) == Flow::Retry && item.retries_left > 0 {
                item.retries_left -= 1;
                self.pending.push_back(item);
            }
        }
        ran
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything; used when the owning widget goes away.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remaining retries of a queued task, if present.
    pub fn retries_left(&self, task: &T) -> Option<u32> {
        self.pending
            .iter()
            .find(|p| &p.task == task)
            .map(|p| p.retries_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_removes_task() {
        let mut q = DeferredQueue::new();
        q.post("focus", 5);
        assert_eq!(q.run_pending(|_| Flow::Done), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn test_retry_is_bounded() {
        let mut q = DeferredQueue::new();
        q.post("focus", 3);
        let mut runs = 0;
        while !q.is_empty() {
            q.run_pending(|_| {
                runs += 1;
                Flow::Retry
            });
        }
        // first attempt + 3 retries
        assert_eq!(runs, 4);
    }

    #[test]
    fn test_retry_decrements_budget() {
        let mut q = DeferredQueue::new();
        q.post(1u8, 2);
        q.run_pending(|_| Flow::Retry);
        assert_eq!(q.retries_left(&1), Some(1));
    }

    #[test]
    fn test_duplicate_post_refreshes_budget() {
        let mut q = DeferredQueue::new();
        q.post('a', 1);
        q.post('a', 4);
        assert_eq!(q.len(), 1);
        assert_eq!(q.retries_left(&'a'), Some(4));
    }

    #[test]
    fn test_tasks_posted_during_run_wait_for_next_frame() {
        let mut q = DeferredQueue::new();
        q.post(1, 0);
        let mut seen = Vec::new();
        q.run_pending(|t| {
            seen.push(*t);
            Flow::Done
        });
        q.post(2, 0);
        assert_eq!(seen, vec![1]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut q = DeferredQueue::new();
        q.post(1, 9);
        q.clear();
        assert!(q.is_empty());
    }
}
