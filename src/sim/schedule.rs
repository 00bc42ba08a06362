//! Cancellable one-shot timers
//!
//! Every delayed effect goes through a `TaskQueue` owned by whoever will
//! handle it. Scheduling returns a `TaskToken`; cancelling a token (or the
//! whole queue) removes the task synchronously, so a task can never fire after
//! its owner moved on. Tokens are never reused.
//!
//! Due tasks are popped one at a time so a handler that cancels the rest of
//! the queue takes effect before the next pop.

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

#[derive(Debug)]
struct Pending<T> {
    token: TaskToken,
    due_ms: u64,
    task: T,
}

/// Cooperative timer queue driven by an external clock
#[derive(Debug)]
pub struct TaskQueue<T> {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Queue clock
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Run `task` once `delay_ms` of queue time has passed
    pub fn schedule(&mut self, delay_ms: u32, task: T) -> TaskToken {
        let token = TaskToken(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            token,
            due_ms: self.now_ms + delay_ms as u64,
            task,
        });
        token
    }

    /// Drop a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: TaskToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.token != token);
        self.pending.len() != before
    }

    /// Drop every pending task, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.pending.iter().any(|p| p.token == token)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move the clock forward; nothing fires until `pop_due`
    pub fn advance(&mut self, delta_ms: u32) {
        self.now_ms += delta_ms as u64;
    }

    /// Earliest task whose due time has passed (ties in scheduling order)
    pub fn pop_due(&mut self) -> Option<(TaskToken, T)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= self.now_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.token))
            .map(|(i, _)| i)?;
        let p = self.pending.swap_remove(idx);
        Some((p.token, p.task))
    }
}
