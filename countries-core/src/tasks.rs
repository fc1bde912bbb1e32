//! Keyed async tasks whose results come back over a channel.
//!
//! At most one task runs per key: spawning under a key that is already busy
//! aborts the previous task first. Every task reports back exactly once
//! unless it was aborted, including when it panics, so a receiver waiting on
//! a busy manager is always woken.

use std::{collections::HashMap, future::Future, time::Duration};

use tokio::{sync::mpsc, task::AbortHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskKey(&'static str);

impl TaskKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

/// Report sent by a task when it stops.
#[derive(Debug)]
pub struct Finished<T> {
    key: TaskKey,
    id: u64,
    /// `None` when the task panicked.
    output: Option<T>,
}

/// What a [`Finished`] report means to the manager.
#[derive(Debug, PartialEq)]
pub enum Completion<T> {
    Done(T),
    Panicked(TaskKey),
    /// The task was replaced or cancelled after it had already reported.
    Stale,
}

#[derive(Debug)]
pub struct TaskManager<T> {
    tasks: HashMap<TaskKey, (u64, AbortHandle)>,
    next_id: u64,
    tx: mpsc::UnboundedSender<Finished<T>>,
}

impl<T: Send + 'static> TaskManager<T> {
    pub fn new(tx: mpsc::UnboundedSender<Finished<T>>) -> Self {
        Self {
            tasks: HashMap::new(),
            next_id: 0,
            tx,
        }
    }

    /// Spawn `future` under `key`, cancelling whatever ran there before.
    pub fn spawn<F>(&mut self, key: TaskKey, future: F) -> &mut Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.debounce(key, Duration::ZERO, future)
    }

    /// Like [`spawn`](Self::spawn), but waits `delay` before running. A new
    /// call with the same key during the wait restarts the timer.
    pub fn debounce<F>(&mut self, key: TaskKey, delay: Duration, future: F) -> &mut Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.cancel(key);

        self.next_id += 1;
        let id = self.next_id;

        let work = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            future.await
        });
        let abort = work.abort_handle();

        // The watcher outlives a panic in `work` and reports it.
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let output = match work.await {
                Ok(output) => Some(output),
                Err(err) if err.is_cancelled() => return,
                Err(err) => {
                    tracing::error!(task = key.name(), error = %err, "task panicked");
                    None
                }
            };
            let _ = tx.send(Finished { key, id, output });
        });

        self.tasks.insert(key, (id, abort));
        self
    }

    pub fn cancel(&mut self, key: TaskKey) {
        if let Some((_, handle)) = self.tasks.remove(&key) {
            tracing::debug!(task = key.name(), "cancelling task");
            handle.abort();
        }
    }

    /// Accept a report, releasing its key if it came from the current task.
    pub fn finish(&mut self, report: Finished<T>) -> Completion<T> {
        match self.tasks.get(&report.key) {
            Some((id, _)) if *id == report.id => {
                self.tasks.remove(&report.key);
                match report.output {
                    Some(output) => Completion::Done(output),
                    None => Completion::Panicked(report.key),
                }
            }
            _ => Completion::Stale,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T> Drop for TaskManager<T> {
    fn drop(&mut self) {
        for (_, (_, handle)) in self.tasks.drain() {
            handle.abort();
        }
    }
}
