//! Upload tracker: the append-only task collection and its state machine.
//!
//! The tracker is pure state. All mutations happen on the UI loop in
//! response to worker events, so no locking is needed; the worker only
//! ever talks to it through the event channel.

use std::path::PathBuf;
use uuid::Uuid;

use crate::{
    models::{Order, ValidationError},
    tasks::{TaskStatus, UploadTask},
};

/// Ordered collection of upload tasks plus the successful results.
#[derive(Debug, Default)]
pub struct UploadTracker {
    /// Tasks in admission order. Append-only, never reordered.
    tasks: Vec<UploadTask>,
    /// Orders from successful uploads, in completion order.
    results: Vec<Order>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a batch of files: one Pending task per path, input order
    /// preserved. Returns the generated ids so the caller can launch
    /// uploads for them.
    pub fn admit(&mut self, paths: Vec<PathBuf>) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            let task = UploadTask::new(path);
            tracing::info!("task admitted: {} ({})", task.display_name, task.id);
            ids.push(task.id);
            self.tasks.push(task);
        }
        ids
    }

    /// Transition a task to Uploading with progress reset to 0.
    /// Terminal tasks are never reopened.
    pub fn mark_uploading(&mut self, id: Uuid) {
        if let Some(t) = self.task_mut(id)
            && !t.status.is_terminal()
        {
            t.status = TaskStatus::Uploading;
            t.progress = 0;
        }
    }

    /// Apply a progress report for one task. Only meaningful while
    /// Uploading; values are clamped to 100 and never move backwards.
    pub fn set_progress(&mut self, id: Uuid, progress: u8) {
        if let Some(t) = self.task_mut(id)
            && t.status == TaskStatus::Uploading
        {
            let progress = progress.min(100);
            if progress > t.progress {
                t.progress = progress;
            }
        }
    }

    /// Mark a task Done with the server's order snapshot. Progress is
    /// forced to 100 and the order is appended to the results list.
    pub fn complete(&mut self, id: Uuid, order: Order) {
        let Some(t) = self.task_mut(id) else {
            return;
        };
        if t.status.is_terminal() {
            return;
        }
        t.status = TaskStatus::Done;
        t.progress = 100;
        t.result = Some(order.clone());
        tracing::info!("task done: {} (asn {})", t.display_name, order.asn_id);
        self.results.push(order);
    }

    /// Mark a task Error. Progress stays at its last reported value.
    pub fn fail(&mut self, id: Uuid, error: ValidationError) {
        if let Some(t) = self.task_mut(id)
            && !t.status.is_terminal()
        {
            t.status = TaskStatus::Error;
            tracing::warn!("task failed: {}: {}", t.display_name, error);
            t.error = Some(error);
        }
    }

    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn results(&self) -> &[Order] {
        &self.results
    }

    pub fn task(&self, id: Uuid) -> Option<&UploadTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Count of tasks in the Done state, for the status bar.
    pub fn done_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count()
    }

    /// Count of tasks still in flight (Pending or Uploading).
    pub fn active_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.status.is_terminal())
            .count()
    }

    fn task_mut(&mut self, id: Uuid) -> Option<&mut UploadTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}
