//! The in-memory copy of the user's tasks

use std::collections::HashMap;

use crate::task::Task;

/// Identifies one `list_tasks` request, in the order requests were issued
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Tasks keyed by date key.
///
/// The store is only ever replaced as a whole, with the result of a full fetch: it never holds a half-applied mutation.
/// Lists are kept in server order; ordering is a render-time concern (see [`crate::day`]).
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: HashMap<String, Vec<Task>>,
    issued: u64,
    applied: Option<FetchTicket>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call this right before issuing a fetch
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Replace the whole content with a fetch result.
    ///
    /// Returns `false` (and leaves the store untouched) when a more recently issued fetch has already been applied.
    pub fn apply(&mut self, ticket: FetchTicket, tasks: HashMap<String, Vec<Task>>) -> bool {
        if let Some(applied) = self.applied {
            if ticket < applied {
                log::debug!("Dropping stale fetch {:?} (already showing {:?})", ticket, applied);
                return false;
            }
        }
        self.tasks = tasks;
        self.applied = Some(ticket);
        true
    }

    /// Forget everything, e.g. when the session ends
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.applied = None;
    }

    /// Tasks filed under a date key, in no particular order
    pub fn day(&self, date_key: &str) -> &[Task] {
        self.tasks.get(date_key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn find(&self, id: crate::task::TaskId) -> Option<&Task> {
        self.tasks.values().flatten().find(|task| task.id() == id)
    }

    /// Total number of tasks
    pub fn len(&self) -> usize {
        self.tasks.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a fetch has ever been applied
    pub fn is_loaded(&self) -> bool {
        self.applied.is_some()
    }
}
