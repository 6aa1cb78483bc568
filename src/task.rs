//! Tasks and group headers
//!
//! On the wire, a group header is a task whose text starts with [`GROUP_MARKER`](crate::config::GROUP_MARKER).
//! This module is the only place that knows about that convention: the rest of the crate works with [`TaskKind`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::GROUP_MARKER;

/// Server-assigned, monotonically increasing identifier
pub type TaskId = i64;

/// What a task record actually is
#[derive(Clone, Debug, PartialEq)]
pub enum TaskKind {
    /// A section divider. It has no checkbox, and its label names the group of the tasks that follow it.
    /// Headers are created completed; the flag only matters for sorting.
    GroupHeader { label: String, completed: bool },
    /// A regular, actionable task
    Item { text: String, completed: bool, group: Option<String> },
}

/// A task, as known by the [`TaskStore`](crate::store::TaskStore)
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    id: TaskId,
    date: String,
    kind: TaskKind,
}

impl Task {
    pub fn new(id: TaskId, date: String, kind: TaskKind) -> Self {
        Self { id, date, kind }
    }

    pub fn id(&self) -> TaskId      { self.id }
    pub fn date(&self) -> &str      { &self.date }
    pub fn kind(&self) -> &TaskKind { &self.kind }

    pub fn is_group_header(&self) -> bool {
        matches!(self.kind, TaskKind::GroupHeader{ .. })
    }

    pub fn completed(&self) -> bool {
        match &self.kind {
            TaskKind::GroupHeader{ completed, .. } => *completed,
            TaskKind::Item{ completed, .. } => *completed,
        }
    }

    /// The group this record belongs to. A header belongs to the group it names
    pub fn group_name(&self) -> Option<&str> {
        match &self.kind {
            TaskKind::GroupHeader{ label, .. } => Some(label),
            TaskKind::Item{ group, .. } => group.as_deref(),
        }
    }

    /// The text a user sees (and edits): the label for a header, the task text otherwise
    pub fn display_text(&self) -> &str {
        match &self.kind {
            TaskKind::GroupHeader{ label, .. } => label,
            TaskKind::Item{ text, .. } => text,
        }
    }
}


/// A task that does not exist on the server yet
#[derive(Clone, Debug, PartialEq)]
pub struct NewTask {
    date: String,
    kind: TaskKind,
}

impl NewTask {
    /// A new group header. Group headers are always created completed
    pub fn group_header(date: String, label: String) -> Self {
        Self { date, kind: TaskKind::GroupHeader{ label, completed: true } }
    }

    /// A new, not completed, regular task
    pub fn item(date: String, text: String, group: Option<String>) -> Self {
        Self { date, kind: TaskKind::Item{ text, completed: false, group } }
    }

    pub fn date(&self) -> &str      { &self.date }
    pub fn kind(&self) -> &TaskKind { &self.kind }

    pub fn to_wire(&self) -> NewTaskRecord {
        let (text, group_name, completed) = kind_to_wire(&self.kind);
        NewTaskRecord { date: self.date.clone(), text, group_name, completed }
    }
}


/// A task as exchanged with the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub date: String,
    pub text: String,
    #[serde(default)]
    pub group_name: Option<String>,
    /// Some servers send `0`/`1` instead of booleans
    #[serde(default, deserialize_with = "bool_or_int")]
    pub completed: bool,
}

/// Body of a `POST /tasks` request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTaskRecord {
    pub date: String,
    pub text: String,
    pub group_name: Option<String>,
    pub completed: bool,
}

/// Body of a `PUT /tasks/{id}` request. Absent fields are left untouched by the server
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn text(text: String) -> Self {
        Self { text: Some(text), completed: None }
    }

    pub fn completed(completed: bool) -> Self {
        Self { text: None, completed: Some(completed) }
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let kind = match record.text.strip_prefix(GROUP_MARKER) {
            Some(rest) => TaskKind::GroupHeader {
                label: record.group_name.unwrap_or_else(|| rest.trim().to_string()),
                completed: record.completed,
            },
            None => TaskKind::Item {
                text: record.text,
                completed: record.completed,
                group: record.group_name,
            },
        };
        Task::new(record.id, record.date, kind)
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        let (text, group_name, completed) = kind_to_wire(&task.kind);
        TaskRecord { id: task.id, date: task.date.clone(), text, group_name, completed }
    }
}

fn kind_to_wire(kind: &TaskKind) -> (String, Option<String>, bool) {
    match kind {
        TaskKind::GroupHeader{ label, completed } => (format!("{}{}", GROUP_MARKER, label), Some(label.clone()), *completed),
        TaskKind::Item{ text, completed, group } => (text.clone(), group.clone(), *completed),
    }
}

fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<BoolOrInt>::deserialize(deserializer)? {
        None => false,
        Some(BoolOrInt::Bool(b)) => b,
        Some(BoolOrInt::Int(i)) => i != 0,
    })
}
