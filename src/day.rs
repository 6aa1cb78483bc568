//! The task list of a single day: ordering, grouping and editing
//!
//! A day's tasks come out of the [`TaskStore`](crate::store::TaskStore) unordered. [`render_day`] sorts them with
//! [`compare`] and turns them into a list of [`Row`]s followed by a [`NewTaskInput`].
//! The functions at the bottom of this module decide which request a user edit turns into; they never touch the store
//! themselves, since every mutation is followed by a full refetch.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::config::GROUP_MARKER;
use crate::task::{NewTask, Task, TaskId, TaskKind, TaskUpdate};

/// Placeholder of the trailing input
pub const NEW_TASK_PLACEHOLDER: &str = "+ Add task or ##Group";

/// Case-aware string comparison, used for group names.
///
/// Strings are compared case-insensitively first. Among strings that only differ by case, the first differing
/// character decides, lowercase first. Plain code point order breaks the remaining ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);

    folded_a.cmp(folded_b)
        .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

/// Order in which the tasks of a day are displayed.
///
/// 1. group headers before regular tasks
/// 2. then incomplete before completed
/// 3. then by group name (no group sorts as an empty name)
/// 4. then by ID, i.e. by creation order
///
/// IDs are unique, so no two distinct tasks compare equal.
pub fn compare(a: &Task, b: &Task) -> Ordering {
    b.is_group_header().cmp(&a.is_group_header())
        .then_with(|| a.completed().cmp(&b.completed()))
        .then_with(|| locale_cmp(a.group_name().unwrap_or(""), b.group_name().unwrap_or("")))
        .then_with(|| a.id().cmp(&b.id()))
}

/// The tasks of a day, in display order
pub fn sorted(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| compare(a, b));
    sorted
}


/// One line of a day's task list
#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    /// A section divider, with no checkbox
    GroupHeader { id: TaskId, label: String },
    /// A checkbox and an editable text
    Task { id: TaskId, text: String, completed: bool },
}

impl Row {
    pub fn id(&self) -> TaskId {
        match self {
            Row::GroupHeader{ id, .. } => *id,
            Row::Task{ id, .. } => *id,
        }
    }
}

/// The input that ends every task list, used to add a task (or a `##Group`) to that day
#[derive(Clone, Debug, PartialEq)]
pub struct NewTaskInput {
    pub date_key: String,
    /// Group that a regular task typed here will belong to: the label of the last header above it
    pub group: Option<String>,
    /// Whether this input has the keyboard focus
    pub focused: bool,
}

/// The rendered task list of one day
#[derive(Clone, Debug, PartialEq)]
pub struct DayList {
    pub date_key: String,
    pub rows: Vec<Row>,
    pub input: NewTaskInput,
}

impl DayList {
    /// Group a regular task created from this list would inherit
    pub fn current_group(&self) -> Option<&str> {
        self.input.group.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sort a day's tasks and lay them out
pub fn render_day(date_key: &str, tasks: &[Task], focused: bool) -> DayList {
    let mut rows = Vec::with_capacity(tasks.len());
    let mut last_group = None;

    for task in sorted(tasks) {
        match task.kind() {
            TaskKind::GroupHeader{ label, .. } => {
                last_group = Some(label.clone());
                rows.push(Row::GroupHeader{ id: task.id(), label: label.clone() });
            },
            TaskKind::Item{ text, completed, .. } => {
                rows.push(Row::Task{ id: task.id(), text: text.clone(), completed: *completed });
            },
        }
    }

    DayList {
        date_key: date_key.to_string(),
        rows,
        input: NewTaskInput {
            date_key: date_key.to_string(),
            group: last_group,
            focused,
        },
    }
}

impl Display for DayList {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        for row in &self.rows {
            match row {
                Row::GroupHeader{ label, .. } => writeln!(f, "    -- {} --", label)?,
                Row::Task{ id, text, completed } => {
                    let check = if *completed { "x" } else { " " };
                    writeln!(f, "    [{}] #{:<4} {}", check, id, text)?
                },
            }
        }
        let cursor = if self.input.focused { ">" } else { " " };
        writeln!(f, "  {} {}", cursor, NEW_TASK_PLACEHOLDER)
    }
}


/// What committing an edited task text amounts to
#[derive(Clone, Debug, PartialEq)]
pub enum EditAction {
    /// The text was emptied: the task goes away
    Delete(TaskId),
    /// The text changed
    Update(TaskId, TaskUpdate),
    /// Same text as before: nothing to send
    Nothing,
}

/// Decide what an edit does once the text field loses focus (or the user confirms it).
/// Group headers have no editable text, so editing one does nothing
pub fn commit_edit(task: &Task, input: &str) -> EditAction {
    let current = match task.kind() {
        TaskKind::GroupHeader{ .. } => return EditAction::Nothing,
        TaskKind::Item{ text, .. } => text,
    };

    let new_text = input.trim();
    if new_text.is_empty() {
        EditAction::Delete(task.id())
    } else if new_text == current {
        EditAction::Nothing
    } else {
        EditAction::Update(task.id(), TaskUpdate::text(new_text.to_string()))
    }
}

/// The update a click on the checkbox sends. Group headers have no checkbox
pub fn toggle(task: &Task) -> Option<TaskUpdate> {
    match task.kind() {
        TaskKind::GroupHeader{ .. } => None,
        TaskKind::Item{ completed, .. } => Some(TaskUpdate::completed(!completed)),
    }
}

/// Turn what was typed in a trailing input into a task to create.
///
/// Text starting with the group marker creates a group header labelled with the rest of the text.
/// Anything else creates a regular task in `current_group`. Blank input creates nothing.
pub fn new_task_from_input(date_key: &str, input: &str, current_group: Option<&str>) -> Option<NewTask> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    match text.strip_prefix(GROUP_MARKER) {
        Some(label) => Some(NewTask::group_header(date_key.to_string(), label.trim().to_string())),
        None => Some(NewTask::item(date_key.to_string(), text.to_string(), current_group.map(String::from))),
    }
}


/// A plain-text summary of the regular tasks still to do on a day, grouped under their group names.
///
/// Returns `None` when nothing is pending.
pub fn pending_digest(date_key: &str, username: &str, tasks: &[Task]) -> Option<String> {
    let mut pending: Vec<&Task> = tasks.iter()
        .filter(|task| task.is_group_header() == false && task.completed() == false)
        .collect();
    if pending.is_empty() {
        return None;
    }
    pending.sort_by(|a, b| {
        a.group_name().is_some().cmp(&b.group_name().is_some())
            .then_with(|| locale_cmp(a.group_name().unwrap_or(""), b.group_name().unwrap_or("")))
            .then_with(|| a.id().cmp(&b.id()))
    });

    let mut digest = format!("Hello {},\n\nHere are your pending tasks for {}:\n\n", username, date_key);
    let mut current_group: Option<&str> = None;
    for task in pending {
        if let Some(group) = task.group_name() {
            if current_group != Some(group) {
                current_group = Some(group);
                digest.push_str(&format!("\n--- {} ---\n", group.to_uppercase()));
            }
        }
        digest.push_str(&format!("- {}\n", task.display_text()));
    }
    digest.push_str("\nKeep up the great work!\n");
    Some(digest)
}


#[cfg(test)]
mod tests {
    use super::*;

    const DAY: &str = "2026-10-16";

    fn item(id: TaskId, text: &str, completed: bool, group: Option<&str>) -> Task {
        Task::new(id, DAY.to_string(), TaskKind::Item{ text: text.to_string(), completed, group: group.map(String::from) })
    }

    fn header(id: TaskId, label: &str) -> Task {
        Task::new(id, DAY.to_string(), TaskKind::GroupHeader{ label: label.to_string(), completed: true })
    }

    fn ids(list: &DayList) -> Vec<TaskId> {
        list.rows.iter().map(Row::id).collect()
    }

    #[test]
    fn headers_come_first_then_ungrouped_then_groups() {
        let tasks = vec![
            item(1, "buy milk", false, None),
            header(2, "Work"),
            item(3, "report", false, Some("Work")),
        ];
        let list = render_day(DAY, &tasks, false);
        assert_eq!(list.rows, vec![
            Row::GroupHeader{ id: 2, label: "Work".to_string() },
            Row::Task{ id: 1, text: "buy milk".to_string(), completed: false },
            Row::Task{ id: 3, text: "report".to_string(), completed: false },
        ]);
        assert_eq!(list.current_group(), Some("Work"));
    }

    #[test]
    fn completed_sink_below_incomplete() {
        let tasks = vec![
            item(1, "a", true, None),
            item(2, "b", false, Some("Zoo")),
            item(3, "c", false, None),
            Task::new(4, DAY.to_string(), TaskKind::GroupHeader{ label: "Late".to_string(), completed: false }),
            header(5, "Early"),
        ];
        let list = render_day(DAY, &tasks, false);
        // the incomplete header sorts above the completed one, so "Early" is the last header seen
        assert_eq!(ids(&list), vec![4, 5, 3, 2, 1]);
        assert_eq!(list.current_group(), Some("Early"));
    }

    #[test]
    fn sorting_is_a_total_order() {
        let tasks = vec![
            item(7, "x", false, Some("b")),
            item(3, "y", false, Some("B")),
            item(5, "z", false, Some("b")),
            item(1, "w", true, Some("a")),
            header(9, "b"),
            header(8, "a"),
        ];
        let once: Vec<TaskId> = sorted(&tasks).iter().map(|t| t.id()).collect();

        let mut reversed = tasks.clone();
        reversed.reverse();
        let from_reversed: Vec<TaskId> = sorted(&reversed).iter().map(|t| t.id()).collect();
        assert_eq!(once, from_reversed);
        assert_eq!(once, vec![8, 9, 5, 7, 3, 1]);

        let resorted: Vec<Task> = sorted(&tasks).into_iter().cloned().collect();
        let twice: Vec<TaskId> = sorted(&resorted).iter().map(|t| t.id()).collect();
        assert_eq!(once, twice);

        for a in &tasks {
            for b in &tasks {
                if a.id() != b.id() {
                    assert_ne!(compare(a, b), Ordering::Equal);
                    assert_eq!(compare(a, b), compare(b, a).reverse());
                }
            }
        }
    }

    #[test]
    fn locale_comparison() {
        assert_eq!(locale_cmp("", "a"), Ordering::Less);
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("Work", "work"), Ordering::Greater);
        assert_eq!(locale_cmp("work", "work"), Ordering::Equal);
    }

    #[test]
    fn group_marker_creates_a_header() {
        let new = new_task_from_input(DAY, "##Personal", Some("Work")).unwrap();
        assert_eq!(new.kind(), &TaskKind::GroupHeader{ label: "Personal".to_string(), completed: true });

        let new = new_task_from_input(DAY, "  ##  Errands ", None).unwrap();
        assert_eq!(new.kind(), &TaskKind::GroupHeader{ label: "Errands".to_string(), completed: true });
    }

    #[test]
    fn regular_tasks_inherit_the_last_group() {
        let new = new_task_from_input(DAY, " call mom ", Some("Personal")).unwrap();
        assert_eq!(new.date(), DAY);
        assert_eq!(new.kind(), &TaskKind::Item{ text: "call mom".to_string(), completed: false, group: Some("Personal".to_string()) });

        assert_eq!(new_task_from_input(DAY, "   ", Some("Personal")), None);
        assert_eq!(new_task_from_input(DAY, "", None), None);
    }

    #[test]
    fn committing_edits() {
        let task = item(4, "report", false, Some("Work"));
        assert_eq!(commit_edit(&task, "   "), EditAction::Delete(4));
        assert_eq!(commit_edit(&task, ""), EditAction::Delete(4));
        assert_eq!(commit_edit(&task, " report "), EditAction::Nothing);
        assert_eq!(commit_edit(&task, "final report"), EditAction::Update(4, TaskUpdate::text("final report".to_string())));
    }

    #[test]
    fn headers_cannot_be_edited() {
        let work = header(2, "Work");
        assert_eq!(commit_edit(&work, "Home"), EditAction::Nothing);
        assert_eq!(commit_edit(&work, "##Home"), EditAction::Nothing);
        assert_eq!(commit_edit(&work, "   "), EditAction::Nothing);
    }

    #[test]
    fn only_tasks_toggle() {
        assert_eq!(toggle(&item(1, "a", false, None)), Some(TaskUpdate::completed(true)));
        assert_eq!(toggle(&item(1, "a", true, None)), Some(TaskUpdate::completed(false)));
        assert_eq!(toggle(&header(2, "Work")), None);
    }

    #[test]
    fn digest_of_pending_tasks() {
        let tasks = vec![
            header(1, "Work"),
            item(2, "report", false, Some("Work")),
            item(3, "buy milk", false, None),
            item(4, "done already", true, None),
            item(5, "review", false, Some("Work")),
        ];
        let digest = pending_digest(DAY, "alice", &tasks).unwrap();
        assert_eq!(digest, "Hello alice,\n\nHere are your pending tasks for 2026-10-16:\n\n\
                            - buy milk\n\n--- WORK ---\n- report\n- review\n\nKeep up the great work!\n");

        assert_eq!(pending_digest(DAY, "alice", &[item(4, "done", true, None)]), None);
    }

    #[test]
    fn printed_list() {
        let tasks = vec![header(1, "Work"), item(2, "report", true, Some("Work"))];
        let printed = render_day(DAY, &tasks, true).to_string();
        assert!(printed.contains("-- Work --"));
        assert!(printed.contains("[x] #2"));
        assert!(printed.contains("> + Add task or ##Group"));
    }
}
