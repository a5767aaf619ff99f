//! The task engine: the in-memory collection, its backing file, identifier
//! resolution, the four mutating operations, and the list query.
//!
//! Every operation works on the full collection and persists the whole
//! collection after a successful mutation. One store instance owns one
//! backing file; there is no process-wide state.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use time::PrimitiveDateTime;
use tracing::{error, warn};

use crate::datetime;
use crate::model::{Priority, Task, fresh_id};
use crate::storage;

// --- Identifier resolution ---

/// Outcome of mapping user-supplied text to tasks. Ambiguity is a contract
/// state, not an error; callers must surface every candidate rather than
/// picking one.
#[derive(Debug)]
pub enum Resolution<'a> {
    Found(&'a Task),
    Ambiguous(Vec<&'a Task>),
    NotFound,
}

/// Index-level resolution shared by the mutating operations. Positions are
/// recomputed from the live collection on every call; deletions shift
/// indices, so nothing here is ever cached.
enum IndexMatch {
    One(usize),
    Many(Vec<usize>),
    None,
}

// --- Mutation outcomes ---

#[derive(Debug)]
pub enum ToggleOutcome {
    Toggled(Task),
    Ambiguous(Vec<Task>),
    NotFound,
}

/// Field changes requested by an edit. `None` means "leave unchanged";
/// `due: Some("none")` (any case) clears the due date.
#[derive(Debug, Default, Clone)]
pub struct EditRequest {
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
}

/// A field change an edit actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Description(String),
    Priority(Priority),
    DueSet(String),
    DueCleared,
}

#[derive(Debug)]
pub enum EditOutcome {
    Edited { task: Task, changes: Vec<FieldChange> },
    NoChanges,
    Ambiguous(Vec<Task>),
    NotFound,
}

// --- Query vocabulary ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    All,
    Pending,
    Completed,
    Priority(Priority),
    DueToday,
    Overdue,
}

impl Filter {
    fn parse(token: &str) -> Option<Self> {
        let token = token.to_ascii_lowercase();
        match token.as_str() {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "due_today" => Some(Self::DueToday),
            "overdue" => Some(Self::Overdue),
            _ => token
                .strip_prefix("priority:")
                .and_then(Priority::parse)
                .map(Self::Priority),
        }
    }

    fn matches(self, task: &Task, now: PrimitiveDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
            Self::Priority(level) => task.priority == level,
            // A task due today whose time has already passed counts as
            // overdue, not due-today; one due exactly at `now` is due-today.
            // The two filters never both match the same task.
            Self::DueToday => {
                let due = datetime::sort_key(task.due_date.as_deref());
                !task.completed && due.date() == now.date() && due >= now
            }
            Self::Overdue => {
                !task.completed && datetime::sort_key(task.due_date.as_deref()) < now
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SortKey {
    #[default]
    Priority,
    DueDate,
    Description,
}

impl SortKey {
    fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "priority" => Some(Self::Priority),
            "due_date" => Some(Self::DueDate),
            "description" => Some(Self::Description),
            _ => None,
        }
    }
}

// --- Completion data ---

/// Id data handed to the front end for suggestions only. Resolution always
/// re-derives from the live collection; this snapshot is never authoritative.
#[derive(Debug, Default, Clone)]
pub struct CompletionData {
    pub prefixes: Vec<String>,
    pub full_ids: Vec<String>,
}

// --- The store ---

pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Load the collection from `path`. A missing file is an empty store; a
    /// file that cannot be read or parsed is reported and the store starts
    /// empty (the next save overwrites it with a fresh, valid file).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tasks = match storage::read_json::<Vec<Task>>(&path) {
            Ok(Some(tasks)) => tasks,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("failed to load tasks: {err:#}; starting with an empty list");
                Vec::new()
            }
        };
        Self { path, tasks }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The live collection, in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Persist the whole collection. A failed write keeps the in-memory
    /// change and reports the problem; the session continues either way.
    pub fn save(&self) {
        if let Err(err) = storage::atomic_write(&self.path, &self.tasks) {
            error!("failed to save tasks: {err:#}");
        }
    }

    fn match_indices(&self, identifier: &str) -> IndexMatch {
        // Exact full-id match wins outright.
        if let Some(i) = self.tasks.iter().position(|t| t.id == identifier) {
            return IndexMatch::One(i);
        }
        let matches: Vec<usize> = (0..self.tasks.len())
            .filter(|&i| self.tasks[i].id.starts_with(identifier))
            .collect();
        match matches.len() {
            0 => IndexMatch::None,
            1 => IndexMatch::One(matches[0]),
            _ => IndexMatch::Many(matches),
        }
    }

    fn snapshots(&self, indices: &[usize]) -> Vec<Task> {
        indices.iter().map(|&i| self.tasks[i].clone()).collect()
    }

    /// Map user-supplied text to a task: exact full-id match first, then
    /// prefix match over all ids.
    pub fn resolve(&self, identifier: &str) -> Resolution<'_> {
        match self.match_indices(identifier) {
            IndexMatch::One(i) => Resolution::Found(&self.tasks[i]),
            IndexMatch::Many(indices) => {
                Resolution::Ambiguous(indices.iter().map(|&i| &self.tasks[i]).collect())
            }
            IndexMatch::None => Resolution::NotFound,
        }
    }

    /// Create a task. An empty description is rejected outright; invalid
    /// priority or due text degrades with a warning instead of failing the
    /// whole add. Returns a snapshot of the stored task.
    pub fn add(
        &mut self,
        description: &str,
        priority_text: Option<&str>,
        due_text: Option<&str>,
    ) -> Result<Task> {
        let description = description.trim();
        if description.is_empty() {
            bail!("task description cannot be empty");
        }

        let priority = match priority_text {
            None => Priority::None,
            Some(text) => Priority::parse(text).unwrap_or_else(|| {
                warn!("invalid priority {text:?}, setting to 'none'");
                Priority::None
            }),
        };

        let due_date = due_text.and_then(|text| match datetime::parse_flexible(text) {
            Some(parsed) => Some(datetime::canonicalize(parsed)),
            None => {
                warn!(
                    "invalid date/time {text:?}, use YYYY-MM-DD or \
                     'YYYY-MM-DD hh:mmAM/PM'; due date not set"
                );
                None
            }
        });

        let task = Task {
            id: fresh_id(),
            description: description.to_string(),
            completed: false,
            priority,
            due_date,
            created_at: datetime::now_canonical(),
        };
        self.tasks.push(task.clone());
        self.save();
        Ok(task)
    }

    /// Flip completion on the resolved task and persist.
    pub fn toggle(&mut self, identifier: &str) -> ToggleOutcome {
        match self.match_indices(identifier) {
            IndexMatch::One(i) => {
                let task = &mut self.tasks[i];
                task.completed = !task.completed;
                let snapshot = task.clone();
                self.save();
                ToggleOutcome::Toggled(snapshot)
            }
            IndexMatch::Many(indices) => ToggleOutcome::Ambiguous(self.snapshots(&indices)),
            IndexMatch::None => ToggleOutcome::NotFound,
        }
    }

    /// Remove a task by its exact full id, persisting on success. Resolution
    /// and the destructive-action confirmation happen in the caller, so only
    /// a confirmed removal reaches this point.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let task = self.tasks.remove(index);
        self.save();
        Some(task)
    }

    /// Apply the supplied field changes to the resolved task. An invalid
    /// value rejects only its own field (with a warning) while the other
    /// changes in the same call still apply. Persists once iff at least one
    /// field changed.
    pub fn edit(&mut self, identifier: &str, request: &EditRequest) -> EditOutcome {
        let index = match self.match_indices(identifier) {
            IndexMatch::One(i) => i,
            IndexMatch::Many(indices) => return EditOutcome::Ambiguous(self.snapshots(&indices)),
            IndexMatch::None => return EditOutcome::NotFound,
        };

        let mut changes = Vec::new();
        let task = &mut self.tasks[index];

        if let Some(description) = &request.description {
            let description = description.trim();
            if description.is_empty() {
                // Stored tasks never have an empty description.
                warn!("new description is empty; description not changed");
            } else {
                task.description = description.to_string();
                changes.push(FieldChange::Description(task.description.clone()));
            }
        }

        if let Some(text) = &request.priority {
            match Priority::parse(text) {
                Some(priority) => {
                    task.priority = priority;
                    changes.push(FieldChange::Priority(priority));
                }
                None => warn!("invalid priority {text:?}; priority not changed"),
            }
        }

        if let Some(text) = &request.due {
            if text.eq_ignore_ascii_case("none") {
                task.due_date = None;
                changes.push(FieldChange::DueCleared);
            } else {
                match datetime::parse_flexible(text) {
                    Some(parsed) => {
                        let canonical = datetime::canonicalize(parsed);
                        task.due_date = Some(canonical.clone());
                        changes.push(FieldChange::DueSet(canonical));
                    }
                    None => warn!(
                        "invalid date/time {text:?}, use YYYY-MM-DD or \
                         'YYYY-MM-DD hh:mmAM/PM'; due date not changed"
                    ),
                }
            }
        }

        if changes.is_empty() {
            return EditOutcome::NoChanges;
        }
        let snapshot = self.tasks[index].clone();
        self.save();
        EditOutcome::Edited { task: snapshot, changes }
    }

    /// Filter, sort, and order the live collection without mutating it.
    /// Filter tokens are conjoined; unrecognized tokens (and unrecognized
    /// sort keys) warn and degrade instead of failing. `now` anchors the
    /// date-relative filters so they are testable against a fixed moment.
    /// `reverse` flips the final sequence after all tie-breaks.
    pub fn query(
        &self,
        filters: &[String],
        sort: &str,
        reverse: bool,
        now: PrimitiveDateTime,
    ) -> Vec<&Task> {
        let mut selected: Vec<&Task> = self.tasks.iter().collect();
        for token in filters {
            match Filter::parse(token) {
                Some(filter) => selected.retain(|task| filter.matches(task, now)),
                None => warn!("invalid filter {token:?}, ignored"),
            }
        }

        let sort = SortKey::parse(sort).unwrap_or_else(|| {
            warn!("invalid sort key {sort:?}, using 'priority'");
            SortKey::default()
        });
        match sort {
            SortKey::Priority => selected.sort_by_key(|t| {
                (
                    Reverse(t.priority),
                    datetime::sort_key(t.due_date.as_deref()),
                    t.description.to_lowercase(),
                )
            }),
            SortKey::DueDate => selected.sort_by_key(|t| {
                (
                    datetime::sort_key(t.due_date.as_deref()),
                    Reverse(t.priority),
                    t.description.to_lowercase(),
                )
            }),
            SortKey::Description => selected.sort_by_key(|t| t.description.to_lowercase()),
        }

        if reverse {
            selected.reverse();
        }
        selected
    }

    /// Current short-id prefixes and full ids for the front end's completer.
    pub fn completion_ids(&self) -> CompletionData {
        CompletionData {
            prefixes: self.tasks.iter().map(|t| t.short_id().to_string()).collect(),
            full_ids: self.tasks.iter().map(|t| t.id.clone()).collect(),
        }
    }
}
