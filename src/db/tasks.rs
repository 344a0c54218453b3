//! Task CRUD, scoped per owner.
//!
//! Every read and write is keyed by `(task_id, user_id)`. A wrong owner and a
//! missing row are indistinguishable to the caller, so task ids cannot be
//! probed across users.

use super::{Database, now_ms};
use crate::error::{Error, Result};
use crate::types::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use tracing::debug;

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 1000;

/// Validate title and description lengths (Unicode chars, not bytes).
fn validate_fields(title: &str, description: Option<&str>) -> Result<()> {
    let title_len = title.chars().count();
    if title_len == 0 {
        return Err(Error::invalid_value("title", "must not be empty"));
    }
    if title_len > TITLE_MAX {
        return Err(Error::invalid_value("title", "must be at most 200 characters"));
    }
    if let Some(desc) = description {
        if desc.chars().count() > DESCRIPTION_MAX {
            return Err(Error::invalid_value(
                "description",
                "must be at most 1000 characters",
            ));
        }
    }
    Ok(())
}

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let priority: String = row.get("priority")?;
    let status: String = row.get("status")?;
    let due_date: Option<String> = row.get("due_date")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        // A stored date that fails to parse reads back as None. Lenient on
        // purpose: reporting drops unreadable dates rather than erroring.
        due_date: due_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        priority: TaskPriority::parse(&priority).unwrap_or_default(),
        status: TaskStatus::parse(&status).unwrap_or_default(),
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Fetch a task by id and owner using an existing connection.
fn get_task_internal(conn: &Connection, task_id: i64, user_id: &str) -> Result<Option<Task>> {
    let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1 AND user_id = ?2")?;

    match stmt.query_row(params![task_id, user_id], parse_task_row) {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Create a new task owned by `user_id`.
    ///
    /// Both timestamps come from the same instant, so a fresh task always has
    /// `created_at == updated_at`.
    pub fn create_task(&self, user_id: &str, draft: NewTask) -> Result<Task> {
        validate_fields(&draft.title, draft.description.as_deref())?;

        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, description, due_date, priority, status,
                                    user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    draft.title,
                    draft.description,
                    draft.due_date.map(|d| d.to_string()),
                    draft.priority.as_str(),
                    draft.status.as_str(),
                    user_id,
                    now,
                    now,
                ],
            )?;
            let task_id = conn.last_insert_rowid();

            debug!(task_id, user_id = %user_id, "created task");

            get_task_internal(conn, task_id, user_id)?.ok_or(Error::NotFound)
        })
    }

    /// All tasks owned by `user_id`, most recently created first.
    ///
    /// The id tiebreak keeps the order total when two inserts land on the
    /// same millisecond.
    pub fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let tasks = stmt
                .query_map(params![user_id], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Fetch one task, or `None` if it does not exist under this owner.
    pub fn get_task(&self, task_id: i64, user_id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id, user_id))
    }

    /// Apply a partial update. Fields absent from the patch keep their stored
    /// values; `updated_at` always moves forward, even within one clock
    /// millisecond.
    pub fn update_task(&self, task_id: i64, user_id: &str, patch: TaskPatch) -> Result<Task> {
        self.with_conn(|conn| {
            let task = get_task_internal(conn, task_id, user_id)?.ok_or(Error::NotFound)?;

            let new_title = patch.title.unwrap_or(task.title);
            let new_description = patch.description.or(task.description);
            let new_due_date = patch.due_date.or(task.due_date);
            let new_priority = patch.priority.unwrap_or(task.priority);
            let new_status = patch.status.unwrap_or(task.status);

            validate_fields(&new_title, new_description.as_deref())?;

            let now = now_ms().max(task.updated_at + 1);

            conn.execute(
                "UPDATE tasks SET
                    title = ?1, description = ?2, due_date = ?3,
                    priority = ?4, status = ?5, updated_at = ?6
                 WHERE id = ?7 AND user_id = ?8",
                params![
                    new_title,
                    new_description,
                    new_due_date.map(|d| d.to_string()),
                    new_priority.as_str(),
                    new_status.as_str(),
                    now,
                    task_id,
                    user_id,
                ],
            )?;

            debug!(task_id, user_id = %user_id, "updated task");

            get_task_internal(conn, task_id, user_id)?.ok_or(Error::NotFound)
        })
    }

    /// Delete a task permanently. No soft delete, no dependents to cascade.
    pub fn delete_task(&self, task_id: i64, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![task_id, user_id],
            )?;
            if deleted == 0 {
                return Err(Error::NotFound);
            }

            debug!(task_id, user_id = %user_id, "deleted task");

            Ok(())
        })
    }
}
