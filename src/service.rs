//! Token-resolving facade over the stores.
//!
//! This is the seam the request layer calls: it owns the database handle and
//! the session registry, resolves the session token on every task operation,
//! and hands back plain records for the presentation layer to serialize.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::report;
use crate::session::SessionRegistry;
use crate::types::{NewTask, ReportSnapshot, Task, TaskPatch, UserPublic};
use chrono::{DateTime, Utc};
use tracing::info;

pub struct Service {
    db: Database,
    sessions: SessionRegistry,
}

impl Service {
    pub fn new(db: Database, sessions: SessionRegistry) -> Self {
        Self { db, sessions }
    }

    /// Storage handle, for callers that need reads outside a session
    /// (administrative tooling, tests).
    pub fn db(&self) -> &Database {
        &self.db
    }

    fn require_user(&self, token: &str) -> Result<String> {
        self.sessions.resolve(token).ok_or(Error::InvalidSession)
    }

    // --- Accounts ---

    pub fn register(&self, email: &str, password: &str) -> Result<UserPublic> {
        let user = self.db.create_user(email, password)?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Authenticate and open a session. Returns the token the caller should
    /// hand to the client (cookie transport is its problem, not ours).
    pub fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self.db.authenticate_user(email, password)?;
        let token = self.sessions.create(&user.id);
        info!(user_id = %user.id, "session opened");
        Ok(token)
    }

    /// Close a session. A stale or unknown token is fine; logout never fails.
    pub fn logout(&self, token: &str) {
        self.sessions.destroy(token);
    }

    /// The user behind a live session.
    pub fn current_user(&self, token: &str) -> Result<UserPublic> {
        let user_id = self.require_user(token)?;
        self.db.get_user(&user_id)?.ok_or(Error::InvalidSession)
    }

    // --- Tasks ---

    pub fn create_task(&self, token: &str, draft: NewTask) -> Result<Task> {
        let user_id = self.require_user(token)?;
        self.db.create_task(&user_id, draft)
    }

    pub fn list_tasks(&self, token: &str) -> Result<Vec<Task>> {
        let user_id = self.require_user(token)?;
        self.db.list_tasks(&user_id)
    }

    pub fn get_task(&self, token: &str, task_id: i64) -> Result<Option<Task>> {
        let user_id = self.require_user(token)?;
        self.db.get_task(task_id, &user_id)
    }

    pub fn update_task(&self, token: &str, task_id: i64, patch: TaskPatch) -> Result<Task> {
        let user_id = self.require_user(token)?;
        self.db.update_task(task_id, &user_id, patch)
    }

    pub fn delete_task(&self, token: &str, task_id: i64) -> Result<()> {
        let user_id = self.require_user(token)?;
        self.db.delete_task(task_id, &user_id)
    }

    // --- Reporting ---

    /// Aggregate the caller's tasks at `as_of`. The snapshot is pure output;
    /// serializers downstream consume it without re-deriving anything.
    pub fn report_at(&self, token: &str, as_of: DateTime<Utc>) -> Result<ReportSnapshot> {
        let user_id = self.require_user(token)?;
        let tasks = self.db.list_tasks(&user_id)?;
        Ok(report::aggregate(&tasks, as_of))
    }

    /// [`Service::report_at`] with the current instant.
    pub fn report(&self, token: &str) -> Result<ReportSnapshot> {
        self.report_at(token, Utc::now())
    }

    /// Drop expired sessions. Exposed for the host process to call on
    /// whatever schedule it likes.
    pub fn sweep_sessions(&self) -> usize {
        self.sessions.sweep()
    }
}
