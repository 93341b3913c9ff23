//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Reports, registry and generator call store methods; they never
//! execute SQL directly.

mod employee;
mod sequence;
mod skill;

use crate::{
    dataset::{EntityStore, Snapshot},
    employee::Employee,
    error::{WorkforceError, WorkforceResult},
    skill::Skill,
};
use rusqlite::{ffi, Connection};

/// Map a UNIQUE constraint failure to `UniquenessViolation`.
///
/// `field_for` turns the offending column into the API field name and
/// the rejected value; columns it does not know stay `Database` errors.
pub(crate) fn unique_violation(
    err: rusqlite::Error,
    field_for: impl Fn(&str) -> Option<(&'static str, String)>,
) -> WorkforceError {
    if let rusqlite::Error::SqliteFailure(code, Some(message)) = &err {
        if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE {
            // "UNIQUE constraint failed: employee.email"
            let column = message.rsplit('.').next().unwrap_or_default();
            if let Some((field, value)) = field_for(column) {
                return WorkforceError::UniquenessViolation { field, value };
            }
        }
    }
    WorkforceError::Database(err)
}

pub struct WorkforceStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl WorkforceStore {
    pub fn open(path: &str) -> WorkforceResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // Writers queue on the lock instead of failing with SQLITE_BUSY.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> WorkforceResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Open a second connection to the same database.
    /// For in-memory databases this yields a new, isolated database.
    pub fn reopen(&self) -> WorkforceResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order. Safe to run repeatedly.
    pub fn migrate(&self) -> WorkforceResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_id_sequence.sql"))?;
        log::info!(
            "schema migrated ({})",
            self.path.as_deref().unwrap_or(":memory:")
        );
        Ok(())
    }

    /// Fresh, migrated in-memory store.
    pub fn in_memory_migrated() -> WorkforceResult<Self> {
        let store = Self::in_memory()?;
        store.migrate()?;
        Ok(store)
    }
}

impl EntityStore for WorkforceStore {
    fn list_employees(&self) -> WorkforceResult<Vec<Employee>> {
        self.all_employees()
    }

    fn list_skills(&self) -> WorkforceResult<Vec<Skill>> {
        self.all_skills()
    }

    /// Both lists come from one read transaction.
    fn snapshot(&self) -> WorkforceResult<Snapshot> {
        let tx = self.conn.unchecked_transaction()?;
        let employees = self.load_employees()?;
        let skills = self.load_skills()?;
        tx.commit()?;
        Ok(Snapshot::new(employees, skills))
    }
}
