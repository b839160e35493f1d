//! SQLite persistence for consent flags and recorded messages.
//!
//! One connection for the process lifetime, one statement at a time. The
//! mutex is never held across an await point.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::BotError;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &str) -> Result<Self, BotError> {
        if let Some(parent) = Path::new(path).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, BotError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, BotError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                user_id INTEGER NOT NULL,
                message TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL
            );

            CREATE TABLE IF NOT EXISTS permission (
                user_id INTEGER NOT NULL,
                permission INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_user_id ON messages(user_id);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Flip the stored consent flag, creating it as granted on first use.
    /// Returns the new value.
    pub fn toggle_permission(&self, user_id: u64) -> Result<bool, BotError> {
        let conn = self.conn.lock().unwrap();
        let current: Option<bool> = conn
            .query_row(
                "SELECT permission FROM permission WHERE user_id = ?1",
                params![user_id as i64],
                |row| row.get::<_, i64>(0).map(|v| v != 0),
            )
            .optional()?;

        match current {
            None => {
                conn.execute(
                    "INSERT INTO permission (user_id, permission) VALUES (?1, 1)",
                    params![user_id as i64],
                )?;
                Ok(true)
            }
            Some(current) => {
                let next = !current;
                conn.execute(
                    "UPDATE permission SET permission = ?1 WHERE user_id = ?2",
                    params![next as i64, user_id as i64],
                )?;
                Ok(next)
            }
        }
    }

    /// Stored consent flag; absent means not yet decided, treated as false.
    pub fn permission(&self, user_id: u64) -> Result<bool, BotError> {
        let conn = self.conn.lock().unwrap();
        let stored: Option<bool> = conn
            .query_row(
                "SELECT permission FROM permission WHERE user_id = ?1",
                params![user_id as i64],
                |row| row.get::<_, i64>(0).map(|v| v != 0),
            )
            .optional()?;
        Ok(stored.unwrap_or(false))
    }

    /// Insert a message unless an identical one is already stored for this
    /// user. Returns whether a row was written.
    pub fn append_message(&self, user_id: u64, message: &str) -> Result<bool, BotError> {
        let conn = self.conn.lock().unwrap();
        let existing: Option<i64> = conn
            .query_row(
                "SELECT rowid FROM messages WHERE user_id = ?1 AND message = ?2",
                params![user_id as i64, message],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO messages (user_id, message) VALUES (?1, ?2)",
            params![user_id as i64, message],
        )?;
        Ok(true)
    }

    /// All stored messages for a user, in insertion order.
    pub fn messages(&self, user_id: u64) -> Result<Vec<String>, BotError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT message FROM messages WHERE user_id = ?1 ORDER BY rowid")?;
        let rows = stmt
            .query_map(params![user_id as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// Delete every stored message for a user. Idempotent; returns the
    /// number of rows removed.
    pub fn purge(&self, user_id: u64) -> Result<usize, BotError> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM messages WHERE user_id = ?1",
            params![user_id as i64],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_permission_true_then_false() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.toggle_permission(1).unwrap());
        assert!(!db.toggle_permission(1).unwrap());
        assert!(db.toggle_permission(1).unwrap());
    }

    #[test]
    fn test_permission_defaults_to_false() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.permission(42).unwrap());
    }

    #[test]
    fn test_append_message_dedupes_per_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.append_message(1, "hello").unwrap());
        assert!(!db.append_message(1, "hello").unwrap());
        // Same text from another user is a separate record.
        assert!(db.append_message(2, "hello").unwrap());

        assert_eq!(db.messages(1).unwrap(), vec!["hello".to_string()]);
        assert_eq!(db.messages(2).unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_messages_come_back_in_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        db.append_message(1, "first").unwrap();
        db.append_message(1, "second").unwrap();
        db.append_message(1, "third").unwrap();
        assert_eq!(db.messages(1).unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_purge_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.purge(1).unwrap(), 0);
        db.append_message(1, "a").unwrap();
        db.append_message(1, "b").unwrap();
        assert_eq!(db.purge(1).unwrap(), 2);
        assert_eq!(db.purge(1).unwrap(), 0);
        assert!(db.messages(1).unwrap().is_empty());
    }

    #[test]
    fn test_purge_leaves_other_users_alone() {
        let db = Database::open_in_memory().unwrap();
        db.append_message(1, "mine").unwrap();
        db.append_message(2, "theirs").unwrap();
        db.purge(1).unwrap();
        assert_eq!(db.messages(2).unwrap(), vec!["theirs".to_string()]);
    }

    #[test]
    fn test_open_creates_file_and_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("database.db");
        let db = Database::open(path.to_str().unwrap()).unwrap();
        db.append_message(1, "persisted").unwrap();
        assert!(path.exists());
    }
}
