//! Versioned schema migrations.
//!
//! Applied versions are tracked in `_migrations`; each pending migration
//! runs in its own transaction, so re-running is a no-op.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// All migrations in order. Append only.
static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "conversation log and preferences",
        sql: r#"
            CREATE TABLE conversations (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role       TEXT NOT NULL CHECK(role IN ('user','assistant')),
                content    TEXT NOT NULL,
                timestamp  INTEGER NOT NULL,
                metadata   TEXT NOT NULL DEFAULT '{}'
            );
            CREATE INDEX idx_conversations_session
                ON conversations(session_id, timestamp);

            CREATE TABLE preferences (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                confidence REAL NOT NULL DEFAULT 0.8,
                updated_at INTEGER NOT NULL
            );
        "#,
    },
    Migration {
        version: 2,
        description: "timestamp index for retention sweeps",
        sql: r#"
            CREATE INDEX idx_conversations_timestamp ON conversations(timestamp);
        "#,
    },
    Migration {
        version: 3,
        description: "arrival-order index for session history",
        sql: r#"
            CREATE INDEX idx_conversations_session_id ON conversations(session_id, id);
        "#,
    },
];

/// Run all pending migrations against `conn`. Synchronous.
pub fn run_all(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version     INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at  INTEGER NOT NULL
        );",
    )
    .map_err(|e| StoreError::Migration {
        version: 0,
        message: format!("failed to create _migrations table: {e}"),
    })?;

    let current = current_version(conn)?;
    let mut applied = 0usize;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration)?;
        applied += 1;
    }

    if applied == 0 {
        debug!(current_version = current, "database schema is up to date");
    } else {
        info!(applied, latest = latest_version(), "migrations applied");
    }
    Ok(())
}

/// Latest applied version, or 0 on a fresh database.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| StoreError::Migration {
        version: 0,
        message: format!("failed to read current version: {e}"),
    })
}

/// Version the schema reaches once every migration has run.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

fn apply(conn: &mut Connection, migration: &Migration) -> StoreResult<()> {
    info!(
        version = migration.version,
        description = migration.description,
        "applying migration"
    );

    let fail = |stage: &str, e: rusqlite::Error| StoreError::Migration {
        version: migration.version,
        message: format!("{stage}: {e}"),
    };

    let tx = conn.transaction().map_err(|e| fail("begin", e))?;
    tx.execute_batch(migration.sql)
        .map_err(|e| fail("sql execution", e))?;
    tx.execute(
        "INSERT INTO _migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().timestamp_millis()
        ],
    )
    .map_err(|e| fail("record", e))?;
    tx.commit().map_err(|e| fail("commit", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_strictly_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(window[0].version < window[1].version);
        }
    }

    #[test]
    fn run_all_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_all(&mut conn).unwrap();
        run_all(&mut conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn role_check_rejects_unknown_roles() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_all(&mut conn).unwrap();
        let result = conn.execute(
            "INSERT INTO conversations (session_id, role, content, timestamp) VALUES ('s', 'system', 'x', 0)",
            [],
        );
        assert!(result.is_err());
    }
}
