//! Schema migrator (§4.B). Ordered, idempotent DDL embedded at build time
//! via `include_str!`, mirroring the numbered-migration-file pattern used
//! elsewhere in the retrieval corpus (e.g. a `NNN_description.ext`
//! sequence applied in ascending order and recorded in a version table).

use duckdb::Connection;

use ghss_domain::error::{Error, Result};

/// One embedded migration: its version, short name, and DDL body.
struct Migration {
    version: i32,
    name: &'static str,
    sql: &'static str,
}

/// Migrations in ascending version order. Adding a new one means adding a
/// new `NNN_description.sql` file under `migrations/` and a matching
/// entry here; versions must form a gapless prefix of `1..=N`.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "repositories",
        sql: include_str!("migrations/001_repositories.sql"),
    },
    Migration {
        version: 2,
        name: "content_chunks",
        sql: include_str!("migrations/002_content_chunks.sql"),
    },
];

/// Create `schema_version` if absent, read `MAX(version)`, and apply every
/// migration with a version greater than the current one, each inside its
/// own transaction that also records `(version, name, applied_at)`.
///
/// Fatal if the embedded migration set has a gap before the next version
/// to apply - that would mean a build was shipped with a missing
/// migration file, not a recoverable runtime condition.
pub fn apply_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT now()
        );",
    )
    .map_err(|err| Error::storage(format!("failed to create schema_version table: {err}")))?;

    let current: i32 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
            row.get(0)
        })
        .map_err(|err| Error::storage(format!("failed to read current schema version: {err}")))?;

    let mut expected_next = current + 1;
    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        if migration.version != expected_next {
            return Err(Error::storage(format!(
                "migration gap detected: expected version {expected_next}, found {}",
                migration.version
            )));
        }
        apply_one(conn, migration)?;
        expected_next += 1;
    }

    Ok(())
}

fn apply_one(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute_batch("BEGIN TRANSACTION;")
        .map_err(|err| Error::storage(format!("failed to begin migration transaction: {err}")))?;

    let result = (|| -> Result<()> {
        conn.execute_batch(migration.sql).map_err(|err| {
            Error::storage(format!(
                "migration {} ({}) failed: {err}",
                migration.version, migration.name
            ))
        })?;
        conn.execute(
            "INSERT INTO schema_version (version, name, applied_at) VALUES (?, ?, now())",
            duckdb::params![migration.version, migration.name],
        )
        .map_err(|err| Error::storage(format!("failed to record schema version: {err}")))?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT;")
                .map_err(|err| Error::storage(format!("failed to commit migration: {err}")))?;
            Ok(())
        }
        Err(err) => {
            let _ = conn.execute_batch("ROLLBACK;");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_form_a_gapless_version_sequence() {
        for (idx, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, (idx + 1) as i32);
        }
    }

    #[test]
    fn applying_migrations_twice_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();
        apply_migrations(&conn).unwrap();
        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as i32);
    }
}
