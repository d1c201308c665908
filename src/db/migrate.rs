use crate::errors::{AppError, AppResult};
use crate::models::event_id::normalize_id;
use crate::ui::messages::{success, warning};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

const LEGACY_IMPORT: &str = "20251120_0001_import_event_status";
const REVIEW_FLAGS: &str = "20251204_0002_review_flags";

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> AppResult<bool> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_columns(conn: &Connection, table: &str) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut out = Vec::new();
    for c in cols {
        out.push(c?);
    }
    Ok(out)
}

fn migration_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        params![Local::now().to_rfc3339(), version, message],
    )?;
    Ok(())
}

/// Create `reviews` and `counts` with the current schema.
fn create_review_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            event_id      TEXT PRIMARY KEY,
            species       TEXT,
            direction     TEXT CHECK(direction IS NULL OR direction IN ('Up','Down','Stay')),
            reviewed_at   TEXT,
            notes         TEXT NOT NULL DEFAULT '',
            false_trigger INTEGER NOT NULL DEFAULT 0,
            orphaned      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS counts (
            event_id  TEXT NOT NULL,
            species   TEXT NOT NULL,
            direction TEXT NOT NULL CHECK(direction IN ('Up','Down','Stay')),
            count     INTEGER NOT NULL CHECK(count > 0),
            PRIMARY KEY (event_id, species, direction)
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_orphaned ON reviews(orphaned);
        "#,
    )?;
    Ok(())
}

/// Files created by early builds lack the flag columns on `reviews`.
fn migrate_add_review_flags(conn: &Connection) -> AppResult<()> {
    if migration_applied(conn, REVIEW_FLAGS)? {
        return Ok(());
    }

    let cols = table_columns(conn, "reviews")?;
    let mut added = Vec::new();

    for (col, ddl) in [
        ("notes", "TEXT NOT NULL DEFAULT ''"),
        ("false_trigger", "INTEGER NOT NULL DEFAULT 0"),
        ("orphaned", "INTEGER NOT NULL DEFAULT 0"),
    ] {
        if !cols.iter().any(|c| c == col) {
            conn.execute_batch(&format!("ALTER TABLE reviews ADD COLUMN {col} {ddl};"))?;
            added.push(col);
        }
    }

    if !added.is_empty() {
        success(format!(
            "Migration applied: {REVIEW_FLAGS} → added {} to reviews",
            added.join(", ")
        ));
    }

    mark_applied(conn, REVIEW_FLAGS, "Review flag columns present")
}

/// Projects reviewed with the first (browser based) release keep their
/// decisions in `event_status` and a `counts` table keyed on `movement` with a
/// foreign key to a cached `events` table. Import them once, non-destructively.
fn migrate_legacy_event_status(conn: &Connection) -> AppResult<()> {
    if migration_applied(conn, LEGACY_IMPORT)? {
        return Ok(());
    }

    let has_status = table_exists(conn, "event_status")?;
    let legacy_counts = table_exists(conn, "counts")?
        && table_columns(conn, "counts")?.iter().any(|c| c == "movement");

    if !has_status && !legacy_counts {
        return Ok(());
    }

    warning("Legacy review tables detected, creating safety copy before import...");
    backup_before_migration(conn)?;

    // legacy files may hold zero padded ids; the store only reads normalised ones
    let tx = conn.unchecked_transaction()?;

    if legacy_counts {
        // rebuild without the foreign key to the legacy events cache
        tx.execute_batch("ALTER TABLE counts RENAME TO counts_legacy;")?;
    }

    create_review_tables(&tx)?;

    if legacy_counts {
        let rows: Vec<(String, String, String, i64)> = {
            let mut stmt = tx.prepare(
                "SELECT CAST(event_id AS TEXT), species, movement, count
                 FROM counts_legacy
                 WHERE count > 0 AND movement IN ('Up','Down','Stay')
                 ORDER BY event_id, species, movement",
            )?;
            let it = stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))?;
            it.collect::<Result<_, _>>()?
        };

        // "0042" and "42" collapse onto one row; the larger count wins
        for (id, species, movement, count) in rows {
            tx.execute(
                "INSERT INTO counts (event_id, species, direction, count)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(event_id, species, direction)
                 DO UPDATE SET count = MAX(count, excluded.count)",
                params![normalize_id(&id), species, movement, count],
            )?;
        }
        tx.execute_batch("DROP TABLE counts_legacy;")?;
    }

    let mut imported = 0;
    if has_status {
        let rows: Vec<(String, Option<String>, Option<String>, Option<i64>)> = {
            let mut stmt = tx.prepare(
                "SELECT CAST(event_id AS TEXT), reviewed_at, notes, false_trigger
                 FROM event_status
                 WHERE event_id IS NOT NULL
                 ORDER BY reviewed_at DESC, event_id",
            )?;
            let it = stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))?;
            it.collect::<Result<_, _>>()?
        };

        // most recent review first, so it wins when ids collapse
        for (id, reviewed_at, notes, false_trigger) in rows {
            imported += tx.execute(
                "INSERT OR IGNORE INTO reviews (event_id, reviewed_at, notes, false_trigger)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    normalize_id(&id),
                    reviewed_at,
                    notes.unwrap_or_default(),
                    false_trigger.unwrap_or(0)
                ],
            )?;
        }
    }

    tx.commit()?;

    success(format!(
        "Migration applied: {LEGACY_IMPORT} → imported {imported} legacy review(s)"
    ));

    mark_applied(
        conn,
        LEGACY_IMPORT,
        &format!("Imported {imported} rows from event_status"),
    )
}

/// Consistent copy of the store next to it, taken with `VACUUM INTO`.
fn backup_before_migration(conn: &Connection) -> AppResult<()> {
    let db_path: String = conn
        .query_row("PRAGMA database_list;", [], |row| row.get::<_, String>(2))
        .unwrap_or_default();

    if db_path.is_empty() {
        warning("Could not determine DB path, backup skipped.");
        return Ok(());
    }

    let backup = format!(
        "{}.pre-migration-{}.sqlite",
        db_path,
        Local::now().format("%Y%m%d_%H%M%S")
    );

    conn.execute("VACUUM INTO ?1", [&backup])
        .map_err(|e| AppError::Migration(format!("backup to {backup} failed: {e}")))?;

    success(format!("📦 Backup created: {backup}"));
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Import decisions from the legacy schema, if any
    migrate_legacy_event_status(conn)?;

    // 3) Current schema
    create_review_tables(conn)?;
    migrate_add_review_flags(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::ReviewStore;
    use crate::models::direction::Direction;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        let cols = table_columns(&conn, "reviews").unwrap();
        assert!(cols.contains(&"orphaned".to_string()));

        let marks: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(marks, 1);
    }

    #[test]
    fn imports_legacy_status_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE events (event_id TEXT PRIMARY KEY, ts TEXT);
            CREATE TABLE event_status (
              event_id TEXT PRIMARY KEY REFERENCES events(event_id) ON DELETE CASCADE,
              false_trigger INTEGER DEFAULT 0,
              notes TEXT,
              reviewed_at TEXT
            );
            CREATE TABLE counts (
              event_id TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
              species TEXT NOT NULL,
              movement TEXT NOT NULL,
              count INTEGER NOT NULL DEFAULT 0,
              PRIMARY KEY (event_id, species, movement)
            );
            INSERT INTO events VALUES ('1001', '2025-10-31 08:15:00');
            INSERT INTO event_status VALUES ('1001', 1, 'shadow', '2025-11-01T09:00:00');
            INSERT INTO counts VALUES ('1001', 'Coho', 'Up', 2);
            INSERT INTO counts VALUES ('1001', 'Brown', 'Down', 0);
            "#,
        )
        .unwrap();

        run_pending_migrations(&conn).unwrap();

        let (notes, ft): (String, i64) = conn
            .query_row(
                "SELECT notes, false_trigger FROM reviews WHERE event_id = '1001'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(notes, "shadow");
        assert_eq!(ft, 1);

        let counted: i64 = conn
            .query_row("SELECT SUM(count) FROM counts WHERE direction = 'Up'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(counted, 2);
        assert!(table_exists(&conn, "event_status").unwrap());
    }

    #[test]
    fn legacy_padded_ids_are_readable_after_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.sqlite");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE event_status (
                  event_id TEXT PRIMARY KEY,
                  false_trigger INTEGER DEFAULT 0,
                  notes TEXT,
                  reviewed_at TEXT
                );
                CREATE TABLE counts (
                  event_id TEXT NOT NULL,
                  species TEXT NOT NULL,
                  movement TEXT NOT NULL,
                  count INTEGER NOT NULL DEFAULT 0,
                  PRIMARY KEY (event_id, species, movement)
                );
                INSERT INTO event_status VALUES ('0042', 0, 'old', '2025-11-01T09:00:00');
                INSERT INTO event_status VALUES ('42', 0, 'newer', '2025-11-02T09:00:00');
                INSERT INTO event_status VALUES ('0007', 1, NULL, NULL);
                INSERT INTO counts VALUES ('0042', 'Coho', 'Up', 3);
                INSERT INTO counts VALUES ('42', 'Coho', 'Up', 1);
                "#,
            )
            .unwrap();
        }

        let store = ReviewStore::open(&path).unwrap();

        let d = store.get("0042").unwrap().unwrap();
        assert_eq!(d.notes, "newer");
        assert!(store.get("7").unwrap().unwrap().false_trigger);

        let counts = store.counts("42").unwrap();
        assert_eq!(counts.get(&("Coho".to_string(), Direction::Up)), Some(&3));

        let ids: Vec<String> = store.export_all().unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["7".to_string(), "42".to_string()]);
    }
}
