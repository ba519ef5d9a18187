//! SQLite schema initialization for the link cache.
//!
//! One row per article in `pages`, one row per hyperlink in `links`.
//! Forward links of `X` are the `target`s of rows whose `source` is `X`;
//! backward links are the `source`s of rows whose `target` is `X`.

use rusqlite::Connection;

// ---------------------------------------------------------------------------
// DDL constants
// ---------------------------------------------------------------------------

const CREATE_PAGES: &str = "\
CREATE TABLE IF NOT EXISTS pages (
  title TEXT PRIMARY KEY,
  links_fetched INTEGER NOT NULL DEFAULT 0,
  backlinks_fetched INTEGER NOT NULL DEFAULT 0,
  created_at INTEGER DEFAULT (strftime('%s','now'))
)";

const CREATE_LINKS: &str = "\
CREATE TABLE IF NOT EXISTS links (
  source TEXT NOT NULL,
  target TEXT NOT NULL,
  PRIMARY KEY (source, target),
  FOREIGN KEY (source) REFERENCES pages(title),
  FOREIGN KEY (target) REFERENCES pages(title)
)";

const CREATE_INDEXES: &[&str] = &["CREATE INDEX IF NOT EXISTS idx_links_target ON links(target)"];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Open (or create) the SQLite database at `db_path` and apply the schema.
///
/// The returned connection has WAL mode, foreign keys, and synchronous
/// NORMAL configured. Pass `":memory:"` for a throwaway database.
///
/// # Errors
///
/// Returns a `rusqlite::Error` if the database cannot be opened or any DDL
/// statement fails.
pub fn initialize_database(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;

    // -- Pragmas ----------------------------------------------------------
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    // -- Tables -----------------------------------------------------------
    conn.execute_batch(CREATE_PAGES)?;
    conn.execute_batch(CREATE_LINKS)?;

    // -- Indexes ----------------------------------------------------------
    for ddl in CREATE_INDEXES {
        conn.execute_batch(ddl)?;
    }

    Ok(conn)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<String>>>()
            .unwrap()
    }

    #[test]
    fn creates_pages_and_links_tables() {
        let conn = initialize_database(":memory:").expect("schema init should succeed on :memory:");
        let tables = table_names(&conn);
        assert!(tables.contains(&"pages".to_string()));
        assert!(tables.contains(&"links".to_string()));
    }

    #[test]
    fn creates_target_index() {
        let conn = initialize_database(":memory:").unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_links_target'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn initialization_is_idempotent_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("links.db");
        let path = path.to_str().unwrap();

        let conn = initialize_database(path).unwrap();
        conn.execute("INSERT INTO pages (title) VALUES ('Rust')", [])
            .unwrap();
        drop(conn);

        let conn = initialize_database(path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "re-running the DDL must not drop data");
    }

    #[test]
    fn duplicate_link_rows_are_rejected() {
        let conn = initialize_database(":memory:").unwrap();
        conn.execute_batch(
            "INSERT INTO pages (title) VALUES ('A'), ('B');
             INSERT INTO links (source, target) VALUES ('A', 'B');",
        )
        .unwrap();
        let dup = conn.execute("INSERT INTO links (source, target) VALUES ('A', 'B')", []);
        assert!(dup.is_err());
    }
}
