//! SQLite-backed node store.
//!
//! The single authoritative mapping from identifier to [`Node`]. Every
//! query goes through [`Connection::prepare_cached`]. The connection sits
//! behind a mutex so expansion workers on other threads can share one
//! store; each node mutation runs in its own transaction under that lock.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::schema::initialize_database;
use crate::error::{Result, WikiPathError};
use crate::types::{Direction, Node};

// ---------------------------------------------------------------------------
// StoreStats
// ---------------------------------------------------------------------------

/// Aggregate statistics about the cached graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub nodes: usize,
    pub edges: usize,
    pub forward_fetched: usize,
    pub backward_fetched: usize,
}

// ---------------------------------------------------------------------------
// SQL constants
// ---------------------------------------------------------------------------

const INSERT_PAGE_SQL: &str = "INSERT OR IGNORE INTO pages (title) VALUES (?1)";

const SELECT_PAGE_SQL: &str = "\
SELECT links_fetched, backlinks_fetched FROM pages WHERE title = ?1";

const SELECT_FORWARD_SQL: &str = "SELECT target FROM links WHERE source = ?1";

const SELECT_BACKWARD_SQL: &str = "SELECT source FROM links WHERE target = ?1";

const INSERT_LINK_SQL: &str = "INSERT OR IGNORE INTO links (source, target) VALUES (?1, ?2)";

const MARK_FORWARD_SQL: &str = "\
UPDATE pages SET links_fetched = 1 WHERE title = ?1 AND links_fetched = 0";

const MARK_BACKWARD_SQL: &str = "\
UPDATE pages SET backlinks_fetched = 1 WHERE title = ?1 AND backlinks_fetched = 0";

// ---------------------------------------------------------------------------
// NodeStore
// ---------------------------------------------------------------------------

/// Persistent get-or-create cache of articles and their link edges.
///
/// Identifiers are stored exactly as given. Title normalization is the
/// caller's job (see [`crate::types::normalize_title`]).
pub struct NodeStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStore").finish_non_exhaustive()
    }
}

impl NodeStore {
    /// Open (or create) the database at `db_path`, apply the schema, and
    /// return a ready-to-use store.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = initialize_database(db_path)?;
        Ok(Self::from_connection(conn))
    }

    /// A store backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Wrap an already-initialized connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| WikiPathError::Other("node store lock poisoned".into()))
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// Return the node for `identifier`, creating and persisting an empty,
    /// unfetched node on first reference.
    pub fn get_or_create(&self, identifier: &str) -> Result<Node> {
        let conn = self.lock()?;
        conn.prepare_cached(INSERT_PAGE_SQL)?
            .execute(params![identifier])?;
        load_node(&conn, identifier)?.ok_or_else(|| {
            WikiPathError::Other(format!("page '{identifier}' vanished after insert"))
        })
    }

    /// Look up a node without creating it.
    pub fn get(&self, identifier: &str) -> Result<Option<Node>> {
        let conn = self.lock()?;
        load_node(&conn, identifier)
    }

    // -------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------

    /// Record the complete outgoing link set of `identifier`.
    pub fn mark_forward_fetched(
        &self,
        identifier: &str,
        neighbors: &BTreeSet<String>,
    ) -> Result<Node> {
        self.mark_fetched(identifier, Direction::Forward, neighbors)
    }

    /// Record the complete incoming link set of `identifier`.
    pub fn mark_backward_fetched(
        &self,
        identifier: &str,
        neighbors: &BTreeSet<String>,
    ) -> Result<Node> {
        self.mark_fetched(identifier, Direction::Backward, neighbors)
    }

    /// Store `neighbors` as the complete `direction` edge set of
    /// `identifier` and flip its fetched flag, all in one transaction.
    ///
    /// Unseen neighbors are created as fresh nodes. The flag flip is a
    /// compare-and-set: if the direction was already fetched nothing is
    /// written and [`WikiPathError::AlreadyFetched`] is returned.
    pub fn mark_fetched(
        &self,
        identifier: &str,
        direction: Direction,
        neighbors: &BTreeSet<String>,
    ) -> Result<Node> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut insert_page = tx.prepare_cached(INSERT_PAGE_SQL)?;
            insert_page.execute(params![identifier])?;

            let mark_sql = match direction {
                Direction::Forward => MARK_FORWARD_SQL,
                Direction::Backward => MARK_BACKWARD_SQL,
            };
            let changed = tx.prepare_cached(mark_sql)?.execute(params![identifier])?;
            if changed == 0 {
                // Dropping the transaction rolls it back.
                return Err(WikiPathError::AlreadyFetched {
                    title: identifier.to_string(),
                    direction,
                });
            }

            let mut insert_link = tx.prepare_cached(INSERT_LINK_SQL)?;
            for neighbor in neighbors {
                insert_page.execute(params![neighbor])?;
                match direction {
                    Direction::Forward => insert_link.execute(params![identifier, neighbor])?,
                    Direction::Backward => insert_link.execute(params![neighbor, identifier])?,
                };
            }
        }
        tx.commit()?;

        load_node(&conn, identifier)?.ok_or_else(|| {
            WikiPathError::Other(format!("page '{identifier}' vanished after update"))
        })
    }

    // -------------------------------------------------------------------
    // Stats
    // -------------------------------------------------------------------

    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock()?;
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = conn.prepare_cached(sql)?.query_row([], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(StoreStats {
            nodes: count("SELECT COUNT(*) FROM pages")?,
            edges: count("SELECT COUNT(*) FROM links")?,
            forward_fetched: count("SELECT COUNT(*) FROM pages WHERE links_fetched = 1")?,
            backward_fetched: count("SELECT COUNT(*) FROM pages WHERE backlinks_fetched = 1")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Row loading
// ---------------------------------------------------------------------------

fn load_node(conn: &Connection, identifier: &str) -> Result<Option<Node>> {
    let flags = conn
        .prepare_cached(SELECT_PAGE_SQL)?
        .query_row(params![identifier], |row| {
            Ok((row.get::<_, bool>(0)?, row.get::<_, bool>(1)?))
        })
        .optional()?;

    let Some((forward_fetched, backward_fetched)) = flags else {
        return Ok(None);
    };

    Ok(Some(Node {
        identifier: identifier.to_string(),
        forward_fetched,
        backward_fetched,
        forward_links: load_titles(conn, SELECT_FORWARD_SQL, identifier)?,
        backward_links: load_titles(conn, SELECT_BACKWARD_SQL, identifier)?,
    }))
}

fn load_titles(conn: &Connection, sql: &str, identifier: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params![identifier], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<rusqlite::Result<BTreeSet<_>>>()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
