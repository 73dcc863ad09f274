//! SQLite data source.
//!
//! RULE: Only the store talks to the database.
//! Reports hand it a `BoundQuery` and get a `ResultSet` back; they never
//! execute SQL directly.

mod catalog;
mod functions;
mod result;

pub use catalog::{NewMetric, NewTitle};
pub use functions::{parse_release_year, RELEASE_DATE_FORMAT};
pub use result::{ResultRow, ResultSet};

use crate::{error::DashResult, query::BoundQuery};
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection, OpenFlags};

pub struct DashStore {
    conn: Connection,
}

impl DashStore {
    /// Open an existing catalog for reporting. The connection is read-only.
    pub fn open_read_only(path: &str) -> DashResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )?;
        Self::with_connection(conn)
    }

    /// Open (or create) a catalog for writing. Used by seeding only.
    pub fn open(path: &str) -> DashResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Self::with_connection(conn)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DashResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> DashResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        functions::register(&conn)?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DashResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_catalog.sql"))?;
        Ok(())
    }

    /// Execute one read-only statement with its bind parameters.
    pub fn fetch(&self, query: &BoundQuery) -> DashResult<ResultSet> {
        crate::query::ensure_read_only(&query.sql)?;
        log::debug!("fetch params={:?}\n{}", query.params, query.sql.trim());

        let mut stmt = self.conn.prepare(&query.sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(row.get::<_, SqlValue>(index)?);
            }
            out.push(values);
        }

        Ok(ResultSet::new(columns, out))
    }
}
