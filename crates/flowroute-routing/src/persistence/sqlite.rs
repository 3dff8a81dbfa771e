//! SQLite object path mapping store using `rusqlite`.
//!
//! Uniqueness is enforced by the table itself: one constraint over the path
//! segment (case-insensitive) and one over the identifier, both scoped by
//! object type and uri pattern. A violated constraint surfaces as
//! `DuplicatePathSegment`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::OptionalExtension;

use flowroute_core::{FlowrouteError, FlowrouteResult};

use super::{ObjectPathMapping, ObjectPathMappingRepository};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS object_path_mappings (
    object_type  TEXT NOT NULL,
    uri_pattern  TEXT NOT NULL,
    path_segment TEXT NOT NULL,
    identifier   TEXT NOT NULL,
    UNIQUE (object_type, uri_pattern, path_segment COLLATE NOCASE),
    UNIQUE (object_type, uri_pattern, identifier)
);
";

const COLUMNS: &str = "object_type, uri_pattern, path_segment, identifier";

/// A mapping repository stored in an SQLite database.
#[derive(Debug)]
pub struct SqliteObjectPathMappingRepository {
    path: PathBuf,
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteObjectPathMappingRepository {
    /// Opens (and if needed creates) the mapping table in the database at `path`.
    ///
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: impl Into<PathBuf>) -> FlowrouteResult<Self> {
        let path = path.into();
        let conn = if path.to_str() == Some(":memory:") {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| FlowrouteError::Persistence(format!("SQLite open failed: {e}")))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| FlowrouteError::Persistence(format!("Failed to create mapping table: {e}")))?;

        tracing::debug!(path = %path.display(), "opened object path mapping store");

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database.
    pub fn memory() -> FlowrouteResult<Self> {
        Self::open(":memory:")
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> FlowrouteResult<MutexGuard<'_, rusqlite::Connection>> {
        self.conn
            .lock()
            .map_err(|_| FlowrouteError::Persistence("SQLite connection lock poisoned".to_string()))
    }

    fn read_mapping(row: &rusqlite::Row<'_>) -> rusqlite::Result<ObjectPathMapping> {
        Ok(ObjectPathMapping {
            object_type: row.get(0)?,
            uri_pattern: row.get(1)?,
            path_segment: row.get(2)?,
            identifier: row.get(3)?,
        })
    }

    fn query_one(&self, sql: &str, params: [&str; 3]) -> FlowrouteResult<Option<ObjectPathMapping>> {
        let conn = self.conn()?;
        conn.query_row(sql, params, Self::read_mapping)
            .optional()
            .map_err(|e| FlowrouteError::Persistence(format!("Query failed: {e}")))
    }
}

impl ObjectPathMappingRepository for SqliteObjectPathMappingRepository {
    fn find_by_path_segment(
        &self,
        object_type: &str,
        uri_pattern: &str,
        path_segment: &str,
        case_sensitive: bool,
    ) -> FlowrouteResult<Option<ObjectPathMapping>> {
        let comparison = if case_sensitive {
            "path_segment = ?3"
        } else {
            "lower(path_segment) = lower(?3)"
        };
        let sql = format!(
            "SELECT {COLUMNS} FROM object_path_mappings \
             WHERE object_type = ?1 AND uri_pattern = ?2 AND {comparison} LIMIT 1"
        );
        self.query_one(&sql, [object_type, uri_pattern, path_segment])
    }

    fn find_by_identifier(
        &self,
        object_type: &str,
        uri_pattern: &str,
        identifier: &str,
    ) -> FlowrouteResult<Option<ObjectPathMapping>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM object_path_mappings \
             WHERE object_type = ?1 AND uri_pattern = ?2 AND identifier = ?3 LIMIT 1"
        );
        self.query_one(&sql, [object_type, uri_pattern, identifier])
    }

    fn add(&self, mapping: ObjectPathMapping) -> FlowrouteResult<()> {
        let conn = self.conn()?;
        let result = conn.execute(
            &format!("INSERT INTO object_path_mappings ({COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
            [
                mapping.object_type.as_str(),
                mapping.uri_pattern.as_str(),
                mapping.path_segment.as_str(),
                mapping.identifier.as_str(),
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == rusqlite::ErrorCode::ConstraintViolation => {
                Err(FlowrouteError::DuplicatePathSegment(format!(
                    "path segment \"{}\" or identifier \"{}\" is already mapped for {} ({})",
                    mapping.path_segment, mapping.identifier, mapping.object_type, mapping.uri_pattern
                )))
            }
            Err(e) => Err(FlowrouteError::Persistence(format!("Insert failed: {e}"))),
        }
    }

    fn all(&self) -> FlowrouteResult<Vec<ObjectPathMapping>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM object_path_mappings \
                 ORDER BY object_type, uri_pattern, path_segment"
            ))
            .map_err(|e| FlowrouteError::Persistence(format!("Query failed: {e}")))?;
        let rows = stmt
            .query_map([], Self::read_mapping)
            .map_err(|e| FlowrouteError::Persistence(format!("Query failed: {e}")))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| FlowrouteError::Persistence(format!("Row read failed: {e}")))
    }
}
