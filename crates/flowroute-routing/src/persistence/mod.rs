//! Object path mappings and the persistence collaborators of identity route parts.
//!
//! An [`ObjectPathMapping`] ties an object identifier to the path segment that
//! was minted for it. For one `(object type, uri pattern)` pair, a path segment
//! and an identifier are each owned by at most one mapping; repositories
//! reject an [`add`](ObjectPathMappingRepository::add) that would violate this
//! with [`FlowrouteError::DuplicatePathSegment`](flowroute_core::FlowrouteError::DuplicatePathSegment).
//!
//! ## Backends
//!
//! - [`memory`] - mutex-guarded in-memory store
//! - `sqlite` - `rusqlite` store with `UNIQUE` constraints (feature `sqlite`)

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::fmt;

use serde::{Deserialize, Serialize};

use flowroute_core::FlowrouteResult;

use crate::object::ObjectRef;

pub use memory::{InMemoryObjectPathMappingRepository, InMemoryPersistenceManager};

/// A persisted link between an object identifier and its path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPathMapping {
    pub object_type: String,
    pub uri_pattern: String,
    pub path_segment: String,
    pub identifier: String,
}

impl ObjectPathMapping {
    pub fn new(
        object_type: impl Into<String>,
        uri_pattern: impl Into<String>,
        path_segment: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            object_type: object_type.into(),
            uri_pattern: uri_pattern.into(),
            path_segment: path_segment.into(),
            identifier: identifier.into(),
        }
    }
}

/// Storage for [`ObjectPathMapping`]s.
pub trait ObjectPathMappingRepository: Send + Sync + fmt::Debug {
    /// Finds the mapping owning `path_segment`, comparing case-insensitively
    /// unless `case_sensitive` is set.
    fn find_by_path_segment(
        &self,
        object_type: &str,
        uri_pattern: &str,
        path_segment: &str,
        case_sensitive: bool,
    ) -> FlowrouteResult<Option<ObjectPathMapping>>;

    /// Finds the mapping owning `identifier`.
    fn find_by_identifier(
        &self,
        object_type: &str,
        uri_pattern: &str,
        identifier: &str,
    ) -> FlowrouteResult<Option<ObjectPathMapping>>;

    /// Stores a new mapping.
    ///
    /// Fails with `DuplicatePathSegment` if the path segment (compared
    /// case-insensitively) or the identifier is already owned within the same
    /// object type and uri pattern.
    fn add(&self, mapping: ObjectPathMapping) -> FlowrouteResult<()>;

    /// Returns every stored mapping, ordered by object type, uri pattern and path segment.
    fn all(&self) -> FlowrouteResult<Vec<ObjectPathMapping>>;
}

/// Loads domain objects by identifier.
pub trait PersistenceManager: Send + Sync + fmt::Debug {
    fn object_by_identifier(&self, identifier: &str, object_type: &str) -> FlowrouteResult<Option<ObjectRef>>;
}
