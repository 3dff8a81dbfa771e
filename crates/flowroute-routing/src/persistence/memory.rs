//! In-memory implementations of the persistence collaborators.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use flowroute_core::{FlowrouteError, FlowrouteResult};

use super::{ObjectPathMapping, ObjectPathMappingRepository, PersistenceManager};
use crate::object::ObjectRef;

fn lock<T>(mutex: &Mutex<T>) -> FlowrouteResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| FlowrouteError::Persistence("in-memory store lock poisoned".to_string()))
}

/// A mapping repository backed by a `Vec` behind a `Mutex`.
///
/// The uniqueness check and the insert happen under one lock, so two
/// concurrent writers can never both claim the same path segment.
#[derive(Debug, Default)]
pub struct InMemoryObjectPathMappingRepository {
    mappings: Mutex<Vec<ObjectPathMapping>>,
}

impl InMemoryObjectPathMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectPathMappingRepository for InMemoryObjectPathMappingRepository {
    fn find_by_path_segment(
        &self,
        object_type: &str,
        uri_pattern: &str,
        path_segment: &str,
        case_sensitive: bool,
    ) -> FlowrouteResult<Option<ObjectPathMapping>> {
        let mappings = lock(&self.mappings)?;
        Ok(mappings
            .iter()
            .find(|m| {
                m.object_type == object_type
                    && m.uri_pattern == uri_pattern
                    && if case_sensitive {
                        m.path_segment == path_segment
                    } else {
                        m.path_segment.to_lowercase() == path_segment.to_lowercase()
                    }
            })
            .cloned())
    }

    fn find_by_identifier(
        &self,
        object_type: &str,
        uri_pattern: &str,
        identifier: &str,
    ) -> FlowrouteResult<Option<ObjectPathMapping>> {
        let mappings = lock(&self.mappings)?;
        Ok(mappings
            .iter()
            .find(|m| {
                m.object_type == object_type && m.uri_pattern == uri_pattern && m.identifier == identifier
            })
            .cloned())
    }

    fn add(&self, mapping: ObjectPathMapping) -> FlowrouteResult<()> {
        let mut mappings = lock(&self.mappings)?;
        let segment = mapping.path_segment.to_lowercase();
        let conflict = mappings.iter().any(|m| {
            m.object_type == mapping.object_type
                && m.uri_pattern == mapping.uri_pattern
                && (m.path_segment.to_lowercase() == segment || m.identifier == mapping.identifier)
        });
        if conflict {
            return Err(FlowrouteError::DuplicatePathSegment(format!(
                "path segment \"{}\" or identifier \"{}\" is already mapped for {} ({})",
                mapping.path_segment, mapping.identifier, mapping.object_type, mapping.uri_pattern
            )));
        }
        mappings.push(mapping);
        Ok(())
    }

    fn all(&self) -> FlowrouteResult<Vec<ObjectPathMapping>> {
        let mut all = lock(&self.mappings)?.clone();
        all.sort_by(|a, b| {
            (&a.object_type, &a.uri_pattern, &a.path_segment).cmp(&(&b.object_type, &b.uri_pattern, &b.path_segment))
        });
        Ok(all)
    }
}

/// An object store keyed by `(object type, identifier)`.
#[derive(Debug, Default)]
pub struct InMemoryPersistenceManager {
    objects: Mutex<HashMap<(String, String), ObjectRef>>,
}

impl InMemoryPersistenceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object so it can be found by its identifier.
    ///
    /// Objects without an identifier are rejected.
    pub fn register(&self, object: ObjectRef) -> FlowrouteResult<()> {
        let identifier = object.identifier().ok_or_else(|| {
            FlowrouteError::Persistence(format!(
                "cannot register an object of type \"{}\" without an identifier",
                object.object_type()
            ))
        })?;
        lock(&self.objects)?.insert((object.object_type().to_string(), identifier), object);
        Ok(())
    }
}

impl PersistenceManager for InMemoryPersistenceManager {
    fn object_by_identifier(&self, identifier: &str, object_type: &str) -> FlowrouteResult<Option<ObjectRef>> {
        Ok(lock(&self.objects)?
            .get(&(object_type.to_string(), identifier.to_string()))
            .cloned())
    }
}
