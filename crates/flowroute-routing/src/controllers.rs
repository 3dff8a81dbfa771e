//! Controller existence checks performed while resolving.
//!
//! A route only resolves when the `@package`, `@subpackage` and `@controller`
//! values it would dispatch to name a known controller.

use std::collections::HashSet;
use std::fmt;

use flowroute_core::settings::ControllerSettings;

/// Answers whether a controller exists.
pub trait ControllerRegistry: Send + Sync + fmt::Debug {
    fn exists(&self, package: Option<&str>, subpackage: Option<&str>, controller: Option<&str>) -> bool;
}

/// Accepts every controller.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllControllers;

impl ControllerRegistry for AllowAllControllers {
    fn exists(&self, _package: Option<&str>, _subpackage: Option<&str>, _controller: Option<&str>) -> bool {
        true
    }
}

/// A fixed set of known controllers, compared case-insensitively.
///
/// # Examples
///
/// ```
/// use flowroute_routing::controllers::{ControllerRegistry, StaticControllerRegistry};
///
/// let registry = StaticControllerRegistry::new().with_controller("Acme.Blog", None, "Post");
/// assert!(registry.exists(Some("acme.blog"), None, Some("post")));
/// assert!(!registry.exists(Some("Acme.Blog"), None, Some("Comment")));
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticControllerRegistry {
    known: HashSet<(String, String, String)>,
}

impl StaticControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the `controllers` settings list.
    pub fn from_settings(controllers: &[ControllerSettings]) -> Self {
        controllers.iter().fold(Self::new(), |registry, c| {
            registry.with_controller(&c.package, c.subpackage.as_deref(), &c.controller)
        })
    }

    #[must_use]
    pub fn with_controller(mut self, package: &str, subpackage: Option<&str>, controller: &str) -> Self {
        self.known.insert(Self::key(Some(package), subpackage, Some(controller)));
        self
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    fn key(package: Option<&str>, subpackage: Option<&str>, controller: Option<&str>) -> (String, String, String) {
        let norm = |s: Option<&str>| s.unwrap_or_default().to_lowercase();
        (norm(package), norm(subpackage), norm(controller))
    }
}

impl ControllerRegistry for StaticControllerRegistry {
    fn exists(&self, package: Option<&str>, subpackage: Option<&str>, controller: Option<&str>) -> bool {
        self.known.contains(&Self::key(package, subpackage, controller))
    }
}
