//! Declarative route configuration.
//!
//! Route lists are loaded from TOML (`[[routes]]` tables) or JSON (a bare
//! array, or an object with a `routes` array). Keys use the camelCase names
//! of the configuration format:
//!
//! ```toml
//! [[routes]]
//! name = "Blog post"
//! uriPattern = "blog/{post}(.{@format})"
//! defaults = { "@package" = "Acme.Blog", "@controller" = "Post", "@action" = "show", "@format" = "html" }
//!
//! [routes.routeParts.post]
//! objectType = "Acme\\Blog\\Post"
//! uriPattern = "{date:Y}/{title}"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use flowroute_core::{FlowrouteError, FlowrouteResult};

use crate::values::RouteValues;

/// Per-part overrides, keyed by part name in [`RouteConfiguration::route_parts`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutePartConfiguration {
    /// The name of a registered custom part handler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// The object type of an identity part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// The sub-pattern an identity part derives path segments from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_pattern: Option<String>,
    #[serde(skip_serializing_if = "RouteValues::is_empty")]
    pub options: RouteValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_lower_case: Option<bool>,
}

/// One route definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub uri_pattern: String,
    #[serde(default)]
    pub defaults: RouteValues,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub route_parts: BTreeMap<String, RoutePartConfiguration>,
    /// Falls back to the routing settings when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_lower_case: Option<bool>,
    /// Falls back to the routing settings when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_exceeding_arguments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_methods: Option<Vec<String>>,
}

impl RouteConfiguration {
    pub fn new(uri_pattern: impl Into<String>) -> Self {
        Self {
            uri_pattern: uri_pattern.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: RouteValues) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn with_route_part(mut self, name: impl Into<String>, part: RoutePartConfiguration) -> Self {
        self.route_parts.insert(name.into(), part);
        self
    }

    #[must_use]
    pub fn with_http_methods(mut self, methods: &[&str]) -> Self {
        self.http_methods = Some(methods.iter().map(|m| (*m).to_string()).collect());
        self
    }
}

#[derive(Deserialize)]
struct RoutesDocument {
    #[serde(default)]
    routes: Vec<RouteConfiguration>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRoutes {
    List(Vec<RouteConfiguration>),
    Document(RoutesDocument),
}

/// Parses a TOML route list (`[[routes]]` tables).
pub fn from_toml_str(toml_str: &str) -> FlowrouteResult<Vec<RouteConfiguration>> {
    toml::from_str::<RoutesDocument>(toml_str)
        .map(|document| document.routes)
        .map_err(|e| FlowrouteError::Configuration(format!("Failed to parse TOML routes: {e}")))
}

/// Parses a JSON route list: either an array or `{"routes": [...]}`.
pub fn from_json_str(json_str: &str) -> FlowrouteResult<Vec<RouteConfiguration>> {
    match serde_json::from_str::<JsonRoutes>(json_str)
        .map_err(|e| FlowrouteError::Configuration(format!("Failed to parse JSON routes: {e}")))?
    {
        JsonRoutes::List(routes) | JsonRoutes::Document(RoutesDocument { routes }) => Ok(routes),
    }
}

/// Loads a route list from a file; `.json` files are JSON, anything else TOML.
pub fn from_file(path: impl AsRef<Path>) -> FlowrouteResult<Vec<RouteConfiguration>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        FlowrouteError::Configuration(format!("Failed to read routes file {}: {e}", path.display()))
    })?;
    let routes = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        from_json_str(&contents)?
    } else {
        from_toml_str(&contents)?
    };
    tracing::debug!(path = %path.display(), count = routes.len(), "loaded route configuration");
    Ok(routes)
}
