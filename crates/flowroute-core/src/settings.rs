//! Settings system for flowroute.
//!
//! This module provides the [`Settings`] struct, which holds all routing
//! configuration. Settings are loaded once at startup (see
//! [`settings_loader`](crate::settings_loader)) and passed by reference.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Defaults applied to routes that do not set the corresponding option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Whether route parts lower-case generated and matched values.
    pub to_lower_case: bool,
    /// Whether leftover route values are rendered as a query string.
    pub append_exceeding_arguments: bool,
    /// The separator that replaces whitespace and punctuation in identity path segments.
    pub path_segment_separator: String,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            to_lower_case: true,
            append_exceeding_arguments: false,
            path_segment_separator: "-".to_string(),
        }
    }
}

/// Storage for object path mappings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The storage engine: `memory` or `sqlite`.
    pub engine: String,
    /// The database file path for `SQLite` (`:memory:` for a transient database).
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: "memory".to_string(),
            name: "flowroute.sqlite3".to_string(),
        }
    }
}

/// A controller known to the application, as `package`, `subpackage` and `controller`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSettings {
    /// The package key (e.g. `Acme.Blog`).
    pub package: String,
    /// The optional subpackage key.
    #[serde(default)]
    pub subpackage: Option<String>,
    /// The controller name (e.g. `Post`).
    pub controller: String,
}

/// The complete set of flowroute settings.
///
/// # Examples
///
/// ```
/// use flowroute_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert!(settings.routing.to_lower_case);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Routing ──────────────────────────────────────────────────────

    /// The file holding the route configuration (TOML or JSON).
    pub routes_file: Option<PathBuf>,
    /// Route defaults.
    pub routing: RoutingSettings,

    // ── Database ─────────────────────────────────────────────────────

    /// Object path mapping storage.
    pub database: DatabaseSettings,

    // ── Controllers ──────────────────────────────────────────────────

    /// Known controllers. An empty list accepts every controller.
    pub controllers: Vec<ControllerSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            routes_file: None,
            routing: RoutingSettings::default(),
            database: DatabaseSettings::default(),
            controllers: Vec::new(),
        }
    }
}
