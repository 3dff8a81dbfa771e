//! Core error types for flowroute.
//!
//! [`FlowrouteError`] covers every failure category of the routing core:
//! broken URI patterns, route parts that violate their value contract,
//! exhausted identity collision retries, persistence failures, and the
//! "no route could resolve these values" outcome surfaced by the router.

use thiserror::Error;

/// The primary error type for flowroute.
///
/// Pattern, value-shape and loop errors indicate a configuration or handler
/// bug and are never retried. `NoMatchingRoute` is the only error produced
/// by normal operation.
#[derive(Error, Debug)]
pub enum FlowrouteError {
    // ── Pattern errors ───────────────────────────────────────────────

    /// A route's URI pattern is structurally invalid.
    #[error("Invalid URI pattern: {0}")]
    InvalidUriPattern(String),

    /// A route part configuration names a handler that is not registered.
    #[error("Invalid route part handler: {0}")]
    InvalidRoutePartHandler(String),

    // ── Value-shape errors ───────────────────────────────────────────

    /// A route part produced or declared a value of the wrong shape.
    #[error("Invalid route part value: {0}")]
    InvalidRoutePartValue(String),

    // ── Identity mapping ─────────────────────────────────────────────

    /// No unique path segment could be found within the retry bound.
    #[error("Infinite loop: {0}")]
    InfiniteLoop(String),

    /// The mapping store refused a path segment or identifier that is already owned.
    #[error("Duplicate path segment: {0}")]
    DuplicatePathSegment(String),

    /// The mapping store failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    // ── Router ───────────────────────────────────────────────────────

    /// No route could resolve the given route values.
    #[error("No matching route: {0}")]
    NoMatchingRoute(String),

    /// The set of configured routes is inconsistent.
    #[error("Invalid route setup: {0}")]
    InvalidRouteSetup(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlowrouteError {
    /// Returns the HTTP status code a web layer should use for this error.
    ///
    /// - `NoMatchingRoute` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NoMatchingRoute(_) => 404,
            Self::InvalidUriPattern(_)
            | Self::InvalidRoutePartHandler(_)
            | Self::InvalidRoutePartValue(_)
            | Self::InfiniteLoop(_)
            | Self::DuplicatePathSegment(_)
            | Self::Persistence(_)
            | Self::InvalidRouteSetup(_)
            | Self::Configuration(_)
            | Self::Serialization(_)
            | Self::Io(_) => 500,
        }
    }

    /// Returns `true` for errors that indicate a configuration or handler bug.
    ///
    /// Fatal errors abort the current match or resolve call; the router does
    /// not fall through to the next route when it sees one.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidUriPattern(_)
                | Self::InvalidRoutePartHandler(_)
                | Self::InvalidRoutePartValue(_)
                | Self::InfiniteLoop(_)
                | Self::InvalidRouteSetup(_)
        )
    }
}

/// A convenience type alias for `Result<T, FlowrouteError>`.
pub type FlowrouteResult<T> = Result<T, FlowrouteError>;
