//! # flowroute
//!
//! Bidirectional URI routing.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient access.
//! You can depend on `flowroute` to get everything, or depend on individual
//! crates for finer-grained control.
//!
//! ```
//! use flowroute::prelude::*;
//! use std::sync::Arc;
//!
//! let router = Router::from_configuration(
//!     vec![RouteConfiguration::new("{@controller}/{@action}")],
//!     Arc::new(RoutingServices::default()),
//! )
//! .unwrap();
//!
//! let values = router.route("post/list").unwrap().unwrap();
//! assert_eq!(router.resolve(&values).unwrap(), "post/list");
//! ```

/// Settings, logging, and error types.
pub use flowroute_core as core;

/// Route parts, routes, the router, and object path mappings.
pub use flowroute_routing as routing;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use flowroute_cli as cli;

pub use serde_json;
pub use tracing;

/// The most commonly used types.
pub mod prelude {
    pub use flowroute_core::{FlowrouteError, FlowrouteResult, Settings};
    pub use flowroute_routing::{
        ObjectPathMapping, ObjectPathMappingRepository, PersistenceManager, RouteConfiguration,
        RoutePartConfiguration, RoutePartHandler, Route, RouteValue, RouteValues, Router, RoutingServices,
        SimpleObject,
    };
}
