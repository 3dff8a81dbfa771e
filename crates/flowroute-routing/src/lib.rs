//! # flowroute-routing
//!
//! Bidirectional uri routing. A [`Router`] holds an ordered list of
//! [`Route`]s; each route parses its uri pattern into route parts and can
//! both match an incoming request path to route values and resolve route
//! values back into a path.
//!
//! ## Modules
//!
//! - [`values`] - The route value tree
//! - [`object`] - Domain objects that can be routed by identity
//! - [`query`] - Percent-encoding and query-string rendering
//! - [`parts`] - Static, dynamic, identity and custom route parts
//! - [`pattern`] - The uri pattern parser
//! - [`route`] - Matching and resolving for one route
//! - [`router`] - The ordered route list
//! - [`config`] - Declarative route configuration (TOML/JSON)
//! - [`persistence`] - Object path mapping stores and object lookup
//! - [`controllers`] - Controller existence checks
//! - [`services`] - The collaborators shared by routes
//!
//! ## Example
//!
//! ```
//! use flowroute_routing::{config, Router, RoutingServices};
//! use std::sync::Arc;
//!
//! let routes = config::from_toml_str(r#"
//! [[routes]]
//! uriPattern = "{@controller}/{@action}(.{@format})"
//! defaults = { "@format" = "html" }
//! "#).unwrap();
//! let router = Router::from_configuration(routes, Arc::new(RoutingServices::default())).unwrap();
//!
//! let values = router.route("post/list.json").unwrap().unwrap();
//! assert_eq!(values.get("@format").and_then(|v| v.as_str()), Some("json"));
//! assert_eq!(router.resolve(&values).unwrap(), "post/list.json");
//! ```

pub mod config;
pub mod controllers;
pub mod object;
pub mod parts;
pub mod pattern;
pub mod persistence;
pub mod query;
pub mod route;
pub mod router;
pub mod services;
pub mod values;

pub use config::{RouteConfiguration, RoutePartConfiguration};
pub use controllers::{AllowAllControllers, ControllerRegistry, StaticControllerRegistry};
pub use object::{ObjectRef, PropertyValue, RoutableObject, SimpleObject};
pub use parts::{PartMatch, PartResolve, PartSettings, RoutePart, RoutePartHandler, RoutePartHandlerRegistry};
pub use persistence::{ObjectPathMapping, ObjectPathMappingRepository, PersistenceManager};
pub use route::Route;
pub use router::Router;
pub use services::RoutingServices;
pub use values::{RouteValue, RouteValues};
