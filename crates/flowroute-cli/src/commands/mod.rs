//! Built-in management commands.
//!
//! Each command implements the [`ManagementCommand`](crate::command::ManagementCommand)
//! trait and works on the router built from `settings.routes_file`.

pub mod check;
pub mod routes;

pub use check::CheckCommand;
pub use routes::{RoutesListCommand, RoutesMatchCommand, RoutesResolveCommand, RoutesShowCommand};

use std::sync::Arc;

use flowroute_core::{FlowrouteError, FlowrouteResult, Settings};
use flowroute_routing::{config, Router, RoutingServices};

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(RoutesListCommand));
    registry.register(Box::new(RoutesShowCommand));
    registry.register(Box::new(RoutesMatchCommand));
    registry.register(Box::new(RoutesResolveCommand));
}

/// Builds the router described by `settings`: routes from `routes_file`,
/// services from the database, controller and routing sections.
pub fn load_router(settings: &Settings) -> FlowrouteResult<Router> {
    let path = settings.routes_file.as_ref().ok_or_else(|| {
        FlowrouteError::Configuration("routes_file is not set".to_string())
    })?;
    let routes = config::from_file(path)?;
    let services = Arc::new(RoutingServices::from_settings(settings)?);
    Router::from_configuration(routes, services)
}

/// Writes a command report to stdout without blocking the runtime.
pub(crate) async fn write_stdout(output: String) -> FlowrouteResult<()> {
    tokio::task::spawn_blocking(move || {
        println!("{output}");
    })
    .await
    .map_err(|e| FlowrouteError::Io(std::io::Error::other(e.to_string())))
}
