//! The collaborators a router and its routes share.

use std::sync::Arc;

use flowroute_core::settings::RoutingSettings;
use flowroute_core::{FlowrouteError, FlowrouteResult, Settings};

use crate::controllers::{AllowAllControllers, ControllerRegistry, StaticControllerRegistry};
use crate::parts::{RoutePartHandler, RoutePartHandlerRegistry};
use crate::persistence::{
    InMemoryObjectPathMappingRepository, InMemoryPersistenceManager, ObjectPathMappingRepository, PersistenceManager,
};

/// Object path mappings, object lookup, controller checks, custom part
/// handlers and routing defaults.
///
/// The default instance uses in-memory stores and accepts every controller.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use flowroute_routing::controllers::StaticControllerRegistry;
/// use flowroute_routing::services::RoutingServices;
///
/// let services = RoutingServices::default()
///     .with_controllers(Arc::new(StaticControllerRegistry::new().with_controller("Acme.Blog", None, "Post")));
/// assert!(services.controllers.exists(Some("Acme.Blog"), None, Some("Post")));
/// ```
#[derive(Debug, Clone)]
pub struct RoutingServices {
    pub mappings: Arc<dyn ObjectPathMappingRepository>,
    pub persistence: Arc<dyn PersistenceManager>,
    pub controllers: Arc<dyn ControllerRegistry>,
    pub handlers: RoutePartHandlerRegistry,
    pub routing: RoutingSettings,
}

impl Default for RoutingServices {
    fn default() -> Self {
        Self {
            mappings: Arc::new(InMemoryObjectPathMappingRepository::new()),
            persistence: Arc::new(InMemoryPersistenceManager::new()),
            controllers: Arc::new(AllowAllControllers),
            handlers: RoutePartHandlerRegistry::new(),
            routing: RoutingSettings::default(),
        }
    }
}

impl RoutingServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds services from settings: the mapping store named by
    /// `database.engine`, the `controllers` list (empty accepts everything)
    /// and the `routing` defaults.
    pub fn from_settings(settings: &Settings) -> FlowrouteResult<Self> {
        let mappings: Arc<dyn ObjectPathMappingRepository> = match settings.database.engine.as_str() {
            "memory" => Arc::new(InMemoryObjectPathMappingRepository::new()),
            #[cfg(feature = "sqlite")]
            "sqlite" => Arc::new(crate::persistence::sqlite::SqliteObjectPathMappingRepository::open(
                &settings.database.name,
            )?),
            other => {
                return Err(FlowrouteError::Configuration(format!(
                    "unsupported object path mapping engine \"{other}\""
                )))
            }
        };
        let controllers: Arc<dyn ControllerRegistry> = if settings.controllers.is_empty() {
            Arc::new(AllowAllControllers)
        } else {
            Arc::new(StaticControllerRegistry::from_settings(&settings.controllers))
        };
        Ok(Self {
            mappings,
            controllers,
            routing: settings.routing.clone(),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_mappings(mut self, mappings: Arc<dyn ObjectPathMappingRepository>) -> Self {
        self.mappings = mappings;
        self
    }

    #[must_use]
    pub fn with_persistence(mut self, persistence: Arc<dyn PersistenceManager>) -> Self {
        self.persistence = persistence;
        self
    }

    #[must_use]
    pub fn with_controllers(mut self, controllers: Arc<dyn ControllerRegistry>) -> Self {
        self.controllers = controllers;
        self
    }

    #[must_use]
    pub fn with_handler(mut self, name: impl Into<String>, handler: Arc<dyn RoutePartHandler>) -> Self {
        self.handlers.register(name, handler);
        self
    }

    #[must_use]
    pub fn with_routing_settings(mut self, routing: RoutingSettings) -> Self {
        self.routing = routing;
        self
    }
}
