//! The router: an ordered list of routes, first match wins in both directions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use flowroute_core::logging::routing_span;
use flowroute_core::{FlowrouteError, FlowrouteResult};

use crate::config::RouteConfiguration;
use crate::route::Route;
use crate::services::RoutingServices;
use crate::values::RouteValues;

/// A shared, immutable snapshot of the route list.
pub type RouteList = Arc<Vec<Arc<Route>>>;

#[derive(Debug, Default)]
struct RouterState {
    configuration: Vec<RouteConfiguration>,
    /// Most recently added first.
    added_routes: Vec<Arc<Route>>,
    configured_routes: Vec<Arc<Route>>,
    routes: RouteList,
}

impl RouterState {
    fn rebuild(&mut self) {
        let routes: Vec<Arc<Route>> = self
            .added_routes
            .iter()
            .chain(&self.configured_routes)
            .cloned()
            .collect();
        self.routes = Arc::new(routes);
    }
}

/// Routes request paths to route values and resolves route values to paths.
///
/// Explicitly added routes always come before configured ones. Replacing the
/// configuration rebuilds the configured routes and swaps the whole list in
/// at once; calls in flight keep using the list they started with.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use flowroute_routing::config::RouteConfiguration;
/// use flowroute_routing::router::Router;
/// use flowroute_routing::services::RoutingServices;
/// use flowroute_routing::values::RouteValues;
///
/// let router = Router::new(Arc::new(RoutingServices::default()));
/// router
///     .set_routes_configuration(vec![RouteConfiguration::new("blog/{post}")
///         .with_defaults(RouteValues::from_json(serde_json::json!({"@action": "show"})))])
///     .unwrap();
///
/// let values = router.route("blog/hello").unwrap().unwrap();
/// assert_eq!(router.resolve(&values).unwrap(), "blog/hello");
/// ```
#[derive(Debug)]
pub struct Router {
    services: Arc<RoutingServices>,
    state: RwLock<RouterState>,
    last_matched_route: Mutex<Option<Arc<Route>>>,
    last_resolved_route: Mutex<Option<Arc<Route>>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Arc::new(RoutingServices::default()))
    }
}

impl Router {
    pub fn new(services: Arc<RoutingServices>) -> Self {
        Self {
            services,
            state: RwLock::new(RouterState::default()),
            last_matched_route: Mutex::new(None),
            last_resolved_route: Mutex::new(None),
        }
    }

    /// Creates a router and loads `configuration` into it.
    pub fn from_configuration(
        configuration: Vec<RouteConfiguration>,
        services: Arc<RoutingServices>,
    ) -> FlowrouteResult<Self> {
        let router = Self::new(services);
        router.set_routes_configuration(configuration)?;
        Ok(router)
    }

    pub const fn services(&self) -> &Arc<RoutingServices> {
        &self.services
    }

    /// Replaces the route configuration.
    ///
    /// Routes sharing one uri pattern must either all declare `httpMethods`
    /// or none of them; otherwise [`FlowrouteError::InvalidRouteSetup`] is
    /// returned and the current routes stay in place.
    pub fn set_routes_configuration(&self, configuration: Vec<RouteConfiguration>) -> FlowrouteResult<()> {
        validate_http_method_constraints(&configuration)?;
        let configured_routes: Vec<Arc<Route>> = configuration
            .iter()
            .map(|config| Arc::new(Route::from_configuration(config, Arc::clone(&self.services))))
            .collect();

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.configuration = configuration;
        state.configured_routes = configured_routes;
        state.rebuild();
        tracing::debug!(
            configured = state.configured_routes.len(),
            added = state.added_routes.len(),
            "rebuilt route list"
        );
        Ok(())
    }

    /// The configuration the configured routes were built from.
    pub fn routes_configuration(&self) -> Vec<RouteConfiguration> {
        self.read_state().configuration.clone()
    }

    /// Adds a route in front of all existing routes. Added routes survive
    /// configuration changes.
    pub fn add_route(&self, route: Route) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(route = route.label(), "adding route");
        state.added_routes.insert(0, Arc::new(route));
        state.rebuild();
    }

    /// The current route list, in matching order.
    pub fn routes(&self) -> RouteList {
        Arc::clone(&self.read_state().routes)
    }

    /// Returns the values of the first route matching `path`, ignoring
    /// request methods.
    pub fn route(&self, path: &str) -> FlowrouteResult<Option<RouteValues>> {
        self.match_with(path, None)
    }

    /// Returns the values of the first route matching `path` and `method`.
    pub fn route_request(&self, path: &str, method: &str) -> FlowrouteResult<Option<RouteValues>> {
        self.match_with(path, Some(method))
    }

    fn match_with(&self, path: &str, method: Option<&str>) -> FlowrouteResult<Option<RouteValues>> {
        let span = routing_span("match", path);
        let _guard = span.enter();

        *lock(&self.last_matched_route) = None;
        for route in self.routes().iter() {
            if let Some(values) = route.matches_request(path, method)? {
                tracing::debug!(route = route.label(), method, "route matched");
                *lock(&self.last_matched_route) = Some(Arc::clone(route));
                return Ok(Some(values));
            }
        }
        tracing::debug!(method, "no route matched");
        Ok(None)
    }

    /// Returns the path built by the first route that resolves `values`.
    pub fn resolve(&self, values: &RouteValues) -> FlowrouteResult<String> {
        let subject = describe_values(values);
        let span = routing_span("resolve", &subject);
        let _guard = span.enter();

        *lock(&self.last_resolved_route) = None;
        for route in self.routes().iter() {
            if let Some(path) = route.resolves(values)? {
                tracing::debug!(route = route.label(), path = %path, "route resolved");
                *lock(&self.last_resolved_route) = Some(Arc::clone(route));
                return Ok(path);
            }
        }
        tracing::warn!(values = %subject, "no route could resolve the route values");
        Err(FlowrouteError::NoMatchingRoute(format!(
            "could not resolve a route for the values {subject}"
        )))
    }

    /// The route that produced the most recent successful match.
    pub fn last_matched_route(&self) -> Option<Arc<Route>> {
        lock(&self.last_matched_route).clone()
    }

    /// The route that produced the most recent successful resolve.
    pub fn last_resolved_route(&self) -> Option<Arc<Route>> {
        lock(&self.last_resolved_route).clone()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, RouterState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn describe_values(values: &RouteValues) -> String {
    values.to_json().to_string()
}

/// Routes sharing a uri pattern must agree on whether they constrain the
/// request method.
fn validate_http_method_constraints(configuration: &[RouteConfiguration]) -> FlowrouteResult<()> {
    let mut constrained: HashMap<&str, bool> = HashMap::new();
    for route in configuration {
        let has_methods = route.http_methods.is_some();
        match constrained.insert(route.uri_pattern.as_str(), has_methods) {
            Some(previous) if previous != has_methods => {
                return Err(FlowrouteError::InvalidRouteSetup(format!(
                    "there are multiple routes with the uriPattern \"{}\" and only some of them set \"httpMethods\"; \
                     specify accepted methods for all of them or adjust the uriPattern",
                    route.uri_pattern
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
