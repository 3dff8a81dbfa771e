//! A single route: a uri pattern, its defaults and both routing directions.
//!
//! [`Route::matches`] turns a request path into route values and
//! [`Route::resolves`] turns route values back into a path. The pattern is
//! parsed on first use and the parts are kept until the pattern, the
//! defaults, the case folding flag or the part configuration change.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use flowroute_core::{FlowrouteError, FlowrouteResult};

use crate::config::{RouteConfiguration, RoutePartConfiguration};
use crate::parts::{PartMatch, PartResolve, RoutePart};
use crate::pattern::{parse_uri_pattern, PatternContext};
use crate::query::build_query_string;
use crate::services::RoutingServices;
use crate::values::{RouteValue, RouteValues};

const FORMAT_KEY: &str = "@format";

/// The outcome of comparing a route's remaining defaults with leftover values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultsComparison {
    /// Every default is satisfied; matching values were removed.
    Matched,
    /// A default has no counterpart in the values.
    Missing,
    /// A value differs from its default.
    Mismatch,
}

/// A uri pattern with defaults, able to match request paths and resolve
/// route values.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use flowroute_routing::route::Route;
/// use flowroute_routing::services::RoutingServices;
/// use flowroute_routing::values::RouteValues;
///
/// let route = Route::new("blog/{post}", Arc::new(RoutingServices::default()))
///     .with_defaults(RouteValues::from_json(serde_json::json!({"@action": "show"})));
///
/// let values = route.matches("blog/hello").unwrap().unwrap();
/// assert_eq!(values.get("post").and_then(|v| v.as_str()), Some("hello"));
/// assert_eq!(values.get("@action").and_then(|v| v.as_str()), Some("show"));
///
/// assert_eq!(route.resolves(&values).unwrap().as_deref(), Some("blog/hello"));
/// ```
pub struct Route {
    name: Option<String>,
    uri_pattern: String,
    defaults: RouteValues,
    lower_case: bool,
    append_exceeding_arguments: bool,
    route_parts_configuration: BTreeMap<String, RoutePartConfiguration>,
    http_methods: Vec<String>,
    services: Arc<RoutingServices>,
    parts: OnceLock<Vec<RoutePart>>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("uri_pattern", &self.uri_pattern)
            .field("defaults", &self.defaults)
            .field("lower_case", &self.lower_case)
            .field("append_exceeding_arguments", &self.append_exceeding_arguments)
            .field("http_methods", &self.http_methods)
            .field("parsed", &self.parts.get().is_some())
            .finish_non_exhaustive()
    }
}

impl Route {
    /// Creates a route with the case folding and exceeding-argument defaults
    /// of `services.routing`.
    pub fn new(uri_pattern: impl Into<String>, services: Arc<RoutingServices>) -> Self {
        Self {
            name: None,
            uri_pattern: uri_pattern.into(),
            defaults: RouteValues::new(),
            lower_case: services.routing.to_lower_case,
            append_exceeding_arguments: services.routing.append_exceeding_arguments,
            route_parts_configuration: BTreeMap::new(),
            http_methods: Vec::new(),
            services,
            parts: OnceLock::new(),
        }
    }

    /// Creates a route from its declarative form. Absent flags fall back to
    /// `services.routing`.
    pub fn from_configuration(config: &RouteConfiguration, services: Arc<RoutingServices>) -> Self {
        let mut route = Self::new(config.uri_pattern.clone(), services);
        route.name.clone_from(&config.name);
        route.defaults = config.defaults.clone();
        route.route_parts_configuration = config.route_parts.clone();
        route.http_methods = config.http_methods.clone().unwrap_or_default();
        if let Some(lower_case) = config.to_lower_case {
            route.lower_case = lower_case;
        }
        if let Some(append) = config.append_exceeding_arguments {
            route.append_exceeding_arguments = append;
        }
        route
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The name, or the uri pattern for unnamed routes.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.uri_pattern)
    }

    pub fn uri_pattern(&self) -> &str {
        &self.uri_pattern
    }

    pub const fn defaults(&self) -> &RouteValues {
        &self.defaults
    }

    pub const fn lower_case(&self) -> bool {
        self.lower_case
    }

    pub const fn append_exceeding_arguments(&self) -> bool {
        self.append_exceeding_arguments
    }

    pub const fn route_parts_configuration(&self) -> &BTreeMap<String, RoutePartConfiguration> {
        &self.route_parts_configuration
    }

    /// The accepted request methods. Empty accepts any method.
    pub fn http_methods(&self) -> &[String] {
        &self.http_methods
    }

    pub fn has_http_method_constraints(&self) -> bool {
        !self.http_methods.is_empty()
    }

    // ── Mutation ────────────────────────────────────────────────────

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_uri_pattern(&mut self, uri_pattern: impl Into<String>) {
        self.uri_pattern = uri_pattern.into();
        self.parts = OnceLock::new();
    }

    pub fn set_defaults(&mut self, defaults: RouteValues) {
        self.defaults = defaults;
        self.parts = OnceLock::new();
    }

    pub fn set_lower_case(&mut self, lower_case: bool) {
        self.lower_case = lower_case;
        self.parts = OnceLock::new();
    }

    pub fn set_append_exceeding_arguments(&mut self, append: bool) {
        self.append_exceeding_arguments = append;
    }

    pub fn set_route_parts_configuration(&mut self, configuration: BTreeMap<String, RoutePartConfiguration>) {
        self.route_parts_configuration = configuration;
        self.parts = OnceLock::new();
    }

    pub fn set_http_methods(&mut self, methods: Vec<String>) {
        self.http_methods = methods;
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: RouteValues) -> Self {
        self.set_defaults(defaults);
        self
    }

    #[must_use]
    pub fn with_lower_case(mut self, lower_case: bool) -> Self {
        self.set_lower_case(lower_case);
        self
    }

    #[must_use]
    pub fn with_append_exceeding_arguments(mut self, append: bool) -> Self {
        self.set_append_exceeding_arguments(append);
        self
    }

    #[must_use]
    pub fn with_route_part(mut self, name: impl Into<String>, configuration: RoutePartConfiguration) -> Self {
        self.route_parts_configuration.insert(name.into(), configuration);
        self.parts = OnceLock::new();
        self
    }

    #[must_use]
    pub fn with_http_methods(mut self, methods: &[&str]) -> Self {
        self.set_http_methods(methods.iter().map(|m| (*m).to_string()).collect());
        self
    }

    // ── Parsing ─────────────────────────────────────────────────────

    /// Returns the parsed route parts, parsing the pattern on first use.
    ///
    /// A failed parse is not cached, so the error is reported on every call.
    pub fn parse(&self) -> FlowrouteResult<&[RoutePart]> {
        if let Some(parts) = self.parts.get() {
            return Ok(parts.as_slice());
        }
        let ctx = PatternContext {
            route_name: self.label(),
            defaults: &self.defaults,
            route_parts: &self.route_parts_configuration,
            lower_case: self.lower_case,
            services: &self.services,
        };
        let parts = parse_uri_pattern(&self.uri_pattern, &ctx)?;
        Ok(self.parts.get_or_init(|| parts).as_slice())
    }

    // ── Matching ────────────────────────────────────────────────────

    /// Matches a request path, ignoring request methods.
    ///
    /// Returns the route defaults overruled by the matched values, or `None`.
    pub fn matches(&self, path: &str) -> FlowrouteResult<Option<RouteValues>> {
        self.matches_request(path, None)
    }

    /// Matches a request path and method.
    ///
    /// The query string and fragment are ignored, as are leading and trailing
    /// slashes. A route with method constraints only matches a listed method.
    pub fn matches_request(&self, path: &str, method: Option<&str>) -> FlowrouteResult<Option<RouteValues>> {
        if let Some(method) = method {
            if self.has_http_method_constraints()
                && !self.http_methods.iter().any(|m| m.eq_ignore_ascii_case(method))
            {
                return Ok(None);
            }
        }
        let parts = self.parse()?;
        let mut route_path = request_path(path);
        let mut matched = RouteValues::new();
        let mut optional_part_count = 0usize;
        let mut skip_optional_parts = false;

        for part in parts {
            if part.is_optional() {
                optional_part_count += 1;
                if skip_optional_parts {
                    if !part.has_default_value() {
                        return Ok(None);
                    }
                    continue;
                }
            } else {
                optional_part_count = 0;
                skip_optional_parts = false;
            }

            match part.match_path(&mut route_path)? {
                PartMatch::NoMatch => {
                    if part.is_optional() && optional_part_count == 1 && part.has_default_value() {
                        skip_optional_parts = true;
                    } else {
                        return Ok(None);
                    }
                }
                PartMatch::Matched(Some(value)) => {
                    if value.contains_object() {
                        return Err(FlowrouteError::InvalidRoutePartValue(format!(
                            "route part \"{}\" of route \"{}\" matched an object; matched values must not contain objects",
                            part.name(),
                            self.label()
                        )));
                    }
                    matched.set_path(part.name(), value);
                }
                PartMatch::Matched(None) => {}
            }
        }
        if !route_path.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.defaults.merge_recursive_overrule(&matched)))
    }

    // ── Resolving ───────────────────────────────────────────────────

    /// Builds a path (without leading slash) from `route_values`.
    ///
    /// Returns `None` when a part cannot be resolved, a value contradicts a
    /// default, the target controller is unknown, or values are left over
    /// that may not be appended as query arguments.
    pub fn resolves(&self, route_values: &RouteValues) -> FlowrouteResult<Option<String>> {
        let parts = self.parse()?;
        let mut values = route_values.clone();
        let mut remaining_defaults = self.defaults.clone();
        let mut resolved_path = String::new();
        let mut optional_portion = String::new();
        let mut require_optional_parts = false;

        for part in parts {
            let value = match part.resolve(&mut values)? {
                PartResolve::Resolved(value) => Some(self.string_value(part, value)?),
                PartResolve::Unresolved if part.has_default_value() => None,
                PartResolve::Unresolved => return Ok(None),
            };
            if part.is_dynamic() {
                remaining_defaults.remove_path(part.name());
            }
            let default = part
                .default_value()
                .map(|default| {
                    default.to_scalar_string().ok_or_else(|| {
                        FlowrouteError::InvalidRoutePartValue(format!(
                            "the default value of route part \"{}\" of route \"{}\" must be a scalar, got {default:?}",
                            part.name(),
                            self.label()
                        ))
                    })
                })
                .transpose()?;

            if !part.is_optional() {
                // A pending optional portion stays buffered and is flushed by a later optional part.
                resolved_path.push_str(value.as_deref().or(default.as_deref()).unwrap_or_default());
                require_optional_parts = false;
                continue;
            }
            match (&value, &default) {
                (Some(value), Some(default)) if value.to_lowercase() == default.to_lowercase() => {
                    optional_portion.push_str(default);
                }
                (Some(value), _) => {
                    optional_portion.push_str(value);
                    require_optional_parts = true;
                }
                (None, default) => optional_portion.push_str(default.as_deref().unwrap_or_default()),
            }
            if require_optional_parts {
                resolved_path.push_str(&optional_portion);
                optional_portion.clear();
            }
        }

        let comparison = compare_and_remove_matching_defaults(&remaining_defaults, &mut values);
        if comparison != DefaultsComparison::Matched {
            tracing::trace!(route = self.label(), ?comparison, "route values contradict the route defaults");
            return Ok(None);
        }
        if values.get(FORMAT_KEY).and_then(RouteValue::as_str) == Some("") {
            values.remove(FORMAT_KEY);
        }
        if !self.target_controller_exists(route_values) {
            return Ok(None);
        }

        if !values.is_empty() {
            values.remove_empty_recursively();
            values.convert_objects_to_identity_maps()?;
            if !self.append_exceeding_arguments {
                let internal = extract_internal_arguments(&mut values);
                if !values.is_empty() {
                    return Ok(None);
                }
                values = internal;
            }
            let query = build_query_string(&values);
            if !query.is_empty() {
                resolved_path.push('?');
                resolved_path.push_str(&query);
            }
        }
        Ok(Some(resolved_path))
    }

    /// Checks a resolved part value is text.
    fn string_value(&self, part: &RoutePart, value: RouteValue) -> FlowrouteResult<String> {
        match value {
            RouteValue::String(text) => Ok(text),
            other => Err(FlowrouteError::InvalidRoutePartValue(format!(
                "route part \"{}\" ({}) of route \"{}\" resolved to {other:?}, expected a string",
                part.name(),
                part.kind(),
                self.label()
            ))),
        }
    }

    fn target_controller_exists(&self, route_values: &RouteValues) -> bool {
        let merged = self.defaults.merge_recursive_overrule(route_values);
        let text = |key: &str| {
            merged
                .get(key)
                .and_then(RouteValue::to_scalar_string)
                .filter(|s| !s.is_empty())
        };
        let (package, subpackage, controller) = (text("@package"), text("@subpackage"), text("@controller"));
        let exists = self
            .services
            .controllers
            .exists(package.as_deref(), subpackage.as_deref(), controller.as_deref());
        if !exists {
            tracing::trace!(
                route = self.label(),
                package = package.as_deref(),
                subpackage = subpackage.as_deref(),
                controller = controller.as_deref(),
                "target controller does not exist"
            );
        }
        exists
    }
}

/// Strips the query string and fragment and trims slashes.
fn request_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].trim_matches('/')
}

/// Compares `defaults` with `values` recursively, removing every value that
/// equals (case-insensitively) its default.
///
/// A missing value is accepted when its default is empty, or when it is an
/// `@format` defaulting to `html`.
fn compare_and_remove_matching_defaults(defaults: &RouteValues, values: &mut RouteValues) -> DefaultsComparison {
    for (key, default) in defaults {
        let Some(value) = values.get_mut(key).filter(|v| !v.is_null()) else {
            let default_text = default.to_scalar_string();
            let optional = default_text.as_deref() == Some("")
                || (key == FORMAT_KEY && default_text.is_some_and(|t| t.eq_ignore_ascii_case("html")));
            if optional {
                continue;
            }
            return DefaultsComparison::Missing;
        };
        match (default, value) {
            (RouteValue::Map(default), RouteValue::Map(value)) => {
                let nested = compare_and_remove_matching_defaults(default, value);
                if nested != DefaultsComparison::Matched {
                    return nested;
                }
            }
            (RouteValue::Map(_), _) | (_, RouteValue::Map(_)) => return DefaultsComparison::Mismatch,
            (default, value) => {
                let equal = match (value.to_scalar_string(), default.to_scalar_string()) {
                    (Some(value), Some(default)) => value.to_lowercase() == default.to_lowercase(),
                    _ => false,
                };
                if !equal {
                    return DefaultsComparison::Mismatch;
                }
                values.remove(key);
            }
        }
    }
    DefaultsComparison::Matched
}

/// Moves internal arguments out of `arguments`: keys starting with `__`, and
/// internal arguments nested inside maps whose key starts with `--`.
fn extract_internal_arguments(arguments: &mut RouteValues) -> RouteValues {
    let mut internal = RouteValues::new();
    let keys: Vec<String> = arguments.keys().cloned().collect();
    for key in keys {
        if key.starts_with("__") {
            if let Some(value) = arguments.remove(&key) {
                internal.insert(key, value);
            }
            continue;
        }
        if !key.starts_with("--") {
            continue;
        }
        let Some(RouteValue::Map(nested)) = arguments.get_mut(&key) else {
            continue;
        };
        let nested_internal = extract_internal_arguments(nested);
        if nested.is_empty() {
            arguments.remove(&key);
        }
        if !nested_internal.is_empty() {
            internal.insert(key, nested_internal);
        }
    }
    internal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::StaticControllerRegistry;
    use crate::object::SimpleObject;
    use crate::parts::{PartSettings, RoutePartHandler};
    use serde_json::json;

    fn services() -> Arc<RoutingServices> {
        Arc::new(RoutingServices::default())
    }

    fn route(pattern: &str) -> Route {
        Route::new(pattern, services())
    }

    fn values(v: serde_json::Value) -> RouteValues {
        RouteValues::from_json(v)
    }

    // ── Parsing ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_is_memoized_until_mutation() {
        let mut route = route("foo/{bar}");
        assert_eq!(route.parse().unwrap().len(), 2);
        assert!(format!("{route:?}").contains("parsed: true"));
        route.set_uri_pattern("foo");
        assert!(format!("{route:?}").contains("parsed: false"));
        assert_eq!(route.parse().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_errors_surface_on_every_call() {
        let route = route("foo/");
        assert!(matches!(route.matches("foo"), Err(FlowrouteError::InvalidUriPattern(_))));
        assert!(matches!(
            route.resolves(&RouteValues::new()),
            Err(FlowrouteError::InvalidUriPattern(_))
        ));
    }

    #[test]
    fn test_from_configuration_falls_back_to_settings() {
        let config = RouteConfiguration::new("foo")
            .with_name("Foo")
            .with_http_methods(&["POST"]);
        let route = Route::from_configuration(&config, services());
        assert_eq!(route.name(), Some("Foo"));
        assert_eq!(route.label(), "Foo");
        assert!(route.lower_case());
        assert!(!route.append_exceeding_arguments());
        assert_eq!(route.http_methods(), ["POST".to_string()]);
    }

    // ── Matching ────────────────────────────────────────────────────

    #[test]
    fn test_empty_pattern_matches_only_empty_path() {
        let route = route("");
        assert!(route.matches("").unwrap().is_some());
        assert!(route.matches("/").unwrap().is_some());
        assert!(route.matches("foo").unwrap().is_none());
    }

    #[test]
    fn test_match_returns_defaults_overruled_by_values() {
        let route = route("{key1}/{key2}")
            .with_defaults(values(json!({"key1": "default1", "@controller": "Foo"})));
        let matched = route.matches("value1/value2").unwrap().unwrap();
        assert_eq!(
            matched,
            values(json!({"key1": "value1", "key2": "value2", "@controller": "Foo"}))
        );
    }

    #[test]
    fn test_match_ignores_query_string_and_fragment() {
        let route = route("foo/{bar}");
        let matched = route.matches("/foo/baz/?x=1#top").unwrap().unwrap();
        assert_eq!(matched, values(json!({"bar": "baz"})));
    }

    #[test]
    fn test_match_fails_on_leftover_path() {
        let route = route("foo/{bar}");
        assert!(route.matches("foo/bar/baz").unwrap().is_none());
        assert!(route.matches("foo").unwrap().is_none());
    }

    #[test]
    fn test_static_parts_match_case_sensitively() {
        let route = route("Foo/{bar}");
        assert!(route.matches("Foo/Bar").unwrap().is_some());
        assert!(route.matches("foo/Bar").unwrap().is_none());
    }

    #[test]
    fn test_dotted_names_build_nested_values() {
        let route = route("{article.title}/{article.year}");
        let matched = route.matches("hello/2024").unwrap().unwrap();
        assert_eq!(matched, values(json!({"article": {"title": "hello", "year": "2024"}})));
    }

    #[test]
    fn test_optional_section_is_skipped_when_missing() {
        let route = route("foo(/{bar})").with_defaults(values(json!({"bar": "x"})));
        assert_eq!(route.matches("foo").unwrap().unwrap(), values(json!({"bar": "x"})));
        assert_eq!(route.matches("foo/y").unwrap().unwrap(), values(json!({"bar": "y"})));
    }

    #[test]
    fn test_optional_section_without_defaults_cannot_be_skipped() {
        let route = route("foo(/{bar})");
        assert!(route.matches("foo").unwrap().is_none());
        assert!(route.matches("foo/y").unwrap().is_some());
    }

    #[test]
    fn test_several_optional_sections() {
        let route = route("{key1}-({key2})/({key3}).({key4}.{@format})").with_defaults(values(json!({
            "key1": "defaultValue1",
            "key2": "defaultValue2",
            "key3": "defaultValue3",
            "key4": "defaultValue4",
            "@format": "defaultFormat"
        })));
        let matched = route.matches("foo-/.bar.xml").unwrap().unwrap();
        assert_eq!(
            matched,
            values(json!({
                "key1": "foo",
                "key2": "defaultValue2",
                "key3": "defaultValue3",
                "key4": "bar",
                "@format": "xml"
            }))
        );
    }

    #[test]
    fn test_http_method_constraint() {
        let route = route("foo").with_http_methods(&["POST", "PUT"]);
        assert!(route.matches_request("foo", Some("post")).unwrap().is_some());
        assert!(route.matches_request("foo", Some("GET")).unwrap().is_none());
        assert!(route.matches_request("foo", None).unwrap().is_some());
        let any = Route::new("foo", services());
        assert!(any.matches_request("foo", Some("DELETE")).unwrap().is_some());
    }

    // ── Resolving ───────────────────────────────────────────────────

    #[test]
    fn test_resolve_simple_route() {
        let route = route("{key1}-{key2}/{key3}.{key4}.{@format}")
            .with_defaults(values(json!({"@format": "xml"})));
        let resolved = route
            .resolves(&values(json!({"key1": "value1", "key2": "value2", "key3": "value3", "key4": "value4"})))
            .unwrap();
        assert_eq!(resolved.as_deref(), Some("value1-value2/value3.value4.xml"));
    }

    #[test]
    fn test_resolve_rejects_exceeding_arguments() {
        let route = route("{key1}");
        let resolved = route
            .resolves(&values(json!({"key1": "value1", "nonexistingkey": "foo"})))
            .unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_resolve_appends_internal_arguments() {
        let route = route("{key1}");
        let resolved = route
            .resolves(&values(json!({
                "key1": "value1",
                "__someInternalArgument": "someValue",
                "--subRequest": {"__nested": "x"}
            })))
            .unwrap();
        assert_eq!(
            resolved.as_deref(),
            Some("value1?--subRequest%5B__nested%5D=x&__someInternalArgument=someValue")
        );
    }

    #[test]
    fn test_resolve_rejects_identity_for_unknown_argument() {
        let route = route("{key1}");
        let resolved = route
            .resolves(&values(json!({"key1": "value1", "someArgument": {"__identity": "someUuid"}})))
            .unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_resolve_appends_exceeding_arguments_when_enabled() {
        let route = route("foo").with_append_exceeding_arguments(true);
        let resolved = route
            .resolves(&values(json!({"foo": "bar", "baz": {"foo2": "bar2"}, "empty": {"x": null}})))
            .unwrap();
        assert_eq!(resolved.as_deref(), Some("foo?baz%5Bfoo2%5D=bar2&foo=bar"));
    }

    #[test]
    fn test_resolve_values_equal_to_defaults_are_consumed() {
        let route = route("{key2}").with_defaults(values(json!({"key1": "value1", "key2": "value2"})));
        assert_eq!(
            route.resolves(&values(json!({"key1": "VALUE1"}))).unwrap().as_deref(),
            Some("value2")
        );
        assert_eq!(route.resolves(&values(json!({"key1": "other"}))).unwrap(), None);
        assert_eq!(route.resolves(&RouteValues::new()).unwrap(), None);
    }

    #[test]
    fn test_resolve_complex_defaults() {
        let route = route("{key2.key2b}").with_defaults(values(json!({
            "key1": {"key1a": "key1aValue", "key1b": "key1bValue"},
            "key2": {"key2a": "key2aValue", "key2b": "key2bValue"}
        })));
        let resolved = route
            .resolves(&values(json!({
                "key1": {"key1a": "key1aValue", "key1b": "key1bValue"},
                "key2": {"key2a": "key2aValue"}
            })))
            .unwrap();
        assert_eq!(resolved.as_deref(), Some("key2bValue"));
    }

    #[test]
    fn test_resolve_map_against_scalar_default_is_mismatch() {
        let route = route("foo").with_defaults(values(json!({"key1": "value1"})));
        assert_eq!(route.resolves(&values(json!({"key1": {"a": "b"}}))).unwrap(), None);
    }

    #[test]
    fn test_resolve_optional_defaults_are_omitted() {
        let route = route("foo(/{bar})").with_defaults(values(json!({"bar": "x"})));
        assert_eq!(route.resolves(&RouteValues::new()).unwrap().as_deref(), Some("foo"));
        assert_eq!(route.resolves(&values(json!({"bar": "X"}))).unwrap().as_deref(), Some("foo"));
        assert_eq!(route.resolves(&values(json!({"bar": "y"}))).unwrap().as_deref(), Some("foo/y"));
    }

    #[test]
    fn test_resolve_optional_run_flushes_preceding_defaults() {
        let route = route("foo(/{bar}/{baz})")
            .with_defaults(values(json!({"bar": "barDefaultValue", "baz": "bazDefaultValue"})));
        let resolved = route.resolves(&values(json!({"baz": "bazValue"}))).unwrap();
        assert_eq!(resolved.as_deref(), Some("foo/barDefaultValue/bazvalue"));
    }

    #[test]
    fn test_resolve_buffer_carries_across_required_parts() {
        let route = route("({foo})-({bar})").with_defaults(values(json!({"foo": "a", "bar": "b"})));
        let resolved = route.resolves(&values(json!({"bar": "c"}))).unwrap();
        assert_eq!(resolved.as_deref(), Some("-ac"));
        let resolved = route.resolves(&values(json!({"foo": "x"}))).unwrap();
        assert_eq!(resolved.as_deref(), Some("x-"));
    }

    #[test]
    fn test_resolve_case_folding() {
        let route = route("CamelCase/{someKey}");
        assert_eq!(
            route.resolves(&values(json!({"someKey": "CamelCase"}))).unwrap().as_deref(),
            Some("camelcase/camelcase")
        );
        let route = Route::new("CamelCase/{someKey}", services()).with_lower_case(false);
        assert_eq!(
            route.resolves(&values(json!({"someKey": "CamelCase"}))).unwrap().as_deref(),
            Some("CamelCase/CamelCase")
        );
    }

    #[test]
    fn test_resolve_drops_empty_format() {
        let route = route("foo");
        assert_eq!(route.resolves(&values(json!({"@format": ""}))).unwrap().as_deref(), Some("foo"));
    }

    #[test]
    fn test_resolve_html_format_default_may_be_missing() {
        let route = route("foo").with_defaults(values(json!({"@format": "HTML", "empty": ""})));
        assert_eq!(route.resolves(&RouteValues::new()).unwrap().as_deref(), Some("foo"));
    }

    #[test]
    fn test_resolve_requires_existing_controller() {
        let controllers = StaticControllerRegistry::new().with_controller("Acme.Blog", None, "Post");
        let services = Arc::new(RoutingServices::default().with_controllers(Arc::new(controllers)));
        let route = Route::new("blog/{@controller}", services)
            .with_defaults(values(json!({"@package": "Acme.Blog"})));
        assert_eq!(
            route
                .resolves(&values(json!({"@package": "acme.blog", "@controller": "Post"})))
                .unwrap()
                .as_deref(),
            Some("blog/post")
        );
        assert_eq!(
            route
                .resolves(&values(json!({"@package": "Acme.Blog", "@controller": "Comment"})))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_non_scalar_default_is_an_error() {
        let route = route("{foo}").with_defaults(values(json!({"foo": {"bar": "baz"}})));
        assert!(matches!(
            route.resolves(&RouteValues::new()),
            Err(FlowrouteError::InvalidRoutePartValue(_))
        ));
    }

    /// Matches the whole remaining path as an object nested in a map.
    #[derive(Debug)]
    struct ObjectMatchingHandler;

    impl RoutePartHandler for ObjectMatchingHandler {
        fn match_value(&self, _part: &PartSettings, route_path: &mut &str) -> FlowrouteResult<PartMatch> {
            let object = SimpleObject::new("Acme\\Blog\\Author", Some(*route_path)).into_ref();
            *route_path = "";
            let mut value = RouteValues::new();
            value.insert("author", object);
            Ok(PartMatch::Matched(Some(RouteValue::Map(value))))
        }

        fn resolve_value(&self, _part: &PartSettings, _values: &mut RouteValues) -> FlowrouteResult<PartResolve> {
            Ok(PartResolve::Unresolved)
        }
    }

    #[test]
    fn test_match_rejects_objects_in_matched_values() {
        let services = Arc::new(RoutingServices::default().with_handler("ObjectMatching", Arc::new(ObjectMatchingHandler)));
        let route = Route::new("authors/{author}", services).with_route_part(
            "author",
            RoutePartConfiguration {
                handler: Some("ObjectMatching".to_string()),
                ..RoutePartConfiguration::default()
            },
        );
        assert!(matches!(
            route.matches("authors/jane"),
            Err(FlowrouteError::InvalidRoutePartValue(_))
        ));
        assert!(route.matches("posts/jane").unwrap().is_none());
    }

    #[test]
    fn test_resolve_round_trip() {
        let route = route("blog/{year}/{title}(.{@format})")
            .with_defaults(values(json!({"@format": "html", "@action": "show"})));
        let matched = route.matches("blog/2024/hello%20world").unwrap().unwrap();
        assert_eq!(
            matched,
            values(json!({"year": "2024", "title": "hello world", "@format": "html", "@action": "show"}))
        );
        assert_eq!(
            route.resolves(&matched).unwrap().as_deref(),
            Some("blog/2024/hello%20world")
        );
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("/foo/bar/"), "foo/bar");
        assert_eq!(request_path("foo?bar=/baz"), "foo");
        assert_eq!(request_path("foo#/frag"), "foo");
        assert_eq!(request_path("/"), "");
    }

    #[test]
    fn test_compare_and_remove_matching_defaults() {
        let defaults = values(json!({"a": "X", "nested": {"b": "y"}}));
        let mut leftover = values(json!({"a": "x", "nested": {"b": "Y", "c": "z"}, "d": "e"}));
        assert_eq!(
            compare_and_remove_matching_defaults(&defaults, &mut leftover),
            DefaultsComparison::Matched
        );
        assert_eq!(leftover, values(json!({"nested": {"c": "z"}, "d": "e"})));

        let mut missing = values(json!({"nested": {"b": "y"}}));
        assert_eq!(
            compare_and_remove_matching_defaults(&defaults, &mut missing),
            DefaultsComparison::Missing
        );

        let mut mismatch = values(json!({"a": "x", "nested": {"b": "other"}}));
        assert_eq!(
            compare_and_remove_matching_defaults(&defaults, &mut mismatch),
            DefaultsComparison::Mismatch
        );
    }

    #[test]
    fn test_extract_internal_arguments() {
        let mut arguments = values(json!({
            "__internal": "a",
            "public": "b",
            "--sub": {"__nested": "c", "other": "d"},
            "--empty": {"__only": "e"}
        }));
        let internal = extract_internal_arguments(&mut arguments);
        assert_eq!(
            internal,
            values(json!({"__internal": "a", "--sub": {"__nested": "c"}, "--empty": {"__only": "e"}}))
        );
        assert_eq!(arguments, values(json!({"public": "b", "--sub": {"other": "d"}})));
    }
}
