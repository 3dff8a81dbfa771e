//! The `routes:*` management commands.
//!
//! `routes:list` and `routes:show` inspect the configured route list;
//! `routes:match` and `routes:resolve` run the router in either direction.
//! Each command renders its report with a plain function so the output can
//! be tested without capturing stdout.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use flowroute_core::{FlowrouteError, FlowrouteResult, Settings};
use flowroute_routing::{Route, RouteValue, RouteValues};

use super::{load_router, write_stdout};
use crate::command::ManagementCommand;

/// One row of `routes:list --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub uri_pattern: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub http_methods: Vec<String>,
}

impl RouteSummary {
    pub fn new(index: usize, route: &Route) -> Self {
        Self {
            index,
            name: route.name().map(str::to_string),
            uri_pattern: route.uri_pattern().to_string(),
            http_methods: route.http_methods().to_vec(),
        }
    }
}

/// Renders the route list as an aligned table, in matching order.
pub fn render_route_list(routes: &[Arc<Route>]) -> String {
    if routes.is_empty() {
        return "No routes configured".to_string();
    }
    let summaries: Vec<RouteSummary> = routes
        .iter()
        .enumerate()
        .map(|(index, route)| RouteSummary::new(index, route))
        .collect();
    let name_width = summaries
        .iter()
        .map(|s| s.name.as_deref().map_or(1, str::len))
        .max()
        .unwrap_or(1)
        .max("NAME".len());

    let header = format!("{:>3}  {:<name_width$}  {:<8}  URI PATTERN", "#", "NAME", "METHODS");
    let rows = summaries.iter().map(|summary| {
        let methods = if summary.http_methods.is_empty() {
            "ANY".to_string()
        } else {
            summary.http_methods.join(",")
        };
        format!(
            "{:>3}  {:<name_width$}  {:<8}  {}",
            summary.index,
            summary.name.as_deref().unwrap_or("-"),
            methods,
            summary.uri_pattern
        )
    });
    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

/// Renders one route with its options and parsed parts.
pub fn render_route_details(index: usize, route: &Route) -> FlowrouteResult<String> {
    let mut lines = vec![
        format!("Route #{index}"),
        format!("  name:                     {}", route.name().unwrap_or("-")),
        format!("  uriPattern:               {}", route.uri_pattern()),
        format!("  toLowerCase:              {}", route.lower_case()),
        format!("  appendExceedingArguments: {}", route.append_exceeding_arguments()),
    ];
    if route.has_http_method_constraints() {
        lines.push(format!("  httpMethods:              {}", route.http_methods().join(", ")));
    }
    if !route.defaults().is_empty() {
        lines.push(format!("  defaults:                 {}", to_json_string(route.defaults())?));
    }
    lines.push("  parts:".to_string());
    for part in route.parse()? {
        let mut line = format!("    {:<8} {}", part.kind(), part.name());
        if part.is_optional() {
            line.push_str(" (optional)");
        }
        if let Some(default) = part.default_value().and_then(RouteValue::to_scalar_string) {
            line.push_str(&format!(" = \"{default}\""));
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Parses `key=value` assignments into route values. Dotted keys build
/// nested values, so `post.__identity=42` addresses an object by identity.
pub fn parse_assignments<'a>(assignments: impl IntoIterator<Item = &'a str>) -> FlowrouteResult<RouteValues> {
    let mut values = RouteValues::new();
    for assignment in assignments {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            FlowrouteError::Configuration(format!("expected key=value, got \"{assignment}\""))
        })?;
        let key = key.trim();
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(FlowrouteError::Configuration(format!(
                "invalid route value key in \"{assignment}\""
            )));
        }
        values.set_path(key, RouteValue::from(value));
    }
    Ok(values)
}

fn to_json_string(values: &RouteValues) -> FlowrouteResult<String> {
    serde_json::to_string(values).map_err(|e| FlowrouteError::Serialization(e.to_string()))
}

// ── routes:list ─────────────────────────────────────────────────────

/// Lists the configured routes in matching order.
pub struct RoutesListCommand;

#[async_trait]
impl ManagementCommand for RoutesListCommand {
    fn name(&self) -> &'static str {
        "routes:list"
    }

    fn help(&self) -> &'static str {
        "List all routes in matching order"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print the list as JSON"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FlowrouteError> {
        let router = load_router(settings)?;
        let routes = router.routes();
        let output = if matches.get_flag("json") {
            let summaries: Vec<RouteSummary> = routes
                .iter()
                .enumerate()
                .map(|(index, route)| RouteSummary::new(index, route))
                .collect();
            serde_json::to_string_pretty(&summaries)
                .map_err(|e| FlowrouteError::Serialization(e.to_string()))?
        } else {
            render_route_list(&routes)
        };
        write_stdout(output).await
    }
}

// ── routes:show ─────────────────────────────────────────────────────

/// Shows the options and parsed parts of one route.
pub struct RoutesShowCommand;

#[async_trait]
impl ManagementCommand for RoutesShowCommand {
    fn name(&self) -> &'static str {
        "routes:show"
    }

    fn help(&self) -> &'static str {
        "Show details of the route at the given index"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("index")
                .required(true)
                .value_parser(clap::value_parser!(usize))
                .help("Position in the route list, as printed by routes:list"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FlowrouteError> {
        let index = matches.get_one::<usize>("index").copied().unwrap_or_default();
        let router = load_router(settings)?;
        let routes = router.routes();
        let route = routes.get(index).ok_or_else(|| {
            FlowrouteError::Configuration(format!(
                "no route at index {index}; {} route(s) configured",
                routes.len()
            ))
        })?;
        write_stdout(render_route_details(index, route)?).await
    }
}

// ── routes:match ────────────────────────────────────────────────────

/// Matches a request path and prints the route values.
pub struct RoutesMatchCommand;

#[async_trait]
impl ManagementCommand for RoutesMatchCommand {
    fn name(&self) -> &'static str {
        "routes:match"
    }

    fn help(&self) -> &'static str {
        "Match a request path against the routes"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(clap::Arg::new("path").required(true).help("The request path"))
            .arg(
                clap::Arg::new("method")
                    .long("method")
                    .help("Request method; routes with httpMethods only match when given"),
            )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FlowrouteError> {
        let path = matches.get_one::<String>("path").map_or("", String::as_str);
        let method = matches.get_one::<String>("method");
        let router = load_router(settings)?;

        let values = match method {
            Some(method) => router.route_request(path, method)?,
            None => router.route(path)?,
        };
        let (Some(values), Some(route)) = (values, router.last_matched_route()) else {
            return Err(FlowrouteError::NoMatchingRoute(format!(
                "no route matches the path \"{path}\""
            )));
        };

        let output = format!("Route:  {}\nValues: {}", route.label(), to_json_string(&values)?);
        write_stdout(output).await
    }
}

// ── routes:resolve ──────────────────────────────────────────────────

/// Resolves route values into a path.
pub struct RoutesResolveCommand;

#[async_trait]
impl ManagementCommand for RoutesResolveCommand {
    fn name(&self) -> &'static str {
        "routes:resolve"
    }

    fn help(&self) -> &'static str {
        "Build a path from key=value route values"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("values")
                .num_args(1..)
                .required(true)
                .help("Route values as key=value, e.g. @controller=post @action=show"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FlowrouteError> {
        let values = parse_assignments(
            matches
                .get_many::<String>("values")
                .into_iter()
                .flatten()
                .map(String::as_str),
        )?;
        let router = load_router(settings)?;
        let path = router.resolve(&values)?;
        let label = router
            .last_resolved_route()
            .map_or_else(String::new, |route| route.label().to_string());

        write_stdout(format!("Route: {label}\nPath:  {path}")).await
    }
}
