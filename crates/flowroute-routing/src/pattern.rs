//! Route pattern parsing.
//!
//! A uri pattern such as `blog/{post}(.{@format})` is split into tokens of
//! the shape `(? {? content }? )?`: an optional-section start, a `{` marking a
//! placeholder, the content, and an optional-section end. Each token becomes
//! one [`RoutePart`]. A static token that follows a placeholder becomes that
//! placeholder's split string.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use flowroute_core::{FlowrouteError, FlowrouteResult};

use crate::config::RoutePartConfiguration;
use crate::parts::{
    CustomRoutePart, DynamicRoutePart, IdentityRoutePart, PartSettings, RoutePart, StaticRoutePart,
};
use crate::services::RoutingServices;
use crate::values::RouteValues;

fn route_part_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?P<optionalStart>\(?)(?P<dynamic>\{?)(?P<content>@?[^}{()]+)(?P<dynamicEnd>\}?)(?P<optionalEnd>\)?)",
        )
        .unwrap()
    })
}

/// Everything the parser needs besides the pattern text.
#[derive(Debug, Clone, Copy)]
pub struct PatternContext<'a> {
    /// Used in error messages only.
    pub route_name: &'a str,
    pub defaults: &'a RouteValues,
    pub route_parts: &'a BTreeMap<String, RoutePartConfiguration>,
    /// The route-wide case folding flag, overridable per part.
    pub lower_case: bool,
    pub services: &'a Arc<RoutingServices>,
}

impl PatternContext<'_> {
    fn error(&self, pattern: &str, reason: &str) -> FlowrouteError {
        FlowrouteError::InvalidUriPattern(format!(
            "the URI pattern \"{pattern}\" of route \"{}\" {reason}",
            self.route_name
        ))
    }
}

/// Parses `pattern` into its route parts.
///
/// An empty pattern yields no parts. Structural problems (leading or trailing
/// `/`, adjacent placeholders, unbalanced or successive optional sections,
/// unclosed braces) are reported as [`FlowrouteError::InvalidUriPattern`];
/// a part configured with an unregistered handler as
/// [`FlowrouteError::InvalidRoutePartHandler`].
pub fn parse_uri_pattern(pattern: &str, ctx: &PatternContext<'_>) -> FlowrouteResult<Vec<RoutePart>> {
    let mut parts: Vec<RoutePart> = Vec::new();
    if pattern.is_empty() {
        return Ok(parts);
    }
    if pattern.ends_with('/') {
        return Err(ctx.error(pattern, "ends with a slash, which is not allowed"));
    }
    if pattern.starts_with('/') {
        return Err(ctx.error(pattern, "starts with a slash, which is not allowed"));
    }

    let mut in_optional_section = false;
    let mut position = 0;
    for captures in route_part_token_regex().captures_iter(pattern) {
        let Some(token) = captures.get(0) else { continue };
        if token.start() != position {
            return Err(ctx.error(
                pattern,
                &format!("contains unexpected characters at offset {position}"),
            ));
        }
        position = token.end();

        let is_dynamic = !captures["dynamic"].is_empty();
        if is_dynamic != !captures["dynamicEnd"].is_empty() {
            return Err(ctx.error(pattern, "contains an unbalanced curly brace"));
        }
        let content = &captures["content"];

        if !captures["optionalStart"].is_empty() {
            if in_optional_section {
                return Err(ctx.error(pattern, "contains nested optional sections, which is not allowed"));
            }
            if parts.last().is_some_and(RoutePart::is_optional) {
                return Err(ctx.error(
                    pattern,
                    "contains successive optional Route sections, which is not allowed",
                ));
            }
            in_optional_section = true;
        }

        let mut part = if is_dynamic {
            if parts.last().is_some_and(RoutePart::is_dynamic) {
                return Err(ctx.error(
                    pattern,
                    "contains successive dynamic route parts, which is not allowed",
                ));
            }
            dynamic_part(content, in_optional_section, ctx)?
        } else {
            if let Some(previous) = parts.last_mut() {
                previous.set_split_string(content)?;
            }
            let mut part = RoutePart::Static(StaticRoutePart::new(content));
            part.set_optional(in_optional_section);
            part.set_lower_case(lower_case_for(content, ctx));
            part
        };
        if let Some(options) = ctx.route_parts.get(content).map(|c| &c.options) {
            if !options.is_empty() {
                part.set_options(options.clone());
            }
        }
        parts.push(part);

        if !captures["optionalEnd"].is_empty() {
            if !in_optional_section {
                return Err(ctx.error(pattern, "contains an unopened optional section"));
            }
            in_optional_section = false;
        }
    }
    if position != pattern.len() {
        return Err(ctx.error(
            pattern,
            &format!("contains unexpected characters at offset {position}"),
        ));
    }
    if in_optional_section {
        return Err(ctx.error(pattern, "contains an unterminated optional section"));
    }
    Ok(parts)
}

fn lower_case_for(name: &str, ctx: &PatternContext<'_>) -> bool {
    ctx.route_parts
        .get(name)
        .and_then(|c| c.to_lower_case)
        .unwrap_or(ctx.lower_case)
}

/// Builds the part for a `{name}` token: custom when a handler is configured,
/// identity when an object type is, dynamic otherwise.
fn dynamic_part(name: &str, optional: bool, ctx: &PatternContext<'_>) -> FlowrouteResult<RoutePart> {
    let settings = PartSettings {
        name: name.to_string(),
        optional,
        lower_case: lower_case_for(name, ctx),
        default_value: ctx.defaults.get_path(name).filter(|v| !v.is_null()).cloned(),
        split_string: None,
        options: RouteValues::new(),
    };
    let Some(config) = ctx.route_parts.get(name) else {
        return Ok(RoutePart::Dynamic(DynamicRoutePart::new(settings)));
    };

    if let Some(handler_name) = &config.handler {
        let handler = ctx.services.handlers.get(handler_name).ok_or_else(|| {
            FlowrouteError::InvalidRoutePartHandler(format!(
                "route part \"{name}\" of route \"{}\" uses the handler \"{handler_name}\", which is not registered",
                ctx.route_name
            ))
        })?;
        return Ok(RoutePart::Custom(CustomRoutePart::new(settings, handler_name, handler)));
    }
    if let Some(object_type) = &config.object_type {
        return IdentityRoutePart::new(
            settings,
            object_type,
            config.uri_pattern.as_deref(),
            Arc::clone(ctx.services),
        )
        .map(RoutePart::Identity);
    }
    Ok(RoutePart::Dynamic(DynamicRoutePart::new(settings)))
}
