//! Placeholders that stand for persisted objects.
//!
//! An identity part renders an object as a path segment and turns that
//! segment back into an `{"__identity": ...}` value when matching.
//!
//! Without a sub-pattern the segment is the object's (percent-encoded)
//! identifier. With a sub-pattern such as `{date:Y}/{title}` the segment is
//! derived from the object's properties once, stored as an
//! [`ObjectPathMapping`], and reused from then on. Colliding segments get a
//! numeric suffix (`hello-world`, `hello-world-2`, ...).

use std::sync::{Arc, OnceLock};

use regex::Regex;

use flowroute_core::utils::text::rewrite_for_uri;
use flowroute_core::{FlowrouteError, FlowrouteResult};

use super::dynamic::find_value_to_match;
use super::{PartMatch, PartResolve, PartSettings};
use crate::object::ObjectRef;
use crate::persistence::ObjectPathMapping;
use crate::query::{decode, encode_component};
use crate::services::RoutingServices;
use crate::values::{RouteValue, RouteValues};

/// The highest number of candidate segments tried before giving up.
const MAX_SEGMENT_ATTEMPTS: usize = 100;

/// Matches an escaped `{...}` placeholder inside a `regex::escape`d sub-pattern.
fn escaped_placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\\{[^}]+\\\}").unwrap())
}

/// Splits a sub-pattern into literal text and `{property:format}` pieces.
fn sub_pattern_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?P<dynamic>\{?)(?P<content>[^}{]+)\}?").unwrap())
}

/// A placeholder backed by object path mappings.
#[derive(Clone)]
pub struct IdentityRoutePart {
    settings: PartSettings,
    object_type: String,
    uri_pattern: Option<String>,
    /// Matches the segment a sub-pattern can produce, followed by the split string.
    segment_regex: Option<Regex>,
    services: Arc<RoutingServices>,
}

impl std::fmt::Debug for IdentityRoutePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRoutePart")
            .field("settings", &self.settings)
            .field("object_type", &self.object_type)
            .field("uri_pattern", &self.uri_pattern)
            .field("segment_regex", &self.segment_regex.as_ref().map(Regex::as_str))
            .finish_non_exhaustive()
    }
}

impl IdentityRoutePart {
    /// Creates an identity part for `object_type`. An empty `uri_pattern`
    /// counts as no sub-pattern.
    pub fn new(
        settings: PartSettings,
        object_type: impl Into<String>,
        uri_pattern: Option<&str>,
        services: Arc<RoutingServices>,
    ) -> FlowrouteResult<Self> {
        let mut part = Self {
            settings,
            object_type: object_type.into(),
            uri_pattern: uri_pattern.filter(|p| !p.is_empty()).map(String::from),
            segment_regex: None,
            services,
        };
        part.segment_regex = part.build_segment_regex()?;
        Ok(part)
    }

    pub const fn settings(&self) -> &PartSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut PartSettings {
        &mut self.settings
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn uri_pattern(&self) -> Option<&str> {
        self.uri_pattern.as_deref()
    }

    pub(crate) fn set_split_string(&mut self, split_string: &str) -> FlowrouteResult<()> {
        self.settings.split_string = Some(split_string.to_string());
        self.segment_regex = self.build_segment_regex()?;
        Ok(())
    }

    fn build_segment_regex(&self) -> FlowrouteResult<Option<Regex>> {
        let Some(uri_pattern) = &self.uri_pattern else {
            return Ok(None);
        };
        let mut source = String::from("^(");
        source.push_str(&escaped_placeholder_regex().replace_all(&regex::escape(uri_pattern), "[^/]+"));
        source.push(')');
        if let Some(split) = self.settings.split_string() {
            source.push_str(&regex::escape(split));
        }
        Regex::new(&source).map(Some).map_err(|e| {
            FlowrouteError::InvalidUriPattern(format!(
                "invalid uriPattern \"{uri_pattern}\" for route part \"{}\": {e}",
                self.settings.name
            ))
        })
    }

    fn find_value_to_match<'a>(&self, route_path: &'a str) -> &'a str {
        if route_path.is_empty() || route_path.starts_with('/') {
            return "";
        }
        match &self.segment_regex {
            None => find_value_to_match(route_path, self.settings.split_string()),
            Some(regex) => regex
                .captures(route_path.trim_end_matches('/'))
                .and_then(|captures| captures.get(1))
                .map_or("", |m| &route_path[..m.end()]),
        }
    }

    pub fn match_path(&self, route_path: &mut &str) -> FlowrouteResult<PartMatch> {
        let path = *route_path;
        let candidate = self.find_value_to_match(path);
        if candidate.is_empty() {
            return Ok(PartMatch::NoMatch);
        }
        let identifier = match &self.uri_pattern {
            None => {
                let identifier = decode(candidate);
                self.services
                    .persistence
                    .object_by_identifier(&identifier, &self.object_type)?
                    .map(|_| identifier)
            }
            Some(uri_pattern) => self
                .services
                .mappings
                .find_by_path_segment(&self.object_type, uri_pattern, candidate, !self.settings.lower_case)?
                .map(|mapping| mapping.identifier),
        };
        let Some(identifier) = identifier else {
            return Ok(PartMatch::NoMatch);
        };
        *route_path = &path[candidate.len()..];
        Ok(PartMatch::Matched(Some(RouteValue::identity(identifier))))
    }

    pub fn resolve(&self, values: &mut RouteValues) -> FlowrouteResult<PartResolve> {
        let identifier = match values.get_path(&self.settings.name) {
            Some(RouteValue::Object(object)) if object.object_type() == self.object_type => object.identifier(),
            Some(value @ RouteValue::Map(_)) => value.identity_of(),
            _ => None,
        };
        let Some(identifier) = identifier else {
            return Ok(PartResolve::Unresolved);
        };
        let Some(segment) = self.path_segment_for(&identifier)? else {
            return Ok(PartResolve::Unresolved);
        };
        values.remove_path(&self.settings.name);
        Ok(PartResolve::Resolved(RouteValue::String(segment)))
    }

    /// Returns the path segment for `identifier`, creating and storing a new
    /// mapping when none exists yet.
    fn path_segment_for(&self, identifier: &str) -> FlowrouteResult<Option<String>> {
        let Some(uri_pattern) = &self.uri_pattern else {
            return Ok(Some(encode_component(identifier)));
        };
        let mappings = &self.services.mappings;
        if let Some(existing) = mappings.find_by_identifier(&self.object_type, uri_pattern, identifier)? {
            return Ok(Some(self.fold_case(existing.path_segment)));
        }
        let Some(object) = self
            .services
            .persistence
            .object_by_identifier(identifier, &self.object_type)?
        else {
            return Ok(None);
        };
        let base = self.path_segment_for_object(&object, uri_pattern)?;

        let mut candidate = base.clone();
        for attempt in 1..=MAX_SEGMENT_ATTEMPTS {
            let owner = if candidate.is_empty() {
                None
            } else {
                mappings.find_by_path_segment(&self.object_type, uri_pattern, &candidate, !self.settings.lower_case)?
            };
            if let Some(owner) = owner.as_ref().filter(|owner| owner.identifier == identifier) {
                return Ok(Some(self.fold_case(owner.path_segment.clone())));
            }
            if !candidate.is_empty() && owner.is_none() {
                let mapping = ObjectPathMapping::new(&self.object_type, uri_pattern, &candidate, identifier);
                match mappings.add(mapping) {
                    Ok(()) => {
                        tracing::info!(
                            object_type = %self.object_type,
                            uri_pattern = %uri_pattern,
                            path_segment = %candidate,
                            identifier = %identifier,
                            "created object path mapping"
                        );
                        return Ok(Some(self.fold_case(candidate)));
                    }
                    Err(FlowrouteError::DuplicatePathSegment(reason)) => {
                        if let Some(existing) = mappings.find_by_identifier(&self.object_type, uri_pattern, identifier)? {
                            tracing::debug!(%reason, "identifier mapped concurrently, reusing its path segment");
                            return Ok(Some(self.fold_case(existing.path_segment)));
                        }
                        tracing::debug!(%reason, "path segment taken concurrently, trying next suffix");
                    }
                    Err(e) => return Err(e),
                }
            }
            candidate = format!("{base}-{}", attempt + 1);
        }
        Err(FlowrouteError::InfiniteLoop(format!(
            "no unique path segment for \"{identifier}\" ({}) after {MAX_SEGMENT_ATTEMPTS} attempts",
            self.object_type
        )))
    }

    /// Builds the candidate segment for `object` from the sub-pattern.
    ///
    /// Literal text is kept as written; each `{property}` or
    /// `{property:date format}` is read from the object and rewritten for use
    /// in a uri. Missing properties render as empty text.
    fn path_segment_for_object(&self, object: &ObjectRef, uri_pattern: &str) -> FlowrouteResult<String> {
        let separator = &self.services.routing.path_segment_separator;
        let mut segment = String::new();
        for token in sub_pattern_token_regex().captures_iter(uri_pattern) {
            let content = &token["content"];
            if token["dynamic"].is_empty() {
                segment.push_str(content);
                continue;
            }
            let (property, format) = match content.split_once(':') {
                Some((property, format)) => (property, Some(format.trim())),
                None => (content, None),
            };
            if property.is_empty() {
                return Err(FlowrouteError::InvalidUriPattern(format!(
                    "empty property in uriPattern \"{uri_pattern}\" of route part \"{}\"",
                    self.settings.name
                )));
            }
            if let Some(value) = object.property(property) {
                segment.push_str(&rewrite_for_uri(&value.render(format), separator));
            }
        }
        Ok(segment)
    }

    fn fold_case(&self, segment: String) -> String {
        if self.settings.lower_case {
            segment.to_lowercase()
        } else {
            segment
        }
    }
}
