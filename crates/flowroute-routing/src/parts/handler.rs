//! User-supplied route part handlers.
//!
//! A route part configured with `handler = "name"` delegates to the
//! [`RoutePartHandler`] registered under that name. Handlers receive the
//! part's [`PartSettings`] on every call instead of holding per-part state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use flowroute_core::FlowrouteResult;

use super::{PartMatch, PartResolve, PartSettings};
use crate::values::RouteValues;

/// The match/resolve contract of a custom route part.
pub trait RoutePartHandler: Send + Sync + fmt::Debug {
    /// Tries to consume a prefix of `route_path`, advancing it on a match.
    fn match_value(&self, part: &PartSettings, route_path: &mut &str) -> FlowrouteResult<PartMatch>;

    /// Tries to produce uri text from `values`, removing what was consumed.
    fn resolve_value(&self, part: &PartSettings, values: &mut RouteValues) -> FlowrouteResult<PartResolve>;
}

/// Handlers available to the route pattern parser, keyed by name.
#[derive(Clone, Default)]
pub struct RoutePartHandlerRegistry {
    handlers: HashMap<String, Arc<dyn RoutePartHandler>>,
}

impl fmt::Debug for RoutePartHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("RoutePartHandlerRegistry")
            .field("handlers", &names)
            .finish()
    }
}

impl RoutePartHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any previous handler.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn RoutePartHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RoutePartHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

/// A route part backed by a registered handler.
#[derive(Debug, Clone)]
pub struct CustomRoutePart {
    settings: PartSettings,
    handler_name: String,
    handler: Arc<dyn RoutePartHandler>,
}

impl CustomRoutePart {
    pub fn new(settings: PartSettings, handler_name: impl Into<String>, handler: Arc<dyn RoutePartHandler>) -> Self {
        Self {
            settings,
            handler_name: handler_name.into(),
            handler,
        }
    }

    pub const fn settings(&self) -> &PartSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut PartSettings {
        &mut self.settings
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub fn match_path(&self, route_path: &mut &str) -> FlowrouteResult<PartMatch> {
        let mut remaining = *route_path;
        let result = self.handler.match_value(&self.settings, &mut remaining)?;
        if result.is_match() {
            *route_path = remaining;
        }
        Ok(result)
    }

    pub fn resolve(&self, values: &mut RouteValues) -> FlowrouteResult<PartResolve> {
        let mut working = values.clone();
        let result = self.handler.resolve_value(&self.settings, &mut working)?;
        if matches!(result, PartResolve::Resolved(_)) {
            *values = working;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::RouteValue;
    use serde_json::json;

    /// Matches a run of ASCII digits and resolves integers as zero-padded text.
    #[derive(Debug)]
    struct PaddedNumber;

    impl RoutePartHandler for PaddedNumber {
        fn match_value(&self, _part: &PartSettings, route_path: &mut &str) -> FlowrouteResult<PartMatch> {
            let digits = route_path.chars().take_while(char::is_ascii_digit).count();
            if digits == 0 {
                return Ok(PartMatch::NoMatch);
            }
            let (number, rest) = route_path.split_at(digits);
            *route_path = rest;
            let value = number.trim_start_matches('0');
            Ok(PartMatch::Matched(Some(RouteValue::from(if value.is_empty() { "0" } else { value }))))
        }

        fn resolve_value(&self, part: &PartSettings, values: &mut RouteValues) -> FlowrouteResult<PartResolve> {
            let Some(RouteValue::Integer(n)) = values.get_path(&part.name) else {
                return Ok(PartResolve::Unresolved);
            };
            let width = part
                .options
                .get("width")
                .and_then(RouteValue::to_scalar_string)
                .and_then(|w| w.parse::<usize>().ok())
                .unwrap_or(4);
            let text = format!("{n:0width$}");
            values.remove_path(&part.name);
            Ok(PartResolve::Resolved(RouteValue::from(text)))
        }
    }

    fn custom_part() -> CustomRoutePart {
        let mut settings = PartSettings::new("page");
        settings.options = RouteValues::from_json(json!({"width": 3}));
        CustomRoutePart::new(settings, "padded", Arc::new(PaddedNumber))
    }

    #[test]
    fn test_registry() {
        let mut registry = RoutePartHandlerRegistry::new();
        assert!(!registry.contains("padded"));
        registry.register("padded", Arc::new(PaddedNumber));
        assert!(registry.contains("padded"));
        assert!(registry.get("padded").is_some());
        assert!(registry.get("other").is_none());
        assert!(format!("{registry:?}").contains("padded"));
    }

    #[test]
    fn test_custom_part_match() {
        let part = custom_part();
        assert_eq!(part.handler_name(), "padded");
        let mut path = "007/rest";
        assert_eq!(
            part.match_path(&mut path).unwrap(),
            PartMatch::Matched(Some(RouteValue::from("7")))
        );
        assert_eq!(path, "/rest");

        let mut path = "abc";
        assert_eq!(part.match_path(&mut path).unwrap(), PartMatch::NoMatch);
        assert_eq!(path, "abc");
    }

    #[test]
    fn test_custom_part_resolve_uses_options() {
        let part = custom_part();
        let mut values = RouteValues::from_json(json!({"page": 7, "keep": "x"}));
        assert_eq!(
            part.resolve(&mut values).unwrap(),
            PartResolve::Resolved(RouteValue::from("007"))
        );
        assert_eq!(values, RouteValues::from_json(json!({"keep": "x"})));
    }

    #[test]
    fn test_custom_part_unresolved_leaves_values() {
        let part = custom_part();
        let mut values = RouteValues::from_json(json!({"page": "seven"}));
        assert_eq!(part.resolve(&mut values).unwrap(), PartResolve::Unresolved);
        assert_eq!(values, RouteValues::from_json(json!({"page": "seven"})));
    }
}
