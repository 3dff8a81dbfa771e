//! Literal text in a uri pattern.

use super::{PartMatch, PartResolve, PartSettings};
use crate::values::RouteValue;

/// Fixed text such as `blog/` or `.`.
///
/// Matching is always case-sensitive. The default value is the literal text
/// itself, which lets an optional section made only of static text be skipped.
#[derive(Debug, Clone)]
pub struct StaticRoutePart {
    settings: PartSettings,
}

impl StaticRoutePart {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut settings = PartSettings::new(text.clone());
        settings.default_value = Some(RouteValue::String(text));
        Self { settings }
    }

    pub const fn settings(&self) -> &PartSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut PartSettings {
        &mut self.settings
    }

    pub fn match_path(&self, route_path: &mut &str) -> PartMatch {
        let text = self.settings.name.as_str();
        let path = *route_path;
        if text.is_empty() || path.is_empty() {
            return PartMatch::NoMatch;
        }
        match path.strip_prefix(text) {
            Some(rest) => {
                *route_path = rest;
                PartMatch::Matched(None)
            }
            None => PartMatch::NoMatch,
        }
    }

    pub fn resolve(&self) -> PartResolve {
        if self.settings.name.is_empty() {
            return PartResolve::Unresolved;
        }
        let text = if self.settings.lower_case {
            self.settings.name.to_lowercase()
        } else {
            self.settings.name.clone()
        };
        PartResolve::Resolved(RouteValue::String(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_consumes_prefix() {
        let part = StaticRoutePart::new("foo/");
        let mut path = "foo/bar";
        assert_eq!(part.match_path(&mut path), PartMatch::Matched(None));
        assert_eq!(path, "bar");
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let part = StaticRoutePart::new("Foo");
        let mut path = "foo";
        assert_eq!(part.match_path(&mut path), PartMatch::NoMatch);
        assert_eq!(path, "foo");
    }

    #[test]
    fn test_match_fails_on_empty_path() {
        let part = StaticRoutePart::new("foo");
        let mut path = "";
        assert_eq!(part.match_path(&mut path), PartMatch::NoMatch);
    }

    #[test]
    fn test_resolve_lower_cases() {
        let mut part = StaticRoutePart::new("Foo");
        assert_eq!(part.resolve(), PartResolve::Resolved(RouteValue::from("foo")));
        part.settings_mut().lower_case = false;
        assert_eq!(part.resolve(), PartResolve::Resolved(RouteValue::from("Foo")));
    }
}
