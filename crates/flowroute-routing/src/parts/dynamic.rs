//! Named placeholders such as `{title}` or `{@action}`.

use super::{PartMatch, PartResolve, PartSettings};
use crate::query::{decode, encode_path};
use crate::values::{RouteValue, RouteValues};

/// A named placeholder matching one path segment, or up to its split string.
#[derive(Debug, Clone)]
pub struct DynamicRoutePart {
    settings: PartSettings,
}

impl DynamicRoutePart {
    pub const fn new(settings: PartSettings) -> Self {
        Self { settings }
    }

    pub const fn settings(&self) -> &PartSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut PartSettings {
        &mut self.settings
    }

    pub fn match_path(&self, route_path: &mut &str) -> PartMatch {
        if self.settings.name.is_empty() {
            return PartMatch::NoMatch;
        }
        let path = *route_path;
        let candidate = find_value_to_match(path, self.settings.split_string());
        if candidate.is_empty() {
            return PartMatch::NoMatch;
        }
        let mut value = decode(candidate);
        if self.settings.lower_case {
            value = value.to_lowercase();
        }
        *route_path = &path[candidate.len()..];
        PartMatch::Matched(Some(RouteValue::String(value)))
    }

    pub fn resolve(&self, values: &mut RouteValues) -> PartResolve {
        if self.settings.name.is_empty() {
            return PartResolve::Unresolved;
        }
        let Some(text) = values.get_path(&self.settings.name).and_then(text_to_resolve) else {
            return PartResolve::Unresolved;
        };
        let mut encoded = encode_path(&text);
        if self.settings.lower_case {
            encoded = encoded.to_lowercase();
        }
        values.remove_path(&self.settings.name);
        PartResolve::Resolved(RouteValue::String(encoded))
    }
}

/// Returns the prefix of `route_path` a placeholder would consume.
///
/// The candidate ends at the first occurrence of `split_string`, or at the
/// end of the path when it does not occur. A candidate containing `/` and a
/// path starting with `/` both yield an empty candidate.
pub(crate) fn find_value_to_match<'a>(route_path: &'a str, split_string: Option<&str>) -> &'a str {
    if route_path.is_empty() || route_path.starts_with('/') {
        return "";
    }
    let candidate = split_string
        .and_then(|split| route_path.find(split))
        .map_or(route_path, |position| &route_path[..position]);
    if candidate.contains('/') {
        return "";
    }
    candidate
}

/// Converts a route value to the text a placeholder renders.
///
/// Objects render their identifier. Nulls, maps, empty strings and objects
/// without an identifier cannot be rendered.
fn text_to_resolve(value: &RouteValue) -> Option<String> {
    match value {
        RouteValue::Object(object) => object.identifier(),
        RouteValue::String(s) if s.is_empty() => None,
        other => other.to_scalar_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SimpleObject;
    use serde_json::json;

    fn part(name: &str) -> DynamicRoutePart {
        DynamicRoutePart::new(PartSettings::new(name))
    }

    fn part_with_split(name: &str, split: &str) -> DynamicRoutePart {
        let mut settings = PartSettings::new(name);
        settings.split_string = Some(split.to_string());
        DynamicRoutePart::new(settings)
    }

    // ── Matching ─────────────────────────────────────────────────────

    #[test]
    fn test_does_not_match_empty_path() {
        let mut path = "";
        assert_eq!(part("foo").match_path(&mut path), PartMatch::NoMatch);
    }

    #[test]
    fn test_does_not_match_without_name() {
        let mut path = "foo";
        assert_eq!(part("").match_path(&mut path), PartMatch::NoMatch);
    }

    #[test]
    fn test_matches_first_segment_up_to_split_string() {
        let p = part_with_split("foo", "/");
        let mut path = "bar/baz";
        assert_eq!(
            p.match_path(&mut path),
            PartMatch::Matched(Some(RouteValue::from("bar")))
        );
        assert_eq!(path, "/baz");
    }

    #[test]
    fn test_does_not_match_multiple_segments_without_split_string() {
        let mut path = "foo/bar";
        assert_eq!(part("foo").match_path(&mut path), PartMatch::NoMatch);
        assert_eq!(path, "foo/bar");
    }

    #[test]
    fn test_does_not_match_multiple_segments_if_split_string_missing() {
        let mut path = "foo/bar";
        assert_eq!(
            part_with_split("foo", "not-existing").match_path(&mut path),
            PartMatch::NoMatch
        );
    }

    #[test]
    fn test_matches_single_segment_if_split_string_missing() {
        let mut path = "bar";
        assert_eq!(
            part_with_split("foo", "not-existing").match_path(&mut path),
            PartMatch::Matched(Some(RouteValue::from("bar")))
        );
        assert_eq!(path, "");
    }

    #[test]
    fn test_does_not_match_if_split_string_is_first() {
        let mut path = "-foo/bar";
        assert_eq!(part_with_split("foo", "-").match_path(&mut path), PartMatch::NoMatch);
    }

    #[test]
    fn test_matches_multi_character_split_string() {
        let mut path = "foo_-_bar";
        assert_eq!(
            part_with_split("foo", "_-_").match_path(&mut path),
            PartMatch::Matched(Some(RouteValue::from("foo")))
        );
        assert_eq!(path, "_-_bar");
    }

    #[test]
    fn test_match_decodes_and_folds_case() {
        let mut path = "Some%20%5c%20Special";
        assert_eq!(
            part("foo").match_path(&mut path),
            PartMatch::Matched(Some(RouteValue::from("some \\ special")))
        );

        let mut settings = PartSettings::new("foo");
        settings.lower_case = false;
        let mut path = "Bar";
        assert_eq!(
            DynamicRoutePart::new(settings).match_path(&mut path),
            PartMatch::Matched(Some(RouteValue::from("Bar")))
        );
    }

    // ── Resolving ────────────────────────────────────────────────────

    #[test]
    fn test_resolves_simple_value_and_consumes_it() {
        let mut values = RouteValues::from_json(json!({"foo": "bar", "other": "x"}));
        assert_eq!(
            part("foo").resolve(&mut values),
            PartResolve::Resolved(RouteValue::from("bar"))
        );
        assert_eq!(values, RouteValues::from_json(json!({"other": "x"})));
    }

    #[test]
    fn test_resolve_encodes_values() {
        let mut values = RouteValues::from_json(json!({"foo": "some \\ special öäüß"}));
        assert_eq!(
            part("foo").resolve(&mut values),
            PartResolve::Resolved(RouteValue::from("some%20%5c%20special%20%c3%b6%c3%a4%c3%bc%c3%9f"))
        );
    }

    #[test]
    fn test_resolve_keeps_slashes() {
        let mut values = RouteValues::from_json(json!({"path": "a/b c"}));
        assert_eq!(
            part("path").resolve(&mut values),
            PartResolve::Resolved(RouteValue::from("a/b%20c"))
        );
    }

    #[test]
    fn test_resolve_respects_lower_case_flag() {
        let mut values = RouteValues::from_json(json!({"Foo": "Bar"}));
        assert_eq!(
            part("Foo").resolve(&mut values.clone()),
            PartResolve::Resolved(RouteValue::from("bar"))
        );

        let mut settings = PartSettings::new("Foo");
        settings.lower_case = false;
        assert_eq!(
            DynamicRoutePart::new(settings).resolve(&mut values),
            PartResolve::Resolved(RouteValue::from("Bar"))
        );
    }

    #[test]
    fn test_resolve_missing_or_unrenderable_values() {
        for bag in [
            json!({}),
            json!({"notFoo": "bar"}),
            json!({"foo": null}),
            json!({"foo": ""}),
            json!({"foo": {"nested": "x"}}),
        ] {
            let mut values = RouteValues::from_json(bag);
            let before = values.clone();
            assert_eq!(part("foo").resolve(&mut values), PartResolve::Unresolved);
            assert_eq!(values, before);
        }
    }

    #[test]
    fn test_resolve_scalars() {
        let mut values = RouteValues::from_json(json!({"n": 42, "b": false}));
        assert_eq!(
            part("n").resolve(&mut values),
            PartResolve::Resolved(RouteValue::from("42"))
        );
        assert_eq!(
            part("b").resolve(&mut values),
            PartResolve::Resolved(RouteValue::from("0"))
        );
        assert!(values.is_empty());
    }

    #[test]
    fn test_resolve_dot_path_keeps_siblings() {
        let mut values = RouteValues::from_json(json!({"post": {"title": "Hello", "id": "7"}}));
        assert_eq!(
            part("post.title").resolve(&mut values),
            PartResolve::Resolved(RouteValue::from("hello"))
        );
        assert_eq!(values, RouteValues::from_json(json!({"post": {"id": "7"}})));
    }

    #[test]
    fn test_resolve_object_uses_identifier() {
        let mut values = RouteValues::new();
        values.insert("post", SimpleObject::new("Acme\\Post", Some("TheIdentifier")).into_ref());
        assert_eq!(
            part("post").resolve(&mut values),
            PartResolve::Resolved(RouteValue::from("theidentifier"))
        );

        let mut values = RouteValues::new();
        values.insert("post", SimpleObject::new("Acme\\Post", None).into_ref());
        assert_eq!(part("post").resolve(&mut values), PartResolve::Unresolved);
    }
}
