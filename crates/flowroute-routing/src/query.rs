//! Percent-encoding helpers and query-string rendering for resolved URIs.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::values::{RouteValue, RouteValues};

/// Everything except the RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// [`COMPONENT`] with `/` left intact.
const PATH: &AsciiSet = &COMPONENT.remove(b'/');

/// Percent-encodes a URI component (spaces become `%20`).
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Percent-encodes a path value, keeping `/` unencoded.
pub fn encode_path(value: &str) -> String {
    utf8_percent_encode(value, PATH).to_string()
}

/// Decodes a percent-encoded value. Invalid UTF-8 sequences are replaced.
pub fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Renders route values as a query string (without the leading `?`).
///
/// Nested maps use bracket notation (`parent[child]=value`); keys and values
/// are RFC 3986 encoded and emitted in sorted key order. Nulls are skipped,
/// booleans render as `1` / `0`, and objects as their `__identity` map.
///
/// # Examples
///
/// ```
/// use flowroute_routing::query::build_query_string;
/// use flowroute_routing::values::RouteValues;
///
/// let values = RouteValues::from_json(serde_json::json!({"b": "x y", "a": {"c": "1"}}));
/// assert_eq!(build_query_string(&values), "a%5Bc%5D=1&b=x%20y");
/// ```
pub fn build_query_string(values: &RouteValues) -> String {
    let mut pairs = Vec::new();
    for (key, value) in values {
        collect_pairs(key, value, &mut pairs);
    }
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", encode_component(&key), encode_component(&value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn collect_pairs(prefix: &str, value: &RouteValue, pairs: &mut Vec<(String, String)>) {
    match value {
        RouteValue::Map(children) => {
            for (key, child) in children {
                collect_pairs(&format!("{prefix}[{key}]"), child, pairs);
            }
        }
        RouteValue::Object(object) => {
            if let Some(identifier) = object.identifier() {
                collect_pairs(prefix, &RouteValue::identity(identifier), pairs);
            }
        }
        RouteValue::Null => {}
        scalar => {
            if let Some(text) = scalar.to_scalar_string() {
                pairs.push((prefix.to_string(), text));
            }
        }
    }
}
