//! Domain objects that can be passed as route values.
//!
//! Identity route parts turn objects into path segments by reading their
//! properties, so the router only needs the narrow view defined by
//! [`RoutableObject`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};

/// The view of a domain object the router needs.
pub trait RoutableObject: Send + Sync + fmt::Debug {
    /// The object's type name (e.g. `Acme\Blog\Post`).
    fn object_type(&self) -> &str;

    /// The persistence identifier, if the object has one.
    fn identifier(&self) -> Option<String>;

    /// Reads a property by (possibly dotted) path.
    fn property(&self, path: &str) -> Option<PropertyValue>;
}

/// A shared reference to a routable object.
pub type ObjectRef = Arc<dyn RoutableObject>;

/// A property value read from a [`RoutableObject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    DateTime(NaiveDateTime),
}

impl PropertyValue {
    /// Renders the value as text. Dates use `date_format` in PHP `date()`
    /// notation, defaulting to `Y-m-d`.
    pub fn render(&self, date_format: Option<&str>) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::DateTime(dt) => format_date(dt, date_format.unwrap_or("Y-m-d")),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

/// Formats a date with PHP `date()` format characters.
///
/// Supported: `d D j l N w z m M F n y Y a A g G h H i s U`. A backslash
/// escapes the next character; every other character is copied literally.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use flowroute_routing::object::format_date;
///
/// let dt = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(14, 5, 0).unwrap();
/// assert_eq!(format_date(&dt, "Y/m/d"), "2024/03/09");
/// assert_eq!(format_date(&dt, "j.n.y \\a\\t H:i"), "9.3.24 at 14:05");
/// ```
pub fn format_date(dt: &NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        let piece = match c {
            'd' => format!("{:02}", dt.day()),
            'D' => dt.format("%a").to_string(),
            'j' => dt.day().to_string(),
            'l' => dt.format("%A").to_string(),
            'N' => dt.weekday().number_from_monday().to_string(),
            'w' => dt.weekday().num_days_from_sunday().to_string(),
            'z' => dt.ordinal0().to_string(),
            'm' => format!("{:02}", dt.month()),
            'M' => dt.format("%b").to_string(),
            'F' => dt.format("%B").to_string(),
            'n' => dt.month().to_string(),
            'y' => format!("{:02}", dt.year().rem_euclid(100)),
            'Y' => dt.year().to_string(),
            'a' => dt.format("%P").to_string(),
            'A' => dt.format("%p").to_string(),
            'g' => dt.hour12().1.to_string(),
            'G' => dt.hour().to_string(),
            'h' => format!("{:02}", dt.hour12().1),
            'H' => format!("{:02}", dt.hour()),
            'i' => format!("{:02}", dt.minute()),
            's' => format!("{:02}", dt.second()),
            'U' => dt.and_utc().timestamp().to_string(),
            '\\' => chars.next().map(String::from).unwrap_or_default(),
            other => other.to_string(),
        };
        out.push_str(&piece);
    }
    out
}

/// A plain in-memory object with a property bag.
///
/// # Examples
///
/// ```
/// use flowroute_routing::object::{RoutableObject, SimpleObject};
///
/// let post = SimpleObject::new("Acme\\Blog\\Post", Some("42")).with_property("title", "Hello");
/// assert_eq!(post.identifier().as_deref(), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleObject {
    object_type: String,
    identifier: Option<String>,
    properties: BTreeMap<String, PropertyValue>,
}

impl SimpleObject {
    pub fn new(object_type: impl Into<String>, identifier: Option<&str>) -> Self {
        Self {
            object_type: object_type.into(),
            identifier: identifier.map(String::from),
            properties: BTreeMap::new(),
        }
    }

    /// Adds a property. Dotted names address nested properties verbatim.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Wraps the object in a shared [`ObjectRef`].
    pub fn into_ref(self) -> ObjectRef {
        Arc::new(self)
    }
}

impl RoutableObject for SimpleObject {
    fn object_type(&self) -> &str {
        &self.object_type
    }

    fn identifier(&self) -> Option<String> {
        self.identifier.clone()
    }

    fn property(&self, path: &str) -> Option<PropertyValue> {
        self.properties.get(path).cloned()
    }
}
