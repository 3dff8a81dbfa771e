//! Route parts: the matcher/generator for one piece of a uri pattern.
//!
//! A route pattern such as `blog/{post}(.{@format})` is parsed into an ordered
//! list of [`RoutePart`]s. Each part can consume a prefix of an incoming path
//! ([`RoutePart::match_path`]) and contribute text to an outgoing path
//! ([`RoutePart::resolve`]). Results are returned per call; parts are never
//! mutated while matching or resolving, so a parsed route can be shared
//! between threads.
//!
//! ## Variants
//!
//! - [`StaticRoutePart`] - literal text
//! - [`DynamicRoutePart`] - a named placeholder
//! - [`IdentityRoutePart`] - a placeholder backed by object path mappings
//! - [`CustomRoutePart`] - a placeholder delegating to a registered handler

pub mod dynamic;
pub mod handler;
pub mod identity;
pub mod static_part;

use flowroute_core::FlowrouteResult;

use crate::values::{RouteValue, RouteValues};

pub use dynamic::DynamicRoutePart;
pub use handler::{CustomRoutePart, RoutePartHandler, RoutePartHandlerRegistry};
pub use identity::IdentityRoutePart;
pub use static_part::StaticRoutePart;

/// The settings every route part carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartSettings {
    /// The part name. Dynamic names may be dot paths (`article.title`);
    /// a static part is named by its literal text.
    pub name: String,
    /// Whether the part sits inside an optional `(...)` section.
    pub optional: bool,
    /// Whether matched and resolved values are lower-cased.
    pub lower_case: bool,
    /// The value used when the part is skipped or cannot resolve.
    pub default_value: Option<RouteValue>,
    /// The literal text of the following static part.
    pub split_string: Option<String>,
    /// Free-form options from the part configuration.
    pub options: RouteValues,
}

impl PartSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower_case: true,
            ..Self::default()
        }
    }

    /// Returns the split string, treating an empty one as absent.
    pub fn split_string(&self) -> Option<&str> {
        self.split_string.as_deref().filter(|s| !s.is_empty())
    }
}

/// The outcome of matching one part against the remaining path.
#[derive(Debug, Clone, PartialEq)]
pub enum PartMatch {
    /// The part does not match; the path was left untouched.
    NoMatch,
    /// The part consumed a prefix of the path and optionally produced a value.
    Matched(Option<RouteValue>),
}

impl PartMatch {
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// The outcome of resolving one part from a value bag.
#[derive(Debug, Clone, PartialEq)]
pub enum PartResolve {
    /// The part could not produce a value; the bag was left untouched.
    Unresolved,
    /// The part produced this value and removed what it consumed from the bag.
    Resolved(RouteValue),
}

/// One part of a parsed route pattern.
#[derive(Debug, Clone)]
pub enum RoutePart {
    Static(StaticRoutePart),
    Dynamic(DynamicRoutePart),
    Identity(IdentityRoutePart),
    Custom(CustomRoutePart),
}

impl RoutePart {
    pub const fn settings(&self) -> &PartSettings {
        match self {
            Self::Static(p) => p.settings(),
            Self::Dynamic(p) => p.settings(),
            Self::Identity(p) => p.settings(),
            Self::Custom(p) => p.settings(),
        }
    }

    fn settings_mut(&mut self) -> &mut PartSettings {
        match self {
            Self::Static(p) => p.settings_mut(),
            Self::Dynamic(p) => p.settings_mut(),
            Self::Identity(p) => p.settings_mut(),
            Self::Custom(p) => p.settings_mut(),
        }
    }

    pub fn name(&self) -> &str {
        &self.settings().name
    }

    pub const fn is_optional(&self) -> bool {
        self.settings().optional
    }

    /// Returns `true` for every variant except [`RoutePart::Static`].
    pub const fn is_dynamic(&self) -> bool {
        !matches!(self, Self::Static(_))
    }

    pub const fn has_default_value(&self) -> bool {
        self.settings().default_value.is_some()
    }

    pub const fn default_value(&self) -> Option<&RouteValue> {
        self.settings().default_value.as_ref()
    }

    /// A short label for the variant, used in listings.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Static(_) => "static",
            Self::Dynamic(_) => "dynamic",
            Self::Identity(_) => "identity",
            Self::Custom(_) => "custom",
        }
    }

    pub(crate) fn set_optional(&mut self, optional: bool) {
        self.settings_mut().optional = optional;
    }

    pub(crate) fn set_lower_case(&mut self, lower_case: bool) {
        self.settings_mut().lower_case = lower_case;
    }

    pub(crate) fn set_options(&mut self, options: RouteValues) {
        self.settings_mut().options = options;
    }

    /// Sets the text that ends this part's match. Ignored by static parts.
    pub(crate) fn set_split_string(&mut self, split_string: &str) -> FlowrouteResult<()> {
        match self {
            Self::Static(_) => Ok(()),
            Self::Dynamic(p) => {
                p.settings_mut().split_string = Some(split_string.to_string());
                Ok(())
            }
            Self::Identity(p) => p.set_split_string(split_string),
            Self::Custom(p) => {
                p.settings_mut().split_string = Some(split_string.to_string());
                Ok(())
            }
        }
    }

    /// Tries to consume a prefix of `route_path`.
    ///
    /// On a match, `route_path` is advanced past the consumed text.
    pub fn match_path(&self, route_path: &mut &str) -> FlowrouteResult<PartMatch> {
        match self {
            Self::Static(p) => Ok(p.match_path(route_path)),
            Self::Dynamic(p) => Ok(p.match_path(route_path)),
            Self::Identity(p) => p.match_path(route_path),
            Self::Custom(p) => p.match_path(route_path),
        }
    }

    /// Tries to produce this part's uri text from `values`.
    ///
    /// On success, the value consumed by the part is removed from `values`.
    pub fn resolve(&self, values: &mut RouteValues) -> FlowrouteResult<PartResolve> {
        match self {
            Self::Static(p) => Ok(p.resolve()),
            Self::Dynamic(p) => Ok(p.resolve(values)),
            Self::Identity(p) => p.resolve(values),
            Self::Custom(p) => p.resolve(values),
        }
    }
}
