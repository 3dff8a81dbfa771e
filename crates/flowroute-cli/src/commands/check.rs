//! The `check` management command.
//!
//! Loads the configured routes, parses every uri pattern and reports
//! configuration problems without touching any request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use flowroute_core::{FlowrouteError, Settings};
use flowroute_routing::{config, Route, Router, RoutingServices};

use crate::command::ManagementCommand;

/// Validates the settings and the route configuration.
pub struct CheckCommand;

/// The result of a single check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    pub level: CheckLevel,
    /// A human-readable description of the issue.
    pub msg: String,
    /// An optional hint for how to resolve the issue.
    pub hint: Option<String>,
    /// A unique identifier for this check (e.g. "routes.E003").
    pub id: String,
}

impl CheckMessage {
    fn new(level: CheckLevel, id: &str, msg: impl Into<String>) -> Self {
        Self {
            level,
            msg: msg.into(),
            hint: None,
            id: id.to_string(),
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Severity levels for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Runs all checks against the given settings.
///
/// Every route is parsed on its own, so one broken pattern does not hide
/// problems in the others.
pub fn run_checks(settings: &Settings) -> Vec<CheckMessage> {
    let mut messages = Vec::new();

    let separator = &settings.routing.path_segment_separator;
    if separator.contains('/') {
        messages.push(
            CheckMessage::new(
                CheckLevel::Error,
                "routing.E001",
                format!("path_segment_separator \"{separator}\" contains a slash"),
            )
            .with_hint("Identity path segments must stay within one uri segment."),
        );
    }

    let services = match RoutingServices::from_settings(settings) {
        Ok(services) => Arc::new(services),
        Err(e) => {
            messages.push(CheckMessage::new(CheckLevel::Error, "database.E001", e.to_string()));
            Arc::new(RoutingServices::default())
        }
    };

    let Some(path) = settings.routes_file.as_ref() else {
        messages.push(
            CheckMessage::new(CheckLevel::Warning, "routes.W001", "No routes file is configured")
                .with_hint("Set routes_file in the settings or FLOWROUTE_ROUTES_FILE."),
        );
        return messages;
    };

    let routes = match config::from_file(path) {
        Ok(routes) => routes,
        Err(e) => {
            messages.push(CheckMessage::new(CheckLevel::Critical, "routes.E001", e.to_string()));
            return messages;
        }
    };

    if routes.is_empty() {
        messages.push(CheckMessage::new(
            CheckLevel::Warning,
            "routes.W002",
            format!("{} defines no routes", path.display()),
        ));
    }

    let mut names: HashMap<&str, usize> = HashMap::new();
    for (index, configuration) in routes.iter().enumerate() {
        if let Some(name) = configuration.name.as_deref() {
            if let Some(first) = names.insert(name, index) {
                messages.push(CheckMessage::new(
                    CheckLevel::Warning,
                    "routes.W003",
                    format!("Routes #{first} and #{index} share the name \"{name}\""),
                ));
            }
        }

        let route = Route::from_configuration(configuration, Arc::clone(&services));
        if let Err(e) = route.parse() {
            messages.push(
                CheckMessage::new(
                    CheckLevel::Error,
                    "routes.E003",
                    format!("Route #{index} ({}): {e}", route.label()),
                )
                .with_hint("Fix the uriPattern or its routeParts configuration."),
            );
        }
    }

    if let Err(e) = Router::from_configuration(routes, services) {
        messages.push(CheckMessage::new(CheckLevel::Error, "routes.E002", e.to_string()));
    }

    messages
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Parse every configured route and report problems"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("fail-level")
                .long("fail-level")
                .value_parser(["WARNING", "ERROR", "CRITICAL"])
                .default_value("ERROR")
                .help("Message level that causes a non-zero exit"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FlowrouteError> {
        let fail_level = match matches.get_one::<String>("fail-level").map(String::as_str) {
            Some("WARNING") => CheckLevel::Warning,
            Some("CRITICAL") => CheckLevel::Critical,
            _ => CheckLevel::Error,
        };

        let messages = run_checks(settings);
        let failures = messages.iter().filter(|m| m.level >= fail_level).count();

        for msg in &messages {
            let hint_text = msg
                .hint
                .as_ref()
                .map_or(String::new(), |h| format!("\n\tHINT: {h}"));
            tracing::warn!("{} ({}): {}{}", msg.level, msg.id, msg.msg, hint_text);
        }

        tracing::info!("Route check identified {} issue(s)", messages.len());

        if failures > 0 {
            return Err(FlowrouteError::Configuration(format!(
                "Route check found {failures} issue(s) at level {fail_level} or above"
            )));
        }

        Ok(())
    }
}
