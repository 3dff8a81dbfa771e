//! # flowroute-core
//!
//! Core types, settings, and error types for the flowroute workspace.
//! This crate has no routing dependencies and provides the foundation for the
//! other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`utils`] - Text helpers (URI transliteration)
//! - [`settings`] - Settings
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{FlowrouteError, FlowrouteResult};
pub use settings::Settings;
