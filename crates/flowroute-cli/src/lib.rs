//! # flowroute-cli
//!
//! Management commands for inspecting and exercising a flowroute route
//! configuration from the command line.
//!
//! - **Management commands** - A framework for defining and registering CLI commands
//! - **Built-in commands** - `check`, `routes:list`, `routes:show`, `routes:match`
//!   and `routes:resolve`
//!
//! ## Quick Start
//!
//! ```rust
//! use flowroute_cli::command::CommandRegistry;
//! use flowroute_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"check"));
//! assert!(names.contains(&"routes:match"));
//! ```

// These clippy lints are intentionally allowed:
// - result_large_err: FlowrouteError is the workspace-wide error type
// - doc_markdown: backtick requirements for documentation items are too strict
// - missing_const_for_fn: some functions may gain runtime logic later
// - unused_async: command handlers maintain consistent async signatures
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;

pub use command::{CommandRegistry, ManagementCommand};
pub use commands::{load_router, register_builtin_commands};
