//! The `flowroute` binary.
//!
//! Settings come from `--settings <FILE>` when given, otherwise from the
//! `FLOWROUTE_*` environment variables.

use std::process::ExitCode;

use flowroute_cli::{register_builtin_commands, CommandRegistry};
use flowroute_core::logging::setup_logging;
use flowroute_core::settings_loader;

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);

    let matches = registry.build_cli().get_matches();
    let settings = match matches.get_one::<String>("settings") {
        Some(path) => match settings_loader::from_file_with_env(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => settings_loader::from_env(),
    };
    setup_logging(&settings);

    match registry.execute(&matches, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(status = e.status_code(), "{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
