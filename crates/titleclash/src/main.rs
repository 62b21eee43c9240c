// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TitleClash - heavy/light model-routing gateway.
//!
//! This is the binary entry point for the gateway.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod route;
mod serve;
mod shutdown;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use titleclash_config::ClashConfig;

/// TitleClash - heavy/light model-routing gateway.
#[derive(Parser, Debug)]
#[command(name = "titleclash", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway server.
    Serve {
        /// Config file to load instead of the default search paths.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate configuration and report any problems.
    CheckConfig {
        /// Config file to load instead of the default search paths.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Route one request without starting the server and print the decision.
    Route {
        /// Request path, e.g. /api/research.
        #[arg(long)]
        path: String,
        /// Value of the x-priority header.
        #[arg(long)]
        priority: Option<String>,
        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
        /// Config file to load instead of the default search paths.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Load and validate config, rendering diagnostics on failure.
fn load_config(path: Option<&Path>) -> Option<ClashConfig> {
    let result = match path {
        Some(path) => titleclash_config::load_and_validate_path(path),
        None => titleclash_config::load_and_validate(),
    };
    match result {
        Ok(config) => Some(config),
        Err(errors) => {
            titleclash_config::render_errors(&errors);
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { config }) => {
            let Some(config) = load_config(config.as_deref()) else {
                return ExitCode::FAILURE;
            };
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("titleclash: {e}");
                return ExitCode::FAILURE;
            }
        }
        Some(Commands::CheckConfig { config }) => {
            let Some(config) = load_config(config.as_deref()) else {
                return ExitCode::FAILURE;
            };
            println!(
                "titleclash: config OK (listen={}:{}, heavy_model={}, fallback_model={})",
                config.server.host,
                config.server.port,
                config.routing.heavy_model,
                config.routing.fallback_model
            );
        }
        Some(Commands::Route {
            path,
            priority,
            body,
            config,
        }) => {
            let Some(config) = load_config(config.as_deref()) else {
                return ExitCode::FAILURE;
            };
            serve::init_tracing(&config.log.level);
            let output = route::dry_run(&config, &path, priority.as_deref(), body.as_deref())
                .and_then(|decision| route::render(&decision));
            match output {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("titleclash: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => {
            println!("titleclash: use --help for available commands");
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn route_subcommand_parses_flags() {
        let cli = Cli::try_parse_from([
            "titleclash",
            "route",
            "--path",
            "/api/research",
            "--priority",
            "heavy",
            "--body",
            r#"{"prompt":"hi"}"#,
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Route {
                path,
                priority,
                body,
                config,
            }) => {
                assert_eq!(path, "/api/research");
                assert_eq!(priority.as_deref(), Some("heavy"));
                assert_eq!(body.as_deref(), Some(r#"{"prompt":"hi"}"#));
                assert!(config.is_none());
            }
            other => panic!("expected route command, got {other:?}"),
        }
    }

    #[test]
    fn check_config_accepts_path() {
        let cli =
            Cli::try_parse_from(["titleclash", "check-config", "--config", "/tmp/x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::CheckConfig { config: Some(_) })
        ));
    }
}
