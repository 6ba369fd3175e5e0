//! Fedshare - shared dependency resolution for federated front-ends
//!
//! Usage:
//!   fedshare override enable    # Point library aliases at the override target
//!   fedshare override disable   # Restore the original library versions
//!   fedshare override status    # Show the current override state
//!   fedshare resolve            # Show which version each app receives
//!   fedshare load mfe1          # Load one remote module

mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fedshare_core::context::AppContext;
use fedshare_core::loader::UrlRemoteLoader;
use fedshare_core::manifest::OverrideMode;

use crate::report::{AppBindings, ResolveReport};

#[derive(Parser)]
#[command(name = "fedshare")]
#[command(about = "Shared dependency resolution for federated front-ends", long_about = None)]
struct Cli {
    /// Project root containing fedshare.toml (defaults to the current directory)
    #[arg(long, short, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enable, disable, or inspect the shared library version override
    Override(OverrideArgs),

    /// Start a host session and show the bindings of the host and its remotes
    Resolve {
        /// Remotes to load (defaults to every remote in the federation manifest)
        #[arg(long = "remote", short)]
        remotes: Vec<String>,

        /// Exposed module to load from each remote
        #[arg(long, short, default_value = "./Component")]
        module: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Load a single exposed module of a remote
    Load {
        /// Remote name from the federation manifest
        remote: String,

        /// Exposed module key
        #[arg(long, short, default_value = "./Component")]
        module: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
struct OverrideArgs {
    #[command(subcommand)]
    command: OverrideSubcommand,
}

#[derive(Subcommand)]
enum OverrideSubcommand {
    /// Redirect every profile alias to the override target
    Enable {
        /// Overwrite entries that were changed by hand
        #[arg(long, short)]
        force: bool,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },

    /// Restore every profile alias to its original install source
    Disable {
        /// Overwrite entries that were changed by hand
        #[arg(long, short)]
        force: bool,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show whether the override is enabled
    Status {
        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fedshare=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let project_root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let ctx = AppContext::load(project_root)?;

    match cli.command {
        Commands::Override(args) => run_override(&ctx, args.command),
        Commands::Resolve {
            remotes,
            module,
            format,
        } => run_resolve(&ctx, remotes, &module, format),
        Commands::Load {
            remote,
            module,
            format,
        } => run_load(&ctx, &remote, &module, format),
    }
}

fn run_override(ctx: &AppContext, command: OverrideSubcommand) -> Result<()> {
    let toggle = ctx.override_toggle();

    let (mode, force, format) = match command {
        OverrideSubcommand::Status { format } => {
            let status = toggle.status()?;
            match format {
                OutputFormat::Table => report::print_override_status(&status),
                OutputFormat::Json => print_json(&status)?,
            }
            return Ok(());
        }
        OverrideSubcommand::Enable { force, format } => (OverrideMode::Enabled, force, format),
        OverrideSubcommand::Disable { force, format } => (OverrideMode::Disabled, force, format),
    };

    let report = toggle.apply(mode, force)?;
    match format {
        OutputFormat::Table => report::print_override_report(&report, toggle.profile()),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

fn run_resolve(
    ctx: &AppContext,
    remotes: Vec<String>,
    module: &str,
    format: OutputFormat,
) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;

    let report = runtime.block_on(async {
        let mut session = ctx.start_session(UrlRemoteLoader::new())?;

        let remotes = if remotes.is_empty() {
            session
                .manifest()
                .remotes()
                .map(|(name, _)| name.to_string())
                .collect::<Vec<_>>()
        } else {
            remotes
        };

        let mut report = ResolveReport::default();
        for remote in &remotes {
            match session.load_remote_module(remote, module).await {
                Ok(loaded) => report.apps.push(AppBindings::loaded(&loaded)),
                Err(e) => {
                    tracing::warn!(remote = %remote, "remote not loaded: {:#}", e);
                    report.apps.push(AppBindings::failed(remote, &e));
                }
            }
        }

        let host = match session.host_bindings() {
            Ok(bindings) => AppBindings::host(session.host(), bindings),
            Err(e) => AppBindings::failed(session.host(), &anyhow::Error::new(e)),
        };
        report.apps.insert(0, host);
        anyhow::Ok(report)
    })?;

    match format {
        OutputFormat::Table => report::print_resolve_report(&report),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

fn run_load(ctx: &AppContext, remote: &str, module: &str, format: OutputFormat) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;

    let loaded = runtime.block_on(async {
        let mut session = ctx.start_session(UrlRemoteLoader::new())?;
        session.load_remote_module(remote, module).await
    })?;

    let report = ResolveReport {
        apps: vec![AppBindings::loaded(&loaded)],
    };
    match format {
        OutputFormat::Table => report::print_resolve_report(&report),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat, OverrideSubcommand};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn override_enable_with_force_and_json() {
        let cli = Cli::try_parse_from(["fedshare", "override", "enable", "--force", "-o", "json"])
            .unwrap();
        match cli.command {
            Commands::Override(args) => match args.command {
                OverrideSubcommand::Enable { force, format } => {
                    assert!(force);
                    assert_eq!(format, OutputFormat::Json);
                }
                _ => panic!("expected override enable"),
            },
            _ => panic!("expected override command"),
        }
    }

    #[test]
    fn override_status_defaults_to_table() {
        let cli = Cli::try_parse_from(["fedshare", "override", "status"]).unwrap();
        match cli.command {
            Commands::Override(args) => match args.command {
                OverrideSubcommand::Status { format } => assert_eq!(format, OutputFormat::Table),
                _ => panic!("expected override status"),
            },
            _ => panic!("expected override command"),
        }
    }

    #[test]
    fn resolve_collects_repeated_remotes() {
        let cli = Cli::try_parse_from(["fedshare", "resolve", "-r", "mfe1", "-r", "mfe2"]).unwrap();
        match cli.command {
            Commands::Resolve {
                remotes,
                module,
                format,
            } => {
                assert_eq!(remotes, vec!["mfe1", "mfe2"]);
                assert_eq!(module, "./Component");
                assert_eq!(format, OutputFormat::Table);
            }
            _ => panic!("expected resolve command"),
        }
    }

    #[test]
    fn resolve_without_remotes_loads_all() {
        let cli = Cli::try_parse_from(["fedshare", "resolve"]).unwrap();
        match cli.command {
            Commands::Resolve { remotes, .. } => assert!(remotes.is_empty()),
            _ => panic!("expected resolve command"),
        }
    }

    #[test]
    fn load_takes_remote_and_module() {
        let cli = Cli::try_parse_from(["fedshare", "load", "mfe1", "-m", "./Component"]).unwrap();
        match cli.command {
            Commands::Load { remote, module, .. } => {
                assert_eq!(remote, "mfe1");
                assert_eq!(module, "./Component");
            }
            _ => panic!("expected load command"),
        }
    }

    #[test]
    fn project_flag_is_global() {
        let cli =
            Cli::try_parse_from(["fedshare", "load", "mfe1", "--project", "demo"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("demo")));

        let cli = Cli::try_parse_from(["fedshare", "-p", "demo", "override", "status"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("demo")));
    }

    #[test]
    fn load_requires_remote() {
        assert!(Cli::try_parse_from(["fedshare", "load"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["fedshare", "resolve", "--format", "yaml"]).is_err());
    }
}
