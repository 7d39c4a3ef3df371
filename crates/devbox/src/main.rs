mod cloud_init;
mod commands;
mod exit;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::list::ListResource;
use commands::up::UpArgs;
use devbox_config::Settings;
use devbox_lambda::{ClientConfig, LambdaClient};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devbox")]
#[command(about = "GPU development boxes on Lambda Cloud", long_about = None)]
struct Cli {
    /// Settings file (default: DEVBOX_CONFIG_PATH, ./devbox.yaml, ~/.config/devbox/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Lambda Cloud API key
    #[arg(long, global = true, env = "LAMBDA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List Lambda Cloud resources
    List {
        /// Resource to list
        #[arg(value_enum)]
        resource: ListResource,
        /// Only show what can be launched right now
        #[arg(long)]
        available_only: bool,
    },
    /// Launch instances with the devbox cloud-init
    Up(UpArgs),
    /// Wait until instances are ready for SSH
    Wait {
        /// Instance IDs
        #[arg(required = true)]
        instance_ids: Vec<String>,
        /// Give up after this many seconds (default: wait.timeout_secs)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
        /// Initial poll interval in seconds (default: wait.poll_interval_secs)
        #[arg(long)]
        poll_interval_secs: Option<f64>,
    },
    /// Terminate instances
    Down {
        /// Instance IDs
        #[arg(required = true)]
        instance_ids: Vec<String>,
    },
    /// Restart instances
    Restart {
        /// Instance IDs
        #[arg(required = true)]
        instance_ids: Vec<String>,
    },
    /// Rename an instance
    Rename {
        /// Instance ID
        instance_id: String,
        /// New name
        name: String,
    },
    /// Print the SSH command for an instance
    Ssh {
        /// Instance ID
        instance_id: String,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::from(exit::FAILURE)
            } else {
                ExitCode::from(exit::SUCCESS)
            };
        }
    };

    init_tracing(cli.verbose);

    // dropping the losing branch drops the client and its connection pool
    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::from(exit::SUCCESS),
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                ExitCode::from(exit::code_for(&e))
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!();
            eprintln!("{}", "Interrupted".yellow());
            ExitCode::from(exit::INTERRUPTED)
        }
    }
}

/// Logs go to stderr; RUST_LOG wins over -v
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// File, then environment, then flags
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => {
            let mut settings = Settings::from_file(path)?;
            settings.apply_env();
            settings
        }
        None => Settings::load()?,
    };

    if let Some(key) = &cli.api_key {
        settings.api.api_key = Some(key.clone());
    }
    if let Some(url) = &cli.base_url {
        settings.api.base_url = url.clone();
    }

    settings.validate()?;
    tracing::debug!(?settings, "Loaded settings");
    Ok(settings)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Commands::Version) {
        println!("devbox {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let settings = load_settings(&cli)?;
    let client = LambdaClient::new(
        ClientConfig::new(settings.api_key())
            .with_base_url(&settings.api.base_url)
            .with_timeout(settings.api_timeout()),
    )?;

    match cli.command {
        Commands::List {
            resource,
            available_only,
        } => commands::list::handle(&client, resource, available_only).await,
        Commands::Up(args) => commands::up::handle(&client, &settings, args).await,
        Commands::Wait {
            instance_ids,
            timeout_secs,
            poll_interval_secs,
        } => {
            commands::wait::handle(
                &client,
                &settings,
                instance_ids,
                timeout_secs,
                poll_interval_secs,
            )
            .await
        }
        Commands::Down { instance_ids } => commands::down::handle(&client, instance_ids).await,
        Commands::Restart { instance_ids } => {
            commands::restart::handle(&client, instance_ids).await
        }
        Commands::Rename { instance_id, name } => {
            commands::rename::handle(&client, &instance_id, name).await
        }
        Commands::Ssh { instance_id } => {
            commands::ssh::handle(&client, &settings, &instance_id).await
        }
        Commands::Version => Ok(()),
    }
}
