use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sqlward::config::Config;
use sqlward::engine::MySqlEngine;
use sqlward::error::Error;
use sqlward::provision::Provisioner;
use sqlward::registry::{Registry, SqliteRegistry};
use sqlward::response::Failure;
use sqlward::types::ContactInfo;

#[derive(Parser)]
#[command(name = "sqlward")]
#[command(about = "Tenant provisioning for shared MySQL hosting", long_about = None)]
struct Cli {
    /// Path to the configuration file (default: ./sqlward.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the registry database (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the registry database
    Init,

    /// Account lifecycle
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Credential rotation
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },

    /// Database lifecycle
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Create the target's account and engine login
    Create {
        /// Account the operation applies to
        target: String,

        /// Human name recorded with the account
        #[arg(long)]
        full_name: Option<String>,

        /// Contact address recorded with the account
        #[arg(long)]
        email: Option<String>,
    },

    /// Delete the target's account and engine login
    Delete { target: String },
}

#[derive(Subcommand)]
enum PasswordCommands {
    /// Set the target's password to the supplied value
    Set {
        target: String,

        /// Exactly one value: the new password
        args: Vec<String>,
    },

    /// Generate a fresh password for the target and print it
    Generate { target: String },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Create a database owned by the target
    Create {
        target: String,

        /// Exactly one value: the database name without the owner prefix
        args: Vec<String>,
    },

    /// Drop one of the target's databases
    Drop {
        target: String,

        /// Exactly one value: the database name without the owner prefix
        args: Vec<String>,
    },
}

/// The verified caller, as the dispatch layer hands it over. A realm suffix
/// (`alice@EXAMPLE.COM`) is stripped; accounts are named by the bare
/// principal.
fn actor_from_env() -> anyhow::Result<String> {
    let Ok(raw) = std::env::var("REMOTE_USER") else {
        bail!("REMOTE_USER is not set; refusing to guess the caller");
    };
    let actor = raw.split('@').next().unwrap_or_default().to_string();
    if actor.is_empty() {
        bail!("REMOTE_USER is empty");
    }
    Ok(actor)
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Path::new("sqlward.toml"))?,
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    Ok(config)
}

fn run_init(config: &Config) -> anyhow::Result<()> {
    fs::create_dir_all(&config.data_dir)?;

    let registry = SqliteRegistry::new(config.registry_path())?;
    registry.initialize()?;

    println!("Registry initialized at {}", config.registry_path().display());
    Ok(())
}

async fn dispatch(
    provisioner: &Provisioner,
    actor: &str,
    command: Commands,
) -> Result<serde_json::Value, Error> {
    match command {
        // Handled before the provisioner is built.
        Commands::Init => Ok(serde_json::json!({})),

        Commands::Account { command } => match command {
            AccountCommands::Create {
                target,
                full_name,
                email,
            } => {
                let contact = ContactInfo { full_name, email };
                let issued = provisioner.create_account(actor, &target, &contact).await?;
                Ok(serde_json::to_value(issued)?)
            }
            AccountCommands::Delete { target } => {
                provisioner.delete_account(actor, &target).await?;
                Ok(serde_json::json!({}))
            }
        },

        Commands::Password { command } => match command {
            PasswordCommands::Set { target, args } => {
                provisioner.set_password(actor, &target, &args).await?;
                Ok(serde_json::json!({}))
            }
            PasswordCommands::Generate { target } => {
                let issued = provisioner.generate_password(actor, &target).await?;
                Ok(serde_json::to_value(issued)?)
            }
        },

        Commands::Db { command } => match command {
            DbCommands::Create { target, args } => {
                let created = provisioner.create_database(actor, &target, &args).await?;
                Ok(serde_json::to_value(created)?)
            }
            DbCommands::Drop { target, args } => {
                provisioner.drop_database(actor, &target, &args).await?;
                Ok(serde_json::json!({}))
            }
        },
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    // Stdout carries exactly one JSON payload per invocation; diagnostics go
    // to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sqlward=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if matches!(cli.command, Commands::Init) {
        run_init(&config)?;
        return Ok(ExitCode::SUCCESS);
    }

    let actor = actor_from_env()?;
    let registry = SqliteRegistry::new(config.registry_path())?;
    let engine = MySqlEngine::connect(&config.effective_engine_url())?;
    let provisioner = Provisioner::new(Arc::new(registry), Arc::new(engine), &config);

    match dispatch(&provisioner, &actor, cli.command).await {
        Ok(payload) => {
            println!("{payload}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_internal() => Err(err.into()),
        Err(err) => {
            let failure = Failure::from(&err);
            println!("{}", serde_json::to_string(&failure)?);
            Ok(ExitCode::from(1))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("sqlward: {e:#}");
            ExitCode::from(2)
        }
    }
}
