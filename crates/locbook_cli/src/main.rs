//! Command-line host for the location service.
//!
//! # Responsibility
//! - Resolve configuration from environment and flags.
//! - Open the store, build the service for location commands, run one
//!   operation per call.
//! - Map typed failures to a status code on stderr and a non-zero exit.

use clap::{Parser, Subcommand};
use locbook_core::db::open_db;
use locbook_core::{
    init_logging, CallerToken, CoreConfig, CreateLocationRequest, DeleteLocationRequest,
    ListLocationsRequest, LocationService, RandomPublicIdGenerator, SqliteUserDirectory,
    UpdateLocationRequest,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

/// Manage per-user location records
#[derive(Parser, Debug)]
#[command(name = "locbook")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database file (overrides LOCBOOK_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Public id of the calling user
    #[arg(long, global = true, default_value = "")]
    user: String,

    /// trace|debug|info|warn|error (overrides LOCBOOK_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (overrides LOCBOOK_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a user public id so it can act as a caller
    RegisterUser {
        public_id: String,
    },

    /// List the caller's locations
    List {
        /// Only names containing this text
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a location owned by the caller
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },

    /// Update supplied fields of an owned location
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Delete an owned location
    Delete {
        #[arg(long)]
        id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("status={} {}", failure.status, failure.message);
            ExitCode::FAILURE
        }
    }
}

struct Failure {
    status: u16,
    message: String,
}

impl Failure {
    fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            status: 500,
            message: err.to_string(),
        }
    }
}

impl From<locbook_core::LocationServiceError> for Failure {
    fn from(value: locbook_core::LocationServiceError) -> Self {
        Self {
            status: value.status_code(),
            message: value.to_string(),
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<CoreConfig, locbook_core::LoggingError> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = &cli.db {
        config = config.with_db_path(db);
    }
    if let Some(level) = &cli.log_level {
        config = config.with_log_level(level)?;
    }
    if let Some(log_dir) = &cli.log_dir {
        config = config.with_log_dir(log_dir);
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Failure> {
    let config = resolve_config(&cli).map_err(|err| Failure {
        status: 400,
        message: err.to_string(),
    })?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, &log_dir.to_string_lossy()).map_err(Failure::internal)?;
    }

    let conn = open_db(&config.db_path).map_err(Failure::internal)?;
    let users = SqliteUserDirectory::new(&conn);
    let caller = CallerToken::new(cli.user);
    let service = || {
        LocationService::try_new(&conn, users, RandomPublicIdGenerator).map_err(Failure::internal)
    };

    match cli.command {
        Command::RegisterUser { public_id } => {
            let user = users.register_user(&public_id).map_err(Failure::internal)?;
            info!("event=user_register module=cli status=ok");
            println!("{}", user.public_id);
        }
        Command::List { name } => {
            let locations = service()?.list(&caller, &ListLocationsRequest { name })?;
            let body = serde_json::to_string_pretty(&locations).map_err(Failure::internal)?;
            println!("{body}");
        }
        Command::Create { name, address } => {
            let public_id = service()?.create(&caller, &CreateLocationRequest { name, address })?;
            println!("{}", serde_json::json!({ "id": public_id }));
        }
        Command::Update { id, name, address } => {
            service()?.update(
                &caller,
                &UpdateLocationRequest {
                    public_id: id,
                    name,
                    address,
                },
            )?;
        }
        Command::Delete { id } => {
            service()?.delete(&caller, &DeleteLocationRequest { public_id: id })?;
        }
    }

    Ok(())
}
