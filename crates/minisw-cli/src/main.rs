//! minisw entry point.
//!
//! Parses arguments, initializes logging, connects to SysDB and dispatches
//! `show` and `config` commands.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use minisw_cli::table::render_interfaces;
use minisw_cli::{sort_by_name, InterfaceView, IntfMutator, IntfReconciler, TargetState};
use sysdb_common::{
    validate_interface_name, RedisStore, SysDb, SysdbConfig, SysdbError, SysdbResult,
};

/// MiniSwitchOS CLI
#[derive(Parser, Debug)]
#[command(name = "minisw")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to /etc/minisw/sysdb.toml)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Redis server host
    #[arg(long)]
    redis_host: Option<String>,

    /// Redis server port
    #[arg(long)]
    redis_port: Option<u16>,

    /// Redis database index holding SysDB
    #[arg(long)]
    db: Option<u32>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show system state
    Show {
        #[command(subcommand)]
        entity: ShowEntity,
    },

    /// Configure interface admin state
    Config {
        /// Interface name (ex: eth1)
        interface: String,

        /// Admin state (up or down)
        state: String,
    },
}

#[derive(Subcommand, Debug)]
enum ShowEntity {
    /// Show all interfaces known to the control plane
    Interfaces {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a single interface
    Interface {
        /// Interface name (ex: eth1)
        name: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Initialize tracing/logging on stderr so command output stays clean.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    if let Err(e) = result {
        eprintln!("minisw: failed to initialize logging: {}", e);
    }
}

/// Merges the config file with command line overrides.
fn load_config(args: &Args) -> SysdbResult<SysdbConfig> {
    let mut config = match &args.config {
        Some(path) => SysdbConfig::load_or_default(path)?,
        None => SysdbConfig::load()?,
    };

    if let Some(host) = &args.redis_host {
        config.database.redis_host = host.clone();
    }
    if let Some(port) = args.redis_port {
        config.database.redis_port = port;
    }
    if let Some(db) = args.db {
        config.database.db_number = db;
    }

    Ok(config)
}

fn print_views(views: &[InterfaceView], json: bool) -> SysdbResult<()> {
    if json {
        let out = serde_json::to_string_pretty(views)
            .map_err(|e| SysdbError::malformed_record("output", e))?;
        println!("{}", out);
    } else {
        print!("{}", render_interfaces(views));
    }
    Ok(())
}

/// Rejects a bad `config` request before a connection is opened, in the
/// same order the mutator checks it.
fn check_config_request(interface: &str, state: &str) -> SysdbResult<()> {
    state.parse::<TargetState>()?;
    validate_interface_name(interface)
}

async fn connect(config: &SysdbConfig) -> SysdbResult<Arc<dyn SysDb>> {
    let db: Arc<dyn SysDb> = Arc::new(RedisStore::connect(config.database.clone()).await?);
    Ok(db)
}

async fn run(command: Command, config: SysdbConfig) -> SysdbResult<ExitCode> {
    match command {
        Command::Show {
            entity: ShowEntity::Interfaces { json },
        } => {
            let db = connect(&config).await?;
            let mut views = IntfReconciler::new(db).show_interfaces().await?;
            sort_by_name(&mut views);
            debug!("Rendering {} interfaces", views.len());
            print_views(&views, json)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Show {
            entity: ShowEntity::Interface { name, json },
        } => match IntfReconciler::new(connect(&config).await?)
            .show_interface(&name)
            .await?
        {
            Some(view) => {
                print_views(std::slice::from_ref(&view), json)?;
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("Interface {} not found", name);
                Ok(ExitCode::FAILURE)
            }
        },

        Command::Config { interface, state } => {
            check_config_request(&interface, &state)?;

            let change = IntfMutator::new(connect(&config).await?)
                .with_user(config.mutator.user)
                .set_admin_state(&interface, &state)
                .await?;
            println!("{}", change);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let mut args = Args::parse();
    init_logging(&args.log_level);

    let Some(command) = args.command.take() else {
        // No subcommand is a usage error.
        if let Err(e) = Args::command().print_help() {
            eprintln!("minisw: failed to print help: {}", e);
        }
        return ExitCode::FAILURE;
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("minisw: {}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(command, config).await {
        Ok(code) => code,
        Err(e) => {
            match &e {
                SysdbError::InvalidState { .. } | SysdbError::InvalidInterfaceName { .. } => {
                    debug!("Rejected request: {}", e)
                }
                _ => error!("minisw: {}", e),
            }
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
