use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::ApiClient;
use crate::app::App;
use crate::config::ConfigLoader;

pub mod commands;

use self::commands::{AnalyticsArgs, DeleteArgs, ListArgs, SetStatusArgs, UsersArgs};

#[derive(Parser, Debug)]
#[command(
    name = "sirentui",
    version,
    about = "Terminal console for triaging emergency notifications"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over SIRENTUI_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over SIRENTUI_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive TUI (default)
    Tui,
    /// Print the notification feed non-interactively
    List(ListArgs),
    /// Update the status of a notification
    SetStatus(SetStatusArgs),
    /// Delete a notification
    Delete(DeleteArgs),
    /// List registered users
    Users(UsersArgs),
    /// Print the analytics report
    Analytics(AnalyticsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var("SIRENTUI_CONFIG", path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var("SIRENTUI_DATA", path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;

    let config = Arc::new(config);
    let command = cli.command.unwrap_or(Commands::Tui);
    if let Commands::Tui = command {
        let mut app = App::new(config)?;
        return commands::run_tui(&mut app);
    }

    let api = ApiClient::new(&config.api).context("building API client")?;
    match command {
        Commands::Tui => Ok(()),
        Commands::List(args) => commands::list_notifications(&config, &api, args),
        Commands::SetStatus(args) => commands::set_status(&api, args),
        Commands::Delete(args) => commands::delete_notification(&api, args),
        Commands::Users(args) => commands::list_users(&api, args),
        Commands::Analytics(args) => commands::show_analytics(&api, args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
