mod cli;
mod config;
mod db;
mod models;
mod notify;
mod prayer_times;
mod reminder;
mod server;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;
use db::repository::MetaRepo;
use prayer_times::{AladhanClient, cached_or_fetch};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    match cli.command {
        // Setup wizard
        Some(Commands::Setup { reset }) => {
            handlers::handle_setup(&conn, &mut config, reset)?;
        }

        // Explicit subcommands check setup first
        Some(cmd) => {
            ensure_setup(&conn, &mut config)?;
            match cmd {
                Commands::Times { refresh } => {
                    handlers::handle_times(&conn, &config, refresh)?;
                }
                Commands::Habit { action } => {
                    handlers::handle_habit(&conn, &action)?;
                }
                Commands::Workout { action } => {
                    handlers::handle_workout(&conn, &config, &action)?;
                }
                Commands::Meals { action } => {
                    handlers::handle_meals(&conn, &action)?;
                }
                Commands::Stats { week } => {
                    handlers::handle_stats(&conn, week)?;
                }
                Commands::Send { to, text } => {
                    handlers::handle_send(&config, &to, &text)?;
                }
                Commands::Serve { port } => {
                    handlers::handle_serve(conn, &config, port)?;
                }
                Commands::Watch => {
                    handlers::handle_watch(&conn, &config)?;
                }
                Commands::Setup { .. } => unreachable!(),
            }
        }

        // No subcommand: launch the dashboard TUI
        None => {
            ensure_setup(&conn, &mut config)?;
            prefetch_times(&conn, &config);
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}

/// Check if setup has been done; if not, run the wizard automatically.
fn ensure_setup(conn: &Connection, config: &mut AppConfig) -> Result<()> {
    let done = MetaRepo::get(conn, "setup_done")?;
    if done.as_deref() != Some("1") {
        eprintln!("No configuration found. Running setup...");
        eprintln!();
        handlers::handle_setup(conn, config, false)?;
    }
    Ok(())
}

/// Best-effort fetch of today's times so the dashboard has data. The TUI
/// itself never touches the network; a failure here just leaves the prayer
/// panel empty.
fn prefetch_times(conn: &Connection, config: &AppConfig) {
    let today = chrono::Local::now().date_naive();
    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|rt| {
            rt.block_on(cached_or_fetch(
                conn,
                &AladhanClient::new(),
                &config.location,
                today,
            ))
        });
    if let Err(err) = result {
        log::warn!("Could not fetch today's prayer times: {:#}", err);
    }
}
