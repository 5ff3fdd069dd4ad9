//! RavenFleet - fleet telemetry command-line client
//!
//! Every invocation is a fresh process, so read commands first resume the
//! session from saved credentials.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ravenfleet_domain::FleetError;
use ravenfleet_lib::utils::logging::init_tracing;
use ravenfleet_lib::{self as app, AppContext};
use serde::Serialize;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "ravenfleet")]
#[command(about = "RavenFleet - fleet telemetry client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Save credentials and run a full sync
    Login {
        /// Fleet API base URL
        #[arg(long)]
        api_url: String,

        #[arg(long)]
        api_key: String,

        #[arg(long)]
        api_secret: String,
    },

    /// Sync using saved credentials and print the fleet
    Sync {
        /// Reuse the session token and keep the selection
        #[arg(long)]
        refresh: bool,
    },

    /// Print the vehicle list
    Vehicles,

    /// Print the geofence list
    Geofences,

    /// Print one vehicle
    Select {
        uuid: String,
    },

    /// Print the request/response log of a sync
    Logs,

    /// Print sync status
    Status,

    /// Discard saved credentials
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load .env before anything reads RAVENFLEET_* overrides
    let dotenv = dotenvy::dotenv();

    if let Err(err) = init_tracing(cli.verbose, cli.json_logs) {
        eprintln!("failed to initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(err) => debug!(error = %err, "no .env loaded"),
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<FleetError>() {
                Some(fleet) => {
                    error!(error_type = fleet.label(), error = %fleet, "command failed");
                    eprintln!("{}", fleet.user_message());
                }
                None => {
                    error!(error = %err, "command failed");
                    eprintln!("{err:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::load(cli.config)?;

    match cli.command {
        Commands::Login { api_url, api_key, api_secret } => {
            let snapshot = app::login(&ctx, &api_url, &api_key, &api_secret).await?;
            print_json(&snapshot)
        }
        Commands::Sync { refresh } => {
            resume(&ctx).await?;
            if refresh {
                app::sync_fleet(&ctx, true).await?;
            }
            print_json(&*ctx.sync.snapshot())
        }
        Commands::Vehicles => {
            resume(&ctx).await?;
            print_json(&app::list_vehicles(&ctx))
        }
        Commands::Geofences => {
            resume(&ctx).await?;
            print_json(&app::list_geofences(&ctx))
        }
        Commands::Select { uuid } => {
            resume(&ctx).await?;
            print_json(&app::select_vehicle(&ctx, &uuid)?)
        }
        Commands::Logs => {
            // A failed pass clears the log unless it is configured to keep it
            if let Err(err) = resume(&ctx).await {
                debug!(error = %err, "sync failed, printing retained log");
            }
            print_json(&app::get_logs(&ctx))
        }
        Commands::Status => {
            if let Err(err) = resume(&ctx).await {
                debug!(error = %err, "sync failed, status reflects the failure");
            }
            print_json(&app::fleet_status(&ctx))
        }
        Commands::Logout => {
            app::logout(&ctx).await?;
            Ok(())
        }
    }
}

async fn resume(ctx: &AppContext) -> anyhow::Result<()> {
    app::restore_session(ctx)
        .await?
        .map(|_| ())
        .context("no saved credentials, run `ravenfleet login` first")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
