#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use std::{env, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use twelve_week_buddy::{
    bot::{self, BotData},
    config::{cycle as cycle_config, database},
    core::{session::CycleSession, store},
    diagnostics,
    errors::{Error, Result},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    if env::args().skip(1).any(|arg| arg == "--diagnose") {
        return diagnose().await;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn diagnose() -> ExitCode {
    let report = diagnostics::run_diagnostics(&database::get_database_url()).await;
    match report.render() {
        Ok(text) => println!("{text}"),
        Err(e) => error!("Failed to render diagnostics: {e}"),
    }
    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run() -> Result<()> {
    // 3. Load the application configuration
    let app_config = cycle_config::load_default_config()?;

    // 4. Connect and make sure the row tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Rebuild the cycle from the stored rows
    let outcome = store::load_cycle(&db, bot::today()).await?;
    for dropped in &outcome.dropped {
        warn!("Dropped stored row: {dropped}");
    }
    let mut cycle = outcome.cycle;

    // 6. Seed an empty store from config.toml
    if cycle_config::seed_cycle(&mut cycle, &app_config)? {
        store::save_cycle(&db, &cycle)
            .await
            .inspect(|()| info!("Seed plan saved."))
            .inspect_err(|e| error!("Failed to save seed plan: {e}"))?;
    }

    let session = CycleSession::new(cycle, app_config.score_threshold);

    // 7. Run the bot; the token is read directly before use
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, session)).await
}
