//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the planner: slash commands,
//! autocomplete handlers, the shared bot context and the client startup.

/// Discord command implementations (dashboard, plan, execute, review, metric, cycle, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::session::CycleSession,
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
///
/// The session mutex is held for the whole of a command, so edits from
/// concurrent interactions are applied one at a time.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// The live cycle
    pub session: Mutex<CycleSession>,
}

impl BotData {
    /// Creates a new `BotData` around a loaded session.
    #[must_use]
    pub fn new(database: DatabaseConnection, session: CycleSession) -> Self {
        Self {
            database,
            session: Mutex::new(session),
        }
    }
}

/// Today's date in local time
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Saves the session after an edit.
///
/// Returns an empty string on success, or a warning line to append to the reply.
/// A failed save leaves the edit in memory so `/save` can retry it.
pub async fn save_note(db: &DatabaseConnection, session: &mut CycleSession) -> String {
    match session.save(db).await {
        Ok(()) => String::new(),
        Err(e) => {
            error!("Failed to save cycle: {e}");
            format!("\n⚠️ Not saved: {e}. The change is kept in memory; run `/save` to retry.")
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ An error occurred: {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
