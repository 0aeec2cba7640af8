//! Cycle Discord commands - save, reload and archive.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, save_note, today},
        core::cycle::CYCLE_WEEKS,
        errors::{Error, Result},
    };
    use chrono::{Duration, NaiveDate};
    use std::fmt::Write;
    use tracing::{info, warn};

    /// Saves the cycle. Use this to retry after a save failed.
    #[poise::command(slash_command, prefix_command)]
    pub async fn save(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;

        match session.save(&data.database).await {
            Ok(()) => ctx.say("💾 Cycle saved.").await?,
            Err(e) => {
                warn!("Manual save failed: {e}");
                ctx.say(format!("❌ Save failed: {e}. Changes are still in memory."))
                    .await?
            }
        };
        Ok(())
    }

    /// Discards unsaved changes and reloads the cycle from the store.
    #[poise::command(slash_command, prefix_command)]
    pub async fn reload(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;
        let discarded = session.is_dirty();

        match session.reload(&data.database, today()).await {
            Ok(dropped) => {
                let mut response = format!(
                    "🔄 Reloaded {} goals.",
                    session.cycle().goals.len()
                );
                if discarded {
                    response.push_str(" Unsaved changes were discarded.");
                }
                if !dropped.is_empty() {
                    write!(
                        &mut response,
                        "\n⚠️ {} unreadable rows were skipped; see the log.",
                        dropped.len()
                    )?;
                }
                ctx.say(response).await?;
            }
            Err(e) => {
                ctx.say(format!("❌ Reload failed: {e}. The current cycle is unchanged."))
                    .await?;
            }
        }
        Ok(())
    }

    /// Closes the cycle: clears tactics and reviews, keeps goals, metrics, vision and blocks.
    #[poise::command(slash_command, prefix_command)]
    pub async fn archive(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Start of the next cycle, YYYY-MM-DD (defaults to today)"]
        next_start: Option<String>,
    ) -> Result<()> {
        let parsed = next_start
            .as_deref()
            .map(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d"));
        let next_start = match parsed {
            None => today(),
            Some(Ok(date)) => date,
            Some(Err(_)) => {
                ctx.say("❌ Dates must be YYYY-MM-DD.").await?;
                return Ok(());
            }
        };

        let data = ctx.data();
        let mut session = data.session.lock().await;
        session.archive(next_start);
        info!(%next_start, "Archived cycle from Discord");

        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!(
            "🎉 Cycle archived. The next cycle runs {} to {}.{note}",
            next_start,
            next_start + Duration::weeks(CYCLE_WEEKS)
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
