//! Dashboard Discord commands - where the cycle stands this week.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, today},
        core::{report, tactic},
        errors::{Error, Result},
    };
    use tracing::info;

    /// Shows the current week, the weekly execution score and progress per goal.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        info!("Dashboard requested by {}", ctx.author().name);
        let session = ctx.data().session.lock().await;
        let response = report::format_dashboard(&session.dashboard(today()))?;
        ctx.say(response).await?;
        Ok(())
    }

    /// Weekly accountability meeting summary: score, done, open, and review notes.
    #[poise::command(slash_command, prefix_command)]
    pub async fn wam(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Week to summarise (defaults to the current week)"] week: Option<i64>,
    ) -> Result<()> {
        let session = ctx.data().session.lock().await;
        let week = match week {
            Some(w) => match tactic::validate_week(w) {
                Ok(w) => w,
                Err(e) => {
                    ctx.say(format!("❌ {e}")).await?;
                    return Ok(());
                }
            },
            None => session.cycle().current_week(today()),
        };

        let response = report::format_wam(session.cycle(), week, session.score_threshold())?;
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
