//! Review Discord commands - weekly reflection and score history.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, save_note, today},
        core::{cycle::ReviewUpsert, report, score::ScoreStatus},
        errors::{Error, Result},
    };

    /// Submits the weekly review. The score is computed from the week's tactics.
    #[poise::command(slash_command, prefix_command)]
    pub async fn review(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "What went well?"] wins: String,
        #[description = "What can be improved?"] lessons: String,
        #[description = "Week reviewed (defaults to the current week)"] week: Option<i64>,
    ) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;
        let today = today();
        let week = week.unwrap_or_else(|| i64::from(session.cycle().current_week(today)));

        let submitted = match session.submit_review(week, &wins, &lessons, today) {
            Ok(submitted) => submitted,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let verb = match submitted.upsert {
            ReviewUpsert::Inserted => "submitted",
            ReviewUpsert::Updated => "updated",
        };
        let status = ScoreStatus::classify(submitted.review.score, session.score_threshold());
        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!(
            "📝 Week {} review {verb}. Score: **{:.1}%** ({}){note}",
            submitted.review.week_num,
            submitted.review.score,
            status.as_str()
        ))
        .await?;
        Ok(())
    }

    /// Shows the execution score recorded with each weekly review.
    #[poise::command(slash_command, prefix_command)]
    pub async fn history(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let session = ctx.data().session.lock().await;
        let points = report::score_history(session.cycle(), session.score_threshold());
        ctx.say(report::format_score_history(&points)?).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
