//! Metric Discord commands - lead and lag indicators per goal.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, save_note, today},
        core::{metric::MetricKind, report},
        errors::{Error, Result},
    };

    /// Lists every metric with its progress toward target.
    #[poise::command(slash_command, prefix_command)]
    pub async fn metrics(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let session = ctx.data().session.lock().await;
        ctx.say(report::format_metrics(session.cycle())?).await?;
        Ok(())
    }

    /// Starts tracking a metric for a goal.
    #[poise::command(slash_command, prefix_command)]
    pub async fn add_metric(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Goal the metric measures"]
        #[autocomplete = "autocomplete::autocomplete_goal_id"]
        goal: String,
        #[description = "What is measured"] title: String,
        #[description = "Lead (effort) or Lag (outcome)"]
        #[autocomplete = "autocomplete::autocomplete_metric_kind"]
        kind: String,
        #[description = "Value that counts as success"] target: f64,
        #[description = "Value today (defaults to 0)"] start: Option<f64>,
        #[description = "Unit label, e.g. $ or leads"] unit: Option<String>,
    ) -> Result<()> {
        let Some(kind) = MetricKind::parse(&kind) else {
            ctx.say("❌ Metric kind must be Lead or Lag.").await?;
            return Ok(());
        };

        let data = ctx.data();
        let mut session = data.session.lock().await;

        let id = match session.add_metric(
            &goal,
            &title,
            kind,
            start.unwrap_or(0.0),
            target,
            unit.as_deref().unwrap_or(""),
        ) {
            Ok(id) => id,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!("✅ Tracking {kind} metric `{id}` for `{goal}`.{note}"))
            .await?;
        Ok(())
    }

    /// Records the latest value of a metric.
    #[poise::command(slash_command, prefix_command)]
    pub async fn update_metric(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Goal the metric belongs to"]
        #[autocomplete = "autocomplete::autocomplete_goal_id"]
        goal: String,
        #[description = "Metric to update"]
        #[autocomplete = "autocomplete::autocomplete_metric_id"]
        metric: String,
        #[description = "Current value"] value: f64,
    ) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;

        let percent = match session.record_metric(&goal, &metric, value, today()) {
            Ok(percent) => percent,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!(
            "📈 `{metric}` is now {value}: {}{note}",
            report::format_progress_bar(percent, None)
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
