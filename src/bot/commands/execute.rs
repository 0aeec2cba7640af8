//! Execution Discord commands - work the week's tactics.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, save_note, today},
        core::{report, session::tactic_key, tactic},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Lists the tactics due this week (or another week) with their status.
    #[poise::command(slash_command, prefix_command)]
    pub async fn execute(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Week to show (defaults to the current week)"] week: Option<i64>,
    ) -> Result<()> {
        let session = ctx.data().session.lock().await;
        let week = match week.map(tactic::validate_week) {
            None => session.cycle().current_week(today()),
            Some(Ok(w)) => w,
            Some(Err(e)) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let response = report::format_week_plan(session.cycle(), week)?;
        ctx.say(response).await?;
        Ok(())
    }

    /// Marks a tactic done, or un-done if it already was.
    #[poise::command(slash_command, prefix_command)]
    pub async fn done(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Tactic to toggle (goal/tactic)"]
        #[autocomplete = "autocomplete::autocomplete_tactic_id"]
        tactic: String,
    ) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;

        let result = session
            .resolve_tactic(&tactic)
            .and_then(|(goal_id, tactic_id)| {
                let completed = session.toggle_tactic(&goal_id, &tactic_id)?;
                Ok((tactic_key(&goal_id, &tactic_id), completed))
            });
        let (key, completed) = match result {
            Ok(done) => done,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let week = session.cycle().current_week(today());
        let score = session.cycle().weekly_score(week);
        let note = save_note(&data.database, &mut session).await;
        let verb = if completed { "✅ Completed" } else { "↩️ Reopened" };
        ctx.say(format!(
            "{verb} `{key}`. Week {week} score: {score:.1}%{note}"
        ))
        .await?;
        Ok(())
    }

    /// Sets a tactic's status (Not Started, In Progress, Completed, Deferred, Cancelled).
    #[poise::command(slash_command, prefix_command)]
    pub async fn set_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Tactic to update (goal/tactic)"]
        #[autocomplete = "autocomplete::autocomplete_tactic_id"]
        tactic: String,
        #[description = "New status"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: String,
    ) -> Result<()> {
        let Some(status) = tactic::TacticStatus::parse(&status) else {
            ctx.say(format!("❌ Unknown status '{status}'.")).await?;
            return Ok(());
        };

        let data = ctx.data();
        let mut session = data.session.lock().await;

        let result = session
            .resolve_tactic(&tactic)
            .and_then(|(goal_id, tactic_id)| {
                session.set_tactic_status(&goal_id, &tactic_id, status)?;
                Ok(tactic_key(&goal_id, &tactic_id))
            });
        let key = match result {
            Ok(key) => key,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!("✅ `{key}` is now **{status}**{note}"))
            .await?;
        Ok(())
    }

    /// Moves a tactic to a week and a day/time slot, advising on strategic alignment.
    #[poise::command(slash_command, prefix_command)]
    pub async fn schedule(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Tactic to schedule (goal/tactic)"]
        #[autocomplete = "autocomplete::autocomplete_tactic_id"]
        tactic: String,
        #[description = "Week (1-13)"] week: i64,
        #[description = "Day of the week"]
        #[autocomplete = "autocomplete::autocomplete_day"]
        day: String,
        #[description = "Start time, HH:MM (24-hour)"] start: String,
    ) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;

        let result = session
            .resolve_tactic(&tactic)
            .and_then(|(goal_id, tactic_id)| {
                let outcome = session.schedule_tactic(&goal_id, &tactic_id, week, &day, &start)?;
                Ok((tactic_key(&goal_id, &tactic_id), outcome))
            });
        let (key, outcome) = match result {
            Ok(scheduled) => scheduled,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let mut response = String::new();
        writeln!(
            &mut response,
            "📅 `{key}` scheduled for week {}, {} at {}.",
            outcome.week, outcome.day, outcome.start_time
        )?;
        for advisory in &outcome.advisories {
            writeln!(&mut response, "⚠️ {advisory}")?;
        }
        response.push_str(&save_note(&data.database, &mut session).await);

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
