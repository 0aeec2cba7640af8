//! Planning Discord commands - goals, tactics, vision and strategic blocks.
//!
//! Every edit goes through the session and is saved straight away; a failed
//! save is reported alongside the confirmation.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, save_note},
        core::{cycle::VisionKind, report, tactic::BlockType},
        errors::{Error, Result},
    };
    use tracing::info;

    /// Shows the vision, every goal with its tactics, and the strategic blocks.
    #[poise::command(slash_command, prefix_command)]
    pub async fn plan(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let session = ctx.data().session.lock().await;
        let response = report::format_plan(session.cycle())?;
        ctx.say(response).await?;
        Ok(())
    }

    /// Adds a goal to the cycle.
    #[poise::command(slash_command, prefix_command)]
    pub async fn add_goal(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "What the goal is"] title: String,
    ) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;

        let id = match session.add_goal(&title) {
            Ok(id) => id,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!("✅ Added goal `{id}`: **{}**{note}", title.trim()))
            .await?;
        Ok(())
    }

    /// Adds a tactic to a goal.
    #[poise::command(slash_command, prefix_command)]
    pub async fn add_tactic(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Goal the tactic belongs to"]
        #[autocomplete = "autocomplete::autocomplete_goal_id"]
        goal: String,
        #[description = "What to do"] title: String,
        #[description = "Week it is due (1-13)"] week: i64,
        #[description = "Strategic, Buffer, Breakout or None"]
        #[autocomplete = "autocomplete::autocomplete_block_type"]
        block_type: Option<String>,
    ) -> Result<()> {
        let block_type = match block_type.as_deref().map(BlockType::parse) {
            None => BlockType::None,
            Some(Some(b)) => b,
            Some(None) => {
                ctx.say("❌ Block type must be Strategic, Buffer, Breakout or None.")
                    .await?;
                return Ok(());
            }
        };

        let data = ctx.data();
        let mut session = data.session.lock().await;

        let id = match session.add_tactic(&goal, &title, week, block_type) {
            Ok(id) => id,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        info!(goal = %goal, tactic = %id, week, "Tactic added from Discord");
        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!(
            "✅ Added tactic `{id}` to `{goal}`: **{}** (week {week}, {block_type}){note}",
            title.trim()
        ))
        .await?;
        Ok(())
    }

    /// Sets the 3-year or 1-year vision statement.
    #[poise::command(slash_command, prefix_command)]
    pub async fn set_vision(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "3_Year or 1_Year"]
        #[autocomplete = "autocomplete::autocomplete_vision_kind"]
        kind: String,
        #[description = "The vision statement"] content: String,
    ) -> Result<()> {
        let Some(kind) = VisionKind::parse(&kind) else {
            ctx.say("❌ Vision kind must be 3_Year or 1_Year.").await?;
            return Ok(());
        };

        let data = ctx.data();
        let mut session = data.session.lock().await;
        session.set_vision(kind, &content);

        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!("✅ {kind} vision updated.{note}")).await?;
        Ok(())
    }

    /// Manage protected strategic blocks.
    #[poise::command(
        slash_command,
        subcommands("block_add", "block_remove", "block_list")
    )]
    pub async fn block(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Strategic block management. Available subcommands:\n\
            `/block add` - Protect a weekly time window\n\
            `/block remove` - Remove a protected window\n\
            `/block list` - List protected windows";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Protects a weekly window for strategic work.
    #[poise::command(slash_command, rename = "add")]
    pub async fn block_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day of the week"]
        #[autocomplete = "autocomplete::autocomplete_day"]
        day: String,
        #[description = "Start time, HH:MM (24-hour)"] start: String,
        #[description = "End time, HH:MM (24-hour)"] end: String,
    ) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;

        let block = match session.add_block(&day, &start, &end) {
            Ok(block) => block,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let note = save_note(&data.database, &mut session).await;
        ctx.say(format!("✅ Protected strategic block: {block}{note}"))
            .await?;
        Ok(())
    }

    /// Removes a protected window.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn block_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day of the week"]
        #[autocomplete = "autocomplete::autocomplete_day"]
        day: String,
        #[description = "Start time of the block, HH:MM"] start: String,
    ) -> Result<()> {
        let data = ctx.data();
        let mut session = data.session.lock().await;

        match session.remove_block(&day, &start) {
            Ok(true) => {
                let note = save_note(&data.database, &mut session).await;
                ctx.say(format!("✅ Removed the {day} block starting {start}.{note}"))
                    .await?;
            }
            Ok(false) => {
                ctx.say(format!("❌ No block on {day} starts at {start}."))
                    .await?;
            }
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
            }
        }
        Ok(())
    }

    /// Lists the protected windows.
    #[poise::command(slash_command, rename = "list")]
    pub async fn block_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let session = ctx.data().session.lock().await;
        let response = report::format_blocks(&session.cycle().strategic_blocks)?;
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
