//! General Discord commands - ping and help.
//! These commands don't touch the cycle and provide basic bot functionality.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**12-Week Buddy Help**\n\
        Plan a 12-week cycle, execute it week by week, and review how it went.\n\n\
        **Dashboard**\n\
        • `/dashboard` - Current week, weekly score and goal progress.\n\
        • `/wam [week]` - Weekly accountability summary.\n\n\
        **Plan**\n\
        • `/plan` - Vision, goals, tactics and metrics.\n\
        • `/add_goal <title>` - Adds a goal.\n\
        • `/add_tactic <goal> <title> <week> [block_type]` - Adds a tactic to a goal.\n\
        • `/set_vision <kind> <content>` - Sets the 3-year or 1-year vision.\n\
        • `/block add|remove|list` - Manage protected strategic blocks.\n\n\
        **Execute**\n\
        • `/execute [week]` - Tactics due this week. Tactics are named `goal/tactic`, e.g. `g1/t2`.\n\
        • `/done <tactic>` - Toggles a tactic's completion.\n\
        • `/set_status <tactic> <status>` - Sets a tactic's status.\n\
        • `/schedule <tactic> <week> <day> <start>` - Moves a tactic to a slot.\n\n\
        **Review**\n\
        • `/review <wins> <lessons> [week]` - Submits the weekly review.\n\
        • `/history` - Execution score history.\n\n\
        **Metrics**\n\
        • `/metrics` - Lead and lag indicators.\n\
        • `/add_metric <goal> <title> <kind> <target> [start] [unit]` - Tracks a metric.\n\
        • `/update_metric <goal> <metric> <value>` - Records a metric value.\n\n\
        **Cycle**\n\
        • `/save` - Retries saving after a failed save.\n\
        • `/reload` - Discards unsaved changes and reloads from the store.\n\
        • `/archive [next_start]` - Closes the cycle and starts the next one.\n\
        • `/ping` - Checks if the bot is responsive.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
