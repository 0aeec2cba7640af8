//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Cycle persistence and lifecycle commands
pub mod cycle;

/// Dashboard and accountability summary commands
pub mod dashboard;

/// Weekly execution commands
pub mod execute;

/// General utility commands
pub mod general;

/// Lead and lag metric commands
pub mod metric;

/// Planning commands for goals, tactics, vision and strategic blocks
pub mod plan;

/// Weekly review commands
pub mod review;

// Export commands
pub use cycle::*;
pub use dashboard::*;
pub use execute::*;
pub use general::*;
pub use metric::*;
pub use plan::*;
pub use review::*;

use crate::{bot::BotData, errors::Error};

/// Every command the bot registers
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        dashboard(),
        wam(),
        plan(),
        add_goal(),
        add_tactic(),
        set_vision(),
        block(),
        execute(),
        done(),
        set_status(),
        schedule(),
        review(),
        history(),
        metrics(),
        add_metric(),
        update_metric(),
        save(),
        reload(),
        archive(),
    ]
}
