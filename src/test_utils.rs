//! Shared test utilities for `TwelveWeekBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and building cycles and rows with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        cycle::Cycle,
        reconcile::{Cell, TacticRow},
        tactic::{BlockType, Tactic},
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a cycle starting Monday 2025-01-06 with one goal.
///
/// # Contents
/// * `g1` "Launch the product"
/// * `t1` week 1, Strategic
/// * `t2` week 1, Buffer
/// * `t3` week 1, None
pub fn sample_cycle() -> Cycle {
    let mut cycle = Cycle::new("c1", date(2025, 1, 6));
    let goal_id = cycle.add_goal("Launch the product").unwrap();
    let goal = cycle.goal_mut(&goal_id).unwrap();

    for (id, title, block) in [
        ("t1", "Write landing page", BlockType::Strategic),
        ("t2", "Answer support mail", BlockType::Buffer),
        ("t3", "Go for a run", BlockType::None),
    ] {
        goal.add_tactic(Tactic::new(id, title, 1, block).unwrap())
            .unwrap();
    }
    cycle
}

/// Creates a tactics row for week 1 that is not started.
///
/// # Defaults
/// * `goal_title`: "Goal"
/// * `tactic_title`: "Tactic {`tactic_id`}"
/// * `block_type`: "None"
/// * `is_completed`: "false"
pub fn tactic_row(goal_id: &str, tactic_id: &str) -> TacticRow {
    TacticRow {
        goal_id: Cell::text(goal_id),
        goal_title: Cell::text("Goal"),
        tactic_id: Cell::text(tactic_id),
        tactic_title: Cell::text(format!("Tactic {tactic_id}")),
        due_week: Cell::text("1"),
        status: Cell::text("Not Started"),
        block_type: Cell::text("None"),
        is_completed: Cell::text("false"),
    }
}
