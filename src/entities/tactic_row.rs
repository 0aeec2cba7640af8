//! Tactic row entity - one row per tactic, goal columns repeated on every row.
//!
//! A goal without tactics is stored as a single row with a blank `Tactic_ID`.
//! Every cell is nullable text so hand-edited or legacy data still loads.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tactics table row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tactics")]
pub struct Model {
    /// Row position; rows are read back in this order
    #[sea_orm(primary_key, column_name = "Row")]
    pub row_id: i32,
    /// Owning goal id
    #[sea_orm(column_name = "Goal_ID")]
    pub goal_id: Option<String>,
    /// Owning goal title
    #[sea_orm(column_name = "Goal_Title")]
    pub goal_title: Option<String>,
    /// Tactic id, blank for a goal-only row
    #[sea_orm(column_name = "Tactic_ID")]
    pub tactic_id: Option<String>,
    #[sea_orm(column_name = "Tactic_Title")]
    pub tactic_title: Option<String>,
    /// Week number 1-13
    #[sea_orm(column_name = "Due_Week")]
    pub due_week: Option<String>,
    #[sea_orm(column_name = "Status")]
    pub status: Option<String>,
    #[sea_orm(column_name = "Block_Type")]
    pub block_type: Option<String>,
    /// `true`/`false`
    #[sea_orm(column_name = "Is_Completed")]
    pub is_completed: Option<String>,
}

/// Rows are linked to goals by value, not by foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
