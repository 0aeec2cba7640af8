//! Metric row entity - one row per metric, keyed to its goal by `Goal_ID`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metrics table row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metrics")]
pub struct Model {
    /// Row position
    #[sea_orm(primary_key, column_name = "Row")]
    pub row_id: i32,
    #[sea_orm(column_name = "Goal_ID")]
    pub goal_id: Option<String>,
    #[sea_orm(column_name = "Metric_ID")]
    pub metric_id: Option<String>,
    #[sea_orm(column_name = "Title")]
    pub title: Option<String>,
    /// `Lead` or `Lag`
    #[sea_orm(column_name = "Type")]
    pub kind: Option<String>,
    #[sea_orm(column_name = "Starting_Value")]
    pub starting_value: Option<String>,
    #[sea_orm(column_name = "Target_Value")]
    pub target_value: Option<String>,
    #[sea_orm(column_name = "Current_Value")]
    pub current_value: Option<String>,
    #[sea_orm(column_name = "Unit")]
    pub unit: Option<String>,
    /// ISO date of the last recorded value
    #[sea_orm(column_name = "Last_Updated")]
    pub last_updated: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
