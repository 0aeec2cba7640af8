//! Review row entity - one weekly review per row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reviews table row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// Row position
    #[sea_orm(primary_key, column_name = "Row")]
    pub row_id: i32,
    #[sea_orm(column_name = "Week_Num")]
    pub week_num: Option<String>,
    #[sea_orm(column_name = "Score")]
    pub score: Option<String>,
    #[sea_orm(column_name = "Wins")]
    pub wins: Option<String>,
    #[sea_orm(column_name = "Lessons")]
    pub lessons: Option<String>,
    /// ISO submission date
    #[sea_orm(column_name = "Date_Submitted")]
    pub date_submitted: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
