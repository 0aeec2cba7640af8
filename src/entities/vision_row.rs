//! Vision row entity - `3_Year` and `1_Year` statements.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vision table row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vision")]
pub struct Model {
    /// Row position
    #[sea_orm(primary_key, column_name = "Row")]
    pub row_id: i32,
    #[sea_orm(column_name = "Type")]
    pub kind: Option<String>,
    #[sea_orm(column_name = "Content")]
    pub content: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
