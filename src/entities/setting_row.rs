//! Setting row entity - typed key/value rows.
//!
//! Strategic blocks are stored here as `Type = StrategicBlock`, `Key` = day,
//! `Value` = start time and `Extra` = end time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settings table row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Row position
    #[sea_orm(primary_key, column_name = "Row")]
    pub row_id: i32,
    #[sea_orm(column_name = "Type")]
    pub kind: Option<String>,
    #[sea_orm(column_name = "Key")]
    pub key: Option<String>,
    #[sea_orm(column_name = "Value")]
    pub value: Option<String>,
    #[sea_orm(column_name = "Extra")]
    pub extra: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
