//! Entity module - SeaORM definitions for the five row tables a cycle is stored in.
//! Every column except the `Row` key is nullable text; typing happens when the
//! rows are rebuilt into a cycle.

pub mod metric_row;
pub mod review_row;
pub mod setting_row;
pub mod tactic_row;
pub mod vision_row;

// Re-export specific types to avoid conflicts
pub use metric_row::{Column as MetricRowColumn, Entity as MetricRow, Model as MetricRowModel};
pub use review_row::{Column as ReviewRowColumn, Entity as ReviewRow, Model as ReviewRowModel};
pub use setting_row::{
    Column as SettingRowColumn, Entity as SettingRow, Model as SettingRowModel,
};
pub use tactic_row::{Column as TacticRowColumn, Entity as TacticRow, Model as TacticRowModel};
pub use vision_row::{Column as VisionRowColumn, Entity as VisionRow, Model as VisionRowModel};
