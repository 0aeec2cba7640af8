//! Core business logic - the cycle model and everything that operates on it.
//!
//! Nothing here knows about Discord. Pure domain code (`tactic`, `metric`,
//! `cycle`, `score`, `alignment`, `reconcile`, `report`) takes plain values;
//! `store` and `session` are the only parts that touch the database.

pub mod alignment;
pub mod cycle;
pub mod metric;
pub mod reconcile;
pub mod report;
pub mod score;
pub mod session;
pub mod store;
pub mod tactic;
