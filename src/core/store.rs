//! Persistence of a cycle through its five row tables.
//!
//! A save replaces each table's contents wholesale inside one transaction, so a
//! failure part-way leaves the previous snapshot in place. A load reads every
//! table in row order by column name: a table that does not exist yet is empty,
//! and a column that does not exist reads as blank cells.

use crate::{
    core::{
        cycle::Cycle,
        reconcile::{
            self, Cell, MetricRow, RebuildOutcome, ReviewRow, RowGroup, SettingRow, TableSet,
            TacticRow, VisionRow,
        },
    },
    entities::{
        MetricRow as MetricRowEntity, ReviewRow as ReviewRowEntity,
        SettingRow as SettingRowEntity, TacticRow as TacticRowEntity,
        VisionRow as VisionRowEntity, metric_row, review_row, setting_row, tactic_row, vision_row,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Set, Statement, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Reads all five tables. Missing tables come back empty.
#[instrument(skip(db))]
pub async fn load_tables(db: &DatabaseConnection) -> Result<TableSet> {
    let tactics = read_group(db, RowGroup::Tactics).await?;
    let metrics = read_group(db, RowGroup::Metrics).await?;
    let reviews = read_group(db, RowGroup::Reviews).await?;
    let vision = read_group(db, RowGroup::Vision).await?;
    let settings = read_group(db, RowGroup::Settings).await?;

    Ok(TableSet {
        tactics: tactics.into_iter().map(tactic_from_stored).collect(),
        metrics: metrics.into_iter().map(metric_from_stored).collect(),
        reviews: reviews.into_iter().map(review_from_stored).collect(),
        vision: vision.into_iter().map(vision_from_stored).collect(),
        settings: settings.into_iter().map(setting_from_stored).collect(),
    })
}

/// Column names of `table` in declared order; empty when the table does not exist
pub async fn table_columns(db: &DatabaseConnection, table: &str) -> Result<Vec<String>> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            format!("PRAGMA table_info(\"{table}\")"),
        ))
        .await?;

    rows.iter()
        .map(|row| row.try_get::<String>("", "name").map_err(Into::into))
        .collect()
}

/// Stored headers of `group` that `table_columns` did not report
#[must_use]
pub fn missing_columns(group: RowGroup, present: &[String]) -> Vec<&'static str> {
    group
        .headers()
        .iter()
        .copied()
        .filter(|h| !present.iter().any(|p| p == h))
        .collect()
}

/// One stored row, keyed by header
struct StoredRow {
    cells: HashMap<&'static str, Cell>,
}

impl StoredRow {
    fn take(&mut self, header: &str) -> Cell {
        self.cells.remove(header).unwrap_or(Cell::Empty)
    }
}

async fn read_group(db: &DatabaseConnection, group: RowGroup) -> Result<Vec<StoredRow>> {
    let table = group.table_name();
    let present = table_columns(db, table).await?;
    if present.is_empty() {
        debug!(table, "Table missing, treating as empty");
        return Ok(Vec::new());
    }

    let missing = missing_columns(group, &present);
    if !missing.is_empty() {
        warn!(table, ?missing, "Columns missing, reading them as blank");
    }
    let columns: Vec<&'static str> = group
        .headers()
        .iter()
        .copied()
        .filter(|h| !missing.contains(h))
        .collect();
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    // CAST keeps hand-entered numbers readable as text
    let select = columns
        .iter()
        .map(|c| format!("CAST(\"{c}\" AS TEXT) AS \"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT {select} FROM \"{table}\" ORDER BY rowid"),
        ))
        .await?;

    rows.iter()
        .map(|row| -> Result<StoredRow> {
            let cells = columns
                .iter()
                .map(|&c| -> Result<(&'static str, Cell)> {
                    let value: Option<String> = row.try_get("", c)?;
                    Ok((c, value.map_or(Cell::Empty, Cell::Text)))
                })
                .collect::<Result<HashMap<_, _>>>()?;
            Ok(StoredRow { cells })
        })
        .collect()
}

/// Replaces the contents of all five tables in a single transaction.
#[instrument(skip(db, tables))]
pub async fn save_tables(db: &DatabaseConnection, tables: &TableSet) -> Result<()> {
    let tactics = numbered(&tables.tactics, tactic_to_model)?;
    let metrics = numbered(&tables.metrics, metric_to_model)?;
    let reviews = numbered(&tables.reviews, review_to_model)?;
    let vision = numbered(&tables.vision, vision_to_model)?;
    let settings = numbered(&tables.settings, setting_to_model)?;

    let txn = db.begin().await?;

    TacticRowEntity::delete_many().exec(&txn).await?;
    if !tactics.is_empty() {
        TacticRowEntity::insert_many(tactics).exec(&txn).await?;
    }

    MetricRowEntity::delete_many().exec(&txn).await?;
    if !metrics.is_empty() {
        MetricRowEntity::insert_many(metrics).exec(&txn).await?;
    }

    ReviewRowEntity::delete_many().exec(&txn).await?;
    if !reviews.is_empty() {
        ReviewRowEntity::insert_many(reviews).exec(&txn).await?;
    }

    VisionRowEntity::delete_many().exec(&txn).await?;
    if !vision.is_empty() {
        VisionRowEntity::insert_many(vision).exec(&txn).await?;
    }

    SettingRowEntity::delete_many().exec(&txn).await?;
    if !settings.is_empty() {
        SettingRowEntity::insert_many(settings).exec(&txn).await?;
    }

    txn.commit().await?;

    for group in RowGroup::ALL {
        debug!(
            table = group.table_name(),
            rows = tables.row_count(group),
            "Wrote table"
        );
    }
    Ok(())
}

/// Flattens the cycle and writes it out
pub async fn save_cycle(db: &DatabaseConnection, cycle: &Cycle) -> Result<()> {
    let tables = reconcile::flatten(cycle);
    save_tables(db, &tables).await?;
    info!(
        goals = cycle.goals.len(),
        tactic_rows = tables.tactics.len(),
        reviews = tables.reviews.len(),
        "Saved cycle"
    );
    Ok(())
}

/// Reads the tables and rebuilds a cycle starting `today`
pub async fn load_cycle(db: &DatabaseConnection, today: NaiveDate) -> Result<RebuildOutcome> {
    let tables = load_tables(db).await?;
    Ok(reconcile::rebuild_detailed(&tables, today))
}

fn numbered<R, A>(rows: &[R], to_model: impl Fn(i32, &R) -> A) -> Result<Vec<A>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let row_id = i32::try_from(i + 1).map_err(|_| Error::Validation {
                message: format!("Too many rows to store ({})", rows.len()),
            })?;
            Ok(to_model(row_id, row))
        })
        .collect()
}

fn from_cell(cell: &Cell) -> Option<String> {
    if cell.is_blank() {
        None
    } else {
        Some(cell.to_string())
    }
}

fn tactic_from_stored(mut r: StoredRow) -> TacticRow {
    TacticRow {
        goal_id: r.take("Goal_ID"),
        goal_title: r.take("Goal_Title"),
        tactic_id: r.take("Tactic_ID"),
        tactic_title: r.take("Tactic_Title"),
        due_week: r.take("Due_Week"),
        status: r.take("Status"),
        block_type: r.take("Block_Type"),
        is_completed: r.take("Is_Completed"),
    }
}

fn tactic_to_model(row_id: i32, r: &TacticRow) -> tactic_row::ActiveModel {
    tactic_row::ActiveModel {
        row_id: Set(row_id),
        goal_id: Set(from_cell(&r.goal_id)),
        goal_title: Set(from_cell(&r.goal_title)),
        tactic_id: Set(from_cell(&r.tactic_id)),
        tactic_title: Set(from_cell(&r.tactic_title)),
        due_week: Set(from_cell(&r.due_week)),
        status: Set(from_cell(&r.status)),
        block_type: Set(from_cell(&r.block_type)),
        is_completed: Set(from_cell(&r.is_completed)),
    }
}

fn metric_from_stored(mut r: StoredRow) -> MetricRow {
    MetricRow {
        goal_id: r.take("Goal_ID"),
        metric_id: r.take("Metric_ID"),
        title: r.take("Title"),
        kind: r.take("Type"),
        starting_value: r.take("Starting_Value"),
        target_value: r.take("Target_Value"),
        current_value: r.take("Current_Value"),
        unit: r.take("Unit"),
        last_updated: r.take("Last_Updated"),
    }
}

fn metric_to_model(row_id: i32, r: &MetricRow) -> metric_row::ActiveModel {
    metric_row::ActiveModel {
        row_id: Set(row_id),
        goal_id: Set(from_cell(&r.goal_id)),
        metric_id: Set(from_cell(&r.metric_id)),
        title: Set(from_cell(&r.title)),
        kind: Set(from_cell(&r.kind)),
        starting_value: Set(from_cell(&r.starting_value)),
        target_value: Set(from_cell(&r.target_value)),
        current_value: Set(from_cell(&r.current_value)),
        unit: Set(from_cell(&r.unit)),
        last_updated: Set(from_cell(&r.last_updated)),
    }
}

fn review_from_stored(mut r: StoredRow) -> ReviewRow {
    ReviewRow {
        week_num: r.take("Week_Num"),
        score: r.take("Score"),
        wins: r.take("Wins"),
        lessons: r.take("Lessons"),
        date_submitted: r.take("Date_Submitted"),
    }
}

fn review_to_model(row_id: i32, r: &ReviewRow) -> review_row::ActiveModel {
    review_row::ActiveModel {
        row_id: Set(row_id),
        week_num: Set(from_cell(&r.week_num)),
        score: Set(from_cell(&r.score)),
        wins: Set(from_cell(&r.wins)),
        lessons: Set(from_cell(&r.lessons)),
        date_submitted: Set(from_cell(&r.date_submitted)),
    }
}

fn vision_from_stored(mut r: StoredRow) -> VisionRow {
    VisionRow {
        kind: r.take("Type"),
        content: r.take("Content"),
    }
}

fn vision_to_model(row_id: i32, r: &VisionRow) -> vision_row::ActiveModel {
    vision_row::ActiveModel {
        row_id: Set(row_id),
        kind: Set(from_cell(&r.kind)),
        content: Set(from_cell(&r.content)),
    }
}

fn setting_from_stored(mut r: StoredRow) -> SettingRow {
    SettingRow {
        kind: r.take("Type"),
        key: r.take("Key"),
        value: r.take("Value"),
        extra: r.take("Extra"),
    }
}

fn setting_to_model(row_id: i32, r: &SettingRow) -> setting_row::ActiveModel {
    setting_row::ActiveModel {
        row_id: Set(row_id),
        kind: Set(from_cell(&r.kind)),
        key: Set(from_cell(&r.key)),
        value: Set(from_cell(&r.value)),
        extra: Set(from_cell(&r.extra)),
    }
}
