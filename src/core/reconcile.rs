//! Reconciliation between the cycle object graph and flat tabular rows.
//!
//! The backing store only understands flat tables, so a cycle is normalised into
//! five independent row groups on write ([`flatten`]) and denormalised back into
//! the hierarchy on read ([`rebuild`]). Both directions are pure functions; they
//! know nothing about where the rows come from.
//!
//! Rebuilding is deliberately forgiving. Stored data may predate the current
//! schema or have been edited by hand, so:
//! - blank cells fall back to defaults,
//! - a malformed cell drops only its own row (logged and reported),
//! - a missing table is just an empty row group.
//!
//! The flat format has no place for the cycle's identity or start date, so a
//! rebuilt cycle always gets [`RESTORED_CYCLE_ID`] and starts on the `today`
//! passed in.

use crate::{
    core::{
        alignment::StrategicBlock,
        cycle::{Cycle, Goal, VisionKind, WeeklyReview},
        metric::{Metric, MetricKind},
        tactic::{self, BlockType, Tactic, TacticStatus},
    },
    errors::Error,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Identifier given to every cycle rebuilt from rows
pub const RESTORED_CYCLE_ID: &str = "current";
/// Title used when no row names a goal
pub const UNTITLED_GOAL: &str = "Untitled Goal";
/// Title used when a tactic row has an id but no title
pub const UNTITLED_TACTIC: &str = "Untitled Tactic";
/// Title used when a metric row has an id but no title
pub const UNTITLED_METRIC: &str = "Untitled Metric";
/// Settings `Type` value marking a strategic block row
pub const STRATEGIC_BLOCK_SETTING: &str = "StrategicBlock";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One cell of a stored row.
///
/// Spreadsheet-like stores hand back loosely typed values; a cell may hold text,
/// a number, a boolean, or nothing at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// No value
    #[default]
    Empty,
    /// Text value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
}

impl Cell {
    /// Text cell
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Empty, or text that is only whitespace
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }

    /// Trimmed textual form, or `None` when blank
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string().trim().to_string())
        }
    }

    /// Boolean `true` or text `"true"` in any case; everything else is false
    #[must_use]
    pub fn parse_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s.trim().eq_ignore_ascii_case("true"),
            Self::Empty | Self::Number(_) => false,
        }
    }

    /// Number, or `None` when blank
    pub fn parse_f64(&self) -> Result<Option<f64>, String> {
        match self {
            _ if self.is_blank() => Ok(None),
            Self::Number(n) if n.is_finite() => Ok(Some(*n)),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| format!("'{}' is not a number", s.trim())),
            other => Err(format!("'{other}' is not a number")),
        }
    }

    /// Whole number, or `None` when blank. Accepts `3`, `"3"` and `"3.0"`.
    pub fn parse_int(&self) -> Result<Option<i64>, String> {
        let Some(value) = self.parse_f64()? else {
            return Ok(None);
        };
        if value.fract() != 0.0 || value.abs() > 1e15 {
            return Err(format!("'{value}' is not a whole number"));
        }
        // Checked above: integral and well inside i64 range
        #[allow(clippy::cast_possible_truncation)]
        let whole = value as i64;
        Ok(Some(whole))
    }

    /// ISO-8601 date, or `None` when blank
    pub fn parse_date(&self) -> Result<Option<NaiveDate>, String> {
        match self.as_text() {
            None => Ok(None),
            Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map(Some)
                .map_err(|e| format!("'{text}' is not a YYYY-MM-DD date: {e}")),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u8> for Cell {
    fn from(value: u8) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Option<NaiveDate>> for Cell {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Empty, |d| Self::Text(d.format(DATE_FORMAT).to_string()))
    }
}

/// The five independent row groups a cycle is stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowGroup {
    /// One row per tactic
    Tactics,
    /// One row per metric
    Metrics,
    /// One row per weekly review
    Reviews,
    /// One row per vision statement
    Vision,
    /// Strategic blocks and future settings
    Settings,
}

impl RowGroup {
    /// All groups in storage order
    pub const ALL: [Self; 5] = [
        Self::Tactics,
        Self::Metrics,
        Self::Reviews,
        Self::Vision,
        Self::Settings,
    ];

    /// Table name in the store
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Tactics => "tactics",
            Self::Metrics => "metrics",
            Self::Reviews => "reviews",
            Self::Vision => "vision",
            Self::Settings => "settings",
        }
    }

    /// Column headers in stored order
    #[must_use]
    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Tactics => &[
                "Goal_ID",
                "Goal_Title",
                "Tactic_ID",
                "Tactic_Title",
                "Due_Week",
                "Status",
                "Block_Type",
                "Is_Completed",
            ],
            Self::Metrics => &[
                "Goal_ID",
                "Metric_ID",
                "Title",
                "Type",
                "Starting_Value",
                "Target_Value",
                "Current_Value",
                "Unit",
                "Last_Updated",
            ],
            Self::Reviews => &["Week_Num", "Score", "Wins", "Lessons", "Date_Submitted"],
            Self::Vision => &["Type", "Content"],
            Self::Settings => &["Type", "Key", "Value", "Extra"],
        }
    }
}

/// `Goal_ID, Goal_Title, Tactic_ID, Tactic_Title, Due_Week, Status, Block_Type, Is_Completed`
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub struct TacticRow {
    pub goal_id: Cell,
    pub goal_title: Cell,
    pub tactic_id: Cell,
    pub tactic_title: Cell,
    pub due_week: Cell,
    pub status: Cell,
    pub block_type: Cell,
    pub is_completed: Cell,
}

/// `Goal_ID, Metric_ID, Title, Type, Starting_Value, Target_Value, Current_Value, Unit, Last_Updated`
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub struct MetricRow {
    pub goal_id: Cell,
    pub metric_id: Cell,
    pub title: Cell,
    pub kind: Cell,
    pub starting_value: Cell,
    pub target_value: Cell,
    pub current_value: Cell,
    pub unit: Cell,
    pub last_updated: Cell,
}

/// `Week_Num, Score, Wins, Lessons, Date_Submitted`
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub struct ReviewRow {
    pub week_num: Cell,
    pub score: Cell,
    pub wins: Cell,
    pub lessons: Cell,
    pub date_submitted: Cell,
}

/// `Type, Content`
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub struct VisionRow {
    pub kind: Cell,
    pub content: Cell,
}

/// `Type, Key, Value, Extra`
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub struct SettingRow {
    pub kind: Cell,
    pub key: Cell,
    pub value: Cell,
    pub extra: Cell,
}

/// A whole cycle in flat form. A missing table is simply an empty vector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSet {
    /// Tactics table
    pub tactics: Vec<TacticRow>,
    /// Metrics table
    pub metrics: Vec<MetricRow>,
    /// Reviews table
    pub reviews: Vec<ReviewRow>,
    /// Vision table
    pub vision: Vec<VisionRow>,
    /// Settings table
    pub settings: Vec<SettingRow>,
}

impl TableSet {
    /// Number of rows in one group
    #[must_use]
    pub fn row_count(&self, group: RowGroup) -> usize {
        match group {
            RowGroup::Tactics => self.tactics.len(),
            RowGroup::Metrics => self.metrics.len(),
            RowGroup::Reviews => self.reviews.len(),
            RowGroup::Vision => self.vision.len(),
            RowGroup::Settings => self.settings.len(),
        }
    }
}

/// A rebuilt cycle plus the rows that had to be dropped along the way
#[derive(Debug)]
pub struct RebuildOutcome {
    /// The reconstructed cycle
    pub cycle: Cycle,
    /// One [`Error::RowParse`] per dropped row
    pub dropped: Vec<Error>,
}

// ---------------------------------------------------------------------------
// Flatten
// ---------------------------------------------------------------------------

/// Flattens every part of the cycle into its row group
#[must_use]
pub fn flatten(cycle: &Cycle) -> TableSet {
    TableSet {
        tactics: flatten_tactics(cycle),
        metrics: flatten_metrics(cycle),
        reviews: flatten_reviews(cycle),
        vision: flatten_vision(cycle),
        settings: flatten_settings(cycle),
    }
}

/// One row per tactic. A goal without tactics gets a single goal-only row (blank
/// `Tactic_ID`) so that it, and its metrics, survive a reload.
#[must_use]
pub fn flatten_tactics(cycle: &Cycle) -> Vec<TacticRow> {
    let mut rows = Vec::new();
    for goal in &cycle.goals {
        if goal.tactics.is_empty() {
            rows.push(TacticRow {
                goal_id: Cell::text(&goal.id),
                goal_title: Cell::text(&goal.title),
                ..TacticRow::default()
            });
            continue;
        }

        rows.extend(goal.tactics.iter().map(|t| TacticRow {
            goal_id: Cell::text(&goal.id),
            goal_title: Cell::text(&goal.title),
            tactic_id: Cell::text(&t.id),
            tactic_title: Cell::text(&t.title),
            due_week: Cell::from(t.due_week),
            status: Cell::text(t.status().as_str()),
            block_type: Cell::text(t.block_type.as_str()),
            is_completed: Cell::from(t.is_completed()),
        }));
    }
    rows
}

/// One row per metric, keyed by goal id
#[must_use]
pub fn flatten_metrics(cycle: &Cycle) -> Vec<MetricRow> {
    cycle
        .goals
        .iter()
        .flat_map(|goal| {
            goal.metrics.iter().map(move |m| MetricRow {
                goal_id: Cell::text(&goal.id),
                metric_id: Cell::text(&m.id),
                title: Cell::text(&m.title),
                kind: Cell::text(m.kind.as_str()),
                starting_value: Cell::from(m.starting_value),
                target_value: Cell::from(m.target_value),
                current_value: Cell::from(m.current_value),
                unit: Cell::text(&m.unit),
                last_updated: Cell::from(m.last_updated),
            })
        })
        .collect()
}

/// One row per review
#[must_use]
pub fn flatten_reviews(cycle: &Cycle) -> Vec<ReviewRow> {
    cycle
        .reviews
        .iter()
        .map(|r| ReviewRow {
            week_num: Cell::from(r.week_num),
            score: Cell::from(r.score),
            wins: Cell::text(&r.wins),
            lessons: Cell::text(&r.lessons),
            date_submitted: Cell::from(Some(r.date_submitted)),
        })
        .collect()
}

/// Both vision statements, one row each
#[must_use]
pub fn flatten_vision(cycle: &Cycle) -> Vec<VisionRow> {
    [VisionKind::ThreeYear, VisionKind::OneYear]
        .into_iter()
        .map(|kind| VisionRow {
            kind: Cell::text(kind.as_str()),
            content: Cell::text(cycle.vision(kind)),
        })
        .collect()
}

/// One settings row per strategic block
#[must_use]
pub fn flatten_settings(cycle: &Cycle) -> Vec<SettingRow> {
    cycle
        .strategic_blocks
        .iter()
        .map(|b| SettingRow {
            kind: Cell::text(STRATEGIC_BLOCK_SETTING),
            key: Cell::text(&b.day),
            value: Cell::text(&b.start_time),
            extra: Cell::text(&b.end_time),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rebuild
// ---------------------------------------------------------------------------

/// Rebuilds a cycle from its row groups, logging and discarding bad rows.
#[must_use]
pub fn rebuild(tables: &TableSet, today: NaiveDate) -> Cycle {
    rebuild_detailed(tables, today).cycle
}

/// Rebuilds a cycle and reports every row that was dropped.
#[must_use]
pub fn rebuild_detailed(tables: &TableSet, today: NaiveDate) -> RebuildOutcome {
    let mut dropped = Vec::new();
    let mut cycle = Cycle::new(RESTORED_CYCLE_ID, today);

    cycle.goals = rebuild_goals(&tables.tactics, &mut dropped);
    attach_metrics(&mut cycle.goals, &tables.metrics, &mut dropped);
    rebuild_reviews(&mut cycle, &tables.reviews, today, &mut dropped);
    rebuild_vision(&mut cycle, &tables.vision, &mut dropped);
    rebuild_blocks(&mut cycle, &tables.settings, &mut dropped);

    for err in &dropped {
        warn!("Dropped row while rebuilding cycle: {err}");
    }
    info!(
        goals = cycle.goals.len(),
        tactics = cycle.all_tactics().count(),
        reviews = cycle.reviews.len(),
        blocks = cycle.strategic_blocks.len(),
        dropped = dropped.len(),
        "Rebuilt cycle from stored rows"
    );

    RebuildOutcome { cycle, dropped }
}

fn row_error(group: RowGroup, row: usize, message: impl Into<String>) -> Error {
    Error::RowParse {
        table: group.table_name(),
        row,
        message: message.into(),
    }
}

struct GoalDraft {
    id: String,
    title: Option<String>,
    tactics: Vec<Tactic>,
}

fn rebuild_goals(rows: &[TacticRow], dropped: &mut Vec<Error>) -> Vec<Goal> {
    let mut drafts: Vec<GoalDraft> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let Some(goal_id) = row.goal_id.as_text() else {
            dropped.push(row_error(RowGroup::Tactics, i, "missing Goal_ID"));
            continue;
        };

        let slot = *index.entry(goal_id.clone()).or_insert_with(|| {
            drafts.push(GoalDraft {
                id: goal_id,
                title: None,
                tactics: Vec::new(),
            });
            drafts.len() - 1
        });
        let draft = &mut drafts[slot];

        if draft.title.is_none() {
            draft.title = row.goal_title.as_text();
        }

        match parse_tactic(row) {
            Ok(None) => debug!(goal = %draft.id, "Goal-only placeholder row"),
            Ok(Some(t)) if draft.tactics.iter().any(|existing| existing.id == t.id) => {
                dropped.push(row_error(
                    RowGroup::Tactics,
                    i,
                    format!("duplicate Tactic_ID '{}' in goal '{}'", t.id, draft.id),
                ));
            }
            Ok(Some(t)) => draft.tactics.push(t),
            Err(message) => dropped.push(row_error(RowGroup::Tactics, i, message)),
        }
    }

    drafts
        .into_iter()
        .map(|d| Goal {
            id: d.id,
            title: d.title.unwrap_or_else(|| UNTITLED_GOAL.to_string()),
            tactics: d.tactics,
            metrics: Vec::new(),
        })
        .collect()
}

fn parse_tactic(row: &TacticRow) -> Result<Option<Tactic>, String> {
    let Some(id) = row.tactic_id.as_text() else {
        return Ok(None);
    };

    let due_week = row
        .due_week
        .parse_int()
        .map_err(|e| format!("Due_Week: {e}"))?
        .unwrap_or(i64::from(tactic::FIRST_WEEK));

    let status = match row.status.as_text() {
        None => TacticStatus::NotStarted,
        Some(label) => TacticStatus::parse(&label).unwrap_or_else(|| {
            warn!(tactic = %id, status = %label, "Unknown status, using Not Started");
            TacticStatus::NotStarted
        }),
    };

    let block_type = row
        .block_type
        .as_text()
        .and_then(|label| BlockType::parse(&label))
        .unwrap_or_default();

    let title = row
        .tactic_title
        .as_text()
        .unwrap_or_else(|| UNTITLED_TACTIC.to_string());

    let mut tactic = Tactic::new(id, title, due_week, block_type).map_err(|e| e.to_string())?;
    if row.is_completed.parse_bool() || status == TacticStatus::Completed {
        tactic.set_status(TacticStatus::Completed);
    } else {
        tactic.set_status(status);
    }
    Ok(Some(tactic))
}

fn attach_metrics(goals: &mut [Goal], rows: &[MetricRow], dropped: &mut Vec<Error>) {
    for (i, row) in rows.iter().enumerate() {
        let goal_id = row.goal_id.as_text().unwrap_or_default();
        let Some(goal) = goals.iter_mut().find(|g| g.id == goal_id) else {
            debug!(goal = %goal_id, row = i, "Metric row for unknown goal ignored");
            continue;
        };

        match parse_metric(row) {
            Ok(None) => {}
            Ok(Some(metric)) => {
                if let Err(e) = goal.add_metric(metric) {
                    dropped.push(row_error(RowGroup::Metrics, i, e.to_string()));
                }
            }
            Err(message) => dropped.push(row_error(RowGroup::Metrics, i, message)),
        }
    }
}

fn parse_metric(row: &MetricRow) -> Result<Option<Metric>, String> {
    let Some(id) = row.metric_id.as_text() else {
        return Ok(None);
    };

    let number = |cell: &Cell, column: &str| -> Result<f64, String> {
        cell.parse_f64()
            .map(Option::unwrap_or_default)
            .map_err(|e| format!("{column}: {e}"))
    };

    Ok(Some(Metric {
        id,
        title: row
            .title
            .as_text()
            .unwrap_or_else(|| UNTITLED_METRIC.to_string()),
        kind: row
            .kind
            .as_text()
            .and_then(|label| MetricKind::parse(&label))
            .unwrap_or_default(),
        starting_value: number(&row.starting_value, "Starting_Value")?,
        target_value: number(&row.target_value, "Target_Value")?,
        current_value: number(&row.current_value, "Current_Value")?,
        unit: row.unit.as_text().unwrap_or_default(),
        last_updated: row
            .last_updated
            .parse_date()
            .map_err(|e| format!("Last_Updated: {e}"))?,
    }))
}

fn rebuild_reviews(
    cycle: &mut Cycle,
    rows: &[ReviewRow],
    today: NaiveDate,
    dropped: &mut Vec<Error>,
) {
    for (i, row) in rows.iter().enumerate() {
        if row.week_num.is_blank() {
            continue;
        }
        match parse_review(row, today) {
            Ok(review) => {
                cycle.upsert_review(review);
            }
            Err(message) => dropped.push(row_error(RowGroup::Reviews, i, message)),
        }
    }
}

/// A blank `Date_Submitted` reads as `today`
fn parse_review(row: &ReviewRow, today: NaiveDate) -> Result<WeeklyReview, String> {
    let week = row
        .week_num
        .parse_int()
        .map_err(|e| format!("Week_Num: {e}"))?
        .ok_or("Week_Num is blank")?;
    let score = row
        .score
        .parse_f64()
        .map_err(|e| format!("Score: {e}"))?
        .unwrap_or_default();
    let date = row
        .date_submitted
        .parse_date()
        .map_err(|e| format!("Date_Submitted: {e}"))?
        .unwrap_or(today);

    WeeklyReview::new(
        week,
        score,
        row.wins.as_text().unwrap_or_default(),
        row.lessons.as_text().unwrap_or_default(),
        date,
    )
    .map_err(|e| e.to_string())
}

fn rebuild_vision(cycle: &mut Cycle, rows: &[VisionRow], dropped: &mut Vec<Error>) {
    for (i, row) in rows.iter().enumerate() {
        let label = row.kind.as_text().unwrap_or_default();
        match VisionKind::parse(&label) {
            Some(kind) => cycle.set_vision(kind, row.content.as_text().unwrap_or_default()),
            None => dropped.push(row_error(
                RowGroup::Vision,
                i,
                format!("unknown vision Type '{label}'"),
            )),
        }
    }
}

fn rebuild_blocks(cycle: &mut Cycle, rows: &[SettingRow], dropped: &mut Vec<Error>) {
    for (i, row) in rows.iter().enumerate() {
        let kind = row.kind.as_text().unwrap_or_default();
        if !kind.eq_ignore_ascii_case(STRATEGIC_BLOCK_SETTING) {
            debug!(kind = %kind, row = i, "Ignoring unrecognised setting");
            continue;
        }

        let block = StrategicBlock::new(
            row.key.as_text().unwrap_or_default(),
            &row.value.as_text().unwrap_or_default(),
            &row.extra.as_text().unwrap_or_default(),
        )
        .and_then(|block| cycle.add_strategic_block(block));

        if let Err(e) = block {
            dropped.push(row_error(RowGroup::Settings, i, e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{date, sample_cycle, tactic_row};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    type TacticTuple = (String, String, u8, TacticStatus, BlockType, bool);

    fn tuples(cycle: &Cycle) -> BTreeSet<TacticTuple> {
        cycle
            .all_tactics()
            .map(|(g, t)| {
                (
                    g.id.clone(),
                    t.id.clone(),
                    t.due_week,
                    t.status(),
                    t.block_type,
                    t.is_completed(),
                )
            })
            .collect()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 2)
    }

    #[test]
    fn test_flatten_emits_one_row_per_tactic() {
        let cycle = sample_cycle();
        let rows = flatten_tactics(&cycle);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].goal_id, Cell::text("g1"));
        assert_eq!(rows[0].status, Cell::text("Not Started"));
        assert_eq!(rows[0].block_type, Cell::text("Strategic"));
        assert_eq!(rows[0].is_completed, Cell::Bool(false));
    }

    #[test]
    fn test_round_trip_sample_cycle() {
        let mut cycle = sample_cycle();
        cycle
            .goal_mut("g1")
            .unwrap()
            .tactic_mut("t2")
            .unwrap()
            .set_status(TacticStatus::Completed);

        let rebuilt = rebuild(&flatten(&cycle), today());

        assert_eq!(tuples(&rebuilt), tuples(&cycle));
        assert_eq!(rebuilt.id, RESTORED_CYCLE_ID);
        assert_eq!(rebuilt.start_date, today());
    }

    #[test]
    fn test_pending_normalizes_to_not_started() {
        let mut row = tactic_row("g1", "t1");
        row.status = Cell::text("Pending");
        let cycle = rebuild(
            &TableSet {
                tactics: vec![row],
                ..TableSet::default()
            },
            today(),
        );
        let t = cycle.goal("g1").unwrap().tactic("t1").unwrap();
        assert_eq!(t.status(), TacticStatus::NotStarted);
        assert!(!t.is_completed());
    }

    #[test]
    fn test_legacy_complete_status_marks_completed() {
        let mut row = tactic_row("g1", "t1");
        row.status = Cell::text("Complete");
        row.is_completed = Cell::text("false");
        let cycle = rebuild(
            &TableSet {
                tactics: vec![row],
                ..TableSet::default()
            },
            today(),
        );
        let t = cycle.goal("g1").unwrap().tactic("t1").unwrap();
        assert_eq!(t.status(), TacticStatus::Completed);
        assert!(t.is_completed());
        assert_eq!(cycle.weekly_score(1), 100.0);
    }

    #[test]
    fn test_blank_tactic_id_yields_empty_goal() {
        let mut placeholder = tactic_row("g7", "");
        placeholder.goal_title = Cell::Empty;
        let cycle = rebuild(
            &TableSet {
                tactics: vec![placeholder],
                ..TableSet::default()
            },
            today(),
        );

        let goal = cycle.goal("g7").unwrap();
        assert!(goal.tactics.is_empty());
        assert_eq!(goal.title, UNTITLED_GOAL);
    }

    #[test]
    fn test_defaults_for_blank_cells() {
        let row = TacticRow {
            goal_id: Cell::text("g1"),
            tactic_id: Cell::text("t1"),
            ..TacticRow::default()
        };
        let cycle = rebuild(
            &TableSet {
                tactics: vec![row],
                ..TableSet::default()
            },
            today(),
        );
        let t = cycle.goal("g1").unwrap().tactic("t1").unwrap();
        assert_eq!(t.due_week, 1);
        assert_eq!(t.status(), TacticStatus::NotStarted);
        assert_eq!(t.block_type, BlockType::None);
        assert_eq!(t.title, UNTITLED_TACTIC);
    }

    #[test]
    fn test_completion_flag_is_parsed_tolerantly() {
        let flags = [
            (Cell::Bool(true), true),
            (Cell::text("TRUE"), true),
            (Cell::text(" true "), true),
            (Cell::text("yes"), false),
            (Cell::Number(1.0), false),
            (Cell::Empty, false),
        ];
        for (flag, expected) in flags {
            let mut row = tactic_row("g1", "t1");
            row.is_completed = flag;
            let cycle = rebuild(
                &TableSet {
                    tactics: vec![row],
                    ..TableSet::default()
                },
                today(),
            );
            let t = cycle.goal("g1").unwrap().tactic("t1").unwrap();
            assert_eq!(t.is_completed(), expected);
            assert_eq!(t.status() == TacticStatus::Completed, expected);
        }
    }

    #[test]
    fn test_malformed_week_drops_only_that_row() {
        let mut bad = tactic_row("g1", "t1");
        bad.due_week = Cell::text("soon");
        let mut out_of_range = tactic_row("g1", "t2");
        out_of_range.due_week = Cell::Number(14.0);
        let good = tactic_row("g1", "t3");

        let outcome = rebuild_detailed(
            &TableSet {
                tactics: vec![bad, out_of_range, good],
                ..TableSet::default()
            },
            today(),
        );

        assert_eq!(outcome.dropped.len(), 2);
        let goal = outcome.cycle.goal("g1").unwrap();
        assert_eq!(goal.tactics.len(), 1);
        assert_eq!(goal.tactics[0].id, "t3");
    }

    #[test]
    fn test_duplicate_tactic_id_keeps_first() {
        let mut second = tactic_row("g1", "t1");
        second.tactic_title = Cell::text("Second");
        let outcome = rebuild_detailed(
            &TableSet {
                tactics: vec![tactic_row("g1", "t1"), second],
                ..TableSet::default()
            },
            today(),
        );
        assert_eq!(outcome.dropped.len(), 1);
        let goal = outcome.cycle.goal("g1").unwrap();
        assert_eq!(goal.tactics.len(), 1);
        assert_ne!(goal.tactics[0].title, "Second");
    }

    #[test]
    fn test_orphan_metrics_are_dropped_silently() {
        let metric = |goal: &str, id: &str| MetricRow {
            goal_id: Cell::text(goal),
            metric_id: Cell::text(id),
            title: Cell::text("Leads"),
            target_value: Cell::Number(50.0),
            ..MetricRow::default()
        };
        let outcome = rebuild_detailed(
            &TableSet {
                tactics: vec![tactic_row("g1", "t1")],
                metrics: vec![metric("g1", "m1"), metric("ghost", "m2")],
                ..TableSet::default()
            },
            today(),
        );

        assert!(outcome.dropped.is_empty());
        let goal = outcome.cycle.goal("g1").unwrap();
        assert_eq!(goal.metrics.len(), 1);
        assert_eq!(goal.metrics[0].starting_value, 0.0);
        assert_eq!(goal.metrics[0].kind, MetricKind::Lag);
        assert_eq!(outcome.cycle.goals.len(), 1);
    }

    #[test]
    fn test_malformed_metric_value_drops_row() {
        let row = MetricRow {
            goal_id: Cell::text("g1"),
            metric_id: Cell::text("m1"),
            current_value: Cell::text("lots"),
            ..MetricRow::default()
        };
        let outcome = rebuild_detailed(
            &TableSet {
                tactics: vec![tactic_row("g1", "t1")],
                metrics: vec![row],
                ..TableSet::default()
            },
            today(),
        );
        assert_eq!(outcome.dropped.len(), 1);
        assert!(outcome.cycle.goal("g1").unwrap().metrics.is_empty());
    }

    #[test]
    fn test_reviews_skip_blank_and_drop_malformed() {
        let review = |week: Cell, score: Cell, date: &str| ReviewRow {
            week_num: week,
            score,
            wins: Cell::text("w"),
            lessons: Cell::text("l"),
            date_submitted: Cell::text(date),
        };
        let outcome = rebuild_detailed(
            &TableSet {
                reviews: vec![
                    review(Cell::text("1"), Cell::text("80"), "2025-01-12"),
                    review(Cell::Empty, Cell::text("90"), "2025-01-19"),
                    review(Cell::text("two"), Cell::text("90"), "2025-01-19"),
                    review(Cell::text("3"), Cell::text("ninety"), "2025-01-26"),
                    review(Cell::text("4"), Cell::text("70"), "last week"),
                    review(Cell::Number(5.0), Cell::Number(60.0), "2025-02-09"),
                ],
                ..TableSet::default()
            },
            today(),
        );

        assert_eq!(outcome.dropped.len(), 3);
        let weeks: Vec<u8> = outcome.cycle.reviews.iter().map(|r| r.week_num).collect();
        assert_eq!(weeks, vec![1, 5]);
        assert_eq!(outcome.cycle.review(1).unwrap().score, 80.0);
    }

    #[test]
    fn test_review_with_blank_date_is_kept() {
        let row = ReviewRow {
            week_num: Cell::text("2"),
            score: Cell::text("75"),
            wins: Cell::text("Shipped"),
            lessons: Cell::Empty,
            date_submitted: Cell::Empty,
        };
        let outcome = rebuild_detailed(
            &TableSet {
                reviews: vec![row],
                ..TableSet::default()
            },
            today(),
        );

        assert!(outcome.dropped.is_empty());
        let review = outcome.cycle.review(2).unwrap();
        assert_eq!(review.score, 75.0);
        assert_eq!(review.wins, "Shipped");
        assert_eq!(review.date_submitted, today());
    }

    #[test]
    fn test_missing_tables_give_empty_cycle() {
        let outcome = rebuild_detailed(&TableSet::default(), today());
        assert!(outcome.dropped.is_empty());
        assert!(outcome.cycle.goals.is_empty());
        assert!(outcome.cycle.reviews.is_empty());
        assert!(outcome.cycle.strategic_blocks.is_empty());
        assert_eq!(outcome.cycle.three_year_vision, "");
    }

    #[test]
    fn test_vision_and_blocks_round_trip() {
        let mut cycle = sample_cycle();
        cycle.set_vision(VisionKind::ThreeYear, "Own the category");
        cycle.set_vision(VisionKind::OneYear, "10k MRR");
        cycle
            .add_strategic_block(StrategicBlock::new("Monday", "09:00", "12:00").unwrap())
            .unwrap();

        let rebuilt = rebuild(&flatten(&cycle), today());

        assert_eq!(rebuilt.three_year_vision, "Own the category");
        assert_eq!(rebuilt.one_year_vision, "10k MRR");
        assert_eq!(rebuilt.strategic_blocks, cycle.strategic_blocks);
    }

    #[test]
    fn test_bad_block_setting_dropped_and_other_settings_ignored() {
        let outcome = rebuild_detailed(
            &TableSet {
                settings: vec![
                    SettingRow {
                        kind: Cell::text("StrategicBlock"),
                        key: Cell::text("Friday"),
                        value: Cell::text("14:00"),
                        extra: Cell::text("10:00"),
                    },
                    SettingRow {
                        kind: Cell::text("Theme"),
                        key: Cell::text("dark"),
                        ..SettingRow::default()
                    },
                ],
                ..TableSet::default()
            },
            today(),
        );
        assert_eq!(outcome.dropped.len(), 1);
        assert!(outcome.cycle.strategic_blocks.is_empty());
    }

    #[test]
    fn test_tactic_less_goal_survives_round_trip() {
        let mut cycle = sample_cycle();
        let id = cycle.add_goal("Read 12 books").unwrap();
        cycle
            .goal_mut(&id)
            .unwrap()
            .add_metric(Metric::new("m1", "Books", MetricKind::Lag, 0.0, 12.0, "books").unwrap())
            .unwrap();

        let rebuilt = rebuild(&flatten(&cycle), today());

        let goal = rebuilt.goal(&id).unwrap();
        assert_eq!(goal.title, "Read 12 books");
        assert!(goal.tactics.is_empty());
        assert_eq!(goal.metrics.len(), 1);
    }

    #[test]
    fn test_cell_number_formatting() {
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Bool(true).to_string(), "true");
        assert_eq!(Cell::text("3.0").parse_int(), Ok(Some(3)));
        assert!(Cell::text("3.5").parse_int().is_err());
    }

    fn arb_tactic(index: usize) -> impl Strategy<Value = Tactic> {
        (
            1_i64..=13,
            prop::sample::select(TacticStatus::ALL.to_vec()),
            prop::sample::select(BlockType::ALL.to_vec()),
            "[A-Za-z][A-Za-z0-9 ]{0,12}",
        )
            .prop_map(move |(week, status, block, title)| {
                let mut t = Tactic::new(format!("t{index}"), title, week, block).unwrap();
                t.set_status(status);
                t
            })
    }

    fn arb_goal(index: usize) -> impl Strategy<Value = Goal> {
        (1_usize..6)
            .prop_flat_map(|n| (0..n).map(arb_tactic).collect::<Vec<_>>())
            .prop_map(move |tactics| Goal {
                id: format!("g{index}"),
                title: format!("Goal {index}"),
                tactics,
                metrics: Vec::new(),
            })
    }

    fn arb_cycle() -> impl Strategy<Value = Cycle> {
        (1_usize..5)
            .prop_flat_map(|n| (0..n).map(arb_goal).collect::<Vec<_>>())
            .prop_map(|goals| {
                let mut cycle = Cycle::new("c1", date(2025, 1, 6));
                cycle.goals = goals;
                cycle
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Tactic identity, scheduling and completion survive flatten then rebuild
        #[test]
        fn prop_round_trip_preserves_tactics(cycle in arb_cycle()) {
            let rebuilt = rebuild(&flatten(&cycle), today());
            prop_assert_eq!(tuples(&rebuilt), tuples(&cycle));
            for (_, t) in rebuilt.all_tactics() {
                prop_assert_eq!(t.status() == TacticStatus::Completed, t.is_completed());
            }
        }
    }
}
