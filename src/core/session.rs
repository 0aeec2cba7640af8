//! Session context - the one live cycle and the edits made to it.
//!
//! Every command goes through a [`CycleSession`]. It owns the in-memory cycle,
//! remembers whether anything changed since the last save, and is the only way
//! the presentation layer mutates the cycle.

use crate::{
    core::{
        alignment::{self, Advisory, StrategicBlock},
        cycle::{Cycle, Goal, ReviewUpsert, VisionKind, WeeklyReview},
        metric::{Metric, MetricKind},
        report::{self, Dashboard},
        store,
        tactic::{self, BlockType, Tactic, TacticStatus},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

/// Result of placing a tactic in a week and time slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Week the tactic is now due
    pub week: u8,
    /// Day of the slot
    pub day: String,
    /// Normalised `HH:MM` start of the slot
    pub start_time: String,
    /// Alignment advice; always empty for non-strategic tactics
    pub advisories: Vec<Advisory>,
}

/// Outcome of submitting a weekly review
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedReview {
    /// The stored review
    pub review: WeeklyReview,
    /// Whether it added or replaced a review
    pub upsert: ReviewUpsert,
}

/// The live cycle plus unsaved-change tracking
#[derive(Debug, Clone)]
pub struct CycleSession {
    cycle: Cycle,
    dirty: bool,
    score_threshold: f64,
}

/// Reference that names a tactic unambiguously, as accepted by
/// [`CycleSession::resolve_tactic`]
#[must_use]
pub fn tactic_key(goal_id: &str, tactic_id: &str) -> String {
    format!("{goal_id}/{tactic_id}")
}

impl CycleSession {
    /// Wraps a freshly loaded cycle
    #[must_use]
    pub const fn new(cycle: Cycle, score_threshold: f64) -> Self {
        Self {
            cycle,
            dirty: false,
            score_threshold,
        }
    }

    /// Read access to the cycle
    #[must_use]
    pub const fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    /// Whether there are edits not yet saved
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Score at or above which a week is on track
    #[must_use]
    pub const fn score_threshold(&self) -> f64 {
        self.score_threshold
    }

    fn touch<T>(&mut self, value: T) -> T {
        self.dirty = true;
        value
    }

    /// Adds a goal and returns its generated id
    pub fn add_goal(&mut self, title: &str) -> Result<String> {
        let id = self.cycle.add_goal(title)?;
        info!(goal = %id, "Added goal");
        Ok(self.touch(id))
    }

    /// Adds a tactic to a goal and returns its generated id
    pub fn add_tactic(
        &mut self,
        goal_id: &str,
        title: &str,
        due_week: i64,
        block_type: BlockType,
    ) -> Result<String> {
        let id = self.cycle.next_tactic_id();
        let tactic = Tactic::new(id.clone(), title, due_week, block_type)?;
        self.cycle.goal_mut(goal_id)?.add_tactic(tactic)?;
        info!(goal = %goal_id, tactic = %id, "Added tactic");
        Ok(self.touch(id))
    }

    /// Sets a tactic's status (the completion flag follows)
    pub fn set_tactic_status(
        &mut self,
        goal_id: &str,
        tactic_id: &str,
        status: TacticStatus,
    ) -> Result<()> {
        self.cycle
            .goal_mut(goal_id)?
            .tactic_mut(tactic_id)?
            .set_status(status);
        self.touch(());
        Ok(())
    }

    /// Flips a tactic's completion and returns the new value
    pub fn toggle_tactic(&mut self, goal_id: &str, tactic_id: &str) -> Result<bool> {
        let completed = self
            .cycle
            .goal_mut(goal_id)?
            .tactic_mut(tactic_id)?
            .toggle_completed();
        Ok(self.touch(completed))
    }

    /// Resolves a tactic reference to `(goal_id, tactic_id)`.
    ///
    /// `goal/tactic` names one tactic exactly. A bare tactic id is accepted only
    /// while a single goal has a tactic with that id.
    pub fn resolve_tactic(&self, reference: &str) -> Result<(String, String)> {
        let reference = reference.trim();
        if let Some((goal_id, tactic_id)) = reference.split_once('/') {
            if let Ok(goal) = self.cycle.goal(goal_id.trim()) {
                let tactic = goal.tactic(tactic_id.trim())?;
                return Ok((goal.id.clone(), tactic.id.clone()));
            }
        }

        let owners: Vec<&Goal> = self
            .cycle
            .goals
            .iter()
            .filter(|g| g.tactics.iter().any(|t| t.id == reference))
            .collect();
        match owners.as_slice() {
            [goal] => Ok((goal.id.clone(), reference.to_string())),
            [] => Err(Error::TacticNotFound {
                goal_id: "any goal".to_string(),
                tactic_id: reference.to_string(),
            }),
            many => Err(Error::Validation {
                message: format!(
                    "Tactic `{reference}` exists in goals {}; name it as goal/tactic",
                    many.iter().map(|g| g.id.as_str()).collect::<Vec<_>>().join(", ")
                ),
            }),
        }
    }

    /// Moves a tactic to `week` and a day/time slot.
    ///
    /// Scheduling always succeeds for a valid week and time. Strategic tactics
    /// also get alignment advice against the protected blocks.
    pub fn schedule_tactic(
        &mut self,
        goal_id: &str,
        tactic_id: &str,
        week: i64,
        day: &str,
        start_time: &str,
    ) -> Result<ScheduleOutcome> {
        let start_time = alignment::normalize_time(start_time)?;
        let week = tactic::validate_week(week)?;

        let blocks = &self.cycle.strategic_blocks;
        let tactic = self
            .cycle
            .goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| Error::GoalNotFound {
                id: goal_id.to_string(),
            })?
            .tactic_mut(tactic_id)?;

        let advisories = if tactic.block_type == BlockType::Strategic {
            alignment::check_alignment(blocks, day, &start_time)
        } else {
            Vec::new()
        };
        tactic.reschedule(i64::from(week))?;

        for advisory in &advisories {
            warn!(tactic = %tactic_id, "{advisory}");
        }
        self.touch(());

        Ok(ScheduleOutcome {
            week,
            day: day.trim().to_string(),
            start_time,
            advisories,
        })
    }

    /// Records the review for `week` with the score computed from its tactics
    pub fn submit_review(
        &mut self,
        week: i64,
        wins: &str,
        lessons: &str,
        today: NaiveDate,
    ) -> Result<SubmittedReview> {
        let week_num = tactic::validate_week(week)?;
        let score = self.cycle.weekly_score(week_num);
        let review = WeeklyReview::new(week, score, wins.trim(), lessons.trim(), today)?;
        let upsert = self.cycle.upsert_review(review.clone());
        info!(week = week_num, score, ?upsert, "Review submitted");
        Ok(self.touch(SubmittedReview { review, upsert }))
    }

    /// Adds a metric to a goal and returns its generated id
    pub fn add_metric(
        &mut self,
        goal_id: &str,
        title: &str,
        kind: MetricKind,
        starting_value: f64,
        target_value: f64,
        unit: &str,
    ) -> Result<String> {
        let id = self.cycle.next_metric_id();
        let metric = Metric::new(id.clone(), title, kind, starting_value, target_value, unit)?;
        self.cycle.goal_mut(goal_id)?.add_metric(metric)?;
        Ok(self.touch(id))
    }

    /// Records a new current value for a metric and returns its percent to target
    pub fn record_metric(
        &mut self,
        goal_id: &str,
        metric_id: &str,
        value: f64,
        today: NaiveDate,
    ) -> Result<f64> {
        let metric = self.cycle.goal_mut(goal_id)?.metric_mut(metric_id)?;
        metric.record_value(value, today)?;
        let percent = metric.percent_to_target();
        Ok(self.touch(percent))
    }

    /// Adds a protected strategic block
    pub fn add_block(&mut self, day: &str, start_time: &str, end_time: &str) -> Result<StrategicBlock> {
        let block = StrategicBlock::new(day, start_time, end_time)?;
        self.cycle.add_strategic_block(block.clone())?;
        Ok(self.touch(block))
    }

    /// Removes the block on `day` starting at `start_time`; returns whether one existed
    pub fn remove_block(&mut self, day: &str, start_time: &str) -> Result<bool> {
        let start_time = alignment::normalize_time(start_time)?;
        let removed = self.cycle.remove_strategic_block(day, &start_time);
        if removed {
            self.touch(());
        }
        Ok(removed)
    }

    /// Replaces a vision statement
    pub fn set_vision(&mut self, kind: VisionKind, content: &str) {
        self.cycle.set_vision(kind, content.trim());
        self.touch(());
    }

    /// Closes the current period and starts the next one on `next_start`
    pub fn archive(&mut self, next_start: NaiveDate) {
        self.cycle.archive(next_start);
        info!(%next_start, "Cycle archived");
        self.touch(());
    }

    /// Dashboard read-model for `today`
    #[must_use]
    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        report::build_dashboard(&self.cycle, today, self.score_threshold)
    }

    /// Tactics due in `week`, with their goals
    #[must_use]
    pub fn week_plan(&self, week: u8) -> Vec<(&Goal, &Tactic)> {
        self.cycle
            .all_tactics()
            .filter(|(_, t)| t.due_week == week)
            .collect()
    }

    /// Writes the cycle out. On failure the cycle is untouched and stays dirty.
    pub async fn save(&mut self, db: &DatabaseConnection) -> Result<()> {
        store::save_cycle(db, &self.cycle).await?;
        self.dirty = false;
        Ok(())
    }

    /// Replaces the cycle with what the store holds, returning the dropped rows.
    /// On failure the current cycle is kept.
    pub async fn reload(&mut self, db: &DatabaseConnection, today: NaiveDate) -> Result<Vec<Error>> {
        let outcome = store::load_cycle(db, today).await?;
        self.cycle = outcome.cycle;
        self.dirty = false;
        Ok(outcome.dropped)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::score::DEFAULT_SCORE_THRESHOLD;
    use crate::test_utils::{date, sample_cycle, setup_test_db};
    use sea_orm::Database;

    fn session() -> CycleSession {
        CycleSession::new(sample_cycle(), DEFAULT_SCORE_THRESHOLD)
    }

    #[test]
    fn test_edits_mark_dirty() {
        let mut s = session();
        assert!(!s.is_dirty());
        assert!(s.toggle_tactic("g1", "t1").unwrap());
        assert!(s.is_dirty());
    }

    #[test]
    fn test_resolve_tactic_shared_id() {
        let mut s = session();
        let g2 = s.add_goal("Second goal").unwrap();
        s.cycle
            .goal_mut(&g2)
            .unwrap()
            .add_tactic(Tactic::new("t1", "Same id", 1, BlockType::None).unwrap())
            .unwrap();

        assert!(matches!(
            s.resolve_tactic("t1"),
            Err(Error::Validation { .. })
        ));
        assert_eq!(
            s.resolve_tactic(&tactic_key(&g2, "t1")).unwrap(),
            (g2.clone(), "t1".to_string())
        );
        assert_eq!(
            s.resolve_tactic("t2").unwrap(),
            ("g1".to_string(), "t2".to_string())
        );
        assert!(matches!(
            s.resolve_tactic("g1/t9"),
            Err(Error::TacticNotFound { .. })
        ));

        // Toggling through the key reaches the second goal's tactic only
        let (goal, tactic) = s.resolve_tactic("g2/t1").unwrap();
        assert!(s.toggle_tactic(&goal, &tactic).unwrap());
        assert!(s.cycle().goal("g2").unwrap().tactic("t1").unwrap().is_completed());
        assert!(!s.cycle().goal("g1").unwrap().tactic("t1").unwrap().is_completed());
    }

    #[test]
    fn test_failed_edit_leaves_clean() {
        let mut s = session();
        assert!(matches!(
            s.toggle_tactic("g1", "missing"),
            Err(Error::TacticNotFound { .. })
        ));
        assert!(s.add_goal("   ").is_err());
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_add_tactic_generates_unique_ids() {
        let mut s = session();
        let goal = s.add_goal("Second goal").unwrap();
        let first = s.add_tactic(&goal, "Call 5 leads", 2, BlockType::Buffer).unwrap();
        let second = s.add_tactic("g1", "Write post", 2, BlockType::None).unwrap();
        assert_eq!(first, "t4");
        assert_eq!(second, "t5");
        assert!(matches!(
            s.add_tactic("g1", "Too late", 14, BlockType::None),
            Err(Error::InvalidWeek { week: 14 })
        ));
    }

    #[test]
    fn test_submit_review_scores_the_week() {
        let mut s = session();
        s.toggle_tactic("g1", "t1").unwrap();
        s.toggle_tactic("g1", "t2").unwrap();

        let submitted = s.submit_review(1, "Two done", "Start earlier", date(2025, 1, 12)).unwrap();
        assert_eq!(submitted.review.score, 66.7);
        assert_eq!(submitted.upsert, ReviewUpsert::Inserted);

        s.toggle_tactic("g1", "t3").unwrap();
        let again = s.submit_review(1, "All done", "", date(2025, 1, 13)).unwrap();
        assert_eq!(again.upsert, ReviewUpsert::Updated);
        assert_eq!(s.cycle().reviews.len(), 1);
        assert_eq!(s.cycle().review(1).unwrap().score, 100.0);
    }

    #[test]
    fn test_schedule_strategic_tactic_advises() {
        let mut s = session();
        s.add_block("Monday", "09:00", "12:00").unwrap();

        let outside = s.schedule_tactic("g1", "t1", 2, "Monday", "13:00").unwrap();
        assert_eq!(outside.week, 2);
        assert_eq!(outside.advisories.len(), 1);
        assert_eq!(s.cycle().goal("g1").unwrap().tactic("t1").unwrap().due_week, 2);

        let inside = s.schedule_tactic("g1", "t1", 2, "Monday", "9:30").unwrap();
        assert_eq!(inside.start_time, "09:30");
        assert!(inside.advisories.is_empty());
    }

    #[test]
    fn test_schedule_non_strategic_tactic_never_advises() {
        let mut s = session();
        let outcome = s.schedule_tactic("g1", "t2", 3, "Sunday", "23:00").unwrap();
        assert!(outcome.advisories.is_empty());
        assert!(s.schedule_tactic("g1", "t2", 3, "Sunday", "noon").is_err());
    }

    #[test]
    fn test_metrics_and_blocks() {
        let mut s = session();
        let id = s
            .add_metric("g1", "Revenue", MetricKind::Lag, 0.0, 1000.0, "$")
            .unwrap();
        let pct = s.record_metric("g1", &id, 250.0, date(2025, 2, 1)).unwrap();
        assert_eq!(pct, 25.0);

        s.add_block("Tuesday", "08:00", "10:00").unwrap();
        assert!(s.add_block("tuesday", "8:00", "09:00").is_err());
        assert!(s.remove_block("Tuesday", "8:00").unwrap());
        assert!(!s.remove_block("Tuesday", "08:00").unwrap());
    }

    #[test]
    fn test_week_plan_and_archive() {
        let mut s = session();
        assert_eq!(s.week_plan(1).len(), 3);
        s.set_vision(VisionKind::ThreeYear, " Freedom ");
        s.archive(date(2025, 4, 7));
        assert!(s.week_plan(1).is_empty());
        assert_eq!(s.cycle().three_year_vision, "Freedom");
        assert_eq!(s.cycle().start_date, date(2025, 4, 7));
    }

    #[tokio::test]
    async fn test_save_and_reload() -> Result<()> {
        let db = setup_test_db().await?;
        let mut s = session();
        s.toggle_tactic("g1", "t2")?;
        s.save(&db).await?;
        assert!(!s.is_dirty());

        s.toggle_tactic("g1", "t2")?;
        let dropped = s.reload(&db, date(2025, 3, 3)).await?;
        assert!(dropped.is_empty());
        assert!(!s.is_dirty());
        assert!(s.cycle().goal("g1")?.tactic("t2")?.is_completed());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_and_dirty() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        let mut s = session();
        s.toggle_tactic("g1", "t1")?;
        let before = s.cycle().clone();

        assert!(s.save(&db).await.is_err());

        assert!(s.is_dirty());
        assert_eq!(s.cycle(), &before);
        Ok(())
    }
}
