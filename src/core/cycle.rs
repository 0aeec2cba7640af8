//! Cycle model - one 12-week planning period and everything it owns.
//!
//! The cycle is the root of the in-memory object graph: goals (with their tactics
//! and metrics), weekly reviews, strategic blocks and the two vision statements.
//! All mutation helpers live here so callers never reach into the collections to
//! break an invariant (unique ids, one review per week).

use crate::{
    core::{
        alignment::StrategicBlock,
        metric::Metric,
        score,
        tactic::{self, LAST_WEEK, Tactic},
    },
    errors::{Error, Result},
};
use chrono::{Duration, NaiveDate};
use std::fmt;

/// Number of execution weeks in a cycle
pub const CYCLE_WEEKS: i64 = 12;

/// What a given week of the cycle is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekType {
    /// Weeks 1-12
    Execution,
    /// Week 13
    ReviewAndCelebrate,
}

impl WeekType {
    /// Display label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Execution => "Execution",
            Self::ReviewAndCelebrate => "Review_and_Celebrate",
        }
    }
}

/// The two long-range vision statements kept with a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisionKind {
    /// Three-year vision
    ThreeYear,
    /// One-year vision
    OneYear,
}

impl VisionKind {
    /// Stored label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThreeYear => "3_Year",
            Self::OneYear => "1_Year",
        }
    }

    /// Parses a stored label; also accepts the friendlier "3 year"/"1-year"
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "3_year" | "three_year" => Some(Self::ThreeYear),
            "1_year" | "one_year" => Some(Self::OneYear),
            _ => None,
        }
    }
}

impl fmt::Display for VisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retrospective for one week
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyReview {
    /// Week reviewed (1-13)
    pub week_num: u8,
    /// Execution score recorded at submission
    pub score: f64,
    /// What went well
    pub wins: String,
    /// What to improve
    pub lessons: String,
    /// When the review was submitted
    pub date_submitted: NaiveDate,
}

impl WeeklyReview {
    /// Creates a review after checking the week and score ranges.
    pub fn new(
        week: i64,
        score: f64,
        wins: impl Into<String>,
        lessons: impl Into<String>,
        date_submitted: NaiveDate,
    ) -> Result<Self> {
        if !(0.0..=100.0).contains(&score) {
            return Err(Error::Validation {
                message: format!("Review score {score} is outside 0-100"),
            });
        }

        Ok(Self {
            week_num: tactic::validate_week(week)?,
            score,
            wins: wins.into(),
            lessons: lessons.into(),
            date_submitted,
        })
    }
}

/// Whether an upsert added a review or replaced one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewUpsert {
    /// No review existed for the week
    Inserted,
    /// The week's existing review was replaced
    Updated,
}

/// A strategic objective for the cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// Unique within the cycle
    pub id: String,
    /// What the goal is
    pub title: String,
    /// Weekly action items
    pub tactics: Vec<Tactic>,
    /// Indicators tracked for this goal
    pub metrics: Vec<Metric>,
}

impl Goal {
    /// Creates an empty goal with a validated title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::Validation {
                message: "Goal title cannot be empty".to_string(),
            });
        }

        Ok(Self {
            id: id.into(),
            title: title.trim().to_string(),
            tactics: Vec::new(),
            metrics: Vec::new(),
        })
    }

    /// Adds a tactic, rejecting an id already used in this goal
    pub fn add_tactic(&mut self, tactic: Tactic) -> Result<()> {
        if self.tactics.iter().any(|t| t.id == tactic.id) {
            return Err(Error::DuplicateId {
                kind: "Tactic",
                id: tactic.id,
            });
        }
        self.tactics.push(tactic);
        Ok(())
    }

    /// Adds a metric, rejecting an id already used in this goal
    pub fn add_metric(&mut self, metric: Metric) -> Result<()> {
        if self.metrics.iter().any(|m| m.id == metric.id) {
            return Err(Error::DuplicateId {
                kind: "Metric",
                id: metric.id,
            });
        }
        self.metrics.push(metric);
        Ok(())
    }

    /// Looks up a tactic by id
    pub fn tactic(&self, tactic_id: &str) -> Result<&Tactic> {
        self.tactics
            .iter()
            .find(|t| t.id == tactic_id)
            .ok_or_else(|| Error::TacticNotFound {
                goal_id: self.id.clone(),
                tactic_id: tactic_id.to_string(),
            })
    }

    /// Looks up a tactic by id for mutation
    pub fn tactic_mut(&mut self, tactic_id: &str) -> Result<&mut Tactic> {
        let goal_id = self.id.clone();
        self.tactics
            .iter_mut()
            .find(|t| t.id == tactic_id)
            .ok_or_else(|| Error::TacticNotFound {
                goal_id,
                tactic_id: tactic_id.to_string(),
            })
    }

    /// Looks up a metric by id for mutation
    pub fn metric_mut(&mut self, metric_id: &str) -> Result<&mut Metric> {
        let goal_id = self.id.clone();
        self.metrics
            .iter_mut()
            .find(|m| m.id == metric_id)
            .ok_or_else(|| Error::MetricNotFound {
                goal_id,
                metric_id: metric_id.to_string(),
            })
    }

    /// Fraction of this goal's tactics that are complete, in `[0, 1]`
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.tactics.is_empty() {
            return 0.0;
        }
        let done = self.tactics.iter().filter(|t| t.is_completed()).count();
        // Tactic counts are tiny; no meaningful precision loss
        #[allow(clippy::cast_precision_loss)]
        let fraction = done as f64 / self.tactics.len() as f64;
        fraction
    }
}

/// One 12-week planning period
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    /// Cycle identifier
    pub id: String,
    /// First day of week 1
    pub start_date: NaiveDate,
    /// Goals in display order
    pub goals: Vec<Goal>,
    /// At most one review per week number
    pub reviews: Vec<WeeklyReview>,
    /// Recurring protected time windows
    pub strategic_blocks: Vec<StrategicBlock>,
    /// Three-year vision text
    pub three_year_vision: String,
    /// One-year vision text
    pub one_year_vision: String,
}

impl Cycle {
    /// Creates an empty cycle starting on `start_date`
    pub fn new(id: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date,
            goals: Vec::new(),
            reviews: Vec::new(),
            strategic_blocks: Vec::new(),
            three_year_vision: String::new(),
            one_year_vision: String::new(),
        }
    }

    /// Always `start_date + 12 weeks`; never stored
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::weeks(CYCLE_WEEKS)
    }

    /// Week of the cycle `today` falls in, clamped to 1-13
    #[must_use]
    pub fn current_week(&self, today: NaiveDate) -> u8 {
        let days = (today - self.start_date).num_days().max(0);
        let week = (days / 7 + 1).min(i64::from(LAST_WEEK));
        u8::try_from(week).unwrap_or(LAST_WEEK)
    }

    /// Week 13 is for review and celebration, all others for execution
    #[must_use]
    pub const fn week_type(week: u8) -> WeekType {
        if week == LAST_WEEK {
            WeekType::ReviewAndCelebrate
        } else {
            WeekType::Execution
        }
    }

    /// Looks up a goal by id
    pub fn goal(&self, goal_id: &str) -> Result<&Goal> {
        self.goals
            .iter()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| Error::GoalNotFound {
                id: goal_id.to_string(),
            })
    }

    /// Looks up a goal by id for mutation
    pub fn goal_mut(&mut self, goal_id: &str) -> Result<&mut Goal> {
        self.goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| Error::GoalNotFound {
                id: goal_id.to_string(),
            })
    }

    /// Adds a goal with a freshly generated id and returns that id
    pub fn add_goal(&mut self, title: impl Into<String>) -> Result<String> {
        let goal = Goal::new(self.next_goal_id(), title)?;
        let id = goal.id.clone();
        self.goals.push(goal);
        Ok(id)
    }

    /// Next unused `g<n>` id
    #[must_use]
    pub fn next_goal_id(&self) -> String {
        next_id("g", self.goals.iter().map(|g| g.id.as_str()))
    }

    /// Next `t<n>` id, unused across every goal
    #[must_use]
    pub fn next_tactic_id(&self) -> String {
        next_id(
            "t",
            self.goals
                .iter()
                .flat_map(|g| g.tactics.iter().map(|t| t.id.as_str())),
        )
    }

    /// Next `m<n>` id, unused across every goal
    #[must_use]
    pub fn next_metric_id(&self) -> String {
        next_id(
            "m",
            self.goals
                .iter()
                .flat_map(|g| g.metrics.iter().map(|m| m.id.as_str())),
        )
    }

    /// Every tactic, across all goals, paired with its goal
    pub fn all_tactics(&self) -> impl Iterator<Item = (&Goal, &Tactic)> + '_ {
        self.goals
            .iter()
            .flat_map(|g| g.tactics.iter().map(move |t| (g, t)))
    }

    /// Tactics due in `week`, across all goals
    pub fn tactics_due(&self, week: u8) -> impl Iterator<Item = &Tactic> + '_ {
        self.all_tactics()
            .map(|(_, t)| t)
            .filter(move |t| t.due_week == week)
    }

    /// Execution score for the tactics due in `week`
    #[must_use]
    pub fn weekly_score(&self, week: u8) -> f64 {
        score::compute_weekly_score(self.tactics_due(week))
    }

    /// Review recorded for `week`, if any
    #[must_use]
    pub fn review(&self, week: u8) -> Option<&WeeklyReview> {
        self.reviews.iter().find(|r| r.week_num == week)
    }

    /// Inserts the review, or replaces the one already recorded for its week
    pub fn upsert_review(&mut self, review: WeeklyReview) -> ReviewUpsert {
        if let Some(existing) = self
            .reviews
            .iter_mut()
            .find(|r| r.week_num == review.week_num)
        {
            *existing = review;
            ReviewUpsert::Updated
        } else {
            self.reviews.push(review);
            self.reviews.sort_by_key(|r| r.week_num);
            ReviewUpsert::Inserted
        }
    }

    /// Adds a strategic block, rejecting a second block on the same day and start
    pub fn add_strategic_block(&mut self, block: StrategicBlock) -> Result<()> {
        if self
            .strategic_blocks
            .iter()
            .any(|b| b.same_slot(&block.day, &block.start_time))
        {
            return Err(Error::DuplicateId {
                kind: "Strategic block",
                id: format!("{} {}", block.day, block.start_time),
            });
        }
        self.strategic_blocks.push(block);
        Ok(())
    }

    /// Removes the block on `day` starting at `start_time`; returns whether one was removed
    pub fn remove_strategic_block(&mut self, day: &str, start_time: &str) -> bool {
        let before = self.strategic_blocks.len();
        self.strategic_blocks
            .retain(|b| !b.same_slot(day, start_time));
        self.strategic_blocks.len() != before
    }

    /// Vision text of the given kind
    #[must_use]
    pub fn vision(&self, kind: VisionKind) -> &str {
        match kind {
            VisionKind::ThreeYear => &self.three_year_vision,
            VisionKind::OneYear => &self.one_year_vision,
        }
    }

    /// Replaces the vision text of the given kind
    pub fn set_vision(&mut self, kind: VisionKind, content: impl Into<String>) {
        let content = content.into();
        match kind {
            VisionKind::ThreeYear => self.three_year_vision = content,
            VisionKind::OneYear => self.one_year_vision = content,
        }
    }

    /// Closes the period: reviews and tactics are cleared, while goals, metrics,
    /// vision and strategic blocks carry over into the cycle starting `next_start`.
    pub fn archive(&mut self, next_start: NaiveDate) {
        self.reviews.clear();
        for goal in &mut self.goals {
            goal.tactics.clear();
        }
        self.start_date = next_start;
    }
}

fn next_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let highest = existing
        .filter_map(|id| id.strip_prefix(prefix)?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{}", highest + 1)
}
