//! Report generation business logic.
//!
//! Builds the read-models shown to the user (dashboard, weekly plan, score
//! history and the weekly accountability meeting summary) and renders them as
//! plain text. Everything here is framework-agnostic; the bot layer only sends
//! the strings.

use crate::{
    core::{
        alignment::StrategicBlock,
        cycle::{CYCLE_WEEKS, Cycle, VisionKind, WeekType},
        score::{ScoreStatus, round_to_tenth},
    },
    errors::Result,
};
use chrono::NaiveDate;
use std::fmt::Write;

/// Completion summary for one goal
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    /// Goal id
    pub id: String,
    /// Goal title
    pub title: String,
    /// Completed tactics
    pub completed: usize,
    /// All tactics
    pub total: usize,
    /// Completion percentage (0-100)
    pub percent: f64,
}

/// Snapshot of where the cycle stands today
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// Current week (1-13)
    pub week: u8,
    /// Execution or review week
    pub week_type: WeekType,
    /// Execution score for the current week
    pub score: f64,
    /// Threshold the score is judged against
    pub threshold: f64,
    /// On track or at risk
    pub status: ScoreStatus,
    /// Last day of the cycle
    pub end_date: NaiveDate,
    /// Per-goal completion
    pub goals: Vec<GoalProgress>,
}

/// A recorded weekly score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePoint {
    /// Week number
    pub week: u8,
    /// Score recorded with the review
    pub score: f64,
    /// Classification against the threshold
    pub status: ScoreStatus,
}

/// Builds the dashboard for `today`
#[must_use]
pub fn build_dashboard(cycle: &Cycle, today: NaiveDate, threshold: f64) -> Dashboard {
    let week = cycle.current_week(today);
    let score = cycle.weekly_score(week);

    let goals = cycle
        .goals
        .iter()
        .map(|g| {
            let completed = g.tactics.iter().filter(|t| t.is_completed()).count();
            GoalProgress {
                id: g.id.clone(),
                title: g.title.clone(),
                completed,
                total: g.tactics.len(),
                percent: round_to_tenth(g.progress() * 100.0),
            }
        })
        .collect();

    Dashboard {
        week,
        week_type: Cycle::week_type(week),
        score,
        threshold,
        status: ScoreStatus::classify(score, threshold),
        end_date: cycle.end_date(),
        goals,
    }
}

/// Renders the dashboard as a Discord message
pub fn format_dashboard(dashboard: &Dashboard) -> Result<String> {
    let mut response = String::new();

    match dashboard.week_type {
        WeekType::Execution => writeln!(
            &mut response,
            "**Week {}/{}** (Execution)",
            dashboard.week, CYCLE_WEEKS
        )?,
        WeekType::ReviewAndCelebrate => {
            writeln!(&mut response, "**Week {}** (Review and Celebrate)", dashboard.week)?;
        }
    }
    writeln!(
        &mut response,
        "Weekly score: **{:.1}%** (target {:.0}%+) - {}",
        dashboard.score,
        dashboard.threshold,
        dashboard.status.as_str()
    )?;
    writeln!(&mut response, "Cycle ends: {}", dashboard.end_date)?;

    writeln!(&mut response, "\n**Active Goals**")?;
    if dashboard.goals.is_empty() {
        writeln!(&mut response, "No goals yet. Use `/add_goal` to create one.")?;
    }
    for goal in &dashboard.goals {
        writeln!(
            &mut response,
            "`{}` **{}** {} ({}/{})",
            goal.id,
            goal.title,
            format_progress_bar(goal.percent, None),
            goal.completed,
            goal.total
        )?;
    }

    Ok(response)
}

/// Renders the tactics due in `week`, grouped by goal
pub fn format_week_plan(cycle: &Cycle, week: u8) -> Result<String> {
    let mut response = String::new();
    writeln!(&mut response, "**Execute: Week {week}**")?;

    let mut any = false;
    for goal in &cycle.goals {
        let due: Vec<_> = goal.tactics.iter().filter(|t| t.due_week == week).collect();
        if due.is_empty() {
            continue;
        }
        any = true;
        writeln!(&mut response, "\n**{}** (`{}`)", goal.title, goal.id)?;
        for t in due {
            let mark = if t.is_completed() { "✅" } else { "⬜" };
            writeln!(
                &mut response,
                "{mark} `{}` {} [{}] - {}",
                t.id,
                t.title,
                t.block_type,
                t.status()
            )?;
        }
    }

    if !any {
        writeln!(&mut response, "No tactics scheduled for this week.")?;
    }
    Ok(response)
}

/// Scores recorded with each review, in week order
#[must_use]
pub fn score_history(cycle: &Cycle, threshold: f64) -> Vec<ScorePoint> {
    let mut points: Vec<ScorePoint> = cycle
        .reviews
        .iter()
        .map(|r| ScorePoint {
            week: r.week_num,
            score: r.score,
            status: ScoreStatus::classify(r.score, threshold),
        })
        .collect();
    points.sort_by_key(|p| p.week);
    points
}

/// Mean of the recorded scores, or `None` when nothing has been reviewed
#[must_use]
pub fn average_score(points: &[ScorePoint]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    // At most 13 points
    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    Some(round_to_tenth(
        points.iter().map(|p| p.score).sum::<f64>() / count,
    ))
}

/// Renders the score history as one bar per reviewed week
pub fn format_score_history(points: &[ScorePoint]) -> Result<String> {
    let mut response = String::new();
    writeln!(&mut response, "**Execution Score History**")?;

    if points.is_empty() {
        writeln!(&mut response, "No reviews submitted yet.")?;
        return Ok(response);
    }

    for p in points {
        writeln!(
            &mut response,
            "Week {:>2} {} {}",
            p.week,
            format_progress_bar(p.score, None),
            p.status.as_str()
        )?;
    }
    if let Some(avg) = average_score(points) {
        writeln!(&mut response, "Average: {avg:.1}%")?;
    }
    Ok(response)
}

/// Weekly accountability meeting summary for `week`: score, what got done, what
/// slipped, and the review notes if one was submitted.
pub fn format_wam(cycle: &Cycle, week: u8, threshold: f64) -> Result<String> {
    let mut response = String::new();
    let score = cycle.weekly_score(week);

    writeln!(&mut response, "**Weekly Accountability - Week {week}**")?;
    writeln!(
        &mut response,
        "Score: {} - {}",
        format_progress_bar(score, None),
        ScoreStatus::classify(score, threshold).as_str()
    )?;

    let (done, open): (Vec<_>, Vec<_>) = cycle
        .all_tactics()
        .filter(|(_, t)| t.due_week == week)
        .partition(|(_, t)| t.is_completed());

    writeln!(&mut response, "\n**Done ({})**", done.len())?;
    for (goal, t) in &done {
        writeln!(&mut response, "- {} ({})", t.title, goal.title)?;
    }
    writeln!(&mut response, "\n**Open ({})**", open.len())?;
    for (goal, t) in &open {
        writeln!(&mut response, "- {} ({}) - {}", t.title, goal.title, t.status())?;
    }

    match cycle.review(week) {
        Some(review) => {
            writeln!(&mut response, "\n**Wins:** {}", review.wins)?;
            writeln!(&mut response, "**Lessons:** {}", review.lessons)?;
        }
        None => writeln!(&mut response, "\nNo review submitted for this week yet.")?,
    }

    Ok(response)
}

/// Renders vision, goals with their tactics, and strategic blocks
pub fn format_plan(cycle: &Cycle) -> Result<String> {
    let mut response = String::new();
    writeln!(&mut response, "**Strategic Plan**")?;

    for kind in [VisionKind::ThreeYear, VisionKind::OneYear] {
        let text = cycle.vision(kind);
        let label = match kind {
            VisionKind::ThreeYear => "3-year vision",
            VisionKind::OneYear => "1-year vision",
        };
        writeln!(
            &mut response,
            "**{label}:** {}",
            if text.is_empty() { "_not set_" } else { text }
        )?;
    }

    if cycle.goals.is_empty() {
        writeln!(&mut response, "\nNo goals yet. Use `/add_goal` to create one.")?;
    }
    for goal in &cycle.goals {
        writeln!(&mut response, "\n**{}** (`{}`)", goal.title, goal.id)?;
        if goal.tactics.is_empty() {
            writeln!(&mut response, "_no tactics_")?;
        }
        for t in &goal.tactics {
            writeln!(
                &mut response,
                "- [Week {}] `{}` {} ({})",
                t.due_week,
                t.id,
                t.title,
                t.status()
            )?;
        }
    }

    writeln!(&mut response)?;
    response.push_str(&format_blocks(&cycle.strategic_blocks)?);
    Ok(response)
}

/// Renders every metric with its progress toward target
pub fn format_metrics(cycle: &Cycle) -> Result<String> {
    let mut response = String::new();
    writeln!(&mut response, "**Metrics**")?;

    let mut any = false;
    for goal in &cycle.goals {
        for m in &goal.metrics {
            any = true;
            let updated = m
                .last_updated
                .map_or_else(|| "never".to_string(), |d| d.to_string());
            writeln!(
                &mut response,
                "`{}` **{}** ({}, {}) {} / {} {} {} - updated {updated}",
                m.id,
                m.title,
                m.kind,
                goal.title,
                m.current_value,
                m.target_value,
                m.unit,
                format_progress_bar(round_to_tenth(m.percent_to_target()), None),
            )?;
        }
    }

    if !any {
        writeln!(&mut response, "No metrics tracked yet. Use `/add_metric`.")?;
    }
    Ok(response)
}

/// Renders the protected strategic blocks
pub fn format_blocks(blocks: &[StrategicBlock]) -> Result<String> {
    let mut response = String::new();
    writeln!(&mut response, "**Strategic Blocks**")?;
    if blocks.is_empty() {
        writeln!(&mut response, "None protected yet. Use `/block add`.")?;
    }
    for block in blocks {
        writeln!(&mut response, "- {block}")?;
    }
    Ok(response)
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
///
/// # Arguments
/// * `progress_percent` - Progress percentage (0-100)
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress is in [0, 100] and length is small, so filled is in [0, length]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{cycle::WeeklyReview, score::DEFAULT_SCORE_THRESHOLD};
    use crate::test_utils::{date, sample_cycle};

    #[test]
    fn test_format_progress_bar_full() {
        assert_eq!(format_progress_bar(100.0, None), "[██████████] 100.0%");
    }

    #[test]
    fn test_format_progress_bar_partial() {
        assert_eq!(format_progress_bar(33.3, None), "[███░░░░░░░] 33.3%");
        assert_eq!(format_progress_bar(50.0, Some(4)), "[██░░] 50.0%");
    }

    #[test]
    fn test_format_progress_bar_clamps() {
        assert_eq!(format_progress_bar(0.0, None), "[░░░░░░░░░░] 0.0%");
        assert_eq!(format_progress_bar(150.0, Some(2)), "[██] 150.0%");
    }

    #[test]
    fn test_dashboard_for_first_week() {
        let mut cycle = sample_cycle();
        cycle
            .goal_mut("g1")
            .unwrap()
            .tactic_mut("t1")
            .unwrap()
            .set_completed(true);

        let dashboard = build_dashboard(&cycle, date(2025, 1, 8), DEFAULT_SCORE_THRESHOLD);

        assert_eq!(dashboard.week, 1);
        assert_eq!(dashboard.week_type, WeekType::Execution);
        assert_eq!(dashboard.score, 33.3);
        assert_eq!(dashboard.status, ScoreStatus::AtRisk);
        assert_eq!(dashboard.goals[0].completed, 1);
        assert_eq!(dashboard.goals[0].total, 3);
        assert_eq!(dashboard.goals[0].percent, 33.3);

        let text = format_dashboard(&dashboard).unwrap();
        assert!(text.contains("Week 1/12"));
        assert!(text.contains("At Risk"));
    }

    #[test]
    fn test_dashboard_review_week() {
        let cycle = sample_cycle();
        let dashboard = build_dashboard(&cycle, date(2025, 12, 1), DEFAULT_SCORE_THRESHOLD);
        assert_eq!(dashboard.week, 13);
        assert_eq!(dashboard.week_type, WeekType::ReviewAndCelebrate);
        assert!(format_dashboard(&dashboard).unwrap().contains("Review and Celebrate"));
    }

    #[test]
    fn test_week_plan_lists_only_that_week() {
        let cycle = sample_cycle();
        let plan = format_week_plan(&cycle, 1).unwrap();
        assert!(plan.contains("`t1`"));
        assert!(plan.contains("`t3`"));

        let empty = format_week_plan(&cycle, 4).unwrap();
        assert!(empty.contains("No tactics scheduled"));
    }

    #[test]
    fn test_score_history_sorted_with_average() {
        let mut cycle = sample_cycle();
        for (week, score) in [(3, 60.0), (1, 90.0), (2, 85.0)] {
            cycle.upsert_review(WeeklyReview::new(week, score, "", "", date(2025, 1, 20)).unwrap());
        }

        let points = score_history(&cycle, DEFAULT_SCORE_THRESHOLD);
        let weeks: Vec<u8> = points.iter().map(|p| p.week).collect();
        assert_eq!(weeks, vec![1, 2, 3]);
        assert_eq!(points[2].status, ScoreStatus::AtRisk);
        assert_eq!(average_score(&points), Some(78.3));
        assert_eq!(average_score(&[]), None);

        let text = format_score_history(&points).unwrap();
        assert!(text.contains("Average: 78.3%"));
    }

    #[test]
    fn test_plan_lists_vision_tactics_and_blocks() {
        let mut cycle = sample_cycle();
        cycle.set_vision(VisionKind::OneYear, "Ship it");
        cycle
            .add_strategic_block(StrategicBlock::new("Monday", "09:00", "12:00").unwrap())
            .unwrap();

        let text = format_plan(&cycle).unwrap();
        assert!(text.contains("**1-year vision:** Ship it"));
        assert!(text.contains("**3-year vision:** _not set_"));
        assert!(text.contains("- [Week 1] `t1`"));
        assert!(text.contains("- Monday 09:00-12:00"));
    }

    #[test]
    fn test_metrics_report() {
        let mut cycle = sample_cycle();
        assert!(format_metrics(&cycle).unwrap().contains("No metrics tracked"));

        let mut m = crate::core::metric::Metric::new(
            "m1",
            "Leads",
            crate::core::metric::MetricKind::Lead,
            0.0,
            10.0,
            "leads",
        )
        .unwrap();
        m.current_value = 5.0;
        cycle.goal_mut("g1").unwrap().add_metric(m).unwrap();

        let text = format_metrics(&cycle).unwrap();
        assert!(text.contains("`m1` **Leads**"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("updated never"));
    }

    #[test]
    fn test_wam_splits_done_and_open() {
        let mut cycle = sample_cycle();
        cycle
            .goal_mut("g1")
            .unwrap()
            .tactic_mut("t2")
            .unwrap()
            .set_completed(true);

        let text = format_wam(&cycle, 1, DEFAULT_SCORE_THRESHOLD).unwrap();
        assert!(text.contains("**Done (1)**"));
        assert!(text.contains("**Open (2)**"));
        assert!(text.contains("No review submitted"));
    }
}
