//! Tactic model - the weekly action items that make up a goal.
//!
//! A tactic carries both a status and a completion flag. The two must always
//! agree (`status == Completed` exactly when the flag is set), so neither field is
//! public and every write goes through [`Tactic::set_status`],
//! [`Tactic::set_completed`] or [`Tactic::toggle_completed`].

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// First week of a cycle
pub const FIRST_WEEK: u8 = 1;
/// Week 13 is the review-and-celebrate week following the 12 execution weeks
pub const LAST_WEEK: u8 = 13;

/// Checks a week number against the cycle bounds.
pub fn validate_week(week: i64) -> Result<u8> {
    u8::try_from(week)
        .ok()
        .filter(|w| (FIRST_WEEK..=LAST_WEEK).contains(w))
        .ok_or(Error::InvalidWeek { week })
}

/// Lifecycle state of a tactic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum TacticStatus {
    /// Scheduled but not begun
    #[default]
    NotStarted,
    /// Work has begun
    InProgress,
    /// Done
    Completed,
    /// Pushed to a later week
    Deferred,
    /// Dropped
    Cancelled,
}

impl TacticStatus {
    /// All statuses in display order
    pub const ALL: [Self; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::Deferred,
        Self::Cancelled,
    ];

    /// Stored/displayed label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Deferred => "Deferred",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parses a stored label, case-insensitively.
    ///
    /// Legacy labels from the string-status era are mapped onto the enum:
    /// `"Pending"` becomes `NotStarted` and `"Complete"` becomes `Completed`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "not started" | "notstarted" | "pending" => Some(Self::NotStarted),
            "in progress" | "inprogress" => Some(Self::InProgress),
            "completed" | "complete" | "done" => Some(Self::Completed),
            "deferred" => Some(Self::Deferred),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TacticStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of time block a tactic should be worked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum BlockType {
    /// Protected deep-work block
    Strategic,
    /// Admin and low-value work
    Buffer,
    /// Recharge time
    Breakout,
    /// Not assigned to a block
    #[default]
    None,
}

impl BlockType {
    /// All block types in display order
    pub const ALL: [Self; 4] = [Self::Strategic, Self::Buffer, Self::Breakout, Self::None];

    /// Stored/displayed label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strategic => "Strategic",
            Self::Buffer => "Buffer",
            Self::Breakout => "Breakout",
            Self::None => "None",
        }
    }

    /// Parses a stored label, case-insensitively
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|block| block.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled action item owned by one goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tactic {
    /// Unique within the owning goal
    pub id: String,
    /// What to do
    pub title: String,
    /// Week the tactic is due (1-13)
    pub due_week: u8,
    /// Which kind of time block it belongs in
    pub block_type: BlockType,
    status: TacticStatus,
    is_completed: bool,
}

impl Tactic {
    /// Creates a not-started tactic after validating the title and week.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        due_week: i64,
        block_type: BlockType,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::Validation {
                message: "Tactic title cannot be empty".to_string(),
            });
        }

        Ok(Self {
            id: id.into(),
            title: title.trim().to_string(),
            due_week: validate_week(due_week)?,
            block_type,
            status: TacticStatus::NotStarted,
            is_completed: false,
        })
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> TacticStatus {
        self.status
    }

    /// Whether the tactic is done
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Sets the status, keeping the completion flag in step.
    pub fn set_status(&mut self, status: TacticStatus) {
        self.status = status;
        self.is_completed = status == TacticStatus::Completed;
    }

    /// Sets the completion flag, keeping the status in step.
    ///
    /// Un-completing a completed tactic moves it back to `NotStarted`; un-completing
    /// anything else leaves its status alone.
    pub fn set_completed(&mut self, completed: bool) {
        if completed {
            self.set_status(TacticStatus::Completed);
        } else if self.status == TacticStatus::Completed {
            self.set_status(TacticStatus::NotStarted);
        }
    }

    /// Flips the completion flag and returns the new value
    pub fn toggle_completed(&mut self) -> bool {
        self.set_completed(!self.is_completed);
        self.is_completed
    }

    /// Moves the tactic to another week of the cycle
    pub fn reschedule(&mut self, week: i64) -> Result<()> {
        self.due_week = validate_week(week)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use proptest::prelude::*;

    fn tactic() -> Tactic {
        Tactic::new("t1", "Call 50 leads", 1, BlockType::Strategic).unwrap()
    }

    #[test]
    fn test_new_tactic_starts_not_started() {
        let t = tactic();
        assert_eq!(t.status(), TacticStatus::NotStarted);
        assert!(!t.is_completed());
    }

    #[test]
    fn test_new_tactic_rejects_bad_week_and_blank_title() {
        assert!(matches!(
            Tactic::new("t1", "x", 0, BlockType::None),
            Err(Error::InvalidWeek { week: 0 })
        ));
        assert!(matches!(
            Tactic::new("t1", "x", 14, BlockType::None),
            Err(Error::InvalidWeek { week: 14 })
        ));
        assert!(matches!(
            Tactic::new("t1", "   ", 3, BlockType::None),
            Err(Error::Validation { .. })
        ));
        assert_eq!(Tactic::new("t1", "x", 13, BlockType::None).unwrap().due_week, 13);
    }

    #[test]
    fn test_uncompleting_keeps_non_completed_status() {
        let mut t = tactic();
        t.set_status(TacticStatus::Deferred);
        t.set_completed(false);
        assert_eq!(t.status(), TacticStatus::Deferred);

        t.set_completed(true);
        assert_eq!(t.status(), TacticStatus::Completed);
        t.set_completed(false);
        assert_eq!(t.status(), TacticStatus::NotStarted);
    }

    #[test]
    fn test_toggle_flips_both_fields() {
        let mut t = tactic();
        assert!(t.toggle_completed());
        assert_eq!(t.status(), TacticStatus::Completed);
        assert!(!t.toggle_completed());
        assert_eq!(t.status(), TacticStatus::NotStarted);
    }

    #[test]
    fn test_status_parse_handles_legacy_labels() {
        assert_eq!(TacticStatus::parse("Pending"), Some(TacticStatus::NotStarted));
        assert_eq!(TacticStatus::parse("Complete"), Some(TacticStatus::Completed));
        assert_eq!(TacticStatus::parse("in progress"), Some(TacticStatus::InProgress));
        assert_eq!(TacticStatus::parse("IN_PROGRESS"), Some(TacticStatus::InProgress));
        assert_eq!(TacticStatus::parse("Blocked"), None);
        for status in TacticStatus::ALL {
            assert_eq!(TacticStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_block_type_parse() {
        assert_eq!(BlockType::parse("strategic"), Some(BlockType::Strategic));
        assert_eq!(BlockType::parse(" Buffer "), Some(BlockType::Buffer));
        assert_eq!(BlockType::parse("nap"), None);
    }

    #[test]
    fn test_labels_order_as_displayed() {
        let statuses: std::collections::BTreeSet<TacticStatus> =
            TacticStatus::ALL.iter().rev().copied().collect();
        assert!(statuses.into_iter().eq(TacticStatus::ALL));

        let mut blocks = BlockType::ALL.to_vec();
        blocks.reverse();
        blocks.sort();
        assert_eq!(blocks, BlockType::ALL);
    }

    #[derive(Debug, Clone)]
    enum Op {
        SetStatus(TacticStatus),
        SetCompleted(bool),
        Toggle,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::sample::select(TacticStatus::ALL.to_vec()).prop_map(Op::SetStatus),
            any::<bool>().prop_map(Op::SetCompleted),
            Just(Op::Toggle),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// No sequence of writes can leave status and flag disagreeing
        #[test]
        fn prop_status_and_flag_always_agree(ops in prop::collection::vec(arb_op(), 0..40)) {
            let mut t = tactic();
            for op in ops {
                match op {
                    Op::SetStatus(s) => t.set_status(s),
                    Op::SetCompleted(c) => t.set_completed(c),
                    Op::Toggle => {
                        t.toggle_completed();
                    }
                }
                prop_assert_eq!(t.status() == TacticStatus::Completed, t.is_completed());
            }
        }
    }
}
