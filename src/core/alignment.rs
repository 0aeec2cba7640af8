//! Strategic-block alignment check.
//!
//! Strategic tactics are meant to land inside the protected weekly windows set up
//! for deep work. The check here only advises: it never blocks scheduling, it just
//! reports why a candidate slot may be a poor fit.

use crate::errors::{Error, Result};
use chrono::NaiveTime;
use std::fmt;

/// A recurring weekly window reserved for strategic work.
///
/// Times are kept as zero-padded `HH:MM` strings so they compare correctly as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategicBlock {
    /// Day-of-week label, e.g. "Monday"
    pub day: String,
    /// Inclusive start, `HH:MM`
    pub start_time: String,
    /// Exclusive end, `HH:MM`
    pub end_time: String,
}

impl StrategicBlock {
    /// Creates a block, normalising both times to `HH:MM` and requiring start < end.
    pub fn new(
        day: impl Into<String>,
        start_time: &str,
        end_time: &str,
    ) -> Result<Self> {
        let day = day.into().trim().to_string();
        if day.is_empty() {
            return Err(Error::Validation {
                message: "Strategic block day cannot be empty".to_string(),
            });
        }

        let start_time = normalize_time(start_time)?;
        let end_time = normalize_time(end_time)?;
        if start_time >= end_time {
            return Err(Error::Validation {
                message: format!("Block must end after it starts ({start_time} - {end_time})"),
            });
        }

        Ok(Self {
            day,
            start_time,
            end_time,
        })
    }

    /// Whether the block falls on `day` (case-insensitive)
    #[must_use]
    pub fn is_on(&self, day: &str) -> bool {
        self.day.eq_ignore_ascii_case(day.trim())
    }

    /// `start_time <= time < end_time`
    #[must_use]
    pub fn contains(&self, time: &str) -> bool {
        self.start_time.as_str() <= time && time < self.end_time.as_str()
    }

    pub(crate) fn same_slot(&self, day: &str, start_time: &str) -> bool {
        self.is_on(day) && self.start_time == start_time
    }
}

impl fmt::Display for StrategicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start_time, self.end_time)
    }
}

/// Parses a 24-hour time and renders it zero-padded (`9:05` becomes `09:05`).
pub fn normalize_time(value: &str) -> Result<String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| Error::InvalidTime {
            value: value.to_string(),
        })
}

/// Non-blocking feedback about a proposed strategic slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// No strategic block exists on the candidate day
    NoProtectedBlock {
        /// Candidate day
        day: String,
    },
    /// Blocks exist on the day but none covers the candidate time
    OutsideProtectedHours {
        /// Candidate day
        day: String,
        /// Candidate start time
        time: String,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProtectedBlock { day } => {
                write!(f, "No protected strategic block on {day}")
            }
            Self::OutsideProtectedHours { day, time } => {
                write!(f, "{time} on {day} is outside protected hours")
            }
        }
    }
}

/// Checks a candidate start time against the strategic blocks for `day`.
///
/// Returns an empty list when the slot is aligned. `candidate_start` is expected
/// in normalised `HH:MM` form.
#[must_use]
pub fn check_alignment(
    blocks: &[StrategicBlock],
    day: &str,
    candidate_start: &str,
) -> Vec<Advisory> {
    let mut on_day = blocks.iter().filter(|b| b.is_on(day)).peekable();

    if on_day.peek().is_none() {
        return vec![Advisory::NoProtectedBlock {
            day: day.trim().to_string(),
        }];
    }

    if on_day.any(|b| b.contains(candidate_start)) {
        Vec::new()
    } else {
        vec![Advisory::OutsideProtectedHours {
            day: day.trim().to_string(),
            time: candidate_start.to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn monday_morning() -> Vec<StrategicBlock> {
        vec![StrategicBlock::new("Monday", "09:00", "12:00").unwrap()]
    }

    #[test]
    fn test_aligned_slot_has_no_advisory() {
        assert!(check_alignment(&monday_morning(), "Monday", "10:00").is_empty());
    }

    #[test]
    fn test_outside_hours_advises() {
        let advisories = check_alignment(&monday_morning(), "Monday", "13:00");
        assert_eq!(
            advisories,
            vec![Advisory::OutsideProtectedHours {
                day: "Monday".to_string(),
                time: "13:00".to_string(),
            }]
        );
    }

    #[test]
    fn test_block_bounds_are_half_open() {
        let blocks = monday_morning();
        assert!(check_alignment(&blocks, "Monday", "09:00").is_empty());
        assert_eq!(check_alignment(&blocks, "Monday", "12:00").len(), 1);
    }

    #[test]
    fn test_no_block_on_day() {
        let advisories = check_alignment(&monday_morning(), "Tuesday", "10:00");
        assert_eq!(
            advisories,
            vec![Advisory::NoProtectedBlock {
                day: "Tuesday".to_string()
            }]
        );
    }

    #[test]
    fn test_day_match_ignores_case() {
        assert!(check_alignment(&monday_morning(), "monday", "11:59").is_empty());
    }

    #[test]
    fn test_any_matching_block_is_enough() {
        let mut blocks = monday_morning();
        blocks.push(StrategicBlock::new("Monday", "14:00", "16:00").unwrap());
        assert!(check_alignment(&blocks, "Monday", "15:00").is_empty());
    }

    #[test]
    fn test_block_validation() {
        assert_eq!(
            StrategicBlock::new("Monday", "9:00", "12:00").unwrap().start_time,
            "09:00"
        );
        assert!(StrategicBlock::new("Monday", "12:00", "09:00").is_err());
        assert!(StrategicBlock::new("Monday", "25:00", "26:00").is_err());
        assert!(StrategicBlock::new(" ", "09:00", "10:00").is_err());
    }
}
