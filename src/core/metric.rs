//! Metric model - lead and lag indicators tracked against a goal.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a metric measures effort (lead) or outcome (lag).
///
/// Informational only; both kinds are tracked the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MetricKind {
    /// Effort indicator
    Lead,
    /// Outcome indicator
    #[default]
    Lag,
}

impl MetricKind {
    /// Stored/displayed label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Lag => "Lag",
        }
    }

    /// Parses a stored label, case-insensitively
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "lead" => Some(Self::Lead),
            "lag" => Some(Self::Lag),
            _ => None,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An indicator tracked from a starting value toward a target
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Unique within the owning goal
    pub id: String,
    /// What is being measured
    pub title: String,
    /// Lead or lag
    pub kind: MetricKind,
    /// Value when tracking began
    pub starting_value: f64,
    /// Value that counts as success
    pub target_value: f64,
    /// Latest recorded value
    pub current_value: f64,
    /// Unit label (e.g. "$", "leads")
    pub unit: String,
    /// When `current_value` was last recorded
    pub last_updated: Option<NaiveDate>,
}

impl Metric {
    /// Creates a metric whose current value equals its starting value.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: MetricKind,
        starting_value: f64,
        target_value: f64,
        unit: impl Into<String>,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::Validation {
                message: "Metric title cannot be empty".to_string(),
            });
        }
        if !starting_value.is_finite() || !target_value.is_finite() {
            return Err(Error::Validation {
                message: "Metric values must be finite numbers".to_string(),
            });
        }

        Ok(Self {
            id: id.into(),
            title: title.trim().to_string(),
            kind,
            starting_value,
            target_value,
            current_value: starting_value,
            unit: unit.into(),
            last_updated: None,
        })
    }

    /// Progress from the starting value toward the target, as a percentage.
    ///
    /// When target equals start there is no distance to cover: the metric is at
    /// 100% once the current value reaches the target and 0% otherwise.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn percent_to_target(&self) -> f64 {
        if self.target_value == self.starting_value {
            return if self.current_value >= self.target_value {
                100.0
            } else {
                0.0
            };
        }

        (self.current_value - self.starting_value) / (self.target_value - self.starting_value)
            * 100.0
    }

    /// Records a new current value
    pub fn record_value(&mut self, value: f64, today: NaiveDate) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::Validation {
                message: format!("Metric value must be a finite number, got {value}"),
            });
        }
        self.current_value = value;
        self.last_updated = Some(today);
        Ok(())
    }
}
