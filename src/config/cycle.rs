//! Cycle configuration loading from config.toml
//!
//! The config file carries the score threshold plus a seed plan (vision,
//! strategic blocks, goals with their tactics and metrics). The seed plan is only
//! applied when the store holds no goals yet, so editing config.toml never
//! overwrites a cycle that is already in use.

use crate::{
    core::{
        alignment::StrategicBlock,
        cycle::{Cycle, VisionKind},
        metric::{Metric, MetricKind},
        score::DEFAULT_SCORE_THRESHOLD,
        tactic::{BlockType, Tactic},
    },
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "TWELVE_WEEK_CONFIG";
/// Config file used when the variable is unset
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Weekly score at or above which a week is on track
    pub score_threshold: f64,
    /// Vision statements
    pub vision: VisionConfig,
    /// Protected strategic blocks
    pub strategic_blocks: Vec<BlockConfig>,
    /// Goals to seed an empty store with
    pub goals: Vec<GoalConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            vision: VisionConfig::default(),
            strategic_blocks: Vec::new(),
            goals: Vec::new(),
        }
    }
}

/// `[vision]` table
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Three-year vision
    pub three_year: String,
    /// One-year vision
    pub one_year: String,
}

/// `[[strategic_blocks]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockConfig {
    /// Day of week
    pub day: String,
    /// `HH:MM` start
    pub start: String,
    /// `HH:MM` end
    pub end: String,
}

/// `[[goals]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalConfig {
    /// Goal title
    pub title: String,
    /// Tactics in the goal
    #[serde(default)]
    pub tactics: Vec<TacticConfig>,
    /// Metrics tracked for the goal
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

/// `[[goals.tactics]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TacticConfig {
    /// Tactic title
    pub title: String,
    /// Due week (1-13)
    pub week: i64,
    /// Block type; defaults to `None`
    #[serde(default)]
    pub block_type: BlockType,
}

/// `[[goals.metrics]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricConfig {
    /// Metric title
    pub title: String,
    /// `Lead` or `Lag`; defaults to `Lag`
    #[serde(default)]
    pub kind: MetricKind,
    /// Starting value
    #[serde(default)]
    pub starting_value: f64,
    /// Target value
    pub target_value: f64,
    /// Unit label
    #[serde(default)]
    pub unit: String,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!(
            "Failed to read config file {}: {e}",
            path.as_ref().display()
        ),
    })?;

    parse_config(&contents)
}

/// Parses config.toml contents
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if !(0.0..=100.0).contains(&config.score_threshold) {
        return Err(Error::Config {
            message: format!(
                "score_threshold must be between 0 and 100, got {}",
                config.score_threshold
            ),
        });
    }
    Ok(config)
}

/// Loads configuration from `$TWELVE_WEEK_CONFIG` or ./config.toml.
///
/// A missing file is not an error: the defaults (85% threshold, nothing to seed)
/// are used instead.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        warn!("No config file at {path}, using defaults");
        return Ok(AppConfig::default());
    }
    info!("Loading configuration from {path}");
    load_config(path)
}

/// Seeds an empty cycle from the config's plan.
///
/// Returns `false` without touching the cycle when it already has goals.
pub fn seed_cycle(cycle: &mut Cycle, config: &AppConfig) -> Result<bool> {
    if !cycle.goals.is_empty() {
        return Ok(false);
    }

    for goal_config in &config.goals {
        let goal_id = cycle.add_goal(goal_config.title.as_str())?;

        for t in &goal_config.tactics {
            let tactic = Tactic::new(cycle.next_tactic_id(), t.title.as_str(), t.week, t.block_type)?;
            cycle.goal_mut(&goal_id)?.add_tactic(tactic)?;
        }

        for m in &goal_config.metrics {
            let metric = Metric::new(
                cycle.next_metric_id(),
                m.title.as_str(),
                m.kind,
                m.starting_value,
                m.target_value,
                m.unit.as_str(),
            )?;
            cycle.goal_mut(&goal_id)?.add_metric(metric)?;
        }
    }

    if cycle.three_year_vision.is_empty() {
        cycle.set_vision(VisionKind::ThreeYear, config.vision.three_year.trim());
    }
    if cycle.one_year_vision.is_empty() {
        cycle.set_vision(VisionKind::OneYear, config.vision.one_year.trim());
    }

    for b in &config.strategic_blocks {
        let block = StrategicBlock::new(b.day.as_str(), &b.start, &b.end)?;
        if let Err(e) = cycle.add_strategic_block(block) {
            warn!("Skipping configured block: {e}");
        }
    }

    info!(
        goals = cycle.goals.len(),
        tactics = cycle.all_tactics().count(),
        "Seeded cycle from config"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{date, sample_cycle};

    const SAMPLE: &str = r#"
        score_threshold = 80.0

        [vision]
        three_year = "Run an independent studio"
        one_year = "Ship two products"

        [[strategic_blocks]]
        day = "Monday"
        start = "9:00"
        end = "12:00"

        [[goals]]
        title = "Launch the beta"

          [[goals.tactics]]
          title = "Write landing page"
          week = 1
          block_type = "Strategic"

          [[goals.tactics]]
          title = "Email 20 testers"
          week = 2

          [[goals.metrics]]
          title = "Signups"
          kind = "Lag"
          target_value = 100.0
          unit = "users"

        [[goals]]
        title = "Get fit"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.score_threshold, 80.0);
        assert_eq!(config.vision.one_year, "Ship two products");
        assert_eq!(config.strategic_blocks.len(), 1);
        assert_eq!(config.goals.len(), 2);
        assert_eq!(config.goals[0].tactics[0].block_type, BlockType::Strategic);
        assert_eq!(config.goals[0].tactics[1].block_type, BlockType::None);
        assert_eq!(config.goals[0].metrics[0].starting_value, 0.0);
        assert!(config.goals[1].tactics.is_empty());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.score_threshold, DEFAULT_SCORE_THRESHOLD);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            parse_config("score_threshold = 150.0"),
            Err(Error::Config { .. })
        ));
        assert!(parse_config("[[goals]]\nname = \"no title\"").is_err());
        assert!(parse_config("not toml at all [").is_err());
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(load_config("/definitely/not/here/config.toml").is_err());
    }

    #[test]
    fn test_seed_empty_cycle() {
        let config = parse_config(SAMPLE).unwrap();
        let mut cycle = Cycle::new("current", date(2025, 1, 6));

        assert!(seed_cycle(&mut cycle, &config).unwrap());

        assert_eq!(cycle.goals.len(), 2);
        let beta = cycle.goal("g1").unwrap();
        assert_eq!(beta.tactics.len(), 2);
        assert_eq!(beta.tactics[0].id, "t1");
        assert_eq!(beta.tactics[1].id, "t2");
        assert_eq!(beta.metrics[0].id, "m1");
        assert_eq!(cycle.three_year_vision, "Run an independent studio");
        assert_eq!(cycle.strategic_blocks[0].start_time, "09:00");
    }

    #[test]
    fn test_seed_skips_cycle_with_goals() {
        let config = parse_config(SAMPLE).unwrap();
        let mut cycle = sample_cycle();
        let before = cycle.clone();

        assert!(!seed_cycle(&mut cycle, &config).unwrap());
        assert_eq!(cycle, before);
    }
}
