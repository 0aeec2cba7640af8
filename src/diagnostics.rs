//! Store diagnostics for `--diagnose`.
//!
//! Walks the same path the bot takes on startup (connect, find the tables, read
//! the tactics back) and reports each step with the raw error and a hint, so an
//! operator can tell a bad path from a permissions problem from an empty store.

use crate::{
    config::database,
    core::{reconcile, store},
    errors::{Error, Result},
};
use chrono::Local;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use std::fmt::Write;

/// Outcome of one diagnostic step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step succeeded
    Ok,
    /// Step succeeded but found something worth attention
    Warn,
    /// Step failed
    Fail,
}

impl StepStatus {
    const fn marker(self) -> &'static str {
        match self {
            Self::Ok => "✅",
            Self::Warn => "⚠️",
            Self::Fail => "❌",
        }
    }
}

/// One step of the diagnostic run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticStep {
    /// What was checked
    pub name: &'static str,
    /// How it went
    pub status: StepStatus,
    /// Result detail or raw error
    pub detail: String,
    /// What to do about a warning or failure
    pub hint: Option<&'static str>,
}

/// All steps in the order they ran
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    /// Steps run so far
    pub steps: Vec<DiagnosticStep>,
}

impl DiagnosticReport {
    /// True when no step failed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.status != StepStatus::Fail)
    }

    /// Text rendering for the terminal
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for step in &self.steps {
            writeln!(&mut out, "{} {}: {}", step.status.marker(), step.name, step.detail)?;
            if let Some(hint) = step.hint {
                writeln!(&mut out, "   hint: {hint}")?;
            }
        }
        writeln!(
            &mut out,
            "{}",
            if self.passed() { "Diagnostics passed" } else { "Diagnostics FAILED" }
        )?;
        Ok(out)
    }
}

/// Connects to `database_url` and runs every check against it
pub async fn run_diagnostics(database_url: &str) -> DiagnosticReport {
    let mut report = DiagnosticReport::default();

    let db = match database::connect(database_url).await {
        Ok(db) => {
            report.steps.push(DiagnosticStep {
                name: "Connect",
                status: StepStatus::Ok,
                detail: format!("Connected to {database_url}"),
                hint: None,
            });
            db
        }
        Err(Error::Connection { message, hint }) => {
            report.steps.push(DiagnosticStep {
                name: "Connect",
                status: StepStatus::Fail,
                detail: message,
                hint: Some(hint),
            });
            return report;
        }
        Err(e) => {
            report.steps.push(DiagnosticStep {
                name: "Connect",
                status: StepStatus::Fail,
                detail: e.to_string(),
                hint: None,
            });
            return report;
        }
    };

    report.steps.extend(diagnose_connection(&db).await);
    report
}

/// Table and read-back checks against an open connection
pub async fn diagnose_connection(db: &DatabaseConnection) -> Vec<DiagnosticStep> {
    let mut steps = Vec::new();

    match list_tables(db).await {
        Ok(tables) => {
            let missing: Vec<&str> = reconcile::RowGroup::ALL
                .iter()
                .map(|g| g.table_name())
                .filter(|name| !tables.iter().any(|t| t == name))
                .collect();
            steps.push(if missing.is_empty() {
                DiagnosticStep {
                    name: "Tables",
                    status: StepStatus::Ok,
                    detail: format!("Found {}", tables.join(", ")),
                    hint: None,
                }
            } else {
                DiagnosticStep {
                    name: "Tables",
                    status: StepStatus::Warn,
                    detail: format!("Missing {}", missing.join(", ")),
                    hint: Some("Missing tables load as empty; start the bot once to create them"),
                }
            });
        }
        Err(e) => steps.push(DiagnosticStep {
            name: "Tables",
            status: StepStatus::Fail,
            detail: e.to_string(),
            hint: Some("The database could not be queried; check that it is a SQLite file"),
        }),
    }

    match store::load_tables(db).await {
        Ok(tables) => {
            let outcome = reconcile::rebuild_detailed(&tables, Local::now().date_naive());
            let status = if outcome.dropped.is_empty() {
                StepStatus::Ok
            } else {
                StepStatus::Warn
            };
            steps.push(DiagnosticStep {
                name: "Read tactics",
                status,
                detail: format!(
                    "{} rows, {} goals, {} tactics, {} rows dropped",
                    tables.tactics.len(),
                    outcome.cycle.goals.len(),
                    outcome.cycle.all_tactics().count(),
                    outcome.dropped.len()
                ),
                hint: (status == StepStatus::Warn)
                    .then_some("Dropped rows are listed in the log at warn level"),
            });
        }
        Err(e) => steps.push(DiagnosticStep {
            name: "Read tactics",
            status: StepStatus::Fail,
            detail: e.to_string(),
            hint: Some("Reading failed for a reason other than a missing table"),
        }),
    }

    steps
}

async fn list_tables(db: &DatabaseConnection) -> Result<Vec<String>> {
    let backend = db.get_database_backend();
    let rows = db
        .query_all(Statement::from_string(
            backend,
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        ))
        .await?;

    rows.iter()
        .map(|row| row.try_get::<String>("", "name").map_err(Into::into))
        .collect()
}
