//! Append-only JSONL decision log.
//!
//! One line per resolved ticket: the full outcome plus, for escalations,
//! the private note handed to the ticketing backend.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use resolution::ResolutionOutcome;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A single line of the decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_note: Option<String>,
}

impl From<&ResolutionOutcome> for DecisionRecord {
    fn from(outcome: &ResolutionOutcome) -> Self {
        Self {
            escalation_note: outcome.escalation_note(),
            outcome: outcome.clone(),
        }
    }
}

pub struct DecisionLog {
    path: PathBuf,
}

impl DecisionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append outcomes, one JSON object per line. Returns lines written.
    pub fn append(&self, outcomes: &[ResolutionOutcome]) -> Result<usize> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open decision log {}", self.path.display()))?;

        for outcome in outcomes {
            let json = serde_json::to_string(&DecisionRecord::from(outcome))
                .context("Failed to serialize decision")?;
            writeln!(file, "{json}").context("Failed to append decision")?;
        }

        info!(path = %self.path.display(), count = outcomes.len(), "Appended decisions");
        Ok(outcomes.len())
    }

    /// Read every record back. Blank lines are skipped.
    pub fn read(&self) -> Result<Vec<DecisionRecord>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open decision log {}", self.path.display()))?;
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: DecisionRecord = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}: invalid record", self.path.display(), idx + 1))?;
            records.push(record);
        }
        Ok(records)
    }
}
