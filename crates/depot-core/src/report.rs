//! Per-run outcome reporting.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Denial;
use crate::index::MergeAction;

/// What happened to one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Relocated, merged into the index, staging removed.
    Published {
        bundle_id: String,
        action: MergeAction,
        category: String,
        version: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size_bytes: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },

    /// Refused; staging left in place.
    Denied {
        bundle_id: String,
        denial: Denial,
    },

    /// Relocation failed part way; staging left in place, index untouched.
    Failed { bundle_id: String, message: String },
}

impl SubmissionOutcome {
    pub fn bundle_id(&self) -> &str {
        match self {
            Self::Published { bundle_id, .. }
            | Self::Denied { bundle_id, .. }
            | Self::Failed { bundle_id, .. } => bundle_id,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Summary of one processing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Outcomes in processing order.
    pub outcomes: Vec<SubmissionOutcome>,

    /// Whether the index file was rewritten.
    pub index_written: bool,
}

impl RunReport {
    pub fn new(
        started_at: DateTime<Utc>,
        outcomes: Vec<SubmissionOutcome>,
        index_written: bool,
    ) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            outcomes,
            index_written,
        }
    }

    pub fn published(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_published()).count()
    }

    pub fn denied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SubmissionOutcome::Denied { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SubmissionOutcome::Failed { .. }))
            .count()
    }

    /// Whether any submission was denied or failed.
    pub fn has_rejections(&self) -> bool {
        self.denied() + self.failed() > 0
    }
}
