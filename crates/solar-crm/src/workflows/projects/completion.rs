use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{MilestoneDefinition, MilestoneKey, MilestoneRecord};

/// Why a milestone could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MilestoneError {
    #[error("Milestone not found")]
    NotFound { key: MilestoneKey },
    #[error("Milestone already completed")]
    AlreadyCompleted { key: MilestoneKey },
    #[error("Dependency not met: {label}")]
    DependencyNotMet {
        key: MilestoneKey,
        blocking: MilestoneKey,
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneCompletion {
    pub record: MilestoneRecord,
    pub commission_unlock_key: Option<MilestoneKey>,
}

/// Checks a completion against the project's current records.
///
/// Rejections are checked in order: unknown key, already completed, then the
/// first earlier milestone (by sequence order) that is still open.
pub fn complete_milestone(
    key: MilestoneKey,
    completed_by: &str,
    current: &[MilestoneRecord],
    definitions: &[MilestoneDefinition],
    completed_at: DateTime<Utc>,
) -> Result<MilestoneCompletion, MilestoneError> {
    let target = definitions
        .iter()
        .find(|definition| definition.key == key)
        .ok_or(MilestoneError::NotFound { key })?;

    let is_completed = |candidate: MilestoneKey| {
        current
            .iter()
            .any(|record| record.key == candidate && record.is_completed())
    };

    if is_completed(key) {
        return Err(MilestoneError::AlreadyCompleted { key });
    }

    let mut prerequisites: Vec<&MilestoneDefinition> = definitions
        .iter()
        .filter(|definition| definition.sequence_order < target.sequence_order)
        .collect();
    prerequisites.sort_by_key(|definition| definition.sequence_order);

    if let Some(unmet) = prerequisites
        .into_iter()
        .find(|definition| !is_completed(definition.key))
    {
        return Err(MilestoneError::DependencyNotMet {
            key,
            blocking: unmet.key,
            label: unmet.label.clone(),
        });
    }

    Ok(MilestoneCompletion {
        record: MilestoneRecord {
            key,
            completed_at: Some(completed_at),
            completed_by: Some(completed_by.to_string()),
        },
        commission_unlock_key: target.commission_unlock_key,
    })
}

/// Success-flag rendering of a completion attempt for callers that expect one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_milestone: Option<MilestoneRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_unlock_key: Option<MilestoneKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<MilestoneCompletion, MilestoneError>> for MilestoneOutcome {
    fn from(result: Result<MilestoneCompletion, MilestoneError>) -> Self {
        match result {
            Ok(completion) => Self {
                success: true,
                updated_milestone: Some(completion.record),
                commission_unlock_key: completion.commission_unlock_key,
                error: None,
            },
            Err(error) => Self {
                success: false,
                updated_milestone: None,
                commission_unlock_key: None,
                error: Some(error.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectProgress {
    pub completed: usize,
    pub total: usize,
    pub percent_complete: u8,
}

pub fn project_progress(records: &[MilestoneRecord]) -> ProjectProgress {
    let total = records.len();
    let completed = records.iter().filter(|record| record.is_completed()).count();
    let percent_complete = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    };

    ProjectProgress {
        completed,
        total,
        percent_complete,
    }
}
