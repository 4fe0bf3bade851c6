use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::completion::{project_progress, ProjectProgress};
use super::domain::{MilestoneDefinition, MilestoneKey, MilestoneRecord};
use crate::workflows::ids::{AgentId, LeadId, ProjectId};
use crate::workflows::storage::RepositoryError;

/// Installation project with the milestone template it was opened with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: ProjectId,
    pub lead_id: LeadId,
    pub agent_id: Option<AgentId>,
    /// Contract value commissions are computed from.
    pub project_gross_value: f64,
    pub definitions: Vec<MilestoneDefinition>,
    pub milestones: Vec<MilestoneRecord>,
    pub opened_at: DateTime<Utc>,
}

impl ProjectRecord {
    pub fn milestone(&self, key: MilestoneKey) -> Option<&MilestoneRecord> {
        self.milestones.iter().find(|record| record.key == key)
    }

    pub fn progress(&self) -> ProjectProgress {
        project_progress(&self.milestones)
    }

    /// Stores a completed record in place of the pending one.
    ///
    /// Fails with a conflict when the milestone is already completed, so
    /// repositories can run it inside their write lock as a check-and-set.
    pub fn apply_completion(&mut self, completed: MilestoneRecord) -> Result<(), RepositoryError> {
        match self
            .milestones
            .iter_mut()
            .find(|record| record.key == completed.key)
        {
            Some(existing) if existing.is_completed() => Err(RepositoryError::Conflict),
            Some(existing) => {
                *existing = completed;
                Ok(())
            }
            None => {
                self.milestones.push(completed);
                Ok(())
            }
        }
    }

    pub fn view(&self) -> ProjectView {
        let milestones = self
            .definitions
            .iter()
            .map(|definition| {
                let record = self.milestone(definition.key);
                MilestoneView {
                    key: definition.key,
                    label: definition.label.clone(),
                    sequence_order: definition.sequence_order,
                    status: record
                        .map(|record| record.status().label())
                        .unwrap_or("pending"),
                    completed_at: record.and_then(|record| record.completed_at),
                    completed_by: record.and_then(|record| record.completed_by.clone()),
                }
            })
            .collect();

        ProjectView {
            project_id: self.project_id.clone(),
            lead_id: self.lead_id.clone(),
            agent_id: self.agent_id.clone(),
            project_gross_value: self.project_gross_value,
            progress: self.progress(),
            milestones,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub project_id: ProjectId,
    pub lead_id: LeadId,
    pub agent_id: Option<AgentId>,
    pub project_gross_value: f64,
    pub progress: ProjectProgress,
    pub milestones: Vec<MilestoneView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MilestoneView {
    pub key: MilestoneKey,
    pub label: String,
    pub sequence_order: u32,
    pub status: &'static str,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
}

/// Project storage.
///
/// `record_completion` is the only write that races: implementations must
/// apply it atomically (see [`ProjectRecord::apply_completion`]) and return
/// [`RepositoryError::Conflict`] when another request completed it first.
pub trait ProjectRepository: Send + Sync {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError>;
    fn fetch(&self, project_id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError>;
    fn find_by_lead(&self, lead_id: &LeadId) -> Result<Option<ProjectRecord>, RepositoryError>;
    fn record_completion(
        &self,
        project_id: &ProjectId,
        completed: MilestoneRecord,
    ) -> Result<ProjectRecord, RepositoryError>;
}
