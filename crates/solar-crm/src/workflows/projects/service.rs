use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::blueprint::ProjectBlueprint;
use super::completion::{complete_milestone, MilestoneError, ProjectProgress};
use super::domain::{MilestoneKey, MilestoneRecord};
use super::repository::{ProjectRecord, ProjectRepository};
use crate::workflows::commissions::{
    create_commission_unlock, summarize, AgentCommissionSummary, CommissionConfig,
    CommissionLedger, CommissionUnlock,
};
use crate::workflows::ids::{AgentId, LeadId, ProjectId};
use crate::workflows::storage::RepositoryError;

/// Completions without a named actor are attributed to this user.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenProjectRequest {
    pub lead_id: LeadId,
    #[serde(default)]
    pub agent_id: Option<AgentId>,
    /// Contract value; when absent the lead's latest quoted gross cost is used.
    #[serde(default)]
    pub project_gross_value: Option<f64>,
}

/// Quoted contract values for leads opened without an explicit one.
pub trait GrossValueLookup: Send + Sync {
    fn latest_gross_value(&self, lead_id: &LeadId) -> Result<Option<f64>, RepositoryError>;
}

/// Outcome of [`ProjectService::open`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedProject {
    pub record: ProjectRecord,
    /// False when the lead already had a project.
    pub created: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteMilestoneRequest {
    #[serde(default)]
    pub completed_by: Option<String>,
    /// Payout fraction for this completion only, in `[0, 1]`.
    #[serde(default)]
    pub milestone_percent: Option<f64>,
    #[serde(default)]
    pub project_gross_value_override: Option<f64>,
}

impl CompleteMilestoneRequest {
    fn validate(&self) -> Result<(), ProjectServiceError> {
        if let Some(percent) = self.milestone_percent {
            if !(percent.is_finite() && (0.0..=1.0).contains(&percent)) {
                return Err(ProjectServiceError::InvalidOverride {
                    field: "milestone_percent",
                    value: percent,
                });
            }
        }
        if let Some(value) = self.project_gross_value_override {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ProjectServiceError::InvalidOverride {
                    field: "project_gross_value_override",
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Result of a completed milestone, including any commission it released.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneCompletionReport {
    pub project_id: ProjectId,
    pub milestone: MilestoneRecord,
    pub commission_unlock: Option<CommissionUnlock>,
    pub progress: ProjectProgress,
}

/// Service driving installation projects and the commissions they unlock.
pub struct ProjectService<R, L> {
    repository: Arc<R>,
    ledger: Arc<L>,
    blueprint: Arc<ProjectBlueprint>,
    commissions: CommissionConfig,
    gross_values: Option<Arc<dyn GrossValueLookup>>,
}

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_project_id() -> ProjectId {
    let id = PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProjectId(format!("project-{id:06}"))
}

impl<R, L> ProjectService<R, L>
where
    R: ProjectRepository + 'static,
    L: CommissionLedger + 'static,
{
    pub fn new(repository: Arc<R>, ledger: Arc<L>, commissions: CommissionConfig) -> Self {
        Self {
            repository,
            ledger,
            blueprint: Arc::new(ProjectBlueprint::standard()),
            commissions,
            gross_values: None,
        }
    }

    pub fn with_gross_value_lookup(mut self, lookup: Arc<dyn GrossValueLookup>) -> Self {
        self.gross_values = Some(lookup);
        self
    }

    pub fn with_blueprint(mut self, blueprint: ProjectBlueprint) -> Self {
        self.blueprint = Arc::new(blueprint);
        self
    }

    /// Open a project for a closed lead. A lead keeps a single project, so
    /// reopening returns the existing record.
    pub fn open(&self, request: OpenProjectRequest) -> Result<OpenedProject, ProjectServiceError> {
        if let Some(existing) = self.repository.find_by_lead(&request.lead_id)? {
            debug!(
                project_id = %existing.project_id,
                lead_id = %request.lead_id,
                "project already open"
            );
            return Ok(OpenedProject {
                record: existing,
                created: false,
            });
        }

        let project_gross_value = match request.project_gross_value {
            Some(value) if value.is_finite() => value.max(0.0),
            Some(_) => 0.0,
            None => self.quoted_gross_value(&request.lead_id)?,
        };

        let record = ProjectRecord {
            project_id: next_project_id(),
            lead_id: request.lead_id.clone(),
            agent_id: request.agent_id,
            project_gross_value,
            definitions: self.blueprint.definitions().to_vec(),
            milestones: self.blueprint.initial_records(),
            opened_at: Utc::now(),
        };

        let stored = match self.repository.insert(record) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                // Another request opened this lead between the lookup and the insert.
                let lead_id = &request.lead_id;
                let existing = self
                    .repository
                    .find_by_lead(lead_id)?
                    .ok_or(RepositoryError::Conflict)?;
                debug!(
                    project_id = %existing.project_id,
                    %lead_id,
                    "project opened concurrently"
                );
                return Ok(OpenedProject {
                    record: existing,
                    created: false,
                });
            }
            Err(other) => return Err(other.into()),
        };
        info!(
            project_id = %stored.project_id,
            lead_id = %stored.lead_id,
            milestones = stored.milestones.len(),
            project_gross_value = stored.project_gross_value,
            "project opened"
        );
        Ok(OpenedProject {
            record: stored,
            created: true,
        })
    }

    pub fn get(&self, project_id: &ProjectId) -> Result<ProjectRecord, ProjectServiceError> {
        let record = self
            .repository
            .fetch(project_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Complete a milestone and unlock its commission tranche.
    pub fn complete(
        &self,
        project_id: &ProjectId,
        key: MilestoneKey,
        request: CompleteMilestoneRequest,
    ) -> Result<MilestoneCompletionReport, ProjectServiceError> {
        request.validate()?;
        let project = self.get(project_id)?;
        let completed_by = request.completed_by.as_deref().unwrap_or(SYSTEM_ACTOR);

        let completion = match complete_milestone(
            key,
            completed_by,
            &project.milestones,
            &project.definitions,
            Utc::now(),
        ) {
            Ok(completion) => completion,
            Err(MilestoneError::AlreadyCompleted { .. }) => {
                return self.resume_unlock(&project, key, &request);
            }
            Err(error) => {
                warn!(%project_id, milestone = %key, %error, "milestone completion rejected");
                return Err(error.into());
            }
        };

        let updated = match self
            .repository
            .record_completion(project_id, completion.record.clone())
        {
            Ok(updated) => updated,
            Err(RepositoryError::Conflict) => {
                warn!(%project_id, milestone = %key, "milestone completed concurrently");
                return Err(MilestoneError::AlreadyCompleted { key }.into());
            }
            Err(other) => return Err(other.into()),
        };
        info!(%project_id, milestone = %key, completed_by, "milestone completed");

        let commission_unlock = match completion.commission_unlock_key {
            Some(unlock_key) => self.unlock_commission(&updated, unlock_key, &request)?,
            None => None,
        };

        Ok(MilestoneCompletionReport {
            project_id: updated.project_id.clone(),
            milestone: completion.record,
            commission_unlock,
            progress: updated.progress(),
        })
    }

    pub fn commission_summary(
        &self,
        agent_id: &AgentId,
    ) -> Result<AgentCommissionSummary, ProjectServiceError> {
        let records = self.ledger.unlocks_for_agent(agent_id)?;
        Ok(summarize(agent_id, &records))
    }

    fn quoted_gross_value(&self, lead_id: &LeadId) -> Result<f64, ProjectServiceError> {
        let quoted = match &self.gross_values {
            Some(lookup) => lookup.latest_gross_value(lead_id)?,
            None => None,
        };
        match quoted {
            Some(value) if value.is_finite() => Ok(value.max(0.0)),
            _ => Err(ProjectServiceError::MissingGrossValue(lead_id.clone())),
        }
    }

    /// A completed milestone whose unlock never reached the ledger gets the
    /// unlock written now; any other repeat completion is rejected.
    fn resume_unlock(
        &self,
        project: &ProjectRecord,
        key: MilestoneKey,
        request: &CompleteMilestoneRequest,
    ) -> Result<MilestoneCompletionReport, ProjectServiceError> {
        let rejected = MilestoneError::AlreadyCompleted { key };
        let unlock_key = project
            .definitions
            .iter()
            .find(|definition| definition.key == key)
            .and_then(|definition| definition.commission_unlock_key);
        let (Some(unlock_key), Some(milestone)) = (unlock_key, project.milestone(key).cloned())
        else {
            warn!(
                project_id = %project.project_id,
                milestone = %key,
                error = %rejected,
                "milestone completion rejected"
            );
            return Err(rejected.into());
        };

        match self.unlock_commission(project, unlock_key, request)? {
            Some(unlock) => {
                info!(
                    project_id = %project.project_id,
                    milestone = %key,
                    "recovered commission unlock for completed milestone"
                );
                Ok(MilestoneCompletionReport {
                    project_id: project.project_id.clone(),
                    milestone,
                    commission_unlock: Some(unlock),
                    progress: project.progress(),
                })
            }
            None => {
                warn!(
                    project_id = %project.project_id,
                    milestone = %key,
                    error = %rejected,
                    "milestone completion rejected"
                );
                Err(rejected.into())
            }
        }
    }

    fn unlock_commission(
        &self,
        project: &ProjectRecord,
        unlock_key: MilestoneKey,
        request: &CompleteMilestoneRequest,
    ) -> Result<Option<CommissionUnlock>, ProjectServiceError> {
        if !self.commissions.enabled {
            debug!(project_id = %project.project_id, "commission tracking disabled");
            return Ok(None);
        }

        let Some(agent_id) = project.agent_id.clone() else {
            warn!(
                project_id = %project.project_id,
                milestone = %unlock_key,
                "skipping commission unlock: no agent assigned"
            );
            return Ok(None);
        };

        if self
            .ledger
            .unlock_for(&project.project_id, unlock_key)?
            .is_some()
        {
            debug!(
                project_id = %project.project_id,
                milestone = %unlock_key,
                "commission already unlocked"
            );
            return Ok(None);
        }

        let percent = request
            .milestone_percent
            .unwrap_or_else(|| self.commissions.schedule.percent_for(unlock_key));
        let gross_value = request
            .project_gross_value_override
            .unwrap_or(project.project_gross_value);

        let unlock = create_commission_unlock(
            project.project_id.clone(),
            agent_id,
            unlock_key,
            gross_value,
            percent,
            Utc::now(),
        );

        match self.ledger.record_unlock(unlock) {
            Ok(stored) => {
                info!(
                    project_id = %stored.project_id,
                    agent_id = %stored.agent_id,
                    milestone = %unlock_key,
                    amount = stored.amount,
                    "commission unlocked"
                );
                Ok(Some(stored))
            }
            Err(RepositoryError::Conflict) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }
}

/// Error raised by the project service.
#[derive(Debug, thiserror::Error)]
pub enum ProjectServiceError {
    #[error(transparent)]
    Milestone(#[from] MilestoneError),
    #[error("no project gross value given and no proposal priced for lead {0}")]
    MissingGrossValue(LeadId),
    #[error("{field} override out of range: {value}")]
    InvalidOverride { field: &'static str, value: f64 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
