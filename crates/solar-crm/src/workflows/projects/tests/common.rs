use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::commissions::{
    CommissionConfig, CommissionLedger, CommissionSchedule, CommissionUnlock,
};
use crate::workflows::ids::{AgentId, LeadId, ProjectId};
use crate::workflows::projects::domain::{MilestoneKey, MilestoneRecord};
use crate::workflows::projects::repository::{ProjectRecord, ProjectRepository};
use crate::workflows::projects::service::{GrossValueLookup, OpenProjectRequest, ProjectService};
use crate::workflows::storage::RepositoryError;

pub(super) fn commission_config() -> CommissionConfig {
    CommissionConfig {
        enabled: true,
        schedule: CommissionSchedule::default()
            .with_percent(MilestoneKey::Close, 0.10)
            .with_percent(MilestoneKey::SiteSurvey, 0.05)
            .with_percent(MilestoneKey::PtoGranted, 0.20),
    }
}

pub(super) fn open_request(lead: &str, agent: Option<&str>) -> OpenProjectRequest {
    OpenProjectRequest {
        lead_id: LeadId(lead.to_string()),
        agent_id: agent.map(|agent| AgentId(agent.to_string())),
        project_gross_value: Some(28_500.0),
    }
}

pub(super) type TestService = ProjectService<MemoryProjects, MemoryLedger>;

pub(super) fn build_service() -> (TestService, Arc<MemoryProjects>, Arc<MemoryLedger>) {
    build_service_with(commission_config())
}

pub(super) fn build_service_with(
    config: CommissionConfig,
) -> (TestService, Arc<MemoryProjects>, Arc<MemoryLedger>) {
    let projects = Arc::new(MemoryProjects::default());
    let ledger = Arc::new(MemoryLedger::default());
    let service = ProjectService::new(projects.clone(), ledger.clone(), config);
    (service, projects, ledger)
}

#[derive(Default, Clone)]
pub(super) struct MemoryProjects {
    records: Arc<Mutex<HashMap<ProjectId, ProjectRecord>>>,
}

impl ProjectRepository for MemoryProjects {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.project_id)
            || guard.values().any(|existing| existing.lead_id == record.lead_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.project_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, project_id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(project_id).cloned())
    }

    fn find_by_lead(&self, lead_id: &LeadId) -> Result<Option<ProjectRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| &record.lead_id == lead_id)
            .cloned())
    }

    fn record_completion(
        &self,
        project_id: &ProjectId,
        completed: MilestoneRecord,
    ) -> Result<ProjectRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(project_id).ok_or(RepositoryError::NotFound)?;
        record.apply_completion(completed)?;
        Ok(record.clone())
    }
}

/// Accepts the dependency check and then loses the race on write.
pub(super) struct RacingProjects {
    pub(super) inner: MemoryProjects,
}

impl ProjectRepository for RacingProjects {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, project_id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        self.inner.fetch(project_id)
    }

    fn find_by_lead(&self, lead_id: &LeadId) -> Result<Option<ProjectRecord>, RepositoryError> {
        self.inner.find_by_lead(lead_id)
    }

    fn record_completion(
        &self,
        _project_id: &ProjectId,
        _completed: MilestoneRecord,
    ) -> Result<ProjectRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }
}

/// Misses the lead lookup once, as if a concurrent open had not landed yet.
pub(super) struct StaleLeadIndex {
    pub(super) inner: MemoryProjects,
    pub(super) missed: AtomicBool,
}

impl ProjectRepository for StaleLeadIndex {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, project_id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        self.inner.fetch(project_id)
    }

    fn find_by_lead(&self, lead_id: &LeadId) -> Result<Option<ProjectRecord>, RepositoryError> {
        if !self.missed.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_by_lead(lead_id)
    }

    fn record_completion(
        &self,
        project_id: &ProjectId,
        completed: MilestoneRecord,
    ) -> Result<ProjectRecord, RepositoryError> {
        self.inner.record_completion(project_id, completed)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLedger {
    unlocks: Arc<Mutex<Vec<CommissionUnlock>>>,
}

impl MemoryLedger {
    pub(super) fn unlocks(&self) -> Vec<CommissionUnlock> {
        self.unlocks.lock().expect("ledger mutex poisoned").clone()
    }
}

impl CommissionLedger for MemoryLedger {
    fn record_unlock(&self, unlock: CommissionUnlock) -> Result<CommissionUnlock, RepositoryError> {
        let mut guard = self.unlocks.lock().expect("ledger mutex poisoned");
        if guard.iter().any(|existing| {
            existing.project_id == unlock.project_id
                && existing.milestone_key == unlock.milestone_key
        }) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(unlock.clone());
        Ok(unlock)
    }

    fn unlock_for(
        &self,
        project_id: &ProjectId,
        milestone_key: MilestoneKey,
    ) -> Result<Option<CommissionUnlock>, RepositoryError> {
        let guard = self.unlocks.lock().expect("ledger mutex poisoned");
        Ok(guard
            .iter()
            .find(|unlock| {
                &unlock.project_id == project_id && unlock.milestone_key == milestone_key
            })
            .cloned())
    }

    fn unlocks_for_agent(
        &self,
        agent_id: &AgentId,
    ) -> Result<Vec<CommissionUnlock>, RepositoryError> {
        let guard = self.unlocks.lock().expect("ledger mutex poisoned");
        Ok(guard
            .iter()
            .filter(|unlock| &unlock.agent_id == agent_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableLedger;

impl CommissionLedger for UnavailableLedger {
    fn record_unlock(
        &self,
        _unlock: CommissionUnlock,
    ) -> Result<CommissionUnlock, RepositoryError> {
        Err(RepositoryError::Unavailable("ledger offline".to_string()))
    }

    fn unlock_for(
        &self,
        _project_id: &ProjectId,
        _milestone_key: MilestoneKey,
    ) -> Result<Option<CommissionUnlock>, RepositoryError> {
        Err(RepositoryError::Unavailable("ledger offline".to_string()))
    }

    fn unlocks_for_agent(
        &self,
        _agent_id: &AgentId,
    ) -> Result<Vec<CommissionUnlock>, RepositoryError> {
        Err(RepositoryError::Unavailable("ledger offline".to_string()))
    }
}

/// Drops the first unlock write, then records normally.
#[derive(Default)]
pub(super) struct FlakyLedger {
    pub(super) inner: MemoryLedger,
    failed: AtomicBool,
}

impl CommissionLedger for FlakyLedger {
    fn record_unlock(&self, unlock: CommissionUnlock) -> Result<CommissionUnlock, RepositoryError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("ledger timeout".to_string()));
        }
        self.inner.record_unlock(unlock)
    }

    fn unlock_for(
        &self,
        project_id: &ProjectId,
        milestone_key: MilestoneKey,
    ) -> Result<Option<CommissionUnlock>, RepositoryError> {
        self.inner.unlock_for(project_id, milestone_key)
    }

    fn unlocks_for_agent(
        &self,
        agent_id: &AgentId,
    ) -> Result<Vec<CommissionUnlock>, RepositoryError> {
        self.inner.unlocks_for_agent(agent_id)
    }
}

/// Quoted gross costs keyed by lead.
#[derive(Default)]
pub(super) struct QuotedValues {
    pub(super) quotes: HashMap<LeadId, f64>,
}

impl GrossValueLookup for QuotedValues {
    fn latest_gross_value(&self, lead_id: &LeadId) -> Result<Option<f64>, RepositoryError> {
        Ok(self.quotes.get(lead_id).copied())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
