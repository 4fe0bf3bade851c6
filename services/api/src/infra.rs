use metrics_exporter_prometheus::PrometheusHandle;
use solar_crm::workflows::commissions::{
    CommissionLedger, CommissionSchedule, CommissionUnlock,
};
use solar_crm::workflows::projects::{
    MilestoneKey, MilestoneRecord, ProjectRecord, ProjectRepository,
};
use solar_crm::workflows::proposals::{ProposalRecord, ProposalRepository, QualificationRecord};
use solar_crm::workflows::{AgentId, LeadId, ModelAssumptions, ProjectId, RepositoryError};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) assumptions: ModelAssumptions,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{name} lock poisoned")))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProposalRepository {
    qualifications: Arc<Mutex<HashMap<LeadId, QualificationRecord>>>,
    proposals: Arc<Mutex<HashMap<LeadId, Vec<ProposalRecord>>>>,
}

impl ProposalRepository for InMemoryProposalRepository {
    fn save_qualification(&self, record: QualificationRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.qualifications, "qualification")?;
        guard.insert(record.lead_id().clone(), record);
        Ok(())
    }

    fn latest_qualification(
        &self,
        lead_id: &LeadId,
    ) -> Result<Option<QualificationRecord>, RepositoryError> {
        let guard = lock(&self.qualifications, "qualification")?;
        Ok(guard.get(lead_id).cloned())
    }

    fn save_proposal(&self, record: ProposalRecord) -> Result<ProposalRecord, RepositoryError> {
        let mut guard = lock(&self.proposals, "proposal")?;
        guard
            .entry(record.proposal.lead_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn proposals_for(&self, lead_id: &LeadId) -> Result<Vec<ProposalRecord>, RepositoryError> {
        let guard = lock(&self.proposals, "proposal")?;
        Ok(guard.get(lead_id).cloned().unwrap_or_default())
    }
}

/// Completions are applied under the same lock that reads the record, so two
/// racing requests cannot both complete one milestone. Inserts check the lead
/// under that lock as well.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProjectRepository {
    records: Arc<Mutex<HashMap<ProjectId, ProjectRecord>>>,
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        let mut guard = lock(&self.records, "project")?;
        if guard.contains_key(&record.project_id)
            || guard.values().any(|existing| existing.lead_id == record.lead_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.project_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, project_id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        let guard = lock(&self.records, "project")?;
        Ok(guard.get(project_id).cloned())
    }

    fn find_by_lead(&self, lead_id: &LeadId) -> Result<Option<ProjectRecord>, RepositoryError> {
        let guard = lock(&self.records, "project")?;
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
        let mut guard = lock(&self.records, "project")?;
        let record = guard.get_mut(project_id).ok_or(RepositoryError::NotFound)?;
        record.apply_completion(completed)?;
        Ok(record.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCommissionLedger {
    unlocks: Arc<Mutex<Vec<CommissionUnlock>>>,
}

impl CommissionLedger for InMemoryCommissionLedger {
    fn record_unlock(&self, unlock: CommissionUnlock) -> Result<CommissionUnlock, RepositoryError> {
        let mut guard = lock(&self.unlocks, "commission ledger")?;
        let duplicate = guard.iter().any(|existing| {
            existing.project_id == unlock.project_id
                && existing.milestone_key == unlock.milestone_key
        });
        if duplicate {
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
        let guard = lock(&self.unlocks, "commission ledger")?;
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
        let guard = lock(&self.unlocks, "commission ledger")?;
        Ok(guard
            .iter()
            .filter(|unlock| &unlock.agent_id == agent_id)
            .cloned()
            .collect())
    }
}

/// Payout split used by the demo when no `COMMISSION_PCT_*` values are set.
pub(crate) fn demo_commission_schedule() -> CommissionSchedule {
    CommissionSchedule::default()
        .with_percent(MilestoneKey::Close, 0.02)
        .with_percent(MilestoneKey::InstallComplete, 0.03)
        .with_percent(MilestoneKey::PtoGranted, 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use solar_crm::workflows::commissions::create_commission_unlock;
    use solar_crm::workflows::projects::ProjectBlueprint;

    fn project(id: &str, lead: &str) -> ProjectRecord {
        let blueprint = ProjectBlueprint::standard();
        ProjectRecord {
            project_id: ProjectId(id.to_string()),
            lead_id: LeadId(lead.to_string()),
            agent_id: Some(AgentId("agent-7".to_string())),
            project_gross_value: 20_000.0,
            definitions: blueprint.definitions().to_vec(),
            milestones: blueprint.initial_records(),
            opened_at: Utc::now(),
        }
    }

    fn completed(key: MilestoneKey) -> MilestoneRecord {
        MilestoneRecord {
            key,
            completed_at: Some(Utc::now()),
            completed_by: Some("crew".to_string()),
        }
    }

    #[test]
    fn second_completion_of_a_milestone_conflicts() {
        let repository = InMemoryProjectRepository::default();
        repository.insert(project("p-1", "lead-1")).expect("insert");
        let id = ProjectId("p-1".to_string());

        let updated = repository
            .record_completion(&id, completed(MilestoneKey::Close))
            .expect("first completion");
        assert_eq!(updated.progress().completed, 1);

        assert_eq!(
            repository.record_completion(&id, completed(MilestoneKey::Close)),
            Err(RepositoryError::Conflict)
        );
        let missing = ProjectId("p-404".to_string());
        assert_eq!(
            repository.record_completion(&missing, completed(MilestoneKey::Close)),
            Err(RepositoryError::NotFound)
        );
    }

    #[test]
    fn projects_are_found_by_lead() {
        let repository = InMemoryProjectRepository::default();
        repository.insert(project("p-1", "lead-1")).expect("insert");
        assert!(repository.insert(project("p-1", "lead-2")).is_err());
        assert_eq!(
            repository.insert(project("p-2", "lead-1")),
            Err(RepositoryError::Conflict)
        );

        let found = repository
            .find_by_lead(&LeadId("lead-1".to_string()))
            .expect("lookup");
        assert_eq!(found.map(|record| record.project_id.0), Some("p-1".to_string()));
    }

    #[test]
    fn ledger_rejects_duplicate_unlocks() {
        let ledger = InMemoryCommissionLedger::default();
        let unlock = create_commission_unlock(
            ProjectId("p-1".to_string()),
            AgentId("agent-7".to_string()),
            MilestoneKey::Close,
            20_000.0,
            0.02,
            Utc::now(),
        );
        ledger.record_unlock(unlock.clone()).expect("first unlock");
        assert_eq!(ledger.record_unlock(unlock), Err(RepositoryError::Conflict));

        let agent = AgentId("agent-7".to_string());
        assert_eq!(ledger.unlocks_for_agent(&agent).expect("list").len(), 1);
        assert!(ledger
            .unlock_for(&ProjectId("p-1".to_string()), MilestoneKey::SiteSurvey)
            .expect("lookup")
            .is_none());
    }
}
