use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::assumptions::ModelAssumptions;
use crate::workflows::ids::LeadId;
use crate::workflows::proposals::repository::{
    ProposalRecord, ProposalRepository, QualificationRecord,
};
use crate::workflows::proposals::service::{ProposalRequest, ProposalService};
use crate::workflows::solar::RoofMeasurement;
use crate::workflows::storage::RepositoryError;

pub(super) fn reference_roof() -> RoofMeasurement {
    RoofMeasurement::new(50.0, 1500.0, 15.0)
}

pub(super) fn request() -> ProposalRequest {
    ProposalRequest {
        system_cost_per_kw: 2850.0,
        loan_apr_fraction: 0.055,
        loan_term_years: 10,
        ppa_rate_per_kwh: 0.0,
        utility_rate_override: None,
        current_monthly_bill: 200.0,
        address: Some("410 W Van Buren St, Phoenix, AZ 85001".to_string()),
    }
}

pub(super) fn build_service() -> (ProposalService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ProposalService::new(repository.clone(), ModelAssumptions::default());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    qualifications: Arc<Mutex<HashMap<LeadId, QualificationRecord>>>,
    proposals: Arc<Mutex<HashMap<LeadId, Vec<ProposalRecord>>>>,
}

impl MemoryRepository {
    pub(super) fn proposal_count(&self) -> usize {
        self.proposals
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl ProposalRepository for MemoryRepository {
    fn save_qualification(&self, record: QualificationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.qualifications.lock().expect("repository mutex poisoned");
        guard.insert(record.lead_id().clone(), record);
        Ok(())
    }

    fn latest_qualification(
        &self,
        lead_id: &LeadId,
    ) -> Result<Option<QualificationRecord>, RepositoryError> {
        let guard = self.qualifications.lock().expect("repository mutex poisoned");
        Ok(guard.get(lead_id).cloned())
    }

    fn save_proposal(&self, record: ProposalRecord) -> Result<ProposalRecord, RepositoryError> {
        let mut guard = self.proposals.lock().expect("repository mutex poisoned");
        guard
            .entry(record.proposal.lead_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn proposals_for(&self, lead_id: &LeadId) -> Result<Vec<ProposalRecord>, RepositoryError> {
        let guard = self.proposals.lock().expect("repository mutex poisoned");
        Ok(guard.get(lead_id).cloned().unwrap_or_default())
    }
}

pub(super) struct UnavailableRepository;

impl ProposalRepository for UnavailableRepository {
    fn save_qualification(&self, _record: QualificationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest_qualification(
        &self,
        _lead_id: &LeadId,
    ) -> Result<Option<QualificationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_proposal(&self, _record: ProposalRecord) -> Result<ProposalRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn proposals_for(&self, _lead_id: &LeadId) -> Result<Vec<ProposalRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
