use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::proposal::{CostBreakdown, Proposal};
use super::utility::UtilityRate;
use crate::workflows::ids::LeadId;
use crate::workflows::solar::{LeadQualification, RoofMeasurement};
use crate::workflows::storage::RepositoryError;

/// Stored qualification with the measurement it was scored from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationRecord {
    pub measurement: RoofMeasurement,
    pub outcome: LeadQualification,
    pub recorded_at: DateTime<Utc>,
}

impl QualificationRecord {
    pub fn lead_id(&self) -> &LeadId {
        &self.outcome.lead_id
    }
}

/// Stored proposal together with the rate and bill it was priced against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub proposal: Proposal,
    pub utility_rate: UtilityRate,
    pub current_monthly_bill: f64,
    pub created_at: DateTime<Utc>,
}

impl ProposalRecord {
    pub fn view(&self) -> ProposalView {
        ProposalView {
            lead_id: self.proposal.lead_id.clone(),
            utility_rate_per_kwh: self.utility_rate.rate_per_kwh,
            utility_rate_source: self.utility_rate.source.label(),
            current_monthly_bill: self.current_monthly_bill,
            breakdown: self.proposal.cost_breakdown(),
            created_at: self.created_at,
        }
    }
}

/// Presentation payload returned by the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalView {
    pub lead_id: LeadId,
    pub utility_rate_per_kwh: f64,
    pub utility_rate_source: &'static str,
    pub current_monthly_bill: f64,
    pub breakdown: CostBreakdown,
    pub created_at: DateTime<Utc>,
}

/// Storage for qualifications and the proposals generated from them.
///
/// Proposals are append-only; `proposals_for` returns them oldest first.
pub trait ProposalRepository: Send + Sync {
    fn save_qualification(&self, record: QualificationRecord) -> Result<(), RepositoryError>;
    fn latest_qualification(
        &self,
        lead_id: &LeadId,
    ) -> Result<Option<QualificationRecord>, RepositoryError>;
    fn save_proposal(&self, record: ProposalRecord) -> Result<ProposalRecord, RepositoryError>;
    fn proposals_for(&self, lead_id: &LeadId) -> Result<Vec<ProposalRecord>, RepositoryError>;
}
