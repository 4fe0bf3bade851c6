use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::proposal::generate_proposal;
use super::repository::{ProposalRecord, ProposalRepository, QualificationRecord};
use super::savings::PricingConfiguration;
use super::utility::{UtilityRate, UtilityRateTable};
use crate::workflows::assumptions::ModelAssumptions;
use crate::workflows::ids::LeadId;
use crate::workflows::projects::GrossValueLookup;
use crate::workflows::solar::{qualify_lead_roof, LeadQualification, RoofMeasurement};
use crate::workflows::storage::RepositoryError;

/// Bill assumed when the homeowner has not shared one.
pub const DEFAULT_MONTHLY_BILL: f64 = 200.0;

fn default_monthly_bill() -> f64 {
    DEFAULT_MONTHLY_BILL
}

/// Pricing request submitted by a sales agent for a qualified lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub system_cost_per_kw: f64,
    pub loan_apr_fraction: f64,
    pub loan_term_years: u32,
    #[serde(default)]
    pub ppa_rate_per_kwh: f64,
    #[serde(default)]
    pub utility_rate_override: Option<f64>,
    #[serde(default = "default_monthly_bill")]
    pub current_monthly_bill: f64,
    /// Service address used for the regional rate lookup.
    #[serde(default)]
    pub address: Option<String>,
}

impl ProposalRequest {
    pub fn validate(&self) -> Result<(), PricingViolation> {
        if !(self.system_cost_per_kw.is_finite() && self.system_cost_per_kw > 0.0) {
            return Err(PricingViolation::SystemCost(self.system_cost_per_kw));
        }
        if !(self.loan_apr_fraction.is_finite() && (0.0..=1.0).contains(&self.loan_apr_fraction)) {
            return Err(PricingViolation::LoanApr(self.loan_apr_fraction));
        }
        if self.loan_term_years == 0 {
            return Err(PricingViolation::LoanTerm);
        }
        if !non_negative(self.ppa_rate_per_kwh) {
            return Err(PricingViolation::PpaRate(self.ppa_rate_per_kwh));
        }
        if let Some(rate) = self.utility_rate_override {
            if !non_negative(rate) {
                return Err(PricingViolation::UtilityRate(rate));
            }
        }
        if !non_negative(self.current_monthly_bill) {
            return Err(PricingViolation::MonthlyBill(self.current_monthly_bill));
        }
        Ok(())
    }

    fn pricing(&self, utility_rate_per_kwh: f64) -> PricingConfiguration {
        PricingConfiguration {
            system_cost_per_kw: self.system_cost_per_kw,
            loan_apr_fraction: self.loan_apr_fraction,
            loan_term_years: self.loan_term_years,
            ppa_rate_per_kwh: self.ppa_rate_per_kwh,
            utility_rate_per_kwh,
        }
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Rejected pricing input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingViolation {
    #[error("system cost per kW must be positive (got {0})")]
    SystemCost(f64),
    #[error("loan APR must be a fraction between 0 and 1 (got {0})")]
    LoanApr(f64),
    #[error("loan term must be at least one year")]
    LoanTerm,
    #[error("PPA rate must not be negative (got {0})")]
    PpaRate(f64),
    #[error("utility rate must not be negative (got {0})")]
    UtilityRate(f64),
    #[error("current monthly bill must not be negative (got {0})")]
    MonthlyBill(f64),
}

/// Qualifies roofs and prices proposals against the stored qualification.
pub struct ProposalService<R> {
    repository: Arc<R>,
    assumptions: ModelAssumptions,
    rates: Arc<UtilityRateTable>,
}

impl<R> ProposalService<R>
where
    R: ProposalRepository + 'static,
{
    pub fn new(repository: Arc<R>, assumptions: ModelAssumptions) -> Self {
        Self {
            repository,
            assumptions,
            rates: Arc::new(UtilityRateTable::standard()),
        }
    }

    pub fn with_rate_table(mut self, rates: UtilityRateTable) -> Self {
        self.rates = Arc::new(rates);
        self
    }

    /// Score a roof and store the outcome as the lead's latest qualification.
    pub fn qualify(
        &self,
        lead_id: LeadId,
        measurement: RoofMeasurement,
    ) -> Result<LeadQualification, ProposalServiceError> {
        let outcome = qualify_lead_roof(lead_id, &measurement, &self.assumptions);
        info!(
            lead_id = %outcome.lead_id,
            solar_score = outcome.qualification.solar_score,
            roof_viable = outcome.qualification.roof_viable,
            production_kwh = outcome.qualification.estimated_annual_production_kwh,
            "roof qualification computed"
        );

        self.repository.save_qualification(QualificationRecord {
            measurement,
            outcome: outcome.clone(),
            recorded_at: Utc::now(),
        })?;

        Ok(outcome)
    }

    /// Price a proposal from the lead's most recent qualification.
    pub fn generate(
        &self,
        lead_id: &LeadId,
        request: &ProposalRequest,
    ) -> Result<ProposalRecord, ProposalServiceError> {
        request.validate()?;

        let qualification = self
            .repository
            .latest_qualification(lead_id)?
            .ok_or_else(|| ProposalServiceError::MissingQualification(lead_id.clone()))?;
        if !qualification.outcome.qualification.roof_viable {
            warn!(%lead_id, "pricing a proposal for a roof that failed qualification");
        }

        let utility_rate = self.resolve_rate(request);
        let proposal = generate_proposal(
            lead_id.clone(),
            &qualification.outcome.qualification,
            &request.pricing(utility_rate.rate_per_kwh),
            request.current_monthly_bill,
            &self.assumptions,
        );
        info!(
            %lead_id,
            net_cost = proposal.savings.net_cost_after_incentives,
            monthly_payment = proposal.savings.estimated_monthly_payment,
            break_even_years = proposal.break_even_years,
            rate_source = utility_rate.source.label(),
            "proposal generated"
        );

        let stored = self.repository.save_proposal(ProposalRecord {
            proposal,
            utility_rate,
            current_monthly_bill: request.current_monthly_bill,
            created_at: Utc::now(),
        })?;
        Ok(stored)
    }

    pub fn history(&self, lead_id: &LeadId) -> Result<Vec<ProposalRecord>, ProposalServiceError> {
        Ok(self.repository.proposals_for(lead_id)?)
    }

    pub fn latest_proposal(
        &self,
        lead_id: &LeadId,
    ) -> Result<Option<ProposalRecord>, RepositoryError> {
        Ok(self.repository.proposals_for(lead_id)?.pop())
    }

    fn resolve_rate(&self, request: &ProposalRequest) -> UtilityRate {
        match (request.utility_rate_override, request.address.as_deref()) {
            (Some(rate), _) => UtilityRate::overridden(rate),
            (None, Some(address)) => self.rates.lookup_address(address),
            (None, None) => self.rates.lookup(""),
        }
    }
}

/// Projects opened without a contract value are priced at the lead's latest
/// quoted gross cost.
impl<R> GrossValueLookup for ProposalService<R>
where
    R: ProposalRepository + 'static,
{
    fn latest_gross_value(&self, lead_id: &LeadId) -> Result<Option<f64>, RepositoryError> {
        Ok(self
            .latest_proposal(lead_id)?
            .map(|record| record.proposal.savings.gross_cost))
    }
}

/// Error raised by the proposal service.
#[derive(Debug, thiserror::Error)]
pub enum ProposalServiceError {
    #[error("solar qualification missing for lead {0}")]
    MissingQualification(LeadId),
    #[error(transparent)]
    InvalidPricing(#[from] PricingViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
