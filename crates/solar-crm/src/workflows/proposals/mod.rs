//! Proposal pricing: savings model, break-even, and utility rate resolution.

mod proposal;
pub mod repository;
pub mod router;
mod savings;
pub mod service;
mod utility;

#[cfg(test)]
mod tests;

pub use proposal::{
    generate_proposal, CostBreakdown, Proposal, BREAK_EVEN_CAP_YEARS, NO_BREAK_EVEN_YEARS,
};
pub use repository::{ProposalRecord, ProposalRepository, ProposalView, QualificationRecord};
pub use router::proposal_router;
pub use savings::{calculate_savings_model, PricingConfiguration, SavingsModel};
pub use service::{
    PricingViolation, ProposalRequest, ProposalService, ProposalServiceError,
    DEFAULT_MONTHLY_BILL,
};
pub use utility::{
    extract_zip, RateSource, UtilityRate, UtilityRateTable, NATIONAL_AVERAGE_RATE_PER_KWH,
};
