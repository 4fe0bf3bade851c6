use super::savings::{calculate_savings_model, PricingConfiguration, SavingsModel};
use crate::workflows::assumptions::ModelAssumptions;
use crate::workflows::ids::LeadId;
use crate::workflows::solar::RoofQualification;
use serde::{Deserialize, Serialize};

/// Longest break-even horizon shown to a homeowner.
pub const BREAK_EVEN_CAP_YEARS: u8 = 25;
/// Break-even reported when the system never pays for itself, before capping.
pub const NO_BREAK_EVEN_YEARS: u8 = 99;

/// Presentable proposal assembled for a single lead.
///
/// Proposals are never updated in place; recalculating produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub lead_id: LeadId,
    pub savings: SavingsModel,
    pub break_even_years: u8,
    pub estimated_annual_savings: f64,
}

/// Display-rounded figures for proposal documents and presentation pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub system_size_kw: f64,
    pub gross_cost: f64,
    pub incentive_credit: f64,
    pub net_cost_after_incentives: f64,
    pub estimated_monthly_payment: f64,
    pub estimated_monthly_savings: f64,
    pub estimated_annual_savings: f64,
    pub break_even_years: u8,
}

impl Proposal {
    pub fn cost_breakdown(&self) -> CostBreakdown {
        CostBreakdown {
            system_size_kw: (self.savings.estimated_system_size_kw * 10.0).round() / 10.0,
            gross_cost: self.savings.gross_cost.round(),
            incentive_credit: self.savings.incentive_credit.round(),
            net_cost_after_incentives: self.savings.net_cost_after_incentives.round(),
            estimated_monthly_payment: self.savings.estimated_monthly_payment,
            estimated_monthly_savings: self.savings.estimated_monthly_savings,
            estimated_annual_savings: self.estimated_annual_savings,
            break_even_years: self.break_even_years,
        }
    }
}

/// Prices the qualified roof and works out when the system pays for itself.
///
/// Break-even divides the net cost by the share of the current bill the
/// system is assumed to offset; it is only meaningful when the loan leaves
/// positive monthly savings, otherwise the horizon is reported as capped.
pub fn generate_proposal(
    lead_id: LeadId,
    qualification: &RoofQualification,
    pricing: &PricingConfiguration,
    current_monthly_bill: f64,
    assumptions: &ModelAssumptions,
) -> Proposal {
    let savings = calculate_savings_model(
        qualification.estimated_annual_production_kwh,
        pricing,
        assumptions,
    );
    let estimated_annual_savings = savings.estimated_monthly_savings * 12.0;
    let break_even_years = break_even_years(
        savings.net_cost_after_incentives,
        estimated_annual_savings,
        current_monthly_bill,
        assumptions.bill_offset_fraction,
    );

    Proposal {
        lead_id,
        savings,
        break_even_years,
        estimated_annual_savings,
    }
}

fn break_even_years(
    net_cost: f64,
    annual_savings: f64,
    current_monthly_bill: f64,
    bill_offset_fraction: f64,
) -> u8 {
    let annual_offset = current_monthly_bill * 12.0 * bill_offset_fraction;
    let years = if annual_savings > 0.0 && annual_offset > 0.0 && annual_offset.is_finite() {
        (net_cost / annual_offset).ceil()
    } else {
        f64::from(NO_BREAK_EVEN_YEARS)
    };

    if years.is_nan() {
        return BREAK_EVEN_CAP_YEARS;
    }
    years.clamp(1.0, f64::from(BREAK_EVEN_CAP_YEARS)) as u8
}
