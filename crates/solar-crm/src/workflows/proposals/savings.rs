use crate::workflows::assumptions::ModelAssumptions;
use serde::{Deserialize, Serialize};

/// Pricing inputs supplied per proposal request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfiguration {
    pub system_cost_per_kw: f64,
    /// Annual percentage rate as a fraction (`0.055` for 5.5 %).
    pub loan_apr_fraction: f64,
    pub loan_term_years: u32,
    #[serde(default)]
    pub ppa_rate_per_kwh: f64,
    pub utility_rate_per_kwh: f64,
}

/// Financial picture of a system sized from its expected production.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsModel {
    pub estimated_system_size_kw: f64,
    pub gross_cost: f64,
    pub incentive_credit: f64,
    pub net_cost_after_incentives: f64,
    pub estimated_monthly_payment: f64,
    pub estimated_monthly_savings: f64,
}

/// Sizes, prices, and finances a system producing `production_kwh` per year.
///
/// Costs keep full precision so `net = gross - credit` holds exactly; the
/// payment and savings figures are whole currency units. Sizing uses the
/// annual capacity factor while the monthly savings use the daily-yield
/// approximation; the two are independent estimates and are not reconciled.
pub fn calculate_savings_model(
    production_kwh: f64,
    pricing: &PricingConfiguration,
    assumptions: &ModelAssumptions,
) -> SavingsModel {
    let production_kwh = non_negative(production_kwh);
    let estimated_system_size_kw = if assumptions.capacity_factor_kwh_per_kw > 0.0 {
        production_kwh / assumptions.capacity_factor_kwh_per_kw
    } else {
        0.0
    };

    let gross_cost = estimated_system_size_kw * non_negative(pricing.system_cost_per_kw);
    let incentive_credit = gross_cost * assumptions.federal_credit_rate;
    let net_cost_after_incentives = gross_cost - incentive_credit;

    let estimated_monthly_payment = monthly_payment(
        net_cost_after_incentives,
        pricing.loan_apr_fraction,
        pricing.loan_term_years,
    )
    .round();

    let monthly_production_kwh = estimated_system_size_kw
        * ModelAssumptions::DAYS_PER_MONTH
        * assumptions.daily_yield_kwh_per_kw;
    let utility_savings = non_negative(pricing.utility_rate_per_kwh) * monthly_production_kwh;
    let estimated_monthly_savings = (utility_savings - estimated_monthly_payment).round();

    SavingsModel {
        estimated_system_size_kw,
        gross_cost,
        incentive_credit,
        net_cost_after_incentives,
        estimated_monthly_payment,
        estimated_monthly_savings,
    }
}

/// Standard amortized loan payment (PMT) on `principal`.
///
/// A zero rate spreads the principal evenly; a zero term is treated as a
/// single payment.
pub(crate) fn monthly_payment(principal: f64, apr_fraction: f64, term_years: u32) -> f64 {
    let payments = term_years.saturating_mul(12).max(1);
    let rate = non_negative(apr_fraction) / 12.0;

    if rate == 0.0 {
        return principal / f64::from(payments);
    }

    let exponent = i32::try_from(payments).unwrap_or(i32::MAX);
    (rate * principal) / (1.0 - (1.0 + rate).powi(-exponent))
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
